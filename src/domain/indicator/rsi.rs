//! RSI (Relative Strength Index).
//!
//! Average gain/loss is the trailing simple mean of the last n price changes:
//! - gain = max(delta, 0), loss = max(-delta, 0)
//! - RSI = 100 - (100 / (1 + avg_gain / avg_loss))
//!
//! Degenerate windows never produce a non-finite value:
//! - avg_loss == 0 and avg_gain > 0: RSI = 100
//! - avg_loss == 0 and avg_gain == 0: RSI = `flat_value` (a flat market)
//!
//! Warmup: the first n closes have no value (n changes are needed).

/// Neutral reading used for a window with no price movement at all.
pub const DEFAULT_FLAT_VALUE: f64 = 50.0;

pub fn calculate_rsi(closes: &[f64], period: usize, flat_value: f64) -> Vec<Option<f64>> {
    if period == 0 || closes.len() < 2 {
        return vec![None; closes.len()];
    }

    let mut gains = Vec::with_capacity(closes.len() - 1);
    let mut losses = Vec::with_capacity(closes.len() - 1);
    for pair in closes.windows(2) {
        let change = pair[1] - pair[0];
        gains.push(if change > 0.0 { change } else { 0.0 });
        losses.push(if change < 0.0 { -change } else { 0.0 });
    }

    let mut values = Vec::with_capacity(closes.len());
    values.push(None);

    for i in 0..gains.len() {
        if i + 1 < period {
            values.push(None);
            continue;
        }
        let window = (i + 1 - period)..=i;
        // Summed per window rather than rolled, so an all-zero window stays exactly zero.
        let avg_gain = gains[window.clone()].iter().sum::<f64>() / period as f64;
        let avg_loss = losses[window].iter().sum::<f64>() / period as f64;
        values.push(Some(rsi_from_averages(avg_gain, avg_loss, flat_value)));
    }

    values
}

pub fn rsi_from_averages(avg_gain: f64, avg_loss: f64, flat_value: f64) -> f64 {
    if avg_loss == 0.0 {
        if avg_gain == 0.0 { flat_value } else { 100.0 }
    } else {
        100.0 - (100.0 / (1.0 + avg_gain / avg_loss))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn rsi_empty_closes() {
        assert!(calculate_rsi(&[], 14, DEFAULT_FLAT_VALUE).is_empty());
    }

    #[test]
    fn rsi_single_close() {
        let series = calculate_rsi(&[100.0], 14, DEFAULT_FLAT_VALUE);
        assert_eq!(series, vec![None]);
    }

    #[test]
    fn rsi_warmup_period() {
        let closes: Vec<f64> = (1..=15).map(|i| 100.0 + (i as f64 % 5.0) * 2.0).collect();
        let series = calculate_rsi(&closes, 14, DEFAULT_FLAT_VALUE);

        assert_eq!(series.len(), 15);
        for (i, value) in series.iter().enumerate().take(14) {
            assert!(value.is_none(), "close {} should be in warmup", i);
        }
        assert!(series[14].is_some());
    }

    #[test]
    fn rsi_all_gains_no_losses() {
        let closes: Vec<f64> = (0..15).map(|i| 100.0 + i as f64).collect();
        let series = calculate_rsi(&closes, 14, DEFAULT_FLAT_VALUE);
        assert_eq!(series[14], Some(100.0));
    }

    #[test]
    fn rsi_all_losses_no_gains() {
        let closes: Vec<f64> = (0..15).map(|i| 100.0 - i as f64).collect();
        let series = calculate_rsi(&closes, 14, DEFAULT_FLAT_VALUE);
        assert_eq!(series[14], Some(0.0));
    }

    #[test]
    fn rsi_flat_market_uses_flat_value() {
        let series = calculate_rsi(&[100.0; 20], 14, DEFAULT_FLAT_VALUE);
        assert_eq!(series[19], Some(50.0));

        let series = calculate_rsi(&[100.0; 20], 14, 42.0);
        assert_eq!(series[19], Some(42.0));
    }

    #[test]
    fn rsi_flat_window_after_moves() {
        // Early movement falls out of the trailing window.
        let mut closes = vec![90.0, 95.0, 100.0];
        closes.extend(std::iter::repeat_n(100.0, 14));
        let series = calculate_rsi(&closes, 14, DEFAULT_FLAT_VALUE);
        assert_eq!(*series.last().unwrap(), Some(50.0));
    }

    #[test]
    fn rsi_simple_mean_of_window() {
        // Changes: +2, -1, +2, -1 over period 4 -> gain 1.0, loss 0.5.
        let closes = [10.0, 12.0, 11.0, 13.0, 12.0];
        let series = calculate_rsi(&closes, 4, DEFAULT_FLAT_VALUE);
        let expected = 100.0 - 100.0 / (1.0 + 1.0 / 0.5);
        assert_relative_eq!(series[4].unwrap(), expected, epsilon = 1e-12);
    }

    #[test]
    fn rsi_in_range() {
        let closes: Vec<f64> = (1..=40)
            .map(|i| 100.0 + (i as f64 % 7.0 - 3.0) * 2.0)
            .collect();
        for rsi in calculate_rsi(&closes, 14, DEFAULT_FLAT_VALUE).into_iter().flatten() {
            assert!((0.0..=100.0).contains(&rsi), "RSI {} out of range", rsi);
        }
    }

    #[test]
    fn rsi_zero_period() {
        let series = calculate_rsi(&[100.0, 101.0], 0, DEFAULT_FLAT_VALUE);
        assert_eq!(series, vec![None, None]);
    }

    #[test]
    fn rsi_from_averages_cases() {
        assert_eq!(rsi_from_averages(1.0, 0.0, 50.0), 100.0);
        assert_eq!(rsi_from_averages(0.0, 0.0, 50.0), 50.0);
        assert_eq!(rsi_from_averages(0.0, 1.0, 50.0), 0.0);
        assert_relative_eq!(rsi_from_averages(1.0, 1.0, 50.0), 50.0);
    }
}
