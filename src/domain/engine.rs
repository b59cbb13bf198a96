//! Indicator engine: one price series in, zero or one snapshot out.
//!
//! The engine is pure. It performs no I/O, keeps no state between calls and
//! may be shared across worker threads.

use crate::domain::error::TrendscanError;
use crate::domain::indicator::{calculate_ema, calculate_macd, calculate_rsi};
use crate::domain::params::EngineParams;
use crate::domain::price::PriceSeries;
use crate::domain::snapshot::{IndicatorSnapshot, Sentiment, round2};

#[derive(Debug, Clone)]
pub struct IndicatorEngine {
    params: EngineParams,
}

impl IndicatorEngine {
    /// Validates `params` up front so that `evaluate` never sees a
    /// nonsensical configuration.
    pub fn new(params: EngineParams) -> Result<Self, TrendscanError> {
        params.validate()?;
        Ok(Self { params })
    }

    pub fn params(&self) -> &EngineParams {
        &self.params
    }

    pub fn min_history(&self) -> usize {
        self.params.min_history()
    }

    /// Returns `None` when the series is shorter than [`Self::min_history`].
    pub fn evaluate(&self, series: &PriceSeries) -> Option<IndicatorSnapshot> {
        let p = &self.params;
        if series.len() < p.min_history() {
            return None;
        }

        let last = series.last()?;
        let closes = series.closes();
        let close = last.close;

        let ema_fast = last_ema(&closes, p.ema_fast)?;
        let ema_slow = last_ema(&closes, p.ema_slow)?;
        let ema_long = match p.ema_long {
            Some(span) => Some(last_ema(&closes, span)?),
            None => None,
        };
        let rsi = calculate_rsi(&closes, p.rsi_period, p.rsi_flat_value)
            .last()
            .copied()
            .flatten()?;
        let macd = *calculate_macd(&closes, p.macd_fast, p.macd_slow, p.macd_signal).last()?;

        let sentiment = classify(close, ema_fast, rsi, macd.histogram, p);

        let previous = closes[closes.len() - 2];
        let change_pct = (previous > 0.0).then(|| round2((close - previous) / previous * 100.0));

        let gann_level = p
            .gann_level
            .then(|| last.gann_level())
            .filter(|v| v.is_finite())
            .map(round2);

        let breakout = (p.breakout_lookback > 0).then(|| {
            let end = closes.len() - 1;
            let window = &closes[end - p.breakout_lookback..end];
            close > window.iter().copied().fold(f64::NEG_INFINITY, f64::max)
        });

        let [t1, t2, t3] = p.target_pcts;

        Some(IndicatorSnapshot {
            ticker: series.ticker().to_string(),
            as_of: last.date,
            close: round2(close),
            change_pct,
            ema_fast: round2(ema_fast),
            ema_slow: round2(ema_slow),
            ema_long: ema_long.map(round2),
            rsi: round2(rsi),
            macd: round2(macd.line),
            macd_signal: round2(macd.signal),
            macd_diff: round2(macd.histogram),
            sentiment,
            target1: round2(close * (1.0 + t1 / 100.0)),
            target2: round2(close * (1.0 + t2 / 100.0)),
            target3: round2(close * (1.0 + t3 / 100.0)),
            stop_loss: round2(close * (1.0 - p.stop_loss_pct / 100.0)),
            gann_level,
            breakout,
        })
    }
}

fn last_ema(closes: &[f64], span: usize) -> Option<f64> {
    calculate_ema(closes, span).last().copied()
}

/// Bullish when price, momentum and trend all point up; Bearish when all
/// point down; Neutral otherwise.
pub fn classify(
    close: f64,
    ema_fast: f64,
    rsi: f64,
    macd_diff: f64,
    params: &EngineParams,
) -> Sentiment {
    if close > ema_fast && rsi > params.rsi_bull_threshold && macd_diff > 0.0 {
        Sentiment::Bullish
    } else if close < ema_fast && rsi < params.rsi_bear_threshold && macd_diff < 0.0 {
        Sentiment::Bearish
    } else {
        Sentiment::Neutral
    }
}
