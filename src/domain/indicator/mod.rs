//! Technical indicator implementations over closing prices.
//!
//! Every calculator takes the close sequence in date order and returns one
//! output per input element:
//! - [`calculate_ema`]: exponential moving average seeded with the first close
//! - [`calculate_rsi`]: RSI over a trailing simple mean of gains and losses
//! - [`calculate_macd`]: MACD line, signal line and histogram
//!
//! [`IndicatorType`] names an indicator together with its parameters.

pub mod ema;
pub mod macd;
pub mod rsi;

pub use ema::calculate_ema;
pub use macd::{MacdPoint, calculate_macd};
pub use rsi::calculate_rsi;

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Ema(usize),
    Rsi(usize),
    Macd {
        fast: usize,
        slow: usize,
        signal: usize,
    },
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Ema(period) => write!(f, "EMA({})", period),
            IndicatorType::Rsi(period) => write!(f, "RSI({})", period),
            IndicatorType::Macd { fast, slow, signal } => {
                write!(f, "MACD({},{},{})", fast, slow, signal)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indicator_type_display_ema() {
        assert_eq!(IndicatorType::Ema(20).to_string(), "EMA(20)");
    }

    #[test]
    fn indicator_type_display_rsi() {
        assert_eq!(IndicatorType::Rsi(14).to_string(), "RSI(14)");
    }

    #[test]
    fn indicator_type_display_macd() {
        let macd = IndicatorType::Macd {
            fast: 12,
            slow: 26,
            signal: 9,
        };
        assert_eq!(macd.to_string(), "MACD(12,26,9)");
    }

    #[test]
    fn indicator_type_hash_eq() {
        use std::collections::HashSet;

        let mut set = HashSet::new();
        set.insert(IndicatorType::Ema(20));
        set.insert(IndicatorType::Ema(50));
        set.insert(IndicatorType::Ema(20));
        assert_eq!(set.len(), 2);
        assert!(set.contains(&IndicatorType::Ema(50)));
    }
}
