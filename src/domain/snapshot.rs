//! Per-ticker indicator snapshot and sentiment classification.

use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Sentiment {
    Bullish,
    Bearish,
    Neutral,
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Sentiment::Bullish => "Bullish",
            Sentiment::Bearish => "Bearish",
            Sentiment::Neutral => "Neutral",
        };
        f.write_str(s)
    }
}

/// Latest indicator readings for one ticker. Numeric fields are rounded to
/// two decimals; classification was done on the unrounded values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorSnapshot {
    pub ticker: String,
    pub as_of: NaiveDate,
    pub close: f64,
    /// Percent change of the last close against the previous one.
    pub change_pct: Option<f64>,
    pub ema_fast: f64,
    pub ema_slow: f64,
    pub ema_long: Option<f64>,
    pub rsi: f64,
    pub macd: f64,
    pub macd_signal: f64,
    pub macd_diff: f64,
    pub sentiment: Sentiment,
    pub target1: f64,
    pub target2: f64,
    pub target3: f64,
    pub stop_loss: f64,
    pub gann_level: Option<f64>,
    pub breakout: Option<bool>,
}

/// Round half away from zero to two decimals, folding -0.0 into 0.0.
pub fn round2(value: f64) -> f64 {
    let rounded = (value * 100.0).round() / 100.0;
    if rounded == 0.0 { 0.0 } else { rounded }
}
