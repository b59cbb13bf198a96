//! Indicator engine parameters and their eager validation.
//!
//! All thresholds, spans and level offsets are configuration. The defaults
//! below follow the most common variant of the dashboard this engine
//! replaces; the others (55/45 or 60/40 thresholds, a 2% stop) are a config
//! change away.

use crate::domain::error::TrendscanError;
use crate::domain::indicator::IndicatorType;
use crate::domain::indicator::macd::{DEFAULT_FAST, DEFAULT_SIGNAL, DEFAULT_SLOW};
use crate::domain::indicator::rsi::DEFAULT_FLAT_VALUE;
use crate::ports::config_port::ConfigPort;

pub const DEFAULT_EMA_FAST: usize = 20;
pub const DEFAULT_EMA_SLOW: usize = 50;
pub const DEFAULT_RSI_PERIOD: usize = 14;
pub const DEFAULT_RSI_BULL_THRESHOLD: f64 = 50.0;
pub const DEFAULT_RSI_BEAR_THRESHOLD: f64 = 50.0;
pub const DEFAULT_TARGET_PCTS: [f64; 3] = [2.0, 4.0, 6.0];
pub const DEFAULT_STOP_LOSS_PCT: f64 = 3.0;
pub const DEFAULT_HISTORY_BUFFER: usize = 5;
pub const DEFAULT_BREAKOUT_LOOKBACK: usize = 20;

/// Upper bound for every span, period and buffer.
pub const MAX_SPAN: usize = 10_000;

const INDICATORS: &str = "indicators";
const LEVELS: &str = "levels";

#[derive(Debug, Clone, PartialEq)]
pub struct EngineParams {
    /// Span of the EMA that the close is compared against for sentiment.
    pub ema_fast: usize,
    pub ema_slow: usize,
    pub ema_long: Option<usize>,
    pub rsi_period: usize,
    pub rsi_bull_threshold: f64,
    pub rsi_bear_threshold: f64,
    /// RSI reported when the trailing window saw no price change.
    pub rsi_flat_value: f64,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    /// Percent offsets above the close for target 1..3.
    pub target_pcts: [f64; 3],
    /// Percent offset below the close for the stop loss.
    pub stop_loss_pct: f64,
    /// Extra bars required on top of the longest window.
    pub history_buffer: usize,
    pub gann_level: bool,
    /// Trailing window for the breakout flag; 0 disables it.
    pub breakout_lookback: usize,
}

impl Default for EngineParams {
    fn default() -> Self {
        Self {
            ema_fast: DEFAULT_EMA_FAST,
            ema_slow: DEFAULT_EMA_SLOW,
            ema_long: None,
            rsi_period: DEFAULT_RSI_PERIOD,
            rsi_bull_threshold: DEFAULT_RSI_BULL_THRESHOLD,
            rsi_bear_threshold: DEFAULT_RSI_BEAR_THRESHOLD,
            rsi_flat_value: DEFAULT_FLAT_VALUE,
            macd_fast: DEFAULT_FAST,
            macd_slow: DEFAULT_SLOW,
            macd_signal: DEFAULT_SIGNAL,
            target_pcts: DEFAULT_TARGET_PCTS,
            stop_loss_pct: DEFAULT_STOP_LOSS_PCT,
            history_buffer: DEFAULT_HISTORY_BUFFER,
            gann_level: true,
            breakout_lookback: DEFAULT_BREAKOUT_LOOKBACK,
        }
    }
}

impl EngineParams {
    /// Shortest series the engine will analyze.
    pub fn min_history(&self) -> usize {
        let longest = [
            self.ema_fast,
            self.ema_slow,
            self.ema_long.unwrap_or(0),
            self.rsi_period.saturating_add(1),
            self.macd_slow.saturating_add(self.macd_signal),
            self.breakout_lookback.saturating_add(1),
        ]
        .into_iter()
        .max()
        .unwrap_or(0);
        longest.saturating_add(self.history_buffer)
    }

    /// Indicators computed for every ticker, in display order.
    pub fn indicators(&self) -> Vec<IndicatorType> {
        let mut out = vec![IndicatorType::Ema(self.ema_fast), IndicatorType::Ema(self.ema_slow)];
        if let Some(span) = self.ema_long {
            out.push(IndicatorType::Ema(span));
        }
        out.push(IndicatorType::Rsi(self.rsi_period));
        out.push(IndicatorType::Macd {
            fast: self.macd_fast,
            slow: self.macd_slow,
            signal: self.macd_signal,
        });
        out
    }

    pub fn validate(&self) -> Result<(), TrendscanError> {
        for (key, value) in [
            ("ema_fast", self.ema_fast),
            ("ema_slow", self.ema_slow),
            ("rsi_period", self.rsi_period),
            ("macd_fast", self.macd_fast),
            ("macd_slow", self.macd_slow),
            ("macd_signal", self.macd_signal),
        ] {
            if value == 0 {
                return Err(TrendscanError::config_invalid(
                    INDICATORS,
                    key,
                    format!("{} must be positive", key),
                ));
            }
        }
        for (key, value) in [
            ("ema_fast", self.ema_fast),
            ("ema_slow", self.ema_slow),
            ("ema_long", self.ema_long.unwrap_or(0)),
            ("rsi_period", self.rsi_period),
            ("macd_fast", self.macd_fast),
            ("macd_slow", self.macd_slow),
            ("macd_signal", self.macd_signal),
            ("history_buffer", self.history_buffer),
            ("breakout_lookback", self.breakout_lookback),
        ] {
            if value > MAX_SPAN {
                return Err(TrendscanError::config_invalid(
                    INDICATORS,
                    key,
                    format!("{} must not exceed {}", key, MAX_SPAN),
                ));
            }
        }
        if self.ema_long == Some(0) {
            return Err(TrendscanError::config_invalid(
                INDICATORS,
                "ema_long",
                "ema_long must be positive",
            ));
        }
        if self.ema_fast >= self.ema_slow {
            return Err(TrendscanError::config_invalid(
                INDICATORS,
                "ema_fast",
                "ema_fast must be shorter than ema_slow",
            ));
        }
        if self.macd_fast >= self.macd_slow {
            return Err(TrendscanError::config_invalid(
                INDICATORS,
                "macd_fast",
                "macd_fast must be shorter than macd_slow",
            ));
        }

        for (key, value) in [
            ("rsi_bull", self.rsi_bull_threshold),
            ("rsi_bear", self.rsi_bear_threshold),
            ("rsi_flat", self.rsi_flat_value),
        ] {
            if !(0.0..=100.0).contains(&value) {
                return Err(TrendscanError::config_invalid(
                    INDICATORS,
                    key,
                    format!("{} must be between 0 and 100", key),
                ));
            }
        }
        if self.rsi_bear_threshold > self.rsi_bull_threshold {
            return Err(TrendscanError::config_invalid(
                INDICATORS,
                "rsi_bear",
                "rsi_bear must not exceed rsi_bull",
            ));
        }

        let mut previous = 0.0;
        for (i, pct) in self.target_pcts.iter().enumerate() {
            let key = format!("target{}_pct", i + 1);
            if !pct.is_finite() || *pct <= previous {
                return Err(TrendscanError::config_invalid(
                    LEVELS,
                    &key,
                    "target percentages must be positive and strictly increasing",
                ));
            }
            previous = *pct;
        }
        if !self.stop_loss_pct.is_finite() || self.stop_loss_pct <= 0.0 || self.stop_loss_pct >= 100.0
        {
            return Err(TrendscanError::config_invalid(
                LEVELS,
                "stop_loss_pct",
                "stop_loss_pct must be between 0 and 100 (exclusive)",
            ));
        }
        Ok(())
    }

    /// Reads `[indicators]` and `[levels]`, falling back to the defaults for
    /// absent keys, and validates the result.
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, TrendscanError> {
        let d = Self::default();
        let params = Self {
            ema_fast: read_count(config, INDICATORS, "ema_fast", d.ema_fast)?,
            ema_slow: read_count(config, INDICATORS, "ema_slow", d.ema_slow)?,
            ema_long: read_optional_count(config, INDICATORS, "ema_long")?,
            rsi_period: read_count(config, INDICATORS, "rsi_period", d.rsi_period)?,
            rsi_bull_threshold: read_number(config, INDICATORS, "rsi_bull", d.rsi_bull_threshold)?,
            rsi_bear_threshold: read_number(config, INDICATORS, "rsi_bear", d.rsi_bear_threshold)?,
            rsi_flat_value: read_number(config, INDICATORS, "rsi_flat", d.rsi_flat_value)?,
            macd_fast: read_count(config, INDICATORS, "macd_fast", d.macd_fast)?,
            macd_slow: read_count(config, INDICATORS, "macd_slow", d.macd_slow)?,
            macd_signal: read_count(config, INDICATORS, "macd_signal", d.macd_signal)?,
            target_pcts: [
                read_number(config, LEVELS, "target1_pct", d.target_pcts[0])?,
                read_number(config, LEVELS, "target2_pct", d.target_pcts[1])?,
                read_number(config, LEVELS, "target3_pct", d.target_pcts[2])?,
            ],
            stop_loss_pct: read_number(config, LEVELS, "stop_loss_pct", d.stop_loss_pct)?,
            history_buffer: read_count(config, INDICATORS, "history_buffer", d.history_buffer)?,
            gann_level: config.get_bool(INDICATORS, "gann_level", d.gann_level),
            breakout_lookback: read_count(
                config,
                INDICATORS,
                "breakout_lookback",
                d.breakout_lookback,
            )?,
        };
        params.validate()?;
        Ok(params)
    }
}

fn present(config: &dyn ConfigPort, section: &str, key: &str) -> Option<String> {
    config
        .get_string(section, key)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

pub(crate) fn read_count(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: usize,
) -> Result<usize, TrendscanError> {
    match present(config, section, key) {
        None => Ok(default),
        Some(raw) => raw.parse::<usize>().map_err(|_| {
            TrendscanError::config_invalid(section, key, format!("expected a non-negative integer, got '{}'", raw))
        }),
    }
}

fn read_optional_count(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Option<usize>, TrendscanError> {
    match present(config, section, key) {
        None => Ok(None),
        Some(_) => read_count(config, section, key, 0).map(Some),
    }
}

pub(crate) fn read_number(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: f64,
) -> Result<f64, TrendscanError> {
    match present(config, section, key) {
        None => Ok(default),
        Some(raw) => match raw.parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(v),
            _ => Err(TrendscanError::config_invalid(
                section,
                key,
                format!("expected a number, got '{}'", raw),
            )),
        },
    }
}
