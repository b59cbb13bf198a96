//! Ordering of snapshots for presentation.

use crate::domain::snapshot::IndicatorSnapshot;
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    Rsi,
    MacdDiff,
    Close,
    Change,
    Ticker,
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "rsi" => Ok(SortKey::Rsi),
            "macd_diff" | "macd-diff" | "macd" => Ok(SortKey::MacdDiff),
            "close" => Ok(SortKey::Close),
            "change" | "change_pct" => Ok(SortKey::Change),
            "ticker" | "symbol" | "code" => Ok(SortKey::Ticker),
            other => Err(format!(
                "unknown sort key '{}' (expected rsi, macd_diff, close, change or ticker)",
                other
            )),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SortKey::Rsi => "rsi",
            SortKey::MacdDiff => "macd_diff",
            SortKey::Close => "close",
            SortKey::Change => "change",
            SortKey::Ticker => "ticker",
        };
        f.write_str(s)
    }
}

/// Sorts in place. Ties, and snapshots missing the key, fall back to ticker
/// order so the output is stable across runs.
pub fn rank(snapshots: &mut [IndicatorSnapshot], key: SortKey, descending: bool) {
    snapshots.sort_by(|a, b| {
        let primary = match key {
            SortKey::Ticker => a.ticker.cmp(&b.ticker),
            SortKey::Rsi => a.rsi.total_cmp(&b.rsi),
            SortKey::MacdDiff => a.macd_diff.total_cmp(&b.macd_diff),
            SortKey::Close => a.close.total_cmp(&b.close),
            SortKey::Change => compare_optional(a.change_pct, b.change_pct),
        };
        let primary = if descending { primary.reverse() } else { primary };
        primary.then_with(|| a.ticker.cmp(&b.ticker))
    });
}

/// `None` sorts below every value.
fn compare_optional(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => Ordering::Equal,
    }
}
