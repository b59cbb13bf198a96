//! Batch screening driver.
//!
//! Fetches every code in the universe, evaluates it, and gathers the
//! snapshots together with the codes that produced none. A failure on one
//! code never stops the others. Work is spread over scoped worker threads
//! that share the data port and the engine read-only.

use crate::domain::engine::IndicatorEngine;
use crate::domain::error::TrendscanError;
use crate::domain::ranking::{SortKey, rank};
use crate::domain::snapshot::{IndicatorSnapshot, Sentiment};
use crate::domain::universe::Universe;
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExclusionReason {
    NoData,
    InsufficientHistory { bars: usize, minimum: usize },
    InvalidSeries { reason: String },
    FetchFailed { reason: String },
}

impl fmt::Display for ExclusionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExclusionReason::NoData => write!(f, "no data"),
            ExclusionReason::InsufficientHistory { bars, minimum } => {
                write!(f, "insufficient history ({} bars, need {})", bars, minimum)
            }
            ExclusionReason::InvalidSeries { reason } => write!(f, "invalid series: {}", reason),
            ExclusionReason::FetchFailed { reason } => write!(f, "fetch failed: {}", reason),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExcludedTicker {
    pub code: String,
    pub reason: ExclusionReason,
}

/// Snapshots and exclusions, both in universe order.
#[derive(Debug, Clone, Default)]
pub struct ScreenResult {
    pub snapshots: Vec<IndicatorSnapshot>,
    pub excluded: Vec<ExcludedTicker>,
}

#[derive(Debug, Clone, Copy)]
pub struct ScreenWindow {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

pub fn run_screen(
    data_port: &(dyn DataPort + Sync),
    engine: &IndicatorEngine,
    universe: &Universe,
    window: ScreenWindow,
    workers: usize,
) -> ScreenResult {
    let codes = &universe.codes;
    let workers = workers.clamp(1, codes.len().max(1));
    let next = AtomicUsize::new(0);

    let mut outcomes: Vec<Option<Result<IndicatorSnapshot, ExclusionReason>>> =
        vec![None; codes.len()];

    thread::scope(|scope| {
        let handles: Vec<_> = (0..workers)
            .map(|_| {
                scope.spawn(|| {
                    let mut done = Vec::new();
                    loop {
                        let idx = next.fetch_add(1, Ordering::Relaxed);
                        let Some(code) = codes.get(idx) else {
                            break;
                        };
                        let outcome =
                            screen_code(data_port, engine, code, &universe.exchange, window);
                        done.push((idx, outcome));
                    }
                    done
                })
            })
            .collect();

        for handle in handles {
            match handle.join() {
                Ok(done) => {
                    for (idx, outcome) in done {
                        outcomes[idx] = Some(outcome);
                    }
                }
                Err(_) => tracing::error!("screening worker panicked"),
            }
        }
    });

    let mut result = ScreenResult::default();
    for (code, outcome) in codes.iter().zip(outcomes) {
        match outcome {
            Some(Ok(snapshot)) => result.snapshots.push(snapshot),
            Some(Err(reason)) => result.excluded.push(ExcludedTicker {
                code: code.clone(),
                reason,
            }),
            None => result.excluded.push(ExcludedTicker {
                code: code.clone(),
                reason: ExclusionReason::FetchFailed {
                    reason: "worker aborted".to_string(),
                },
            }),
        }
    }

    tracing::info!(
        screened = result.snapshots.len(),
        excluded = result.excluded.len(),
        exchange = %universe.exchange,
        "screen complete"
    );
    result
}

/// Fetch and evaluate a single code.
pub fn screen_code(
    data_port: &(dyn DataPort + Sync),
    engine: &IndicatorEngine,
    code: &str,
    exchange: &str,
    window: ScreenWindow,
) -> Result<IndicatorSnapshot, ExclusionReason> {
    let series = match data_port.fetch_series(code, exchange, window.start_date, window.end_date)
    {
        Ok(series) => series,
        Err(TrendscanError::InvalidSeries { source, .. }) => {
            tracing::warn!(code, exchange, error = %source, "skipping code with invalid series");
            return Err(ExclusionReason::InvalidSeries {
                reason: source.to_string(),
            });
        }
        Err(e) => {
            tracing::warn!(code, exchange, error = %e, "skipping code, fetch failed");
            return Err(ExclusionReason::FetchFailed {
                reason: e.to_string(),
            });
        }
    };

    if series.is_empty() {
        tracing::warn!(code, exchange, "skipping code, no data found");
        return Err(ExclusionReason::NoData);
    }

    match engine.evaluate(&series) {
        Some(snapshot) => {
            tracing::debug!(code, bars = series.len(), sentiment = %snapshot.sentiment, "evaluated");
            Ok(snapshot)
        }
        None => {
            let minimum = engine.min_history();
            tracing::warn!(code, bars = series.len(), minimum, "skipping code, insufficient history");
            Err(ExclusionReason::InsufficientHistory {
                bars: series.len(),
                minimum,
            })
        }
    }
}

/// Everything the presentation layer needs for one run.
#[derive(Debug, Clone, Serialize)]
pub struct ScreenReport {
    pub exchange: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub sort_key: SortKey,
    pub descending: bool,
    pub ema_fast_span: usize,
    pub ema_slow_span: usize,
    pub ema_long_span: Option<usize>,
    pub snapshots: Vec<IndicatorSnapshot>,
    pub excluded: Vec<ExcludedTicker>,
}

impl ScreenReport {
    /// Ranks the result's snapshots and pairs them with the run metadata.
    pub fn build(
        mut result: ScreenResult,
        engine: &IndicatorEngine,
        universe: &Universe,
        window: ScreenWindow,
        sort_key: SortKey,
        descending: bool,
    ) -> Self {
        rank(&mut result.snapshots, sort_key, descending);
        let params = engine.params();
        Self {
            exchange: universe.exchange.clone(),
            start_date: window.start_date,
            end_date: window.end_date,
            sort_key,
            descending,
            ema_fast_span: params.ema_fast,
            ema_slow_span: params.ema_slow,
            ema_long_span: params.ema_long,
            snapshots: result.snapshots,
            excluded: result.excluded,
        }
    }

    pub fn count(&self, sentiment: Sentiment) -> usize {
        self.snapshots
            .iter()
            .filter(|s| s.sentiment == sentiment)
            .count()
    }
}
