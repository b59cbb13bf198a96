#![allow(dead_code)]

use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
pub use trendscan::domain::error::TrendscanError;
pub use trendscan::domain::price::{PricePoint, PriceSeries};
use trendscan::ports::data_port::DataPort;

/// In-memory data source. Codes without series or error come back empty.
pub struct MockDataPort {
    pub data: HashMap<String, Vec<PricePoint>>,
    pub errors: HashMap<String, String>,
    pub fetches: AtomicUsize,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
            fetches: AtomicUsize::new(0),
        }
    }

    pub fn with_points(mut self, code: &str, points: Vec<PricePoint>) -> Self {
        self.data.insert(code.to_string(), points);
        self
    }

    pub fn with_closes(self, code: &str, closes: &[f64]) -> Self {
        self.with_points(code, make_points(date(2024, 1, 1), closes))
    }

    pub fn with_error(mut self, code: &str, reason: &str) -> Self {
        self.errors.insert(code.to_string(), reason.to_string());
        self
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

impl DataPort for MockDataPort {
    fn fetch_series(
        &self,
        code: &str,
        _exchange: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<PriceSeries, TrendscanError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if let Some(reason) = self.errors.get(code) {
            return Err(TrendscanError::Database {
                reason: reason.clone(),
            });
        }
        let points: Vec<PricePoint> = self
            .data
            .get(code)
            .map(|points| {
                points
                    .iter()
                    .filter(|p| p.date >= start_date && p.date <= end_date)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        PriceSeries::new(code, points).map_err(|source| TrendscanError::InvalidSeries {
            code: code.to_string(),
            source,
        })
    }

    fn list_symbols(&self, _exchange: &str) -> Result<Vec<String>, TrendscanError> {
        let mut symbols: Vec<String> = self.data.keys().cloned().collect();
        symbols.sort();
        Ok(symbols)
    }

    fn get_data_range(
        &self,
        code: &str,
        _exchange: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, TrendscanError> {
        if let Some(reason) = self.errors.get(code) {
            return Err(TrendscanError::Database {
                reason: reason.clone(),
            });
        }
        match self.data.get(code) {
            Some(points) if !points.is_empty() => {
                let min = points.iter().map(|p| p.date).min().unwrap();
                let max = points.iter().map(|p| p.date).max().unwrap();
                Ok(Some((min, max, points.len())))
            }
            _ => Ok(None),
        }
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// One point per calendar day starting at `start`, with a 1% high/low band.
pub fn make_points(start: NaiveDate, closes: &[f64]) -> Vec<PricePoint> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| PricePoint {
            date: start + chrono::Duration::days(i as i64),
            open: close,
            high: close * 1.01,
            low: close * 0.99,
            close,
            volume: 1000,
        })
        .collect()
}

pub fn make_series(code: &str, closes: &[f64]) -> PriceSeries {
    PriceSeries::new(code, make_points(date(2024, 1, 1), closes)).unwrap()
}

pub fn constant(len: usize, value: f64) -> Vec<f64> {
    vec![value; len]
}

/// 30 closes at 100, then 30 rising linearly to 130.
pub fn flat_then_rising() -> Vec<f64> {
    let mut closes = constant(30, 100.0);
    closes.extend((1..=30).map(|i| 100.0 + i as f64));
    closes
}

/// 30 closes at 100, then 30 falling linearly to 70.
pub fn flat_then_falling() -> Vec<f64> {
    let mut closes = constant(30, 100.0);
    closes.extend((1..=30).map(|i| 100.0 - i as f64));
    closes
}

pub fn rising(len: usize, start: f64, step: f64) -> Vec<f64> {
    (0..len).map(|i| start + step * i as f64).collect()
}
