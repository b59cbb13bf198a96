//! CSV directory data adapter.
//!
//! One file per code: `{CODE}_{EXCHANGE}.csv` with the header
//! `date,open,high,low,close,volume`. Rows with a blank or non-numeric close
//! are dropped. A missing file means the code is unknown and yields an empty
//! series.

use crate::domain::error::TrendscanError;
use crate::domain::price::{PricePoint, PriceSeries};
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::str::FromStr;

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, code: &str, exchange: &str) -> PathBuf {
        self.base_path.join(format!("{}_{}.csv", code, exchange))
    }

    /// All parseable rows of a code's file, sorted by date. `None` when the
    /// file does not exist.
    fn read_points(&self, code: &str, exchange: &str) -> Result<Option<Vec<PricePoint>>, TrendscanError> {
        let path = self.csv_path(code, exchange);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(TrendscanError::Database {
                    reason: format!("failed to read {}: {}", path.display(), e),
                });
            }
        };

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut points = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| TrendscanError::Database {
                reason: format!("CSV parse error in {}: {}", path.display(), e),
            })?;

            let date_str = record.get(0).ok_or_else(|| TrendscanError::Database {
                reason: "missing date column".into(),
            })?;
            let date = NaiveDate::parse_from_str(date_str.trim(), "%Y-%m-%d").map_err(|e| {
                TrendscanError::Database {
                    reason: format!("invalid date '{}': {}", date_str, e),
                }
            })?;

            let Some(close) = optional_field::<f64>(&record, 4).filter(|c| c.is_finite()) else {
                tracing::debug!(code, %date, "dropping row without close");
                continue;
            };

            points.push(PricePoint {
                date,
                open: optional_field(&record, 1).unwrap_or(close),
                high: optional_field(&record, 2).unwrap_or(close),
                low: optional_field(&record, 3).unwrap_or(close),
                close,
                volume: optional_field::<f64>(&record, 5)
                    .map(|v| v as i64)
                    .unwrap_or(0),
            });
        }

        points.sort_by_key(|p| p.date);
        Ok(Some(points))
    }
}

fn optional_field<T: FromStr>(record: &csv::StringRecord, idx: usize) -> Option<T> {
    record
        .get(idx)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse().ok())
}

impl DataPort for CsvAdapter {
    fn fetch_series(
        &self,
        code: &str,
        exchange: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<PriceSeries, TrendscanError> {
        let Some(points) = self.read_points(code, exchange)? else {
            return Ok(PriceSeries::empty(code));
        };

        let points: Vec<PricePoint> = points
            .into_iter()
            .filter(|p| p.date >= start_date && p.date <= end_date)
            .collect();

        PriceSeries::new(code, points).map_err(|source| TrendscanError::InvalidSeries {
            code: code.to_string(),
            source,
        })
    }

    fn list_symbols(&self, exchange: &str) -> Result<Vec<String>, TrendscanError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| TrendscanError::Database {
            reason: format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ),
        })?;

        let suffix = format!("_{}.csv", exchange);
        let mut symbols = Vec::new();

        for entry in entries {
            let entry = entry.map_err(|e| TrendscanError::Database {
                reason: format!("directory entry error: {}", e),
            })?;

            let name = entry.file_name();
            let name_str = name.to_string_lossy();

            if let Some(code) = name_str.strip_suffix(&suffix) {
                symbols.push(code.to_string());
            }
        }

        symbols.sort();
        Ok(symbols)
    }

    fn get_data_range(
        &self,
        code: &str,
        exchange: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, TrendscanError> {
        let points = self.read_points(code, exchange)?.unwrap_or_default();
        match (points.first(), points.last()) {
            (Some(first), Some(last)) => Ok(Some((first.date, last.date, points.len()))),
            _ => Ok(None),
        }
    }
}
