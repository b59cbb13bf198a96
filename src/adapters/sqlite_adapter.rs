//! SQLite data adapter over an `ohlcv` table.

use crate::domain::error::TrendscanError;
use crate::domain::price::{PricePoint, PriceSeries};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::params;

const DATE_FORMAT: &str = "%Y-%m-%d";

pub struct SqliteAdapter {
    pool: Pool<SqliteConnectionManager>,
}

fn pool_error(e: r2d2::Error) -> TrendscanError {
    TrendscanError::Database {
        reason: e.to_string(),
    }
}

fn query_error(e: rusqlite::Error) -> TrendscanError {
    TrendscanError::DatabaseQuery {
        reason: e.to_string(),
    }
}

impl SqliteAdapter {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, TrendscanError> {
        let db_path =
            config
                .get_string("sqlite", "path")
                .ok_or_else(|| TrendscanError::ConfigMissing {
                    section: "sqlite".into(),
                    key: "path".into(),
                })?;

        let pool_size = config.get_int("sqlite", "pool_size", 4).max(1) as u32;

        let manager = SqliteConnectionManager::file(&db_path);
        let pool = Pool::builder()
            .max_size(pool_size)
            .build(manager)
            .map_err(pool_error)?;

        tracing::debug!(path = %db_path, pool_size, "opened sqlite data source");
        Ok(Self { pool })
    }

    pub fn in_memory() -> Result<Self, TrendscanError> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)
            .map_err(pool_error)?;

        Ok(Self { pool })
    }

    fn conn(&self) -> Result<PooledConnection<SqliteConnectionManager>, TrendscanError> {
        self.pool.get().map_err(pool_error)
    }

    pub fn initialize_schema(&self) -> Result<(), TrendscanError> {
        self.conn()?
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS ohlcv (
                    code TEXT NOT NULL,
                    exchange TEXT NOT NULL,
                    date TEXT NOT NULL,
                    open REAL,
                    high REAL,
                    low REAL,
                    close REAL,
                    volume INTEGER,
                    PRIMARY KEY (code, exchange, date)
                );
                CREATE INDEX IF NOT EXISTS idx_ohlcv_code_exchange ON ohlcv(code, exchange);",
            )
            .map_err(query_error)
    }

    pub fn insert_points(
        &self,
        code: &str,
        exchange: &str,
        points: &[PricePoint],
    ) -> Result<(), TrendscanError> {
        let mut conn = self.conn()?;
        let tx = conn.transaction().map_err(query_error)?;

        for point in points {
            tx.execute(
                "INSERT OR REPLACE INTO ohlcv (code, exchange, date, open, high, low, close, volume)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    code,
                    exchange,
                    point.date.format(DATE_FORMAT).to_string(),
                    point.open,
                    point.high,
                    point.low,
                    point.close,
                    point.volume
                ],
            )
            .map_err(query_error)?;
        }

        tx.commit().map_err(query_error)
    }
}

impl DataPort for SqliteAdapter {
    fn fetch_series(
        &self,
        code: &str,
        exchange: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<PriceSeries, TrendscanError> {
        let conn = self.conn()?;

        // NULL closes are dropped here, before the series is built.
        let query = "SELECT date, open, high, low, close, volume
                     FROM ohlcv
                     WHERE code = ?1 AND exchange = ?2 AND date >= ?3 AND date <= ?4
                       AND close IS NOT NULL
                     ORDER BY date ASC";

        let mut stmt = conn.prepare(query).map_err(query_error)?;

        let rows = stmt
            .query_map(
                params![
                    code,
                    exchange,
                    start_date.format(DATE_FORMAT).to_string(),
                    end_date.format(DATE_FORMAT).to_string()
                ],
                |row| {
                    let date_str: String = row.get(0)?;
                    let date = NaiveDate::parse_from_str(&date_str, DATE_FORMAT).map_err(|e| {
                        rusqlite::Error::FromSqlConversionFailure(
                            date_str.len(),
                            rusqlite::types::Type::Text,
                            Box::new(e),
                        )
                    })?;
                    let close: f64 = row.get(4)?;
                    Ok(PricePoint {
                        date,
                        open: row.get::<_, Option<f64>>(1)?.unwrap_or(close),
                        high: row.get::<_, Option<f64>>(2)?.unwrap_or(close),
                        low: row.get::<_, Option<f64>>(3)?.unwrap_or(close),
                        close,
                        volume: row.get::<_, Option<i64>>(5)?.unwrap_or(0),
                    })
                },
            )
            .map_err(query_error)?;

        let mut points = Vec::new();
        for row in rows {
            points.push(row.map_err(query_error)?);
        }

        PriceSeries::new(code, points).map_err(|source| TrendscanError::InvalidSeries {
            code: code.to_string(),
            source,
        })
    }

    fn list_symbols(&self, exchange: &str) -> Result<Vec<String>, TrendscanError> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare("SELECT DISTINCT code FROM ohlcv WHERE exchange = ?1 ORDER BY code")
            .map_err(query_error)?;

        let rows = stmt
            .query_map(params![exchange], |row| row.get(0))
            .map_err(query_error)?;

        let mut symbols = Vec::new();
        for row in rows {
            symbols.push(row.map_err(query_error)?);
        }
        Ok(symbols)
    }

    fn get_data_range(
        &self,
        code: &str,
        exchange: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, TrendscanError> {
        let conn = self.conn()?;

        let query =
            "SELECT MIN(date), MAX(date), COUNT(*) FROM ohlcv WHERE code = ?1 AND exchange = ?2";

        let result: (Option<String>, Option<String>, i64) = conn
            .query_row(query, params![code, exchange], |row| {
                Ok((row.get(0)?, row.get(1)?, row.get(2)?))
            })
            .map_err(query_error)?;

        match result {
            (Some(min_str), Some(max_str), count) if count > 0 => {
                let parse = |s: &str| {
                    NaiveDate::parse_from_str(s, DATE_FORMAT).map_err(|e| TrendscanError::Database {
                        reason: e.to_string(),
                    })
                };
                Ok(Some((parse(&min_str)?, parse(&max_str)?, count as usize)))
            }
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EmptyConfig;

    impl ConfigPort for EmptyConfig {
        fn get_string(&self, _section: &str, _key: &str) -> Option<String> {
            None
        }
        fn get_int(&self, _section: &str, _key: &str, default: i64) -> i64 {
            default
        }
        fn get_double(&self, _section: &str, _key: &str, default: f64) -> f64 {
            default
        }
        fn get_bool(&self, _section: &str, _key: &str, default: bool) -> bool {
            default
        }
    }

    fn point(day: u32, close: f64) -> PricePoint {
        PricePoint {
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            open: close - 0.5,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 1000,
        }
    }

    fn seeded() -> SqliteAdapter {
        let adapter = SqliteAdapter::in_memory().unwrap();
        adapter.initialize_schema().unwrap();
        adapter
            .insert_points("INFY", "NSE", &[point(1, 100.5), point(2, 101.5), point(5, 102.5)])
            .unwrap();
        adapter
            .insert_points("TCS", "NSE", &[point(1, 3500.0)])
            .unwrap();
        adapter
    }

    #[test]
    fn from_config_missing_path() {
        match SqliteAdapter::from_config(&EmptyConfig) {
            Err(TrendscanError::ConfigMissing { section, key }) => {
                assert_eq!(section, "sqlite");
                assert_eq!(key, "path");
            }
            Err(other) => panic!("expected ConfigMissing, got: {other}"),
            Ok(_) => panic!("expected error, got Ok"),
        }
    }

    #[test]
    fn fetch_series_returns_points_in_range() {
        let adapter = seeded();
        let series = adapter
            .fetch_series(
                "INFY",
                "NSE",
                NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            )
            .unwrap();

        assert_eq!(series.ticker(), "INFY");
        assert_eq!(series.closes(), vec![100.5, 101.5]);
    }

    #[test]
    fn fetch_series_drops_null_closes() {
        let adapter = seeded();
        adapter
            .conn()
            .unwrap()
            .execute(
                "INSERT INTO ohlcv (code, exchange, date, open, high, low, close, volume)
                 VALUES ('INFY', 'NSE', '2024-01-03', 1.0, 1.0, 1.0, NULL, 0)",
                [],
            )
            .unwrap();

        let series = adapter
            .fetch_series(
                "INFY",
                "NSE",
                NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
            )
            .unwrap();
        assert_eq!(series.len(), 3);
    }

    #[test]
    fn fetch_series_unknown_code_is_empty() {
        let adapter = seeded();
        let series = adapter
            .fetch_series(
                "XYZ",
                "NSE",
                NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
            )
            .unwrap();
        assert!(series.is_empty());
    }

    #[test]
    fn list_symbols_sorted() {
        assert_eq!(seeded().list_symbols("NSE").unwrap(), vec!["INFY", "TCS"]);
    }

    #[test]
    fn get_data_range() {
        let (min, max, count) = seeded().get_data_range("INFY", "NSE").unwrap().unwrap();
        assert_eq!(min, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(max, NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());
        assert_eq!(count, 3);
    }

    #[test]
    fn get_data_range_no_data() {
        assert!(seeded().get_data_range("XYZ", "NSE").unwrap().is_none());
    }
}
