//! Time-bounded memoization in front of any [`DataPort`].
//!
//! Only successful `fetch_series` results are cached, keyed by
//! `(code, exchange, start, end)`. Errors always go back to the source so a
//! transient failure is retried on the next request. Listing and range
//! queries pass straight through.

use crate::domain::error::TrendscanError;
use crate::domain::price::PriceSeries;
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use dashmap::DashMap;
use std::time::{Duration, Instant};

pub const DEFAULT_TTL: Duration = Duration::from_secs(3600);

type SeriesKey = (String, String, NaiveDate, NaiveDate);

struct CacheEntry {
    series: PriceSeries,
    /// `None` when the TTL reaches past what `Instant` can represent.
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|at| at > now)
    }
}

pub struct CachedDataPort<P> {
    inner: P,
    entries: DashMap<SeriesKey, CacheEntry>,
    ttl: Duration,
}

impl<P: DataPort> CachedDataPort<P> {
    pub fn new(inner: P, ttl: Duration) -> Self {
        Self {
            inner,
            entries: DashMap::new(),
            ttl,
        }
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Number of stored entries, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops every expired entry.
    pub fn cleanup(&self) {
        let now = Instant::now();
        self.entries.retain(|_, entry| entry.is_live(now));
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    fn lookup(&self, key: &SeriesKey) -> Option<PriceSeries> {
        let entry = self.entries.get(key)?;
        if entry.is_live(Instant::now()) {
            Some(entry.series.clone())
        } else {
            drop(entry);
            self.entries.remove(key);
            None
        }
    }
}

impl<P: DataPort> DataPort for CachedDataPort<P> {
    fn fetch_series(
        &self,
        code: &str,
        exchange: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<PriceSeries, TrendscanError> {
        let key = (code.to_string(), exchange.to_string(), start_date, end_date);

        if let Some(series) = self.lookup(&key) {
            tracing::trace!(code, exchange, "cache hit");
            return Ok(series);
        }

        let series = self.inner.fetch_series(code, exchange, start_date, end_date)?;
        self.entries.insert(
            key,
            CacheEntry {
                series: series.clone(),
                expires_at: Instant::now().checked_add(self.ttl),
            },
        );
        Ok(series)
    }

    fn list_symbols(&self, exchange: &str) -> Result<Vec<String>, TrendscanError> {
        self.inner.list_symbols(exchange)
    }

    fn get_data_range(
        &self,
        code: &str,
        exchange: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, TrendscanError> {
        self.inner.get_data_range(code, exchange)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::price::PricePoint;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingPort {
        calls: AtomicUsize,
        fail: bool,
    }

    impl DataPort for CountingPort {
        fn fetch_series(
            &self,
            code: &str,
            _exchange: &str,
            start_date: NaiveDate,
            _end_date: NaiveDate,
        ) -> Result<PriceSeries, TrendscanError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(TrendscanError::Database {
                    reason: "connection refused".into(),
                });
            }
            let point = PricePoint {
                date: start_date,
                open: 1.0,
                high: 1.0,
                low: 1.0,
                close: 1.0,
                volume: 0,
            };
            Ok(PriceSeries::new(code, vec![point]).unwrap())
        }

        fn list_symbols(&self, _exchange: &str) -> Result<Vec<String>, TrendscanError> {
            Ok(vec!["INFY".into()])
        }

        fn get_data_range(
            &self,
            _code: &str,
            _exchange: &str,
        ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, TrendscanError> {
            Ok(None)
        }
    }

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }

    #[test]
    fn second_fetch_is_served_from_cache() {
        let cached = CachedDataPort::new(CountingPort::default(), DEFAULT_TTL);

        let first = cached.fetch_series("INFY", "NSE", d(1), d(20)).unwrap();
        let second = cached.fetch_series("INFY", "NSE", d(1), d(20)).unwrap();

        assert_eq!(first, second);
        assert_eq!(cached.inner.calls.load(Ordering::SeqCst), 1);
        assert_eq!(cached.len(), 1);
    }

    #[test]
    fn key_includes_window_and_exchange() {
        let cached = CachedDataPort::new(CountingPort::default(), DEFAULT_TTL);

        cached.fetch_series("INFY", "NSE", d(1), d(20)).unwrap();
        cached.fetch_series("INFY", "NSE", d(2), d(20)).unwrap();
        cached.fetch_series("INFY", "BSE", d(1), d(20)).unwrap();
        cached.fetch_series("TCS", "NSE", d(1), d(20)).unwrap();

        assert_eq!(cached.inner.calls.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn zero_ttl_always_refetches() {
        let cached = CachedDataPort::new(CountingPort::default(), Duration::ZERO);

        cached.fetch_series("INFY", "NSE", d(1), d(20)).unwrap();
        cached.fetch_series("INFY", "NSE", d(1), d(20)).unwrap();

        assert_eq!(cached.inner.calls.load(Ordering::SeqCst), 2);
        cached.cleanup();
        assert!(cached.is_empty());
    }

    #[test]
    fn unbounded_ttl_never_expires() {
        let cached = CachedDataPort::new(CountingPort::default(), Duration::from_secs(u64::MAX));

        cached.fetch_series("INFY", "NSE", d(1), d(20)).unwrap();
        cached.fetch_series("INFY", "NSE", d(1), d(20)).unwrap();
        cached.cleanup();

        assert_eq!(cached.inner.calls.load(Ordering::SeqCst), 1);
        assert_eq!(cached.len(), 1);
    }

    #[test]
    fn errors_are_not_cached() {
        let port = CountingPort {
            fail: true,
            ..Default::default()
        };
        let cached = CachedDataPort::new(port, DEFAULT_TTL);

        assert!(cached.fetch_series("INFY", "NSE", d(1), d(20)).is_err());
        assert!(cached.fetch_series("INFY", "NSE", d(1), d(20)).is_err());

        assert_eq!(cached.inner.calls.load(Ordering::SeqCst), 2);
        assert!(cached.is_empty());
    }

    #[test]
    fn clear_forces_refetch() {
        let cached = CachedDataPort::new(CountingPort::default(), DEFAULT_TTL);
        cached.fetch_series("INFY", "NSE", d(1), d(20)).unwrap();
        cached.clear();
        cached.fetch_series("INFY", "NSE", d(1), d(20)).unwrap();
        assert_eq!(cached.inner.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn passthrough_queries() {
        let cached = CachedDataPort::new(CountingPort::default(), DEFAULT_TTL);
        assert_eq!(cached.list_symbols("NSE").unwrap(), vec!["INFY"]);
        assert_eq!(cached.get_data_range("INFY", "NSE").unwrap(), None);
        assert_eq!(cached.ttl(), DEFAULT_TTL);
    }
}
