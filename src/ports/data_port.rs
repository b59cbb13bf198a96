//! Market-data port trait.
//!
//! Implementations return an empty series when a code has no rows in the
//! requested range; errors are reserved for failures of the source itself.

use crate::domain::error::TrendscanError;
use crate::domain::price::PriceSeries;
use chrono::NaiveDate;

pub trait DataPort {
    fn fetch_series(
        &self,
        code: &str,
        exchange: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<PriceSeries, TrendscanError>;

    fn list_symbols(&self, exchange: &str) -> Result<Vec<String>, TrendscanError>;

    fn get_data_range(
        &self,
        code: &str,
        exchange: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, TrendscanError>;
}

impl<P: DataPort + ?Sized> DataPort for Box<P> {
    fn fetch_series(
        &self,
        code: &str,
        exchange: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<PriceSeries, TrendscanError> {
        (**self).fetch_series(code, exchange, start_date, end_date)
    }

    fn list_symbols(&self, exchange: &str) -> Result<Vec<String>, TrendscanError> {
        (**self).list_symbols(exchange)
    }

    fn get_data_range(
        &self,
        code: &str,
        exchange: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, TrendscanError> {
        (**self).get_data_range(code, exchange)
    }
}
