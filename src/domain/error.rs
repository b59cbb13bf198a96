//! Domain error types.

use crate::domain::universe::UniverseError;

/// Top-level error type for trendscan.
#[derive(Debug, thiserror::Error)]
pub enum TrendscanError {
    #[error("database error: {reason}")]
    Database { reason: String },

    #[error("database query error: {reason}")]
    DatabaseQuery { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    Universe(#[from] UniverseError),

    #[error("invalid price series for {code}: {source}")]
    InvalidSeries {
        code: String,
        #[source]
        source: SeriesError,
    },

    #[error("report error: {reason}")]
    Report { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl TrendscanError {
    pub fn config_invalid(section: &str, key: &str, reason: impl Into<String>) -> Self {
        TrendscanError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}

/// Violations of the price-series invariants.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SeriesError {
    #[error("close on {date} is not a finite non-negative number")]
    InvalidClose { date: chrono::NaiveDate },

    #[error("dates out of order: {previous} is followed by {next}")]
    OutOfOrder {
        previous: chrono::NaiveDate,
        next: chrono::NaiveDate,
    },

    #[error("duplicate date {0}")]
    DuplicateDate(chrono::NaiveDate),
}

impl From<&TrendscanError> for std::process::ExitCode {
    fn from(err: &TrendscanError) -> Self {
        let code: u8 = match err {
            TrendscanError::Io(_) => 1,
            TrendscanError::ConfigParse { .. }
            | TrendscanError::ConfigMissing { .. }
            | TrendscanError::ConfigInvalid { .. }
            | TrendscanError::Universe(_) => 2,
            TrendscanError::Database { .. } | TrendscanError::DatabaseQuery { .. } => 3,
            TrendscanError::InvalidSeries { .. } => 5,
            TrendscanError::Report { .. } => 6,
        };
        std::process::ExitCode::from(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn config_invalid_display() {
        let err = TrendscanError::config_invalid("indicators", "ema_fast", "must be positive");
        assert_eq!(
            err.to_string(),
            "invalid config value [indicators] ema_fast: must be positive"
        );
    }

    #[test]
    fn invalid_series_display_includes_source() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let err = TrendscanError::InvalidSeries {
            code: "INFY".into(),
            source: SeriesError::DuplicateDate(date),
        };
        assert_eq!(
            err.to_string(),
            "invalid price series for INFY: duplicate date 2024-03-01"
        );
    }

    #[test]
    fn universe_error_converts() {
        let err: TrendscanError = UniverseError::EmptyToken.into();
        assert!(matches!(err, TrendscanError::Universe(UniverseError::EmptyToken)));
    }
}
