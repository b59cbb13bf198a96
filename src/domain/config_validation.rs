//! Configuration validation.
//!
//! Validates every section before any code is fetched, so a bad window or
//! threshold aborts the run instead of producing garbage per ticker.

use crate::domain::error::TrendscanError;
use crate::domain::params::{EngineParams, read_count};
use crate::domain::ranking::SortKey;
use crate::ports::config_port::ConfigPort;
use crate::ports::report_port::ReportFormat;
use chrono::NaiveDate;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn validate_config(config: &dyn ConfigPort) -> Result<EngineParams, TrendscanError> {
    validate_data_config(config)?;
    validate_screen_config(config)?;
    validate_cache_config(config)?;
    EngineParams::from_config(config)
}

pub fn validate_data_config(config: &dyn ConfigPort) -> Result<(), TrendscanError> {
    let source = config
        .get_string("data", "source")
        .unwrap_or_else(|| "csv".to_string());
    match source.trim().to_lowercase().as_str() {
        "csv" => require(config, "data", "csv_dir"),
        "sqlite" => require(config, "sqlite", "path"),
        other => Err(TrendscanError::config_invalid(
            "data",
            "source",
            format!("unknown data source '{}' (expected csv or sqlite)", other),
        )),
    }
}

pub fn validate_screen_config(config: &dyn ConfigPort) -> Result<(), TrendscanError> {
    require(config, "screen", "exchange")?;
    validate_codes(config)?;
    validate_screen_options(config)
}

/// Everything in `[screen]` except the universe and exchange, which the
/// command line may supply instead.
pub fn validate_screen_options(config: &dyn ConfigPort) -> Result<(), TrendscanError> {
    validate_dates(config)?;

    if read_count(config, "screen", "lookback_days", 1)? == 0 {
        return Err(TrendscanError::config_invalid(
            "screen",
            "lookback_days",
            "lookback_days must be at least 1",
        ));
    }
    if read_count(config, "screen", "workers", 1)? == 0 {
        return Err(TrendscanError::config_invalid(
            "screen",
            "workers",
            "workers must be at least 1",
        ));
    }
    if let Some(raw) = config.get_string("screen", "sort_by") {
        raw.parse::<SortKey>()
            .map_err(|reason| TrendscanError::config_invalid("screen", "sort_by", reason))?;
    }
    if let Some(raw) = config.get_string("screen", "format") {
        raw.parse::<ReportFormat>()
            .map_err(|reason| TrendscanError::config_invalid("screen", "format", reason))?;
    }
    Ok(())
}

pub fn validate_cache_config(config: &dyn ConfigPort) -> Result<(), TrendscanError> {
    read_count(config, "cache", "ttl_secs", 0).map(|_| ())
}

fn validate_codes(config: &dyn ConfigPort) -> Result<(), TrendscanError> {
    if config.has_value("screen", "codes") || config.has_value("screen", "universe_file") {
        Ok(())
    } else {
        Err(TrendscanError::ConfigMissing {
            section: "screen".to_string(),
            key: "codes".to_string(),
        })
    }
}

fn validate_dates(config: &dyn ConfigPort) -> Result<(), TrendscanError> {
    let start = parse_optional_date(config, "start_date")?;
    let end = parse_optional_date(config, "end_date")?;

    if let (Some(start), Some(end)) = (start, end) {
        if start >= end {
            return Err(TrendscanError::config_invalid(
                "screen",
                "start_date",
                "start_date must be before end_date",
            ));
        }
    }
    Ok(())
}

pub fn parse_optional_date(
    config: &dyn ConfigPort,
    field: &str,
) -> Result<Option<NaiveDate>, TrendscanError> {
    match config
        .get_string("screen", field)
        .filter(|s| !s.trim().is_empty())
    {
        None => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
            .map(Some)
            .map_err(|_| {
                TrendscanError::config_invalid(
                    "screen",
                    field,
                    format!("invalid {} format, expected YYYY-MM-DD", field),
                )
            }),
    }
}

fn require(config: &dyn ConfigPort, section: &str, key: &str) -> Result<(), TrendscanError> {
    if config.has_value(section, key) {
        Ok(())
    } else {
        Err(TrendscanError::ConfigMissing {
            section: section.to_string(),
            key: key.to_string(),
        })
    }
}
