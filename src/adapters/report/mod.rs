//! Report adapters implementing [`ReportPort`].

pub mod csv;
pub mod json;
pub mod table;

use crate::ports::report_port::{ReportFormat, ReportPort};

pub use self::csv::CsvReportAdapter;
pub use self::json::JsonReportAdapter;
pub use self::table::TableReportAdapter;

pub fn adapter_for(format: ReportFormat) -> Box<dyn ReportPort> {
    match format {
        ReportFormat::Table => Box::new(TableReportAdapter),
        ReportFormat::Csv => Box::new(CsvReportAdapter),
        ReportFormat::Json => Box::new(JsonReportAdapter),
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::domain::ranking::SortKey;
    use crate::domain::screen::{ExcludedTicker, ExclusionReason, ScreenReport};
    use crate::domain::snapshot::{IndicatorSnapshot, Sentiment};
    use chrono::NaiveDate;

    pub fn snapshot(ticker: &str, sentiment: Sentiment) -> IndicatorSnapshot {
        IndicatorSnapshot {
            ticker: ticker.to_string(),
            as_of: NaiveDate::from_ymd_opt(2024, 6, 28).unwrap(),
            close: 1520.5,
            change_pct: Some(1.25),
            ema_fast: 1498.12,
            ema_slow: 1450.0,
            ema_long: None,
            rsi: 61.4,
            macd: 12.3,
            macd_signal: 10.1,
            macd_diff: 2.2,
            sentiment,
            target1: 1550.91,
            target2: 1581.32,
            target3: 1611.73,
            stop_loss: 1474.89,
            gann_level: None,
            breakout: None,
        }
    }

    pub fn report(snapshots: Vec<IndicatorSnapshot>, excluded: Vec<ExcludedTicker>) -> ScreenReport {
        ScreenReport {
            exchange: "NSE".to_string(),
            start_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 6, 28).unwrap(),
            sort_key: SortKey::Rsi,
            descending: true,
            ema_fast_span: 20,
            ema_slow_span: 50,
            ema_long_span: None,
            snapshots,
            excluded,
        }
    }

    pub fn no_data(code: &str) -> ExcludedTicker {
        ExcludedTicker {
            code: code.to_string(),
            reason: ExclusionReason::NoData,
        }
    }
}
