//! One CSV row per snapshot, for spreadsheets and downstream scripts.
//!
//! Excluded tickers are not part of the CSV body; they are logged instead.

use crate::domain::error::TrendscanError;
use crate::domain::screen::ScreenReport;
use crate::domain::snapshot::IndicatorSnapshot;
use crate::ports::report_port::ReportPort;

pub struct CsvReportAdapter;

const HEADERS: [&str; 18] = [
    "ticker",
    "as_of",
    "close",
    "change_pct",
    "ema_fast",
    "ema_slow",
    "ema_long",
    "rsi",
    "macd",
    "macd_signal",
    "macd_diff",
    "sentiment",
    "target1",
    "target2",
    "target3",
    "stop_loss",
    "gann_level",
    "breakout",
];

fn report_error(e: impl std::fmt::Display) -> TrendscanError {
    TrendscanError::Report {
        reason: e.to_string(),
    }
}

fn number(value: f64) -> String {
    format!("{:.2}", value)
}

fn optional(value: Option<f64>) -> String {
    value.map(number).unwrap_or_default()
}

fn record(s: &IndicatorSnapshot) -> [String; 18] {
    [
        s.ticker.clone(),
        s.as_of.to_string(),
        number(s.close),
        optional(s.change_pct),
        number(s.ema_fast),
        number(s.ema_slow),
        optional(s.ema_long),
        number(s.rsi),
        number(s.macd),
        number(s.macd_signal),
        number(s.macd_diff),
        s.sentiment.to_string(),
        number(s.target1),
        number(s.target2),
        number(s.target3),
        number(s.stop_loss),
        optional(s.gann_level),
        s.breakout.map(|b| b.to_string()).unwrap_or_default(),
    ]
}

impl ReportPort for CsvReportAdapter {
    fn render(&self, report: &ScreenReport) -> Result<String, TrendscanError> {
        let mut wtr = ::csv::Writer::from_writer(Vec::new());
        wtr.write_record(HEADERS).map_err(report_error)?;
        for snapshot in &report.snapshots {
            wtr.write_record(record(snapshot)).map_err(report_error)?;
        }
        for excluded in &report.excluded {
            tracing::info!(code = %excluded.code, reason = %excluded.reason, "excluded from csv output");
        }

        let bytes = wtr.into_inner().map_err(report_error)?;
        String::from_utf8(bytes).map_err(report_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::report::fixtures::{no_data, report, snapshot};
    use crate::domain::snapshot::Sentiment;

    #[test]
    fn header_and_one_row_per_snapshot() {
        let r = report(
            vec![
                snapshot("INFY", Sentiment::Bullish),
                snapshot("TCS", Sentiment::Neutral),
            ],
            vec![no_data("XYZ")],
        );
        let out = CsvReportAdapter.render(&r).unwrap();
        let lines: Vec<&str> = out.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], HEADERS.join(","));
        assert_eq!(
            lines[1],
            "INFY,2024-06-28,1520.50,1.25,1498.12,1450.00,,61.40,12.30,10.10,2.20,Bullish,1550.91,1581.32,1611.73,1474.89,,"
        );
        assert!(lines[2].starts_with("TCS,"));
        assert!(!out.contains("XYZ"));
    }

    #[test]
    fn optional_columns_are_filled_when_present() {
        let mut s = snapshot("INFY", Sentiment::Bullish);
        s.gann_level = Some(1515.25);
        s.breakout = Some(false);
        let out = CsvReportAdapter.render(&report(vec![s], vec![])).unwrap();
        assert!(out.lines().nth(1).unwrap().ends_with(",1515.25,false"));
    }

    #[test]
    fn empty_report_still_has_header() {
        let out = CsvReportAdapter.render(&report(vec![], vec![])).unwrap();
        assert_eq!(out, format!("{}\n", HEADERS.join(",")));
    }
}
