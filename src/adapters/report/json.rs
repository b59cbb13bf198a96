//! Pretty-printed JSON of the whole report, excluded tickers included.

use crate::domain::error::TrendscanError;
use crate::domain::screen::ScreenReport;
use crate::ports::report_port::ReportPort;

pub struct JsonReportAdapter;

impl ReportPort for JsonReportAdapter {
    fn render(&self, report: &ScreenReport) -> Result<String, TrendscanError> {
        let mut json = serde_json::to_string_pretty(report).map_err(|e| TrendscanError::Report {
            reason: e.to_string(),
        })?;
        json.push('\n');
        Ok(json)
    }
}
