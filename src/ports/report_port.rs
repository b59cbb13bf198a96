//! Report generation port trait.

use crate::domain::error::TrendscanError;
use crate::domain::screen::ScreenReport;
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Table,
    Csv,
    Json,
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "table" | "text" => Ok(ReportFormat::Table),
            "csv" => Ok(ReportFormat::Csv),
            "json" => Ok(ReportFormat::Json),
            other => Err(format!(
                "unknown report format '{}' (expected table, csv or json)",
                other
            )),
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ReportFormat::Table => "table",
            ReportFormat::Csv => "csv",
            ReportFormat::Json => "json",
        };
        f.write_str(s)
    }
}

/// Port for presenting a screening run.
pub trait ReportPort {
    fn render(&self, report: &ScreenReport) -> Result<String, TrendscanError>;

    /// Default implementation: renders, then writes to `output_path` or stdout.
    fn write(&self, report: &ScreenReport, output_path: Option<&Path>) -> Result<(), TrendscanError> {
        let content = self.render(report)?;
        match output_path {
            Some(path) => fs::write(path, content)?,
            None => {
                let mut stdout = std::io::stdout().lock();
                stdout.write_all(content.as_bytes())?;
                stdout.flush()?;
            }
        }
        Ok(())
    }
}
