//! Fixed-width text table for terminals.

use crate::domain::error::TrendscanError;
use crate::domain::screen::ScreenReport;
use crate::domain::snapshot::{IndicatorSnapshot, Sentiment};
use crate::ports::report_port::ReportPort;
use std::fmt::Write;

pub struct TableReportAdapter;

struct Column {
    header: String,
    numeric: bool,
    cell: Box<dyn Fn(&IndicatorSnapshot) -> String>,
}

impl Column {
    fn text(header: &str, cell: impl Fn(&IndicatorSnapshot) -> String + 'static) -> Self {
        Self {
            header: header.to_string(),
            numeric: false,
            cell: Box::new(cell),
        }
    }

    fn number(header: impl Into<String>, value: impl Fn(&IndicatorSnapshot) -> f64 + 'static) -> Self {
        Self {
            header: header.into(),
            numeric: true,
            cell: Box::new(move |s: &IndicatorSnapshot| format!("{:.2}", value(s))),
        }
    }
}

fn columns(report: &ScreenReport) -> Vec<Column> {
    let mut cols = vec![
        Column::text("Ticker", |s| s.ticker.clone()),
        Column::number("Close", |s| s.close),
        Column {
            header: "Chg%".to_string(),
            numeric: true,
            cell: Box::new(|s: &IndicatorSnapshot| match s.change_pct {
                Some(pct) => format!("{:+.2}", pct),
                None => "-".to_string(),
            }),
        },
        Column::number(format!("EMA{}", report.ema_fast_span), |s| s.ema_fast),
        Column::number(format!("EMA{}", report.ema_slow_span), |s| s.ema_slow),
    ];

    if let Some(span) = report.ema_long_span {
        cols.push(Column {
            header: format!("EMA{}", span),
            numeric: true,
            cell: Box::new(|s: &IndicatorSnapshot| optional_number(s.ema_long)),
        });
    }

    cols.extend([
        Column::number("RSI", |s| s.rsi),
        Column::number("MACD", |s| s.macd),
        Column::number("Signal", |s| s.macd_signal),
        Column::number("Diff", |s| s.macd_diff),
        Column::text("Sentiment", |s| s.sentiment.to_string()),
        Column::number("T1", |s| s.target1),
        Column::number("T2", |s| s.target2),
        Column::number("T3", |s| s.target3),
        Column::number("SL", |s| s.stop_loss),
    ]);

    if report.snapshots.iter().any(|s| s.gann_level.is_some()) {
        cols.push(Column {
            header: "Gann".to_string(),
            numeric: true,
            cell: Box::new(|s: &IndicatorSnapshot| optional_number(s.gann_level)),
        });
    }
    if report.snapshots.iter().any(|s| s.breakout.is_some()) {
        cols.push(Column::text("Breakout", |s| match s.breakout {
            Some(true) => "yes".to_string(),
            Some(false) => "no".to_string(),
            None => "-".to_string(),
        }));
    }

    cols
}

fn optional_number(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{:.2}", v))
}

fn render_table(out: &mut String, report: &ScreenReport) -> std::fmt::Result {
    let cols = columns(report);
    let rows: Vec<Vec<String>> = report
        .snapshots
        .iter()
        .map(|s| cols.iter().map(|c| (c.cell)(s)).collect())
        .collect();

    let widths: Vec<usize> = cols
        .iter()
        .enumerate()
        .map(|(i, c)| {
            rows.iter()
                .map(|r| r[i].len())
                .chain(std::iter::once(c.header.len()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let header: Vec<String> = cols
        .iter()
        .zip(&widths)
        .map(|(c, &w)| pad(&c.header, w, c.numeric))
        .collect();
    writeln!(out, "{}", header.join("  ").trim_end())?;

    let rule_len = widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1);
    writeln!(out, "{}", "-".repeat(rule_len))?;

    for row in &rows {
        let line: Vec<String> = row
            .iter()
            .zip(cols.iter().zip(&widths))
            .map(|(cell, (c, &w))| pad(cell, w, c.numeric))
            .collect();
        writeln!(out, "{}", line.join("  ").trim_end())?;
    }
    Ok(())
}

fn pad(value: &str, width: usize, right_align: bool) -> String {
    if right_align {
        format!("{:>width$}", value)
    } else {
        format!("{:<width$}", value)
    }
}

fn render(report: &ScreenReport) -> Result<String, std::fmt::Error> {
    let mut out = String::new();
    let order = if report.descending { "desc" } else { "asc" };
    writeln!(
        out,
        "{} momentum screen, {} to {} (sorted by {} {})",
        report.exchange, report.start_date, report.end_date, report.sort_key, order
    )?;
    writeln!(out)?;

    if report.snapshots.is_empty() {
        writeln!(out, "warning: no tickers could be screened")?;
    } else {
        render_table(&mut out, report)?;
    }

    writeln!(out)?;
    writeln!(
        out,
        "Bullish: {}  Bearish: {}  Neutral: {}  Excluded: {}",
        report.count(Sentiment::Bullish),
        report.count(Sentiment::Bearish),
        report.count(Sentiment::Neutral),
        report.excluded.len()
    )?;

    if !report.excluded.is_empty() {
        writeln!(out)?;
        writeln!(out, "Excluded:")?;
        let width = report
            .excluded
            .iter()
            .map(|e| e.code.len())
            .max()
            .unwrap_or(0);
        for excluded in &report.excluded {
            writeln!(out, "  {:<width$}  {}", excluded.code, excluded.reason)?;
        }
    }

    Ok(out)
}

impl ReportPort for TableReportAdapter {
    fn render(&self, report: &ScreenReport) -> Result<String, TrendscanError> {
        render(report).map_err(|e| TrendscanError::Report {
            reason: e.to_string(),
        })
    }
}
