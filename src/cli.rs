//! CLI definition and dispatch.

use chrono::{Days, Local, NaiveDate};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use crate::adapters::cached_data_adapter::{CachedDataPort, DEFAULT_TTL};
use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::report::adapter_for;
use crate::domain::config_validation::{
    parse_optional_date, validate_cache_config, validate_config, validate_data_config,
    validate_screen_options,
};
use crate::domain::engine::IndicatorEngine;
use crate::domain::error::TrendscanError;
use crate::domain::params::{EngineParams, read_count};
use crate::domain::ranking::SortKey;
use crate::domain::screen::{ScreenReport, ScreenWindow, run_screen};
use crate::domain::universe::{Universe, parse_codes, parse_universe_file};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportFormat;

pub const DEFAULT_LOOKBACK_DAYS: usize = 120;

/// Exit status when the run completed but no ticker produced a snapshot.
pub const NO_DATA_EXIT: u8 = 5;

#[derive(Parser, Debug)]
#[command(
    name = "trendscan",
    version,
    about = "Momentum and trend screener for equity universes"
)]
pub struct Cli {
    /// Debug-level diagnostics (TRENDSCAN_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Screen every code in the universe and print the ranked table
    Screen {
        #[arg(short, long)]
        config: PathBuf,
        /// Comma-separated codes, replacing the configured universe
        #[arg(long)]
        codes: Option<String>,
        #[arg(long)]
        exchange: Option<String>,
        /// table, csv or json
        #[arg(short, long)]
        format: Option<ReportFormat>,
        /// rsi, macd_diff, close, change or ticker
        #[arg(long)]
        sort_by: Option<SortKey>,
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(short, long)]
        workers: Option<usize>,
    },
    /// Validate a configuration and show what a screen would run
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// List available symbols on an exchange
    ListSymbols {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        exchange: Option<String>,
    },
    /// Show the stored data range for code(s)
    Info {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        code: Option<String>,
        #[arg(long)]
        exchange: Option<String>,
    },
}

/// Command-line values that take precedence over `[screen]`.
#[derive(Debug, Clone, Default)]
pub struct ScreenOverrides {
    pub codes: Option<String>,
    pub exchange: Option<String>,
    pub format: Option<ReportFormat>,
    pub sort_by: Option<SortKey>,
    pub workers: Option<usize>,
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Screen {
            config,
            codes,
            exchange,
            format,
            sort_by,
            output,
            workers,
        } => {
            let overrides = ScreenOverrides {
                codes,
                exchange,
                format,
                sort_by,
                workers,
            };
            run_screen_command(&config, &overrides, output.as_deref())
        }
        Command::Validate { config } => run_validate(&config),
        Command::ListSymbols { config, exchange } => {
            run_list_symbols(&config, exchange.as_deref())
        }
        Command::Info {
            config,
            code,
            exchange,
        } => run_info(&config, code.as_deref(), exchange.as_deref()),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{e}");
            (&e).into()
        }
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, TrendscanError> {
    tracing::info!(path = %path.display(), "loading config");
    FileConfigAdapter::from_file(path)
}

/// Directory that relative paths in a config file are resolved against.
pub fn config_dir(config_path: &Path) -> Option<&Path> {
    config_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
}

fn resolve_path(base_dir: Option<&Path>, raw: &str) -> PathBuf {
    let path = PathBuf::from(raw.trim());
    match base_dir {
        Some(base) if path.is_relative() => base.join(path),
        _ => path,
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub fn resolve_exchange(
    exchange_override: Option<&str>,
    config: &dyn ConfigPort,
) -> Result<String, TrendscanError> {
    non_blank(exchange_override.map(str::to_string))
        .or_else(|| non_blank(config.get_string("screen", "exchange")))
        .ok_or_else(|| TrendscanError::ConfigMissing {
            section: "screen".into(),
            key: "exchange".into(),
        })
}

/// Codes come from the override, then `[screen] codes`, then
/// `[screen] universe_file`.
pub fn resolve_universe(
    codes_override: Option<&str>,
    exchange: &str,
    config: &dyn ConfigPort,
    base_dir: Option<&Path>,
) -> Result<Universe, TrendscanError> {
    let codes = if let Some(raw) = codes_override {
        parse_codes(raw)?
    } else if let Some(raw) = non_blank(config.get_string("screen", "codes")) {
        parse_codes(&raw)?
    } else if let Some(file) = non_blank(config.get_string("screen", "universe_file")) {
        let path = resolve_path(base_dir, &file);
        let content = fs::read_to_string(&path).map_err(|e| {
            TrendscanError::config_invalid(
                "screen",
                "universe_file",
                format!("cannot read {}: {}", path.display(), e),
            )
        })?;
        parse_universe_file(&content)?
    } else {
        return Err(TrendscanError::ConfigMissing {
            section: "screen".into(),
            key: "codes".into(),
        });
    };

    Ok(Universe::new(codes, exchange)?)
}

/// `end_date` defaults to `today`; `start_date` defaults to `lookback_days`
/// calendar days before the end.
pub fn resolve_window(
    config: &dyn ConfigPort,
    today: NaiveDate,
) -> Result<ScreenWindow, TrendscanError> {
    let end_date = parse_optional_date(config, "end_date")?.unwrap_or(today);
    let start_date = match parse_optional_date(config, "start_date")? {
        Some(date) => date,
        None => {
            let days = read_count(config, "screen", "lookback_days", DEFAULT_LOOKBACK_DAYS)?;
            end_date
                .checked_sub_days(Days::new(days as u64))
                .ok_or_else(|| {
                    TrendscanError::config_invalid(
                        "screen",
                        "lookback_days",
                        "lookback reaches before the supported date range",
                    )
                })?
        }
    };

    if start_date >= end_date {
        return Err(TrendscanError::config_invalid(
            "screen",
            "start_date",
            "start_date must be before end_date",
        ));
    }
    Ok(ScreenWindow {
        start_date,
        end_date,
    })
}

pub fn resolve_workers(
    workers_override: Option<usize>,
    config: &dyn ConfigPort,
) -> Result<usize, TrendscanError> {
    if let Some(workers) = workers_override {
        return Ok(workers.max(1));
    }
    let default = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    read_count(config, "screen", "workers", default).map(|w| w.max(1))
}

/// Sort key and direction. Ticker order defaults to ascending, every other
/// key to descending.
pub fn resolve_sort(
    sort_override: Option<SortKey>,
    config: &dyn ConfigPort,
) -> Result<(SortKey, bool), TrendscanError> {
    let key = match sort_override {
        Some(key) => key,
        None => match non_blank(config.get_string("screen", "sort_by")) {
            Some(raw) => raw
                .parse::<SortKey>()
                .map_err(|reason| TrendscanError::config_invalid("screen", "sort_by", reason))?,
            None => SortKey::Rsi,
        },
    };
    let descending = config.get_bool("screen", "descending", key != SortKey::Ticker);
    Ok((key, descending))
}

pub fn resolve_format(
    format_override: Option<ReportFormat>,
    config: &dyn ConfigPort,
) -> Result<ReportFormat, TrendscanError> {
    match format_override {
        Some(format) => Ok(format),
        None => match non_blank(config.get_string("screen", "format")) {
            Some(raw) => raw
                .parse::<ReportFormat>()
                .map_err(|reason| TrendscanError::config_invalid("screen", "format", reason)),
            None => Ok(ReportFormat::Table),
        },
    }
}

/// Builds the configured market-data source, wrapped in the expiring cache
/// unless `[cache] enabled = false`. One CLI run fetches each code once; the
/// cache pays off for embedders that screen repeatedly through the same port.
pub fn build_data_port(
    config: &dyn ConfigPort,
    base_dir: Option<&Path>,
) -> Result<Box<dyn DataPort + Sync>, TrendscanError> {
    let source = non_blank(config.get_string("data", "source"))
        .unwrap_or_else(|| "csv".to_string())
        .to_lowercase();

    let port: Box<dyn DataPort + Sync> = match source.as_str() {
        "csv" => {
            let dir = non_blank(config.get_string("data", "csv_dir")).ok_or_else(|| {
                TrendscanError::ConfigMissing {
                    section: "data".into(),
                    key: "csv_dir".into(),
                }
            })?;
            let dir = resolve_path(base_dir, &dir);
            tracing::debug!(dir = %dir.display(), "using csv data source");
            Box::new(CsvAdapter::new(dir))
        }
        #[cfg(feature = "sqlite")]
        "sqlite" => Box::new(crate::adapters::sqlite_adapter::SqliteAdapter::from_config(
            config,
        )?),
        #[cfg(not(feature = "sqlite"))]
        "sqlite" => {
            return Err(TrendscanError::config_invalid(
                "data",
                "source",
                "sqlite support was not compiled in",
            ));
        }
        other => {
            return Err(TrendscanError::config_invalid(
                "data",
                "source",
                format!("unknown data source '{}' (expected csv or sqlite)", other),
            ));
        }
    };

    if !config.get_bool("cache", "enabled", true) {
        return Ok(port);
    }
    let ttl = read_count(config, "cache", "ttl_secs", DEFAULT_TTL.as_secs() as usize)?;
    tracing::debug!(ttl_secs = ttl, "caching fetched series");
    Ok(Box::new(CachedDataPort::new(
        port,
        Duration::from_secs(ttl as u64),
    )))
}

/// Validates the screen options and indicator parameters, resolves the
/// universe and window, screens every code and ranks the result.
pub fn run_screen_pipeline(
    config: &dyn ConfigPort,
    data_port: &(dyn DataPort + Sync),
    overrides: &ScreenOverrides,
    base_dir: Option<&Path>,
    today: NaiveDate,
) -> Result<ScreenReport, TrendscanError> {
    validate_screen_options(config)?;
    let engine = IndicatorEngine::new(EngineParams::from_config(config)?)?;

    let exchange = resolve_exchange(overrides.exchange.as_deref(), config)?;
    let universe = resolve_universe(overrides.codes.as_deref(), &exchange, config, base_dir)?;
    let window = resolve_window(config, today)?;
    let workers = resolve_workers(overrides.workers, config)?;
    let (sort_key, descending) = resolve_sort(overrides.sort_by, config)?;

    tracing::info!(
        codes = universe.count(),
        exchange = %universe.exchange,
        start = %window.start_date,
        end = %window.end_date,
        workers,
        "screening universe"
    );

    let result = run_screen(data_port, &engine, &universe, window, workers);
    Ok(ScreenReport::build(
        result, &engine, &universe, window, sort_key, descending,
    ))
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn run_screen_command(
    config_path: &Path,
    overrides: &ScreenOverrides,
    output_path: Option<&Path>,
) -> Result<ExitCode, TrendscanError> {
    let config = load_config(config_path)?;
    validate_data_config(&config)?;
    validate_cache_config(&config)?;
    let format = resolve_format(overrides.format, &config)?;

    let base_dir = config_dir(config_path);
    let data_port = build_data_port(&config, base_dir)?;
    let report = run_screen_pipeline(&config, data_port.as_ref(), overrides, base_dir, today())?;

    adapter_for(format).write(&report, output_path)?;
    if let Some(path) = output_path {
        tracing::info!(path = %path.display(), %format, "report written");
    }

    if report.snapshots.is_empty() {
        tracing::error!(excluded = report.excluded.len(), "no tickers could be screened");
        return Ok(ExitCode::from(NO_DATA_EXIT));
    }
    Ok(ExitCode::SUCCESS)
}

fn run_validate(config_path: &Path) -> Result<ExitCode, TrendscanError> {
    let config = load_config(config_path)?;
    let params = validate_config(&config)?;
    let engine = IndicatorEngine::new(params)?;

    let exchange = resolve_exchange(None, &config)?;
    let universe = resolve_universe(None, &exchange, &config, config_dir(config_path))?;
    let window = resolve_window(&config, today())?;
    let (sort_key, descending) = resolve_sort(None, &config)?;
    let format = resolve_format(None, &config)?;
    let params = engine.params();

    let indicators: Vec<String> = params.indicators().iter().map(|i| i.to_string()).collect();
    let source = non_blank(config.get_string("data", "source")).unwrap_or_else(|| "csv".into());

    println!("Configuration is valid.");
    println!();
    println!("Data source:  {}", source);
    println!("Exchange:     {}", universe.exchange);
    println!("Universe:     {} codes ({})", universe.count(), universe.codes.join(", "));
    println!("Window:       {} to {}", window.start_date, window.end_date);
    println!("Indicators:   {}", indicators.join(", "));
    println!("Min history:  {} bars", engine.min_history());
    println!(
        "RSI:          bullish above {}, bearish below {}, flat {}",
        params.rsi_bull_threshold, params.rsi_bear_threshold, params.rsi_flat_value
    );
    println!(
        "Levels:       targets +{}% / +{}% / +{}%, stop loss -{}%",
        params.target_pcts[0], params.target_pcts[1], params.target_pcts[2], params.stop_loss_pct
    );
    println!(
        "Output:       {} sorted by {} ({})",
        format,
        sort_key,
        if descending { "descending" } else { "ascending" }
    );
    Ok(ExitCode::SUCCESS)
}

fn run_list_symbols(
    config_path: &Path,
    exchange_override: Option<&str>,
) -> Result<ExitCode, TrendscanError> {
    let config = load_config(config_path)?;
    validate_data_config(&config)?;
    let exchange = resolve_exchange(exchange_override, &config)?;
    let data_port = build_data_port(&config, config_dir(config_path))?;

    let symbols = data_port.list_symbols(&exchange)?;
    if symbols.is_empty() {
        tracing::warn!(exchange = %exchange, "no symbols found");
    } else {
        for symbol in &symbols {
            println!("{}", symbol);
        }
        tracing::info!(count = symbols.len(), exchange = %exchange, "symbols found");
    }
    Ok(ExitCode::SUCCESS)
}

fn run_info(
    config_path: &Path,
    code: Option<&str>,
    exchange_override: Option<&str>,
) -> Result<ExitCode, TrendscanError> {
    let config = load_config(config_path)?;
    validate_data_config(&config)?;
    let params = EngineParams::from_config(&config)?;
    let exchange = resolve_exchange(exchange_override, &config)?;
    let base_dir = config_dir(config_path);

    let codes = match code {
        Some(raw) => parse_codes(raw)?,
        None => resolve_universe(None, &exchange, &config, base_dir)?.codes,
    };
    let data_port = build_data_port(&config, base_dir)?;
    let minimum = params.min_history();

    for c in &codes {
        match data_port.get_data_range(c, &exchange) {
            Ok(Some((first, last, count))) => {
                let note = if count < minimum {
                    format!(" (fewer than the {} bars needed)", minimum)
                } else {
                    String::new()
                };
                println!("{}.{}: {} bars, {} to {}{}", c, exchange, count, first, last, note);
            }
            Ok(None) => tracing::warn!(code = %c, exchange = %exchange, "no data found"),
            Err(e) => tracing::error!(code = %c, exchange = %exchange, error = %e, "range query failed"),
        }
    }
    Ok(ExitCode::SUCCESS)
}
