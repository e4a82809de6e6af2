//! CLI definition and dispatch.

use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::csv_ticker_adapter::{CsvTickerSource, StaticTickerSource};
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::offline_source::OfflineSource;
use crate::domain::config::{
    DEFAULT_BASE_URL, DEFAULT_CONCURRENCY, DEFAULT_OUTPUT_DIR, DEFAULT_OUTPUT_PREFIX,
    DEFAULT_TICKER_FILE, DEFAULT_USER_AGENT, Provider, ScreenerConfig, SourceConfig,
};
use crate::domain::config_validation::{
    parse_amount, validate_screener_config, validate_source_config,
};
use crate::domain::error::ScreenerError;
use crate::domain::pipeline::{RunReport, screen};
use crate::domain::report::{CellFormat, DEFAULT_RATIO_DECIMALS};
use crate::domain::ticker::dedup_tickers;
use crate::domain::validator::validate_tickers;
use crate::ports::config_port::ConfigPort;
use crate::ports::financial_data_port::FinancialDataSource;
use crate::ports::report_port::ReportPort;
use crate::ports::ticker_port::TickerSource;

#[derive(Parser, Debug)]
#[command(
    name = "fundscreen",
    about = "Screen tickers on balance-sheet fundamentals and write a monthly report"
)]
pub struct Cli {
    /// Defaults to `run` when omitted
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Screen all tickers and write the report
    Run(RunArgs),
    /// Only check which tickers the data source knows
    Check(RunArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// INI config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// CSV file with one ticker per row
    #[arg(short, long)]
    pub tickers: Option<PathBuf>,
    /// Comma-separated tickers, e.g. "AAPL,MSFT"
    #[arg(long)]
    pub ticker_list: Option<String>,
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,
    #[arg(long)]
    pub min_market_cap: Option<f64>,
    #[arg(long)]
    pub max_market_cap: Option<f64>,
    #[arg(long)]
    pub concurrency: Option<usize>,
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Some(Command::Run(args)) => run_screen(&args),
        Some(Command::Check(args)) => run_check(&args),
        None => run_screen(&RunArgs::default()),
    }
}

pub fn load_config(path: Option<&Path>) -> Result<FileConfigAdapter, ScreenerError> {
    match path {
        Some(path) => {
            FileConfigAdapter::from_file(path).map_err(|e| ScreenerError::ConfigParse {
                file: path.display().to_string(),
                reason: e.to_string(),
            })
        }
        None => Ok(FileConfigAdapter::empty()),
    }
}

fn run_screen(args: &RunArgs) -> ExitCode {
    let prepared = load_config(args.config.as_deref()).and_then(|adapter| {
        let config = build_screener_config(&adapter, args)?;
        let source_config = build_source_config(&adapter)?;
        let tickers = resolve_ticker_source(&adapter, args)?;
        let source = build_data_source(&source_config)?;
        Ok((config, tickers, source))
    });

    let (config, tickers, source) = match prepared {
        Ok(p) => p,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    run_screen_pipeline(
        tickers.as_ref(),
        source.as_ref(),
        &CsvReportAdapter::new(),
        &config,
        Local::now().date_naive(),
    )
}

/// Run the full screen against injected ports and print the summary.
pub fn run_screen_pipeline(
    tickers: &dyn TickerSource,
    source: &dyn FinancialDataSource,
    report: &dyn ReportPort,
    config: &ScreenerConfig,
    run_date: NaiveDate,
) -> ExitCode {
    match screen(tickers, source, report, config, run_date) {
        Ok(result) => {
            print_summary(&result);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

fn print_summary(result: &RunReport) {
    let s = &result.outcome.summary;

    eprintln!("\n=== Run Summary ===");
    eprintln!("Tickers:          {}", s.total);
    eprintln!(
        "Recorded:         {} ({} with undefined metrics)",
        s.recorded, s.recorded_with_undefined
    );
    eprintln!(
        "Rejected:         {} ({} outside market cap band)",
        s.rejected, s.outside_band
    );
    eprintln!(
        "Failed:           {} transient, {} structural",
        s.failed_transient, s.failed_structural
    );
    if s.abandoned > 0 {
        eprintln!("Abandoned:        {} (run deadline)", s.abandoned);
    }
    if !s.reasons.is_empty() {
        eprintln!("\nOmitted by reason:");
        for (reason, count) in &s.reasons {
            eprintln!("  {count:>5}  {reason}");
        }
    }
    eprintln!("\nReport written to: {}", result.destination.display());
}

fn run_check(args: &RunArgs) -> ExitCode {
    let prepared = load_config(args.config.as_deref()).and_then(|adapter| {
        let source_config = build_source_config(&adapter)?;
        let tickers = resolve_ticker_source(&adapter, args)?.get_tickers()?;
        let source = build_data_source(&source_config)?;
        Ok((dedup_tickers(tickers), source))
    });

    let (tickers, source) = match prepared {
        Ok(p) => p,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    eprintln!("Checking {} tickers...", tickers.len());
    let result = validate_tickers(source.as_ref(), &tickers);

    for ticker in &result.valid {
        println!("{ticker}\tvalid");
    }
    for rejected in &result.rejected {
        println!("{}\trejected\t{}", rejected.ticker, rejected.reason);
    }
    eprintln!(
        "\n{} valid, {} rejected",
        result.valid.len(),
        result.rejected.len()
    );
    ExitCode::SUCCESS
}

/// Materialise `[screen]` and `[output]`, then apply CLI overrides.
pub fn build_screener_config(
    adapter: &dyn ConfigPort,
    args: &RunArgs,
) -> Result<ScreenerConfig, ScreenerError> {
    validate_screener_config(adapter)?;

    let run_timeout = adapter
        .get_string("screen", "run_timeout_secs")
        .map(|_| Duration::from_secs(adapter.get_int("screen", "run_timeout_secs", 0) as u64));

    let mut config = ScreenerConfig {
        min_market_cap: parse_amount(adapter, "screen", "min_market_cap")?,
        max_market_cap: parse_amount(adapter, "screen", "max_market_cap")?,
        concurrency: adapter.get_int("screen", "concurrency", DEFAULT_CONCURRENCY as i64) as usize,
        run_timeout,
        output_dir: output_dir(adapter, args),
        output_prefix: adapter
            .get_string("output", "prefix")
            .map(|p| p.trim().to_string())
            .unwrap_or_else(|| DEFAULT_OUTPUT_PREFIX.to_string()),
        cell_format: CellFormat {
            currency_decimals: 0,
            ratio_decimals: adapter.get_int(
                "output",
                "ratio_decimals",
                DEFAULT_RATIO_DECIMALS as i64,
            ) as usize,
        },
    };

    if let Some(min) = args.min_market_cap {
        config.min_market_cap = Some(check_amount("min_market_cap", min)?);
    }
    if let Some(max) = args.max_market_cap {
        config.max_market_cap = Some(check_amount("max_market_cap", max)?);
    }
    if let Some(n) = args.concurrency {
        if n == 0 {
            return Err(ScreenerError::ConfigInvalid {
                section: "screen".into(),
                key: "concurrency".into(),
                reason: "concurrency must be at least 1".into(),
            });
        }
        config.concurrency = n;
    }
    if let (Some(min), Some(max)) = (config.min_market_cap, config.max_market_cap) {
        if min > max {
            return Err(ScreenerError::ConfigInvalid {
                section: "screen".into(),
                key: "min_market_cap".into(),
                reason: "min_market_cap must not exceed max_market_cap".into(),
            });
        }
    }

    Ok(config)
}

/// `--output-dir`, then `[output] dir`, then the default.
fn output_dir(adapter: &dyn ConfigPort, args: &RunArgs) -> PathBuf {
    if let Some(dir) = &args.output_dir {
        return dir.clone();
    }
    adapter
        .get_string("output", "dir")
        .map(|d| PathBuf::from(d.trim()))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR))
}

fn check_amount(key: &str, value: f64) -> Result<f64, ScreenerError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(ScreenerError::ConfigInvalid {
            section: "screen".into(),
            key: key.into(),
            reason: "must be a non-negative number".into(),
        })
    }
}

pub fn build_source_config(adapter: &dyn ConfigPort) -> Result<SourceConfig, ScreenerError> {
    validate_source_config(adapter)?;

    let provider = match adapter.get_string("source", "provider") {
        Some(p) => p
            .parse::<Provider>()
            .map_err(|reason| ScreenerError::ConfigInvalid {
                section: "source".into(),
                key: "provider".into(),
                reason,
            })?,
        None => Provider::Yahoo,
    };

    let non_blank = |key: &str| {
        adapter
            .get_string("source", key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    Ok(SourceConfig {
        provider,
        base_url: non_blank("base_url").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        crumb: non_blank("crumb"),
        cookie: non_blank("cookie"),
        user_agent: non_blank("user_agent").unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
        timeout: Duration::from_secs(adapter.get_int("source", "timeout_secs", 10) as u64),
        max_retries: adapter.get_int("source", "max_retries", 2) as u32,
        retry_base: Duration::from_millis(adapter.get_int("source", "retry_base_ms", 500) as u64),
    })
}

/// CLI flags first, then `[tickers]`; a file beats an inline list.
/// With none of those, `tickers.csv` in the output directory.
pub fn resolve_ticker_source(
    adapter: &dyn ConfigPort,
    args: &RunArgs,
) -> Result<Box<dyn TickerSource>, ScreenerError> {
    if let Some(path) = &args.tickers {
        return Ok(Box::new(CsvTickerSource::new(path.clone())));
    }
    if let Some(list) = &args.ticker_list {
        return Ok(Box::new(StaticTickerSource::parse(list)));
    }
    if let Some(file) = adapter.get_string("tickers", "file") {
        return Ok(Box::new(CsvTickerSource::new(PathBuf::from(file.trim()))));
    }
    if let Some(list) = adapter.get_string("tickers", "list") {
        return Ok(Box::new(StaticTickerSource::parse(&list)));
    }
    let fallback = output_dir(adapter, args).join(DEFAULT_TICKER_FILE);
    tracing::debug!(path = %fallback.display(), "no tickers configured, using default file");
    Ok(Box::new(CsvTickerSource::new(fallback)))
}

pub fn build_data_source(
    config: &SourceConfig,
) -> Result<Box<dyn FinancialDataSource>, ScreenerError> {
    match config.provider {
        Provider::None => Ok(Box::new(OfflineSource)),
        Provider::Yahoo => yahoo_source(config),
    }
}

#[cfg(feature = "yahoo")]
fn yahoo_source(config: &SourceConfig) -> Result<Box<dyn FinancialDataSource>, ScreenerError> {
    use crate::adapters::retrying_source::{RetryConfig, RetryingSource};
    use crate::adapters::yahoo_adapter::YahooAdapter;

    let adapter = YahooAdapter::new(config)?;
    Ok(Box::new(RetryingSource::new(
        adapter,
        RetryConfig::from(config),
    )))
}

#[cfg(not(feature = "yahoo"))]
fn yahoo_source(_config: &SourceConfig) -> Result<Box<dyn FinancialDataSource>, ScreenerError> {
    Err(ScreenerError::ConfigInvalid {
        section: "source".into(),
        key: "provider".into(),
        reason: "built without the yahoo feature".into(),
    })
}
