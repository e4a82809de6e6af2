//! Run configuration passed explicitly into the pipeline.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::domain::report::CellFormat;

pub const DEFAULT_CONCURRENCY: usize = 4;
pub const DEFAULT_OUTPUT_DIR: &str = "monthly_magic_formula";
pub const DEFAULT_OUTPUT_PREFIX: &str = "Greenblatt";
/// Ticker list read from the output directory when nothing else is configured.
pub const DEFAULT_TICKER_FILE: &str = "tickers.csv";

/// Screening and output settings for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct ScreenerConfig {
    pub min_market_cap: Option<f64>,
    pub max_market_cap: Option<f64>,
    pub concurrency: usize,
    /// Global deadline for the per-ticker work.
    pub run_timeout: Option<Duration>,
    pub output_dir: PathBuf,
    pub output_prefix: String,
    pub cell_format: CellFormat,
}

impl Default for ScreenerConfig {
    fn default() -> Self {
        Self {
            min_market_cap: None,
            max_market_cap: None,
            concurrency: DEFAULT_CONCURRENCY,
            run_timeout: None,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            output_prefix: DEFAULT_OUTPUT_PREFIX.to_string(),
            cell_format: CellFormat::default(),
        }
    }
}

impl ScreenerConfig {
    /// Whether a known market cap lies inside the configured band.
    pub fn market_cap_in_band(&self, market_cap: f64) -> bool {
        self.min_market_cap.is_none_or(|min| market_cap >= min)
            && self.max_market_cap.is_none_or(|max| market_cap <= max)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Yahoo,
    /// No remote source; every ticker is rejected. Useful for dry checks of
    /// the ticker input and output path.
    None,
}

impl FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "yahoo" => Ok(Provider::Yahoo),
            "none" => Ok(Provider::None),
            other => Err(format!("unknown provider '{other}' (expected yahoo or none)")),
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provider::Yahoo => f.write_str("yahoo"),
            Provider::None => f.write_str("none"),
        }
    }
}

/// Settings for the financial-data adapter.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceConfig {
    pub provider: Provider,
    pub base_url: String,
    pub crumb: Option<String>,
    pub cookie: Option<String>,
    pub user_agent: String,
    pub timeout: Duration,
    pub max_retries: u32,
    pub retry_base: Duration,
}

pub const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (compatible; fundscreen/0.1)";

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            provider: Provider::Yahoo,
            base_url: DEFAULT_BASE_URL.to_string(),
            crumb: None,
            cookie: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(10),
            max_retries: 2,
            retry_base: Duration::from_millis(500),
        }
    }
}
