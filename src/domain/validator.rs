//! Ticker validation.
//!
//! Admits a ticker only when the data source returns a non-empty balance
//! sheet for it. Lookup errors reject the ticker outright; retrying is the
//! data-source adapter's business.

use std::fmt;

use crate::domain::error::{FailureKind, SourceError};
use crate::domain::snapshot::BalanceSheet;
use crate::ports::financial_data_port::FinancialDataSource;

#[derive(Debug, Clone, PartialEq)]
pub enum RejectReason {
    /// The balance-sheet lookup itself failed.
    LookupFailed { kind: FailureKind, message: String },
    /// The source answered with no usable balance sheet.
    EmptyBalanceSheet,
    /// Known market cap outside the configured screening band.
    OutsideMarketCapBand { market_cap: f64 },
}

impl From<SourceError> for RejectReason {
    fn from(err: SourceError) -> Self {
        RejectReason::LookupFailed {
            kind: err.kind.into(),
            message: err.to_string(),
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::LookupFailed { kind, message } => {
                write!(f, "{kind} lookup failure: {message}")
            }
            RejectReason::EmptyBalanceSheet => f.write_str("empty balance sheet"),
            RejectReason::OutsideMarketCapBand { market_cap } => {
                write!(f, "market cap {market_cap:.0} outside screening band")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RejectedTicker {
    pub ticker: String,
    pub reason: RejectReason,
}

#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub valid: Vec<String>,
    pub rejected: Vec<RejectedTicker>,
}

/// Gate a single ticker with exactly one balance-sheet query. The sheets are
/// handed back so extraction does not fetch them again.
pub fn validate_ticker(
    source: &dyn FinancialDataSource,
    ticker: &str,
) -> Result<Vec<BalanceSheet>, RejectReason> {
    let sheets = source.balance_sheet(ticker)?;
    match sheets.first() {
        Some(latest) if !latest.is_empty() => Ok(sheets),
        _ => Err(RejectReason::EmptyBalanceSheet),
    }
}

/// Validate every ticker in order; survivors keep their relative order.
pub fn validate_tickers(source: &dyn FinancialDataSource, tickers: &[String]) -> ValidationResult {
    let mut result = ValidationResult::default();

    for ticker in tickers {
        match validate_ticker(source, ticker) {
            Ok(_) => {
                tracing::debug!(ticker = %ticker, stage = "validate", outcome = "valid");
                result.valid.push(ticker.clone());
            }
            Err(reason) => {
                tracing::warn!(
                    ticker = %ticker,
                    stage = "validate",
                    outcome = "rejected",
                    %reason
                );
                result.rejected.push(RejectedTicker {
                    ticker: ticker.clone(),
                    reason,
                });
            }
        }
    }

    if !result.rejected.is_empty() {
        tracing::info!(
            valid = result.valid.len(),
            rejected = result.rejected.len(),
            "validation finished"
        );
    }

    result
}
