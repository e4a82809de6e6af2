//! Per-ticker fundamentals extraction.
//!
//! Fetches the raw statements for one validated ticker, builds the
//! [`FinancialSnapshot`] and computes [`DerivedMetrics`]. Missing pieces turn
//! into undefined metrics; only a failed balance sheet or a transient
//! failure on a required lookup aborts the ticker.

use crate::domain::error::{ExtractError, FailureKind, SourceError};
use crate::domain::metrics::DerivedMetrics;
use crate::domain::snapshot::{BalanceSheet, FinancialSnapshot};
use crate::ports::financial_data_port::FinancialDataSource;

#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub ticker: String,
    pub snapshot: FinancialSnapshot,
    pub metrics: DerivedMetrics,
    /// Secondary lookups that failed structurally and were treated as absent.
    pub notes: Vec<String>,
}

pub fn extract(source: &dyn FinancialDataSource, ticker: &str) -> Result<Extraction, ExtractError> {
    let sheets = source
        .balance_sheet(ticker)
        .map_err(|e| ExtractError::from_source(ticker, "balance_sheet", e))?;
    extract_with_sheets(source, ticker, &sheets)
}

/// Extract using balance sheets already fetched during validation.
pub fn extract_with_sheets(
    source: &dyn FinancialDataSource,
    ticker: &str,
    sheets: &[BalanceSheet],
) -> Result<Extraction, ExtractError> {
    let mut notes = Vec::new();

    let latest = sheets
        .first()
        .filter(|bs| !bs.is_empty())
        .ok_or_else(|| ExtractError {
            ticker: ticker.to_string(),
            kind: FailureKind::Structural,
            stage: "balance_sheet",
            reason: "no balance sheet returned".to_string(),
        })?;

    let income = required_or_absent(
        source.income_statement(ticker),
        ticker,
        "income_statement",
        &mut notes,
    )?
    .unwrap_or_default();

    let quote = required_or_absent(source.market_quote(ticker), ticker, "market_cap", &mut notes)?
        .unwrap_or_default();

    let snapshot =
        FinancialSnapshot::from_statements(latest, &income, quote.market_cap, quote.trailing_pe);
    let metrics = DerivedMetrics::compute(&snapshot);

    for (name, why) in metrics.undefined() {
        tracing::debug!(ticker, stage = "extract", metric = name, reason = %why, "metric undefined");
    }

    Ok(Extraction {
        ticker: ticker.to_string(),
        snapshot,
        metrics,
        notes,
    })
}

/// Transient failures abort the ticker; structural ones mean "absent".
fn required_or_absent<T>(
    result: Result<T, SourceError>,
    ticker: &str,
    stage: &'static str,
    notes: &mut Vec<String>,
) -> Result<Option<T>, ExtractError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.is_transient() => Err(ExtractError::from_source(ticker, stage, e)),
        Err(e) => {
            tracing::warn!(ticker, stage, error = %e, "treating lookup as absent");
            notes.push(format!("{stage}: {e}"));
            Ok(None)
        }
    }
}
