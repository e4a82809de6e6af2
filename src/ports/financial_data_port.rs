//! Financial data source port trait.

use crate::domain::error::SourceError;
use crate::domain::snapshot::{BalanceSheet, IncomeStatement, MarketQuote};

/// Read-only access to per-ticker fundamentals.
///
/// Implementations are shared across worker threads, hence `Sync`.
pub trait FinancialDataSource: Sync {
    /// Quarterly balance sheets, most recent first.
    fn balance_sheet(&self, ticker: &str) -> Result<Vec<BalanceSheet>, SourceError>;

    /// Quarterly income statements, most recent first.
    fn income_statement(&self, ticker: &str) -> Result<Vec<IncomeStatement>, SourceError>;

    fn market_cap(&self, ticker: &str) -> Result<Option<f64>, SourceError>;

    /// Trailing P/E when the source publishes one directly.
    fn trailing_pe(&self, _ticker: &str) -> Result<Option<f64>, SourceError> {
        Ok(None)
    }

    /// Market cap and trailing P/E together. Sources that serve both from one
    /// request should override this. A failed P/E lookup counts as absent.
    fn market_quote(&self, ticker: &str) -> Result<MarketQuote, SourceError> {
        let market_cap = self.market_cap(ticker)?;
        let trailing_pe = self.trailing_pe(ticker).unwrap_or_else(|e| {
            tracing::warn!(ticker, error = %e, "trailing P/E lookup failed, treating as absent");
            None
        });
        Ok(MarketQuote {
            market_cap,
            trailing_pe,
        })
    }
}
