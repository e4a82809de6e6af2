//! Data source used with `provider = none`: knows no tickers.

use crate::domain::error::SourceError;
use crate::domain::snapshot::{BalanceSheet, IncomeStatement};
use crate::ports::financial_data_port::FinancialDataSource;

#[derive(Debug, Default)]
pub struct OfflineSource;

impl FinancialDataSource for OfflineSource {
    fn balance_sheet(&self, ticker: &str) -> Result<Vec<BalanceSheet>, SourceError> {
        Err(SourceError::not_found(format!("{ticker}: no data provider configured")))
    }

    fn income_statement(&self, ticker: &str) -> Result<Vec<IncomeStatement>, SourceError> {
        Err(SourceError::not_found(format!("{ticker}: no data provider configured")))
    }

    fn market_cap(&self, ticker: &str) -> Result<Option<f64>, SourceError> {
        Err(SourceError::not_found(format!("{ticker}: no data provider configured")))
    }
}
