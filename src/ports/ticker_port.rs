//! Ticker source port trait.

use crate::domain::error::ScreenerError;

/// Supplies the raw ticker symbols for a run.
///
/// Failing here is fatal for the run; an empty list is not.
pub trait TickerSource {
    fn get_tickers(&self) -> Result<Vec<String>, ScreenerError>;
}
