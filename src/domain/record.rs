//! Flat per-ticker output record.

use crate::domain::extractor::Extraction;
use crate::domain::metrics::{DerivedMetrics, Metric};
use crate::domain::snapshot::FinancialSnapshot;

/// Output columns, in order.
pub const COLUMNS: [&str; 9] = [
    "Ticker",
    "Equity",
    "Cash",
    "Debt",
    "NetIncome",
    "Faustmann",
    "ROIC",
    "DebtToEquity",
    "PE",
];

/// One row of the final dataset. `None` and `Metric::Undefined` survive
/// unchanged until rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct TickerRecord {
    pub ticker: String,
    pub equity: Option<f64>,
    pub cash: Option<f64>,
    pub debt: f64,
    pub net_income: Option<f64>,
    pub faustmann: Metric,
    pub roic: Metric,
    pub debt_to_equity: Metric,
    pub pe: Metric,
}

impl TickerRecord {
    pub fn build(ticker: &str, snapshot: &FinancialSnapshot, metrics: &DerivedMetrics) -> Self {
        Self {
            ticker: ticker.to_string(),
            equity: snapshot.equity,
            cash: snapshot.cash,
            debt: snapshot.debt,
            net_income: snapshot.net_income_ttm,
            faustmann: metrics.faustmann,
            roic: metrics.roic,
            debt_to_equity: metrics.debt_to_equity,
            pe: metrics.price_to_earnings,
        }
    }
}

impl From<&Extraction> for TickerRecord {
    fn from(ex: &Extraction) -> Self {
        TickerRecord::build(&ex.ticker, &ex.snapshot, &ex.metrics)
    }
}
