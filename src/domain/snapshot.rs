//! Raw statement rows and the per-ticker financial snapshot built from them.

use chrono::NaiveDate;

/// Quarters summed for trailing-twelve-month figures.
pub const TTM_QUARTERS: usize = 4;

/// One quarterly balance sheet as reported by the source.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BalanceSheet {
    pub period_end: Option<NaiveDate>,
    pub stockholders_equity: Option<f64>,
    pub cash_and_equivalents: Option<f64>,
    pub long_term_debt: Option<f64>,
    pub current_debt: Option<f64>,
}

impl BalanceSheet {
    /// True when the source reported none of the fields this tool reads.
    pub fn is_empty(&self) -> bool {
        self.stockholders_equity.is_none()
            && self.cash_and_equivalents.is_none()
            && self.long_term_debt.is_none()
            && self.current_debt.is_none()
    }
}

/// Market-derived figures that come from a single quote lookup.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MarketQuote {
    pub market_cap: Option<f64>,
    pub trailing_pe: Option<f64>,
}

/// One quarterly income statement as reported by the source.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IncomeStatement {
    pub period_end: Option<NaiveDate>,
    pub net_income: Option<f64>,
    pub ebit: Option<f64>,
}

/// Fields needed for the derived ratios, in the source's reporting currency.
///
/// Only ever built for a ticker that passed validation; lives for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct FinancialSnapshot {
    pub market_cap: Option<f64>,
    pub equity: Option<f64>,
    pub cash: Option<f64>,
    pub debt_long_term: f64,
    pub debt_current: f64,
    /// Interest-bearing debt only: `debt_long_term + debt_current`.
    pub debt: f64,
    pub net_income_ttm: Option<f64>,
    /// Trailing-twelve-month operating earnings.
    pub ebit: Option<f64>,
    pub enterprise_value: Option<f64>,
    /// Trailing P/E published by the source, if any.
    pub price_to_earnings: Option<f64>,
}

impl FinancialSnapshot {
    /// Build a snapshot from the latest balance sheet and quarterly income
    /// statements ordered most recent first.
    ///
    /// Absent debt lines count as zero; every other absent or non-finite
    /// value stays `None`.
    pub fn from_statements(
        latest: &BalanceSheet,
        income: &[IncomeStatement],
        market_cap: Option<f64>,
        source_pe: Option<f64>,
    ) -> Self {
        let market_cap = finite(market_cap);
        let equity = finite(latest.stockholders_equity);
        let cash = finite(latest.cash_and_equivalents);
        let debt_long_term = finite(latest.long_term_debt).unwrap_or(0.0);
        let debt_current = finite(latest.current_debt).unwrap_or(0.0);
        let debt = debt_long_term + debt_current;

        let enterprise_value = match (market_cap, cash) {
            (Some(mc), Some(c)) => Some(mc + debt - c),
            _ => None,
        };

        Self {
            market_cap,
            equity,
            cash,
            debt_long_term,
            debt_current,
            debt,
            net_income_ttm: trailing_sum(income, |q| q.net_income),
            ebit: trailing_sum(income, |q| q.ebit),
            enterprise_value,
            price_to_earnings: finite(source_pe),
        }
    }
}

/// Sum of the most recent [`TTM_QUARTERS`] values, `None` unless all are present.
pub fn trailing_sum<F>(quarters: &[IncomeStatement], field: F) -> Option<f64>
where
    F: Fn(&IncomeStatement) -> Option<f64>,
{
    if quarters.len() < TTM_QUARTERS {
        return None;
    }
    quarters[..TTM_QUARTERS]
        .iter()
        .map(|q| finite(field(q)))
        .sum::<Option<f64>>()
}

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quarter(net_income: f64, ebit: f64) -> IncomeStatement {
        IncomeStatement {
            period_end: None,
            net_income: Some(net_income),
            ebit: Some(ebit),
        }
    }

    fn sheet() -> BalanceSheet {
        BalanceSheet {
            period_end: NaiveDate::from_ymd_opt(2026, 6, 30),
            stockholders_equity: Some(1_000.0),
            cash_and_equivalents: Some(200.0),
            long_term_debt: Some(300.0),
            current_debt: Some(50.0),
        }
    }

    #[test]
    fn debt_is_sum_of_long_term_and_current() {
        let snap = FinancialSnapshot::from_statements(&sheet(), &[], Some(5_000.0), None);
        assert_eq!(snap.debt_long_term, 300.0);
        assert_eq!(snap.debt_current, 50.0);
        assert_eq!(snap.debt, 350.0);
    }

    #[test]
    fn missing_debt_lines_count_as_zero() {
        let mut bs = sheet();
        bs.long_term_debt = None;
        bs.current_debt = None;
        let snap = FinancialSnapshot::from_statements(&bs, &[], None, None);
        assert_eq!(snap.debt, 0.0);
    }

    #[test]
    fn ttm_sums_four_most_recent_quarters() {
        let quarters = vec![
            quarter(10.0, 20.0),
            quarter(11.0, 21.0),
            quarter(12.0, 22.0),
            quarter(13.0, 23.0),
            quarter(1_000.0, 1_000.0),
        ];
        let snap = FinancialSnapshot::from_statements(&sheet(), &quarters, None, None);
        assert_eq!(snap.net_income_ttm, Some(46.0));
        assert_eq!(snap.ebit, Some(86.0));
    }

    #[test]
    fn ttm_undefined_with_fewer_than_four_quarters() {
        let quarters = vec![quarter(10.0, 20.0), quarter(11.0, 21.0)];
        let snap = FinancialSnapshot::from_statements(&sheet(), &quarters, None, None);
        assert_eq!(snap.net_income_ttm, None);
        assert_eq!(snap.ebit, None);
    }

    #[test]
    fn ttm_undefined_when_a_quarter_lacks_the_field() {
        let mut quarters = vec![quarter(1.0, 1.0); 4];
        quarters[2].net_income = None;
        let snap = FinancialSnapshot::from_statements(&sheet(), &quarters, None, None);
        assert_eq!(snap.net_income_ttm, None);
        assert_eq!(snap.ebit, Some(4.0));
    }

    #[test]
    fn enterprise_value_needs_market_cap_and_cash() {
        let snap = FinancialSnapshot::from_statements(&sheet(), &[], Some(5_000.0), None);
        assert_eq!(snap.enterprise_value, Some(5_150.0));

        let snap = FinancialSnapshot::from_statements(&sheet(), &[], None, None);
        assert_eq!(snap.enterprise_value, None);
    }

    #[test]
    fn non_finite_values_are_treated_as_missing() {
        let mut bs = sheet();
        bs.stockholders_equity = Some(f64::NAN);
        let snap =
            FinancialSnapshot::from_statements(&bs, &[], Some(f64::INFINITY), Some(f64::NAN));
        assert_eq!(snap.equity, None);
        assert_eq!(snap.market_cap, None);
        assert_eq!(snap.price_to_earnings, None);
    }
}
