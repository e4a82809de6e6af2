//! Derived valuation ratios.
//!
//! Every ratio is either a finite value or an explicit [`Metric::Undefined`]
//! that says why: a required input was missing, the denominator was exactly
//! zero, or the quotient overflowed. Negative denominators are legitimate and
//! produce negative ratios.

use std::fmt;

use super::snapshot::FinancialSnapshot;

/// Snapshot field a ratio depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    MarketCap,
    Equity,
    Cash,
    NetIncomeTtm,
    Ebit,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Field::MarketCap => "market_cap",
            Field::Equity => "equity",
            Field::Cash => "cash",
            Field::NetIncomeTtm => "net_income_ttm",
            Field::Ebit => "ebit",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Undefined {
    MissingInput(Field),
    ZeroDenominator,
    /// Non-zero denominator, but the quotient is not a finite number.
    NonFinite,
}

impl fmt::Display for Undefined {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Undefined::MissingInput(field) => write!(f, "missing {field}"),
            Undefined::ZeroDenominator => f.write_str("zero denominator"),
            Undefined::NonFinite => f.write_str("non-finite result"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Metric {
    Defined(f64),
    Undefined(Undefined),
}

impl Metric {
    pub fn value(&self) -> Option<f64> {
        match self {
            Metric::Defined(v) => Some(*v),
            Metric::Undefined(_) => None,
        }
    }

    pub fn is_defined(&self) -> bool {
        matches!(self, Metric::Defined(_))
    }

    /// Divide, yielding `Undefined` on a missing operand, a zero denominator
    /// or an overflowing quotient.
    pub fn ratio(numerator: Result<f64, Field>, denominator: Result<f64, Field>) -> Metric {
        let n = match numerator {
            Ok(v) => v,
            Err(field) => return Metric::Undefined(Undefined::MissingInput(field)),
        };
        let d = match denominator {
            Ok(v) => v,
            Err(field) => return Metric::Undefined(Undefined::MissingInput(field)),
        };
        if d == 0.0 {
            return Metric::Undefined(Undefined::ZeroDenominator);
        }
        let q = n / d;
        if q.is_finite() {
            Metric::Defined(q)
        } else {
            Metric::Undefined(Undefined::NonFinite)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DerivedMetrics {
    /// `market_cap / (equity + cash - debt)`
    pub faustmann: Metric,
    /// `ebit_ttm / (equity + debt - cash)`
    pub roic: Metric,
    /// `debt / equity`
    pub debt_to_equity: Metric,
    /// Source trailing P/E, else `market_cap / net_income_ttm`.
    pub price_to_earnings: Metric,
}

impl DerivedMetrics {
    pub fn compute(snapshot: &FinancialSnapshot) -> Self {
        let market_cap = require(snapshot.market_cap, Field::MarketCap);
        let equity = require(snapshot.equity, Field::Equity);
        let cash = require(snapshot.cash, Field::Cash);
        let debt = snapshot.debt;

        let net_worth = equity.and_then(|e| cash.map(|c| e + c - debt));
        let invested_capital = equity.and_then(|e| cash.map(|c| e + debt - c));

        let price_to_earnings = match snapshot.price_to_earnings {
            Some(pe) => Metric::Defined(pe),
            None => Metric::ratio(
                market_cap,
                require(snapshot.net_income_ttm, Field::NetIncomeTtm),
            ),
        };

        Self {
            faustmann: Metric::ratio(market_cap, net_worth),
            roic: Metric::ratio(require(snapshot.ebit, Field::Ebit), invested_capital),
            debt_to_equity: Metric::ratio(Ok(debt), equity),
            price_to_earnings,
        }
    }

    /// Named metrics that came out undefined, for logging and summaries.
    pub fn undefined(&self) -> Vec<(&'static str, Undefined)> {
        [
            ("faustmann", self.faustmann),
            ("roic", self.roic),
            ("debt_to_equity", self.debt_to_equity),
            ("pe", self.price_to_earnings),
        ]
        .into_iter()
        .filter_map(|(name, m)| match m {
            Metric::Undefined(why) => Some((name, why)),
            Metric::Defined(_) => None,
        })
        .collect()
    }
}

fn require(value: Option<f64>, field: Field) -> Result<f64, Field> {
    value.ok_or(field)
}
