#![allow(dead_code)]

use chrono::NaiveDate;
use fundscreen::domain::error::{ScreenerError, SourceError};
pub use fundscreen::domain::snapshot::{BalanceSheet, IncomeStatement};
use fundscreen::ports::financial_data_port::FinancialDataSource;
use fundscreen::ports::ticker_port::TickerSource;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

#[derive(Debug, Clone, Default)]
pub struct Company {
    pub sheets: Vec<BalanceSheet>,
    pub income: Vec<IncomeStatement>,
    pub market_cap: Option<f64>,
    pub trailing_pe: Option<f64>,
}

/// In-memory FinancialDataSource with per-ticker error injection.
#[derive(Default)]
pub struct MockFinancialSource {
    pub companies: HashMap<String, Company>,
    /// Errors keyed by (ticker, operation).
    pub errors: HashMap<(String, &'static str), SourceError>,
    pub delays: HashMap<String, Duration>,
    pub calls: AtomicUsize,
    pub op_calls: Mutex<HashMap<&'static str, usize>>,
}

impl MockFinancialSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_company(mut self, ticker: &str, company: Company) -> Self {
        self.companies.insert(ticker.to_string(), company);
        self
    }

    pub fn with_error(mut self, ticker: &str, op: &'static str, error: SourceError) -> Self {
        self.errors.insert((ticker.to_string(), op), error);
        self
    }

    pub fn with_delay(mut self, ticker: &str, delay: Duration) -> Self {
        self.delays.insert(ticker.to_string(), delay);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Calls made to one operation, across all tickers.
    pub fn calls_for(&self, op: &str) -> usize {
        self.op_calls.lock().unwrap().get(op).copied().unwrap_or(0)
    }

    fn lookup(&self, ticker: &str, op: &'static str) -> Result<&Company, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.op_calls.lock().unwrap().entry(op).or_insert(0) += 1;
        if let Some(delay) = self.delays.get(ticker) {
            std::thread::sleep(*delay);
        }
        if let Some(err) = self.errors.get(&(ticker.to_string(), op)) {
            return Err(err.clone());
        }
        self.companies
            .get(ticker)
            .ok_or_else(|| SourceError::not_found(format!("{ticker}: unknown symbol")))
    }
}

impl FinancialDataSource for MockFinancialSource {
    fn balance_sheet(&self, ticker: &str) -> Result<Vec<BalanceSheet>, SourceError> {
        Ok(self.lookup(ticker, "balance_sheet")?.sheets.clone())
    }

    fn income_statement(&self, ticker: &str) -> Result<Vec<IncomeStatement>, SourceError> {
        Ok(self.lookup(ticker, "income_statement")?.income.clone())
    }

    fn market_cap(&self, ticker: &str) -> Result<Option<f64>, SourceError> {
        Ok(self.lookup(ticker, "market_cap")?.market_cap)
    }

    fn trailing_pe(&self, ticker: &str) -> Result<Option<f64>, SourceError> {
        Ok(self.lookup(ticker, "trailing_pe")?.trailing_pe)
    }
}

pub struct MockTickerSource {
    pub tickers: Vec<String>,
    pub fail: bool,
}

impl MockTickerSource {
    pub fn new(tickers: &[&str]) -> Self {
        Self {
            tickers: tickers.iter().map(|t| t.to_string()).collect(),
            fail: false,
        }
    }

    pub fn unavailable() -> Self {
        Self {
            tickers: Vec::new(),
            fail: true,
        }
    }
}

impl TickerSource for MockTickerSource {
    fn get_tickers(&self) -> Result<Vec<String>, ScreenerError> {
        if self.fail {
            return Err(ScreenerError::TickerSource {
                reason: "upstream unreachable".into(),
            });
        }
        Ok(self.tickers.clone())
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn sheet(
    equity: f64,
    cash: f64,
    long_term_debt: Option<f64>,
    current_debt: Option<f64>,
) -> BalanceSheet {
    BalanceSheet {
        period_end: Some(date(2026, 6, 30)),
        stockholders_equity: Some(equity),
        cash_and_equivalents: Some(cash),
        long_term_debt,
        current_debt,
    }
}

/// Four quarters, each with the given net income and EBIT.
pub fn quarters(net_income: f64, ebit: f64) -> Vec<IncomeStatement> {
    [date(2026, 6, 30), date(2026, 3, 31), date(2025, 12, 31), date(2025, 9, 30)]
        .into_iter()
        .map(|d| IncomeStatement {
            period_end: Some(d),
            net_income: Some(net_income),
            ebit: Some(ebit),
        })
        .collect()
}

/// equity 100, cash 20, debt 150, market cap 900, TTM net income 40, TTM EBIT 60.
pub fn acme() -> Company {
    Company {
        sheets: vec![sheet(100.0, 20.0, Some(120.0), Some(30.0))],
        income: quarters(10.0, 15.0),
        market_cap: Some(900.0),
        trailing_pe: None,
    }
}

/// equity 50, cash 0, debt 50: equity + cash - debt == 0.
pub fn zero() -> Company {
    Company {
        sheets: vec![sheet(50.0, 0.0, Some(50.0), None)],
        income: quarters(5.0, 5.0),
        market_cap: Some(400.0),
        trailing_pe: None,
    }
}

pub fn healthy(market_cap: f64) -> Company {
    Company {
        sheets: vec![sheet(1_000.0, 200.0, Some(300.0), Some(100.0))],
        income: quarters(25.0, 40.0),
        market_cap: Some(market_cap),
        trailing_pe: None,
    }
}
