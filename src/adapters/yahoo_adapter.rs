//! Yahoo Finance quoteSummary adapter implementing FinancialDataSource.
//!
//! One blocking GET per port call against
//! `/v10/finance/quoteSummary/{ticker}?modules=...`. Response decoding lives
//! in free functions so it can be exercised on canned JSON.

use chrono::{DateTime, NaiveDate};
use reqwest::Url;
use reqwest::blocking::Client;
use reqwest::header::{COOKIE, HeaderMap, HeaderValue};
use serde::Deserialize;

use crate::domain::config::SourceConfig;
use crate::domain::error::{ScreenerError, SourceError};
use crate::domain::snapshot::{BalanceSheet, IncomeStatement, MarketQuote};
use crate::ports::financial_data_port::FinancialDataSource;

const BALANCE_SHEET_MODULE: &str = "balanceSheetHistoryQuarterly";
const INCOME_MODULE: &str = "incomeStatementHistoryQuarterly";
const PRICE_MODULES: &str = "price,summaryDetail";
const SUMMARY_MODULE: &str = "summaryDetail";

pub struct YahooAdapter {
    client: Client,
    base_url: Url,
    crumb: Option<String>,
}

impl YahooAdapter {
    pub fn new(config: &SourceConfig) -> Result<Self, ScreenerError> {
        let base_url = Url::parse(&config.base_url).map_err(|e| ScreenerError::ConfigInvalid {
            section: "source".into(),
            key: "base_url".into(),
            reason: e.to_string(),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ScreenerError::ConfigInvalid {
                section: "source".into(),
                key: "base_url".into(),
                reason: "not a hierarchical URL".into(),
            });
        }

        let mut headers = HeaderMap::new();
        if let Some(cookie) = &config.cookie {
            let value = HeaderValue::from_str(cookie).map_err(|e| ScreenerError::ConfigInvalid {
                section: "source".into(),
                key: "cookie".into(),
                reason: e.to_string(),
            })?;
            headers.insert(COOKIE, value);
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .build()
            .map_err(|e| ScreenerError::Io(std::io::Error::other(e)))?;

        Ok(Self {
            client,
            base_url,
            crumb: config.crumb.clone(),
        })
    }

    fn summary_url(&self, ticker: &str, modules: &str) -> Result<Url, SourceError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| SourceError::malformed("base url cannot hold a path"))?
            .pop_if_empty()
            .extend(["v10", "finance", "quoteSummary", ticker]);
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("modules", modules);
            if let Some(crumb) = &self.crumb {
                query.append_pair("crumb", crumb);
            }
        }
        Ok(url)
    }

    fn fetch(&self, ticker: &str, modules: &str) -> Result<SummaryResult, SourceError> {
        let url = self.summary_url(ticker, modules)?;
        tracing::debug!(ticker, modules, "yahoo request");

        let response = self.client.get(url).send().map_err(transport_error)?;
        let status = response.status().as_u16();
        let body = response.text().map_err(transport_error)?;
        parse_summary(status, &body, ticker)
    }
}

impl FinancialDataSource for YahooAdapter {
    fn balance_sheet(&self, ticker: &str) -> Result<Vec<BalanceSheet>, SourceError> {
        Ok(balance_sheets(&self.fetch(ticker, BALANCE_SHEET_MODULE)?))
    }

    fn income_statement(&self, ticker: &str) -> Result<Vec<IncomeStatement>, SourceError> {
        Ok(income_statements(&self.fetch(ticker, INCOME_MODULE)?))
    }

    fn market_cap(&self, ticker: &str) -> Result<Option<f64>, SourceError> {
        Ok(market_cap(&self.fetch(ticker, PRICE_MODULES)?))
    }

    fn trailing_pe(&self, ticker: &str) -> Result<Option<f64>, SourceError> {
        Ok(trailing_pe(&self.fetch(ticker, SUMMARY_MODULE)?))
    }

    fn market_quote(&self, ticker: &str) -> Result<MarketQuote, SourceError> {
        Ok(market_quote(&self.fetch(ticker, PRICE_MODULES)?))
    }
}

fn transport_error(e: reqwest::Error) -> SourceError {
    if e.is_decode() {
        SourceError::malformed(e.to_string())
    } else {
        SourceError::transient(e.to_string())
    }
}

/// Map an HTTP status to an error, `None` for success.
pub fn classify_status(status: u16, ticker: &str) -> Option<SourceError> {
    match status {
        200..=299 => None,
        404 => Some(SourceError::not_found(format!("{ticker}: HTTP 404"))),
        408 | 429 | 500..=599 => Some(SourceError::transient(format!("{ticker}: HTTP {status}"))),
        _ => Some(SourceError::malformed(format!(
            "{ticker}: unexpected HTTP {status}"
        ))),
    }
}

/// Decode a quoteSummary body into its single result.
pub fn parse_summary(status: u16, body: &str, ticker: &str) -> Result<SummaryResult, SourceError> {
    if let Some(err) = classify_status(status, ticker) {
        return Err(err);
    }

    let response: SummaryResponse = serde_json::from_str(body)
        .map_err(|e| SourceError::malformed(format!("{ticker}: failed to parse quoteSummary: {e}")))?;

    if let Some(error) = response.quote_summary.error {
        let message = format!("{ticker}: {} ({})", error.code, error.description);
        return Err(if error.code.eq_ignore_ascii_case("Not Found") {
            SourceError::not_found(message)
        } else {
            SourceError::malformed(message)
        });
    }

    response
        .quote_summary
        .result
        .unwrap_or_default()
        .into_iter()
        .next()
        .ok_or_else(|| SourceError::not_found(format!("{ticker}: empty quoteSummary result")))
}

/// Quarterly balance sheets, most recent first.
pub fn balance_sheets(result: &SummaryResult) -> Vec<BalanceSheet> {
    let mut sheets: Vec<BalanceSheet> = result
        .balance_sheet_history_quarterly
        .as_ref()
        .map(|m| {
            m.balance_sheet_statements
                .iter()
                .map(|s| BalanceSheet {
                    period_end: end_date(&s.end_date),
                    stockholders_equity: raw(&s.total_stockholder_equity),
                    cash_and_equivalents: raw(&s.cash),
                    long_term_debt: raw(&s.long_term_debt),
                    current_debt: raw(&s.short_long_term_debt),
                })
                .collect()
        })
        .unwrap_or_default();
    sheets.sort_by(|a, b| b.period_end.cmp(&a.period_end));
    sheets
}

/// Quarterly income statements, most recent first.
pub fn income_statements(result: &SummaryResult) -> Vec<IncomeStatement> {
    let mut statements: Vec<IncomeStatement> = result
        .income_statement_history_quarterly
        .as_ref()
        .map(|m| {
            m.income_statement_history
                .iter()
                .map(|s| IncomeStatement {
                    period_end: end_date(&s.end_date),
                    net_income: raw(&s.net_income),
                    ebit: raw(&s.ebit),
                })
                .collect()
        })
        .unwrap_or_default();
    statements.sort_by(|a, b| b.period_end.cmp(&a.period_end));
    statements
}

pub fn market_cap(result: &SummaryResult) -> Option<f64> {
    result
        .price
        .as_ref()
        .and_then(|p| raw(&p.market_cap))
        .or_else(|| result.summary_detail.as_ref().and_then(|s| raw(&s.market_cap)))
}

pub fn trailing_pe(result: &SummaryResult) -> Option<f64> {
    result
        .summary_detail
        .as_ref()
        .and_then(|s| raw(&s.trailing_pe))
}

/// Both quote figures from one `price,summaryDetail` result.
pub fn market_quote(result: &SummaryResult) -> MarketQuote {
    MarketQuote {
        market_cap: market_cap(result),
        trailing_pe: trailing_pe(result),
    }
}

fn raw(value: &Option<RawValue>) -> Option<f64> {
    value.as_ref().and_then(|v| v.raw).filter(|v| v.is_finite())
}

fn end_date(value: &Option<RawValue>) -> Option<NaiveDate> {
    let secs = raw(value)? as i64;
    DateTime::from_timestamp(secs, 0).map(|dt| dt.date_naive())
}

#[derive(Debug, Deserialize)]
struct SummaryResponse {
    #[serde(rename = "quoteSummary")]
    quote_summary: SummaryEnvelope,
}

#[derive(Debug, Deserialize)]
struct SummaryEnvelope {
    #[serde(default)]
    result: Option<Vec<SummaryResult>>,
    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    code: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryResult {
    #[serde(default)]
    balance_sheet_history_quarterly: Option<BalanceSheetModule>,
    #[serde(default)]
    income_statement_history_quarterly: Option<IncomeModule>,
    #[serde(default)]
    price: Option<PriceModule>,
    #[serde(default)]
    summary_detail: Option<SummaryDetailModule>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BalanceSheetModule {
    #[serde(default)]
    balance_sheet_statements: Vec<BalanceSheetRow>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BalanceSheetRow {
    #[serde(default)]
    end_date: Option<RawValue>,
    #[serde(default, alias = "stockholdersEquity")]
    total_stockholder_equity: Option<RawValue>,
    #[serde(default, alias = "cashAndCashEquivalents")]
    cash: Option<RawValue>,
    #[serde(default)]
    long_term_debt: Option<RawValue>,
    #[serde(default, alias = "currentDebt")]
    short_long_term_debt: Option<RawValue>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IncomeModule {
    #[serde(default)]
    income_statement_history: Vec<IncomeRow>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IncomeRow {
    #[serde(default)]
    end_date: Option<RawValue>,
    #[serde(default)]
    net_income: Option<RawValue>,
    #[serde(default)]
    ebit: Option<RawValue>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PriceModule {
    #[serde(default)]
    market_cap: Option<RawValue>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SummaryDetailModule {
    #[serde(default)]
    market_cap: Option<RawValue>,
    #[serde(default, rename = "trailingPE")]
    trailing_pe: Option<RawValue>,
}

/// Yahoo wraps numbers as `{"raw": 1.0, "fmt": "1.00"}`; absent values are `{}`.
#[derive(Debug, Deserialize)]
struct RawValue {
    #[serde(default)]
    raw: Option<f64>,
}
