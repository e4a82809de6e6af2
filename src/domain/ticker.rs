//! Ticker list handling.
//!
//! Tickers are opaque symbols compared case-sensitively. The working set never
//! holds duplicates; the first occurrence wins and input order is kept.

use std::collections::HashSet;

/// Trim, drop blanks and remove duplicates while preserving first-seen order.
pub fn dedup_tickers<I, S>(tickers: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    let mut out = Vec::new();

    for raw in tickers {
        let ticker = raw.as_ref().trim();
        if ticker.is_empty() {
            continue;
        }
        if !seen.insert(ticker.to_string()) {
            tracing::debug!(ticker, "dropping duplicate ticker");
            continue;
        }
        out.push(ticker.to_string());
    }

    out
}

/// Parse a comma-separated ticker list such as `AAPL, MSFT,BRK-B`.
pub fn parse_ticker_list(input: &str) -> Vec<String> {
    dedup_tickers(input.split(','))
}
