//! Ticker sources: a CSV file with one symbol per row, or an inline list.

use crate::domain::error::ScreenerError;
use crate::domain::ticker::{dedup_tickers, parse_ticker_list};
use crate::ports::ticker_port::TickerSource;
use std::fs;
use std::path::PathBuf;

/// Reads tickers from the first column of a header-less CSV file.
pub struct CsvTickerSource {
    path: PathBuf,
}

impl CsvTickerSource {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

/// Tickers from a header-less CSV body, plus the 1-based lines skipped as empty.
#[derive(Debug, Default, PartialEq)]
pub struct TickerRows {
    pub tickers: Vec<String>,
    pub skipped_lines: Vec<usize>,
}

/// One row per line; the ticker is the trimmed first cell. Rows that are
/// empty, whitespace-only or start with an empty cell are skipped.
pub fn parse_ticker_rows(content: &str) -> Result<TickerRows, csv::Error> {
    let mut rows = TickerRows::default();

    for (index, line) in content.lines().enumerate() {
        let first = if line.trim().is_empty() {
            None
        } else {
            let mut rdr = csv::ReaderBuilder::new()
                .has_headers(false)
                .flexible(true)
                .from_reader(line.as_bytes());
            match rdr.records().next() {
                Some(record) => record?.get(0).map(|cell| cell.trim().to_string()),
                None => None,
            }
        };

        match first {
            Some(ticker) if !ticker.is_empty() => rows.tickers.push(ticker),
            _ => rows.skipped_lines.push(index + 1),
        }
    }
    Ok(rows)
}

impl TickerSource for CsvTickerSource {
    fn get_tickers(&self) -> Result<Vec<String>, ScreenerError> {
        let content = fs::read_to_string(&self.path).map_err(|e| ScreenerError::TickerSource {
            reason: format!("failed to read {}: {}", self.path.display(), e),
        })?;

        let rows = parse_ticker_rows(&content).map_err(|e| ScreenerError::TickerSource {
            reason: format!("CSV parse error in {}: {}", self.path.display(), e),
        })?;
        for line in &rows.skipped_lines {
            tracing::warn!(path = %self.path.display(), line, "empty ticker row, skipping");
        }

        let tickers = dedup_tickers(rows.tickers);
        tracing::info!(
            path = %self.path.display(),
            count = tickers.len(),
            "loaded tickers"
        );
        Ok(tickers)
    }
}

/// Fixed list, e.g. from `--ticker-list` or `[tickers] list`.
pub struct StaticTickerSource {
    tickers: Vec<String>,
}

impl StaticTickerSource {
    pub fn new(tickers: Vec<String>) -> Self {
        Self {
            tickers: dedup_tickers(tickers),
        }
    }

    pub fn parse(list: &str) -> Self {
        Self {
            tickers: parse_ticker_list(list),
        }
    }
}

impl TickerSource for StaticTickerSource {
    fn get_tickers(&self) -> Result<Vec<String>, ScreenerError> {
        Ok(self.tickers.clone())
    }
}
