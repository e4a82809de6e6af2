//! Ticker processing pipeline.
//!
//! Candidate -> Rejected | Extracted -> Recorded, one ticker at a time per
//! worker. Tickers are independent, so a bounded pool of scoped threads pulls
//! them from a shared cursor and results are slotted back by submission index.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::thread;
use std::time::Instant;

use chrono::NaiveDate;

use crate::domain::config::ScreenerConfig;
use crate::domain::error::{ExtractError, FailureKind, ScreenerError};
use crate::domain::extractor::extract_with_sheets;
use crate::domain::record::TickerRecord;
use crate::domain::report::{Dataset, assemble, report_destination};
use crate::domain::ticker::dedup_tickers;
use crate::domain::validator::{RejectReason, validate_ticker};
use crate::ports::financial_data_port::FinancialDataSource;
use crate::ports::report_port::ReportPort;
use crate::ports::ticker_port::TickerSource;

/// Terminal state of one ticker.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Recorded(TickerRecord),
    Rejected(RejectReason),
    Failed(ExtractError),
    /// Not finished before the run deadline.
    Abandoned,
}

impl Outcome {
    fn label(&self) -> &'static str {
        match self {
            Outcome::Recorded(_) => "recorded",
            Outcome::Rejected(_) => "rejected",
            Outcome::Failed(_) => "failed",
            Outcome::Abandoned => "abandoned",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TickerResult {
    pub ticker: String,
    pub outcome: Outcome,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub total: usize,
    pub recorded: usize,
    /// Recorded tickers carrying at least one undefined metric.
    pub recorded_with_undefined: usize,
    pub rejected: usize,
    /// Subset of `rejected` filtered by the market-cap band.
    pub outside_band: usize,
    pub failed_transient: usize,
    pub failed_structural: usize,
    pub abandoned: usize,
    /// Rejection and failure counts keyed by a short reason label.
    pub reasons: BTreeMap<String, usize>,
}

impl RunSummary {
    pub fn from_results(results: &[TickerResult]) -> Self {
        let mut summary = RunSummary {
            total: results.len(),
            ..RunSummary::default()
        };

        for r in results {
            match &r.outcome {
                Outcome::Recorded(rec) => {
                    summary.recorded += 1;
                    let all_defined = [rec.faustmann, rec.roic, rec.debt_to_equity, rec.pe]
                        .iter()
                        .all(|m| m.is_defined());
                    if !all_defined {
                        summary.recorded_with_undefined += 1;
                    }
                }
                Outcome::Rejected(reason) => {
                    summary.rejected += 1;
                    let label = match reason {
                        RejectReason::EmptyBalanceSheet => "empty balance sheet".to_string(),
                        RejectReason::LookupFailed { kind, .. } => format!("{kind} lookup failure"),
                        RejectReason::OutsideMarketCapBand { .. } => {
                            summary.outside_band += 1;
                            "outside market cap band".to_string()
                        }
                    };
                    *summary.reasons.entry(label).or_default() += 1;
                }
                Outcome::Failed(err) => {
                    match err.kind {
                        FailureKind::Transient => summary.failed_transient += 1,
                        FailureKind::Structural => summary.failed_structural += 1,
                    }
                    let label = format!("{} {} failure", err.kind, err.stage);
                    *summary.reasons.entry(label).or_default() += 1;
                }
                Outcome::Abandoned => summary.abandoned += 1,
            }
        }

        summary
    }

    /// Tickers that entered the pipeline but were not recorded.
    pub fn omitted(&self) -> usize {
        self.total - self.recorded
    }
}

/// Everything one run produced, before persistence.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub results: Vec<TickerResult>,
    pub summary: RunSummary,
}

impl RunOutcome {
    /// Recorded rows in processing order.
    pub fn records(&self) -> Vec<TickerRecord> {
        self.results
            .iter()
            .filter_map(|r| match &r.outcome {
                Outcome::Recorded(rec) => Some(rec.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn dataset(&self, config: &ScreenerConfig) -> Dataset {
        assemble(&self.records(), &config.cell_format)
    }
}

/// Result of a completed, persisted run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub destination: PathBuf,
    pub dataset: Dataset,
    pub outcome: RunOutcome,
}

/// Drive one ticker from Candidate to a terminal state.
pub fn process_ticker(
    source: &dyn FinancialDataSource,
    ticker: &str,
    config: &ScreenerConfig,
    deadline: Option<Instant>,
) -> Outcome {
    if expired(deadline) {
        return Outcome::Abandoned;
    }

    let sheets = match validate_ticker(source, ticker) {
        Ok(sheets) => sheets,
        Err(reason) => {
            tracing::warn!(ticker, stage = "validate", outcome = "rejected", %reason);
            return Outcome::Rejected(reason);
        }
    };

    let extraction = match extract_with_sheets(source, ticker, &sheets) {
        Ok(ex) => ex,
        Err(err) => {
            tracing::warn!(
                ticker,
                stage = "extract",
                outcome = "failed",
                kind = %err.kind,
                error = %err
            );
            return Outcome::Failed(err);
        }
    };

    if expired(deadline) {
        tracing::warn!(ticker, stage = "extract", outcome = "abandoned");
        return Outcome::Abandoned;
    }

    if let Some(mc) = extraction.snapshot.market_cap {
        if !config.market_cap_in_band(mc) {
            tracing::info!(
                ticker,
                stage = "record",
                outcome = "rejected",
                market_cap = mc,
                "outside market cap band"
            );
            return Outcome::Rejected(RejectReason::OutsideMarketCapBand { market_cap: mc });
        }
    }

    let record = TickerRecord::from(&extraction);
    tracing::info!(
        ticker,
        stage = "record",
        outcome = "recorded",
        undefined = extraction.metrics.undefined().len()
    );
    Outcome::Recorded(record)
}

/// Process every ticker with at most `config.concurrency` workers.
///
/// Result order always matches `tickers`, whatever order workers finish in.
pub fn run_pipeline(
    source: &dyn FinancialDataSource,
    tickers: &[String],
    config: &ScreenerConfig,
) -> RunOutcome {
    let deadline = config.run_timeout.map(|t| Instant::now() + t);
    let workers = config.concurrency.clamp(1, tickers.len().max(1));

    tracing::info!(tickers = tickers.len(), workers, "starting pipeline");

    let cursor = AtomicUsize::new(0);
    let (tx, rx) = mpsc::channel::<(usize, Outcome)>();

    thread::scope(|scope| {
        for _ in 0..workers {
            let tx = tx.clone();
            let cursor = &cursor;
            scope.spawn(move || {
                loop {
                    let index = cursor.fetch_add(1, Ordering::Relaxed);
                    let Some(ticker) = tickers.get(index) else {
                        break;
                    };
                    let outcome = process_ticker(source, ticker, config, deadline);
                    if tx.send((index, outcome)).is_err() {
                        break;
                    }
                }
            });
        }
    });
    drop(tx);

    let mut slots: Vec<Option<Outcome>> = vec![None; tickers.len()];
    for (index, outcome) in rx {
        slots[index] = Some(outcome);
    }

    let results: Vec<TickerResult> = tickers
        .iter()
        .zip(slots)
        .map(|(ticker, outcome)| TickerResult {
            ticker: ticker.clone(),
            outcome: outcome.unwrap_or(Outcome::Abandoned),
        })
        .collect();

    for r in &results {
        tracing::debug!(ticker = %r.ticker, outcome = r.outcome.label());
    }

    let summary = RunSummary::from_results(&results);
    RunOutcome { results, summary }
}

/// Full run: fetch tickers, process them, assemble and write the dataset once.
///
/// Only a ticker-source or output failure is returned as an error; zero
/// recorded tickers still writes a header-only dataset.
pub fn screen(
    tickers: &dyn TickerSource,
    source: &dyn FinancialDataSource,
    report: &dyn ReportPort,
    config: &ScreenerConfig,
    run_date: NaiveDate,
) -> Result<RunReport, ScreenerError> {
    let raw = tickers.get_tickers()?;
    let raw_count = raw.len();
    let tickers = dedup_tickers(raw);
    if tickers.len() != raw_count {
        tracing::info!(
            dropped = raw_count - tickers.len(),
            "removed blank or duplicate tickers"
        );
    }

    let outcome = run_pipeline(source, &tickers, config);
    let dataset = outcome.dataset(config);
    let destination = report_destination(&config.output_dir, &config.output_prefix, run_date);

    report.write(&dataset, &destination)?;
    tracing::info!(
        path = %destination.display(),
        rows = dataset.len(),
        "report written"
    );

    Ok(RunReport {
        destination,
        dataset,
        outcome,
    })
}

fn expired(deadline: Option<Instant>) -> bool {
    deadline.is_some_and(|d| Instant::now() >= d)
}
