//! Retry decorator for any [`FinancialDataSource`].
//!
//! Only transient errors are retried. NotFound and Malformed answers are
//! returned on the first attempt.

use std::thread;
use std::time::Duration;

use crate::domain::config::SourceConfig;
use crate::domain::error::SourceError;
use crate::domain::snapshot::{BalanceSheet, IncomeStatement, MarketQuote};
use crate::ports::financial_data_port::FinancialDataSource;

/// Delay strategy between attempts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Backoff {
    Fixed { delay: Duration },
    /// `base * factor^attempt`, capped at `max`, optionally with +/- 50% jitter.
    Exponential {
        base: Duration,
        factor: f64,
        max: Duration,
        jitter: bool,
    },
}

impl Backoff {
    /// Delay before retry number `attempt` (0-based).
    pub fn delay(self, attempt: u32) -> Duration {
        match self {
            Self::Fixed { delay } => delay,
            Self::Exponential {
                base,
                factor,
                max,
                jitter,
            } => {
                let exp = i32::try_from(attempt).unwrap_or(i32::MAX);
                let secs = (base.as_secs_f64() * factor.powi(exp)).min(max.as_secs_f64());
                let secs = if jitter {
                    secs * (0.5 + fastrand::f64())
                } else {
                    secs
                };
                Duration::from_secs_f64(secs.max(0.0))
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryConfig {
    /// Total attempts = `max_retries + 1`.
    pub max_retries: u32,
    pub backoff: Backoff,
}

impl RetryConfig {
    pub fn exponential(max_retries: u32, base: Duration) -> Self {
        Self {
            max_retries,
            backoff: Backoff::Exponential {
                base,
                factor: 2.0,
                max: base.saturating_mul(8),
                jitter: true,
            },
        }
    }

    pub fn fixed(delay: Duration, max_retries: u32) -> Self {
        Self {
            max_retries,
            backoff: Backoff::Fixed { delay },
        }
    }

    pub fn no_retry() -> Self {
        Self::fixed(Duration::ZERO, 0)
    }
}

impl From<&SourceConfig> for RetryConfig {
    fn from(config: &SourceConfig) -> Self {
        Self::exponential(config.max_retries, config.retry_base)
    }
}

pub struct RetryingSource<S> {
    inner: S,
    config: RetryConfig,
    sleep: fn(Duration),
}

impl<S: FinancialDataSource> RetryingSource<S> {
    pub fn new(inner: S, config: RetryConfig) -> Self {
        Self {
            inner,
            config,
            sleep: thread::sleep,
        }
    }

    /// Replace the sleep function; tests use a no-op.
    pub fn with_sleep(mut self, sleep: fn(Duration)) -> Self {
        self.sleep = sleep;
        self
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    fn call<T>(
        &self,
        ticker: &str,
        op: &'static str,
        f: impl Fn() -> Result<T, SourceError>,
    ) -> Result<T, SourceError> {
        let mut attempt = 0;
        loop {
            match f() {
                Err(e) if e.is_transient() && attempt < self.config.max_retries => {
                    let delay = self.config.backoff.delay(attempt);
                    tracing::debug!(
                        ticker,
                        op,
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "retrying"
                    );
                    (self.sleep)(delay);
                    attempt += 1;
                }
                other => return other,
            }
        }
    }
}

impl<S: FinancialDataSource> FinancialDataSource for RetryingSource<S> {
    fn balance_sheet(&self, ticker: &str) -> Result<Vec<BalanceSheet>, SourceError> {
        self.call(ticker, "balance_sheet", || self.inner.balance_sheet(ticker))
    }

    fn income_statement(&self, ticker: &str) -> Result<Vec<IncomeStatement>, SourceError> {
        self.call(ticker, "income_statement", || {
            self.inner.income_statement(ticker)
        })
    }

    fn market_cap(&self, ticker: &str) -> Result<Option<f64>, SourceError> {
        self.call(ticker, "market_cap", || self.inner.market_cap(ticker))
    }

    fn trailing_pe(&self, ticker: &str) -> Result<Option<f64>, SourceError> {
        self.call(ticker, "trailing_pe", || self.inner.trailing_pe(ticker))
    }

    fn market_quote(&self, ticker: &str) -> Result<MarketQuote, SourceError> {
        self.call(ticker, "market_quote", || self.inner.market_quote(ticker))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Fails `failures` times with `error`, then succeeds.
    struct Flaky {
        failures: u32,
        error: SourceError,
        calls: AtomicU32,
    }

    impl Flaky {
        fn new(failures: u32, error: SourceError) -> Self {
            Self {
                failures,
                error,
                calls: AtomicU32::new(0),
            }
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl FinancialDataSource for Flaky {
        fn balance_sheet(&self, _ticker: &str) -> Result<Vec<BalanceSheet>, SourceError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n < self.failures {
                Err(self.error.clone())
            } else {
                Ok(vec![BalanceSheet::default()])
            }
        }

        fn income_statement(&self, _ticker: &str) -> Result<Vec<IncomeStatement>, SourceError> {
            Ok(Vec::new())
        }

        fn market_cap(&self, _ticker: &str) -> Result<Option<f64>, SourceError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n < self.failures {
                Err(self.error.clone())
            } else {
                Ok(Some(1e9))
            }
        }
    }

    fn no_sleep(_: Duration) {}

    fn retrying(inner: Flaky, max_retries: u32) -> RetryingSource<Flaky> {
        RetryingSource::new(inner, RetryConfig::fixed(Duration::ZERO, max_retries))
            .with_sleep(no_sleep)
    }

    #[test]
    fn transient_error_retried_until_success() {
        let source = retrying(Flaky::new(2, SourceError::transient("503")), 3);
        assert!(source.balance_sheet("X").is_ok());
        assert_eq!(source.inner().calls(), 3);
    }

    #[test]
    fn retries_are_bounded() {
        let source = retrying(Flaky::new(10, SourceError::transient("timeout")), 2);
        let err = source.balance_sheet("X").unwrap_err();
        assert!(err.is_transient());
        assert_eq!(source.inner().calls(), 3);
    }

    #[test]
    fn structural_error_not_retried() {
        let source = retrying(Flaky::new(10, SourceError::not_found("X")), 5);
        assert!(source.balance_sheet("X").is_err());
        assert_eq!(source.inner().calls(), 1);
    }

    #[test]
    fn market_quote_is_retried_as_one_call() {
        let source = retrying(Flaky::new(1, SourceError::transient("503")), 2);
        let quote = source.market_quote("X").unwrap();
        assert_eq!(quote.market_cap, Some(1e9));
        assert_eq!(quote.trailing_pe, None);
        assert_eq!(source.inner().calls(), 2);
    }

    #[test]
    fn no_retry_makes_one_attempt() {
        let source = RetryingSource::new(
            Flaky::new(1, SourceError::transient("reset")),
            RetryConfig::no_retry(),
        );
        assert!(source.balance_sheet("X").is_err());
        assert_eq!(source.inner().calls(), 1);
    }

    #[test]
    fn fixed_backoff_is_constant() {
        let backoff = Backoff::Fixed {
            delay: Duration::from_millis(100),
        };
        assert_eq!(backoff.delay(0), Duration::from_millis(100));
        assert_eq!(backoff.delay(7), Duration::from_millis(100));
    }

    #[test]
    fn exponential_backoff_doubles_and_caps() {
        let backoff = Backoff::Exponential {
            base: Duration::from_millis(100),
            factor: 2.0,
            max: Duration::from_millis(500),
            jitter: false,
        };
        assert_eq!(backoff.delay(0), Duration::from_millis(100));
        assert_eq!(backoff.delay(1), Duration::from_millis(200));
        assert_eq!(backoff.delay(2), Duration::from_millis(400));
        assert_eq!(backoff.delay(3), Duration::from_millis(500));
    }

    #[test]
    fn jitter_stays_within_half_either_side() {
        let backoff = Backoff::Exponential {
            base: Duration::from_millis(100),
            factor: 2.0,
            max: Duration::from_secs(1),
            jitter: true,
        };
        for _ in 0..20 {
            let ms = backoff.delay(1).as_secs_f64() * 1000.0;
            assert!((100.0..=300.0).contains(&ms), "delay {ms}ms out of range");
        }
    }

    #[test]
    fn config_derived_from_source_settings() {
        let source = SourceConfig {
            max_retries: 3,
            retry_base: Duration::from_millis(250),
            ..SourceConfig::default()
        };
        let retry = RetryConfig::from(&source);
        assert_eq!(retry.max_retries, 3);
        assert!(matches!(
            retry.backoff,
            Backoff::Exponential { base, .. } if base == Duration::from_millis(250)
        ));
    }
}
