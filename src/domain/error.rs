//! Domain error types.
//!
//! [`ScreenerError`] is reserved for failures that affect the whole run.
//! Per-ticker failures travel as [`SourceError`] / [`ExtractError`] and never
//! escape the ticker's own processing.

use std::fmt;

/// How a data-source call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceErrorKind {
    /// Unknown symbol or statement absent.
    NotFound,
    /// The source answered but the payload could not be decoded.
    Malformed,
    /// Network failure, timeout, rate limit or server-side error.
    Transient,
}

impl fmt::Display for SourceErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SourceErrorKind::NotFound => "not found",
            SourceErrorKind::Malformed => "malformed response",
            SourceErrorKind::Transient => "transient failure",
        };
        f.write_str(s)
    }
}

/// Error returned by a single `FinancialDataSource` call.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct SourceError {
    pub kind: SourceErrorKind,
    pub message: String,
}

impl SourceError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::NotFound,
            message: message.into(),
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Malformed,
            message: message.into(),
        }
    }

    pub fn transient(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Transient,
            message: message.into(),
        }
    }

    pub fn is_transient(&self) -> bool {
        self.kind == SourceErrorKind::Transient
    }
}

/// Whether a per-ticker failure may succeed on a later run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Transient,
    Structural,
}

impl From<SourceErrorKind> for FailureKind {
    fn from(kind: SourceErrorKind) -> Self {
        match kind {
            SourceErrorKind::Transient => FailureKind::Transient,
            SourceErrorKind::NotFound | SourceErrorKind::Malformed => FailureKind::Structural,
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Transient => f.write_str("transient"),
            FailureKind::Structural => f.write_str("structural"),
        }
    }
}

/// Extraction failure for one ticker.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{kind} failure extracting {ticker} ({stage}): {reason}")]
pub struct ExtractError {
    pub ticker: String,
    pub kind: FailureKind,
    pub stage: &'static str,
    pub reason: String,
}

impl ExtractError {
    pub fn from_source(ticker: &str, stage: &'static str, err: SourceError) -> Self {
        Self {
            ticker: ticker.to_string(),
            kind: err.kind.into(),
            stage,
            reason: err.message,
        }
    }
}

/// Top-level error type for fundscreen.
#[derive(Debug, thiserror::Error)]
pub enum ScreenerError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("ticker source unavailable: {reason}")]
    TickerSource { reason: String },

    #[error("failed to write report {path}: {reason}")]
    Output { path: String, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&ScreenerError> for std::process::ExitCode {
    fn from(err: &ScreenerError) -> Self {
        let code: u8 = match err {
            ScreenerError::Io(_) | ScreenerError::Output { .. } => 1,
            ScreenerError::ConfigParse { .. }
            | ScreenerError::ConfigInvalid { .. } => 2,
            ScreenerError::TickerSource { .. } => 3,
        };
        std::process::ExitCode::from(code)
    }
}
