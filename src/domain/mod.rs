//! Core domain types and logic.

pub mod config;
pub mod config_validation;
pub mod error;
pub mod extractor;
pub mod metrics;
pub mod pipeline;
pub mod record;
pub mod report;
pub mod snapshot;
pub mod ticker;
pub mod validator;
