//! Concrete adapter implementations for ports.

pub mod csv_report_adapter;
pub mod csv_ticker_adapter;
pub mod file_config_adapter;
pub mod offline_source;
pub mod retrying_source;
#[cfg(feature = "yahoo")]
pub mod yahoo_adapter;
