//! Port traits at the system seams.

pub mod config_port;
pub mod financial_data_port;
pub mod report_port;
pub mod ticker_port;
