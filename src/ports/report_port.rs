//! Report persistence port trait.

use std::path::Path;

use crate::domain::error::ScreenerError;
use crate::domain::report::Dataset;

/// Port for persisting the assembled dataset.
pub trait ReportPort {
    /// Write the whole dataset to `destination` in one step.
    fn write(&self, dataset: &Dataset, destination: &Path) -> Result<(), ScreenerError>;
}
