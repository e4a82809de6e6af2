//! CSV report adapter implementing ReportPort.
//!
//! The dataset is serialized in memory, written to a temporary sibling of the
//! destination and renamed into place, so a failed run never leaves a
//! truncated report behind.

use std::fs;
use std::path::Path;

use crate::domain::error::ScreenerError;
use crate::domain::report::Dataset;
use crate::ports::report_port::ReportPort;

#[derive(Debug, Default)]
pub struct CsvReportAdapter;

impl CsvReportAdapter {
    pub fn new() -> Self {
        Self
    }

    /// Serialize the dataset, header row first.
    pub fn render(dataset: &Dataset) -> Result<Vec<u8>, csv::Error> {
        let mut wtr = csv::Writer::from_writer(Vec::new());
        wtr.write_record(&dataset.headers)?;
        for row in &dataset.rows {
            wtr.write_record(row)?;
        }
        wtr.into_inner().map_err(|e| csv::Error::from(e.into_error()))
    }
}

impl ReportPort for CsvReportAdapter {
    fn write(&self, dataset: &Dataset, destination: &Path) -> Result<(), ScreenerError> {
        let output_err = |reason: String| ScreenerError::Output {
            path: destination.display().to_string(),
            reason,
        };

        let bytes = Self::render(dataset).map_err(|e| output_err(e.to_string()))?;

        if let Some(parent) = destination.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| output_err(e.to_string()))?;
            }
        }

        let mut tmp_name = destination.as_os_str().to_owned();
        tmp_name.push(".tmp");
        let tmp = Path::new(&tmp_name);

        if let Err(e) = fs::write(tmp, &bytes) {
            let _ = fs::remove_file(tmp);
            return Err(output_err(e.to_string()));
        }
        if let Err(e) = fs::rename(tmp, destination) {
            let _ = fs::remove_file(tmp);
            return Err(output_err(e.to_string()));
        }

        Ok(())
    }
}
