//! Report file naming
//!
//! Reports are named `libraries_{YYYY-MM-DD_HH-MM}_seed-{slug}.csv` and placed
//! directly under the output directory.
//!
//! # Usage Example
//!
//! ```rust
//! use steam_family_aggregator::output::path::ReportPathBuilder;
//! use chrono::NaiveDate;
//! use std::path::PathBuf;
//!
//! let at = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap().and_hms_opt(7, 5, 0).unwrap();
//! let path = ReportPathBuilder::new(PathBuf::from("output"))
//!     .with_seed_label(Some("Gabe Newell"))
//!     .with_timestamp(at)
//!     .build();
//! assert_eq!(path, PathBuf::from("output/libraries_2024-03-09_07-05_seed-gabe-newell.csv"));
//! ```

use super::{OutputError, OutputResult};
use crate::identifier::slugify;
use chrono::{Local, NaiveDateTime};
use std::path::PathBuf;

/// Timestamp layout used in report file names
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M";

/// Builder for report output paths
#[derive(Debug, Clone)]
pub struct ReportPathBuilder {
    output_dir: PathBuf,
    seed_label: Option<String>,
    timestamp: Option<NaiveDateTime>,
}

impl ReportPathBuilder {
    /// Start a path under `output_dir`
    pub fn new(output_dir: PathBuf) -> Self {
        Self {
            output_dir,
            seed_label: None,
            timestamp: None,
        }
    }

    /// Label slugged into the file name (the seed as the user typed it)
    pub fn with_seed_label(mut self, label: Option<&str>) -> Self {
        self.seed_label = label.map(str::to_string);
        self
    }

    /// Fix the timestamp instead of using the local time at build
    pub fn with_timestamp(mut self, timestamp: NaiveDateTime) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Build the full report path
    pub fn build(&self) -> PathBuf {
        self.output_dir.join(self.file_name())
    }

    /// Create the output directory if needed
    pub fn ensure_directories(&self) -> OutputResult<()> {
        std::fs::create_dir_all(&self.output_dir).map_err(|e| {
            OutputError::IoError(format!(
                "Failed to create {}: {e}",
                self.output_dir.display()
            ))
        })
    }

    fn file_name(&self) -> String {
        let timestamp = self
            .timestamp
            .unwrap_or_else(|| Local::now().naive_local())
            .format(TIMESTAMP_FORMAT);
        let slug = slugify(self.seed_label.as_deref().unwrap_or(""));
        format!("libraries_{timestamp}_seed-{slug}.csv")
    }
}
