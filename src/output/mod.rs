//! Candidate ingestion and report output

use crate::AggregateRow;

pub mod csv;
pub mod path;

/// Output errors
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    /// IO error
    #[error("IO error: {0}")]
    IoError(String),

    /// CSV read or write error
    #[error("CSV error: {0}")]
    CsvError(String),

    /// Buffer flush error
    #[error("flush error: {0}")]
    FlushError(String),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Writer lifecycle shared by report writers
pub trait OutputWriter {
    /// Flush any buffered data to disk
    fn flush(&mut self) -> OutputResult<()>;

    /// Close the writer and finalize output
    fn close(self) -> OutputResult<()>;
}

/// Trait for writing aggregated report rows
pub trait ReportWriter: OutputWriter {
    /// Write a single row
    fn write_row(&mut self, row: &AggregateRow) -> OutputResult<()>;

    /// Write multiple rows in order
    fn write_rows(&mut self, rows: &[AggregateRow]) -> OutputResult<()> {
        for row in rows {
            self.write_row(row)?;
        }
        Ok(())
    }
}
