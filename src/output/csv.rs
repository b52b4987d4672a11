//! CSV report writer and candidate list reader

use crate::identifier::is_canonical;
use crate::AggregateRow;
use csv::{ReaderBuilder, Trim, Writer, WriterBuilder};
use rust_decimal::Decimal;
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use tracing::{debug, info, warn};

use super::{OutputError, OutputResult, OutputWriter, ReportWriter};

const DEFAULT_BUFFER_SIZE: usize = 8192; // 8KB buffer

/// Column names of the report, in order
pub const REPORT_HEADERS: [&str; 5] = [
    "appid",
    "name",
    "family_playtime_forever_h",
    "family_playtime_recent_h",
    "owners_count",
];

/// Column holding a vanity handle in a candidate list
pub const VANITY_COLUMN: &str = "vanity";

/// Column holding a SteamID64 in a candidate list
pub const STEAM64_COLUMN: &str = "steam64_id";

/// Serialized form of one report row (CSV and JSON output)
#[derive(Debug, Serialize)]
pub struct ReportRecord<'a> {
    appid: &'a str,
    name: &'a str,
    family_playtime_forever_h: String,
    family_playtime_recent_h: String,
    owners_count: usize,
}

impl<'a> From<&'a AggregateRow> for ReportRecord<'a> {
    fn from(row: &'a AggregateRow) -> Self {
        Self {
            appid: &row.app_id,
            name: &row.name,
            family_playtime_forever_h: one_decimal(row.hours_forever),
            family_playtime_recent_h: one_decimal(row.hours_recent),
            owners_count: row.owners_count,
        }
    }
}

/// Format hours with exactly one decimal place, e.g. `8` -> `8.0`
pub fn one_decimal(hours: Decimal) -> String {
    let mut rounded = hours.round_dp(1);
    rounded.rescale(1);
    rounded.to_string()
}

/// CSV writer for aggregated report rows
///
/// The header is written on creation, so a report with no rows is still a
/// valid CSV file.
pub struct CsvReportWriter {
    writer: Writer<BufWriter<File>>,
    rows_written: u64,
}

impl CsvReportWriter {
    /// Create a new report writer
    ///
    /// # Arguments
    /// * `path` - Output file path; parent directories are created
    pub fn new<P: AsRef<Path>>(path: P) -> OutputResult<Self> {
        let path = path.as_ref();
        info!("Creating CSV report writer: path={}", path.display());

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| OutputError::IoError(format!("Failed to create directory: {e}")))?;
        }

        let file = File::create(path)
            .map_err(|e| OutputError::IoError(format!("Failed to create file: {e}")))?;

        let mut writer = WriterBuilder::new()
            .has_headers(false)
            .from_writer(BufWriter::with_capacity(DEFAULT_BUFFER_SIZE, file));
        writer
            .write_record(REPORT_HEADERS)
            .map_err(|e| OutputError::CsvError(format!("Failed to write header: {e}")))?;

        Ok(Self {
            writer,
            rows_written: 0,
        })
    }

    /// Number of rows written so far
    pub fn rows_written(&self) -> u64 {
        self.rows_written
    }
}

impl ReportWriter for CsvReportWriter {
    fn write_row(&mut self, row: &AggregateRow) -> OutputResult<()> {
        self.writer
            .serialize(ReportRecord::from(row))
            .map_err(|e| OutputError::CsvError(format!("Failed to write row: {e}")))?;
        self.rows_written += 1;
        Ok(())
    }
}

impl OutputWriter for CsvReportWriter {
    fn flush(&mut self) -> OutputResult<()> {
        self.writer
            .flush()
            .map_err(|e| OutputError::FlushError(format!("Failed to flush: {e}")))
    }

    fn close(mut self) -> OutputResult<()> {
        self.flush()?;

        let buf_writer = self
            .writer
            .into_inner()
            .map_err(|e| OutputError::IoError(format!("Failed to get inner writer: {e}")))?;
        let file = buf_writer
            .into_inner()
            .map_err(|e| OutputError::IoError(format!("Failed to get file handle: {e}")))?;
        file.sync_all()
            .map_err(|e| OutputError::IoError(format!("Failed to sync file: {e}")))?;

        info!("CSV report closed: {} rows written", self.rows_written);
        Ok(())
    }
}

/// Write a whole report to `path`
pub fn write_report<P: AsRef<Path>>(path: P, rows: &[AggregateRow]) -> OutputResult<u64> {
    let mut writer = CsvReportWriter::new(path)?;
    writer.write_rows(rows)?;
    let written = writer.rows_written();
    writer.close()?;
    Ok(written)
}

/// Read extra candidates from a `vanity,steam64_id` CSV file
///
/// Returns `(label, handle)` pairs in file order. A row with a canonical
/// `steam64_id` uses it as the handle (labelled by the vanity when present);
/// otherwise a non-empty `vanity` is the handle. Rows with neither are
/// skipped, as are missing columns.
pub fn read_candidates_csv<P: AsRef<Path>>(path: P) -> OutputResult<Vec<(String, String)>> {
    let path = path.as_ref();
    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::All)
        .from_path(path)
        .map_err(|e| OutputError::IoError(format!("Failed to open {}: {e}", path.display())))?;

    let headers = reader
        .headers()
        .map_err(|e| OutputError::CsvError(format!("Failed to read header: {e}")))?
        .clone();
    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h.trim_start_matches('\u{feff}').eq_ignore_ascii_case(name))
    };
    let vanity_idx = column(VANITY_COLUMN);
    let steam64_idx = column(STEAM64_COLUMN);
    if vanity_idx.is_none() && steam64_idx.is_none() {
        warn!(
            path = %path.display(),
            "Candidate CSV has neither a '{VANITY_COLUMN}' nor a '{STEAM64_COLUMN}' column"
        );
    }

    let mut candidates = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record =
            record.map_err(|e| OutputError::CsvError(format!("Failed to read row {}: {e}", line + 2)))?;
        let field = |idx: Option<usize>| idx.and_then(|i| record.get(i)).unwrap_or("").trim();
        let vanity = field(vanity_idx);
        let steam64 = field(steam64_idx);

        if is_canonical(steam64) {
            let label = if vanity.is_empty() { steam64 } else { vanity };
            candidates.push((label.to_string(), steam64.to_string()));
        } else if !vanity.is_empty() {
            candidates.push((vanity.to_string(), vanity.to_string()));
        } else {
            debug!(row = line + 2, "Skipping candidate row without a usable handle");
        }
    }

    info!(path = %path.display(), candidates = candidates.len(), "Read candidate CSV");
    Ok(candidates)
}
