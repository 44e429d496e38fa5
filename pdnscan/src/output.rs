//! Report output for scan results.
//!
//! One row per [`PdnResult`]. Rows carry both the raw sample and its masked
//! form so reviewers can audit a finding without reading bulk data at a
//! glance. CSV always starts with a header row, even for an empty scan.

use clap::ValueEnum;
use pdnscan_core::models::{PdnCategory, PdnResult};
use pdnscan_core::security::mask_sample_value;
use pdnscan_core::{PdnScanError, Result};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Report file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ReportFormat {
    /// Comma separated values with a header row
    #[default]
    Csv,
    /// One JSON object per line
    Jsonl,
}

/// Column names, in row order.
pub const REPORT_COLUMNS: [&str; 12] = [
    "server",
    "database",
    "schema",
    "object",
    "object_type",
    "column",
    "pdn_detected",
    "pdn_category",
    "evidence",
    "pattern",
    "sample_value",
    "masked_sample_value",
];

/// One persisted report row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRecord {
    pub server: String,
    pub database: String,
    pub schema: String,
    pub object: String,
    pub object_type: String,
    pub column: String,
    /// `Yes`, `No`, or `Unknown` when the column was not processed
    pub pdn_detected: &'static str,
    pub pdn_category: String,
    pub evidence: String,
    pub pattern: String,
    pub sample_value: String,
    pub masked_sample_value: String,
}

impl ReportRecord {
    pub fn from_result(server: &str, result: &PdnResult) -> Self {
        let pdn_detected = match result.category {
            PdnCategory::None => "No",
            PdnCategory::Unprocessed => "Unknown",
            _ => "Yes",
        };

        Self {
            server: server.to_string(),
            database: result.database.clone(),
            schema: result.schema.clone(),
            object: result.table.clone(),
            object_type: result.table_kind.to_string(),
            column: result.column.clone(),
            pdn_detected,
            pdn_category: result.category.to_string(),
            evidence: result.evidence.to_string(),
            pattern: result.matched_pattern.clone(),
            sample_value: result.sample_value.clone(),
            masked_sample_value: mask_sample_value(&result.sample_value),
        }
    }
}

enum Encoder<W: Write> {
    Csv(csv::Writer<W>),
    Jsonl(W),
}

/// Streams report rows into any writer.
pub struct ReportWriter<W: Write> {
    encoder: Encoder<W>,
    server: String,
    rows: usize,
}

impl<W: Write> std::fmt::Debug for ReportWriter<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReportWriter")
            .field("server", &self.server)
            .field("rows", &self.rows)
            .finish_non_exhaustive()
    }
}

impl<W: Write> ReportWriter<W> {
    /// Wraps `writer`; for CSV the header row is written immediately.
    ///
    /// # Errors
    /// Returns error if the header row cannot be written
    pub fn new(writer: W, format: ReportFormat, server: impl Into<String>) -> Result<Self> {
        let encoder = match format {
            ReportFormat::Csv => {
                let mut csv = csv::WriterBuilder::new()
                    .has_headers(false)
                    .from_writer(writer);
                csv.write_record(REPORT_COLUMNS).map_err(csv_error)?;
                Encoder::Csv(csv)
            }
            ReportFormat::Jsonl => Encoder::Jsonl(writer),
        };

        Ok(Self {
            encoder,
            server: server.into(),
            rows: 0,
        })
    }

    /// Appends one row.
    ///
    /// # Errors
    /// Returns error if the row cannot be encoded or written
    pub fn write(&mut self, result: &PdnResult) -> Result<()> {
        let record = ReportRecord::from_result(&self.server, result);

        match &mut self.encoder {
            Encoder::Csv(csv) => csv.serialize(&record).map_err(csv_error)?,
            Encoder::Jsonl(writer) => {
                serde_json::to_writer(&mut *writer, &record).map_err(|e| {
                    PdnScanError::Serialization {
                        context: "Failed to encode report row".to_string(),
                        source: e,
                    }
                })?;
                writer.write_all(b"\n").map_err(|e| io_error("report row", e))?;
            }
        }

        self.rows += 1;
        Ok(())
    }

    /// Flushes buffered rows and returns how many were written.
    ///
    /// # Errors
    /// Returns error if the final flush fails
    pub fn finish(self) -> Result<usize> {
        match self.encoder {
            Encoder::Csv(mut csv) => csv.flush(),
            Encoder::Jsonl(mut writer) => writer.flush(),
        }
        .map_err(|e| io_error("report", e))?;

        Ok(self.rows)
    }
}

/// Creates (or truncates) the report file at `path`.
///
/// # Errors
/// Returns error if the file cannot be created
pub fn create_report(
    path: &Path,
    format: ReportFormat,
    server: &str,
) -> Result<ReportWriter<BufWriter<File>>> {
    let file = File::create(path).map_err(|e| PdnScanError::Io {
        context: format!("Failed to create {}", path.display()),
        source: e,
    })?;
    ReportWriter::new(BufWriter::new(file), format, server)
}

/// Drains `receiver` into `writer` on a blocking thread until every sender
/// is dropped. Resolves to the number of rows written.
///
/// When writing fails the receiver is dropped, which makes the scanner's next
/// `emit` fail and ends the scan.
pub fn spawn_report_writer<W>(
    mut receiver: mpsc::Receiver<PdnResult>,
    mut writer: ReportWriter<W>,
) -> JoinHandle<Result<usize>>
where
    W: Write + Send + 'static,
{
    tokio::task::spawn_blocking(move || {
        while let Some(result) = receiver.blocking_recv() {
            writer.write(&result)?;
        }
        writer.finish()
    })
}

fn csv_error(error: csv::Error) -> PdnScanError {
    io_error("report row", error.into())
}

fn io_error(what: &str, source: std::io::Error) -> PdnScanError {
    PdnScanError::Io {
        context: format!("Failed to write {what}"),
        source,
    }
}
