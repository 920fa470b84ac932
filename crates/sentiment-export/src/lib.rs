//! File export and re-import of analysis results.
//!
//! Records go out as flat CSV or pretty JSON; metrics as a `Metric,Value`
//! table. Exported batches can be read back for comparison.

use chrono::NaiveDateTime;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use tracing::info;

use sentiment_core::error::{Error, Result};
use sentiment_core::types::SentimentRecord;

pub mod records;
pub mod summary;

pub use records::{read_csv, read_json, write_csv, write_json};
pub use summary::write_summary_csv;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase).as_deref() {
            Some("csv") => Ok(ExportFormat::Csv),
            Some("json") => Ok(ExportFormat::Json),
            _ => Err(Error::UnsupportedFile(path.to_path_buf())),
        }
    }
}

/// `sentiment_analysis_YYYYMMDD_HHMMSS.<ext>`
pub fn default_file_name(format: ExportFormat, now: NaiveDateTime) -> String {
    format!("sentiment_analysis_{}.{}", now.format("%Y%m%d_%H%M%S"), format.extension())
}

fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> Error + '_ { move |source| Error::Io { path: path.to_path_buf(), source } }

/// Writes records to `path` in the format its extension names.
pub fn export_records(records: &[SentimentRecord], path: &Path) -> Result<()> {
    let format = ExportFormat::from_path(path)?;
    let file = File::create(path).map_err(io_err(path))?;
    let writer = BufWriter::new(file);
    match format {
        ExportFormat::Csv => write_csv(records, writer)?,
        ExportFormat::Json => write_json(records, writer)?,
    }
    info!(path = %path.display(), count = records.len(), "exported records");
    Ok(())
}

/// Reads a file previously written by [`export_records`].
pub fn import_records(path: &Path) -> Result<Vec<SentimentRecord>> {
    let format = ExportFormat::from_path(path)?;
    let reader = BufReader::new(File::open(path).map_err(io_err(path))?);
    let records = match format {
        ExportFormat::Csv => read_csv(reader)?,
        ExportFormat::Json => read_json(reader)?,
    };
    info!(path = %path.display(), count = records.len(), "imported records");
    Ok(records)
}

pub fn export_summary(metrics: &sentiment_analysis::MetricsSummary, path: &Path) -> Result<()> {
    let file = File::create(path).map_err(io_err(path))?;
    write_summary_csv(metrics, BufWriter::new(file))?;
    info!(path = %path.display(), "exported summary");
    Ok(())
}
