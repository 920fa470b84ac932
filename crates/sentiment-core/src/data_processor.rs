//! Turns uploaded files (CSV with a `text` column, or plain text with one
//! entry per line) into [`TextInput`]s.
//!
//! Shape errors fail the offending file only. Row-level problems are
//! collected as [`SkippedItem`]s and the remaining rows are still returned.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::types::TextInput;

/// A row or file that was not (fully) used, with the reason.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedItem {
    pub origin: String,
    /// 1-based line number within `origin`, when the problem is row-level.
    pub line: Option<usize>,
    pub reason: String,
}

/// Inputs gathered from one or more files plus everything that was skipped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoadReport {
    pub inputs: Vec<TextInput>,
    pub skipped: Vec<SkippedItem>,
}

impl LoadReport {
    fn merge(&mut self, other: LoadReport) {
        self.inputs.extend(other.inputs);
        self.skipped.extend(other.skipped);
    }
}

#[derive(Default)]
pub struct DataProcessor {
    default_source: Option<String>,
}

impl DataProcessor {
    pub fn new() -> Self { Self::default() }

    /// Source applied to rows without one. Without it each file's name is used.
    pub fn with_default_source(mut self, source: impl Into<String>) -> Self {
        self.default_source = Some(source.into());
        self
    }

    /// Loads every supported file named in `paths`, descending into directories.
    /// A file that cannot be read or has the wrong shape is reported once in
    /// `skipped` and does not stop the others.
    pub fn process_paths(&self, paths: &[PathBuf]) -> LoadReport {
        let mut report = LoadReport::default();
        for path in paths {
            let files = if path.is_dir() { self.list_input_files(path) } else { vec![path.clone()] };
            if files.is_empty() {
                warn!(dir = %path.display(), "no .csv or .txt files found");
            }
            for (file_index, file_path) in files.iter().enumerate() {
                info!(file = %file_path.display(), "processing file {}/{}", file_index + 1, files.len());
                match self.process_file(file_path) {
                    Ok(file_report) => report.merge(file_report),
                    Err(e) => {
                        warn!(file = %file_path.display(), error = %e, "skipping file");
                        report.skipped.push(SkippedItem { origin: file_path.display().to_string(), line: None, reason: e.to_string() });
                    }
                }
            }
        }
        info!(inputs = report.inputs.len(), skipped = report.skipped.len(), "finished loading inputs");
        report
    }

    pub fn process_file(&self, file_path: &Path) -> Result<LoadReport> {
        let origin = file_path.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_else(|| file_path.display().to_string());
        let source = self.default_source.clone().unwrap_or_else(|| origin.clone());
        let content = read_lossy(file_path)?;
        match file_path.extension().and_then(|s| s.to_str()).map(str::to_ascii_lowercase).as_deref() {
            Some("csv") => parse_csv(content.as_bytes(), &origin, Some(&source)),
            Some("txt") => Ok(parse_lines(&content, Some(&source))),
            _ => Err(Error::UnsupportedFile(file_path.to_path_buf())),
        }
    }

    fn list_input_files(&self, root: &Path) -> Vec<PathBuf> {
        let mut files = Vec::new();
        for entry in walkdir::WalkDir::new(root).into_iter().filter_map(|e| e.ok()).filter(|e| e.file_type().is_file()) {
            let path = entry.path();
            let ext = path.extension().and_then(|s| s.to_str()).map(str::to_ascii_lowercase);
            if matches!(ext.as_deref(), Some("csv") | Some("txt")) { files.push(path.to_path_buf()); }
        }
        files.sort();
        files
    }
}

/// Reads a file as text, replacing invalid UTF-8 sequences with U+FFFD.
pub fn read_lossy(file_path: &Path) -> Result<String> {
    let bytes = fs::read(file_path).map_err(|source| Error::Io { path: file_path.to_path_buf(), source })?;
    match String::from_utf8(bytes) {
        Ok(content) => Ok(content),
        Err(e) => {
            warn!(file = %file_path.display(), "invalid UTF-8 replaced");
            Ok(String::from_utf8_lossy(e.as_bytes()).into_owned())
        }
    }
}

/// Parses CSV rows. The header must contain a `text` column (matched
/// case-insensitively); optional `source` and `date` columns fill metadata.
pub fn parse_csv<R: Read>(reader: R, origin: &str, default_source: Option<&str>) -> Result<LoadReport> {
    let mut csv_reader = csv::ReaderBuilder::new().flexible(false).trim(csv::Trim::Headers).from_reader(reader);
    let headers = csv_reader.headers()?.clone();
    let column = |name: &str| headers.iter().position(|h| h.eq_ignore_ascii_case(name));
    let text_col = column("text").ok_or_else(|| Error::MissingTextColumn { found: headers.iter().collect::<Vec<_>>().join(", ") })?;
    let source_col = column("source");
    let date_col = column("date").or_else(|| column("timestamp"));

    let mut report = LoadReport::default();
    for (row_index, row) in csv_reader.records().enumerate() {
        // physical line where the record starts; quoted fields may span lines
        let fallback_line = row_index + 2;
        let row = match row {
            Ok(row) => row,
            Err(e) => {
                let line = e.position().map_or(fallback_line, |p| p.line() as usize);
                report.skipped.push(SkippedItem { origin: origin.to_string(), line: Some(line), reason: e.to_string() });
                continue;
            }
        };
        let line = row.position().map_or(fallback_line, |p| p.line() as usize);
        let text = row.get(text_col).unwrap_or("");
        if text.trim().is_empty() {
            report.skipped.push(SkippedItem { origin: origin.to_string(), line: Some(line), reason: "empty text".into() });
            continue;
        }
        let source = source_col
            .and_then(|i| row.get(i))
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .or_else(|| default_source.map(str::to_string));
        let timestamp = match date_col.and_then(|i| row.get(i)).map(str::trim).filter(|s| !is_missing(s)) {
            None => None,
            Some(raw) => match parse_timestamp(raw) {
                Ok(ts) => Some(ts),
                Err(e) => {
                    report.skipped.push(SkippedItem { origin: origin.to_string(), line: Some(line), reason: format!("{}; kept without timestamp", e) });
                    None
                }
            },
        };
        report.inputs.push(TextInput { text: text.to_string(), source, timestamp });
    }
    if !report.skipped.is_empty() {
        warn!(origin, skipped = report.skipped.len(), "some CSV rows were skipped or degraded");
    }
    Ok(report)
}

/// One input per non-empty trimmed line.
pub fn parse_lines(content: &str, default_source: Option<&str>) -> LoadReport {
    let inputs = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| TextInput { text: line.to_string(), source: default_source.map(str::to_string), timestamp: None })
        .collect();
    LoadReport { inputs, skipped: Vec::new() }
}

/// Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DDTHH:MM:SS` and
/// `YYYY-MM-DD` (midnight UTC).
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Ok(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| Error::InvalidTimestamp(raw.to_string()))
}

fn is_missing(raw: &str) -> bool {
    raw.is_empty() || raw.eq_ignore_ascii_case("n/a") || raw.eq_ignore_ascii_case("nan")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn parse_timestamp_accepts_common_formats() {
        let d = parse_timestamp("2024-03-05").expect("date");
        assert_eq!((d.year(), d.month(), d.day(), d.hour()), (2024, 3, 5, 0));
        let dt = parse_timestamp("2024-03-05 14:30:00").expect("datetime");
        assert_eq!(dt.hour(), 14);
        let rfc = parse_timestamp("2024-03-05T14:30:00+02:00").expect("rfc3339");
        assert_eq!(rfc.hour(), 12);
        assert!(parse_timestamp("yesterday").is_err());
    }

    #[test]
    fn parse_csv_requires_text_column() {
        let data = "body,source\nhello,review\n";
        let err = parse_csv(data.as_bytes(), "a.csv", None).expect_err("missing column");
        assert!(matches!(err, Error::MissingTextColumn { .. }));
    }

    #[test]
    fn parse_csv_reads_metadata_and_degrades_bad_dates() {
        let data = "Text,source,date\ngreat stuff,review,2024-01-02\nmeh,,not-a-date\n,twitter,2024-01-03\n";
        let report = parse_csv(data.as_bytes(), "a.csv", Some("a.csv")).expect("parse");
        assert_eq!(report.inputs.len(), 2);
        assert_eq!(report.inputs[0].source.as_deref(), Some("review"));
        assert!(report.inputs[0].timestamp.is_some());
        assert_eq!(report.inputs[1].source.as_deref(), Some("a.csv"));
        assert!(report.inputs[1].timestamp.is_none());
        assert_eq!(report.skipped.len(), 2);
        assert_eq!(report.skipped[0].line, Some(3));
        assert_eq!(report.skipped[1].line, Some(4));
    }

    #[test]
    fn parse_csv_reports_physical_lines_for_multiline_fields() {
        let data = "text,date\n\"line one\nline two\",2024-01-01\nok,not-a-date\n";
        let report = parse_csv(data.as_bytes(), "m.csv", None).expect("parse");
        assert_eq!(report.inputs.len(), 2);
        assert_eq!(report.inputs[0].text, "line one\nline two");
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].line, Some(4));
    }

    #[test]
    fn parse_csv_skips_rows_with_wrong_field_count() {
        let data = "text,source\nfirst,review\nshort\nthird,review\n";
        let report = parse_csv(data.as_bytes(), "s.csv", None).expect("parse");
        let texts: Vec<&str> = report.inputs.iter().map(|i| i.text.as_str()).collect();
        assert_eq!(texts, ["first", "third"]);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].line, Some(3));
    }

    #[test]
    fn read_lossy_replaces_invalid_bytes() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("bytes.txt");
        fs::write(&path, b"ok\xff\nfine\n").expect("write");
        let content = read_lossy(&path).expect("read");
        assert_eq!(content, "ok\u{FFFD}\nfine\n");
    }

    #[test]
    fn parse_lines_skips_blank_lines() {
        let report = parse_lines("first\n\n  second  \n   \n", Some("x.txt"));
        let texts: Vec<&str> = report.inputs.iter().map(|i| i.text.as_str()).collect();
        assert_eq!(texts, ["first", "second"]);
    }
}
