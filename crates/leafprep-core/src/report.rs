//! Run reports: per-file outcome records as a JSON array or JSON Lines.
//!
//! JSON Lines records are written as they arrive, so a report of a long batch
//! is useful even if the run is interrupted. JSON records are buffered and
//! written as one array by [`ReportWriter::finish`].

use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::Duration;

use crate::error::Result;

/// Report file format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReportFormat {
    /// One JSON array of records
    #[default]
    Json,
    /// One record per line
    JsonLines,
}

/// Serializes outcome records to a writer.
pub struct ReportWriter<W: Write> {
    writer: W,
    format: ReportFormat,
    pending: Vec<serde_json::Value>,
    records: usize,
}

impl ReportWriter<BufWriter<File>> {
    /// Create (or truncate) a report file.
    pub fn create(path: &Path, format: ReportFormat) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let file = File::create(path)?;
        Ok(Self::new(BufWriter::new(file), format))
    }
}

impl<W: Write> ReportWriter<W> {
    pub fn new(writer: W, format: ReportFormat) -> Self {
        Self {
            writer,
            format,
            pending: Vec::new(),
            records: 0,
        }
    }

    /// Add one record.
    pub fn record<T: Serialize>(&mut self, item: &T) -> Result<()> {
        match self.format {
            ReportFormat::Json => self.pending.push(serde_json::to_value(item)?),
            ReportFormat::JsonLines => {
                serde_json::to_writer(&mut self.writer, item)?;
                writeln!(self.writer)?;
            }
        }
        self.records += 1;
        Ok(())
    }

    /// Number of records added so far.
    pub fn records(&self) -> usize {
        self.records
    }

    /// Write any buffered records, flush, and return the writer.
    pub fn finish(mut self) -> Result<W> {
        if self.format == ReportFormat::Json {
            serde_json::to_writer_pretty(&mut self.writer, &self.pending)?;
            writeln!(self.writer)?;
        }
        self.writer.flush()?;
        Ok(self.writer)
    }
}

/// Totals for one batch run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    /// Candidates the batch ran on
    pub candidates: usize,

    /// Candidates fully processed
    pub succeeded: usize,

    /// Candidates processed with some outputs failing
    pub partial: usize,

    /// Candidates skipped as ineligible
    pub skipped: usize,

    /// Candidates that failed outright
    pub failed: usize,

    /// Files written across the batch
    pub outputs_written: usize,

    /// Wall-clock duration in milliseconds
    pub elapsed_ms: u64,
}

impl RunSummary {
    pub fn with_elapsed(mut self, elapsed: Duration) -> Self {
        self.elapsed_ms = elapsed.as_millis() as u64;
        self
    }

    /// Candidates per second over the run.
    pub fn rate(&self) -> f64 {
        if self.elapsed_ms == 0 {
            return 0.0;
        }
        self.candidates as f64 / (self.elapsed_ms as f64 / 1000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Record {
        path: &'static str,
        written: usize,
    }

    const RECORDS: [Record; 2] = [
        Record {
            path: "leaf_a.JPG",
            written: 6,
        },
        Record {
            path: "leaf_b.JPG",
            written: 5,
        },
    ];

    #[test]
    fn test_json_array() {
        let mut report = ReportWriter::new(Vec::new(), ReportFormat::Json);
        for record in &RECORDS {
            report.record(record).unwrap();
        }
        assert_eq!(report.records(), 2);

        let output = String::from_utf8(report.finish().unwrap()).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed.as_array().unwrap().len(), 2);
        assert_eq!(parsed[1]["written"], 5);
    }

    #[test]
    fn test_json_lines_stream() {
        let mut report = ReportWriter::new(Vec::new(), ReportFormat::JsonLines);
        for record in &RECORDS {
            report.record(record).unwrap();
        }
        let output = String::from_utf8(report.finish().unwrap()).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("\"path\":\"leaf_a.JPG\""));
    }

    #[test]
    fn test_empty_json_report_is_empty_array() {
        let report = ReportWriter::new(Vec::new(), ReportFormat::Json);
        let output = String::from_utf8(report.finish().unwrap()).unwrap();
        assert_eq!(output.trim(), "[]");
    }

    #[test]
    fn test_create_makes_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reports/run.jsonl");
        let mut report = ReportWriter::create(&path, ReportFormat::JsonLines).unwrap();
        report.record(&RECORDS[0]).unwrap();
        report.finish().unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap().lines().count(), 1);
    }

    #[test]
    fn test_summary_rate() {
        let summary = RunSummary {
            candidates: 10,
            succeeded: 10,
            ..Default::default()
        }
        .with_elapsed(Duration::from_secs(2));
        assert_eq!(summary.rate(), 5.0);
        assert_eq!(RunSummary::default().rate(), 0.0);
    }
}
