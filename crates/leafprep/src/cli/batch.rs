//! Shared plumbing for the batch commands: progress, reports, summary.

use indicatif::{ProgressBar, ProgressStyle};
use leafprep_core::pipeline::BatchEntry;
use leafprep_core::{ReportFormat, ReportWriter, RunSummary};
use serde::Serialize;
use std::path::Path;

/// One report record: the command's own outcome, or a hard failure.
#[derive(Serialize)]
#[serde(untagged)]
pub enum Record<'a, T> {
    Done(&'a T),
    Failed {
        path: &'a Path,
        outcome: &'static str,
        error: &'a str,
    },
}

impl<'a, T> From<&'a BatchEntry<T>> for Record<'a, T> {
    fn from(entry: &'a BatchEntry<T>) -> Self {
        match &entry.outcome {
            Ok(value) => Record::Done(value),
            Err(error) => Record::Failed {
                path: &entry.path,
                outcome: "failed",
                error,
            },
        }
    }
}

/// Write every entry of a finished batch to `path`.
pub fn write_report<T: Serialize>(
    path: &Path,
    format: ReportFormat,
    entries: &[BatchEntry<T>],
) -> anyhow::Result<()> {
    let mut writer = ReportWriter::create(path, format)?;
    for entry in entries {
        writer.record(&Record::from(entry))?;
    }
    let records = writer.records();
    writer.finish()?;
    tracing::info!("Report with {} records written to {:?}", records, path);
    Ok(())
}

/// Create a progress bar for a batch of `total` files.
pub fn create_progress_bar(total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);
    let style = ProgressStyle::default_bar()
        .template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-");
    pb.set_style(style);
    pb.set_message("starting...");
    pb
}

/// Print the summary table after a batch.
pub fn print_summary(title: &str, summary: &RunSummary, outputs_label: &str) {
    eprintln!();
    eprintln!("  ====================================");
    eprintln!("  {:^34}", title);
    eprintln!("  ====================================");
    eprintln!("    Succeeded:    {:>8}", summary.succeeded);
    if summary.partial > 0 {
        eprintln!("    Partial:      {:>8}", summary.partial);
    }
    if summary.skipped > 0 {
        eprintln!("    Skipped:      {:>8}", summary.skipped);
    }
    if summary.failed > 0 {
        eprintln!("    Failed:       {:>8}", summary.failed);
    }
    eprintln!("  ------------------------------------");
    eprintln!("    Total:        {:>8}", summary.candidates);
    eprintln!("    {:<14}{:>8}", format!("{outputs_label}:"), summary.outputs_written);
    eprintln!(
        "    Duration:     {:>7.1}s",
        summary.elapsed_ms as f64 / 1000.0
    );
    eprintln!("    Rate:         {:>7.1} img/sec", summary.rate());
    eprintln!("  ====================================");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_report_mixes_done_and_failed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.json");
        let entries = vec![
            BatchEntry {
                path: PathBuf::from("a.JPG"),
                outcome: Ok(serde_json::json!({"outcome": "completed"})),
            },
            BatchEntry {
                path: PathBuf::from("b.JPG"),
                outcome: Err("Decode error".to_string()),
            },
        ];

        write_report(&path, ReportFormat::Json, &entries).unwrap();
        let parsed: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed[0]["outcome"], "completed");
        assert_eq!(parsed[1]["outcome"], "failed");
        assert_eq!(parsed[1]["path"], "b.JPG");
    }

    #[test]
    fn test_progress_bar_length() {
        let pb = create_progress_bar(12);
        assert_eq!(pb.length(), Some(12));
    }
}
