//! The `leafprep augment` command.

use clap::Args;
use image::ImageFormat;
use leafprep_core::config::expand_path;
use leafprep_core::pipeline::{run_batch, BatchEntry, FileDiscovery};
use leafprep_core::{
    AugmentOptions, AugmentOutcome, AugmentReport, Augmenter, Config, DerivativeOutcome,
    RunSummary,
};
use std::path::{Path, PathBuf};
use std::time::Instant;

use super::batch::{create_progress_bar, print_summary, write_report};
use super::console::{Notice, Reporter};
use super::types::OutputFormat;

/// Arguments for the `augment` command.
#[derive(Args, Debug)]
pub struct AugmentArgs {
    /// Image files, directories or glob patterns
    #[arg(required = true)]
    pub inputs: Vec<String>,

    /// Write derivatives here instead of next to each source
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Number of parallel workers (defaults to processing.parallel_workers)
    #[arg(short, long)]
    pub parallel: Option<usize>,

    /// Save a side-by-side preview collage per source into this directory
    #[arg(long, value_name = "DIR")]
    pub preview_dir: Option<PathBuf>,

    /// Write a per-file report to this file
    #[arg(long, value_name = "FILE")]
    pub report: Option<PathBuf>,

    /// Report format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Only print skips and failures
    #[arg(short, long)]
    pub quiet: bool,
}

/// Execute the augment command.
pub async fn execute(args: AugmentArgs, mut config: Config) -> anyhow::Result<()> {
    if let Some(parallel) = args.parallel {
        config.processing.parallel_workers = parallel;
    }
    config.validate()?;

    let output_dir = args
        .output_dir
        .as_deref()
        .map(expand_path)
        .or_else(|| config.output_dir());
    let preview_dir = args.preview_dir.as_deref().map(expand_path);
    let augmenter = Augmenter::new(&config).with_output_dir(output_dir);
    let options = AugmentOptions {
        preview: preview_dir.is_some(),
    };

    let discovered = FileDiscovery::new().resolve(&args.inputs);
    if discovered.files.is_empty() {
        anyhow::bail!("No input files found in {:?}", args.inputs);
    }
    tracing::info!("Found {} candidate files", discovered.files.len());

    let progress = create_progress_bar(discovered.files.len() as u64);
    let reporter = Reporter::new(progress.clone(), args.quiet);
    let start = Instant::now();

    let job = move |path: &Path| {
        let mut outcome = augmenter.augment_with_options(path, &options)?;
        if let AugmentOutcome::Completed(report) = &mut outcome {
            if let Some(dir) = &preview_dir {
                save_preview(report, dir);
            }
            report.discard_rasters();
        }
        Ok::<_, leafprep_core::PipelineError>(outcome)
    };
    let entries = run_batch(
        discovered.files,
        config.processing.parallel_workers,
        job,
        move |path, result| {
            report_result(&reporter, path, result);
            reporter.advance();
        },
    )
    .await;

    progress.finish_and_clear();
    let summary = summarize(&entries).with_elapsed(start.elapsed());

    if let Some(path) = &args.report {
        write_report(path, args.format.into(), &entries)?;
    }
    print_summary("Augmentation Summary", &summary, "Derivatives");

    Ok(())
}

fn save_preview(report: &AugmentReport, dir: &Path) {
    let Some(preview) = &report.preview else {
        return;
    };
    let dir = match &report.class_label {
        Some(label) => dir.join(label),
        None => dir.to_path_buf(),
    };
    let stem = leafprep_core::types::file_stem(&report.source_path);
    let path = dir.join(format!("{stem}_preview.png"));

    let saved = std::fs::create_dir_all(&dir)
        .map_err(|e| e.to_string())
        .and_then(|()| {
            preview
                .save_with_format(&path, ImageFormat::Png)
                .map_err(|e| e.to_string())
        });
    match saved {
        Ok(()) => tracing::debug!("Preview written to {:?}", path),
        Err(e) => tracing::warn!("Failed to write preview {:?}: {}", path, e),
    }
}

fn report_result(reporter: &Reporter, path: &Path, result: &Result<AugmentOutcome, String>) {
    let name = path.display();
    match result {
        Ok(AugmentOutcome::Completed(report)) if report.is_complete() => reporter.notice(
            Notice::Success,
            format!("{name}: {} derivatives written", report.written_count()),
        ),
        Ok(AugmentOutcome::Completed(report)) => {
            let failed: Vec<String> = report
                .outcomes
                .iter()
                .filter_map(|outcome| match outcome {
                    DerivativeOutcome::Failed { kind, error, .. } => {
                        Some(format!("{kind} ({error})"))
                    }
                    DerivativeOutcome::Written(_) => None,
                })
                .collect();
            reporter.notice(
                Notice::Failure,
                format!(
                    "{name}: {}/{} written, failed: {}",
                    report.written_count(),
                    report.outcomes.len(),
                    failed.join(", ")
                ),
            );
        }
        Ok(AugmentOutcome::Skipped { reason, .. }) => {
            reporter.notice(reason.severity().into(), format!("{name}: {reason}"))
        }
        Err(error) => reporter.notice(Notice::Failure, format!("{name}: {error}")),
    }
}

fn summarize(entries: &[BatchEntry<AugmentOutcome>]) -> RunSummary {
    let mut summary = RunSummary {
        candidates: entries.len(),
        ..Default::default()
    };
    for entry in entries {
        match &entry.outcome {
            Ok(AugmentOutcome::Completed(report)) => {
                summary.outputs_written += report.written_count();
                if report.is_complete() {
                    summary.succeeded += 1;
                } else {
                    summary.partial += 1;
                }
            }
            Ok(AugmentOutcome::Skipped { reason, .. }) => match reason.severity() {
                leafprep_core::Severity::Skip => summary.skipped += 1,
                leafprep_core::Severity::Failure => summary.failed += 1,
            },
            Err(_) => summary.failed += 1,
        }
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use leafprep_core::Rejection;

    fn write_leaf(path: &Path) {
        let img = RgbImage::from_fn(24, 24, |x, y| Rgb([(x * 8) as u8, 140, (y * 8) as u8]));
        img.save_with_format(path, ImageFormat::Jpeg).unwrap();
    }

    fn args(inputs: Vec<String>) -> AugmentArgs {
        AugmentArgs {
            inputs,
            output_dir: None,
            parallel: Some(2),
            preview_dir: None,
            report: None,
            format: OutputFormat::Json,
            quiet: true,
        }
    }

    #[test]
    fn test_summary_counts() {
        let entries = vec![
            BatchEntry {
                path: PathBuf::from("leaf_rotated.JPG"),
                outcome: Ok(AugmentOutcome::Skipped {
                    path: PathBuf::from("leaf_rotated.JPG"),
                    reason: Rejection::AlreadyDerived {
                        suffix: "_rotated".to_string(),
                    },
                }),
            },
            BatchEntry {
                path: PathBuf::from("missing.JPG"),
                outcome: Ok(AugmentOutcome::Skipped {
                    path: PathBuf::from("missing.JPG"),
                    reason: Rejection::NotFound,
                }),
            },
            BatchEntry {
                path: PathBuf::from("broken.JPG"),
                outcome: Err("Decode error".to_string()),
            },
        ];
        let summary = summarize(&entries);
        assert_eq!(summary.candidates, 3);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.failed, 2);
        assert_eq!(summary.outputs_written, 0);
    }

    #[tokio::test]
    async fn test_augment_directory_with_report_and_preview() {
        let dir = tempfile::tempdir().unwrap();
        let class_dir = dir.path().join("plants/Apple_scab");
        std::fs::create_dir_all(&class_dir).unwrap();
        write_leaf(&class_dir.join("leaf.JPG"));
        std::fs::write(class_dir.join("notes.txt"), b"not an image").unwrap();

        let report_path = dir.path().join("augment.json");
        let preview_dir = dir.path().join("previews");
        let mut args = args(vec![class_dir.to_string_lossy().into_owned()]);
        args.report = Some(report_path.clone());
        args.preview_dir = Some(preview_dir.clone());

        execute(args, Config::default()).await.unwrap();

        assert!(class_dir.join("leaf_blured.JPG").is_file());
        assert!(class_dir.join("leaf_projected.JPG").is_file());
        assert!(preview_dir.join("Apple_scab/leaf_preview.png").is_file());

        let report: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&report_path).unwrap()).unwrap();
        let records = report.as_array().unwrap();
        assert_eq!(records.len(), 2);
        assert!(records.iter().any(|r| r["outcome"] == "completed"));
        assert!(records.iter().any(|r| r["outcome"] == "skipped"));
    }

    #[tokio::test]
    async fn test_rerun_does_not_multiply_files() {
        let dir = tempfile::tempdir().unwrap();
        write_leaf(&dir.path().join("leaf.JPG"));
        let input = vec![dir.path().to_string_lossy().into_owned()];

        execute(args(input.clone()), Config::default()).await.unwrap();
        execute(args(input), Config::default()).await.unwrap();

        let count = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(count, 7);
    }

    #[tokio::test]
    async fn test_no_inputs_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let pattern = format!("{}/*.JPG", dir.path().display());
        assert!(execute(args(vec![pattern]), Config::default()).await.is_err());
    }
}
