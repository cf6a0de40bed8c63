//! The `leafprep segment` command.

use clap::Args;
use leafprep_core::config::expand_path;
use leafprep_core::distribution::has_image_extension;
use leafprep_core::pipeline::{run_batch, BatchEntry, FileDiscovery};
use leafprep_core::{
    Config, PipelineError, Rejection, RunSummary, SegmentOutcome, SegmentReport, Segmenter,
    Severity,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Instant;

use super::batch::{create_progress_bar, print_summary, write_report};
use super::console::{Notice, Reporter};
use super::types::OutputFormat;

/// Arguments for the `segment` command.
#[derive(Args, Debug)]
pub struct SegmentArgs {
    /// Image files, directories or glob patterns
    #[arg(required = true)]
    pub inputs: Vec<String>,

    /// Root directory for mask and ROI rasters (defaults to output.segmentation_dir)
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Number of parallel workers (defaults to processing.parallel_workers)
    #[arg(short, long)]
    pub parallel: Option<usize>,

    /// Write a per-file report to this file
    #[arg(long, value_name = "FILE")]
    pub report: Option<PathBuf>,

    /// Report format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Only print failures
    #[arg(short, long)]
    pub quiet: bool,
}

/// Report record for one segmentation candidate.
#[derive(Debug, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
enum SegmentRecord {
    Completed(SegmentReport),
    Skipped {
        path: PathBuf,
        #[serde(flatten)]
        reason: Rejection,
    },
}

/// Execute the segment command.
pub async fn execute(args: SegmentArgs, mut config: Config) -> anyhow::Result<()> {
    if let Some(parallel) = args.parallel {
        config.processing.parallel_workers = parallel;
    }
    config.validate()?;

    let output_root = args
        .output_dir
        .as_deref()
        .map(expand_path)
        .unwrap_or_else(|| config.segmentation_dir());
    let segmenter = Segmenter::new(&config);

    let discovered = FileDiscovery::new().resolve(&args.inputs);
    let candidates = image_candidates(discovered.files);
    if candidates.is_empty() {
        anyhow::bail!("No image files found in {:?}", args.inputs);
    }
    tracing::info!(
        "Segmenting {} images into {:?}",
        candidates.len(),
        output_root
    );

    let progress = create_progress_bar(candidates.len() as u64);
    let reporter = Reporter::new(progress.clone(), args.quiet);
    let start = Instant::now();

    let job = move |path: &Path| {
        let record = match segmenter.segment(path)? {
            SegmentOutcome::Completed(segmentation) => {
                let mut report = segmentation.report();
                report.outputs = segmentation.save(&output_root)?;
                SegmentRecord::Completed(report)
            }
            SegmentOutcome::Skipped { path, reason } => SegmentRecord::Skipped { path, reason },
        };
        Ok::<_, PipelineError>(record)
    };
    let entries = run_batch(
        candidates,
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
    print_summary("Segmentation Summary", &summary, "Rasters");

    Ok(())
}

/// Keep files with an image extension; directories often hold other files.
fn image_candidates(files: Vec<PathBuf>) -> Vec<PathBuf> {
    let total = files.len();
    let images: Vec<PathBuf> = files
        .into_iter()
        .filter(|path| has_image_extension(path))
        .collect();
    if images.len() < total {
        tracing::debug!("Ignoring {} non-image files", total - images.len());
    }
    images
}

fn report_result(reporter: &Reporter, path: &Path, result: &Result<SegmentRecord, String>) {
    match result {
        Ok(SegmentRecord::Completed(report)) => reporter.notice(
            Notice::Success,
            format!(
                "{}: {} foreground pixels, {} contours",
                path.display(),
                report.foreground_pixels,
                report.contour_count
            ),
        ),
        Ok(SegmentRecord::Skipped { reason, .. }) => reporter.notice(
            reason.severity().into(),
            format!("{}: {reason}", path.display()),
        ),
        Err(error) => reporter.notice(Notice::Failure, format!("{}: {error}", path.display())),
    }
}

fn summarize(entries: &[BatchEntry<SegmentRecord>]) -> RunSummary {
    let mut summary = RunSummary {
        candidates: entries.len(),
        ..Default::default()
    };
    for entry in entries {
        match &entry.outcome {
            Ok(SegmentRecord::Completed(report)) => {
                summary.succeeded += 1;
                summary.outputs_written += report.outputs.len();
            }
            Ok(SegmentRecord::Skipped { reason, .. }) => match reason.severity() {
                Severity::Skip => summary.skipped += 1,
                Severity::Failure => summary.failed += 1,
            },
            Err(_) => summary.failed += 1,
        }
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, RgbImage};

    fn write_leaf(path: &Path) {
        let img = RgbImage::from_fn(40, 40, |x, y| {
            if (10..30).contains(&x) && (10..30).contains(&y) {
                Rgb([40, 150, 50])
            } else {
                Rgb([245, 245, 245])
            }
        });
        img.save_with_format(path, ImageFormat::Jpeg).unwrap();
    }

    #[test]
    fn test_image_candidates_filters_by_extension() {
        let files = vec![
            PathBuf::from("a.JPG"),
            PathBuf::from("b.png"),
            PathBuf::from("notes.txt"),
        ];
        assert_eq!(image_candidates(files).len(), 2);
    }

    #[tokio::test]
    async fn test_segment_writes_rasters_and_report() {
        let dir = tempfile::tempdir().unwrap();
        let class_dir = dir.path().join("plants/Grape_healthy");
        std::fs::create_dir_all(&class_dir).unwrap();
        write_leaf(&class_dir.join("leaf.JPG"));
        // Has an image extension but is not decodable.
        std::fs::write(class_dir.join("broken.jpg"), b"not a jpeg").unwrap();
        // Decodable, but not JPEG content.
        RgbImage::from_pixel(8, 8, Rgb([40, 150, 50]))
            .save_with_format(class_dir.join("photo.png"), ImageFormat::Png)
            .unwrap();
        // Output of an earlier augmentation run.
        write_leaf(&class_dir.join("leaf_rotated.JPG"));

        let out = dir.path().join("segmentation");
        let report_path = dir.path().join("segment.jsonl");
        let args = SegmentArgs {
            inputs: vec![class_dir.to_string_lossy().into_owned()],
            output_dir: Some(out.clone()),
            parallel: Some(2),
            report: Some(report_path.clone()),
            format: OutputFormat::Jsonl,
            quiet: true,
        };

        execute(args, Config::default()).await.unwrap();

        for suffix in ["mask", "masked", "roi"] {
            assert!(out.join(format!("Grape_healthy/leaf_{suffix}.png")).is_file());
        }
        assert!(!out.join("Grape_healthy/photo_mask.png").exists());
        assert!(!out.join("Grape_healthy/leaf_rotated_mask.png").exists());

        let report = std::fs::read_to_string(&report_path).unwrap();
        let lines: Vec<serde_json::Value> = report
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(lines.len(), 4);
        let completed: Vec<_> = lines.iter().filter(|r| r["outcome"] == "completed").collect();
        assert_eq!(completed.len(), 1);
        assert!(completed[0]["contour_count"].as_u64() >= Some(1));
        let skipped: Vec<&str> = lines
            .iter()
            .filter(|r| r["outcome"] == "skipped")
            .filter_map(|r| r["reason"].as_str())
            .collect();
        assert!(skipped.contains(&"unsupported_format"), "{skipped:?}");
        assert!(skipped.contains(&"already_derived"), "{skipped:?}");
    }

    #[test]
    fn test_summary_counts_skips_by_severity() {
        let entries = vec![
            BatchEntry {
                path: PathBuf::from("photo.png"),
                outcome: Ok(SegmentRecord::Skipped {
                    path: PathBuf::from("photo.png"),
                    reason: Rejection::UnsupportedFormat {
                        format: "png".to_string(),
                    },
                }),
            },
            BatchEntry {
                path: PathBuf::from("missing.JPG"),
                outcome: Ok(SegmentRecord::Skipped {
                    path: PathBuf::from("missing.JPG"),
                    reason: Rejection::NotFound,
                }),
            },
        ];
        let summary = summarize(&entries);
        assert_eq!(summary.candidates, 2);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.succeeded, 0);
    }
}
