//! The `leafprep distribution` command.

use clap::Args;
use leafprep_core::distribution::{self, DistributionSummary};
use std::path::PathBuf;

use super::chart;

/// Arguments for the `distribution` command.
#[derive(Args, Debug)]
pub struct DistributionArgs {
    /// Dataset root with one subdirectory per class
    pub root: PathBuf,

    /// Write a pie + bar chart SVG to this file
    #[arg(long, value_name = "FILE")]
    pub chart: Option<PathBuf>,

    /// Print the distribution as JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

/// Execute the distribution command.
pub fn execute(args: DistributionArgs) -> anyhow::Result<()> {
    let root = leafprep_core::config::expand_path(&args.root);
    let buckets = distribution::analyze(&root)?;
    let summary = DistributionSummary::from_buckets(buckets);
    tracing::debug!(
        "{} classes, {} images under {:?}",
        summary.classes.len(),
        summary.total,
        root
    );

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print!("{}", format_table(&summary));
    }

    if let Some(path) = &args.chart {
        chart::write_distribution(&summary, path)?;
        tracing::info!("Chart written to {:?}", path);
    }

    Ok(())
}

fn format_table(summary: &DistributionSummary) -> String {
    let name_width = summary
        .classes
        .iter()
        .map(|c| c.bucket.directory_name.chars().count())
        .max()
        .unwrap_or(0)
        .max("Class".len());

    let mut out = format!("{:<name_width$}  {:>8}  {:>7}\n", "Class", "Images", "Share");
    for class in &summary.classes {
        out.push_str(&format!(
            "{:<name_width$}  {:>8}  {:>6.2}%\n",
            class.bucket.directory_name, class.bucket.eligible_image_count, class.percentage
        ));
    }
    out.push_str(&format!("{:<name_width$}  {:>8}\n", "Total", summary.total));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use leafprep_core::ClassBucket;

    #[test]
    fn test_table_lists_classes_and_total() {
        let summary = DistributionSummary::from_buckets(vec![
            ClassBucket {
                directory_name: "Apple_Black_rot".to_string(),
                eligible_image_count: 620,
            },
            ClassBucket {
                directory_name: "Apple_healthy".to_string(),
                eligible_image_count: 1640,
            },
        ]);
        let table = format_table(&summary);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[1].starts_with("Apple_Black_rot"));
        assert!(lines[1].ends_with("27.43%"));
        assert!(lines[3].trim_end().ends_with("2260"));
    }

    #[test]
    fn test_execute_rejects_missing_root() {
        let args = DistributionArgs {
            root: PathBuf::from("/nonexistent/plants"),
            chart: None,
            json: false,
        };
        assert!(execute(args).is_err());
    }
}
