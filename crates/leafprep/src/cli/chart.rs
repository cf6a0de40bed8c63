//! SVG rendering of a class distribution: pie chart and bar chart side by side.

use leafprep_core::DistributionSummary;
use std::f64::consts::{FRAC_PI_2, TAU};
use std::path::Path;

const CHART_WIDTH: f64 = 1400.0;
const CHART_HEIGHT: f64 = 600.0;
const PANEL_TOP: f64 = 110.0;

const PIE_CX: f64 = 350.0;
const PIE_CY: f64 = 340.0;
const PIE_RADIUS: f64 = 200.0;

const BAR_LEFT: f64 = 800.0;
const BAR_RIGHT: f64 = 1350.0;
const BAR_BOTTOM: f64 = 500.0;

const COLOR_AXIS: &str = "#2c3e50";
const COLOR_GRID: &str = "#ecf0f1";
const COLOR_TEXT: &str = "#2c3e50";

const SLICE_COLORS: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

const FONT: &str = r#"font-family="Arial, sans-serif""#;

/// Render the distribution as a standalone SVG document.
pub fn render_distribution(summary: &DistributionSummary) -> String {
    let mut svg = String::new();
    svg.push_str(&format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {w} {h}" width="{w}" height="{h}">"#,
        w = CHART_WIDTH,
        h = CHART_HEIGHT
    ));
    svg.push_str(&format!(
        r#"<rect width="{}" height="{}" fill="white"/>"#,
        CHART_WIDTH, CHART_HEIGHT
    ));
    svg.push_str(&format!(
        r#"<text x="{}" y="40" text-anchor="middle" {FONT} font-size="22" font-weight="bold" fill="{COLOR_TEXT}">Image Distribution Across Directories</text>"#,
        CHART_WIDTH / 2.0
    ));

    render_pie(&mut svg, summary);
    render_bars(&mut svg, summary);

    svg.push_str("</svg>");
    svg
}

/// Render and write the chart to `path`.
pub fn write_distribution(summary: &DistributionSummary, path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, render_distribution(summary))
}

fn render_pie(svg: &mut String, summary: &DistributionSummary) {
    panel_title(svg, PIE_CX, "Pie Chart");
    if summary.total == 0 {
        return;
    }

    // Slices start at 12 o'clock and run counter-clockwise.
    let mut start = FRAC_PI_2;
    for (i, class) in summary.classes.iter().enumerate() {
        let share = class.bucket.eligible_image_count as f64 / summary.total as f64;
        if share <= 0.0 {
            continue;
        }
        let sweep = share * TAU;
        let end = start + sweep;
        let color = slice_color(i);

        if share >= 1.0 {
            svg.push_str(&format!(
                r#"<circle cx="{PIE_CX}" cy="{PIE_CY}" r="{PIE_RADIUS}" fill="{color}" stroke="white"/>"#
            ));
        } else {
            let (x0, y0) = polar(start, PIE_RADIUS);
            let (x1, y1) = polar(end, PIE_RADIUS);
            let large_arc = u8::from(sweep > std::f64::consts::PI);
            svg.push_str(&format!(
                r#"<path d="M {PIE_CX} {PIE_CY} L {x0:.2} {y0:.2} A {PIE_RADIUS} {PIE_RADIUS} 0 {large_arc} 0 {x1:.2} {y1:.2} Z" fill="{color}" stroke="white"/>"#
            ));
        }

        let mid = start + sweep / 2.0;
        let (px, py) = polar(mid, PIE_RADIUS * 0.75);
        svg.push_str(&format!(
            r#"<text x="{px:.2}" y="{py:.2}" text-anchor="middle" {FONT} font-size="12" fill="white">{:.1}%</text>"#,
            class.percentage
        ));
        let (lx, ly) = polar(mid, PIE_RADIUS * 1.1);
        let anchor = if lx < PIE_CX { "end" } else { "start" };
        svg.push_str(&format!(
            r#"<text x="{lx:.2}" y="{ly:.2}" text-anchor="{anchor}" {FONT} font-size="12" fill="{COLOR_TEXT}">{}</text>"#,
            escape_xml(&class.bucket.directory_name)
        ));

        start = end;
    }
}

fn render_bars(svg: &mut String, summary: &DistributionSummary) {
    let center = (BAR_LEFT + BAR_RIGHT) / 2.0;
    panel_title(svg, center, "Bar Chart");

    let plot_width = BAR_RIGHT - BAR_LEFT;
    let plot_height = BAR_BOTTOM - PANEL_TOP - 30.0;
    let y_max = summary.max_count().max(1) as f64;

    for i in 0..=5 {
        let y = BAR_BOTTOM - (i as f64 / 5.0) * plot_height;
        let value = (i as f64 / 5.0) * y_max;
        svg.push_str(&format!(
            r#"<line x1="{BAR_LEFT}" y1="{y:.2}" x2="{BAR_RIGHT}" y2="{y:.2}" stroke="{COLOR_GRID}" stroke-width="1"/>"#
        ));
        svg.push_str(&format!(
            r#"<text x="{}" y="{:.2}" text-anchor="end" {FONT} font-size="11" fill="{COLOR_TEXT}">{value:.0}</text>"#,
            BAR_LEFT - 8.0,
            y + 4.0
        ));
    }
    svg.push_str(&format!(
        r#"<line x1="{BAR_LEFT}" y1="{BAR_BOTTOM}" x2="{BAR_RIGHT}" y2="{BAR_BOTTOM}" stroke="{COLOR_AXIS}" stroke-width="2"/>"#
    ));
    svg.push_str(&format!(
        r#"<text x="{}" y="{}" text-anchor="middle" {FONT} font-size="13" font-weight="bold" fill="{COLOR_TEXT}" transform="rotate(-90 {} {})">Number of Images</text>"#,
        BAR_LEFT - 55.0,
        (PANEL_TOP + BAR_BOTTOM) / 2.0,
        BAR_LEFT - 55.0,
        (PANEL_TOP + BAR_BOTTOM) / 2.0
    ));
    svg.push_str(&format!(
        r#"<text x="{center}" y="{}" text-anchor="middle" {FONT} font-size="13" font-weight="bold" fill="{COLOR_TEXT}">Directory</text>"#,
        CHART_HEIGHT - 10.0
    ));

    if summary.classes.is_empty() {
        return;
    }
    let slot = plot_width / summary.classes.len() as f64;
    let bar_width = slot * 0.7;

    for (i, class) in summary.classes.iter().enumerate() {
        let count = class.bucket.eligible_image_count;
        let x = BAR_LEFT + i as f64 * slot + (slot - bar_width) / 2.0;
        let height = count as f64 / y_max * plot_height;
        let y = BAR_BOTTOM - height;
        let label_x = x + bar_width / 2.0;
        let label_y = BAR_BOTTOM + 18.0;

        svg.push_str(&format!(
            r#"<rect x="{x:.2}" y="{y:.2}" width="{bar_width:.2}" height="{height:.2}" fill="{}"/>"#,
            slice_color(i)
        ));
        svg.push_str(&format!(
            r#"<text x="{label_x:.2}" y="{:.2}" text-anchor="middle" {FONT} font-size="11" fill="{COLOR_TEXT}">{count}</text>"#,
            y - 5.0
        ));
        svg.push_str(&format!(
            r#"<text x="{label_x:.2}" y="{label_y:.2}" text-anchor="end" {FONT} font-size="10" fill="{COLOR_TEXT}" transform="rotate(-45 {label_x:.2} {label_y:.2})">{}</text>"#,
            escape_xml(&class.bucket.directory_name)
        ));
    }
}

fn panel_title(svg: &mut String, x: f64, title: &str) {
    svg.push_str(&format!(
        r#"<text x="{x}" y="{}" text-anchor="middle" {FONT} font-size="15" font-weight="bold" fill="{COLOR_TEXT}">{title}</text>"#,
        PANEL_TOP - 25.0
    ));
}

fn slice_color(index: usize) -> &'static str {
    SLICE_COLORS[index % SLICE_COLORS.len()]
}

/// Point at `angle` (radians, counter-clockwise from 3 o'clock) on a circle
/// around the pie center. SVG's y axis points down.
fn polar(angle: f64, radius: f64) -> (f64, f64) {
    (PIE_CX + radius * angle.cos(), PIE_CY - radius * angle.sin())
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use leafprep_core::ClassBucket;

    fn summary(counts: &[(&str, usize)]) -> DistributionSummary {
        DistributionSummary::from_buckets(
            counts
                .iter()
                .map(|(name, count)| ClassBucket {
                    directory_name: name.to_string(),
                    eligible_image_count: *count,
                })
                .collect(),
        )
    }

    #[test]
    fn test_chart_has_slice_and_bar_per_class() {
        let svg = render_distribution(&summary(&[("bird", 5), ("cat", 10), ("dog", 20)]));
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert_eq!(svg.matches("<path ").count(), 3);
        // Background plus one rect per bar.
        assert_eq!(svg.matches("<rect ").count(), 4);
        assert!(svg.contains(">57.1%<"));
        assert!(svg.contains(">20<"));
    }

    #[test]
    fn test_single_class_is_full_circle() {
        let svg = render_distribution(&summary(&[("Apple_healthy", 12)]));
        assert!(svg.contains("<circle "));
        assert!(!svg.contains("<path "));
        assert!(svg.contains(">100.0%<"));
    }

    #[test]
    fn test_empty_class_gets_bar_but_no_slice() {
        let svg = render_distribution(&summary(&[("a", 4), ("b", 0)]));
        assert_eq!(svg.matches("<circle ").count(), 1);
        assert_eq!(svg.matches("<rect ").count(), 3);
    }

    #[test]
    fn test_labels_are_escaped() {
        let svg = render_distribution(&summary(&[("Tomato <early> & late", 3)]));
        assert!(svg.contains("Tomato &lt;early&gt; &amp; late"));
    }

    #[test]
    fn test_write_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("charts/distribution.svg");
        write_distribution(&summary(&[("a", 1), ("b", 2)]), &path).unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().contains("Bar Chart"));
    }
}
