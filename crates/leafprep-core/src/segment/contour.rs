//! Contour extraction from binary masks and ROI overlay drawing.

use image::{GrayImage, Rgb, RgbImage};
use imageproc::contours::{find_contours, BorderType};
use imageproc::drawing::draw_filled_circle_mut;
use serde::Serialize;

/// Stroke width of drawn contours, in pixels.
pub const CONTOUR_STROKE: i32 = 3;

/// Colors cycled through so neighbouring contours stay distinguishable.
const PALETTE: [Rgb<u8>; 6] = [
    Rgb([255, 0, 255]),
    Rgb([0, 255, 255]),
    Rgb([255, 255, 0]),
    Rgb([255, 64, 0]),
    Rgb([0, 128, 255]),
    Rgb([128, 255, 0]),
];

/// One border of a foreground region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoiContour {
    /// Border pixels in tracing order
    pub points: Vec<(u32, u32)>,

    /// Whether this border encloses a hole rather than a region
    pub is_hole: bool,
}

/// Trace every border (outer and hole) of the foreground in `mask`.
///
/// Any non-zero pixel counts as foreground. Contours come back in discovery
/// order (row-major scan).
pub fn extract_contours(mask: &GrayImage) -> Vec<RoiContour> {
    find_contours::<u32>(mask)
        .into_iter()
        .map(|contour| RoiContour {
            points: contour.points.iter().map(|p| (p.x, p.y)).collect(),
            is_hole: contour.border_type == BorderType::Hole,
        })
        .collect()
}

/// Color assigned to the contour at `index`.
pub fn contour_color(index: usize) -> Rgb<u8> {
    PALETTE[index % PALETTE.len()]
}

/// Copy of `image` with every contour drawn on it.
pub fn draw_contours(image: &RgbImage, contours: &[RoiContour]) -> RgbImage {
    let mut canvas = image.clone();
    let radius = CONTOUR_STROKE / 2;
    for (index, contour) in contours.iter().enumerate() {
        let color = contour_color(index);
        for &(x, y) in &contour.points {
            draw_filled_circle_mut(&mut canvas, (x as i32, y as i32), radius, color);
        }
    }
    canvas
}
