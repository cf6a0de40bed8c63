//! The fixed augmentation transform set.
//!
//! Six pure operators. None of them mutates its input and none depends on
//! another, so kinds can be computed in any order (or concurrently).

use image::imageops::{self, FilterType};
use image::{Rgb, RgbImage};

use super::kind::AugmentationKind;

/// Standard deviation of the Gaussian blur.
pub const BLUR_SIGMA: f32 = 5.0;

/// Contrast enhancement factor around the mean luma.
pub const CONTRAST_FACTOR: f32 = 4.0;

/// Brightness enhancement factor.
pub const BRIGHTNESS_FACTOR: f32 = 3.0;

/// Zoom factor of the center crop.
pub const ZOOM_FACTOR: f32 = 2.0;

/// Projective coefficients `[a, b, c, d, e, f, g, h]` mapping output to input.
pub const PERSPECTIVE_COEFFS: [f32; 8] = [1.0, 0.2, 0.0, 0.0, 1.0, 0.0, 0.004, 0.004];

/// Apply the operator for `kind` to `image`.
pub fn apply(kind: AugmentationKind, image: &RgbImage) -> RgbImage {
    match kind {
        AugmentationKind::Rotated => rotate(image),
        AugmentationKind::Blurred => blur(image),
        AugmentationKind::Contrasted => contrast(image, CONTRAST_FACTOR),
        AugmentationKind::Illuminated => brighten(image, BRIGHTNESS_FACTOR),
        AugmentationKind::Scaled => zoom(image, ZOOM_FACTOR),
        AugmentationKind::Projected => project(image, &PERSPECTIVE_COEFFS),
    }
}

/// Rotate 180 degrees around the center. Exact, so applying it twice is the identity.
pub fn rotate(image: &RgbImage) -> RgbImage {
    imageops::rotate180(image)
}

/// Isotropic Gaussian smoothing with [`BLUR_SIGMA`].
///
/// Separable, normalized kernel with edge pixels repeated past the border.
/// Accumulates in `f32` and rounds once, so flat regions keep their value.
pub fn blur(image: &RgbImage) -> RgbImage {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return image.clone();
    }
    let kernel = gaussian_kernel(BLUR_SIGMA);
    let radius = (kernel.len() / 2) as i64;

    let mut rows = vec![[0.0f32; 3]; width as usize * height as usize];
    for y in 0..height {
        for x in 0..width {
            let mut acc = [0.0f32; 3];
            for (k, weight) in kernel.iter().enumerate() {
                let sx = clamp_index(x as i64 + k as i64 - radius, width);
                let pixel = image.get_pixel(sx, y);
                for (sum, value) in acc.iter_mut().zip(pixel.0) {
                    *sum += weight * value as f32;
                }
            }
            rows[(y * width + x) as usize] = acc;
        }
    }

    RgbImage::from_fn(width, height, |x, y| {
        let mut acc = [0.0f32; 3];
        for (k, weight) in kernel.iter().enumerate() {
            let sy = clamp_index(y as i64 + k as i64 - radius, height);
            let row = rows[(sy * width + x) as usize];
            for (sum, value) in acc.iter_mut().zip(row) {
                *sum += weight * value;
            }
        }
        Rgb(acc.map(|v| v.round().clamp(0.0, 255.0) as u8))
    })
}

/// Gaussian weights over `[-ceil(3 sigma), ceil(3 sigma)]`, summing to 1.
fn gaussian_kernel(sigma: f32) -> Vec<f32> {
    let radius = (3.0 * sigma).ceil() as i32;
    let weights: Vec<f32> = (-radius..=radius)
        .map(|i| (-((i * i) as f32) / (2.0 * sigma * sigma)).exp())
        .collect();
    let total: f32 = weights.iter().sum();
    weights.into_iter().map(|w| w / total).collect()
}

fn clamp_index(index: i64, extent: u32) -> u32 {
    index.clamp(0, extent as i64 - 1) as u32
}

/// Scale each pixel's deviation from the image's mean luma by `factor`.
pub fn contrast(image: &RgbImage, factor: f32) -> RgbImage {
    let reference = mean_luma(image) as f32;
    map_channels(image, |v| reference + factor * (v - reference))
}

/// Scale each channel by `factor` (deviation from black).
pub fn brighten(image: &RgbImage, factor: f32) -> RgbImage {
    map_channels(image, |v| factor * v)
}

/// Center-crop by `factor` and resample back to the original size.
///
/// The crop box is `floor(w / factor) x floor(h / factor)` anchored at
/// `(floor((w - new_w) / 2), floor((h - new_h) / 2))`. When the box covers the
/// whole image (factor <= 1) the source is returned unchanged.
pub fn zoom(image: &RgbImage, factor: f32) -> RgbImage {
    let (width, height) = image.dimensions();
    let (left, top, new_w, new_h) = crop_box(width, height, factor);

    if (new_w, new_h) == (width, height) {
        return image.clone();
    }

    let cropped = imageops::crop_imm(image, left, top, new_w, new_h).to_image();
    imageops::resize(&cropped, width, height, FilterType::Lanczos3)
}

/// Centered crop box `(left, top, width, height)` for a zoom `factor`.
pub fn crop_box(width: u32, height: u32, factor: f32) -> (u32, u32, u32, u32) {
    let shrink = |extent: u32| -> u32 {
        if factor <= 1.0 {
            return extent;
        }
        ((extent as f64 / factor as f64).floor() as u32).clamp(1.min(extent), extent)
    };
    let new_w = shrink(width);
    let new_h = shrink(height);
    ((width - new_w) / 2, (height - new_h) / 2, new_w, new_h)
}

/// Perspective warp with bicubic sampling; output keeps the source size.
///
/// Each output pixel center `(x, y)` samples the input at
/// `((a*x + b*y + c) / (g*x + h*y + 1), (d*x + e*y + f) / (g*x + h*y + 1))`.
/// Samples falling outside the source are black.
pub fn project(image: &RgbImage, coeffs: &[f32; 8]) -> RgbImage {
    let [a, b, c, d, e, f, g, h] = coeffs.map(f64::from);
    let (width, height) = image.dimensions();
    RgbImage::from_fn(width, height, |x, y| {
        let (xc, yc) = (x as f64 + 0.5, y as f64 + 0.5);
        let w = g * xc + h * yc + 1.0;
        let sx = (a * xc + b * yc + c) / w;
        let sy = (d * xc + e * yc + f) / w;
        sample_bicubic(image, sx, sy).unwrap_or(Rgb([0, 0, 0]))
    })
}

/// Bicubic sample at `(x, y)`, where pixel `i` spans `[i, i + 1)`.
///
/// `None` outside the image. Neighbors past the border repeat the edge pixel,
/// so samples near the edge stay inside the source's color range.
fn sample_bicubic(image: &RgbImage, x: f64, y: f64) -> Option<Rgb<u8>> {
    let (width, height) = image.dimensions();
    if !(x >= 0.0 && y >= 0.0 && x < width as f64 && y < height as f64) {
        return None;
    }
    let (x, y) = (x - 0.5, y - 0.5);
    let (left, top) = (x.floor(), y.floor());
    let (dx, dy) = (x - left, y - top);
    let (left, top) = (left as i64 - 1, top as i64 - 1);

    let mut out = [0u8; 3];
    for (channel, value) in out.iter_mut().enumerate() {
        let mut rows = [0.0f64; 4];
        for (j, row) in rows.iter_mut().enumerate() {
            let sy = clamp_index(top + j as i64, height);
            let at = |i: i64| image.get_pixel(clamp_index(left + i, width), sy)[channel] as f64;
            *row = cubic([at(0), at(1), at(2), at(3)], dx);
        }
        *value = cubic(rows, dy).round().clamp(0.0, 255.0) as u8;
    }
    Some(Rgb(out))
}

/// Cubic convolution (`a = -1`) through `v`, evaluated `t` past `v[1]`.
fn cubic(v: [f64; 4], t: f64) -> f64 {
    let p2 = v[2] - v[0];
    let p3 = 2.0 * (v[0] - v[1]) + v[2] - v[3];
    let p4 = v[1] - v[0] + v[3] - v[2];
    v[1] + t * (p2 + t * (p3 + t * p4))
}

/// Rounded mean of the 8-bit luma (16-bit fixed-point BT.601 weights).
pub fn mean_luma(image: &RgbImage) -> u8 {
    let count = image.width() as u64 * image.height() as u64;
    if count == 0 {
        return 0;
    }
    let sum: u64 = image.pixels().map(|p| luma(p) as u64).sum();
    ((sum as f64 / count as f64) + 0.5).floor().min(255.0) as u8
}

fn luma(pixel: &Rgb<u8>) -> u8 {
    let [r, g, b] = pixel.0;
    ((r as u32 * 19595 + g as u32 * 38470 + b as u32 * 7471 + 0x8000) >> 16) as u8
}

/// Apply `f` to every channel value, clamping to [0, 255] and truncating.
fn map_channels<F>(image: &RgbImage, f: F) -> RgbImage
where
    F: Fn(f32) -> f32,
{
    let mut out = image.clone();
    for value in out.iter_mut() {
        let v = f(*value as f32);
        *value = if v <= 0.0 {
            0
        } else if v >= 255.0 {
            255
        } else {
            v as u8
        };
    }
    out
}
