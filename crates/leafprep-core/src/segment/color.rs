//! Single-channel extraction from RGB rasters.
//!
//! Both channels use the 8-bit encodings common in vision tooling: HSV
//! saturation scaled to 0-255, and the LAB "a" axis offset by 128.

use image::{GrayImage, Luma, Rgb, RgbImage};
use imageproc::map::map_colors;

/// D65 reference white, X component (Y is 1).
const WHITE_X: f32 = 0.950456;

/// HSV saturation channel.
pub fn saturation_channel(image: &RgbImage) -> GrayImage {
    map_colors(image, |p| Luma([saturation(p)]))
}

/// LAB "a" (green-red) channel, encoded as `a + 128`.
pub fn lab_a_channel(image: &RgbImage) -> GrayImage {
    map_colors(image, |p| Luma([lab_a(p)]))
}

/// `round(255 * (max - min) / max)`, or 0 for black.
pub fn saturation(pixel: Rgb<u8>) -> u8 {
    let [r, g, b] = pixel.0;
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    if max == 0 {
        return 0;
    }
    ((max - min) as f32 * 255.0 / max as f32).round() as u8
}

/// The "a" coordinate of sRGB `pixel` in CIE L*a*b*, shifted into 0-255.
pub fn lab_a(pixel: Rgb<u8>) -> u8 {
    let [r, g, b] = pixel.0.map(srgb_to_linear);

    let x = (0.412453 * r + 0.357580 * g + 0.180423 * b) / WHITE_X;
    let y = 0.212671 * r + 0.715160 * g + 0.072169 * b;

    let a = 500.0 * (lab_f(x) - lab_f(y));
    (a + 128.0).round().clamp(0.0, 255.0) as u8
}

fn srgb_to_linear(channel: u8) -> f32 {
    let c = channel as f32 / 255.0;
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

fn lab_f(t: f32) -> f32 {
    if t > 0.008856 {
        t.cbrt()
    } else {
        7.787 * t + 16.0 / 116.0
    }
}
