//! Binary masks: thresholding and applying them to a raster.

use image::{GrayImage, Luma, Rgb, RgbImage};

/// Mask value for foreground pixels.
pub const FOREGROUND: u8 = 255;

/// Mask value for background pixels.
pub const BACKGROUND: u8 = 0;

/// Binary threshold: values `>= level` become foreground, the rest background.
pub fn threshold(channel: &GrayImage, level: u8) -> GrayImage {
    GrayImage::from_fn(channel.width(), channel.height(), |x, y| {
        if channel.get_pixel(x, y)[0] >= level {
            Luma([FOREGROUND])
        } else {
            Luma([BACKGROUND])
        }
    })
}

/// Copy of `image` with every background pixel of `mask` painted white.
pub fn apply_mask(image: &RgbImage, mask: &GrayImage) -> RgbImage {
    debug_assert_eq!(image.dimensions(), mask.dimensions());
    let mut masked = image.clone();
    for (pixel, m) in masked.pixels_mut().zip(mask.pixels()) {
        if m[0] == BACKGROUND {
            *pixel = Rgb([255, 255, 255]);
        }
    }
    masked
}

/// Number of foreground pixels in a mask.
pub fn foreground_count(mask: &GrayImage) -> usize {
    mask.pixels().filter(|p| p[0] == FOREGROUND).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_is_binary_and_inclusive() {
        let channel = GrayImage::from_fn(256, 1, |x, _| Luma([x as u8]));
        let mask = threshold(&channel, 85);

        assert!(mask
            .pixels()
            .all(|p| p[0] == FOREGROUND || p[0] == BACKGROUND));
        assert_eq!(mask.get_pixel(84, 0)[0], BACKGROUND);
        assert_eq!(mask.get_pixel(85, 0)[0], FOREGROUND);
        assert_eq!(foreground_count(&mask), 256 - 85);
    }

    #[test]
    fn test_apply_mask_whitens_background() {
        let image = RgbImage::from_pixel(2, 1, Rgb([10, 120, 30]));
        let mask = GrayImage::from_fn(2, 1, |x, _| Luma([if x == 0 { 255 } else { 0 }]));

        let masked = apply_mask(&image, &mask);
        assert_eq!(masked.get_pixel(0, 0), &Rgb([10, 120, 30]));
        assert_eq!(masked.get_pixel(1, 0), &Rgb([255, 255, 255]));
        // Source untouched
        assert_eq!(image.get_pixel(1, 0), &Rgb([10, 120, 30]));
    }
}
