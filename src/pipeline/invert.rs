//! Color inversion of a rendered page.
//!
//! Every color channel `v` becomes `max − v` (`255 − v` for 8-bit rasters,
//! `65535 − v` for 16-bit, `1.0 − v` for float). Alpha is left untouched, so
//! a transparent region stays transparent. This is `image`'s own
//! [`DynamicImage::invert`]; no color-space math happens here.

use image::DynamicImage;
use tracing::trace;

/// Invert the colors of `raster` in place.
pub fn invert_raster(raster: &mut DynamicImage) {
    raster.invert();
    trace!("Inverted {}x{} raster", raster.width(), raster.height());
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, Luma, Rgba, RgbaImage};

    fn inverted(raster: &DynamicImage) -> DynamicImage {
        let mut copy = raster.clone();
        invert_raster(&mut copy);
        copy
    }

    #[test]
    fn black_becomes_white_and_back() {
        let mut img =
            DynamicImage::ImageRgba8(RgbaImage::from_pixel(4, 4, Rgba([0, 0, 0, 255])));
        invert_raster(&mut img);
        assert!(img.pixels().all(|(_, _, p)| p == Rgba([255, 255, 255, 255])));

        invert_raster(&mut img);
        assert!(img.pixels().all(|(_, _, p)| p == Rgba([0, 0, 0, 255])));
    }

    #[test]
    fn channels_map_to_max_minus_value() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(1, 1, Rgba([10, 128, 250, 255])));
        assert_eq!(inverted(&img).get_pixel(0, 0), Rgba([245, 127, 5, 255]));
    }

    #[test]
    fn alpha_is_preserved() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(2, 2, Rgba([200, 100, 0, 64])));
        let out = inverted(&img);
        assert_eq!(out.get_pixel(1, 1), Rgba([55, 155, 255, 64]));
    }

    #[test]
    fn inversion_is_an_involution() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_fn(16, 16, |x, y| {
            Rgba([(x * 16) as u8, (y * 16) as u8, ((x + y) * 8) as u8, 255])
        }));
        assert_eq!(inverted(&inverted(&img)), img);
    }

    #[test]
    fn grayscale_rasters_are_inverted_too() {
        let img = DynamicImage::ImageLuma8(image::GrayImage::from_pixel(3, 3, Luma([30])));
        let out = inverted(&img);
        assert_eq!(out.as_luma8().unwrap().get_pixel(2, 2), &Luma([225]));
    }

    #[test]
    fn inverted_leaves_source_untouched() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(1, 1, Rgba([1, 2, 3, 255])));
        let _ = inverted(&img);
        assert_eq!(img.get_pixel(0, 0), Rgba([1, 2, 3, 255]));
    }
}
