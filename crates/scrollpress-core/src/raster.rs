//! Raster capability: decode, crop, pad, and encode bitmaps.
//!
//! Segmenter and assembler never touch pixels directly; they go through
//! [`RasterBackend`] so the pagination logic stays platform-neutral and
//! testable without a rendering surface. [`SoftwareRaster`] is the
//! in-memory implementation used in production and in tests.

use image::codecs::jpeg::JpegEncoder;
use image::{imageops, Rgb, RgbImage};

use crate::error::PaginateError;

/// Pixel operations the pipeline needs from a platform.
pub trait RasterBackend {
    type Bitmap;

    /// Decode encoded image bytes (PNG, JPEG, ...) into a bitmap.
    fn decode(&self, bytes: &[u8]) -> Result<Self::Bitmap, PaginateError>;

    /// Pixel (width, height) of a bitmap.
    fn dimensions(&self, bitmap: &Self::Bitmap) -> (u32, u32);

    /// Copy the rectangle `[x, x+w) x [y, y+h)` out of a bitmap.
    fn crop(&self, bitmap: &Self::Bitmap, x: u32, y: u32, w: u32, h: u32) -> Self::Bitmap;

    /// Extend a bitmap downward to `target_h` rows, filling the new
    /// rows with white. Returns the bitmap unchanged if already tall
    /// enough.
    fn pad_to_height(&self, bitmap: Self::Bitmap, target_h: u32) -> Self::Bitmap;

    /// Lossy-encode a bitmap as JPEG at `quality` in (0, 1].
    fn encode(&self, bitmap: &Self::Bitmap, quality: f32) -> Result<Vec<u8>, PaginateError>;
}

/// Software raster backend over the `image` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct SoftwareRaster;

impl RasterBackend for SoftwareRaster {
    type Bitmap = RgbImage;

    fn decode(&self, bytes: &[u8]) -> Result<RgbImage, PaginateError> {
        let img = image::load_from_memory(bytes)
            .map_err(|e| PaginateError::Decode(e.to_string()))?;
        Ok(img.to_rgb8())
    }

    fn dimensions(&self, bitmap: &RgbImage) -> (u32, u32) {
        bitmap.dimensions()
    }

    fn crop(&self, bitmap: &RgbImage, x: u32, y: u32, w: u32, h: u32) -> RgbImage {
        imageops::crop_imm(bitmap, x, y, w, h).to_image()
    }

    fn pad_to_height(&self, bitmap: RgbImage, target_h: u32) -> RgbImage {
        if bitmap.height() >= target_h {
            return bitmap;
        }
        let mut canvas = RgbImage::from_pixel(bitmap.width(), target_h, Rgb([255, 255, 255]));
        imageops::replace(&mut canvas, &bitmap, 0, 0);
        canvas
    }

    fn encode(&self, bitmap: &RgbImage, quality: f32) -> Result<Vec<u8>, PaginateError> {
        // Map (0, 1] onto the encoder's 1..=100 scale.
        let q = (quality * 100.0).round().clamp(1.0, 100.0) as u8;
        let mut buffer = Vec::new();
        let mut encoder = JpegEncoder::new_with_quality(&mut buffer, q);
        encoder
            .encode_image(bitmap)
            .map_err(|e| PaginateError::Encode(e.to_string()))?;
        Ok(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn checkerboard(w: u32, h: u32) -> RgbImage {
        RgbImage::from_fn(w, h, |x, y| {
            if (x + y) % 2 == 0 {
                Rgb([0, 0, 0])
            } else {
                Rgb([200, 40, 40])
            }
        })
    }

    #[test]
    fn test_decode_png_roundtrip_dimensions() {
        let src = checkerboard(64, 48);
        let mut png = Vec::new();
        image::DynamicImage::ImageRgb8(src)
            .write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
            .unwrap();

        let raster = SoftwareRaster;
        let decoded = raster.decode(&png).unwrap();
        assert_eq!(raster.dimensions(&decoded), (64, 48));
    }

    #[test]
    fn test_decode_garbage_fails() {
        let raster = SoftwareRaster;
        let result = raster.decode(b"not an image");
        assert!(matches!(result, Err(PaginateError::Decode(_))));
    }

    #[test]
    fn test_crop_takes_requested_band() {
        let raster = SoftwareRaster;
        let src = checkerboard(10, 30);
        let band = raster.crop(&src, 0, 12, 10, 8);
        assert_eq!(band.dimensions(), (10, 8));
        // Row 0 of the crop is row 12 of the source.
        assert_eq!(band.get_pixel(3, 0), src.get_pixel(3, 12));
    }

    #[test]
    fn test_pad_fills_below_with_white() {
        let raster = SoftwareRaster;
        let src = RgbImage::from_pixel(4, 3, Rgb([10, 20, 30]));
        let padded = raster.pad_to_height(src, 6);
        assert_eq!(padded.dimensions(), (4, 6));
        assert_eq!(*padded.get_pixel(0, 2), Rgb([10, 20, 30]));
        assert_eq!(*padded.get_pixel(0, 3), Rgb([255, 255, 255]));
        assert_eq!(*padded.get_pixel(3, 5), Rgb([255, 255, 255]));
    }

    #[test]
    fn test_pad_is_noop_when_tall_enough() {
        let raster = SoftwareRaster;
        let src = RgbImage::from_pixel(4, 8, Rgb([1, 2, 3]));
        let padded = raster.pad_to_height(src, 8);
        assert_eq!(padded.dimensions(), (4, 8));
    }

    #[test]
    fn test_encode_produces_jpeg_with_same_dimensions() {
        let raster = SoftwareRaster;
        let src = checkerboard(32, 20);
        let jpeg = raster.encode(&src, 0.9).unwrap();
        // JPEG/JFIF magic
        assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);
        let back = image::load_from_memory(&jpeg).unwrap();
        assert_eq!((back.width(), back.height()), (32, 20));
    }
}
