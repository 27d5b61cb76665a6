// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Recognition enhancement — integer upscale followed by channel-mean
// grayscale, re-encoded as PNG for the OCR engine.

use lesewerk_core::error::{LesewerkError, Result};
use lesewerk_core::types::{EnhancedImage, RawImage};
use tracing::{debug, info, instrument};

use crate::raster::PixelBuffer;

/// Prepares a raw image for text recognition.
///
/// The transform is deterministic:
///
/// 1. Decode the input at its native size
/// 2. Upscale by the integer factor (nearest neighbour)
/// 3. Set R, G and B of every pixel to their mean, alpha untouched
/// 4. Encode losslessly as PNG
///
/// Output dimensions are always the source dimensions times `scale`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageEnhancer {
    scale: u32,
}

impl Default for ImageEnhancer {
    fn default() -> Self {
        Self {
            scale: Self::DEFAULT_SCALE,
        }
    }
}

impl ImageEnhancer {
    pub const DEFAULT_SCALE: u32 = 2;

    /// Create an enhancer with the given upscale factor (must be >= 1).
    pub fn new(scale: u32) -> Result<Self> {
        if scale == 0 {
            return Err(LesewerkError::Config(
                "upscale factor must be at least 1".into(),
            ));
        }
        Ok(Self { scale })
    }

    pub fn scale(&self) -> u32 {
        self.scale
    }

    /// Run the full transform and return the encoded result.
    ///
    /// # Errors
    ///
    /// `Decode` if `raw` is not a readable image, `Surface` if the scaled
    /// raster cannot be allocated or encoded.
    #[instrument(skip_all, fields(scale = self.scale, input_len = raw.len(), file = raw.name()))]
    pub fn enhance(&self, raw: &RawImage) -> Result<EnhancedImage> {
        let buffer = self.enhance_to_buffer(raw)?;
        let png = buffer.encode_png()?;
        let (width, height) = buffer.dimensions();
        info!(width, height, png_len = png.len(), "Image enhanced for recognition");
        Ok(EnhancedImage::new(png, width, height))
    }

    /// Decode, upscale and gray out `raw`, stopping before encoding.
    pub fn enhance_to_buffer(&self, raw: &RawImage) -> Result<PixelBuffer> {
        let source = PixelBuffer::decode(raw.as_bytes())?;
        debug!(
            width = source.width(),
            height = source.height(),
            "Source raster decoded"
        );

        let mut scaled = source.upscale(self.scale)?;
        scaled.average_channels();
        Ok(scaled)
    }
}

/// One-shot form of [`ImageEnhancer::enhance`].
pub fn enhance(raw: &RawImage, scale: u32) -> Result<EnhancedImage> {
    ImageEnhancer::new(scale)?.enhance(raw)
}

// -- Tests --------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};

    use super::*;

    /// Encode a colourful gradient as PNG, the way a caller would hand it over.
    fn gradient_png(width: u32, height: u32) -> RawImage {
        let img = RgbaImage::from_fn(width, height, |x, y| {
            Rgba([
                (x * 255 / width.max(1)) as u8,
                (y * 255 / height.max(1)) as u8,
                ((x + y) % 256) as u8,
                if x % 3 == 0 { 255 } else { 90 },
            ])
        });
        let mut data = Vec::new();
        DynamicImage::ImageRgba8(img)
            .write_to(&mut std::io::Cursor::new(&mut data), ImageFormat::Png)
            .unwrap();
        RawImage::from_bytes(data)
    }

    #[test]
    fn doubles_a_100_by_50_image_into_grayscale() {
        let raw = gradient_png(100, 50);
        let enhanced = ImageEnhancer::default().enhance(&raw).unwrap();
        assert_eq!(enhanced.dimensions(), (200, 100));

        let decoded = PixelBuffer::decode(enhanced.png_bytes()).unwrap();
        assert_eq!(decoded.dimensions(), (200, 100));
        assert!(decoded.is_grayscale());
    }

    #[test]
    fn dimensions_scale_with_the_factor() {
        let raw = gradient_png(13, 7);
        for scale in 1..=4 {
            let enhanced = enhance(&raw, scale).unwrap();
            assert_eq!(enhanced.dimensions(), (13 * scale, 7 * scale), "scale {scale}");
        }
    }

    #[test]
    fn alpha_survives_the_transform() {
        let raw = gradient_png(9, 4);
        let source = PixelBuffer::decode(raw.as_bytes()).unwrap();
        let out = ImageEnhancer::new(3).unwrap().enhance_to_buffer(&raw).unwrap();
        for y in 0..out.height() {
            for x in 0..out.width() {
                assert_eq!(out.pixel(x, y)[3], source.pixel(x / 3, y / 3)[3]);
            }
        }
    }

    #[test]
    fn gray_is_the_plain_mean_not_luma() {
        // Pure green: luma would give ~150, the plain mean gives 85.
        let img = RgbaImage::from_pixel(2, 2, Rgba([0, 255, 0, 255]));
        let mut data = Vec::new();
        DynamicImage::ImageRgba8(img)
            .write_to(&mut std::io::Cursor::new(&mut data), ImageFormat::Png)
            .unwrap();

        let out = ImageEnhancer::default()
            .enhance_to_buffer(&RawImage::from_bytes(data))
            .unwrap();
        assert_eq!(out.pixel(0, 0), [85, 85, 85, 255]);
    }

    #[test]
    fn gray_rounds_to_the_nearest_level() {
        let img = RgbaImage::from_pixel(1, 1, Rgba([1, 2, 2, 200]));
        let mut data = Vec::new();
        DynamicImage::ImageRgba8(img)
            .write_to(&mut std::io::Cursor::new(&mut data), ImageFormat::Png)
            .unwrap();

        let out = ImageEnhancer::default()
            .enhance_to_buffer(&RawImage::from_bytes(data))
            .unwrap();
        assert_eq!(out.dimensions(), (2, 2));
        for (x, y) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
            assert_eq!(out.pixel(x, y), [2, 2, 2, 200]);
        }
    }

    #[test]
    fn enhancing_enhanced_output_keeps_it_gray() {
        let raw = gradient_png(10, 10);
        let once = ImageEnhancer::new(1).unwrap().enhance_to_buffer(&raw).unwrap();
        let again = ImageEnhancer::new(1)
            .unwrap()
            .enhance_to_buffer(&RawImage::from_bytes(once.encode_png().unwrap()))
            .unwrap();
        assert_eq!(once, again);
    }

    #[test]
    fn undecodable_input_is_a_decode_error() {
        let raw = RawImage::from_bytes(vec![0x89, b'P', b'N', b'G', 0, 0, 0]);
        assert!(matches!(
            ImageEnhancer::default().enhance(&raw),
            Err(LesewerkError::Decode(_))
        ));
    }

    #[test]
    fn zero_scale_is_rejected() {
        assert!(ImageEnhancer::new(0).is_err());
        assert_eq!(ImageEnhancer::default().scale(), 2);
    }
}
