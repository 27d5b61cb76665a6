// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pixel buffer — an owned RGBA8 raster with indexed access. Decoding,
// resampling and encoding go through the `image` crate; channel averaging
// works directly on the sample array.

use image::codecs::png::PngEncoder;
use image::imageops::{self, FilterType};
use image::{ImageBuffer, ImageEncoder, Rgba};
use lesewerk_core::error::{LesewerkError, Result};
use tracing::{debug, instrument};

/// Largest surface (in pixels) we are willing to allocate.
///
/// Matches the area limit common to browser canvases (2^28 pixels, 1 GiB of
/// RGBA samples).
pub const MAX_SURFACE_PIXELS: u64 = 1 << 28;

/// A decoded raster: row-major RGBA samples, four `u8` channels per pixel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    samples: Vec<u8>,
}

impl PixelBuffer {
    /// Samples per pixel (R, G, B, A).
    pub const CHANNELS: usize = 4;

    // -- Construction ---------------------------------------------------------

    /// Allocate a transparent-black surface of `width` x `height`.
    ///
    /// Fails with `Surface` for empty or oversized surfaces.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        let len = surface_len(width, height)?;
        Ok(Self {
            width,
            height,
            samples: vec![0u8; len],
        })
    }

    /// Wrap existing RGBA samples. The length must match the dimensions.
    pub fn from_samples(width: u32, height: u32, samples: Vec<u8>) -> Result<Self> {
        let len = surface_len(width, height)?;
        if samples.len() != len {
            return Err(LesewerkError::Surface(format!(
                "{} samples do not fill a {}x{} RGBA surface ({} expected)",
                samples.len(),
                width,
                height,
                len
            )));
        }
        Ok(Self {
            width,
            height,
            samples,
        })
    }

    /// Decode encoded image bytes (PNG, JPEG, BMP, ...) into RGBA samples.
    #[instrument(skip(data), fields(data_len = data.len()))]
    pub fn decode(data: &[u8]) -> Result<Self> {
        let img = image::load_from_memory(data)
            .map_err(|err| LesewerkError::Decode(format!("failed to decode image: {}", err)))?;
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        debug!(width, height, "Image decoded from bytes");
        Self::from_samples(width, height, rgba.into_raw())
    }

    // -- Accessors ------------------------------------------------------------

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn samples(&self) -> &[u8] {
        &self.samples
    }

    pub fn samples_mut(&mut self) -> &mut [u8] {
        &mut self.samples
    }

    /// RGBA value at (x, y). Panics when out of bounds, like slice indexing.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = self.offset(x, y);
        [
            self.samples[i],
            self.samples[i + 1],
            self.samples[i + 2],
            self.samples[i + 3],
        ]
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        let i = self.offset(x, y);
        self.samples[i..i + Self::CHANNELS].copy_from_slice(&rgba);
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        assert!(
            x < self.width && y < self.height,
            "pixel ({x}, {y}) outside {}x{} surface",
            self.width,
            self.height
        );
        (y as usize * self.width as usize + x as usize) * Self::CHANNELS
    }

    // -- Transformations ------------------------------------------------------

    /// Integer nearest-neighbour upscale: every source pixel becomes a
    /// `scale` x `scale` block in the result.
    #[instrument(skip(self), fields(width = self.width, height = self.height))]
    pub fn upscale(&self, scale: u32) -> Result<Self> {
        if scale == 0 {
            return Err(LesewerkError::Surface("upscale factor must be at least 1".into()));
        }
        let overflow = || {
            LesewerkError::Surface(format!(
                "{}x{} scaled by {} overflows the surface size",
                self.width, self.height, scale
            ))
        };
        let dst_w = self.width.checked_mul(scale).ok_or_else(overflow)?;
        let dst_h = self.height.checked_mul(scale).ok_or_else(overflow)?;
        surface_len(dst_w, dst_h)?;

        let view = ImageBuffer::<Rgba<u8>, &[u8]>::from_raw(self.width, self.height, self.samples.as_slice())
            .ok_or_else(|| {
                LesewerkError::Surface(format!(
                    "{}x{} surface has an inconsistent sample buffer",
                    self.width, self.height
                ))
            })?;
        // Integer factors put every destination centre inside exactly one
        // source pixel, so `Nearest` yields whole-pixel blocks.
        let resized = imageops::resize(&view, dst_w, dst_h, FilterType::Nearest);
        let dst = Self::from_samples(dst_w, dst_h, resized.into_raw())?;

        debug!(dst_w, dst_h, "Upscale complete");
        Ok(dst)
    }

    /// Replace R, G and B of every pixel with their plain arithmetic mean.
    ///
    /// Not a luma transform: the three channels weigh the same. The mean is
    /// rounded to the nearest integer (a third is never exactly half) and
    /// alpha is left alone. Running this twice changes nothing the second
    /// time.
    pub fn average_channels(&mut self) {
        for px in self.samples.chunks_exact_mut(Self::CHANNELS) {
            let sum = px[0] as u16 + px[1] as u16 + px[2] as u16;
            // A mean of u8 values always fits in a u8.
            let avg = ((sum + 1) / 3) as u8;
            px[0] = avg;
            px[1] = avg;
            px[2] = avg;
        }
    }

    /// Whether R == G == B holds for every pixel.
    pub fn is_grayscale(&self) -> bool {
        self.samples
            .chunks_exact(Self::CHANNELS)
            .all(|px| px[0] == px[1] && px[1] == px[2])
    }

    // -- Output ---------------------------------------------------------------

    /// Encode the buffer losslessly as RGBA PNG.
    pub fn encode_png(&self) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        PngEncoder::new(&mut buffer)
            .write_image(
                &self.samples,
                self.width,
                self.height,
                image::ExtendedColorType::Rgba8,
            )
            .map_err(|err| LesewerkError::Surface(format!("PNG encoding failed: {}", err)))?;
        Ok(buffer)
    }
}

/// Byte length of an RGBA surface, or a `Surface` error if one cannot exist.
fn surface_len(width: u32, height: u32) -> Result<usize> {
    if width == 0 || height == 0 {
        return Err(LesewerkError::Surface(format!(
            "cannot allocate an empty {}x{} surface",
            width, height
        )));
    }
    let pixels = width as u64 * height as u64;
    if pixels > MAX_SURFACE_PIXELS {
        return Err(LesewerkError::Surface(format!(
            "{}x{} exceeds the {} pixel surface limit",
            width, height, MAX_SURFACE_PIXELS
        )));
    }
    usize::try_from(pixels * PixelBuffer::CHANNELS as u64)
        .map_err(|_| LesewerkError::Surface("surface too large for this platform".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checkerboard(width: u32, height: u32) -> PixelBuffer {
        let mut buf = PixelBuffer::new(width, height).unwrap();
        for y in 0..height {
            for x in 0..width {
                let v = if (x + y) % 2 == 0 { 200 } else { 10 };
                buf.set_pixel(x, y, [v, v / 2, 255 - v, 128 + (x % 2) as u8]);
            }
        }
        buf
    }

    #[test]
    fn empty_surface_is_rejected() {
        assert!(matches!(PixelBuffer::new(0, 10), Err(LesewerkError::Surface(_))));
        assert!(matches!(PixelBuffer::new(10, 0), Err(LesewerkError::Surface(_))));
    }

    #[test]
    fn oversized_surface_is_rejected() {
        assert!(matches!(
            PixelBuffer::new(1 << 15, 1 << 15),
            Err(LesewerkError::Surface(_))
        ));
    }

    #[test]
    fn mismatched_sample_count_is_rejected() {
        assert!(PixelBuffer::from_samples(2, 2, vec![0; 15]).is_err());
        assert!(PixelBuffer::from_samples(2, 2, vec![0; 16]).is_ok());
    }

    #[test]
    fn upscale_replicates_blocks() {
        let src = checkerboard(3, 2);
        let dst = src.upscale(2).unwrap();
        assert_eq!(dst.dimensions(), (6, 4));
        for y in 0..4 {
            for x in 0..6 {
                assert_eq!(dst.pixel(x, y), src.pixel(x / 2, y / 2), "at ({x}, {y})");
            }
        }
    }

    #[test]
    fn upscale_by_three_replicates_blocks() {
        let src = checkerboard(4, 3);
        let dst = src.upscale(3).unwrap();
        assert_eq!(dst.dimensions(), (12, 9));
        for y in 0..9 {
            for x in 0..12 {
                assert_eq!(dst.pixel(x, y), src.pixel(x / 3, y / 3), "at ({x}, {y})");
            }
        }
    }

    #[test]
    fn upscale_by_one_is_a_copy() {
        let src = checkerboard(5, 3);
        assert_eq!(src.upscale(1).unwrap(), src);
    }

    #[test]
    fn upscale_overflow_is_a_surface_error() {
        let src = PixelBuffer::new(1, 1).unwrap();
        assert!(matches!(src.upscale(u32::MAX), Err(LesewerkError::Surface(_))));
        assert!(matches!(src.upscale(0), Err(LesewerkError::Surface(_))));
    }

    #[test]
    fn averaging_rounds_and_keeps_alpha() {
        let samples = vec![10, 20, 31, 77, 255, 255, 254, 0, 1, 2, 2, 255, 0, 0, 1, 9];
        let mut buf = PixelBuffer::from_samples(4, 1, samples).unwrap();
        buf.average_channels();
        // 61 / 3 = 20.33
        assert_eq!(buf.pixel(0, 0), [20, 20, 20, 77]);
        // 764 / 3 = 254.67
        assert_eq!(buf.pixel(1, 0), [255, 255, 255, 0]);
        // 5 / 3 = 1.67
        assert_eq!(buf.pixel(2, 0), [2, 2, 2, 255]);
        // 1 / 3 = 0.33
        assert_eq!(buf.pixel(3, 0), [0, 0, 0, 9]);
        assert!(buf.is_grayscale());
    }

    #[test]
    fn averaging_matches_rounded_float_mean() {
        for (r, g, b) in [(0u8, 0u8, 0u8), (1, 2, 2), (0, 255, 0), (7, 8, 8), (255, 254, 254), (3, 4, 100)] {
            let mut buf = PixelBuffer::from_samples(1, 1, vec![r, g, b, 255]).unwrap();
            buf.average_channels();
            let expected = ((r as f64 + g as f64 + b as f64) / 3.0).round() as u8;
            assert_eq!(buf.pixel(0, 0), [expected, expected, expected, 255], "({r}, {g}, {b})");
        }
    }

    #[test]
    fn averaging_is_idempotent() {
        let mut once = checkerboard(7, 5);
        once.average_channels();
        let mut twice = once.clone();
        twice.average_channels();
        assert_eq!(once, twice);
    }

    #[test]
    fn png_output_decodes_back() {
        let src = checkerboard(4, 3);
        let png = src.encode_png().unwrap();
        assert_eq!(image::guess_format(&png).unwrap(), image::ImageFormat::Png);
        assert_eq!(PixelBuffer::decode(&png).unwrap(), src);
    }

    #[test]
    fn garbage_is_a_decode_error() {
        assert!(matches!(
            PixelBuffer::decode(b"definitely not an image"),
            Err(LesewerkError::Decode(_))
        ));
    }
}
