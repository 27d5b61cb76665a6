// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// lesewerk-document — Image processing for Lesewerk.
//
// Provides the pixel buffer abstraction (decode, integer upscale, channel
// averaging, PNG encoding), the recognition enhancement transform, and an
// `ocrs`-backed OCR engine behind the `ocr` feature.

pub mod raster;
pub mod scan;

// Re-export the primary structs so callers can use `lesewerk_document::ImageEnhancer` etc.
pub use raster::PixelBuffer;
pub use scan::enhance::ImageEnhancer;

#[cfg(feature = "ocr")]
pub use scan::ocr::OcrsEngine;
