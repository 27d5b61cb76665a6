// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Raster module — owned RGBA pixel buffers: decode, upscale, channel
// averaging, PNG encoding.

pub mod buffer;

pub use buffer::PixelBuffer;
