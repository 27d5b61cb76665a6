// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// lesewerk-session — Orchestrates one recognition attempt at a time:
// enhance the image, hand it to an OCR engine, publish the outcome.
//
// Starting a new attempt supersedes the previous one. Work already in flight
// for the old attempt runs to completion, but its result is discarded.

pub mod session;

pub use session::{RecognitionSession, SessionOptions};
