// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Lesewerk — Core types, error definitions, and the OCR engine capability
// shared across all crates.

pub mod config;
pub mod engine;
pub mod error;
pub mod human_errors;
pub mod types;

pub use config::AppConfig;
pub use engine::RecognitionEngine;
pub use error::{LesewerkError, Result};
pub use types::*;
