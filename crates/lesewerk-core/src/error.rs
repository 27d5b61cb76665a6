// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Lesewerk.

use std::time::Duration;

use thiserror::Error;

/// Top-level error type for all Lesewerk operations.
#[derive(Debug, Error)]
pub enum LesewerkError {
    // -- Image enhancement --
    #[error("image could not be decoded: {0}")]
    Decode(String),

    #[error("rasterization surface unavailable: {0}")]
    Surface(String),

    // -- Engine boundary --
    #[error("OCR engine unavailable: {0}")]
    EngineUnavailable(String),

    /// The engine's own failure detail, kept verbatim for diagnostics.
    #[error("{0}")]
    RecognitionFailed(String),

    #[error("recognition timed out after {0:?}")]
    Timeout(Duration),

    // -- Configuration / persistence --
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, LesewerkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognition_failure_displays_detail_verbatim() {
        let err = LesewerkError::RecognitionFailed("timeout".into());
        assert_eq!(err.to_string(), "timeout");
    }

    #[test]
    fn io_errors_convert() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: LesewerkError = io.into();
        assert!(matches!(err, LesewerkError::Io(_)));
    }
}
