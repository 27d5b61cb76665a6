// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Saving recognized text to a plain text file.

use std::path::Path;

use lesewerk_core::error::{LesewerkError, Result};
use tracing::{info, instrument};

/// Write `text` to `path`.
///
/// Returns `Ok(false)` without touching the filesystem when there is no text
/// to save (empty or whitespace only).
#[instrument(skip(text), fields(path = %path.display(), char_count = text.len()))]
pub fn save_text(path: &Path, text: &str) -> Result<bool> {
    if text.trim().is_empty() {
        info!("nothing recognized; export skipped");
        return Ok(false);
    }

    std::fs::write(path, text).map_err(|e| {
        LesewerkError::Io(std::io::Error::new(
            e.kind(),
            format!("failed to write {}: {}", path.display(), e),
        ))
    })?;
    info!("recognized text exported");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("handwritten_notes.txt");

        assert!(save_text(&path, "Buy milk\nCall Oma").unwrap());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "Buy milk\nCall Oma");
    }

    #[test]
    fn refuses_empty_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("handwritten_notes.txt");

        assert!(!save_text(&path, "").unwrap());
        assert!(!save_text(&path, "  \n\t").unwrap());
        assert!(!path.exists());
    }

    #[test]
    fn missing_directory_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no-such-dir").join("notes.txt");

        let err = save_text(&path, "text").unwrap_err();
        assert!(matches!(err, LesewerkError::Io(_)));
        assert!(err.to_string().contains("no-such-dir"));
    }
}
