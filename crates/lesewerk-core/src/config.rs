// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Application configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{LesewerkError, Result};

/// File name of the persisted configuration inside the data directory.
pub const CONFIG_FILE: &str = "config.json";

/// Persistent application settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Integer upscale factor applied before recognition (default 2).
    pub upscale_factor: u32,
    /// Optional limit on the recognizing phase, in seconds.
    pub recognition_timeout_secs: Option<u64>,
    /// Directory holding the OCR model files. `None` uses the engine default.
    pub model_dir: Option<PathBuf>,
    /// Default file name for exported text.
    pub export_file_name: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            upscale_factor: 2,
            recognition_timeout_secs: None,
            model_dir: None,
            export_file_name: "handwritten_notes.txt".into(),
        }
    }
}

impl AppConfig {
    /// Reject values the pipeline cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.upscale_factor == 0 {
            return Err(LesewerkError::Config(
                "upscale_factor must be at least 1".into(),
            ));
        }
        if self.recognition_timeout_secs == Some(0) {
            return Err(LesewerkError::Config(
                "recognition_timeout_secs cannot be 0 (omit it to disable the timeout)".into(),
            ));
        }
        if self.export_file_name.trim().is_empty() {
            return Err(LesewerkError::Config("export_file_name cannot be empty".into()));
        }
        Ok(())
    }

    pub fn recognition_timeout(&self) -> Option<Duration> {
        self.recognition_timeout_secs.map(Duration::from_secs)
    }

    /// Load `config.json` from `data_dir`.
    ///
    /// Returns `Ok(None)` when no file has been written yet.
    pub fn load(data_dir: &Path) -> Result<Option<Self>> {
        let path = data_dir.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(None);
        }
        let data = std::fs::read_to_string(&path)?;
        let config: Self = serde_json::from_str(&data)?;
        config.validate()?;
        Ok(Some(config))
    }

    /// Write the configuration as pretty JSON into `data_dir`.
    pub fn save(&self, data_dir: &Path) -> Result<()> {
        self.validate()?;
        let path = data_dir.join(CONFIG_FILE);
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = AppConfig::default();
        assert_eq!(config.upscale_factor, 2);
        assert!(config.recognition_timeout().is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_scale_is_rejected() {
        let config = AppConfig {
            upscale_factor: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(LesewerkError::Config(_))));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let config = AppConfig {
            recognition_timeout_secs: Some(0),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(AppConfig::load(dir.path()).unwrap(), None);

        let config = AppConfig {
            upscale_factor: 3,
            recognition_timeout_secs: Some(30),
            model_dir: Some(PathBuf::from("/opt/models")),
            export_file_name: "notes.txt".into(),
        };
        config.save(dir.path()).unwrap();

        let loaded = AppConfig::load(dir.path()).unwrap().unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.recognition_timeout(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), r#"{ "upscale_factor": 4 }"#).unwrap();

        let loaded = AppConfig::load(dir.path()).unwrap().unwrap();
        assert_eq!(loaded.upscale_factor, 4);
        assert_eq!(loaded.export_file_name, "handwritten_notes.txt");
    }

    #[test]
    fn malformed_file_is_a_serialization_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "not json").unwrap();
        assert!(matches!(
            AppConfig::load(dir.path()),
            Err(LesewerkError::Serialization(_))
        ));
    }
}
