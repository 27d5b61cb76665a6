// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// OCR engine adapter for Lesewerk.
//
// Implements `RecognitionEngine` on top of the `ocrs` crate, a pure-Rust OCR
// engine backed by neural network models executed via `rten`.
//
// # Feature Gate
//
// This module is only available when the `ocr` feature is enabled:
//
// ```toml
// lesewerk-document = { path = "crates/lesewerk-document", features = ["ocr"] }
// ```
//
// # Model Setup
//
// The engine requires two model files:
//
// - **Detection model** (`text-detection.rten`) — locates text regions in the image.
// - **Recognition model** (`text-recognition.rten`) — decodes characters from detected regions.
//
// Running the `ocrs-cli` tool once downloads both into the default cache
// directory, `$XDG_CACHE_HOME/ocrs` (typically `~/.cache/ocrs`).

use std::path::{Path, PathBuf};
use std::sync::Arc;

use lesewerk_core::engine::RecognitionEngine;
use lesewerk_core::error::{LesewerkError, Result};
use lesewerk_core::types::EnhancedImage;
use ocrs::{ImageSource, OcrEngine as OcrsInstance, OcrEngineParams};
use rten::Model;
use tracing::{debug, info, instrument};

/// Default directory for cached OCR model files.
///
/// Follows the XDG Base Directory specification: `$XDG_CACHE_HOME/ocrs`, falling
/// back to `~/.cache/ocrs` when `XDG_CACHE_HOME` is unset.
fn default_model_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CACHE_HOME") {
        PathBuf::from(xdg).join("ocrs")
    } else if let Ok(home) = std::env::var("HOME") {
        PathBuf::from(home).join(".cache").join("ocrs")
    } else {
        PathBuf::from("ocrs-models")
    }
}

const DETECTION_MODEL_FILENAME: &str = "text-detection.rten";
const RECOGNITION_MODEL_FILENAME: &str = "text-recognition.rten";

/// Where [`OcrsEngine`] finds its models.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OcrConfig {
    /// Path to the text-detection model file (`.rten`).
    pub detection_model_path: PathBuf,
    /// Path to the text-recognition model file (`.rten`).
    pub recognition_model_path: PathBuf,
}

impl Default for OcrConfig {
    /// Returns a config pointing at the default model cache directory.
    fn default() -> Self {
        Self::from_dir(default_model_dir())
    }
}

impl OcrConfig {
    /// Expects `dir` to contain `text-detection.rten` and `text-recognition.rten`.
    pub fn from_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            detection_model_path: dir.join(DETECTION_MODEL_FILENAME),
            recognition_model_path: dir.join(RECOGNITION_MODEL_FILENAME),
        }
    }

    pub fn from_paths(
        detection_model: impl Into<PathBuf>,
        recognition_model: impl Into<PathBuf>,
    ) -> Self {
        Self {
            detection_model_path: detection_model.into(),
            recognition_model_path: recognition_model.into(),
        }
    }

    /// Verify that both model files exist.
    pub fn validate(&self) -> Result<()> {
        for (kind, path) in [
            ("detection", &self.detection_model_path),
            ("recognition", &self.recognition_model_path),
        ] {
            if !path.exists() {
                return Err(LesewerkError::EngineUnavailable(format!(
                    "{} model not found at {}; run `ocrs-cli` once to download models",
                    kind,
                    path.display()
                )));
            }
        }
        Ok(())
    }
}

/// `ocrs`-backed recognition engine.
///
/// Every [`acquire`](RecognitionEngine::acquire) loads a fresh engine
/// instance from the model files; [`release`](RecognitionEngine::release)
/// drops it. Model loading and inference run on tokio's blocking pool.
///
/// **Important:** `ocrs` and `rten` must be compiled in release mode. Debug
/// builds are 10-100x slower.
#[derive(Debug, Clone)]
pub struct OcrsEngine {
    config: OcrConfig,
}

/// One loaded `ocrs` instance.
pub struct OcrsHandle {
    engine: Arc<OcrsInstance>,
}

impl OcrsEngine {
    pub fn new(config: OcrConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &OcrConfig {
        &self.config
    }
}

impl Default for OcrsEngine {
    fn default() -> Self {
        Self::new(OcrConfig::default())
    }
}

impl RecognitionEngine for OcrsEngine {
    type Handle = OcrsHandle;

    #[instrument(skip_all, fields(
        detection = %self.config.detection_model_path.display(),
        recognition = %self.config.recognition_model_path.display(),
    ))]
    async fn acquire(&self) -> Result<OcrsHandle> {
        self.config.validate()?;
        let config = self.config.clone();

        let engine = tokio::task::spawn_blocking(move || load_engine(&config))
            .await
            .map_err(|err| {
                LesewerkError::EngineUnavailable(format!("model loading task failed: {}", err))
            })??;

        info!("OCR engine initialised");
        Ok(OcrsHandle {
            engine: Arc::new(engine),
        })
    }

    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    async fn recognize(&self, handle: &mut OcrsHandle, image: &EnhancedImage) -> Result<String> {
        let engine = Arc::clone(&handle.engine);
        let png = image.png_bytes().to_vec();

        let text = tokio::task::spawn_blocking(move || recognize_png(&engine, &png))
            .await
            .map_err(|err| {
                LesewerkError::RecognitionFailed(format!("recognition task failed: {}", err))
            })??;

        debug!(
            line_count = text.lines().count(),
            char_count = text.len(),
            "OCR recognition complete"
        );
        Ok(text)
    }

    fn release(&self, handle: OcrsHandle) {
        drop(handle);
        debug!("OCR engine released");
    }
}

fn load_engine(config: &OcrConfig) -> Result<OcrsInstance> {
    info!("Loading OCR detection model");
    let detection_model = Model::load_file(&config.detection_model_path).map_err(|err| {
        LesewerkError::EngineUnavailable(format!(
            "failed to load detection model from {}: {}",
            config.detection_model_path.display(),
            err
        ))
    })?;

    info!("Loading OCR recognition model");
    let recognition_model = Model::load_file(&config.recognition_model_path).map_err(|err| {
        LesewerkError::EngineUnavailable(format!(
            "failed to load recognition model from {}: {}",
            config.recognition_model_path.display(),
            err
        ))
    })?;

    OcrsInstance::new(OcrEngineParams {
        detection_model: Some(detection_model),
        recognition_model: Some(recognition_model),
        ..Default::default()
    })
    .map_err(|err| LesewerkError::EngineUnavailable(format!("failed to initialise OCR engine: {}", err)))
}

fn recognize_png(engine: &OcrsInstance, png: &[u8]) -> Result<String> {
    let rgb = image::load_from_memory_with_format(png, image::ImageFormat::Png)
        .map_err(|err| LesewerkError::RecognitionFailed(format!("unreadable input image: {}", err)))?
        .to_rgb8();
    let (width, height) = rgb.dimensions();

    let source = ImageSource::from_bytes(rgb.as_raw(), (width, height)).map_err(|err| {
        LesewerkError::RecognitionFailed(format!(
            "failed to create image source ({}x{}): {}",
            width, height, err
        ))
    })?;

    let input = engine
        .prepare_input(source)
        .map_err(|err| LesewerkError::RecognitionFailed(format!("OCR preprocessing failed: {}", err)))?;

    engine
        .get_text(&input)
        .map_err(|err| LesewerkError::RecognitionFailed(format!("OCR text recognition failed: {}", err)))
}

/// Whether both model files exist in the default cache location.
pub fn models_available() -> bool {
    OcrConfig::default().validate().is_ok()
}

/// The default model directory (for diagnostics output).
pub fn model_directory() -> PathBuf {
    default_model_dir()
}
