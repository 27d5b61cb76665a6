// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for Lesewerk recognition sessions.

use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{LesewerkError, Result};

/// Identifier of one recognition attempt.
///
/// Ids are handed out in strictly increasing order by a session; `0` is the
/// idle slot that exists before the first `start`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SessionId(pub u64);

impl SessionId {
    /// The id of the idle slot.
    pub const IDLE: SessionId = SessionId(0);

    /// The id after this one. Saturates at `u64::MAX`, which one start per
    /// nanosecond would take over 500 years to reach.
    pub fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Encoded image bytes exactly as supplied by the caller (PNG, JPEG, ...).
///
/// Dimensions are only known once the enhancer decodes the data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawImage {
    data: Vec<u8>,
    name: Option<String>,
}

impl RawImage {
    pub fn from_bytes(data: impl Into<Vec<u8>>) -> Self {
        Self {
            data: data.into(),
            name: None,
        }
    }

    /// Read an image file from disk. The file name is kept for log output.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned());
        Ok(Self { data, name })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Original file name, if the image came from disk.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

/// Losslessly re-encoded (PNG) output of the enhancement transform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnhancedImage {
    png: Vec<u8>,
    width: u32,
    height: u32,
}

impl EnhancedImage {
    pub fn new(png: Vec<u8>, width: u32, height: u32) -> Self {
        Self { png, width, height }
    }

    pub fn png_bytes(&self) -> &[u8] {
        &self.png
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// Why a recognition attempt ended in `Failed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureReason {
    /// The input could not be decoded into a raster.
    Decode(String),
    /// No rasterization surface could be set up for the transform.
    Surface(String),
    /// The OCR engine failed to initialise.
    EngineUnavailable(String),
    /// The engine reported a failure; the detail is kept verbatim.
    RecognitionFailed(String),
    /// The recognizing phase exceeded the configured timeout.
    Timeout(Duration),
}

impl FailureReason {
    /// Short machine-friendly tag, handy for log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Decode(_) => "decode",
            Self::Surface(_) => "surface",
            Self::EngineUnavailable(_) => "engine_unavailable",
            Self::RecognitionFailed(_) => "recognition_failed",
            Self::Timeout(_) => "timeout",
        }
    }
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Decode(detail) => write!(f, "image could not be decoded: {detail}"),
            Self::Surface(detail) => write!(f, "rasterization surface unavailable: {detail}"),
            Self::EngineUnavailable(detail) => write!(f, "OCR engine unavailable: {detail}"),
            Self::RecognitionFailed(detail) => f.write_str(detail),
            Self::Timeout(after) => write!(f, "recognition timed out after {after:?}"),
        }
    }
}

impl From<&LesewerkError> for FailureReason {
    fn from(err: &LesewerkError) -> Self {
        match err {
            LesewerkError::Decode(detail) => Self::Decode(detail.clone()),
            LesewerkError::Surface(detail) => Self::Surface(detail.clone()),
            LesewerkError::EngineUnavailable(detail) => Self::EngineUnavailable(detail.clone()),
            LesewerkError::RecognitionFailed(detail) => Self::RecognitionFailed(detail.clone()),
            LesewerkError::Timeout(after) => Self::Timeout(*after),
            // Anything else reaching the session boundary came out of an engine.
            other @ (LesewerkError::Config(_)
            | LesewerkError::Io(_)
            | LesewerkError::Serialization(_)) => Self::RecognitionFailed(other.to_string()),
        }
    }
}

impl From<LesewerkError> for FailureReason {
    fn from(err: LesewerkError) -> Self {
        Self::from(&err)
    }
}

/// Outcome of a finished recognition attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecognitionResult {
    /// Recognized text. May legitimately be empty.
    Text(String),
    Failure(FailureReason),
}

impl RecognitionResult {
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Failure(_) => None,
        }
    }
}

/// Lifecycle states of a recognition session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    /// Nothing has been started yet.
    #[default]
    Idle,
    /// The enhancement transform is running.
    Preprocessing,
    /// The enhanced image is with the OCR engine.
    Recognizing,
    /// The engine returned text (possibly empty).
    Completed(String),
    Failed(FailureReason),
}

impl SessionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed(_) | Self::Failed(_))
    }

    /// Whether work for the current attempt is still outstanding.
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Preprocessing | Self::Recognizing)
    }

    /// The result carried by a terminal state.
    pub fn result(&self) -> Option<RecognitionResult> {
        match self {
            Self::Completed(text) => Some(RecognitionResult::Text(text.clone())),
            Self::Failed(reason) => Some(RecognitionResult::Failure(reason.clone())),
            Self::Idle | Self::Preprocessing | Self::Recognizing => None,
        }
    }

    /// Lower-case state name for log fields and status lines.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Preprocessing => "preprocessing",
            Self::Recognizing => "recognizing",
            Self::Completed(_) => "completed",
            Self::Failed(_) => "failed",
        }
    }
}

/// Read-only view of the current session slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub id: SessionId,
    pub state: SessionState,
    /// When `state` was last committed.
    pub updated_at: DateTime<Utc>,
}

impl SessionSnapshot {
    pub fn idle() -> Self {
        Self {
            id: SessionId::IDLE,
            state: SessionState::Idle,
            updated_at: Utc::now(),
        }
    }
}
