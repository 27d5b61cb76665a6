// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable failure messages for the operator in front of the reader.
//
// Every failure reason is mapped to plain English with a clear suggestion.
// The severity drives how a front end presents it.

use crate::error::LesewerkError;
use crate::types::FailureReason;

/// Severity of a failure from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Temporary trouble; starting the same image again may work.
    Transient,
    /// The user must do something (pick another image, install models).
    ActionRequired,
    /// Retrying with the same input will not help.
    Permanent,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary (shown as a heading).
    pub message: String,
    /// What the user should try (shown as body text).
    pub suggestion: String,
    /// Whether starting the session again with the same image is worthwhile.
    pub retriable: bool,
    pub severity: Severity,
}

/// Convert a terminal `FailureReason` into a message an operator can act on.
pub fn humanize_failure(reason: &FailureReason) -> HumanError {
    match reason {
        FailureReason::Decode(_) => HumanError {
            message: "Failed to read image.".into(),
            suggestion: "The file may be damaged or not a picture. Try saving it as a PNG or JPEG and load it again.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },

        FailureReason::Surface(detail) => HumanError {
            message: "The image couldn't be prepared for reading.".into(),
            suggestion: format!("Try again. Very large or empty images can't be processed. ({detail})"),
            retriable: true,
            severity: Severity::Transient,
        },

        FailureReason::EngineUnavailable(detail) => {
            if detail.contains("model") {
                HumanError {
                    message: "The text recognition models are missing.".into(),
                    suggestion: "Download the OCR models (run `ocrs` once, or pass --models with the folder that holds them), then try again.".into(),
                    retriable: false,
                    severity: Severity::ActionRequired,
                }
            } else {
                HumanError {
                    message: "The text reader couldn't start.".into(),
                    suggestion: format!("Try again in a moment. ({detail})"),
                    retriable: true,
                    severity: Severity::Transient,
                }
            }
        }

        FailureReason::RecognitionFailed(detail) => HumanError {
            message: "Failed to read image.".into(),
            suggestion: format!("Try a sharper picture with the writing in focus and good lighting. (Detail: {detail})"),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        FailureReason::Timeout(after) => HumanError {
            message: "Reading the image took too long.".into(),
            suggestion: format!("Try again, or crop the picture to just the text. (Gave up after {} seconds.)", after.as_secs()),
            retriable: true,
            severity: Severity::Transient,
        },
    }
}

/// Convert any `LesewerkError` by way of its failure reason, handling the
/// configuration and file errors that never reach a session.
pub fn humanize_error(err: &LesewerkError) -> HumanError {
    match err {
        LesewerkError::Config(detail) => HumanError {
            message: "The settings aren't valid.".into(),
            suggestion: format!("Fix the setting and try again. ({detail})"),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        LesewerkError::Io(io_err) if io_err.kind() == std::io::ErrorKind::NotFound => HumanError {
            message: "The file couldn't be found.".into(),
            suggestion: "It may have been moved or deleted. Try choosing the file again.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        LesewerkError::Io(io_err) if io_err.kind() == std::io::ErrorKind::PermissionDenied => HumanError {
            message: "The app doesn't have permission to use that file.".into(),
            suggestion: "Check the file permissions, or copy the file somewhere else first.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        LesewerkError::Io(_) => HumanError {
            message: "There was a problem reading or writing a file.".into(),
            suggestion: "Try again. If this keeps happening, your storage may be full.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        LesewerkError::Serialization(_) => HumanError {
            message: "The settings file is damaged.".into(),
            suggestion: "Delete config.json from the data folder to go back to the defaults.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        other => humanize_failure(&FailureReason::from(other)),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn decode_failure_reads_like_the_upload_page() {
        let human = humanize_failure(&FailureReason::Decode("unknown format".into()));
        assert_eq!(human.message, "Failed to read image.");
        assert_eq!(human.severity, Severity::Permanent);
        assert!(!human.retriable);
    }

    #[test]
    fn timeout_is_transient() {
        let human = humanize_failure(&FailureReason::Timeout(Duration::from_secs(30)));
        assert_eq!(human.severity, Severity::Transient);
        assert!(human.retriable);
        assert!(human.suggestion.contains("30 seconds"));
    }

    #[test]
    fn missing_models_need_action() {
        let reason = FailureReason::EngineUnavailable("detection model not found at /x".into());
        let human = humanize_failure(&reason);
        assert_eq!(human.severity, Severity::ActionRequired);
    }

    #[test]
    fn recognition_detail_is_shown() {
        let human = humanize_failure(&FailureReason::RecognitionFailed("garbled input".into()));
        assert!(human.suggestion.contains("garbled input"));
    }

    #[test]
    fn missing_file_is_action_required() {
        let err = LesewerkError::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        let human = humanize_error(&err);
        assert_eq!(human.severity, Severity::ActionRequired);
    }

    #[test]
    fn session_errors_route_through_failure_reasons() {
        let human = humanize_error(&LesewerkError::Surface("zero-sized image".into()));
        assert!(human.retriable);
        assert!(human.suggestion.contains("zero-sized image"));
    }
}
