// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Capability trait for the external OCR engine.
//
// A recognition session never holds an engine instance beyond one attempt:
// it acquires a handle, makes exactly one recognize call with it, and hands
// it back through `release`.

use std::future::Future;

use crate::error::Result;
use crate::types::EnhancedImage;

/// An OCR engine that can be instantiated on demand.
///
/// Implementations are owned by a session and shared between its attempts, so `&self`
/// methods must be safe to call concurrently. The `Handle` is exclusively
/// owned by one attempt.
pub trait RecognitionEngine: Send + Sync + 'static {
    /// One live engine instance.
    type Handle: Send + 'static;

    /// Start a fresh engine instance.
    ///
    /// Fails with `LesewerkError::EngineUnavailable` when the engine cannot
    /// be initialised.
    fn acquire(&self) -> impl Future<Output = Result<Self::Handle>> + Send;

    /// Recognize the text in `image`.
    ///
    /// Fails with `LesewerkError::RecognitionFailed` carrying the engine's
    /// own detail. An empty string is a successful result.
    fn recognize(
        &self,
        handle: &mut Self::Handle,
        image: &EnhancedImage,
    ) -> impl Future<Output = Result<String>> + Send;

    /// Terminate an engine instance. Must not fail observably.
    fn release(&self, handle: Self::Handle);
}
