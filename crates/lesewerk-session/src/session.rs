// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Recognition session state machine.
//
//   Idle ──start──▶ Preprocessing ──enhanced──▶ Recognizing ──text──▶ Completed
//                        │                           │
//                        └──────── error ────────────┴──────────────▶ Failed
//
// `start` may be called from any state; it always moves the slot to
// `Preprocessing` under a fresh id. Every later commit carries the id of the
// attempt that produced it and is dropped when that id is no longer current.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::Utc;
use futures::FutureExt;
use lesewerk_core::config::AppConfig;
use lesewerk_core::engine::RecognitionEngine;
use lesewerk_core::error::{LesewerkError, Result};
use lesewerk_core::types::{
    EnhancedImage, FailureReason, RawImage, RecognitionResult, SessionId, SessionSnapshot,
    SessionState,
};
use lesewerk_document::ImageEnhancer;
use tokio::sync::Notify;
use tokio::time::Instant;
use tracing::{Instrument, debug, info, info_span, instrument, warn};

/// Tunables for a [`RecognitionSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOptions {
    /// Integer upscale factor for the enhancement transform.
    pub scale: u32,
    /// Upper bound on the recognizing phase. `None` waits indefinitely.
    pub recognition_timeout: Option<Duration>,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            scale: ImageEnhancer::DEFAULT_SCALE,
            recognition_timeout: None,
        }
    }
}

impl SessionOptions {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            scale: config.upscale_factor,
            recognition_timeout: config.recognition_timeout(),
        }
    }
}

/// Drives recognition attempts against an engine and exposes their state.
///
/// Cheap to clone; clones observe and control the same slot. Only one
/// attempt is current at a time.
pub struct RecognitionSession<E: RecognitionEngine> {
    shared: Arc<Shared<E>>,
}

impl<E: RecognitionEngine> Clone for RecognitionSession<E> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

struct Shared<E: RecognitionEngine> {
    engine: E,
    enhancer: ImageEnhancer,
    recognition_timeout: Option<Duration>,
    /// The "current session" slot.
    slot: Mutex<SessionSnapshot>,
    /// Woken after every committed change to `slot`.
    changed: Notify,
}

impl<E: RecognitionEngine> RecognitionSession<E> {
    /// Create an idle session over `engine`.
    ///
    /// Fails with `Config` when `options.scale` is zero.
    pub fn new(engine: E, options: SessionOptions) -> Result<Self> {
        let enhancer = ImageEnhancer::new(options.scale)?;
        Ok(Self {
            shared: Arc::new(Shared {
                engine,
                enhancer,
                recognition_timeout: options.recognition_timeout,
                slot: Mutex::new(SessionSnapshot::idle()),
                changed: Notify::new(),
            }),
        })
    }

    /// Begin recognizing `image`, superseding whatever came before.
    ///
    /// Returns immediately with the new attempt's id; the state is already
    /// `Preprocessing` when this returns, and any previous result is gone.
    ///
    /// # Panics
    ///
    /// Must be called from within a tokio runtime.
    #[instrument(skip_all, fields(input_len = image.len()))]
    pub fn start(&self, image: RawImage) -> SessionId {
        let id = {
            let mut slot = self.shared.lock_slot();
            let id = slot.id.next();
            if slot.state.is_busy() {
                info!(superseded = %slot.id, session_id = %id, "superseding in-flight session");
            }
            *slot = SessionSnapshot {
                id,
                state: SessionState::Preprocessing,
                updated_at: Utc::now(),
            };
            id
        };
        self.shared.changed.notify_waiters();

        let shared = Arc::clone(&self.shared);
        tokio::spawn(
            shared
                .run(id, image)
                .instrument(info_span!("recognition", session_id = %id)),
        );
        id
    }

    /// Read-only copy of the current state.
    pub fn current_state(&self) -> SessionState {
        self.shared.lock_slot().state.clone()
    }

    /// The current attempt's result, once it has reached a terminal state.
    pub fn current_result(&self) -> Option<RecognitionResult> {
        self.shared.lock_slot().state.result()
    }

    pub fn current_id(&self) -> SessionId {
        self.shared.lock_slot().id
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.shared.lock_slot().clone()
    }

    #[cfg(test)]
    fn engine(&self) -> &E {
        &self.shared.engine
    }

    /// Wait until attempt `id` reaches `Completed` or `Failed`.
    ///
    /// Resolves to `None` if `id` is (or becomes) superseded, or if it does
    /// not name a started attempt.
    pub async fn wait_for_terminal(&self, id: SessionId) -> Option<SessionState> {
        loop {
            let notified = self.shared.changed.notified();
            tokio::pin!(notified);
            // Register before looking at the slot so a commit in between
            // cannot be missed.
            notified.as_mut().enable();

            {
                let slot = self.shared.lock_slot();
                if slot.id != id || slot.state == SessionState::Idle {
                    return None;
                }
                if slot.state.is_terminal() {
                    return Some(slot.state.clone());
                }
            }

            notified.await;
        }
    }
}

impl<E: RecognitionEngine> Shared<E> {
    fn lock_slot(&self) -> MutexGuard<'_, SessionSnapshot> {
        // The snapshot is replaced wholesale, so a poisoned lock still holds
        // a consistent value.
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Store `state` if `id` is still the current attempt.
    fn commit(&self, id: SessionId, state: SessionState) -> bool {
        {
            let mut slot = self.lock_slot();
            if slot.id != id {
                debug!(current = %slot.id, state = state.label(), "discarding update from superseded session");
                return false;
            }
            slot.state = state;
            slot.updated_at = Utc::now();
        }
        self.changed.notify_waiters();
        true
    }

    async fn run(self: Arc<Self>, id: SessionId, image: RawImage) {
        let terminal = match self.attempt(id, image).await {
            Ok(Some(text)) => {
                info!(char_count = text.len(), "recognition completed");
                SessionState::Completed(text)
            }
            Ok(None) => return,
            Err(err) => {
                let reason = FailureReason::from(&err);
                warn!(kind = reason.kind(), error = %err, "recognition failed");
                SessionState::Failed(reason)
            }
        };
        self.commit(id, terminal);
    }

    /// One pass through the pipeline. `Ok(None)` means the attempt was
    /// superseded before it reached the engine.
    async fn attempt(&self, id: SessionId, image: RawImage) -> Result<Option<String>> {
        let enhancer = self.enhancer;
        let enhanced = tokio::task::spawn_blocking(move || enhancer.enhance(&image))
            .await
            .map_err(|err| LesewerkError::Surface(format!("enhancement task failed: {}", err)))??;

        if !self.commit(id, SessionState::Recognizing) {
            debug!("superseded before recognition; engine not acquired");
            return Ok(None);
        }

        let deadline = self.recognition_timeout.map(Deadline::starting_now);

        let mut handle = self.acquire_handle(deadline).await?;
        debug!("engine acquired");

        let outcome = self.recognize_once(&mut handle, &enhanced, deadline).await;
        self.engine.release(handle);
        debug!("engine released");

        outcome.map(Some)
    }

    /// Acquire an engine handle within the phase deadline. Every failure,
    /// a panic included, surfaces as `EngineUnavailable` unless the deadline
    /// passes first.
    async fn acquire_handle(&self, deadline: Option<Deadline>) -> Result<E::Handle> {
        let call = AssertUnwindSafe(self.engine.acquire()).catch_unwind();

        match bounded(deadline, call).await? {
            Ok(Ok(handle)) => Ok(handle),
            Ok(Err(unavailable @ LesewerkError::EngineUnavailable(_))) => Err(unavailable),
            Ok(Err(other)) => Err(LesewerkError::EngineUnavailable(other.to_string())),
            Err(payload) => Err(LesewerkError::EngineUnavailable(format!(
                "engine panicked: {}",
                panic_detail(&*payload)
            ))),
        }
    }

    /// The single recognize call of an attempt, bounded by the phase
    /// deadline and shielded against engine panics.
    async fn recognize_once(
        &self,
        handle: &mut E::Handle,
        image: &EnhancedImage,
        deadline: Option<Deadline>,
    ) -> Result<String> {
        let call = AssertUnwindSafe(self.engine.recognize(handle, image)).catch_unwind();

        bounded(deadline, call).await?.unwrap_or_else(|payload| {
            Err(LesewerkError::RecognitionFailed(format!(
                "engine panicked: {}",
                panic_detail(&*payload)
            )))
        })
    }
}

/// End of the recognizing phase, fixed when the phase is entered.
#[derive(Debug, Clone, Copy)]
struct Deadline {
    at: Instant,
    limit: Duration,
}

impl Deadline {
    fn starting_now(limit: Duration) -> Self {
        Self {
            at: Instant::now() + limit,
            limit,
        }
    }
}

/// Run `call` to completion, or fail with `Timeout` once `deadline` passes.
async fn bounded<F: Future>(deadline: Option<Deadline>, call: F) -> Result<F::Output> {
    match deadline {
        Some(deadline) => tokio::time::timeout_at(deadline.at, call)
            .await
            .map_err(|_| LesewerkError::Timeout(deadline.limit)),
        None => Ok(call.await),
    }
}

fn panic_detail(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic payload".into()
    }
}
