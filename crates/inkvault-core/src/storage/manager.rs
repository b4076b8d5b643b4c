//! Debounced save scheduling.
//!
//! Coalesces bursts of change notifications into a single remote write
//! after a quiet period. Cooperatively scheduled: the host event loop
//! calls [`SaveManager::notify`] on every document change and
//! [`SaveManager::tick`] on every pass, and nothing here blocks.

use super::{RemoteStore, StoreError, StoreResult, decode_scene, encode_scene};
use crate::scene::{SceneSnapshot, live_attachments};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Default quiet period before a save fires, in milliseconds.
pub const DEFAULT_QUIET_PERIOD_MS: u64 = 2000;

/// A change waiting out its quiet period.
struct PendingSave {
    snapshot: SceneSnapshot,
    due: Instant,
}

/// Debounced persistence manager.
///
/// Holds at most one pending save. A new notification replaces any
/// unfired one, so only the latest snapshot is ever written; there is
/// no queue. `flush_due` takes `&mut self` and is awaited by the single
/// driving loop, so a second write cannot start while one is in flight;
/// a notification arriving during an in-flight write arms a fresh slot
/// whose flush runs after the first completes, against the version
/// token that write produced.
pub struct SaveManager<S: RemoteStore> {
    /// Remote backend.
    store: Arc<S>,
    /// Quiet period between the last change and the write.
    quiet_period: Duration,
    /// The single pending save slot.
    pending: Option<PendingSave>,
}

impl<S: RemoteStore> SaveManager<S> {
    /// Create a manager with the default quiet period.
    pub fn new(store: Arc<S>) -> Self {
        Self::with_quiet_period(store, Duration::from_millis(DEFAULT_QUIET_PERIOD_MS))
    }

    /// Create a manager with a custom quiet period.
    pub fn with_quiet_period(store: Arc<S>, quiet_period: Duration) -> Self {
        Self {
            store,
            quiet_period,
            pending: None,
        }
    }

    /// Record a document change; (re)arms the save timer.
    pub fn notify(&mut self, snapshot: SceneSnapshot) {
        self.notify_at(snapshot, Instant::now());
    }

    /// [`notify`](Self::notify) with an explicit clock, for host loops
    /// that carry one.
    pub fn notify_at(&mut self, snapshot: SceneSnapshot, now: Instant) {
        if !self.store.is_configured() {
            return;
        }
        self.pending = Some(PendingSave {
            snapshot,
            due: now + self.quiet_period,
        });
    }

    /// Whether a save is armed.
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Whether the quiet period has elapsed for the pending save.
    pub fn is_due(&self, now: Instant) -> bool {
        self.pending.as_ref().is_some_and(|p| now >= p.due)
    }

    /// Fire the pending save if its quiet period has elapsed.
    ///
    /// Returns true when a write was attempted. Store failures are
    /// logged and swallowed, and the slot is consumed either way: a
    /// failed write is dropped until the next change re-arms the timer.
    pub async fn flush_due(&mut self, now: Instant) -> bool {
        let Some(pending) = self.pending.take_if(|p| now >= p.due) else {
            return false;
        };

        match self.write(&pending.snapshot).await {
            Ok(()) => log::debug!("scene saved"),
            Err(StoreError::NotConfigured) => {}
            Err(e) => log::error!("scene save failed: {e}"),
        }
        true
    }

    /// [`flush_due`](Self::flush_due) against the current time.
    pub async fn tick(&mut self) -> bool {
        self.flush_due(Instant::now()).await
    }

    async fn write(&self, snapshot: &SceneSnapshot) -> StoreResult<()> {
        let pruned = SceneSnapshot {
            elements: snapshot.elements.clone(),
            viewer: snapshot.viewer.clone(),
            attachments: live_attachments(&snapshot.elements, &snapshot.attachments),
        };
        let payload = encode_scene(&pruned)?;
        self.store.store(&payload).await
    }

    /// Load the stored scene, if any.
    ///
    /// Every failure path collapses to `None` so the host falls back to
    /// its default empty document. Genuine failures are logged as
    /// errors; cold start and the unconfigured state are not failures.
    pub async fn load(&self) -> Option<SceneSnapshot> {
        if !self.store.is_configured() {
            log::debug!("remote store not configured; skipping load");
            return None;
        }

        let payload = match self.store.fetch().await {
            Ok(Some(payload)) => payload,
            Ok(None) => {
                log::info!("no stored scene found");
                return None;
            }
            Err(e) => {
                log::error!("scene load failed: {e}");
                return None;
            }
        };

        match decode_scene(&payload) {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                log::error!("stored scene unusable: {e}");
                None
            }
        }
    }

    /// Quiet period between the last change and the write.
    pub fn quiet_period(&self) -> Duration {
        self.quiet_period
    }

    /// The remote backend.
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }
}
