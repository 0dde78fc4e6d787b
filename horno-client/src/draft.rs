//! Draft session and snapshot persistence
//!
//! The draft survives a client reload through a single keyed JSON
//! snapshot on disk. Writes are coalesced on a trailing debounce: each
//! mutation cancels the pending timer and arms a fresh one, so a burst
//! of edits produces one write carrying the final state. `flush`
//! bypasses the timer for moments that need a guaranteed up-to-date
//! snapshot (navigation away, successful submission).

use crate::cart::OrderDraft;
use crate::error::ClientResult;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// File name of the draft snapshot
const SNAPSHOT_FILE: &str = "current_draft.json";

/// Snapshot store for one station's draft
#[derive(Debug)]
pub struct DraftStore {
    path: PathBuf,
}

impl DraftStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(SNAPSHOT_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the last snapshot. Absence and corrupt content both fail
    /// open to an empty draft; a station must never refuse to start
    /// over a bad snapshot.
    pub fn load(&self) -> OrderDraft {
        let bytes = match std::fs::read(&self.path) {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return OrderDraft::default(),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "draft snapshot unreadable, starting empty");
                return OrderDraft::default();
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(draft) => draft,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "draft snapshot corrupt, starting empty");
                OrderDraft::default()
            }
        }
    }

    /// Persist a snapshot atomically (write temp file, then rename).
    pub fn save(&self, draft: &OrderDraft) -> ClientResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let bytes = serde_json::to_vec_pretty(draft)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, bytes)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    /// Remove the snapshot, if any.
    pub fn clear(&self) -> ClientResult<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Owner of the in-progress draft.
///
/// Single writer: only this session mutates the draft; displays and
/// the submitter see it by value. Every mutation reschedules the
/// debounced snapshot write.
pub struct DraftSession {
    draft: OrderDraft,
    store: Arc<DraftStore>,
    debounce: Duration,
    pending: Option<JoinHandle<()>>,
}

impl DraftSession {
    /// Open the session, rehydrating the draft from the last snapshot.
    pub fn open(store: DraftStore, debounce: Duration) -> Self {
        let draft = store.load();
        Self {
            draft,
            store: Arc::new(store),
            debounce,
            pending: None,
        }
    }

    pub fn draft(&self) -> &OrderDraft {
        &self.draft
    }

    /// Apply a mutation and arm the debounced snapshot write.
    pub fn mutate<F>(&mut self, f: F)
    where
        F: FnOnce(&mut OrderDraft),
    {
        f(&mut self.draft);
        self.schedule_save();
    }

    fn schedule_save(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }

        let store = Arc::clone(&self.store);
        let snapshot = self.draft.clone();
        let delay = self.debounce;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Err(e) = store.save(&snapshot) {
                tracing::warn!(error = %e, "debounced draft save failed");
            }
        }));
    }

    /// Cancel any pending timer and persist the current state now.
    pub fn flush(&mut self) -> ClientResult<()> {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
        self.store.save(&self.draft)
    }

    /// Reset the draft for the next order and snapshot the cleared
    /// state immediately.
    pub fn reset_after_submit(&mut self) -> ClientResult<()> {
        self.draft.reset_after_submit();
        self.flush()
    }
}

impl Drop for DraftSession {
    fn drop(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}
