// ── Live entry subscription ──
//
// Lets a reporter follow the store while a run is in progress
// without polling the map on every tick.

use std::sync::Arc;

use tokio::sync::watch;

use crate::model::Entry;
use crate::store::EntryStore;

/// A subscription to [`EntryStore`] mutations.
///
/// Carries the store's version counter; snapshots are pulled on demand
/// so a burst of upserts costs one copy, not one per write.
pub struct EntryStream {
    store: Arc<EntryStore>,
    receiver: watch::Receiver<u64>,
}

impl EntryStream {
    pub(crate) fn new(store: Arc<EntryStore>, receiver: watch::Receiver<u64>) -> Self {
        Self { store, receiver }
    }

    /// Number of mutations applied to the store so far.
    pub fn version(&self) -> u64 {
        *self.receiver.borrow()
    }

    /// Whether the store has changed since the last `changed()` / `mark_seen()`.
    pub fn has_changed(&self) -> bool {
        self.receiver.has_changed().unwrap_or(false)
    }

    /// Acknowledge the current version without waiting.
    pub fn mark_seen(&mut self) {
        self.receiver.borrow_and_update();
    }

    /// Get the latest snapshot.
    pub fn latest(&self) -> Vec<Entry> {
        self.store.snapshot()
    }

    /// Wait for the next change, returning the new snapshot.
    /// Returns `None` if the version channel has closed.
    pub async fn changed(&mut self) -> Option<Vec<Entry>> {
        self.receiver.changed().await.ok()?;
        self.receiver.borrow_and_update();
        Some(self.store.snapshot())
    }
}
