// ── Entry storage ──
//
// Concurrent entry store with change notification.

mod entry_store;

pub use entry_store::{EntryStore, Observation};
