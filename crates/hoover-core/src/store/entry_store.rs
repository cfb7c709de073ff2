// ── Deduplicated probe entry store ──
//
// Concurrent storage keyed by (station, network) with atomic
// insert-or-update and point-in-time snapshots in discovery order.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry as MapEntry;
use tokio::sync::watch;

use crate::model::{Entry, EntryKey, ProbeEvent};
use crate::stream::EntryStream;

/// Result of applying one [`ProbeEvent`] to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Observation {
    /// First sighting of this (station, network) pair.
    New(Entry),
    /// The pair was already known; `last_seen` has been updated.
    Repeat(Entry),
}

impl Observation {
    pub fn entry(&self) -> &Entry {
        match self {
            Self::New(entry) | Self::Repeat(entry) => entry,
        }
    }

    pub fn is_new(&self) -> bool {
        matches!(self, Self::New(_))
    }
}

struct Slot {
    /// Discovery order, assigned once when the key is first inserted.
    seq: u64,
    entry: Entry,
}

/// Thread-safe store of every probe entry seen during a run.
///
/// Writers only contend on the `DashMap` shard that owns their key.
/// `snapshot()` takes the gate exclusively for the duration of one copy,
/// so it never observes a half-applied upsert and always reflects a
/// single instant. Entries are never removed.
pub struct EntryStore {
    entries: DashMap<EntryKey, Slot>,
    /// Shared by upserts, exclusive for snapshots.
    gate: RwLock<()>,
    next_seq: AtomicU64,
    /// Version counter, bumped on every mutation.
    version: watch::Sender<u64>,
}

impl EntryStore {
    pub fn new() -> Self {
        let (version, _) = watch::channel(0u64);
        Self {
            entries: DashMap::new(),
            gate: RwLock::new(()),
            next_seq: AtomicU64::new(0),
            version,
        }
    }

    /// Insert a new entry or refresh an existing one.
    ///
    /// On repeat, `last_seen` is set to the event's timestamp and the
    /// sighting count is incremented; station and network never change.
    pub fn upsert(&self, event: &ProbeEvent) -> Observation {
        let observation = {
            let _shared = self.gate.read().unwrap_or_else(PoisonError::into_inner);
            match self.entries.entry(event.key()) {
                MapEntry::Occupied(mut occupied) => {
                    let slot = occupied.get_mut();
                    slot.entry.last_seen = event.observed_at;
                    slot.entry.sightings += 1;
                    Observation::Repeat(slot.entry.clone())
                }
                MapEntry::Vacant(vacant) => {
                    let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
                    let entry = Entry::first(event);
                    vacant.insert(Slot {
                        seq,
                        entry: entry.clone(),
                    });
                    Observation::New(entry)
                }
            }
        };

        // `send_modify` updates unconditionally, even with zero receivers.
        self.version.send_modify(|v| *v += 1);
        observation
    }

    /// Copy of every entry, in the order keys were first seen.
    pub fn snapshot(&self) -> Vec<Entry> {
        let mut slots: Vec<(u64, Entry)> = {
            let _exclusive = self.gate.write().unwrap_or_else(PoisonError::into_inner);
            self.entries
                .iter()
                .map(|r| (r.value().seq, r.value().entry.clone()))
                .collect()
        };
        slots.sort_unstable_by_key(|(seq, _)| *seq);
        slots.into_iter().map(|(_, entry)| entry).collect()
    }

    pub fn get(&self, station: &str, network: &str) -> Option<Entry> {
        self.entries
            .get(&EntryKey::new(station, network))
            .map(|r| r.value().entry.clone())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Subscribe to store mutations for live reporting.
    pub fn subscribe(self: &Arc<Self>) -> EntryStream {
        EntryStream::new(Arc::clone(self), self.version.subscribe())
    }
}

impl Default for EntryStore {
    fn default() -> Self {
        Self::new()
    }
}
