// ── Probe observations ──
//
// ProbeEvent is what the parser produces for a single capture line.
// Entry is the deduplicated record the store keeps per EntryKey.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ── ProbeEvent ──────────────────────────────────────────────────────

/// A single probe request seen on the air.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeEvent {
    /// Transmitting station address, as printed by the capture tool.
    pub station: String,
    /// Network name (SSID) the station asked for.
    pub network: String,
    pub observed_at: DateTime<Utc>,
}

impl ProbeEvent {
    pub fn new(
        station: impl Into<String>,
        network: impl Into<String>,
        observed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            station: station.into(),
            network: network.into(),
            observed_at,
        }
    }

    pub fn key(&self) -> EntryKey {
        EntryKey::new(&self.station, &self.network)
    }
}

// ── EntryKey ────────────────────────────────────────────────────────

/// Deduplication identity: the exact (station, network) string pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntryKey {
    pub station: String,
    pub network: String,
}

impl EntryKey {
    pub fn new(station: impl Into<String>, network: impl Into<String>) -> Self {
        Self {
            station: station.into(),
            network: network.into(),
        }
    }
}

// ── Entry ───────────────────────────────────────────────────────────

/// Deduplicated record for one (station, network) pair.
///
/// Created on first observation and updated in place on every repeat.
/// Entries are never removed during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub station: String,
    pub network: String,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
    /// Number of probe requests merged into this entry.
    pub sightings: u64,
}

impl Entry {
    pub(crate) fn first(event: &ProbeEvent) -> Self {
        Self {
            station: event.station.clone(),
            network: event.network.clone(),
            first_seen: event.observed_at,
            last_seen: event.observed_at,
            sightings: 1,
        }
    }

    pub fn key(&self) -> EntryKey {
        EntryKey::new(&self.station, &self.network)
    }
}
