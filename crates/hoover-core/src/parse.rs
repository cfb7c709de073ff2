// ── Capture line parsing ──
//
// The capture tool prints one line per matching frame with exactly
// two fields: `<station address>,<network name>`. Everything else it
// prints (banners, warnings, counters) is chatter and is skipped.

use chrono::{DateTime, Utc};

use crate::model::ProbeEvent;

/// Field separator the capture tool is configured to emit.
pub const SEPARATOR: char = ',';

/// Parse one capture line into a [`ProbeEvent`] stamped with `observed_at`.
///
/// The line is split at the *first* separator only, so a network name
/// may itself contain commas. Both fields are trimmed and must be
/// non-empty. Returns `None` for anything that does not match; that is
/// never an error.
pub fn parse_line(line: &str, observed_at: DateTime<Utc>) -> Option<ProbeEvent> {
    let line = line.trim_end_matches(['\r', '\n']);
    let (station, network) = line.split_once(SEPARATOR)?;
    let station = station.trim();
    let network = network.trim();
    if station.is_empty() || network.is_empty() {
        return None;
    }
    Some(ProbeEvent::new(station, network, observed_at))
}
