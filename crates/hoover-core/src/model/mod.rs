// ── Domain model ──
//
// Value types flowing through the capture pipeline.

pub mod channel;
pub mod probe;

pub use channel::{Channel, ChannelPlan};
pub use probe::{Entry, EntryKey, ProbeEvent};
