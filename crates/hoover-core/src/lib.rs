//! Channel-hopping 802.11 probe-request capture pipeline.
//!
//! Puts a wireless interface into monitor mode, walks it across a channel
//! plan, and folds the probe requests tshark reports into a deduplicated
//! record of which station asked for which network, and when:
//!
//! - **[`Coordinator`]**: Owns one run. Prepares the interface, starts the
//!   capture, runs the channel hopper and capture reader as two tasks, and
//!   stops both when the caller's shutdown future resolves, the hopper fails,
//!   or the capture ends. [`final_snapshot()`](Coordinator::final_snapshot)
//!   exposes the result.
//!
//! - **[`EntryStore`]**: `DashMap` keyed by (station, network) with a
//!   `tokio::sync::watch` version counter. Upserts are atomic per key and
//!   snapshots come back in discovery order.
//!
//! - **[`EntryStream`]**: Subscription handle vended by the store for live
//!   reporting while a run is in progress.
//!
//! - **Capabilities** ([`capability`]): The outside world as traits for
//!   interface preparation, channel switching, capture start, and the clock.
//!   [`system`] implements them with `ip`/`iw`/`airport` and tshark.

pub mod capability;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod hopper;
pub mod model;
pub mod parse;
pub mod reader;
pub mod store;
pub mod stream;
pub mod system;

// ── Primary re-exports ──────────────────────────────────────────────
pub use capability::{CaptureSource, ChannelSwitcher, Clock, InterfacePreparer, SystemClock};
pub use config::{CaptureConfig, HooverConfig};
pub use coordinator::{Coordinator, ExitCondition, RunReport, RunState, Termination};
pub use error::CoreError;
pub use model::{Channel, ChannelPlan, Entry, EntryKey, ProbeEvent};
pub use parse::parse_line;
pub use reader::ReaderStats;
pub use store::{EntryStore, Observation};
pub use stream::EntryStream;
