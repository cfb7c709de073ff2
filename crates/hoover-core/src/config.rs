// ── Runtime capture configuration ──
//
// These types describe *what* to capture and how fast to hop.
// They never touch disk: `hoover-config` resolves files, profiles and
// platform defaults, then hands a `HooverConfig` in.

use std::time::Duration;

use crate::model::ChannelPlan;

/// Display filter selecting probe requests that carry a network name.
///
/// Subtype 4 is a probe request; the SSID test drops wildcard probes.
/// Wireshark releases before 2.6 name the SSID field `wlan_mgt.ssid`.
pub const DEFAULT_DISPLAY_FILTER: &str = "wlan.fc.type_subtype==4 and not wlan.ssid==\"\"";

pub const DEFAULT_STATION_FIELD: &str = "wlan.sa";
pub const DEFAULT_NETWORK_FIELD: &str = "wlan.ssid";

/// Seconds between channel switches when nothing else is configured.
pub const DEFAULT_DWELL: Duration = Duration::from_secs(5);

/// Lower bound for the shutdown grace period.
const MIN_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(2);

/// Parameters handed to [`CaptureSource::start`](crate::CaptureSource::start).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureConfig {
    /// Interface to sniff on.
    pub interface: String,
    /// Display filter applied by the capture tool.
    pub display_filter: String,
    /// Field printed first on each line (the transmitting station).
    pub station_field: String,
    /// Field printed second on each line (the requested network name).
    pub network_field: String,
}

impl CaptureConfig {
    pub fn new(interface: impl Into<String>) -> Self {
        Self {
            interface: interface.into(),
            display_filter: DEFAULT_DISPLAY_FILTER.into(),
            station_field: DEFAULT_STATION_FIELD.into(),
            network_field: DEFAULT_NETWORK_FIELD.into(),
        }
    }
}

/// Configuration for a single capture run.
///
/// Built by the CLI, passed to [`Coordinator`](crate::Coordinator).
#[derive(Debug, Clone)]
pub struct HooverConfig {
    /// Wireless interface to prepare, hop and capture on.
    pub interface: String,
    /// Time spent on each channel before moving to the next.
    pub dwell: Duration,
    /// Channels to cycle through, in order.
    pub channel_plan: ChannelPlan,
    /// Surface per-line diagnostics in the log.
    pub verbose: bool,
    /// Capture process parameters.
    pub capture: CaptureConfig,
    /// How long to wait for tasks to stop once shutdown begins.
    /// `None` derives a bound from `dwell`.
    pub shutdown_timeout: Option<Duration>,
}

impl HooverConfig {
    /// Defaults for `interface` on the current platform.
    pub fn new(interface: impl Into<String>) -> Self {
        let interface = interface.into();
        Self {
            capture: CaptureConfig::new(interface.clone()),
            interface,
            dwell: DEFAULT_DWELL,
            channel_plan: ChannelPlan::platform_default(std::env::consts::OS),
            verbose: false,
            shutdown_timeout: None,
        }
    }

    /// Shutdown grace period: explicit value, or three dwell intervals
    /// with a two second floor.
    pub fn effective_shutdown_timeout(&self) -> Duration {
        self.shutdown_timeout
            .unwrap_or_else(|| self.dwell.saturating_mul(3).max(MIN_SHUTDOWN_TIMEOUT))
    }
}
