// ── Channel hopper ──
//
// Walks the channel plan forever so frames on every channel are
// eventually seen. Runs independently of capture processing.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::capability::ChannelSwitcher;
use crate::error::CoreError;
use crate::model::{Channel, ChannelPlan};

/// What the hopper needs to know about the run.
#[derive(Debug, Clone)]
pub struct HopperSettings {
    pub interface: String,
    pub plan: ChannelPlan,
    pub dwell: Duration,
}

/// How the hopper task ended.
#[derive(Debug)]
pub enum HopperExit {
    /// Cancellation was requested.
    Cancelled { switches: u64 },
    /// A channel switch failed. No further switches were attempted.
    Failed {
        channel: Channel,
        switches: u64,
        error: CoreError,
    },
}

impl HopperExit {
    pub fn switches(&self) -> u64 {
        match self {
            Self::Cancelled { switches } | Self::Failed { switches, .. } => *switches,
        }
    }
}

/// Cycle through `settings.plan` until cancelled or a switch fails.
///
/// Cancellation is checked before every switch and raced against every
/// dwell, so the task stops within one dwell interval of the request.
/// The first failed switch is fatal; there is no retry.
pub async fn run_hopper<S: ChannelSwitcher>(
    settings: HopperSettings,
    switcher: Arc<S>,
    cancel: CancellationToken,
) -> HopperExit {
    let HopperSettings {
        interface,
        plan,
        dwell,
    } = settings;
    info!(%interface, %plan, ?dwell, "channel hopper started");

    let mut switches = 0u64;
    for channel in plan.cycle() {
        if cancel.is_cancelled() {
            break;
        }

        if let Err(error) = switcher.set_channel(&interface, channel).await {
            warn!(%interface, %channel, error = %error, "channel switch failed");
            return HopperExit::Failed {
                channel,
                switches,
                error,
            };
        }
        switches += 1;
        debug!(%interface, %channel, "switched channel");

        if dwell.is_zero() {
            tokio::task::yield_now().await;
            continue;
        }

        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            () = tokio::time::sleep(dwell) => {}
        }
    }

    info!(switches, "channel hopper stopped");
    HopperExit::Cancelled { switches }
}
