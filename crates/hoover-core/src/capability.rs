// ── External capabilities ──
//
// Everything the pipeline needs from the outside world: preparing the
// interface, changing its channel, starting the capture process, and
// reading the clock. `crate::system` provides the real implementations;
// tests substitute their own.

use std::future::Future;
use std::io;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures_core::Stream;

use crate::config::CaptureConfig;
use crate::error::CoreError;
use crate::model::Channel;

/// Bring an interface up in monitor mode.
pub trait InterfacePreparer: Send + Sync {
    fn prepare(&self, interface: &str) -> impl Future<Output = Result<(), CoreError>> + Send;
}

/// Tune an interface to a channel.
pub trait ChannelSwitcher: Send + Sync {
    fn set_channel(
        &self,
        interface: &str,
        channel: Channel,
    ) -> impl Future<Output = Result<(), CoreError>> + Send;
}

/// Launch the capture process and hand back its output as lines.
///
/// Dropping the returned stream must stop the capture.
pub trait CaptureSource: Send + Sync {
    type Lines: Stream<Item = io::Result<String>> + Send + Unpin + 'static;

    fn start(
        &self,
        config: &CaptureConfig,
    ) -> impl Future<Output = Result<Self::Lines, CoreError>> + Send;
}

/// Wall-clock time source.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// [`Clock`] backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

impl<T: ChannelSwitcher> ChannelSwitcher for Arc<T> {
    fn set_channel(
        &self,
        interface: &str,
        channel: Channel,
    ) -> impl Future<Output = Result<(), CoreError>> + Send {
        (**self).set_channel(interface, channel)
    }
}
