use std::path::PathBuf;

use tracing::{debug, info};

use super::Platform;
use super::tool::ToolCommand;
use crate::capability::{ChannelSwitcher, InterfacePreparer};
use crate::error::CoreError;
use crate::model::Channel;

/// Stock location of the macOS `airport` utility.
pub const AIRPORT_PATH: &str =
    "/System/Library/PrivateFrameworks/Apple80211.framework/Versions/Current/Resources/airport";

/// Paths of the wireless tools the radio shells out to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RadioTools {
    pub ip: PathBuf,
    pub iw: PathBuf,
    pub airport: PathBuf,
}

impl Default for RadioTools {
    fn default() -> Self {
        Self {
            ip: "ip".into(),
            iw: "iw".into(),
            airport: AIRPORT_PATH.into(),
        }
    }
}

/// Monitor-mode setup and channel tuning through the platform's CLI tools.
///
/// Linux uses `ip` and `iw`; macOS uses `airport`.
#[derive(Debug, Clone)]
pub struct SystemRadio {
    platform: Platform,
    tools: RadioTools,
}

impl SystemRadio {
    pub fn new(platform: Platform, tools: RadioTools) -> Self {
        Self { platform, tools }
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Commands that put `interface` into monitor mode, in order.
    pub fn prepare_commands(&self, interface: &str) -> Vec<ToolCommand> {
        match self.platform {
            Platform::Linux => vec![
                ToolCommand::new(&self.tools.ip, ["link", "set", interface, "down"]),
                ToolCommand::new(&self.tools.iw, ["dev", interface, "set", "type", "monitor"]),
                ToolCommand::new(&self.tools.ip, ["link", "set", interface, "up"]),
            ],
            // Disassociate; tshark -I handles monitor mode itself.
            Platform::MacOs => vec![ToolCommand::new(&self.tools.airport, [interface, "-z"])],
        }
    }

    /// Command that tunes `interface` to `channel`.
    pub fn channel_command(&self, interface: &str, channel: Channel) -> ToolCommand {
        let number = channel.to_string();
        match self.platform {
            Platform::Linux => ToolCommand::new(
                &self.tools.iw,
                ["dev", interface, "set", "channel", number.as_str()],
            ),
            Platform::MacOs => ToolCommand::new(
                &self.tools.airport,
                [interface.to_owned(), format!("--channel={number}")],
            ),
        }
    }
}

impl InterfacePreparer for SystemRadio {
    async fn prepare(&self, interface: &str) -> Result<(), CoreError> {
        for command in self.prepare_commands(interface) {
            debug!(%command, "preparing interface");
            command
                .run()
                .await
                .map_err(|e| CoreError::InterfacePreparation {
                    interface: interface.to_owned(),
                    reason: e.to_string(),
                })?;
        }
        info!(%interface, platform = %self.platform, "interface ready for capture");
        Ok(())
    }
}

impl ChannelSwitcher for SystemRadio {
    async fn set_channel(&self, interface: &str, channel: Channel) -> Result<(), CoreError> {
        self.channel_command(interface, channel)
            .run()
            .await
            .map_err(|e| CoreError::ChannelSwitch {
                interface: interface.to_owned(),
                channel,
                reason: e.to_string(),
            })
    }
}
