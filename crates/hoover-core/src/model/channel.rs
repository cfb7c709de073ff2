// ── Radio channels ──
//
// Channel is a validated channel number; ChannelPlan is the fixed,
// ordered cycle the hopper walks for the lifetime of a run.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Highest channel number accepted (covers 2.4 GHz, 5 GHz and 6 GHz numbering).
pub const MAX_CHANNEL: u8 = 233;

// ── Channel ─────────────────────────────────────────────────────────

/// A positive radio channel number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Channel(u8);

impl Channel {
    pub fn new(number: u8) -> Result<Self, CoreError> {
        if number == 0 || number > MAX_CHANNEL {
            return Err(CoreError::InvalidChannel {
                message: format!("{number} is outside 1..={MAX_CHANNEL}"),
            });
        }
        Ok(Self(number))
    }

    pub fn number(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Channel {
    type Error = CoreError;

    fn try_from(number: u8) -> Result<Self, Self::Error> {
        Self::new(number)
    }
}

impl From<Channel> for u8 {
    fn from(channel: Channel) -> Self {
        channel.0
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Channel {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let number = s.trim().parse::<u8>().map_err(|_| CoreError::InvalidChannel {
            message: format!("'{s}' is not a channel number"),
        })?;
        Self::new(number)
    }
}

// ── ChannelPlan ─────────────────────────────────────────────────────

/// Ordered, non-empty channel cycle. Never mutated once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Channel>", into = "Vec<Channel>")]
pub struct ChannelPlan(Vec<Channel>);

impl ChannelPlan {
    pub fn new(channels: Vec<Channel>) -> Result<Self, CoreError> {
        if channels.is_empty() {
            return Err(CoreError::InvalidChannel {
                message: "channel plan is empty".into(),
            });
        }
        Ok(Self(channels))
    }

    /// Inclusive range `first..=last`.
    pub fn range(first: u8, last: u8) -> Result<Self, CoreError> {
        if first > last {
            return Err(CoreError::InvalidChannel {
                message: format!("range {first}-{last} is reversed"),
            });
        }
        (first..=last)
            .map(Channel::new)
            .collect::<Result<Vec<_>, _>>()
            .and_then(Self::new)
    }

    /// Default plan for an OS name as reported by `std::env::consts::OS`.
    ///
    /// Linux drivers accept 1-13 in most regulatory domains; `airport`
    /// on macOS refuses 12 and 13 outside a few regions.
    pub fn platform_default(os: &str) -> Self {
        let last = if os == "linux" { 13 } else { 11 };
        Self((1..=last).map(Channel).collect())
    }

    pub fn channels(&self) -> &[Channel] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Endless iterator over the plan in order.
    pub fn cycle(&self) -> impl Iterator<Item = Channel> + '_ {
        self.0.iter().copied().cycle()
    }
}

impl TryFrom<Vec<Channel>> for ChannelPlan {
    type Error = CoreError;

    fn try_from(channels: Vec<Channel>) -> Result<Self, Self::Error> {
        Self::new(channels)
    }
}

impl From<ChannelPlan> for Vec<Channel> {
    fn from(plan: ChannelPlan) -> Self {
        plan.0
    }
}

impl fmt::Display for ChannelPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .0
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",");
        f.write_str(&joined)
    }
}

/// Accepts comma-separated channels and inclusive ranges, e.g. `1,6,11` or `1-3,36`.
impl FromStr for ChannelPlan {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut channels = Vec::new();
        for part in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            if let Some((first, last)) = part.split_once('-') {
                let first: Channel = first.parse()?;
                let last: Channel = last.parse()?;
                channels.extend(Self::range(first.number(), last.number())?.0);
            } else {
                channels.push(part.parse()?);
            }
        }
        Self::new(channels)
    }
}
