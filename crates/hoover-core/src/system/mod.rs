// ── System backends ──
//
// Real implementations of the capability traits, driving the platform's
// wireless tools and tshark as child processes.

mod radio;
mod tool;
mod tshark;

pub use radio::{RadioTools, SystemRadio};
pub use tool::ToolCommand;
pub use tshark::{TsharkCapture, TsharkLines, tshark_args};

use std::fmt;

/// Operating systems with a known way to drive a monitor-mode interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Linux,
    MacOs,
}

impl Platform {
    /// Platform this binary was built for. Anything that is not macOS is
    /// treated as Linux.
    pub fn current() -> Self {
        Self::from_os(std::env::consts::OS)
    }

    /// Map a `std::env::consts::OS` value.
    pub fn from_os(os: &str) -> Self {
        match os {
            "macos" => Self::MacOs,
            _ => Self::Linux,
        }
    }

    pub fn as_os(self) -> &'static str {
        match self {
            Self::Linux => "linux",
            Self::MacOs => "macos",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_os())
    }
}
