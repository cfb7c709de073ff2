//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors
//! with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use hoover_config::ConfigError;
use hoover_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    #[allow(dead_code)]
    pub const SUCCESS: i32 = 0;
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const CHANNEL_SWITCH: i32 = 3;
    pub const CAPTURE: i32 = 4;
    pub const TOOL_MISSING: i32 = 5;
    pub const INTERFACE: i32 = 6;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Capture setup ────────────────────────────────────────────────
    #[error("Could not prepare {interface} for capture")]
    #[diagnostic(
        code(hoover::interface),
        help(
            "{reason}\n\
             Monitor mode needs root privileges and a driver that supports it.\n\
             Try: sudo hoover run -i {interface}"
        )
    )]
    InterfacePreparation { interface: String, reason: String },

    #[error("Could not start capture on {interface}")]
    #[diagnostic(
        code(hoover::capture_start),
        help("{reason}\nCheck that tshark is installed and can open the interface.")
    )]
    CaptureStart { interface: String, reason: String },

    #[error("{tool} not found at '{path}'")]
    #[diagnostic(
        code(hoover::tool_missing),
        help(
            "Install {tool} or point hoover at it with --{tool} <PATH>\n\
             or `tools.{tool}` in your config file."
        )
    )]
    ToolMissing { tool: String, path: String },

    // ── Capture runtime ──────────────────────────────────────────────
    #[error("Channel hopping stopped: cannot switch {interface} to channel {channel}")]
    #[diagnostic(
        code(hoover::channel_switch),
        help("{reason}\nUse --channels to restrict the plan to channels the adapter supports.")
    )]
    ChannelSwitch {
        interface: String,
        channel: String,
        reason: String,
    },

    #[error("Capture stream failed: {reason}")]
    #[diagnostic(code(hoover::capture_stream))]
    CaptureStream { reason: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(hoover::validation))]
    Validation { field: String, reason: String },

    #[error("No interface configured")]
    #[diagnostic(
        code(hoover::no_interface),
        help(
            "Pass one with --interface (-i), or create a profile:\n\
             hoover config init --interface wlan0\n\
             Config file: {path}"
        )
    )]
    NoInterface { path: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(hoover::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: hoover config init --name {name} --interface <IFACE>"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("Configuration file already exists at {path}")]
    #[diagnostic(code(hoover::config_exists), help("Use --force to overwrite it."))]
    ConfigExists { path: String },

    #[error(transparent)]
    #[diagnostic(code(hoover::config))]
    Config(Box<figment::Error>),

    // ── Internal ─────────────────────────────────────────────────────
    #[error(transparent)]
    #[diagnostic(code(hoover::internal))]
    Core(CoreError),

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render output: {0}")]
    #[diagnostic(code(hoover::render))]
    Render(String),
}

impl From<figment::Error> for CliError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::InterfacePreparation { .. } => exit_code::INTERFACE,
            Self::ChannelSwitch { .. } => exit_code::CHANNEL_SWITCH,
            Self::CaptureStart { .. } | Self::CaptureStream { .. } => exit_code::CAPTURE,
            Self::ToolMissing { .. } => exit_code::TOOL_MISSING,
            Self::Validation { .. }
            | Self::NoInterface { .. }
            | Self::ProfileNotFound { .. }
            | Self::ConfigExists { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InterfacePreparation { interface, reason } => {
                CliError::InterfacePreparation { interface, reason }
            }

            CoreError::CaptureStart { interface, reason } => {
                CliError::CaptureStart { interface, reason }
            }

            CoreError::ChannelSwitch {
                interface,
                channel,
                reason,
            } => CliError::ChannelSwitch {
                interface,
                channel: channel.to_string(),
                reason,
            },

            CoreError::InvalidChannel { message } => CliError::Validation {
                field: "channels".into(),
                reason: message,
            },

            CoreError::Io(err) => CliError::CaptureStream {
                reason: err.to_string(),
            },

            other => CliError::Core(other),
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::ToolMissing { tool, path } => CliError::ToolMissing { tool, path },
            ConfigError::ProfileNotFound { name, available } => {
                CliError::ProfileNotFound { name, available }
            }
            ConfigError::Figment(err) => CliError::Config(err),
            ConfigError::Serialization(err) => CliError::Render(err.to_string()),
            ConfigError::Io(err) => CliError::Io(err),
        }
    }
}
