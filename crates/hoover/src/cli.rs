//! Clap derive structures for the `hoover` CLI.
//!
//! Defines the command tree, global flags, and shared types.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// hoover -- see which networks nearby devices are asking for
#[derive(Debug, Parser)]
#[command(
    name = "hoover",
    version,
    about = "Log Wi-Fi probe requests while hopping across channels",
    long_about = "Puts a wireless interface into monitor mode, cycles it through a\n\
        channel plan, and records every (station, network) pair seen in\n\
        802.11 probe requests. Requires tshark and root privileges.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Capture profile to use
    #[arg(long, short = 'p', env = "HOOVER_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Config file (defaults to the platform config directory)
    #[arg(long, env = "HOOVER_CONFIG", global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "HOOVER_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one record per line (scripting)
    Plain,
}

impl OutputFormat {
    /// Formats whose stdout must stay machine-readable.
    pub fn is_structured(self) -> bool {
        matches!(self, Self::Json | Self::JsonCompact | Self::Yaml)
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Capture probe requests until interrupted or the capture ends
    #[command(alias = "r")]
    Run(RunArgs),

    /// Print the channel plan a run would use
    #[command(alias = "ch")]
    Channels(ChannelsArgs),

    /// Manage configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  RUN
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Default, Args)]
pub struct RunArgs {
    /// Wireless interface (overrides profile)
    #[arg(long, short = 'i', env = "HOOVER_INTERFACE")]
    pub interface: Option<String>,

    /// Time on each channel, e.g. "5s" or "250ms"
    #[arg(long, short = 'd', value_parser = humantime::parse_duration)]
    pub dwell: Option<Duration>,

    /// Channel plan, e.g. "1,6,11" or "1-13"
    #[arg(long, short = 'c')]
    pub channels: Option<String>,

    /// tshark display filter
    #[arg(long)]
    pub filter: Option<String>,

    /// tshark field holding the transmitting station
    #[arg(long, value_name = "FIELD")]
    pub station_field: Option<String>,

    /// tshark field holding the requested network name
    #[arg(long, value_name = "FIELD")]
    pub network_field: Option<String>,

    /// Log every capture line at info level
    #[arg(long)]
    pub log_lines: bool,

    /// Print a progress summary at this interval
    #[arg(long, value_parser = humantime::parse_duration, value_name = "DURATION")]
    pub summary_interval: Option<Duration>,

    /// How long to wait for tasks to stop on shutdown
    #[arg(long, value_parser = humantime::parse_duration, value_name = "DURATION")]
    pub shutdown_timeout: Option<Duration>,

    #[command(flatten)]
    pub tools: ToolArgs,
}

/// External tool locations.
#[derive(Debug, Default, Args)]
pub struct ToolArgs {
    /// Path to tshark
    #[arg(long, env = "HOOVER_TSHARK", value_name = "PATH")]
    pub tshark: Option<PathBuf>,

    /// Path to `ip` (Linux)
    #[arg(long, value_name = "PATH")]
    pub ip: Option<PathBuf>,

    /// Path to `iw` (Linux)
    #[arg(long, value_name = "PATH")]
    pub iw: Option<PathBuf>,

    /// Path to `airport` (macOS)
    #[arg(long, value_name = "PATH")]
    pub airport: Option<PathBuf>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CHANNELS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ChannelsArgs {
    /// Channel plan to resolve instead of the profile's
    #[arg(long, short = 'c')]
    pub channels: Option<String>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create a config file with one profile
    Init {
        /// Wireless interface for the profile
        #[arg(long, short = 'i')]
        interface: String,

        /// Profile name
        #[arg(long, default_value = "default")]
        name: String,

        /// Channel plan for the profile
        #[arg(long, short = 'c')]
        channels: Option<String>,

        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },

    /// Display current resolved configuration
    Show,

    /// Print the config file location
    Path,

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
