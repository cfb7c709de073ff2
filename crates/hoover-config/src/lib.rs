//! Shared configuration for hoover.
//!
//! TOML profiles, external tool discovery, and translation to
//! `hoover_core::HooverConfig`. The CLI layers its flag overrides on top.

use std::collections::HashMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use hoover_core::system::{Platform, RadioTools};
use hoover_core::{ChannelPlan, HooverConfig};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("{tool} not found at '{path}'")]
    ToolMissing { tool: String, path: String },

    #[error("profile '{name}' not found")]
    ProfileNotFound { name: String, available: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named capture profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

impl Config {
    /// Comma-separated profile names, sorted, for diagnostics.
    pub fn profile_names(&self) -> String {
        let mut names: Vec<&str> = self.profiles.keys().map(String::as_str).collect();
        names.sort_unstable();
        if names.is_empty() {
            "(none)".into()
        } else {
            names.join(", ")
        }
    }

    /// Look up a profile by name.
    pub fn profile(&self, name: &str) -> Result<&Profile, ConfigError> {
        self.profiles
            .get(name)
            .ok_or_else(|| ConfigError::ProfileNotFound {
                name: name.into(),
                available: self.profile_names(),
            })
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    /// Time spent on each channel, e.g. "5s" or "250ms".
    #[serde(default = "default_dwell")]
    pub dwell: String,

    /// Log every capture line.
    #[serde(default)]
    pub verbose: bool,

    /// Tool locations shared by all profiles.
    #[serde(default)]
    pub tools: ToolPaths,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            dwell: default_dwell(),
            verbose: false,
            tools: ToolPaths::default(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_dwell() -> String {
    humantime::format_duration(hoover_core::config::DEFAULT_DWELL).to_string()
}

/// A named capture profile.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Profile {
    /// Wireless interface (e.g., "wlan0", "en1").
    pub interface: String,

    /// Channel plan, e.g. "1,6,11" or "1-13". Platform default when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channels: Option<String>,

    /// Override the default dwell.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dwell: Option<String>,

    /// tshark display filter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_filter: Option<String>,

    /// tshark field holding the transmitting station.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub station_field: Option<String>,

    /// tshark field holding the requested network name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_field: Option<String>,

    /// Grace period for tasks to stop once shutdown begins.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shutdown_timeout: Option<String>,

    /// Per-profile tool overrides.
    #[serde(default, skip_serializing_if = "ToolPaths::is_empty")]
    pub tools: ToolPaths,
}

impl Profile {
    pub fn new(interface: impl Into<String>) -> Self {
        Self {
            interface: interface.into(),
            channels: None,
            dwell: None,
            display_filter: None,
            station_field: None,
            network_field: None,
            shutdown_timeout: None,
            tools: ToolPaths::default(),
        }
    }
}

/// Optional tool locations. Bare names are looked up on `PATH`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ToolPaths {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tshark: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iw: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub airport: Option<PathBuf>,
}

impl ToolPaths {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Field-wise: values set here win over `fallback`.
    pub fn or(&self, fallback: &Self) -> Self {
        Self {
            tshark: self.tshark.clone().or_else(|| fallback.tshark.clone()),
            ip: self.ip.clone().or_else(|| fallback.ip.clone()),
            iw: self.iw.clone().or_else(|| fallback.iw.clone()),
            airport: self.airport.clone().or_else(|| fallback.airport.clone()),
        }
    }

    /// Fill unset entries with stock names.
    pub fn resolve(&self) -> ResolvedTools {
        let radio = RadioTools::default();
        ResolvedTools {
            tshark: self.tshark.clone().unwrap_or_else(|| "tshark".into()),
            radio: RadioTools {
                ip: self.ip.clone().unwrap_or(radio.ip),
                iw: self.iw.clone().unwrap_or(radio.iw),
                airport: self.airport.clone().unwrap_or(radio.airport),
            },
        }
    }
}

/// Concrete tool paths for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTools {
    pub tshark: PathBuf,
    pub radio: RadioTools,
}

impl ResolvedTools {
    /// Tools the given platform actually invokes.
    pub fn required(&self, platform: Platform) -> Vec<(&'static str, &Path)> {
        match platform {
            Platform::Linux => vec![
                ("tshark", self.tshark.as_path()),
                ("ip", self.radio.ip.as_path()),
                ("iw", self.radio.iw.as_path()),
            ],
            Platform::MacOs => vec![
                ("tshark", self.tshark.as_path()),
                ("airport", self.radio.airport.as_path()),
            ],
        }
    }

    /// Fail with [`ConfigError::ToolMissing`] for the first tool that
    /// cannot be located.
    pub fn validate(&self, platform: Platform) -> Result<(), ConfigError> {
        let search_path = std::env::var_os("PATH");
        for (tool, path) in self.required(platform) {
            if locate(path, search_path.as_ref()).is_none() {
                return Err(ConfigError::ToolMissing {
                    tool: tool.into(),
                    path: path.display().to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Resolve `program` to an existing file.
///
/// Paths with a directory component are checked as given; bare names are
/// searched in `search_path` (a `PATH`-style list).
pub fn locate(program: &Path, search_path: Option<&OsString>) -> Option<PathBuf> {
    if program.components().count() > 1 {
        return program.is_file().then(|| program.to_path_buf());
    }
    std::env::split_paths(search_path?)
        .map(|dir| dir.join(program))
        .find(|candidate| candidate.is_file())
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("", "hoover", "hoover").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("hoover");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load from `path` + environment. A missing file yields the defaults.
///
/// Environment keys use `__` for nesting so underscores inside field
/// names survive: `HOOVER_DEFAULTS__DWELL=2s`, `HOOVER_DEFAULT_PROFILE=lab`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("HOOVER_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write it to `path`.
pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Translation ─────────────────────────────────────────────────────

/// Parse a human duration ("5s", "250ms", "1m 30s").
pub fn parse_duration(field: &str, value: &str) -> Result<Duration, ConfigError> {
    humantime::parse_duration(value.trim()).map_err(|e| ConfigError::Validation {
        field: field.into(),
        reason: format!("'{value}': {e}"),
    })
}

/// Parse a dwell, which must be non-zero.
pub fn parse_dwell(value: &str) -> Result<Duration, ConfigError> {
    let dwell = parse_duration("dwell", value)?;
    if dwell.is_zero() {
        return Err(ConfigError::Validation {
            field: "dwell".into(),
            reason: "must be greater than zero".into(),
        });
    }
    Ok(dwell)
}

/// Parse a channel plan ("1,6,11" or "1-13").
pub fn parse_channels(value: &str) -> Result<ChannelPlan, ConfigError> {
    value.parse().map_err(|e: hoover_core::CoreError| ConfigError::Validation {
        field: "channels".into(),
        reason: e.to_string(),
    })
}

/// Build a `HooverConfig` from a profile and global defaults. No CLI
/// overrides are applied here.
pub fn profile_to_hoover_config(
    profile: &Profile,
    defaults: &Defaults,
) -> Result<HooverConfig, ConfigError> {
    let mut config = HooverConfig::new(profile.interface.trim());
    if config.interface.is_empty() {
        return Err(ConfigError::Validation {
            field: "interface".into(),
            reason: "must not be empty".into(),
        });
    }

    config.dwell = parse_dwell(profile.dwell.as_deref().unwrap_or(&defaults.dwell))?;
    if let Some(ref channels) = profile.channels {
        config.channel_plan = parse_channels(channels)?;
    }
    config.verbose = defaults.verbose;
    if let Some(ref timeout) = profile.shutdown_timeout {
        config.shutdown_timeout = Some(parse_duration("shutdown_timeout", timeout)?);
    }

    if let Some(ref filter) = profile.display_filter {
        config.capture.display_filter.clone_from(filter);
    }
    if let Some(ref field) = profile.station_field {
        config.capture.station_field.clone_from(field);
    }
    if let Some(ref field) = profile.network_field {
        config.capture.network_field.clone_from(field);
    }

    Ok(config)
}
