//! CLI configuration: thin wrapper around `hoover_config` shared types.
//!
//! Re-exports the shared types and adds resolution that respects
//! `GlobalOpts` and `RunArgs` flag overrides.

use std::path::PathBuf;
use std::time::Duration;

use hoover_core::HooverConfig;

use crate::cli::{GlobalOpts, RunArgs, ToolArgs};
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use hoover_config::{
    Config, Profile, ResolvedTools, ToolPaths, config_path, load_config_from, parse_channels,
    save_config_to,
};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Config file in effect: `--config` / `HOOVER_CONFIG`, else the platform path.
pub fn effective_path(global: &GlobalOpts) -> PathBuf {
    global.config.clone().unwrap_or_else(config_path)
}

/// Load the config file selected by the global flags.
pub fn load(global: &GlobalOpts) -> Result<Config, CliError> {
    Ok(load_config_from(&effective_path(global))?)
}

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Everything `hoover run` needs, after merging file, profile and flags.
#[derive(Debug)]
pub struct RunPlan {
    pub config: HooverConfig,
    pub tools: ResolvedTools,
    pub summary_interval: Option<Duration>,
}

/// Translate config + flags into a `RunPlan`.
///
/// Precedence: flag > profile > `[defaults]` > built-in. A profile named
/// explicitly with `--profile` must exist; the implicit default profile may
/// be absent when `--interface` is given.
pub fn resolve_run(args: &RunArgs, global: &GlobalOpts, cfg: &Config) -> Result<RunPlan, CliError> {
    let profile_name = active_profile_name(global, cfg);

    let mut profile = match cfg.profiles.get(&profile_name) {
        Some(profile) => profile.clone(),
        None if global.profile.is_some() => {
            return Err(CliError::ProfileNotFound {
                name: profile_name,
                available: cfg.profile_names(),
            });
        }
        None => {
            let interface = args.interface.clone().ok_or_else(|| CliError::NoInterface {
                path: effective_path(global).display().to_string(),
            })?;
            Profile::new(interface)
        }
    };

    if let Some(ref interface) = args.interface {
        profile.interface.clone_from(interface);
    }
    let mut config = hoover_config::profile_to_hoover_config(&profile, &cfg.defaults)?;

    // ── Flag overrides ──
    if let Some(dwell) = args.dwell {
        if dwell.is_zero() {
            return Err(CliError::Validation {
                field: "dwell".into(),
                reason: "must be greater than zero".into(),
            });
        }
        config.dwell = dwell;
    }
    if let Some(ref channels) = args.channels {
        config.channel_plan = parse_channels(channels)?;
    }
    if let Some(ref filter) = args.filter {
        config.capture.display_filter.clone_from(filter);
    }
    if let Some(ref field) = args.station_field {
        config.capture.station_field.clone_from(field);
    }
    if let Some(ref field) = args.network_field {
        config.capture.network_field.clone_from(field);
    }
    if args.log_lines {
        config.verbose = true;
    }
    if args.shutdown_timeout.is_some() {
        config.shutdown_timeout = args.shutdown_timeout;
    }

    let tools = tool_overrides(&args.tools)
        .or(&profile.tools)
        .or(&cfg.defaults.tools)
        .resolve();

    Ok(RunPlan {
        config,
        tools,
        summary_interval: args.summary_interval.filter(|every| !every.is_zero()),
    })
}

fn tool_overrides(args: &ToolArgs) -> ToolPaths {
    ToolPaths {
        tshark: args.tshark.clone(),
        ip: args.ip.clone(),
        iw: args.iw.clone(),
        airport: args.airport.clone(),
    }
}
