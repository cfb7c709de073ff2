//! Config subcommand handlers.

use std::path::Path;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config, Profile};
use crate::error::CliError;
use crate::output;

// ── Helpers ─────────────────────────────────────────────────────────

fn save(cfg: &Config, path: &Path) -> Result<(), CliError> {
    config::save_config_to(cfg, path)?;
    Ok(())
}

fn toml_text(cfg: &Config) -> String {
    toml::to_string_pretty(cfg).unwrap_or_else(|e| format!("# failed to serialize: {e}"))
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let path = config::effective_path(global);

    match args.command {
        // ── Init ────────────────────────────────────────────────────
        ConfigCommand::Init {
            interface,
            name,
            channels,
            force,
        } => {
            if path.exists() && !force {
                return Err(CliError::ConfigExists {
                    path: path.display().to_string(),
                });
            }
            if let Some(ref channels) = channels {
                config::parse_channels(channels)?;
            }

            let mut profile = Profile::new(interface.trim());
            if profile.interface.is_empty() {
                return Err(CliError::Validation {
                    field: "interface".into(),
                    reason: "must not be empty".into(),
                });
            }
            profile.channels = channels;

            let mut cfg = Config {
                default_profile: Some(name.clone()),
                ..Config::default()
            };
            cfg.profiles.insert(name.clone(), profile);
            save(&cfg, &path)?;

            if !global.quiet {
                eprintln!("✓ Configuration written to {}", path.display());
                eprintln!("  Active profile: {name}");
                eprintln!("\n  Start capturing: sudo hoover run");
            }
            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = config::load(global)?;
            let out = output::render_single(global.output, &cfg, toml_text, toml_text)?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── Path ────────────────────────────────────────────────────
        ConfigCommand::Path => {
            output::print_output(&path.display().to_string(), global.quiet);
            Ok(())
        }

        // ── Profiles ────────────────────────────────────────────────
        ConfigCommand::Profiles => {
            let cfg = config::load(global)?;
            let active = config::active_profile_name(global, &cfg);
            if cfg.profiles.is_empty() {
                eprintln!("No profiles configured. Run: hoover config init --interface <IFACE>");
            } else {
                let mut names: Vec<&String> = cfg.profiles.keys().collect();
                names.sort_unstable();
                for name in names {
                    let marker = if *name == active { " *" } else { "" };
                    println!("{name}{marker}");
                }
            }
            Ok(())
        }

        // ── Use <name> ─────────────────────────────────────────────
        ConfigCommand::Use { name } => {
            let mut cfg = config::load(global)?;
            cfg.profile(&name)?;

            cfg.default_profile = Some(name.clone());
            save(&cfg, &path)?;
            if !global.quiet {
                eprintln!("✓ Default profile set to '{name}'");
            }
            Ok(())
        }
    }
}
