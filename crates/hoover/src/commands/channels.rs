//! `hoover channels`: show the channel plan a run would hop through.

use serde::Serialize;

use hoover_core::ChannelPlan;
use hoover_core::system::Platform;

use crate::cli::{ChannelsArgs, GlobalOpts};
use crate::config::{self, Config};
use crate::error::CliError;
use crate::output;

/// Where the plan came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
enum PlanSource {
    Flag,
    Profile,
    PlatformDefault,
}

#[derive(Debug, Serialize)]
struct PlanView {
    platform: String,
    source: PlanSource,
    channels: Vec<u8>,
}

fn resolve(
    args: &ChannelsArgs,
    global: &GlobalOpts,
    cfg: &Config,
    platform: Platform,
) -> Result<PlanView, CliError> {
    let profile_channels = cfg
        .profiles
        .get(&config::active_profile_name(global, cfg))
        .and_then(|p| p.channels.as_deref());

    let (plan, source) = match (args.channels.as_deref(), profile_channels) {
        (Some(flag), _) => (config::parse_channels(flag)?, PlanSource::Flag),
        (None, Some(profile)) => (config::parse_channels(profile)?, PlanSource::Profile),
        (None, None) => (
            ChannelPlan::platform_default(platform.as_os()),
            PlanSource::PlatformDefault,
        ),
    };

    Ok(PlanView {
        platform: platform.to_string(),
        source,
        channels: plan.channels().iter().map(|c| c.number()).collect(),
    })
}

fn joined(view: &PlanView) -> String {
    view.channels
        .iter()
        .map(u8::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

fn detail(view: &PlanView) -> String {
    let source = match view.source {
        PlanSource::Flag => "--channels",
        PlanSource::Profile => "profile",
        PlanSource::PlatformDefault => "platform default",
    };
    [
        format!("Platform: {}", view.platform),
        format!("Source:   {source}"),
        format!("Count:    {}", view.channels.len()),
        format!("Channels: {}", joined(view)),
    ]
    .join("\n")
}

pub fn handle(args: &ChannelsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let cfg = config::load(global)?;
    let view = resolve(args, global, &cfg, Platform::current())?;
    let out = output::render_single(global.output, &view, detail, joined)?;
    output::print_output(&out, global.quiet);
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::cli::{ColorMode, OutputFormat};
    use crate::config::Profile;

    fn global() -> GlobalOpts {
        GlobalOpts {
            profile: None,
            config: None,
            output: OutputFormat::Table,
            color: ColorMode::Never,
            verbose: 0,
            quiet: false,
        }
    }

    #[test]
    fn flag_beats_profile() {
        let mut cfg = Config::default();
        let mut profile = Profile::new("wlan0");
        profile.channels = Some("1,6,11".into());
        cfg.profiles.insert("default".into(), profile);

        let from_profile = resolve(
            &ChannelsArgs { channels: None },
            &global(),
            &cfg,
            Platform::Linux,
        )
        .unwrap();
        assert_eq!(from_profile.source, PlanSource::Profile);
        assert_eq!(from_profile.channels, vec![1, 6, 11]);

        let from_flag = resolve(
            &ChannelsArgs {
                channels: Some("36-40".into()),
            },
            &global(),
            &cfg,
            Platform::Linux,
        )
        .unwrap();
        assert_eq!(from_flag.source, PlanSource::Flag);
        assert_eq!(joined(&from_flag), "36,37,38,39,40");
    }

    #[test]
    fn platform_default_without_config() {
        let view = resolve(
            &ChannelsArgs { channels: None },
            &global(),
            &Config::default(),
            Platform::MacOs,
        )
        .unwrap();
        insta::assert_snapshot!(detail(&view), @r"
        Platform: macos
        Source:   platform default
        Count:    11
        Channels: 1,2,3,4,5,6,7,8,9,10,11
        ");
    }

    #[test]
    fn malformed_plan_is_a_usage_error() {
        let err = resolve(
            &ChannelsArgs {
                channels: Some("1,,x".into()),
            },
            &global(),
            &Config::default(),
            Platform::Linux,
        )
        .unwrap_err();
        assert!(matches!(err, CliError::Validation { ref field, .. } if field == "channels"));
    }
}
