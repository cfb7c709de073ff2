//! `hoover run`: drive one capture and report what was collected.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use owo_colors::OwoColorize;
use tabled::Tabled;
use tracing::{debug, warn};

use hoover_core::system::{Platform, SystemRadio, TsharkCapture};
use hoover_core::{Coordinator, Entry, EntryStore, RunReport, Termination};

use crate::cli::{GlobalOpts, OutputFormat, RunArgs};
use crate::config;
use crate::error::CliError;
use crate::output;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct EntryRow {
    #[tabled(rename = "Station")]
    station: String,
    #[tabled(rename = "Network")]
    network: String,
    #[tabled(rename = "First seen")]
    first_seen: String,
    #[tabled(rename = "Last seen")]
    last_seen: String,
    #[tabled(rename = "Sightings")]
    sightings: u64,
}

impl From<&Entry> for EntryRow {
    fn from(e: &Entry) -> Self {
        Self {
            station: e.station.clone(),
            network: e.network.clone(),
            first_seen: timestamp(e.first_seen),
            last_seen: timestamp(e.last_seen),
            sightings: e.sightings,
        }
    }
}

fn timestamp(at: chrono::DateTime<chrono::Utc>) -> String {
    at.with_timezone(&chrono::Local)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}

fn plain_line(e: &Entry) -> String {
    format!("{},{}", e.station, e.network)
}

/// Render the collected entries. Plain output is streamed live during the
/// run, so nothing is repeated afterwards.
pub fn render_entries(format: OutputFormat, entries: &[Entry]) -> Result<String, CliError> {
    if format == OutputFormat::Plain {
        return Ok(String::new());
    }
    output::render_list(format, entries, |e: &Entry| EntryRow::from(e), plain_line)
}

// ── Live reporting ──────────────────────────────────────────────────

/// Line printed the moment a new (station, network) pair turns up.
fn live_line(entry: &Entry, format: OutputFormat, color: bool) -> String {
    match format {
        OutputFormat::Plain => plain_line(entry),
        _ if color => format!(
            "{} {} {}",
            entry.station.cyan(),
            "→".dimmed(),
            entry.network.bold()
        ),
        _ => format!("{} -> {}", entry.station, entry.network),
    }
}

/// Periodically report store growth on stderr until aborted.
async fn report_progress(store: std::sync::Arc<EntryStore>, every: Duration) {
    let mut entries = store.subscribe();
    let mut ticker = tokio::time::interval(every);
    ticker.tick().await;

    loop {
        ticker.tick().await;
        if !entries.has_changed() {
            continue;
        }
        entries.mark_seen();
        let latest = entries.latest();
        let mut stations: Vec<&str> = latest.iter().map(|e| e.station.as_str()).collect();
        stations.sort_unstable();
        stations.dedup();
        eprintln!(
            "· {} pairs from {} stations so far",
            latest.len(),
            stations.len()
        );
    }
}

// ── Signals ─────────────────────────────────────────────────────────

/// Resolves on Ctrl-C or, on unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "cannot listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => debug!("received Ctrl-C"),
        () = terminate => debug!("received SIGTERM"),
    }
}

// ── Summary ─────────────────────────────────────────────────────────

fn summary(report: &RunReport) -> String {
    let reason = match report.termination {
        Termination::ShutdownRequested => "stopped",
        Termination::CaptureEnded => "capture ended",
        Termination::ChannelSwitchFailed(_) => "channel switch failed",
        Termination::CaptureFailed(_) => "capture failed",
    };
    let mut line = format!(
        "{reason}: {} pairs, {} probe requests, {} lines read, {} channel switches",
        report.entries.len(),
        report.reader.matched,
        report.reader.lines,
        report.channel_switches,
    );
    if report.shutdown_timed_out {
        line.push_str(" (shutdown timed out)");
    }
    line
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(args: &RunArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let cfg = config::load(global)?;
    let plan = config::resolve_run(args, global, &cfg)?;

    let platform = Platform::current();
    plan.tools.validate(platform)?;
    debug!(
        %platform,
        interface = %plan.config.interface,
        channels = %plan.config.channel_plan,
        dwell = ?plan.config.dwell,
        "starting capture"
    );

    let radio = SystemRadio::new(platform, plan.tools.radio.clone());
    let capture = TsharkCapture::new(platform, plan.tools.tshark.clone());
    let mut coordinator = Coordinator::new(plan.config, radio, capture);

    let format = global.output;
    if !global.quiet && !format.is_structured() {
        let color = output::should_color(global.color);
        let stdout_open = AtomicBool::new(true);
        coordinator.on_new_entry(move |entry| {
            if stdout_open.load(Ordering::Relaxed)
                && !output::write_line(&live_line(entry, format, color))
            {
                stdout_open.store(false, Ordering::Relaxed);
            }
        });
    }

    let progress = plan
        .summary_interval
        .filter(|_| !global.quiet)
        .map(|every| tokio::spawn(report_progress(std::sync::Arc::clone(coordinator.store()), every)));

    let result = coordinator.run(shutdown_signal()).await;

    if let Some(progress) = progress {
        progress.abort();
    }
    let report = result?;

    let rendered = render_entries(format, &report.entries)?;
    output::print_output(&rendered, global.quiet);
    if !global.quiet {
        eprintln!("{}", summary(&report));
    }

    match report.termination {
        Termination::ShutdownRequested | Termination::CaptureEnded => Ok(()),
        Termination::ChannelSwitchFailed(err) | Termination::CaptureFailed(err) => Err(err.into()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use hoover_core::{CoreError, ReaderStats};
    use std::sync::Arc;

    fn entry(station: &str, network: &str, sightings: u64) -> Entry {
        let at = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        Entry {
            station: station.into(),
            network: network.into(),
            first_seen: at,
            last_seen: at,
            sightings,
        }
    }

    fn report(termination: Termination) -> RunReport {
        RunReport {
            termination,
            entries: Arc::new(vec![entry("aa:bb:cc:dd:ee:ff", "MyNetwork", 3)]),
            channel_switches: 4,
            reader: ReaderStats {
                lines: 10,
                matched: 3,
                discovered: 1,
            },
            shutdown_timed_out: false,
        }
    }

    #[test]
    fn plain_results_are_not_repeated() {
        let entries = vec![entry("aa:bb:cc:dd:ee:ff", "MyNetwork", 1)];
        assert_eq!(render_entries(OutputFormat::Plain, &entries).unwrap(), "");
    }

    #[test]
    fn json_results_carry_every_field() {
        let entries = vec![entry("aa:bb:cc:dd:ee:ff", "MyNetwork", 2)];
        let json = render_entries(OutputFormat::JsonCompact, &entries).unwrap();
        insta::assert_snapshot!(
            json,
            @r#"[{"station":"aa:bb:cc:dd:ee:ff","network":"MyNetwork","first_seen":"2026-03-01T12:00:00Z","last_seen":"2026-03-01T12:00:00Z","sightings":2}]"#
        );
    }

    #[test]
    fn live_lines_without_color() {
        let e = entry("aa:bb:cc:dd:ee:ff", "MyNetwork", 1);
        assert_eq!(
            live_line(&e, OutputFormat::Table, false),
            "aa:bb:cc:dd:ee:ff -> MyNetwork"
        );
        assert_eq!(
            live_line(&e, OutputFormat::Plain, true),
            "aa:bb:cc:dd:ee:ff,MyNetwork"
        );
    }

    #[test]
    fn summary_names_the_stop_reason() {
        assert_eq!(
            summary(&report(Termination::ShutdownRequested)),
            "stopped: 1 pairs, 3 probe requests, 10 lines read, 4 channel switches"
        );

        let mut failed = report(Termination::CaptureFailed(CoreError::Io(
            std::io::Error::other("tshark exited with status 2"),
        )));
        failed.shutdown_timed_out = true;
        assert!(summary(&failed).starts_with("capture failed: "));
        assert!(summary(&failed).ends_with("(shutdown timed out)"));
    }
}
