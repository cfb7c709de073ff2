// ── Coordinator ──
//
// Owns one capture run from start to final snapshot: prepares the
// interface, starts the capture, runs the hopper and reader side by
// side, and tears both down when any of them (or the caller) says stop.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::{JoinError, JoinHandle};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::capability::{CaptureSource, ChannelSwitcher, Clock, InterfacePreparer, SystemClock};
use crate::config::HooverConfig;
use crate::error::CoreError;
use crate::hopper::{HopperExit, HopperSettings, run_hopper};
use crate::model::Entry;
use crate::reader::{NewEntryHook, ReaderContext, ReaderExit, ReaderStats, run_reader};
use crate::store::EntryStore;

// ── Run lifecycle ────────────────────────────────────────────────

/// Lifecycle of a run, observable via [`Coordinator::state`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    NotStarted,
    Running,
    ShuttingDown,
    Stopped,
}

/// Process-level outcome of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCondition {
    Success,
    ChannelSwitchFailure,
    CaptureStreamError,
}

/// What ended the `Running` phase.
#[derive(Debug)]
pub enum Termination {
    /// The caller's shutdown future resolved.
    ShutdownRequested,
    /// The capture process closed its output cleanly.
    CaptureEnded,
    /// The hopper could not change channel.
    ChannelSwitchFailed(CoreError),
    /// Reading the capture output failed.
    CaptureFailed(CoreError),
}

impl Termination {
    pub fn exit_condition(&self) -> ExitCondition {
        match self {
            Self::ShutdownRequested | Self::CaptureEnded => ExitCondition::Success,
            Self::ChannelSwitchFailed(_) => ExitCondition::ChannelSwitchFailure,
            Self::CaptureFailed(_) => ExitCondition::CaptureStreamError,
        }
    }
}

/// Everything known once a run reaches [`RunState::Stopped`].
#[derive(Debug)]
pub struct RunReport {
    pub termination: Termination,
    /// Final snapshot, in discovery order.
    pub entries: Arc<Vec<Entry>>,
    pub channel_switches: u64,
    pub reader: ReaderStats,
    /// A task missed the shutdown deadline and was aborted.
    pub shutdown_timed_out: bool,
}

impl RunReport {
    pub fn exit_condition(&self) -> ExitCondition {
        self.termination.exit_condition()
    }
}

enum Trigger {
    Shutdown,
    Hopper(Result<HopperExit, JoinError>),
    Reader(Result<ReaderExit, JoinError>),
}

// ── Coordinator ──────────────────────────────────────────────────

/// Runs the capture pipeline once.
///
/// `R` prepares the interface and switches channels, `C` starts the
/// capture process. Both are usually `crate::system` types.
pub struct Coordinator<R, C> {
    config: HooverConfig,
    radio: Arc<R>,
    capture: C,
    clock: Arc<dyn Clock>,
    store: Arc<EntryStore>,
    hooks: Vec<NewEntryHook>,
    started: AtomicBool,
    state: watch::Sender<RunState>,
    final_snapshot: watch::Sender<Option<Arc<Vec<Entry>>>>,
}

impl<R, C> Coordinator<R, C>
where
    R: InterfacePreparer + ChannelSwitcher + 'static,
    C: CaptureSource,
{
    pub fn new(config: HooverConfig, radio: R, capture: C) -> Self {
        let (state, _) = watch::channel(RunState::NotStarted);
        let (final_snapshot, _) = watch::channel(None);

        Self {
            config,
            radio: Arc::new(radio),
            capture,
            clock: Arc::new(SystemClock),
            store: Arc::new(EntryStore::new()),
            hooks: Vec::new(),
            started: AtomicBool::new(false),
            state,
            final_snapshot,
        }
    }

    /// Replace the time source used to stamp events.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Register a callback for every newly discovered (station, network) pair.
    pub fn on_new_entry(&mut self, hook: impl Fn(&Entry) + Send + Sync + 'static) -> &mut Self {
        self.hooks.push(Arc::new(hook));
        self
    }

    pub fn config(&self) -> &HooverConfig {
        &self.config
    }

    /// The live store. Safe to snapshot while the run is in progress.
    pub fn store(&self) -> &Arc<EntryStore> {
        &self.store
    }

    /// Subscribe to lifecycle changes.
    pub fn state(&self) -> watch::Receiver<RunState> {
        self.state.subscribe()
    }

    /// Final snapshot, available once the run has stopped.
    pub fn final_snapshot(&self) -> Option<Arc<Vec<Entry>>> {
        self.final_snapshot.borrow().clone()
    }

    /// Run until `shutdown` resolves, the hopper fails, or the capture ends.
    ///
    /// Interface preparation and capture start happen first; if either
    /// fails the run never enters [`RunState::Running`] and may be retried.
    /// A coordinator runs at most once to completion.
    #[allow(clippy::too_many_lines)]
    pub async fn run<F>(&self, shutdown: F) -> Result<RunReport, CoreError>
    where
        F: Future<Output = ()>,
    {
        if self.started.swap(true, Ordering::SeqCst) {
            return Err(CoreError::InvalidState {
                message: format!("run already started (state: {:?})", *self.state.borrow()),
            });
        }

        let lines = match self.start_capture().await {
            Ok(lines) => lines,
            Err(e) => {
                self.started.store(false, Ordering::SeqCst);
                return Err(e);
            }
        };

        let cancel = CancellationToken::new();
        let mut hopper = tokio::spawn(run_hopper(
            HopperSettings {
                interface: self.config.interface.clone(),
                plan: self.config.channel_plan.clone(),
                dwell: self.config.dwell,
            },
            Arc::clone(&self.radio),
            cancel.child_token(),
        ));
        let mut reader = tokio::spawn(run_reader(
            lines,
            ReaderContext {
                store: Arc::clone(&self.store),
                clock: Arc::clone(&self.clock),
                hooks: self.hooks.clone(),
                verbose: self.config.verbose,
            },
            cancel.child_token(),
        ));

        self.state.send_replace(RunState::Running);
        info!(interface = %self.config.interface, "capture running");

        tokio::pin!(shutdown);
        let trigger = tokio::select! {
            () = &mut shutdown => Trigger::Shutdown,
            res = &mut hopper => Trigger::Hopper(res),
            res = &mut reader => Trigger::Reader(res),
        };

        self.state.send_replace(RunState::ShuttingDown);
        cancel.cancel();

        let deadline = deadline_after(self.config.effective_shutdown_timeout());
        let mut shutdown_timed_out = false;

        let (termination, hopper_exit, reader_exit) = match trigger {
            Trigger::Shutdown => {
                info!("shutdown requested");
                let hopper_exit = join_by(&mut hopper, deadline, "hopper", &mut shutdown_timed_out).await;
                let reader_exit = join_by(&mut reader, deadline, "reader", &mut shutdown_timed_out).await;
                (Termination::ShutdownRequested, hopper_exit, reader_exit)
            }
            Trigger::Hopper(res) => {
                let (termination, hopper_exit) = match res {
                    Ok(HopperExit::Failed { error, switches, .. }) => (
                        Termination::ChannelSwitchFailed(error),
                        Some(HopperExit::Cancelled { switches }),
                    ),
                    Ok(exit) => (Termination::ShutdownRequested, Some(exit)),
                    Err(e) => (Termination::ChannelSwitchFailed(task_failed("hopper", &e)), None),
                };
                let reader_exit = join_by(&mut reader, deadline, "reader", &mut shutdown_timed_out).await;
                (termination, hopper_exit, reader_exit)
            }
            Trigger::Reader(res) => {
                let (termination, reader_exit) = match res {
                    Ok(ReaderExit::EndOfStream(stats)) => {
                        (Termination::CaptureEnded, Some(ReaderExit::EndOfStream(stats)))
                    }
                    Ok(ReaderExit::Failed(stats, error)) => (
                        Termination::CaptureFailed(CoreError::Io(error)),
                        Some(ReaderExit::Cancelled(stats)),
                    ),
                    Ok(exit) => (Termination::ShutdownRequested, Some(exit)),
                    Err(e) => (Termination::CaptureFailed(task_failed("reader", &e)), None),
                };
                let hopper_exit = join_by(&mut hopper, deadline, "hopper", &mut shutdown_timed_out).await;
                (termination, hopper_exit, reader_exit)
            }
        };

        let entries = Arc::new(self.store.snapshot());
        self.final_snapshot.send_replace(Some(Arc::clone(&entries)));
        self.state.send_replace(RunState::Stopped);

        let report = RunReport {
            termination,
            entries,
            channel_switches: hopper_exit.as_ref().map_or(0, HopperExit::switches),
            reader: reader_exit.as_ref().map(ReaderExit::stats).unwrap_or_default(),
            shutdown_timed_out,
        };
        info!(
            entries = report.entries.len(),
            switches = report.channel_switches,
            lines = report.reader.lines,
            outcome = ?report.exit_condition(),
            "capture stopped"
        );
        Ok(report)
    }

    async fn start_capture(&self) -> Result<C::Lines, CoreError> {
        let interface = &self.config.interface;
        debug!(%interface, "preparing interface");
        self.radio.prepare(interface).await?;

        debug!(%interface, filter = %self.config.capture.display_filter, "starting capture");
        self.capture.start(&self.config.capture).await
    }
}

const FAR_FUTURE_SECS: u64 = 86_400 * 365 * 30;

/// `now + timeout`, clamped to roughly thirty years out.
fn deadline_after(timeout: Duration) -> Instant {
    let now = Instant::now();
    now.checked_add(timeout)
        .unwrap_or_else(|| now + Duration::from_secs(FAR_FUTURE_SECS))
}

/// Wait for `handle` until `deadline`; abort it if the deadline passes.
async fn join_by<T>(
    handle: &mut JoinHandle<T>,
    deadline: Instant,
    task: &str,
    timed_out: &mut bool,
) -> Option<T> {
    match tokio::time::timeout_at(deadline, &mut *handle).await {
        Ok(Ok(exit)) => Some(exit),
        Ok(Err(e)) => {
            warn!(task, error = %e, "task ended abnormally during shutdown");
            None
        }
        Err(_) => {
            warn!(task, "task did not stop before the shutdown deadline; aborting");
            handle.abort();
            *timed_out = true;
            None
        }
    }
}

fn task_failed(task: &str, err: &JoinError) -> CoreError {
    CoreError::TaskFailed {
        task: task.into(),
        reason: err.to_string(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::Mutex;

    use futures_util::stream::{self, BoxStream, StreamExt};

    use crate::config::CaptureConfig;
    use crate::model::Channel;

    #[derive(Default)]
    struct FakeRadio {
        refuse_prepare: bool,
        hang_on_switch: bool,
        switches: Mutex<Vec<u8>>,
    }

    impl InterfacePreparer for FakeRadio {
        async fn prepare(&self, interface: &str) -> Result<(), CoreError> {
            if self.refuse_prepare {
                return Err(CoreError::InterfacePreparation {
                    interface: interface.into(),
                    reason: "operation not permitted".into(),
                });
            }
            Ok(())
        }
    }

    impl ChannelSwitcher for FakeRadio {
        async fn set_channel(&self, _interface: &str, channel: Channel) -> Result<(), CoreError> {
            if self.hang_on_switch {
                std::future::pending::<()>().await;
            }
            self.switches.lock().unwrap().push(channel.number());
            Ok(())
        }
    }

    /// Emits fixed lines, then either ends or stays open forever.
    struct FakeCapture {
        lines: Vec<&'static str>,
        hold_open: bool,
    }

    impl CaptureSource for FakeCapture {
        type Lines = BoxStream<'static, io::Result<String>>;

        async fn start(&self, _config: &CaptureConfig) -> Result<Self::Lines, CoreError> {
            let lines = stream::iter(self.lines.clone()).map(|l| Ok(l.to_owned()));
            if self.hold_open {
                Ok(lines.chain(stream::pending()).boxed())
            } else {
                Ok(lines.boxed())
            }
        }
    }

    fn config() -> HooverConfig {
        let mut config = HooverConfig::new("wlan0");
        config.channel_plan = "1,6,11".parse().unwrap();
        config.dwell = Duration::from_secs(1);
        config
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_request_keeps_partial_results() {
        let coordinator = Coordinator::new(
            config(),
            FakeRadio::default(),
            FakeCapture {
                lines: vec!["a,One", "b,Two", "a,One"],
                hold_open: true,
            },
        );
        let state = coordinator.state();

        let report = coordinator
            .run(tokio::time::sleep(Duration::from_millis(2500)))
            .await
            .unwrap();

        assert!(matches!(report.termination, Termination::ShutdownRequested));
        assert_eq!(report.exit_condition(), ExitCondition::Success);
        assert_eq!(report.entries.len(), 2);
        assert_eq!(report.channel_switches, 3);
        assert!(!report.shutdown_timed_out);
        assert_eq!(*state.borrow(), RunState::Stopped);
        assert_eq!(coordinator.final_snapshot().unwrap().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn second_run_is_rejected() {
        let coordinator = Coordinator::new(
            config(),
            FakeRadio::default(),
            FakeCapture {
                lines: vec![],
                hold_open: false,
            },
        );
        coordinator.run(std::future::pending()).await.unwrap();

        let err = coordinator.run(std::future::pending()).await.unwrap_err();
        assert!(matches!(err, CoreError::InvalidState { .. }));
    }

    #[tokio::test]
    async fn precondition_failure_never_runs() {
        let coordinator = Coordinator::new(
            config(),
            FakeRadio {
                refuse_prepare: true,
                ..FakeRadio::default()
            },
            FakeCapture {
                lines: vec!["a,One"],
                hold_open: false,
            },
        );

        let err = coordinator.run(std::future::pending()).await.unwrap_err();
        assert!(matches!(err, CoreError::InterfacePreparation { .. }));
        assert_eq!(*coordinator.state().borrow(), RunState::NotStarted);
        assert!(coordinator.final_snapshot().is_none());
        assert!(coordinator.store().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn stuck_hopper_is_aborted_after_grace_period() {
        let mut config = config();
        config.shutdown_timeout = Some(Duration::from_secs(1));
        let coordinator = Coordinator::new(
            config,
            FakeRadio {
                hang_on_switch: true,
                ..FakeRadio::default()
            },
            FakeCapture {
                lines: vec!["a,One"],
                hold_open: false,
            },
        );

        let report = coordinator.run(std::future::pending()).await.unwrap();

        assert!(matches!(report.termination, Termination::CaptureEnded));
        assert!(report.shutdown_timed_out);
        assert_eq!(report.channel_switches, 0);
        assert_eq!(report.entries.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn huge_dwell_and_timeout_do_not_overflow() {
        let mut config = config();
        config.dwell = Duration::from_secs(u64::MAX / 2);
        let coordinator = Coordinator::new(
            config,
            FakeRadio::default(),
            FakeCapture {
                lines: vec!["a,One"],
                hold_open: true,
            },
        );

        let report = coordinator
            .run(tokio::time::sleep(Duration::from_secs(1)))
            .await
            .unwrap();

        assert!(matches!(report.termination, Termination::ShutdownRequested));
        assert!(!report.shutdown_timed_out);
        assert_eq!(report.channel_switches, 1);
        assert_eq!(report.entries.len(), 1);
    }

    #[test]
    fn deadline_is_clamped() {
        let before = Instant::now();
        assert!(deadline_after(Duration::MAX) > before + Duration::from_secs(FAR_FUTURE_SECS - 1));
        assert!(deadline_after(Duration::from_secs(1)) >= before + Duration::from_secs(1));
    }

    #[tokio::test]
    async fn new_entry_hooks_see_each_pair_once() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);

        let mut coordinator = Coordinator::new(
            config(),
            FakeRadio::default(),
            FakeCapture {
                lines: vec!["a,One", "a,One", "a,Two"],
                hold_open: false,
            },
        );
        coordinator.on_new_entry(move |entry| sink.lock().unwrap().push(entry.network.clone()));

        let report = coordinator.run(std::future::pending()).await.unwrap();
        assert_eq!(report.reader.matched, 3);
        assert_eq!(*seen.lock().unwrap(), vec!["One", "Two"]);
    }
}
