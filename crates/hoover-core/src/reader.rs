// ── Capture reader ──
//
// Consumes the capture tool's output one line at a time, parses it,
// and folds matches into the EntryStore. Lines are handled strictly in
// arrival order; one line is never abandoned halfway through.

use std::io;
use std::sync::Arc;

use futures_core::Stream;
use tokio_stream::StreamExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::capability::Clock;
use crate::model::Entry;
use crate::parse::parse_line;
use crate::store::{EntryStore, Observation};

/// Callback invoked once per newly discovered (station, network) pair.
pub type NewEntryHook = Arc<dyn Fn(&Entry) + Send + Sync>;

/// Shared state the reader task works against.
#[derive(Clone)]
pub struct ReaderContext {
    pub store: Arc<EntryStore>,
    pub clock: Arc<dyn Clock>,
    pub hooks: Vec<NewEntryHook>,
    /// Log every raw and unmatched line at `info` instead of `trace`.
    pub verbose: bool,
}

/// Line counters accumulated by one reader run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReaderStats {
    pub lines: u64,
    pub matched: u64,
    pub discovered: u64,
}

/// Why the reader task stopped.
#[derive(Debug)]
pub enum ReaderExit {
    /// Cancellation was requested.
    Cancelled(ReaderStats),
    /// The capture process closed its output.
    EndOfStream(ReaderStats),
    /// Reading from the capture process failed.
    Failed(ReaderStats, io::Error),
}

impl ReaderExit {
    pub fn stats(&self) -> ReaderStats {
        match self {
            Self::Cancelled(stats) | Self::EndOfStream(stats) | Self::Failed(stats, _) => *stats,
        }
    }
}

/// Read `lines` until the stream ends, errors, or `cancel` fires.
pub async fn run_reader<S>(mut lines: S, ctx: ReaderContext, cancel: CancellationToken) -> ReaderExit
where
    S: Stream<Item = io::Result<String>> + Unpin,
{
    let mut stats = ReaderStats::default();

    loop {
        let next = tokio::select! {
            biased;
            () = cancel.cancelled() => {
                debug!(lines = stats.lines, "capture reader cancelled");
                return ReaderExit::Cancelled(stats);
            }
            next = lines.next() => next,
        };

        match next {
            Some(Ok(line)) => handle_line(&line, &ctx, &mut stats),
            Some(Err(error)) => {
                warn!(error = %error, "capture stream failed");
                return ReaderExit::Failed(stats, error);
            }
            None => {
                info!(lines = stats.lines, matched = stats.matched, "capture stream ended");
                return ReaderExit::EndOfStream(stats);
            }
        }
    }
}

/// Parse one line and apply it. Runs to completion without suspending.
fn handle_line(line: &str, ctx: &ReaderContext, stats: &mut ReaderStats) {
    stats.lines += 1;
    if ctx.verbose {
        info!(line, "capture line");
    } else {
        trace!(line, "capture line");
    }

    let Some(event) = parse_line(line, ctx.clock.now()) else {
        if ctx.verbose {
            info!(line, "skipped unmatched capture line");
        } else {
            trace!(line, "skipped unmatched capture line");
        }
        return;
    };
    stats.matched += 1;

    if let Observation::New(entry) = ctx.store.upsert(&event) {
        stats.discovered += 1;
        debug!(station = %entry.station, network = %entry.network, "new probe entry");
        for hook in &ctx.hooks {
            hook(&entry);
        }
    }
}
