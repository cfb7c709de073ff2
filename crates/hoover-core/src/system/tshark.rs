use std::io;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};

use futures_util::stream::{self, BoxStream, StreamExt};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{ChildStderr, Command};
use tokio_stream::wrappers::SplitStream;
use tracing::{debug, info};

use super::Platform;
use crate::capability::CaptureSource;
use crate::config::CaptureConfig;
use crate::error::CoreError;
use crate::parse::SEPARATOR;

/// Output lines of a running tshark. Dropping the stream kills the process.
pub type TsharkLines = BoxStream<'static, io::Result<String>>;

/// Build the tshark argument list for `config`.
pub fn tshark_args(platform: Platform, config: &CaptureConfig) -> Vec<String> {
    let mut args = vec!["-i".to_owned(), config.interface.clone()];
    if platform == Platform::MacOs {
        args.push("-I".into());
    }
    args.extend(
        [
            "-n",
            "-l",
            "-T",
            "fields",
            "-e",
            config.station_field.as_str(),
            "-e",
            config.network_field.as_str(),
            "-E",
        ]
        .map(str::to_owned),
    );
    args.push(format!("separator={SEPARATOR}"));
    args.push("-Y".into());
    args.push(config.display_filter.clone());
    args
}

/// [`CaptureSource`] that runs tshark in field-output mode.
#[derive(Debug, Clone)]
pub struct TsharkCapture {
    platform: Platform,
    program: PathBuf,
}

impl TsharkCapture {
    pub fn new(platform: Platform, program: impl Into<PathBuf>) -> Self {
        Self {
            platform,
            program: program.into(),
        }
    }
}

impl CaptureSource for TsharkCapture {
    type Lines = TsharkLines;

    async fn start(&self, config: &CaptureConfig) -> Result<TsharkLines, CoreError> {
        let args = tshark_args(self.platform, config);
        debug!(program = %self.program.display(), ?args, "spawning tshark");

        let mut command = Command::new(&self.program);
        command
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        // Keep terminal signals away from tshark; shutdown is ours to drive.
        #[cfg(unix)]
        command.process_group(0);

        let start_error = |reason: String| CoreError::CaptureStart {
            interface: config.interface.clone(),
            reason,
        };

        let mut child = command
            .spawn()
            .map_err(|e| start_error(format!("{}: {e}", self.program.display())))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| start_error("stdout not captured".into()))?;
        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(forward_stderr(stderr));
        }
        info!(interface = %config.interface, pid = child.id(), "tshark started");

        // Network names are arbitrary bytes; split on newlines and decode lossily.
        let lines = SplitStream::new(BufReader::new(stdout).split(b'\n'))
            .map(|line| line.map(|bytes| decode_line(&bytes)));
        // Once stdout closes, surface a failing exit status as a stream error.
        let exit = stream::once(async move { exit_error(child.wait().await) })
            .filter_map(|outcome| async move { outcome.map(Err) });

        Ok(lines.chain(exit).boxed())
    }
}

fn decode_line(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes)
        .trim_end_matches('\r')
        .to_owned()
}

fn exit_error(status: io::Result<ExitStatus>) -> Option<io::Error> {
    match status {
        Ok(status) if status.success() => None,
        Ok(status) => Some(io::Error::other(format!("tshark exited with {status}"))),
        Err(e) => Some(e),
    }
}

async fn forward_stderr(stderr: ChildStderr) {
    let mut lines = BufReader::new(stderr).split(b'\n');
    while let Ok(Some(bytes)) = lines.next_segment().await {
        let line = decode_line(&bytes);
        if !line.trim().is_empty() {
            info!(target: "tshark", "{line}");
        }
    }
}
