use std::fmt;
use std::path::PathBuf;
use std::process::Stdio;

use tokio::process::Command;
use tracing::trace;

use crate::error::CoreError;

/// One invocation of an external tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl ToolCommand {
    pub fn new<I, A>(program: impl Into<PathBuf>, args: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    fn tool_name(&self) -> String {
        self.program
            .file_name()
            .unwrap_or(self.program.as_os_str())
            .to_string_lossy()
            .into_owned()
    }

    /// Run to completion, failing on a non-zero exit.
    pub async fn run(&self) -> Result<(), CoreError> {
        trace!(command = %self, "running tool");
        let output = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| CoreError::ToolFailed {
                tool: self.tool_name(),
                status: "not started".into(),
                stderr: e.to_string(),
            })?;

        if output.status.success() {
            return Ok(());
        }

        Err(CoreError::ToolFailed {
            tool: self.tool_name(),
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
        })
    }
}

impl fmt::Display for ToolCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

#[cfg(all(test, unix))]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn zero_exit_is_success() {
        ToolCommand::new("true", Vec::<String>::new()).run().await.unwrap();
    }

    #[tokio::test]
    async fn failure_carries_stderr() {
        let err = ToolCommand::new("sh", ["-c", "echo nope >&2; exit 3"])
            .run()
            .await
            .unwrap_err();

        match err {
            CoreError::ToolFailed { tool, stderr, .. } => {
                assert_eq!(tool, "sh");
                assert_eq!(stderr, "nope");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_program_is_reported() {
        let err = ToolCommand::new("/nonexistent/hoover-tool", ["x"]).run().await.unwrap_err();
        assert!(matches!(err, CoreError::ToolFailed { ref status, .. } if status == "not started"));
    }

    #[test]
    fn display_joins_program_and_args() {
        let cmd = ToolCommand::new("iw", ["dev", "wlan0", "set", "channel", "6"]);
        assert_eq!(cmd.to_string(), "iw dev wlan0 set channel 6");
    }
}
