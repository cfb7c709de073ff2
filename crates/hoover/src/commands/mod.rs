//! Command dispatch: bridges CLI args -> capture pipeline -> output formatting.

pub mod channels;
pub mod config_cmd;
pub mod run;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a command to the appropriate handler.
pub async fn dispatch(cmd: Command, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Run(args) => run::handle(&args, global).await,
        Command::Channels(args) => channels::handle(&args, global),
        Command::Config(args) => config_cmd::handle(args, global),
        // Completions are handled before dispatch
        Command::Completions(_) => Ok(()),
    }
}
