mod cli;
mod commands;
mod config;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_lines = matches!(&cli.command, Command::Run(args) if args.log_lines);
    init_tracing(cli.global.verbose, log_lines);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8, log_lines: bool) {
    let filter = tracing_filter(verbosity, log_lines);

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Filter directives for `-v` count. `--log-lines` lifts the capture reader
/// to `info` so its per-line records show without `-v`.
fn tracing_filter(verbosity: u8, log_lines: bool) -> String {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    if log_lines && verbosity == 0 {
        format!("{level},hoover_core::reader=info")
    } else {
        level.to_owned()
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "hoover", &mut std::io::stdout());
            Ok(())
        }

        cmd => {
            tracing::debug!(command = ?cmd, "dispatching command");
            commands::dispatch(cmd, &cli.global).await
        }
    }
}
