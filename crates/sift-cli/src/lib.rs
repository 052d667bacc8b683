//! Command-line runtime for `sift`.
//!
//! The runtime splits configuration flags from the command, loads layered
//! configuration through `ortho_config`, installs logging, and dispatches to a
//! subcommand. It writes only to the streams it is given, so tests can drive
//! it with in-memory buffers.
//!
//! Exit codes: `0` on success, `1` when a command fails, `2` for usage
//! errors.

use std::ffi::OsString;
use std::io::Write;
use std::process::ExitCode;

use clap::Parser;
use tracing::debug;

mod cli;
mod commands;
mod config;
mod errors;
mod telemetry;

use cli::{Cli, CliCommand};
use config::{ConfigLoader, OrthoConfigLoader, split_config_arguments};
use errors::AppError;

const USAGE_EXIT_CODE: u8 = 2;

/// Runs the CLI using the provided arguments and IO handles.
#[must_use]
pub fn run<I, W, E>(args: I, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
{
    run_with_loader(args, stdout, stderr, &OrthoConfigLoader)
}

fn run_with_loader<I, W, E, L>(args: I, stdout: &mut W, stderr: &mut E, loader: &L) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
    L: ConfigLoader,
{
    let args: Vec<OsString> = args.into_iter().collect();
    let split = split_config_arguments(&args);
    let cli = match Cli::try_parse_from(&split.command_arguments) {
        Ok(cli) => cli,
        Err(error) => return report_usage(&error, stdout, stderr),
    };

    match execute(&cli, &split.config_arguments, loader, stdout) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            let _ = writeln!(stderr, "error: {error}");
            ExitCode::FAILURE
        }
    }
}

fn execute<W: Write, L: ConfigLoader>(
    cli: &Cli,
    config_arguments: &[OsString],
    loader: &L,
    stdout: &mut W,
) -> Result<(), AppError> {
    let config = loader.load(config_arguments)?;
    telemetry::initialise(&config)?;
    debug!(?config, "configuration loaded");

    match &cli.command {
        CliCommand::Run(args) => commands::run_query(args, &config, stdout),
        CliCommand::Tree { language, source } => {
            commands::print_tree(source, *language, stdout)
        }
        CliCommand::Languages => commands::list_languages(stdout),
    }
}

/// Help and version requests go to stdout and succeed; anything else is a
/// usage error.
fn report_usage<W: Write, E: Write>(
    error: &clap::Error,
    stdout: &mut W,
    stderr: &mut E,
) -> ExitCode {
    let rendered = error.render();
    if error.use_stderr() {
        let _ = write!(stderr, "{rendered}");
        ExitCode::from(USAGE_EXIT_CODE)
    } else {
        let _ = write!(stdout, "{rendered}");
        ExitCode::SUCCESS
    }
}
