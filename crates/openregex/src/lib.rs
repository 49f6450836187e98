//! Command-line runtime and execution coordinator for OpenRegex.
//!
//! The crate owns argument parsing, configuration bootstrapping, and the
//! deadline-enforcing [`Coordinator`] that runs every match call in a fresh
//! worker process. The same binary serves as its own worker through a hidden
//! `worker` subcommand, so an engine that hangs or crashes can be cancelled
//! without affecting the caller.
//!
//! The runtime can be exercised from the binary entry point and from tests
//! where configuration loading, workers, and IO streams are substituted.

use std::ffi::OsString;
use std::io::{self, IsTerminal, Write};
use std::process::ExitCode;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use openregex_config::Config;
use openregex_core::{FlagBits, flags};
use openregex_engines::{EngineKind, PreparedEngines};
use tracing::debug;

mod cli;
mod config;
pub mod coordinator;
mod errors;
mod output;
pub mod telemetry;
pub mod worker;

#[cfg(test)]
mod tests;

pub use cli::OutputFormat;
use cli::{Cli, CliCommand, MatchArgs};
use config::{ConfigLoader, OrthoConfigLoader, split_config_arguments};
pub use coordinator::{
    Coordinator, CoordinatorSettings, LaunchError, ProcessLauncher, ProcessWorker, WorkerExit,
    WorkerHandle, WorkerLauncher, engine_settings,
};
use errors::AppError;
pub use output::render_human;

/// CLI flags recognised by the configuration loader.
///
/// MAINTENANCE: This list must be kept in sync with the fields of
/// `openregex_config::Config`. When adding new configuration options, update
/// this array accordingly.
const CONFIG_CLI_FLAGS: &[&str] = &[
    "--config-path",
    "--timeout-secs",
    "--grace-ms",
    "--poll-interval-ms",
    "--port",
    "--log-filter",
    "--log-format",
    "--assets-dir",
    "--cxx-compiler",
    "--java-binary",
    "--javac-binary",
    "--node-binary",
];

/// Tracing target for CLI events.
const CLI_TARGET: &str = "openregex::cli";

/// Bundles the IO streams provided to the CLI runtime.
pub(crate) struct IoStreams<'a, W: Write, E: Write> {
    pub(crate) stdout: &'a mut W,
    pub(crate) stderr: &'a mut E,
    stdout_is_terminal: bool,
}

impl<'a, W: Write, E: Write> IoStreams<'a, W, E> {
    pub(crate) fn new(stdout: &'a mut W, stderr: &'a mut E) -> Self {
        Self {
            stdout,
            stderr,
            stdout_is_terminal: io::stdout().is_terminal(),
        }
    }

    #[cfg(test)]
    pub(crate) const fn with_terminal_status(
        stdout: &'a mut W,
        stderr: &'a mut E,
        stdout_is_terminal: bool,
    ) -> Self {
        Self {
            stdout,
            stderr,
            stdout_is_terminal,
        }
    }
}

/// Runs the CLI using the provided arguments and IO handles.
///
/// Match calls re-execute the current binary as their worker.
#[must_use]
pub fn run<I, W, E>(args: I, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
{
    let mut streams = IoStreams::new(stdout, stderr);
    run_with(
        args,
        &mut streams,
        &OrthoConfigLoader,
        ProcessLauncher::current_exe,
    )
}

/// Runs the CLI with substitutable configuration and workers.
pub(crate) fn run_with<I, W, E, C, L, F>(
    args: I,
    streams: &mut IoStreams<'_, W, E>,
    loader: &C,
    launcher: F,
) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
    C: ConfigLoader,
    L: WorkerLauncher,
    F: FnOnce() -> Result<L, LaunchError>,
{
    let args: Vec<OsString> = args.into_iter().collect();
    let split = split_config_arguments(&args);
    let cli_arguments = prepare_cli_arguments(&args, split.command_start);

    let result = Cli::try_parse_from(cli_arguments)
        .map_err(AppError::CliUsage)
        .and_then(|cli| {
            let load = || loader.load(&split.config_arguments);
            match cli.command {
                CliCommand::Worker => {
                    worker::run_worker(&mut io::stdin().lock(), streams.stdout)?;
                    Ok(ExitCode::SUCCESS)
                }
                CliCommand::Match(arguments) => execute_match(arguments, &load()?, streams, launcher),
                CliCommand::Engines => list_engines(&load()?, streams),
                CliCommand::Info { engine } => describe_engine(&engine, &load()?, streams),
                CliCommand::Config => {
                    output::write_json(streams.stdout, &load()?)?;
                    Ok(ExitCode::SUCCESS)
                }
            }
        });

    match result {
        Ok(exit_code) => exit_code,
        Err(AppError::CliUsage(error)) if !error.use_stderr() => {
            drop(write!(streams.stdout, "{error}"));
            ExitCode::SUCCESS
        }
        Err(error) => {
            drop(writeln!(streams.stderr, "{error}"));
            ExitCode::FAILURE
        }
    }
}

/// Rebuilds the argument vector clap sees: the program name followed by the
/// tokens after the configuration flags.
fn prepare_cli_arguments(args: &[OsString], command_start: usize) -> Vec<OsString> {
    args.first()
        .into_iter()
        .chain(args.iter().skip(command_start.max(1)))
        .cloned()
        .collect()
}

fn execute_match<W, E, L, F>(
    arguments: MatchArgs,
    config: &Config,
    streams: &mut IoStreams<'_, W, E>,
    launcher: F,
) -> Result<ExitCode, AppError>
where
    W: Write,
    E: Write,
    L: WorkerLauncher,
    F: FnOnce() -> Result<L, LaunchError>,
{
    telemetry::initialise(config)?;
    let flag_bits = resolve_flags(&arguments.engine, &arguments.flags)? | arguments.flag_bits;
    let deadline = match arguments.deadline {
        None => config.timeout(),
        Some(seconds) => Duration::try_from_secs_f64(seconds)
            .ok()
            .filter(|deadline| !deadline.is_zero())
            .ok_or(AppError::InvalidDeadline(seconds))?,
    };
    debug!(
        target: CLI_TARGET,
        engine = %arguments.engine,
        flags = flag_bits,
        deadline_seconds = deadline.as_secs_f64(),
        "executing match"
    );

    let engines = prepare_named(&arguments.engine, config)?;
    let coordinator = Coordinator::with_launcher(
        launcher()?,
        CoordinatorSettings::from_config(config),
        Arc::new(engines),
    );
    let result = coordinator.execute(
        &arguments.engine,
        &arguments.pattern,
        &arguments.text,
        flag_bits,
        deadline,
    );
    let format = arguments.output.resolve(streams.stdout_is_terminal);
    output::write_result(streams.stdout, &arguments.engine, &result, format)?;
    output::finish(streams.stdout)?;

    Ok(if result.error().is_empty() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Combines flag names advertised by `engine`.
///
/// Without names the engine is not looked up, so an unknown engine is still
/// dispatched and reported by its worker.
fn resolve_flags(engine: &str, names: &[String]) -> Result<FlagBits, AppError> {
    if names.is_empty() {
        return Ok(0);
    }
    let kind =
        EngineKind::from_str(engine).map_err(|_| AppError::UnknownEngine(engine.to_owned()))?;
    Ok(flags::resolve_names(kind.available_flags(), names)?)
}

/// Prepares only the engine called `engine`, or nothing when it is not
/// catalogued.
///
/// Setup runs here, before any deadline starts.
fn prepare_named(engine: &str, config: &Config) -> Result<PreparedEngines, AppError> {
    let kind = EngineKind::from_str(engine).ok();
    Ok(PreparedEngines::prepare_only(&engine_settings(config), kind)?)
}

fn list_engines<W: Write, E: Write>(
    config: &Config,
    streams: &mut IoStreams<'_, W, E>,
) -> Result<ExitCode, AppError> {
    telemetry::initialise(config)?;
    let engines = PreparedEngines::prepare(&engine_settings(config))?;
    output::write_lines(streams.stdout, engines.registry().list())?;
    Ok(ExitCode::SUCCESS)
}

fn describe_engine<W: Write, E: Write>(
    engine: &str,
    config: &Config,
    streams: &mut IoStreams<'_, W, E>,
) -> Result<ExitCode, AppError> {
    telemetry::initialise(config)?;
    let descriptor = prepare_named(engine, config)?
        .registry()
        .describe(engine)
        .ok_or_else(|| AppError::UnknownEngine(engine.to_owned()))?;
    output::write_json(streams.stdout, &descriptor)?;
    Ok(ExitCode::SUCCESS)
}
