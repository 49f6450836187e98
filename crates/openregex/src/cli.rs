//! CLI argument definitions for OpenRegex.

use clap::{Args, Parser, Subcommand, ValueEnum};
use openregex_core::FlagBits;

/// Output format selection for match results.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    /// Selects `human` for terminal output and `json` for redirected output.
    #[default]
    Auto,
    /// Always render human-readable output.
    Human,
    /// Always emit JSON.
    Json,
}

/// Runs regular expressions against several engines under a deadline.
#[derive(Parser, Debug)]
#[command(name = "openregex", version, disable_help_subcommand = true)]
pub(crate) struct Cli {
    /// The action to perform.
    #[command(subcommand)]
    pub(crate) command: CliCommand,
}

/// Subcommands of the OpenRegex CLI.
#[derive(Subcommand, Debug, Clone)]
pub(crate) enum CliCommand {
    /// Runs one pattern against one text in an isolated worker.
    Match(MatchArgs),
    /// Lists the engine names in display order.
    Engines,
    /// Prints an engine's descriptor as JSON.
    Info {
        /// Engine display name, for example `Rust - regex`.
        #[arg(value_name = "ENGINE")]
        engine: String,
    },
    /// Prints the resolved configuration as JSON.
    Config,
    /// Serves a single request from stdin; used by the coordinator.
    #[command(hide = true)]
    Worker,
}

/// Arguments of the `match` subcommand.
#[derive(Args, Debug, Clone)]
pub(crate) struct MatchArgs {
    /// Engine display name, for example `Java`.
    #[arg(long, short = 'e', value_name = "ENGINE")]
    pub(crate) engine: String,
    /// Flag name advertised by the engine; may be repeated.
    #[arg(long = "flag", short = 'f', value_name = "NAME")]
    pub(crate) flags: Vec<String>,
    /// Raw flag bits combined with any named flags.
    #[arg(long = "flag-bits", value_name = "BITS", default_value_t = 0)]
    pub(crate) flag_bits: FlagBits,
    /// Deadline for this call in seconds; defaults to the configured timeout.
    #[arg(long, value_name = "SECONDS")]
    pub(crate) deadline: Option<f64>,
    /// Controls how the result is rendered.
    #[arg(long, value_enum, default_value_t = OutputFormat::Auto)]
    pub(crate) output: OutputFormat,
    /// The regular expression.
    #[arg(value_name = "PATTERN", allow_hyphen_values = true)]
    pub(crate) pattern: String,
    /// The text to search.
    #[arg(value_name = "TEXT", allow_hyphen_values = true)]
    pub(crate) text: String,
}
