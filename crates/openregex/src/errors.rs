//! Error types for the CLI runtime.

use std::io;
use std::sync::Arc;

use openregex_core::{RegistryError, UnknownFlagError};
use thiserror::Error;

use crate::coordinator::LaunchError;
use crate::telemetry::TelemetryError;
use crate::worker::WorkerError;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("failed to load configuration: {0}")]
    LoadConfiguration(Arc<ortho_config::OrthoError>),
    #[error("{0}")]
    CliUsage(clap::Error),
    #[error("Engine '{0}' not found")]
    UnknownEngine(String),
    #[error("{0}")]
    UnknownFlag(#[from] UnknownFlagError),
    #[error("deadline must be a positive number of seconds, got {0}")]
    InvalidDeadline(f64),
    #[error("failed to prepare engines: {0}")]
    Registry(#[from] RegistryError),
    #[error("failed to start coordinator: {0}")]
    Launch(#[from] LaunchError),
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
    #[error("worker failed: {0}")]
    Worker(#[from] WorkerError),
    #[error("failed to serialise output: {0}")]
    Serialise(serde_json::Error),
    #[error("failed to write output: {0}")]
    WriteOutput(io::Error),
}
