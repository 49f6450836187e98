//! The isolated process that runs exactly one match call.
//!
//! The coordinator re-executes the current binary with the hidden `worker`
//! subcommand. The worker reads one [`WorkerRequest`] from stdin, rebuilds the
//! requested engine from the state the coordinator prepared, runs the match
//! on a dedicated thread, and writes one
//! [`WorkerReport`] to stdout. A `SIGTERM` that arrives first produces a
//! termination report instead; the match thread is abandoned when the process
//! exits.

pub mod protocol;
mod shutdown;

use std::any::Any;
use std::io::{self, BufRead, Write};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Instant;

use openregex_core::{MatchOutcome, RegexEngine, run_match};
use openregex_engines::PreparedEngine;
use thiserror::Error;
use tracing::debug;

pub use self::protocol::{WorkerReport, WorkerRequest};
use crate::telemetry::{self, TelemetryError};

/// Tracing target for worker processes.
pub(crate) const WORKER_TARGET: &str = "openregex::worker";

/// Builds the engine a request names; `None` when it cannot.
pub(crate) type EngineFactory = fn(&WorkerRequest) -> Option<Box<dyn RegexEngine>>;

/// Something the worker's event loop waits for.
#[derive(Debug)]
pub(crate) enum WorkerEvent {
    /// The match thread produced an outcome.
    Finished(MatchOutcome),
    /// The coordinator asked the worker to stop.
    Terminated,
}

/// Errors that stop a worker from producing a report.
#[derive(Debug, Error)]
pub enum WorkerError {
    /// The request could not be read from stdin.
    #[error("failed to read worker request: {0}")]
    ReadRequest(#[source] Arc<io::Error>),
    /// The report could not be written to stdout.
    #[error("failed to write worker report: {0}")]
    WriteReport(#[source] Arc<io::Error>),
    /// The termination listener could not be installed.
    #[error("failed to install termination listener: {0}")]
    Signals(#[source] Arc<io::Error>),
    /// Telemetry could not be configured.
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
}

/// Runs one worker round trip over `input` and `output`.
///
/// # Errors
///
/// Returns a [`WorkerError`] when the request cannot be read, the termination
/// listener cannot be installed, or the report cannot be written.
pub fn run_worker(input: &mut impl BufRead, output: &mut impl Write) -> Result<(), WorkerError> {
    let started = Instant::now();
    let request =
        WorkerRequest::read_jsonl(input).map_err(|err| WorkerError::ReadRequest(Arc::new(err)))?;
    telemetry::initialise_with(&request.log_filter, request.log_format)?;
    debug!(
        target: WORKER_TARGET,
        engine = %request.engine,
        pattern_len = request.pattern.len(),
        text_len = request.text.len(),
        "worker received request"
    );
    let (sender, events) = mpsc::channel();
    shutdown::listen(sender.clone()).map_err(|err| WorkerError::Signals(Arc::new(err)))?;
    let report = serve(request, adopt_prepared, sender, &events, started);
    report
        .write_jsonl(output)
        .map_err(|err| WorkerError::WriteReport(Arc::new(err)))
}

/// Rebuilds the requested engine from its prepared state.
///
/// The state must belong to the engine the request names; no setup runs here.
pub(crate) fn adopt_prepared(request: &WorkerRequest) -> Option<Box<dyn RegexEngine>> {
    request
        .prepared
        .as_ref()
        .filter(|state| state.kind().to_string() == request.engine)
        .cloned()
        .map(PreparedEngine::into_engine)
}

/// Runs `request` on a match thread and waits for the first event.
pub(crate) fn serve(
    request: WorkerRequest,
    factory: EngineFactory,
    sender: Sender<WorkerEvent>,
    events: &Receiver<WorkerEvent>,
    started: Instant,
) -> WorkerReport {
    let engine = request.engine.clone();
    let spawned = thread::Builder::new()
        .name(String::from("openregex-match"))
        .spawn(move || {
            let outcome = match_isolated(&request, factory);
            drop(sender.send(WorkerEvent::Finished(outcome)));
        });
    let outcome = match spawned {
        Ok(_) => match events.recv() {
            Ok(WorkerEvent::Finished(outcome)) => outcome,
            Ok(WorkerEvent::Terminated) => MatchOutcome::failure(format!(
                "Process for engine '{engine}' was terminated by signal"
            )),
            Err(_) => MatchOutcome::failure(exception_message(
                &engine,
                "match thread ended without a result",
            )),
        },
        Err(err) => MatchOutcome::failure(exception_message(&engine, &err.to_string())),
    };
    let elapsed = started.elapsed();
    debug!(
        target: WORKER_TARGET,
        engine = %engine,
        elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
        failed = outcome.is_failure(),
        "worker finished"
    );
    WorkerReport::new(outcome, elapsed)
}

/// Builds the engine and matches, turning panics into failures.
fn match_isolated(request: &WorkerRequest, factory: EngineFactory) -> MatchOutcome {
    let attempt = panic::catch_unwind(AssertUnwindSafe(|| {
        factory(request).map_or_else(
            || MatchOutcome::failure(format!("Engine '{}' not found", request.engine)),
            |engine| {
                run_match(
                    engine.as_ref(),
                    &request.pattern,
                    &request.text,
                    request.flags,
                )
            },
        )
    }));
    attempt.unwrap_or_else(|payload| {
        MatchOutcome::failure(exception_message(
            &request.engine,
            &panic_message(payload.as_ref()),
        ))
    })
}

fn exception_message(engine: &str, message: &str) -> String {
    format!("Exception in engine {engine}: {message}")
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|message| (*message).to_owned())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| String::from("unknown panic"))
}
