//! Deadline-enforced execution of one match call in an isolated worker.
//!
//! Every call gets a fresh worker: the coordinator launches it, hands over the
//! request together with the engine state prepared when the coordinator was
//! built, and polls until the worker exits or the deadline passes. A late
//! worker is asked to stop, given a grace window, then killed, and is always
//! reaped before [`Coordinator::execute`] returns. The caller's thread is the
//! only one that blocks.

mod errors;
mod process;

use std::io;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use openregex_config::{Config, LogFormat};
use openregex_core::{EngineRegistry, ExecutionResult, FlagBits, MatchOutcome, Termination};
use openregex_engines::{EngineSettings, PreparedEngines};
use tracing::{debug, info, warn};

pub use self::errors::LaunchError;
pub use self::process::{ProcessLauncher, ProcessWorker};
use crate::worker::{WorkerReport, WorkerRequest};

/// Tracing target for coordinator events.
pub(crate) const COORDINATOR_TARGET: &str = "openregex::coordinator";

/// Error text used when a worker exits without reporting.
pub const NO_RESULT_MESSAGE: &str = "No result returned from engine";

/// How long to wait for a report line once the worker has exited.
const REPORT_DRAIN: Duration = Duration::from_millis(500);

/// How a worker process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerExit {
    code: Option<i32>,
}

impl WorkerExit {
    /// A worker that exited with `code`.
    #[must_use]
    pub const fn exited(code: i32) -> Self {
        Self { code: Some(code) }
    }

    /// A worker that was ended by a signal.
    #[must_use]
    pub const fn signalled() -> Self {
        Self { code: None }
    }

    /// Exit code, or `None` when a signal ended the worker.
    #[must_use]
    pub const fn code(&self) -> Option<i32> {
        self.code
    }
}

impl From<std::process::ExitStatus> for WorkerExit {
    fn from(status: std::process::ExitStatus) -> Self {
        Self {
            code: status.code(),
        }
    }
}

/// A running worker as seen by the coordinator.
pub trait WorkerHandle {
    /// Returns the exit state if the worker has finished, without blocking.
    ///
    /// # Errors
    ///
    /// Returns an error when the worker's state cannot be queried.
    fn try_wait(&mut self) -> io::Result<Option<WorkerExit>>;

    /// Asks the worker to stop cooperatively.
    ///
    /// # Errors
    ///
    /// Returns an error when the request cannot be delivered.
    fn terminate(&mut self) -> io::Result<()>;

    /// Stops the worker without cooperation.
    ///
    /// # Errors
    ///
    /// Returns an error when the worker cannot be killed.
    fn kill(&mut self) -> io::Result<()>;

    /// Blocks until the worker has exited and been reaped.
    ///
    /// # Errors
    ///
    /// Returns an error when waiting fails.
    fn wait(&mut self) -> io::Result<WorkerExit>;

    /// Returns the worker's report, waiting up to `wait` for it to arrive.
    fn take_report(&mut self, wait: Duration) -> Option<WorkerReport>;
}

/// Starts workers and hands them their request.
pub trait WorkerLauncher: Send + Sync {
    /// The handle type for launched workers.
    type Handle: WorkerHandle;

    /// Launches a worker for `request`.
    ///
    /// # Errors
    ///
    /// Returns a [`LaunchError`] when the worker cannot be started or cannot
    /// receive the request.
    fn launch(&self, request: &WorkerRequest) -> Result<Self::Handle, LaunchError>;
}

/// Timing and forwarding settings for a [`Coordinator`].
#[derive(Debug, Clone, PartialEq)]
pub struct CoordinatorSettings {
    /// Default per-call deadline.
    pub timeout: Duration,
    /// Window between asking a worker to stop and killing it.
    pub grace: Duration,
    /// Interval between liveness checks.
    pub poll_interval: Duration,
    /// Log filter forwarded to every worker.
    pub log_filter: String,
    /// Log format forwarded to every worker.
    pub log_format: LogFormat,
}

impl CoordinatorSettings {
    /// Derives settings from the resolved configuration.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            timeout: config.timeout(),
            grace: config.grace(),
            poll_interval: config.poll_interval(),
            log_filter: config.log_filter().to_owned(),
            log_format: config.log_format(),
        }
    }
}

impl Default for CoordinatorSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Engine settings described by `config`.
#[must_use]
pub fn engine_settings(config: &Config) -> EngineSettings {
    EngineSettings::new(config.assets_dir().as_std_path())
        .with_cxx_compiler(config.cxx_compiler.as_str())
        .with_java(config.java_binary.as_str(), config.javac_binary.as_str())
        .with_node_binary(config.node_binary.as_str())
}

/// Runs match calls in isolated workers under a deadline.
///
/// # Example
///
/// Engines are prepared once, before the coordinator is built; every worker
/// adopts the prepared state instead of repeating setup inside the deadline.
///
/// ```no_run
/// use std::sync::Arc;
///
/// use openregex::{Coordinator, CoordinatorSettings};
/// use openregex_engines::{EngineKind, EngineSettings, PreparedEngines};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let engines = PreparedEngines::prepare_only(
///     &EngineSettings::default(),
///     [EngineKind::RustRegex],
/// )?;
/// let coordinator = Coordinator::new(CoordinatorSettings::default(), Arc::new(engines))?;
/// let result = coordinator.execute_default("Rust - regex", r"\d+", "a1b22", 0);
/// assert_eq!(result.matches().len(), 2);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Coordinator<L = ProcessLauncher> {
    launcher: L,
    settings: CoordinatorSettings,
    engines: Arc<PreparedEngines>,
}

impl Coordinator<ProcessLauncher> {
    /// Creates a coordinator that re-executes the current binary as its worker.
    ///
    /// # Errors
    ///
    /// Returns a [`LaunchError`] when the current executable cannot be found.
    pub fn new(
        settings: CoordinatorSettings,
        engines: Arc<PreparedEngines>,
    ) -> Result<Self, LaunchError> {
        Ok(Self::with_launcher(
            ProcessLauncher::current_exe()?,
            settings,
            engines,
        ))
    }
}

impl<L: WorkerLauncher> Coordinator<L> {
    /// Creates a coordinator that starts workers with `launcher` and hands
    /// them the state in `engines`.
    #[must_use]
    pub const fn with_launcher(
        launcher: L,
        settings: CoordinatorSettings,
        engines: Arc<PreparedEngines>,
    ) -> Self {
        Self {
            launcher,
            settings,
            engines,
        }
    }

    /// The engines this coordinator prepared, keyed by display name.
    #[must_use]
    pub fn registry(&self) -> &EngineRegistry {
        self.engines.registry()
    }

    /// Whether `engine` names a prepared engine.
    ///
    /// Unknown names are still dispatched; the worker reports them.
    #[must_use]
    pub fn knows(&self, engine: &str) -> bool {
        self.registry().contains(engine)
    }

    /// The coordinator's settings.
    #[must_use]
    pub const fn settings(&self) -> &CoordinatorSettings {
        &self.settings
    }

    /// Runs one match call under the configured default deadline.
    #[must_use]
    pub fn execute_default(
        &self,
        engine: &str,
        pattern: &str,
        text: &str,
        flags: FlagBits,
    ) -> ExecutionResult {
        self.execute(engine, pattern, text, flags, self.settings.timeout)
    }

    /// Runs one match call in a fresh worker, enforcing `deadline`.
    ///
    /// The returned duration covers dispatch to completion. Unknown engine
    /// names are dispatched anyway; the worker reports them.
    #[must_use]
    pub fn execute(
        &self,
        engine: &str,
        pattern: &str,
        text: &str,
        flags: FlagBits,
        deadline: Duration,
    ) -> ExecutionResult {
        let prepared = self.engines.state(engine).cloned();
        if prepared.is_none() {
            debug!(
                target: COORDINATOR_TARGET,
                engine,
                "engine not registered; the worker will report it"
            );
        }
        let request = WorkerRequest {
            engine: engine.to_owned(),
            pattern: pattern.to_owned(),
            text: text.to_owned(),
            flags,
            prepared,
            log_filter: self.settings.log_filter.clone(),
            log_format: self.settings.log_format,
        };

        let dispatched = Instant::now();
        let mut worker = match self.launcher.launch(&request) {
            Ok(worker) => worker,
            Err(error) => {
                warn!(target: COORDINATOR_TARGET, engine, %error, "worker launch failed");
                return ExecutionResult::new(
                    MatchOutcome::failure(format!(
                        "Failed to start worker for engine '{engine}': {error}"
                    )),
                    dispatched.elapsed(),
                    Termination::Crashed,
                );
            }
        };
        debug!(target: COORDINATOR_TARGET, engine, "worker dispatched");

        loop {
            match worker.try_wait() {
                Ok(Some(exit)) => return self.collect(&mut worker, engine, exit, dispatched),
                Ok(None) => {}
                Err(error) => {
                    warn!(target: COORDINATOR_TARGET, engine, %error, "worker state unavailable");
                    self.escalate(&mut worker, engine);
                    return ExecutionResult::new(
                        MatchOutcome::failure(NO_RESULT_MESSAGE),
                        dispatched.elapsed(),
                        Termination::Crashed,
                    );
                }
            }

            let elapsed = dispatched.elapsed();
            if elapsed >= deadline {
                info!(
                    target: COORDINATOR_TARGET,
                    engine,
                    deadline_seconds = deadline.as_secs_f64(),
                    "deadline exceeded; cancelling worker"
                );
                self.escalate(&mut worker, engine);
                return ExecutionResult::new(
                    MatchOutcome::failure(timeout_message(deadline)),
                    elapsed,
                    Termination::TimedOut,
                );
            }
            thread::sleep(
                self.settings
                    .poll_interval
                    .min(deadline.saturating_sub(elapsed)),
            );
        }
    }

    fn collect(
        &self,
        worker: &mut L::Handle,
        engine: &str,
        exit: WorkerExit,
        dispatched: Instant,
    ) -> ExecutionResult {
        let elapsed = dispatched.elapsed();
        match worker.take_report(REPORT_DRAIN) {
            Some(report) => {
                debug!(
                    target: COORDINATOR_TARGET,
                    engine,
                    worker_elapsed_seconds = report.elapsed_seconds,
                    exit_code = exit.code(),
                    "worker reported"
                );
                ExecutionResult::new(report.into_outcome(), elapsed, Termination::Completed)
            }
            None => {
                warn!(
                    target: COORDINATOR_TARGET,
                    engine,
                    exit_code = exit.code(),
                    "worker exited without a report"
                );
                ExecutionResult::new(
                    MatchOutcome::failure(NO_RESULT_MESSAGE),
                    elapsed,
                    Termination::Crashed,
                )
            }
        }
    }

    /// Terminates, waits out the grace window, kills, and reaps `worker`.
    fn escalate(&self, worker: &mut L::Handle, engine: &str) {
        if let Err(error) = worker.terminate() {
            debug!(target: COORDINATOR_TARGET, engine, %error, "termination request failed");
        }
        let grace_started = Instant::now();
        loop {
            let waited = grace_started.elapsed();
            match worker.try_wait() {
                Ok(Some(exit)) => {
                    debug!(
                        target: COORDINATOR_TARGET,
                        engine,
                        exit_code = exit.code(),
                        "worker stopped within the grace window"
                    );
                    return;
                }
                Ok(None) if waited < self.settings.grace => thread::sleep(
                    self.settings
                        .poll_interval
                        .min(self.settings.grace.saturating_sub(waited)),
                ),
                Ok(None) | Err(_) => break,
            }
        }

        warn!(target: COORDINATOR_TARGET, engine, "worker ignored termination; killing");
        if let Err(error) = worker.kill() {
            warn!(target: COORDINATOR_TARGET, engine, %error, "kill failed");
        }
        match worker.wait() {
            Ok(exit) => debug!(
                target: COORDINATOR_TARGET,
                engine,
                exit_code = exit.code(),
                "worker reaped"
            ),
            Err(error) => warn!(target: COORDINATOR_TARGET, engine, %error, "reaping failed"),
        }
    }
}

/// Error text for a call cancelled at `deadline`.
///
/// Whole seconds print without a fraction.
#[must_use]
pub fn timeout_message(deadline: Duration) -> String {
    let seconds = if deadline.subsec_nanos() == 0 {
        deadline.as_secs().to_string()
    } else {
        deadline.as_secs_f64().to_string()
    };
    format!("Timeout exceeded: {seconds} seconds")
}

#[cfg(test)]
mod tests;
