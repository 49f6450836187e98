//! Scripted workers shared by the unit and behavioural tests.

use std::ffi::OsString;
use std::io;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use openregex_config::Config;
use openregex_core::Match;

use crate::config::ConfigLoader;
use crate::coordinator::{LaunchError, WorkerExit, WorkerHandle, WorkerLauncher};
use crate::errors::AppError;
use crate::worker::{WorkerReport, WorkerRequest};

/// Loader that ignores the command line and returns a fixed configuration.
pub(crate) struct StaticConfigLoader {
    config: Config,
}

impl StaticConfigLoader {
    pub(crate) const fn new(config: Config) -> Self {
        Self { config }
    }
}

impl ConfigLoader for StaticConfigLoader {
    fn load(&self, _args: &[OsString]) -> Result<Config, AppError> {
        Ok(self.config.clone())
    }
}

/// Configuration with short escalation windows and logging switched off.
///
/// External toolchains point at programs that do not exist, so preparing an
/// engine never runs or downloads anything.
pub(crate) fn quiet_config() -> Config {
    Config {
        grace_ms: 20,
        poll_interval_ms: 5,
        log_filter: String::from("off"),
        cxx_compiler: String::from("openregex-missing-compiler"),
        java_binary: String::from("openregex-missing-java"),
        javac_binary: String::from("openregex-missing-javac"),
        node_binary: String::from("openregex-missing-node"),
        ..Config::default()
    }
}

/// Splits a command line on whitespace, dropping surrounding quotes.
pub(crate) fn build_args(command: &str) -> Vec<OsString> {
    std::iter::once(OsString::from("openregex"))
        .chain(
            command
                .trim()
                .trim_matches('"')
                .split_whitespace()
                .map(OsString::from),
        )
        .collect()
}

/// What a scripted worker does once launched.
#[derive(Debug, Clone)]
pub(crate) enum Script {
    /// Exits after the delay, optionally leaving a report behind.
    Finishes {
        after: Duration,
        report: Option<WorkerReport>,
    },
    /// Runs until stopped; exits on `terminate` only when cooperative.
    Hangs { cooperative: bool },
    /// Never starts.
    FailsToLaunch,
}

/// Builds a report as a worker would send it.
pub(crate) fn report(matches: Vec<Match>, error: &str) -> WorkerReport {
    WorkerReport {
        matches,
        error: error.to_owned(),
        elapsed_seconds: 0.001,
    }
}

#[derive(Debug, Clone, Default)]
struct Journal(Arc<Mutex<Vec<&'static str>>>);

impl Journal {
    fn record(&self, event: &'static str) {
        self.0.lock().expect("lock journal").push(event);
    }

    fn events(&self) -> Vec<&'static str> {
        self.0.lock().expect("lock journal").clone()
    }
}

/// Launcher whose workers follow a [`Script`] and record what was done to
/// them. Clones share the record.
#[derive(Debug, Clone)]
pub(crate) struct ScriptedLauncher {
    script: Script,
    journal: Journal,
    requests: Arc<Mutex<Vec<WorkerRequest>>>,
}

impl ScriptedLauncher {
    pub(crate) fn new(script: Script) -> Self {
        Self {
            script,
            journal: Journal::default(),
            requests: Arc::default(),
        }
    }

    /// Launches, signals, kills, and waits, in order.
    pub(crate) fn events(&self) -> Vec<&'static str> {
        self.journal.events()
    }

    /// Every request handed to a worker.
    pub(crate) fn requests(&self) -> Vec<WorkerRequest> {
        self.requests.lock().expect("lock requests").clone()
    }
}

impl WorkerLauncher for ScriptedLauncher {
    type Handle = ScriptedWorker;

    fn launch(&self, request: &WorkerRequest) -> Result<ScriptedWorker, LaunchError> {
        self.requests
            .lock()
            .expect("lock requests")
            .push(request.clone());
        self.journal.record("launch");
        if matches!(self.script, Script::FailsToLaunch) {
            return Err(LaunchError::spawn(
                "scripted",
                io::Error::new(io::ErrorKind::NotFound, "no such program"),
            ));
        }
        Ok(ScriptedWorker {
            script: self.script.clone(),
            started: Instant::now(),
            exited: None,
            journal: self.journal.clone(),
        })
    }
}

/// A worker following a [`Script`].
#[derive(Debug)]
pub(crate) struct ScriptedWorker {
    script: Script,
    started: Instant,
    exited: Option<WorkerExit>,
    journal: Journal,
}

impl WorkerHandle for ScriptedWorker {
    fn try_wait(&mut self) -> io::Result<Option<WorkerExit>> {
        if let Script::Finishes { after, .. } = &self.script {
            if self.started.elapsed() >= *after {
                self.exited = Some(WorkerExit::exited(0));
            }
        }
        Ok(self.exited)
    }

    fn terminate(&mut self) -> io::Result<()> {
        self.journal.record("terminate");
        if matches!(self.script, Script::Hangs { cooperative: true }) {
            self.exited = Some(WorkerExit::exited(0));
        }
        Ok(())
    }

    fn kill(&mut self) -> io::Result<()> {
        self.journal.record("kill");
        self.exited = Some(WorkerExit::signalled());
        Ok(())
    }

    fn wait(&mut self) -> io::Result<WorkerExit> {
        self.journal.record("wait");
        Ok(self.exited.unwrap_or_else(WorkerExit::signalled))
    }

    fn take_report(&mut self, _wait: Duration) -> Option<WorkerReport> {
        match &mut self.script {
            Script::Finishes { report, .. } => report.take(),
            Script::Hangs { .. } | Script::FailsToLaunch => None,
        }
    }
}
