//! Workers as child processes of the current binary.

use std::ffi::OsString;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;
use std::process::{Child, ChildStderr, ChildStdout, Command, Stdio};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

use tracing::{debug, warn};

use super::{COORDINATOR_TARGET, LaunchError, WorkerExit, WorkerHandle, WorkerLauncher};
use crate::worker::{WorkerReport, WorkerRequest};

/// Launches workers by spawning a program with piped standard streams.
///
/// On Unix each worker leads its own process group so cancellation reaches
/// anything the engine spawned.
#[derive(Debug, Clone)]
pub struct ProcessLauncher {
    program: PathBuf,
    args: Vec<OsString>,
}

impl ProcessLauncher {
    /// Spawns `program` with `args` for every worker.
    #[must_use]
    pub fn new<I, S>(program: impl Into<PathBuf>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Re-executes the running binary with the hidden `worker` subcommand.
    ///
    /// # Errors
    ///
    /// Returns [`LaunchError::Executable`] when the binary cannot be located.
    pub fn current_exe() -> Result<Self, LaunchError> {
        let program = std::env::current_exe().map_err(|source| LaunchError::Executable {
            source: source.into(),
        })?;
        Ok(Self::new(program, ["worker"]))
    }

    fn command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            command.process_group(0);
        }
        command
    }
}

impl WorkerLauncher for ProcessLauncher {
    type Handle = ProcessWorker;

    fn launch(&self, request: &WorkerRequest) -> Result<ProcessWorker, LaunchError> {
        let mut child = self
            .command()
            .spawn()
            .map_err(|source| LaunchError::spawn(self.program.display().to_string(), source))?;
        let stdin = child.stdin.take();
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let mut worker = ProcessWorker::new(child, &request.engine);

        let (Some(mut stdin), Some(stdout), Some(stderr)) = (stdin, stdout, stderr) else {
            worker.abandon();
            return Err(LaunchError::MissingPipe {
                stream: "stdio",
            });
        };
        worker.read_report(stdout);
        worker.drain_stderr(stderr);

        if let Err(source) = request.write_jsonl(&mut stdin) {
            worker.abandon();
            return Err(LaunchError::dispatch(source));
        }
        drop(stdin);
        Ok(worker)
    }
}

/// A spawned worker process and the channel carrying its report.
#[derive(Debug)]
pub struct ProcessWorker {
    child: Child,
    engine: String,
    reports: Receiver<WorkerReport>,
    sender: Option<Sender<WorkerReport>>,
    reaped: bool,
}

impl ProcessWorker {
    fn new(child: Child, engine: &str) -> Self {
        let (sender, reports) = mpsc::channel();
        Self {
            child,
            engine: engine.to_owned(),
            reports,
            sender: Some(sender),
            reaped: false,
        }
    }

    /// Operating system process id of the worker.
    #[must_use]
    pub fn id(&self) -> u32 {
        self.child.id()
    }

    fn read_report(&mut self, stdout: ChildStdout) {
        let Some(sender) = self.sender.take() else {
            return;
        };
        let engine = self.engine.clone();
        let spawned = thread::Builder::new()
            .name(String::from("openregex-report"))
            .spawn(move || {
                let mut line = String::new();
                match BufReader::new(stdout).read_line(&mut line) {
                    Ok(0) => debug!(target: COORDINATOR_TARGET, engine = %engine, "worker stdout closed"),
                    Ok(_) => match serde_json::from_str::<WorkerReport>(line.trim()) {
                        Ok(report) => drop(sender.send(report)),
                        Err(error) => warn!(
                            target: COORDINATOR_TARGET,
                            engine = %engine,
                            %error,
                            "worker report was malformed"
                        ),
                    },
                    Err(error) => warn!(
                        target: COORDINATOR_TARGET,
                        engine = %engine,
                        %error,
                        "failed to read worker report"
                    ),
                }
            });
        if let Err(error) = spawned {
            warn!(target: COORDINATOR_TARGET, %error, "failed to start report reader");
        }
    }

    fn drain_stderr(&self, stderr: ChildStderr) {
        let engine = self.engine.clone();
        let spawned = thread::Builder::new()
            .name(String::from("openregex-stderr"))
            .spawn(move || {
                for line in BufReader::new(stderr).lines().map_while(Result::ok) {
                    if !line.trim().is_empty() {
                        debug!(target: COORDINATOR_TARGET, engine = %engine, line = %line, "worker stderr");
                    }
                }
            });
        if let Err(error) = spawned {
            warn!(target: COORDINATOR_TARGET, %error, "failed to start stderr drain");
        }
    }

    /// Kills and reaps a worker that could not be handed its request.
    fn abandon(&mut self) {
        if let Err(error) = self.kill() {
            debug!(target: COORDINATOR_TARGET, %error, "failed to kill abandoned worker");
        }
        if let Err(error) = self.wait() {
            debug!(target: COORDINATOR_TARGET, %error, "failed to reap abandoned worker");
        }
    }

    #[cfg(unix)]
    fn signal_group(&self, signal: nix::sys::signal::Signal) -> io::Result<()> {
        use nix::errno::Errno;
        use nix::sys::signal::killpg;
        use nix::unistd::Pid;

        let raw = i32::try_from(self.child.id())
            .map_err(|error| io::Error::new(io::ErrorKind::InvalidInput, error))?;
        match killpg(Pid::from_raw(raw), signal) {
            Ok(()) | Err(Errno::ESRCH) => Ok(()),
            Err(errno) => Err(io::Error::from(errno)),
        }
    }
}

impl WorkerHandle for ProcessWorker {
    fn try_wait(&mut self) -> io::Result<Option<WorkerExit>> {
        let status = self.child.try_wait()?;
        if status.is_some() {
            self.reaped = true;
        }
        Ok(status.map(WorkerExit::from))
    }

    #[cfg(unix)]
    fn terminate(&mut self) -> io::Result<()> {
        if self.reaped {
            return Ok(());
        }
        self.signal_group(nix::sys::signal::Signal::SIGTERM)
    }

    #[cfg(not(unix))]
    fn terminate(&mut self) -> io::Result<()> {
        self.kill()
    }

    #[cfg(unix)]
    fn kill(&mut self) -> io::Result<()> {
        if self.reaped {
            return Ok(());
        }
        self.signal_group(nix::sys::signal::Signal::SIGKILL)
    }

    #[cfg(not(unix))]
    fn kill(&mut self) -> io::Result<()> {
        match self.child.kill() {
            Err(error) if error.kind() != io::ErrorKind::InvalidInput => Err(error),
            _ => Ok(()),
        }
    }

    fn wait(&mut self) -> io::Result<WorkerExit> {
        let status = self.child.wait()?;
        self.reaped = true;
        Ok(WorkerExit::from(status))
    }

    fn take_report(&mut self, wait: Duration) -> Option<WorkerReport> {
        self.reports.recv_timeout(wait).ok()
    }
}

impl Drop for ProcessWorker {
    fn drop(&mut self) {
        if !self.reaped {
            self.abandon();
        }
    }
}

