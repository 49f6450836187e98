//! Forwarding termination requests to the worker's event loop.

use std::io;
use std::sync::mpsc::Sender;

use tracing::info;

use super::{WORKER_TARGET, WorkerEvent};

/// Starts a thread that sends [`WorkerEvent::Terminated`] on `SIGTERM`.
///
/// # Errors
///
/// Returns an error when the signal handler or the thread cannot be set up.
#[cfg(unix)]
pub(super) fn listen(events: Sender<WorkerEvent>) -> io::Result<()> {
    use signal_hook::consts::signal::SIGTERM;
    use signal_hook::iterator::Signals;
    use std::thread;

    let mut signals = Signals::new([SIGTERM])?;
    thread::Builder::new()
        .name(String::from("openregex-shutdown"))
        .spawn(move || {
            if let Some(signal) = signals.forever().next() {
                info!(target: WORKER_TARGET, signal, "termination signal received");
                drop(events.send(WorkerEvent::Terminated));
            }
        })?;
    Ok(())
}

/// Platforms without POSIX signals are only ever killed outright.
#[cfg(not(unix))]
pub(super) fn listen(events: Sender<WorkerEvent>) -> io::Result<()> {
    drop(events);
    info!(target: WORKER_TARGET, "termination signals unsupported on this platform");
    Ok(())
}
