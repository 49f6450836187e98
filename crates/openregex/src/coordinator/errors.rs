//! Failures that stop a worker from being dispatched.

use std::io;
use std::sync::Arc;

use thiserror::Error;

/// Errors raised while starting a worker or handing it a request.
#[derive(Debug, Clone, Error)]
pub enum LaunchError {
    /// The path of the running executable could not be determined.
    #[error("cannot locate the worker executable: {source}")]
    Executable {
        /// Underlying I/O error.
        #[source]
        source: Arc<io::Error>,
    },
    /// The worker process could not be spawned.
    #[error("failed to spawn '{program}': {source}")]
    Spawn {
        /// Program that failed to start.
        program: String,
        /// Underlying I/O error.
        #[source]
        source: Arc<io::Error>,
    },
    /// A standard stream of the worker was not captured.
    #[error("worker {stream} was not captured")]
    MissingPipe {
        /// Name of the missing stream.
        stream: &'static str,
    },
    /// The request could not be written to the worker.
    #[error("failed to send request: {source}")]
    Dispatch {
        /// Underlying I/O error.
        #[source]
        source: Arc<io::Error>,
    },
}

impl LaunchError {
    pub(crate) fn spawn(program: impl Into<String>, source: io::Error) -> Self {
        Self::Spawn {
            program: program.into(),
            source: Arc::new(source),
        }
    }

    pub(crate) fn dispatch(source: io::Error) -> Self {
        Self::Dispatch {
            source: Arc::new(source),
        }
    }
}
