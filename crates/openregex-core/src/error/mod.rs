//! Errors raised by engines and the registry.
//!
//! Engine errors never reach callers of the coordinator as Rust errors: the
//! [`run_match`](crate::run_match) helper renders them into the
//! `MatchOutcome` error string. The variants still carry structure so adapters
//! can render them differently and tests can inspect them. I/O errors are
//! wrapped in `Arc` to keep the enum cheap to move.

use std::io;
use std::sync::Arc;

use thiserror::Error;

/// Failure of a single `raw_match` call.
#[derive(Debug, Clone, Error)]
pub enum EngineError {
    /// The engine rejected the pattern; the message is the engine's own.
    #[error("{message}")]
    Pattern {
        /// Native error text, unmodified.
        message: String,
    },

    /// The pattern compiled but matching failed at run time.
    #[error("{message}")]
    Runtime {
        /// Native error text, unmodified.
        message: String,
    },

    /// One-time setup for this engine failed, so it cannot run.
    #[error("engine '{engine}' is unavailable: {reason}")]
    Unavailable {
        /// Engine display name.
        engine: String,
        /// Why setup failed.
        reason: String,
    },

    /// An external helper wrote to its standard error stream.
    #[error("{stderr}")]
    Process {
        /// Captured standard error text.
        stderr: String,
    },

    /// An external helper or native library returned malformed data.
    #[error("invalid engine output: {message}")]
    Protocol {
        /// Description of the violation.
        message: String,
    },

    /// Spawning or talking to an external program failed.
    #[error("failed to run '{program}': {source}")]
    Io {
        /// Program that could not be run.
        program: String,
        /// Underlying I/O error.
        #[source]
        source: Arc<io::Error>,
    },

    /// The native layer returned no result at all.
    #[error("native regex call returned no result (regex too complex)")]
    NativeGiveUp,
}

impl EngineError {
    /// Convenience constructor for pattern errors.
    #[must_use]
    pub fn pattern(message: impl Into<String>) -> Self {
        Self::Pattern {
            message: message.into(),
        }
    }

    /// Convenience constructor for protocol errors.
    #[must_use]
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }

    /// Wraps an I/O error raised while running `program`.
    #[must_use]
    pub fn io(program: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            program: program.into(),
            source: Arc::new(source),
        }
    }
}

/// Failure while building the engine registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Another engine already uses this name.
    #[error("engine '{name}' is already registered")]
    Duplicate {
        /// The clashing name.
        name: String,
    },
}
