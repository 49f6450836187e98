//! Errors raised while preparing engines.
//!
//! Setup runs once, in the process that prepares an engine. Failures are
//! logged and carried with the prepared state, then reported as
//! [`EngineError::Unavailable`] on every match, so these types are `Clone`.
//! I/O errors are wrapped in `Arc` for that reason.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use openregex_core::EngineError;
use thiserror::Error;

/// One-time setup of an engine failed.
#[derive(Debug, Clone, Error)]
pub enum SetupError {
    /// Creating or writing a helper asset failed.
    #[error("failed to prepare '{}': {source}", path.display())]
    Io {
        /// Asset path being written.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: Arc<io::Error>,
    },

    /// A required external tool could not be run.
    #[error("required tool '{program}' is not available: {message}")]
    Toolchain {
        /// Program that was run.
        program: String,
        /// Why running it failed.
        message: String,
    },

    /// Compiling a helper exited unsuccessfully.
    #[error("compiling '{}' failed: {stderr}", source_path.display())]
    CompileFailed {
        /// Helper source that failed to build.
        source_path: PathBuf,
        /// Compiler diagnostics.
        stderr: String,
    },

    /// No mirror delivered a usable artifact.
    #[error("failed to download '{artifact}' from every mirror")]
    Download {
        /// File name of the artifact.
        artifact: String,
    },

    /// A mirror could not deliver an artifact.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// A downloaded artifact did not have the expected digest.
    #[error("checksum mismatch for '{url}': expected {expected}, got {actual}")]
    ChecksumMismatch {
        /// Mirror that served the artifact.
        url: String,
        /// Expected SHA-1 hex digest.
        expected: String,
        /// Digest of the received bytes.
        actual: String,
    },

    /// The built shared library could not be loaded.
    #[error("failed to load library '{}': {message}", path.display())]
    LibraryLoad {
        /// Library path.
        path: PathBuf,
        /// Loader message.
        message: String,
    },

    /// Setup failed in the process that prepared the engine.
    #[error("{reason}")]
    Inherited {
        /// The original failure, as reported by that process.
        reason: String,
    },
}

impl SetupError {
    /// Wraps an I/O error raised while preparing `path`.
    #[must_use]
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source: Arc::new(source),
        }
    }

    /// Converts the failure into the per-call error of engine `engine`.
    #[must_use]
    pub fn unavailable(&self, engine: &str) -> EngineError {
        EngineError::Unavailable {
            engine: engine.to_owned(),
            reason: self.to_string(),
        }
    }
}

/// Transport failure while fetching an artifact from one mirror.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    /// The request failed or the server answered with an error status.
    #[error("request to '{url}' failed: {message}")]
    Transport {
        /// Requested URL.
        url: String,
        /// Transport or status message.
        message: String,
    },

    /// Reading the response body failed.
    #[error("reading response from '{url}' failed: {source}")]
    Body {
        /// Requested URL.
        url: String,
        /// Underlying I/O error.
        #[source]
        source: Arc<io::Error>,
    },
}

#[cfg(test)]
mod tests;
