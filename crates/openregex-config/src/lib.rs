//! Shared configuration for the OpenRegex binary and its workers.
//!
//! Values are layered by `ortho_config`: built-in defaults, then
//! configuration files (`--config-path` or `OPENREGEX_CONFIG_PATH`), then
//! `OPENREGEX_*` environment variables, then command-line flags. The
//! configuration is read once at start-up.

mod defaults;
mod logging;

use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

pub use self::defaults::{
    DEFAULT_CXX_COMPILER, DEFAULT_GRACE_MS, DEFAULT_JAVA_BINARY, DEFAULT_JAVAC_BINARY,
    DEFAULT_LOG_FILTER, DEFAULT_NODE_BINARY, DEFAULT_POLL_INTERVAL_MS, DEFAULT_PORT,
    DEFAULT_TIMEOUT_SECS, default_assets_dir, default_log_filter, default_log_filter_string,
    default_log_format, default_timeout,
};
pub use self::logging::{LogFormat, LogFormatParseError};

/// Runtime configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "OPENREGEX")]
pub struct Config {
    /// Per-call deadline in seconds.
    #[ortho_config(default = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: f64,
    /// Milliseconds between asking a worker to stop and killing it.
    #[ortho_config(default = DEFAULT_GRACE_MS)]
    pub grace_ms: u64,
    /// Milliseconds between worker liveness checks.
    #[ortho_config(default = DEFAULT_POLL_INTERVAL_MS)]
    pub poll_interval_ms: u64,
    /// Listen port for the web front end.
    #[ortho_config(default = DEFAULT_PORT)]
    pub port: u16,
    /// `tracing` filter expression.
    #[ortho_config(default = default_log_filter_string())]
    pub log_filter: String,
    /// Log output format.
    #[ortho_config(default = default_log_format())]
    pub log_format: LogFormat,
    /// Directory where engine helpers are built and downloaded.
    #[ortho_config(default = default_assets_dir())]
    pub assets_dir: Utf8PathBuf,
    /// C++ compiler for the native shim.
    #[ortho_config(default = DEFAULT_CXX_COMPILER.to_owned())]
    pub cxx_compiler: String,
    /// Java launcher.
    #[ortho_config(default = DEFAULT_JAVA_BINARY.to_owned())]
    pub java_binary: String,
    /// Java compiler.
    #[ortho_config(default = DEFAULT_JAVAC_BINARY.to_owned())]
    pub javac_binary: String,
    /// Node.js runtime.
    #[ortho_config(default = DEFAULT_NODE_BINARY.to_owned())]
    pub node_binary: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            grace_ms: DEFAULT_GRACE_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            port: DEFAULT_PORT,
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
            assets_dir: default_assets_dir(),
            cxx_compiler: DEFAULT_CXX_COMPILER.to_owned(),
            java_binary: DEFAULT_JAVA_BINARY.to_owned(),
            javac_binary: DEFAULT_JAVAC_BINARY.to_owned(),
            node_binary: DEFAULT_NODE_BINARY.to_owned(),
        }
    }
}

impl Config {
    /// Per-call deadline.
    ///
    /// Values that are not a positive, finite number of seconds fall back to
    /// [`default_timeout`].
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::try_from_secs_f64(self.timeout_secs)
            .ok()
            .filter(|timeout| !timeout.is_zero())
            .unwrap_or_else(default_timeout)
    }

    /// Window between asking a worker to stop and killing it.
    #[must_use]
    pub const fn grace(&self) -> Duration {
        Duration::from_millis(self.grace_ms)
    }

    /// Interval between worker liveness checks; never shorter than 1 ms.
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    /// Listen port for the web front end.
    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }

    /// Log filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Log output format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Directory where engine helpers are built and downloaded.
    #[must_use]
    pub fn assets_dir(&self) -> &Utf8Path {
        &self.assets_dir
    }
}
