//! Built-in configuration values.

use std::env;
use std::time::Duration;

use camino::Utf8PathBuf;

use crate::logging::LogFormat;

/// Default per-call deadline, in seconds.
pub const DEFAULT_TIMEOUT_SECS: f64 = 5.0;

/// Default window between asking a worker to stop and killing it.
pub const DEFAULT_GRACE_MS: u64 = 1_000;

/// Default interval between worker liveness checks.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

/// Default listen port for the web front end.
pub const DEFAULT_PORT: u16 = 5_000;

/// Default log filter expression used by the binaries.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Default C++ compiler for the native shim.
pub const DEFAULT_CXX_COMPILER: &str = "g++";

/// Default Java launcher.
pub const DEFAULT_JAVA_BINARY: &str = "java";

/// Default Java compiler.
pub const DEFAULT_JAVAC_BINARY: &str = "javac";

/// Default Node.js runtime.
pub const DEFAULT_NODE_BINARY: &str = "node";

/// Default log filter expression used by the binaries.
#[must_use]
pub const fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value used where allocation is required (e.g. serde).
#[must_use]
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default logging format for the binaries.
#[must_use]
pub const fn default_log_format() -> LogFormat {
    LogFormat::Json
}

/// Default per-call deadline.
#[must_use]
pub const fn default_timeout() -> Duration {
    Duration::from_secs(5)
}

/// Directory where engine helpers are built and downloaded.
///
/// Uses the user cache directory when one exists and is valid UTF-8, and the
/// system temporary directory otherwise.
#[must_use]
pub fn default_assets_dir() -> Utf8PathBuf {
    let base = dirs::cache_dir()
        .and_then(|path| Utf8PathBuf::from_path_buf(path).ok())
        .or_else(|| Utf8PathBuf::from_path_buf(env::temp_dir()).ok())
        .unwrap_or_else(|| Utf8PathBuf::from("/tmp"));
    base.join("openregex")
}
