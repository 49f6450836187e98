//! Running external tools and reading their versions.

use std::ffi::OsStr;
use std::io;
use std::process::{Command, Output, Stdio};

use regex::Regex;
use tracing::debug;

use crate::error::SetupError;

/// Tracing target for external tool invocations.
const TOOLCHAIN_TARGET: &str = "openregex_engines::toolchain";

/// Runs `program` with `args`, capturing stdout and stderr.
///
/// Stdin is closed so helpers never wait for input.
pub(crate) fn capture<I, S>(program: &str, args: I) -> io::Result<Output>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut command = Command::new(program);
    command
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    debug!(target: TOOLCHAIN_TARGET, program, "running external tool");
    command.output()
}

/// Extracts the `X.Y.Z` version from `g++ --version` output.
pub(crate) fn parse_gxx_version(stdout: &str) -> Option<String> {
    let pattern = Regex::new(r"g\+\+.*?(\d+\.\d+\.\d+)").ok()?;
    pattern
        .captures(stdout)?
        .get(1)
        .map(|version| version.as_str().to_owned())
}

/// Extracts the quoted version from the first line of `java -version`.
pub(crate) fn parse_java_version(stderr: &str) -> Option<String> {
    stderr
        .lines()
        .next()?
        .split('"')
        .nth(1)
        .filter(|version| !version.is_empty())
        .map(str::to_owned)
}

/// Strips the leading `v` from `node --version` output.
pub(crate) fn parse_node_version(stdout: &str) -> Option<String> {
    let trimmed = stdout.trim();
    let version = trimmed.strip_prefix('v').unwrap_or(trimmed);
    (!version.is_empty()).then(|| version.to_owned())
}

/// What one run of a tool's version query revealed.
#[derive(Debug)]
pub(crate) struct VersionCheck {
    /// Display version, or the fallback when it could not be parsed.
    pub(crate) version: String,
    /// Whether the tool ran and exited successfully.
    pub(crate) available: Result<(), SetupError>,
}

/// Runs a version query once, resolving both the display version and
/// whether the tool is usable.
///
/// `parse` receives stdout and stderr concatenated; a failed parse yields
/// `fallback` without making the tool unavailable.
pub(crate) fn check_version(
    program: &str,
    args: &[&str],
    label: &str,
    parse: fn(&str) -> Option<String>,
    fallback: &str,
) -> VersionCheck {
    let output = match capture(program, args) {
        Ok(output) => output,
        Err(err) => {
            debug!(target: TOOLCHAIN_TARGET, program, error = %err, "tool not runnable");
            return VersionCheck {
                version: fallback.to_owned(),
                available: Err(SetupError::Toolchain {
                    program: program.to_owned(),
                    message: err.to_string(),
                }),
            };
        }
    };
    let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
    combined.push_str(&String::from_utf8_lossy(&output.stderr));
    let version = parse(&combined).map_or_else(
        || {
            debug!(target: TOOLCHAIN_TARGET, program, "version query failed");
            fallback.to_owned()
        },
        |version| format!("{label} - {version}"),
    );
    let available = if output.status.success() {
        Ok(())
    } else {
        Err(SetupError::Toolchain {
            program: program.to_owned(),
            message: format!(
                "exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            ),
        })
    };
    VersionCheck { version, available }
}
