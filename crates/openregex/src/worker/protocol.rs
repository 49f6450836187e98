//! JSONL messages exchanged between the coordinator and a worker.
//!
//! The coordinator writes one [`WorkerRequest`] line to the worker's stdin;
//! the worker answers with one [`WorkerReport`] line on stdout.

use std::io::{self, BufRead, Write};
use std::time::Duration;

use openregex_config::LogFormat;
use openregex_core::{FlagBits, Match, MatchOutcome};
use openregex_engines::PreparedEngine;
use serde::{Deserialize, Serialize};

/// One match call to run in isolation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerRequest {
    /// Display name of the engine to run.
    pub engine: String,
    /// Pattern to compile.
    pub pattern: String,
    /// Text to search.
    pub text: String,
    /// Advertised flag bits.
    pub flags: FlagBits,
    /// The engine's setup outcome, prepared once by the coordinator.
    ///
    /// `None` when the coordinator knows no such engine.
    #[serde(default)]
    pub prepared: Option<PreparedEngine>,
    /// Log filter for the worker's own telemetry.
    pub log_filter: String,
    /// Log format for the worker's own telemetry.
    pub log_format: LogFormat,
}

impl WorkerRequest {
    /// Serialises the request as one line and flushes `writer`.
    ///
    /// # Errors
    ///
    /// Returns an error when serialisation or the write fails.
    pub fn write_jsonl(&self, writer: &mut impl Write) -> io::Result<()> {
        serde_json::to_writer(&mut *writer, self)?;
        writer.write_all(b"\n")?;
        writer.flush()
    }

    /// Reads one request line from `reader`.
    ///
    /// # Errors
    ///
    /// Returns an error when the read fails, the stream is empty, or the line
    /// is not a valid request.
    pub fn read_jsonl(reader: &mut impl BufRead) -> io::Result<Self> {
        let mut line = String::new();
        if reader.read_line(&mut line)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "no request received",
            ));
        }
        serde_json::from_str(line.trim()).map_err(io::Error::from)
    }
}

/// A worker's answer: the match outcome and the engine-only duration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerReport {
    /// Matches in leftmost-first order.
    #[serde(default)]
    pub matches: Vec<Match>,
    /// Error message; empty on success.
    #[serde(default)]
    pub error: String,
    /// Seconds the worker spent between receiving the request and reporting.
    pub elapsed_seconds: f64,
}

impl WorkerReport {
    /// Builds a report from an outcome and the worker-side duration.
    #[must_use]
    pub fn new(outcome: MatchOutcome, elapsed: Duration) -> Self {
        let (matches, error) = outcome.into_parts();
        Self {
            matches,
            error,
            elapsed_seconds: elapsed.as_secs_f64(),
        }
    }

    /// The report as a match outcome.
    #[must_use]
    pub fn into_outcome(self) -> MatchOutcome {
        MatchOutcome::from_parts(self.matches, self.error)
    }

    /// Serialises the report as one line and flushes `writer`.
    ///
    /// # Errors
    ///
    /// Returns an error when serialisation or the write fails.
    pub fn write_jsonl(&self, writer: &mut impl Write) -> io::Result<()> {
        serde_json::to_writer(&mut *writer, self)?;
        writer.write_all(b"\n")?;
        writer.flush()
    }
}
