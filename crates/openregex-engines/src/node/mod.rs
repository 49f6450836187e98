//! JavaScript `RegExp` through a Node.js helper script.

use std::ffi::OsStr;
use std::path::PathBuf;

use openregex_core::flags::{self, FlagBits, FlagSpec};
use openregex_core::{CheatSheetSection, EngineError, Example, Match, RegexEngine};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::assets;
use crate::error::SetupError;
use crate::helper;
use crate::prepared;
use crate::reference;
use crate::settings::EngineSettings;
use crate::toolchain;

/// Tracing target for the JavaScript engine.
const NODE_TARGET: &str = "openregex_engines::node";

const HELPER_SCRIPT: &str = include_str!("openregex_cli.js");
const HELPER_FILE_NAME: &str = "openregex_cli.js";

pub(crate) const NODE_FLAGS: &[FlagSpec] = &[
    FlagSpec::new("IGNORECASE", flags::IGNORECASE),
    FlagSpec::new("MULTILINE", flags::MULTILINE),
    FlagSpec::new("DOTALL", flags::DOTALL),
    FlagSpec::new("UNICODE", flags::UNICODE),
];

/// `RegExp` flag letter for each advertised flag, in emission order.
const FLAG_LETTERS: &[(FlagBits, char)] = &[
    (flags::IGNORECASE, 'i'),
    (flags::MULTILINE, 'm'),
    (flags::DOTALL, 's'),
    (flags::UNICODE, 'u'),
];

/// Builds the `RegExp` flag string for `bits`; unknown bits are ignored.
fn flag_string(bits: FlagBits) -> String {
    FLAG_LETTERS
        .iter()
        .filter(|(bit, _)| bits & bit != 0)
        .map(|(_, letter)| letter)
        .collect()
}

/// Outcome of the JavaScript engine's one-time setup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeState {
    version: String,
    node: String,
    script: Result<PathBuf, String>,
}

/// Node.js `RegExp`.
#[derive(Debug)]
pub struct NodeEngine {
    version: String,
    node: String,
    script: Result<PathBuf, SetupError>,
}

impl NodeEngine {
    /// Display name of this engine.
    pub const NAME: &'static str = "JavaScript";

    /// Checks for Node.js and writes the helper script.
    #[must_use]
    pub fn new(settings: &EngineSettings) -> Self {
        Self::from_prepared(Self::prepare(settings))
    }

    /// Queries Node.js once and writes the helper script if it is usable.
    #[must_use]
    pub fn prepare(settings: &EngineSettings) -> NodeState {
        let node = settings.node_binary().to_owned();
        let check = toolchain::check_version(
            &node,
            &["--version"],
            "Node.js",
            toolchain::parse_node_version,
            "Node.js version unknown",
        );
        let script = check.available.and_then(|()| {
            info!(target: NODE_TARGET, program = %node, "Node.js found");
            assets::materialise(
                &settings.engine_dir("javascript"),
                HELPER_FILE_NAME,
                HELPER_SCRIPT,
            )
        });
        if let Err(err) = &script {
            warn!(
                target: NODE_TARGET,
                error = %err,
                "JavaScript engine setup failed"
            );
        }
        NodeState {
            version: check.version,
            node,
            script: prepared::export(script),
        }
    }

    /// Adopts prepared state without running Node.js.
    #[must_use]
    pub fn from_prepared(state: NodeState) -> Self {
        Self {
            version: state.version,
            node: state.node,
            script: prepared::adopt(state.script),
        }
    }
}

impl RegexEngine for NodeEngine {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn version(&self) -> &str {
        &self.version
    }

    fn available_flags(&self) -> &[FlagSpec] {
        NODE_FLAGS
    }

    fn cheat_sheet(&self) -> &'static [CheatSheetSection] {
        reference::JAVASCRIPT.sheet
    }

    fn example(&self) -> Option<Example> {
        Some(reference::JAVASCRIPT.example)
    }

    fn raw_match(
        &self,
        pattern: &str,
        text: &str,
        flags: FlagBits,
    ) -> Result<Vec<Match>, EngineError> {
        let script = self
            .script
            .as_ref()
            .map_err(|err| err.unavailable(Self::NAME))?;
        let letters = flag_string(flags);
        let args = [
            script.as_os_str(),
            OsStr::new(pattern),
            OsStr::new(text),
            OsStr::new(&letters),
        ];
        let output =
            toolchain::capture(&self.node, args).map_err(|err| EngineError::io(&self.node, err))?;
        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.trim().is_empty() {
            warn!(
                target: NODE_TARGET,
                stderr = %stderr.trim(),
                "Node.js helper wrote to stderr"
            );
        }
        let report = helper::parse_report(&String::from_utf8_lossy(&output.stdout), text)?;
        match report.error {
            Some(message) => Err(EngineError::pattern(message)),
            None => Ok(report.matches),
        }
    }

    fn describe_error(&self, error: &EngineError) -> String {
        match error {
            EngineError::Pattern { message } => format!("Node.js Regex Error: {message}"),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests;
