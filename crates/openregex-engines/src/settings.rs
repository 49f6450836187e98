//! Tool locations and asset directory used by the engine adapters.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Default C++ compiler for the native shim.
pub const DEFAULT_CXX_COMPILER: &str = "g++";
/// Default Java launcher.
pub const DEFAULT_JAVA_BINARY: &str = "java";
/// Default Java compiler.
pub const DEFAULT_JAVAC_BINARY: &str = "javac";
/// Default Node.js runtime.
pub const DEFAULT_NODE_BINARY: &str = "node";

/// Where helpers are built and which external tools run them.
///
/// Settings travel inside each worker request so the worker builds its engine
/// exactly as the coordinator's process was configured.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineSettings {
    assets_dir: PathBuf,
    cxx_compiler: String,
    java_binary: String,
    javac_binary: String,
    node_binary: String,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self::new(default_assets_dir())
    }
}

impl EngineSettings {
    /// Creates settings rooted at `assets_dir` with the default tool names.
    #[must_use]
    pub fn new(assets_dir: impl Into<PathBuf>) -> Self {
        Self {
            assets_dir: assets_dir.into(),
            cxx_compiler: DEFAULT_CXX_COMPILER.to_owned(),
            java_binary: DEFAULT_JAVA_BINARY.to_owned(),
            javac_binary: DEFAULT_JAVAC_BINARY.to_owned(),
            node_binary: DEFAULT_NODE_BINARY.to_owned(),
        }
    }

    /// Overrides the C++ compiler.
    #[must_use]
    pub fn with_cxx_compiler(mut self, program: impl Into<String>) -> Self {
        self.cxx_compiler = program.into();
        self
    }

    /// Overrides the Java launcher and compiler.
    #[must_use]
    pub fn with_java(mut self, java: impl Into<String>, javac: impl Into<String>) -> Self {
        self.java_binary = java.into();
        self.javac_binary = javac.into();
        self
    }

    /// Overrides the Node.js runtime.
    #[must_use]
    pub fn with_node_binary(mut self, program: impl Into<String>) -> Self {
        self.node_binary = program.into();
        self
    }

    /// Root directory for materialised helpers and downloads.
    #[must_use]
    pub fn assets_dir(&self) -> &Path {
        &self.assets_dir
    }

    /// Per-engine subdirectory of the assets directory.
    #[must_use]
    pub fn engine_dir(&self, engine: &str) -> PathBuf {
        self.assets_dir.join(engine)
    }

    /// C++ compiler program.
    #[must_use]
    pub fn cxx_compiler(&self) -> &str {
        &self.cxx_compiler
    }

    /// Java launcher program.
    #[must_use]
    pub fn java_binary(&self) -> &str {
        &self.java_binary
    }

    /// Java compiler program.
    #[must_use]
    pub fn javac_binary(&self) -> &str {
        &self.javac_binary
    }

    /// Node.js runtime program.
    #[must_use]
    pub fn node_binary(&self) -> &str {
        &self.node_binary
    }
}

/// Platform cache directory for helper assets, falling back to the system
/// temporary directory.
#[must_use]
pub fn default_assets_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("openregex")
}
