//! The engines OpenRegex ships and how to construct them.

use openregex_core::flags::FlagSpec;
use openregex_core::{EngineRegistry, RegexEngine, RegistryError};
use strum::{Display, EnumIter, EnumString};

use crate::jvm::{JAVA_FLAGS, JavaEngine};
use crate::native::{CXX_FLAGS, CxxEngine};
use crate::node::{NODE_FLAGS, NodeEngine};
use crate::prepared::{PreparedEngine, PreparedEngines};
use crate::rust_regex::RUST_FLAGS;
use crate::settings::EngineSettings;

/// Every engine adapter, in catalogue order.
///
/// The string form is the engine's display name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
pub enum EngineKind {
    /// The `regex` crate.
    #[strum(serialize = "Rust - regex")]
    RustRegex,
    /// The `fancy-regex` crate.
    #[strum(serialize = "Rust - fancy-regex")]
    FancyRegex,
    /// `std::regex` via the compiled shim.
    #[strum(serialize = "C++")]
    Cxx,
    /// `java.util.regex` via the JVM helper.
    #[strum(serialize = "Java")]
    Java,
    /// `RegExp` via the Node.js helper.
    #[strum(serialize = "JavaScript")]
    JavaScript,
}

impl EngineKind {
    /// Flags the engine advertises, available without constructing it.
    #[must_use]
    pub const fn available_flags(self) -> &'static [FlagSpec] {
        match self {
            Self::RustRegex | Self::FancyRegex => RUST_FLAGS,
            Self::Cxx => CXX_FLAGS,
            Self::Java => JAVA_FLAGS,
            Self::JavaScript => NODE_FLAGS,
        }
    }

    /// Runs the engine's one-time setup and keeps the outcome.
    #[must_use]
    pub fn prepare(self, settings: &EngineSettings) -> PreparedEngine {
        match self {
            Self::RustRegex => PreparedEngine::RustRegex,
            Self::FancyRegex => PreparedEngine::FancyRegex,
            Self::Cxx => PreparedEngine::Cxx(CxxEngine::prepare(settings)),
            Self::Java => PreparedEngine::Java(JavaEngine::prepare(settings)),
            Self::JavaScript => PreparedEngine::JavaScript(NodeEngine::prepare(settings)),
        }
    }

    /// Constructs the engine, running its one-time setup.
    #[must_use]
    pub fn build(self, settings: &EngineSettings) -> Box<dyn RegexEngine> {
        self.prepare(settings).into_engine()
    }
}

/// Constructs every catalogued engine and registers it in catalogue order.
///
/// # Errors
///
/// Returns [`RegistryError::Duplicate`] if two engines report the same name.
pub fn build_registry(settings: &EngineSettings) -> Result<EngineRegistry, RegistryError> {
    PreparedEngines::prepare(settings).map(PreparedEngines::into_registry)
}
