//! Engines prepared once per process, and the state a worker adopts.
//!
//! Preparing an engine runs its one-time setup: version queries, helper
//! compilation, downloads. The outcome is a [`PreparedEngine`], which
//! serialises so a worker process can rebuild the engine without repeating
//! any of that work. Setup failures travel as their message and surface as
//! [`SetupError::Inherited`] on the adopting side.

use std::collections::HashMap;
use std::sync::Arc;

use openregex_core::{EngineRegistry, RegexEngine, RegistryError};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use tracing::info;

use crate::catalog::EngineKind;
use crate::error::SetupError;
use crate::jvm::{JavaEngine, JavaState};
use crate::native::{CxxEngine, CxxState};
use crate::node::{NodeEngine, NodeState};
use crate::rust_regex::{FancyRegexEngine, RustRegexEngine};
use crate::settings::EngineSettings;

/// Tracing target for engine preparation.
const PREPARED_TARGET: &str = "openregex_engines::prepared";

/// Converts a setup outcome into its wire form.
pub(crate) fn export<T>(outcome: Result<T, SetupError>) -> Result<T, String> {
    outcome.map_err(|err| err.to_string())
}

/// Converts a setup outcome received over the wire back into a typed one.
pub(crate) fn adopt<T>(outcome: Result<T, String>) -> Result<T, SetupError> {
    outcome.map_err(|reason| SetupError::Inherited { reason })
}

/// The result of one engine's setup, ready to be turned into an engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PreparedEngine {
    /// The `regex` crate; nothing to prepare.
    RustRegex,
    /// The `fancy-regex` crate; nothing to prepare.
    FancyRegex,
    /// The compiled `std::regex` shim.
    Cxx(CxxState),
    /// The JVM helper and its resolved flag table.
    Java(JavaState),
    /// The Node.js helper script.
    JavaScript(NodeState),
}

impl PreparedEngine {
    /// The catalogue entry this state belongs to.
    #[must_use]
    pub const fn kind(&self) -> EngineKind {
        match self {
            Self::RustRegex => EngineKind::RustRegex,
            Self::FancyRegex => EngineKind::FancyRegex,
            Self::Cxx(_) => EngineKind::Cxx,
            Self::Java(_) => EngineKind::Java,
            Self::JavaScript(_) => EngineKind::JavaScript,
        }
    }

    /// Builds the engine from this state; runs no external commands.
    #[must_use]
    pub fn into_engine(self) -> Box<dyn RegexEngine> {
        match self {
            Self::RustRegex => Box::new(RustRegexEngine::new()),
            Self::FancyRegex => Box::new(FancyRegexEngine::new()),
            Self::Cxx(state) => Box::new(CxxEngine::from_prepared(state)),
            Self::Java(state) => Box::new(JavaEngine::from_prepared(state)),
            Self::JavaScript(state) => Box::new(NodeEngine::from_prepared(state)),
        }
    }
}

/// A registry whose engines were prepared once, with the state behind each.
///
/// # Example
///
/// ```
/// use openregex_engines::{EngineKind, EngineSettings, PreparedEngines};
///
/// let settings = EngineSettings::new(std::env::temp_dir().join("openregex-doc"));
/// let engines = PreparedEngines::prepare_only(&settings, [EngineKind::RustRegex])
///     .expect("distinct names");
/// assert_eq!(engines.registry().list(), ["Rust - regex"]);
/// assert!(engines.state("Rust - regex").is_some());
/// ```
#[derive(Debug, Clone, Default)]
pub struct PreparedEngines {
    registry: EngineRegistry,
    states: HashMap<String, PreparedEngine>,
}

impl PreparedEngines {
    /// Prepares every catalogued engine, in catalogue order.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Duplicate`] if two engines report the same
    /// name.
    pub fn prepare(settings: &EngineSettings) -> Result<Self, RegistryError> {
        Self::prepare_only(settings, EngineKind::iter())
    }

    /// Prepares only `kinds`, in the order given.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Duplicate`] if a kind is listed twice.
    pub fn prepare_only<I>(settings: &EngineSettings, kinds: I) -> Result<Self, RegistryError>
    where
        I: IntoIterator<Item = EngineKind>,
    {
        Self::from_states(kinds.into_iter().map(|kind| kind.prepare(settings)))
    }

    /// Registers engines built from already prepared `states`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Duplicate`] if two states share an engine.
    pub fn from_states<I>(states: I) -> Result<Self, RegistryError>
    where
        I: IntoIterator<Item = PreparedEngine>,
    {
        let mut prepared = Self::default();
        for state in states {
            let engine: Arc<dyn RegexEngine> = Arc::from(state.clone().into_engine());
            info!(
                target: PREPARED_TARGET,
                engine = engine.name(),
                version = engine.version(),
                "engine registered"
            );
            let name = engine.name().to_owned();
            prepared.registry.register_shared(engine)?;
            prepared.states.insert(name, state);
        }
        Ok(prepared)
    }

    /// The prepared engines, keyed by display name.
    #[must_use]
    pub const fn registry(&self) -> &EngineRegistry {
        &self.registry
    }

    /// The state a worker needs to rebuild engine `name`.
    #[must_use]
    pub fn state(&self, name: &str) -> Option<&PreparedEngine> {
        self.states.get(name)
    }

    /// Discards the states, keeping the registry.
    #[must_use]
    pub fn into_registry(self) -> EngineRegistry {
        self.registry
    }
}
