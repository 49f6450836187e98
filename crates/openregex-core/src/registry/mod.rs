//! Start-up registry of regex engines.
//!
//! The [`EngineRegistry`] maps display names to engine instances and keeps
//! registration order, which is the order engines are presented to users.
//! Duplicate names are rejected. The registry is populated once and then
//! shared read-only.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::engine::{EngineDescriptor, RegexEngine};
use crate::error::RegistryError;

/// Registry of available engines, in registration order.
///
/// # Example
///
/// ```
/// use openregex_core::{EngineError, EngineRegistry, Match, RegexEngine};
///
/// struct Named(&'static str);
///
/// impl RegexEngine for Named {
///     fn name(&self) -> &str { self.0 }
///     fn version(&self) -> &str { "0" }
///     fn raw_match(&self, _: &str, _: &str, _: u32) -> Result<Vec<Match>, EngineError> {
///         Ok(Vec::new())
///     }
/// }
///
/// let mut registry = EngineRegistry::new();
/// registry.register(Named("first")).expect("registration succeeds");
/// registry.register(Named("second")).expect("registration succeeds");
/// assert!(registry.register(Named("first")).is_err());
/// assert_eq!(registry.names().collect::<Vec<_>>(), ["first", "second"]);
/// assert!(registry.get("third").is_none());
/// ```
#[derive(Clone, Default)]
pub struct EngineRegistry {
    engines: Vec<Arc<dyn RegexEngine>>,
    index: HashMap<String, usize>,
}

impl EngineRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an engine under its display name.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Duplicate`] if an engine with the same name is
    /// already registered.
    pub fn register(&mut self, engine: impl RegexEngine + 'static) -> Result<(), RegistryError> {
        self.register_shared(Arc::new(engine))
    }

    /// Registers an already shared engine.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Duplicate`] if an engine with the same name is
    /// already registered.
    pub fn register_shared(&mut self, engine: Arc<dyn RegexEngine>) -> Result<(), RegistryError> {
        let name = engine.name().to_owned();
        if self.index.contains_key(&name) {
            return Err(RegistryError::Duplicate { name });
        }
        self.index.insert(name, self.engines.len());
        self.engines.push(engine);
        Ok(())
    }

    /// Looks up an engine by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&dyn RegexEngine> {
        self.lookup(name).map(|engine| &**engine)
    }

    /// Looks up an engine by name, returning the shared handle.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&Arc<dyn RegexEngine>> {
        self.index
            .get(name)
            .and_then(|position| self.engines.get(*position))
    }

    /// Returns `true` when an engine with this name is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Engine names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.engines.iter().map(|engine| engine.name())
    }

    /// Engine names in registration order, collected.
    #[must_use]
    pub fn list(&self) -> Vec<String> {
        self.names().map(str::to_owned).collect()
    }

    /// Engines in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn RegexEngine> {
        self.engines.iter().map(|engine| &**engine)
    }

    /// Descriptors for every engine, in registration order.
    #[must_use]
    pub fn descriptors(&self) -> Vec<EngineDescriptor> {
        self.iter().map(RegexEngine::descriptor).collect()
    }

    /// Descriptor of one engine, if registered.
    #[must_use]
    pub fn describe(&self, name: &str) -> Option<EngineDescriptor> {
        self.get(name).map(RegexEngine::descriptor)
    }

    /// Returns the number of registered engines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.engines.len()
    }

    /// Returns `true` when no engines are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.engines.is_empty()
    }
}

impl fmt::Debug for EngineRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineRegistry")
            .field("engines", &self.list())
            .finish()
    }
}
