//! Handler registry and host constraint table
//!
//! The registry is an explicit value built by the caller before a run and
//! passed to [`ProvisionService`](crate::service::ProvisionService). Lookup
//! is by exact definition type: a handler registered for one type never
//! serves another, however the two are related.

use crate::definition::{Definition, DefinitionType};
use crate::error::{Error, Result};
use crate::handler::ModelHandler;
use std::collections::HashMap;
use std::fmt;

/// Allowed parent and root definition types for one definition type
///
/// An empty list places no constraint on that side.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostConstraints {
    pub parents: Vec<DefinitionType>,
    pub roots: Vec<DefinitionType>,
}

impl HostConstraints {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allow `T` as a direct parent
    #[must_use]
    pub fn parent<T: Definition>(mut self) -> Self {
        self.parents.push(DefinitionType::of::<T>());
        self
    }

    /// Allow `T` as the tree root
    #[must_use]
    pub fn root<T: Definition>(mut self) -> Self {
        self.roots.push(DefinitionType::of::<T>());
        self
    }

    pub fn allows_parent(&self, parent: DefinitionType) -> bool {
        self.parents.is_empty() || self.parents.contains(&parent)
    }

    pub fn allows_root(&self, root: DefinitionType) -> bool {
        self.roots.is_empty() || self.roots.contains(&root)
    }

    /// Check placement of `definition_type` under `parent` in a tree rooted
    /// at `root`
    ///
    /// A side that is `None` is unknown and not checked.
    pub fn check(
        &self,
        definition_type: DefinitionType,
        parent: Option<DefinitionType>,
        root: Option<DefinitionType>,
    ) -> Result<()> {
        if let Some(parent) = parent
            && !self.allows_parent(parent)
        {
            return Err(Error::HostConstraint {
                definition_type: definition_type.name(),
                actual: parent.name(),
                expected: join_names(&self.parents),
            });
        }
        if let Some(root) = root
            && !self.allows_root(root)
        {
            return Err(Error::HostConstraint {
                definition_type: definition_type.name(),
                actual: root.name(),
                expected: format!("root {}", join_names(&self.roots)),
            });
        }
        Ok(())
    }
}

fn join_names(types: &[DefinitionType]) -> String {
    types
        .iter()
        .map(DefinitionType::name)
        .collect::<Vec<_>>()
        .join(" | ")
}

/// Exact-type mapping from definition type to handler
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: HashMap<DefinitionType, Box<dyn ModelHandler>>,
    constraints: HashMap<DefinitionType, HostConstraints>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `definition_type`, returning the handler it replaces
    pub fn register(
        &mut self,
        definition_type: DefinitionType,
        handler: impl ModelHandler + 'static,
    ) -> Option<Box<dyn ModelHandler>> {
        log::debug!("Registering handler for {definition_type}");
        let previous = self.handlers.insert(definition_type, Box::new(handler));
        if previous.is_some() {
            log::debug!("Replaced existing handler for {definition_type}");
        }
        previous
    }

    /// Register `handler` for definitions of type `D`
    pub fn register_for<D: Definition>(
        &mut self,
        handler: impl ModelHandler + 'static,
    ) -> Option<Box<dyn ModelHandler>> {
        self.register(DefinitionType::of::<D>(), handler)
    }

    /// Handler for exactly `definition_type`
    pub fn resolve(&self, definition_type: DefinitionType) -> Result<&dyn ModelHandler> {
        self.handlers
            .get(&definition_type)
            .map(Box::as_ref)
            .ok_or(Error::NoHandlerRegistered {
                definition_type: definition_type.name(),
            })
    }

    pub fn is_registered(&self, definition_type: DefinitionType) -> bool {
        self.handlers.contains_key(&definition_type)
    }

    /// Registered definition types, sorted by name
    pub fn registered_types(&self) -> Vec<DefinitionType> {
        let mut types: Vec<_> = self.handlers.keys().copied().collect();
        types.sort_by_key(DefinitionType::name);
        types
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Declare where definitions of `definition_type` may be placed
    pub fn constrain(&mut self, definition_type: DefinitionType, constraints: HostConstraints) {
        self.constraints.insert(definition_type, constraints);
    }

    /// Declared placement for `definition_type`, if any
    pub fn constraints(&self, definition_type: DefinitionType) -> Option<&HostConstraints> {
        self.constraints.get(&definition_type)
    }
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("handlers", &self.registered_types())
            .field("constraints", &self.constraints.len())
            .finish()
    }
}
