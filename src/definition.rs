//! Definitions - declared desired state for one remote artifact
//!
//! A definition is an immutable value describing what should exist. The
//! engine never mutates it; it only reads its type identity (to pick a
//! handler) and its properties (for validation and logging).

use crate::error::{Error, Result};
use assertion::{Inspect, short_type_name};
use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Stable type identity of a definition
///
/// Compared by `TypeId` only; the name is for messages.
#[derive(Debug, Clone, Copy)]
pub struct DefinitionType {
    id: TypeId,
    name: &'static str,
}

impl DefinitionType {
    pub fn of<T: Any + ?Sized>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: short_type_name::<T>(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn type_id(&self) -> TypeId {
        self.id
    }
}

impl PartialEq for DefinitionType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for DefinitionType {}

impl Hash for DefinitionType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for DefinitionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Type identity and `Any` access, implemented for every inspectable type
pub trait TypedDefinition {
    fn definition_type(&self) -> DefinitionType;
    fn as_any(&self) -> &dyn Any;
}

impl<T: Inspect + Any> TypedDefinition for T {
    fn definition_type(&self) -> DefinitionType {
        DefinitionType::of::<T>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Declared desired state of one remote artifact
///
/// Implement [`Inspect`] to expose the declared properties, then mark the
/// type as a definition:
///
/// ```
/// use provision::{Definition, Inspect, Value};
///
/// #[derive(Debug)]
/// struct WebDefinition { title: String, url: String }
///
/// impl Inspect for WebDefinition {
///     fn properties(&self) -> Vec<(&'static str, Value)> {
///         vec![("Title", self.title.clone().into()), ("Url", self.url.clone().into())]
///     }
/// }
///
/// impl Definition for WebDefinition {}
/// ```
pub trait Definition: Inspect + TypedDefinition + fmt::Debug + Send + Sync + 'static {}

impl dyn Definition {
    /// Downcast to a concrete definition type
    pub fn downcast_ref<T: Definition>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    /// Downcast, failing with [`Error::UnexpectedDefinition`]
    pub fn expect<T: Definition>(&self) -> Result<&T> {
        self.downcast_ref::<T>()
            .ok_or_else(|| Error::UnexpectedDefinition {
                expected: short_type_name::<T>(),
                actual: self.definition_type().name(),
            })
    }
}

/// Render a definition as `Type { Prop: value, ... }` for logs
pub fn describe(definition: &dyn Definition) -> String {
    let props = definition
        .properties()
        .into_iter()
        .map(|(name, value)| format!("{name}: {value}"))
        .collect::<Vec<_>>()
        .join(", ");
    format!("{} {{ {} }}", definition.definition_type(), props)
}
