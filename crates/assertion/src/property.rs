//! Property accessor - resolve a named property of an object
//!
//! A [`Prop`] is a small descriptor: the property name plus a typed getter.
//! Resolving it yields a [`PropertyValue`] carrying the name, the value and
//! the type of the object it was read from, so the same rule can compare a
//! declared value against an observed one without either side knowing the
//! other's type.

use crate::error::{Error, InvalidPathReason, Result};
use crate::value::Value;
use serde::Serialize;
use std::fmt;

/// Objects that expose their properties by name
///
/// Implemented by definitions (and optionally by remote objects) so generic
/// tooling can list, describe and look up properties without knowing the
/// concrete type.
pub trait Inspect {
    /// All declared properties in declaration order
    fn properties(&self) -> Vec<(&'static str, Value)>;

    /// Look up a single property by name
    fn property(&self, name: &str) -> Option<Value> {
        self.properties()
            .into_iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v)
    }
}

/// A resolved property: name, current value and the type it was read from
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertyValue {
    pub name: &'static str,
    pub value: Value,
    pub object_type: &'static str,
}

type Getter<T> = Box<dyn Fn(&T) -> Option<Value>>;

/// Descriptor of a property on `T`
pub struct Prop<T: ?Sized> {
    name: &'static str,
    getter: Getter<T>,
}

impl<T: ?Sized> Prop<T> {
    /// Create a descriptor from a name and a typed getter
    ///
    /// ```
    /// use assertion::{Prop, Value};
    ///
    /// struct List { title: String }
    ///
    /// let title = Prop::new("Title", |l: &List| l.title.clone());
    /// let resolved = title.resolve(&List { title: "Docs".into() }).unwrap();
    /// assert_eq!(resolved.value, Value::from("Docs"));
    /// ```
    pub fn new<V, F>(name: &'static str, getter: F) -> Self
    where
        V: Into<Value>,
        F: Fn(&T) -> V + 'static,
    {
        Self {
            name,
            getter: Box::new(move |source| Some(getter(source).into())),
        }
    }

    /// Property name
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Resolve the property against `source`
    ///
    /// Fails with [`Error::InvalidPath`] when the name is not a plain property
    /// reference, or when the object does not declare the property.
    pub fn resolve(&self, source: &T) -> Result<PropertyValue> {
        let object_type = short_type_name::<T>();
        check_property_name(self.name, object_type)?;

        let value = (self.getter)(source).ok_or_else(|| {
            Error::invalid_path(self.name, object_type, InvalidPathReason::NotDeclared)
        })?;

        Ok(PropertyValue {
            name: self.name,
            value,
            object_type,
        })
    }
}

impl<T: Inspect + ?Sized> Prop<T> {
    /// Create a descriptor resolved through [`Inspect::property`]
    pub fn named(name: &'static str) -> Self {
        Self {
            name,
            getter: Box::new(move |source: &T| source.property(name)),
        }
    }
}

impl<T: ?Sized> fmt::Debug for Prop<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Prop")
            .field("name", &self.name)
            .field("type", &short_type_name::<T>())
            .finish()
    }
}

/// Build a [`Prop`] from a struct field
///
/// `prop!(ListDefinition, title)` reads `title` by clone and names the
/// property `"title"`.
#[macro_export]
macro_rules! prop {
    ($ty:ty, $field:ident) => {
        $crate::Prop::new(stringify!($field), |source: &$ty| source.$field.clone())
    };
}

/// Type name without its module path or generic arguments
pub fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

fn check_property_name(name: &str, object_type: &'static str) -> Result<()> {
    if name.ends_with(')') && name.contains('(') {
        return Err(Error::invalid_path(
            name,
            object_type,
            InvalidPathReason::MethodCall,
        ));
    }

    let mut chars = name.chars();
    let starts_ok = chars
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_');
    if !starts_ok || !chars.all(|c| c.is_alphanumeric() || c == '_') {
        return Err(Error::invalid_path(
            name,
            object_type,
            InvalidPathReason::NotAProperty,
        ));
    }

    Ok(())
}
