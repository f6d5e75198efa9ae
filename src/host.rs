//! Model hosts and model objects
//!
//! A [`ModelHost`] is the opaque "where are we" context a parent's handler
//! produces for its children. A [`ModelObject`] is a reference to a remote
//! object a handler deployed or observed. Both are type-erased; handlers
//! downcast them to the concrete shapes they expect.

use crate::definition::{Definition, DefinitionType};
use crate::error::{Error, Result};
use assertion::short_type_name;
use std::any::Any;
use std::fmt;
use std::rc::Rc;

/// Context a handler operates in
///
/// Created per traversal step and dropped once the subtree under it is done.
/// A host handed to the service may name the definition type it stands for,
/// which places the tree's root node in the host constraint table.
pub struct ModelHost {
    value: Box<dyn Any>,
    type_name: &'static str,
    definition: Option<DefinitionType>,
}

impl ModelHost {
    pub fn new<T: Any>(value: T) -> Self {
        Self {
            value: Box::new(value),
            type_name: short_type_name::<T>(),
            definition: None,
        }
    }

    /// Host wrapping a deployed object directly
    pub fn from_object(object: &ModelObject) -> Self {
        Self {
            value: Box::new(object.clone()),
            type_name: object.type_name(),
            definition: None,
        }
    }

    /// Mark this host as the context of a deployed `D`
    #[must_use]
    pub fn representing<D: Definition>(mut self) -> Self {
        self.definition = Some(DefinitionType::of::<D>());
        self
    }

    /// Definition type this host stands for, if declared
    pub fn definition_type(&self) -> Option<DefinitionType> {
        self.definition
    }

    /// Name of the concrete host type
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn is<T: Any>(&self) -> bool {
        self.downcast_ref::<T>().is_ok()
    }

    /// Downcast to the expected host shape
    ///
    /// Hosts built with [`from_object`](Self::from_object) downcast to the
    /// wrapped object's type.
    pub fn downcast_ref<T: Any>(&self) -> Result<&T> {
        if let Some(value) = self.value.downcast_ref::<T>() {
            return Ok(value);
        }
        self.value
            .downcast_ref::<ModelObject>()
            .and_then(ModelObject::downcast_ref::<T>)
            .ok_or_else(|| Error::UnexpectedHost {
                expected: short_type_name::<T>(),
                actual: self.type_name,
            })
    }
}

impl fmt::Debug for ModelHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.definition {
            Some(definition) => write!(f, "ModelHost({} for {definition})", self.type_name),
            None => write!(f, "ModelHost({})", self.type_name),
        }
    }
}

/// Shared reference to a remote object
#[derive(Clone)]
pub struct ModelObject {
    value: Rc<dyn Any>,
    type_name: &'static str,
}

impl ModelObject {
    pub fn new<T: Any>(value: T) -> Self {
        Self {
            value: Rc::new(value),
            type_name: short_type_name::<T>(),
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }
}

impl fmt::Debug for ModelObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ModelObject({})", self.type_name)
    }
}
