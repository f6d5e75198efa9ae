//! Error types for the assertion crate

use std::fmt;
use thiserror::Error;

/// Why a property path could not be resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidPathReason {
    /// The path calls a method (e.g. `GetListUrl()`)
    MethodCall,
    /// The path is a computed expression or nested access, not a plain property name
    NotAProperty,
    /// The object's type does not declare a property with this name
    NotDeclared,
}

impl fmt::Display for InvalidPathReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::MethodCall => "refers to a method, not a property",
            Self::NotAProperty => "is not a direct property reference",
            Self::NotDeclared => "refers to a property that is not declared by this type",
        };
        f.write_str(text)
    }
}

/// Errors raised while resolving property paths
///
/// Mismatching values are never errors; they are recorded as failing
/// [`ValidationResult`](crate::ValidationResult)s.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Property path does not resolve to a real property of the object's type
    #[error("expression '{path}' on type [{type_name}] {reason}")]
    InvalidPath {
        path: String,
        type_name: &'static str,
        reason: InvalidPathReason,
    },
}

impl Error {
    pub(crate) fn invalid_path(
        path: impl Into<String>,
        type_name: &'static str,
        reason: InvalidPathReason,
    ) -> Self {
        Self::InvalidPath {
            path: path.into(),
            type_name,
            reason,
        }
    }

    /// The reason a path was rejected
    pub fn reason(&self) -> InvalidPathReason {
        match self {
            Self::InvalidPath { reason, .. } => *reason,
        }
    }
}

/// Result type for assertion operations
pub type Result<T> = std::result::Result<T, Error>;
