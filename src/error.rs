//! Error types for provisioning operations
//!
//! Errors fall into two categories: structural errors (a missing handler, a
//! malformed property path, a tree that violates host constraints) are
//! programmer errors that abort the run; remote errors come from the remote
//! client and abort the current subtree. Validation mismatches are never
//! errors.

use crate::model::NodePath;
use std::fmt;
use thiserror::Error;

/// Result type for provisioning operations
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed error from a remote client
pub type RemoteSource = Box<dyn std::error::Error + Send + Sync>;

/// Categories of provisioning errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Caller or handler bug; retrying cannot help
    Structural,
    /// Propagated from the remote system; the caller may retry the run
    Remote,
}

impl ErrorCategory {
    /// Whether re-running the deployment may succeed
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Remote)
    }

    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Structural => "Invalid model or handler setup",
            Self::Remote => "Remote operation failed",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Errors that can occur while deploying or validating a model
#[derive(Error, Debug)]
pub enum Error {
    /// No handler registered for the exact definition type
    #[error("no handler registered for definition type {definition_type}")]
    NoHandlerRegistered { definition_type: &'static str },

    /// Property path does not resolve to a real property
    #[error(transparent)]
    InvalidPath(#[from] assertion::Error),

    /// Remote client call failed
    #[error("remote operation '{operation}' failed: {source}")]
    RemoteOperationFailed {
        operation: String,
        #[source]
        source: RemoteSource,
    },

    /// Definition placed under a parent or root its type does not allow
    #[error("{definition_type} cannot be hosted under {actual}; expected {expected}")]
    HostConstraint {
        definition_type: &'static str,
        actual: &'static str,
        expected: String,
    },

    /// Handler received a host of the wrong shape
    #[error("expected host of type {expected}, got {actual}")]
    UnexpectedHost {
        expected: &'static str,
        actual: &'static str,
    },

    /// Handler received a definition of the wrong type
    #[error("expected definition of type {expected}, got {actual}")]
    UnexpectedDefinition {
        expected: &'static str,
        actual: &'static str,
    },

    /// Failure attributed to the node where it occurred
    #[error("{path}: {source}")]
    Node {
        path: NodePath,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Create a remote operation error
    pub fn remote(operation: impl Into<String>, source: impl Into<RemoteSource>) -> Self {
        Self::RemoteOperationFailed {
            operation: operation.into(),
            source: source.into(),
        }
    }

    /// Attribute this error to a node, unless it already names one
    pub fn at(self, path: &NodePath) -> Self {
        match self {
            Self::Node { .. } => self,
            other => Self::Node {
                path: path.clone(),
                source: Box::new(other),
            },
        }
    }

    /// Path of the node that failed, if known
    pub fn node_path(&self) -> Option<&NodePath> {
        match self {
            Self::Node { path, .. } => Some(path),
            _ => None,
        }
    }

    /// The error without its node attribution
    pub fn root_cause(&self) -> &Error {
        match self {
            Self::Node { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// Get the error category for retry decisions
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self.root_cause() {
            Self::RemoteOperationFailed { .. } => ErrorCategory::Remote,
            _ => ErrorCategory::Structural,
        }
    }

    #[must_use]
    pub fn is_retryable(&self) -> bool {
        self.category().is_retryable()
    }
}
