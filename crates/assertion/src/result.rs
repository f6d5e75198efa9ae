//! Validation results

use crate::property::PropertyValue;
use serde::Serialize;

/// One pass/fail outcome for a checked property (or one facet of it)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub message: String,
    /// Declared side of the comparison
    #[serde(skip_serializing_if = "Option::is_none")]
    pub src: Option<PropertyValue>,
    /// Observed side of the comparison
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dst: Option<PropertyValue>,
    /// Property was intentionally not checked
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub skipped: bool,
}

impl ValidationResult {
    pub fn valid(message: impl Into<String>) -> Self {
        Self::new(true, message)
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self::new(false, message)
    }

    /// Create a result from a boolean outcome
    pub fn new(is_valid: bool, message: impl Into<String>) -> Self {
        Self {
            is_valid,
            message: message.into(),
            src: None,
            dst: None,
            skipped: false,
        }
    }

    /// Always-valid result recording why a property was not checked
    pub fn skipped(src: PropertyValue, reason: &str) -> Self {
        Self {
            is_valid: true,
            message: format!(
                "Skipping property [{}] of type [{}]: {}",
                src.name, src.object_type, reason
            ),
            src: Some(src),
            dst: None,
            skipped: true,
        }
    }

    pub fn with_src(mut self, src: PropertyValue) -> Self {
        self.src = Some(src);
        self
    }

    pub fn with_dst(mut self, dst: PropertyValue) -> Self {
        self.dst = Some(dst);
        self
    }
}

/// Check if every result is valid
pub fn all_valid(results: &[ValidationResult]) -> bool {
    results.iter().all(|r| r.is_valid)
}

/// Iterate over failing results only
pub fn failures(results: &[ValidationResult]) -> impl Iterator<Item = &ValidationResult> {
    results.iter().filter(|r| !r.is_valid)
}
