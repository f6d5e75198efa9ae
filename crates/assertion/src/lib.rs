//! # Assertion
//!
//! Property assertions for declarative provisioning.
//!
//! This crate compares declared values (a definition) against observed values
//! (a live object), producing a list of [`ValidationResult`]s. A mismatch is
//! data, never an error: a single pass reports every discrepancy.
//!
//! ## Core Concepts
//!
//! - **Prop**: a `{name, getter}` descriptor for one property of a type
//! - **Value**: an untyped value box with structural equality
//! - **Assert**: rule builder comparing a model against an observed object
//! - **Checks**: single-object checks (string shape, length, leading chars)
//!
//! ## Example
//!
//! ```
//! use assertion::{Checks, prop};
//!
//! struct WebDefinition { title: String }
//!
//! let def = WebDefinition { title: "Intranet ".into() };
//! let mut results = Vec::new();
//! Checks::new(&def, &mut results).no_spaces_before_or_after(prop!(WebDefinition, title))?;
//!
//! let failed: Vec<_> = assertion::failures(&results).collect();
//! assert_eq!(failed.len(), 1);
//! assert!(failed[0].message.contains("must not end with space"));
//! # Ok::<(), assertion::Error>(())
//! ```

pub mod assert;
pub mod checks;
pub mod error;
pub mod property;
pub mod result;
pub mod value;

pub use assert::{Assert, RuleContext};
pub use checks::{Checks, NIL_GUID};
pub use error::{Error, InvalidPathReason, Result};
pub use property::{Inspect, Prop, PropertyValue, short_type_name};
pub use result::{ValidationResult, all_valid, failures};
pub use value::Value;
