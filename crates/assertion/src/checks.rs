//! Single-object property checks, used to lint definitions before deployment
//!
//! Each check is built from independent facets (is it a string, is it
//! present, is it short enough, ...). Every facet appends its own result, so
//! a property that is both the wrong type and too long reports two failures.

use crate::error::Result;
use crate::property::{Prop, PropertyValue};
use crate::result::ValidationResult;
use crate::value::Value;

/// Nil GUID, the default value of identifier properties
pub const NIL_GUID: &str = "00000000-0000-0000-0000-000000000000";

const FORBIDDEN_LEADING: [&str; 2] = ["/", "\\"];

/// Property checks against a single source object
pub struct Checks<'a, T: ?Sized> {
    source: &'a T,
    results: &'a mut Vec<ValidationResult>,
}

impl<'a, T: ?Sized> Checks<'a, T> {
    pub fn new(source: &'a T, results: &'a mut Vec<ValidationResult>) -> Self {
        Self { source, results }
    }

    /// Must be a string that is neither null nor empty
    pub fn not_empty_string(&mut self, prop: Prop<T>) -> Result<&mut Self> {
        let resolved = prop.resolve(self.source)?;
        self.check_is_string(&resolved);
        self.check_not_null_or_empty(&resolved);
        Ok(self)
    }

    /// Must be a string; empty is allowed, null is not
    pub fn not_null_string(&mut self, prop: Prop<T>) -> Result<&mut Self> {
        let resolved = prop.resolve(self.source)?;
        self.check_is_string(&resolved);
        self.check_not_null(&resolved);
        Ok(self)
    }

    /// Must be a non-empty string of at most `max_len` characters
    pub fn no_more_than(&mut self, prop: Prop<T>, max_len: usize) -> Result<&mut Self> {
        let resolved = prop.resolve(self.source)?;
        self.check_is_string(&resolved);
        self.check_not_null_or_empty(&resolved);
        self.check_max_len(&resolved, max_len);
        Ok(self)
    }

    /// Must be a string not starting with `/` or `\`
    pub fn no_slashes_before(&mut self, prop: Prop<T>) -> Result<&mut Self> {
        let resolved = prop.resolve(self.source)?;
        self.check_is_string(&resolved);
        for symbol in FORBIDDEN_LEADING {
            self.check_not_starting_with(&resolved, symbol);
        }
        Ok(self)
    }

    /// Must be a string without leading or trailing spaces
    pub fn no_spaces_before_or_after(&mut self, prop: Prop<T>) -> Result<&mut Self> {
        let resolved = prop.resolve(self.source)?;
        self.check_is_string(&resolved);

        let text = resolved.value.as_str().unwrap_or_default();
        let leading = text.starts_with(' ');
        self.push(
            !leading,
            &resolved,
            if leading {
                "must not start with space"
            } else {
                "does not start with space"
            },
        );

        let trailing = text.ends_with(' ');
        self.push(
            !trailing,
            &resolved,
            if trailing {
                "must not end with space"
            } else {
                "does not end with space"
            },
        );
        Ok(self)
    }

    /// Must not equal `value` (structural equality)
    pub fn not_equal(&mut self, prop: Prop<T>, value: impl Into<Value>) -> Result<&mut Self> {
        let resolved = prop.resolve(self.source)?;
        let forbidden = value.into();
        let equal = resolved.value == forbidden;
        let detail = if equal {
            format!("must not be equal to [{forbidden}]")
        } else {
            format!("is not equal to [{forbidden}]")
        };
        self.push(!equal, &resolved, &detail);
        Ok(self)
    }

    /// Must not be the nil GUID
    pub fn not_default_guid(&mut self, prop: Prop<T>) -> Result<&mut Self> {
        self.not_equal(prop, NIL_GUID)
    }

    /// Results accumulated so far
    pub fn results(&self) -> &[ValidationResult] {
        self.results
    }

    fn check_is_string(&mut self, resolved: &PropertyValue) {
        let ok = resolved.value.is_text();
        let detail = if ok {
            "is string type".to_string()
        } else {
            format!("must be string type, found [{}]", resolved.value.kind())
        };
        self.push(ok, resolved, &detail);
    }

    fn check_not_null(&mut self, resolved: &PropertyValue) {
        let ok = !resolved.value.is_null();
        self.push(
            ok,
            resolved,
            if ok {
                "is not null"
            } else {
                "must not be null string"
            },
        );
    }

    fn check_not_null_or_empty(&mut self, resolved: &PropertyValue) {
        let ok = resolved.value.as_str().is_some_and(|s| !s.is_empty());
        self.push(
            ok,
            resolved,
            if ok {
                "is not null or empty"
            } else {
                "must be not null and not empty string"
            },
        );
    }

    fn check_max_len(&mut self, resolved: &PropertyValue, max_len: usize) {
        let len = resolved.value.as_str().map_or(0, |s| s.chars().count());
        let ok = len <= max_len;
        let detail = if ok {
            format!("has no more than [{max_len}] chars")
        } else {
            format!(
                "must be a string with no more than [{max_len}] chars. Current length is: [{len}]"
            )
        };
        self.push(ok, resolved, &detail);
    }

    fn check_not_starting_with(&mut self, resolved: &PropertyValue, symbol: &str) {
        let starts = resolved
            .value
            .as_str()
            .is_some_and(|s| s.starts_with(symbol));
        let detail = if starts {
            format!("must not start with char:[{symbol}]")
        } else {
            format!("does not start with char:[{symbol}]")
        };
        self.push(!starts, resolved, &detail);
    }

    fn push(&mut self, ok: bool, resolved: &PropertyValue, detail: &str) {
        let message = format!(
            "Property [{}] of type [{}] {}.",
            resolved.name, resolved.object_type, detail
        );
        self.results
            .push(ValidationResult::new(ok, message).with_src(resolved.clone()));
    }
}
