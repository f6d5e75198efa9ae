//! Fluent rule builder comparing a declared model against an observed object
//!
//! Every rule appends exactly one [`ValidationResult`] to the shared list and
//! returns the builder, so a whole pass can be chained and every discrepancy
//! is reported at once. Only malformed property paths are errors.
//!
//! ```
//! use assertion::{Assert, Prop};
//!
//! struct ListDefinition { title: String, url: String }
//! struct RemoteList { title: String, root_folder: String }
//!
//! let def = ListDefinition { title: "Docs".into(), url: "Docs".into() };
//! let list = RemoteList { title: "Docs".into(), root_folder: "/sites/a/Docs".into() };
//!
//! let mut results = Vec::new();
//! Assert::new(&def, &list, &mut results)
//!     .should_be_equal(
//!         Prop::new("Title", |d: &ListDefinition| d.title.clone()),
//!         Prop::new("Title", |l: &RemoteList| l.title.clone()),
//!     )?
//!     .should_be_end_of(
//!         Prop::new("Url", |d: &ListDefinition| d.url.clone()),
//!         |d| d.url.clone(),
//!         Prop::new("RootFolder", |l: &RemoteList| l.root_folder.clone()),
//!         |l| l.root_folder.clone(),
//!     )?;
//!
//! assert_eq!(results.len(), 2);
//! assert!(results.iter().all(|r| r.is_valid));
//! # Ok::<(), assertion::Error>(())
//! ```

use crate::error::Result;
use crate::property::{Prop, short_type_name};
use crate::result::ValidationResult;

/// Accessor metadata handed to custom rules
#[derive(Debug, Clone, Copy)]
pub struct RuleContext {
    pub model_type: &'static str,
    pub object_type: &'static str,
}

/// Rule builder seeded with a declared model, an observed object and the
/// list results are appended to
#[derive(Debug)]
pub struct Assert<'a, M: ?Sized, O: ?Sized> {
    model: &'a M,
    object: &'a O,
    results: &'a mut Vec<ValidationResult>,
}

impl<'a, M: ?Sized, O: ?Sized> Assert<'a, M, O> {
    pub fn new(model: &'a M, object: &'a O, results: &'a mut Vec<ValidationResult>) -> Self {
        Self {
            model,
            object,
            results,
        }
    }

    /// Declared value must equal the observed value
    pub fn should_be_equal(
        &mut self,
        model_prop: Prop<M>,
        object_prop: Prop<O>,
    ) -> Result<&mut Self> {
        let src = model_prop.resolve(self.model)?;
        let dst = object_prop.resolve(self.object)?;

        let result = if src.value == dst.value {
            ValidationResult::valid(format!(
                "Property [{}] of type [{}] is equal to [{}]",
                src.name, src.object_type, src.value
            ))
        } else {
            log::debug!(
                "{}.{} mismatch: declared [{}], observed [{}]",
                src.object_type,
                src.name,
                src.value,
                dst.value
            );
            ValidationResult::invalid(format!(
                "Property [{}] of type [{}] with value [{}] does not match [{}.{}] value [{}]",
                src.name, src.object_type, src.value, dst.object_type, dst.name, dst.value
            ))
        };

        self.results.push(result.with_src(src).with_dst(dst));
        Ok(self)
    }

    /// Observed string must end with the declared string
    ///
    /// The props name the two sides for reporting; the functions compute the
    /// strings actually compared (e.g. a site-relative list URL against the
    /// list's server-relative root folder URL).
    pub fn should_be_end_of<FM, FO>(
        &mut self,
        model_prop: Prop<M>,
        model_value: FM,
        object_prop: Prop<O>,
        object_value: FO,
    ) -> Result<&mut Self>
    where
        FM: FnOnce(&M) -> String,
        FO: FnOnce(&O) -> String,
    {
        let src = model_prop.resolve(self.model)?;
        let dst = object_prop.resolve(self.object)?;

        let tail = model_value(self.model);
        let full = object_value(self.object);

        let result = ValidationResult::new(
            full.ends_with(&tail),
            format!(
                "Property [{}] of type [{}] value [{}] should be the end of [{}.{}] value [{}]",
                src.name, src.object_type, tail, dst.object_type, dst.name, full
            ),
        );

        self.results.push(result.with_src(src).with_dst(dst));
        Ok(self)
    }

    /// Custom comparison for logic that is not plain equality
    pub fn should_be_valid<F>(&mut self, rule: F) -> Result<&mut Self>
    where
        F: FnOnce(&RuleContext, &M, &O) -> Result<ValidationResult>,
    {
        let ctx = RuleContext {
            model_type: short_type_name::<M>(),
            object_type: short_type_name::<O>(),
        };
        let result = rule(&ctx, self.model, self.object)?;
        self.results.push(result);
        Ok(self)
    }

    /// Record that a declared property is intentionally not checked
    pub fn skip_property(&mut self, model_prop: Prop<M>, reason: &str) -> Result<&mut Self> {
        let src = model_prop.resolve(self.model)?;
        self.results.push(ValidationResult::skipped(src, reason));
        Ok(self)
    }

    /// Results accumulated so far (including results from earlier builders)
    pub fn results(&self) -> &[ValidationResult] {
        self.results
    }
}
