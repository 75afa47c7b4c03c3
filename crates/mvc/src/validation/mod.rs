//! Model validation.
//!
//! Models describe their own rules by implementing [`Validate`]; a
//! [`BodyModelValidator`] runs those rules for a freshly bound model and
//! records the failures into the [`ModelStateDictionary`] under the model's
//! key.
//!
//! # Example
//! ```
//! # use micro_mvc::validation::{Validate, ValidationErrors, rules};
//! struct Employee {
//!     name: String,
//!     age: u32,
//! }
//!
//! impl Validate for Employee {
//!     fn validate(&self, errors: &mut ValidationErrors) {
//!         rules::required(errors, "name", &self.name);
//!         rules::range(errors, "age", self.age, 18, 65);
//!     }
//! }
//! ```

mod exclude;
pub mod rules;

pub use exclude::ExcludeFilters;
pub use exclude::ExcludeTypeValidationFilter;
pub use exclude::TypeExcludeFilter;
pub use exclude::exclude_type;
pub use exclude::fn_exclude_filter;

use crate::model::{Model, ModelType};
use crate::model_state::{ModelStateDictionary, join_key};
use tracing::trace;

/// Validation rules of a model type.
///
/// The default impl has no rules, so plain data types only need an empty
/// `impl Validate for T {}`.
pub trait Validate {
    fn validate(&self, errors: &mut ValidationErrors) {
        let _ = errors;
    }
}

macro_rules! impl_validate_without_rules {
    ($($ty:ty),* $(,)?) => {
        $(impl Validate for $ty {})*
    };
}

impl_validate_without_rules!(
    (),
    bool,
    char,
    u8,
    u16,
    u32,
    u64,
    u128,
    usize,
    i8,
    i16,
    i32,
    i64,
    i128,
    isize,
    f32,
    f64,
    String,
    serde_json::Value,
);

impl<T: Validate> Validate for Option<T> {
    fn validate(&self, errors: &mut ValidationErrors) {
        if let Some(value) = self {
            value.validate(errors);
        }
    }
}

impl<T: Validate> Validate for Vec<T> {
    fn validate(&self, errors: &mut ValidationErrors) {
        for (index, item) in self.iter().enumerate() {
            errors.validate_field(&format!("[{index}]"), item);
        }
    }
}

impl<T: Validate + ?Sized> Validate for Box<T> {
    fn validate(&self, errors: &mut ValidationErrors) {
        (**self).validate(errors);
    }
}

/// `(field path, message)` pairs produced by [`Validate`] impls.
///
/// Paths are relative to the model being validated, the empty path means
/// the model itself.
#[derive(Debug, Clone, Default)]
pub struct ValidationErrors {
    errors: Vec<(String, String)>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self { errors: vec![] }
    }

    pub fn add<F: Into<String>, S: ToString>(&mut self, field: F, message: S) {
        self.errors.push((field.into(), message.to_string()));
    }

    /// Adds `message` when `condition` doesn't hold, returning `condition`
    pub fn ensure<S: ToString>(&mut self, condition: bool, field: &str, message: S) -> bool {
        if !condition {
            self.add(field, message);
        }
        condition
    }

    /// Validates a nested value, prefixing its errors with `field`
    pub fn validate_field<T: Validate + ?Sized>(&mut self, field: &str, value: &T) {
        let mut nested = ValidationErrors::new();
        value.validate(&mut nested);
        self.errors.extend(nested.errors.into_iter().map(|(path, message)| (join_key(field, &path), message)));
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.errors.iter().map(|(field, message)| (field.as_str(), message.as_str()))
    }
}

/// What a validator sees of one freshly bound model.
#[derive(Debug)]
pub struct ModelValidationContext<'a> {
    model: &'a Model,
    model_type: ModelType,
    model_state: &'a mut ModelStateDictionary,
    exclude_filters: &'a ExcludeFilters,
}

impl<'a> ModelValidationContext<'a> {
    pub fn new(
        model: &'a Model,
        model_type: ModelType,
        model_state: &'a mut ModelStateDictionary,
        exclude_filters: &'a ExcludeFilters,
    ) -> Self {
        Self { model, model_type, model_state, exclude_filters }
    }

    #[inline]
    pub fn model(&self) -> &Model {
        self.model
    }

    #[inline]
    pub fn model_type(&self) -> ModelType {
        self.model_type
    }

    #[inline]
    pub fn model_state(&self) -> &ModelStateDictionary {
        self.model_state
    }

    #[inline]
    pub fn model_state_mut(&mut self) -> &mut ModelStateDictionary {
        self.model_state
    }

    #[inline]
    pub fn is_type_excluded(&self) -> bool {
        self.exclude_filters.is_excluded(&self.model_type)
    }
}

/// Validates a model produced by a binder.
///
/// Returns false if the model is invalid, in which case the errors must
/// already be recorded in the context's model state.
pub trait BodyModelValidator: Send + Sync {
    fn validate(&self, ctx: &mut ModelValidationContext<'_>, key: &str) -> bool;
}

/// Runs the model's [`Validate`] rules unless its type is excluded.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultBodyModelValidator;

impl DefaultBodyModelValidator {
    pub fn new() -> Self {
        Self
    }
}

impl BodyModelValidator for DefaultBodyModelValidator {
    fn validate(&self, ctx: &mut ModelValidationContext<'_>, key: &str) -> bool {
        if ctx.is_type_excluded() {
            trace!(model_type = ctx.model_type().name(), "skip validation of excluded type");
            return true;
        }

        let mut errors = ValidationErrors::new();
        ctx.model_type().validate(ctx.model(), &mut errors);
        trace!(model_type = ctx.model_type().name(), key, errors = errors.len(), "validated model");

        let valid = errors.is_empty();
        let model_state = ctx.model_state_mut();
        for (field, message) in errors.iter() {
            model_state.add_model_error(join_key(key, field), message);
        }
        valid
    }
}
