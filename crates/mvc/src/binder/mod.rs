//! Model binders.
//!
//! A binder looks at the [`BinderMetadata`](crate::BinderMetadata) of the
//! model it is asked for and either handles the request, possibly recording
//! a negative outcome in model state, or passes with
//! [`BindingOutcome::NotApplicable`] so the next binder of a
//! [`CompositeModelBinder`] can try.

mod body;
mod composite;
mod query;

pub use body::BodyModelBinder;
pub use body::ReadFailurePolicy;
pub use composite::CompositeModelBinder;
pub use query::QueryModelBinder;

use crate::context::ModelBindingContext;
use crate::error::BindError;
use crate::model::Model;
use crate::validation::{BodyModelValidator, ExcludeFilters, ModelValidationContext};
use async_trait::async_trait;

/// Whether a binder took responsibility for a bind attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingOutcome {
    /// The binder understood the metadata and produced a definitive outcome,
    /// which may be an error recorded in model state
    Handled,
    /// The binder doesn't apply to this model, model and model state are untouched
    NotApplicable,
}

impl BindingOutcome {
    #[inline]
    pub fn is_handled(self) -> bool {
        matches!(self, BindingOutcome::Handled)
    }
}

impl From<BindingOutcome> for bool {
    fn from(outcome: BindingOutcome) -> Self {
        outcome.is_handled()
    }
}

#[async_trait]
pub trait ModelBinder: Send + Sync {
    async fn bind_model(&self, ctx: &mut ModelBindingContext) -> Result<BindingOutcome, BindError>;
}

/// Validates `model` once under the context's model name, then commits it.
///
/// The model is committed even when invalid so the caller can show it back
/// along with its errors.
fn validate_and_commit(
    ctx: &mut ModelBindingContext,
    model: Model,
    validator: &dyn BodyModelValidator,
    exclude_filters: &ExcludeFilters,
) -> bool {
    let key = ctx.model_name().to_string();
    let model_type = ctx.model_type();

    let mut validation_ctx = ModelValidationContext::new(&model, model_type, ctx.model_state_mut(), exclude_filters);
    let valid = validator.validate(&mut validation_ctx, &key);

    ctx.set_model(Some(model));
    valid
}
