//! URL query string binding
//!
//! Models tagged [`BinderMetadata::FromQuery`] are decoded from the query
//! string with `serde_qs`, which understands nested keys such as
//! `filter[name]=hello`. A query string which doesn't decode is a value
//! problem, not a request problem: it is recorded under the model name and
//! the bind is still reported as handled.

use crate::binder::{BindingOutcome, ModelBinder, validate_and_commit};
use crate::context::ModelBindingContext;
use crate::error::BindError;
use crate::metadata::BinderMetadata;
use crate::validation::{BodyModelValidator, ExcludeFilters};
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

pub struct QueryModelBinder {
    validator: Arc<dyn BodyModelValidator>,
    exclude_filters: ExcludeFilters,
}

impl fmt::Debug for QueryModelBinder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryModelBinder").field("exclude_filters", &self.exclude_filters).finish_non_exhaustive()
    }
}

impl QueryModelBinder {
    pub fn new(validator: Arc<dyn BodyModelValidator>) -> Self {
        Self { validator, exclude_filters: ExcludeFilters::defaults() }
    }

    pub fn with_exclude_filters(mut self, exclude_filters: ExcludeFilters) -> Self {
        self.exclude_filters = exclude_filters;
        self
    }
}

#[async_trait]
impl ModelBinder for QueryModelBinder {
    async fn bind_model(&self, ctx: &mut ModelBindingContext) -> Result<BindingOutcome, BindError> {
        if ctx.model_metadata().binder_metadata() != Some(&BinderMetadata::FromQuery) {
            return Ok(BindingOutcome::NotApplicable);
        }

        let key = ctx.model_name().to_string();
        let decoded = ctx.model_type().from_query(ctx.request().query().unwrap_or_default());
        match decoded {
            Ok(model) => {
                let valid = validate_and_commit(ctx, model, self.validator.as_ref(), &self.exclude_filters);
                trace!(model_name = %key, valid, "query model bound");
            }
            Err(e) => {
                debug!(model_name = %key, cause = %e, "failed to decode query string");
                ctx.model_state_mut().add_model_error(key, e);
            }
        }
        Ok(BindingOutcome::Handled)
    }
}
