//! Binding configuration.
//!
//! [`BindingOptions`] gathers everything the binders of an application share:
//! the input formatters, the validator, the types excluded from validation
//! and the limits. It is built once with [`BindingOptions::builder`] and then
//! hands out ready-wired binders and binding contexts.
//!
//! # Example
//! ```
//! # use micro_mvc::{BindingOptions, ReadFailurePolicy};
//! # use micro_mvc::validation::exclude_type;
//! let options = BindingOptions::builder()
//!     .max_body_size(64 * 1024)
//!     .max_model_errors(50)
//!     .exclude(exclude_type::<u64>())
//!     .read_failure_policy(ReadFailurePolicy::RecordModelError)
//!     .build();
//!
//! let binder = options.composite_binder();
//! # let _ = binder;
//! ```

use crate::binder::{BodyModelBinder, CompositeModelBinder, QueryModelBinder, ReadFailurePolicy};
use crate::context::{ModelBindingContext, OperationBindingContext};
use crate::formatter::{
    DEFAULT_MAX_BODY_SIZE, DefaultInputFormatterSelector, FormInputFormatter, InputFormatter, JsonInputFormatter,
};
use crate::metadata::ModelMetadata;
use crate::model_state::{DEFAULT_MAX_MODEL_ERRORS, ModelStateDictionary};
use crate::validation::{BodyModelValidator, DefaultBodyModelValidator, ExcludeFilters, ExcludeTypeValidationFilter};
use std::fmt;
use std::sync::Arc;

#[derive(Clone)]
pub struct BindingOptions {
    formatters: Vec<Arc<dyn InputFormatter>>,
    validator: Arc<dyn BodyModelValidator>,
    exclude_filters: ExcludeFilters,
    max_model_errors: usize,
    max_body_size: usize,
    read_failure_policy: ReadFailurePolicy,
}

impl fmt::Debug for BindingOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindingOptions")
            .field("formatters", &self.formatters.len())
            .field("exclude_filters", &self.exclude_filters)
            .field("max_model_errors", &self.max_model_errors)
            .field("max_body_size", &self.max_body_size)
            .field("read_failure_policy", &self.read_failure_policy)
            .finish_non_exhaustive()
    }
}

impl Default for BindingOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl BindingOptions {
    pub fn builder() -> BindingOptionsBuilder {
        BindingOptionsBuilder::new()
    }

    #[inline]
    pub fn formatters(&self) -> &[Arc<dyn InputFormatter>] {
        &self.formatters
    }

    #[inline]
    pub fn exclude_filters(&self) -> &ExcludeFilters {
        &self.exclude_filters
    }

    #[inline]
    pub fn max_model_errors(&self) -> usize {
        self.max_model_errors
    }

    #[inline]
    pub fn max_body_size(&self) -> usize {
        self.max_body_size
    }

    #[inline]
    pub fn read_failure_policy(&self) -> ReadFailurePolicy {
        self.read_failure_policy
    }

    pub fn formatter_selector(&self) -> DefaultInputFormatterSelector {
        DefaultInputFormatterSelector::new(self.formatters.clone())
    }

    pub fn body_binder(&self) -> BodyModelBinder {
        BodyModelBinder::new(Arc::new(self.formatter_selector()), Arc::clone(&self.validator))
            .with_exclude_filters(self.exclude_filters.clone())
            .with_max_body_size(self.max_body_size)
            .with_read_failure_policy(self.read_failure_policy)
    }

    pub fn query_binder(&self) -> QueryModelBinder {
        QueryModelBinder::new(Arc::clone(&self.validator)).with_exclude_filters(self.exclude_filters.clone())
    }

    /// The body binder followed by the query binder
    pub fn composite_binder(&self) -> CompositeModelBinder {
        CompositeModelBinder::default().with(self.body_binder()).with(self.query_binder())
    }

    /// An empty model state honoring the configured error limit
    pub fn model_state(&self) -> ModelStateDictionary {
        ModelStateDictionary::with_max_allowed_errors(self.max_model_errors)
    }

    pub fn binding_context<S: Into<String>>(
        &self,
        model_metadata: ModelMetadata,
        model_name: S,
        operation: OperationBindingContext,
    ) -> ModelBindingContext {
        ModelBindingContext::new(model_metadata, model_name, operation).with_model_state(self.model_state())
    }
}

pub struct BindingOptionsBuilder {
    formatters: Vec<Arc<dyn InputFormatter>>,
    validator: Arc<dyn BodyModelValidator>,
    exclude_filters: ExcludeFilters,
    max_model_errors: usize,
    max_body_size: usize,
    read_failure_policy: ReadFailurePolicy,
}

impl fmt::Debug for BindingOptionsBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindingOptionsBuilder").field("formatters", &self.formatters.len()).finish_non_exhaustive()
    }
}

impl BindingOptionsBuilder {
    fn new() -> Self {
        Self {
            formatters: vec![Arc::new(JsonInputFormatter::new()), Arc::new(FormInputFormatter::new())],
            validator: Arc::new(DefaultBodyModelValidator::new()),
            exclude_filters: ExcludeFilters::defaults(),
            max_model_errors: DEFAULT_MAX_MODEL_ERRORS,
            max_body_size: DEFAULT_MAX_BODY_SIZE,
            read_failure_policy: ReadFailurePolicy::default(),
        }
    }

    /// Appends a formatter after the registered ones
    pub fn formatter<F: InputFormatter + 'static>(mut self, formatter: F) -> Self {
        self.formatters.push(Arc::new(formatter));
        self
    }

    /// Removes every registered formatter, including the default json and form ones
    pub fn clear_formatters(mut self) -> Self {
        self.formatters.clear();
        self
    }

    pub fn validator<V: BodyModelValidator + 'static>(mut self, validator: V) -> Self {
        self.validator = Arc::new(validator);
        self
    }

    pub fn exclude<F: ExcludeTypeValidationFilter + 'static>(mut self, filter: F) -> Self {
        self.exclude_filters.or(filter);
        self
    }

    /// Replaces the exclusion filters, including the default ones
    pub fn exclude_filters(mut self, exclude_filters: ExcludeFilters) -> Self {
        self.exclude_filters = exclude_filters;
        self
    }

    pub fn max_model_errors(mut self, max_model_errors: usize) -> Self {
        self.max_model_errors = max_model_errors;
        self
    }

    pub fn max_body_size(mut self, max_body_size: usize) -> Self {
        self.max_body_size = max_body_size;
        self
    }

    pub fn read_failure_policy(mut self, read_failure_policy: ReadFailurePolicy) -> Self {
        self.read_failure_policy = read_failure_policy;
        self
    }

    pub fn build(self) -> BindingOptions {
        BindingOptions {
            formatters: self.formatters,
            validator: self.validator,
            exclude_filters: self.exclude_filters,
            max_model_errors: self.max_model_errors,
            max_body_size: self.max_body_size,
            read_failure_policy: self.read_failure_policy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::BindingOptions;
    use crate::binder::test_support::{Person, binding_context};
    use crate::binder::{ModelBinder, ReadFailurePolicy};
    use crate::context::OperationBindingContext;
    use crate::formatter::{DEFAULT_MAX_BODY_SIZE, InputFormatterSelector, JsonInputFormatter};
    use crate::metadata::{BinderMetadata, ModelMetadata};
    use crate::model::ModelType;
    use crate::model_state::DEFAULT_MAX_MODEL_ERRORS;
    use crate::request::RequestContext;
    use crate::validation::exclude_type;
    use crate::OptionReqBody;
    use http::Request;

    #[test]
    fn test_defaults() {
        let options = BindingOptions::default();
        assert_eq!(options.formatters().len(), 2);
        assert_eq!(options.exclude_filters().len(), 3);
        assert_eq!(options.max_model_errors(), DEFAULT_MAX_MODEL_ERRORS);
        assert_eq!(options.max_body_size(), DEFAULT_MAX_BODY_SIZE);
        assert_eq!(options.read_failure_policy(), ReadFailurePolicy::Propagate);
        assert_eq!(options.composite_binder().binders().len(), 2);
    }

    #[test]
    fn test_builder() {
        let options = BindingOptions::builder()
            .clear_formatters()
            .formatter(JsonInputFormatter::new())
            .exclude(exclude_type::<Person>())
            .max_model_errors(10)
            .max_body_size(1024)
            .read_failure_policy(ReadFailurePolicy::RecordModelError)
            .build();

        assert_eq!(options.formatters().len(), 1);
        assert!(options.exclude_filters().is_excluded(&ModelType::of::<Person>()));
        assert_eq!(options.model_state().max_allowed_errors(), 10);

        let request: RequestContext = Request::builder()
            .header(http::header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(())
            .unwrap()
            .into_parts()
            .0
            .into();
        let operation = OperationBindingContext::new(request, OptionReqBody::from("name=hello&age=1"));
        let metadata = ModelMetadata::new(ModelType::of::<Person>()).with_binder_metadata(BinderMetadata::FromBody);
        let ctx = options.binding_context(metadata, "someName", operation);
        assert_eq!(ctx.model_state().max_allowed_errors(), 10);

        let formatter_ctx = crate::formatter::InputFormatterContext::new(
            ctx.request().clone(),
            ctx.operation().body().clone(),
            ctx.model_type(),
        );
        assert!(options.formatter_selector().select_formatter(&formatter_ctx).is_none());
    }

    #[tokio::test]
    async fn test_record_read_failure() {
        let options = BindingOptions::builder().read_failure_policy(ReadFailurePolicy::RecordModelError).build();
        let binder = options.composite_binder();

        let mut ctx = binding_context(Some(BinderMetadata::FromBody), "/", Some("application/json"), "{\"name\":");
        assert!(binder.bind_model(&mut ctx).await.unwrap().is_handled());
        assert!(ctx.model().is_none());
        assert!(ctx.model_state().contains_key("someName"));
    }

    #[tokio::test]
    async fn test_excluded_type_skips_validation() {
        let options = BindingOptions::builder().exclude(exclude_type::<Person>()).build();
        let binder = options.body_binder();

        let mut ctx = binding_context(Some(BinderMetadata::FromBody), "/", Some("application/json"), r#"{"name":"","age":1}"#);
        assert!(binder.bind_model(&mut ctx).await.unwrap().is_handled());
        assert!(ctx.model_as::<Person>().is_some());
        assert!(ctx.model_state().is_valid());
    }
}
