use crate::binder::{BindingOutcome, ModelBinder, validate_and_commit};
use crate::context::ModelBindingContext;
use crate::error::BindError;
use crate::formatter::{DEFAULT_MAX_BODY_SIZE, InputFormatterContext, InputFormatterSelector};
use crate::validation::{BodyModelValidator, ExcludeFilters};
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// What the body binder does when the selected formatter fails to read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadFailurePolicy {
    /// Return the error to the caller, the request is answered with a client error
    #[default]
    Propagate,
    /// Record the error under the model name and report the bind as handled
    RecordModelError,
}

/// Binds models tagged [`BinderMetadata::FromBody`](crate::BinderMetadata::FromBody)
/// from the request body.
///
/// One bind attempt selects a formatter, reads the body with it once,
/// validates the result once and commits it, in that order. Without a
/// formatter for the request's content type an error is recorded under the
/// model name and the model stays unset.
pub struct BodyModelBinder {
    selector: Arc<dyn InputFormatterSelector>,
    validator: Arc<dyn BodyModelValidator>,
    exclude_filters: ExcludeFilters,
    max_body_size: usize,
    read_failure_policy: ReadFailurePolicy,
}

impl fmt::Debug for BodyModelBinder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BodyModelBinder")
            .field("exclude_filters", &self.exclude_filters)
            .field("max_body_size", &self.max_body_size)
            .field("read_failure_policy", &self.read_failure_policy)
            .finish_non_exhaustive()
    }
}

impl BodyModelBinder {
    pub fn new(selector: Arc<dyn InputFormatterSelector>, validator: Arc<dyn BodyModelValidator>) -> Self {
        Self {
            selector,
            validator,
            exclude_filters: ExcludeFilters::defaults(),
            max_body_size: DEFAULT_MAX_BODY_SIZE,
            read_failure_policy: ReadFailurePolicy::default(),
        }
    }

    pub fn with_exclude_filters(mut self, exclude_filters: ExcludeFilters) -> Self {
        self.exclude_filters = exclude_filters;
        self
    }

    pub fn with_max_body_size(mut self, max_body_size: usize) -> Self {
        self.max_body_size = max_body_size;
        self
    }

    pub fn with_read_failure_policy(mut self, read_failure_policy: ReadFailurePolicy) -> Self {
        self.read_failure_policy = read_failure_policy;
        self
    }
}

#[async_trait]
impl ModelBinder for BodyModelBinder {
    async fn bind_model(&self, ctx: &mut ModelBindingContext) -> Result<BindingOutcome, BindError> {
        if !ctx.model_metadata().is_formatter_aware() {
            trace!(model_name = ctx.model_name(), "body binder not applicable");
            return Ok(BindingOutcome::NotApplicable);
        }

        let key = ctx.model_name().to_string();
        let formatter_ctx =
            InputFormatterContext::new(Arc::clone(ctx.request()), ctx.operation().body().clone(), ctx.model_type())
                .with_max_body_size(self.max_body_size);

        let Some(formatter) = self.selector.select_formatter(&formatter_ctx) else {
            let content_type = ctx.request().content_type_raw().unwrap_or_default().to_string();
            warn!(model_name = %key, content_type = %content_type, "no input formatter selected");
            ctx.model_state_mut().add_model_error(key, format!("Unsupported content type '{content_type}'."));
            return Ok(BindingOutcome::Handled);
        };

        debug!(model_name = %key, model_type = ctx.model_type().name(), "read body with selected formatter");
        let read_result = formatter.read(&formatter_ctx).await.and_then(|model| {
            let model_type = ctx.model_type();
            if model_type.describes(&model) {
                Ok(model)
            } else {
                Err(BindError::ModelTypeMismatch { expected: model_type.name(), actual: model.type_name() })
            }
        });

        let model = match read_result {
            Ok(model) => model,
            Err(e) => {
                warn!(model_name = %key, cause = %e, "failed to read body");
                return match self.read_failure_policy {
                    ReadFailurePolicy::Propagate => Err(e),
                    ReadFailurePolicy::RecordModelError => {
                        ctx.model_state_mut().add_model_error(key, e);
                        Ok(BindingOutcome::Handled)
                    }
                };
            }
        };

        let valid = validate_and_commit(ctx, model, self.validator.as_ref(), &self.exclude_filters);
        trace!(model_name = %key, valid, "body model bound");
        Ok(BindingOutcome::Handled)
    }
}

#[cfg(test)]
mod tests {
    use super::{BodyModelBinder, ReadFailurePolicy};
    use crate::binder::test_support::{CountingValidator, Person, binding_context};
    use crate::binder::{BindingOutcome, ModelBinder};
    use crate::error::BindError;
    use crate::formatter::{
        DefaultInputFormatterSelector, InputFormatter, InputFormatterSelector, MockInputFormatter,
        MockInputFormatterSelector,
    };
    use crate::metadata::BinderMetadata;
    use crate::model::Model;
    use crate::model_state::ModelStateDictionary;
    use crate::validation::DefaultBodyModelValidator;
    use std::sync::Arc;

    fn selector_returning(formatter: Option<Arc<dyn InputFormatter>>) -> MockInputFormatterSelector {
        let mut selector = MockInputFormatterSelector::new();
        selector.expect_select_formatter().returning(move |_| formatter.clone());
        selector
    }

    fn person_formatter() -> MockInputFormatter {
        let mut formatter = MockInputFormatter::new();
        formatter
            .expect_read()
            .times(1)
            .returning(|_| Ok(Model::new(Person { name: "hello".into(), age: 18 })));
        formatter
    }

    #[tokio::test]
    async fn test_calls_validation_and_selected_formatter_once() {
        let formatter: Arc<dyn InputFormatter> = Arc::new(person_formatter());
        let validator = Arc::new(CountingValidator::new(true));
        let binder = BodyModelBinder::new(Arc::new(selector_returning(Some(formatter))), validator.clone());

        let mut ctx = binding_context(Some(BinderMetadata::FromBody), "/", Some("application/json"), "{}");
        let outcome = binder.bind_model(&mut ctx).await.unwrap();

        assert_eq!(outcome, BindingOutcome::Handled);
        assert_eq!(validator.calls(), 1);
        assert_eq!(ctx.model_as::<Person>(), Some(&Person { name: "hello".into(), age: 18 }));
        assert!(!ctx.model_state().contains_key("someName"));
    }

    #[tokio::test]
    async fn test_no_input_formatter_found_sets_model_state_error() {
        let validator = Arc::new(CountingValidator::new(true));
        let binder = BodyModelBinder::new(Arc::new(selector_returning(None)), validator.clone());

        let mut ctx = binding_context(Some(BinderMetadata::FromBody), "/", Some("text/xml"), "<person/>");
        let outcome = binder.bind_model(&mut ctx).await.unwrap();

        // handled because the binder understands the metadata
        assert!(outcome.is_handled());
        assert!(ctx.model().is_none());
        assert!(ctx.model_state().contains_key("someName"));
        assert_eq!(
            ctx.model_state().get("someName").unwrap().errors()[0].message(),
            "Unsupported content type 'text/xml'."
        );
        assert_eq!(validator.calls(), 0);
    }

    #[tokio::test]
    async fn test_no_input_formatter_error_dropped_at_limit() {
        let binder = BodyModelBinder::new(Arc::new(selector_returning(None)), Arc::new(CountingValidator::new(true)));

        let mut ctx = binding_context(Some(BinderMetadata::FromBody), "/", Some("text/xml"), "<person/>");
        *ctx.model_state_mut() = ModelStateDictionary::with_max_allowed_errors(1);
        assert!(binder.bind_model(&mut ctx).await.unwrap().is_handled());

        assert!(ctx.model().is_none());
        assert!(!ctx.model_state().contains_key("someName"));
        assert!(ctx.model_state().has_reached_max_errors());
        assert_eq!(ctx.model_state().keys().collect::<Vec<_>>(), vec![""]);
    }

    #[tokio::test]
    async fn test_is_metadata_aware() {
        for (binder_metadata, expected) in [
            (Some(BinderMetadata::FromBody), true),
            (Some(BinderMetadata::FromQuery), false),
            (Some(BinderMetadata::FromRoute("id".into())), false),
            (None, false),
        ] {
            let binder = BodyModelBinder::new(
                Arc::new(selector_returning(None)),
                Arc::new(CountingValidator::new(true)),
            );
            let mut ctx = binding_context(binder_metadata, "/", None, "");
            let outcome = binder.bind_model(&mut ctx).await.unwrap();
            assert_eq!(outcome.is_handled(), expected);
        }
    }

    #[tokio::test]
    async fn test_not_applicable_has_no_side_effects() {
        let mut selector = MockInputFormatterSelector::new();
        selector.expect_select_formatter().never();
        let validator = Arc::new(CountingValidator::new(true));
        let binder = BodyModelBinder::new(Arc::new(selector), validator.clone());

        let mut ctx = binding_context(Some(BinderMetadata::FromQuery), "/", Some("application/json"), "{}");
        for _ in 0..3 {
            assert_eq!(binder.bind_model(&mut ctx).await.unwrap(), BindingOutcome::NotApplicable);
        }

        assert_eq!(validator.calls(), 0);
        assert!(ctx.model().is_none());
        assert!(ctx.model_state().is_empty());
        assert!(ctx.operation().body().can_consume().await);
    }

    #[tokio::test]
    async fn test_invalid_model_is_still_committed() {
        let formatter: Arc<dyn InputFormatter> = Arc::new(person_formatter());
        let validator = Arc::new(CountingValidator::new(false));
        let binder = BodyModelBinder::new(Arc::new(selector_returning(Some(formatter))), validator.clone());

        let mut ctx = binding_context(Some(BinderMetadata::FromBody), "/", Some("application/json"), "{}");
        assert!(binder.bind_model(&mut ctx).await.unwrap().is_handled());

        assert_eq!(validator.calls(), 1);
        assert!(ctx.model_as::<Person>().is_some());
        assert!(!ctx.model_state().is_valid_field("someName"));
    }

    #[tokio::test]
    async fn test_read_failure_is_propagated() {
        let mut formatter = MockInputFormatter::new();
        formatter.expect_read().times(1).returning(|_| Err(BindError::invalid_body("expected value")));
        let formatter: Arc<dyn InputFormatter> = Arc::new(formatter);
        let validator = Arc::new(CountingValidator::new(true));
        let binder = BodyModelBinder::new(Arc::new(selector_returning(Some(formatter))), validator.clone());

        let mut ctx = binding_context(Some(BinderMetadata::FromBody), "/", Some("application/json"), "{");
        let result = binder.bind_model(&mut ctx).await;

        assert!(matches!(result, Err(BindError::InvalidBody { .. })));
        assert_eq!(validator.calls(), 0);
        assert!(ctx.model().is_none());
    }

    #[tokio::test]
    async fn test_read_failure_recorded_in_model_state() {
        let mut formatter = MockInputFormatter::new();
        formatter.expect_read().times(1).returning(|_| Err(BindError::invalid_body("expected value")));
        let formatter: Arc<dyn InputFormatter> = Arc::new(formatter);
        let validator = Arc::new(CountingValidator::new(true));
        let binder = BodyModelBinder::new(Arc::new(selector_returning(Some(formatter))), validator.clone())
            .with_read_failure_policy(ReadFailurePolicy::RecordModelError);

        let mut ctx = binding_context(Some(BinderMetadata::FromBody), "/", Some("application/json"), "{");
        assert!(binder.bind_model(&mut ctx).await.unwrap().is_handled());

        assert_eq!(validator.calls(), 0);
        assert!(ctx.model().is_none());
        assert_eq!(ctx.model_state().get("someName").unwrap().errors()[0].message(), "invalid body: expected value");
    }

    #[tokio::test]
    async fn test_formatter_returning_other_type() {
        let mut formatter = MockInputFormatter::new();
        formatter.expect_read().times(1).returning(|_| Ok(Model::new("not a person".to_string())));
        let formatter: Arc<dyn InputFormatter> = Arc::new(formatter);
        let binder =
            BodyModelBinder::new(Arc::new(selector_returning(Some(formatter))), Arc::new(CountingValidator::new(true)));

        let mut ctx = binding_context(Some(BinderMetadata::FromBody), "/", Some("application/json"), "{}");
        let result = binder.bind_model(&mut ctx).await;
        assert!(matches!(result, Err(BindError::ModelTypeMismatch { .. })));
    }

    #[tokio::test]
    async fn test_json_body_with_default_collaborators() {
        let selector: Arc<dyn InputFormatterSelector> = Arc::new(DefaultInputFormatterSelector::with_default_formatters());
        let binder = BodyModelBinder::new(selector, Arc::new(DefaultBodyModelValidator::new()));

        let mut ctx = binding_context(
            Some(BinderMetadata::FromBody),
            "/",
            Some("application/json"),
            r#"{"name":"","age":3}"#,
        );
        assert!(binder.bind_model(&mut ctx).await.unwrap().is_handled());

        assert_eq!(ctx.model_as::<Person>().map(|person| person.age), Some(3));
        assert!(ctx.model_state().contains_key("someName.name"));
        assert!(!ctx.operation().body().can_consume().await);
    }

    #[tokio::test]
    async fn test_body_too_large() {
        let selector: Arc<dyn InputFormatterSelector> = Arc::new(DefaultInputFormatterSelector::with_default_formatters());
        let binder =
            BodyModelBinder::new(selector, Arc::new(DefaultBodyModelValidator::new())).with_max_body_size(8);

        let mut ctx = binding_context(
            Some(BinderMetadata::FromBody),
            "/",
            Some("application/json"),
            r#"{"name":"hello","age":3}"#,
        );
        let error = binder.bind_model(&mut ctx).await.unwrap_err();
        assert_eq!(error.status_code(), http::StatusCode::PAYLOAD_TOO_LARGE);
    }
}
