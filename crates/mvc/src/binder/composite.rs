use crate::binder::{BindingOutcome, ModelBinder};
use crate::context::ModelBindingContext;
use crate::error::BindError;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Tries its binders in order, the first one which handles the request wins.
///
/// If no binder applies the composite itself reports
/// [`BindingOutcome::NotApplicable`], so composites can be nested.
#[derive(Clone, Default)]
pub struct CompositeModelBinder {
    binders: Vec<Arc<dyn ModelBinder>>,
}

impl fmt::Debug for CompositeModelBinder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeModelBinder").field("binders", &self.binders.len()).finish()
    }
}

impl CompositeModelBinder {
    pub fn new(binders: Vec<Arc<dyn ModelBinder>>) -> Self {
        Self { binders }
    }

    pub fn with<B: ModelBinder + 'static>(mut self, binder: B) -> Self {
        self.binders.push(Arc::new(binder));
        self
    }

    pub fn binders(&self) -> &[Arc<dyn ModelBinder>] {
        &self.binders
    }
}

#[async_trait]
impl ModelBinder for CompositeModelBinder {
    async fn bind_model(&self, ctx: &mut ModelBindingContext) -> Result<BindingOutcome, BindError> {
        for (index, binder) in self.binders.iter().enumerate() {
            if binder.bind_model(ctx).await?.is_handled() {
                debug!(model_name = ctx.model_name(), binder = index, "model handled");
                return Ok(BindingOutcome::Handled);
            }
        }

        debug!(model_name = ctx.model_name(), "no binder applies");
        Ok(BindingOutcome::NotApplicable)
    }
}

#[cfg(test)]
mod tests {
    use super::CompositeModelBinder;
    use crate::binder::test_support::{Person, binding_context};
    use crate::binder::{BindingOutcome, BodyModelBinder, ModelBinder, QueryModelBinder};
    use crate::context::ModelBindingContext;
    use crate::error::BindError;
    use crate::formatter::DefaultInputFormatterSelector;
    use crate::metadata::BinderMetadata;
    use crate::validation::DefaultBodyModelValidator;
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedBinder {
        outcome: BindingOutcome,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl ModelBinder for FixedBinder {
        async fn bind_model(&self, _ctx: &mut ModelBindingContext) -> Result<BindingOutcome, BindError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.outcome)
        }
    }

    struct FailingBinder;

    #[async_trait]
    impl ModelBinder for FailingBinder {
        async fn bind_model(&self, _ctx: &mut ModelBindingContext) -> Result<BindingOutcome, BindError> {
            Err(BindError::EmptyBody)
        }
    }

    fn default_chain() -> CompositeModelBinder {
        let validator = Arc::new(DefaultBodyModelValidator::new());
        CompositeModelBinder::default()
            .with(BodyModelBinder::new(
                Arc::new(DefaultInputFormatterSelector::with_default_formatters()),
                validator.clone(),
            ))
            .with(QueryModelBinder::new(validator))
    }

    #[tokio::test]
    async fn test_first_handled_wins() {
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));
        let third = Arc::new(AtomicUsize::new(0));
        let binder = CompositeModelBinder::default()
            .with(FixedBinder { outcome: BindingOutcome::NotApplicable, calls: first.clone() })
            .with(FixedBinder { outcome: BindingOutcome::Handled, calls: second.clone() })
            .with(FixedBinder { outcome: BindingOutcome::Handled, calls: third.clone() });

        let mut ctx = binding_context(None, "/", None, "");
        assert_eq!(binder.bind_model(&mut ctx).await.unwrap(), BindingOutcome::Handled);
        assert_eq!(first.load(Ordering::SeqCst), 1);
        assert_eq!(second.load(Ordering::SeqCst), 1);
        assert_eq!(third.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_error_stops_the_chain() {
        let calls = Arc::new(AtomicUsize::new(0));
        let binder = CompositeModelBinder::default()
            .with(FailingBinder)
            .with(FixedBinder { outcome: BindingOutcome::Handled, calls: calls.clone() });

        let mut ctx = binding_context(None, "/", None, "");
        assert!(matches!(binder.bind_model(&mut ctx).await, Err(BindError::EmptyBody)));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_dispatch_by_metadata() {
        let binder = default_chain();
        assert_eq!(binder.binders().len(), 2);

        let mut ctx = binding_context(
            Some(BinderMetadata::FromBody),
            "/employee?name=query&age=1",
            Some("application/x-www-form-urlencoded"),
            "name=body&age=2",
        );
        assert!(binder.bind_model(&mut ctx).await.unwrap().is_handled());
        assert_eq!(ctx.model_as::<Person>().map(|person| person.name.as_str()), Some("body"));

        let mut ctx = binding_context(
            Some(BinderMetadata::FromQuery),
            "/employee?name=query&age=1",
            Some("application/x-www-form-urlencoded"),
            "name=body&age=2",
        );
        assert!(binder.bind_model(&mut ctx).await.unwrap().is_handled());
        assert_eq!(ctx.model_as::<Person>().map(|person| person.name.as_str()), Some("query"));
    }

    #[tokio::test]
    async fn test_no_binder_applies() {
        let binder = default_chain();
        for binder_metadata in [None, Some(BinderMetadata::FromHeader(http::header::ACCEPT))] {
            let mut ctx = binding_context(binder_metadata, "/?name=hello&age=1", Some("application/json"), "{}");
            assert_eq!(binder.bind_model(&mut ctx).await.unwrap(), BindingOutcome::NotApplicable);
            assert!(ctx.model().is_none());
            assert!(ctx.model_state().is_empty());
        }

        let empty = CompositeModelBinder::default();
        let mut ctx = binding_context(Some(BinderMetadata::FromBody), "/", None, "");
        assert_eq!(empty.bind_model(&mut ctx).await.unwrap(), BindingOutcome::NotApplicable);
    }
}
