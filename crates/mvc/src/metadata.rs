use crate::model::ModelType;
use http::HeaderName;

/// Marks which binder is responsible for a model.
///
/// Each binder opts in on exactly one tag and passes on every other one, so
/// the tag decides the binder without any binder knowing about the others.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BinderMetadata {
    /// Read from the request body through an input formatter
    FromBody,
    /// Read from the url query string
    FromQuery,
    /// Read from a request header
    FromHeader(HeaderName),
    /// Read from a path parameter
    FromRoute(String),
}

impl BinderMetadata {
    /// Returns true if the model is read from the body by an input formatter
    #[inline]
    pub fn is_formatter_aware(&self) -> bool {
        matches!(self, BinderMetadata::FromBody)
    }
}

/// What a binder knows about the model it is asked to produce.
#[derive(Debug, Clone)]
pub struct ModelMetadata {
    model_type: ModelType,
    binder_metadata: Option<BinderMetadata>,
}

impl ModelMetadata {
    pub fn new(model_type: ModelType) -> Self {
        Self { model_type, binder_metadata: None }
    }

    pub fn with_binder_metadata(mut self, binder_metadata: BinderMetadata) -> Self {
        self.binder_metadata = Some(binder_metadata);
        self
    }

    pub fn set_binder_metadata(&mut self, binder_metadata: Option<BinderMetadata>) {
        self.binder_metadata = binder_metadata;
    }

    #[inline]
    pub fn model_type(&self) -> ModelType {
        self.model_type
    }

    #[inline]
    pub fn binder_metadata(&self) -> Option<&BinderMetadata> {
        self.binder_metadata.as_ref()
    }

    #[inline]
    pub fn is_formatter_aware(&self) -> bool {
        self.binder_metadata.as_ref().is_some_and(BinderMetadata::is_formatter_aware)
    }
}
