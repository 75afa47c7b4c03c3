//! Binding contexts.
//!
//! An [`OperationBindingContext`] is created once per request and shared by
//! every model bound for that request. A [`ModelBindingContext`] is created
//! per bind attempt by the caller, mutated by the binder, and read back by
//! the caller afterwards.

use crate::body::OptionReqBody;
use crate::error::BoxError;
use crate::metadata::ModelMetadata;
use crate::model::{Model, ModelType};
use crate::model_state::ModelStateDictionary;
use crate::request::RequestContext;
use bytes::Bytes;
use http::Request;
use http_body::Body as HttpBody;
use std::any::Any;
use std::sync::Arc;

/// The request every bind attempt of one operation reads from.
#[derive(Debug, Clone)]
pub struct OperationBindingContext {
    request: Arc<RequestContext>,
    body: OptionReqBody,
}

impl OperationBindingContext {
    pub fn new(request: RequestContext, body: OptionReqBody) -> Self {
        Self { request: Arc::new(request), body }
    }

    /// Splits `request` into its head and a consume-once body
    pub fn from_request<B>(request: Request<B>) -> Self
    where
        B: HttpBody<Data = Bytes> + Send + Sync + 'static,
        B::Error: Into<BoxError>,
    {
        let (parts, body) = request.into_parts();
        Self::new(RequestContext::new(parts), OptionReqBody::new(body))
    }

    #[inline]
    pub fn request(&self) -> &Arc<RequestContext> {
        &self.request
    }

    #[inline]
    pub fn body(&self) -> &OptionReqBody {
        &self.body
    }
}

/// Everything one bind attempt reads and writes.
#[derive(Debug)]
pub struct ModelBindingContext {
    model_metadata: ModelMetadata,
    model_name: String,
    model_state: ModelStateDictionary,
    model: Option<Model>,
    operation: OperationBindingContext,
}

impl ModelBindingContext {
    pub fn new<S: Into<String>>(
        model_metadata: ModelMetadata,
        model_name: S,
        operation: OperationBindingContext,
    ) -> Self {
        Self {
            model_metadata,
            model_name: model_name.into(),
            model_state: ModelStateDictionary::new(),
            model: None,
            operation,
        }
    }

    pub fn with_model_state(mut self, model_state: ModelStateDictionary) -> Self {
        self.model_state = model_state;
        self
    }

    #[inline]
    pub fn model_metadata(&self) -> &ModelMetadata {
        &self.model_metadata
    }

    #[inline]
    pub fn model_metadata_mut(&mut self) -> &mut ModelMetadata {
        &mut self.model_metadata
    }

    #[inline]
    pub fn model_type(&self) -> ModelType {
        self.model_metadata.model_type()
    }

    #[inline]
    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    #[inline]
    pub fn model_state(&self) -> &ModelStateDictionary {
        &self.model_state
    }

    #[inline]
    pub fn model_state_mut(&mut self) -> &mut ModelStateDictionary {
        &mut self.model_state
    }

    #[inline]
    pub fn model(&self) -> Option<&Model> {
        self.model.as_ref()
    }

    /// Returns the bound value if it is a `T`
    pub fn model_as<T: Any>(&self) -> Option<&T> {
        self.model.as_ref().and_then(Model::downcast_ref::<T>)
    }

    pub fn set_model(&mut self, model: Option<Model>) {
        self.model = model;
    }

    pub fn take_model(&mut self) -> Option<Model> {
        self.model.take()
    }

    #[inline]
    pub fn operation(&self) -> &OperationBindingContext {
        &self.operation
    }

    #[inline]
    pub fn request(&self) -> &Arc<RequestContext> {
        self.operation.request()
    }

    /// Consumes the context, returning the bound value and the model state
    pub fn into_result(self) -> (Option<Model>, ModelStateDictionary) {
        (self.model, self.model_state)
    }
}
