//! Input formatters turn a request body into a model.
//!
//! A formatter declares which content types it understands; an
//! [`InputFormatterSelector`] picks one formatter per bind attempt and the
//! body binder calls its [`read`](InputFormatter::read) at most once.
//!
//! Two formatters are provided:
//! - [`JsonInputFormatter`]: `application/json`, `text/json` and any `+json` suffix
//! - [`FormInputFormatter`]: `application/x-www-form-urlencoded`

mod form;
mod json;

pub use form::FormInputFormatter;
pub use json::JsonInputFormatter;

use crate::body::OptionReqBody;
use crate::error::BindError;
use crate::model::{Model, ModelType};
use crate::request::RequestContext;
use async_trait::async_trait;
use mime::Mime;
use std::fmt;
use std::sync::Arc;

/// Default limit of the bytes a formatter collects from the body
pub const DEFAULT_MAX_BODY_SIZE: usize = 4 * 1024 * 1024;

/// What a formatter needs to know to read one model.
#[derive(Debug, Clone)]
pub struct InputFormatterContext {
    request: Arc<RequestContext>,
    body: OptionReqBody,
    model_type: ModelType,
    max_body_size: usize,
}

impl InputFormatterContext {
    pub fn new(request: Arc<RequestContext>, body: OptionReqBody, model_type: ModelType) -> Self {
        Self { request, body, model_type, max_body_size: DEFAULT_MAX_BODY_SIZE }
    }

    pub fn with_max_body_size(mut self, max_body_size: usize) -> Self {
        self.max_body_size = max_body_size;
        self
    }

    #[inline]
    pub fn request(&self) -> &RequestContext {
        &self.request
    }

    #[inline]
    pub fn body(&self) -> &OptionReqBody {
        &self.body
    }

    #[inline]
    pub fn model_type(&self) -> ModelType {
        self.model_type
    }

    #[inline]
    pub fn max_body_size(&self) -> usize {
        self.max_body_size
    }

    #[inline]
    pub fn content_type(&self) -> Option<Mime> {
        self.request.content_type()
    }

    /// Collects the body within the size limit, an empty body is an error
    pub async fn read_body(&self) -> Result<bytes::Bytes, BindError> {
        let bytes = self.body.collect_limited(self.max_body_size).await?;
        if bytes.is_empty() {
            return Err(BindError::EmptyBody);
        }
        Ok(bytes)
    }
}

/// Reads a model from the request body for a set of content types.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InputFormatter: Send + Sync {
    /// The content types this formatter reads
    fn supported_media_types(&self) -> Vec<Mime>;

    /// Returns true if the request's content type matches one of the supported media types
    fn can_read(&self, ctx: &InputFormatterContext) -> bool {
        let Some(content_type) = ctx.content_type() else {
            return false;
        };
        self.supported_media_types().iter().any(|supported| media_type_matches(supported, &content_type))
    }

    async fn read(&self, ctx: &InputFormatterContext) -> Result<Model, BindError>;
}

/// Picks the formatter for a bind attempt.
#[cfg_attr(test, mockall::automock)]
pub trait InputFormatterSelector: Send + Sync {
    fn select_formatter(&self, ctx: &InputFormatterContext) -> Option<Arc<dyn InputFormatter>>;
}

/// Selects the first registered formatter which can read the request.
#[derive(Clone, Default)]
pub struct DefaultInputFormatterSelector {
    formatters: Vec<Arc<dyn InputFormatter>>,
}

impl fmt::Debug for DefaultInputFormatterSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let media_types = self
            .formatters
            .iter()
            .flat_map(|formatter| formatter.supported_media_types())
            .map(|mime| mime.to_string())
            .collect::<Vec<_>>();
        f.debug_struct("DefaultInputFormatterSelector").field("media_types", &media_types).finish()
    }
}

impl DefaultInputFormatterSelector {
    pub fn new(formatters: Vec<Arc<dyn InputFormatter>>) -> Self {
        Self { formatters }
    }

    /// JSON first, then urlencoded form
    pub fn with_default_formatters() -> Self {
        Self::new(vec![Arc::new(JsonInputFormatter::new()), Arc::new(FormInputFormatter::new())])
    }

    pub fn formatters(&self) -> &[Arc<dyn InputFormatter>] {
        &self.formatters
    }
}

impl InputFormatterSelector for DefaultInputFormatterSelector {
    fn select_formatter(&self, ctx: &InputFormatterContext) -> Option<Arc<dyn InputFormatter>> {
        self.formatters.iter().find(|formatter| formatter.can_read(ctx)).cloned()
    }
}

/// Compares type and subtype, ignoring parameters; `*` in `supported` matches anything
pub(crate) fn media_type_matches(supported: &Mime, actual: &Mime) -> bool {
    let type_matches = supported.type_() == mime::STAR || supported.type_() == actual.type_();
    let subtype_matches = supported.subtype() == mime::STAR || supported.subtype() == actual.subtype();
    type_matches && subtype_matches
}
