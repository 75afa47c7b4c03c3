use crate::error::BindError;
use crate::formatter::{InputFormatter, InputFormatterContext};
use crate::model::Model;
use async_trait::async_trait;
use mime::Mime;
use tracing::trace;

/// Represented as json data
///
/// when `post` as `application/json`, `text/json` or any `+json` suffixed
/// media type such as `application/problem+json`, the body is decoded with
/// `serde_json` into the requested model type.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonInputFormatter;

impl JsonInputFormatter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl InputFormatter for JsonInputFormatter {
    fn supported_media_types(&self) -> Vec<Mime> {
        vec![mime::APPLICATION_JSON]
    }

    fn can_read(&self, ctx: &InputFormatterContext) -> bool {
        let Some(content_type) = ctx.content_type() else {
            return false;
        };
        let json_subtype = content_type.subtype() == mime::JSON
            && (content_type.type_() == mime::APPLICATION || content_type.type_() == mime::TEXT);
        json_subtype || content_type.suffix() == Some(mime::JSON)
    }

    async fn read(&self, ctx: &InputFormatterContext) -> Result<Model, BindError> {
        let bytes = ctx.read_body().await?;
        trace!(len = bytes.len(), model_type = ctx.model_type().name(), "decode json body");
        ctx.model_type().from_json(&bytes)
    }
}
