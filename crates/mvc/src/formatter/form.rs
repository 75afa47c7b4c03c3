use crate::error::BindError;
use crate::formatter::{InputFormatter, InputFormatterContext};
use crate::model::Model;
use async_trait::async_trait;
use mime::Mime;
use tracing::trace;

/// Represented as form data
///
/// when `post` as `application/x-www-form-urlencoded`, the body is decoded
/// with `serde_urlencoded` into the requested model type.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormInputFormatter;

impl FormInputFormatter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl InputFormatter for FormInputFormatter {
    fn supported_media_types(&self) -> Vec<Mime> {
        vec![mime::APPLICATION_WWW_FORM_URLENCODED]
    }

    async fn read(&self, ctx: &InputFormatterContext) -> Result<Model, BindError> {
        let bytes = ctx.read_body().await?;
        trace!(len = bytes.len(), model_type = ctx.model_type().name(), "decode form body");
        ctx.model_type().from_form(&bytes)
    }
}
