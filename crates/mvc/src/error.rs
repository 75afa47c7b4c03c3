use http::StatusCode;
use std::io;
use thiserror::Error;

/// Boxed error carried by request bodies.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Failures that abort a bind attempt.
///
/// Recoverable problems (no formatter for the content type, validation
/// failures, malformed query strings) never surface as a `BindError`; they
/// are recorded in the [`ModelStateDictionary`](crate::ModelStateDictionary)
/// instead.
#[derive(Error, Debug)]
pub enum BindError {
    #[error("request body is empty")]
    EmptyBody,

    #[error("body has been consumed")]
    BodyConsumed,

    #[error("payload too large, exceed the limit {limit}")]
    PayloadTooLarge { limit: usize },

    #[error("invalid body: {reason}")]
    InvalidBody { reason: String },

    #[error("invalid query string: {reason}")]
    InvalidQuery { reason: String },

    #[error("unsupported content type: {content_type}")]
    UnsupportedContentType { content_type: String },

    #[error("model type mismatch, expect {expected} but got {actual}")]
    ModelTypeMismatch { expected: &'static str, actual: &'static str },

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl BindError {
    pub fn payload_too_large(limit: usize) -> Self {
        Self::PayloadTooLarge { limit }
    }

    pub fn invalid_body<S: ToString>(str: S) -> Self {
        Self::InvalidBody { reason: str.to_string() }
    }

    pub fn invalid_query<S: ToString>(str: S) -> Self {
        Self::InvalidQuery { reason: str.to_string() }
    }

    pub fn unsupported_content_type<S: ToString>(str: S) -> Self {
        Self::UnsupportedContentType { content_type: str.to_string() }
    }

    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self::Io { source: e.into() }
    }

    /// The status code the surrounding pipeline should answer with when this
    /// error escapes the binder.
    pub fn status_code(&self) -> StatusCode {
        match self {
            BindError::EmptyBody
            | BindError::BodyConsumed
            | BindError::InvalidBody { .. }
            | BindError::InvalidQuery { .. }
            | BindError::Io { .. } => StatusCode::BAD_REQUEST,
            BindError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            BindError::UnsupportedContentType { .. } => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            BindError::ModelTypeMismatch { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
