//! Request head handed to binders.
//!
//! Binders never see the full [`http::Request`]: the head is kept in a
//! [`RequestContext`] shared by every binder of an operation, while the body
//! travels separately as an [`OptionReqBody`](crate::OptionReqBody) so that it
//! can be consumed at most once.

use http::request::Parts;
use http::{HeaderMap, Method, Uri, Version};
use mime::Mime;

/// Represents the head of the HTTP request being bound.
#[derive(Debug)]
pub struct RequestContext {
    parts: Parts,
}

impl RequestContext {
    /// Creates a new RequestContext from the request parts
    pub fn new(parts: Parts) -> Self {
        Self { parts }
    }

    /// Returns the HTTP method of the request
    pub fn method(&self) -> &Method {
        &self.parts.method
    }

    /// Returns the URI of the request
    pub fn uri(&self) -> &Uri {
        &self.parts.uri
    }

    /// Returns the HTTP version of the request
    pub fn version(&self) -> Version {
        self.parts.version
    }

    /// Returns the HTTP headers of the request
    pub fn headers(&self) -> &HeaderMap {
        &self.parts.headers
    }

    /// Returns the raw query string, if any
    pub fn query(&self) -> Option<&str> {
        self.parts.uri.query()
    }

    /// Returns the raw `Content-Type` header value
    pub fn content_type_raw(&self) -> Option<&str> {
        self.parts.headers.get(http::header::CONTENT_TYPE).and_then(|value| value.to_str().ok())
    }

    /// Returns the parsed `Content-Type` header
    /// Returns None if the header is absent or can't be parsed
    pub fn content_type(&self) -> Option<Mime> {
        self.content_type_raw().and_then(|raw| raw.parse::<Mime>().ok())
    }
}

impl From<Parts> for RequestContext {
    fn from(parts: Parts) -> Self {
        RequestContext::new(parts)
    }
}
