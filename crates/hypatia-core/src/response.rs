//! The response abstraction handed back to the transport.

use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::{HeaderMap, HeaderValue, StatusCode};

/// Status, headers and body bytes: everything the transport needs to send.
#[derive(Debug, Clone)]
pub struct ResponseParts {
    /// The HTTP status.
    pub status: StatusCode,
    /// Response headers; at minimum the content type when there is a body.
    pub headers: HeaderMap,
    /// The body bytes; empty for payload-less responses.
    pub body: Bytes,
}

impl ResponseParts {
    /// A response with no body.
    #[must_use]
    pub fn empty(status: StatusCode) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    /// A response with a body and its content type.
    #[must_use]
    pub fn with_body(status: StatusCode, content_type: &str, body: Bytes) -> Self {
        let mut headers = HeaderMap::new();
        if let Ok(value) = HeaderValue::from_str(content_type) {
            headers.insert(CONTENT_TYPE, value);
        }
        Self {
            status,
            headers,
            body,
        }
    }

    /// The `Content-Type` header, when set.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok())
    }
}
