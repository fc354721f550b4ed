//! Negotiation and codec error types.

use http::StatusCode;
use thiserror::Error;

/// Content negotiation failed: no registered codec intersects what the
/// request declared or accepts.
///
/// Negotiation failures are terminal for the request and surface as a 4xx
/// response; they are never retried or silently defaulted.
#[derive(Debug, Clone, Error)]
pub enum NegotiationError {
    /// No parser is registered for the request's declared content type.
    #[error("no parser found for content type '{content_type}'")]
    NoParserFound {
        /// The declared `Content-Type` value (or `<none>` when absent).
        content_type: String,
    },

    /// No registered serializer's media type intersects the client's
    /// acceptable types.
    #[error("no serializer found for accepted types '{accept}'")]
    NoSerializerFound {
        /// The `Accept` header value the client sent.
        accept: String,
    },
}

impl NegotiationError {
    /// The HTTP status a negotiation failure maps to: 415 for an
    /// unsupported request body, 406 for an unsatisfiable `Accept`.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NoParserFound { .. } => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::NoSerializerFound { .. } => StatusCode::NOT_ACCEPTABLE,
        }
    }

    /// Machine-readable code for the error envelope.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NoParserFound { .. } => "NO_PARSER_FOUND",
            Self::NoSerializerFound { .. } => "NO_SERIALIZER_FOUND",
        }
    }
}

/// A registered parser failed to decode the body bytes.
///
/// Decode failures are binding failures ("unparsable value"), not
/// negotiation failures: the codec was found, the payload was bad.
#[derive(Debug, Clone, Error)]
#[error("failed to decode '{media_type}' body: {message}")]
pub struct DecodeError {
    /// The media type the parser was registered under.
    pub media_type: String,
    /// What went wrong.
    pub message: String,
}

impl DecodeError {
    /// Creates a decode error.
    #[must_use]
    pub fn new(media_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            media_type: media_type.into(),
            message: message.into(),
        }
    }
}

/// A registered serializer failed to encode a response document.
#[derive(Debug, Clone, Error)]
#[error("failed to encode '{media_type}' body: {message}")]
pub struct EncodeError {
    /// The media type the serializer was registered under.
    pub media_type: String,
    /// What went wrong.
    pub message: String,
}

impl EncodeError {
    /// Creates an encode error.
    #[must_use]
    pub fn new(media_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            media_type: media_type.into(),
            message: message.into(),
        }
    }
}
