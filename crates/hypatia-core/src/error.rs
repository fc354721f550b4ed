//! The top-level error taxonomy.
//!
//! Four kinds of failure flow through the dispatch pipeline: binding errors
//! and negotiation errors (always 4xx, structured envelope), schema errors
//! (startup-fatal; seeing one at request time is a bug), and handler faults
//! (matched against the fault registry). Nothing is retried.

use http::StatusCode;
use serde_json::json;
use thiserror::Error;

use hypatia_codec::NegotiationError;
use hypatia_extract::{BindError, BindingError};
use hypatia_faults::Fault;
use hypatia_schema::{Document, SchemaError};

/// Any failure the dispatch pipeline can produce.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A parameter failed extraction, coercion or assembly.
    #[error(transparent)]
    Binding(#[from] BindingError),

    /// No codec intersects the request's declared or accepted media types.
    #[error(transparent)]
    Negotiation(#[from] NegotiationError),

    /// A declared type could not be introspected. Startup validation should
    /// make this unreachable at request time.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// The handler surfaced a business-logic fault.
    #[error("{0}")]
    Handler(Box<dyn Fault>),
}

impl ApiError {
    /// Wraps a handler fault.
    #[must_use]
    pub fn handler(fault: impl Fault) -> Self {
        Self::Handler(Box::new(fault))
    }

    /// The HTTP status for failures the pipeline renders itself. Handler
    /// faults are rendered through the fault registry instead and default
    /// to 500 here.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Binding(e) => e.status_code(),
            Self::Negotiation(e) => e.status_code(),
            Self::Schema(_) | Self::Handler(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable code for the error envelope.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Binding(e) => e.error_code(),
            Self::Negotiation(e) => e.error_code(),
            Self::Schema(_) => "SCHEMA_ERROR",
            Self::Handler(_) => "HANDLER_FAULT",
        }
    }
}

impl From<BindError> for ApiError {
    fn from(err: BindError) -> Self {
        match err {
            BindError::Parameter(e) => Self::Binding(e),
            BindError::Negotiation(e) => Self::Negotiation(e),
            BindError::Schema(e) => Self::Schema(e),
        }
    }
}

/// The structured envelope binding and negotiation failures are rendered
/// as: `{"error": {"code": ..., "message": ...}}`.
#[must_use]
pub fn error_envelope(code: &str, message: &str) -> Document {
    json!({
        "error": {
            "code": code,
            "message": message,
        }
    })
}
