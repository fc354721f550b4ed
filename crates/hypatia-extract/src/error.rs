//! Binding error types.

use http::StatusCode;
use std::fmt;
use thiserror::Error;

use hypatia_codec::NegotiationError;
use hypatia_schema::SchemaError;

use crate::descriptor::ParameterSource;

/// A request could not be bound to the declared parameter type.
///
/// Carries the offending source and parameter name so the client response
/// can identify exactly what was wrong. Binding failures are terminal for
/// the request: they surface as a 4xx response and are never retried or
/// silently defaulted.
///
/// # Example
///
/// ```rust
/// use hypatia_extract::{BindingError, ParameterSource};
/// use http::StatusCode;
///
/// let err = BindingError::missing(ParameterSource::Query, "limit");
/// assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
/// assert_eq!(err.parameter(), Some("limit"));
/// assert!(err.to_string().contains("query"));
/// ```
#[derive(Debug)]
pub struct BindingError {
    source_location: ParameterSource,
    kind: BindingErrorKind,
    parameter: Option<String>,
    message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BindingErrorKind {
    /// A required parameter was absent.
    Missing,
    /// A raw value did not parse as the declared kind.
    Unparsable,
    /// The body bytes could not be decoded by the negotiated parser.
    UndecodableBody,
    /// A declared path parameter has no matching template slot at runtime.
    MalformedTemplate,
    /// The accumulated fields did not assemble into the declared type.
    Assembly,
}

impl BindingError {
    /// A required parameter was absent from its source.
    #[must_use]
    pub fn missing(source: ParameterSource, parameter: impl Into<String>) -> Self {
        let parameter = parameter.into();
        Self {
            source_location: source,
            kind: BindingErrorKind::Missing,
            message: format!("missing required {source} parameter: {parameter}"),
            parameter: Some(parameter),
        }
    }

    /// A raw value did not parse as the kind the field's schema declares.
    #[must_use]
    pub fn unparsable(
        source: ParameterSource,
        parameter: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        let parameter = parameter.into();
        Self {
            source_location: source,
            kind: BindingErrorKind::Unparsable,
            message: format!(
                "invalid {source} parameter '{parameter}': {}",
                details.into()
            ),
            parameter: Some(parameter),
        }
    }

    /// The negotiated parser rejected the body bytes.
    #[must_use]
    pub fn undecodable_body(details: impl Into<String>) -> Self {
        Self {
            source_location: ParameterSource::Body,
            kind: BindingErrorKind::UndecodableBody,
            message: details.into(),
            parameter: None,
        }
    }

    /// A declared path parameter had no slot captured for it: the route's
    /// template and its parameter type disagree.
    #[must_use]
    pub fn malformed_template(parameter: impl Into<String>) -> Self {
        let parameter = parameter.into();
        Self {
            source_location: ParameterSource::Path,
            kind: BindingErrorKind::MalformedTemplate,
            message: format!("no template slot captured for path parameter '{parameter}'"),
            parameter: Some(parameter),
        }
    }

    /// The accumulated fields did not deserialize into the declared type.
    #[must_use]
    pub fn assembly(type_name: &str, details: impl Into<String>) -> Self {
        Self {
            source_location: ParameterSource::Body,
            kind: BindingErrorKind::Assembly,
            message: format!("could not assemble '{type_name}': {}", details.into()),
            parameter: None,
        }
    }

    /// The source the failing parameter was being extracted from.
    #[must_use]
    pub fn source_location(&self) -> ParameterSource {
        self.source_location
    }

    /// The failing parameter's declared transport name, if applicable.
    #[must_use]
    pub fn parameter(&self) -> Option<&str> {
        self.parameter.as_deref()
    }

    /// The HTTP status this failure maps to. Always a 4xx.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }

    /// Machine-readable code for the error envelope.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self.kind {
            BindingErrorKind::Missing => "MISSING_PARAMETER",
            BindingErrorKind::Unparsable => "INVALID_PARAMETER",
            BindingErrorKind::UndecodableBody => "UNDECODABLE_BODY",
            BindingErrorKind::MalformedTemplate => "MALFORMED_TEMPLATE",
            BindingErrorKind::Assembly => "ASSEMBLY_FAILED",
        }
    }
}

impl fmt::Display for BindingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for BindingError {}

/// Everything that can go wrong while binding one request.
#[derive(Debug, Error)]
pub enum BindError {
    /// A parameter failed extraction, coercion or assembly.
    #[error(transparent)]
    Parameter(#[from] BindingError),

    /// The body's content type had no registered parser.
    #[error(transparent)]
    Negotiation(#[from] NegotiationError),

    /// The parameter type could not be introspected. This indicates a route
    /// that route registration should have rejected at startup.
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

impl BindError {
    /// The HTTP status this failure maps to.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Parameter(e) => e.status_code(),
            Self::Negotiation(e) => e.status_code(),
            Self::Schema(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
