//! Route declarations.
//!
//! A [`RouteSpec`] is the registered form of one route: method, parsed URL
//! template, operation metadata, the introspected specs of its declared
//! types, its security model, and the fault kinds it documents. Specs are
//! built by [`RouteBuilder`] during startup and are immutable afterwards.

use std::sync::Arc;

use http::{Method, StatusCode};
use thiserror::Error;
use tracing::debug;

use hypatia_extract::{ParameterDescriptor, ParameterObject, ParameterSource};
use hypatia_faults::FaultKind;
use hypatia_schema::{
    Document, Reflect, SchemaCatalog, SchemaError, SchemaNode, SecurityModel,
};

/// Errors raised while registering a route.
///
/// Any of these aborts application startup: the route could never be served
/// correctly.
#[derive(Debug, Error)]
pub enum RouteError {
    /// The declaration is internally inconsistent.
    #[error("invalid route '{operation_id}': {reason}")]
    Invalid {
        /// The operation the declaration belongs to.
        operation_id: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A declared type could not be introspected.
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// A URL template with named path slots (`/users/{user_id}/posts/{post_id}`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTemplate {
    template: String,
    slots: Vec<String>,
}

impl PathTemplate {
    /// Parses a template, collecting its slot names in order.
    ///
    /// # Errors
    ///
    /// Returns the offending reason when a brace is unbalanced, a slot is
    /// empty, a slot is not a whole segment, or a slot name repeats.
    pub fn parse(template: &str) -> Result<Self, String> {
        if !template.starts_with('/') {
            return Err(format!("template '{template}' must start with '/'"));
        }

        let mut slots = Vec::new();
        for segment in template.split('/').skip(1) {
            if let Some(rest) = segment.strip_prefix('{') {
                let Some(name) = rest.strip_suffix('}') else {
                    return Err(format!("unterminated slot in segment '{segment}'"));
                };
                if name.is_empty() {
                    return Err("empty slot name".to_string());
                }
                if name.contains(['{', '}']) {
                    return Err(format!("malformed slot name '{name}'"));
                }
                if slots.iter().any(|s| s == name) {
                    return Err(format!("duplicate slot name '{name}'"));
                }
                slots.push(name.to_string());
            } else if segment.contains(['{', '}']) {
                return Err(format!(
                    "slot must span a whole segment, found '{segment}'"
                ));
            }
        }

        Ok(Self {
            template: template.to_string(),
            slots,
        })
    }

    /// The template as declared.
    #[must_use]
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Slot names in template order.
    #[must_use]
    pub fn slots(&self) -> &[String] {
        &self.slots
    }
}

/// The introspected spec of a composite parameter type.
#[derive(Debug, Clone)]
pub struct CompositeSpec {
    /// The declared type name.
    pub type_name: String,
    /// The introspected schema.
    pub schema: Arc<SchemaNode>,
    /// Per-field descriptors in declaration order.
    pub descriptors: Vec<ParameterDescriptor>,
}

/// The introspected spec of a request-body type.
#[derive(Debug, Clone)]
pub struct BodySpec {
    /// The declared type name.
    pub type_name: String,
    /// The introspected schema.
    pub schema: Arc<SchemaNode>,
    /// Whether a body must be present.
    pub required: bool,
}

/// The declared response of a route: status, schema, optional example.
#[derive(Debug, Clone)]
pub struct ResponseSpec {
    /// The success status.
    pub status: StatusCode,
    /// The declared type name.
    pub type_name: String,
    /// The introspected schema.
    pub schema: Arc<SchemaNode>,
    /// Example payload for documentation.
    pub example: Option<Document>,
}

type CompositeThunk = Box<dyn FnOnce(&mut SchemaCatalog) -> Result<CompositeSpec, SchemaError>>;
type BodyThunk = Box<dyn FnOnce(&mut SchemaCatalog) -> Result<BodySpec, SchemaError>>;
type ResponseThunk = Box<dyn FnOnce(&mut SchemaCatalog) -> Result<ResponseSpec, SchemaError>>;

/// One registered route.
#[derive(Debug, Clone)]
pub struct RouteSpec {
    method: Method,
    path: PathTemplate,
    operation_id: String,
    summary: Option<String>,
    description: Option<String>,
    tags: Vec<String>,
    deprecated: bool,
    params: Option<CompositeSpec>,
    request_body: Option<BodySpec>,
    response: Option<ResponseSpec>,
    security: SecurityModel,
    faults: Vec<FaultKind>,
}

impl RouteSpec {
    /// The HTTP method.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The parsed URL template.
    #[must_use]
    pub fn path(&self) -> &PathTemplate {
        &self.path
    }

    /// The unique operation identifier.
    #[must_use]
    pub fn operation_id(&self) -> &str {
        &self.operation_id
    }

    /// Short summary for documentation.
    #[must_use]
    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    /// Full description for documentation.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Documentation tags.
    #[must_use]
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Whether the route is deprecated.
    #[must_use]
    pub fn deprecated(&self) -> bool {
        self.deprecated
    }

    /// The composite parameter spec, when the route declares one.
    #[must_use]
    pub fn params(&self) -> Option<&CompositeSpec> {
        self.params.as_ref()
    }

    /// The request-body spec, when the route declares one.
    #[must_use]
    pub fn request_body(&self) -> Option<&BodySpec> {
        self.request_body.as_ref()
    }

    /// The declared response, when the route produces a payload.
    #[must_use]
    pub fn response(&self) -> Option<&ResponseSpec> {
        self.response.as_ref()
    }

    /// The status sent on success: the declared response status, or
    /// 204 No Content for payload-less routes.
    #[must_use]
    pub fn success_status(&self) -> StatusCode {
        self.response
            .as_ref()
            .map_or(StatusCode::NO_CONTENT, |r| r.status)
    }

    /// The route's security model.
    #[must_use]
    pub fn security(&self) -> &SecurityModel {
        &self.security
    }

    /// The fault kinds this route documents as error responses.
    #[must_use]
    pub fn faults(&self) -> &[FaultKind] {
        &self.faults
    }
}

/// Fluent builder for one route declaration.
///
/// Type declarations are captured as thunks and introspected when the
/// surrounding [`ApiContextBuilder`](crate::ApiContextBuilder) builds, so
/// every schema failure aborts startup in one place.
pub struct RouteBuilder {
    method: Method,
    path: String,
    operation_id: Option<String>,
    summary: Option<String>,
    description: Option<String>,
    tags: Vec<String>,
    deprecated: bool,
    params: Option<CompositeThunk>,
    request_body: Option<BodyThunk>,
    response: Option<ResponseThunk>,
    response_example: Option<Document>,
    security: SecurityModel,
    faults: Vec<FaultKind>,
}

impl RouteBuilder {
    fn new(method: Method, path: &str) -> Self {
        Self {
            method,
            path: path.to_string(),
            operation_id: None,
            summary: None,
            description: None,
            tags: Vec::new(),
            deprecated: false,
            params: None,
            request_body: None,
            response: None,
            response_example: None,
            security: SecurityModel::new(),
            faults: Vec::new(),
        }
    }

    /// Declares a GET route.
    #[must_use]
    pub fn get(path: &str) -> Self {
        Self::new(Method::GET, path)
    }

    /// Declares a POST route.
    #[must_use]
    pub fn post(path: &str) -> Self {
        Self::new(Method::POST, path)
    }

    /// Declares a PUT route.
    #[must_use]
    pub fn put(path: &str) -> Self {
        Self::new(Method::PUT, path)
    }

    /// Declares a DELETE route.
    #[must_use]
    pub fn delete(path: &str) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Declares a PATCH route.
    #[must_use]
    pub fn patch(path: &str) -> Self {
        Self::new(Method::PATCH, path)
    }

    /// Sets the unique operation identifier. Defaults to one derived from
    /// the method and path.
    #[must_use]
    pub fn operation_id(mut self, id: impl Into<String>) -> Self {
        self.operation_id = Some(id.into());
        self
    }

    /// Sets the documentation summary.
    #[must_use]
    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    /// Sets the documentation description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Adds a documentation tag.
    #[must_use]
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Marks the route deprecated in documentation.
    #[must_use]
    pub fn deprecated(mut self) -> Self {
        self.deprecated = true;
        self
    }

    /// Declares the composite parameter type.
    #[must_use]
    pub fn params<P: ParameterObject>(mut self) -> Self {
        self.params = Some(Box::new(|catalog| {
            let schema = catalog.resolve::<P>()?;
            let type_name = schema
                .name
                .clone()
                .unwrap_or_else(|| "<parameters>".to_string());
            Ok(CompositeSpec {
                type_name,
                schema,
                descriptors: P::descriptors(),
            })
        }));
        self
    }

    /// Declares the request-body type.
    #[must_use]
    pub fn request_body<B: Reflect>(mut self) -> Self {
        self.request_body = Some(Box::new(|catalog| {
            let schema = catalog.resolve::<B>()?;
            let type_name = schema.name.clone().unwrap_or_else(|| "<body>".to_string());
            Ok(BodySpec {
                type_name,
                schema,
                required: true,
            })
        }));
        self
    }

    /// Declares the response type and its success status.
    #[must_use]
    pub fn response<R: Reflect>(mut self, status: StatusCode) -> Self {
        self.response = Some(Box::new(move |catalog| {
            let schema = catalog.resolve::<R>()?;
            let type_name = schema
                .name
                .clone()
                .unwrap_or_else(|| "<response>".to_string());
            Ok(ResponseSpec {
                status,
                type_name,
                schema,
                example: None,
            })
        }));
        self
    }

    /// Attaches an example payload to the declared response, for
    /// documentation only.
    #[must_use]
    pub fn response_example(mut self, example: Document) -> Self {
        self.response_example = Some(example);
        self
    }

    /// Requires a security scheme with no specific scope.
    #[must_use]
    pub fn require_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.security.require(scheme);
        self
    }

    /// Requires a security scheme with scope values.
    #[must_use]
    pub fn require_scopes<I, S>(mut self, scheme: impl Into<String>, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.security.require_scopes(scheme, scopes);
        self
    }

    /// Documents a fault kind as one of this route's error responses. The
    /// kind must be registered in the fault registry by the time the
    /// context builds.
    #[must_use]
    pub fn documented_fault(mut self, kind: FaultKind) -> Self {
        self.faults.push(kind);
        self
    }

    pub(crate) fn finish(self, catalog: &mut SchemaCatalog) -> Result<RouteSpec, RouteError> {
        let operation_id = self
            .operation_id
            .clone()
            .unwrap_or_else(|| derive_operation_id(&self.method, &self.path));

        let invalid = |reason: String| RouteError::Invalid {
            operation_id: operation_id.clone(),
            reason,
        };

        let path = PathTemplate::parse(&self.path).map_err(invalid)?;

        let params = self.params.map(|thunk| thunk(catalog)).transpose()?;
        let request_body = self.request_body.map(|thunk| thunk(catalog)).transpose()?;
        let mut response = self.response.map(|thunk| thunk(catalog)).transpose()?;
        if let Some(spec) = response.as_mut() {
            spec.example = self.response_example;
        }

        validate_path_parameters(&path, params.as_ref())
            .map_err(|reason| RouteError::Invalid {
                operation_id: operation_id.clone(),
                reason,
            })?;

        debug!(
            operation_id = %operation_id,
            method = %self.method,
            path = path.template(),
            "registered route"
        );

        Ok(RouteSpec {
            method: self.method,
            path,
            operation_id,
            summary: self.summary,
            description: self.description,
            tags: self.tags,
            deprecated: self.deprecated,
            params,
            request_body,
            response,
            security: self.security,
            faults: self.faults,
        })
    }
}

/// Both directions must agree: every declared path parameter needs a
/// template slot, and every template slot needs a declared path parameter.
fn validate_path_parameters(
    path: &PathTemplate,
    params: Option<&CompositeSpec>,
) -> Result<(), String> {
    let declared: Vec<&ParameterDescriptor> = params
        .map(|spec| {
            spec.descriptors
                .iter()
                .filter(|d| d.source == ParameterSource::Path)
                .collect()
        })
        .unwrap_or_default();

    for descriptor in &declared {
        if !path.slots().iter().any(|slot| slot == descriptor.raw_name) {
            return Err(format!(
                "path parameter '{}' has no matching template slot",
                descriptor.raw_name
            ));
        }
    }

    for slot in path.slots() {
        if !declared.iter().any(|d| d.raw_name == slot.as_str()) {
            return Err(format!(
                "template slot '{slot}' has no declared path parameter"
            ));
        }
    }

    Ok(())
}

fn derive_operation_id(method: &Method, path: &str) -> String {
    let mut id = method.as_str().to_lowercase();
    for segment in path.split('/').filter(|s| !s.is_empty()) {
        id.push('_');
        let cleaned = segment.trim_matches(['{', '}']);
        id.push_str(&cleaned.replace(['-', '.'], "_"));
    }
    id
}
