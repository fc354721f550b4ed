//! The documentation tree assembler.

use http::StatusCode;
use indexmap::IndexMap;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use hypatia_core::{ApiContext, RouteSpec};
use hypatia_extract::ParameterSource;
use hypatia_faults::FaultRegistry;
use hypatia_schema::{elide, Document, SerializationSettings};

/// Media type every codec-carried payload is documented under.
const DOCUMENTED_MEDIA_TYPE: &str = "application/json";

/// Documentation of a single parameter.
#[derive(Debug, Clone)]
pub struct ParameterDoc {
    /// The transport name.
    pub name: String,
    /// The source location.
    pub location: ParameterSource,
    /// Whether the parameter is required.
    pub required: bool,
    /// The parameter's schema document.
    pub schema: Document,
}

/// Documentation of a request body.
#[derive(Debug, Clone)]
pub struct BodyDoc {
    /// Whether a body must be present.
    pub required: bool,
    /// The media type the body is documented under.
    pub content_type: String,
    /// The body schema document.
    pub schema: Document,
}

/// Documentation of one response status.
#[derive(Debug, Clone)]
pub struct ResponseDoc {
    /// Human-readable status description.
    pub description: String,
    /// The media type of the payload, when there is one.
    pub content_type: Option<String>,
    /// The payload schema document.
    pub schema: Option<Document>,
    /// Example payload.
    pub example: Option<Document>,
}

/// Documentation of one route.
#[derive(Debug, Clone)]
pub struct RouteDoc {
    /// The unique operation identifier.
    pub operation_id: String,
    /// Short summary.
    pub summary: Option<String>,
    /// Full description.
    pub description: Option<String>,
    /// Grouping tags.
    pub tags: Vec<String>,
    /// Whether the route is deprecated.
    pub deprecated: bool,
    /// Parameters grouped by source: path first, then query, then header.
    pub parameters: Vec<ParameterDoc>,
    /// The request body, when declared.
    pub request_body: Option<BodyDoc>,
    /// Responses keyed by status code, success first, then documented
    /// faults in declaration order.
    pub responses: IndexMap<String, ResponseDoc>,
    /// The serialized security requirements.
    pub security: Document,
}

impl RouteDoc {
    /// Renders this route's documentation as a generic document under the
    /// given elision policy.
    #[must_use]
    pub fn to_document(&self, settings: &SerializationSettings) -> Document {
        let mut doc = Map::new();
        doc.insert("operationId".into(), Value::from(self.operation_id.clone()));
        if let Some(summary) = &self.summary {
            doc.insert("summary".into(), Value::from(summary.clone()));
        }
        if let Some(description) = &self.description {
            doc.insert("description".into(), Value::from(description.clone()));
        }
        if !self.tags.is_empty() {
            doc.insert(
                "tags".into(),
                Value::Array(self.tags.iter().map(|t| Value::from(t.clone())).collect()),
            );
        }
        if self.deprecated {
            doc.insert("deprecated".into(), Value::Bool(true));
        }

        let parameters: Vec<Value> = self
            .parameters
            .iter()
            .map(|p| {
                let mut parameter = Map::new();
                parameter.insert("name".into(), Value::from(p.name.clone()));
                parameter.insert("in".into(), Value::from(p.location.to_string()));
                parameter.insert("required".into(), Value::Bool(p.required));
                parameter.insert("schema".into(), p.schema.clone());
                Value::Object(parameter)
            })
            .collect();
        if !parameters.is_empty() {
            doc.insert("parameters".into(), Value::Array(parameters));
        }

        if let Some(body) = &self.request_body {
            let mut media = Map::new();
            media.insert("schema".into(), body.schema.clone());
            let mut content = Map::new();
            content.insert(body.content_type.clone(), Value::Object(media));
            let mut request_body = Map::new();
            request_body.insert("required".into(), Value::Bool(body.required));
            request_body.insert("content".into(), Value::Object(content));
            doc.insert("requestBody".into(), Value::Object(request_body));
        }

        let mut responses = Map::new();
        for (status, response) in &self.responses {
            let mut entry = Map::new();
            entry.insert("description".into(), Value::from(response.description.clone()));
            if let Some(content_type) = &response.content_type {
                if response.schema.is_some() || response.example.is_some() {
                    let mut media = Map::new();
                    if let Some(schema) = &response.schema {
                        media.insert("schema".into(), schema.clone());
                    }
                    if let Some(example) = &response.example {
                        media.insert("example".into(), example.clone());
                    }
                    let mut content = Map::new();
                    content.insert(content_type.clone(), Value::Object(media));
                    entry.insert("content".into(), Value::Object(content));
                }
            }
            responses.insert(status.clone(), Value::Object(entry));
        }
        doc.insert("responses".into(), Value::Object(responses));

        if self.security.as_object().is_some_and(|o| !o.is_empty()) {
            doc.insert("security".into(), self.security.clone());
        }

        elide(Value::Object(doc), settings)
    }
}

/// The assembled documentation tree: path template → lowercase method →
/// route documentation, plus the referenced security scheme definitions.
#[derive(Debug, Clone, Default)]
pub struct DocTree {
    /// Routes keyed by path, then method, in registration order.
    pub paths: IndexMap<String, IndexMap<String, RouteDoc>>,
    /// Security scheme definitions keyed by name, in registration order.
    pub security_schemes: IndexMap<String, crate::SecurityScheme>,
}

impl DocTree {
    /// Renders the whole tree as a generic document under the given elision
    /// policy.
    #[must_use]
    pub fn to_document(&self, settings: &SerializationSettings) -> Document {
        let mut paths = Map::new();
        for (path, methods) in &self.paths {
            let mut entry = Map::new();
            for (method, route) in methods {
                entry.insert(method.clone(), route.to_document(settings));
            }
            paths.insert(path.clone(), Value::Object(entry));
        }

        let mut doc = Map::new();
        doc.insert("paths".into(), Value::Object(paths));

        if !self.security_schemes.is_empty() {
            let mut schemes = Map::new();
            for (name, scheme) in &self.security_schemes {
                schemes.insert(name.clone(), scheme.to_document());
            }
            doc.insert("securitySchemes".into(), Value::Object(schemes));
        }

        elide(Value::Object(doc), settings)
    }
}

/// Assembles the documentation tree from registered routes and the fault
/// registry, with no additional runtime dependency.
#[derive(Debug, Clone, Default)]
pub struct DocAssembler {
    security_schemes: IndexMap<String, crate::SecurityScheme>,
}

impl DocAssembler {
    /// Creates an assembler with no security schemes declared.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a named security scheme for the tree.
    #[must_use]
    pub fn security_scheme(mut self, name: impl Into<String>, scheme: crate::SecurityScheme) -> Self {
        self.security_schemes.insert(name.into(), scheme);
        self
    }

    /// Assembles the tree for every route in the context.
    #[must_use]
    pub fn assemble(&self, context: &ApiContext) -> DocTree {
        let mut tree = DocTree {
            paths: IndexMap::new(),
            security_schemes: self.security_schemes.clone(),
        };

        for route in context.routes() {
            let doc = assemble_route(route, context.faults());
            let path_entry = tree
                .paths
                .entry(route.path().template().to_string())
                .or_default();
            path_entry.insert(route.method().as_str().to_lowercase(), doc);
        }

        debug!(paths = tree.paths.len(), "assembled documentation tree");
        tree
    }
}

fn assemble_route(route: &RouteSpec, faults: &FaultRegistry) -> RouteDoc {
    let mut parameters = Vec::new();
    if let Some(params) = route.params() {
        // Grouped by source, each group keeping declaration order.
        for source in [
            ParameterSource::Path,
            ParameterSource::Query,
            ParameterSource::Header,
        ] {
            for descriptor in params.descriptors.iter().filter(|d| d.source == source) {
                let schema = params
                    .schema
                    .field(descriptor.field)
                    .map(|field| field.schema.to_document())
                    .unwrap_or_else(|| serde_json::json!({}));
                parameters.push(ParameterDoc {
                    name: descriptor.raw_name.to_string(),
                    location: descriptor.source,
                    required: descriptor.required,
                    schema,
                });
            }
        }
    }

    let request_body = route.request_body().map(|body| BodyDoc {
        required: body.required,
        content_type: DOCUMENTED_MEDIA_TYPE.to_string(),
        schema: body.schema.to_document(),
    });

    let mut responses: IndexMap<String, ResponseDoc> = IndexMap::new();
    match route.response() {
        Some(response) => {
            responses.insert(
                response.status.as_u16().to_string(),
                ResponseDoc {
                    description: status_description(response.status),
                    content_type: Some(DOCUMENTED_MEDIA_TYPE.to_string()),
                    schema: Some(response.schema.to_document()),
                    example: response.example.clone(),
                },
            );
        }
        None => {
            responses.insert(
                StatusCode::NO_CONTENT.as_u16().to_string(),
                ResponseDoc {
                    description: status_description(StatusCode::NO_CONTENT),
                    content_type: None,
                    schema: None,
                    example: None,
                },
            );
        }
    }

    for kind in route.faults().iter().copied() {
        // Kinds were validated at context build time.
        let Some(descriptor) = faults.get(kind) else {
            warn!(kind, "documented fault kind missing from registry");
            continue;
        };
        let status = descriptor.status().as_u16().to_string();
        if responses.contains_key(&status) {
            warn!(
                operation_id = route.operation_id(),
                status = %status,
                kind,
                "status already documented for this route; keeping the first entry"
            );
            continue;
        }
        responses.insert(
            status,
            ResponseDoc {
                description: descriptor
                    .status()
                    .canonical_reason()
                    .unwrap_or("Error response")
                    .to_string(),
                content_type: descriptor.content_type().map(|m| m.as_ref().to_string()),
                schema: descriptor.schema().map(hypatia_schema::SchemaNode::to_document),
                example: descriptor.example().cloned(),
            },
        );
    }

    RouteDoc {
        operation_id: route.operation_id().to_string(),
        summary: route.summary().map(str::to_string),
        description: route.description().map(str::to_string),
        tags: route.tags().to_vec(),
        deprecated: route.deprecated(),
        parameters,
        request_body,
        responses,
        security: route.security().serialize(&SerializationSettings::new()),
    }
}

fn status_description(status: StatusCode) -> String {
    match status.as_u16() {
        201 => "Created".to_string(),
        204 => "No content".to_string(),
        _ => "Successful response".to_string(),
    }
}
