//! The parameter binding engine.

use serde_json::{Map, Value};
use tracing::trace;

use hypatia_codec::CodecRegistry;
use hypatia_schema::{
    coerce_document, coerce_scalar, from_document, Document, Introspector, SchemaKind, SchemaNode,
};

use crate::descriptor::{ParameterDescriptor, ParameterObject, ParameterSource};
use crate::error::{BindError, BindingError};
use crate::request::RequestParts;

/// Binds requests to declared composite parameter types.
///
/// The binder is stateless apart from the codec registry it borrows; all
/// lookups are pure reads, so one binder may serve concurrent requests.
#[derive(Debug, Clone, Copy)]
pub struct Binder<'a> {
    codecs: &'a CodecRegistry,
}

impl<'a> Binder<'a> {
    /// Creates a binder over the given codec registry.
    #[must_use]
    pub fn new(codecs: &'a CodecRegistry) -> Self {
        Self { codecs }
    }

    /// Binds a composite parameter type, introspecting its schema on the
    /// fly.
    ///
    /// Route dispatch prefers [`Binder::bind_prepared`] with the schema and
    /// descriptors built once at registration; this convenience entry point
    /// exists for tests and ad-hoc callers.
    ///
    /// # Errors
    ///
    /// Returns [`BindError`] when a required value is absent, a raw value
    /// does not coerce, the body cannot be negotiated or decoded, or the
    /// assembled fields do not deserialize into `P`.
    pub fn bind<P: ParameterObject>(&self, parts: &RequestParts) -> Result<P, BindError> {
        let schema = Introspector::new().describe(&P::descriptor())?;
        self.bind_prepared(parts, &schema, &P::descriptors())
    }

    /// Binds a composite parameter type against a schema and descriptors
    /// prepared at route registration.
    ///
    /// # Errors
    ///
    /// See [`Binder::bind`].
    pub fn bind_prepared<P: ParameterObject>(
        &self,
        parts: &RequestParts,
        schema: &SchemaNode,
        descriptors: &[ParameterDescriptor],
    ) -> Result<P, BindError> {
        let type_name = schema.name.as_deref().unwrap_or("<parameters>");

        if descriptors.is_empty() {
            // Unit-like parameter types carry no fields.
            return from_document::<P>(Value::Null)
                .map_err(|e| BindingError::assembly(type_name, e.to_string()).into());
        }

        let body_document = self.decode_body(parts, descriptors)?;

        let mut assembled = Map::new();
        for descriptor in descriptors {
            let field = schema.field(descriptor.field).ok_or_else(|| {
                BindingError::assembly(
                    type_name,
                    format!("field '{}' is not part of the schema", descriptor.field),
                )
            })?;

            if let Some(value) =
                extract_one(parts, body_document.as_ref(), descriptor, &field.schema)?
            {
                assembled.insert(descriptor.field.to_string(), value);
            }
        }

        trace!(type_name, fields = assembled.len(), "assembled parameter object");
        from_document::<P>(Value::Object(assembled))
            .map_err(|e| BindingError::assembly(type_name, e.to_string()).into())
    }

    /// Decodes and binds the whole request body as one declared type,
    /// negotiating the parser from the `Content-Type` header.
    ///
    /// Decoded scalars are re-coerced under the type's schema, so codecs
    /// that produce string-valued documents (form encoding) behave like
    /// query parameters do.
    ///
    /// # Errors
    ///
    /// Returns [`BindError`] when no parser matches, the payload does not
    /// decode, or the document does not deserialize into `B`.
    pub fn bind_body<B>(&self, parts: &RequestParts) -> Result<B, BindError>
    where
        B: serde::de::DeserializeOwned + hypatia_schema::Reflect,
    {
        let schema = Introspector::new().describe(&B::descriptor())?;
        self.bind_body_prepared(parts, &schema)
    }

    /// Body binding against a schema prepared at route registration.
    ///
    /// # Errors
    ///
    /// See [`Binder::bind_body`].
    pub fn bind_body_prepared<B>(
        &self,
        parts: &RequestParts,
        schema: &SchemaNode,
    ) -> Result<B, BindError>
    where
        B: serde::de::DeserializeOwned,
    {
        let parser = self.codecs.resolve_parser(parts.content_type())?;
        let document = parser
            .parse(parts.body())
            .map_err(|e| BindingError::undecodable_body(e.to_string()))?;
        let document = coerce_document(schema, document);

        let type_name = schema.name.as_deref().unwrap_or("<body>");
        from_document::<B>(document)
            .map_err(|e| BindingError::assembly(type_name, e.to_string()).into())
    }

    fn decode_body(
        &self,
        parts: &RequestParts,
        descriptors: &[ParameterDescriptor],
    ) -> Result<Option<Document>, BindError> {
        if !descriptors
            .iter()
            .any(|d| d.source == ParameterSource::Body)
        {
            return Ok(None);
        }

        let parser = self.codecs.resolve_parser(parts.content_type())?;
        let document = parser
            .parse(parts.body())
            .map_err(|e| BindingError::undecodable_body(e.to_string()))?;
        Ok(Some(document))
    }
}

/// Extracts and coerces the value for one descriptor, or `None` when an
/// optional value is absent.
fn extract_one(
    parts: &RequestParts,
    body: Option<&Document>,
    descriptor: &ParameterDescriptor,
    field_schema: &SchemaNode,
) -> Result<Option<Value>, BindError> {
    match descriptor.source {
        ParameterSource::Path => match parts.path_slots().get(descriptor.raw_name) {
            Some(raw) => coerce_raw(descriptor, field_schema, raw).map(Some),
            None if descriptor.required => {
                // The template was validated at registration; a missing slot
                // means the router and the declaration disagree.
                Err(BindingError::malformed_template(descriptor.raw_name).into())
            }
            None => Ok(None),
        },

        ParameterSource::Query => {
            let values = parts.query_values(descriptor.raw_name);
            coerce_multi(descriptor, field_schema, &values)
        }

        ParameterSource::Header => {
            let values: Vec<String> = parts
                .header_values(descriptor.raw_name)
                .into_iter()
                .map(str::to_string)
                .collect();
            coerce_multi(descriptor, field_schema, &values)
        }

        ParameterSource::Body => {
            let found = body
                .and_then(Value::as_object)
                .and_then(|doc| doc.get(descriptor.raw_name));
            match found {
                Some(value) => Ok(Some(coerce_document(field_schema, value.clone()))),
                None if descriptor.required => {
                    Err(BindingError::missing(ParameterSource::Body, descriptor.raw_name).into())
                }
                None => Ok(None),
            }
        }
    }
}

/// Applies the multiplicity rule: sequence targets take every raw value,
/// scalar targets take the first and ignore the rest.
fn coerce_multi(
    descriptor: &ParameterDescriptor,
    field_schema: &SchemaNode,
    values: &[String],
) -> Result<Option<Value>, BindError> {
    if values.is_empty() {
        if descriptor.required {
            return Err(BindingError::missing(descriptor.source, descriptor.raw_name).into());
        }
        return Ok(None);
    }

    if let SchemaKind::Array { items } = &field_schema.kind {
        let elements = values
            .iter()
            .map(|raw| coerce_raw(descriptor, items, raw))
            .collect::<Result<Vec<_>, _>>()?;
        return Ok(Some(Value::Array(elements)));
    }

    coerce_raw(descriptor, field_schema, &values[0]).map(Some)
}

fn coerce_raw(
    descriptor: &ParameterDescriptor,
    schema: &SchemaNode,
    raw: &str,
) -> Result<Value, BindError> {
    coerce_scalar(schema, raw)
        .map_err(|e| BindingError::unparsable(descriptor.source, descriptor.raw_name, e.to_string()).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parameter_object;
    use http::Uri;
    use hypatia_codec::NegotiationError;
    use serde::Deserialize;

    fn codecs() -> CodecRegistry {
        let mut registry = CodecRegistry::new();
        registry.register_json();
        registry.register_form();
        registry
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct AllSources {
        record_id: u64,
        page: u32,
        trace: String,
    }

    parameter_object!(AllSources {
        "record_id": u64 => path,
        "page": u32 => query,
        "trace": String => header("X-Trace-Id"),
    });

    #[derive(Debug, Deserialize, PartialEq)]
    struct FilterParams {
        ids: Vec<u64>,
        limit: Option<u32>,
    }

    parameter_object!(FilterParams {
        "ids": Vec<u64> => query,
        "limit": Option<u32> => query,
    });

    #[derive(Debug, Deserialize, PartialEq)]
    struct Mixed {
        actor: String,
        xyz: i64,
    }

    parameter_object!(Mixed {
        "actor": String => header,
        "xyz": i64 => body,
    });

    #[derive(Debug, Deserialize, PartialEq)]
    struct Payload {
        xyz: i64,
        label: String,
    }

    hypatia_schema::reflect_object!(Payload {
        "xyz": i64,
        "label": String,
    });

    #[test]
    fn test_bind_all_sources_equals_direct_construction() {
        let parts = RequestParts::builder()
            .method(http::Method::GET)
            .uri(Uri::from_static("/records/789?page=456"))
            .header("X-Trace-Id", "abc")
            .path_slot("record_id", "789")
            .build();

        let registry = codecs();
        let bound: AllSources = Binder::new(&registry).bind(&parts).unwrap();
        assert_eq!(
            bound,
            AllSources {
                record_id: 789,
                page: 456,
                trace: "abc".into(),
            }
        );
    }

    #[test]
    fn test_header_binding_is_case_insensitive() {
        let registry = codecs();

        for sent in ["X-Trace-Id", "x-trace-id", "X-TRACE-ID"] {
            let parts = RequestParts::builder()
                .uri(Uri::from_static("/records/1?page=1"))
                .header(sent, "t-1")
                .path_slot("record_id", "1")
                .build();

            let bound: AllSources = Binder::new(&registry).bind(&parts).unwrap();
            assert_eq!(bound.trace, "t-1");
        }
    }

    #[test]
    fn test_query_binding_is_case_sensitive() {
        let parts = RequestParts::builder()
            .uri(Uri::from_static("/records/1?Page=456"))
            .header("X-Trace-Id", "abc")
            .path_slot("record_id", "1")
            .build();

        let registry = codecs();
        let err = Binder::new(&registry)
            .bind::<AllSources>(&parts)
            .unwrap_err();

        let BindError::Parameter(binding) = err else {
            panic!("expected a binding error");
        };
        assert_eq!(binding.error_code(), "MISSING_PARAMETER");
        assert_eq!(binding.parameter(), Some("page"));
        assert_eq!(binding.source_location(), ParameterSource::Query);
    }

    #[test]
    fn test_repeated_query_scalar_takes_first() {
        let parts = RequestParts::builder()
            .uri(Uri::from_static("/items?ids=1&ids=2&limit=5&limit=9"))
            .build();

        let registry = codecs();
        let bound: FilterParams = Binder::new(&registry).bind(&parts).unwrap();
        assert_eq!(bound.ids, vec![1, 2]);
        assert_eq!(bound.limit, Some(5));
    }

    #[test]
    fn test_optional_query_absent_is_none() {
        let parts = RequestParts::builder()
            .uri(Uri::from_static("/items?ids=7"))
            .build();

        let registry = codecs();
        let bound: FilterParams = Binder::new(&registry).bind(&parts).unwrap();
        assert_eq!(bound, FilterParams { ids: vec![7], limit: None });
    }

    #[test]
    fn test_unparsable_query_value() {
        let parts = RequestParts::builder()
            .uri(Uri::from_static("/items?ids=seven"))
            .build();

        let registry = codecs();
        let err = Binder::new(&registry)
            .bind::<FilterParams>(&parts)
            .unwrap_err();

        let BindError::Parameter(binding) = err else {
            panic!("expected a binding error");
        };
        assert_eq!(binding.error_code(), "INVALID_PARAMETER");
        assert!(binding.to_string().contains("ids"));
    }

    #[test]
    fn test_body_tagged_field_from_decoded_document() {
        let parts = RequestParts::builder()
            .method(http::Method::POST)
            .uri(Uri::from_static("/events"))
            .header("actor", "ada")
            .header("content-type", "application/json")
            .body(r#"{"xyz": 123}"#)
            .build();

        let registry = codecs();
        let bound: Mixed = Binder::new(&registry).bind(&parts).unwrap();
        assert_eq!(bound, Mixed { actor: "ada".into(), xyz: 123 });
    }

    #[test]
    fn test_body_requires_registered_parser() {
        let parts = RequestParts::builder()
            .method(http::Method::POST)
            .header("actor", "ada")
            .header("content-type", "text/csv")
            .body("xyz,123")
            .build();

        let registry = codecs();
        let err = Binder::new(&registry).bind::<Mixed>(&parts).unwrap_err();
        assert!(matches!(
            err,
            BindError::Negotiation(NegotiationError::NoParserFound { .. })
        ));
    }

    #[test]
    fn test_malformed_body_is_binding_error() {
        let parts = RequestParts::builder()
            .method(http::Method::POST)
            .header("actor", "ada")
            .header("content-type", "application/json")
            .body("{oops")
            .build();

        let registry = codecs();
        let err = Binder::new(&registry).bind::<Mixed>(&parts).unwrap_err();
        let BindError::Parameter(binding) = err else {
            panic!("expected a binding error");
        };
        assert_eq!(binding.error_code(), "UNDECODABLE_BODY");
    }

    #[test]
    fn test_whole_body_json() {
        let parts = RequestParts::builder()
            .method(http::Method::POST)
            .header("content-type", "application/json")
            .body(r#"{"xyz": 123, "label": "hello"}"#)
            .build();

        let registry = codecs();
        let bound: Payload = Binder::new(&registry).bind_body(&parts).unwrap();
        assert_eq!(bound, Payload { xyz: 123, label: "hello".into() });
    }

    #[test]
    fn test_whole_body_form_coerces_scalars() {
        let parts = RequestParts::builder()
            .method(http::Method::POST)
            .header("content-type", "application/x-www-form-urlencoded")
            .body("xyz=123&label=hello")
            .build();

        let registry = codecs();
        let bound: Payload = Binder::new(&registry).bind_body(&parts).unwrap();
        assert_eq!(bound, Payload { xyz: 123, label: "hello".into() });
    }

    #[test]
    fn test_missing_path_slot_is_malformed_template() {
        let parts = RequestParts::builder()
            .uri(Uri::from_static("/records?page=1"))
            .header("X-Trace-Id", "abc")
            .build();

        let registry = codecs();
        let err = Binder::new(&registry)
            .bind::<AllSources>(&parts)
            .unwrap_err();

        let BindError::Parameter(binding) = err else {
            panic!("expected a binding error");
        };
        assert_eq!(binding.error_code(), "MALFORMED_TEMPLATE");
    }

    #[test]
    fn test_unit_parameters_bind_trivially() {
        let parts = RequestParts::builder().build();
        let registry = codecs();
        Binder::new(&registry).bind::<()>(&parts).unwrap();
    }
}
