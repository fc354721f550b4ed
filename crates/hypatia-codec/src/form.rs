//! Built-in URL-encoded form codec.

use bytes::Bytes;
use hypatia_schema::Document;
use serde_json::{Map, Value};

use crate::error::{DecodeError, EncodeError};
use crate::registry::{BodyParser, BodySerializer};

/// Form body codec for `application/x-www-form-urlencoded`.
///
/// Decoding produces a string-valued document; the binder's schema-guided
/// coercion turns those strings into the declared scalar kinds, the same way
/// query parameters are handled. Repeated keys keep the first value.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormCodec;

impl FormCodec {
    /// Creates the codec.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn media_type() -> &'static str {
        "application/x-www-form-urlencoded"
    }
}

impl BodyParser for FormCodec {
    fn parse(&self, body: &Bytes) -> Result<Document, DecodeError> {
        let text = std::str::from_utf8(body)
            .map_err(|e| DecodeError::new(Self::media_type(), format!("invalid UTF-8: {e}")))?;

        let mut doc = Map::new();
        for (key, value) in form_urlencoded::parse(text.as_bytes()) {
            doc.entry(key.into_owned())
                .or_insert_with(|| Value::String(value.into_owned()));
        }
        Ok(Value::Object(doc))
    }
}

impl BodySerializer for FormCodec {
    fn serialize(&self, document: &Document) -> Result<Bytes, EncodeError> {
        let Value::Object(entries) = document else {
            return Err(EncodeError::new(
                Self::media_type(),
                "only flat objects can be form-encoded",
            ));
        };

        let mut encoder = form_urlencoded::Serializer::new(String::new());
        for (key, value) in entries {
            let text = match value {
                Value::String(s) => s.clone(),
                Value::Bool(b) => b.to_string(),
                Value::Number(n) => n.to_string(),
                Value::Null => String::new(),
                Value::Array(_) | Value::Object(_) => {
                    return Err(EncodeError::new(
                        Self::media_type(),
                        format!("field '{key}' is not a scalar"),
                    ));
                }
            };
            encoder.append_pair(key, &text);
        }
        Ok(Bytes::from(encoder.finish()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_pairs_as_strings() {
        let body = Bytes::from_static(b"count=5&label=hello%20world");
        let doc = FormCodec::new().parse(&body).unwrap();
        assert_eq!(doc, json!({"count": "5", "label": "hello world"}));
    }

    #[test]
    fn test_parse_repeated_key_keeps_first() {
        let body = Bytes::from_static(b"id=1&id=2");
        let doc = FormCodec::new().parse(&body).unwrap();
        assert_eq!(doc, json!({"id": "1"}));
    }

    #[test]
    fn test_parse_rejects_invalid_utf8() {
        let body = Bytes::from_static(&[0xff, 0xfe]);
        let err = FormCodec::new().parse(&body).unwrap_err();
        assert!(err.to_string().contains("invalid UTF-8"));
    }

    #[test]
    fn test_serialize_flat_object() {
        let bytes = FormCodec::new()
            .serialize(&json!({"a": 1, "b": "two words"}))
            .unwrap();
        assert_eq!(bytes, Bytes::from_static(b"a=1&b=two+words"));
    }

    #[test]
    fn test_serialize_rejects_nested() {
        let err = FormCodec::new()
            .serialize(&json!({"nested": {"x": 1}}))
            .unwrap_err();
        assert!(err.to_string().contains("nested"));
    }
}
