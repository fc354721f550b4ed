//! Built-in JSON codec.

use bytes::Bytes;
use hypatia_schema::Document;

use crate::error::{DecodeError, EncodeError};
use crate::registry::{BodyParser, BodySerializer};

/// JSON body codec for `application/json`.
///
/// The default codec registered by the context builder; applications can
/// replace it by registering their own parser/serializer for the same media
/// type before startup completes.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl JsonCodec {
    /// Creates the codec.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl BodyParser for JsonCodec {
    fn parse(&self, body: &Bytes) -> Result<Document, DecodeError> {
        if body.is_empty() {
            return Err(DecodeError::new(
                mime::APPLICATION_JSON.as_ref(),
                "empty request body",
            ));
        }
        serde_json::from_slice(body)
            .map_err(|e| DecodeError::new(mime::APPLICATION_JSON.as_ref(), e.to_string()))
    }
}

impl BodySerializer for JsonCodec {
    fn serialize(&self, document: &Document) -> Result<Bytes, EncodeError> {
        serde_json::to_vec(document)
            .map(Bytes::from)
            .map_err(|e| EncodeError::new(mime::APPLICATION_JSON.as_ref(), e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_object() {
        let body = Bytes::from_static(br#"{"xyz": 123}"#);
        let doc = JsonCodec::new().parse(&body).unwrap();
        assert_eq!(doc, json!({"xyz": 123}));
    }

    #[test]
    fn test_parse_empty_body_fails() {
        let err = JsonCodec::new().parse(&Bytes::new()).unwrap_err();
        assert!(err.to_string().contains("empty request body"));
    }

    #[test]
    fn test_parse_malformed_fails_with_media_type() {
        let err = JsonCodec::new()
            .parse(&Bytes::from_static(b"{not json"))
            .unwrap_err();
        assert_eq!(err.media_type, "application/json");
    }

    #[test]
    fn test_serialize_round_trip() {
        let codec = JsonCodec::new();
        let doc = json!({"a": 1, "b": [true, null]});
        let bytes = codec.serialize(&doc).unwrap();
        assert_eq!(codec.parse(&bytes).unwrap(), doc);
    }
}
