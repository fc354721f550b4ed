//! The codec registry.

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use hypatia_schema::Document;
use mime::Mime;
use tracing::debug;

use crate::accept::{parse_accept, range_matches, AcceptEntry};
use crate::error::{DecodeError, EncodeError, NegotiationError};

/// Decodes raw body bytes into a generic document.
pub trait BodyParser: Send + Sync {
    /// Parses the body.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError`] when the bytes are not a valid payload for
    /// this codec's media type.
    fn parse(&self, body: &Bytes) -> Result<Document, DecodeError>;
}

/// Encodes a generic document into body bytes.
pub trait BodySerializer: Send + Sync {
    /// Serializes the document.
    ///
    /// # Errors
    ///
    /// Returns [`EncodeError`] when the document cannot be represented in
    /// this codec's media type.
    fn serialize(&self, document: &Document) -> Result<Bytes, EncodeError>;
}

/// Registry of (media-type pattern → parser) and (media-type pattern →
/// serializer) entries.
///
/// Filled during application setup, then shared read-only; resolution is a
/// pure lookup safe to call from concurrent requests.
#[derive(Default, Clone)]
pub struct CodecRegistry {
    parsers: Vec<(Mime, Arc<dyn BodyParser>)>,
    serializers: Vec<(Mime, Arc<dyn BodySerializer>)>,
}

impl fmt::Debug for CodecRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodecRegistry")
            .field(
                "parsers",
                &self.parsers.iter().map(|(m, _)| m.as_ref()).collect::<Vec<_>>(),
            )
            .field(
                "serializers",
                &self
                    .serializers
                    .iter()
                    .map(|(m, _)| m.as_ref())
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl CodecRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a parser for a media-type pattern.
    ///
    /// Patterns may use a wildcard subtype (`application/*`); wildcard
    /// entries match only when no exact entry does.
    pub fn register_parser(&mut self, media_type: Mime, parser: Arc<dyn BodyParser>) {
        debug!(media_type = %media_type, "registered body parser");
        self.parsers.push((media_type, parser));
    }

    /// Registers a serializer for a media-type pattern.
    pub fn register_serializer(&mut self, media_type: Mime, serializer: Arc<dyn BodySerializer>) {
        debug!(media_type = %media_type, "registered body serializer");
        self.serializers.push((media_type, serializer));
    }

    /// Registers the built-in JSON codec for `application/json` on both
    /// sides of the registry.
    pub fn register_json(&mut self) {
        let codec = Arc::new(crate::JsonCodec::new());
        self.register_parser(mime::APPLICATION_JSON, codec.clone());
        self.register_serializer(mime::APPLICATION_JSON, codec);
    }

    /// Registers the built-in form codec for
    /// `application/x-www-form-urlencoded` on both sides of the registry.
    pub fn register_form(&mut self) {
        let codec = Arc::new(crate::FormCodec::new());
        self.register_parser(mime::APPLICATION_WWW_FORM_URLENCODED, codec.clone());
        self.register_serializer(mime::APPLICATION_WWW_FORM_URLENCODED, codec);
    }

    /// Returns `true` when no parser is registered.
    #[must_use]
    pub fn has_no_parsers(&self) -> bool {
        self.parsers.is_empty()
    }

    /// Resolves the parser for a request's declared content type.
    ///
    /// Exact `type/subtype` registrations win; wildcard registrations match
    /// only when no exact entry does; parameters on the header (charset) are
    /// ignored for matching.
    ///
    /// # Errors
    ///
    /// Returns [`NegotiationError::NoParserFound`] when the header is
    /// missing, unparsable, or matched by no registration.
    pub fn resolve_parser(
        &self,
        content_type: Option<&str>,
    ) -> Result<&dyn BodyParser, NegotiationError> {
        let declared = content_type.unwrap_or("");
        let no_parser = || NegotiationError::NoParserFound {
            content_type: if declared.is_empty() {
                "<none>".to_string()
            } else {
                declared.to_string()
            },
        };

        let declared_mime: Mime = declared.parse().map_err(|_| no_parser())?;

        // Exact essence match first.
        for (registered, parser) in &self.parsers {
            if registered.type_() != mime::STAR
                && registered.subtype() != mime::STAR
                && registered.essence_str() == declared_mime.essence_str()
            {
                return Ok(parser.as_ref());
            }
        }
        // Then wildcard registrations.
        for (registered, parser) in &self.parsers {
            if (registered.type_() == mime::STAR || registered.subtype() == mime::STAR)
                && range_matches(registered, &declared_mime)
            {
                return Ok(parser.as_ref());
            }
        }

        Err(no_parser())
    }

    /// Resolves the serializer to use for a client's `Accept` header,
    /// together with the concrete media type the response should declare.
    ///
    /// A missing `Accept` header behaves as `*/*`.
    ///
    /// # Errors
    ///
    /// Returns [`NegotiationError::NoSerializerFound`] when no registered
    /// serializer's media type intersects the acceptable ranges.
    pub fn resolve_serializer(
        &self,
        accept: Option<&str>,
    ) -> Result<(Mime, &dyn BodySerializer), NegotiationError> {
        let header = accept.unwrap_or("*/*");
        let entries = parse_accept(header);

        for entry in &entries {
            if let Some(found) = self.serializer_for_range(entry) {
                return Ok(found);
            }
        }

        Err(NegotiationError::NoSerializerFound {
            accept: header.to_string(),
        })
    }

    fn serializer_for_range(&self, entry: &AcceptEntry) -> Option<(Mime, &dyn BodySerializer)> {
        // Exact registrations are preferred within one acceptable range.
        for (registered, serializer) in &self.serializers {
            if registered.type_() != mime::STAR
                && registered.subtype() != mime::STAR
                && range_matches(&entry.range, registered)
            {
                return Some((registered.clone(), serializer.as_ref()));
            }
        }
        for (registered, serializer) in &self.serializers {
            if range_matches(&entry.range, registered) {
                // A wildcard registration serving a concrete range responds
                // with the concrete type the client asked for.
                let concrete = if entry.range.type_() == mime::STAR
                    || entry.range.subtype() == mime::STAR
                {
                    registered.clone()
                } else {
                    entry.range.essence_str().parse().unwrap_or_else(|_| registered.clone())
                };
                return Some((concrete, serializer.as_ref()));
            }
        }
        None
    }
}
