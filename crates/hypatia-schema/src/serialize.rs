//! The model serializer.
//!
//! Turns live values of known types into generic ordered documents (and
//! back), applying an explicit empty-value elision policy. The same value can
//! be serialized for a network response and for a documentation example with
//! different policies and produce policy-consistent output both times; no
//! call site carries a hidden default.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

/// A generic ordered key-value document.
///
/// Backed by `serde_json::Value` with the `preserve_order` feature, so object
/// keys keep the declaration order of the type they were serialized from.
pub type Document = Value;

/// Errors raised by the model serializer.
#[derive(Debug, Error)]
pub enum SerializeError {
    /// A value could not be converted into a document.
    #[error("failed to serialize value: {0}")]
    Serialize(#[source] serde_json::Error),

    /// A document could not be converted back into the target type.
    #[error("failed to reconstruct value: {0}")]
    Reconstruct(#[source] serde_json::Error),
}

/// Empty-value elision policy.
///
/// Three independent flags, each applied per field *after* conversion, so a
/// computed empty value is still elided. Applying the same settings twice is
/// a no-op.
///
/// # Example
///
/// ```rust
/// use hypatia_schema::SerializationSettings;
///
/// let settings = SerializationSettings::new().skip_empty_value(true);
/// assert!(settings.skip_empty_value);
/// assert!(!settings.skip_empty_map);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SerializationSettings {
    /// Drop fields holding an empty map.
    pub skip_empty_map: bool,
    /// Drop fields holding an empty sequence.
    pub skip_empty_sequence: bool,
    /// Drop fields holding null or an empty string.
    pub skip_empty_value: bool,
}

impl SerializationSettings {
    /// Creates settings with every flag off (keep everything).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether empty-map fields are dropped.
    #[must_use]
    pub fn skip_empty_map(mut self, skip: bool) -> Self {
        self.skip_empty_map = skip;
        self
    }

    /// Sets whether empty-sequence fields are dropped.
    #[must_use]
    pub fn skip_empty_sequence(mut self, skip: bool) -> Self {
        self.skip_empty_sequence = skip;
        self
    }

    /// Sets whether null / empty-string fields are dropped.
    #[must_use]
    pub fn skip_empty_value(mut self, skip: bool) -> Self {
        self.skip_empty_value = skip;
        self
    }
}

/// Serializes a value into a generic ordered document.
///
/// Walks the declared fields of the value's type in declaration order;
/// primitives pass through, nested typed values recurse, collections become
/// sequences of converted elements.
///
/// # Errors
///
/// Returns [`SerializeError::Serialize`] when the value cannot be
/// represented (non-string map keys, non-finite floats).
pub fn to_document<T: Serialize>(value: &T) -> Result<Document, SerializeError> {
    serde_json::to_value(value).map_err(SerializeError::Serialize)
}

/// Reconstructs a typed value from a generic document.
///
/// # Errors
///
/// Returns [`SerializeError::Reconstruct`] when the document does not match
/// the target type's shape.
pub fn from_document<T: DeserializeOwned>(document: Document) -> Result<T, SerializeError> {
    serde_json::from_value(document).map_err(SerializeError::Reconstruct)
}

/// Applies the elision policy to a document, per field, bottom-up.
///
/// Nested documents are elided before their parent decides whether the
/// (possibly now-empty) field is dropped, so a field that *becomes* empty
/// through elision is itself subject to the policy. Sequence elements are
/// converted but never dropped; the policy speaks about fields.
#[must_use]
pub fn elide(document: Document, settings: &SerializationSettings) -> Document {
    match document {
        Value::Object(entries) => {
            let mut kept = Map::new();
            for (key, entry) in entries {
                let entry = elide(entry, settings);
                if elidable(&entry, settings) {
                    continue;
                }
                kept.insert(key, entry);
            }
            Value::Object(kept)
        }
        Value::Array(elements) => Value::Array(
            elements
                .into_iter()
                .map(|element| elide(element, settings))
                .collect(),
        ),
        scalar => scalar,
    }
}

fn elidable(value: &Value, settings: &SerializationSettings) -> bool {
    match value {
        Value::Null => settings.skip_empty_value,
        Value::String(s) => settings.skip_empty_value && s.is_empty(),
        Value::Array(elements) => settings.skip_empty_sequence && elements.is_empty(),
        Value::Object(entries) => settings.skip_empty_map && entries.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}
