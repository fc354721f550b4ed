//! Primitive coercion rules.
//!
//! The binder receives raw transport strings (path slots, query values,
//! header values, form fields) and coerces them into the scalar kind the
//! target field's schema declares. Parsing is locale-independent: integers
//! and floats go through `str::parse`, booleans accept only `true`/`false`,
//! enums match their declared literals exactly.

use serde_json::{Number, Value};
use thiserror::Error;

use crate::node::{SchemaKind, SchemaNode};

/// A raw value could not be coerced to the kind its schema declares.
#[derive(Debug, Clone, Error)]
#[error("expected {expected}, got '{raw}'")]
pub struct CoerceError {
    /// What the schema expected (`"integer"`, `"boolean"`, ...).
    pub expected: &'static str,
    /// The offending raw value.
    pub raw: String,
}

impl CoerceError {
    fn new(expected: &'static str, raw: &str) -> Self {
        Self {
            expected,
            raw: raw.to_string(),
        }
    }
}

/// Coerces a raw transport string into the scalar kind `node` declares.
///
/// # Errors
///
/// Returns [`CoerceError`] when the raw value does not parse as the declared
/// kind, or when the node is not scalar-shaped (objects and maps cannot be
/// carried in a single raw string).
///
/// # Example
///
/// ```rust
/// use hypatia_schema::{coerce_scalar, SchemaKind, SchemaNode};
/// use serde_json::json;
///
/// let node = SchemaNode::new(SchemaKind::Integer);
/// assert_eq!(coerce_scalar(&node, "123").unwrap(), json!(123));
/// assert!(coerce_scalar(&node, "12.5").is_err());
/// ```
pub fn coerce_scalar(node: &SchemaNode, raw: &str) -> Result<Value, CoerceError> {
    match &node.kind {
        SchemaKind::Boolean => match raw {
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            _ => Err(CoerceError::new("boolean", raw)),
        },

        SchemaKind::Integer => {
            if let Ok(unsigned) = raw.parse::<u64>() {
                Ok(Value::Number(Number::from(unsigned)))
            } else {
                raw.parse::<i64>()
                    .map(|signed| Value::Number(Number::from(signed)))
                    .map_err(|_| CoerceError::new("integer", raw))
            }
        }

        SchemaKind::Number => raw
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .ok_or_else(|| CoerceError::new("number", raw)),

        SchemaKind::String => Ok(Value::String(raw.to_string())),

        SchemaKind::Enum { values } => {
            if values.iter().any(|v| v.value == raw) {
                Ok(Value::String(raw.to_string()))
            } else {
                Err(CoerceError::new("one of the declared enum values", raw))
            }
        }

        SchemaKind::Reference { .. }
        | SchemaKind::Array { .. }
        | SchemaKind::Map { .. }
        | SchemaKind::Object { .. }
        | SchemaKind::OneOf { .. } => Err(CoerceError::new("a scalar value", raw)),
    }
}

/// Schema-guided coercion over an already-decoded document.
///
/// Body parsers that produce string-valued documents (form encoding) still
/// need their scalars coerced the way query strings are; JSON documents pass
/// through untouched wherever the value already has the declared kind. Only
/// strings are re-interpreted; a decoded number is never stringified.
///
/// Unknown fields are preserved as-is; the subsequent typed deserialization
/// decides whether they are acceptable.
#[must_use]
pub fn coerce_document(node: &SchemaNode, value: Value) -> Value {
    match (&node.kind, value) {
        (SchemaKind::Object { .. }, Value::Object(entries)) => {
            let coerced = entries
                .into_iter()
                .map(|(key, entry)| {
                    let entry = match node.field(&key) {
                        Some(field) => coerce_document(&field.schema, entry),
                        None => entry,
                    };
                    (key, entry)
                })
                .collect();
            Value::Object(coerced)
        }

        (SchemaKind::Map { values }, Value::Object(entries)) => {
            let coerced = entries
                .into_iter()
                .map(|(key, entry)| (key, coerce_document(values, entry)))
                .collect();
            Value::Object(coerced)
        }

        (SchemaKind::Array { items }, Value::Array(elements)) => Value::Array(
            elements
                .into_iter()
                .map(|element| coerce_document(items, element))
                .collect(),
        ),

        (_, Value::String(raw)) => {
            coerce_scalar(node, &raw).unwrap_or(Value::String(raw))
        }

        (_, other) => other,
    }
}
