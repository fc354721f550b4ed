//! Schema introspection.
//!
//! The [`Introspector`] converts a [`TypeDescriptor`] into a canonical
//! [`SchemaNode`] tree. It is pure and deterministic: the same descriptor
//! always yields a structurally identical node. Recursive object types are
//! cut with a [`SchemaKind::Reference`] instead of re-expanding, so the walk
//! always terminates.
//!
//! The [`SchemaCatalog`] caches introspected nodes by type identity. It is
//! filled during single-threaded route registration and read-only afterwards.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, warn};

use crate::descriptor::{Constraints, PrimitiveKind, Reflect, TypeDescriptor};
use crate::node::{EnumValue, ObjectField, SchemaKind, SchemaNode};

/// Errors raised when a declared type cannot be introspected.
///
/// A `SchemaError` is a startup-time fatal condition: the route declaring the
/// offending type can never be served correctly, so application startup must
/// abort rather than deferring the failure to request time.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// The type has no schema representation (function types, handles).
    #[error("type '{name}' cannot be represented in a schema")]
    Unrepresentable {
        /// The declared name of the offending type.
        name: String,
    },

    /// An enum descriptor declared no values.
    #[error("enum '{name}' declares no values")]
    EmptyEnum {
        /// The declared name of the offending enum.
        name: String,
    },
}

/// Converts type descriptors into canonical schema nodes.
///
/// # Example
///
/// ```rust
/// use hypatia_schema::{Introspector, Reflect, SchemaKind};
///
/// let node = Introspector::new().describe(&Vec::<u64>::descriptor()).unwrap();
/// assert!(matches!(node.kind, SchemaKind::Array { .. }));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Introspector;

impl Introspector {
    /// Creates an introspector.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Describes a type descriptor as a schema node tree.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError`] when the descriptor (or any nested descriptor)
    /// is unrepresentable.
    pub fn describe(&self, descriptor: &TypeDescriptor) -> Result<SchemaNode, SchemaError> {
        let mut in_progress = Vec::new();
        self.walk(descriptor, &mut in_progress)
    }

    fn walk(
        &self,
        descriptor: &TypeDescriptor,
        in_progress: &mut Vec<&'static str>,
    ) -> Result<SchemaNode, SchemaError> {
        match descriptor {
            TypeDescriptor::Primitive(kind) => Ok(SchemaNode::new(match kind {
                PrimitiveKind::Boolean => SchemaKind::Boolean,
                PrimitiveKind::Integer => SchemaKind::Integer,
                PrimitiveKind::Float => SchemaKind::Number,
                PrimitiveKind::String => SchemaKind::String,
            })),

            TypeDescriptor::Optional(inner) => {
                let mut node = self.walk(inner, in_progress)?;
                node.nullable = true;
                Ok(node)
            }

            TypeDescriptor::Sequence(element) => {
                let items = self.walk(element, in_progress)?;
                Ok(SchemaNode::new(SchemaKind::Array {
                    items: Box::new(items),
                }))
            }

            TypeDescriptor::Map(value) => {
                let values = self.walk(value, in_progress)?;
                Ok(SchemaNode::new(SchemaKind::Map {
                    values: Box::new(values),
                }))
            }

            TypeDescriptor::Enum(e) => {
                let variants = (e.variants)();
                if variants.is_empty() {
                    return Err(SchemaError::EmptyEnum {
                        name: e.name.to_string(),
                    });
                }
                let values = variants
                    .iter()
                    .map(|v| EnumValue {
                        value: v.value.to_string(),
                        label: v.label.map(str::to_string),
                    })
                    .collect();
                let mut node = SchemaNode::new(SchemaKind::Enum { values });
                node.name = Some(e.name.to_string());
                Ok(node)
            }

            TypeDescriptor::Object(o) => {
                if in_progress.contains(&o.name) {
                    // Already expanding this object further up the walk:
                    // emit a named reference instead of recursing.
                    return Ok(SchemaNode::new(SchemaKind::Reference {
                        name: o.name.to_string(),
                    }));
                }

                in_progress.push(o.name);
                let mut fields = Vec::new();
                for field in (o.fields)() {
                    let required = !field.ty.is_optional();
                    let mut schema = self.walk(&field.ty, in_progress)?;
                    schema.constraints = applicable_constraints(&schema, field.constraints);
                    fields.push(ObjectField {
                        name: field.name.to_string(),
                        schema,
                        required,
                    });
                }
                in_progress.pop();

                let mut node = SchemaNode::new(SchemaKind::Object { fields });
                node.name = Some(o.name.to_string());
                Ok(node)
            }

            TypeDescriptor::Opaque(name) => Err(SchemaError::Unrepresentable {
                name: (*name).to_string(),
            }),
        }
    }
}

/// Filters constraint annotations down to the ones applicable to the node's
/// kind: numeric bounds for integer/number nodes, length/pattern for string
/// and enum nodes. Inapplicable constraints are discarded with a warning;
/// they never change the node kind.
fn applicable_constraints(node: &SchemaNode, declared: Constraints) -> Constraints {
    let mut kept = Constraints {
        format: declared.format,
        ..Constraints::default()
    };

    let numeric = matches!(node.kind, SchemaKind::Integer | SchemaKind::Number);
    let textual = matches!(node.kind, SchemaKind::String | SchemaKind::Enum { .. });

    if declared.has_numeric() {
        if numeric {
            kept.minimum = declared.minimum;
            kept.maximum = declared.maximum;
        } else {
            warn!(kind = ?node.kind, "discarding numeric bounds on non-numeric schema node");
        }
    }
    if declared.has_textual() {
        if textual {
            kept.min_length = declared.min_length;
            kept.max_length = declared.max_length;
            kept.pattern = declared.pattern;
        } else {
            warn!(kind = ?node.kind, "discarding textual constraints on non-string schema node");
        }
    }

    kept
}

/// Cache of introspected schema nodes, keyed by type identity.
///
/// Two structurally identical but separately declared types remain distinct
/// entries: sharing a documentation entry requires declaring and reusing one
/// type. The catalog is filled during single-threaded startup and shared
/// read-only afterwards.
#[derive(Debug, Default)]
pub struct SchemaCatalog {
    cache: HashMap<TypeId, Arc<SchemaNode>>,
}

impl SchemaCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the schema node for `T`, introspecting and caching it on
    /// first use.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError`] when `T`'s descriptor is unrepresentable.
    pub fn resolve<T: Reflect>(&mut self) -> Result<Arc<SchemaNode>, SchemaError> {
        let key = TypeId::of::<T>();
        if let Some(node) = self.cache.get(&key) {
            return Ok(Arc::clone(node));
        }

        let node = Arc::new(Introspector::new().describe(&T::descriptor())?);
        debug!(name = node.name.as_deref().unwrap_or("<anonymous>"), "cached schema node");
        self.cache.insert(key, Arc::clone(&node));
        Ok(node)
    }

    /// Returns the cached node for `T` without introspecting.
    #[must_use]
    pub fn get<T: 'static>(&self) -> Option<Arc<SchemaNode>> {
        self.cache.get(&TypeId::of::<T>()).map(Arc::clone)
    }

    /// Number of cached entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Returns `true` when nothing has been cached yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}
