//! # Hypatia Schema
//!
//! Type descriptors, schema introspection and model serialization for the
//! Hypatia declarative routing layer.
//!
//! This crate is the single source of truth the rest of the workspace builds
//! on: the same descriptor a handler declares for its parameter object drives
//! runtime coercion in the binder *and* the documentation tree, so the two
//! can never drift apart.
//!
//! ## Components
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`TypeDescriptor`] | Language-level shape of a type (primitives, objects, sequences, maps, enums, optionals) |
//! | [`Reflect`] | Trait advertising a type's descriptor; implemented via [`reflect_object!`] / [`reflect_enum!`] |
//! | [`Introspector`] | Converts descriptors into canonical [`SchemaNode`] trees with cycle cut-off |
//! | [`SchemaCatalog`] | Caches introspected nodes by type identity, built once at startup |
//! | [`to_document`] / [`elide`] | The model serializer: ordered generic documents with explicit elision policy |
//! | [`SecurityModel`] | Ordered scheme-name → scope-list association for route security |
//!
//! ## Example
//!
//! ```rust
//! use hypatia_schema::{reflect_object, Introspector, Reflect, SchemaKind};
//!
//! struct User {
//!     id: u64,
//!     name: String,
//! }
//!
//! reflect_object!(User {
//!     "id": u64,
//!     "name": String,
//! });
//!
//! let node = Introspector::new().describe(&User::descriptor()).unwrap();
//! assert!(matches!(node.kind, SchemaKind::Object { .. }));
//! assert_eq!(node.name.as_deref(), Some("User"));
//! ```

#![doc(html_root_url = "https://docs.rs/hypatia-schema/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod coerce;
mod descriptor;
mod introspect;
mod node;
mod security;
mod serialize;

pub use coerce::{coerce_document, coerce_scalar, CoerceError};
pub use descriptor::{
    Constraints, EnumDescriptor, FieldDescriptor, ObjectDescriptor, PrimitiveKind, Reflect,
    TypeDescriptor, VariantDescriptor,
};
pub use introspect::{Introspector, SchemaCatalog, SchemaError};
pub use node::{EnumValue, ObjectField, SchemaKind, SchemaNode};
pub use security::{Described, SecurityModel, SecurityScope};
pub use serialize::{
    elide, from_document, to_document, Document, SerializationSettings, SerializeError,
};
