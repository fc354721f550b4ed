//! # Hypatia Docs
//!
//! Document assembly for the Hypatia routing layer.
//!
//! The [`DocAssembler`] walks the registered routes and builds a tree keyed
//! by path template → method → [`RouteDoc`]: parameters grouped by source,
//! request-body schema, response schemas per declared status (success plus
//! one per documented fault kind), and security requirements. The tree is
//! built entirely from schema nodes and fault descriptors, the same
//! metadata the runtime binds and renders with, so documentation cannot
//! drift from behavior.
//!
//! Rendering the tree into a full OpenAPI document (info block, servers,
//! JSON/YAML emission, viewer UI) is the external assembler's job; this
//! crate stops at the serializable tree.

#![doc(html_root_url = "https://docs.rs/hypatia-docs/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod assembler;
mod scheme;

pub use assembler::{BodyDoc, DocAssembler, DocTree, ParameterDoc, ResponseDoc, RouteDoc};
pub use scheme::SecurityScheme;
