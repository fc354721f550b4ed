//! # Hypatia Faults
//!
//! The exception registry for the Hypatia routing layer: a mapping from
//! fault kinds to `{status, content type, content-producing function,
//! documented example}`, consulted both to render documentation (error
//! responses) and, at runtime, to convert an uncaught handler fault into an
//! HTTP response.
//!
//! Class-ancestry lookup from the original design maps to an explicit
//! lineage of stable kind identifiers: every [`Fault`] reports its kinds
//! from most-derived to least-derived, and [`FaultRegistry::resolve`]
//! returns the first registered match. Rendering runs the chosen payload
//! through the model serializer exactly as a normal handler response would
//! be, so error payloads are documented identically to success payloads.
//!
//! ## Example
//!
//! ```rust
//! use hypatia_faults::{fault, FaultDescriptor, FaultRegistry};
//! use hypatia_schema::SerializationSettings;
//! use http::StatusCode;
//! use serde_json::json;
//!
//! #[derive(Debug, thiserror::Error)]
//! #[error("customer {0} not found")]
//! struct CustomerMissing(u64);
//!
//! fault!(CustomerMissing, kind = "customer.missing", parents = ["lookup.failed"]);
//!
//! let mut registry = FaultRegistry::new();
//! registry
//!     .register(
//!         FaultDescriptor::builder("customer.missing")
//!             .status(StatusCode::NOT_FOUND)
//!             .example(json!({"message": "customer 26d1 not found"}))
//!             .build()
//!             .unwrap(),
//!     )
//!     .unwrap();
//!
//! let fault = CustomerMissing(7);
//! let descriptor = registry.resolve(&fault).unwrap();
//! let response = registry.render(&fault, descriptor, &SerializationSettings::new());
//! assert_eq!(response.status, StatusCode::NOT_FOUND);
//! ```

#![doc(html_root_url = "https://docs.rs/hypatia-faults/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod descriptor;
mod registry;

pub use descriptor::{Fault, FaultDescriptor, FaultDescriptorBuilder, FaultKind};
pub use registry::{FaultRegistry, FaultRegistryError, FaultResponse};
