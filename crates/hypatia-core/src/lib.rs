//! # Hypatia Core
//!
//! Route declarations, the application context, and request dispatch for the
//! Hypatia declarative routing layer.
//!
//! A route declaration supplies an HTTP method, a URL template with named
//! slots, and up to three types: the composite parameter object, the
//! response type, and (for bodies) the request-body type. Registration
//! introspects every declared type through the shared schema catalog,
//! exactly once at startup, and a [`SchemaError`](hypatia_schema::SchemaError)
//! or an inconsistent template aborts startup rather than surfacing per
//! request.
//!
//! ## Pipeline
//!
//! ```text
//! Request → negotiate serializer → bind parameters/body → handler
//!                                                            ↓
//! Response ← encode document ← elide ← serialize ←───────────┘
//!            (faults routed through the fault registry)
//! ```
//!
//! ## Example
//!
//! ```rust
//! use hypatia_core::{ApiContextBuilder, RouteBuilder};
//! use hypatia_extract::parameter_object;
//! use hypatia_schema::reflect_object;
//! use http::StatusCode;
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, Deserialize)]
//! struct ShowParams {
//!     show_id: u64,
//! }
//!
//! parameter_object!(ShowParams {
//!     "show_id": u64 => path,
//! });
//!
//! #[derive(Debug, Serialize)]
//! struct Show {
//!     id: u64,
//!     title: String,
//! }
//!
//! reflect_object!(Show {
//!     "id": u64,
//!     "title": String,
//! });
//!
//! let context = ApiContextBuilder::new()
//!     .route(
//!         RouteBuilder::get("/shows/{show_id}")
//!             .operation_id("getShow")
//!             .params::<ShowParams>()
//!             .response::<Show>(StatusCode::OK),
//!     )
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(context.routes().len(), 1);
//! ```

#![doc(html_root_url = "https://docs.rs/hypatia-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod context;
mod dispatch;
mod error;
mod response;
mod route;

pub use context::{ApiContext, ApiContextBuilder, BuildError};
pub use dispatch::dispatch;
pub use error::{error_envelope, ApiError};
pub use response::ResponseParts;
pub use route::{BodySpec, CompositeSpec, PathTemplate, ResponseSpec, RouteBuilder, RouteError, RouteSpec};
