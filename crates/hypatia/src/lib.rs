//! # Hypatia
//!
//! **A declarative layer between typed route handlers and an HTTP runtime.**
//!
//! Hypatia keeps four concerns consistent with each other from a single
//! source of truth, the handler's declared parameter and payload types:
//!
//! - 🧲 **Parameter binding** – typed extraction from path, query, header
//!   and body, with per-source case and multiplicity rules
//! - 🤝 **Content negotiation** – a registry of media-type codecs driving
//!   both request decoding and response encoding
//! - 🧯 **Fault mapping** – registered descriptors converting handler
//!   faults into documented, typed error responses
//! - 📜 **Documentation derivation** – a machine-readable tree built from
//!   the same schema metadata the runtime binds with
//!
//! ## Quick start
//!
//! ```rust
//! use hypatia::prelude::*;
//! use http::StatusCode;
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, Deserialize)]
//! struct GreetParams {
//!     name: String,
//! }
//!
//! parameter_object!(GreetParams {
//!     "name": String => query,
//! });
//!
//! #[derive(Debug, Serialize)]
//! struct Greeting {
//!     message: String,
//! }
//!
//! reflect_object!(Greeting {
//!     "message": String,
//! });
//!
//! let context = ApiContextBuilder::new()
//!     .route(
//!         RouteBuilder::get("/greet")
//!             .operation_id("greet")
//!             .params::<GreetParams>()
//!             .response::<Greeting>(StatusCode::OK),
//!     )
//!     .build()
//!     .unwrap();
//!
//! let docs = DocAssembler::new().assemble(&context);
//! assert!(docs.paths.contains_key("/greet"));
//! ```

#![doc(html_root_url = "https://docs.rs/hypatia/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export component crates under stable module names.
pub use hypatia_codec as codec;
pub use hypatia_core as core;
pub use hypatia_docs as docs;
pub use hypatia_extract as extract;
pub use hypatia_faults as faults;
pub use hypatia_schema as schema;

/// The commonly-used surface in one import.
pub mod prelude {
    pub use hypatia_codec::{BodyParser, BodySerializer, CodecRegistry, NegotiationError};
    pub use hypatia_core::{
        dispatch, ApiContext, ApiContextBuilder, ResponseParts, RouteBuilder,
    };
    pub use hypatia_docs::{DocAssembler, SecurityScheme};
    pub use hypatia_extract::{
        parameter_object, Binder, BindingError, ParameterObject, ParameterSource, RequestParts,
    };
    pub use hypatia_faults::{fault, Fault, FaultDescriptor, FaultRegistry};
    pub use hypatia_schema::{
        reflect_enum, reflect_object, Constraints, Described, Reflect, SecurityModel,
        SerializationSettings,
    };
}
