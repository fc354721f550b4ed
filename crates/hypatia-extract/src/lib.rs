//! # Hypatia Extract
//!
//! Typed parameter binding for the Hypatia routing layer.
//!
//! Given a request and a composite parameter type whose fields are tagged
//! with their source (path, query, header, body), the [`Binder`] extracts the
//! raw values under each source's case and multiplicity rules, coerces them
//! to the declared field kinds through the shared schema model, and assembles
//! one constructed value.
//!
//! ## Source rules
//!
//! | Source | Case rule | Multiplicity |
//! |--------|-----------|--------------|
//! | path | not applicable (matched by template slot) | single |
//! | query | case-sensitive exact match | repeated keys allowed |
//! | header | case-insensitive (canonical fold) | repeated names allowed |
//! | body | case-sensitive exact match on decoded fields | single |
//!
//! When a scalar field receives repeated query/header values, the first one
//! is used and the rest are ignored; documented behavior, not an error.
//! Sequence fields receive every value.
//!
//! ## Example
//!
//! ```rust
//! use hypatia_codec::CodecRegistry;
//! use hypatia_extract::{parameter_object, Binder, RequestParts};
//! use serde::Deserialize;
//!
//! #[derive(Debug, Deserialize, PartialEq)]
//! struct EpisodeParams {
//!     show_id: u64,
//!     lang: Option<String>,
//! }
//!
//! parameter_object!(EpisodeParams {
//!     "show_id": u64 => path,
//!     "lang": Option<String> => query,
//! });
//!
//! let parts = RequestParts::builder()
//!     .method(http::Method::GET)
//!     .uri(http::Uri::from_static("/shows/42/episodes?lang=en"))
//!     .path_slot("show_id", "42")
//!     .build();
//!
//! let registry = CodecRegistry::new();
//! let params: EpisodeParams = Binder::new(&registry).bind(&parts).unwrap();
//! assert_eq!(params, EpisodeParams { show_id: 42, lang: Some("en".into()) });
//! ```

#![doc(html_root_url = "https://docs.rs/hypatia-extract/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod binder;
mod descriptor;
mod error;
mod request;

pub use binder::Binder;
pub use descriptor::{ParameterDescriptor, ParameterObject, ParameterSource};
pub use error::{BindError, BindingError};
pub use request::{PathSlots, RequestParts, RequestPartsBuilder};

// Re-exported for `parameter_object!` expansion; not part of the public surface.
#[doc(hidden)]
pub mod __schema {
    pub use hypatia_schema::{reflect_object, Reflect};
}
