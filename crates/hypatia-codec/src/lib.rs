//! # Hypatia Codec
//!
//! The content-negotiation registry for the Hypatia routing layer.
//!
//! A [`CodecRegistry`] holds ordered lists of (media-type pattern → parser)
//! and (media-type pattern → serializer) entries. The parameter binder asks
//! it to decode request bodies by `Content-Type`; the response path asks it
//! to pick a serializer against the client's `Accept` header, honoring
//! quality values.
//!
//! ## Matching rules
//!
//! - An exact `type/subtype` registration wins over a wildcard one.
//! - Wildcard-subtype registrations (`application/*`) match only when no
//!   exact entry does.
//! - Among equally specific registrations, the first registered wins.
//! - Serializer selection walks the client's acceptable ranges in descending
//!   quality order (header position breaks ties); `q=0` ranges are skipped;
//!   a missing `Accept` header behaves as `*/*`.
//!
//! ## Example
//!
//! ```rust
//! use hypatia_codec::{CodecRegistry, JsonCodec};
//!
//! let mut registry = CodecRegistry::new();
//! registry.register_json();
//!
//! let (media, _serializer) = registry
//!     .resolve_serializer(Some("text/html;q=0.2, application/json"))
//!     .unwrap();
//! assert_eq!(media.essence_str(), "application/json");
//!
//! assert!(registry.resolve_parser(Some("application/json")).is_ok());
//! assert!(registry.resolve_parser(Some("text/csv")).is_err());
//! ```

#![doc(html_root_url = "https://docs.rs/hypatia-codec/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod accept;
mod error;
mod form;
mod json;
mod registry;

pub use error::{DecodeError, EncodeError, NegotiationError};
pub use form::FormCodec;
pub use json::JsonCodec;
pub use registry::{BodyParser, BodySerializer, CodecRegistry};
