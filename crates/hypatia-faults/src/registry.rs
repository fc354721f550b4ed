//! The fault registry.

use http::StatusCode;
use indexmap::IndexMap;
use mime::Mime;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use hypatia_schema::{elide, Document, SerializationSettings};

use crate::descriptor::{Fault, FaultDescriptor, FaultKind};

/// Errors raised while registering fault descriptors.
#[derive(Debug, Clone, Error)]
pub enum FaultRegistryError {
    /// Another descriptor already claims this kind in this registry.
    #[error("a descriptor already claims fault kind '{kind}'")]
    DuplicateKind {
        /// The contested kind.
        kind: FaultKind,
    },
}

/// The rendered response for one fault.
#[derive(Debug, Clone)]
pub struct FaultResponse {
    /// HTTP status to send.
    pub status: StatusCode,
    /// Content type of the payload, when there is one.
    pub content_type: Option<Mime>,
    /// The payload document; `Value::Null` means an empty response body.
    pub payload: Document,
}

/// Process-wide mapping from fault kinds to response descriptors.
///
/// Registered once during application setup, then consulted read-only on
/// every request. Resolution walks a fault's lineage from most-derived to
/// least-derived and returns the first registered match; a fault with no
/// registered ancestor is the caller's cue to emit the generic failure
/// response.
#[derive(Debug, Clone, Default)]
pub struct FaultRegistry {
    descriptors: IndexMap<FaultKind, FaultDescriptor>,
}

impl FaultRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`FaultRegistryError::DuplicateKind`] when the kind is
    /// already claimed; at most one descriptor may claim a given kind.
    pub fn register(&mut self, descriptor: FaultDescriptor) -> Result<(), FaultRegistryError> {
        let kind = descriptor.kind();
        if self.descriptors.contains_key(kind) {
            return Err(FaultRegistryError::DuplicateKind { kind });
        }
        debug!(kind, status = %descriptor.status(), "registered fault descriptor");
        self.descriptors.insert(kind, descriptor);
        Ok(())
    }

    /// Looks up the descriptor registered for exactly this kind.
    #[must_use]
    pub fn get(&self, kind: FaultKind) -> Option<&FaultDescriptor> {
        self.descriptors.get(kind)
    }

    /// Resolves the descriptor for a fault by walking its lineage from
    /// most-derived to least-derived.
    #[must_use]
    pub fn resolve(&self, fault: &dyn Fault) -> Option<&FaultDescriptor> {
        fault
            .lineage()
            .iter()
            .find_map(|kind| self.descriptors.get(kind))
    }

    /// Renders a fault through its resolved descriptor.
    ///
    /// The payload is the producer's output when present, else the
    /// documented example, else empty; it then runs through the model
    /// serializer's elision pass exactly as a normal handler response would.
    #[must_use]
    pub fn render(
        &self,
        fault: &dyn Fault,
        descriptor: &FaultDescriptor,
        settings: &SerializationSettings,
    ) -> FaultResponse {
        let payload = descriptor
            .produce(fault)
            .or_else(|| descriptor.example().cloned())
            .unwrap_or(Value::Null);

        if payload.is_null() && descriptor.content_type().is_some() {
            warn!(
                kind = descriptor.kind(),
                "fault descriptor declares a content type but produced no payload"
            );
        }

        FaultResponse {
            status: descriptor.status(),
            content_type: descriptor.content_type().cloned(),
            payload: elide(payload, settings),
        }
    }

    /// Iterates over registered descriptors in registration order.
    pub fn descriptors(&self) -> impl Iterator<Item = &FaultDescriptor> {
        self.descriptors.values()
    }

    /// Number of registered descriptors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Returns `true` when nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}
