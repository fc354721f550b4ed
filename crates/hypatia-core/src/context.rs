//! The application context.
//!
//! An [`ApiContext`] bundles the process-wide registries: the codec table,
//! the fault table, the schema catalog, and the registered routes. It is
//! built exactly once, during single-threaded startup, and shared behind an
//! `Arc` afterwards; registry lookups are pure reads, so concurrent
//! requests need no locking.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, error};

use hypatia_codec::{BodyParser, BodySerializer, CodecRegistry};
use hypatia_faults::{FaultDescriptor, FaultRegistry, FaultRegistryError};
use hypatia_schema::SchemaCatalog;
use mime::Mime;

use crate::route::{RouteBuilder, RouteError, RouteSpec};

/// Errors that abort context construction, and with it application
/// startup.
#[derive(Debug, Error)]
pub enum BuildError {
    /// A route declaration was invalid or undescribable.
    #[error(transparent)]
    Route(#[from] RouteError),

    /// A fault descriptor collided with an already-registered kind.
    #[error(transparent)]
    Fault(#[from] FaultRegistryError),

    /// Two routes claim the same operation id.
    #[error("duplicate operation id '{operation_id}'")]
    DuplicateOperation {
        /// The contested id.
        operation_id: String,
    },

    /// A route documents a fault kind that is not registered.
    #[error("route '{operation_id}' documents unregistered fault kind '{kind}'")]
    UnknownFault {
        /// The route documenting the kind.
        operation_id: String,
        /// The unregistered kind.
        kind: &'static str,
    },
}

/// Process-wide immutable state: registries plus registered routes.
#[derive(Debug)]
pub struct ApiContext {
    codecs: CodecRegistry,
    faults: FaultRegistry,
    catalog: SchemaCatalog,
    routes: Vec<RouteSpec>,
}

impl ApiContext {
    /// Starts a builder.
    #[must_use]
    pub fn builder() -> ApiContextBuilder {
        ApiContextBuilder::new()
    }

    /// The codec registry.
    #[must_use]
    pub fn codecs(&self) -> &CodecRegistry {
        &self.codecs
    }

    /// The fault registry.
    #[must_use]
    pub fn faults(&self) -> &FaultRegistry {
        &self.faults
    }

    /// The schema catalog filled during registration.
    #[must_use]
    pub fn catalog(&self) -> &SchemaCatalog {
        &self.catalog
    }

    /// All registered routes, in registration order.
    #[must_use]
    pub fn routes(&self) -> &[RouteSpec] {
        &self.routes
    }

    /// Looks up a route by operation id.
    #[must_use]
    pub fn route(&self, operation_id: &str) -> Option<&RouteSpec> {
        self.routes
            .iter()
            .find(|r| r.operation_id() == operation_id)
    }
}

/// Builder collecting codecs, fault descriptors and route declarations, then
/// validating everything in one place.
///
/// Starts with the built-in JSON and form codecs registered; use
/// [`ApiContextBuilder::bare`] to start from an empty codec table.
pub struct ApiContextBuilder {
    codecs: CodecRegistry,
    fault_descriptors: Vec<FaultDescriptor>,
    routes: Vec<RouteBuilder>,
}

impl Default for ApiContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ApiContextBuilder {
    /// Creates a builder with the default JSON and form codecs registered.
    #[must_use]
    pub fn new() -> Self {
        let mut codecs = CodecRegistry::new();
        codecs.register_json();
        codecs.register_form();
        Self {
            codecs,
            fault_descriptors: Vec::new(),
            routes: Vec::new(),
        }
    }

    /// Creates a builder with an empty codec table, for applications that
    /// replace the built-in codecs entirely.
    #[must_use]
    pub fn bare() -> Self {
        Self {
            codecs: CodecRegistry::new(),
            fault_descriptors: Vec::new(),
            routes: Vec::new(),
        }
    }

    /// Registers a body parser for a media-type pattern.
    #[must_use]
    pub fn parser(mut self, media_type: Mime, parser: Arc<dyn BodyParser>) -> Self {
        self.codecs.register_parser(media_type, parser);
        self
    }

    /// Registers a body serializer for a media-type pattern.
    #[must_use]
    pub fn serializer(mut self, media_type: Mime, serializer: Arc<dyn BodySerializer>) -> Self {
        self.codecs.register_serializer(media_type, serializer);
        self
    }

    /// Registers a fault descriptor. Duplicates are rejected at build time.
    #[must_use]
    pub fn fault(mut self, descriptor: FaultDescriptor) -> Self {
        self.fault_descriptors.push(descriptor);
        self
    }

    /// Adds a route declaration.
    #[must_use]
    pub fn route(mut self, route: RouteBuilder) -> Self {
        self.routes.push(route);
        self
    }

    /// Validates every declaration and builds the shared context.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError`] on the first invalid route, schema failure,
    /// duplicate fault kind, duplicate operation id, or dangling documented
    /// fault. All of these abort startup.
    pub fn build(self) -> Result<Arc<ApiContext>, BuildError> {
        let mut faults = FaultRegistry::new();
        for descriptor in self.fault_descriptors {
            faults.register(descriptor)?;
        }

        let mut catalog = SchemaCatalog::new();
        let mut routes: Vec<RouteSpec> = Vec::with_capacity(self.routes.len());
        for builder in self.routes {
            let route = builder.finish(&mut catalog).map_err(|e| {
                error!(error = %e, "route registration failed");
                e
            })?;

            if routes
                .iter()
                .any(|existing| existing.operation_id() == route.operation_id())
            {
                return Err(BuildError::DuplicateOperation {
                    operation_id: route.operation_id().to_string(),
                });
            }

            for kind in route.faults() {
                if faults.get(kind).is_none() {
                    return Err(BuildError::UnknownFault {
                        operation_id: route.operation_id().to_string(),
                        kind,
                    });
                }
            }

            routes.push(route);
        }

        debug!(
            routes = routes.len(),
            faults = faults.len(),
            schemas = catalog.len(),
            "api context built"
        );

        Ok(Arc::new(ApiContext {
            codecs: self.codecs,
            faults,
            catalog,
            routes,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;
    use hypatia_extract::parameter_object;
    use hypatia_schema::reflect_object;
    use serde::{Deserialize, Serialize};
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct PetParams {
        pet_id: u64,
    }

    parameter_object!(PetParams {
        "pet_id": u64 => path,
    });

    #[derive(Debug, Serialize)]
    struct Pet {
        id: u64,
        name: String,
    }

    reflect_object!(Pet {
        "id": u64,
        "name": String,
    });

    #[derive(Debug, thiserror::Error)]
    #[error("pet {0} not found")]
    struct PetMissing(u64);

    hypatia_faults::fault!(PetMissing, kind = "pet.missing");

    fn pet_missing_descriptor() -> FaultDescriptor {
        FaultDescriptor::builder("pet.missing")
            .status(StatusCode::NOT_FOUND)
            .example(json!({"message": "pet 1 not found"}))
            .build()
            .unwrap()
    }

    #[test]
    fn test_build_with_route_and_fault() {
        let context = ApiContextBuilder::new()
            .fault(pet_missing_descriptor())
            .route(
                RouteBuilder::get("/pets/{pet_id}")
                    .operation_id("getPet")
                    .params::<PetParams>()
                    .response::<Pet>(StatusCode::OK)
                    .documented_fault("pet.missing"),
            )
            .build()
            .unwrap();

        assert_eq!(context.routes().len(), 1);
        assert!(context.route("getPet").is_some());
        assert!(context.faults().get("pet.missing").is_some());
        assert!(context.catalog().len() >= 2);
    }

    #[test]
    fn test_duplicate_operation_rejected() {
        let err = ApiContextBuilder::new()
            .route(RouteBuilder::get("/a").operation_id("op"))
            .route(RouteBuilder::get("/b").operation_id("op"))
            .build()
            .unwrap_err();

        assert!(matches!(err, BuildError::DuplicateOperation { .. }));
    }

    #[test]
    fn test_dangling_documented_fault_rejected() {
        let err = ApiContextBuilder::new()
            .route(RouteBuilder::get("/a").documented_fault("never.registered"))
            .build()
            .unwrap_err();

        assert!(matches!(err, BuildError::UnknownFault { .. }));
    }

    #[test]
    fn test_duplicate_fault_kind_rejected() {
        let err = ApiContextBuilder::new()
            .fault(pet_missing_descriptor())
            .fault(pet_missing_descriptor())
            .build()
            .unwrap_err();

        assert!(matches!(err, BuildError::Fault(_)));
    }

    #[test]
    fn test_invalid_route_aborts_build() {
        let err = ApiContextBuilder::new()
            .route(RouteBuilder::get("/pets/{pet_id}"))
            .build()
            .unwrap_err();

        assert!(matches!(err, BuildError::Route(_)));
    }

    #[test]
    fn test_default_codecs_registered() {
        let context = ApiContextBuilder::new().build().unwrap();
        assert!(context
            .codecs()
            .resolve_parser(Some("application/json"))
            .is_ok());
        assert!(context
            .codecs()
            .resolve_parser(Some("application/x-www-form-urlencoded"))
            .is_ok());
    }

    #[test]
    fn test_bare_builder_has_no_codecs() {
        let context = ApiContextBuilder::bare().build().unwrap();
        assert!(context.codecs().has_no_parsers());
    }
}
