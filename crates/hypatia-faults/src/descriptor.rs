//! Fault traits and descriptors.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use http::StatusCode;
use mime::Mime;
use serde::Serialize;
use tracing::warn;

use hypatia_schema::{to_document, Document, Introspector, Reflect, SchemaError, SchemaNode, TypeDescriptor};

/// Stable identifier of a fault kind.
///
/// Kinds form the explicit ancestry that replaces class-hierarchy dispatch:
/// `"customer.missing"` may declare `"lookup.failed"` as a parent, and a
/// descriptor registered for either will catch it, with the more derived
/// kind winning.
pub type FaultKind = &'static str;

/// A business-logic error a route handler can surface.
///
/// Implement via the [`fault!`](crate::fault) macro, which wires up the
/// lineage and the `Any` access the registry needs for typed
/// content-producing functions.
pub trait Fault: std::error::Error + Send + Sync + 'static {
    /// This fault's kind identifiers, most-derived first. Never empty.
    fn lineage(&self) -> &'static [FaultKind];

    /// The most-derived kind.
    fn kind(&self) -> FaultKind {
        self.lineage().first().copied().unwrap_or("fault")
    }

    /// Access for descriptor producers to downcast to the concrete type.
    fn as_any(&self) -> &dyn Any;
}

/// Implements [`Fault`] for an error type, declaring its kind and optional
/// parent kinds from most-derived to least-derived.
///
/// ```rust
/// #[derive(Debug, thiserror::Error)]
/// #[error("quota exhausted")]
/// struct QuotaExhausted;
///
/// hypatia_faults::fault!(QuotaExhausted, kind = "quota.exhausted", parents = ["rate.limited"]);
/// ```
#[macro_export]
macro_rules! fault {
    ($ty:ty, kind = $kind:literal $(, parents = [$($parent:literal),* $(,)?])? $(,)?) => {
        impl $crate::Fault for $ty {
            fn lineage(&self) -> &'static [$crate::FaultKind] {
                &[$kind $($(, $parent)*)?]
            }

            fn as_any(&self) -> &dyn ::std::any::Any {
                self
            }
        }
    };
}

type ProducerFn = Arc<dyn Fn(&dyn Any) -> Option<Document> + Send + Sync>;

/// Registration mapping one fault kind to an HTTP response shape.
///
/// At most one descriptor may claim a given kind per registry. The optional
/// content-producing function turns the concrete fault into a response
/// payload; the optional example doubles as documentation and as the
/// fallback payload when no producer is registered.
#[derive(Clone)]
pub struct FaultDescriptor {
    kind: FaultKind,
    status: StatusCode,
    content_type: Option<Mime>,
    schema: Option<SchemaNode>,
    producer: Option<ProducerFn>,
    example: Option<Document>,
}

impl fmt::Debug for FaultDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FaultDescriptor")
            .field("kind", &self.kind)
            .field("status", &self.status)
            .field("content_type", &self.content_type.as_ref().map(Mime::as_ref))
            .field("has_producer", &self.producer.is_some())
            .field("has_example", &self.example.is_some())
            .finish()
    }
}

impl FaultDescriptor {
    /// Starts a descriptor builder for a fault kind.
    #[must_use]
    pub fn builder(kind: FaultKind) -> FaultDescriptorBuilder {
        FaultDescriptorBuilder::new(kind)
    }

    /// The claimed fault kind.
    #[must_use]
    pub fn kind(&self) -> FaultKind {
        self.kind
    }

    /// The HTTP status returned to the client.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// The response content type, when the response carries a payload.
    #[must_use]
    pub fn content_type(&self) -> Option<&Mime> {
        self.content_type.as_ref()
    }

    /// The documented response schema, when a message type was declared.
    #[must_use]
    pub fn schema(&self) -> Option<&SchemaNode> {
        self.schema.as_ref()
    }

    /// The documented example payload.
    #[must_use]
    pub fn example(&self) -> Option<&Document> {
        self.example.as_ref()
    }

    /// Runs the content-producing function against a fault, if one is
    /// registered and the fault downcasts to its expected type.
    #[must_use]
    pub fn produce(&self, fault: &dyn Fault) -> Option<Document> {
        let producer = self.producer.as_ref()?;
        let produced = producer(fault.as_any());
        if produced.is_none() {
            warn!(
                kind = self.kind,
                fault = fault.kind(),
                "fault descriptor producer did not accept the fault; falling back"
            );
        }
        produced
    }
}

/// Fluent builder for [`FaultDescriptor`].
///
/// ```rust
/// use hypatia_faults::{fault, FaultDescriptor};
/// use hypatia_schema::reflect_object;
/// use http::StatusCode;
/// use serde::Serialize;
/// use serde_json::json;
///
/// #[derive(Debug, thiserror::Error)]
/// #[error("order {0} not found")]
/// struct OrderMissing(u64);
///
/// fault!(OrderMissing, kind = "order.missing");
///
/// #[derive(Serialize)]
/// struct ErrorMessage {
///     message: String,
/// }
///
/// reflect_object!(ErrorMessage {
///     "message": String,
/// });
///
/// let descriptor = FaultDescriptor::builder("order.missing")
///     .status(StatusCode::NOT_FOUND)
///     .message_type::<ErrorMessage>()
///     .example(json!({"message": "order 17 not found"}))
///     .producer(|fault: &OrderMissing| ErrorMessage {
///         message: fault.to_string(),
///     })
///     .build()
///     .unwrap();
///
/// assert_eq!(descriptor.status(), StatusCode::NOT_FOUND);
/// assert!(descriptor.schema().is_some());
/// ```
pub struct FaultDescriptorBuilder {
    kind: FaultKind,
    status: StatusCode,
    content_type: Option<Mime>,
    message_descriptor: Option<fn() -> TypeDescriptor>,
    producer: Option<ProducerFn>,
    example: Option<Document>,
}

impl FaultDescriptorBuilder {
    fn new(kind: FaultKind) -> Self {
        Self {
            kind,
            status: StatusCode::BAD_REQUEST,
            content_type: None,
            message_descriptor: None,
            producer: None,
            example: None,
        }
    }

    /// Sets the HTTP status. Defaults to 400.
    #[must_use]
    pub fn status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    /// Overrides the response content type. Defaults to `application/json`
    /// whenever the response carries a payload.
    #[must_use]
    pub fn content_type(mut self, media_type: Mime) -> Self {
        self.content_type = Some(media_type);
        self
    }

    /// Declares the response message type, introspected into the documented
    /// schema at build time.
    #[must_use]
    pub fn message_type<M: Reflect>(mut self) -> Self {
        self.message_descriptor = Some(M::descriptor);
        self
    }

    /// Sets the documented example payload, also used as the response
    /// payload when no producer is registered.
    #[must_use]
    pub fn example(mut self, example: Document) -> Self {
        self.example = Some(example);
        self
    }

    /// Registers the content-producing function, typed against the concrete
    /// fault it serves. A fault of any other type falls back to the example.
    #[must_use]
    pub fn producer<E, M>(mut self, produce: fn(&E) -> M) -> Self
    where
        E: Fault,
        M: Serialize + 'static,
    {
        self.producer = Some(Arc::new(move |any: &dyn Any| {
            let fault = any.downcast_ref::<E>()?;
            to_document(&produce(fault)).ok()
        }));
        self
    }

    /// Builds the descriptor, introspecting the declared message type.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError`] when the declared message type cannot be
    /// introspected. A startup-time failure, like every schema error.
    pub fn build(self) -> Result<FaultDescriptor, SchemaError> {
        let schema = match self.message_descriptor {
            Some(thunk) => Some(Introspector::new().describe(&thunk())?),
            None => None,
        };

        let carries_payload =
            schema.is_some() || self.example.is_some() || self.producer.is_some();
        let content_type = self
            .content_type
            .or_else(|| carries_payload.then_some(mime::APPLICATION_JSON));

        Ok(FaultDescriptor {
            kind: self.kind,
            status: self.status,
            content_type,
            schema,
            producer: self.producer,
            example: self.example,
        })
    }
}
