//! Request dispatch.
//!
//! [`dispatch`] drives one request through the pipeline: negotiate the
//! response serializer, bind the declared parameter object and body, invoke
//! the handler, and encode the result, routing every failure through the
//! error taxonomy. The transport owns I/O and cancellation; everything here
//! is synchronous in-memory work around one `await` of the handler.

use std::future::Future;

use bytes::Bytes;
use http::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, error, warn};

use hypatia_extract::{Binder, ParameterObject, RequestParts};
use hypatia_faults::Fault;
use hypatia_schema::{elide, to_document, SerializationSettings};

use crate::context::ApiContext;
use crate::error::{error_envelope, ApiError};
use crate::response::ResponseParts;
use crate::route::RouteSpec;

/// Dispatches one request to a handler under a registered route.
///
/// The handler receives the bound parameter object and, when the route
/// declares a request body, the decoded body value. Its `Ok` value is
/// serialized through the model serializer and encoded by the negotiated
/// serializer; its `Err` fault is resolved against the fault registry, with
/// a generic empty 500 as the documented fallback for unregistered kinds.
///
/// Binding and negotiation failures never reach the handler: they render as
/// a structured `{"error": {...}}` envelope with a 4xx status.
pub async fn dispatch<P, B, R, E, H, Fut>(
    context: &ApiContext,
    route: &RouteSpec,
    parts: &RequestParts,
    handler: H,
) -> ResponseParts
where
    P: ParameterObject,
    B: DeserializeOwned,
    R: Serialize,
    E: Fault,
    H: FnOnce(P, Option<B>) -> Fut,
    Fut: Future<Output = Result<R, E>>,
{
    // Negotiate the response encoding up front: a request nothing can
    // answer must not run the handler and must never see a 2xx.
    let negotiated = if route.response().is_some() {
        match context.codecs().resolve_serializer(parts.accept()) {
            Ok(found) => Some(found),
            Err(e) => return failure_response(&ApiError::from(e)),
        }
    } else {
        None
    };

    let binder = Binder::new(context.codecs());

    let params: P = {
        let bound = match route.params() {
            Some(spec) => binder.bind_prepared(parts, &spec.schema, &spec.descriptors),
            None => binder.bind(parts),
        };
        match bound {
            Ok(params) => params,
            Err(e) => return failure_response(&ApiError::from(e)),
        }
    };

    let body: Option<B> = match route.request_body() {
        Some(spec) => match binder.bind_body_prepared(parts, &spec.schema) {
            Ok(body) => Some(body),
            Err(e) => return failure_response(&ApiError::from(e)),
        },
        None => None,
    };

    match handler(params, body).await {
        Ok(value) => match negotiated {
            Some((media, serializer)) => {
                let document = match to_document(&value) {
                    Ok(document) => elide(document, &SerializationSettings::new()),
                    Err(e) => {
                        error!(
                            operation_id = route.operation_id(),
                            error = %e,
                            "response serialization failed"
                        );
                        return ResponseParts::empty(StatusCode::INTERNAL_SERVER_ERROR);
                    }
                };
                match serializer.serialize(&document) {
                    Ok(bytes) => {
                        ResponseParts::with_body(route.success_status(), media.as_ref(), bytes)
                    }
                    Err(e) => {
                        error!(
                            operation_id = route.operation_id(),
                            error = %e,
                            "response encoding failed"
                        );
                        ResponseParts::empty(StatusCode::INTERNAL_SERVER_ERROR)
                    }
                }
            }
            None => ResponseParts::empty(route.success_status()),
        },
        Err(fault) => {
            debug!(
                operation_id = route.operation_id(),
                kind = fault.kind(),
                "handler surfaced a fault"
            );
            render_fault(context, &fault)
        }
    }
}

/// Converts a handler fault into a response through the fault registry.
fn render_fault(context: &ApiContext, fault: &dyn Fault) -> ResponseParts {
    let Some(descriptor) = context.faults().resolve(fault) else {
        // Documented fallback: an unregistered fault is a generic server
        // failure with no structured payload.
        error!(
            kind = fault.kind(),
            fault = %fault,
            "no fault descriptor registered; returning generic failure"
        );
        return ResponseParts::empty(StatusCode::INTERNAL_SERVER_ERROR);
    };

    let rendered = context
        .faults()
        .render(fault, descriptor, &SerializationSettings::new());

    let (Some(content_type), false) = (&rendered.content_type, rendered.payload.is_null()) else {
        return ResponseParts::empty(rendered.status);
    };

    // Error payloads take the same encoding path as success payloads
    // whenever the registry has a codec for the descriptor's content type.
    if let Ok((media, serializer)) = context
        .codecs()
        .resolve_serializer(Some(content_type.as_ref()))
    {
        match serializer.serialize(&rendered.payload) {
            Ok(bytes) => return ResponseParts::with_body(rendered.status, media.as_ref(), bytes),
            Err(e) => {
                error!(kind = descriptor.kind(), error = %e, "fault payload encoding failed");
                return ResponseParts::empty(StatusCode::INTERNAL_SERVER_ERROR);
            }
        }
    }

    warn!(
        kind = descriptor.kind(),
        content_type = content_type.as_ref(),
        "no serializer registered for fault content type; encoding as JSON"
    );
    match serde_json::to_vec(&rendered.payload) {
        Ok(bytes) => {
            ResponseParts::with_body(rendered.status, content_type.as_ref(), Bytes::from(bytes))
        }
        Err(e) => {
            error!(kind = descriptor.kind(), error = %e, "fault payload encoding failed");
            ResponseParts::empty(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Renders a binding or negotiation failure as the structured envelope.
fn failure_response(err: &ApiError) -> ResponseParts {
    debug!(code = err.error_code(), error = %err, "request rejected before handler");
    let envelope = error_envelope(err.error_code(), &err.to_string());
    let body = serde_json::to_vec(&envelope).unwrap_or_default();
    ResponseParts::with_body(
        err.status_code(),
        mime::APPLICATION_JSON.as_ref(),
        Bytes::from(body),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ApiContextBuilder;
    use crate::route::RouteBuilder;
    use http::Uri;
    use hypatia_extract::parameter_object;
    use hypatia_faults::FaultDescriptor;
    use hypatia_schema::reflect_object;
    use serde::Deserialize;
    use serde_json::{json, Value};

    #[derive(Debug, Deserialize)]
    struct EchoParams {
        shout: Option<bool>,
    }

    parameter_object!(EchoParams {
        "shout": Option<bool> => query,
    });

    #[derive(Debug, Deserialize)]
    struct EchoBody {
        xyz: i64,
    }

    reflect_object!(EchoBody {
        "xyz": i64,
    });

    #[derive(Debug, Serialize)]
    struct EchoResponse {
        xyz: i64,
    }

    reflect_object!(EchoResponse {
        "xyz": i64,
    });

    #[derive(Debug, thiserror::Error)]
    #[error("echo chamber empty")]
    struct EchoEmpty;

    hypatia_faults::fault!(EchoEmpty, kind = "echo.empty");

    fn context() -> std::sync::Arc<ApiContext> {
        ApiContextBuilder::new()
            .fault(
                FaultDescriptor::builder("echo.empty")
                    .status(StatusCode::NOT_FOUND)
                    .example(json!({"message": "echo chamber empty"}))
                    .build()
                    .unwrap(),
            )
            .route(
                RouteBuilder::post("/echo")
                    .operation_id("echo")
                    .params::<EchoParams>()
                    .request_body::<EchoBody>()
                    .response::<EchoResponse>(StatusCode::OK)
                    .documented_fault("echo.empty"),
            )
            .route(RouteBuilder::delete("/echo").operation_id("clearEcho"))
            .build()
            .unwrap()
    }

    fn json_post(body: &'static str) -> RequestParts {
        RequestParts::builder()
            .method(http::Method::POST)
            .uri(Uri::from_static("/echo"))
            .header("content-type", "application/json")
            .header("accept", "application/json")
            .body(body)
            .build()
    }

    #[tokio::test]
    async fn test_full_round_trip() {
        let context = context();
        let route = context.route("echo").unwrap();
        let parts = json_post(r#"{"xyz": 123}"#);

        let response = dispatch(
            &context,
            route,
            &parts,
            |_params: EchoParams, body: Option<EchoBody>| async move {
                let body = body.expect("route declares a body");
                Ok::<_, EchoEmpty>(EchoResponse { xyz: body.xyz })
            },
        )
        .await;

        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.content_type(), Some("application/json"));
        let echoed: Value = serde_json::from_slice(&response.body).unwrap();
        assert_eq!(echoed, json!({"xyz": 123}));
    }

    #[tokio::test]
    async fn test_unacceptable_accept_is_406_not_200() {
        let context = context();
        let route = context.route("echo").unwrap();
        let parts = RequestParts::builder()
            .method(http::Method::POST)
            .uri(Uri::from_static("/echo"))
            .header("content-type", "application/json")
            .header("accept", "application/msgpack")
            .body(r#"{"xyz": 1}"#)
            .build();

        let response = dispatch(
            &context,
            route,
            &parts,
            |_params: EchoParams, body: Option<EchoBody>| async move {
                Ok::<_, EchoEmpty>(EchoResponse {
                    xyz: body.map_or(0, |b| b.xyz),
                })
            },
        )
        .await;

        assert_eq!(response.status, StatusCode::NOT_ACCEPTABLE);
        let envelope: Value = serde_json::from_slice(&response.body).unwrap();
        assert_eq!(envelope["error"]["code"], "NO_SERIALIZER_FOUND");
    }

    #[tokio::test]
    async fn test_binding_failure_names_parameter() {
        let context = context();
        let route = context.route("echo").unwrap();
        let parts = RequestParts::builder()
            .method(http::Method::POST)
            .uri(Uri::from_static("/echo?shout=loudly"))
            .header("content-type", "application/json")
            .header("accept", "application/json")
            .body(r#"{"xyz": 1}"#)
            .build();

        let response = dispatch(
            &context,
            route,
            &parts,
            |_params: EchoParams, _body: Option<EchoBody>| async move {
                Ok::<_, EchoEmpty>(EchoResponse { xyz: 0 })
            },
        )
        .await;

        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        let envelope: Value = serde_json::from_slice(&response.body).unwrap();
        assert_eq!(envelope["error"]["code"], "INVALID_PARAMETER");
        assert!(envelope["error"]["message"]
            .as_str()
            .unwrap()
            .contains("shout"));
    }

    #[tokio::test]
    async fn test_registered_fault_renders_descriptor() {
        let context = context();
        let route = context.route("echo").unwrap();
        let parts = json_post(r#"{"xyz": 1}"#);

        let response = dispatch(
            &context,
            route,
            &parts,
            |_params: EchoParams, _body: Option<EchoBody>| async move {
                Err::<EchoResponse, _>(EchoEmpty)
            },
        )
        .await;

        assert_eq!(response.status, StatusCode::NOT_FOUND);
        let payload: Value = serde_json::from_slice(&response.body).unwrap();
        assert_eq!(payload, json!({"message": "echo chamber empty"}));
    }

    #[tokio::test]
    async fn test_unregistered_fault_is_generic_500() {
        #[derive(Debug, thiserror::Error)]
        #[error("surprise")]
        struct Surprise;

        hypatia_faults::fault!(Surprise, kind = "surprise");

        let context = context();
        let route = context.route("echo").unwrap();
        let parts = json_post(r#"{"xyz": 1}"#);

        let response = dispatch(
            &context,
            route,
            &parts,
            |_params: EchoParams, _body: Option<EchoBody>| async move {
                Err::<EchoResponse, _>(Surprise)
            },
        )
        .await;

        assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(response.body.is_empty());
        assert_eq!(response.content_type(), None);
    }

    #[tokio::test]
    async fn test_payloadless_route_is_no_content() {
        let context = context();
        let route = context.route("clearEcho").unwrap();
        let parts = RequestParts::builder()
            .method(http::Method::DELETE)
            .uri(Uri::from_static("/echo"))
            .build();

        let response = dispatch(
            &context,
            route,
            &parts,
            |_params: (), _body: Option<()>| async move { Ok::<_, EchoEmpty>(()) },
        )
        .await;

        assert_eq!(response.status, StatusCode::NO_CONTENT);
        assert!(response.body.is_empty());
    }
}
