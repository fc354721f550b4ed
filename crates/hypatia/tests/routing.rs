//! End-to-end routing behavior: binding across every source, case rules,
//! body round trips and fault rendering through the full dispatch pipeline.

use http::{Method, StatusCode, Uri};
use hypatia::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

#[derive(Debug, Deserialize, PartialEq)]
struct TestParams {
    test_path: u64,
    test_query: u64,
    test_header: u64,
}

parameter_object!(TestParams {
    "test_path": u64 => path("testPath"),
    "test_query": u64 => query("Test-Query"),
    "test_header": u64 => header("Test-Header"),
});

#[derive(Debug, Deserialize, PartialEq)]
struct TestBodyParams {
    xyz: i64,
}

reflect_object!(TestBodyParams {
    "xyz": i64,
});

#[derive(Debug, Serialize, PartialEq)]
struct TestResponse {
    msg: String,
}

reflect_object!(TestResponse {
    "msg": String,
});

#[derive(Debug, thiserror::Error)]
#[error("test route failed")]
struct TestFault;

hypatia::faults::fault!(TestFault, kind = "test.failed");

fn test_context() -> Arc<hypatia::core::ApiContext> {
    ApiContextBuilder::new()
        .fault(
            FaultDescriptor::builder("test.failed")
                .status(StatusCode::CONFLICT)
                .example(json!({"message": "test route failed"}))
                .build()
                .unwrap(),
        )
        .route(
            RouteBuilder::get("/test/{testPath}")
                .operation_id("getTest")
                .params::<TestParams>()
                .response::<TestResponse>(StatusCode::OK)
                .documented_fault("test.failed"),
        )
        .route(
            RouteBuilder::post("/test")
                .operation_id("postTest")
                .request_body::<TestBodyParams>()
                .response::<TestResponse>(StatusCode::OK),
        )
        .build()
        .unwrap()
}

fn get_request(uri: &'static str) -> RequestParts {
    RequestParts::builder()
        .method(Method::GET)
        .uri(Uri::from_static(uri))
        .header("accept", "application/json")
        .path_slot("testPath", "789")
        .header("Test-Header", "123")
        .build()
}

async fn run_get(context: &hypatia::core::ApiContext, parts: &RequestParts) -> ResponseParts {
    let route = context.route("getTest").unwrap();
    dispatch(
        context,
        route,
        parts,
        |params: TestParams, _body: Option<()>| async move {
            Ok::<_, TestFault>(TestResponse {
                msg: format!(
                    "{}/{}/{}",
                    params.test_path, params.test_query, params.test_header
                ),
            })
        },
    )
    .await
}

#[tokio::test]
async fn binds_all_sources_like_direct_construction() {
    let context = test_context();
    let parts = get_request("/test/789?Test-Query=456");

    let response = run_get(&context, &parts).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.content_type(), Some("application/json"));
    let body: Value = serde_json::from_slice(&response.body).unwrap();
    assert_eq!(body, json!({"msg": "789/456/123"}));
}

#[tokio::test]
async fn header_lookup_is_case_insensitive() {
    let context = test_context();
    let route = context.route("getTest").unwrap();

    for header_name in ["test-header", "TEST-HEADER", "Test-Header"] {
        let parts = RequestParts::builder()
            .method(Method::GET)
            .uri(Uri::from_static("/test/789?Test-Query=456"))
            .header("accept", "application/json")
            .header(header_name, "123")
            .path_slot("testPath", "789")
            .build();

        let response = dispatch(
            &context,
            route,
            &parts,
            |params: TestParams, _body: Option<()>| async move {
                Ok::<_, TestFault>(TestResponse {
                    msg: params.test_header.to_string(),
                })
            },
        )
        .await;

        assert_eq!(response.status, StatusCode::OK, "sent as '{header_name}'");
        let body: Value = serde_json::from_slice(&response.body).unwrap();
        assert_eq!(body, json!({"msg": "123"}));
    }
}

#[tokio::test]
async fn query_lookup_is_case_sensitive() {
    let context = test_context();
    // Declared key is 'Test-Query'; sending 'test-query' must not match.
    let parts = get_request("/test/789?test-query=456");

    let response = run_get(&context, &parts).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_slice(&response.body).unwrap();
    assert_eq!(body["error"]["code"], "MISSING_PARAMETER");
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("Test-Query"));
}

#[tokio::test]
async fn post_body_binds_and_round_trips() {
    let context = test_context();
    let route = context.route("postTest").unwrap();
    let parts = RequestParts::builder()
        .method(Method::POST)
        .uri(Uri::from_static("/test"))
        .header("content-type", "application/json")
        .header("accept", "application/json")
        .body(r#"{"xyz": 123}"#)
        .build();

    let response = dispatch(
        &context,
        route,
        &parts,
        |_params: (), body: Option<TestBodyParams>| async move {
            let body = body.expect("declared body");
            assert_eq!(body, TestBodyParams { xyz: 123 });
            Ok::<_, TestFault>(TestResponse {
                msg: body.xyz.to_string(),
            })
        },
    )
    .await;

    assert_eq!(response.status, StatusCode::OK);
    let body: Value = serde_json::from_slice(&response.body).unwrap();
    assert_eq!(body, json!({"msg": "123"}));
}

#[tokio::test]
async fn unsupported_accept_type_never_returns_success() {
    let context = test_context();
    let parts = RequestParts::builder()
        .method(Method::GET)
        .uri(Uri::from_static("/test/789?Test-Query=456"))
        .header("accept", "application/xml")
        .header("Test-Header", "123")
        .path_slot("testPath", "789")
        .build();

    let response = run_get(&context, &parts).await;

    assert_eq!(response.status, StatusCode::NOT_ACCEPTABLE);
    let body: Value = serde_json::from_slice(&response.body).unwrap();
    assert_eq!(body["error"]["code"], "NO_SERIALIZER_FOUND");
}

#[tokio::test]
async fn handler_fault_renders_registered_descriptor() {
    let context = test_context();
    let route = context.route("getTest").unwrap();
    let parts = get_request("/test/789?Test-Query=456");

    let response = dispatch(
        &context,
        route,
        &parts,
        |_params: TestParams, _body: Option<()>| async move {
            Err::<TestResponse, _>(TestFault)
        },
    )
    .await;

    assert_eq!(response.status, StatusCode::CONFLICT);
    let body: Value = serde_json::from_slice(&response.body).unwrap();
    assert_eq!(body, json!({"message": "test route failed"}));
}

#[tokio::test]
async fn documentation_matches_runtime_declarations() {
    let context = test_context();
    let tree = DocAssembler::new().assemble(&context);
    let doc = tree.to_document(&SerializationSettings::new());

    let get_op = &doc["paths"]["/test/{testPath}"]["get"];
    assert_eq!(get_op["operationId"], json!("getTest"));

    let names: Vec<&str> = get_op["parameters"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["testPath", "Test-Query", "Test-Header"]);

    // The documented error response carries the registered example.
    assert_eq!(
        get_op["responses"]["409"]["content"]["application/json"]["example"],
        json!({"message": "test route failed"})
    );

    let post_op = &doc["paths"]["/test"]["post"];
    assert_eq!(
        post_op["requestBody"]["content"]["application/json"]["schema"]["required"],
        json!(["xyz"])
    );
}
