//! Model serializer properties: round-tripping and elision idempotence.

use hypatia::prelude::*;
use hypatia::schema::{elide, from_document, to_document};
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Subscription {
    id: u64,
    plan: String,
    seats: Vec<String>,
    note: Option<String>,
}

#[test]
fn serialize_then_reconstruct_reproduces_value() {
    let original = Subscription {
        id: 42,
        plan: "pro".into(),
        seats: vec!["ada".into(), "mary".into()],
        note: Some("annual".into()),
    };

    let document = to_document(&original).unwrap();
    let rebuilt: Subscription = from_document(document).unwrap();
    assert_eq!(rebuilt, original);
}

#[test]
fn elision_settings_are_independent_and_idempotent() {
    let document = json!({
        "id": 1,
        "note": null,
        "seats": [],
        "extras": {},
    });

    let all = SerializationSettings::new()
        .skip_empty_value(true)
        .skip_empty_sequence(true)
        .skip_empty_map(true);

    let once = elide(document.clone(), &all);
    assert_eq!(once, json!({"id": 1}));
    assert_eq!(elide(once.clone(), &all), once);

    let values_only = SerializationSettings::new().skip_empty_value(true);
    assert_eq!(
        elide(document, &values_only),
        json!({"id": 1, "seats": [], "extras": {}})
    );
}

#[test]
fn security_model_keeps_empty_entries_unless_policy_drops_them() {
    let mut security = SecurityModel::new();
    security.require("bearerAuth");
    security.require_scopes("oauth", ["read:subs"]);

    let keep = security.serialize(&SerializationSettings::new());
    assert_eq!(keep, json!({"bearerAuth": [], "oauth": ["read:subs"]}));

    let drop_empty = security.serialize(&SerializationSettings::new().skip_empty_sequence(true));
    assert_eq!(drop_empty, json!({"oauth": ["read:subs"]}));
}
