//! Request and response body tests.

use crate::common::{self, ENTERPRISE_USER_SCHEMA, USER_SCHEMA, assert_code};
use scim_core::codec::{Decoder, Encoder, JsonCodec};
use scim_core::patch::PatchOp;
use scim_core::{ScimCoreConfig, UnknownAttributePolicy};
use serde_json::{Value, json};

#[test]
fn test_round_trip_of_rfc_user() {
    let schema = common::users();
    let codec = JsonCodec::new();
    let body = common::sample_user_json().to_string();

    let user = codec.decode(&body, &schema).unwrap();
    let encoded: Value = serde_json::from_str(&codec.encode(&user).unwrap()).unwrap();

    assert_eq!(encoded, common::sample_user_json());
}

#[test]
fn test_decode_coerces_declared_types() {
    let schema = common::users();
    let user = JsonCodec::new()
        .decode_value(
            &json!({
                "schemas": [USER_SCHEMA],
                "userName": "bjensen",
                "meta": {"created": "2010-01-23T04:56:22+02:00"},
                "x509Certificates": [{"value": "TUlJRERqQ0NBZmFnQXdJQkFnSUpBT0E="}]
            }),
            &schema,
        )
        .unwrap();

    assert_eq!(
        user.created().map(|created| created.to_rfc3339()),
        Some("2010-01-23T02:56:22+00:00".to_string())
    );
    let certificate = user.to_json()["x509Certificates"][0]["value"].clone();
    assert_eq!(certificate, json!("TUlJRERqQ0NBZmFnQXdJQkFnSUpBT0E="));
}

#[test]
fn test_decode_rejects_bad_bodies() {
    let schema = common::users();
    let codec = JsonCodec::new();

    assert_code(codec.decode(r#"{"userName": "bjensen"}"#, &schema), "invalidSyntax");
    assert_code(codec.decode("[1, 2]", &schema), "invalidSyntax");
    assert_code(codec.decode("{not json", &schema), "invalidJson");
    assert_code(
        codec.decode(
            &json!({"schemas": [USER_SCHEMA], "userName": "b", "active": "yes"}).to_string(),
            &schema,
        ),
        "conversion",
    );
}

#[test]
fn test_unknown_attributes_follow_policy() {
    let schema = common::users();
    let body = json!({"schemas": [USER_SCHEMA], "userName": "bjensen", "shoeSize": 42}).to_string();

    assert_code(JsonCodec::new().decode(&body, &schema), "noTarget");

    let config = ScimCoreConfig::default().with_unknown_attributes(UnknownAttributePolicy::Preserve);
    let user = JsonCodec::from_config(&config).decode(&body, &schema).unwrap();
    assert!(user.contains("shoeSize"));
    assert!(!user.attribute("shoeSize").unwrap().characteristics().is_typed());
}

#[test]
fn test_qualified_extension_attribute_joins_container() {
    let schema = common::users();
    let body = json!({
        "schemas": [USER_SCHEMA],
        "userName": "bjensen",
        "urn:ietf:params:scim:schemas:extension:enterprise:2.0:User:department": "Sales"
    });

    let user = JsonCodec::new().decode_value(&body, &schema).unwrap();

    assert!(user.has_schema(ENTERPRISE_USER_SCHEMA));
    assert_eq!(user.to_json()[ENTERPRISE_USER_SCHEMA], json!({"department": "Sales"}));
}

#[test]
fn test_decode_patch_bodies() {
    let codec = JsonCodec::new();

    let operations = codec
        .decode_operations(
            r#"{
                "schemas": ["urn:ietf:params:scim:api:messages:2.0:PatchOp"],
                "Operations": [
                    {"op": "add", "path": "members", "value": [{"value": "2819c223"}]},
                    {"op": "REMOVE", "path": "members[value eq \"902c246b\"]"}
                ]
            }"#,
        )
        .unwrap();
    assert_eq!(operations.len(), 2);
    assert_eq!(operations[1].op, PatchOp::Remove);
    assert_eq!(operations[1].path(), Some(r#"members[value eq "902c246b"]"#));

    let bare = codec
        .decode_operations(r#"[{"op": "replace", "value": {"displayName": "Ops"}}]"#)
        .unwrap();
    assert_eq!(bare[0].path(), None);

    assert_code(
        codec.decode_operations(r#"{"schemas": ["urn:example"], "Operations": []}"#),
        "invalidSyntax",
    );
    assert_code(codec.decode_operations(r#"[{"op": "move", "path": "a"}]"#), "invalidSyntax");
}
