//! Attribute projection tests.

use crate::common::{self, DEVICE_SCHEMA, ENTERPRISE_USER_SCHEMA, USER_SCHEMA, assert_code, decode};
use scim_core::projection::AttributeProjection;
use scim_core::validation::{StandardValidator, Validator};
use serde_json::json;

fn user_uri(name: &str) -> String {
    format!("{}:{}", USER_SCHEMA, name)
}

fn device_uri(name: &str) -> String {
    format!("{}:{}", DEVICE_SCHEMA, name)
}

#[test]
fn test_include_names_only_requested_attributes() {
    let allowed = AttributeProjection::resolve(&common::users(), Some("emails"), None).unwrap();

    assert!(allowed.contains_key(&user_uri("emails")));
    assert!(allowed.contains_key(&user_uri("emails.value")));
    assert!(!allowed.contains_key(&user_uri("displayName")));
    assert!(!allowed.contains_key(&user_uri("userName")));
    assert!(!allowed.contains_key(ENTERPRISE_USER_SCHEMA));
}

#[test]
fn test_exclude_keeps_default_and_drops_request() {
    let schema = common::devices();
    let allowed = AttributeProjection::resolve(&schema, None, Some("displayName")).unwrap();

    assert!(!allowed.contains_key(&device_uri("displayName")));
    assert!(allowed.contains_key(&device_uri("serialNumber")));
    assert!(allowed.contains_key(&device_uri("network.hostname")));
    assert!(!allowed.contains_key(&device_uri("firmware")));
    assert!(!allowed.contains_key(&device_uri("network.diagnostics")));
    assert!(!allowed.contains_key(&device_uri("secret")));
}

#[test]
fn test_request_returned_only_when_named() {
    let schema = common::devices();

    let unrestricted = AttributeProjection::resolve(&schema, None, None).unwrap();
    assert!(!unrestricted.contains_key(&device_uri("firmware")));
    assert!(unrestricted.contains_key(&device_uri("displayName")));

    let named = AttributeProjection::resolve(&schema, Some("firmware,network.diagnostics"), None)
        .unwrap();
    assert!(named.contains_key(&device_uri("firmware")));
    assert!(named.contains_key(&device_uri("network")));
    assert!(named.contains_key(&device_uri("network.diagnostics")));
    assert!(!named.contains_key(&device_uri("network.hostname")));
    assert!(named.contains_key(&device_uri("serialNumber")));
    assert!(!named.contains_key(&device_uri("displayName")));
}

#[test]
fn test_map_values_carry_multi_valued_flag() {
    let allowed = AttributeProjection::resolve(&common::devices(), None, None).unwrap();
    assert_eq!(allowed.get(&device_uri("tags")), Some(&true));
    assert_eq!(allowed.get(&device_uri("network")), Some(&false));
}

#[test]
fn test_qualified_and_case_insensitive_names() {
    let schema = common::users();
    let include = format!("{}:NAME.givenname, {}:department", USER_SCHEMA, ENTERPRISE_USER_SCHEMA);
    let allowed = AttributeProjection::resolve(&schema, Some(&include), None).unwrap();

    assert!(allowed.contains_key(&user_uri("name.givenName")));
    assert!(!allowed.contains_key(&user_uri("name.familyName")));
    assert!(allowed.contains_key(&format!("{}:department", ENTERPRISE_USER_SCHEMA)));
    assert!(!allowed.contains_key(&format!("{}:manager", ENTERPRISE_USER_SCHEMA)));
}

#[test]
fn test_include_with_exclude_is_rejected() {
    assert_code(
        AttributeProjection::resolve(&common::users(), Some("userName"), Some("emails")),
        "invalidValue",
    );
}

#[test]
fn test_canonical_schema_is_not_pruned() {
    let schema = common::users();
    let projection = AttributeProjection::project(&schema, Some("userName"), None).unwrap();

    assert!(projection.schema().attribute("emails").is_none());
    assert!(schema.attribute("emails").is_some());
}

#[test]
fn test_apply_prepares_response_body() {
    let schema = common::users();
    let stored = common::sample_user();
    let retrieved = StandardValidator::new()
        .validate_retrieved(stored.deep_copy(), &schema)
        .unwrap();

    let projection = AttributeProjection::project(&schema, None, Some("emails,phoneNumbers,meta"))
        .unwrap();
    let body = projection.apply(&retrieved).to_json();

    assert!(body.get("emails").is_none());
    assert!(body.get("meta").is_none());
    assert_eq!(body["userName"], json!("bjensen@example.com"));
    assert_eq!(body[ENTERPRISE_USER_SCHEMA]["department"], json!("Tour Operations"));
    assert!(stored.contains("emails"));
}

#[test]
fn test_apply_never_returns_write_only_values() {
    let schema = common::devices();
    let device = decode(
        &schema,
        &json!({
            "schemas": [DEVICE_SCHEMA],
            "serialNumber": "SN-1",
            "secret": "hunter2",
            "firmware": "1.4.2",
            "network": {"diagnostics": "ok"}
        }),
    );

    let body = AttributeProjection::project(&schema, None, None)
        .unwrap()
        .apply(&device)
        .to_json();

    assert_eq!(body, json!({"schemas": [DEVICE_SCHEMA], "serialNumber": "SN-1"}));
}
