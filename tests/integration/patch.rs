//! PATCH Operation Integration Tests
//!
//! Exercises add, remove and replace through the public engine, covering
//! filtered paths, auto-creation, mutability and multi-operation requests.

use crate::common::{self, ENTERPRISE_USER_SCHEMA, assert_code, decode, patch};
use scim_core::codec::{Decoder, JsonCodec};
use scim_core::patch::{PatchEngine, PatchOperation};
use scim_core::resource::{Group, Role, User};
use scim_core::validation::StandardValidator;
use scim_core::{AttributeValue, ScimCoreConfig};
use serde_json::json;

#[test]
fn test_replace_creates_missing_complex_parent() {
    common::init_logging();
    let schema = common::users();
    let user = decode(
        &schema,
        &json!({"schemas": [common::USER_SCHEMA], "userName": "alice"}),
    );

    let patched = patch(
        &schema,
        &user,
        &[PatchOperation::replace(Some("name.givenName"), json!("Alice"))],
    )
    .unwrap();

    let name = patched.attribute("name").and_then(AttributeValue::as_complex).unwrap();
    assert_eq!(name.len(), 1);
    assert_eq!(name.string_value("givenName"), Some("Alice"));
}

#[test]
fn test_remove_with_filter_leaves_other_entries() {
    let schema = common::users();
    let user = common::sample_user();

    let patched = patch(
        &schema,
        &user,
        &[PatchOperation::remove(r#"emails[type eq "work"]"#)],
    )
    .unwrap();

    let emails = User::from(patched);
    let emails = emails.emails().unwrap();
    assert_eq!(emails.len(), 1);
    assert_eq!(emails.entries()[0].string_value("type"), Some("home"));
}

#[test]
fn test_removing_last_value_drops_the_attribute() {
    let schema = common::users();
    let user = common::sample_user();

    let patched = patch(
        &schema,
        &user,
        &[PatchOperation::remove(r#"phoneNumbers[type eq "work"]"#)],
    )
    .unwrap();

    assert!(!patched.contains("phoneNumbers"));
    assert!(patched.to_json().get("phoneNumbers").is_none());
}

#[test]
fn test_added_collection_removed_by_matching_filter() {
    let schema = common::users();
    let user = common::sample_user();

    let patched = patch(
        &schema,
        &user,
        &[
            PatchOperation::add(
                Some("ims"),
                json!([
                    {"value": "bjensen", "type": "aim"},
                    {"value": "babs", "type": "aim"}
                ]),
            ),
            PatchOperation::remove(r#"ims[type eq "aim"]"#),
        ],
    )
    .unwrap();

    assert!(!patched.contains("ims"));
}

#[test]
fn test_remove_required_attribute_fails_and_keeps_resource() {
    let schema = common::users();
    let user = common::sample_user();
    let before = user.to_json();

    let result = patch(&schema, &user, &[PatchOperation::remove("userName")]);

    assert_code(result, "mutability");
    assert_eq!(user.to_json(), before);
}

#[test]
fn test_replace_twice_is_idempotent() {
    let schema = common::users();
    let user = common::sample_user();
    let operation = PatchOperation::replace(Some("displayName"), json!("Barbara"));

    let once = patch(&schema, &user, std::slice::from_ref(&operation)).unwrap();
    let twice = patch(&schema, &user, &[operation.clone(), operation]).unwrap();

    assert_eq!(once, twice);
}

#[test]
fn test_add_without_path_inserts_once() {
    let schema = common::users();
    let user = common::sample_user();
    let operation = PatchOperation::add(None, json!({"nickName": "Al"}));

    let added = patch(&schema, &user, std::slice::from_ref(&operation)).unwrap();
    assert_eq!(added.string_value("nickName"), Some("Al"));

    let again = patch(&schema, &added, &[operation]).unwrap();
    assert_eq!(again, added);
}

#[test]
fn test_add_without_path_appends_and_merges() {
    let schema = common::users();
    let user = common::sample_user();

    let patched = patch(
        &schema,
        &user,
        &[PatchOperation::add(
            None,
            json!({
                "emails": [
                    {"value": "bjensen@example.com", "type": "work", "primary": true},
                    {"value": "barbara@example.org", "type": "other"}
                ],
                "name": {"middleName": "Jane"}
            }),
        )],
    )
    .unwrap();

    let user = User::from(patched);
    assert_eq!(user.emails().unwrap().len(), 3);
    let name = user.name().unwrap();
    assert_eq!(name.string_value("middleName"), Some("Jane"));
    assert_eq!(name.string_value("givenName"), Some("Barbara"));
}

#[test]
fn test_duplicate_entries_kept_when_configured() {
    let schema = common::users();
    let user = common::sample_user();
    let config = ScimCoreConfig::default().with_skip_duplicate_values(false);
    let engine = PatchEngine::with_config(&schema, StandardValidator::new(), config);

    let patched = engine
        .apply_all(
            &user,
            &[PatchOperation::add(
                None,
                json!({"phoneNumbers": [{"value": "555-555-5555", "type": "work"}]}),
            )],
        )
        .unwrap();

    assert_eq!(User::from(patched).phone_numbers().unwrap().len(), 2);
}

#[test]
fn test_replace_without_path_overwrites_collections() {
    let schema = common::users();
    let user = common::sample_user();

    let patched = patch(
        &schema,
        &user,
        &[PatchOperation::replace(
            None,
            json!({"emails": [{"value": "new@example.com", "type": "work"}], "name": {"givenName": "Barb"}}),
        )],
    )
    .unwrap();

    let user = User::from(patched);
    assert_eq!(user.emails().unwrap().len(), 1);
    assert_eq!(user.name().unwrap().string_value("givenName"), Some("Barb"));
    assert_eq!(user.name().unwrap().string_value("familyName"), Some("Jensen"));
}

#[test]
fn test_new_primary_demotes_existing_primary() {
    let schema = common::users();
    let user = common::sample_user();

    let patched = patch(
        &schema,
        &user,
        &[PatchOperation::add(
            None,
            json!({"emails": [{"value": "babs@example.net", "type": "other", "primary": true}]}),
        )],
    )
    .unwrap();

    let user = User::from(patched);
    assert_eq!(user.primary_email(), Some("babs@example.net"));
    let primaries = user
        .emails()
        .unwrap()
        .entries()
        .iter()
        .filter(|entry| entry.is_primary())
        .count();
    assert_eq!(primaries, 1);
}

#[test]
fn test_filter_on_primitive_values() {
    let schema = common::registry()
        .resource_type_schema("Role")
        .unwrap()
        .clone();
    let role = decode(
        &schema,
        &json!({
            "schemas": [Role::SCHEMA],
            "displayName": "Auditors",
            "permissions": ["read", "export", "audit"]
        }),
    );

    let patched = patch(
        &schema,
        &role,
        &[
            PatchOperation::remove(r#"permissions[value eq "export"]"#),
            PatchOperation::replace(Some(r#"permissions[value eq "audit"]"#), json!("review")),
        ],
    )
    .unwrap();

    assert_eq!(Role::from(patched).permissions(), vec!["read", "review"]);
}

#[test]
fn test_extension_paths() {
    let schema = common::users();
    let user = common::sample_user();
    let department = format!("{}:department", ENTERPRISE_USER_SCHEMA);

    let patched = patch(
        &schema,
        &user,
        &[PatchOperation::replace(Some(&department), json!("Marketing"))],
    )
    .unwrap();
    let enterprise = User::from(patched.clone());
    let enterprise = enterprise.enterprise().unwrap();
    assert_eq!(enterprise.string_value("department"), Some("Marketing"));
    assert_eq!(enterprise.string_value("employeeNumber"), Some("701984"));

    let removed = patch(
        &schema,
        &patched,
        &[PatchOperation::remove(ENTERPRISE_USER_SCHEMA)],
    )
    .unwrap();
    assert!(!removed.contains(ENTERPRISE_USER_SCHEMA));
    assert!(!removed.has_schema(ENTERPRISE_USER_SCHEMA));
}

#[test]
fn test_read_only_sub_attribute_is_protected() {
    let schema = common::users();
    let user = common::sample_user();
    let path = format!("{}:manager.displayName", ENTERPRISE_USER_SCHEMA);

    assert_code(
        patch(&schema, &user, &[PatchOperation::replace(Some(&path), json!("Jane Doe"))]),
        "mutability",
    );
    assert_code(patch(&schema, &user, &[PatchOperation::remove("groups")]), "mutability");
}

#[test]
fn test_immutable_value_set_once() {
    let schema = common::devices();
    let device = decode(
        &schema,
        &json!({"schemas": [common::DEVICE_SCHEMA], "serialNumber": "SN-1"}),
    );

    let set = patch(
        &schema,
        &device,
        &[PatchOperation::replace(Some("network.macAddress"), json!("00:1B:44:11:3A:B7"))],
    )
    .unwrap();

    assert_code(
        patch(
            &schema,
            &set,
            &[PatchOperation::replace(Some("network.macAddress"), json!("00:1B:44:11:3A:B8"))],
        ),
        "mutability",
    );
    assert_code(
        patch(
            &schema,
            &set,
            &[PatchOperation::replace(None, json!({"network": {"macAddress": "ff:ff:ff:ff:ff:ff"}}))],
        ),
        "mutability",
    );
    assert!(patch(
        &schema,
        &set,
        &[PatchOperation::replace(None, json!({"network": {"hostname": "printer-1"}}))],
    )
    .is_ok());
}

#[test]
fn test_error_codes() {
    let schema = common::users();
    let user = common::sample_user();

    assert_code(
        patch(&schema, &user, &[PatchOperation::replace(Some("shoeSize"), json!(42))]),
        "noTarget",
    );
    assert_code(
        patch(&schema, &user, &[PatchOperation::remove(r#"emails[type ne "work"]"#)]),
        "notImplemented",
    );
    assert_code(
        patch(
            &schema,
            &user,
            &[PatchOperation::remove(r#"emails[type eq "work" or type eq "home"]"#)],
        ),
        "notImplemented",
    );
    assert_code(
        patch(&schema, &user, &[PatchOperation::remove(r#"emails[type eq "other"]"#)]),
        "invalidPath",
    );
    assert_code(
        patch(&schema, &user, &[PatchOperation::remove("emails[type eq work]")]),
        "invalidFilter",
    );
    assert_code(
        patch(&schema, &user, &[PatchOperation::add(None, json!(["not", "an", "object"]))]),
        "invalidSyntax",
    );
    assert_code(
        patch(&schema, &user, &[PatchOperation::add(None, json!({"active": "sometimes"}))]),
        "invalidSyntax",
    );
}

#[test]
fn test_decoded_request_applies_in_order() {
    let schema = common::users();
    let user = common::sample_user();
    let codec = JsonCodec::new();
    let operations = codec
        .decode_operations(
            r#"{
                "schemas": ["urn:ietf:params:scim:api:messages:2.0:PatchOp"],
                "Operations": [
                    {"op": "Add", "path": "nickName", "value": "Babs"},
                    {"op": "Replace", "path": "nickName", "value": "Barb"},
                    {"op": "Remove", "path": "externalId"}
                ]
            }"#,
        )
        .unwrap();

    let patched = patch(&schema, &user, &operations).unwrap();

    assert_eq!(patched.string_value("nickName"), Some("Barb"));
    assert!(patched.external_id().is_none());
    assert_eq!(patched.id(), user.id());
}

#[test]
fn test_immutable_member_values_cannot_be_rewritten() {
    let schema = common::groups();
    let group = decode(
        &schema,
        &json!({
            "schemas": [Group::SCHEMA],
            "displayName": "Tour Guides",
            "members": [
                {"value": "2819c223", "type": "User"},
                {"value": "902c246b", "type": "User"}
            ]
        }),
    );

    for operation in [
        PatchOperation::replace(Some(r#"members[value eq "2819c223"].value"#), json!("ffffffff")),
        PatchOperation::replace(Some("members.value"), json!("ffffffff")),
        PatchOperation::replace(Some(r#"members[value eq "2819c223"]"#), json!({"value": "ffffffff"})),
        PatchOperation::replace(Some(r#"members[value eq "902c246b"].type"#), json!("Group")),
    ] {
        assert_code(patch(&schema, &group, &[operation]), "mutability");
    }

    let renamed = patch(
        &schema,
        &group,
        &[PatchOperation::replace(
            Some(r#"members[value eq "2819c223"]"#),
            json!({"value": "2819c223", "display": "Babs Jensen"}),
        )],
    )
    .unwrap();
    let renamed = Group::from(renamed);
    assert_eq!(renamed.member_ids(), vec!["2819c223", "902c246b"]);
    assert_eq!(
        renamed.members().unwrap().entries()[0].string_value("display"),
        Some("Babs Jensen")
    );

    let extended = patch(
        &schema,
        &group,
        &[PatchOperation::add(Some("members"), json!([{"value": "7c4dbd1c", "type": "User"}]))],
    )
    .unwrap();
    assert_eq!(Group::from(extended).member_ids(), vec!["7c4dbd1c"]);
}
