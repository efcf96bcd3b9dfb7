//! Resource tree invariants and resource kinds.

use crate::common::{self, decode};
use chrono::{TimeZone, Utc};
use scim_core::attribute::{AttributeValue, ComplexAttribute, SimpleValue};
use scim_core::resource::{Group, ListedResource, Resource, ResourceVersion, User};
use scim_core::validation::{StandardValidator, Validator};
use serde_json::json;

#[test]
fn test_deep_copy_shares_nothing() {
    let original = common::sample_user();
    let before = original.to_json();
    let mut copy = original.deep_copy();

    copy.remove_attribute("emails");
    if let Some(AttributeValue::Complex(name)) = copy.attribute_mut("name") {
        name.insert(AttributeValue::string("givenName", "Changed"));
    }
    copy.add_schema("urn:example:extra");

    assert_eq!(original.to_json(), before);
    assert_eq!(before, common::sample_user_json());
    assert!(original.contains("emails"));
    assert!(!original.has_schema("urn:example:extra"));
}

#[test]
fn test_set_attribute_keeps_existing_value() {
    let mut user = User::new();
    assert!(user.set_attribute(AttributeValue::string("userName", "bjensen")));
    assert!(!user.set_attribute(AttributeValue::string("USERNAME", "other")));
    assert_eq!(user.user_name(), Some("bjensen"));
}

#[test]
fn test_id_and_meta_are_write_once() {
    let mut user = User::new();
    user.set_id("2819c223").unwrap();
    assert_eq!(user.set_id("other").unwrap_err().code(), "attributeReadOnly");

    let created = Utc.with_ymd_and_hms(2024, 1, 23, 4, 56, 22).unwrap();
    user.set_created(created).unwrap();
    assert!(user.set_created(created).is_err());
    user.set_resource_type("User").unwrap();
    assert!(user.set_resource_type("Group").is_err());
    assert_eq!(user.resource_type(), Some("User"));
}

#[test]
fn test_meta_created_on_first_write() {
    let mut group = Group::new();
    assert!(group.meta().is_none());

    group.set_location("https://example.com/v2/Groups/e9e30dba");
    assert_eq!(group.location(), Some("https://example.com/v2/Groups/e9e30dba"));
    assert_eq!(group.meta().map(ComplexAttribute::len), Some(1));
}

#[test]
fn test_touch_versions_content() {
    let mut user = common::sample_user();
    let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();

    let first = user.touch(now);
    assert_eq!(user.version(), Some(first.to_etag().as_str()));
    assert_eq!(user.touch(now), first);

    user.replace_attribute(AttributeValue::string("nickName", "Babs"));
    let second = user.touch(now);
    assert_ne!(first, second);
    assert_eq!(second.to_etag().parse::<ResourceVersion>().unwrap(), second);
}

#[test]
fn test_user_accessors() {
    let user = common::sample_user();

    assert_eq!(user.display_name(), Some("Babs Jensen"));
    assert!(user.is_active());
    assert_eq!(user.primary_email(), Some("bjensen@example.com"));
    assert_eq!(user.manager_id(), Some("26118915-6090-4610-87e4-49d8ca9f808d"));
    assert_eq!(
        user.emails().and_then(|emails| emails.by_type("home")).and_then(|e| e.string_value("value")),
        Some("babs@jensen.org")
    );
}

#[test]
fn test_group_members() {
    let schema = common::groups();
    let group = Group::from(decode(
        &schema,
        &json!({
            "schemas": [Group::SCHEMA],
            "displayName": "Tour Guides",
            "members": [
                {"value": "2819c223-7f76-453a-919d-413861904646", "display": "Babs Jensen"},
                {"value": "902c246b-6245-4190-8e05-00816be7344a", "display": "Mandy Pepperidge"}
            ]
        }),
    ));

    assert_eq!(group.display_name(), Some("Tour Guides"));
    assert_eq!(
        group.member_ids(),
        vec![
            "2819c223-7f76-453a-919d-413861904646",
            "902c246b-6245-4190-8e05-00816be7344a"
        ]
    );
}

#[test]
fn test_list_response_wraps_resources() {
    let user = common::sample_user().into_inner();
    let list = ListedResource::page(1, 1, vec![user]);

    assert_eq!(list.total_results(), Some(1));
    assert_eq!(list.items_per_page(), Some(1));
    let body = list.to_json();
    assert_eq!(body["schemas"], json!([ListedResource::SCHEMA]));
    assert_eq!(body["Resources"][0]["userName"], json!("bjensen@example.com"));
}

#[test]
fn test_created_resource_loses_client_read_only_values() {
    let schema = common::users();
    let candidate = common::sample_user().into_inner();

    let created = StandardValidator::new()
        .validate_created(candidate, &schema)
        .unwrap();

    assert!(created.id().is_none());
    assert!(created.meta().is_none());
    assert!(!created.contains("groups"));
    assert_eq!(created.string_value("userName"), Some("bjensen@example.com"));
}

#[test]
fn test_multi_valued_values_never_mix() {
    let mut resource = Resource::new();
    resource.set_attribute(AttributeValue::MultiValued(
        scim_core::attribute::MultiValuedAttribute::from_primitives(
            "tags",
            vec![SimpleValue::String("a".into())],
        ),
    ));
    let Some(AttributeValue::MultiValued(tags)) = resource.attribute_mut("tags") else {
        panic!("tags is multi-valued");
    };
    assert!(tags.push_entry(ComplexAttribute::new("tags")).is_err());
    assert!(tags.push_primitive(SimpleValue::String("b".into())).is_ok());
    assert_eq!(tags.len(), 2);
}
