//! Common fixtures for the integration suites.

use scim_core::codec::JsonCodec;
use scim_core::patch::{PatchEngine, PatchOperation};
use scim_core::resource::{Resource, User};
use scim_core::schema::{ResourceTypeSchema, SchemaRegistry};
use scim_core::validation::StandardValidator;
use scim_core::{ScimError, ScimResult};
use serde_json::{Value, json};

pub const USER_SCHEMA: &str = "urn:ietf:params:scim:schemas:core:2.0:User";
pub const ENTERPRISE_USER_SCHEMA: &str =
    "urn:ietf:params:scim:schemas:extension:enterprise:2.0:User";
pub const DEVICE_SCHEMA: &str = "urn:example:params:scim:schemas:core:2.0:Device";

/// Route library logs to the test harness.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Catalog with the embedded schemas.
pub fn registry() -> SchemaRegistry {
    SchemaRegistry::new().expect("embedded schemas load")
}

pub fn users() -> ResourceTypeSchema {
    registry()
        .resource_type_schema("User")
        .expect("User resource type")
        .clone()
}

pub fn groups() -> ResourceTypeSchema {
    registry()
        .resource_type_schema("Group")
        .expect("Group resource type")
        .clone()
}

/// A resource type with `request`- and `always`-returned attributes.
pub fn devices() -> ResourceTypeSchema {
    let schema = json!({
        "id": DEVICE_SCHEMA,
        "name": "Device",
        "attributes": [
            {"name": "serialNumber", "type": "string", "required": true, "returned": "always"},
            {"name": "displayName", "type": "string"},
            {"name": "firmware", "type": "string", "returned": "request"},
            {"name": "secret", "type": "string", "mutability": "writeOnly", "returned": "never"},
            {
                "name": "network",
                "type": "complex",
                "subAttributes": [
                    {"name": "hostname", "type": "string"},
                    {"name": "macAddress", "type": "string", "mutability": "immutable"},
                    {"name": "diagnostics", "type": "string", "returned": "request"}
                ]
            },
            {"name": "tags", "type": "string", "multiValued": true}
        ]
    });
    let resource_types = json!([{
        "name": "Device",
        "endpoint": "/Devices",
        "schema": DEVICE_SCHEMA
    }]);
    SchemaRegistry::builder()
        .add_schema_json(&schema.to_string())
        .and_then(|builder| builder.add_resource_types_json(&resource_types.to_string()))
        .and_then(|builder| builder.build())
        .expect("device schema loads")
        .resource_type_schema("Device")
        .expect("Device resource type")
        .clone()
}

/// RFC 7643 section 8.2 style user with the enterprise extension.
pub fn sample_user_json() -> Value {
    json!({
        "schemas": [USER_SCHEMA, ENTERPRISE_USER_SCHEMA],
        "id": "2819c223-7f76-453a-919d-413861904646",
        "externalId": "701984",
        "userName": "bjensen@example.com",
        "name": {
            "formatted": "Ms. Barbara J Jensen, III",
            "familyName": "Jensen",
            "givenName": "Barbara"
        },
        "displayName": "Babs Jensen",
        "active": true,
        "emails": [
            {"value": "bjensen@example.com", "type": "work", "primary": true},
            {"value": "babs@jensen.org", "type": "home"}
        ],
        "phoneNumbers": [
            {"value": "555-555-5555", "type": "work"}
        ],
        "meta": {
            "resourceType": "User",
            "created": "2010-01-23T04:56:22Z",
            "lastModified": "2011-05-13T04:42:34Z",
            "version": "W/\"3694e05e9dff591\""
        },
        ENTERPRISE_USER_SCHEMA: {
            "employeeNumber": "701984",
            "department": "Tour Operations",
            "manager": {"value": "26118915-6090-4610-87e4-49d8ca9f808d", "displayName": "John Smith"}
        }
    })
}

pub fn decode(schema: &ResourceTypeSchema, body: &Value) -> Resource {
    JsonCodec::new()
        .decode_value(body, schema)
        .expect("fixture decodes")
}

pub fn sample_user() -> User {
    User::from(decode(&users(), &sample_user_json()))
}

/// Apply `operations` to `resource` with the standard validator.
pub fn patch(
    schema: &ResourceTypeSchema,
    resource: &Resource,
    operations: &[PatchOperation],
) -> ScimResult<Resource> {
    PatchEngine::new(schema, StandardValidator::new()).apply_all(resource, operations)
}

/// Assert that `result` failed with the given `scimType` code.
pub fn assert_code<T: std::fmt::Debug>(result: Result<T, ScimError>, code: &str) {
    match result {
        Ok(value) => panic!("expected '{}' error, got {:?}", code, value),
        Err(error) => assert_eq!(error.code(), code, "unexpected error: {}", error),
    }
}
