//! Common attributes shared by every resource type (RFC 7643 section 3.1).

use super::types::{AttributeDefinition, AttributeType, Mutability, Returned, Uniqueness};

pub const ID: &str = "id";
pub const EXTERNAL_ID: &str = "externalId";
pub const META: &str = "meta";
pub const META_RESOURCE_TYPE: &str = "resourceType";
pub const META_CREATED: &str = "created";
pub const META_LAST_MODIFIED: &str = "lastModified";
pub const META_LOCATION: &str = "location";
pub const META_VERSION: &str = "version";

/// Definition of `id`.
pub fn id_attribute() -> AttributeDefinition {
    AttributeDefinition {
        name: ID.to_string(),
        case_exact: true,
        mutability: Mutability::ReadOnly,
        returned: Returned::Always,
        uniqueness: Uniqueness::Server,
        ..Default::default()
    }
}

/// Definition of `externalId`.
pub fn external_id_attribute() -> AttributeDefinition {
    AttributeDefinition {
        name: EXTERNAL_ID.to_string(),
        case_exact: true,
        ..Default::default()
    }
}

fn meta_sub_attribute(name: &str, data_type: AttributeType) -> AttributeDefinition {
    AttributeDefinition {
        name: name.to_string(),
        data_type,
        case_exact: data_type != AttributeType::String,
        mutability: Mutability::ReadOnly,
        ..Default::default()
    }
}

/// Definition of `meta` and its read-only sub-attributes.
pub fn meta_attribute() -> AttributeDefinition {
    AttributeDefinition {
        name: META.to_string(),
        data_type: AttributeType::Complex,
        mutability: Mutability::ReadOnly,
        sub_attributes: vec![
            meta_sub_attribute(META_RESOURCE_TYPE, AttributeType::String),
            meta_sub_attribute(META_CREATED, AttributeType::DateTime),
            meta_sub_attribute(META_LAST_MODIFIED, AttributeType::DateTime),
            meta_sub_attribute(META_LOCATION, AttributeType::Reference),
            meta_sub_attribute(META_VERSION, AttributeType::String),
        ],
        ..Default::default()
    }
}

/// The three common attributes stamped with the owning core schema URI.
pub fn common_attributes(core_uri: &str) -> Vec<AttributeDefinition> {
    let mut attributes = vec![id_attribute(), external_id_attribute(), meta_attribute()];
    for attribute in &mut attributes {
        attribute.uri = core_uri.to_string();
        for sub in &mut attribute.sub_attributes {
            sub.uri = core_uri.to_string();
        }
    }
    attributes
}
