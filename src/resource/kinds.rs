//! Concrete resource kinds.
//!
//! Each kind is a thin newtype over [`Resource`] that dereferences to it and adds
//! accessors for its well-known attributes. The kinds impose no invariants of
//! their own.

use super::core::Resource;
use crate::attribute::{AttributeValue, ComplexAttribute, MultiValuedAttribute, SimpleValue};
use crate::schema::embedded::{
    ENTERPRISE_USER_SCHEMA, GROUP_SCHEMA, LIST_RESPONSE_SCHEMA, RESOURCE_TYPE_SCHEMA,
    ROLE_SCHEMA, SCHEMA_SCHEMA, SERVICE_PROVIDER_CONFIG_SCHEMA, USER_SCHEMA,
};

use std::ops::{Deref, DerefMut};

macro_rules! resource_kind {
    ($(#[$doc:meta])* $name:ident, $schema:expr) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq)]
        pub struct $name(Resource);

        impl $name {
            /// URI of the core schema of this kind.
            pub const SCHEMA: &'static str = $schema;

            /// Empty resource referencing the core schema.
            pub fn new() -> Self {
                Self(Resource::with_schema($schema))
            }

            pub fn into_inner(self) -> Resource {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<Resource> for $name {
            fn from(resource: Resource) -> Self {
                Self(resource)
            }
        }

        impl From<$name> for Resource {
            fn from(kind: $name) -> Self {
                kind.0
            }
        }

        impl Deref for $name {
            type Target = Resource;

            fn deref(&self) -> &Resource {
                &self.0
            }
        }

        impl DerefMut for $name {
            fn deref_mut(&mut self) -> &mut Resource {
                &mut self.0
            }
        }
    };
}

resource_kind!(
    /// A `User` resource.
    User,
    USER_SCHEMA
);
resource_kind!(
    /// A `Group` resource.
    Group,
    GROUP_SCHEMA
);
resource_kind!(
    /// A `Role` resource.
    Role,
    ROLE_SCHEMA
);
resource_kind!(
    /// A list response wrapping the resources of one page.
    ListedResource,
    LIST_RESPONSE_SCHEMA
);
resource_kind!(
    /// A schema published through the `/Schemas` endpoint.
    SchemaDefinition,
    SCHEMA_SCHEMA
);
resource_kind!(
    /// A resource type published through the `/ResourceTypes` endpoint.
    ResourceTypeDefinition,
    RESOURCE_TYPE_SCHEMA
);
resource_kind!(
    /// The service provider configuration.
    ServiceProviderConfig,
    SERVICE_PROVIDER_CONFIG_SCHEMA
);

fn multi_valued<'a>(resource: &'a Resource, name: &str) -> Option<&'a MultiValuedAttribute> {
    resource.attribute(name).and_then(AttributeValue::as_multi_valued)
}

fn entry_values(attribute: Option<&MultiValuedAttribute>) -> Vec<&str> {
    attribute
        .map(|multi| {
            multi
                .entries()
                .iter()
                .filter_map(|entry| entry.string_value("value"))
                .collect()
        })
        .unwrap_or_default()
}

/// A listed resource as one complex entry, its `schemas` included.
fn resource_entry(resource: Resource) -> ComplexAttribute {
    let (schemas, attributes) = resource.into_parts();
    let schemas = schemas.into_iter().map(SimpleValue::Reference).collect();
    let mut entry = ComplexAttribute::new("Resources").with(AttributeValue::MultiValued(
        MultiValuedAttribute::from_primitives("schemas", schemas),
    ));
    for (_, value) in attributes {
        entry.insert(value);
    }
    entry
}

fn integer(resource: &Resource, name: &str) -> Option<i64> {
    resource
        .attribute(name)
        .and_then(AttributeValue::as_simple)
        .and_then(|simple| simple.value().as_i64())
}

fn supported(resource: &Resource, feature: &str) -> bool {
    resource
        .attribute(feature)
        .and_then(AttributeValue::as_complex)
        .and_then(|complex| complex.bool_value("supported"))
        .unwrap_or(false)
}

impl User {
    pub fn user_name(&self) -> Option<&str> {
        self.string_value("userName")
    }

    pub fn display_name(&self) -> Option<&str> {
        self.string_value("displayName")
    }

    /// `active`, treated as true when absent.
    pub fn is_active(&self) -> bool {
        self.attribute("active")
            .and_then(AttributeValue::as_simple)
            .and_then(|simple| simple.value().as_bool())
            .unwrap_or(true)
    }

    pub fn name(&self) -> Option<&ComplexAttribute> {
        self.attribute("name").and_then(AttributeValue::as_complex)
    }

    pub fn emails(&self) -> Option<&MultiValuedAttribute> {
        multi_valued(self, "emails")
    }

    /// Value of the primary email, or of the first email when none is primary.
    pub fn primary_email(&self) -> Option<&str> {
        let emails = self.emails()?;
        emails
            .primary()
            .or_else(|| emails.entries().first())
            .and_then(|entry| entry.string_value("value"))
    }

    pub fn phone_numbers(&self) -> Option<&MultiValuedAttribute> {
        multi_valued(self, "phoneNumbers")
    }

    /// Ids of the groups the user belongs to.
    pub fn group_ids(&self) -> Vec<&str> {
        entry_values(multi_valued(self, "groups"))
    }

    /// The enterprise extension, keyed by its URI.
    pub fn enterprise(&self) -> Option<&ComplexAttribute> {
        self.attribute(ENTERPRISE_USER_SCHEMA)
            .and_then(AttributeValue::as_complex)
    }

    pub fn manager_id(&self) -> Option<&str> {
        self.enterprise()
            .and_then(|enterprise| enterprise.get("manager"))
            .and_then(AttributeValue::as_complex)
            .and_then(|manager| manager.string_value("value"))
    }
}

impl Group {
    pub fn display_name(&self) -> Option<&str> {
        self.string_value("displayName")
    }

    pub fn members(&self) -> Option<&MultiValuedAttribute> {
        multi_valued(self, "members")
    }

    pub fn member_ids(&self) -> Vec<&str> {
        entry_values(self.members())
    }
}

impl Role {
    pub fn display_name(&self) -> Option<&str> {
        self.string_value("displayName")
    }

    pub fn user_ids(&self) -> Vec<&str> {
        entry_values(multi_valued(self, "users"))
    }

    pub fn group_ids(&self) -> Vec<&str> {
        entry_values(multi_valued(self, "groups"))
    }

    pub fn permissions(&self) -> Vec<&str> {
        multi_valued(self, "permissions")
            .map(|multi| multi.primitives().iter().filter_map(SimpleValue::as_str).collect())
            .unwrap_or_default()
    }
}

impl ListedResource {
    /// List response for one page of results.
    pub fn page(total_results: i64, start_index: i64, resources: Vec<Resource>) -> Self {
        let mut list = Self::new();
        let items_per_page = resources.len() as i64;
        list.set_attribute(AttributeValue::simple(
            "totalResults",
            SimpleValue::Integer(total_results),
        ));
        list.set_attribute(AttributeValue::simple(
            "startIndex",
            SimpleValue::Integer(start_index),
        ));
        list.set_attribute(AttributeValue::simple(
            "itemsPerPage",
            SimpleValue::Integer(items_per_page),
        ));
        let entries = resources.into_iter().map(resource_entry).collect();
        list.set_attribute(AttributeValue::MultiValued(MultiValuedAttribute::from_entries(
            "Resources",
            entries,
        )));
        list
    }

    /// The listed resources, each one entry of `Resources`.
    pub fn resources(&self) -> &[ComplexAttribute] {
        multi_valued(self, "Resources")
            .map(MultiValuedAttribute::entries)
            .unwrap_or_default()
    }

    pub fn total_results(&self) -> Option<i64> {
        integer(self, "totalResults")
    }

    pub fn start_index(&self) -> Option<i64> {
        integer(self, "startIndex")
    }

    pub fn items_per_page(&self) -> Option<i64> {
        integer(self, "itemsPerPage")
    }
}

impl SchemaDefinition {
    pub fn schema_id(&self) -> Option<&str> {
        self.id()
    }

    pub fn schema_name(&self) -> Option<&str> {
        self.string_value("name")
    }
}

impl ResourceTypeDefinition {
    pub fn type_name(&self) -> Option<&str> {
        self.string_value("name")
    }

    pub fn endpoint(&self) -> Option<&str> {
        self.string_value("endpoint")
    }

    /// URI of the core schema the resource type uses.
    pub fn core_schema(&self) -> Option<&str> {
        self.string_value("schema")
    }
}

impl ServiceProviderConfig {
    pub fn patch_supported(&self) -> bool {
        supported(self, "patch")
    }

    pub fn filter_supported(&self) -> bool {
        supported(self, "filter")
    }

    pub fn bulk_supported(&self) -> bool {
        supported(self, "bulk")
    }

    pub fn etag_supported(&self) -> bool {
        supported(self, "etag")
    }

    pub fn sort_supported(&self) -> bool {
        supported(self, "sort")
    }

    pub fn change_password_supported(&self) -> bool {
        supported(self, "changePassword")
    }
}
