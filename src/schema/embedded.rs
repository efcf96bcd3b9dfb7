//! Embedded core SCIM schemas and resource types.
//!
//! The RFC 7643 User, Group and Enterprise User schemas plus the Role extension
//! schema, embedded as static strings. Characteristics left out of an attribute
//! take the RFC defaults (`readWrite`, `returned: default`, `uniqueness: none`).

/// URI of the core User schema.
pub const USER_SCHEMA: &str = "urn:ietf:params:scim:schemas:core:2.0:User";
/// URI of the core Group schema.
pub const GROUP_SCHEMA: &str = "urn:ietf:params:scim:schemas:core:2.0:Group";
/// URI of the Enterprise User extension schema.
pub const ENTERPRISE_USER_SCHEMA: &str =
    "urn:ietf:params:scim:schemas:extension:enterprise:2.0:User";
/// URI of the Role schema.
pub const ROLE_SCHEMA: &str = "urn:ietf:params:scim:schemas:extension:2.0:Role";
/// URI of list responses.
pub const LIST_RESPONSE_SCHEMA: &str = "urn:ietf:params:scim:api:messages:2.0:ListResponse";
/// URI of PATCH request bodies.
pub const PATCH_OP_SCHEMA: &str = "urn:ietf:params:scim:api:messages:2.0:PatchOp";
/// URI of the schema resource.
pub const SCHEMA_SCHEMA: &str = "urn:ietf:params:scim:schemas:core:2.0:Schema";
/// URI of the resource type resource.
pub const RESOURCE_TYPE_SCHEMA: &str = "urn:ietf:params:scim:schemas:core:2.0:ResourceType";
/// URI of the service provider configuration resource.
pub const SERVICE_PROVIDER_CONFIG_SCHEMA: &str =
    "urn:ietf:params:scim:schemas:core:2.0:ServiceProviderConfig";

/// Returns the core User schema as a JSON string.
pub fn core_user_schema() -> &'static str {
    r#"{
  "id": "urn:ietf:params:scim:schemas:core:2.0:User",
  "name": "User",
  "description": "User Account",
  "attributes": [
    {"name": "userName", "type": "string", "required": true, "uniqueness": "server"},
    {
      "name": "name",
      "type": "complex",
      "description": "The components of the user's real name.",
      "subAttributes": [
        {"name": "formatted", "type": "string"},
        {"name": "familyName", "type": "string"},
        {"name": "givenName", "type": "string"},
        {"name": "middleName", "type": "string"},
        {"name": "honorificPrefix", "type": "string"},
        {"name": "honorificSuffix", "type": "string"}
      ]
    },
    {"name": "displayName", "type": "string"},
    {"name": "nickName", "type": "string"},
    {"name": "profileUrl", "type": "reference", "referenceTypes": ["external"]},
    {"name": "title", "type": "string"},
    {"name": "userType", "type": "string"},
    {"name": "preferredLanguage", "type": "string"},
    {"name": "locale", "type": "string"},
    {"name": "timezone", "type": "string"},
    {"name": "active", "type": "boolean"},
    {
      "name": "password",
      "type": "string",
      "caseExact": true,
      "mutability": "writeOnly",
      "returned": "never"
    },
    {
      "name": "emails",
      "type": "complex",
      "multiValued": true,
      "subAttributes": [
        {"name": "value", "type": "string"},
        {"name": "display", "type": "string"},
        {"name": "type", "type": "string", "canonicalValues": ["work", "home", "other"]},
        {"name": "primary", "type": "boolean"}
      ]
    },
    {
      "name": "phoneNumbers",
      "type": "complex",
      "multiValued": true,
      "subAttributes": [
        {"name": "value", "type": "string"},
        {"name": "display", "type": "string"},
        {
          "name": "type",
          "type": "string",
          "canonicalValues": ["work", "home", "mobile", "fax", "pager", "other"]
        },
        {"name": "primary", "type": "boolean"}
      ]
    },
    {
      "name": "ims",
      "type": "complex",
      "multiValued": true,
      "subAttributes": [
        {"name": "value", "type": "string"},
        {"name": "display", "type": "string"},
        {"name": "type", "type": "string"},
        {"name": "primary", "type": "boolean"}
      ]
    },
    {
      "name": "photos",
      "type": "complex",
      "multiValued": true,
      "subAttributes": [
        {"name": "value", "type": "reference", "referenceTypes": ["external"]},
        {"name": "display", "type": "string"},
        {"name": "type", "type": "string", "canonicalValues": ["photo", "thumbnail"]},
        {"name": "primary", "type": "boolean"}
      ]
    },
    {
      "name": "addresses",
      "type": "complex",
      "multiValued": true,
      "subAttributes": [
        {"name": "formatted", "type": "string"},
        {"name": "streetAddress", "type": "string"},
        {"name": "locality", "type": "string"},
        {"name": "region", "type": "string"},
        {"name": "postalCode", "type": "string"},
        {"name": "country", "type": "string"},
        {"name": "type", "type": "string", "canonicalValues": ["work", "home", "other"]},
        {"name": "primary", "type": "boolean"}
      ]
    },
    {
      "name": "groups",
      "type": "complex",
      "multiValued": true,
      "mutability": "readOnly",
      "subAttributes": [
        {"name": "value", "type": "string", "mutability": "readOnly"},
        {
          "name": "$ref",
          "type": "reference",
          "referenceTypes": ["User", "Group"],
          "mutability": "readOnly"
        },
        {"name": "display", "type": "string", "mutability": "readOnly"},
        {
          "name": "type",
          "type": "string",
          "canonicalValues": ["direct", "indirect"],
          "mutability": "readOnly"
        }
      ]
    },
    {
      "name": "entitlements",
      "type": "complex",
      "multiValued": true,
      "subAttributes": [
        {"name": "value", "type": "string"},
        {"name": "display", "type": "string"},
        {"name": "type", "type": "string"},
        {"name": "primary", "type": "boolean"}
      ]
    },
    {
      "name": "roles",
      "type": "complex",
      "multiValued": true,
      "subAttributes": [
        {"name": "value", "type": "string"},
        {"name": "display", "type": "string"},
        {"name": "type", "type": "string"},
        {"name": "primary", "type": "boolean"}
      ]
    },
    {
      "name": "x509Certificates",
      "type": "complex",
      "multiValued": true,
      "subAttributes": [
        {"name": "value", "type": "binary"},
        {"name": "display", "type": "string"},
        {"name": "type", "type": "string"},
        {"name": "primary", "type": "boolean"}
      ]
    }
  ]
}"#
}

/// Returns the core Group schema as a JSON string.
pub fn core_group_schema() -> &'static str {
    r#"{
  "id": "urn:ietf:params:scim:schemas:core:2.0:Group",
  "name": "Group",
  "description": "Group",
  "attributes": [
    {"name": "displayName", "type": "string", "required": true},
    {
      "name": "members",
      "type": "complex",
      "multiValued": true,
      "subAttributes": [
        {"name": "value", "type": "string", "mutability": "immutable"},
        {
          "name": "$ref",
          "type": "reference",
          "referenceTypes": ["User", "Group"],
          "mutability": "immutable"
        },
        {"name": "display", "type": "string"},
        {
          "name": "type",
          "type": "string",
          "canonicalValues": ["User", "Group"],
          "mutability": "immutable"
        }
      ]
    }
  ]
}"#
}

/// Returns the Enterprise User extension schema as a JSON string.
pub fn enterprise_user_schema() -> &'static str {
    r#"{
  "id": "urn:ietf:params:scim:schemas:extension:enterprise:2.0:User",
  "name": "EnterpriseUser",
  "description": "Enterprise User",
  "attributes": [
    {"name": "employeeNumber", "type": "string"},
    {"name": "costCenter", "type": "string"},
    {"name": "organization", "type": "string"},
    {"name": "division", "type": "string"},
    {"name": "department", "type": "string"},
    {
      "name": "manager",
      "type": "complex",
      "subAttributes": [
        {"name": "value", "type": "string"},
        {"name": "$ref", "type": "reference", "referenceTypes": ["User"]},
        {"name": "displayName", "type": "string", "mutability": "readOnly"}
      ]
    }
  ]
}"#
}

/// Returns the Role schema as a JSON string.
pub fn role_schema() -> &'static str {
    r#"{
  "id": "urn:ietf:params:scim:schemas:extension:2.0:Role",
  "name": "Role",
  "description": "Role",
  "attributes": [
    {"name": "displayName", "type": "string", "required": true, "uniqueness": "server"},
    {
      "name": "users",
      "type": "complex",
      "multiValued": true,
      "subAttributes": [
        {"name": "value", "type": "string"},
        {"name": "display", "type": "string"},
        {"name": "$ref", "type": "reference", "referenceTypes": ["User"]}
      ]
    },
    {
      "name": "groups",
      "type": "complex",
      "multiValued": true,
      "subAttributes": [
        {"name": "value", "type": "string"},
        {"name": "display", "type": "string"},
        {"name": "$ref", "type": "reference", "referenceTypes": ["Group"]}
      ]
    },
    {"name": "permissions", "type": "string", "multiValued": true}
  ]
}"#
}

/// Returns the default resource types as a JSON string.
pub fn default_resource_types() -> &'static str {
    r#"[
  {
    "id": "User",
    "name": "User",
    "endpoint": "/Users",
    "description": "User Account",
    "schema": "urn:ietf:params:scim:schemas:core:2.0:User",
    "schemaExtensions": [
      {"schema": "urn:ietf:params:scim:schemas:extension:enterprise:2.0:User", "required": false}
    ]
  },
  {
    "id": "Group",
    "name": "Group",
    "endpoint": "/Groups",
    "description": "Group",
    "schema": "urn:ietf:params:scim:schemas:core:2.0:Group"
  },
  {
    "id": "Role",
    "name": "Role",
    "endpoint": "/Roles",
    "description": "Role",
    "schema": "urn:ietf:params:scim:schemas:extension:2.0:Role"
  }
]"#
}
