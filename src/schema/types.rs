//! Schema definition types.
//!
//! Schemas, attribute definitions and the characteristic enums (type,
//! mutability, returned, uniqueness) of RFC 7643 section 7.

use serde::{Deserialize, Serialize};

/// A SCIM schema definition.
///
/// Identified by its URI; owns the top-level attribute definitions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    /// Schema URI
    pub id: String,
    /// Human-readable schema name
    pub name: String,
    /// Schema description
    #[serde(default)]
    pub description: String,
    /// Top-level attributes
    pub attributes: Vec<AttributeDefinition>,
}

impl Schema {
    /// Find a top-level attribute by name, ignoring case.
    pub fn attribute(&self, name: &str) -> Option<&AttributeDefinition> {
        find_definition(&self.attributes, name)
    }

    /// Record this schema's URI on every attribute definition it owns.
    pub(crate) fn stamp_uri(&mut self) {
        let uri = self.id.clone();
        for attribute in &mut self.attributes {
            attribute.stamp_uri(&uri);
        }
    }
}

/// Schema entry for one attribute.
///
/// Carries every characteristic the factory stamps onto values and the
/// projection and PATCH engine consult.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeDefinition {
    /// Attribute name
    pub name: String,
    /// Data type of the attribute
    #[serde(rename = "type")]
    pub data_type: AttributeType,
    /// Holds a list of values
    #[serde(rename = "multiValued", default)]
    pub multi_valued: bool,
    /// Human-readable description
    #[serde(default)]
    pub description: String,
    /// Must be present on the resource
    #[serde(default)]
    pub required: bool,
    /// String comparison respects case
    #[serde(rename = "caseExact", default)]
    pub case_exact: bool,
    /// Mutability characteristics
    #[serde(default)]
    pub mutability: Mutability,
    /// When the attribute is returned in responses
    #[serde(default)]
    pub returned: Returned,
    /// Uniqueness constraints
    #[serde(default)]
    pub uniqueness: Uniqueness,
    /// Suggested values, such as "work" or "home"
    #[serde(rename = "canonicalValues", default)]
    pub canonical_values: Vec<String>,
    /// Resource types a reference attribute may point at
    #[serde(rename = "referenceTypes", default)]
    pub reference_types: Vec<String>,
    /// Members of a complex attribute
    #[serde(rename = "subAttributes", default)]
    pub sub_attributes: Vec<AttributeDefinition>,
    /// URI of the schema that declares this attribute
    #[serde(skip)]
    pub uri: String,
}

impl Default for AttributeDefinition {
    fn default() -> Self {
        Self {
            name: String::new(),
            data_type: AttributeType::String,
            multi_valued: false,
            description: String::new(),
            required: false,
            case_exact: false,
            mutability: Mutability::ReadWrite,
            returned: Returned::Default,
            uniqueness: Uniqueness::None,
            canonical_values: Vec::new(),
            reference_types: Vec::new(),
            sub_attributes: Vec::new(),
            uri: String::new(),
        }
    }
}

impl AttributeDefinition {
    /// Whether this attribute carries sub-attributes.
    pub fn is_complex(&self) -> bool {
        self.data_type == AttributeType::Complex
    }

    /// Find a sub-attribute by name, ignoring case.
    pub fn sub_attribute(&self, name: &str) -> Option<&AttributeDefinition> {
        find_definition(&self.sub_attributes, name)
    }

    /// Mutability forbids any client write.
    pub fn is_read_only(&self) -> bool {
        self.mutability == Mutability::ReadOnly
    }

    /// Mutability allows a single write.
    pub fn is_immutable(&self) -> bool {
        self.mutability == Mutability::Immutable
    }

    fn stamp_uri(&mut self, uri: &str) {
        self.uri = uri.to_string();
        for sub in &mut self.sub_attributes {
            sub.stamp_uri(uri);
        }
    }
}

/// Case-insensitive lookup in a definition list, as SCIM attribute names are.
pub fn find_definition<'a>(
    definitions: &'a [AttributeDefinition],
    name: &str,
) -> Option<&'a AttributeDefinition> {
    definitions
        .iter()
        .find(|definition| definition.name == name)
        .or_else(|| {
            definitions
                .iter()
                .find(|definition| definition.name.eq_ignore_ascii_case(name))
        })
}

/// SCIM attribute data types.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum AttributeType {
    /// String value
    #[default]
    String,
    /// Boolean value
    Boolean,
    /// Decimal number
    Decimal,
    /// Integer number
    Integer,
    /// DateTime in RFC3339 format
    DateTime,
    /// Base64 encoded bytes
    Binary,
    /// URI reference
    Reference,
    /// Container of sub-attributes
    Complex,
}

impl AttributeType {
    /// Schema representation name.
    pub fn as_str(&self) -> &'static str {
        match self {
            AttributeType::String => "string",
            AttributeType::Boolean => "boolean",
            AttributeType::Decimal => "decimal",
            AttributeType::Integer => "integer",
            AttributeType::DateTime => "dateTime",
            AttributeType::Binary => "binary",
            AttributeType::Reference => "reference",
            AttributeType::Complex => "complex",
        }
    }
}

/// Who may write an attribute, and when.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum Mutability {
    /// Set by the service provider only
    ReadOnly,
    /// Freely written by clients
    #[default]
    ReadWrite,
    /// Written once, then fixed
    Immutable,
    /// Accepted on write, never returned
    WriteOnly,
}

/// When an attribute appears in a response.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum Returned {
    /// Always returned, regardless of request parameters
    Always,
    /// Never returned
    Never,
    /// Returned unless excluded
    #[default]
    Default,
    /// Returned only when requested by name
    Request,
}

/// Scope in which values must be unique.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum Uniqueness {
    /// No uniqueness constraint
    #[default]
    None,
    /// Unique within the server
    Server,
    /// Globally unique
    Global,
}
