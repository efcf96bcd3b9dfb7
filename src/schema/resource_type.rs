//! Composed schema view for a single resource type.
//!
//! A [`ResourceTypeSchema`] merges the common attributes, the core schema and the
//! declared extensions into one attribute list. Each extension is folded in as a
//! complex attribute named by its URI, so `urn:...:enterprise:2.0:User:manager.value`
//! resolves through three levels: extension, `manager`, `value`.

use super::common;
use super::types::{AttributeDefinition, AttributeType, Schema, find_definition};

/// An extension schema attached to a resource type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionRef {
    /// Extension schema URI
    pub uri: String,
    /// Whether resources of this type must carry the extension
    pub required: bool,
}

/// The attribute schema of one resource type, used by every core operation.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceTypeSchema {
    name: String,
    core_uri: String,
    extensions: Vec<ExtensionRef>,
    attributes: Vec<AttributeDefinition>,
}

/// Result of matching a schema URI at the start of an attribute reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaPrefix<'s, 'a> {
    /// No schema URI; the whole text is a core attribute reference
    Unqualified(&'a str),
    /// Qualified with the core schema URI; `rest` follows the separating colon
    Core(&'a str),
    /// Qualified with an extension URI; `rest` is empty for the extension itself
    Extension { uri: &'s str, rest: &'a str },
}

impl ResourceTypeSchema {
    /// Compose a resource type schema from its core schema and extensions.
    pub fn new(name: impl Into<String>, core: &Schema, extensions: &[(&Schema, bool)]) -> Self {
        let mut attributes = common::common_attributes(&core.id);
        let declared: Vec<AttributeDefinition> = core
            .attributes
            .iter()
            .filter(|attribute| find_definition(&attributes, &attribute.name).is_none())
            .cloned()
            .collect();
        attributes.extend(declared);

        let mut refs = Vec::with_capacity(extensions.len());
        for (extension, required) in extensions {
            refs.push(ExtensionRef {
                uri: extension.id.clone(),
                required: *required,
            });
            attributes.push(AttributeDefinition {
                name: extension.id.clone(),
                data_type: AttributeType::Complex,
                description: extension.description.clone(),
                required: *required,
                sub_attributes: extension.attributes.clone(),
                uri: extension.id.clone(),
                ..Default::default()
            });
        }

        Self {
            name: name.into(),
            core_uri: core.id.clone(),
            extensions: refs,
            attributes,
        }
    }

    /// Copy of this schema with a replacement attribute list.
    pub(crate) fn with_attributes(&self, attributes: Vec<AttributeDefinition>) -> Self {
        Self {
            name: self.name.clone(),
            core_uri: self.core_uri.clone(),
            extensions: self.extensions.clone(),
            attributes,
        }
    }

    /// Resource type name (e.g. `User`).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// URI of the core schema.
    pub fn core_uri(&self) -> &str {
        &self.core_uri
    }

    /// Declared extensions.
    pub fn extensions(&self) -> &[ExtensionRef] {
        &self.extensions
    }

    /// Whether `uri` names one of this type's extensions.
    pub fn is_extension(&self, uri: &str) -> bool {
        self.extensions
            .iter()
            .any(|extension| extension.uri.eq_ignore_ascii_case(uri))
    }

    /// Core URI followed by every extension URI.
    pub fn schema_uris(&self) -> Vec<&str> {
        std::iter::once(self.core_uri.as_str())
            .chain(self.extensions.iter().map(|extension| extension.uri.as_str()))
            .collect()
    }

    /// All top-level attribute definitions, extensions included.
    pub fn attributes(&self) -> &[AttributeDefinition] {
        &self.attributes
    }

    /// Top-level attribute by name, ignoring case.
    pub fn attribute(&self, name: &str) -> Option<&AttributeDefinition> {
        find_definition(&self.attributes, name)
    }

    /// Resolve a chain of attribute names, one per level.
    pub fn resolve<S: AsRef<str>>(&self, segments: &[S]) -> Option<&AttributeDefinition> {
        let (first, rest) = segments.split_first()?;
        let mut current = self.attribute(first.as_ref())?;
        for segment in rest {
            current = current.sub_attribute(segment.as_ref())?;
        }
        Some(current)
    }

    /// Match a known schema URI at the start of `raw`.
    pub fn match_schema_prefix<'s, 'a>(&'s self, raw: &'a str) -> SchemaPrefix<'s, 'a> {
        if let Some(rest) = strip_uri(raw, &self.core_uri) {
            return SchemaPrefix::Core(rest);
        }
        self.extensions
            .iter()
            .filter_map(|extension| {
                strip_uri(raw, &extension.uri).map(|rest| (extension.uri.as_str(), rest))
            })
            .max_by_key(|(uri, _)| uri.len())
            .map(|(uri, rest)| SchemaPrefix::Extension { uri, rest })
            .unwrap_or(SchemaPrefix::Unqualified(raw))
    }
}

/// Strip `uri` (case-insensitively) when it is followed by a colon or the end of input.
fn strip_uri<'a>(raw: &'a str, uri: &str) -> Option<&'a str> {
    let head = raw.get(..uri.len())?;
    if !head.eq_ignore_ascii_case(uri) {
        return None;
    }
    let tail = &raw[uri.len()..];
    if tail.is_empty() {
        Some(tail)
    } else {
        tail.strip_prefix(':')
    }
}

/// Look up attribute schemas by dotted name, as PATCH auto-creation needs them.
pub trait SchemaLookup {
    /// Resolve `name`, `name.sub`, `urn:...:attr.sub` or a bare extension URI.
    fn attribute_schema(&self, dotted_name: &str) -> Option<&AttributeDefinition>;
}

impl SchemaLookup for ResourceTypeSchema {
    fn attribute_schema(&self, dotted_name: &str) -> Option<&AttributeDefinition> {
        match self.match_schema_prefix(dotted_name) {
            SchemaPrefix::Unqualified(rest) | SchemaPrefix::Core(rest) => {
                let segments: Vec<&str> = rest.split('.').collect();
                self.resolve(&segments)
            }
            SchemaPrefix::Extension { uri, rest } => {
                let mut segments = vec![uri];
                if !rest.is_empty() {
                    segments.extend(rest.split('.'));
                }
                self.resolve(&segments)
            }
        }
    }
}
