//! Attribute projection for reads.
//!
//! Crosses each attribute's `returned` policy with the request's `attributes` or
//! `excludedAttributes` list (RFC 7644 section 3.9) and yields the set of attribute
//! URIs a response may carry. The walk covers three levels: attribute,
//! sub-attribute and sub-sub-attribute. An extension container counts as the first
//! level, so `urn:...:enterprise:2.0:User:manager.value` is the deepest node.
//!
//! ```rust
//! use scim_core::projection::AttributeProjection;
//! use scim_core::schema::SchemaRegistry;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = SchemaRegistry::new()?;
//! let users = registry.resource_type_schema("User")?;
//!
//! let allowed = AttributeProjection::resolve(users, Some("emails"), None)?;
//! assert!(allowed.contains_key("urn:ietf:params:scim:schemas:core:2.0:User:emails"));
//! assert!(!allowed.contains_key("urn:ietf:params:scim:schemas:core:2.0:User:nickName"));
//! # Ok(())
//! # }
//! ```

use crate::attribute::AttributeValue;
use crate::error::{ScimError, ScimResult};
use crate::resource::Resource;
use crate::schema::resource_type::{ResourceTypeSchema, SchemaPrefix};
use crate::schema::types::{AttributeDefinition, Returned, find_definition};

use indexmap::IndexMap;
use log::{debug, trace};

/// Number of schema levels the projection walks.
pub const PROJECTION_DEPTH: usize = 3;

/// Computes which attributes a read returns.
#[derive(Debug, Clone, Copy, Default)]
pub struct AttributeProjection;

/// The outcome of projecting a schema for one request.
#[derive(Debug, Clone)]
pub struct Projection {
    schema: ResourceTypeSchema,
    attributes: IndexMap<String, bool>,
    retain_untyped: bool,
}

#[derive(Debug)]
enum Request {
    Unrestricted,
    Include(Vec<String>),
    Exclude(Vec<String>),
}

impl AttributeProjection {
    /// Map of allowed attribute URIs to their multiValued flag.
    ///
    /// `include` and `exclude` are comma-separated attribute names, optionally
    /// qualified with a schema URI. Passing both fails with `invalidValue`.
    pub fn resolve(
        schema: &ResourceTypeSchema,
        include: Option<&str>,
        exclude: Option<&str>,
    ) -> ScimResult<IndexMap<String, bool>> {
        Ok(Self::project(schema, include, exclude)?.attributes)
    }

    /// Resolve the projection and keep the pruned schema alongside the URI map.
    pub fn project(
        schema: &ResourceTypeSchema,
        include: Option<&str>,
        exclude: Option<&str>,
    ) -> ScimResult<Projection> {
        let request = Request::parse(schema, include, exclude)?;
        debug!("Projecting {} attributes for {:?}", schema.name(), request);

        let mut attributes = IndexMap::new();
        let mut pruned = Vec::new();
        for definition in schema.attributes() {
            let (key, separator) = if schema.is_extension(&definition.name) && definition.is_complex() {
                (definition.name.clone(), ':')
            } else {
                (format!("{}:{}", schema.core_uri(), definition.name), '.')
            };
            if let Some(kept) = request.walk(definition, key, separator, 1, false, &mut attributes) {
                pruned.push(kept);
            }
        }

        Ok(Projection {
            schema: schema.with_attributes(pruned),
            attributes,
            retain_untyped: !matches!(request, Request::Include(_)),
        })
    }
}

impl Request {
    fn parse(
        schema: &ResourceTypeSchema,
        include: Option<&str>,
        exclude: Option<&str>,
    ) -> ScimResult<Self> {
        let include = include.map(|raw| normalize_list(schema, raw)).filter(|names| !names.is_empty());
        let exclude = exclude.map(|raw| normalize_list(schema, raw)).filter(|names| !names.is_empty());
        match (include, exclude) {
            (Some(_), Some(_)) => Err(ScimError::invalid_value(
                "attributes and excludedAttributes are mutually exclusive",
            )),
            (Some(names), None) => Ok(Request::Include(names)),
            (None, Some(names)) => Ok(Request::Exclude(names)),
            (None, None) => Ok(Request::Unrestricted),
        }
    }

    /// Decide one node and, when it stays, its descendants. Returns the pruned
    /// definition of a kept node.
    fn walk(
        &self,
        definition: &AttributeDefinition,
        key: String,
        separator: char,
        level: usize,
        ancestor_named: bool,
        out: &mut IndexMap<String, bool>,
    ) -> Option<AttributeDefinition> {
        let Some(named) = self.decide(definition, &key, separator, ancestor_named) else {
            trace!("Excluding {}", key);
            return None;
        };
        out.insert(key.clone(), definition.multi_valued);

        let mut kept = AttributeDefinition {
            sub_attributes: Vec::new(),
            ..definition.clone()
        };
        if level < PROJECTION_DEPTH {
            for sub in &definition.sub_attributes {
                let child = format!("{}{}{}", key, separator, sub.name);
                if let Some(sub) = self.walk(sub, child, '.', level + 1, named, out) {
                    kept.sub_attributes.push(sub);
                }
            }
        }
        Some(kept)
    }

    /// `None` excludes the node; `Some(named)` keeps it and tells whether the
    /// request named it or one of its ancestors.
    fn decide(
        &self,
        definition: &AttributeDefinition,
        key: &str,
        separator: char,
        ancestor_named: bool,
    ) -> Option<bool> {
        if definition.returned == Returned::Never {
            return None;
        }
        match self {
            Request::Unrestricted => (definition.returned != Returned::Request).then_some(false),
            Request::Include(names) => {
                let named = ancestor_named || is_named(names, key);
                let kept = named
                    || definition.returned == Returned::Always
                    || names_descendant(names, key, separator);
                kept.then_some(named)
            }
            Request::Exclude(names) => {
                if definition.returned == Returned::Request {
                    return None;
                }
                let named = ancestor_named || is_named(names, key);
                (!(named && definition.returned == Returned::Default)).then_some(named)
            }
        }
    }
}

/// Split a comma-separated list and qualify each name with its schema URI.
fn normalize_list(schema: &ResourceTypeSchema, raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(|name| {
            let qualified = match schema.match_schema_prefix(name) {
                SchemaPrefix::Unqualified(rest) | SchemaPrefix::Core(rest) => {
                    format!("{}:{}", schema.core_uri(), rest)
                }
                SchemaPrefix::Extension { uri, rest } if rest.is_empty() => uri.to_string(),
                SchemaPrefix::Extension { uri, rest } => format!("{}:{}", uri, rest),
            };
            qualified.to_ascii_lowercase()
        })
        .collect()
}

fn is_named(names: &[String], key: &str) -> bool {
    names.iter().any(|name| name.eq_ignore_ascii_case(key))
}

fn names_descendant(names: &[String], key: &str, separator: char) -> bool {
    let prefix = format!("{}{}", key, separator).to_ascii_lowercase();
    names.iter().any(|name| name.starts_with(&prefix))
}

impl Projection {
    /// The working schema with every excluded node removed.
    pub fn schema(&self) -> &ResourceTypeSchema {
        &self.schema
    }

    /// Allowed attribute URIs mapped to their multiValued flag.
    pub fn attributes(&self) -> &IndexMap<String, bool> {
        &self.attributes
    }

    pub fn allows(&self, uri: &str) -> bool {
        self.attributes.keys().any(|key| key.eq_ignore_ascii_case(uri))
    }

    /// Whether the top-level attribute `name` survives the projection.
    pub fn keeps_attribute(&self, name: &str) -> bool {
        find_definition(self.schema.attributes(), name).is_some()
    }

    /// Prune a copy of `resource` down to the projected attributes.
    ///
    /// Attributes the schema does not describe survive unless an include list
    /// was given. Extension URIs whose container is gone leave `schemas`.
    pub fn apply(&self, resource: &Resource) -> Resource {
        let mut projected = resource.deep_copy();
        prune(projected.attributes_mut(), self.schema.attributes(), self.retain_untyped);

        let dropped: Vec<String> = projected
            .schemas()
            .iter()
            .filter(|uri| self.schema.is_extension(uri) && !projected.contains(uri))
            .cloned()
            .collect();
        for uri in dropped {
            projected.remove_schema(&uri);
        }
        projected
    }
}

fn prune(
    attributes: &mut IndexMap<String, AttributeValue>,
    definitions: &[AttributeDefinition],
    retain_untyped: bool,
) {
    attributes.retain(|name, value| match find_definition(definitions, name) {
        None => retain_untyped && !value.characteristics().is_typed(),
        Some(definition) => match value {
            AttributeValue::Simple(_) => true,
            AttributeValue::Complex(complex) => {
                prune(complex.sub_attributes_mut(), &definition.sub_attributes, retain_untyped);
                !complex.is_empty()
            }
            AttributeValue::MultiValued(multi) => {
                if multi.is_complex() {
                    for entry in multi.entries_mut() {
                        prune(entry.sub_attributes_mut(), &definition.sub_attributes, retain_untyped);
                    }
                    multi.retain_entries(|entry| !entry.is_empty());
                }
                !multi.is_empty()
            }
        },
    });
}
