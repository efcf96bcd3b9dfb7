//! Schema registry for loading, managing, and accessing SCIM schemas.
//!
//! The [`SchemaRegistry`] is an immutable catalog: it is assembled once through
//! [`SchemaRegistryBuilder`] and then passed by reference to whatever needs schema
//! facts. Composed [`ResourceTypeSchema`] views are computed at build time.

use super::embedded;
use super::resource_type::ResourceTypeSchema;
use super::types::Schema;
use crate::error::{ScimError, ScimResult};

use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// A SCIM resource type definition (RFC 7643 section 6).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceType {
    /// Resource type identifier
    #[serde(default)]
    pub id: Option<String>,
    /// Resource type name, e.g. `User`
    pub name: String,
    /// Relative endpoint, e.g. `/Users`
    pub endpoint: String,
    /// Human-readable description
    #[serde(default)]
    pub description: String,
    /// Core schema URI
    pub schema: String,
    /// Extension schemas
    #[serde(default)]
    pub schema_extensions: Vec<SchemaExtension>,
}

/// An extension entry of a resource type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaExtension {
    /// Extension schema URI
    pub schema: String,
    /// Whether the extension is required
    #[serde(default)]
    pub required: bool,
}

/// Immutable catalog of schemas and resource types.
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    schemas: HashMap<String, Schema>,
    resource_types: Vec<ResourceType>,
    composed: HashMap<String, ResourceTypeSchema>,
}

impl SchemaRegistry {
    /// Create a registry with the embedded core schemas and resource types.
    pub fn new() -> ScimResult<Self> {
        Self::with_embedded_schemas()
    }

    /// Create a registry with the embedded core schemas and resource types.
    pub fn with_embedded_schemas() -> ScimResult<Self> {
        Self::builder().with_embedded_schemas()?.build()
    }

    /// Start an empty builder.
    pub fn builder() -> SchemaRegistryBuilder {
        SchemaRegistryBuilder::default()
    }

    /// Create a registry from a directory of schema files.
    ///
    /// Every `*.json` file holding an object with an `attributes` member is read as a
    /// schema. A `ResourceTypes.json` file, when present, supplies the resource types;
    /// otherwise the embedded defaults are used.
    pub fn from_schema_dir<P: AsRef<Path>>(schema_dir: P) -> ScimResult<Self> {
        let dir = schema_dir.as_ref();
        let mut builder = Self::builder();
        let mut resource_types = None;

        let entries = fs::read_dir(dir)
            .map_err(|e| ScimError::internal(format!("cannot read {}: {}", dir.display(), e)))?;
        for entry in entries {
            let path = entry
                .map_err(|e| ScimError::internal(format!("cannot read schema entry: {}", e)))?
                .path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            let content = fs::read_to_string(&path)
                .map_err(|e| ScimError::internal(format!("cannot read {}: {}", path.display(), e)))?;
            if path.file_stem().and_then(|stem| stem.to_str()) == Some("ResourceTypes") {
                resource_types = Some(content);
            } else {
                debug!("Loading schema file {}", path.display());
                builder = builder.add_schema_json(&content)?;
            }
        }

        let resource_types =
            resource_types.unwrap_or_else(|| embedded::default_resource_types().to_string());
        builder.add_resource_types_json(&resource_types)?.build()
    }

    /// Get all available schemas.
    pub fn get_schemas(&self) -> Vec<&Schema> {
        self.schemas.values().collect()
    }

    /// Get a specific schema by ID.
    pub fn get_schema(&self, id: &str) -> Option<&Schema> {
        self.schemas.get(id)
    }

    /// Get the core User schema.
    pub fn get_user_schema(&self) -> Option<&Schema> {
        self.get_schema(embedded::USER_SCHEMA)
    }

    /// Get the core Group schema.
    pub fn get_group_schema(&self) -> Option<&Schema> {
        self.get_schema(embedded::GROUP_SCHEMA)
    }

    /// All registered resource types.
    pub fn resource_types(&self) -> &[ResourceType] {
        &self.resource_types
    }

    /// Resource type by name, ignoring case.
    pub fn resource_type(&self, name: &str) -> Option<&ResourceType> {
        self.resource_types
            .iter()
            .find(|resource_type| resource_type.name.eq_ignore_ascii_case(name))
    }

    /// Composed attribute schema for a resource type.
    pub fn resource_type_schema(&self, name: &str) -> ScimResult<&ResourceTypeSchema> {
        let resource_type = self
            .resource_type(name)
            .ok_or_else(|| ScimError::schema_not_found(name))?;
        self.composed
            .get(&resource_type.name)
            .ok_or_else(|| ScimError::internal(format!("resource type '{}' not composed", name)))
    }
}

/// Builder collecting schemas and resource types before the registry is frozen.
#[derive(Debug, Default)]
pub struct SchemaRegistryBuilder {
    schemas: Vec<Schema>,
    resource_types: Vec<ResourceType>,
}

impl SchemaRegistryBuilder {
    /// Add the embedded core schemas and default resource types.
    pub fn with_embedded_schemas(self) -> ScimResult<Self> {
        self.add_schema_json(embedded::core_user_schema())?
            .add_schema_json(embedded::core_group_schema())?
            .add_schema_json(embedded::enterprise_user_schema())?
            .add_schema_json(embedded::role_schema())?
            .add_resource_types_json(embedded::default_resource_types())
    }

    /// Add a schema. A later schema with the same URI replaces an earlier one.
    pub fn add_schema(mut self, schema: Schema) -> Self {
        self.schemas.retain(|existing| existing.id != schema.id);
        self.schemas.push(schema);
        self
    }

    /// Parse and add a schema from JSON.
    pub fn add_schema_json(self, content: &str) -> ScimResult<Self> {
        let schema: Schema = serde_json::from_str(content)?;
        Ok(self.add_schema(schema))
    }

    /// Add a resource type. A later type with the same name replaces an earlier one.
    pub fn add_resource_type(mut self, resource_type: ResourceType) -> Self {
        self.resource_types
            .retain(|existing| !existing.name.eq_ignore_ascii_case(&resource_type.name));
        self.resource_types.push(resource_type);
        self
    }

    /// Parse and add a JSON array of resource types.
    pub fn add_resource_types_json(self, content: &str) -> ScimResult<Self> {
        let resource_types: Vec<ResourceType> = serde_json::from_str(content)?;
        Ok(resource_types
            .into_iter()
            .fold(self, |builder, resource_type| builder.add_resource_type(resource_type)))
    }

    /// Freeze the catalog, composing one schema view per resource type.
    pub fn build(self) -> ScimResult<SchemaRegistry> {
        let mut schemas = HashMap::with_capacity(self.schemas.len());
        for mut schema in self.schemas {
            schema.stamp_uri();
            schemas.insert(schema.id.clone(), schema);
        }

        let mut composed = HashMap::with_capacity(self.resource_types.len());
        for resource_type in &self.resource_types {
            let core = schemas
                .get(&resource_type.schema)
                .ok_or_else(|| ScimError::schema_not_found(&resource_type.schema))?;
            let mut extensions = Vec::with_capacity(resource_type.schema_extensions.len());
            for extension in &resource_type.schema_extensions {
                let schema = schemas
                    .get(&extension.schema)
                    .ok_or_else(|| ScimError::schema_not_found(&extension.schema))?;
                extensions.push((schema, extension.required));
            }
            composed.insert(
                resource_type.name.clone(),
                ResourceTypeSchema::new(&resource_type.name, core, &extensions),
            );
        }

        info!(
            "Schema registry built with {} schemas and {} resource types",
            schemas.len(),
            self.resource_types.len()
        );

        Ok(SchemaRegistry {
            schemas,
            resource_types: self.resource_types,
            composed,
        })
    }
}
