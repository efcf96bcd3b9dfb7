//! Schema definitions and the schema catalog for SCIM resources.
//!
//! This module provides the RFC 7643 schema types, the embedded core schemas and
//! the immutable [`SchemaRegistry`] catalog that composes them per resource type.
//!
//! # Key Types
//!
//! - [`Schema`] - SCIM schema definition with attributes and metadata
//! - [`SchemaRegistry`] - Catalog of schemas and resource types, built once
//! - [`ResourceTypeSchema`] - Attribute schema of one resource type, extensions folded in
//! - [`AttributeDefinition`] - Individual attribute specifications and constraints
//!
//! # Examples
//!
//! ```rust
//! use scim_core::schema::{SchemaLookup, SchemaRegistry};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = SchemaRegistry::new()?;
//! let users = registry.resource_type_schema("User")?;
//! assert!(users.attribute_schema("name.givenName").is_some());
//! # Ok(())
//! # }
//! ```

pub mod common;
pub mod embedded;
pub mod registry;
pub mod resource_type;
pub mod types;


pub use registry::{ResourceType, SchemaExtension, SchemaRegistry, SchemaRegistryBuilder};
pub use resource_type::{ExtensionRef, ResourceTypeSchema, SchemaLookup, SchemaPrefix};
pub use types::{
    AttributeDefinition, AttributeType, Mutability, Returned, Schema, Uniqueness, find_definition,
};
