//! SCIM 2.0 resource core for Rust.
//!
//! Represents SCIM resources as schema-constrained attribute trees, mutates them
//! with the RFC 7644 PATCH algebra and projects them for reads according to each
//! attribute's `returned` policy.
//!
//! # Core Components
//!
//! - [`SchemaRegistry`] - Immutable catalog of schemas and resource types
//! - [`Resource`] - Attribute tree plus the schema URIs it references
//! - [`PatchEngine`] - Applies `add`/`remove`/`replace` operations
//! - [`AttributeProjection`] - Decides which attributes a read returns
//! - [`JsonCodec`] - Decodes request bodies and encodes responses
//!
//! # Quick Start
//!
//! ```rust
//! use scim_core::{JsonCodec, PatchEngine, StandardValidator, SchemaRegistry};
//! use scim_core::codec::{Decoder, Encoder};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = SchemaRegistry::new()?;
//! let users = registry.resource_type_schema("User")?;
//! let codec = JsonCodec::new();
//!
//! let user = codec.decode(
//!     r#"{"schemas": ["urn:ietf:params:scim:schemas:core:2.0:User"], "userName": "bjensen"}"#,
//!     users,
//! )?;
//! let operations = codec.decode_operations(
//!     r#"{
//!         "schemas": ["urn:ietf:params:scim:api:messages:2.0:PatchOp"],
//!         "Operations": [{"op": "add", "value": {"nickName": "Babs"}}]
//!     }"#,
//! )?;
//!
//! let patched = PatchEngine::new(users, StandardValidator::new()).apply_all(&user, &operations)?;
//! assert!(codec.encode(&patched)?.contains("Babs"));
//! # Ok(())
//! # }
//! ```

pub mod attribute;
pub mod codec;
pub mod config;
pub mod error;
pub mod patch;
pub mod projection;
pub mod resource;
pub mod schema;
pub mod validation;

// Re-export commonly used types for convenience
pub use attribute::{AttributeFactory, AttributeValue, ComplexAttribute, MultiValuedAttribute, SimpleValue};
pub use codec::{Decoder, Encoder, JsonCodec};
pub use config::{ScimCoreConfig, UnknownAttributePolicy};
pub use error::{ScimError, ScimResult, ScimType};
pub use patch::{AttributePath, PatchEngine, PatchOp, PatchOperation};
pub use projection::{AttributeProjection, Projection};
pub use resource::{Group, ListedResource, Resource, ResourceVersion, Role, User};
pub use schema::{ResourceTypeSchema, Schema, SchemaLookup, SchemaRegistry};
pub use validation::{StandardValidator, Validator};
