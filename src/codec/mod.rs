//! Wire-format boundary of the core.
//!
//! [`Decoder`] turns request bodies into schema-bound [`Resource`]s and PATCH
//! operation lists; [`Encoder`] turns resources back into response bodies.
//! [`JsonCodec`] implements both over `serde_json`.

pub mod json;

pub use json::JsonCodec;

use crate::error::ScimResult;
use crate::patch::PatchOperation;
use crate::resource::Resource;
use crate::schema::ResourceTypeSchema;

/// Decodes request payloads.
pub trait Decoder {
    /// Decode a full resource body, `schemas` included.
    fn decode(&self, payload: &str, schema: &ResourceTypeSchema) -> ScimResult<Resource>;

    /// Decode the ordered operation list of a PATCH request.
    fn decode_operations(&self, payload: &str) -> ScimResult<Vec<PatchOperation>>;
}

/// Encodes resources into response payloads.
pub trait Encoder {
    fn encode(&self, resource: &Resource) -> ScimResult<String>;
}
