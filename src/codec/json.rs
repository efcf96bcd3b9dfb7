//! JSON implementation of the codec traits.

use super::{Decoder, Encoder};
use crate::attribute::{AttributeFactory, AttributeValue};
use crate::config::{ScimCoreConfig, UnknownAttributePolicy};
use crate::error::{ScimError, ScimResult};
use crate::patch::{PatchOp, PatchOperation};
use crate::resource::Resource;
use crate::schema::embedded::PATCH_OP_SCHEMA;
use crate::schema::resource_type::{ResourceTypeSchema, SchemaPrefix};
use crate::schema::types::AttributeDefinition;

use log::{debug, warn};
use serde_json::{Map, Value};

/// Codec for `application/scim+json` bodies.
///
/// ```rust
/// use scim_core::codec::{Decoder, Encoder, JsonCodec};
/// use scim_core::schema::SchemaRegistry;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let registry = SchemaRegistry::new()?;
/// let users = registry.resource_type_schema("User")?;
/// let codec = JsonCodec::new();
///
/// let user = codec.decode(
///     r#"{"schemas": ["urn:ietf:params:scim:schemas:core:2.0:User"], "userName": "bjensen"}"#,
///     users,
/// )?;
/// assert_eq!(user.string_value("userName"), Some("bjensen"));
/// assert!(codec.encode(&user)?.starts_with(r#"{"schemas""#));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec {
    factory: AttributeFactory,
}

impl JsonCodec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &ScimCoreConfig) -> Self {
        Self {
            factory: AttributeFactory::from_config(config),
        }
    }

    pub fn factory(&self) -> &AttributeFactory {
        &self.factory
    }

    /// Decode a parsed resource body. `schemas` is required.
    pub fn decode_value(&self, value: &Value, schema: &ResourceTypeSchema) -> ScimResult<Resource> {
        self.decode_object(value, schema, true)
    }

    /// Decode the object `value` of a path-less PATCH operation. `schemas` is optional.
    pub fn decode_fragment(&self, value: &Value, schema: &ResourceTypeSchema) -> ScimResult<Resource> {
        self.decode_object(value, schema, false)
    }

    /// Decode a parsed PATCH body: a `PatchOp` message or a bare operation array.
    pub fn operations_from_value(&self, value: &Value) -> ScimResult<Vec<PatchOperation>> {
        let operations = match value {
            Value::Array(items) => items,
            Value::Object(object) => {
                if let Some(schemas) = get_ignore_case(object, "schemas") {
                    let declared = schemas
                        .as_array()
                        .is_some_and(|uris| uris.iter().any(|uri| uri.as_str() == Some(PATCH_OP_SCHEMA)));
                    if !declared {
                        return Err(ScimError::invalid_syntax(format!(
                            "PATCH body must declare the {} schema",
                            PATCH_OP_SCHEMA
                        )));
                    }
                }
                match get_ignore_case(object, "Operations") {
                    Some(Value::Array(items)) => items,
                    _ => {
                        return Err(ScimError::invalid_syntax(
                            "PATCH body must carry an 'Operations' array",
                        ));
                    }
                }
            }
            _ => {
                return Err(ScimError::invalid_syntax(
                    "PATCH body must be an object or an array",
                ));
            }
        };

        let decoded = operations
            .iter()
            .enumerate()
            .map(|(index, operation)| operation_from_value(index, operation))
            .collect::<ScimResult<Vec<_>>>()?;
        debug!("Decoded {} PATCH operations", decoded.len());
        Ok(decoded)
    }

    /// Wire representation of a resource.
    pub fn to_value(&self, resource: &Resource) -> Value {
        resource.to_json()
    }

    fn decode_object(
        &self,
        value: &Value,
        schema: &ResourceTypeSchema,
        require_schemas: bool,
    ) -> ScimResult<Resource> {
        let object = value
            .as_object()
            .ok_or_else(|| ScimError::invalid_syntax("Resource body must be a JSON object"))?;

        let mut resource = Resource::new();
        match get_ignore_case(object, "schemas") {
            Some(Value::Array(uris)) => {
                for uri in uris {
                    let uri = uri
                        .as_str()
                        .ok_or_else(|| ScimError::invalid_syntax("'schemas' must hold URI strings"))?;
                    resource.add_schema(uri);
                }
            }
            Some(_) => return Err(ScimError::invalid_syntax("'schemas' must be an array")),
            None if require_schemas => {
                return Err(ScimError::invalid_syntax("Resource body has no 'schemas'"));
            }
            None => {}
        }

        for (key, value) in object {
            if key.eq_ignore_ascii_case("schemas") || value.is_null() {
                continue;
            }
            self.decode_entry(key, value, schema, &mut resource)?;
        }

        for extension in schema.extensions() {
            if resource.contains(&extension.uri) {
                resource.add_schema(extension.uri.clone());
            }
        }
        Ok(resource)
    }

    fn decode_entry(
        &self,
        key: &str,
        value: &Value,
        schema: &ResourceTypeSchema,
        resource: &mut Resource,
    ) -> ScimResult<()> {
        match schema.match_schema_prefix(key) {
            SchemaPrefix::Extension { uri, rest } => {
                let Some(extension) = schema.attribute(uri) else {
                    return self.unknown(key, value, resource);
                };
                if rest.is_empty() {
                    let decoded = self.factory.from_json(extension, value)?;
                    self.merge_extension(extension, decoded, resource)
                } else {
                    let Some(definition) = extension.sub_attribute(rest) else {
                        return self.unknown(key, value, resource);
                    };
                    let decoded = self.factory.from_json(definition, value)?;
                    self.merge_extension(extension, decoded, resource)
                }
            }
            SchemaPrefix::Core(name) | SchemaPrefix::Unqualified(name) => {
                match schema.attribute(name) {
                    Some(definition) => {
                        resource.replace_attribute(self.factory.from_json(definition, value)?);
                        Ok(())
                    }
                    None => self.unknown(name, value, resource),
                }
            }
        }
    }

    /// Fold an extension container, or one of its attributes, into the resource.
    fn merge_extension(
        &self,
        extension: &AttributeDefinition,
        decoded: AttributeValue,
        resource: &mut Resource,
    ) -> ScimResult<()> {
        let mut container = match resource.remove_attribute(&extension.name) {
            Some(AttributeValue::Complex(existing)) => existing,
            _ => self.factory.empty_complex(extension),
        };
        match decoded {
            AttributeValue::Complex(complex) if complex.name() == extension.name => {
                for (_, sub) in complex.into_sub_attributes() {
                    container.insert(sub);
                }
            }
            other => {
                container.insert(other);
            }
        }
        resource.replace_attribute(AttributeValue::Complex(container));
        Ok(())
    }

    fn unknown(&self, name: &str, value: &Value, resource: &mut Resource) -> ScimResult<()> {
        match self.factory.unknown_attribute_policy() {
            UnknownAttributePolicy::Preserve => {
                if let Some(attribute) = self.factory.untyped_from_json(name, value)? {
                    resource.replace_attribute(attribute);
                }
                Ok(())
            }
            UnknownAttributePolicy::Reject => {
                warn!("Rejecting unknown attribute '{}'", name);
                Err(ScimError::no_target(format!("Unknown attribute '{}'", name)))
            }
        }
    }
}

impl Decoder for JsonCodec {
    fn decode(&self, payload: &str, schema: &ResourceTypeSchema) -> ScimResult<Resource> {
        let value: Value = serde_json::from_str(payload)?;
        self.decode_value(&value, schema)
    }

    fn decode_operations(&self, payload: &str) -> ScimResult<Vec<PatchOperation>> {
        let value: Value = serde_json::from_str(payload)?;
        self.operations_from_value(&value)
    }
}

impl Encoder for JsonCodec {
    fn encode(&self, resource: &Resource) -> ScimResult<String> {
        Ok(serde_json::to_string(&self.to_value(resource))?)
    }
}

/// Member lookup ignoring case, preferring an exact match.
fn get_ignore_case<'a>(object: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    object.get(key).or_else(|| {
        object
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(key))
            .map(|(_, value)| value)
    })
}

fn operation_from_value(index: usize, value: &Value) -> ScimResult<PatchOperation> {
    let object = value.as_object().ok_or_else(|| {
        ScimError::invalid_syntax(format!("PATCH operation {} must be an object", index))
    })?;
    let op: PatchOp = get_ignore_case(object, "op")
        .and_then(Value::as_str)
        .ok_or_else(|| ScimError::invalid_syntax(format!("PATCH operation {} has no 'op'", index)))?
        .parse()?;
    let path = match get_ignore_case(object, "path") {
        None | Some(Value::Null) => None,
        Some(Value::String(path)) => Some(path.clone()),
        Some(_) => {
            return Err(ScimError::invalid_path(format!(
                "PATCH operation {} has a non-string 'path'",
                index
            )));
        }
    };
    let value = get_ignore_case(object, "value")
        .filter(|value| !value.is_null())
        .cloned();
    Ok(PatchOperation { op, path, value })
}
