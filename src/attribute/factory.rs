//! Schema-driven attribute factory.
//!
//! Raw attribute values are first built structurally (from JSON, or by hand with
//! the untyped constructors); [`AttributeFactory::create`] then stamps the schema
//! definition onto the value and every nested sub-attribute, coercing scalars to
//! the declared type along the way.

use super::complex::ComplexAttribute;
use super::multi_valued::{MultiValuedAttribute, MultiValues};
use super::value::{AttributeCharacteristics, AttributeValue, SimpleAttribute, SimpleValue};
use crate::config::{ScimCoreConfig, UnknownAttributePolicy};
use crate::error::{ScimError, ScimResult};
use crate::schema::types::{AttributeDefinition, AttributeType};

use log::warn;
use serde_json::Value;

/// Factory binding raw values to schema definitions.
#[derive(Debug, Clone, Copy, Default)]
pub struct AttributeFactory {
    unknown_attributes: UnknownAttributePolicy,
}

impl AttributeFactory {
    /// Create a factory with the given unknown attribute policy.
    pub fn new(unknown_attributes: UnknownAttributePolicy) -> Self {
        Self { unknown_attributes }
    }

    /// Create a factory from core configuration.
    pub fn from_config(config: &ScimCoreConfig) -> Self {
        Self::new(config.unknown_attributes)
    }

    pub fn unknown_attribute_policy(&self) -> UnknownAttributePolicy {
        self.unknown_attributes
    }

    /// Stamp `definition` onto a structurally built value.
    pub fn create(
        &self,
        definition: &AttributeDefinition,
        raw: AttributeValue,
    ) -> ScimResult<AttributeValue> {
        let characteristics = AttributeCharacteristics::from_definition(definition);
        match (definition.multi_valued, raw) {
            (false, AttributeValue::Simple(simple)) if !definition.is_complex() => {
                let value = simple
                    .into_value()
                    .coerce(&definition.name, definition.data_type)?;
                Ok(AttributeValue::Simple(SimpleAttribute::with_characteristics(
                    characteristics,
                    value,
                )))
            }
            (false, AttributeValue::Complex(complex)) if definition.is_complex() => Ok(
                AttributeValue::Complex(self.stamp_complex(definition, characteristics, complex)?),
            ),
            (true, AttributeValue::MultiValued(multi)) => {
                self.stamp_multi_valued(definition, characteristics, multi.into_values())
            }
            // A single value offered for a multi-valued attribute becomes a one-element list
            (true, AttributeValue::Simple(simple)) => self.stamp_multi_valued(
                definition,
                characteristics,
                MultiValues::Primitive(vec![simple.into_value()]),
            ),
            (true, AttributeValue::Complex(complex)) => self.stamp_multi_valued(
                definition,
                characteristics,
                MultiValues::Complex(vec![complex]),
            ),
            (_, other) => Err(ScimError::conversion(
                &definition.name,
                expected_shape(definition),
                format!("got {}", shape_of(&other)),
            )),
        }
    }

    /// Build and stamp an attribute from its wire value.
    pub fn from_json(&self, definition: &AttributeDefinition, value: &Value) -> ScimResult<AttributeValue> {
        let raw = raw_from_json(&definition.name, Some(definition), value)?.ok_or_else(|| {
            ScimError::conversion(&definition.name, expected_shape(definition), "got null")
        })?;
        self.create(definition, raw)
    }

    /// Build one complex value (an entry, when `definition` is multi-valued).
    pub fn complex_from_json(
        &self,
        definition: &AttributeDefinition,
        value: &Value,
    ) -> ScimResult<ComplexAttribute> {
        let entry_definition = AttributeDefinition {
            multi_valued: false,
            ..definition.clone()
        };
        match self.from_json(&entry_definition, value)? {
            AttributeValue::Complex(complex) => Ok(complex),
            other => Err(ScimError::conversion(
                &definition.name,
                "complex",
                format!("got {}", shape_of(&other)),
            )),
        }
    }

    /// Empty, stamped complex attribute for auto-creation.
    pub fn empty_complex(&self, definition: &AttributeDefinition) -> ComplexAttribute {
        let mut characteristics = AttributeCharacteristics::from_definition(definition);
        characteristics.multi_valued = false;
        ComplexAttribute::with_characteristics(characteristics)
    }

    /// Empty, stamped multi-valued attribute for auto-creation.
    pub fn empty_multi_valued(&self, definition: &AttributeDefinition) -> MultiValuedAttribute {
        MultiValuedAttribute::new(AttributeCharacteristics::from_definition(definition))
    }

    /// Build an attribute no schema declares, inferring its shape from JSON.
    /// Returns `None` for null.
    pub fn untyped_from_json(&self, name: &str, value: &Value) -> ScimResult<Option<AttributeValue>> {
        raw_from_json(name, None, value)
    }

    fn stamp_complex(
        &self,
        definition: &AttributeDefinition,
        mut characteristics: AttributeCharacteristics,
        raw: ComplexAttribute,
    ) -> ScimResult<ComplexAttribute> {
        characteristics.multi_valued = false;
        let mut stamped = ComplexAttribute::with_characteristics(characteristics);
        for (name, value) in raw.into_sub_attributes() {
            match definition.sub_attribute(&name) {
                Some(sub_definition) => {
                    stamped.insert(self.create(sub_definition, value)?);
                }
                None => self.handle_unknown(&definition.name, &name, value, &mut stamped)?,
            }
        }
        Ok(stamped)
    }

    fn stamp_multi_valued(
        &self,
        definition: &AttributeDefinition,
        characteristics: AttributeCharacteristics,
        values: MultiValues,
    ) -> ScimResult<AttributeValue> {
        let mut stamped = MultiValuedAttribute::new(characteristics.clone());
        match values {
            MultiValues::Primitive(values) if values.is_empty() => {}
            MultiValues::Complex(entries) if entries.is_empty() => {}
            MultiValues::Primitive(values) if !definition.is_complex() => {
                for value in values {
                    stamped.push_primitive(value.coerce(&definition.name, definition.data_type)?)?;
                }
            }
            MultiValues::Complex(entries) if definition.is_complex() => {
                for entry in entries {
                    stamped.push_entry(self.stamp_complex(
                        definition,
                        characteristics.clone(),
                        entry,
                    )?)?;
                }
            }
            MultiValues::Primitive(_) => {
                return Err(ScimError::conversion(
                    &definition.name,
                    "list of complex values",
                    "got a list of scalars",
                ));
            }
            MultiValues::Complex(_) => {
                return Err(ScimError::conversion(
                    &definition.name,
                    format!("list of {} values", definition.data_type.as_str()),
                    "got a list of complex values",
                ));
            }
        }
        Ok(AttributeValue::MultiValued(stamped))
    }

    fn handle_unknown(
        &self,
        parent: &str,
        name: &str,
        value: AttributeValue,
        target: &mut ComplexAttribute,
    ) -> ScimResult<()> {
        match self.unknown_attributes {
            UnknownAttributePolicy::Preserve => {
                target.insert(value);
                Ok(())
            }
            UnknownAttributePolicy::Reject => {
                warn!("Rejecting unknown sub-attribute '{}' of '{}'", name, parent);
                Err(ScimError::no_target(format!(
                    "Unknown sub-attribute '{}' of '{}'",
                    name, parent
                )))
            }
        }
    }
}

/// Build the structure of a wire value. With a definition, scalars are read as
/// the declared type; without one, the type is inferred from JSON.
fn raw_from_json(
    name: &str,
    definition: Option<&AttributeDefinition>,
    value: &Value,
) -> ScimResult<Option<AttributeValue>> {
    match value {
        Value::Null => Ok(None),
        Value::Object(object) => {
            let mut complex = ComplexAttribute::new(name);
            for (sub_name, sub_value) in object {
                let sub_definition = definition.and_then(|d| d.sub_attribute(sub_name));
                if let Some(sub) = raw_from_json(sub_name, sub_definition, sub_value)? {
                    complex.insert(sub);
                }
            }
            Ok(Some(AttributeValue::Complex(complex)))
        }
        Value::Array(items) => {
            let complex = match definition {
                Some(definition) => definition.is_complex(),
                None => items.first().is_some_and(Value::is_object),
            };
            if complex {
                let mut entries = Vec::with_capacity(items.len());
                for item in items {
                    match raw_from_json(name, definition, item)? {
                        Some(AttributeValue::Complex(entry)) => entries.push(entry),
                        None => {}
                        Some(_) => {
                            return Err(ScimError::conversion(
                                name,
                                "list of complex values",
                                "values are mixed",
                            ));
                        }
                    }
                }
                Ok(Some(AttributeValue::MultiValued(
                    MultiValuedAttribute::from_entries(name, entries),
                )))
            } else {
                let mut values = Vec::with_capacity(items.len());
                for item in items {
                    if item.is_object() || item.is_array() {
                        return Err(ScimError::conversion(
                            name,
                            "list of scalar values",
                            "values are mixed",
                        ));
                    }
                    if let Some(scalar) = scalar_from_json(name, definition, item)? {
                        values.push(scalar);
                    }
                }
                Ok(Some(AttributeValue::MultiValued(
                    MultiValuedAttribute::from_primitives(name, values),
                )))
            }
        }
        scalar => Ok(scalar_from_json(name, definition, scalar)?
            .map(|value| AttributeValue::simple(name, value))),
    }
}

fn scalar_from_json(
    name: &str,
    definition: Option<&AttributeDefinition>,
    value: &Value,
) -> ScimResult<Option<SimpleValue>> {
    let data_type = match definition {
        Some(definition) if !definition.is_complex() => definition.data_type,
        Some(definition) => {
            return Err(ScimError::conversion(
                name,
                expected_shape(definition),
                format!("got scalar {}", value),
            ));
        }
        None => match value {
            Value::Null => return Ok(None),
            Value::Bool(_) => AttributeType::Boolean,
            Value::Number(n) if n.is_i64() => AttributeType::Integer,
            Value::Number(_) => AttributeType::Decimal,
            _ => AttributeType::String,
        },
    };
    if value.is_null() {
        return Ok(None);
    }
    SimpleValue::from_json(name, data_type, value).map(Some)
}

fn expected_shape(definition: &AttributeDefinition) -> String {
    match (definition.multi_valued, definition.is_complex()) {
        (true, true) => "list of complex values".to_string(),
        (true, false) => format!("list of {} values", definition.data_type.as_str()),
        (false, true) => "complex".to_string(),
        (false, false) => definition.data_type.as_str().to_string(),
    }
}

fn shape_of(value: &AttributeValue) -> &'static str {
    match value {
        AttributeValue::Simple(_) => "a scalar",
        AttributeValue::Complex(_) => "a complex value",
        AttributeValue::MultiValued(_) => "a list",
    }
}
