//! Complex attributes: an ordered set of named sub-attributes.

use super::value::{AttributeCharacteristics, AttributeValue, SimpleValue};
use super::{insert_attribute, position_of};
use crate::schema::types::AttributeType;

use indexmap::IndexMap;
use serde_json::{Map, Value};

/// A complex attribute, or one entry of a multi-valued complex attribute.
///
/// Sub-attribute names are looked up case-insensitively. Inside extension
/// schemas a sub-attribute may itself be complex or multi-valued.
#[derive(Debug, PartialEq)]
pub struct ComplexAttribute {
    characteristics: AttributeCharacteristics,
    sub_attributes: IndexMap<String, AttributeValue>,
}

impl ComplexAttribute {
    /// Empty untyped complex attribute.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_characteristics(AttributeCharacteristics::untyped(
            name,
            AttributeType::Complex,
            false,
        ))
    }

    pub(crate) fn with_characteristics(characteristics: AttributeCharacteristics) -> Self {
        Self {
            characteristics,
            sub_attributes: IndexMap::new(),
        }
    }

    /// Builder-style insert.
    pub fn with(mut self, attribute: AttributeValue) -> Self {
        self.insert(attribute);
        self
    }

    pub fn characteristics(&self) -> &AttributeCharacteristics {
        &self.characteristics
    }

    pub(crate) fn set_characteristics(&mut self, characteristics: AttributeCharacteristics) {
        self.characteristics = characteristics;
    }

    pub fn name(&self) -> &str {
        &self.characteristics.name
    }

    pub fn sub_attributes(&self) -> &IndexMap<String, AttributeValue> {
        &self.sub_attributes
    }

    pub(crate) fn sub_attributes_mut(&mut self) -> &mut IndexMap<String, AttributeValue> {
        &mut self.sub_attributes
    }

    pub(crate) fn into_sub_attributes(self) -> IndexMap<String, AttributeValue> {
        self.sub_attributes
    }

    pub fn len(&self) -> usize {
        self.sub_attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sub_attributes.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        position_of(&self.sub_attributes, name).is_some()
    }

    pub fn get(&self, name: &str) -> Option<&AttributeValue> {
        position_of(&self.sub_attributes, name)
            .and_then(|index| self.sub_attributes.get_index(index))
            .map(|(_, value)| value)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut AttributeValue> {
        position_of(&self.sub_attributes, name)
            .and_then(|index| self.sub_attributes.get_index_mut(index))
            .map(|(_, value)| value)
    }

    /// Insert or replace a sub-attribute, keeping its position when replacing.
    pub fn insert(&mut self, attribute: AttributeValue) -> Option<AttributeValue> {
        insert_attribute(&mut self.sub_attributes, attribute)
    }

    pub fn remove(&mut self, name: &str) -> Option<AttributeValue> {
        position_of(&self.sub_attributes, name)
            .and_then(|index| self.sub_attributes.shift_remove_index(index))
            .map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = &AttributeValue> {
        self.sub_attributes.values()
    }

    /// Scalar value of a simple sub-attribute.
    pub fn simple_value(&self, name: &str) -> Option<&SimpleValue> {
        self.get(name)
            .and_then(AttributeValue::as_simple)
            .map(|simple| simple.value())
    }

    /// String value of a simple sub-attribute.
    pub fn string_value(&self, name: &str) -> Option<&str> {
        self.simple_value(name).and_then(SimpleValue::as_str)
    }

    /// Boolean value of a simple sub-attribute.
    pub fn bool_value(&self, name: &str) -> Option<bool> {
        self.simple_value(name).and_then(SimpleValue::as_bool)
    }

    /// Whether the `primary` sub-attribute is true.
    pub fn is_primary(&self) -> bool {
        self.bool_value("primary").unwrap_or(false)
    }

    /// Fully independent structural copy.
    pub fn deep_copy(&self) -> Self {
        Self {
            characteristics: self.characteristics.clone(),
            sub_attributes: self
                .sub_attributes
                .iter()
                .map(|(name, value)| (name.clone(), value.deep_copy()))
                .collect(),
        }
    }

    /// Wire representation.
    pub fn to_json(&self) -> Value {
        let object: Map<String, Value> = self
            .sub_attributes
            .iter()
            .map(|(name, value)| (name.clone(), value.to_json()))
            .collect();
        Value::Object(object)
    }
}

impl Clone for ComplexAttribute {
    fn clone(&self) -> Self {
        self.deep_copy()
    }
}
