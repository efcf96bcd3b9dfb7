//! Multi-valued attribute container for SCIM resources.
//!
//! A multi-valued attribute holds either primitive scalars or complex entries,
//! never both. For complex entries it supports the usual SCIM lookups: the
//! `primary` value and selection by `type`.
//!
//! ```rust
//! use scim_core::attribute::{AttributeValue, ComplexAttribute, MultiValuedAttribute, SimpleValue};
//!
//! let work = ComplexAttribute::new("emails")
//!     .with(AttributeValue::string("value", "bjensen@example.com"))
//!     .with(AttributeValue::string("type", "work"))
//!     .with(AttributeValue::simple("primary", SimpleValue::Boolean(true)));
//! let emails = MultiValuedAttribute::from_entries("emails", vec![work]);
//!
//! assert_eq!(emails.primary().and_then(|e| e.string_value("value")), Some("bjensen@example.com"));
//! assert!(emails.by_type("home").is_none());
//! ```

use super::complex::ComplexAttribute;
use super::value::{AttributeCharacteristics, AttributeValue, SimpleValue};
use crate::error::{ScimError, ScimResult};
use crate::schema::types::AttributeType;

use serde_json::Value;

/// Values of a multi-valued attribute.
#[derive(Debug, PartialEq)]
pub enum MultiValues {
    Primitive(Vec<SimpleValue>),
    Complex(Vec<ComplexAttribute>),
}

/// An ordered list of values sharing one attribute name.
#[derive(Debug, PartialEq)]
pub struct MultiValuedAttribute {
    characteristics: AttributeCharacteristics,
    values: MultiValues,
}

impl MultiValuedAttribute {
    /// Empty list; the value kind follows the declared data type.
    pub fn new(characteristics: AttributeCharacteristics) -> Self {
        let values = if characteristics.data_type == AttributeType::Complex {
            MultiValues::Complex(Vec::new())
        } else {
            MultiValues::Primitive(Vec::new())
        };
        Self {
            characteristics,
            values,
        }
    }

    /// Untyped list of complex entries.
    pub fn from_entries(name: impl Into<String>, entries: Vec<ComplexAttribute>) -> Self {
        Self {
            characteristics: AttributeCharacteristics::untyped(name, AttributeType::Complex, true),
            values: MultiValues::Complex(entries),
        }
    }

    /// Untyped list of scalars. The data type is taken from the first value.
    pub fn from_primitives(name: impl Into<String>, values: Vec<SimpleValue>) -> Self {
        let data_type = values
            .first()
            .map(SimpleValue::data_type)
            .unwrap_or_default();
        Self {
            characteristics: AttributeCharacteristics::untyped(name, data_type, true),
            values: MultiValues::Primitive(values),
        }
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

    pub fn values(&self) -> &MultiValues {
        &self.values
    }

    pub(crate) fn into_values(self) -> MultiValues {
        self.values
    }

    pub fn is_complex(&self) -> bool {
        matches!(self.values, MultiValues::Complex(_))
    }

    pub fn len(&self) -> usize {
        match &self.values {
            MultiValues::Primitive(values) => values.len(),
            MultiValues::Complex(entries) => entries.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Scalar values; empty for complex lists.
    pub fn primitives(&self) -> &[SimpleValue] {
        match &self.values {
            MultiValues::Primitive(values) => values,
            MultiValues::Complex(_) => &[],
        }
    }

    /// Complex entries; empty for scalar lists.
    pub fn entries(&self) -> &[ComplexAttribute] {
        match &self.values {
            MultiValues::Complex(entries) => entries,
            MultiValues::Primitive(_) => &[],
        }
    }

    pub fn entries_mut(&mut self) -> std::slice::IterMut<'_, ComplexAttribute> {
        match &mut self.values {
            MultiValues::Complex(entries) => entries.iter_mut(),
            MultiValues::Primitive(_) => Default::default(),
        }
    }

    /// First entry whose `primary` sub-attribute is true.
    pub fn primary(&self) -> Option<&ComplexAttribute> {
        self.entries().iter().find(|entry| entry.is_primary())
    }

    /// First entry whose `type` equals `kind`, ignoring case.
    pub fn by_type(&self, kind: &str) -> Option<&ComplexAttribute> {
        self.filter_by_type(kind).into_iter().next()
    }

    /// Every entry whose `type` equals `kind`, ignoring case.
    pub fn filter_by_type(&self, kind: &str) -> Vec<&ComplexAttribute> {
        self.entries()
            .iter()
            .filter(|entry| {
                entry
                    .string_value("type")
                    .is_some_and(|value| value.eq_ignore_ascii_case(kind))
            })
            .collect()
    }

    /// Append a complex entry. An empty scalar list turns into a complex one.
    pub fn push_entry(&mut self, entry: ComplexAttribute) -> ScimResult<()> {
        if let MultiValues::Primitive(values) = &self.values {
            if !values.is_empty() {
                return Err(self.mixed_error());
            }
            self.values = MultiValues::Complex(Vec::new());
        }
        if let MultiValues::Complex(entries) = &mut self.values {
            entries.push(entry);
        }
        Ok(())
    }

    /// Append a scalar. An empty complex list turns into a scalar one.
    pub fn push_primitive(&mut self, value: SimpleValue) -> ScimResult<()> {
        if let MultiValues::Complex(entries) = &self.values {
            if !entries.is_empty() {
                return Err(self.mixed_error());
            }
            self.values = MultiValues::Primitive(Vec::new());
        }
        if let MultiValues::Primitive(values) = &mut self.values {
            values.push(value);
        }
        Ok(())
    }

    pub fn contains_entry(&self, entry: &ComplexAttribute) -> bool {
        self.entries().iter().any(|existing| existing == entry)
    }

    pub fn contains_primitive(&self, value: &SimpleValue) -> bool {
        self.primitives().iter().any(|existing| existing == value)
    }

    /// Append every value of `other`, optionally skipping values already present.
    /// Returns the number of values appended.
    pub fn append(&mut self, other: MultiValuedAttribute, skip_duplicates: bool) -> ScimResult<usize> {
        let mut appended = 0;
        match other.values {
            MultiValues::Complex(entries) => {
                for entry in entries {
                    if skip_duplicates && self.contains_entry(&entry) {
                        continue;
                    }
                    self.push_entry(entry)?;
                    appended += 1;
                }
            }
            MultiValues::Primitive(values) => {
                for value in values {
                    if skip_duplicates && self.contains_primitive(&value) {
                        continue;
                    }
                    self.push_primitive(value)?;
                    appended += 1;
                }
            }
        }
        Ok(appended)
    }

    /// Remove the first entry equal to `entry`.
    pub fn remove_entry(&mut self, entry: &ComplexAttribute) -> bool {
        match &mut self.values {
            MultiValues::Complex(entries) => match entries.iter().position(|e| e == entry) {
                Some(index) => {
                    entries.remove(index);
                    true
                }
                None => false,
            },
            MultiValues::Primitive(_) => false,
        }
    }

    /// Remove the first scalar equal to `value`.
    pub fn remove_primitive(&mut self, value: &SimpleValue) -> bool {
        match &mut self.values {
            MultiValues::Primitive(values) => match values.iter().position(|v| v == value) {
                Some(index) => {
                    values.remove(index);
                    true
                }
                None => false,
            },
            MultiValues::Complex(_) => false,
        }
    }

    /// Keep the entries for which `keep` returns true. Returns the number removed.
    pub fn retain_entries<F>(&mut self, mut keep: F) -> usize
    where
        F: FnMut(&ComplexAttribute) -> bool,
    {
        match &mut self.values {
            MultiValues::Complex(entries) => {
                let before = entries.len();
                entries.retain(|entry| keep(entry));
                before - entries.len()
            }
            MultiValues::Primitive(_) => 0,
        }
    }

    /// Keep the scalars for which `keep` returns true. Returns the number removed.
    pub fn retain_primitives<F>(&mut self, mut keep: F) -> usize
    where
        F: FnMut(&SimpleValue) -> bool,
    {
        match &mut self.values {
            MultiValues::Primitive(values) => {
                let before = values.len();
                values.retain(|value| keep(value));
                before - values.len()
            }
            MultiValues::Complex(_) => 0,
        }
    }

    /// Replace all values with those of `other`.
    pub fn replace_values(&mut self, other: MultiValuedAttribute) {
        self.values = other.values;
    }

    /// Leave at most one entry marked primary; the last one marked wins.
    pub fn ensure_single_primary(&mut self) {
        let MultiValues::Complex(entries) = &mut self.values else {
            return;
        };
        let Some(winner) = entries.iter().rposition(|entry| entry.is_primary()) else {
            return;
        };
        for (index, entry) in entries.iter_mut().enumerate() {
            if index == winner || !entry.is_primary() {
                continue;
            }
            if let Some(AttributeValue::Simple(primary)) = entry.get_mut("primary") {
                primary.set_value(SimpleValue::Boolean(false));
            }
        }
    }

    /// Fully independent structural copy.
    pub fn deep_copy(&self) -> Self {
        let values = match &self.values {
            MultiValues::Primitive(values) => MultiValues::Primitive(values.clone()),
            MultiValues::Complex(entries) => {
                MultiValues::Complex(entries.iter().map(ComplexAttribute::deep_copy).collect())
            }
        };
        Self {
            characteristics: self.characteristics.clone(),
            values,
        }
    }

    /// Wire representation.
    pub fn to_json(&self) -> Value {
        match &self.values {
            MultiValues::Primitive(values) => {
                Value::Array(values.iter().map(SimpleValue::to_json).collect())
            }
            MultiValues::Complex(entries) => {
                Value::Array(entries.iter().map(ComplexAttribute::to_json).collect())
            }
        }
    }

    fn mixed_error(&self) -> ScimError {
        ScimError::invalid_value(format!(
            "Attribute '{}' cannot mix primitive and complex values",
            self.characteristics.name
        ))
    }
}

impl Clone for MultiValuedAttribute {
    fn clone(&self) -> Self {
        self.deep_copy()
    }
}
