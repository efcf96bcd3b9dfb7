//! The resource attribute tree.

use super::version::ResourceVersion;
use crate::attribute::value::AttributeCharacteristics;
use crate::attribute::{
    AttributeValue, ComplexAttribute, SimpleAttribute, SimpleValue, insert_attribute, position_of,
};
use crate::error::{ScimError, ScimResult};
use crate::schema::common::{
    self, EXTERNAL_ID, ID, META, META_CREATED, META_LAST_MODIFIED, META_LOCATION,
    META_RESOURCE_TYPE, META_VERSION,
};
use crate::schema::types::find_definition;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde_json::{Map, Value};

/// A SCIM resource: ordered attributes plus the schema URIs it references.
///
/// Attribute names are unique and looked up case-insensitively. The schema list is
/// kept free of duplicates in first-seen order.
#[derive(Debug, Default, PartialEq)]
pub struct Resource {
    schemas: Vec<String>,
    attributes: IndexMap<String, AttributeValue>,
}

impl Resource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty resource referencing `schema`.
    pub fn with_schema(schema: impl Into<String>) -> Self {
        let mut resource = Self::new();
        resource.add_schema(schema);
        resource
    }

    pub fn schemas(&self) -> &[String] {
        &self.schemas
    }

    pub fn has_schema(&self, uri: &str) -> bool {
        self.schemas.iter().any(|schema| schema.eq_ignore_ascii_case(uri))
    }

    /// Reference a schema URI. Returns false when it was already referenced.
    pub fn add_schema(&mut self, uri: impl Into<String>) -> bool {
        let uri = uri.into();
        if self.has_schema(&uri) {
            return false;
        }
        self.schemas.push(uri);
        true
    }

    pub fn remove_schema(&mut self, uri: &str) -> bool {
        let before = self.schemas.len();
        self.schemas.retain(|schema| !schema.eq_ignore_ascii_case(uri));
        before != self.schemas.len()
    }

    pub fn attributes(&self) -> &IndexMap<String, AttributeValue> {
        &self.attributes
    }

    pub fn iter(&self) -> impl Iterator<Item = &AttributeValue> {
        self.attributes.values()
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        position_of(&self.attributes, name).is_some()
    }

    pub fn attribute(&self, name: &str) -> Option<&AttributeValue> {
        position_of(&self.attributes, name)
            .and_then(|index| self.attributes.get_index(index))
            .map(|(_, value)| value)
    }

    pub fn attribute_mut(&mut self, name: &str) -> Option<&mut AttributeValue> {
        position_of(&self.attributes, name)
            .and_then(|index| self.attributes.get_index_mut(index))
            .map(|(_, value)| value)
    }

    /// Add an attribute unless one of the same name is present.
    /// Returns whether the attribute was added.
    pub fn set_attribute(&mut self, attribute: AttributeValue) -> bool {
        if self.contains(attribute.name()) {
            return false;
        }
        insert_attribute(&mut self.attributes, attribute);
        true
    }

    /// Insert or overwrite an attribute, keeping its position when overwriting.
    pub fn replace_attribute(&mut self, attribute: AttributeValue) -> Option<AttributeValue> {
        insert_attribute(&mut self.attributes, attribute)
    }

    pub fn remove_attribute(&mut self, name: &str) -> Option<AttributeValue> {
        position_of(&self.attributes, name)
            .and_then(|index| self.attributes.shift_remove_index(index))
            .map(|(_, value)| value)
    }

    /// String value of a top-level simple attribute.
    pub fn string_value(&self, name: &str) -> Option<&str> {
        self.attribute(name)
            .and_then(AttributeValue::as_simple)
            .and_then(|simple| simple.value().as_str())
    }

    pub fn id(&self) -> Option<&str> {
        self.string_value(ID)
    }

    /// Set `id`. Fails once an id is present.
    pub fn set_id(&mut self, id: impl Into<String>) -> ScimResult<()> {
        if self.id().is_some() {
            return Err(ScimError::AttributeReadOnly {
                attribute: ID.to_string(),
            });
        }
        let characteristics = self.common_characteristics(&common::id_attribute());
        self.replace_attribute(AttributeValue::Simple(SimpleAttribute::with_characteristics(
            characteristics,
            SimpleValue::String(id.into()),
        )));
        Ok(())
    }

    pub fn external_id(&self) -> Option<&str> {
        self.string_value(EXTERNAL_ID)
    }

    pub fn set_external_id(&mut self, external_id: impl Into<String>) {
        let characteristics = self.common_characteristics(&common::external_id_attribute());
        self.replace_attribute(AttributeValue::Simple(SimpleAttribute::with_characteristics(
            characteristics,
            SimpleValue::String(external_id.into()),
        )));
    }

    pub fn meta(&self) -> Option<&ComplexAttribute> {
        self.attribute(META).and_then(AttributeValue::as_complex)
    }

    /// The `meta` attribute, created empty on first access.
    pub fn meta_mut(&mut self) -> &mut ComplexAttribute {
        let characteristics = self.common_characteristics(&common::meta_attribute());
        let key = self
            .attributes
            .keys()
            .find(|key| key.eq_ignore_ascii_case(META))
            .cloned()
            .unwrap_or_else(|| META.to_string());
        let slot = self.attributes.entry(key).or_insert_with(|| {
            AttributeValue::Complex(ComplexAttribute::with_characteristics(characteristics.clone()))
        });
        complex_slot(slot, characteristics)
    }

    fn meta_value(&self, name: &str) -> Option<&SimpleValue> {
        self.meta().and_then(|meta| meta.simple_value(name))
    }

    pub fn resource_type(&self) -> Option<&str> {
        self.meta_value(META_RESOURCE_TYPE).and_then(SimpleValue::as_str)
    }

    /// Set `meta.resourceType`. Fails once a value is present.
    pub fn set_resource_type(&mut self, resource_type: impl Into<String>) -> ScimResult<()> {
        self.set_meta_once(META_RESOURCE_TYPE, SimpleValue::String(resource_type.into()))
    }

    pub fn created(&self) -> Option<&DateTime<Utc>> {
        self.meta_value(META_CREATED).and_then(SimpleValue::as_date_time)
    }

    /// Set `meta.created`. Fails once a value is present.
    pub fn set_created(&mut self, created: DateTime<Utc>) -> ScimResult<()> {
        self.set_meta_once(META_CREATED, SimpleValue::DateTime(created))
    }

    pub fn last_modified(&self) -> Option<&DateTime<Utc>> {
        self.meta_value(META_LAST_MODIFIED).and_then(SimpleValue::as_date_time)
    }

    pub fn set_last_modified(&mut self, last_modified: DateTime<Utc>) {
        self.set_meta(META_LAST_MODIFIED, SimpleValue::DateTime(last_modified));
    }

    pub fn location(&self) -> Option<&str> {
        self.meta_value(META_LOCATION).and_then(SimpleValue::as_str)
    }

    pub fn set_location(&mut self, location: impl Into<String>) {
        self.set_meta(META_LOCATION, SimpleValue::Reference(location.into()));
    }

    /// `meta.version`, a weak entity tag.
    pub fn version(&self) -> Option<&str> {
        self.meta_value(META_VERSION).and_then(SimpleValue::as_str)
    }

    pub fn set_version(&mut self, version: &ResourceVersion) {
        self.set_meta(META_VERSION, SimpleValue::String(version.to_etag()));
    }

    /// Mark the resource as modified at `now`: sets `meta.lastModified` and
    /// recomputes `meta.version` from the encoded body without its old version.
    pub fn touch(&mut self, now: DateTime<Utc>) -> ResourceVersion {
        self.set_last_modified(now);
        self.meta_mut().remove(META_VERSION);
        let version = ResourceVersion::from_content(self.to_json().to_string().as_bytes());
        self.set_version(&version);
        version
    }

    fn set_meta_once(&mut self, name: &str, value: SimpleValue) -> ScimResult<()> {
        if self.meta_value(name).is_some() {
            return Err(ScimError::AttributeReadOnly {
                attribute: format!("{}.{}", META, name),
            });
        }
        self.set_meta(name, value);
        Ok(())
    }

    fn set_meta(&mut self, name: &str, value: SimpleValue) {
        let definition = common::meta_attribute();
        let characteristics = find_definition(&definition.sub_attributes, name)
            .map(|sub| self.common_characteristics(sub))
            .unwrap_or_else(|| AttributeCharacteristics::untyped(name, value.data_type(), false));
        self.meta_mut()
            .insert(AttributeValue::Simple(SimpleAttribute::with_characteristics(
                characteristics,
                value,
            )));
    }

    /// Characteristics of a common attribute, owned by the resource's core schema.
    fn common_characteristics(
        &self,
        definition: &crate::schema::types::AttributeDefinition,
    ) -> AttributeCharacteristics {
        let mut characteristics = AttributeCharacteristics::from_definition(definition);
        characteristics.schema_uri = self.schemas.first().cloned();
        characteristics
    }

    /// Fully independent structural copy.
    pub fn deep_copy(&self) -> Self {
        Self {
            schemas: self.schemas.clone(),
            attributes: self
                .attributes
                .iter()
                .map(|(name, value)| (name.clone(), value.deep_copy()))
                .collect(),
        }
    }

    /// Wire representation: `schemas` first, then the attributes in order.
    pub fn to_json(&self) -> Value {
        let mut object = Map::with_capacity(self.attributes.len() + 1);
        object.insert(
            "schemas".to_string(),
            Value::Array(self.schemas.iter().cloned().map(Value::String).collect()),
        );
        for (name, value) in &self.attributes {
            object.insert(name.clone(), value.to_json());
        }
        Value::Object(object)
    }

    /// Split into the schema list and the attributes.
    pub fn into_parts(self) -> (Vec<String>, IndexMap<String, AttributeValue>) {
        (self.schemas, self.attributes)
    }

    pub(crate) fn attributes_mut(&mut self) -> &mut IndexMap<String, AttributeValue> {
        &mut self.attributes
    }
}

/// The complex value in `slot`, replacing any other shape with an empty one.
fn complex_slot(
    slot: &mut AttributeValue,
    characteristics: AttributeCharacteristics,
) -> &mut ComplexAttribute {
    match slot {
        AttributeValue::Complex(complex) => complex,
        _ => {
            *slot = AttributeValue::Complex(ComplexAttribute::with_characteristics(
                characteristics.clone(),
            ));
            complex_slot(slot, characteristics)
        }
    }
}

impl Clone for Resource {
    fn clone(&self) -> Self {
        self.deep_copy()
    }
}
