//! Scalar values, attribute characteristics and the attribute sum type.

use super::complex::ComplexAttribute;
use super::multi_valued::MultiValuedAttribute;
use crate::error::{ScimError, ScimResult};
use crate::schema::types::{AttributeDefinition, AttributeType, Mutability, Returned, Uniqueness};

use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use serde_json::Value;

/// A single scalar of one of the SCIM primitive types.
#[derive(Debug, Clone, PartialEq)]
pub enum SimpleValue {
    String(String),
    Boolean(bool),
    Decimal(f64),
    Integer(i64),
    /// Normalized to an instant in UTC
    DateTime(DateTime<Utc>),
    Binary(Vec<u8>),
    Reference(String),
}

impl SimpleValue {
    /// The SCIM data type this value carries.
    pub fn data_type(&self) -> AttributeType {
        match self {
            SimpleValue::String(_) => AttributeType::String,
            SimpleValue::Boolean(_) => AttributeType::Boolean,
            SimpleValue::Decimal(_) => AttributeType::Decimal,
            SimpleValue::Integer(_) => AttributeType::Integer,
            SimpleValue::DateTime(_) => AttributeType::DateTime,
            SimpleValue::Binary(_) => AttributeType::Binary,
            SimpleValue::Reference(_) => AttributeType::Reference,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            SimpleValue::String(s) | SimpleValue::Reference(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            SimpleValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            SimpleValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            SimpleValue::Decimal(d) => Some(*d),
            SimpleValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_date_time(&self) -> Option<&DateTime<Utc>> {
        match self {
            SimpleValue::DateTime(dt) => Some(dt),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            SimpleValue::Binary(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// Wire representation.
    pub fn to_json(&self) -> Value {
        match self {
            SimpleValue::String(s) | SimpleValue::Reference(s) => Value::String(s.clone()),
            SimpleValue::Boolean(b) => Value::Bool(*b),
            SimpleValue::Decimal(d) => serde_json::Number::from_f64(*d)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            SimpleValue::Integer(i) => Value::from(*i),
            SimpleValue::DateTime(dt) => {
                Value::String(dt.to_rfc3339_opts(SecondsFormat::AutoSi, true))
            }
            SimpleValue::Binary(bytes) => Value::String(BASE64.encode(bytes)),
        }
    }

    /// Coerce a wire scalar to `data_type`.
    pub fn from_json(attribute: &str, data_type: AttributeType, value: &Value) -> ScimResult<Self> {
        let fail = |details: String| ScimError::conversion(attribute, data_type.as_str(), details);
        match (data_type, value) {
            (AttributeType::String, Value::String(s)) => Ok(SimpleValue::String(s.clone())),
            (AttributeType::Reference, Value::String(s)) => Ok(SimpleValue::Reference(s.clone())),
            (AttributeType::Boolean, Value::Bool(b)) => Ok(SimpleValue::Boolean(*b)),
            (AttributeType::Integer, Value::Number(n)) => n
                .as_i64()
                .map(SimpleValue::Integer)
                .ok_or_else(|| fail(format!("'{}' is not an integer", n))),
            (AttributeType::Decimal, Value::Number(n)) => n
                .as_f64()
                .map(SimpleValue::Decimal)
                .ok_or_else(|| fail(format!("'{}' is not a decimal", n))),
            (_, Value::String(s)) => SimpleValue::String(s.clone()).coerce(attribute, data_type),
            (AttributeType::Complex, _) => Err(fail("complex values have no scalar form".into())),
            (_, other) => Err(fail(format!("unexpected JSON value {}", other))),
        }
    }

    /// Convert this value to `data_type`, parsing string forms where needed.
    pub fn coerce(self, attribute: &str, data_type: AttributeType) -> ScimResult<Self> {
        if self.data_type() == data_type {
            return Ok(self);
        }
        let fail = |details: String| ScimError::conversion(attribute, data_type.as_str(), details);
        match (self, data_type) {
            (SimpleValue::String(s), AttributeType::Reference) => Ok(SimpleValue::Reference(s)),
            (SimpleValue::Reference(s), AttributeType::String) => Ok(SimpleValue::String(s)),
            (SimpleValue::Integer(i), AttributeType::Decimal) => Ok(SimpleValue::Decimal(i as f64)),
            (SimpleValue::String(s), AttributeType::Boolean) => {
                if s.eq_ignore_ascii_case("true") {
                    Ok(SimpleValue::Boolean(true))
                } else if s.eq_ignore_ascii_case("false") {
                    Ok(SimpleValue::Boolean(false))
                } else {
                    Err(fail(format!("'{}' is not a boolean", s)))
                }
            }
            (SimpleValue::String(s), AttributeType::Integer) => s
                .trim()
                .parse::<i64>()
                .map(SimpleValue::Integer)
                .map_err(|e| fail(format!("'{}': {}", s, e))),
            (SimpleValue::String(s), AttributeType::Decimal) => match s.trim().parse::<f64>() {
                Ok(d) if d.is_finite() => Ok(SimpleValue::Decimal(d)),
                _ => Err(fail(format!("'{}' is not a decimal", s))),
            },
            (SimpleValue::String(s), AttributeType::DateTime) => parse_date_time(&s)
                .map(SimpleValue::DateTime)
                .ok_or_else(|| fail(format!("'{}' is not an ISO-8601 date-time", s))),
            (SimpleValue::String(s), AttributeType::Binary) => BASE64
                .decode(s.as_bytes())
                .map(SimpleValue::Binary)
                .map_err(|e| fail(format!("invalid base64: {}", e))),
            (other, _) => Err(fail(format!(
                "cannot convert a {} value",
                other.data_type().as_str()
            ))),
        }
    }

    /// Equality used by filters: strings compare case-insensitively unless `case_exact`.
    pub fn equals(&self, other: &SimpleValue, case_exact: bool) -> bool {
        match (self, other) {
            (
                SimpleValue::String(a) | SimpleValue::Reference(a),
                SimpleValue::String(b) | SimpleValue::Reference(b),
            ) => {
                if case_exact {
                    a == b
                } else {
                    a.eq_ignore_ascii_case(b)
                }
            }
            (SimpleValue::Integer(a), SimpleValue::Decimal(b))
            | (SimpleValue::Decimal(b), SimpleValue::Integer(a)) => (*a as f64) == *b,
            (a, b) => a == b,
        }
    }
}

/// Parse an ISO-8601 date-time: a local form without offset first (read as UTC),
/// then an RFC 3339 form with offset.
pub fn parse_date_time(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(local) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(local.and_utc());
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Schema facts stamped onto every attribute value by the factory.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeCharacteristics {
    /// Attribute name as declared in the schema
    pub name: String,
    /// Owning schema URI; `None` for untyped attributes
    pub schema_uri: Option<String>,
    pub data_type: AttributeType,
    pub multi_valued: bool,
    pub required: bool,
    pub case_exact: bool,
    pub mutability: Mutability,
    pub returned: Returned,
    pub uniqueness: Uniqueness,
    /// Declared sub-attribute schemas for complex values
    pub sub_attributes: Vec<AttributeDefinition>,
}

impl AttributeCharacteristics {
    /// Characteristics for an attribute no schema declares.
    pub fn untyped(name: impl Into<String>, data_type: AttributeType, multi_valued: bool) -> Self {
        Self {
            name: name.into(),
            schema_uri: None,
            data_type,
            multi_valued,
            required: false,
            case_exact: false,
            mutability: Mutability::ReadWrite,
            returned: Returned::Default,
            uniqueness: Uniqueness::None,
            sub_attributes: Vec::new(),
        }
    }

    /// Characteristics taken from a schema definition.
    pub fn from_definition(definition: &AttributeDefinition) -> Self {
        Self {
            name: definition.name.clone(),
            schema_uri: Some(definition.uri.clone()),
            data_type: definition.data_type,
            multi_valued: definition.multi_valued,
            required: definition.required,
            case_exact: definition.case_exact,
            mutability: definition.mutability,
            returned: definition.returned,
            uniqueness: definition.uniqueness,
            sub_attributes: definition.sub_attributes.clone(),
        }
    }

    /// Whether a schema stamped these characteristics.
    pub fn is_typed(&self) -> bool {
        self.schema_uri.is_some()
    }
}

/// A named scalar attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct SimpleAttribute {
    characteristics: AttributeCharacteristics,
    value: SimpleValue,
}

impl SimpleAttribute {
    /// Untyped attribute holding `value`.
    pub fn new(name: impl Into<String>, value: SimpleValue) -> Self {
        let characteristics = AttributeCharacteristics::untyped(name, value.data_type(), false);
        Self {
            characteristics,
            value,
        }
    }

    pub(crate) fn with_characteristics(
        characteristics: AttributeCharacteristics,
        value: SimpleValue,
    ) -> Self {
        Self {
            characteristics,
            value,
        }
    }

    pub fn characteristics(&self) -> &AttributeCharacteristics {
        &self.characteristics
    }

    pub fn value(&self) -> &SimpleValue {
        &self.value
    }

    pub fn set_value(&mut self, value: SimpleValue) {
        self.value = value;
    }

    pub fn into_value(self) -> SimpleValue {
        self.value
    }
}

/// An attribute of a resource: one scalar, a set of sub-attributes, or a list.
#[derive(Debug, PartialEq)]
pub enum AttributeValue {
    Simple(SimpleAttribute),
    Complex(ComplexAttribute),
    MultiValued(MultiValuedAttribute),
}

impl AttributeValue {
    /// Untyped simple attribute.
    pub fn simple(name: impl Into<String>, value: SimpleValue) -> Self {
        AttributeValue::Simple(SimpleAttribute::new(name, value))
    }

    /// Untyped string attribute.
    pub fn string(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::simple(name, SimpleValue::String(value.into()))
    }

    pub fn name(&self) -> &str {
        &self.characteristics().name
    }

    pub fn characteristics(&self) -> &AttributeCharacteristics {
        match self {
            AttributeValue::Simple(simple) => simple.characteristics(),
            AttributeValue::Complex(complex) => complex.characteristics(),
            AttributeValue::MultiValued(multi) => multi.characteristics(),
        }
    }

    pub(crate) fn set_characteristics(&mut self, characteristics: AttributeCharacteristics) {
        match self {
            AttributeValue::Simple(simple) => simple.characteristics = characteristics,
            AttributeValue::Complex(complex) => complex.set_characteristics(characteristics),
            AttributeValue::MultiValued(multi) => multi.set_characteristics(characteristics),
        }
    }

    pub fn as_simple(&self) -> Option<&SimpleAttribute> {
        match self {
            AttributeValue::Simple(simple) => Some(simple),
            _ => None,
        }
    }

    pub fn as_simple_mut(&mut self) -> Option<&mut SimpleAttribute> {
        match self {
            AttributeValue::Simple(simple) => Some(simple),
            _ => None,
        }
    }

    pub fn as_complex(&self) -> Option<&ComplexAttribute> {
        match self {
            AttributeValue::Complex(complex) => Some(complex),
            _ => None,
        }
    }

    pub fn as_complex_mut(&mut self) -> Option<&mut ComplexAttribute> {
        match self {
            AttributeValue::Complex(complex) => Some(complex),
            _ => None,
        }
    }

    pub fn as_multi_valued(&self) -> Option<&MultiValuedAttribute> {
        match self {
            AttributeValue::MultiValued(multi) => Some(multi),
            _ => None,
        }
    }

    pub fn as_multi_valued_mut(&mut self) -> Option<&mut MultiValuedAttribute> {
        match self {
            AttributeValue::MultiValued(multi) => Some(multi),
            _ => None,
        }
    }

    /// A complex attribute without sub-attributes or a list without values.
    pub fn is_value_less(&self) -> bool {
        match self {
            AttributeValue::Simple(_) => false,
            AttributeValue::Complex(complex) => complex.is_empty(),
            AttributeValue::MultiValued(multi) => multi.is_empty(),
        }
    }

    /// Fully independent structural copy.
    pub fn deep_copy(&self) -> Self {
        match self {
            AttributeValue::Simple(simple) => AttributeValue::Simple(simple.clone()),
            AttributeValue::Complex(complex) => AttributeValue::Complex(complex.deep_copy()),
            AttributeValue::MultiValued(multi) => AttributeValue::MultiValued(multi.deep_copy()),
        }
    }

    /// Wire representation.
    pub fn to_json(&self) -> Value {
        match self {
            AttributeValue::Simple(simple) => simple.value().to_json(),
            AttributeValue::Complex(complex) => complex.to_json(),
            AttributeValue::MultiValued(multi) => multi.to_json(),
        }
    }
}

impl Clone for AttributeValue {
    fn clone(&self) -> Self {
        self.deep_copy()
    }
}
