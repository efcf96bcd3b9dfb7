//! PATCH path expressions.
//!
//! A path is a dotted chain of attribute names, optionally qualified by a schema
//! URI, with at most one bracketed value filter on any segment:
//!
//! ```text
//! name.givenName
//! emails[type eq "work"].value
//! urn:ietf:params:scim:schemas:extension:enterprise:2.0:User:manager.value
//! ```
//!
//! Parsing yields an [`AttributePath`]. When the path is qualified by an extension
//! URI, the URI is the first segment, matching how extensions are stored on a
//! resource.

use crate::attribute::{AttributeValue, ComplexAttribute, SimpleValue};
use crate::error::{ScimError, ScimResult};
use crate::schema::resource_type::{ResourceTypeSchema, SchemaPrefix};

use std::fmt;
use std::str::FromStr;

/// Comparison operators of the SCIM filter grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterOperator {
    Eq,
    Ne,
    Co,
    Sw,
    Ew,
    Gt,
    Ge,
    Lt,
    Le,
    Pr,
}

impl FilterOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOperator::Eq => "eq",
            FilterOperator::Ne => "ne",
            FilterOperator::Co => "co",
            FilterOperator::Sw => "sw",
            FilterOperator::Ew => "ew",
            FilterOperator::Gt => "gt",
            FilterOperator::Ge => "ge",
            FilterOperator::Lt => "lt",
            FilterOperator::Le => "le",
            FilterOperator::Pr => "pr",
        }
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterOperator {
    type Err = ScimError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.to_ascii_lowercase().as_str() {
            "eq" => Ok(FilterOperator::Eq),
            "ne" => Ok(FilterOperator::Ne),
            "co" => Ok(FilterOperator::Co),
            "sw" => Ok(FilterOperator::Sw),
            "ew" => Ok(FilterOperator::Ew),
            "gt" => Ok(FilterOperator::Gt),
            "ge" => Ok(FilterOperator::Ge),
            "lt" => Ok(FilterOperator::Lt),
            "le" => Ok(FilterOperator::Le),
            "pr" => Ok(FilterOperator::Pr),
            other => Err(ScimError::invalid_filter(format!(
                "Unknown filter operator '{}'",
                other
            ))),
        }
    }
}

/// Comparison value of a filter.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    String(String),
    Boolean(bool),
    Integer(i64),
    Decimal(f64),
    Null,
}

impl FilterValue {
    /// Equality against an attribute value. Strings are coerced to the value's type
    /// first, so date-times compare as instants.
    pub fn equals(&self, actual: &SimpleValue, case_exact: bool) -> bool {
        match self {
            FilterValue::Null => false,
            FilterValue::Boolean(expected) => actual.as_bool() == Some(*expected),
            FilterValue::Integer(expected) => SimpleValue::Integer(*expected).equals(actual, true),
            FilterValue::Decimal(expected) => SimpleValue::Decimal(*expected).equals(actual, true),
            FilterValue::String(expected) => match actual {
                SimpleValue::String(_) | SimpleValue::Reference(_) => {
                    actual.equals(&SimpleValue::String(expected.clone()), case_exact)
                }
                other => SimpleValue::String(expected.clone())
                    .coerce("filter", other.data_type())
                    .map(|coerced| coerced.equals(other, true))
                    .unwrap_or(false),
            },
        }
    }
}

/// A parsed filter expression.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterExpression {
    /// `attribute op value`; `pr` carries [`FilterValue::Null`]
    Comparison {
        attribute: String,
        operator: FilterOperator,
        value: FilterValue,
    },
    /// An `and`/`or`/`not` or grouped expression, kept as written
    Logical(String),
}

impl FilterExpression {
    /// Fail unless this expression can be evaluated against PATCH targets, which
    /// requires a single `eq` comparison.
    pub fn ensure_supported(&self) -> ScimResult<()> {
        match self {
            FilterExpression::Comparison {
                operator: FilterOperator::Eq,
                ..
            } => Ok(()),
            FilterExpression::Comparison { operator, .. } => Err(ScimError::not_implemented(
                format!("Filter operator '{}' is not supported in PATCH paths", operator),
            )),
            FilterExpression::Logical(expression) => Err(ScimError::not_implemented(format!(
                "Logical filter expressions are not supported in PATCH paths: {}",
                expression
            ))),
        }
    }

    /// Whether a complex entry satisfies the filter.
    pub fn matches_entry(&self, entry: &ComplexAttribute) -> ScimResult<bool> {
        self.ensure_supported()?;
        let FilterExpression::Comparison {
            attribute, value, ..
        } = self
        else {
            return Ok(false);
        };
        let mut current = entry;
        let mut names = attribute.split('.').peekable();
        while let Some(name) = names.next() {
            let Some(found) = current.get(name) else {
                return Ok(false);
            };
            if names.peek().is_some() {
                match found.as_complex() {
                    Some(complex) => current = complex,
                    None => return Ok(false),
                }
                continue;
            }
            return Ok(match found {
                AttributeValue::Simple(simple) => {
                    value.equals(simple.value(), simple.characteristics().case_exact)
                }
                AttributeValue::MultiValued(multi) => multi
                    .primitives()
                    .iter()
                    .any(|primitive| value.equals(primitive, multi.characteristics().case_exact)),
                AttributeValue::Complex(_) => false,
            });
        }
        Ok(false)
    }

    /// Whether a primitive entry satisfies the filter. Primitives are addressed as `value`.
    pub fn matches_primitive(&self, primitive: &SimpleValue, case_exact: bool) -> ScimResult<bool> {
        self.ensure_supported()?;
        Ok(match self {
            FilterExpression::Comparison {
                attribute, value, ..
            } if attribute.eq_ignore_ascii_case("value") => value.equals(primitive, case_exact),
            _ => false,
        })
    }
}

/// A filter attached to one path segment.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueFilter {
    /// Index of the segment the filter qualifies
    pub segment: usize,
    pub expression: FilterExpression,
}

/// A parsed PATCH path.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributePath {
    raw: String,
    segments: Vec<String>,
    filter: Option<ValueFilter>,
}

impl AttributePath {
    /// Parse without schema knowledge. A `urn:` prefix is split at its last colon
    /// and kept as the first segment.
    pub fn parse(raw: &str) -> ScimResult<Self> {
        let trimmed = raw.trim();
        if is_urn(trimmed) {
            let head_end = trimmed.find('[').unwrap_or(trimmed.len());
            if let Some(split) = trimmed[..head_end].rfind(':') {
                return Self::build(trimmed, Some(&trimmed[..split]), &trimmed[split + 1..]);
            }
        }
        Self::build(trimmed, None, trimmed)
    }

    /// Parse against a resource type schema. The core URI is dropped; an extension
    /// URI becomes the first segment, and a bare extension URI addresses the
    /// whole extension.
    pub fn parse_with_schema(raw: &str, schema: &ResourceTypeSchema) -> ScimResult<Self> {
        let trimmed = raw.trim();
        match schema.match_schema_prefix(trimmed) {
            SchemaPrefix::Unqualified(rest) if is_urn(rest) => Err(ScimError::no_target(format!(
                "Path '{}' names a schema unknown to resource type '{}'",
                trimmed,
                schema.name()
            ))),
            SchemaPrefix::Unqualified(rest) | SchemaPrefix::Core(rest) => {
                Self::build(trimmed, None, rest)
            }
            SchemaPrefix::Extension { uri, rest } => Self::build(trimmed, Some(uri), rest),
        }
    }

    fn build(raw: &str, uri: Option<&str>, rest: &str) -> ScimResult<Self> {
        if raw.is_empty() {
            return Err(ScimError::invalid_path("PATCH path is empty"));
        }
        let mut segments = Vec::new();
        let mut filter = None;
        if let Some(uri) = uri {
            segments.push(uri.to_string());
            if rest.is_empty() {
                return Ok(Self {
                    raw: raw.to_string(),
                    segments,
                    filter,
                });
            }
        }

        for part in split_top_level(raw, rest)? {
            let (name, filter_text) = match part.find('[') {
                Some(open) if part.ends_with(']') => (&part[..open], Some(&part[open + 1..part.len() - 1])),
                Some(_) => {
                    return Err(ScimError::invalid_path(format!(
                        "Unexpected text after filter in path '{}'",
                        raw
                    )));
                }
                None => (part, None),
            };
            validate_name(raw, name)?;
            if let Some(text) = filter_text {
                if filter.is_some() {
                    return Err(ScimError::invalid_path(format!(
                        "Path '{}' may carry only one filter",
                        raw
                    )));
                }
                filter = Some(ValueFilter {
                    segment: segments.len(),
                    expression: parse_filter(text)?,
                });
            }
            segments.push(name.to_string());
        }

        Ok(Self {
            raw: raw.to_string(),
            segments,
            filter,
        })
    }

    /// Attribute names, one per level.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    pub fn filter(&self) -> Option<&ValueFilter> {
        self.filter.as_ref()
    }

    /// Filter on the segment at `index`, if any.
    pub fn filter_at(&self, index: usize) -> Option<&FilterExpression> {
        self.filter
            .as_ref()
            .filter(|filter| filter.segment == index)
            .map(|filter| &filter.expression)
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl fmt::Display for AttributePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl FromStr for AttributePath {
    type Err = ScimError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Self::parse(raw)
    }
}

fn is_urn(raw: &str) -> bool {
    raw.get(..4)
        .is_some_and(|head| head.eq_ignore_ascii_case("urn:"))
}

/// Split at dots outside brackets and quoted strings.
fn split_top_level<'a>(raw: &str, text: &'a str) -> ScimResult<Vec<&'a str>> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut in_bracket = false;
    let mut in_quote = false;
    let mut escaped = false;

    for (index, c) in text.char_indices() {
        if in_quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_quote = false;
            }
            continue;
        }
        match c {
            '"' if in_bracket => in_quote = true,
            '[' if in_bracket => {
                return Err(ScimError::invalid_filter(format!(
                    "Nested filter in path '{}'",
                    raw
                )));
            }
            '[' => in_bracket = true,
            ']' if !in_bracket => {
                return Err(ScimError::invalid_path(format!("Unbalanced ']' in path '{}'", raw)));
            }
            ']' => in_bracket = false,
            '.' if !in_bracket => {
                parts.push(&text[start..index]);
                start = index + 1;
            }
            _ => {}
        }
    }
    if in_bracket || in_quote {
        return Err(ScimError::invalid_filter(format!(
            "Unterminated filter in path '{}'",
            raw
        )));
    }
    parts.push(&text[start..]);
    Ok(parts)
}

fn validate_name(raw: &str, name: &str) -> ScimResult<()> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '$' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        }
        _ => false,
    };
    if valid {
        Ok(())
    } else {
        Err(ScimError::invalid_path(format!(
            "Invalid attribute name '{}' in path '{}'",
            name, raw
        )))
    }
}

/// Parse the text between brackets.
fn parse_filter(text: &str) -> ScimResult<FilterExpression> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ScimError::invalid_filter("Filter expression is empty"));
    }
    if text.starts_with('(') || starts_with_keyword(text, "not") {
        return Ok(FilterExpression::Logical(text.to_string()));
    }

    let (attribute, rest) = take_token(text);
    if attribute
        .split('.')
        .any(|name| validate_name(text, name).is_err())
    {
        return Err(ScimError::invalid_filter(format!(
            "Invalid filter attribute '{}'",
            attribute
        )));
    }

    let (operator, rest) = take_token(rest.trim_start());
    if operator.is_empty() {
        return Err(ScimError::invalid_filter(format!(
            "Filter '{}' has no operator",
            text
        )));
    }
    let operator = FilterOperator::from_str(operator)?;

    let (value, rest) = if operator == FilterOperator::Pr {
        (FilterValue::Null, rest)
    } else {
        parse_filter_value(rest.trim_start())?
    };

    let rest = rest.trim();
    if rest.is_empty() {
        Ok(FilterExpression::Comparison {
            attribute: attribute.to_string(),
            operator,
            value,
        })
    } else if starts_with_keyword(rest, "and") || starts_with_keyword(rest, "or") {
        Ok(FilterExpression::Logical(text.to_string()))
    } else {
        Err(ScimError::invalid_filter(format!(
            "Unexpected '{}' in filter '{}'",
            rest, text
        )))
    }
}

fn parse_filter_value(text: &str) -> ScimResult<(FilterValue, &str)> {
    if text.starts_with('"') {
        let mut escaped = false;
        for (index, c) in text.char_indices().skip(1) {
            if escaped {
                escaped = false;
                continue;
            }
            match c {
                '\\' => escaped = true,
                '"' => {
                    let literal: String = serde_json::from_str(&text[..=index]).map_err(|e| {
                        ScimError::invalid_filter(format!("Invalid string in filter: {}", e))
                    })?;
                    return Ok((FilterValue::String(literal), &text[index + 1..]));
                }
                _ => {}
            }
        }
        return Err(ScimError::invalid_filter("Unterminated string in filter"));
    }

    let (token, rest) = take_token(text);
    let value = if token.eq_ignore_ascii_case("true") {
        FilterValue::Boolean(true)
    } else if token.eq_ignore_ascii_case("false") {
        FilterValue::Boolean(false)
    } else if token.eq_ignore_ascii_case("null") {
        FilterValue::Null
    } else if let Ok(integer) = token.parse::<i64>() {
        FilterValue::Integer(integer)
    } else {
        match token.parse::<f64>() {
            Ok(decimal) if decimal.is_finite() => FilterValue::Decimal(decimal),
            _ => {
                return Err(ScimError::invalid_filter(format!(
                    "Invalid comparison value '{}'",
                    token
                )));
            }
        }
    };
    Ok((value, rest))
}

fn take_token(text: &str) -> (&str, &str) {
    match text.find(char::is_whitespace) {
        Some(end) => (&text[..end], &text[end..]),
        None => (text, ""),
    }
}

fn starts_with_keyword(text: &str, keyword: &str) -> bool {
    text.get(..keyword.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(keyword))
        && text[keyword.len()..]
            .chars()
            .next()
            .is_some_and(|next| next.is_whitespace() || next == '(')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaRegistry;
    use crate::schema::embedded::ENTERPRISE_USER_SCHEMA;

    fn eq(attribute: &str, value: FilterValue) -> FilterExpression {
        FilterExpression::Comparison {
            attribute: attribute.to_string(),
            operator: FilterOperator::Eq,
            value,
        }
    }

    #[test]
    fn test_parse_simple_paths() {
        let path = AttributePath::parse("name.givenName").unwrap();
        assert_eq!(path.segments(), &["name", "givenName"]);
        assert!(path.filter().is_none());
        assert_eq!(AttributePath::parse("userName").unwrap().depth(), 1);
    }

    #[test]
    fn test_parse_filtered_path() {
        let path = AttributePath::parse("emails[type eq \"work\"].value").unwrap();
        assert_eq!(path.segments(), &["emails", "value"]);
        let filter = path.filter().unwrap();
        assert_eq!(filter.segment, 0);
        assert_eq!(filter.expression, eq("type", FilterValue::String("work".into())));
        assert!(path.filter_at(1).is_none());
    }

    #[test]
    fn test_filter_value_may_contain_separators() {
        let path = AttributePath::parse(r#"members[display eq "a.b [x]"]"#).unwrap();
        assert_eq!(path.segments(), &["members"]);
        assert_eq!(
            path.filter().unwrap().expression,
            eq("display", FilterValue::String("a.b [x]".into()))
        );
    }

    #[test]
    fn test_filter_value_kinds() {
        let path = AttributePath::parse("emails[primary eq true]").unwrap();
        assert_eq!(path.filter().unwrap().expression, eq("primary", FilterValue::Boolean(true)));
        let path = AttributePath::parse("x[count eq 3]").unwrap();
        assert_eq!(path.filter().unwrap().expression, eq("count", FilterValue::Integer(3)));
        let path = AttributePath::parse("emails[value pr]").unwrap();
        assert!(matches!(
            path.filter().unwrap().expression,
            FilterExpression::Comparison {
                operator: FilterOperator::Pr,
                ..
            }
        ));
    }

    #[test]
    fn test_logical_filters_are_parsed_but_unsupported() {
        let path = AttributePath::parse("emails[type eq \"work\" and primary eq true]").unwrap();
        let expression = &path.filter().unwrap().expression;
        assert!(matches!(expression, FilterExpression::Logical(_)));
        let err = expression.ensure_supported().unwrap_err();
        assert_eq!(err.code(), "notImplemented");

        let path = AttributePath::parse("emails[value co \"@example\"]").unwrap();
        assert_eq!(
            path.filter().unwrap().expression.ensure_supported().unwrap_err().code(),
            "notImplemented"
        );
    }

    #[test]
    fn test_malformed_paths() {
        assert_eq!(AttributePath::parse("").unwrap_err().code(), "invalidPath");
        assert_eq!(AttributePath::parse("name..givenName").unwrap_err().code(), "invalidPath");
        assert_eq!(AttributePath::parse("emails[type eq \"work\"").unwrap_err().code(), "invalidFilter");
        assert_eq!(AttributePath::parse("emails[type eq work]").unwrap_err().code(), "invalidFilter");
        assert_eq!(AttributePath::parse("emails[type zz \"a\"]").unwrap_err().code(), "invalidFilter");
        assert_eq!(
            AttributePath::parse("a[x eq 1].b[y eq 2]").unwrap_err().code(),
            "invalidPath"
        );
        assert_eq!(AttributePath::parse("user name").unwrap_err().code(), "invalidPath");
    }

    #[test]
    fn test_parse_urn_without_schema() {
        let path = AttributePath::parse(
            "urn:ietf:params:scim:schemas:extension:enterprise:2.0:User:manager.value",
        )
        .unwrap();
        assert_eq!(path.segments(), &[ENTERPRISE_USER_SCHEMA, "manager", "value"]);
    }

    #[test]
    fn test_parse_with_schema() {
        let registry = SchemaRegistry::new().unwrap();
        let users = registry.resource_type_schema("User").unwrap();

        let path =
            AttributePath::parse_with_schema("urn:ietf:params:scim:schemas:core:2.0:User:name.givenName", users)
                .unwrap();
        assert_eq!(path.segments(), &["name", "givenName"]);

        let path = AttributePath::parse_with_schema(ENTERPRISE_USER_SCHEMA, users).unwrap();
        assert_eq!(path.segments(), &[ENTERPRISE_USER_SCHEMA]);

        let path = AttributePath::parse_with_schema(
            "urn:ietf:params:scim:schemas:extension:enterprise:2.0:User:department",
            users,
        )
        .unwrap();
        assert_eq!(path.segments(), &[ENTERPRISE_USER_SCHEMA, "department"]);
    }

    #[test]
    fn test_unknown_schema_uri_is_no_target() {
        let registry = SchemaRegistry::new().unwrap();
        let users = registry.resource_type_schema("User").unwrap();

        let err = AttributePath::parse_with_schema("urn:example:ext:foo", users).unwrap_err();
        assert_eq!(err.code(), "noTarget");
        let err = AttributePath::parse_with_schema("urn:example:ext:2.0:Device:serial.value", users)
            .unwrap_err();
        assert_eq!(err.code(), "noTarget");
    }

    #[test]
    fn test_filter_matching() {
        let entry = ComplexAttribute::new("emails")
            .with(AttributeValue::string("type", "Work"))
            .with(AttributeValue::simple("primary", SimpleValue::Boolean(true)));
        assert!(eq("type", FilterValue::String("work".into())).matches_entry(&entry).unwrap());
        assert!(eq("primary", FilterValue::Boolean(true)).matches_entry(&entry).unwrap());
        assert!(!eq("display", FilterValue::String("x".into())).matches_entry(&entry).unwrap());

        let read = SimpleValue::String("read".into());
        assert!(eq("value", FilterValue::String("read".into())).matches_primitive(&read, true).unwrap());
    }
}
