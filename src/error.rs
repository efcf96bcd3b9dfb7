//! Error types for SCIM core operations.
//!
//! Every failure raised by the attribute model, the projection resolver and the
//! PATCH engine is a [`ScimError`]. Protocol-facing layers translate it into an
//! HTTP status and a SCIM `scimType` using [`ScimError::status`] and
//! [`ScimError::scim_type`].

use std::fmt;

/// The `scimType` detail codes defined by RFC 7644 section 3.12 that this core raises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScimType {
    /// The request body or a `value` payload could not be parsed
    InvalidSyntax,
    /// The `path` attribute was invalid or did not match anything
    InvalidPath,
    /// A filter expression was malformed
    InvalidFilter,
    /// A value was missing or incompatible with the attribute
    InvalidValue,
    /// The operation would modify a read-only, immutable or required attribute
    Mutability,
    /// The path did not yield an attribute that could be operated on
    NoTarget,
    /// A uniqueness constraint was violated
    Uniqueness,
}

impl ScimType {
    /// The wire form used in SCIM error responses.
    pub fn as_str(&self) -> &'static str {
        match self {
            ScimType::InvalidSyntax => "invalidSyntax",
            ScimType::InvalidPath => "invalidPath",
            ScimType::InvalidFilter => "invalidFilter",
            ScimType::InvalidValue => "invalidValue",
            ScimType::Mutability => "mutability",
            ScimType::NoTarget => "noTarget",
            ScimType::Uniqueness => "uniqueness",
        }
    }
}

impl fmt::Display for ScimType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Main error type for SCIM core operations.
#[derive(Debug, thiserror::Error)]
pub enum ScimError {
    /// The request cannot be applied as given
    #[error("Bad request ({scim_type}): {message}")]
    BadRequest { scim_type: ScimType, message: String },

    /// The request uses a feature this core does not support
    #[error("Not implemented: {message}")]
    NotImplemented { message: String },

    /// Resource not found errors
    #[error("Resource not found: {resource_type} with ID {id}")]
    ResourceNotFound { resource_type: String, id: String },

    /// Schema not found errors
    #[error("Schema not found: {schema_id}")]
    SchemaNotFound { schema_id: String },

    /// A read-only or immutable attribute was set a second time
    #[error("Attribute '{attribute}' is read-only and cannot be modified")]
    AttributeReadOnly { attribute: String },

    /// A wire value could not be coerced to the declared attribute type
    #[error("Attribute '{attribute}' cannot be converted to {expected}: {details}")]
    Conversion {
        attribute: String,
        expected: String,
        details: String,
    },

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Unexpected faults and schema misconfiguration
    #[error("Internal server error: {message}")]
    Internal { message: String },
}

impl ScimError {
    fn bad_request(scim_type: ScimType, message: impl Into<String>) -> Self {
        Self::BadRequest {
            scim_type,
            message: message.into(),
        }
    }

    /// Create an invalid syntax error
    pub fn invalid_syntax(message: impl Into<String>) -> Self {
        Self::bad_request(ScimType::InvalidSyntax, message)
    }

    /// Create an invalid path error
    pub fn invalid_path(message: impl Into<String>) -> Self {
        Self::bad_request(ScimType::InvalidPath, message)
    }

    /// Create an invalid filter error
    pub fn invalid_filter(message: impl Into<String>) -> Self {
        Self::bad_request(ScimType::InvalidFilter, message)
    }

    /// Create an invalid value error
    pub fn invalid_value(message: impl Into<String>) -> Self {
        Self::bad_request(ScimType::InvalidValue, message)
    }

    /// Create a mutability error
    pub fn mutability(message: impl Into<String>) -> Self {
        Self::bad_request(ScimType::Mutability, message)
    }

    /// Create a no-target error
    pub fn no_target(message: impl Into<String>) -> Self {
        Self::bad_request(ScimType::NoTarget, message)
    }

    /// Create a not implemented error
    pub fn not_implemented(message: impl Into<String>) -> Self {
        Self::NotImplemented {
            message: message.into(),
        }
    }

    /// Create a resource not found error
    pub fn resource_not_found(resource_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self::ResourceNotFound {
            resource_type: resource_type.into(),
            id: id.into(),
        }
    }

    /// Create a schema not found error
    pub fn schema_not_found(schema_id: impl Into<String>) -> Self {
        Self::SchemaNotFound {
            schema_id: schema_id.into(),
        }
    }

    /// Create an internal server error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Create a conversion error for a value that does not fit its declared type
    pub fn conversion(
        attribute: impl Into<String>,
        expected: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self::Conversion {
            attribute: attribute.into(),
            expected: expected.into(),
            details: details.into(),
        }
    }

    /// HTTP status code the response layer should use.
    pub fn status(&self) -> u16 {
        match self {
            ScimError::BadRequest { .. }
            | ScimError::AttributeReadOnly { .. }
            | ScimError::Conversion { .. }
            | ScimError::Json(_) => 400,
            ScimError::ResourceNotFound { .. } => 404,
            ScimError::NotImplemented { .. } => 501,
            ScimError::SchemaNotFound { .. } | ScimError::Internal { .. } => 500,
        }
    }

    /// The SCIM `scimType` for responses that carry one.
    pub fn scim_type(&self) -> Option<ScimType> {
        match self {
            ScimError::BadRequest { scim_type, .. } => Some(*scim_type),
            ScimError::AttributeReadOnly { .. } => Some(ScimType::Mutability),
            ScimError::Conversion { .. } => Some(ScimType::InvalidValue),
            ScimError::Json(_) => Some(ScimType::InvalidSyntax),
            _ => None,
        }
    }

    /// Stable machine-readable code for protocol-level translation.
    pub fn code(&self) -> &'static str {
        match self {
            ScimError::BadRequest { scim_type, .. } => scim_type.as_str(),
            ScimError::NotImplemented { .. } => "notImplemented",
            ScimError::ResourceNotFound { .. } => "notFound",
            ScimError::SchemaNotFound { .. } => "schemaNotFound",
            ScimError::AttributeReadOnly { .. } => "attributeReadOnly",
            ScimError::Conversion { .. } => "conversion",
            ScimError::Json(_) => "invalidJson",
            ScimError::Internal { .. } => "internalError",
        }
    }

    /// Re-raise decoding failures of a PATCH `value` as `invalidSyntax`.
    pub(crate) fn into_syntax_error(self) -> Self {
        match self {
            ScimError::Conversion { .. } | ScimError::Json(_) => {
                ScimError::invalid_syntax(self.to_string())
            }
            other => other,
        }
    }
}

/// Result type alias for SCIM core operations
pub type ScimResult<T> = Result<T, ScimError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let error = ScimError::resource_not_found("User", "123");
        assert!(error.to_string().contains("User"));
        assert!(error.to_string().contains("123"));
        assert_eq!(error.status(), 404);
    }

    #[test]
    fn test_bad_request_codes() {
        let error = ScimError::mutability("userName is required");
        assert_eq!(error.status(), 400);
        assert_eq!(error.scim_type(), Some(ScimType::Mutability));
        assert_eq!(error.code(), "mutability");
        assert!(error.to_string().contains("userName"));
    }

    #[test]
    fn test_not_implemented_has_no_scim_type() {
        let error = ScimError::not_implemented("operator 'co'");
        assert_eq!(error.status(), 501);
        assert_eq!(error.scim_type(), None);
        assert_eq!(error.code(), "notImplemented");
    }

    #[test]
    fn test_conversion_becomes_invalid_syntax() {
        let error = ScimError::conversion("active", "boolean", "got 'maybe'").into_syntax_error();
        assert_eq!(error.scim_type(), Some(ScimType::InvalidSyntax));

        let untouched = ScimError::no_target("x").into_syntax_error();
        assert_eq!(untouched.scim_type(), Some(ScimType::NoTarget));
    }
}
