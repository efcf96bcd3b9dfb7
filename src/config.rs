//! Configuration for the SCIM core.
//!
//! [`ScimCoreConfig`] controls how strictly wire values are decoded and how deep
//! PATCH paths may reach. It deserializes from camelCase JSON with every field
//! defaulted, so a partial document is enough.
//!
//! ```rust
//! use scim_core::config::{ScimCoreConfig, UnknownAttributePolicy};
//!
//! let config = ScimCoreConfig::from_json_str(r#"{"unknownAttributes": "preserve"}"#).unwrap();
//! assert_eq!(config.unknown_attributes, UnknownAttributePolicy::Preserve);
//! assert_eq!(config.max_path_depth, 3);
//! ```

use crate::error::ScimResult;
use serde::{Deserialize, Serialize};

/// Default number of segments a PATCH path may have (attribute, sub-attribute,
/// sub-sub-attribute inside an extension schema).
pub const DEFAULT_MAX_PATH_DEPTH: usize = 3;

/// What to do with attribute names that the schema does not declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UnknownAttributePolicy {
    /// Fail with `noTarget`
    #[default]
    Reject,
    /// Keep the value as an untyped attribute
    Preserve,
}

/// Core configuration shared by the codec, factory and PATCH engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScimCoreConfig {
    /// Handling of undeclared attribute names
    pub unknown_attributes: UnknownAttributePolicy,
    /// Maximum number of dotted segments in a PATCH path
    pub max_path_depth: usize,
    /// Skip appending multi-valued entries that are already present on path-less add
    pub skip_duplicate_values: bool,
}

impl Default for ScimCoreConfig {
    fn default() -> Self {
        Self {
            unknown_attributes: UnknownAttributePolicy::default(),
            max_path_depth: DEFAULT_MAX_PATH_DEPTH,
            skip_duplicate_values: true,
        }
    }
}

impl ScimCoreConfig {
    /// Load configuration from a JSON document.
    pub fn from_json_str(content: &str) -> ScimResult<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Set the unknown attribute policy.
    pub fn with_unknown_attributes(mut self, policy: UnknownAttributePolicy) -> Self {
        self.unknown_attributes = policy;
        self
    }

    /// Set the maximum PATCH path depth.
    pub fn with_max_path_depth(mut self, depth: usize) -> Self {
        self.max_path_depth = depth;
        self
    }

    /// Toggle duplicate suppression for path-less add.
    pub fn with_skip_duplicate_values(mut self, skip: bool) -> Self {
        self.skip_duplicate_values = skip;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ScimCoreConfig::default();
        assert_eq!(config.unknown_attributes, UnknownAttributePolicy::Reject);
        assert_eq!(config.max_path_depth, DEFAULT_MAX_PATH_DEPTH);
        assert!(config.skip_duplicate_values);
    }

    #[test]
    fn test_partial_json() {
        let config = ScimCoreConfig::from_json_str(r#"{"maxPathDepth": 5}"#).unwrap();
        assert_eq!(config.max_path_depth, 5);
        assert_eq!(config.unknown_attributes, UnknownAttributePolicy::Reject);
    }

    #[test]
    fn test_invalid_json_is_error() {
        assert!(ScimCoreConfig::from_json_str(r#"{"maxPathDepth": "deep"}"#).is_err());
    }

    #[test]
    fn test_builder_methods() {
        let config = ScimCoreConfig::default()
            .with_unknown_attributes(UnknownAttributePolicy::Preserve)
            .with_max_path_depth(4)
            .with_skip_duplicate_values(false);
        assert_eq!(config.unknown_attributes, UnknownAttributePolicy::Preserve);
        assert_eq!(config.max_path_depth, 4);
        assert!(!config.skip_duplicate_values);
    }
}
