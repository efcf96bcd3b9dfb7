//! PATCH operations as decoded from a `PatchOp` request body.

use crate::error::{ScimError, ScimResult};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// The three PATCH operation kinds (RFC 7644 section 3.5.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatchOp {
    Add,
    Remove,
    Replace,
}

impl PatchOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            PatchOp::Add => "add",
            PatchOp::Remove => "remove",
            PatchOp::Replace => "replace",
        }
    }
}

impl fmt::Display for PatchOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PatchOp {
    type Err = ScimError;

    /// Operation names are matched without regard to case.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "add" => Ok(PatchOp::Add),
            "remove" => Ok(PatchOp::Remove),
            "replace" => Ok(PatchOp::Replace),
            other => Err(ScimError::invalid_syntax(format!(
                "Unsupported PATCH operation '{}'",
                other
            ))),
        }
    }
}

/// One entry of the `Operations` array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatchOperation {
    pub op: PatchOp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

impl PatchOperation {
    pub fn add(path: Option<&str>, value: Value) -> Self {
        Self {
            op: PatchOp::Add,
            path: path.map(str::to_string),
            value: Some(value),
        }
    }

    pub fn remove(path: &str) -> Self {
        Self {
            op: PatchOp::Remove,
            path: Some(path.to_string()),
            value: None,
        }
    }

    pub fn replace(path: Option<&str>, value: Value) -> Self {
        Self {
            op: PatchOp::Replace,
            path: path.map(str::to_string),
            value: Some(value),
        }
    }

    /// The path, treating an empty or blank string as absent.
    pub fn path(&self) -> Option<&str> {
        self.path
            .as_deref()
            .map(str::trim)
            .filter(|path| !path.is_empty())
    }

    /// The value required by add and replace.
    pub(crate) fn required_value(&self) -> ScimResult<&Value> {
        self.value.as_ref().ok_or_else(|| {
            ScimError::invalid_value(format!("'{}' operation requires a value", self.op))
        })
    }
}
