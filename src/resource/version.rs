//! Content-derived resource versions.
//!
//! `meta.version` carries a weak HTTP entity tag computed deterministically from
//! the encoded resource body, so two resources with the same content always carry
//! the same version.
//!
//! ```rust
//! use scim_core::resource::ResourceVersion;
//!
//! let version = ResourceVersion::from_content(br#"{"userName":"bjensen"}"#);
//! let etag = version.to_etag();
//! assert!(etag.starts_with("W/\""));
//! assert_eq!(etag.parse::<ResourceVersion>().unwrap(), version);
//! ```

use crate::error::ScimError;

use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

/// Opaque version identifier of a resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceVersion {
    opaque: String,
}

impl ResourceVersion {
    /// Version computed from content: base64 of the first 8 bytes of its SHA-256.
    pub fn from_content(content: &[u8]) -> Self {
        let hash = Sha256::digest(content);
        Self {
            opaque: BASE64.encode(&hash[..8]),
        }
    }

    /// Version from a caller-chosen identifier.
    pub fn from_hash(hash: impl AsRef<str>) -> Self {
        Self {
            opaque: hash.as_ref().to_string(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.opaque
    }

    /// Weak entity tag form, `W/"<opaque>"`.
    pub fn to_etag(&self) -> String {
        format!("W/\"{}\"", self.opaque)
    }
}

impl fmt::Display for ResourceVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.opaque)
    }
}

impl FromStr for ResourceVersion {
    type Err = ScimError;

    /// Accepts a weak tag, a strong tag, or a bare opaque value.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let raw = raw.trim();
        let unweakened = raw.strip_prefix("W/").unwrap_or(raw);
        let opaque = match unweakened.strip_prefix('"') {
            Some(rest) => rest
                .strip_suffix('"')
                .ok_or_else(|| ScimError::invalid_value(format!("Malformed entity tag: {}", raw)))?,
            None => unweakened,
        };
        if opaque.is_empty() || opaque.contains('"') {
            return Err(ScimError::invalid_value(format!("Malformed entity tag: {}", raw)));
        }
        Ok(Self::from_hash(opaque))
    }
}
