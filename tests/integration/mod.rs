//! Integration suites for the SCIM core.
//!
//! - `patch` - RFC 7644 section 3.5.2 operations through [`scim_core::PatchEngine`]
//! - `projection` - RFC 7644 section 3.9 attribute selection
//! - `resource` - attribute tree invariants, deep copies and resource kinds
//! - `codec` - request and response bodies
//! - `properties` - property tests over generated values

pub mod codec;
pub mod patch;
pub mod projection;
pub mod properties;
pub mod resource;
