//! SCIM Core Test Suite
//!
//! Integration tests exercising the public API end to end: decoding request
//! bodies, applying PATCH requests, projecting reads and encoding responses.
//!
//! ## Test Organization
//!
//! - `common/` - Shared fixtures: schema catalogs, sample resources, logging setup
//! - `integration/` - Suites per concern
//!   - `patch` - PATCH state machine, paths, filters and mutability
//!   - `projection` - `attributes`/`excludedAttributes` resolution
//!   - `resource` - attribute tree invariants and resource kinds
//!   - `codec` - request/response bodies
//!   - `properties` - proptest properties over the attribute tree
//!
//! ## Usage
//!
//! ```bash
//! cargo test --test lib
//! cargo test --test lib integration::patch
//! ```

extern crate scim_core;

pub mod common;
pub mod integration;

#[cfg(test)]
mod test_suite_meta {
    use crate::common;

    #[test]
    fn test_suite_setup() {
        common::init_logging();
        let registry = common::registry();
        assert!(registry.resource_type_schema("User").is_ok());
        assert_eq!(common::sample_user().user_name(), Some("bjensen@example.com"));
    }
}
