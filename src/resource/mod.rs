//! SCIM resources as schema-constrained attribute trees.
//!
//! A [`Resource`] maps attribute names to [`AttributeValue`](crate::attribute::AttributeValue)s
//! and carries the set of schema URIs it references. The concrete kinds in
//! [`kinds`] wrap the same structure with accessors for well-known attributes.
//!
//! ```rust
//! use scim_core::attribute::AttributeValue;
//! use scim_core::resource::User;
//!
//! let mut user = User::new();
//! user.set_attribute(AttributeValue::string("userName", "bjensen"));
//! user.set_id("2819c223-7f76-453a-919d-413861904646").unwrap();
//!
//! let copy = user.clone();
//! assert_eq!(copy.user_name(), Some("bjensen"));
//! assert!(user.set_id("other").is_err());
//! ```

pub mod core;
pub mod kinds;
pub mod version;

pub use self::core::Resource;
pub use kinds::{
    Group, ListedResource, ResourceTypeDefinition, Role, SchemaDefinition, ServiceProviderConfig,
    User,
};
pub use version::ResourceVersion;
