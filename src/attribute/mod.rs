//! Attribute values of SCIM resources.
//!
//! An attribute is one of three shapes, modelled by [`AttributeValue`]:
//!
//! - [`SimpleAttribute`] - a single [`SimpleValue`] of a primitive SCIM type
//! - [`ComplexAttribute`] - an ordered set of named sub-attributes
//! - [`MultiValuedAttribute`] - an ordered list of scalars or complex entries
//!
//! Values are built structurally and then bound to their schema definition by the
//! [`AttributeFactory`], which stamps [`AttributeCharacteristics`] onto every node.

pub mod complex;
pub mod factory;
pub mod multi_valued;
pub mod value;

pub use complex::ComplexAttribute;
pub use factory::AttributeFactory;
pub use multi_valued::{MultiValuedAttribute, MultiValues};
pub use value::{
    AttributeCharacteristics, AttributeValue, SimpleAttribute, SimpleValue, parse_date_time,
};

use indexmap::IndexMap;

/// Index of `name` in an attribute map: exact match first, then ignoring case.
pub(crate) fn position_of<V>(map: &IndexMap<String, V>, name: &str) -> Option<usize> {
    map.get_index_of(name).or_else(|| {
        map.keys()
            .position(|key| key.eq_ignore_ascii_case(name))
    })
}

/// Insert `attribute` under its own name, replacing an entry of the same name
/// (in any case) at its current position.
pub(crate) fn insert_attribute(
    map: &mut IndexMap<String, AttributeValue>,
    attribute: AttributeValue,
) -> Option<AttributeValue> {
    let name = attribute.name().to_string();
    match position_of(map, &name) {
        Some(index) => {
            let (key, previous) = map.shift_remove_index(index)?;
            let key = if key == name { key } else { name };
            map.shift_insert(index, key, attribute);
            Some(previous)
        }
        None => {
            map.insert(name, attribute);
            None
        }
    }
}
