//! Resource-wide validation.
//!
//! A [`Validator`] checks the invariants that span a whole resource: mutability
//! against a previous state, required attributes and visibility on read. The PATCH
//! engine calls [`Validator::validate_updated`] after every operation with the
//! state captured before the operation.

use crate::attribute::{AttributeValue, position_of};
use crate::error::{ScimError, ScimResult};
use crate::resource::Resource;
use crate::schema::resource_type::ResourceTypeSchema;
use crate::schema::types::{AttributeDefinition, Mutability, Returned};

use indexmap::IndexMap;
use log::{debug, warn};

/// Resource-wide checks around create, update and read.
pub trait Validator {
    /// Check a resource about to be created.
    fn validate_created(&self, candidate: Resource, schema: &ResourceTypeSchema) -> ScimResult<Resource>;

    /// Check `candidate` against the state it was derived from.
    fn validate_updated(
        &self,
        old: &Resource,
        candidate: Resource,
        schema: &ResourceTypeSchema,
    ) -> ScimResult<Resource>;

    /// Prepare a stored resource for the response.
    fn validate_retrieved(&self, resource: Resource, schema: &ResourceTypeSchema) -> ScimResult<Resource>;
}

impl<V: Validator + ?Sized> Validator for &V {
    fn validate_created(&self, candidate: Resource, schema: &ResourceTypeSchema) -> ScimResult<Resource> {
        (**self).validate_created(candidate, schema)
    }

    fn validate_updated(
        &self,
        old: &Resource,
        candidate: Resource,
        schema: &ResourceTypeSchema,
    ) -> ScimResult<Resource> {
        (**self).validate_updated(old, candidate, schema)
    }

    fn validate_retrieved(&self, resource: Resource, schema: &ResourceTypeSchema) -> ScimResult<Resource> {
        (**self).validate_retrieved(resource, schema)
    }
}

/// Validator enforcing the RFC 7643 attribute characteristics.
///
/// - created: client-supplied `readOnly` values are dropped, then required
///   attributes, the core schema URI and single primaries are checked
/// - updated: `readOnly` values are restored from the old state, changed
///   `immutable` values fail with `mutability`, missing required attributes with
///   `invalidValue`
/// - retrieved: `returned=never` and `writeOnly` attributes are stripped
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardValidator;

impl StandardValidator {
    pub fn new() -> Self {
        Self
    }
}

impl Validator for StandardValidator {
    fn validate_created(&self, mut candidate: Resource, schema: &ResourceTypeSchema) -> ScimResult<Resource> {
        let dropped = strip_matching(candidate.attributes_mut(), schema.attributes(), &|definition| {
            definition.is_read_only()
        });
        if dropped > 0 {
            debug!("Dropped {} client-supplied read-only attributes", dropped);
        }
        if !candidate.has_schema(schema.core_uri()) {
            return Err(ScimError::invalid_value(format!(
                "Resource must reference schema {}",
                schema.core_uri()
            )));
        }
        check_required(candidate.attributes(), schema.attributes(), "")?;
        check_single_primary(candidate.attributes())?;
        Ok(candidate)
    }

    fn validate_updated(
        &self,
        old: &Resource,
        mut candidate: Resource,
        schema: &ResourceTypeSchema,
    ) -> ScimResult<Resource> {
        restore_read_only(
            Some(old.attributes()),
            candidate.attributes_mut(),
            schema.attributes(),
        );
        check_immutable(old.attributes(), candidate.attributes(), schema.attributes(), "")?;
        check_required(candidate.attributes(), schema.attributes(), "")?;
        Ok(candidate)
    }

    fn validate_retrieved(&self, mut resource: Resource, schema: &ResourceTypeSchema) -> ScimResult<Resource> {
        strip_matching(resource.attributes_mut(), schema.attributes(), &|definition| {
            definition.returned == Returned::Never || definition.mutability == Mutability::WriteOnly
        });
        Ok(resource)
    }
}

fn value_of<'a>(
    attributes: &'a IndexMap<String, AttributeValue>,
    name: &str,
) -> Option<&'a AttributeValue> {
    position_of(attributes, name)
        .and_then(|index| attributes.get_index(index))
        .map(|(_, value)| value)
}

fn qualified(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", prefix, name)
    }
}

/// Remove every attribute whose definition satisfies `strip`, at any depth.
/// Containers left without values are removed too. Returns the number removed.
fn strip_matching<F>(
    attributes: &mut IndexMap<String, AttributeValue>,
    definitions: &[AttributeDefinition],
    strip: &F,
) -> usize
where
    F: Fn(&AttributeDefinition) -> bool,
{
    let mut removed = 0;
    for definition in definitions {
        let Some(index) = position_of(attributes, &definition.name) else {
            continue;
        };
        if strip(definition) {
            attributes.shift_remove_index(index);
            removed += 1;
            continue;
        }
        if definition.sub_attributes.is_empty() {
            continue;
        }
        let emptied = match attributes.get_index_mut(index).map(|(_, value)| value) {
            Some(AttributeValue::Complex(complex)) => {
                removed += strip_matching(complex.sub_attributes_mut(), &definition.sub_attributes, strip);
                complex.is_empty()
            }
            Some(AttributeValue::MultiValued(multi)) => {
                for entry in multi.entries_mut() {
                    removed += strip_matching(entry.sub_attributes_mut(), &definition.sub_attributes, strip);
                }
                multi.retain_entries(|entry| !entry.is_empty());
                multi.is_empty()
            }
            _ => false,
        };
        if emptied {
            attributes.shift_remove_index(index);
        }
    }
    removed
}

/// Put back read-only values from the previous state, single-valued complex
/// attributes included.
fn restore_read_only(
    old: Option<&IndexMap<String, AttributeValue>>,
    new: &mut IndexMap<String, AttributeValue>,
    definitions: &[AttributeDefinition],
) {
    for definition in definitions {
        let previous = old.and_then(|old| value_of(old, &definition.name));
        if definition.is_read_only() {
            let current = position_of(new, &definition.name);
            match (previous, current) {
                (Some(previous), Some(index)) => {
                    if let Some((_, value)) = new.get_index_mut(index) {
                        if value != previous {
                            warn!("Restoring read-only attribute '{}'", definition.name);
                            *value = previous.deep_copy();
                        }
                    }
                }
                (Some(previous), None) => {
                    crate::attribute::insert_attribute(new, previous.deep_copy());
                }
                (None, Some(index)) => {
                    warn!("Dropping read-only attribute '{}'", definition.name);
                    new.shift_remove_index(index);
                }
                (None, None) => {}
            }
            continue;
        }
        if definition.multi_valued || definition.sub_attributes.is_empty() {
            continue;
        }
        let previous = previous.and_then(AttributeValue::as_complex);
        if let Some(index) = position_of(new, &definition.name) {
            if let Some(AttributeValue::Complex(complex)) =
                new.get_index_mut(index).map(|(_, value)| value)
            {
                restore_read_only(
                    previous.map(|complex| complex.sub_attributes()),
                    complex.sub_attributes_mut(),
                    &definition.sub_attributes,
                );
            }
        }
    }
}

/// An immutable value, once set, may not change or disappear.
fn check_immutable(
    old: &IndexMap<String, AttributeValue>,
    new: &IndexMap<String, AttributeValue>,
    definitions: &[AttributeDefinition],
    prefix: &str,
) -> ScimResult<()> {
    for definition in definitions {
        let Some(previous) = value_of(old, &definition.name) else {
            continue;
        };
        let current = value_of(new, &definition.name);
        if definition.is_immutable() {
            if current.map(AttributeValue::to_json) != Some(previous.to_json()) {
                let name = qualified(prefix, &definition.name);
                warn!("Rejecting change of immutable attribute '{}'", name);
                return Err(ScimError::mutability(format!(
                    "Attribute '{}' is immutable",
                    name
                )));
            }
            continue;
        }
        if let (Some(AttributeValue::Complex(previous)), Some(AttributeValue::Complex(current))) =
            (Some(previous), current)
        {
            check_immutable(
                previous.sub_attributes(),
                current.sub_attributes(),
                &definition.sub_attributes,
                &qualified(prefix, &definition.name),
            )?;
        }
    }
    Ok(())
}

/// Required attributes must carry a value; required sub-attributes of present
/// complex values too.
fn check_required(
    attributes: &IndexMap<String, AttributeValue>,
    definitions: &[AttributeDefinition],
    prefix: &str,
) -> ScimResult<()> {
    for definition in definitions {
        let value = value_of(attributes, &definition.name);
        match value {
            None => {
                if definition.required {
                    return Err(ScimError::invalid_value(format!(
                        "Required attribute '{}' is missing",
                        qualified(prefix, &definition.name)
                    )));
                }
            }
            Some(value) if value.is_value_less() && definition.required => {
                return Err(ScimError::invalid_value(format!(
                    "Required attribute '{}' has no value",
                    qualified(prefix, &definition.name)
                )));
            }
            Some(AttributeValue::Complex(complex)) => {
                check_required(
                    complex.sub_attributes(),
                    &definition.sub_attributes,
                    &qualified(prefix, &definition.name),
                )?;
            }
            Some(AttributeValue::MultiValued(multi)) => {
                let name = qualified(prefix, &definition.name);
                for entry in multi.entries() {
                    check_required(entry.sub_attributes(), &definition.sub_attributes, &name)?;
                }
            }
            Some(AttributeValue::Simple(_)) => {}
        }
    }
    Ok(())
}

fn check_single_primary(attributes: &IndexMap<String, AttributeValue>) -> ScimResult<()> {
    for value in attributes.values() {
        match value {
            AttributeValue::MultiValued(multi) => {
                if multi.entries().iter().filter(|entry| entry.is_primary()).count() > 1 {
                    return Err(ScimError::invalid_value(format!(
                        "Attribute '{}' has more than one primary value",
                        multi.name()
                    )));
                }
            }
            AttributeValue::Complex(complex) => check_single_primary(complex.sub_attributes())?,
            AttributeValue::Simple(_) => {}
        }
    }
    Ok(())
}
