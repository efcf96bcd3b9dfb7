//! The PATCH state machine (RFC 7644 section 3.5.2).
//!
//! [`PatchEngine::apply_all`] works on a private copy of the resource. Every
//! operation is applied to the current state and checked by the [`Validator`]
//! against the state before that operation; the first failure aborts the whole
//! request and the caller's resource stays untouched.
//!
//! ```rust
//! use scim_core::patch::{PatchEngine, PatchOperation};
//! use scim_core::schema::SchemaRegistry;
//! use scim_core::validation::StandardValidator;
//! use scim_core::codec::JsonCodec;
//! use serde_json::json;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = SchemaRegistry::new()?;
//! let users = registry.resource_type_schema("User")?;
//! let user = JsonCodec::new().decode_value(
//!     &json!({"schemas": ["urn:ietf:params:scim:schemas:core:2.0:User"], "userName": "bjensen"}),
//!     users,
//! )?;
//!
//! let engine = PatchEngine::new(users, StandardValidator::new());
//! let patched = engine.apply_all(
//!     &user,
//!     &[PatchOperation::replace(Some("name.givenName"), json!("Barbara"))],
//! )?;
//! assert_eq!(patched.to_json()["name"], json!({"givenName": "Barbara"}));
//! # Ok(())
//! # }
//! ```

use super::operation::{PatchOp, PatchOperation};
use super::path::{AttributePath, FilterExpression};
use crate::attribute::{
    AttributeValue, ComplexAttribute, MultiValuedAttribute, SimpleValue, insert_attribute,
    position_of,
};
use crate::codec::JsonCodec;
use crate::config::ScimCoreConfig;
use crate::error::{ScimError, ScimResult};
use crate::resource::Resource;
use crate::schema::resource_type::{ResourceTypeSchema, SchemaLookup};
use crate::schema::types::{AttributeDefinition, find_definition};
use crate::validation::Validator;

use indexmap::IndexMap;
use log::{debug, trace, warn};
use serde_json::Value;

const PRIMARY: &str = "primary";

/// Applies PATCH operations to resources of one resource type.
#[derive(Debug, Clone)]
pub struct PatchEngine<'s, V> {
    schema: &'s ResourceTypeSchema,
    validator: V,
    config: ScimCoreConfig,
    codec: JsonCodec,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Merge {
    Add,
    Replace,
}

impl<'s, V: Validator> PatchEngine<'s, V> {
    pub fn new(schema: &'s ResourceTypeSchema, validator: V) -> Self {
        Self::with_config(schema, validator, ScimCoreConfig::default())
    }

    pub fn with_config(schema: &'s ResourceTypeSchema, validator: V, config: ScimCoreConfig) -> Self {
        let codec = JsonCodec::from_config(&config);
        Self {
            schema,
            validator,
            config,
            codec,
        }
    }

    pub fn schema(&self) -> &ResourceTypeSchema {
        self.schema
    }

    pub fn config(&self) -> &ScimCoreConfig {
        &self.config
    }

    /// Apply `operations` in order and return the patched copy.
    pub fn apply_all(&self, resource: &Resource, operations: &[PatchOperation]) -> ScimResult<Resource> {
        let mut baseline = resource.deep_copy();
        let mut current = resource.deep_copy();
        for (index, operation) in operations.iter().enumerate() {
            current = self.apply(operation, current, &baseline).map_err(|error| {
                warn!("PATCH operation {} ({}) rejected: {}", index, operation.op, error);
                error
            })?;
            baseline = current.deep_copy();
        }
        debug!(
            "Applied {} PATCH operations to {} resource",
            operations.len(),
            self.schema.name()
        );
        Ok(current)
    }

    /// Apply one operation to `current`; `baseline` is the state before it.
    pub fn apply(
        &self,
        operation: &PatchOperation,
        mut current: Resource,
        baseline: &Resource,
    ) -> ScimResult<Resource> {
        debug!(
            "PATCH {} {}",
            operation.op,
            operation.path().unwrap_or("<resource>")
        );
        match (operation.op, operation.path()) {
            (PatchOp::Remove, None) => {
                return Err(ScimError::no_target("'remove' operation requires a path"));
            }
            (PatchOp::Remove, Some(raw)) => {
                let path = self.parse_path(raw)?;
                self.remove(&mut current, &path)?;
            }
            (PatchOp::Add, None) => {
                self.merge_fragment(&mut current, operation.required_value()?, Merge::Add)?;
            }
            (PatchOp::Replace, None) => {
                self.merge_fragment(&mut current, operation.required_value()?, Merge::Replace)?;
            }
            (PatchOp::Add | PatchOp::Replace, Some(raw)) => {
                let value = operation.required_value()?;
                let path = self.parse_path(raw)?;
                self.write(&mut current, &path, value)?;
            }
        }
        self.sync_schemas(&mut current);
        self.validator.validate_updated(baseline, current, self.schema)
    }

    fn parse_path(&self, raw: &str) -> ScimResult<AttributePath> {
        let path = AttributePath::parse_with_schema(raw, self.schema)?;
        if path.depth() > self.config.max_path_depth {
            return Err(ScimError::invalid_path(format!(
                "Path '{}' exceeds {} levels",
                raw, self.config.max_path_depth
            )));
        }
        if let Some(filter) = path.filter() {
            filter.expression.ensure_supported()?;
        }
        Ok(path)
    }

    /// Schema definition for every path segment, looked up by dotted name.
    fn definitions(&self, path: &AttributePath) -> ScimResult<Vec<&'s AttributeDefinition>> {
        let segments = path.segments();
        let mut chain: Vec<&'s AttributeDefinition> = Vec::with_capacity(segments.len());
        for (level, segment) in segments.iter().enumerate() {
            let dotted = self.dotted_name(&segments[..=level]);
            match self.schema.attribute_schema(&dotted) {
                Some(definition) => chain.push(definition),
                None => {
                    warn!("PATCH path '{}' names unknown attribute '{}'", path, segment);
                    return Err(ScimError::no_target(format!(
                        "Attribute '{}' in path '{}' is not defined",
                        segment, path
                    )));
                }
            }
        }
        Ok(chain)
    }

    /// `a.b.c`, or `urn:...:b.c` when the first segment is an extension URI.
    fn dotted_name(&self, segments: &[String]) -> String {
        match segments.split_first() {
            Some((uri, rest)) if self.schema.is_extension(uri) && !rest.is_empty() => {
                format!("{}:{}", uri, rest.join("."))
            }
            _ => segments.join("."),
        }
    }

    fn reject_read_only(&self, path: &AttributePath, chain: &[&AttributeDefinition]) -> ScimResult<()> {
        if let Some(definition) = chain.iter().find(|definition| definition.is_read_only()) {
            warn!("PATCH path '{}' touches read-only '{}'", path, definition.name);
            return Err(ScimError::mutability(format!(
                "Attribute '{}' is read-only",
                definition.name
            )));
        }
        Ok(())
    }

    fn remove(&self, resource: &mut Resource, path: &AttributePath) -> ScimResult<()> {
        let chain = self.definitions(path)?;
        self.reject_read_only(path, &chain)?;
        if let Some(terminal) = chain.last() {
            let filtered = path.filter_at(chain.len() - 1).is_some();
            if terminal.required && !filtered {
                warn!("PATCH remove of required '{}'", terminal.name);
                return Err(ScimError::mutability(format!(
                    "Attribute '{}' is required and cannot be removed",
                    terminal.name
                )));
            }
        }
        if !remove_at(resource.attributes_mut(), &chain, path, 0)? {
            return Err(ScimError::invalid_path(format!(
                "No value matched path '{}'",
                path
            )));
        }
        Ok(())
    }

    fn write(&self, resource: &mut Resource, path: &AttributePath, value: &Value) -> ScimResult<()> {
        let chain = self.definitions(path)?;
        self.reject_read_only(path, &chain)?;
        let written = self.write_at(resource.attributes_mut(), &chain, path, 0, value)?;
        if written == 0 {
            return Err(ScimError::no_target(format!(
                "No matching filter value for path '{}'",
                path
            )));
        }
        Ok(())
    }

    /// Write `value` at the end of `chain`, creating missing containers. Returns
    /// the number of targets written.
    fn write_at(
        &self,
        attributes: &mut IndexMap<String, AttributeValue>,
        chain: &[&AttributeDefinition],
        path: &AttributePath,
        level: usize,
        value: &Value,
    ) -> ScimResult<usize> {
        let definition = chain[level];
        let filter = path.filter_at(level);
        trace!("Writing segment '{}' at level {}", definition.name, level);

        if level + 1 == chain.len() {
            return match filter {
                None => {
                    let mut decoded = self
                        .codec
                        .factory()
                        .from_json(definition, value)
                        .map_err(ScimError::into_syntax_error)?;
                    if let AttributeValue::MultiValued(multi) = &mut decoded {
                        multi.ensure_single_primary();
                    }
                    guard_protected(
                        definition,
                        &decoded,
                        lookup(attributes, &definition.name),
                        path.as_str(),
                    )?;
                    insert_attribute(attributes, decoded);
                    Ok(1)
                }
                Some(filter) => match lookup_mut(attributes, &definition.name) {
                    Some(AttributeValue::MultiValued(multi)) => {
                        self.replace_matching(multi, definition, filter, value)
                    }
                    Some(_) => Err(filter_on_single(definition)),
                    None => Ok(0),
                },
            };
        }

        let created = position_of(attributes, &definition.name).is_none();
        if created {
            if filter.is_some() {
                return Ok(0);
            }
            let factory = self.codec.factory();
            let container = if definition.multi_valued {
                let mut multi = factory.empty_multi_valued(definition);
                multi.push_entry(factory.empty_complex(definition))?;
                AttributeValue::MultiValued(multi)
            } else {
                AttributeValue::Complex(factory.empty_complex(definition))
            };
            trace!("Creating container '{}'", definition.name);
            insert_attribute(attributes, container);
        }

        let written = match lookup_mut(attributes, &definition.name) {
            Some(AttributeValue::Complex(complex)) => {
                self.write_at(complex.sub_attributes_mut(), chain, path, level + 1, value)?
            }
            Some(AttributeValue::MultiValued(multi)) if multi.is_complex() || multi.is_empty() => {
                if multi.is_empty() && filter.is_none() {
                    multi.push_entry(self.codec.factory().empty_complex(definition))?;
                }
                let mut written = 0;
                let mut touched = Vec::new();
                for (index, entry) in multi.entries_mut().enumerate() {
                    if let Some(filter) = filter {
                        if !filter.matches_entry(entry)? {
                            continue;
                        }
                    }
                    written += self.write_at(entry.sub_attributes_mut(), chain, path, level + 1, value)?;
                    touched.push(index);
                }
                if chain[level + 1].name.eq_ignore_ascii_case(PRIMARY) && value.as_bool() == Some(true) {
                    demote_others(multi, &touched);
                }
                written
            }
            _ => {
                return Err(ScimError::invalid_path(format!(
                    "Attribute '{}' has no sub-attributes",
                    definition.name
                )));
            }
        };
        Ok(written)
    }

    /// Overwrite the entries (or scalars) of `multi` that satisfy `filter`.
    fn replace_matching(
        &self,
        multi: &mut MultiValuedAttribute,
        definition: &AttributeDefinition,
        filter: &FilterExpression,
        value: &Value,
    ) -> ScimResult<usize> {
        if !multi.is_complex() {
            let replacement = SimpleValue::from_json(&definition.name, definition.data_type, value)
                .map_err(ScimError::into_syntax_error)?;
            let case_exact = multi.characteristics().case_exact;
            let mut matched = 0;
            let mut values = Vec::with_capacity(multi.len());
            for primitive in multi.primitives() {
                if filter.matches_primitive(primitive, case_exact)? {
                    if definition.is_immutable() && !primitive.equals(&replacement, true) {
                        return Err(protected(&definition.name));
                    }
                    matched += 1;
                    values.push(replacement.clone());
                } else {
                    values.push(primitive.clone());
                }
            }
            if matched > 0 {
                multi.replace_values(MultiValuedAttribute::from_primitives(&definition.name, values));
            }
            return Ok(matched);
        }

        let incoming = self
            .codec
            .factory()
            .complex_from_json(definition, value)
            .map_err(ScimError::into_syntax_error)?;
        let promotes = incoming.is_primary();
        let mut touched = Vec::new();
        for (index, entry) in multi.entries_mut().enumerate() {
            if !filter.matches_entry(entry)? {
                continue;
            }
            for sub in incoming.iter() {
                if let Some(sub_definition) = definition.sub_attribute(sub.name()) {
                    let qualified = format!("{}.{}", definition.name, sub_definition.name);
                    guard_protected(sub_definition, sub, entry.get(sub.name()), &qualified)?;
                }
            }
            for sub in incoming.iter() {
                entry.insert(sub.deep_copy());
            }
            touched.push(index);
        }
        if promotes {
            demote_others(multi, &touched);
        }
        Ok(touched.len())
    }

    /// Merge the object of a path-less add or replace into `resource`.
    fn merge_fragment(&self, resource: &mut Resource, value: &Value, mode: Merge) -> ScimResult<()> {
        if !value.is_object() {
            return Err(ScimError::invalid_syntax(
                "Path-less PATCH value must be a JSON object",
            ));
        }
        let fragment = self
            .codec
            .decode_fragment(value, self.schema)
            .map_err(ScimError::into_syntax_error)?;
        let (_, incoming) = fragment.into_parts();
        self.merge_into(
            resource.attributes_mut(),
            incoming,
            self.schema.attributes(),
            mode,
            "",
        )
    }

    fn merge_into(
        &self,
        target: &mut IndexMap<String, AttributeValue>,
        incoming: IndexMap<String, AttributeValue>,
        definitions: &[AttributeDefinition],
        mode: Merge,
        prefix: &str,
    ) -> ScimResult<()> {
        for (name, value) in incoming {
            let definition = find_definition(definitions, &name);
            let qualified = if prefix.is_empty() {
                name.clone()
            } else {
                format!("{}.{}", prefix, name)
            };
            trace!("Merging '{}' ({:?})", qualified, mode);

            if let Some(definition) = definition {
                let existing = lookup(target, &name);
                if existing.map(AttributeValue::to_json) == Some(value.to_json()) {
                    continue;
                }
                guard_protected(definition, &value, existing, &qualified)?;
            }

            let sub_definitions = definition
                .map(|definition| definition.sub_attributes.as_slice())
                .unwrap_or(&[]);
            let Some(existing) = lookup_mut(target, &name) else {
                let mut value = value;
                if let AttributeValue::MultiValued(multi) = &mut value {
                    multi.ensure_single_primary();
                }
                insert_attribute(target, value);
                continue;
            };
            match (mode, existing, value) {
                (_, AttributeValue::Complex(existing), AttributeValue::Complex(value)) => {
                    self.merge_into(
                        existing.sub_attributes_mut(),
                        value.into_sub_attributes(),
                        sub_definitions,
                        mode,
                        &qualified,
                    )?;
                }
                (Merge::Add, AttributeValue::MultiValued(existing), AttributeValue::MultiValued(value)) => {
                    let appended = existing.append(value, self.config.skip_duplicate_values)?;
                    trace!("Appended {} values to '{}'", appended, qualified);
                    existing.ensure_single_primary();
                }
                (_, slot, mut value) => {
                    if let AttributeValue::MultiValued(multi) = &mut value {
                        multi.ensure_single_primary();
                    }
                    *slot = value;
                }
            }
        }
        Ok(())
    }

    /// Keep `schemas` in step with the extension containers present.
    fn sync_schemas(&self, resource: &mut Resource) {
        for extension in self.schema.extensions() {
            if resource.contains(&extension.uri) {
                if resource.add_schema(extension.uri.clone()) {
                    debug!("Added extension schema {}", extension.uri);
                }
            } else if resource.remove_schema(&extension.uri) {
                debug!("Removed extension schema {}", extension.uri);
            }
        }
    }
}

fn lookup<'a>(attributes: &'a IndexMap<String, AttributeValue>, name: &str) -> Option<&'a AttributeValue> {
    position_of(attributes, name)
        .and_then(|index| attributes.get_index(index))
        .map(|(_, value)| value)
}

fn lookup_mut<'a>(
    attributes: &'a mut IndexMap<String, AttributeValue>,
    name: &str,
) -> Option<&'a mut AttributeValue> {
    let index = position_of(attributes, name)?;
    attributes.get_index_mut(index).map(|(_, value)| value)
}

fn protected(name: &str) -> ScimError {
    warn!("PATCH value changes protected attribute '{}'", name);
    ScimError::mutability(format!("Attribute '{}' cannot be modified", name))
}

/// Reject `incoming` when it changes a readOnly node, or an immutable node that
/// already holds a value, anywhere below `definition`. New multi-valued entries
/// have no previous value, so only their readOnly sub-attributes are locked.
fn guard_protected(
    definition: &AttributeDefinition,
    incoming: &AttributeValue,
    existing: Option<&AttributeValue>,
    qualified: &str,
) -> ScimResult<()> {
    if existing.map(AttributeValue::to_json) == Some(incoming.to_json()) {
        return Ok(());
    }
    if definition.is_read_only() || (definition.is_immutable() && existing.is_some()) {
        return Err(protected(qualified));
    }
    match incoming {
        AttributeValue::Complex(complex) => {
            let existing = existing.and_then(AttributeValue::as_complex);
            guard_sub_attributes(definition, complex, existing, qualified)
        }
        AttributeValue::MultiValued(multi) if multi.is_complex() => {
            let known: Vec<Value> = existing
                .and_then(AttributeValue::as_multi_valued)
                .map(|existing| existing.entries().iter().map(ComplexAttribute::to_json).collect())
                .unwrap_or_default();
            for entry in multi.entries() {
                if !known.contains(&entry.to_json()) {
                    guard_sub_attributes(definition, entry, None, qualified)?;
                }
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

fn guard_sub_attributes(
    definition: &AttributeDefinition,
    incoming: &ComplexAttribute,
    existing: Option<&ComplexAttribute>,
    qualified: &str,
) -> ScimResult<()> {
    for sub in incoming.iter() {
        if let Some(sub_definition) = definition.sub_attribute(sub.name()) {
            guard_protected(
                sub_definition,
                sub,
                existing.and_then(|existing| existing.get(sub.name())),
                &format!("{}.{}", qualified, sub_definition.name),
            )?;
        }
    }
    Ok(())
}

fn filter_on_single(definition: &AttributeDefinition) -> ScimError {
    ScimError::invalid_path(format!(
        "Filter applied to single-valued attribute '{}'",
        definition.name
    ))
}

/// Clear `primary` on every entry not listed in `keep`.
fn demote_others(multi: &mut MultiValuedAttribute, keep: &[usize]) {
    for (index, entry) in multi.entries_mut().enumerate() {
        if keep.contains(&index) || !entry.is_primary() {
            continue;
        }
        if let Some(AttributeValue::Simple(primary)) = entry.get_mut(PRIMARY) {
            primary.set_value(SimpleValue::Boolean(false));
        }
    }
}

/// Remove the value addressed by `chain`, dropping containers left without
/// values. Returns whether anything was removed.
fn remove_at(
    attributes: &mut IndexMap<String, AttributeValue>,
    chain: &[&AttributeDefinition],
    path: &AttributePath,
    level: usize,
) -> ScimResult<bool> {
    let definition = chain[level];
    let Some(index) = position_of(attributes, &definition.name) else {
        return Ok(false);
    };
    let terminal = level + 1 == chain.len();
    let filter = path.filter_at(level);
    trace!("Removing through segment '{}' at level {}", definition.name, level);

    if terminal && filter.is_none() {
        attributes.shift_remove_index(index);
        return Ok(true);
    }

    let Some((_, value)) = attributes.get_index_mut(index) else {
        return Ok(false);
    };
    let removed = match (value, filter) {
        (AttributeValue::MultiValued(multi), Some(filter)) if terminal => {
            remove_matching(multi, filter)?
        }
        (_, Some(_)) if terminal => return Err(filter_on_single(definition)),
        (AttributeValue::Complex(complex), None) => {
            remove_at(complex.sub_attributes_mut(), chain, path, level + 1)?
        }
        (AttributeValue::MultiValued(multi), filter) => {
            let mut removed = false;
            for entry in multi.entries_mut() {
                if let Some(filter) = filter {
                    if !filter.matches_entry(entry)? {
                        continue;
                    }
                }
                removed |= remove_at(entry.sub_attributes_mut(), chain, path, level + 1)?;
            }
            multi.retain_entries(|entry: &ComplexAttribute| !entry.is_empty());
            removed
        }
        (AttributeValue::Complex(_), Some(_)) => return Err(filter_on_single(definition)),
        (AttributeValue::Simple(_), _) => false,
    };

    let emptied = attributes
        .get_index(index)
        .is_some_and(|(_, value)| value.is_value_less());
    if emptied {
        trace!("Dropping emptied '{}'", definition.name);
        attributes.shift_remove_index(index);
    }
    Ok(removed)
}

fn remove_matching(multi: &mut MultiValuedAttribute, filter: &FilterExpression) -> ScimResult<bool> {
    let removed = if multi.is_complex() {
        let mut failure = None;
        let removed = multi.retain_entries(|entry| match filter.matches_entry(entry) {
            Ok(matched) => !matched,
            Err(error) => {
                failure.get_or_insert(error);
                true
            }
        });
        if let Some(error) = failure {
            return Err(error);
        }
        removed
    } else {
        let case_exact = multi.characteristics().case_exact;
        let mut failure = None;
        let removed = multi.retain_primitives(|primitive| match filter.matches_primitive(primitive, case_exact) {
            Ok(matched) => !matched,
            Err(error) => {
                failure.get_or_insert(error);
                true
            }
        });
        if let Some(error) = failure {
            return Err(error);
        }
        removed
    };
    Ok(removed > 0)
}
