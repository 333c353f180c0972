//! Field extraction from record values.
//!
//! Fields are matched by external name (see [`crate::naming::field_name`]).
//! Root level embedded records are searched when the record itself has no match.

use indexmap::IndexMap;
use std::sync::Arc;

use crate::definition::RecordDef;
use crate::error::ExtractError;
use crate::naming::field_name;
use crate::path::FieldPath;
use crate::value::Value;

/// Return the value of the field named `key`.
///
/// Only exported fields are considered. If the record has no direct match, each
/// exported embedded record is searched in declaration order. A value that is
/// not a record never has fields.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use nomnom_graphql::{extract_field, FieldDef, Record, RecordDef, TypeDescriptor, Value};
///
/// let def = Arc::new(RecordDef::new("TestBase").field(FieldDef::new("Id", TypeDescriptor::String)));
/// let value = Value::Record(Record::new(def).with("Id", "id").unwrap());
///
/// assert_eq!(extract_field(&value, "id"), Some(&Value::from("id")));
/// assert_eq!(extract_field(&value, "Id"), None);
/// ```
pub fn extract_field<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    let Value::Record(record) = value else {
        return None;
    };

    let mut embedded = Vec::new();
    for (field, field_value) in record.fields() {
        if !field.exported {
            continue;
        }
        if field.embedded {
            embedded.push(field_value);
        }
        if field_name(field).as_deref() == Some(key) {
            return Some(field_value);
        }
    }

    embedded
        .into_iter()
        .find_map(|embed| extract_field(embed, key))
}

/// Apply [`extract_field`] once per path segment.
///
/// Fails only when the first segment is not found. A later segment that is
/// missing yields `Ok(None)`: the path started but there was nothing at the end.
pub fn deep_extract_field<'a>(
    value: &'a Value,
    path: &FieldPath,
) -> Result<Option<&'a Value>, ExtractError> {
    let mut current = value;
    for (i, segment) in path.segments().iter().enumerate() {
        match extract_field(current, segment) {
            Some(next) => current = next,
            None if i == 0 => return Err(ExtractError::NotFound(segment.clone())),
            None => return Ok(None),
        }
    }

    Ok(Some(current))
}

/// Collect the exported root level embedded records of a definition, keyed by
/// the embedded record name.
pub fn extract_embeds(def: &RecordDef) -> IndexMap<String, Arc<RecordDef>> {
    def.fields
        .iter()
        .filter_map(|field| field.embedded_record())
        .map(|embedded| (embedded.name.clone(), embedded.clone()))
        .collect()
}
