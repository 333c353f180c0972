//! Field naming.
//!
//! The GraphQL name of a record field comes from its serialization tag when the
//! tag supplies a usable name, otherwise from the lowercased declared name.

use regex::Regex;
use std::sync::LazyLock;

use crate::definition::FieldDef;
use crate::path::FIELD_PATH_SEPARATOR;

/// Tag value that excludes a field entirely
const SKIP_MARKER: &str = "-";
const OMIT_EMPTY: &str = "omitempty";

/// GraphQL name grammar, http://spec.graphql.org/October2021/#Name
static NAME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[_a-zA-Z][_a-zA-Z0-9]*$").expect("static regex"));

/// A parsed serialization tag such as `name,omitempty`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SerializationTag<'a> {
    pub name: &'a str,
    pub options: Vec<&'a str>,
}

impl<'a> SerializationTag<'a> {
    pub fn parse(tag: &'a str) -> Self {
        let mut splits = tag.split(',');
        let name = splits.next().unwrap_or_default();
        Self {
            name,
            options: splits.collect(),
        }
    }

    /// `-` on its own excludes the field, `-,` names it `-` instead.
    pub fn is_skip(&self) -> bool {
        self.name == SKIP_MARKER && self.options.is_empty()
    }

    pub fn omit_empty(&self) -> bool {
        self.options.iter().any(|o| *o == OMIT_EMPTY)
    }
}

/// Check a name against the GraphQL name grammar.
pub fn is_valid_name(name: &str) -> bool {
    NAME_REGEX.is_match(name)
}

/// Remove every occurrence of the field path separator.
pub fn strip_separator(name: &str) -> String {
    name.replace(FIELD_PATH_SEPARATOR, "")
}

/// Derive the external name of a field.
///
/// Returns `None` when the tag excludes the field. A tag name is used verbatim
/// (minus separators) only if it is a valid GraphQL name, otherwise the declared
/// name is lowercased.
///
/// # Example
///
/// ```
/// use nomnom_graphql::{FieldDef, TypeDescriptor};
/// use nomnom_graphql::naming::field_name;
///
/// let field = FieldDef::new("My_Odd_Name", TypeDescriptor::String);
/// assert_eq!(field_name(&field).as_deref(), Some("myoddname"));
///
/// let tagged = FieldDef::new("Headline", TypeDescriptor::String).tag("headLine,omitempty");
/// assert_eq!(field_name(&tagged).as_deref(), Some("headLine"));
/// ```
pub fn field_name(field: &FieldDef) -> Option<String> {
    if let Some(tag) = field.tag.as_deref() {
        let tag = SerializationTag::parse(tag);
        if tag.is_skip() {
            return None;
        }
        let name = strip_separator(tag.name);
        if !name.is_empty() && is_valid_name(&name) {
            return Some(name);
        }
    }

    Some(strip_separator(&field.name).to_lowercase())
}

/// Whether the field's tag marks it as optional.
pub fn is_omit_empty(field: &FieldDef) -> bool {
    field
        .tag
        .as_deref()
        .map(|tag| SerializationTag::parse(tag).omit_empty())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::TypeDescriptor;

    fn tagged(name: &str, tag: &str) -> FieldDef {
        FieldDef::new(name, TypeDescriptor::String).tag(tag)
    }

    #[test]
    fn test_field_name_without_tag() {
        let field = FieldDef::new("Name", TypeDescriptor::String);
        assert_eq!(field_name(&field).as_deref(), Some("name"));
    }

    #[test]
    fn test_field_name_from_tag() {
        assert_eq!(field_name(&tagged("Name", "jsonName")).as_deref(), Some("jsonName"));
        assert_eq!(field_name(&tagged("Name", "json_name,omitempty")).as_deref(), Some("jsonname"));
    }

    #[test]
    fn test_field_name_skip() {
        assert_eq!(field_name(&tagged("Name", "-")), None);
        assert_eq!(field_name(&tagged("Name", "-,")).as_deref(), Some("name"));
    }

    #[test]
    fn test_field_name_invalid_tag_falls_back() {
        assert_eq!(field_name(&tagged("Name", "2fast")).as_deref(), Some("name"));
        assert_eq!(field_name(&tagged("Name", "has-dash")).as_deref(), Some("name"));
        assert_eq!(field_name(&tagged("Name", ",omitempty")).as_deref(), Some("name"));
        assert_eq!(field_name(&tagged("Name", "___")).as_deref(), Some("name"));
    }

    #[test]
    fn test_omit_empty() {
        assert!(is_omit_empty(&tagged("Name", "jsonName,omitempty")));
        assert!(is_omit_empty(&tagged("Name", ",omitempty")));
        assert!(!is_omit_empty(&tagged("Name", ",string")));
        assert!(!is_omit_empty(&tagged("Name", "-")));
        assert!(!is_omit_empty(&FieldDef::new("Name", TypeDescriptor::String)));
    }

    #[test]
    fn test_is_valid_name() {
        assert!(is_valid_name("_private"));
        assert!(is_valid_name("camelCase2"));
        assert!(!is_valid_name("9lives"));
        assert!(!is_valid_name(""));
    }
}
