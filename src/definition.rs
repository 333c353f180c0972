//! Record definitions.
//!
//! These types describe the shape of the data served through GraphQL. They can be
//! deserialized from YAML (see [`crate::config`]), built by hand, or published by
//! a Rust type through [`Describe`]. Schema building only ever reads them.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::BuildError;

fn default_exported() -> bool {
    true
}

/// The declared type of a field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum TypeDescriptor {
    Boolean,
    #[serde(alias = "Integer")]
    Int,
    Float,
    String,
    DateTime,
    List(Box<TypeDescriptor>),
    /// An inline record, mapped to a nested object type
    Record(Arc<RecordDef>),
    /// Reference to another record by name, resolved when definitions are loaded
    Named(String),
    /// Any kind that has no GraphQL counterpart, the field is left out of the schema
    Other(String),
}

impl TypeDescriptor {
    pub fn list(element: TypeDescriptor) -> Self {
        TypeDescriptor::List(Box::new(element))
    }

    pub fn record(def: RecordDef) -> Self {
        TypeDescriptor::Record(Arc::new(def))
    }

    /// The record definition if this is a record type.
    pub fn as_record(&self) -> Option<&Arc<RecordDef>> {
        match self {
            TypeDescriptor::Record(def) => Some(def),
            _ => None,
        }
    }
}

/// Field definition within a record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FieldDef {
    /// Declared field name
    pub name: String,
    /// Declared type, written as `Int` or `{ List: { Named: Leaf } }`
    #[serde(rename = "type", with = "serde_yaml::with::singleton_map_recursive")]
    pub ty: TypeDescriptor,
    /// Serialization tag, e.g. `"items,omitempty"` or `"-"`
    #[serde(default)]
    pub tag: Option<String>,
    /// Documentation, a `DEPRECATED:` prefix marks the field deprecated
    #[serde(default)]
    pub description: Option<String>,
    /// Whether the field is visible outside the record
    #[serde(default = "default_exported")]
    pub exported: bool,
    /// Whether the record type is inlined into its owner
    #[serde(default)]
    pub embedded: bool,
}

impl FieldDef {
    pub fn new(name: impl Into<String>, ty: TypeDescriptor) -> Self {
        Self {
            name: name.into(),
            ty,
            tag: None,
            description: None,
            exported: true,
            embedded: false,
        }
    }

    /// An embedded record field, named after the record it embeds.
    pub fn embed(def: RecordDef) -> Self {
        let mut field = Self::new(def.name.clone(), TypeDescriptor::record(def));
        field.embedded = true;
        field
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn unexported(mut self) -> Self {
        self.exported = false;
        self
    }

    /// The embedded record definition, if this field is a usable embedding.
    pub fn embedded_record(&self) -> Option<&Arc<RecordDef>> {
        if self.embedded && self.exported {
            self.ty.as_record()
        } else {
            None
        }
    }
}

/// Record definition
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct RecordDef {
    /// Record name
    pub name: String,
    /// Record fields in declaration order
    #[serde(default)]
    pub fields: Vec<FieldDef>,
    /// Documentation string
    #[serde(default)]
    pub doc: Option<String>,
}

impl RecordDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            doc: None,
        }
    }

    pub fn field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }

    /// Look up a field by its declared name
    pub fn get_field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Check that every embedded field holds a record, recursively.
    pub fn validate(&self) -> Result<(), BuildError> {
        for field in &self.fields {
            if field.embedded && field.ty.as_record().is_none() {
                return Err(BuildError::EmbeddedNotRecord {
                    record: self.name.clone(),
                    field: field.name.clone(),
                });
            }
            validate_type(&field.ty)?;
        }
        Ok(())
    }
}

fn validate_type(ty: &TypeDescriptor) -> Result<(), BuildError> {
    match ty {
        TypeDescriptor::Record(def) => def.validate(),
        TypeDescriptor::List(element) => validate_type(element),
        _ => Ok(()),
    }
}

/// Implemented by Rust types that publish their own record definition.
///
/// # Example
///
/// ```
/// use nomnom_graphql::{Describe, FieldDef, RecordDef, TypeDescriptor};
///
/// struct Article {
///     headline: String,
/// }
///
/// impl Describe for Article {
///     fn record_def() -> RecordDef {
///         RecordDef::new("Article")
///             .field(FieldDef::new("Headline", TypeDescriptor::String))
///     }
/// }
///
/// assert_eq!(Article::record_def().fields.len(), 1);
/// ```
pub trait Describe {
    fn record_def() -> RecordDef;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_record_def() {
        let yaml = r#"
name: Item
fields:
  - name: Name
    type: String
  - name: Values
    type:
      List: Int
    tag: "values,omitempty"
  - name: Leaf
    type:
      Record:
        name: Leaf
        fields:
          - name: Name
            type: String
"#;
        let def: RecordDef = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(def.name, "Item");
        assert_eq!(def.fields.len(), 3);
        assert_eq!(def.fields[1].ty, TypeDescriptor::list(TypeDescriptor::Int));
        assert_eq!(def.fields[1].tag.as_deref(), Some("values,omitempty"));
        assert!(def.fields[0].exported);
        assert!(!def.fields[0].embedded);
        assert_eq!(def.fields[2].ty.as_record().unwrap().name, "Leaf");
    }

    #[test]
    fn test_deserialize_flow_map_types() {
        let yaml = r#"
name: Holder
fields:
  - name: Count
    type: Integer
  - name: Tags
    type: { List: String }
  - name: Leaf
    type: { Named: Leaf }
  - name: Leaves
    type: { List: { Named: Leaf } }
  - name: Matrix
    type:
      List:
        List: Float
"#;
        let def: RecordDef = serde_yaml::from_str(yaml).unwrap();

        let types: Vec<&TypeDescriptor> = def.fields.iter().map(|f| &f.ty).collect();
        assert_eq!(
            types,
            vec![
                &TypeDescriptor::Int,
                &TypeDescriptor::list(TypeDescriptor::String),
                &TypeDescriptor::Named("Leaf".to_string()),
                &TypeDescriptor::list(TypeDescriptor::Named("Leaf".to_string())),
                &TypeDescriptor::list(TypeDescriptor::list(TypeDescriptor::Float)),
            ]
        );
    }

    #[test]
    fn test_serialized_record_def_reads_back() {
        let def = RecordDef::new("Holder")
            .field(FieldDef::new("Leaves", TypeDescriptor::list(TypeDescriptor::Named("Leaf".to_string()))));

        let yaml = serde_yaml::to_string(&def).unwrap();
        assert!(yaml.contains("List:"), "{}", yaml);
        let back: RecordDef = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back, def);
    }

    #[test]
    fn test_validate_embedded_must_be_record() {
        let mut field = FieldDef::new("Base", TypeDescriptor::String);
        field.embedded = true;
        let def = RecordDef::new("Broken").field(field);

        assert_eq!(
            def.validate(),
            Err(BuildError::EmbeddedNotRecord {
                record: "Broken".to_string(),
                field: "Base".to_string(),
            })
        );
    }

    #[test]
    fn test_embedded_record_skips_unexported() {
        let base = RecordDef::new("TestBase").field(FieldDef::new("Id", TypeDescriptor::String));
        let field = FieldDef::embed(base.clone());
        assert_eq!(field.embedded_record().unwrap().name, "TestBase");

        let hidden = FieldDef::embed(base).unexported();
        assert!(hidden.embedded_record().is_none());
    }
}
