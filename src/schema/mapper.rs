//! Mapping of record fields to GraphQL fields and types.

use indexmap::IndexMap;

use tracing::debug;

use crate::definition::{FieldDef, RecordDef, TypeDescriptor};
use crate::error::BuildError;
use crate::naming::{field_name, is_omit_empty};
use crate::path::FieldPath;
use crate::resolve::{
    resolve_by_field, resolve_list_field, resolve_total_count, FILTER_ARGUMENT_NAME, SORT_ARGUMENT_NAME,
};
use crate::schema::{Argument, Field, ObjectType, Scalar, SchemaType};

use super::builder::ObjectBuilder;

const DEPRECATION_PREFIX: &str = "DEPRECATED:";

const FILTER_DESCRIPTION: &str =
    r#"A List Filter expression such as '{Field: "position", Operation: "<=", Argument: {Value: 10}}'"#;
const SORT_DESCRIPTION: &str = r#"Sort the list, ie '{Field: "position", Order: "ASC"}'"#;

/// Name of the field holding the unfiltered length of list field `name`.
///
/// ```
/// use nomnom_graphql::schema::mapper::total_field_name;
///
/// assert_eq!(total_field_name("items"), "totalItems");
/// assert_eq!(total_field_name("relatedItems"), "totalRelatedItems");
/// ```
pub fn total_field_name(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => format!("total{}{}", first.to_uppercase(), chars.as_str()),
        None => "total".to_string(),
    }
}

impl ObjectBuilder {
    /// Build the fields of a record as seen by the type `type_name`.
    ///
    /// `base` holds interface fields the type must carry. Embedded fields are
    /// skipped, their fields arrive through `base`. Custom fields registered for
    /// `path` are applied last and replace generated fields of the same name.
    pub(super) fn build_fields(
        &mut self,
        def: &RecordDef,
        path: &FieldPath,
        type_name: &str,
        base: Option<&IndexMap<String, Field>>,
    ) -> Result<IndexMap<String, Field>, BuildError> {
        let mut fields = base.cloned().unwrap_or_default();

        for field in &def.fields {
            if field.embedded || !field.exported {
                continue;
            }
            let Some(name) = field_name(field) else {
                debug!(record = %def.name, field = %field.name, "Skipping field excluded by its tag");
                continue;
            };
            let Some(ty) = self.field_type(field, &name, path)? else {
                debug!(record = %def.name, field = %field.name, ty = ?field.ty, "Skipping field with unsupported type");
                continue;
            };

            let mut gfield = Field::new(name.clone(), ty);
            match field.description.as_deref() {
                Some(description) if description.starts_with(DEPRECATION_PREFIX) => {
                    gfield.deprecation_reason = Some(description.to_string());
                }
                Some(description) => gfield.description = Some(description.to_string()),
                None => {}
            }

            if !gfield.ty.is_list() {
                gfield.resolver = Some(resolve_by_field(&name, type_name));
                fields.insert(name, gfield);
                continue;
            }

            gfield = gfield
                .argument(
                    Argument::new(FILTER_ARGUMENT_NAME, SchemaType::Scalar(Scalar::ListFilter))
                        .description(FILTER_DESCRIPTION),
                )
                .argument(
                    Argument::new(SORT_ARGUMENT_NAME, SchemaType::Scalar(Scalar::SortFilter))
                        .description(SORT_DESCRIPTION),
                )
                .resolver(resolve_list_field(&name, type_name, self.operations.clone()));

            let total_name = total_field_name(&name);
            let total = Field::new(total_name.clone(), SchemaType::Scalar(Scalar::Int))
                .description(format!(
                    "The total length of the {} list at this same level in the data, this number is unaffected by filtering.",
                    name
                ))
                .resolver(resolve_total_count(&total_name, &name, type_name));

            fields.insert(name, gfield);
            fields.insert(total_name, total);
        }

        for (index, (key, additions)) in self.field_additions.iter().enumerate() {
            if !key.same_shape(path) {
                continue;
            }
            for addition in additions {
                fields.insert(addition.name.clone(), addition.clone());
            }
            self.applied_additions.insert(index);
        }

        Ok(fields)
    }

    /// The GraphQL type of a field, non-null unless its tag says `omitempty`.
    pub(super) fn field_type(
        &mut self,
        field: &FieldDef,
        name: &str,
        parent: &FieldPath,
    ) -> Result<Option<SchemaType>, BuildError> {
        let Some(ty) = self.map_type(&field.ty, &parent.child(name))? else {
            return Ok(None);
        };

        if is_omit_empty(field) {
            Ok(Some(ty))
        } else {
            Ok(Some(SchemaType::non_null(ty)))
        }
    }

    /// Map a declared type, building nested object types for inline records.
    ///
    /// `path` locates the field, nested objects are named after it. Returns
    /// `None` for kinds with no GraphQL counterpart.
    pub(super) fn map_type(
        &mut self,
        ty: &TypeDescriptor,
        path: &FieldPath,
    ) -> Result<Option<SchemaType>, BuildError> {
        let mapped = match ty {
            TypeDescriptor::Boolean => SchemaType::Scalar(Scalar::Boolean),
            TypeDescriptor::Int => SchemaType::Scalar(Scalar::Int),
            TypeDescriptor::Float => SchemaType::Scalar(Scalar::Float),
            TypeDescriptor::String => SchemaType::Scalar(Scalar::String),
            TypeDescriptor::DateTime => SchemaType::Scalar(Scalar::DateTime),
            TypeDescriptor::List(element) => match self.map_type(element, path)? {
                Some(element) => SchemaType::list(element),
                None => return Ok(None),
            },
            TypeDescriptor::Record(def) => {
                let object = self.build_object(def, path, Vec::new(), None)?;
                SchemaType::Object(Box::new(object))
            }
            TypeDescriptor::Named(_) | TypeDescriptor::Other(_) => return Ok(None),
        };

        Ok(Some(mapped))
    }

    /// Build an object type named `lowercase(prefix + path)`.
    pub(super) fn build_object(
        &mut self,
        def: &RecordDef,
        path: &FieldPath,
        interfaces: Vec<String>,
        base: Option<&IndexMap<String, Field>>,
    ) -> Result<ObjectType, BuildError> {
        let name = format!("{}{}", self.prefix, path).to_lowercase();
        self.register_type_name(&name)?;

        let fields = self.build_fields(def, path, &name, base)?;
        Ok(ObjectType {
            name,
            fields,
            interfaces,
        })
    }
}
