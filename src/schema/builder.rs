//! Object and interface builder.
//!
//! Turns a set of record definitions into GraphQL object types. Every exported
//! root level embedded record becomes an interface, and every record embedding
//! it implements that interface and carries its fields.
//!
//! The builder moves through three phases. Interfaces can be built on their own
//! so custom fields can reference them before the object types are built.

use indexmap::IndexMap;
use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::definition::{Describe, RecordDef};
use crate::error::BuildError;
use crate::extraction::extract_embeds;
use crate::path::{FieldPath, FIELD_PATH_SEPARATOR};
use crate::query::comparator::ComparatorRegistry;
use crate::schema::{find_object_field_mut, Field, FieldAdditions, InterfaceType, ObjectType, SchemaTypes};

/// Progress of an [`ObjectBuilder`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildPhase {
    Empty,
    InterfacesBuilt,
    TypesBuilt,
}

/// Builds GraphQL object and interface types from record definitions.
///
/// # Example
///
/// ```
/// use nomnom_graphql::{FieldDef, ObjectBuilder, RecordDef, TypeDescriptor};
///
/// let base = RecordDef::new("TestBase").field(FieldDef::new("Id", TypeDescriptor::String));
/// let article = RecordDef::new("Article")
///     .field(FieldDef::embed(base))
///     .field(FieldDef::new("Headline", TypeDescriptor::String));
///
/// let types = ObjectBuilder::new([article], "", None).unwrap().finish().unwrap();
///
/// let object = types.object("article").unwrap();
/// assert_eq!(object.interfaces, vec!["TestBase".to_string()]);
/// assert!(object.field("id").is_some());
/// assert!(object.field("headline").is_some());
/// ```
pub struct ObjectBuilder {
    pub(super) records: Vec<Arc<RecordDef>>,
    pub(super) prefix: String,
    pub(super) field_additions: FieldAdditions,
    /// Indexes into `field_additions` that matched a generated type
    pub(super) applied_additions: HashSet<usize>,
    pub(super) operations: Arc<ComparatorRegistry>,
    pub(super) type_names: HashSet<String>,
    interfaces: IndexMap<String, InterfaceType>,
    objects: IndexMap<String, ObjectType>,
    phase: BuildPhase,
}

impl ObjectBuilder {
    /// Create a builder.
    ///
    /// # Arguments
    ///
    /// * `records` - Record definitions, one object type is built per record
    /// * `name_prefix` - Prepended to every generated type name, may not contain `_`
    /// * `field_additions` - Custom fields overlaid onto generated types
    ///
    /// # Returns
    ///
    /// * `Err(BuildError::InvalidPrefix)` - The prefix contains the path separator
    /// * `Err(BuildError::EmbeddedNotRecord)` - A definition embeds a non-record field
    pub fn new<I, R>(
        records: I,
        name_prefix: &str,
        field_additions: Option<FieldAdditions>,
    ) -> Result<Self, BuildError>
    where
        I: IntoIterator<Item = R>,
        R: Into<Arc<RecordDef>>,
    {
        if name_prefix.contains(FIELD_PATH_SEPARATOR) {
            return Err(BuildError::InvalidPrefix {
                prefix: name_prefix.to_string(),
            });
        }

        let records: Vec<Arc<RecordDef>> = records.into_iter().map(Into::into).collect();
        for record in &records {
            record.validate()?;
        }

        Ok(Self {
            records,
            prefix: name_prefix.to_string(),
            field_additions: field_additions.unwrap_or_default(),
            applied_additions: HashSet::new(),
            operations: Arc::new(ComparatorRegistry::with_builtins()),
            type_names: HashSet::new(),
            interfaces: IndexMap::new(),
            objects: IndexMap::new(),
            phase: BuildPhase::Empty,
        })
    }

    /// Add the record published by a Rust type.
    ///
    /// # Example
    ///
    /// ```
    /// use nomnom_graphql::{Describe, FieldDef, ObjectBuilder, RecordDef, TypeDescriptor};
    ///
    /// struct Article;
    ///
    /// impl Describe for Article {
    ///     fn record_def() -> RecordDef {
    ///         RecordDef::new("Article").field(FieldDef::new("Headline", TypeDescriptor::String))
    ///     }
    /// }
    ///
    /// let types = ObjectBuilder::new(Vec::<RecordDef>::new(), "", None)
    ///     .and_then(|builder| builder.describe::<Article>())
    ///     .and_then(|builder| builder.finish())
    ///     .unwrap();
    /// assert!(types.object("article").unwrap().field("headline").is_some());
    /// ```
    ///
    /// # Returns
    ///
    /// * `Err(BuildError::InterfacesAlreadyBuilt)` - Interfaces were built from the earlier records
    /// * `Err(BuildError::EmbeddedNotRecord)` - The definition embeds a non-record field
    pub fn describe<T: Describe>(mut self) -> Result<Self, BuildError> {
        if self.phase != BuildPhase::Empty {
            return Err(BuildError::InterfacesAlreadyBuilt);
        }

        let def = T::record_def();
        def.validate()?;
        self.records.push(Arc::new(def));
        Ok(self)
    }

    /// Use a custom operation registry for the list filters of generated fields.
    pub fn with_operations(mut self, operations: Arc<ComparatorRegistry>) -> Self {
        self.operations = operations;
        self
    }

    pub fn phase(&self) -> BuildPhase {
        self.phase
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn records(&self) -> &[Arc<RecordDef>] {
        &self.records
    }

    /// Interfaces built so far, keyed by embedded record name
    pub fn interfaces(&self) -> &IndexMap<String, InterfaceType> {
        &self.interfaces
    }

    /// Object types built so far, keyed by generated name
    pub fn objects(&self) -> &IndexMap<String, ObjectType> {
        &self.objects
    }

    /// Build one interface per distinct embedded record.
    ///
    /// Interfaces are named `prefix + record name`. Calling this again before
    /// [`ObjectBuilder::build_types`] rebuilds them; afterwards it returns the
    /// interfaces already built.
    pub fn build_interfaces(&mut self) -> Result<&IndexMap<String, InterfaceType>, BuildError> {
        if self.phase == BuildPhase::TypesBuilt {
            return Ok(&self.interfaces);
        }

        self.interfaces.clear();
        self.type_names.clear();
        self.applied_additions.clear();

        let mut all_embeds: IndexMap<String, Arc<RecordDef>> = IndexMap::new();
        for record in &self.records {
            for (name, embed) in extract_embeds(record) {
                all_embeds.entry(name).or_insert(embed);
            }
        }

        for (shape, embed) in all_embeds {
            let name = format!("{}{}", self.prefix, shape);
            self.register_type_name(&name)?;
            let fields = self.build_fields(&embed, &FieldPath::root(shape.clone()), &name, None)?;
            debug!(interface = %name, fields = fields.len(), "Built interface");
            self.interfaces.insert(shape, InterfaceType { name, fields });
        }

        self.phase = BuildPhase::InterfacesBuilt;
        Ok(&self.interfaces)
    }

    /// Register more custom fields.
    ///
    /// An entry replaces any earlier entry for the same path. If interfaces are
    /// already built, entries rooted at an interface are applied to it right
    /// away, so fields referencing an interface can be added between
    /// [`ObjectBuilder::build_interfaces`] and [`ObjectBuilder::build_types`].
    pub fn add_custom_fields(&mut self, additions: FieldAdditions) -> Result<(), BuildError> {
        if self.phase == BuildPhase::TypesBuilt {
            return Err(BuildError::TypesAlreadyBuilt);
        }

        for (path, fields) in additions {
            let existing = self.field_additions.keys().position(|key| key.same_shape(&path));
            let index = match existing {
                Some(index) => {
                    if let Some((_, slot)) = self.field_additions.get_index_mut(index) {
                        *slot = fields;
                    }
                    index
                }
                None => self.field_additions.insert_full(path, fields).0,
            };

            if self.phase == BuildPhase::InterfacesBuilt {
                let Some((path, fields)) = self
                    .field_additions
                    .get_index(index)
                    .map(|(path, fields)| (path.clone(), fields.clone()))
                else {
                    continue;
                };
                if self.apply_to_interface(&path, &fields) {
                    self.applied_additions.insert(index);
                }
            }
        }

        Ok(())
    }

    /// Returns whether the path named an interface object the fields were added to.
    fn apply_to_interface(&mut self, path: &FieldPath, fields: &[Field]) -> bool {
        let Some(root) = path.first() else {
            return false;
        };
        let Some(interface) = self
            .interfaces
            .iter_mut()
            .find(|(shape, _)| shape.eq_ignore_ascii_case(root))
            .map(|(_, interface)| interface)
        else {
            return false;
        };

        let rest = &path.segments()[1..];
        let target = if rest.is_empty() {
            &mut interface.fields
        } else {
            match find_object_field_mut(&mut interface.fields, rest) {
                Some(object) => &mut object.fields,
                None => {
                    warn!(path = %path, "Custom fields target no object inside the interface");
                    return false;
                }
            }
        };

        for field in fields {
            target.insert(field.name.clone(), field.clone());
        }
        true
    }

    /// Build one object type per record, building interfaces first if needed.
    pub fn build_types(&mut self) -> Result<&IndexMap<String, ObjectType>, BuildError> {
        match self.phase {
            BuildPhase::TypesBuilt => return Ok(&self.objects),
            BuildPhase::Empty => {
                self.build_interfaces()?;
            }
            BuildPhase::InterfacesBuilt => {}
        }

        let records = self.records.clone();
        for record in records {
            let mut implemented = Vec::new();
            let mut base_fields = IndexMap::new();
            for shape in extract_embeds(&record).keys() {
                if let Some(interface) = self.interfaces.get(shape) {
                    implemented.push(interface.name.clone());
                    for (name, field) in &interface.fields {
                        base_fields.insert(name.clone(), field.clone());
                    }
                }
            }

            let base = (!implemented.is_empty()).then_some(&base_fields);
            let object = self.build_object(&record, &FieldPath::root(record.name.clone()), implemented, base)?;
            debug!(object = %object.name, fields = object.fields.len(), "Built object");
            self.objects.insert(object.name.clone(), object);
        }

        for (index, path) in self.field_additions.keys().enumerate() {
            if !self.applied_additions.contains(&index) {
                warn!(path = %path, "Custom fields did not match any generated type");
            }
        }

        self.phase = BuildPhase::TypesBuilt;
        Ok(&self.objects)
    }

    /// Build everything and hand over the result.
    pub fn finish(mut self) -> Result<SchemaTypes, BuildError> {
        self.build_types()?;
        Ok(SchemaTypes {
            objects: self.objects,
            interfaces: self.interfaces,
            prefix: self.prefix,
        })
    }

    pub(super) fn register_type_name(&mut self, name: &str) -> Result<(), BuildError> {
        if !self.type_names.insert(name.to_string()) {
            return Err(BuildError::DuplicateTypeName(name.to_string()));
        }
        Ok(())
    }
}
