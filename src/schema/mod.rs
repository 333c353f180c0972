//! Output schema model.
//!
//! The builder produces these types, an execution engine consumes them. Every
//! generated field carries a [`Resolver`]; [`SchemaTypes`] renders the whole
//! set as GraphQL SDL.

pub mod builder;
pub mod mapper;

use indexmap::IndexMap;
use std::collections::HashSet;
use std::fmt;

use crate::error::ResolveError;
use crate::extraction::extract_field;
use crate::path::FieldPath;
use crate::resolve::{ResolveParams, Resolver};
use crate::value::Value;

pub use builder::{BuildPhase, ObjectBuilder};

/// Built-in and custom scalar types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scalar {
    Boolean,
    Int,
    Float,
    String,
    DateTime,
    /// Argument type of list `filter`
    ListFilter,
    /// Argument type of list `sort`
    SortFilter,
}

impl Scalar {
    pub fn name(&self) -> &'static str {
        match self {
            Scalar::Boolean => "Boolean",
            Scalar::Int => "Int",
            Scalar::Float => "Float",
            Scalar::String => "String",
            Scalar::DateTime => "DateTime",
            Scalar::ListFilter => "ListFilter",
            Scalar::SortFilter => "SortFilter",
        }
    }

    /// Description of the custom scalars, `None` for GraphQL built-ins.
    pub fn description(&self) -> Option<&'static str> {
        match self {
            Scalar::DateTime => Some("An RFC 3339 date and time."),
            Scalar::ListFilter => Some(
                "A JSON object used for filtering list items, includes a required field 'Operation' and optional fields 'Argument' and 'Field'.",
            ),
            Scalar::SortFilter => {
                Some("A JSON object used for sorting list items, includes optional field 'Field' and 'Order'.")
            }
            _ => None,
        }
    }
}

/// The type of a field or argument
#[derive(Debug, Clone)]
pub enum SchemaType {
    Scalar(Scalar),
    Object(Box<ObjectType>),
    /// Reference to an interface by its generated name
    Interface(String),
    List(Box<SchemaType>),
    NonNull(Box<SchemaType>),
}

impl SchemaType {
    pub fn non_null(inner: SchemaType) -> Self {
        match inner {
            SchemaType::NonNull(_) => inner,
            other => SchemaType::NonNull(Box::new(other)),
        }
    }

    pub fn list(element: SchemaType) -> Self {
        SchemaType::List(Box::new(element))
    }

    pub fn is_non_null(&self) -> bool {
        matches!(self, SchemaType::NonNull(_))
    }

    /// The type with an outer non-null wrapper removed.
    pub fn nullable(&self) -> &SchemaType {
        match self {
            SchemaType::NonNull(inner) => inner,
            other => other,
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self.nullable(), SchemaType::List(_))
    }

    /// The object type found under any list and non-null wrappers.
    pub fn object(&self) -> Option<&ObjectType> {
        match self {
            SchemaType::Object(object) => Some(object),
            SchemaType::List(inner) | SchemaType::NonNull(inner) => inner.object(),
            _ => None,
        }
    }

    pub fn object_mut(&mut self) -> Option<&mut ObjectType> {
        match self {
            SchemaType::Object(object) => Some(object),
            SchemaType::List(inner) | SchemaType::NonNull(inner) => inner.object_mut(),
            _ => None,
        }
    }
}

impl fmt::Display for SchemaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaType::Scalar(scalar) => write!(f, "{}", scalar.name()),
            SchemaType::Object(object) => write!(f, "{}", object.name),
            SchemaType::Interface(name) => write!(f, "{}", name),
            SchemaType::List(inner) => write!(f, "[{}]", inner),
            SchemaType::NonNull(inner) => write!(f, "{}!", inner),
        }
    }
}

/// A field argument
#[derive(Debug, Clone)]
pub struct Argument {
    pub name: String,
    pub ty: SchemaType,
    pub description: Option<String>,
}

impl Argument {
    pub fn new(name: impl Into<String>, ty: SchemaType) -> Self {
        Self {
            name: name.into(),
            ty,
            description: None,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A field of an object or interface type.
///
/// Custom fields are built the same way as generated ones:
///
/// ```
/// use std::sync::Arc;
/// use nomnom_graphql::resolve::ResolveParams;
/// use nomnom_graphql::schema::{Field, Scalar, SchemaType};
/// use nomnom_graphql::Value;
///
/// let field = Field::new("answer", SchemaType::Scalar(Scalar::Int))
///     .description("Always 42")
///     .resolver(Arc::new(|_params: &ResolveParams<'_>| Ok(Value::Int(42))));
/// assert_eq!(field.ty.to_string(), "Int");
/// ```
#[derive(Clone)]
pub struct Field {
    pub name: String,
    pub ty: SchemaType,
    pub description: Option<String>,
    pub deprecation_reason: Option<String>,
    pub args: IndexMap<String, Argument>,
    pub resolver: Option<Resolver>,
}

impl Field {
    pub fn new(name: impl Into<String>, ty: SchemaType) -> Self {
        Self {
            name: name.into(),
            ty,
            description: None,
            deprecation_reason: None,
            args: IndexMap::new(),
            resolver: None,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn deprecation_reason(mut self, reason: impl Into<String>) -> Self {
        self.deprecation_reason = Some(reason.into());
        self
    }

    pub fn argument(mut self, argument: Argument) -> Self {
        self.args.insert(argument.name.clone(), argument);
        self
    }

    pub fn resolver(mut self, resolver: Resolver) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Run the field's resolver. A field without one pulls its own name from
    /// the source record.
    pub fn resolve(&self, params: &ResolveParams<'_>) -> Result<Value, ResolveError> {
        match &self.resolver {
            Some(resolver) => resolver(params),
            None => extract_field(params.source, &self.name)
                .cloned()
                .ok_or_else(|| ResolveError::FieldNotFound(self.name.clone())),
        }
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("ty", &self.ty)
            .field("description", &self.description)
            .field("deprecation_reason", &self.deprecation_reason)
            .field("args", &self.args)
            .field("resolver", &self.resolver.is_some())
            .finish()
    }
}

/// A GraphQL object type
#[derive(Debug, Clone, Default)]
pub struct ObjectType {
    pub name: String,
    pub fields: IndexMap<String, Field>,
    /// Names of the interfaces the object implements
    pub interfaces: Vec<String>,
}

impl ObjectType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.get(name)
    }
}

/// A GraphQL interface type, built from an embedded record
#[derive(Debug, Clone, Default)]
pub struct InterfaceType {
    pub name: String,
    pub fields: IndexMap<String, Field>,
}

impl InterfaceType {
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.get(name)
    }
}

/// Walk `path` through nested object fields and return the object at its end.
///
/// Only fields whose type is an object (possibly wrapped in lists or non-null)
/// can be followed. An empty path finds nothing.
pub(crate) fn find_object_field_mut<'a>(
    fields: &'a mut IndexMap<String, Field>,
    path: &[String],
) -> Option<&'a mut ObjectType> {
    let (first, rest) = path.split_first()?;
    let child = fields.get_mut(first)?.ty.object_mut()?;
    if rest.is_empty() {
        return Some(child);
    }
    find_object_field_mut(&mut child.fields, rest)
}

/// Custom fields to overlay onto generated types, keyed by structural path.
///
/// The root segment is a record or embedded shape name, following segments are
/// field names of nested objects, e.g. `Article_author` for fields added to the
/// object in the `author` field of `Article`.
pub type FieldAdditions = IndexMap<FieldPath, Vec<Field>>;

/// The finished output of an [`ObjectBuilder`].
#[derive(Debug, Clone, Default)]
pub struct SchemaTypes {
    /// Top level object types, one per record, by generated name
    pub objects: IndexMap<String, ObjectType>,
    /// Interface types by embedded record name
    pub interfaces: IndexMap<String, InterfaceType>,
    pub prefix: String,
}

impl SchemaTypes {
    /// Look up a top level object by generated name
    pub fn object(&self, name: &str) -> Option<&ObjectType> {
        self.objects.get(name)
    }

    /// Look up an interface by embedded record name
    pub fn interface(&self, shape: &str) -> Option<&InterfaceType> {
        self.interfaces.get(shape)
    }

    /// Pick the object type for a value returned through an interface field.
    pub fn resolve_type(&self, value: &Value) -> Option<&ObjectType> {
        let record = value.as_record()?;
        let name = format!("{}{}", self.prefix, record.name()).to_lowercase();
        self.objects.get(&name)
    }

    /// Every object type reachable from the top level ones, each once.
    pub fn all_objects(&self) -> Vec<&ObjectType> {
        let mut seen = HashSet::new();
        let mut all = Vec::new();
        for interface in self.interfaces.values() {
            collect_nested(&interface.fields, &mut seen, &mut all);
        }
        for object in self.objects.values() {
            if seen.insert(object.name.as_str()) {
                all.push(object);
            }
            collect_nested(&object.fields, &mut seen, &mut all);
        }
        all
    }
}

fn collect_nested<'a>(
    fields: &'a IndexMap<String, Field>,
    seen: &mut HashSet<&'a str>,
    all: &mut Vec<&'a ObjectType>,
) {
    for field in fields.values() {
        if let Some(object) = field.ty.object() {
            if seen.insert(object.name.as_str()) {
                all.push(object);
            }
            collect_nested(&object.fields, seen, all);
        }
    }
}

/// Quote `s` as a GraphQL string literal.
fn graphql_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            c if c.is_control() => out.push_str(&format!("\\u{:04X}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

fn write_description(f: &mut fmt::Formatter<'_>, indent: &str, description: &str) -> fmt::Result {
    writeln!(f, "{}{}", indent, graphql_string(description))
}

fn write_fields(f: &mut fmt::Formatter<'_>, fields: &IndexMap<String, Field>) -> fmt::Result {
    for field in fields.values() {
        if let Some(description) = &field.description {
            write_description(f, "  ", description)?;
        }
        write!(f, "  {}", field.name)?;
        if !field.args.is_empty() {
            let args: Vec<String> = field
                .args
                .values()
                .map(|arg| format!("{}: {}", arg.name, arg.ty))
                .collect();
            write!(f, "({})", args.join(", "))?;
        }
        write!(f, ": {}", field.ty)?;
        if let Some(reason) = &field.deprecation_reason {
            write!(f, " @deprecated(reason: {})", graphql_string(reason))?;
        }
        writeln!(f)?;
    }
    Ok(())
}

/// Render GraphQL SDL: custom scalars, interfaces, then object types.
impl fmt::Display for SchemaTypes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for scalar in [Scalar::DateTime, Scalar::ListFilter, Scalar::SortFilter] {
            if let Some(description) = scalar.description() {
                write_description(f, "", description)?;
            }
            writeln!(f, "scalar {}", scalar.name())?;
            writeln!(f)?;
        }

        for interface in self.interfaces.values() {
            writeln!(f, "interface {} {{", interface.name)?;
            write_fields(f, &interface.fields)?;
            writeln!(f, "}}")?;
            writeln!(f)?;
        }

        for object in self.all_objects() {
            write!(f, "type {}", object.name)?;
            if !object.interfaces.is_empty() {
                write!(f, " implements {}", object.interfaces.join(" & "))?;
            }
            writeln!(f, " {{")?;
            write_fields(f, &object.fields)?;
            writeln!(f, "}}")?;
            writeln!(f)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nested() -> ObjectType {
        let mut leaf = ObjectType::new("article_leaf");
        leaf.fields.insert(
            "name".to_string(),
            Field::new("name", SchemaType::non_null(SchemaType::Scalar(Scalar::String))),
        );

        let mut article = ObjectType::new("article");
        article.fields.insert(
            "leaf".to_string(),
            Field::new(
                "leaf",
                SchemaType::non_null(SchemaType::list(SchemaType::Object(Box::new(leaf)))),
            ),
        );
        article
    }

    #[test]
    fn test_schema_type_display() {
        let ty = SchemaType::non_null(SchemaType::list(SchemaType::Scalar(Scalar::Int)));
        assert_eq!(ty.to_string(), "[Int]!");
        assert!(ty.is_list());
        assert!(ty.is_non_null());
    }

    #[test]
    fn test_non_null_is_not_doubled() {
        let ty = SchemaType::non_null(SchemaType::non_null(SchemaType::Scalar(Scalar::Int)));
        assert_eq!(ty.to_string(), "Int!");
    }

    #[test]
    fn test_find_object_field_mut() {
        let mut article = nested();
        let found = find_object_field_mut(&mut article.fields, &["leaf".to_string()]).unwrap();
        assert_eq!(found.name, "article_leaf");

        assert!(find_object_field_mut(&mut article.fields, &[]).is_none());
        assert!(find_object_field_mut(&mut article.fields, &["leaf".to_string(), "name".to_string()]).is_none());
        assert!(find_object_field_mut(&mut article.fields, &["bogus".to_string()]).is_none());
    }

    #[test]
    fn test_sdl_includes_nested_objects() {
        let mut types = SchemaTypes::default();
        types.objects.insert("article".to_string(), nested());

        let sdl = types.to_string();
        assert!(sdl.contains("type article {\n  leaf: [article_leaf]!\n}"));
        assert!(sdl.contains("type article_leaf {\n  name: String!\n}"));
        assert!(sdl.contains("scalar ListFilter"));
    }

    #[test]
    fn test_sdl_deprecation() {
        let mut object = ObjectType::new("thing");
        object.fields.insert(
            "old".to_string(),
            Field::new("old", SchemaType::Scalar(Scalar::String)).deprecation_reason("DEPRECATED: use new"),
        );
        let mut types = SchemaTypes::default();
        types.objects.insert("thing".to_string(), object);

        assert!(types
            .to_string()
            .contains("  old: String @deprecated(reason: \"DEPRECATED: use new\")\n"));
    }

    #[test]
    fn test_graphql_string_escapes() {
        assert_eq!(graphql_string("plain"), r#""plain""#);
        assert_eq!(graphql_string("say \"hi\"\\now"), r#""say \"hi\"\\now""#);
        assert_eq!(graphql_string("two\nlines\ttab"), r#""two\nlines\ttab""#);
        assert_eq!(graphql_string("bell\u{7}"), r#""bell\u0007""#);
        assert_eq!(graphql_string("caf\u{e9} \u{1F980}"), "\"caf\u{e9} \u{1F980}\"");
    }

    #[test]
    fn test_sdl_escapes_descriptions_and_reasons() {
        let mut object = ObjectType::new("thing");
        object.fields.insert(
            "old".to_string(),
            Field::new("old", SchemaType::Scalar(Scalar::String))
                .description("first\nsecond \u{1}")
                .deprecation_reason("DEPRECATED: use \"new\""),
        );
        let mut types = SchemaTypes::default();
        types.objects.insert("thing".to_string(), object);

        let sdl = types.to_string();
        assert!(sdl.contains("  \"first\\nsecond \\u0001\"\n"), "{}", sdl);
        assert!(sdl.contains("  old: String @deprecated(reason: \"DEPRECATED: use \\\"new\\\"\")\n"), "{}", sdl);
        assert!(!sdl.contains("\\u{"));
    }
}
