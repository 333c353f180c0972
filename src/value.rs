//! Runtime values served by generated resolvers.
//!
//! A [`Value`] is what root resolvers hand to the generated field resolvers, and
//! what filters and sorts inspect. Record values stay bound to the
//! [`RecordDef`] they were built from so fields can be found by external name.

use chrono::{DateTime, Utc};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use std::fmt;
use std::sync::Arc;

use crate::definition::{RecordDef, TypeDescriptor};
use crate::error::ValueError;
use crate::naming::field_name;

/// A dynamically typed value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    DateTime(DateTime<Utc>),
    List(Vec<Value>),
    Record(Record),
}

impl Value {
    /// The value an absent field of the given type holds.
    pub fn zero(ty: &TypeDescriptor) -> Self {
        match ty {
            TypeDescriptor::Boolean => Value::Bool(false),
            TypeDescriptor::Int => Value::Int(0),
            TypeDescriptor::Float => Value::Float(0.0),
            TypeDescriptor::String => Value::String(String::new()),
            TypeDescriptor::Record(def) => Value::Record(Record::new(def.clone())),
            _ => Value::Null,
        }
    }

    /// Short name of the variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::DateTime(_) => "datetime",
            Value::List(_) => "list",
            Value::Record(_) => "record",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Value::Record(record) => Some(record),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(fl) => write!(f, "{}", fl),
            Value::String(s) => write!(f, "{}", s),
            Value::DateTime(dt) => write!(f, "{}", dt.to_rfc3339()),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Value::Record(record) => write!(f, "{}{{...}}", record.name()),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(dt: DateTime<Utc>) -> Self {
        Value::DateTime(dt)
    }
}

impl From<Record> for Value {
    fn from(record: Record) -> Self {
        Value::Record(record)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

/// Untyped JSON conversion, used where no record definition says otherwise.
impl From<&serde_json::Value> for Value {
    fn from(json: &serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else if let Some(f) = n.as_f64() {
                    Value::Float(f)
                } else {
                    Value::Null
                }
            }
            serde_json::Value::String(s) => Value::String(s.clone()),
            serde_json::Value::Array(items) => Value::List(items.iter().map(Value::from).collect()),
            // Without a definition a nested object has no field metadata, keep it as text
            serde_json::Value::Object(_) => Value::String(json.to_string()),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_none(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::String(s) => serializer.serialize_str(s),
            Value::DateTime(dt) => serializer.serialize_str(&dt.to_rfc3339()),
            Value::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Record(record) => record.serialize(serializer),
        }
    }
}

/// An instance of a record definition.
///
/// Holds one value per declared field, in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    def: Arc<RecordDef>,
    values: Vec<Value>,
}

impl Record {
    /// Create a record with every field at its zero value.
    pub fn new(def: Arc<RecordDef>) -> Self {
        let values = def.fields.iter().map(|f| Value::zero(&f.ty)).collect();
        Self { def, values }
    }

    pub fn def(&self) -> &Arc<RecordDef> {
        &self.def
    }

    pub fn name(&self) -> &str {
        &self.def.name
    }

    /// Get a field value by declared name
    pub fn get(&self, name: &str) -> Option<&Value> {
        let index = self.def.fields.iter().position(|f| f.name == name)?;
        self.values.get(index)
    }

    /// Set a field value by declared name
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<(), ValueError> {
        let index = self
            .def
            .fields
            .iter()
            .position(|f| f.name == name)
            .ok_or_else(|| ValueError::UnknownField {
                record: self.def.name.clone(),
                field: name.to_string(),
            })?;
        self.values[index] = value.into();
        Ok(())
    }

    /// Builder style [`Record::set`].
    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Result<Self, ValueError> {
        self.set(name, value)?;
        Ok(self)
    }

    /// Iterate over field definitions paired with their values
    pub fn fields(&self) -> impl Iterator<Item = (&crate::definition::FieldDef, &Value)> {
        self.def.fields.iter().zip(self.values.iter())
    }

    /// Build a record from a JSON object keyed by external field names.
    ///
    /// Embedded records read their fields from the same object. Absent and null
    /// fields keep their zero value.
    ///
    /// # Example
    ///
    /// ```
    /// use std::sync::Arc;
    /// use nomnom_graphql::{FieldDef, Record, RecordDef, TypeDescriptor, Value};
    ///
    /// let def = Arc::new(RecordDef::new("Item").field(FieldDef::new("Name", TypeDescriptor::String)));
    /// let record = Record::from_json(def, &serde_json::json!({"name": "a"})).unwrap();
    /// assert_eq!(record.get("Name"), Some(&Value::from("a")));
    /// ```
    pub fn from_json(def: Arc<RecordDef>, json: &serde_json::Value) -> Result<Self, ValueError> {
        let object = json.as_object().ok_or_else(|| ValueError::NotAnObject {
            record: def.name.clone(),
        })?;

        let mut record = Record::new(def.clone());
        for (index, field) in def.fields.iter().enumerate() {
            if !field.exported {
                continue;
            }
            if let Some(embedded) = field.embedded_record() {
                record.values[index] = Value::Record(Record::from_json(embedded.clone(), json)?);
                continue;
            }
            let Some(name) = field_name(field) else {
                continue;
            };
            if let Some(raw) = object.get(&name) {
                record.values[index] = typed_from_json(&name, &field.ty, raw)?;
            }
        }

        Ok(record)
    }

    fn serialize_entries<M: SerializeMap>(&self, map: &mut M) -> Result<(), M::Error> {
        for (field, value) in self.fields() {
            if !field.exported {
                continue;
            }
            if field.embedded_record().is_some() {
                if let Value::Record(embedded) = value {
                    embedded.serialize_entries(map)?;
                }
                continue;
            }
            if let Some(name) = field_name(field) {
                map.serialize_entry(&name, value)?;
            }
        }
        Ok(())
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        self.serialize_entries(&mut map)?;
        map.end()
    }
}

fn json_kind(json: &serde_json::Value) -> &'static str {
    match json {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

fn typed_from_json(
    field: &str,
    ty: &TypeDescriptor,
    json: &serde_json::Value,
) -> Result<Value, ValueError> {
    use serde_json::Value as Json;

    let mismatch = |expected: &str| ValueError::TypeMismatch {
        field: field.to_string(),
        expected: expected.to_string(),
        found: json_kind(json).to_string(),
    };

    match (ty, json) {
        (_, Json::Null) => Ok(Value::zero(ty)),
        (TypeDescriptor::Boolean, Json::Bool(b)) => Ok(Value::Bool(*b)),
        (TypeDescriptor::Int, Json::Number(n)) => n.as_i64().map(Value::Int).ok_or_else(|| mismatch("int")),
        (TypeDescriptor::Float, Json::Number(n)) => n.as_f64().map(Value::Float).ok_or_else(|| mismatch("float")),
        (TypeDescriptor::String, Json::String(s)) => Ok(Value::String(s.clone())),
        (TypeDescriptor::DateTime, Json::String(s)) => DateTime::parse_from_rfc3339(s)
            .map(|dt| Value::DateTime(dt.with_timezone(&Utc)))
            .map_err(|_| mismatch("RFC 3339 datetime")),
        (TypeDescriptor::List(element), Json::Array(items)) => items
            .iter()
            .map(|item| typed_from_json(field, element, item))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::List),
        (TypeDescriptor::Record(def), Json::Object(_)) => {
            Record::from_json(def.clone(), json).map(Value::Record)
        }
        (TypeDescriptor::Named(_) | TypeDescriptor::Other(_), _) => Ok(Value::from(json)),
        (TypeDescriptor::Boolean, _) => Err(mismatch("bool")),
        (TypeDescriptor::Int, _) => Err(mismatch("int")),
        (TypeDescriptor::Float, _) => Err(mismatch("float")),
        (TypeDescriptor::String, _) => Err(mismatch("string")),
        (TypeDescriptor::DateTime, _) => Err(mismatch("datetime")),
        (TypeDescriptor::List(_), _) => Err(mismatch("array")),
        (TypeDescriptor::Record(_), _) => Err(mismatch("object")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::FieldDef;
    use serde_json::json;

    fn base_def() -> RecordDef {
        RecordDef::new("TestBase").field(FieldDef::new("Id", TypeDescriptor::String))
    }

    fn embed_def() -> Arc<RecordDef> {
        Arc::new(
            RecordDef::new("testEmbed")
                .field(FieldDef::embed(base_def()))
                .field(FieldDef::new("Extra", TypeDescriptor::String))
                .field(FieldDef::new("Count", TypeDescriptor::Int).tag("count,omitempty"))
                .field(FieldDef::new("Secret", TypeDescriptor::String).unexported()),
        )
    }

    #[test]
    fn test_new_record_has_zero_values() {
        let record = Record::new(embed_def());

        assert_eq!(record.get("Extra"), Some(&Value::String(String::new())));
        assert_eq!(record.get("Count"), Some(&Value::Int(0)));
        assert!(matches!(record.get("TestBase"), Some(Value::Record(r)) if r.name() == "TestBase"));
    }

    #[test]
    fn test_set_unknown_field() {
        let mut record = Record::new(embed_def());
        let err = record.set("Bogus", "x").unwrap_err();
        assert_eq!(
            err,
            ValueError::UnknownField {
                record: "testEmbed".to_string(),
                field: "Bogus".to_string(),
            }
        );
    }

    #[test]
    fn test_from_json_flattens_embedded() {
        let record = Record::from_json(
            embed_def(),
            &json!({"id": "id", "extra": "extra", "count": 3, "secret": "nope"}),
        )
        .unwrap();

        let base = record.get("TestBase").and_then(Value::as_record).unwrap();
        assert_eq!(base.get("Id"), Some(&Value::from("id")));
        assert_eq!(record.get("Extra"), Some(&Value::from("extra")));
        assert_eq!(record.get("Count"), Some(&Value::Int(3)));
        assert_eq!(record.get("Secret"), Some(&Value::String(String::new())));
    }

    #[test]
    fn test_from_json_type_mismatch() {
        let err = Record::from_json(embed_def(), &json!({"count": "three"})).unwrap_err();
        assert_eq!(
            err,
            ValueError::TypeMismatch {
                field: "count".to_string(),
                expected: "int".to_string(),
                found: "string".to_string(),
            }
        );
    }

    #[test]
    fn test_serialize_round_trips_external_names() {
        let input = json!({"id": "id", "extra": "extra", "count": 3});
        let record = Record::from_json(embed_def(), &input).unwrap();

        let output = serde_json::to_value(Value::Record(record)).unwrap();
        assert_eq!(output, input);
    }

    #[test]
    fn test_datetime_from_json() {
        let def = Arc::new(RecordDef::new("Event").field(FieldDef::new("At", TypeDescriptor::DateTime)));
        let record = Record::from_json(def, &json!({"at": "2024-05-01T10:00:00Z"})).unwrap();

        assert!(matches!(record.get("At"), Some(Value::DateTime(_))));
        assert_eq!(
            serde_json::to_value(Value::Record(record)).unwrap(),
            json!({"at": "2024-05-01T10:00:00+00:00"})
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::from(vec![1, 2, 3]).to_string(), "[1 2 3]");
        assert_eq!(Value::Null.to_string(), "null");
        assert_eq!(Value::from("leaf").to_string(), "leaf");
    }
}
