//! List sorting.
//!
//! A sort literal looks like `{Field: "name", Order: "DESC"}`, both keys are
//! optional. Without a `Field` the items themselves are compared. The type of
//! the first item's key decides how the whole list is compared, every other key
//! must have the same type.

use std::cmp::Ordering;
use std::fmt;

use crate::error::QueryError;
use crate::extraction::deep_extract_field;
use crate::path::FieldPath;
use crate::query::ast::AstValue;
use crate::value::Value;

const ASCENDING: &str = "ASC";
const DESCENDING: &str = "DESC";

/// Requested sort direction. Unspecified sorts ascending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Unspecified,
    Asc,
    Desc,
}

impl SortOrder {
    pub fn parse(order: &str) -> Result<Self, QueryError> {
        match order {
            "" => Ok(SortOrder::Unspecified),
            ASCENDING => Ok(SortOrder::Asc),
            DESCENDING => Ok(SortOrder::Desc),
            other => Err(QueryError::InvalidSortOrder(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Unspecified => "",
            SortOrder::Asc => ASCENDING,
            SortOrder::Desc => DESCENDING,
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The decoded sort literal
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortSpec {
    pub field: String,
    pub order: SortOrder,
}

/// Parse the `sort` argument of a list field.
///
/// Returns `Ok(None)` when the query did not pass one. Unknown keys are ignored.
pub fn parse_sort_parameters(arg: Option<&AstValue>) -> Result<Option<SortSpec>, QueryError> {
    let Some(arg) = arg else {
        return Ok(None);
    };
    if matches!(arg, AstValue::Null) {
        return Ok(None);
    }
    let fields = arg.as_object().ok_or(QueryError::InvalidExpression("sort"))?;

    let mut spec = SortSpec::default();
    for field in fields {
        match (field.name.as_str(), &field.value) {
            ("Field", AstValue::String(s)) => spec.field = s.clone(),
            ("Field", _) => {
                return Err(QueryError::InvalidField {
                    argument: "sort",
                    field: "Field",
                })
            }
            ("Order", AstValue::String(s)) => spec.order = SortOrder::parse(s)?,
            ("Order", _) => {
                return Err(QueryError::InvalidField {
                    argument: "sort",
                    field: "Order",
                })
            }
            _ => {}
        }
    }

    Ok(Some(spec))
}

#[derive(Debug, Clone, Copy)]
enum SortKey<'a> {
    Int(i64),
    Float(f64),
    Str(&'a str),
}

impl<'a> SortKey<'a> {
    fn from_value(value: &'a Value) -> Option<Self> {
        match value {
            Value::Int(i) => Some(SortKey::Int(*i)),
            Value::Float(f) => Some(SortKey::Float(*f)),
            Value::String(s) => Some(SortKey::Str(s)),
            _ => None,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            SortKey::Int(_) => "int",
            SortKey::Float(_) => "float",
            SortKey::Str(_) => "string",
        }
    }

    fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (SortKey::Int(a), SortKey::Int(b)) => a.cmp(b),
            (SortKey::Float(a), SortKey::Float(b)) => a.total_cmp(b),
            (SortKey::Str(a), SortKey::Str(b)) => a.cmp(b),
            // keys are checked for a single kind before comparing
            _ => Ordering::Equal,
        }
    }
}

fn sort_value<'a>(item: &'a Value, path: Option<&FieldPath>) -> Option<&'a Value> {
    match path {
        None => Some(item),
        Some(path) => deep_extract_field(item, path).ok().flatten(),
    }
}

/// Sort the list in place. The sort is stable in both directions.
///
/// Lists with fewer than two items are left alone.
///
/// # Returns
///
/// * `Err(QueryError::MissingSortKey)` - The first item has no value for the field
/// * `Err(QueryError::UnsupportedSortKey)` - The first key is not an int, float or string
/// * `Err(QueryError::Sort)` - A later key is missing or of another type
pub fn list_sort(spec: &SortSpec, list: &mut Vec<Value>) -> Result<(), QueryError> {
    if list.len() < 2 {
        return Ok(());
    }

    let path = (!spec.field.is_empty()).then(|| FieldPath::parse(&spec.field));

    let order = {
        let first = match sort_value(&list[0], path.as_ref()) {
            None | Some(Value::Null) => return Err(QueryError::MissingSortKey(spec.field.clone())),
            Some(value) => value,
        };
        let first_key = SortKey::from_value(first).ok_or_else(|| QueryError::UnsupportedSortKey {
            field: spec.field.clone(),
            kind: first.kind(),
        })?;

        let mut keys = Vec::with_capacity(list.len());
        keys.push(first_key);
        for (index, item) in list.iter().enumerate().skip(1) {
            let key = sort_value(item, path.as_ref())
                .and_then(SortKey::from_value)
                .filter(|key| key.kind() == first_key.kind())
                .ok_or_else(|| {
                    QueryError::Sort(format!(
                        "item {} has no {} value for field {:?}",
                        index,
                        first_key.kind(),
                        spec.field
                    ))
                })?;
            keys.push(key);
        }

        let mut order: Vec<usize> = (0..keys.len()).collect();
        match spec.order {
            SortOrder::Desc => order.sort_by(|a, b| keys[*b].compare(&keys[*a])),
            SortOrder::Asc | SortOrder::Unspecified => order.sort_by(|a, b| keys[*a].compare(&keys[*b])),
        }
        order
    };

    let mut slots: Vec<Option<Value>> = std::mem::take(list).into_iter().map(Some).collect();
    list.extend(order.into_iter().filter_map(|index| slots[index].take()));

    Ok(())
}
