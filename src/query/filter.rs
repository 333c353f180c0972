//! List filters.
//!
//! A filter literal looks like
//! `{Field: "name", Operation: "==", Argument: {Value: "a"}}`. `Operation` is
//! required, `Field` is a separator joined path into each item and `Argument`
//! is handed to the operation's comparator factory.

use std::fmt;

use crate::error::{ExtractError, QueryError};
use crate::extraction::deep_extract_field;
use crate::path::FieldPath;
use crate::query::ast::AstValue;
use crate::query::comparator::{Comparator, ComparatorRegistry, FilterArguments};
use crate::value::Value;

/// The decoded filter literal.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSpec {
    pub field: String,
    pub operation: String,
    pub arguments: FilterArguments,
}

impl FilterSpec {
    /// Decode the fields of a filter object literal. Unknown keys are ignored.
    pub fn from_ast(value: &AstValue) -> Result<Self, QueryError> {
        let fields = value
            .as_object()
            .ok_or(QueryError::InvalidExpression("filter"))?;

        let mut spec = FilterSpec::default();
        for field in fields {
            match field.name.as_str() {
                "Field" => spec.field = expect_string(&field.value, "Field")?,
                "Operation" => spec.operation = expect_string(&field.value, "Operation")?,
                "Argument" => {
                    let argument = field.value.as_object().ok_or(QueryError::InvalidField {
                        argument: "filter",
                        field: "Argument",
                    })?;
                    for entry in argument {
                        let value = argument_value(&entry.value).map_err(|reason| {
                            QueryError::InvalidArgumentValue {
                                name: entry.name.clone(),
                                reason,
                            }
                        })?;
                        spec.arguments.insert(entry.name.clone(), value);
                    }
                }
                _ => {}
            }
        }

        Ok(spec)
    }
}

impl fmt::Display for FilterSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let arguments: Vec<String> = self.arguments.values().map(|v| v.to_string()).collect();
        write!(
            f,
            "Field:{}, Operation:{}, Arguments:{}",
            self.field,
            self.operation,
            arguments.join(",")
        )
    }
}

fn expect_string(value: &AstValue, field: &'static str) -> Result<String, QueryError> {
    match value {
        AstValue::String(s) => Ok(s.clone()),
        _ => Err(QueryError::InvalidField {
            argument: "filter",
            field,
        }),
    }
}

fn argument_value(value: &AstValue) -> Result<Value, String> {
    match value {
        AstValue::String(s) => Ok(Value::String(s.clone())),
        AstValue::Int(raw) => raw
            .parse::<i64>()
            .map(Value::Int)
            .map_err(|_| "unable to determine value of integer".to_string()),
        AstValue::Float(raw) => raw
            .parse::<f64>()
            .map(Value::Float)
            .map_err(|_| "unable to determine value of float".to_string()),
        AstValue::Boolean(b) => Ok(Value::Bool(*b)),
        AstValue::List(items) => items
            .iter()
            .map(argument_value)
            .collect::<Result<Vec<_>, _>>()
            .map(Value::List),
        AstValue::Object(_) => Err("nested objects are not supported".to_string()),
        other => Err(format!("unhandled AST value type {:?}", other.kind())),
    }
}

/// A parsed filter bound to a fresh comparator.
pub struct ListFilter {
    pub spec: FilterSpec,
    field_path: Option<FieldPath>,
    comparator: Box<dyn Comparator>,
}

impl fmt::Debug for ListFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListFilter")
            .field("spec", &self.spec)
            .field("field_path", &self.field_path)
            .finish()
    }
}

/// Parse the `filter` argument of a list field.
///
/// # Arguments
///
/// * `arg` - The argument literal, `None` when the query did not pass one
/// * `registry` - Operations available to the filter
///
/// # Returns
///
/// * `Ok(None)` - No filter was requested
/// * `Ok(Some(filter))` - A filter ready for one list
/// * `Err(QueryError)` - The literal is malformed or names an unknown operation
pub fn new_list_filter(
    arg: Option<&AstValue>,
    registry: &ComparatorRegistry,
) -> Result<Option<ListFilter>, QueryError> {
    let Some(arg) = arg else {
        return Ok(None);
    };
    if matches!(arg, AstValue::Null) {
        return Ok(None);
    }

    let spec = FilterSpec::from_ast(arg)?;
    if spec.operation.is_empty() {
        return Err(QueryError::MissingOperation);
    }

    let field_path = if spec.field.is_empty() {
        None
    } else {
        // a field made only of separators names nothing
        let path = FieldPath::parse(&spec.field);
        if path.is_empty() {
            return Err(QueryError::InvalidField {
                argument: "filter",
                field: "Field",
            });
        }
        Some(path)
    };
    let comparator = registry.build(&spec.operation, &spec.arguments)?;

    Ok(Some(ListFilter {
        spec,
        field_path,
        comparator,
    }))
}

impl ListFilter {
    /// Test a single item.
    ///
    /// Without a `Field` the comparator sees null, operations such as `LIMIT`
    /// do not look at the item at all.
    pub fn matches(&self, item: &Value) -> Result<bool, ExtractError> {
        let Some(path) = &self.field_path else {
            return Ok(self.comparator.matches(&Value::Null));
        };

        let value = deep_extract_field(item, path)?.unwrap_or(&Value::Null);
        Ok(self.comparator.matches(value))
    }

    /// Keep the matching items, in order.
    pub fn filter_list(&self, items: Vec<Value>) -> Result<Vec<Value>, ExtractError> {
        let mut kept = Vec::with_capacity(items.len());
        for item in items {
            if self.matches(&item)? {
                kept.push(item);
            }
        }
        Ok(kept)
    }
}
