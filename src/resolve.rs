//! Field resolvers attached to generated fields.
//!
//! Every generated field resolves by pulling its value out of the source record
//! handed down by the parent resolver. List fields additionally sort and filter,
//! and each list gets a sibling field reporting its unfiltered length.

use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::error::ResolveError;
use crate::extraction::extract_field;
use crate::path::FIELD_PATH_SEPARATOR;
use crate::query::ast::AstValue;
use crate::query::comparator::ComparatorRegistry;
use crate::query::filter::new_list_filter;
use crate::query::sort::{list_sort, parse_sort_parameters};
use crate::value::Value;

/// Name of the list field argument carrying a filter
pub const FILTER_ARGUMENT_NAME: &str = "filter";

/// Name of the list field argument carrying a sort
pub const SORT_ARGUMENT_NAME: &str = "sort";

/// Field arguments as passed by the execution engine
pub type Arguments = IndexMap<String, AstValue>;

/// Resolver function attached to a field
pub type Resolver = Arc<dyn Fn(&ResolveParams<'_>) -> Result<Value, ResolveError> + Send + Sync>;

/// Filter and sort details of one list field resolution, as seen by a reporter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListFunctions {
    /// Display form of the filter, empty when none was given
    pub filter: String,
    pub sort_field: String,
    pub sort_order: String,
}

/// Observer notified of every field and list function a query exercises.
///
/// Shared by all resolvers of a request, so implementations must be thread safe.
/// Returning an error fails the field being resolved.
pub trait QueryReporter: Send + Sync {
    /// Called with the fully qualified name (`parent_field`) of each resolved field.
    fn queried_field(&self, name: &str) -> Result<(), String>;

    /// Called for each list field resolved with a filter or sort.
    fn queried_list_functions(&self, _name: &str, _functions: &ListFunctions) -> Result<(), String> {
        Ok(())
    }
}

/// Per-request context shared by resolvers.
#[derive(Clone, Default)]
pub struct QueryContext {
    reporter: Option<Arc<dyn QueryReporter>>,
}

impl QueryContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reporter(mut self, reporter: Arc<dyn QueryReporter>) -> Self {
        self.reporter = Some(reporter);
        self
    }

    pub fn reporter(&self) -> Option<&dyn QueryReporter> {
        self.reporter.as_deref()
    }

    fn report_field(&self, name: &str) -> Result<(), ResolveError> {
        match &self.reporter {
            Some(reporter) => reporter.queried_field(name).map_err(ResolveError::Reporter),
            None => Ok(()),
        }
    }

    fn report_list_functions(&self, name: &str, functions: &ListFunctions) -> Result<(), ResolveError> {
        match &self.reporter {
            Some(reporter) => reporter
                .queried_list_functions(name, functions)
                .map_err(ResolveError::Reporter),
            None => Ok(()),
        }
    }
}

impl fmt::Debug for QueryContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryContext")
            .field("reporter", &self.reporter.is_some())
            .finish()
    }
}

/// Inputs of a single resolver call.
#[derive(Debug, Clone, Copy)]
pub struct ResolveParams<'a> {
    /// Value resolved for the parent field
    pub source: &'a Value,
    pub context: &'a QueryContext,
    pub args: &'a Arguments,
}

impl<'a> ResolveParams<'a> {
    pub fn new(source: &'a Value, context: &'a QueryContext, args: &'a Arguments) -> Self {
        Self {
            source,
            context,
            args,
        }
    }
}

/// Join a field name onto its parent type name.
pub fn full_field_name(name: &str, parent: &str) -> String {
    format!("{}{}{}", parent, FIELD_PATH_SEPARATOR, name)
}

fn extract(name: &str, params: &ResolveParams<'_>) -> Result<Value, ResolveError> {
    extract_field(params.source, name)
        .cloned()
        .ok_or_else(|| ResolveError::FieldNotFound(name.to_string()))
}

/// Resolver returning the named field of the source record.
///
/// Reports `parent_name` to the query reporter before extracting.
pub fn resolve_by_field(name: &str, parent: &str) -> Resolver {
    let name = name.to_string();
    let full_name = full_field_name(&name, parent);

    Arc::new(move |params: &ResolveParams<'_>| {
        params.context.report_field(&full_name)?;
        extract(&name, params)
    })
}

/// Resolver for list fields, honouring the `filter` and `sort` arguments.
///
/// The list is sorted before it is filtered since filters like `LIMIT` depend on
/// item order. Without either argument the value is returned untouched.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use nomnom_graphql::query::{AstValue, ComparatorRegistry};
/// use nomnom_graphql::resolve::{resolve_list_field, Arguments, QueryContext, ResolveParams};
/// use nomnom_graphql::{FieldDef, Record, RecordDef, TypeDescriptor, Value};
///
/// let def = Arc::new(RecordDef::new("Holder").field(FieldDef::new("Items", TypeDescriptor::list(TypeDescriptor::Int))));
/// let source = Value::Record(Record::new(def).with("Items", vec![3, 1, 2]).unwrap());
///
/// let mut args = Arguments::new();
/// args.insert("sort".to_string(), AstValue::object([("Order", AstValue::string("DESC"))]));
///
/// let resolver = resolve_list_field("items", "holder", Arc::new(ComparatorRegistry::with_builtins()));
/// let context = QueryContext::new();
/// let resolved = resolver(&ResolveParams::new(&source, &context, &args)).unwrap();
/// assert_eq!(resolved, Value::from(vec![3, 2, 1]));
/// ```
pub fn resolve_list_field(name: &str, parent: &str, operations: Arc<ComparatorRegistry>) -> Resolver {
    let name = name.to_string();
    let full_name = full_field_name(&name, parent);

    Arc::new(move |params: &ResolveParams<'_>| {
        let filter = new_list_filter(params.args.get(FILTER_ARGUMENT_NAME), &operations)?;
        let sort = parse_sort_parameters(params.args.get(SORT_ARGUMENT_NAME))?;

        if filter.is_some() || sort.is_some() {
            let functions = ListFunctions {
                filter: filter.as_ref().map(|f| f.spec.to_string()).unwrap_or_default(),
                sort_field: sort.as_ref().map(|s| s.field.clone()).unwrap_or_default(),
                sort_order: sort.as_ref().map(|s| s.order.to_string()).unwrap_or_default(),
            };
            params.context.report_list_functions(&full_name, &functions)?;
        }

        params.context.report_field(&full_name)?;
        let value = extract(&name, params)?;
        if filter.is_none() && sort.is_none() {
            return Ok(value);
        }

        let mut items = match value {
            Value::List(items) => items,
            Value::Null => return Ok(Value::Null),
            _ => return Err(ResolveError::NotAList(full_name.clone())),
        };

        if let Some(sort) = &sort {
            debug!(field = %full_name, sort_field = %sort.field, order = %sort.order, "Sorting list");
            list_sort(sort, &mut items)?;
        }

        let Some(filter) = filter else {
            return Ok(Value::List(items));
        };

        debug!(field = %full_name, filter = %filter.spec, "Filtering list");
        filter
            .filter_list(items)
            .map(Value::List)
            .map_err(ResolveError::Filter)
    })
}

/// Resolver for the synthesized `total<Name>` field of a list.
///
/// Counts the raw list, ignoring any filter applied to the list field itself.
/// An absent or null list counts as zero.
pub fn resolve_total_count(total_name: &str, list_name: &str, parent: &str) -> Resolver {
    let list_name = list_name.to_string();
    let full_name = full_field_name(total_name, parent);

    Arc::new(move |params: &ResolveParams<'_>| {
        params.context.report_field(&full_name)?;

        match extract_field(params.source, &list_name) {
            None | Some(Value::Null) => Ok(Value::Int(0)),
            Some(Value::List(items)) => Ok(Value::Int(items.len() as i64)),
            Some(_) => Err(ResolveError::InvalidTotalCount),
        }
    })
}
