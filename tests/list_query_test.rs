//! End to end list queries through generated field resolvers

use std::sync::{Arc, Mutex};

use nomnom_graphql::query::AstValue;
use nomnom_graphql::resolve::Arguments;
use nomnom_graphql::{
    extract_field, FieldDef, ListFunctions, ObjectBuilder, QueryContext, QueryError, QueryReporter, Record, RecordDef,
    ResolveError, ResolveParams, SchemaTypes, TypeDescriptor, Value,
};
use serde_json::json;

fn item_def() -> Arc<RecordDef> {
    Arc::new(
        RecordDef::new("Item")
            .field(FieldDef::new("N", TypeDescriptor::String).tag("n"))
            .field(FieldDef::new("V", TypeDescriptor::Int).tag("v,omitempty")),
    )
}

fn holder_def() -> Arc<RecordDef> {
    Arc::new(
        RecordDef::new("Holder")
            .field(FieldDef::new("Name", TypeDescriptor::String).tag("name"))
            .field(
                FieldDef::new("Items", TypeDescriptor::list(TypeDescriptor::Record(item_def())))
                    .tag("items,omitempty"),
            ),
    )
}

fn types() -> SchemaTypes {
    ObjectBuilder::new([holder_def()], "", None).unwrap().finish().unwrap()
}

fn source() -> Value {
    let data = json!({
        "name": "h",
        "items": [
            {"n": "c", "v": 3},
            {"n": "a", "v": 1},
            {"n": "e", "v": 5},
            {"n": "b", "v": 2},
            {"n": "d", "v": 4},
        ]
    });
    Value::Record(Record::from_json(holder_def(), &data).unwrap())
}

fn filter(field: Option<&str>, operation: &str, argument: Vec<(&str, AstValue)>) -> AstValue {
    let mut fields = Vec::new();
    if let Some(field) = field {
        fields.push(("Field", AstValue::string(field)));
    }
    fields.push(("Operation", AstValue::string(operation)));
    fields.push(("Argument", AstValue::object(argument)));
    AstValue::object(fields)
}

fn sort(field: &str, order: &str) -> AstValue {
    AstValue::object([("Field", AstValue::string(field)), ("Order", AstValue::string(order))])
}

fn query(field: &str, args: Arguments, context: &QueryContext) -> Result<Value, ResolveError> {
    let types = types();
    let source = source();
    let object = types.resolve_type(&source).unwrap();
    object
        .field(field)
        .unwrap()
        .resolve(&ResolveParams::new(&source, context, &args))
}

fn args(pairs: Vec<(&str, AstValue)>) -> Arguments {
    pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
}

fn names(value: &Value) -> Vec<String> {
    value
        .as_list()
        .unwrap()
        .iter()
        .map(|item| extract_field(item, "n").unwrap().to_string())
        .collect()
}

#[test]
fn test_unfiltered_list_passes_through() {
    let resolved = query("items", Arguments::new(), &QueryContext::new()).unwrap();
    assert_eq!(names(&resolved), vec!["c", "a", "e", "b", "d"]);
}

#[test]
fn test_filter_equal() {
    let args = args(vec![(
        "filter",
        filter(Some("n"), "==", vec![("Value", AstValue::string("a"))]),
    )]);
    let resolved = query("items", args, &QueryContext::new()).unwrap();
    assert_eq!(names(&resolved), vec!["a"]);
}

#[test]
fn test_filter_unknown_field() {
    let args = args(vec![(
        "filter",
        filter(Some("bogus"), "==", vec![("Value", AstValue::string("a"))]),
    )]);
    let err = query("items", args, &QueryContext::new()).unwrap_err();
    assert!(matches!(err, ResolveError::Filter(_)), "got {:?}", err);
}

#[test]
fn test_filter_field_of_separators_only() {
    let args = args(vec![(
        "filter",
        filter(Some("_"), "==", vec![("Value", AstValue::string("a"))]),
    )]);
    let err = query("items", args, &QueryContext::new()).unwrap_err();
    assert!(
        matches!(err, ResolveError::Query(QueryError::InvalidField { field: "Field", .. })),
        "got {:?}",
        err
    );
}

#[test]
fn test_filter_unknown_operation() {
    let args = args(vec![(
        "filter",
        filter(Some("n"), "LIKE", vec![("Value", AstValue::string("a"))]),
    )]);
    assert!(matches!(
        query("items", args, &QueryContext::new()),
        Err(ResolveError::Query(_))
    ));
}

#[test]
fn test_limit() {
    let args = args(vec![("filter", filter(None, "LIMIT", vec![("Value", AstValue::int(2))]))]);
    let resolved = query("items", args, &QueryContext::new()).unwrap();
    assert_eq!(names(&resolved), vec!["c", "a"]);
}

#[test]
fn test_sort_then_limit() {
    let args = args(vec![
        ("filter", filter(None, "LIMIT", vec![("Value", AstValue::int(2))])),
        ("sort", sort("v", "DESC")),
    ]);
    let resolved = query("items", args, &QueryContext::new()).unwrap();
    assert_eq!(names(&resolved), vec!["e", "d"]);
}

#[test]
fn test_sort_strings_ascending() {
    let args = args(vec![("sort", sort("n", "ASC"))]);
    let resolved = query("items", args, &QueryContext::new()).unwrap();
    assert_eq!(names(&resolved), vec!["a", "b", "c", "d", "e"]);
}

#[test]
fn test_filter_integer_comparison() {
    let args = args(vec![(
        "filter",
        filter(Some("v"), ">=", vec![("Value", AstValue::int(4))]),
    )]);
    let resolved = query("items", args, &QueryContext::new()).unwrap();
    assert_eq!(names(&resolved), vec!["e", "d"]);
}

#[test]
fn test_filter_not_in() {
    let args = args(vec![(
        "filter",
        filter(
            Some("n"),
            "NOT IN",
            vec![(
                "Values",
                AstValue::List(vec![AstValue::string("a"), AstValue::string("b")]),
            )],
        ),
    )]);
    let resolved = query("items", args, &QueryContext::new()).unwrap();
    assert_eq!(names(&resolved), vec!["c", "e", "d"]);
}

#[test]
fn test_total_unaffected_by_filter() {
    let context = QueryContext::new();
    let filtered = query(
        "items",
        args(vec![(
            "filter",
            filter(Some("n"), "==", vec![("Value", AstValue::string("a"))]),
        )]),
        &context,
    )
    .unwrap();
    assert_eq!(filtered.as_list().unwrap().len(), 1);

    let total = query("totalItems", Arguments::new(), &context).unwrap();
    assert_eq!(total, Value::Int(5));
}

#[test]
fn test_total_of_missing_list_is_zero() {
    let types = types();
    let source = Value::Record(Record::from_json(holder_def(), &json!({"name": "empty"})).unwrap());
    let object = types.resolve_type(&source).unwrap();

    let context = QueryContext::new();
    let empty = Arguments::new();
    let total = object
        .field("totalItems")
        .unwrap()
        .resolve(&ResolveParams::new(&source, &context, &empty))
        .unwrap();
    assert_eq!(total, Value::Int(0));
}

#[derive(Default)]
struct RecordingReporter {
    fields: Mutex<Vec<String>>,
    functions: Mutex<Vec<(String, ListFunctions)>>,
}

impl QueryReporter for RecordingReporter {
    fn queried_field(&self, name: &str) -> Result<(), String> {
        self.fields.lock().unwrap().push(name.to_string());
        Ok(())
    }

    fn queried_list_functions(&self, name: &str, functions: &ListFunctions) -> Result<(), String> {
        self.functions
            .lock()
            .unwrap()
            .push((name.to_string(), functions.clone()));
        Ok(())
    }
}

#[test]
fn test_reporter_sees_fields_and_list_functions() {
    let reporter = Arc::new(RecordingReporter::default());
    let context = QueryContext::new().with_reporter(reporter.clone());

    query("name", Arguments::new(), &context).unwrap();
    query("items", Arguments::new(), &context).unwrap();
    query(
        "items",
        args(vec![
            ("filter", filter(Some("n"), "==", vec![("Value", AstValue::string("a"))])),
            ("sort", sort("n", "DESC")),
        ]),
        &context,
    )
    .unwrap();
    query("totalItems", Arguments::new(), &context).unwrap();

    assert_eq!(
        *reporter.fields.lock().unwrap(),
        vec!["holder_name", "holder_items", "holder_items", "holder_totalItems"]
    );

    let functions = reporter.functions.lock().unwrap();
    assert_eq!(functions.len(), 1);
    assert_eq!(functions[0].0, "holder_items");
    assert_eq!(
        functions[0].1,
        ListFunctions {
            filter: "Field:n, Operation:==, Arguments:a".to_string(),
            sort_field: "n".to_string(),
            sort_order: "DESC".to_string(),
        }
    );
}
