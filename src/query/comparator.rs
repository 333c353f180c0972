//! Comparators and the operation registry used by list filters.
//!
//! A filter names an operation (`==`, `IN`, `LIMIT`, ...). The registry maps the
//! operation to a factory which builds a [`Comparator`] from the filter's
//! `Argument` object. Additional operations can be registered before the
//! registry is handed to an [`crate::ObjectBuilder`].

use indexmap::IndexMap;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::QueryError;
use crate::value::Value;

/// Decoded `Argument` object of a filter
pub type FilterArguments = IndexMap<String, Value>;

/// A predicate evaluated once per list item.
pub trait Comparator: Send + Sync {
    fn matches(&self, value: &Value) -> bool;
}

/// Builds a comparator from filter arguments.
pub trait ComparatorFactory: Send + Sync {
    fn build(&self, args: &FilterArguments) -> Result<Box<dyn Comparator>, QueryError>;
}

impl<F> ComparatorFactory for F
where
    F: Fn(&FilterArguments) -> Result<Box<dyn Comparator>, QueryError> + Send + Sync,
{
    fn build(&self, args: &FilterArguments) -> Result<Box<dyn Comparator>, QueryError> {
        self(args)
    }
}

/// Logical not of the child comparator.
pub struct NotComparator {
    pub child: Box<dyn Comparator>,
}

impl Comparator for NotComparator {
    fn matches(&self, value: &Value) -> bool {
        !self.child.matches(value)
    }
}

fn required<'a>(args: &'a FilterArguments, key: &str) -> Result<&'a Value, QueryError> {
    args.get(key)
        .ok_or_else(|| QueryError::InvalidArgument(format!("filter argument is missing '{}'", key)))
}

fn required_int(args: &FilterArguments, key: &str) -> Result<i64, QueryError> {
    match required(args, key)? {
        Value::Int(i) => Ok(*i),
        _ => Err(QueryError::InvalidArgument(format!(
            "filter argument '{}' must be an integer",
            key
        ))),
    }
}

/// Equality for strings and integers, reading `Value` from the arguments.
pub fn new_equal_comparator(args: &FilterArguments) -> Result<Box<dyn Comparator>, QueryError> {
    match required(args, "Value")? {
        Value::Int(i) => Ok(Box::new(IntEqual { value: *i })),
        Value::String(s) => Ok(Box::new(StringEqual { value: s.clone() })),
        _ => Err(QueryError::InvalidArgument(
            "unsupported argument value, strings and integers are supported".to_string(),
        )),
    }
}

pub fn new_not_equal_comparator(args: &FilterArguments) -> Result<Box<dyn Comparator>, QueryError> {
    let child = new_equal_comparator(args)?;
    Ok(Box::new(NotComparator { child }))
}

/// Membership in the list of strings given as `Values`.
pub fn new_in_comparator(args: &FilterArguments) -> Result<Box<dyn Comparator>, QueryError> {
    let invalid = || QueryError::InvalidArgument("filter argument 'Values' should be a list of strings".to_string());

    let Value::List(items) = required(args, "Values")? else {
        return Err(invalid());
    };
    let values = items
        .iter()
        .map(|item| item.as_str().map(String::from).ok_or_else(invalid))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Box::new(InComparator { values }))
}

pub fn new_not_in_comparator(args: &FilterArguments) -> Result<Box<dyn Comparator>, QueryError> {
    let child = new_in_comparator(args)?;
    Ok(Box::new(NotComparator { child }))
}

/// Ordered integer comparisons
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegerOperation {
    Lt,
    Le,
    Gt,
    Ge,
}

impl IntegerOperation {
    pub fn symbol(self) -> &'static str {
        match self {
            IntegerOperation::Lt => "<",
            IntegerOperation::Le => "<=",
            IntegerOperation::Gt => ">",
            IntegerOperation::Ge => ">=",
        }
    }
}

/// Factory for an integer comparison reading `Value` from the arguments.
pub fn new_integer_comparator(
    operation: IntegerOperation,
) -> impl Fn(&FilterArguments) -> Result<Box<dyn Comparator>, QueryError> + Send + Sync {
    move |args| {
        let value = required_int(args, "Value")?;
        Ok(Box::new(IntegerComparator { operation, value }) as Box<dyn Comparator>)
    }
}

/// Matches the first `Value` items it is asked about and nothing after.
///
/// The count is kept inside the comparator, build a new one for every list.
pub fn new_limit_length_comparator(args: &FilterArguments) -> Result<Box<dyn Comparator>, QueryError> {
    let limit = required_int(args, "Value")?;
    Ok(Box::new(LimitLength {
        limit,
        count: Mutex::new(0),
    }))
}

struct IntEqual {
    value: i64,
}

impl Comparator for IntEqual {
    fn matches(&self, value: &Value) -> bool {
        matches!(value, Value::Int(i) if *i == self.value)
    }
}

struct StringEqual {
    value: String,
}

impl Comparator for StringEqual {
    fn matches(&self, value: &Value) -> bool {
        value.as_str() == Some(self.value.as_str())
    }
}

struct InComparator {
    values: Vec<String>,
}

impl Comparator for InComparator {
    fn matches(&self, value: &Value) -> bool {
        match value.as_str() {
            Some(s) => self.values.iter().any(|v| v == s),
            None => false,
        }
    }
}

struct IntegerComparator {
    operation: IntegerOperation,
    value: i64,
}

impl Comparator for IntegerComparator {
    fn matches(&self, value: &Value) -> bool {
        let operand = match value {
            Value::Int(i) => *i,
            // JSON sourced data does not keep ints and floats apart
            Value::Float(f) => *f as i64,
            _ => return false,
        };
        match self.operation {
            IntegerOperation::Lt => operand < self.value,
            IntegerOperation::Le => operand <= self.value,
            IntegerOperation::Gt => operand > self.value,
            IntegerOperation::Ge => operand >= self.value,
        }
    }
}

struct LimitLength {
    limit: i64,
    count: Mutex<i64>,
}

impl Comparator for LimitLength {
    fn matches(&self, _value: &Value) -> bool {
        let mut count = self.count.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *count += 1;
        *count <= self.limit
    }
}

/// Registry mapping operation names to comparator factories
pub struct ComparatorRegistry {
    operations: HashMap<String, Box<dyn ComparatorFactory>>,
}

impl ComparatorRegistry {
    /// Create a registry with no operations
    pub fn new() -> Self {
        Self {
            operations: HashMap::new(),
        }
    }

    /// Create a registry holding the built-in operations:
    /// `==`, `!=`, `>`, `>=`, `<`, `<=`, `LIMIT`, `IN` and `NOT IN`.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register("==", Box::new(new_equal_comparator));
        registry.register("!=", Box::new(new_not_equal_comparator));
        registry.register(">", Box::new(new_integer_comparator(IntegerOperation::Gt)));
        registry.register(">=", Box::new(new_integer_comparator(IntegerOperation::Ge)));
        registry.register("<", Box::new(new_integer_comparator(IntegerOperation::Lt)));
        registry.register("<=", Box::new(new_integer_comparator(IntegerOperation::Le)));
        registry.register("LIMIT", Box::new(new_limit_length_comparator));
        registry.register("IN", Box::new(new_in_comparator));
        registry.register("NOT IN", Box::new(new_not_in_comparator));
        registry
    }

    /// Register an operation, replacing any existing one of the same name
    ///
    /// # Example
    ///
    /// ```
    /// use nomnom_graphql::query::{Comparator, ComparatorRegistry, FilterArguments};
    /// use nomnom_graphql::{QueryError, Value};
    ///
    /// struct NonEmpty;
    ///
    /// impl Comparator for NonEmpty {
    ///     fn matches(&self, value: &Value) -> bool {
    ///         value.as_str().map(|s| !s.is_empty()).unwrap_or(false)
    ///     }
    /// }
    ///
    /// let mut registry = ComparatorRegistry::with_builtins();
    /// registry.register("NONEMPTY", Box::new(|_args: &FilterArguments| {
    ///     Ok(Box::new(NonEmpty) as Box<dyn Comparator>)
    /// }));
    /// assert!(registry.has_operation("NONEMPTY"));
    /// ```
    pub fn register(&mut self, name: impl Into<String>, factory: Box<dyn ComparatorFactory>) {
        self.operations.insert(name.into(), factory);
    }

    /// Build the comparator for an operation
    ///
    /// # Returns
    ///
    /// * `Ok(comparator)` - A fresh comparator bound to `args`
    /// * `Err(QueryError::UnknownOperation)` - Nothing is registered under `name`
    /// * `Err(QueryError::InvalidArgument)` - The arguments do not suit the operation
    pub fn build(&self, name: &str, args: &FilterArguments) -> Result<Box<dyn Comparator>, QueryError> {
        let factory = self
            .operations
            .get(name)
            .ok_or_else(|| QueryError::UnknownOperation(name.to_string()))?;

        factory.build(args)
    }

    /// Check if an operation is registered
    pub fn has_operation(&self, name: &str) -> bool {
        self.operations.contains_key(name)
    }

    /// Get all registered operation names, sorted
    pub fn operations(&self) -> Vec<String> {
        let mut names: Vec<String> = self.operations.keys().cloned().collect();
        names.sort();
        names
    }
}

impl Default for ComparatorRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}
