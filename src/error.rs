//! Error types for schema construction, definition loading and field resolution.
//!
//! Definition and build errors stop schema construction. Everything raised while
//! resolving a field ends up as a [`ResolveError`] for that one field.

use std::path::PathBuf;

use thiserror::Error;

use crate::path::FIELD_PATH_SEPARATOR;

/// Errors raised while building object and interface types.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum BuildError {
    #[error("namePrefix can not include the FieldPathSeparator {:?}", FIELD_PATH_SEPARATOR)]
    InvalidPrefix { prefix: String },

    #[error("type name {0:?} is generated more than once")]
    DuplicateTypeName(String),

    #[error("field {field:?} of record {record:?} is embedded but is not a record")]
    EmbeddedNotRecord { record: String, field: String },

    #[error("custom fields can not be added once types are built")]
    TypesAlreadyBuilt,

    #[error("records can not be added once interfaces are built")]
    InterfacesAlreadyBuilt,
}

/// Errors raised while loading record definitions from YAML.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("directory does not exist: {0}")]
    MissingDirectory(PathBuf),

    #[error("record {0:?} is defined more than once")]
    DuplicateRecord(String),

    #[error("record {record:?} references unknown record {name:?}")]
    UnknownRecord { record: String, name: String },

    #[error("record {0:?} references itself")]
    RecursiveRecord(String),

    #[error(transparent)]
    Definition(#[from] BuildError),
}

/// Errors raised while converting external data into [`crate::Value`]s.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ValueError {
    #[error("record {record:?} has no field {field:?}")]
    UnknownField { record: String, field: String },

    #[error("record {record:?} can only be built from a JSON object")]
    NotAnObject { record: String },

    #[error("field {field:?} expected {expected} but found {found}")]
    TypeMismatch {
        field: String,
        expected: String,
        found: String,
    },
}

/// Raised when the first segment of a deep field lookup can not be resolved.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ExtractError {
    #[error("unable to find field to extract: {0:?}")]
    NotFound(String),
}

/// Errors raised while parsing or evaluating filter and sort expressions.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum QueryError {
    #[error("unable to parse {0} argument")]
    InvalidExpression(&'static str),

    #[error("unable to parse {argument} argument field {field}")]
    InvalidField {
        argument: &'static str,
        field: &'static str,
    },

    #[error("unable to parse filter -> Argument -> {name}: {reason}")]
    InvalidArgumentValue { name: String, reason: String },

    #[error("filter Operation is undefined")]
    MissingOperation,

    #[error("unknown filter operator {0:?}")]
    UnknownOperation(String),

    #[error("{0}")]
    InvalidArgument(String),

    #[error("sort order must be \"ASC\" or \"DESC\" or undefined")]
    InvalidSortOrder(String),

    #[error("unable to extract sort field {0:?}")]
    MissingSortKey(String),

    #[error("unknown type for sort field {field:?}: {kind}")]
    UnsupportedSortKey { field: String, kind: &'static str },

    #[error("failed to sort: {0}")]
    Sort(String),

    #[error(transparent)]
    Extract(#[from] ExtractError),
}

/// The error returned by a field resolver.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ResolveError {
    #[error("failed to extract field {0:?} value from data")]
    FieldNotFound(String),

    #[error("value returned from field {0:?} is not a list as expected")]
    NotAList(String),

    #[error("field value is not a valid list in the data")]
    InvalidTotalCount,

    #[error("{0}. Note: filtering and sorting is not available on hydrated items")]
    Filter(ExtractError),

    #[error("query reporter failed: {0}")]
    Reporter(String),

    #[error(transparent)]
    Query(#[from] QueryError),
}
