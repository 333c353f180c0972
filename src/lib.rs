//! # Nomnom GraphQL: Typed GraphQL Schemas from Record Definitions
//!
//! Nomnom GraphQL builds GraphQL object and interface types from record
//! definitions and serves them with generated field resolvers.
//!
//! ## Features
//!
//! - **Schema generation**: One object type per record, field names and nullability taken from serialization tags
//! - **Interfaces from embedding**: Root level embedded records become GraphQL interfaces
//! - **Custom fields**: Overlay hand written fields onto any generated type by structural path
//! - **List queries**: `filter` and `sort` arguments plus a `total<Name>` count for every list field
//! - **Query reporting**: Optional per-request observer of queried fields, filters and sorts
//!
//! ## Example: Record definition
//!
//! ```yaml
//! record:
//!   name: Article
//!   fields:
//!     - name: TestBase
//!       type: { Named: TestBase }
//!       embedded: true
//!     - name: Modules
//!       type: { List: { Named: Module } }
//!       tag: "modules,omitempty"
//! ```
//!
//! ## Example: Building types
//!
//! ```
//! use nomnom_graphql::{FieldDef, ObjectBuilder, RecordDef, TypeDescriptor};
//!
//! let module = RecordDef::new("Module").field(FieldDef::new("Name", TypeDescriptor::String));
//! let article = RecordDef::new("Article")
//!     .field(FieldDef::new("Modules", TypeDescriptor::list(TypeDescriptor::record(module))).tag("modules,omitempty"));
//!
//! let types = ObjectBuilder::new([article], "", None).unwrap().finish().unwrap();
//! let object = types.object("article").unwrap();
//!
//! assert_eq!(object.field("modules").unwrap().ty.to_string(), "[article_modules]");
//! assert_eq!(object.field("totalModules").unwrap().ty.to_string(), "Int");
//! ```

// Core modules
pub mod definition;
pub mod error;
pub mod extraction;
pub mod naming;
pub mod path;
pub mod value;

// Schema generation and resolution
pub mod query;
pub mod resolve;
pub mod schema;

// YAML configuration
pub mod config;

// Re-export key types
pub use definition::{Describe, FieldDef, RecordDef, TypeDescriptor};
pub use error::{BuildError, ExtractError, LoadError, QueryError, ResolveError, ValueError};
pub use extraction::{deep_extract_field, extract_embeds, extract_field};
pub use path::{FieldPath, FIELD_PATH_SEPARATOR};
pub use value::{Record, Value};

pub use query::{ComparatorRegistry, FilterSpec, SortOrder, SortSpec};
pub use resolve::{ListFunctions, QueryContext, QueryReporter, ResolveParams, Resolver};
pub use schema::{
    Argument, BuildPhase, Field, FieldAdditions, InterfaceType, ObjectBuilder, ObjectType, Scalar, SchemaType,
    SchemaTypes,
};
