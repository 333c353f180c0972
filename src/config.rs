//! YAML configuration.
//!
//! Record definitions are loaded from YAML files, either one record per file:
//!
//! ```yaml
//! record:
//!   name: Article
//!   fields:
//!     - name: Base
//!       type: { Named: TestBase }
//!       embedded: true
//!     - name: Headline
//!       type: String
//!       tag: "headline,omitempty"
//! ```
//!
//! or several under a `records:` list. `Named` references are resolved against
//! every record loaded together, so records can live in separate files.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::definition::{RecordDef, TypeDescriptor};
use crate::error::LoadError;

/// Default name of the CLI configuration file
pub const DEFAULT_CONFIG_FILE: &str = "nomnom-graphql.yaml";

fn default_records_dir() -> PathBuf {
    PathBuf::from("records")
}

/// CLI configuration read from `nomnom-graphql.yaml`
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaConfig {
    /// Directory holding record YAML files
    #[serde(default = "default_records_dir")]
    pub records: PathBuf,
    /// Prefix for every generated type name
    #[serde(default)]
    pub name_prefix: Option<String>,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            records: default_records_dir(),
            name_prefix: None,
        }
    }
}

impl SchemaConfig {
    /// Load the configuration file.
    ///
    /// A relative `records` directory is taken relative to the file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let content = read(path)?;
        let mut config: SchemaConfig = serde_yaml::from_str(&content).map_err(|source| LoadError::Yaml {
            path: path.to_path_buf(),
            source,
        })?;

        if config.records.is_relative() {
            if let Some(parent) = path.parent() {
                config.records = parent.join(&config.records);
            }
        }

        Ok(config)
    }
}

/// Layout of a record YAML file
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RecordFile {
    Single { record: RecordDef },
    Many { records: Vec<RecordDef> },
}

fn read(path: &Path) -> Result<String, LoadError> {
    fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Load the records of a single YAML file, without resolving references.
pub fn load_record_file<P: AsRef<Path>>(path: P) -> Result<Vec<RecordDef>, LoadError> {
    let path = path.as_ref();
    let content = read(path)?;

    let file: RecordFile = serde_yaml::from_str(&content).map_err(|source| LoadError::Yaml {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(match file {
        RecordFile::Single { record } => vec![record],
        RecordFile::Many { records } => records,
    })
}

/// Load and resolve the records of a single YAML file.
pub fn load_record<P: AsRef<Path>>(path: P) -> Result<Vec<RecordDef>, LoadError> {
    resolve_records(load_record_file(path)?)
}

/// Load every `.yaml` and `.yml` file of a directory and resolve references
/// across all of them.
///
/// Files are read in name order so the record order is stable.
///
/// # Example
///
/// ```ignore
/// use nomnom_graphql::config::load_records;
///
/// let records = load_records("config/records").unwrap();
/// ```
pub fn load_records<P: AsRef<Path>>(dir: P) -> Result<Vec<RecordDef>, LoadError> {
    let dir_path = dir.as_ref();

    if !dir_path.is_dir() {
        return Err(LoadError::MissingDirectory(dir_path.to_path_buf()));
    }

    let read_dir = fs::read_dir(dir_path).map_err(|source| LoadError::Io {
        path: dir_path.to_path_buf(),
        source,
    })?;

    let mut paths = Vec::new();
    for entry in read_dir {
        let entry = entry.map_err(|source| LoadError::Io {
            path: dir_path.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if let Some(ext) = path.extension() {
            if ext == "yaml" || ext == "yml" {
                paths.push(path);
            }
        }
    }
    paths.sort();

    let mut records = Vec::new();
    for path in paths {
        let loaded = load_record_file(&path)?;
        debug!(path = %path.display(), records = loaded.len(), "Loaded record file");
        records.extend(loaded);
    }

    resolve_records(records)
}

/// Replace `Named` type references with the records they name, then validate.
///
/// # Returns
///
/// * `Err(LoadError::DuplicateRecord)` - Two records share a name
/// * `Err(LoadError::UnknownRecord)` - A reference names no loaded record
/// * `Err(LoadError::RecursiveRecord)` - A record contains itself
/// * `Err(LoadError::Definition)` - A resolved record is invalid
pub fn resolve_records(records: Vec<RecordDef>) -> Result<Vec<RecordDef>, LoadError> {
    let mut by_name: IndexMap<String, RecordDef> = IndexMap::new();
    for record in records {
        if by_name.contains_key(&record.name) {
            return Err(LoadError::DuplicateRecord(record.name));
        }
        by_name.insert(record.name.clone(), record);
    }

    let mut resolver = ReferenceResolver {
        defs: &by_name,
        resolved: HashMap::new(),
        stack: Vec::new(),
    };

    let mut out = Vec::with_capacity(by_name.len());
    for name in by_name.keys() {
        let resolved = resolver.record(name)?;
        resolved.validate()?;
        out.push(resolved.as_ref().clone());
    }

    Ok(out)
}

struct ReferenceResolver<'a> {
    defs: &'a IndexMap<String, RecordDef>,
    resolved: HashMap<String, Arc<RecordDef>>,
    stack: Vec<String>,
}

impl ReferenceResolver<'_> {
    fn record(&mut self, name: &str) -> Result<Arc<RecordDef>, LoadError> {
        if let Some(done) = self.resolved.get(name) {
            return Ok(done.clone());
        }
        if self.stack.iter().any(|n| n == name) {
            return Err(LoadError::RecursiveRecord(name.to_string()));
        }
        let defs = self.defs;
        let Some(def) = defs.get(name) else {
            return Err(LoadError::UnknownRecord {
                record: self.stack.last().cloned().unwrap_or_default(),
                name: name.to_string(),
            });
        };

        self.stack.push(name.to_string());
        let resolved = self.fields(def)?;
        self.stack.pop();

        let resolved = Arc::new(resolved);
        self.resolved.insert(name.to_string(), resolved.clone());
        Ok(resolved)
    }

    fn fields(&mut self, def: &RecordDef) -> Result<RecordDef, LoadError> {
        let mut out = def.clone();
        for field in &mut out.fields {
            field.ty = self.ty(&field.ty)?;
        }
        Ok(out)
    }

    fn ty(&mut self, ty: &TypeDescriptor) -> Result<TypeDescriptor, LoadError> {
        match ty {
            TypeDescriptor::Named(name) => self.record(name).map(TypeDescriptor::Record),
            TypeDescriptor::List(element) => Ok(TypeDescriptor::list(self.ty(element)?)),
            TypeDescriptor::Record(inline) => Ok(TypeDescriptor::Record(Arc::new(self.fields(inline)?))),
            other => Ok(other.clone()),
        }
    }
}
