//! Schema generation from YAML record definitions

use std::fs;
use std::path::Path;

use nomnom_graphql::config::{load_records, SchemaConfig};
use nomnom_graphql::{ObjectBuilder, SchemaTypes};
use tempfile::TempDir;

const BASE: &str = r#"
record:
  name: Base
  fields:
    - name: Id
      type: String
      tag: id
"#;

const ARTICLE: &str = r#"
record:
  name: Article
  doc: A news article
  fields:
    - name: Base
      type: { Named: Base }
      embedded: true
    - name: Headline
      type: String
      tag: "headline,omitempty"
      description: "DEPRECATED: use title"
    - name: Title
      type: String
      tag: title
      description: The title
    - name: Modules
      type: { List: { Named: Module } }
      tag: "modules,omitempty"
"#;

const MODULE: &str = r#"
records:
  - name: Module
    fields:
      - name: Name
        type: String
      - name: Weight
        type: Float
        tag: "weight,omitempty"
"#;

fn write_records(dir: &Path) {
    fs::write(dir.join("a_base.yaml"), BASE).unwrap();
    fs::write(dir.join("b_article.yaml"), ARTICLE).unwrap();
    fs::write(dir.join("c_module.yml"), MODULE).unwrap();
}

fn build(dir: &Path, prefix: &str) -> SchemaTypes {
    let records = load_records(dir).unwrap();
    ObjectBuilder::new(records, prefix, None).unwrap().finish().unwrap()
}

#[test]
fn test_interface_and_prefix_naming() {
    let dir = TempDir::new().unwrap();
    write_records(dir.path());

    let types = build(dir.path(), "Pre");

    let names: Vec<&String> = types.objects.keys().collect();
    assert_eq!(names, vec!["prebase", "prearticle", "premodule"]);

    let interface = types.interface("Base").unwrap();
    assert_eq!(interface.name, "PreBase");

    let article = types.object("prearticle").unwrap();
    assert_eq!(article.interfaces, vec!["PreBase".to_string()]);

    let fields: Vec<&String> = article.fields.keys().collect();
    assert_eq!(fields, vec!["id", "headline", "title", "modules", "totalModules"]);

    let modules = article.field("modules").unwrap();
    assert_eq!(modules.ty.to_string(), "[prearticle_modules]");
    assert_eq!(modules.ty.object().unwrap().field("weight").unwrap().ty.to_string(), "Float");
}

#[test]
fn test_sdl_output() {
    let dir = TempDir::new().unwrap();
    write_records(dir.path());

    let sdl = build(dir.path(), "Pre").to_string();

    assert!(sdl.contains("scalar ListFilter\n"));
    assert!(sdl.contains("scalar SortFilter\n"));
    assert!(sdl.contains("interface PreBase {\n  id: String!\n}\n"));
    assert!(sdl.contains("type prearticle implements PreBase {\n"));
    assert!(sdl.contains("  headline: String @deprecated(reason: \"DEPRECATED: use title\")\n"));
    assert!(sdl.contains("  \"The title\"\n  title: String!\n"));
    assert!(sdl.contains("  modules(filter: ListFilter, sort: SortFilter): [prearticle_modules]\n"));
    assert!(sdl.contains("  totalModules: Int\n"));
    assert!(sdl.contains("type prearticle_modules {\n  name: String!\n  weight: Float\n}\n"));
}

#[test]
fn test_sdl_is_stable_across_builds() {
    let dir = TempDir::new().unwrap();
    write_records(dir.path());

    let first = build(dir.path(), "").to_string();
    let second = build(dir.path(), "").to_string();
    assert_eq!(first, second);
}

#[test]
fn test_schema_config_points_at_records() {
    let dir = TempDir::new().unwrap();
    let records = dir.path().join("records");
    fs::create_dir(&records).unwrap();
    write_records(&records);

    let config_path = dir.path().join("nomnom-graphql.yaml");
    fs::write(&config_path, "records: records\nname_prefix: Api\n").unwrap();

    let config = SchemaConfig::load(&config_path).unwrap();
    let prefix = config.name_prefix.clone().unwrap_or_default();
    let types = build(&config.records, &prefix);

    assert!(types.object("apiarticle").is_some());
    assert_eq!(types.interface("Base").unwrap().name, "ApiBase");
}
