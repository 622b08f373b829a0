use std::path::Path;

use control_schema_core::{Control, EditControl, OnChange};
use control_schema_loader::{LoaderError, RegistrySource, SchemaDocument, SchemaRegistry};
use pretty_assertions::assert_eq;
use serde_json::json;
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const ADDRESS_YAML: &str = r#"
name: address
title: Address
fields:
  - field: street
    title: Street
    control: { type: text }
  - field: city
    title: City
    control: { type: text }
"#;

const CUSTOMER_YAML: &str = r#"
name: customer
title: Customer
fields:
  - field: name
    title: Name
    control: { type: text }
  - field: age
    title: Age
    control: { type: number, optional: true }
  - field: address
    title: Address
    control: { type: ref, schema: address }
  - field: plan
    title: Plan
    control: { type: select, options: [free, pro, team] }
  - field: timeout
    title: Timeout
    control: { type: duration, optional: true }
"#;

fn write(dir: &Path, file: &str, contents: &str) {
    std::fs::write(dir.join(file), contents).unwrap();
}

fn schema_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "address.yaml", ADDRESS_YAML);
    write(dir.path(), "customer.yml", CUSTOMER_YAML);
    dir
}

// ---------------------------------------------------------------------------
// Directory loading
// ---------------------------------------------------------------------------

#[test]
fn test_directory_loading() {
    let dir = schema_dir();
    write(dir.path(), "README.md", "not a schema");

    let registry = SchemaRegistry::from_dir(dir.path()).unwrap();
    assert_eq!(registry.names(), vec!["address", "customer"]);
    assert_eq!(
        registry.source(),
        &RegistrySource::Directory(dir.path().to_path_buf())
    );
}

#[test]
fn test_directory_mixes_json_and_yaml() {
    let dir = schema_dir();
    let tag = SchemaDocument::from_yaml_str(
        "name: tag\nfields:\n  - field: label\n    control: { type: text }\n",
    )
    .unwrap();
    write(dir.path(), "tag.json", &serde_json::to_string_pretty(&tag).unwrap());

    let registry = SchemaRegistry::from_dir(dir.path()).unwrap();
    assert_eq!(registry.get("tag"), Some(&tag));
    assert_eq!(registry.len(), 3);
}

#[test]
fn test_directory_with_malformed_file_fails() {
    let dir = schema_dir();
    write(dir.path(), "broken.yaml", "name: [unterminated");

    let result = SchemaRegistry::from_dir(dir.path());
    assert!(matches!(result, Err(LoaderError::YamlError(_))));
}

#[test]
fn test_missing_directory_is_io_error() {
    let dir = TempDir::new().unwrap();
    let result = SchemaRegistry::from_dir(dir.path().join("nope"));
    assert!(matches!(result, Err(LoaderError::IoError(_))));
}

// ---------------------------------------------------------------------------
// File loading
// ---------------------------------------------------------------------------

#[test]
fn test_file_with_document_list() {
    let dir = TempDir::new().unwrap();
    let bundle = format!(
        "- {}\n- {}",
        ADDRESS_YAML.trim().replace('\n', "\n  "),
        CUSTOMER_YAML.trim().replace('\n', "\n  ")
    );
    write(dir.path(), "bundle.yaml", &bundle);

    let registry = SchemaRegistry::from_file(dir.path().join("bundle.yaml")).unwrap();
    assert_eq!(registry.names(), vec!["address", "customer"]);
}

#[test]
fn test_single_document_load() {
    let dir = schema_dir();
    let doc = SchemaDocument::load(dir.path().join("address.yaml")).unwrap();
    assert_eq!(doc.name, "address");
    assert_eq!(doc.fields.len(), 2);
}

#[test]
fn test_single_document_load_from_empty_list() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "empty.json", "[]");

    let result = SchemaDocument::load(dir.path().join("empty.json"));
    assert!(matches!(result, Err(LoaderError::EmptyFile(path)) if path.ends_with("empty.json")));

    let registry = SchemaRegistry::from_file(dir.path().join("empty.json")).unwrap();
    assert!(registry.is_empty());
}

#[test]
fn test_unsupported_extension() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "schema.toml", "name = 'x'");

    let result = SchemaRegistry::from_file(dir.path().join("schema.toml"));
    assert!(matches!(result, Err(LoaderError::UnsupportedFormat(_))));
}

// ---------------------------------------------------------------------------
// Fallback chain
// ---------------------------------------------------------------------------

#[test]
fn test_builder_falls_back_to_second_source() {
    let dir = schema_dir();
    let missing = dir.path().join("missing");

    let registry = SchemaRegistry::builder()
        .from_dir(&missing)
        .from_dir(dir.path())
        .build()
        .unwrap();
    assert!(registry.contains("customer"));
    assert_eq!(
        registry.source(),
        &RegistrySource::Multiple(vec![
            RegistrySource::Directory(missing),
            RegistrySource::Directory(dir.path().to_path_buf()),
        ])
    );
}

#[test]
fn test_builder_all_sources_fail() {
    let dir = TempDir::new().unwrap();
    let result = SchemaRegistry::builder()
        .from_dir(dir.path().join("a"))
        .from_file(dir.path().join("b.yaml"))
        .build();
    assert!(matches!(result, Err(LoaderError::NoSourcesAvailable)));
}

// ---------------------------------------------------------------------------
// Building controls
// ---------------------------------------------------------------------------

#[test]
fn test_loaded_schema_round_trip() {
    let registry = SchemaRegistry::from_dir(schema_dir().path()).unwrap();
    let customer = registry.build("customer").unwrap();

    let raw = json!({
        "name": "Ada",
        "age": "36",
        "address": { "street": "Main St", "city": "Springfield" },
        "plan": "pro",
        "timeout": "1h30m"
    });
    let values = customer.construct(&raw);
    assert_eq!(values["age"], json!(36));
    assert_eq!(values["timeout"], json!(5400));

    let editor = customer.edit_control();
    let edited = customer.edit(&values);
    assert!(editor.validate(&edited));
    assert_eq!(editor.save(&edited), values);
    assert_eq!(customer.serialize(&values)["timeout"], json!("1h30m"));
}

#[test]
fn test_loaded_schema_renders_titles_in_order() {
    let registry = SchemaRegistry::from_dir(schema_dir().path()).unwrap();
    let customer = registry.build("customer").unwrap();

    let view = customer.render(&customer.default_value(), &OnChange::root());
    let text = view.render_text();
    let titles: Vec<&str> = text
        .lines()
        .filter(|line| !line.starts_with(' '))
        .map(|line| line.split(':').next().unwrap())
        .collect();
    assert_eq!(titles, vec!["Name", "Age", "Address", "Plan", "Timeout"]);
}

#[test]
fn test_check_on_clean_directory() {
    let registry = SchemaRegistry::from_dir(schema_dir().path()).unwrap();
    assert!(registry.check().is_empty());
}

#[test]
fn test_dangling_ref_after_removing_file() {
    let dir = schema_dir();
    std::fs::remove_file(dir.path().join("address.yaml")).unwrap();

    let registry = SchemaRegistry::from_dir(dir.path()).unwrap();
    assert!(matches!(
        registry.build("customer"),
        Err(LoaderError::UnknownSchema(name)) if name == "address"
    ));
}
