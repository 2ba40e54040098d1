use super::*;
use crate::generator::generate_config_fields;
use crate::models::{get_core_types, options_from, Namespace};
use crate::renderer::{Condition, ConditionOperator, Control, MediaInfo};
use serde_json::json;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

type Changes = Arc<Mutex<Vec<(String, bool, Value)>>>;

fn recorder() -> (Changes, impl FnMut(&str, bool, &Value) + Send + 'static) {
    let changes: Changes = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&changes);
    let callback = move |id: &str, is_meta: bool, value: &Value| {
        sink.lock().unwrap().push((id.to_string(), is_meta, value.clone()));
    };
    (changes, callback)
}

fn links() -> FieldConfig {
    FieldConfig::new("links", "repeater", "Links")
        .with_rows(Some(1), Some(3))
        .with_fields(vec![
            FieldConfig::new("label", "text", "Label").required(),
            FieldConfig::new("url", "text", "URL"),
        ])
        .meta(true)
}

fn no_media() -> HashMap<String, MediaInfo> {
    HashMap::new()
}

#[test]
fn test_set_value_notifies_synchronously() {
    let (changes, callback) = recorder();
    let mut editor = FormEditor::new(vec![
        FieldConfig::new("title", "text", "Title").meta(true),
        FieldConfig::new("note", "textarea", "Note"),
    ])
    .on_change(callback);

    assert!(editor.set_value("title", json!("Hello")));
    assert!(editor.set_value("note", json!("x")));
    assert!(!editor.set_value("unknown", json!(1)));

    let changes = changes.lock().unwrap();
    assert_eq!(
        *changes,
        vec![
            ("title".to_string(), true, json!("Hello")),
            ("note".to_string(), false, json!("x")),
        ]
    );
    assert_eq!(editor.value("title"), Some(&json!("Hello")));
}

#[test]
fn test_errors_are_per_field_and_cleared_on_edit() {
    let mut editor = FormEditor::new(vec![
        FieldConfig::new("name", "text", "Name").required(),
        FieldConfig::new("age", "number", "Age").with_bounds(Some(0.0), Some(130.0), None),
    ])
    .with_values(json!({"age": 200}).as_object().unwrap());

    let errors = editor.validate_all().unwrap_err();
    assert_eq!(errors.len(), 2);
    assert_eq!(editor.error("name"), Some("Name is required"));
    assert_eq!(editor.error("age"), Some("Age must be between 0 and 130"));

    editor.set_value("name", json!("Ada"));
    assert_eq!(editor.error("name"), None);
    assert_eq!(editor.error("age"), Some("Age must be between 0 and 130"));

    editor.set_value("age", json!(36));
    assert!(editor.validate_field("age"));
    assert!(editor.validate_all().is_ok());
    assert!(editor.errors().is_empty());
}

#[test]
fn test_hidden_fields_are_not_validated() {
    let mut editor = FormEditor::new(vec![
        FieldConfig::new("ship", "switcher", "Ship"),
        FieldConfig::new("address", "text", "Address")
            .required()
            .with_condition(Condition {
                field: "ship".to_string(),
                operator: ConditionOperator::Equals,
                value: json!(true),
            }),
    ]);

    assert!(!editor.is_visible("address"));
    assert!(editor.validate_all().is_ok());

    editor.set_value("ship", json!(true));
    assert!(editor.is_visible("address"));
    assert!(editor.validate_all().is_err());

    let rendered = editor.render(&no_media());
    assert!(rendered[1].visible);
    assert_eq!(rendered[1].error.as_deref(), Some("Address is required"));
}

#[test]
fn test_generated_schema_round_trip() {
    let select = get_core_types(Namespace::Field)
        .into_iter()
        .find(|t| t.id == "select")
        .unwrap();
    let existing = json!({"label": "Size", "multiple": true, "max_selections": "2"});
    let descriptors = generate_config_fields(&select, existing.as_object().unwrap());
    let mut editor = FormEditor::from_descriptors(&descriptors);

    assert_eq!(editor.value("label"), Some(&json!("Size")));
    assert!(editor.is_visible("max_selections"));
    assert!(editor.validate_all().is_ok());

    let clean = editor.sanitized_values();
    assert_eq!(clean["max_selections"], json!(2));
    assert_eq!(clean["context"], json!("default"));
    assert_eq!(clean["meta_field"], json!(true));

    editor.set_value("multiple", json!(false));
    assert!(!editor.is_visible("max_selections"));
}

#[test]
fn test_repeater_row_operations() {
    let (changes, callback) = recorder();
    let mut editor = FormEditor::new(vec![links()]).on_change(callback);

    assert_eq!(editor.add_row("links"), Some(0));
    assert_eq!(editor.add_row("links"), Some(1));
    assert_eq!(editor.add_row("links"), Some(2));
    assert_eq!(editor.add_row("links"), None);
    assert_eq!(editor.value("links").unwrap().as_array().unwrap().len(), 3);

    assert!(editor.set_row_value("links", 0, "label", json!("First")));
    assert!(editor.set_row_value("links", 2, "label", json!("Third")));
    assert!(!editor.set_row_value("links", 9, "label", json!("x")));

    assert!(editor.move_row("links", 2, 0));
    let rows = editor.value("links").unwrap().as_array().unwrap();
    assert_eq!(rows[0]["label"], "Third");
    assert_eq!(rows[1]["label"], "First");

    assert!(editor.remove_row("links", 2));
    assert!(editor.remove_row("links", 1));
    assert!(!editor.remove_row("links", 0));
    assert_eq!(editor.add_row("missing"), None);

    let changes = changes.lock().unwrap();
    assert_eq!(changes.len(), 8);
    assert!(changes.iter().all(|(id, is_meta, _)| id == "links" && *is_meta));
}

#[test]
fn test_row_errors_follow_reindexed_paths() {
    let mut editor = FormEditor::new(vec![links()]).with_values(
        json!({"links": [{"label": "Docs", "url": ""}, {"label": "", "url": "/x"}]})
            .as_object()
            .unwrap(),
    );

    assert!(!editor.validate_field("links"));
    assert_eq!(editor.error("links[1][label]"), Some("Label is required"));

    editor.move_row("links", 1, 0);
    assert!(editor.errors().is_empty());
    editor.validate_field("links");
    assert_eq!(editor.error("links[0][label]"), Some("Label is required"));

    let rendered = editor.render(&no_media());
    let Control::Repeater { rows, .. } = &rendered[0].control else {
        panic!("expected repeater");
    };
    assert_eq!(rows[0].fields[0].path, "links[0][label]");
    assert_eq!(rows[0].fields[0].error.as_deref(), Some("Label is required"));
    assert_eq!(rows[1].fields[1].path, "links[1][url]");
}

#[test]
fn test_row_operations_ignore_other_kinds() {
    let mut editor = FormEditor::new(vec![FieldConfig::new("size", "select", "Size")
        .with_options(options_from(&[("s", "Small")]))]);
    assert_eq!(editor.add_row("size"), None);
    assert!(!editor.remove_row("size", 0));
    assert!(!editor.move_row("size", 0, 0));
}
