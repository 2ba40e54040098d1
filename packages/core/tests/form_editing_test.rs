//! Form Editing Tests
//!
//! End-to-end editing sessions: a type's generated schema drives the
//! settings form, the stored instance drives the value form, and submitted
//! values go back through the field value service.

#[cfg(test)]
mod form_editing_tests {
    use anyhow::Result;
    use serde_json::{json, Map, Value};
    use spider_boxes_core::renderer::{Control, FormEditor, MediaInfo, MediaSlot};
    use spider_boxes_core::{CoreConfig, Instance, Namespace, SpiderBoxes, ValueKey};
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    fn no_media() -> HashMap<String, MediaInfo> {
        HashMap::new()
    }

    #[tokio::test]
    async fn test_settings_form_round_trips_into_instance() -> Result<()> {
        let app = SpiderBoxes::in_memory(CoreConfig::default());
        let schema = app
            .type_configs()
            .type_config(Namespace::Field, "select", &Map::new())
            .await?;

        let changes = Arc::new(Mutex::new(Vec::new()));
        let sink = changes.clone();
        let mut editor = FormEditor::from_descriptors(&schema.config_fields).on_change(
            move |id: &str, _is_meta: bool, value: &Value| {
                sink.lock().unwrap().push((id.to_string(), value.clone()));
            },
        );

        assert!(editor.set_value("label", json!("Size")));
        assert!(editor.set_value("options", json!("s : Small\nm : Medium\nl : Large")));
        assert!(editor.set_value("context", json!("product")));
        assert!(!editor.set_value("not_a_setting", json!(1)));
        assert_eq!(changes.lock().unwrap().len(), 3);

        editor.validate_all().map_err(|e| anyhow::anyhow!("{:?}", e))?;

        let settings = editor.sanitized_values();
        let stored = app
            .instances(Namespace::Field)
            .create(
                Instance::new("size", "select", "Size")
                    .with_context("product")
                    .with_settings(Value::Object(settings)),
            )
            .await?;
        assert_eq!(stored.settings["context"], "product");

        // The saved settings now drive the value editor
        let config = app
            .values()
            .field_config("size")
            .await?
            .expect("field instance exists");
        assert_eq!(config.options.len(), 3);

        let mut values = FormEditor::new(vec![config]);
        values.set_value("size", json!("m"));
        let rendered = values.render(&no_media());
        match &rendered[0].control {
            Control::Select { options, .. } => {
                let selected: Vec<&str> = options
                    .iter()
                    .filter(|o| o.selected)
                    .map(|o| o.value.as_str())
                    .collect();
                assert_eq!(selected, vec!["m"]);
            }
            other => panic!("expected a select control, got {:?}", other),
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_repeater_rows_render_with_indexed_paths() -> Result<()> {
        let app = SpiderBoxes::in_memory(CoreConfig::default());
        app.instances(Namespace::Field)
            .create(
                Instance::new("links", "repeater", "Links").with_settings(json!({
                    "sub_fields": [
                        {"id": "label", "type": "text", "title": "Label"},
                        {"id": "url", "type": "text", "title": "URL"}
                    ],
                    "min_rows": 1,
                    "max_rows": 2
                })),
            )
            .await?;

        let config = app.values().field_config("links").await?.expect("links exists");
        let mut editor = FormEditor::new(vec![config]);

        assert_eq!(editor.add_row("links"), Some(0));
        assert_eq!(editor.add_row("links"), Some(1));
        assert_eq!(editor.add_row("links"), None);

        assert!(editor.set_row_value("links", 0, "label", json!("Docs")));
        assert!(editor.set_row_value("links", 1, "label", json!("Blog")));
        assert!(editor.move_row("links", 1, 0));

        let rendered = editor.render(&no_media());
        match &rendered[0].control {
            Control::Repeater { rows, can_add, can_remove } => {
                assert!(!can_add);
                assert!(can_remove);
                assert_eq!(rows[0].fields[0].path, "links[0][label]");
                assert_eq!(rows[0].fields[0].control, Control::Text {
                    value: "Blog".to_string(),
                    placeholder: None,
                });
            }
            other => panic!("expected a repeater control, got {:?}", other),
        }

        assert!(editor.remove_row("links", 0));
        assert!(!editor.remove_row("links", 0));

        let key = ValueKey::new("10", "post", "links", "default");
        let stored = app
            .values()
            .set_value(&key, editor.value("links").cloned().unwrap_or(Value::Null))
            .await?;
        assert_eq!(stored.as_array().map(Vec::len), Some(1));
        Ok(())
    }

    #[tokio::test]
    async fn test_media_and_unsupported_fields_never_break_render() -> Result<()> {
        let app = SpiderBoxes::in_memory(CoreConfig::default());
        let fields = app.instances(Namespace::Field);
        fields
            .create(Instance::new("gallery", "media", "Gallery").with_settings(json!({"multiple": true})))
            .await?;

        let media_config = app.values().field_config("gallery").await?.expect("gallery exists");
        let map_config = spider_boxes_core::FieldConfig::new("where", "map", "Where");

        let mut editor = FormEditor::new(vec![media_config, map_config]);
        editor.set_value("gallery", json!(["7", "8"]));

        let mut library = HashMap::new();
        library.insert(
            "7".to_string(),
            MediaInfo {
                id: "7".to_string(),
                url: "https://example.test/7.png".to_string(),
                filename: "7.png".to_string(),
                mime_type: "image/png".to_string(),
            },
        );

        let rendered = editor.render(&library);
        match &rendered[0].control {
            Control::Media { multiple, items } => {
                assert!(multiple);
                assert!(matches!(items[0].slot, MediaSlot::Ready(_)));
                assert_eq!(items[1].slot, MediaSlot::NotFound);
            }
            other => panic!("expected a media control, got {:?}", other),
        }
        assert!(matches!(rendered[1].control, Control::Unsupported { .. }));
        Ok(())
    }
}
