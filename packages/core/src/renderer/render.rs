//! Render pass: turn a config and a value into a serializable control model
//!
//! Rendering never fails. Values of the wrong shape render as the kind's
//! empty state, and unsupported kinds render a placeholder control.

use super::config::FieldConfig;
use super::kind::FieldKind;
use super::media::{MediaLookup, MediaSlot};
use super::sanitize::{coerce_bool, coerce_number, scalar_string};
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

/// Path of a repeater sub field: `{path}[{index}][{sub_id}]`
pub fn row_path(path: &str, index: usize, sub_id: &str) -> String {
    format!("{}[{}][{}]", path, index, sub_id)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChoiceOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MediaPreview {
    pub id: String,
    pub slot: MediaSlot,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RepeaterRow {
    pub index: usize,
    pub fields: Vec<RenderedField>,
}

/// Control model, one variant per renderer kind
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Control {
    Text {
        value: String,
        placeholder: Option<String>,
    },
    Textarea {
        value: String,
        rows: u32,
    },
    Number {
        value: Option<f64>,
        min: Option<f64>,
        max: Option<f64>,
        step: Option<f64>,
    },
    Range {
        value: f64,
        min: f64,
        max: f64,
        step: f64,
    },
    Select {
        options: Vec<ChoiceOption>,
        multiple: bool,
        placeholder: Option<String>,
    },
    Checkbox {
        checked: bool,
    },
    CheckboxGroup {
        options: Vec<ChoiceOption>,
        multiple: bool,
    },
    Radio {
        options: Vec<ChoiceOption>,
    },
    Switcher {
        on: bool,
    },
    Media {
        multiple: bool,
        items: Vec<MediaPreview>,
    },
    Datetime {
        value: String,
        format: Option<String>,
    },
    Repeater {
        rows: Vec<RepeaterRow>,
        can_add: bool,
        can_remove: bool,
    },
    Tags {
        tags: Vec<String>,
    },
    Button {
        label: String,
    },
    Unsupported {
        kind: String,
        message: String,
    },
}

/// One rendered field with its current error
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedField {
    pub id: String,
    pub path: String,
    pub kind: String,
    pub title: String,
    pub description: String,
    pub required: bool,
    pub is_meta: bool,
    pub visible: bool,
    pub error: Option<String>,
    pub control: Control,
}

/// What a render needs besides the config and value
pub struct RenderContext<'a> {
    pub errors: &'a IndexMap<String, String>,
    pub media: &'a dyn MediaLookup,
}

/// Render one field at `path`
pub fn render_field(
    config: &FieldConfig,
    value: &Value,
    path: &str,
    ctx: &RenderContext<'_>,
) -> RenderedField {
    RenderedField {
        id: config.id.clone(),
        path: path.to_string(),
        kind: config.kind.to_string(),
        title: config.title.clone(),
        description: config.description.clone(),
        required: config.required,
        is_meta: config.is_meta,
        visible: true,
        error: ctx.errors.get(path).cloned(),
        control: control(config, value, path, ctx),
    }
}

fn control(config: &FieldConfig, value: &Value, path: &str, ctx: &RenderContext<'_>) -> Control {
    match &config.kind {
        FieldKind::Text => Control::Text {
            value: text_of(value),
            placeholder: config.placeholder.clone(),
        },
        FieldKind::Textarea => Control::Textarea {
            value: text_of(value),
            rows: config.rows.unwrap_or(4),
        },
        FieldKind::Number => Control::Number {
            value: coerce_number(value),
            min: config.min,
            max: config.max,
            step: config.step,
        },
        FieldKind::Range => {
            let min = config.min.unwrap_or(0.0);
            let max = config.max.unwrap_or(100.0);
            Control::Range {
                value: coerce_number(value).unwrap_or(min),
                min,
                max,
                step: config.step.unwrap_or(1.0),
            }
        }
        FieldKind::Checkbox if config.options.is_empty() => Control::Checkbox {
            checked: coerce_bool(value).unwrap_or(false),
        },
        FieldKind::Checkbox => Control::CheckboxGroup {
            options: choices(config, value),
            multiple: config.multiple,
        },
        FieldKind::Select => Control::Select {
            options: choices(config, value),
            multiple: config.multiple,
            placeholder: config.placeholder.clone(),
        },
        FieldKind::Radio => Control::Radio {
            options: choices(config, value),
        },
        FieldKind::Switcher => Control::Switcher {
            on: coerce_bool(value).unwrap_or(false),
        },
        FieldKind::Media => Control::Media {
            multiple: config.multiple,
            items: selected_values(value)
                .into_iter()
                .map(|id| MediaPreview {
                    slot: ctx.media.lookup(&id),
                    id,
                })
                .collect(),
        },
        FieldKind::Datetime => Control::Datetime {
            value: text_of(value),
            format: config.format.clone(),
        },
        FieldKind::Repeater => {
            let rows: Vec<RepeaterRow> = value
                .as_array()
                .map(|rows| {
                    rows.iter()
                        .enumerate()
                        .map(|(index, row)| RepeaterRow {
                            index,
                            fields: config
                                .fields
                                .iter()
                                .map(|sub| {
                                    let sub_value = row.get(&sub.id).unwrap_or(&Value::Null);
                                    render_field(sub, sub_value, &row_path(path, index, &sub.id), ctx)
                                })
                                .collect(),
                        })
                        .collect()
                })
                .unwrap_or_default();
            Control::Repeater {
                can_add: config.max_rows.map_or(true, |max| rows.len() < max),
                can_remove: config.min_rows.map_or(!rows.is_empty(), |min| rows.len() > min),
                rows,
            }
        }
        FieldKind::Tags => Control::Tags {
            tags: selected_values(value),
        },
        FieldKind::Button => Control::Button {
            label: config.title.clone(),
        },
        FieldKind::Unsupported(kind) => Control::Unsupported {
            kind: kind.clone(),
            message: format!("Field type \"{}\" is not supported", kind),
        },
    }
}

fn text_of(value: &Value) -> String {
    scalar_string(value).unwrap_or_default()
}

fn selected_values(value: &Value) -> Vec<String> {
    let values: Vec<String> = match value {
        Value::Array(items) => items.iter().filter_map(scalar_string).collect(),
        Value::Null => Vec::new(),
        other => scalar_string(other).into_iter().collect(),
    };
    values.into_iter().filter(|s| !s.is_empty()).collect()
}

fn choices(config: &FieldConfig, value: &Value) -> Vec<ChoiceOption> {
    let selected = selected_values(value);
    config
        .options
        .iter()
        .map(|option| ChoiceOption {
            value: option.value.clone(),
            label: option.label.clone(),
            selected: selected.contains(&option.value),
        })
        .collect()
}
