//! Renderer field configuration
//!
//! A `FieldConfig` is what the renderer works from. It is built either from a
//! generated descriptor (editing a type's configuration) or from an instance's
//! settings (editing a value of that instance).

use super::kind::FieldKind;
use super::sanitize::{coerce_bool, coerce_number};
use crate::generator::parse_options;
use crate::models::{Conditional, FieldDescriptor, Instance, OptionItem, TypeDefinition};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Comparison used by a visibility condition
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionOperator {
    #[default]
    Equals,
    NotEquals,
    Contains,
    Empty,
    NotEmpty,
}

impl ConditionOperator {
    pub fn parse(operator: &str) -> Self {
        match operator {
            "not_equals" | "!=" => ConditionOperator::NotEquals,
            "contains" => ConditionOperator::Contains,
            "empty" => ConditionOperator::Empty,
            "not_empty" => ConditionOperator::NotEmpty,
            _ => ConditionOperator::Equals,
        }
    }
}

/// Advisory visibility rule: show the field when `field` compares to `value`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub field: String,
    #[serde(default)]
    pub operator: ConditionOperator,
    #[serde(default)]
    pub value: Value,
}

impl Condition {
    /// Evaluate against the current form values
    pub fn matches(&self, values: &Map<String, Value>) -> bool {
        let current = values.get(&self.field).unwrap_or(&Value::Null);
        match self.operator {
            ConditionOperator::Equals => loose_eq(current, &self.value),
            ConditionOperator::NotEquals => !loose_eq(current, &self.value),
            ConditionOperator::Contains => match current {
                Value::Array(items) => items.iter().any(|item| loose_eq(item, &self.value)),
                Value::String(s) => s.contains(&display(&self.value)),
                _ => false,
            },
            ConditionOperator::Empty => super::is_empty_value(current),
            ConditionOperator::NotEmpty => !super::is_empty_value(current),
        }
    }
}

impl From<&Conditional> for Condition {
    fn from(conditional: &Conditional) -> Self {
        Self {
            field: conditional.field.clone(),
            operator: ConditionOperator::Equals,
            value: conditional.value.clone(),
        }
    }
}

/// Equality that treats `true`, `"1"` and `"true"` alike, and numbers like
/// their string form
fn loose_eq(a: &Value, b: &Value) -> bool {
    if a == b {
        return true;
    }
    match (a, b) {
        (Value::Bool(_), _) | (_, Value::Bool(_)) => {
            matches!((coerce_bool(a), coerce_bool(b)), (Some(x), Some(y)) if x == y)
        }
        _ => display(a) == display(b),
    }
}

fn display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Everything the renderer needs to know about one field
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldConfig {
    pub id: String,
    pub kind: FieldKind,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub placeholder: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub multiple: bool,
    #[serde(default)]
    pub options: Vec<OptionItem>,
    #[serde(default)]
    pub max_selections: Option<usize>,
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
    #[serde(default)]
    pub step: Option<f64>,
    #[serde(default)]
    pub rows: Option<u32>,
    /// Date format in `Y-m-d H:i` notation
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub pattern: Option<String>,
    #[serde(default)]
    pub pattern_message: Option<String>,
    #[serde(default)]
    pub min_rows: Option<usize>,
    #[serde(default)]
    pub max_rows: Option<usize>,
    /// Sub fields of each repeater row
    #[serde(default)]
    pub fields: Vec<FieldConfig>,
    #[serde(default)]
    pub condition: Option<Condition>,
    /// Passed through to `on_change`
    #[serde(default)]
    pub is_meta: bool,
    #[serde(default)]
    pub default_value: Value,
}

impl FieldConfig {
    pub fn new(id: impl Into<String>, kind: impl Into<FieldKind>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn multiple(mut self) -> Self {
        self.multiple = true;
        self
    }

    pub fn with_options(mut self, options: Vec<OptionItem>) -> Self {
        self.options = options;
        self
    }

    pub fn with_bounds(mut self, min: Option<f64>, max: Option<f64>, step: Option<f64>) -> Self {
        self.min = min;
        self.max = max;
        self.step = step;
        self
    }

    pub fn with_rows(mut self, min_rows: Option<usize>, max_rows: Option<usize>) -> Self {
        self.min_rows = min_rows;
        self.max_rows = max_rows;
        self
    }

    pub fn with_fields(mut self, fields: Vec<FieldConfig>) -> Self {
        self.fields = fields;
        self
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    pub fn with_pattern(mut self, pattern: impl Into<String>, message: Option<String>) -> Self {
        self.pattern = Some(pattern.into());
        self.pattern_message = message;
        self
    }

    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }

    pub fn meta(mut self, is_meta: bool) -> Self {
        self.is_meta = is_meta;
        self
    }

    /// Whether `value` is one of the option keys
    pub fn has_option(&self, value: &str) -> bool {
        self.options.iter().any(|o| o.value == value)
    }

    pub fn sub_field(&self, id: &str) -> Option<&FieldConfig> {
        self.fields.iter().find(|f| f.id == id)
    }

    /// Build from the settings an instance was configured with
    ///
    /// Reads the keys the generator emits (`required`, `options`,
    /// `multiple`, `min`, `max`, `step`, `format`, `validation_pattern`,
    /// `sub_fields`, `conditional_*`, ...). Unparseable settings are ignored.
    pub fn from_settings(
        id: impl Into<String>,
        kind: impl Into<FieldKind>,
        title: impl Into<String>,
        settings: &Map<String, Value>,
    ) -> Self {
        let text = |key: &str| {
            settings
                .get(key)
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        let flag = |key: &str| settings.get(key).and_then(coerce_bool).unwrap_or(false);
        let number = |key: &str| settings.get(key).and_then(coerce_number);
        let count = |key: &str| {
            number(key)
                .filter(|n| *n >= 1.0)
                .map(|n| n as usize)
        };

        let fields = match settings.get("sub_fields") {
            Some(Value::Array(rows)) => rows
                .iter()
                .filter_map(Value::as_object)
                .filter_map(|row| {
                    let id = row.get("id").and_then(Value::as_str)?.trim();
                    if id.is_empty() {
                        return None;
                    }
                    let kind = row.get("type").and_then(Value::as_str).unwrap_or("text");
                    let title = row.get("title").and_then(Value::as_str).unwrap_or(id);
                    Some(FieldConfig::from_settings(id, kind, title, row))
                })
                .collect(),
            _ => Vec::new(),
        };

        let condition = text("conditional_field").map(|field| Condition {
            field,
            operator: settings
                .get("conditional_operator")
                .and_then(Value::as_str)
                .map(ConditionOperator::parse)
                .unwrap_or_default(),
            value: settings.get("conditional_value").cloned().unwrap_or(Value::Null),
        });

        Self {
            id: id.into(),
            kind: kind.into(),
            title: title.into(),
            description: text("description").unwrap_or_default(),
            placeholder: text("placeholder"),
            required: flag("required"),
            multiple: flag("multiple"),
            options: settings.get("options").map(parse_options).unwrap_or_default(),
            max_selections: count("max_selections"),
            min: number("min"),
            max: number("max"),
            step: number("step").filter(|s| *s > 0.0),
            rows: number("rows").filter(|r| *r >= 1.0).map(|r| r as u32),
            format: text("format"),
            pattern: text("validation_pattern"),
            pattern_message: text("validation_message"),
            min_rows: count("min_rows"),
            max_rows: count("max_rows"),
            fields,
            condition,
            is_meta: settings.get("meta_field").and_then(coerce_bool).unwrap_or(true),
            default_value: settings.get("default_value").cloned().unwrap_or(Value::Null),
        }
    }

    /// Build the value editor for a field instance
    ///
    /// The definition's `handler_ref` names the renderer kind; an empty one
    /// falls back to the instance type.
    pub fn from_instance(instance: &Instance, definition: &TypeDefinition) -> Self {
        let kind = if definition.handler_ref.trim().is_empty() {
            instance.instance_type.as_str()
        } else {
            definition.handler_ref.as_str()
        };
        let mut config =
            FieldConfig::from_settings(&instance.id, kind, &instance.title, &instance.settings);
        if config.description.is_empty() {
            config.description = instance.description.clone();
        }
        config
    }
}

impl From<&FieldDescriptor> for FieldConfig {
    fn from(descriptor: &FieldDescriptor) -> Self {
        let constraints = &descriptor.constraints;
        Self {
            id: descriptor.id.clone(),
            kind: FieldKind::parse(&descriptor.kind),
            title: descriptor.title.clone(),
            description: descriptor.description.clone(),
            required: constraints.required,
            options: constraints.options.clone(),
            min: constraints.min,
            max: constraints.max,
            rows: constraints.rows,
            fields: constraints.fields.iter().map(FieldConfig::from).collect(),
            condition: constraints.conditional.as_ref().map(Condition::from),
            default_value: descriptor.current_value.clone(),
            ..Self::default()
        }
    }
}
