//! Config Field Descriptors
//!
//! A descriptor is one generated configuration input for editing a type's
//! instance settings. Generated schemas are ordered lists of descriptors.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One selectable option, kept as an explicit ordered `(value, label)` pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionItem {
    pub value: String,
    pub label: String,
}

impl OptionItem {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// Build an option list from `(value, label)` pairs
pub fn options_from(values: &[(&str, &str)]) -> Vec<OptionItem> {
    values
        .iter()
        .map(|(value, label)| OptionItem::new(*value, *label))
        .collect()
}

/// Visibility dependency: only relevant when `field` equals `value`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conditional {
    pub field: String,
    pub value: Value,
}

/// Optional constraints attached to a descriptor
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Constraints {
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rows: Option<u32>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<OptionItem>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditional: Option<Conditional>,

    /// Row schema of repeater descriptors
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldDescriptor>,
}

/// One generated configuration field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Unique within one generated schema (collisions are possible, see generator)
    pub id: String,

    /// Renderer kind: text, textarea, checkbox, select, number, repeater, ...
    pub kind: String,

    pub title: String,

    #[serde(default)]
    pub description: String,

    /// Existing instance setting if present, else the kind-specific default
    pub current_value: Value,

    #[serde(default)]
    pub constraints: Constraints,
}

impl FieldDescriptor {
    pub fn is_required(&self) -> bool {
        self.constraints.required
    }
}
