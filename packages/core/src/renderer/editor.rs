//! Form editor: values, errors and change notification for a field list
//!
//! Edits are synchronous. Every accepted edit, including repeater row
//! operations, calls the `on_change(field_id, is_meta, value)` callback
//! before returning.

use super::config::FieldConfig;
use super::kind::FieldKind;
use super::media::MediaLookup;
use super::render::{render_field, RenderContext, RenderedField};
use super::sanitize::sanitize;
use super::validate::validate_field;
use crate::models::{FieldDescriptor, FieldError};
use indexmap::IndexMap;
use serde_json::{Map, Value};

pub type ChangeFn = Box<dyn FnMut(&str, bool, &Value) + Send>;

pub struct FormEditor {
    fields: IndexMap<String, FieldConfig>,
    values: Map<String, Value>,
    errors: IndexMap<String, String>,
    on_change: Option<ChangeFn>,
}

impl FormEditor {
    /// Start from each field's default value
    ///
    /// Later fields replace earlier ones with the same id.
    pub fn new(fields: Vec<FieldConfig>) -> Self {
        let mut values = Map::new();
        let mut by_id = IndexMap::new();
        for field in fields {
            if !field.default_value.is_null() {
                values.insert(field.id.clone(), field.default_value.clone());
            }
            by_id.insert(field.id.clone(), field);
        }
        Self {
            fields: by_id,
            values,
            errors: IndexMap::new(),
            on_change: None,
        }
    }

    /// Editor over a generated configuration schema
    pub fn from_descriptors(descriptors: &[FieldDescriptor]) -> Self {
        Self::new(descriptors.iter().map(FieldConfig::from).collect())
    }

    /// Overlay existing values (unknown keys are kept but never rendered)
    pub fn with_values(mut self, values: &Map<String, Value>) -> Self {
        for (key, value) in values {
            self.values.insert(key.clone(), value.clone());
        }
        self
    }

    pub fn on_change<F>(mut self, callback: F) -> Self
    where
        F: FnMut(&str, bool, &Value) + Send + 'static,
    {
        self.on_change = Some(Box::new(callback));
        self
    }

    pub fn field(&self, field_id: &str) -> Option<&FieldConfig> {
        self.fields.get(field_id)
    }

    pub fn value(&self, field_id: &str) -> Option<&Value> {
        self.values.get(field_id)
    }

    pub fn values(&self) -> &Map<String, Value> {
        &self.values
    }

    pub fn errors(&self) -> &IndexMap<String, String> {
        &self.errors
    }

    pub fn error(&self, path: &str) -> Option<&str> {
        self.errors.get(path).map(String::as_str)
    }

    /// Store a new value; false (and no callback) for an unknown field
    pub fn set_value(&mut self, field_id: &str, value: Value) -> bool {
        if !self.fields.contains_key(field_id) {
            tracing::debug!(field = field_id, "ignoring change to unknown field");
            return false;
        }
        self.commit(field_id, value);
        true
    }

    /// Change one sub field of one repeater row
    pub fn set_row_value(&mut self, field_id: &str, index: usize, sub_id: &str, value: Value) -> bool {
        let Some(mut rows) = self.rows(field_id) else {
            return false;
        };
        let Some(Value::Object(row)) = rows.get_mut(index) else {
            return false;
        };
        row.insert(sub_id.to_string(), value);
        self.commit(field_id, Value::Array(rows));
        true
    }

    /// Whether the field's condition holds against the current values
    pub fn is_visible(&self, field_id: &str) -> bool {
        self.fields
            .get(field_id)
            .and_then(|f| f.condition.as_ref())
            .map_or(true, |condition| condition.matches(&self.values))
    }

    /// Validate one field, replacing its previous errors
    pub fn validate_field(&mut self, field_id: &str) -> bool {
        let Some(config) = self.fields.get(field_id) else {
            return false;
        };
        let value = self.values.get(field_id).unwrap_or(&Value::Null);
        let errors = validate_field(config, value, field_id);
        self.clear_errors(field_id);
        let valid = errors.is_empty();
        for error in errors {
            self.errors.insert(error.field, error.message);
        }
        valid
    }

    /// Validate every visible field; hidden fields keep no errors
    pub fn validate_all(&mut self) -> Result<(), Vec<FieldError>> {
        self.errors.clear();
        let mut failures = Vec::new();
        for (id, config) in &self.fields {
            let visible = config
                .condition
                .as_ref()
                .map_or(true, |c| c.matches(&self.values));
            if !visible {
                continue;
            }
            let value = self.values.get(id).unwrap_or(&Value::Null);
            failures.extend(validate_field(config, value, id));
        }
        for error in &failures {
            self.errors.insert(error.field.clone(), error.message.clone());
        }
        if failures.is_empty() {
            Ok(())
        } else {
            Err(failures)
        }
    }

    /// Every field's value after the sanitize pass
    pub fn sanitized_values(&self) -> Map<String, Value> {
        self.fields
            .iter()
            .map(|(id, config)| {
                let value = self.values.get(id).unwrap_or(&config.default_value);
                (id.clone(), sanitize(config, value))
            })
            .collect()
    }

    pub fn render(&self, media: &dyn MediaLookup) -> Vec<RenderedField> {
        let ctx = RenderContext {
            errors: &self.errors,
            media,
        };
        self.fields
            .iter()
            .map(|(id, config)| {
                let value = self.values.get(id).unwrap_or(&Value::Null);
                let mut field = render_field(config, value, id, &ctx);
                field.visible = self.is_visible(id);
                field
            })
            .collect()
    }

    /// Append a row built from the sub fields' defaults
    ///
    /// Returns the new row's index, or `None` when the field is not a
    /// repeater or already has `max_rows` rows.
    pub fn add_row(&mut self, field_id: &str) -> Option<usize> {
        let config = self.fields.get(field_id)?;
        let mut rows = self.rows(field_id)?;
        if config.max_rows.is_some_and(|max| rows.len() >= max) {
            return None;
        }
        let row: Map<String, Value> = config
            .fields
            .iter()
            .map(|sub| (sub.id.clone(), sanitize(sub, &sub.default_value)))
            .collect();
        rows.push(Value::Object(row));
        let index = rows.len() - 1;
        self.commit(field_id, Value::Array(rows));
        Some(index)
    }

    /// Remove a row unless that would go below `min_rows`
    pub fn remove_row(&mut self, field_id: &str, index: usize) -> bool {
        let Some(config) = self.fields.get(field_id) else {
            return false;
        };
        let min_rows = config.min_rows;
        let Some(mut rows) = self.rows(field_id) else {
            return false;
        };
        if index >= rows.len() || min_rows.is_some_and(|min| rows.len() <= min) {
            return false;
        }
        rows.remove(index);
        self.commit(field_id, Value::Array(rows));
        true
    }

    /// Move a row; later renders pick up the new indexes in their paths
    pub fn move_row(&mut self, field_id: &str, from: usize, to: usize) -> bool {
        let Some(mut rows) = self.rows(field_id) else {
            return false;
        };
        if from >= rows.len() || to >= rows.len() {
            return false;
        }
        if from != to {
            let row = rows.remove(from);
            rows.insert(to, row);
            self.commit(field_id, Value::Array(rows));
        }
        true
    }

    /// Current rows of a repeater field, `None` for any other field
    fn rows(&self, field_id: &str) -> Option<Vec<Value>> {
        let config = self.fields.get(field_id)?;
        if config.kind != FieldKind::Repeater {
            return None;
        }
        Some(
            self.values
                .get(field_id)
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default(),
        )
    }

    fn clear_errors(&mut self, field_id: &str) {
        let nested = format!("{}[", field_id);
        self.errors
            .retain(|path, _| path != field_id && !path.starts_with(&nested));
    }

    fn commit(&mut self, field_id: &str, value: Value) {
        self.clear_errors(field_id);
        let is_meta = self.fields.get(field_id).map(|f| f.is_meta).unwrap_or(false);
        if let Some(callback) = self.on_change.as_mut() {
            callback(field_id, is_meta, &value);
        }
        self.values.insert(field_id.to_string(), value);
    }
}

#[cfg(test)]
#[path = "editor_test.rs"]
mod editor_test;
