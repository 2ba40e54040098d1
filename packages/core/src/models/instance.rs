//! Instance Data Structures
//!
//! An instance is a concrete configured field, component or section created
//! from a type definition. Container components (tabs, accordion, row) keep
//! their tabs/panes/columns as ordered child instances.
//!
//! # Examples
//!
//! ```rust
//! use spider_boxes_core::models::Instance;
//! use serde_json::json;
//!
//! let field = Instance::new("product_color", "select", "Product color")
//!     .with_context("product")
//!     .with_settings(json!({"options": "red : Red\nblue : Blue", "multiple": false}));
//!
//! assert_eq!(field.settings["multiple"], false);
//! ```

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// A single field-level failure, surfaced next to the field it concerns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    /// "Missing required field: {name}"
    pub fn missing(field: impl Into<String>) -> Self {
        let field = field.into();
        let message = format!("Missing required field: {}", field);
        Self { field, message }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

fn default_context() -> String {
    "default".to_string()
}

fn default_active() -> bool {
    true
}

/// A concrete configured field, component or section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instance {
    /// Unique within its namespace
    #[serde(default)]
    pub id: String,

    /// References a type definition id in the same namespace
    #[serde(rename = "type", default)]
    pub instance_type: String,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub description: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,

    /// Grouping tag ("default", "post", "product", ...); not validated
    #[serde(default = "default_context")]
    pub context: String,

    /// Descriptor id → value
    #[serde(default)]
    pub settings: Map<String, Value>,

    /// Ordered child instances (container components only)
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub children: IndexMap<String, Instance>,

    #[serde(default = "default_active")]
    pub is_active: bool,

    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,

    #[serde(default = "Utc::now")]
    pub modified_at: DateTime<Utc>,
}

impl Instance {
    /// Fields that must be present and non-empty on create/update, in every
    /// namespace
    pub const REQUIRED_FIELDS: [&'static str; 3] = ["id", "type", "title"];

    /// Create an active instance in the default context with empty settings
    pub fn new(
        id: impl Into<String>,
        instance_type: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            instance_type: instance_type.into(),
            title: title.into(),
            description: String::new(),
            parent_id: None,
            context: default_context(),
            settings: Map::new(),
            children: IndexMap::new(),
            is_active: true,
            created_at: now,
            modified_at: now,
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = context.into();
        self
    }

    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    /// Replace settings; non-object values leave settings empty
    pub fn with_settings(mut self, settings: Value) -> Self {
        self.settings = match settings {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        self
    }

    /// Check structural rules that do not need the type catalog
    ///
    /// Collects every failure instead of stopping at the first one.
    pub fn validate(&self, required: &[&str]) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();

        for field in required {
            let present = match *field {
                "id" => !self.id.trim().is_empty(),
                "type" => !self.instance_type.trim().is_empty(),
                "title" => !self.title.trim().is_empty(),
                "description" => !self.description.trim().is_empty(),
                "context" => !self.context.trim().is_empty(),
                other => self
                    .settings
                    .get(other)
                    .map(|v| !crate::renderer::is_empty_value(v))
                    .unwrap_or(false),
            };
            if !present {
                errors.push(FieldError::missing(*field));
            }
        }

        if let Some(parent_id) = &self.parent_id {
            if !self.id.is_empty() && parent_id == &self.id {
                errors.push(FieldError::new(
                    "parent_id",
                    "Instance cannot be its own parent",
                ));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Apply a patch, patch wins field by field
    pub fn apply(&mut self, update: InstanceUpdate) {
        if let Some(instance_type) = update.instance_type {
            self.instance_type = instance_type;
        }
        if let Some(title) = update.title {
            self.title = title;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(parent_id) = update.parent_id {
            self.parent_id = parent_id;
        }
        if let Some(context) = update.context {
            self.context = context;
        }
        if let Some(settings) = update.settings {
            self.settings = settings;
        }
        if let Some(children) = update.children {
            self.children = children;
        }
        if let Some(is_active) = update.is_active {
            self.is_active = is_active;
        }
        self.modified_at = Utc::now();
    }
}

/// Accept either `T` or `null` and wrap it so a missing key stays `None`
fn deserialize_optional_field<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Some(Option::<T>::deserialize(deserializer)?))
}

/// Partial instance update for PATCH-style operations
///
/// `parent_id` uses the double-Option pattern: `None` leaves it alone,
/// `Some(None)` clears it, `Some(Some(id))` sets it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InstanceUpdate {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub instance_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_optional_field"
    )]
    pub parent_id: Option<Option<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<Map<String, Value>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<IndexMap<String, Instance>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl InstanceUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_settings(mut self, settings: Map<String, Value>) -> Self {
        self.settings = Some(settings);
        self
    }

    pub fn with_active(mut self, is_active: bool) -> Self {
        self.is_active = Some(is_active);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.instance_type.is_none()
            && self.title.is_none()
            && self.description.is_none()
            && self.parent_id.is_none()
            && self.context.is_none()
            && self.settings.is_none()
            && self.children.is_none()
            && self.is_active.is_none()
    }
}

/// Caller-supplied part of a new container child
///
/// Every key other than `title` lands in the child's settings, replacing the
/// kind's default (`active`, `open`, `width`, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChildConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(flatten)]
    pub settings: Map<String, Value>,
}

impl ChildConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_setting(mut self, key: impl Into<String>, value: Value) -> Self {
        self.settings.insert(key.into(), value);
        self
    }
}
