//! Type Definitions
//!
//! A type definition describes one kind of field, component or section. The
//! `supports` list declares which optional configuration aspects instances of
//! the type expose; the config generator turns it into a descriptor schema.
//!
//! ## Example
//!
//! ```json
//! {
//!   "id": "range",
//!   "display_name": "Range",
//!   "description": "Numeric slider",
//!   "handler_ref": "range",
//!   "supports": ["label", "description", "min", "max", "step", "value"],
//!   "category": "advanced",
//!   "is_active": true
//! }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// The three independent catalogs a type or instance can belong to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Namespace {
    Field,
    Component,
    Section,
}

impl Namespace {
    /// All namespaces in bootstrap order
    pub const ALL: [Namespace; 3] = [Namespace::Field, Namespace::Component, Namespace::Section];

    pub fn as_str(&self) -> &'static str {
        match self {
            Namespace::Field => "field",
            Namespace::Component => "component",
            Namespace::Section => "section",
        }
    }

    /// Hook name scoped to this namespace, e.g. `field_created`
    pub fn hook(&self, suffix: &str) -> String {
        format!("{}_{}", self.as_str(), suffix)
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Namespace {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "field" | "fields" | "field-types" => Ok(Namespace::Field),
            "component" | "components" | "component-types" => Ok(Namespace::Component),
            "section" | "sections" | "section-types" => Ok(Namespace::Section),
            other => Err(format!("Unknown namespace: {}", other)),
        }
    }
}

/// Describes a kind of field, component or section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDefinition {
    /// Stable key, unique within its namespace
    pub id: String,

    #[serde(default)]
    pub display_name: String,

    #[serde(default)]
    pub description: String,

    /// Opaque reference to the rendering/validation logic (renderer kind)
    #[serde(default)]
    pub handler_ref: String,

    /// Ordered capability tags
    #[serde(default)]
    pub supports: Vec<String>,

    /// Grouping only
    #[serde(default)]
    pub category: String,

    #[serde(default = "default_active")]
    pub is_active: bool,

    /// Additional attributes contributed by override records
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_active() -> bool {
    true
}

impl TypeDefinition {
    /// Create an active definition with no extra attributes
    pub fn new(
        id: impl Into<String>,
        display_name: impl Into<String>,
        handler_ref: impl Into<String>,
        category: impl Into<String>,
        supports: &[&str],
    ) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            description: String::new(),
            handler_ref: handler_ref.into(),
            supports: supports.iter().map(|s| s.to_string()).collect(),
            category: category.into(),
            is_active: true,
            extra: Map::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn supports(&self, capability: &str) -> bool {
        self.supports.iter().any(|s| s == capability)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_namespace_parsing() {
        assert_eq!("field".parse::<Namespace>().unwrap(), Namespace::Field);
        assert_eq!(
            "component-types".parse::<Namespace>().unwrap(),
            Namespace::Component
        );
        assert_eq!("sections".parse::<Namespace>().unwrap(), Namespace::Section);
        assert!("widgets".parse::<Namespace>().is_err());
    }

    #[test]
    fn test_hook_names() {
        assert_eq!(Namespace::Field.hook("created"), "field_created");
        assert_eq!(Namespace::Section.hook("types"), "section_types");
    }

    #[test]
    fn test_deserialization_keeps_unknown_attributes() {
        let def: TypeDefinition = serde_json::from_value(json!({
            "id": "text",
            "display_name": "Text",
            "supports": ["label", "placeholder"],
            "icon": "editor-text"
        }))
        .unwrap();

        assert!(def.is_active);
        assert!(def.supports("placeholder"));
        assert_eq!(def.extra["icon"], "editor-text");

        let back = serde_json::to_value(&def).unwrap();
        assert_eq!(back["icon"], "editor-text");
        assert_eq!(back["supports"][1], "placeholder");
    }
}
