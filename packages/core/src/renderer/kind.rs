//! Renderer kinds and their string aliases

use serde::{Deserialize, Serialize};
use std::fmt;

/// Control variant a field renders as
///
/// Parsing never fails: unknown kind strings become `Unsupported`, which
/// renders a visible placeholder instead of a control.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldKind {
    #[default]
    Text,
    Textarea,
    Number,
    Select,
    Checkbox,
    Radio,
    Range,
    Switcher,
    Media,
    Datetime,
    Repeater,
    Tags,
    Button,
    Unsupported(String),
}

impl FieldKind {
    pub fn parse(kind: &str) -> Self {
        match kind.trim().to_ascii_lowercase().as_str() {
            "text" | "color" | "email" | "url" => FieldKind::Text,
            "textarea" | "wysiwyg" => FieldKind::Textarea,
            "number" => FieldKind::Number,
            "select" | "react-select" => FieldKind::Select,
            "checkbox" => FieldKind::Checkbox,
            "radio" => FieldKind::Radio,
            "range" | "slider" => FieldKind::Range,
            "switcher" | "toggle" => FieldKind::Switcher,
            "media" => FieldKind::Media,
            "datetime" | "date" | "time" => FieldKind::Datetime,
            "repeater" => FieldKind::Repeater,
            "tags" => FieldKind::Tags,
            "button" => FieldKind::Button,
            _ => FieldKind::Unsupported(kind.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Textarea => "textarea",
            FieldKind::Number => "number",
            FieldKind::Select => "select",
            FieldKind::Checkbox => "checkbox",
            FieldKind::Radio => "radio",
            FieldKind::Range => "range",
            FieldKind::Switcher => "switcher",
            FieldKind::Media => "media",
            FieldKind::Datetime => "datetime",
            FieldKind::Repeater => "repeater",
            FieldKind::Tags => "tags",
            FieldKind::Button => "button",
            FieldKind::Unsupported(kind) => kind,
        }
    }

    /// Kinds whose value is drawn from an option list
    pub fn is_choice(&self) -> bool {
        matches!(self, FieldKind::Select | FieldKind::Checkbox | FieldKind::Radio)
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, FieldKind::Number | FieldKind::Range)
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, FieldKind::Unsupported(_))
    }
}

impl From<&str> for FieldKind {
    fn from(kind: &str) -> Self {
        FieldKind::parse(kind)
    }
}

impl From<String> for FieldKind {
    fn from(kind: String) -> Self {
        FieldKind::parse(&kind)
    }
}

impl From<FieldKind> for String {
    fn from(kind: FieldKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
