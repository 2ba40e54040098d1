//! Built-in Type Catalogs
//!
//! Canonical definitions for the types that ship with Spider Boxes. They are
//! registered once at startup; administrators can override or extend them
//! through the override store without touching this list.
//!
//! ## Field types
//!
//! button, checkbox, media, radio, repeater, select, react-select, range,
//! switcher, text, datetime, textarea, wysiwyg
//!
//! ## Component types
//!
//! accordion, pane, tabs, tab, row, column
//!
//! ## Section types
//!
//! section, form

use crate::models::{Namespace, TypeDefinition};

/// Built-in definitions for one namespace, in registration order
pub fn get_core_types(namespace: Namespace) -> Vec<TypeDefinition> {
    match namespace {
        Namespace::Field => core_field_types(),
        Namespace::Component => core_component_types(),
        Namespace::Section => core_section_types(),
    }
}

/// Child kind created by `add_child` for a container component type
///
/// Returns `None` for types that cannot hold children.
pub fn container_child_kind(container_type: &str) -> Option<&'static str> {
    match container_type {
        "tabs" => Some("tab"),
        "accordion" => Some("pane"),
        "row" => Some("column"),
        _ => None,
    }
}

fn core_field_types() -> Vec<TypeDefinition> {
    vec![
        TypeDefinition::new("button", "Button", "button", "basic", &["label", "description"])
            .with_description("Clickable action button"),
        TypeDefinition::new(
            "checkbox",
            "Checkbox",
            "checkbox",
            "choice",
            &["label", "description", "options", "multiple", "value"],
        )
        .with_description("Single checkbox or checkbox group"),
        TypeDefinition::new(
            "media",
            "Media",
            "media",
            "content",
            &["label", "description", "media_type", "multiple"],
        )
        .with_description("Media library picker"),
        TypeDefinition::new(
            "radio",
            "Radio",
            "radio",
            "choice",
            &["label", "description", "options", "value"],
        )
        .with_description("Radio button group"),
        TypeDefinition::new(
            "repeater",
            "Repeater",
            "repeater",
            "layout",
            &["label", "description", "repeater"],
        )
        .with_description("Repeatable rows of sub fields"),
        TypeDefinition::new(
            "select",
            "Select",
            "select",
            "choice",
            &["label", "description", "options", "multiple", "value", "placeholder"],
        )
        .with_description("Dropdown select"),
        TypeDefinition::new(
            "react-select",
            "Advanced Select",
            "select",
            "choice",
            &[
                "label",
                "description",
                "options",
                "multiple",
                "placeholder",
                "ajax_action",
            ],
        )
        .with_description("Searchable select with remote options"),
        TypeDefinition::new(
            "range",
            "Range",
            "range",
            "advanced",
            &["label", "description", "min", "max", "step", "value"],
        )
        .with_description("Numeric slider"),
        TypeDefinition::new(
            "switcher",
            "Switcher",
            "switcher",
            "basic",
            &["label", "description", "value"],
        )
        .with_description("On/off toggle"),
        TypeDefinition::new(
            "text",
            "Text",
            "text",
            "basic",
            &[
                "label",
                "description",
                "placeholder",
                "value",
                "validation",
                "autocomplete",
            ],
        )
        .with_description("Single line text input"),
        TypeDefinition::new(
            "datetime",
            "Date & Time",
            "datetime",
            "advanced",
            &["label", "description", "format", "min", "max", "value"],
        )
        .with_description("Date and time picker"),
        TypeDefinition::new(
            "textarea",
            "Textarea",
            "textarea",
            "basic",
            &["label", "description", "placeholder", "rows", "value"],
        )
        .with_description("Multi line text input"),
        TypeDefinition::new(
            "wysiwyg",
            "WYSIWYG Editor",
            "wysiwyg",
            "content",
            &["label", "description", "rows", "settings"],
        )
        .with_description("Rich text editor"),
    ]
}

fn core_component_types() -> Vec<TypeDefinition> {
    vec![
        TypeDefinition::new(
            "accordion",
            "Accordion",
            "accordion",
            "layout",
            &["label", "description", "multiple", "settings"],
        )
        .with_description("Collapsible panes"),
        TypeDefinition::new("pane", "Pane", "pane", "layout", &["label", "description"])
            .with_description("Single accordion pane"),
        TypeDefinition::new(
            "tabs",
            "Tabs",
            "tabs",
            "layout",
            &["label", "description", "settings"],
        )
        .with_description("Tabbed container"),
        TypeDefinition::new("tab", "Tab", "tab", "layout", &["label", "description"])
            .with_description("Single tab"),
        TypeDefinition::new(
            "row",
            "Row",
            "row",
            "layout",
            &["label", "description", "settings"],
        )
        .with_description("Horizontal row of columns"),
        TypeDefinition::new("column", "Column", "column", "layout", &["label", "description"])
            .with_description("Single column"),
    ]
}

fn core_section_types() -> Vec<TypeDefinition> {
    vec![
        TypeDefinition::new(
            "section",
            "Section",
            "section",
            "layout",
            &["label", "description", "settings"],
        )
        .with_description("Group of components and fields"),
        TypeDefinition::new(
            "form",
            "Form",
            "form",
            "form",
            &["label", "description", "ajax_action", "settings"],
        )
        .with_description("Submittable form section"),
    ]
}
