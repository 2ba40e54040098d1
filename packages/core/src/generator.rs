//! Capability-to-Schema Generator
//!
//! Turns a type definition's `supports` list into the ordered list of
//! configuration descriptors used to edit instances of that type.
//!
//! The output is always:
//!
//! 1. the base set (`label`, `description`, `required`, `context`,
//!    `meta_field`), regardless of `supports`
//! 2. then, for each capability tag in `supports` order, the descriptors of
//!    that capability's generator
//!
//! Tags without a generator (including `label` and `description`, which the
//! base set already covers) contribute nothing. Each descriptor's
//! `current_value` is `existing[descriptor.id]` when present, otherwise a
//! static default.
//!
//! Descriptor ids are not de-duplicated across capabilities. Listing a tag
//! twice, or two capabilities emitting the same id, yields repeated ids; a
//! caller flattening the list into a map keeps the last one.
//!
//! Generation is pure: no hooks, no globals, same input same output.

use crate::models::{options_from, Conditional, Constraints, FieldDescriptor, OptionItem, TypeDefinition};
use serde_json::{json, Map, Value};

/// Context tags offered by the base `context` descriptor
pub const CONTEXT_OPTIONS: [(&str, &str); 11] = [
    ("default", "Default"),
    ("review", "Review"),
    ("product", "Product"),
    ("post", "Post"),
    ("page", "Page"),
    ("user", "User"),
    ("comment", "Comment"),
    ("term", "Term"),
    ("settings", "Settings"),
    ("checkout", "Checkout"),
    ("registration", "Registration"),
];

/// Kinds offered for repeater sub fields
pub const SUB_FIELD_KINDS: [(&str, &str); 11] = [
    ("text", "Text"),
    ("textarea", "Textarea"),
    ("number", "Number"),
    ("select", "Select"),
    ("checkbox", "Checkbox"),
    ("radio", "Radio"),
    ("range", "Range"),
    ("switcher", "Switcher"),
    ("media", "Media"),
    ("datetime", "Date & Time"),
    ("tags", "Tags"),
];

/// Ids of the base descriptors, in output order
pub const BASE_FIELD_IDS: [&str; 5] = ["label", "description", "required", "context", "meta_field"];

/// Capabilities with a descriptor generator
///
/// This is the complete table; `Capability::from_tag` is the only lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Placeholder,
    Options,
    Multiple,
    Value,
    Min,
    Max,
    Step,
    Rows,
    Format,
    MediaType,
    Validation,
    AjaxAction,
    Settings,
    Autocomplete,
    Conditional,
    Repeater,
    Color,
    Relationship,
}

impl Capability {
    pub const ALL: [Capability; 18] = [
        Capability::Placeholder,
        Capability::Options,
        Capability::Multiple,
        Capability::Value,
        Capability::Min,
        Capability::Max,
        Capability::Step,
        Capability::Rows,
        Capability::Format,
        Capability::MediaType,
        Capability::Validation,
        Capability::AjaxAction,
        Capability::Settings,
        Capability::Autocomplete,
        Capability::Conditional,
        Capability::Repeater,
        Capability::Color,
        Capability::Relationship,
    ];

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.tag() == tag)
    }

    pub fn tag(&self) -> &'static str {
        match self {
            Capability::Placeholder => "placeholder",
            Capability::Options => "options",
            Capability::Multiple => "multiple",
            Capability::Value => "value",
            Capability::Min => "min",
            Capability::Max => "max",
            Capability::Step => "step",
            Capability::Rows => "rows",
            Capability::Format => "format",
            Capability::MediaType => "media_type",
            Capability::Validation => "validation",
            Capability::AjaxAction => "ajax_action",
            Capability::Settings => "settings",
            Capability::Autocomplete => "autocomplete",
            Capability::Conditional => "conditional",
            Capability::Repeater => "repeater",
            Capability::Color => "color",
            Capability::Relationship => "relationship",
        }
    }

    /// Descriptors contributed by this capability
    pub fn descriptors(&self, existing: &Map<String, Value>) -> Vec<FieldDescriptor> {
        let d = Builder { existing };
        match self {
            Capability::Placeholder => vec![d.text(
                "placeholder",
                "Placeholder",
                "Hint shown while the field is empty",
                "",
            )],
            Capability::Options => vec![
                d.textarea(
                    "options",
                    "Options",
                    "One option per line as value : label",
                    "",
                    5,
                ),
                d.select(
                    "options_source",
                    "Options Source",
                    "Where the options come from",
                    "static",
                    &[("static", "Static list"), ("ajax", "AJAX"), ("callback", "Callback")],
                ),
            ],
            Capability::Multiple => vec![
                d.checkbox("multiple", "Allow Multiple", "Allow selecting more than one value", false),
                d.number(
                    "max_selections",
                    "Maximum Selections",
                    "0 means unlimited",
                    0,
                    Some(0.0),
                    None,
                )
                .when("multiple", json!(true)),
            ],
            Capability::Value => vec![d.text(
                "default_value",
                "Default Value",
                "Value used when nothing has been saved",
                "",
            )],
            Capability::Min => vec![d.number("min", "Minimum", "Smallest allowed value", 0, None, None)],
            Capability::Max => vec![d.number("max", "Maximum", "Largest allowed value", 100, None, None)],
            Capability::Step => vec![d.number("step", "Step", "Increment between values", 1, Some(0.0), None)],
            Capability::Rows => vec![d.number(
                "rows",
                "Rows",
                "Visible text rows",
                4,
                Some(1.0),
                Some(50.0),
            )],
            Capability::Format => vec![d.select(
                "format",
                "Format",
                "Display and storage format",
                "Y-m-d",
                &[
                    ("Y-m-d", "2024-01-31"),
                    ("m/d/Y", "01/31/2024"),
                    ("d/m/Y", "31/01/2024"),
                    ("Y-m-d H:i", "2024-01-31 13:45"),
                    ("H:i", "13:45"),
                ],
            )],
            Capability::MediaType => vec![
                d.select(
                    "media_type",
                    "Media Type",
                    "Restrict the media library to one kind of file",
                    "image",
                    &[
                        ("image", "Image"),
                        ("video", "Video"),
                        ("audio", "Audio"),
                        ("document", "Document"),
                        ("any", "Any"),
                    ],
                ),
                d.text("button_text", "Button Text", "Label of the picker button", "Select Media"),
            ],
            Capability::Validation => vec![
                d.text(
                    "validation_pattern",
                    "Validation Pattern",
                    "Regular expression the value must match",
                    "",
                ),
                d.text(
                    "validation_message",
                    "Validation Message",
                    "Message shown when the pattern does not match",
                    "",
                ),
            ],
            Capability::AjaxAction => vec![
                d.text("ajax_action", "AJAX Action", "Action name used to load data", ""),
                d.select(
                    "ajax_method",
                    "AJAX Method",
                    "HTTP method for the request",
                    "POST",
                    &[("GET", "GET"), ("POST", "POST")],
                ),
            ],
            Capability::Settings => vec![d.textarea(
                "settings",
                "Settings",
                "Additional settings as a JSON object",
                "{}",
                6,
            )],
            Capability::Autocomplete => vec![d.select(
                "autocomplete",
                "Autocomplete",
                "Browser autocomplete hint",
                "off",
                &[
                    ("off", "Off"),
                    ("on", "On"),
                    ("email", "Email"),
                    ("name", "Name"),
                    ("tel", "Telephone"),
                    ("url", "URL"),
                ],
            )],
            Capability::Conditional => vec![
                d.text(
                    "conditional_field",
                    "Conditional Field",
                    "Show this field only when another field matches",
                    "",
                ),
                d.select(
                    "conditional_operator",
                    "Conditional Operator",
                    "How the other field is compared",
                    "equals",
                    &[
                        ("equals", "Equals"),
                        ("not_equals", "Does not equal"),
                        ("contains", "Contains"),
                        ("empty", "Is empty"),
                        ("not_empty", "Is not empty"),
                    ],
                ),
                d.text("conditional_value", "Conditional Value", "Value to compare against", ""),
            ],
            Capability::Repeater => vec![
                d.repeater("sub_fields", "Sub Fields", "Fields repeated in every row"),
                d.number("min_rows", "Minimum Rows", "0 means no minimum", 0, Some(0.0), None),
                d.number("max_rows", "Maximum Rows", "0 means unlimited", 0, Some(0.0), None),
            ],
            Capability::Color => vec![
                d.text("default_color", "Default Color", "Initial color", "#000000"),
                d.select(
                    "color_format",
                    "Color Format",
                    "Stored color notation",
                    "hex",
                    &[("hex", "HEX"), ("rgb", "RGB"), ("rgba", "RGBA")],
                ),
            ],
            Capability::Relationship => vec![
                d.text("post_type", "Post Type", "Post type to relate to", "post"),
                d.number("max_items", "Maximum Items", "0 means unlimited", 0, Some(0.0), None),
            ],
        }
    }
}

/// Generate the configuration schema for `definition`
///
/// Never fails; unknown capability tags are skipped.
pub fn generate_config_fields(
    definition: &TypeDefinition,
    existing: &Map<String, Value>,
) -> Vec<FieldDescriptor> {
    let mut fields = base_fields(existing);
    for tag in &definition.supports {
        if let Some(capability) = Capability::from_tag(tag) {
            fields.extend(capability.descriptors(existing));
        }
    }
    fields
}

/// The fixed base descriptor set
pub fn base_fields(existing: &Map<String, Value>) -> Vec<FieldDescriptor> {
    let d = Builder { existing };
    vec![
        d.text("label", "Label", "Text shown next to the field", "").required(),
        d.textarea("description", "Description", "Help text shown below the field", "", 3),
        d.checkbox("required", "Required", "The field must have a value", false),
        d.select(
            "context",
            "Context",
            "Where the field is used",
            "default",
            &CONTEXT_OPTIONS,
        ),
        d.checkbox("meta_field", "Meta Field", "Store the value as object meta", true),
    ]
}

/// Resolves current values against the existing settings
struct Builder<'a> {
    existing: &'a Map<String, Value>,
}

impl Builder<'_> {
    fn make(
        &self,
        id: &str,
        kind: &str,
        title: &str,
        description: &str,
        default: Value,
    ) -> FieldDescriptor {
        FieldDescriptor {
            id: id.to_string(),
            kind: kind.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            current_value: self.existing.get(id).cloned().unwrap_or(default),
            constraints: Constraints::default(),
        }
    }

    fn text(&self, id: &str, title: &str, description: &str, default: &str) -> FieldDescriptor {
        self.make(id, "text", title, description, json!(default))
    }

    fn textarea(
        &self,
        id: &str,
        title: &str,
        description: &str,
        default: &str,
        rows: u32,
    ) -> FieldDescriptor {
        let mut field = self.make(id, "textarea", title, description, json!(default));
        field.constraints.rows = Some(rows);
        field
    }

    fn checkbox(&self, id: &str, title: &str, description: &str, default: bool) -> FieldDescriptor {
        self.make(id, "checkbox", title, description, json!(default))
    }

    fn number(
        &self,
        id: &str,
        title: &str,
        description: &str,
        default: i64,
        min: Option<f64>,
        max: Option<f64>,
    ) -> FieldDescriptor {
        let mut field = self.make(id, "number", title, description, json!(default));
        field.constraints.min = min;
        field.constraints.max = max;
        field
    }

    fn select(
        &self,
        id: &str,
        title: &str,
        description: &str,
        default: &str,
        options: &[(&str, &str)],
    ) -> FieldDescriptor {
        let mut field = self.make(id, "select", title, description, json!(default));
        field.constraints.options = options_from(options);
        field
    }

    /// Repeater whose rows describe sub fields: id, kind and title
    fn repeater(&self, id: &str, title: &str, description: &str) -> FieldDescriptor {
        let mut field = self.make(id, "repeater", title, description, json!([]));
        let empty = Map::new();
        let row = Builder { existing: &empty };
        field.constraints.fields = vec![
            row.text("id", "Field ID", "Key of the value inside each row", "").required(),
            row.select("type", "Field Type", "Control used for the sub field", "text", &SUB_FIELD_KINDS),
            row.text("title", "Title", "Label of the sub field", ""),
        ];
        field
    }
}

trait DescriptorExt {
    fn required(self) -> Self;
    fn when(self, field: &str, value: Value) -> Self;
}

impl DescriptorExt for FieldDescriptor {
    fn required(mut self) -> Self {
        self.constraints.required = true;
        self
    }

    fn when(mut self, field: &str, value: Value) -> Self {
        self.constraints.conditional = Some(Conditional {
            field: field.to_string(),
            value,
        });
        self
    }
}

/// Parse an `options` setting into ordered option items
///
/// Accepts the textarea form (`value : label` per line, bare lines use the
/// value as label), a JSON array of `{value, label}` objects or strings, or a
/// JSON object of value → label.
pub fn parse_options(raw: &Value) -> Vec<OptionItem> {
    match raw {
        Value::String(text) => text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| match line.split_once(':') {
                Some((value, label)) => OptionItem::new(value.trim(), label.trim()),
                None => OptionItem::new(line, line),
            })
            .collect(),
        Value::Array(items) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(OptionItem::new(s.as_str(), s.as_str())),
                Value::Object(obj) => {
                    let value = scalar_to_string(obj.get("value")?)?;
                    let label = obj
                        .get("label")
                        .and_then(scalar_to_string)
                        .unwrap_or_else(|| value.clone());
                    Some(OptionItem::new(value, label))
                }
                _ => None,
            })
            .collect(),
        Value::Object(map) => map
            .iter()
            .map(|(value, label)| {
                let label = scalar_to_string(label).unwrap_or_else(|| value.clone());
                OptionItem::new(value.as_str(), label)
            })
            .collect(),
        _ => Vec::new(),
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
#[path = "generator_test.rs"]
mod generator_test;
