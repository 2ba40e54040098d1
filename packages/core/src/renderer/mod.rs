//! Dynamic Field Renderer
//!
//! Interprets field configurations uniformly for every supported kind:
//!
//! - `kind` - `FieldKind` and its string aliases
//! - `config` - `FieldConfig`, built from descriptors or instance settings
//! - `sanitize` / `validate` - the two separate value passes
//! - `render` - serializable control model (`RenderedField`, `Control`)
//! - `editor` - `FormEditor`, holding values and errors and firing `on_change`
//! - `media` - lazy async media metadata (`MediaLoader`)

mod config;
mod editor;
mod kind;
mod media;
mod render;
mod sanitize;
mod validate;

pub use config::{Condition, ConditionOperator, FieldConfig};
pub use editor::{ChangeFn, FormEditor};
pub use kind::FieldKind;
pub use media::{MediaError, MediaInfo, MediaLoader, MediaLookup, MediaResolver, MediaSlot};
pub use render::{
    render_field, row_path, ChoiceOption, Control, MediaPreview, RenderContext, RenderedField,
    RepeaterRow,
};
pub use sanitize::{coerce_bool, coerce_number, sanitize, snap_to_step};
pub use validate::{validate, validate_field};

use serde_json::Value;

/// `null`, blank strings, empty arrays and empty objects
///
/// `false` and `0` are values, not emptiness.
pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_is_empty_value() {
        assert!(is_empty_value(&Value::Null));
        assert!(is_empty_value(&json!("  ")));
        assert!(is_empty_value(&json!([])));
        assert!(is_empty_value(&json!({})));
        assert!(!is_empty_value(&json!(false)));
        assert!(!is_empty_value(&json!(0)));
        assert!(!is_empty_value(&json!(["x"])));
    }
}
