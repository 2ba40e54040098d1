//! Sanitize pass: coerce, clamp and filter a raw value into a safe typed value
//!
//! Sanitizing never fails. Values that cannot be coerced fall back to the
//! kind's empty value, so the validate pass can report them as missing.

use super::config::FieldConfig;
use super::kind::FieldKind;
use serde_json::{Map, Value};

/// Sanitize `raw` for `config`
pub fn sanitize(config: &FieldConfig, raw: &Value) -> Value {
    match &config.kind {
        FieldKind::Text | FieldKind::Datetime => Value::String(to_text(raw).trim().to_string()),
        FieldKind::Textarea => Value::String(to_text(raw).replace("\r\n", "\n")),
        FieldKind::Number => coerce_number(raw)
            .map(|n| number_value(clamp(n, config.min, config.max)))
            .unwrap_or(Value::Null),
        FieldKind::Range => {
            let fallback = coerce_number(&config.default_value)
                .or(config.min)
                .unwrap_or(0.0);
            number_value(snap_to_step(config, coerce_number(raw).unwrap_or(fallback)))
        }
        FieldKind::Select | FieldKind::Checkbox | FieldKind::Radio => sanitize_choice(config, raw),
        FieldKind::Switcher => Value::Bool(coerce_bool(raw).unwrap_or(false)),
        FieldKind::Media => {
            let ids = scalar_list(raw);
            if config.multiple {
                Value::Array(ids.into_iter().map(Value::String).collect())
            } else {
                Value::String(ids.into_iter().next().unwrap_or_default())
            }
        }
        FieldKind::Tags => {
            let tags = match raw {
                Value::String(s) => s.split(',').map(str::to_string).collect(),
                other => scalar_list(other),
            };
            Value::Array(dedup(tags).into_iter().map(Value::String).collect())
        }
        FieldKind::Repeater => sanitize_rows(config, raw),
        FieldKind::Button => Value::Null,
        FieldKind::Unsupported(_) => raw.clone(),
    }
}

/// Clamp into `[min, max]`, then round to the nearest multiple of `step`
/// counted from `min`
pub fn snap_to_step(config: &FieldConfig, value: f64) -> f64 {
    let mut snapped = clamp(value, config.min, config.max);
    if let Some(step) = config.step.filter(|s| *s > 0.0) {
        let origin = config.min.unwrap_or(0.0);
        snapped = origin + ((snapped - origin) / step).round() * step;
        snapped = clamp(snapped, config.min, config.max);
    }
    // trims float noise such as 0.30000000000000004
    (snapped * 1e9).round() / 1e9
}

fn clamp(value: f64, min: Option<f64>, max: Option<f64>) -> f64 {
    let value = match min {
        Some(min) if value < min => min,
        _ => value,
    };
    match max {
        Some(max) if value > max => max,
        _ => value,
    }
}

fn sanitize_choice(config: &FieldConfig, raw: &Value) -> Value {
    if config.kind == FieldKind::Checkbox && config.options.is_empty() {
        return Value::Bool(coerce_bool(raw).unwrap_or(false));
    }

    // Without options nothing is selectable
    let picked: Vec<String> = scalar_list(raw)
        .into_iter()
        .filter(|value| config.has_option(value))
        .collect();

    if config.multiple && config.kind != FieldKind::Radio {
        Value::Array(dedup(picked).into_iter().map(Value::String).collect())
    } else {
        Value::String(picked.into_iter().next().unwrap_or_default())
    }
}

fn sanitize_rows(config: &FieldConfig, raw: &Value) -> Value {
    let Value::Array(rows) = raw else {
        return Value::Array(Vec::new());
    };

    let rows = rows
        .iter()
        .filter_map(Value::as_object)
        .map(|row| {
            if config.fields.is_empty() {
                return Value::Object(row.clone());
            }
            let mut clean = Map::new();
            for sub in &config.fields {
                let value = row.get(&sub.id).unwrap_or(&Value::Null);
                clean.insert(sub.id.clone(), sanitize(sub, value));
            }
            Value::Object(clean)
        })
        .collect();
    Value::Array(rows)
}

/// Trimmed, non-empty string forms of a scalar or a list of scalars
///
/// Objects inside a list contribute their `id` (media pickers send
/// `{id, url, ...}` objects).
fn scalar_list(raw: &Value) -> Vec<String> {
    let items: Vec<&Value> = match raw {
        Value::Array(items) => items.iter().collect(),
        other => vec![other],
    };
    items
        .into_iter()
        .filter_map(|item| match item {
            Value::Object(obj) => obj.get("id").and_then(scalar_string),
            other => scalar_string(other),
        })
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn dedup(values: Vec<String>) -> Vec<String> {
    let mut unique: Vec<String> = Vec::with_capacity(values.len());
    for value in values {
        let value = value.trim().to_string();
        if !value.is_empty() && !unique.contains(&value) {
            unique.push(value);
        }
    }
    unique
}

pub(crate) fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn to_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
        other => scalar_string(other).unwrap_or_default(),
    }
}

/// Loose boolean reading: `true`, `1`, `"1"`, `"true"`, `"on"`, `"yes"`
pub fn coerce_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_f64().map(|n| n != 0.0),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "on" | "yes" => Some(true),
            "0" | "false" | "off" | "no" | "" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Numbers and numeric strings
pub fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}

/// Whole numbers serialize as integers
pub(crate) fn number_value(value: f64) -> Value {
    if value.fract() == 0.0 && value.abs() < 9_007_199_254_740_992.0 {
        Value::from(value as i64)
    } else {
        serde_json::Number::from_f64(value)
            .map(Value::Number)
            .unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::options_from;
    use serde_json::json;

    fn range() -> FieldConfig {
        FieldConfig::new("volume", "range", "Volume").with_bounds(Some(0.0), Some(10.0), Some(5.0))
    }

    fn sizes() -> FieldConfig {
        FieldConfig::new("size", "select", "Size")
            .with_options(options_from(&[("s", "Small"), ("m", "Medium"), ("l", "Large")]))
    }

    #[test]
    fn test_range_clamps_to_bounds() {
        assert_eq!(sanitize(&range(), &json!(15)), json!(10));
        assert_eq!(sanitize(&range(), &json!(-5)), json!(0));
    }

    #[test]
    fn test_range_rounds_to_step() {
        assert_eq!(sanitize(&range(), &json!(7)), json!(5));
        assert_eq!(sanitize(&range(), &json!("8")), json!(10));
        assert_eq!(sanitize(&range(), &json!("loud")), json!(0));

        let fine = FieldConfig::new("ratio", "slider", "Ratio").with_bounds(Some(0.0), Some(1.0), Some(0.1));
        assert_eq!(sanitize(&fine, &json!(0.33)), json!(0.3));
    }

    #[test]
    fn test_range_step_counts_from_min() {
        let config = FieldConfig::new("year", "range", "Year").with_bounds(Some(3.0), Some(20.0), Some(5.0));
        assert_eq!(sanitize(&config, &json!(9)), json!(8));
    }

    #[test]
    fn test_number_clamps_and_drops_garbage() {
        let config = FieldConfig::new("rows", "number", "Rows").with_bounds(Some(1.0), Some(50.0), None);
        assert_eq!(sanitize(&config, &json!("80")), json!(50));
        assert_eq!(sanitize(&config, &json!(2.5)), json!(2.5));
        assert_eq!(sanitize(&config, &json!("many")), Value::Null);
    }

    #[test]
    fn test_choice_without_options_keeps_nothing() {
        let bare = FieldConfig::new("size", "select", "Size");
        assert_eq!(sanitize(&bare, &json!("xl")), json!(""));

        let plan = FieldConfig::new("plan", "radio", "Plan").multiple();
        assert_eq!(sanitize(&plan, &json!(["pro"])), json!(""));
    }

    #[test]
    fn test_select_drops_unknown_options() {
        assert_eq!(sanitize(&sizes(), &json!("m")), json!("m"));
        assert_eq!(sanitize(&sizes(), &json!("xl")), json!(""));

        let multi = sizes().multiple();
        assert_eq!(sanitize(&multi, &json!(["l", "xl", "s", "l"])), json!(["l", "s"]));
        assert_eq!(sanitize(&multi, &json!("s")), json!(["s"]));
    }

    #[test]
    fn test_checkbox_without_options_is_boolean() {
        let agree = FieldConfig::new("agree", "checkbox", "Agree");
        assert_eq!(sanitize(&agree, &json!("on")), json!(true));
        assert_eq!(sanitize(&agree, &json!(0)), json!(false));
        assert_eq!(sanitize(&agree, &Value::Null), json!(false));
    }

    #[test]
    fn test_media_and_tags() {
        let gallery = FieldConfig::new("gallery", "media", "Gallery").multiple();
        assert_eq!(
            sanitize(&gallery, &json!([12, "", {"id": 14, "url": "x"}])),
            json!(["12", "14"])
        );

        let cover = FieldConfig::new("cover", "media", "Cover");
        assert_eq!(sanitize(&cover, &json!([7, 8])), json!("7"));

        let tags = FieldConfig::new("tags", "tags", "Tags");
        assert_eq!(sanitize(&tags, &json!("red, blue,,red")), json!(["red", "blue"]));
    }

    #[test]
    fn test_repeater_rows_follow_sub_schema() {
        let links = FieldConfig::new("links", "repeater", "Links").with_fields(vec![
            FieldConfig::new("label", "text", "Label"),
            FieldConfig::new("new_tab", "switcher", "New tab"),
        ]);
        let clean = sanitize(
            &links,
            &json!([
                {"label": "  Docs ", "new_tab": "1", "extra": true},
                "not a row",
                {}
            ]),
        );
        assert_eq!(
            clean,
            json!([
                {"label": "Docs", "new_tab": true},
                {"label": "", "new_tab": false}
            ])
        );
        assert_eq!(sanitize(&links, &json!("nope")), json!([]));
    }

    #[test]
    fn test_unsupported_passes_through() {
        let config = FieldConfig::new("map", "map", "Map");
        assert_eq!(sanitize(&config, &json!({"lat": 1})), json!({"lat": 1}));
    }
}
