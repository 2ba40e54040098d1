//! Validate pass: check a value against a field's constraints
//!
//! Validation is field-local and never panics. The required check runs
//! first and stops every other rule; an empty optional value is valid.

use super::config::FieldConfig;
use super::is_empty_value;
use super::kind::FieldKind;
use super::render::row_path;
use super::sanitize::{coerce_bool, coerce_number, scalar_string};
use crate::models::FieldError;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;
use serde_json::Value;

/// Validate `value`, reporting the first failure
pub fn validate(config: &FieldConfig, value: &Value) -> Result<(), String> {
    match validate_field(config, value, &config.id).into_iter().next() {
        Some(error) => Err(error.message),
        None => Ok(()),
    }
}

/// Every failure of `value`, keyed by path
///
/// Repeater rows report their sub fields under `{path}[{index}][{sub_id}]`.
pub fn validate_field(config: &FieldConfig, value: &Value, path: &str) -> Vec<FieldError> {
    let mut errors = Vec::new();
    check(config, value, path, &mut errors);
    errors
}

fn check(config: &FieldConfig, value: &Value, path: &str, errors: &mut Vec<FieldError>) {
    let title = if config.title.is_empty() {
        config.id.as_str()
    } else {
        config.title.as_str()
    };
    let mut fail = |message: String| errors.push(FieldError::new(path, message));

    if is_missing(config, value) {
        if config.required {
            fail(format!("{} is required", title));
        }
        return;
    }

    match &config.kind {
        FieldKind::Text | FieldKind::Textarea => {
            if let (Some(pattern), Some(text)) = (&config.pattern, scalar_string(value)) {
                match Regex::new(&format!("^(?:{})$", pattern)) {
                    Ok(re) if !re.is_match(&text) => fail(
                        config
                            .pattern_message
                            .clone()
                            .unwrap_or_else(|| format!("{} has an invalid format", title)),
                    ),
                    Ok(_) => {}
                    Err(e) => {
                        tracing::warn!(field = %config.id, error = %e, "ignoring invalid validation pattern")
                    }
                }
            }
        }
        FieldKind::Number | FieldKind::Range => match coerce_number(value) {
            None => fail(format!("{} must be a number", title)),
            Some(n) => {
                if let Some(message) = bounds_message(title, n, config.min, config.max) {
                    fail(message);
                }
            }
        },
        FieldKind::Checkbox if config.options.is_empty() => {
            if coerce_bool(value).is_none() {
                fail(format!("{} must be checked or unchecked", title));
            }
        }
        FieldKind::Select | FieldKind::Checkbox | FieldKind::Radio => {
            if config.multiple && config.kind != FieldKind::Radio {
                let Value::Array(items) = value else {
                    fail(format!("{} must be a list of options", title));
                    return;
                };
                if let Some(bad) = items.iter().find(|item| !option_allowed(config, item)) {
                    fail(format!("{} contains an invalid option: {}", title, shown(bad)));
                } else if let Some(limit) = config.max_selections {
                    if items.len() > limit {
                        fail(format!("{} allows at most {} selections", title, limit));
                    }
                }
            } else if value.is_array() {
                fail(format!("{} accepts a single option", title));
            } else if !option_allowed(config, value) {
                fail(format!("{} has an invalid option: {}", title, shown(value)));
            }
        }
        FieldKind::Switcher => {
            if coerce_bool(value).is_none() {
                fail(format!("{} must be on or off", title));
            }
        }
        FieldKind::Media => {
            let ok = match value {
                Value::Array(ids) => config.multiple && ids.iter().all(is_media_id),
                other => is_media_id(other),
            };
            if !ok {
                fail(if config.multiple {
                    format!("{} must be a list of media ids", title)
                } else {
                    format!("{} must be a single media id", title)
                });
            }
        }
        FieldKind::Datetime => {
            let text = scalar_string(value).unwrap_or_default();
            if !is_valid_datetime(text.trim(), config.format.as_deref()) {
                fail(match &config.format {
                    Some(format) => format!("{} must be a date matching {}", title, format),
                    None => format!("{} must be a valid date", title),
                });
            }
        }
        FieldKind::Tags => {
            let ok = matches!(value, Value::Array(tags) if tags.iter().all(Value::is_string));
            if !ok {
                fail(format!("{} must be a list of tags", title));
            }
        }
        FieldKind::Repeater => {
            let Value::Array(rows) = value else {
                fail(format!("{} must be a list of rows", title));
                return;
            };
            if let Some(min) = config.min_rows.filter(|min| rows.len() < *min) {
                fail(format!("{} needs at least {} rows", title, min));
            }
            if let Some(max) = config.max_rows.filter(|max| rows.len() > *max) {
                fail(format!("{} allows at most {} rows", title, max));
            }
            for (index, row) in rows.iter().enumerate() {
                let Some(row) = row.as_object() else {
                    errors.push(FieldError::new(
                        format!("{}[{}]", path, index),
                        format!("{} row {} is not an object", title, index + 1),
                    ));
                    continue;
                };
                for sub in &config.fields {
                    let sub_value = row.get(&sub.id).unwrap_or(&Value::Null);
                    check(sub, sub_value, &row_path(path, index, &sub.id), errors);
                }
            }
        }
        FieldKind::Button | FieldKind::Unsupported(_) => {}
    }
}

/// Empty values, plus an unchecked single checkbox
fn is_missing(config: &FieldConfig, value: &Value) -> bool {
    if is_empty_value(value) {
        return true;
    }
    config.kind == FieldKind::Checkbox
        && config.options.is_empty()
        && config.required
        && coerce_bool(value) == Some(false)
}

fn option_allowed(config: &FieldConfig, value: &Value) -> bool {
    match scalar_string(value) {
        Some(value) => config.has_option(&value),
        None => false,
    }
}

fn is_media_id(value: &Value) -> bool {
    match value {
        Value::String(s) => !s.trim().is_empty(),
        Value::Number(_) => true,
        _ => false,
    }
}

fn shown(value: &Value) -> String {
    scalar_string(value).unwrap_or_else(|| value.to_string())
}

fn bounds_message(title: &str, n: f64, min: Option<f64>, max: Option<f64>) -> Option<String> {
    let below = min.is_some_and(|min| n < min);
    let above = max.is_some_and(|max| n > max);
    if !below && !above {
        return None;
    }
    Some(match (min, max) {
        (Some(min), Some(max)) => format!(
            "{} must be between {} and {}",
            title,
            format_number(min),
            format_number(max)
        ),
        (Some(min), None) => format!("{} must be at least {}", title, format_number(min)),
        (None, Some(max)) => format!("{} must be at most {}", title, format_number(max)),
        (None, None) => return None,
    })
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// Translate a `Y-m-d H:i` style format into chrono notation
fn chrono_format(format: &str) -> String {
    let mut out = String::with_capacity(format.len() * 2);
    for c in format.chars() {
        match c {
            'Y' => out.push_str("%Y"),
            'y' => out.push_str("%y"),
            'm' => out.push_str("%m"),
            'd' => out.push_str("%d"),
            'H' => out.push_str("%H"),
            'i' => out.push_str("%M"),
            's' => out.push_str("%S"),
            '%' => out.push_str("%%"),
            other => out.push(other),
        }
    }
    out
}

fn is_valid_datetime(value: &str, format: Option<&str>) -> bool {
    match format {
        Some(format) => {
            let pattern = chrono_format(format);
            let has_date = ["%Y", "%y", "%m", "%d"].iter().any(|p| pattern.contains(p));
            let has_time = ["%H", "%M"].iter().any(|p| pattern.contains(p));
            match (has_date, has_time) {
                (true, true) => NaiveDateTime::parse_from_str(value, &pattern).is_ok(),
                (false, true) => NaiveTime::parse_from_str(value, &pattern).is_ok(),
                _ => NaiveDate::parse_from_str(value, &pattern).is_ok(),
            }
        }
        None => {
            DateTime::parse_from_rfc3339(value).is_ok()
                || NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M").is_ok()
                || NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M").is_ok()
                || NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S").is_ok()
                || NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
                || NaiveTime::parse_from_str(value, "%H:%M").is_ok()
        }
    }
}

#[cfg(test)]
#[path = "validate_test.rs"]
mod validate_test;
