//! Core Configuration
//!
//! Runtime settings for a Spider Boxes instance, with defaults suitable for
//! the stdio server and for tests. Environment variables override defaults:
//!
//! | variable | field |
//! |---|---|
//! | `SPIDER_BOXES_EVENT_CAPACITY` | `event_channel_capacity` |
//! | `SPIDER_BOXES_SEED_DEFAULTS` | `seed_defaults` |
//! | `SPIDER_BOXES_STRICT_SETTINGS` | `strict_settings` |
//! | `SPIDER_BOXES_LOG` | `log_filter` |

use crate::hooks::DEFAULT_EVENT_CHANNEL_CAPACITY;
use serde::{Deserialize, Serialize};

pub const ENV_EVENT_CAPACITY: &str = "SPIDER_BOXES_EVENT_CAPACITY";
pub const ENV_SEED_DEFAULTS: &str = "SPIDER_BOXES_SEED_DEFAULTS";
pub const ENV_STRICT_SETTINGS: &str = "SPIDER_BOXES_STRICT_SETTINGS";
pub const ENV_LOG: &str = "SPIDER_BOXES_LOG";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// Broadcast buffer of hook events (default: 128)
    pub event_channel_capacity: usize,
    /// Register the built-in type catalogs at startup (default: true)
    pub seed_defaults: bool,
    /// Reject instance settings the type's schema does not declare (default: false)
    pub strict_settings: bool,
    /// `tracing` filter used when `RUST_LOG` is unset (default: "info")
    pub log_filter: String,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            event_channel_capacity: DEFAULT_EVENT_CHANNEL_CAPACITY,
            seed_defaults: true,
            strict_settings: false,
            log_filter: "info".to_string(),
        }
    }
}

impl CoreConfig {
    /// Defaults overridden by the process environment
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden through `lookup`, then validated
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(ENV_EVENT_CAPACITY) {
            config.event_channel_capacity = raw
                .trim()
                .parse()
                .map_err(|_| format!("{} must be a positive integer, got {:?}", ENV_EVENT_CAPACITY, raw))?;
        }
        if let Some(raw) = lookup(ENV_SEED_DEFAULTS) {
            config.seed_defaults = parse_flag(ENV_SEED_DEFAULTS, &raw)?;
        }
        if let Some(raw) = lookup(ENV_STRICT_SETTINGS) {
            config.strict_settings = parse_flag(ENV_STRICT_SETTINGS, &raw)?;
        }
        if let Some(raw) = lookup(ENV_LOG) {
            config.log_filter = raw.trim().to_string();
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.event_channel_capacity == 0 {
            return Err("event_channel_capacity must be greater than 0".to_string());
        }
        if self.log_filter.trim().is_empty() {
            return Err("log_filter must not be empty".to_string());
        }
        Ok(())
    }
}

fn parse_flag(name: &str, raw: &str) -> Result<bool, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(format!("{} must be true or false, got {:?}", name, raw)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = CoreConfig::default();
        assert_eq!(config.event_channel_capacity, 128);
        assert!(config.seed_defaults);
        assert!(!config.strict_settings);
        assert_eq!(config.log_filter, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_environment_overrides() {
        let config = CoreConfig::from_lookup(lookup(&[
            (ENV_EVENT_CAPACITY, "16"),
            (ENV_SEED_DEFAULTS, "off"),
            (ENV_STRICT_SETTINGS, "TRUE"),
            (ENV_LOG, "spider_boxes_core=debug"),
        ]))
        .unwrap();

        assert_eq!(config.event_channel_capacity, 16);
        assert!(!config.seed_defaults);
        assert!(config.strict_settings);
        assert_eq!(config.log_filter, "spider_boxes_core=debug");
    }

    #[test]
    fn test_invalid_values_are_reported() {
        let err = CoreConfig::from_lookup(lookup(&[(ENV_EVENT_CAPACITY, "lots")])).unwrap_err();
        assert!(err.contains(ENV_EVENT_CAPACITY));

        let err = CoreConfig::from_lookup(lookup(&[(ENV_EVENT_CAPACITY, "0")])).unwrap_err();
        assert!(err.contains("greater than 0"));

        let err = CoreConfig::from_lookup(lookup(&[(ENV_STRICT_SETTINGS, "maybe")])).unwrap_err();
        assert!(err.contains(ENV_STRICT_SETTINGS));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: CoreConfig = serde_json::from_str(r#"{"strict_settings": true}"#).unwrap();
        assert!(config.strict_settings);
        assert_eq!(config.event_channel_capacity, 128);
    }
}
