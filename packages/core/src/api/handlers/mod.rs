//! RPC Request Handlers
//!
//! One module per resource. Every handler takes the shared `SpiderBoxes`
//! and the raw `params` value and returns a JSON result or an `RpcError`.

pub mod config;
pub mod instances;
pub mod types;
pub mod values;

use crate::api::types::RpcError;
use crate::models::Namespace;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Decode handler params, reporting failures as `INVALID_PARAMS`
pub(crate) fn parse_params<T: DeserializeOwned>(params: Value) -> Result<T, RpcError> {
    // Methods without required params may be called with no params at all
    let params = if params.is_null() {
        Value::Object(Default::default())
    } else {
        params
    };
    serde_json::from_value(params)
        .map_err(|e| RpcError::invalid_params(format!("Invalid parameters: {}", e)))
}

/// Accepts `field`, `fields` and `field-types` style namespace names
pub(crate) fn deserialize_namespace<'de, D>(deserializer: D) -> Result<Namespace, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    raw.parse().map_err(serde::de::Error::custom)
}

pub(crate) fn to_json<T: serde::Serialize>(value: &T) -> Result<Value, RpcError> {
    serde_json::to_value(value)
        .map_err(|e| RpcError::internal_error(format!("Failed to serialize result: {}", e)))
}
