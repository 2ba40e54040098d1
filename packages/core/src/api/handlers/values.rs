//! Field value handlers

use super::parse_params;
use crate::api::types::RpcError;
use crate::services::SpiderBoxes;
use crate::store::ValueKey;
use serde::Deserialize;
use serde_json::{json, Value};

fn default_context() -> String {
    "default".to_string()
}

/// Addresses one stored value
#[derive(Debug, Deserialize)]
pub struct ValueKeyParams {
    pub object_id: String,
    pub object_type: String,
    pub meta_key: String,
    #[serde(default = "default_context")]
    pub context: String,
}

impl ValueKeyParams {
    fn key(&self) -> ValueKey {
        ValueKey::new(
            &self.object_id,
            &self.object_type,
            &self.meta_key,
            &self.context,
        )
    }
}

#[derive(Debug, Deserialize)]
pub struct SetValueParams {
    #[serde(flatten)]
    pub key: ValueKeyParams,
    pub value: Value,
}

pub async fn handle_get_field_value(app: &SpiderBoxes, params: Value) -> Result<Value, RpcError> {
    let params: ValueKeyParams = parse_params(params)?;
    let value = app.values().get_value(&params.key()).await?;

    Ok(json!({
        "meta_key": params.meta_key,
        "found": value.is_some(),
        "value": value.unwrap_or(Value::Null),
    }))
}

pub async fn handle_set_field_value(app: &SpiderBoxes, params: Value) -> Result<Value, RpcError> {
    let params: SetValueParams = parse_params(params)?;
    let stored = app
        .values()
        .set_value(&params.key.key(), params.value)
        .await?;

    Ok(json!({
        "meta_key": params.key.meta_key,
        "value": stored,
    }))
}

pub async fn handle_delete_field_value(
    app: &SpiderBoxes,
    params: Value,
) -> Result<Value, RpcError> {
    let params: ValueKeyParams = parse_params(params)?;
    let deleted = app.values().delete_value(&params.key()).await?;

    Ok(json!({
        "meta_key": params.meta_key,
        "deleted": deleted,
    }))
}
