//! Type configuration schema handler

use super::{deserialize_namespace, parse_params, to_json};
use crate::api::types::RpcError;
use crate::models::Namespace;
use crate::services::SpiderBoxes;
use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Deserialize)]
pub struct TypeConfigParams {
    #[serde(deserialize_with = "deserialize_namespace")]
    pub namespace: Namespace,
    pub name: String,
    /// Current instance settings used to prefill descriptor values
    #[serde(default)]
    pub settings: Map<String, Value>,
    /// Prefill from a stored instance instead of explicit settings
    #[serde(default)]
    pub instance_id: Option<String>,
}

pub async fn handle_get_type_config(app: &SpiderBoxes, params: Value) -> Result<Value, RpcError> {
    let params: TypeConfigParams = parse_params(params)?;

    let settings = match &params.instance_id {
        Some(id) => app.instances(params.namespace).get(id).await?.settings,
        None => params.settings,
    };

    let config = app
        .type_configs()
        .type_config(params.namespace, &params.name, &settings)
        .await?;
    to_json(&config)
}
