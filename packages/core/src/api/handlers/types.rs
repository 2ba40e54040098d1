//! Type catalog handlers
//!
//! Reads go through the resolver (registry merged with overrides); writes
//! only ever touch the override store.

use super::{deserialize_namespace, parse_params, to_json};
use crate::api::types::RpcError;
use crate::models::{Namespace, TypeDefinition};
use crate::services::SpiderBoxes;
use serde::Deserialize;
use serde_json::{json, Map, Value};

#[derive(Debug, Deserialize)]
pub struct ListTypesParams {
    #[serde(deserialize_with = "deserialize_namespace")]
    pub namespace: Namespace,
    /// Hide inactive types
    #[serde(default)]
    pub active_only: bool,
}

#[derive(Debug, Deserialize)]
pub struct TypeParams {
    #[serde(deserialize_with = "deserialize_namespace")]
    pub namespace: Namespace,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateTypeParams {
    #[serde(deserialize_with = "deserialize_namespace")]
    pub namespace: Namespace,
    pub definition: TypeDefinition,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTypeParams {
    #[serde(deserialize_with = "deserialize_namespace")]
    pub namespace: Namespace,
    pub name: String,
    #[serde(default)]
    pub patch: Map<String, Value>,
}

pub async fn handle_list_types(app: &SpiderBoxes, params: Value) -> Result<Value, RpcError> {
    let params: ListTypesParams = parse_params(params)?;
    let types: Vec<TypeDefinition> = app
        .resolver()
        .list_types(params.namespace)
        .await?
        .into_values()
        .filter(|t| !params.active_only || t.is_active)
        .collect();

    Ok(json!({
        "namespace": params.namespace,
        "count": types.len(),
        "types": types,
    }))
}

pub async fn handle_get_type(app: &SpiderBoxes, params: Value) -> Result<Value, RpcError> {
    let params: TypeParams = parse_params(params)?;
    let definition = app
        .resolver()
        .resolve_type(params.namespace, &params.name)
        .await?;
    to_json(&definition)
}

pub async fn handle_create_type(app: &SpiderBoxes, params: Value) -> Result<Value, RpcError> {
    let params: CreateTypeParams = parse_params(params)?;
    let definition = app
        .resolver()
        .create_type(params.namespace, params.definition)
        .await?;
    to_json(&definition)
}

pub async fn handle_update_type(app: &SpiderBoxes, params: Value) -> Result<Value, RpcError> {
    let params: UpdateTypeParams = parse_params(params)?;
    if params.patch.is_empty() {
        return Err(RpcError::invalid_params(
            "update_type needs a non-empty patch".to_string(),
        ));
    }
    let definition = app
        .resolver()
        .update_type(params.namespace, &params.name, params.patch)
        .await?;
    to_json(&definition)
}

pub async fn handle_delete_type(app: &SpiderBoxes, params: Value) -> Result<Value, RpcError> {
    let params: TypeParams = parse_params(params)?;
    app.resolver()
        .delete_type(params.namespace, &params.name)
        .await?;

    // Registry types fall back to their bootstrap definition
    let still_resolves = app
        .resolver()
        .type_exists(params.namespace, &params.name)
        .await?;

    Ok(json!({
        "name": params.name,
        "deleted": true,
        "still_resolves": still_resolves,
    }))
}
