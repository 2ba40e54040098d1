//! Instance CRUD and container child handlers

use super::{deserialize_namespace, parse_params, to_json};
use crate::api::types::RpcError;
use crate::models::{ChildConfig, Instance, InstanceUpdate, Namespace};
use crate::services::SpiderBoxes;
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Debug, Deserialize)]
pub struct ListInstancesParams {
    #[serde(deserialize_with = "deserialize_namespace")]
    pub namespace: Namespace,
    #[serde(default)]
    pub context: Option<String>,
    /// When set, list the stored instances with this parent instead
    #[serde(default)]
    pub parent_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct InstanceParams {
    #[serde(deserialize_with = "deserialize_namespace")]
    pub namespace: Namespace,
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateInstanceParams {
    #[serde(deserialize_with = "deserialize_namespace")]
    pub namespace: Namespace,
    pub instance: Instance,
}

#[derive(Debug, Deserialize)]
pub struct UpdateInstanceParams {
    #[serde(deserialize_with = "deserialize_namespace")]
    pub namespace: Namespace,
    pub id: String,
    pub patch: InstanceUpdate,
}

fn default_container_namespace() -> Namespace {
    Namespace::Component
}

#[derive(Debug, Deserialize)]
pub struct AddChildParams {
    #[serde(
        default = "default_container_namespace",
        deserialize_with = "deserialize_namespace"
    )]
    pub namespace: Namespace,
    pub parent_id: String,
    #[serde(default)]
    pub child: ChildConfig,
}

#[derive(Debug, Deserialize)]
pub struct RemoveChildParams {
    #[serde(
        default = "default_container_namespace",
        deserialize_with = "deserialize_namespace"
    )]
    pub namespace: Namespace,
    pub parent_id: String,
    pub child_id: String,
}

pub async fn handle_list_instances(app: &SpiderBoxes, params: Value) -> Result<Value, RpcError> {
    let params: ListInstancesParams = parse_params(params)?;
    let service = app.instances(params.namespace);

    let mut instances = match &params.parent_id {
        Some(parent_id) => service.list_children(parent_id).await?,
        None => service.list(params.context.as_deref()).await?,
    };
    if params.parent_id.is_some() {
        if let Some(context) = &params.context {
            instances.retain(|i| &i.context == context);
        }
    }

    Ok(json!({
        "namespace": params.namespace,
        "count": instances.len(),
        "instances": instances,
    }))
}

pub async fn handle_get_instance(app: &SpiderBoxes, params: Value) -> Result<Value, RpcError> {
    let params: InstanceParams = parse_params(params)?;
    let instance = app.instances(params.namespace).get(&params.id).await?;
    to_json(&instance)
}

pub async fn handle_create_instance(app: &SpiderBoxes, params: Value) -> Result<Value, RpcError> {
    let params: CreateInstanceParams = parse_params(params)?;
    let instance = app
        .instances(params.namespace)
        .create(params.instance)
        .await?;
    to_json(&instance)
}

pub async fn handle_update_instance(app: &SpiderBoxes, params: Value) -> Result<Value, RpcError> {
    let params: UpdateInstanceParams = parse_params(params)?;
    let instance = app
        .instances(params.namespace)
        .update(&params.id, params.patch)
        .await?;
    to_json(&instance)
}

pub async fn handle_delete_instance(app: &SpiderBoxes, params: Value) -> Result<Value, RpcError> {
    let params: InstanceParams = parse_params(params)?;
    let removed = app.instances(params.namespace).delete(&params.id).await?;

    Ok(json!({
        "id": removed.id,
        "deleted": true,
        "instance": removed,
    }))
}

pub async fn handle_add_child(app: &SpiderBoxes, params: Value) -> Result<Value, RpcError> {
    let params: AddChildParams = parse_params(params)?;
    let child = app
        .instances(params.namespace)
        .add_child(&params.parent_id, params.child)
        .await?;
    to_json(&child)
}

pub async fn handle_remove_child(app: &SpiderBoxes, params: Value) -> Result<Value, RpcError> {
    let params: RemoveChildParams = parse_params(params)?;
    let removed = app
        .instances(params.namespace)
        .remove_child(&params.parent_id, &params.child_id)
        .await?;

    Ok(json!({
        "parent_id": params.parent_id,
        "child_id": params.child_id,
        "removed": removed,
    }))
}
