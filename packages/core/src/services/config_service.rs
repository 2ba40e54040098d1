//! Type configuration schemas (`GET {type}/config`)

use crate::generator::generate_config_fields;
use crate::hooks::Hooks;
use crate::models::{FieldDescriptor, Namespace, TypeDefinition};
use crate::services::{ServiceError, TypeResolver};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::sync::Arc;

/// A resolved type together with its generated configuration schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeConfig {
    pub type_definition: TypeDefinition,
    pub config_fields: Vec<FieldDescriptor>,
}

#[derive(Clone)]
pub struct ConfigService {
    resolver: TypeResolver,
    hooks: Arc<Hooks>,
}

impl ConfigService {
    pub fn new(resolver: TypeResolver, hooks: Arc<Hooks>) -> Self {
        Self { resolver, hooks }
    }

    /// Resolve `name` and generate its schema against `existing` settings
    ///
    /// The descriptor list passes through the `{namespace}_config_fields`
    /// filter with the type id and namespace as context.
    pub async fn type_config(
        &self,
        namespace: Namespace,
        name: &str,
        existing: &Map<String, Value>,
    ) -> Result<TypeConfig, ServiceError> {
        let definition = self.resolver.resolve_type(namespace, name).await?;
        let fields = generate_config_fields(&definition, existing);
        let fields = self.hooks.apply_filter(
            &namespace.hook("config_fields"),
            fields,
            &[json!(definition.id), json!(namespace.as_str())],
        );

        tracing::debug!(namespace = %namespace, name, fields = fields.len(), "generated type config");
        Ok(TypeConfig {
            type_definition: definition,
            config_fields: fields,
        })
    }
}
