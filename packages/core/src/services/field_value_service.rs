//! Field Value Service
//!
//! Values live in host storage keyed by `(object_id, object_type, meta_key,
//! context)`. When a field instance with `id == meta_key` exists, `set`
//! sanitizes the raw value with that field's renderer config and validates
//! the result before writing; other keys are stored as given.

use crate::models::Namespace;
use crate::renderer::{sanitize, validate_field, FieldConfig};
use crate::services::{InstanceService, ServiceError, TypeResolver};
use crate::store::{FieldValueStore, ValueKey};
use serde_json::Value;
use std::sync::Arc;

#[derive(Clone)]
pub struct FieldValueService {
    values: Arc<dyn FieldValueStore>,
    fields: InstanceService,
    resolver: TypeResolver,
}

impl FieldValueService {
    /// `fields` must be the field namespace's instance service
    pub fn new(values: Arc<dyn FieldValueStore>, fields: InstanceService, resolver: TypeResolver) -> Self {
        debug_assert_eq!(fields.namespace(), Namespace::Field);
        Self {
            values,
            fields,
            resolver,
        }
    }

    pub async fn get_value(&self, key: &ValueKey) -> Result<Option<Value>, ServiceError> {
        self.values.get_value(key).await.map_err(ServiceError::store)
    }

    /// Sanitize, validate and store; returns the stored value
    pub async fn set_value(&self, key: &ValueKey, raw: Value) -> Result<Value, ServiceError> {
        let value = match self.field_config(&key.meta_key).await? {
            Some(config) => {
                let clean = sanitize(&config, &raw);
                let errors = validate_field(&config, &clean, &key.meta_key);
                if !errors.is_empty() {
                    return Err(ServiceError::validation(errors));
                }
                clean
            }
            None => raw,
        };

        self.values
            .set_value(key, value.clone())
            .await
            .map_err(ServiceError::store)?;
        tracing::debug!(object_id = %key.object_id, meta_key = %key.meta_key, "stored field value");
        Ok(value)
    }

    /// Remove one stored value; `false` when nothing was stored
    pub async fn delete_value(&self, key: &ValueKey) -> Result<bool, ServiceError> {
        let removed = self
            .values
            .delete_value(key)
            .await
            .map_err(ServiceError::store)?;
        if removed {
            tracing::debug!(object_id = %key.object_id, meta_key = %key.meta_key, "deleted field value");
        }
        Ok(removed)
    }

    /// Renderer config of the field instance named `meta_key`, if any
    pub async fn field_config(&self, meta_key: &str) -> Result<Option<FieldConfig>, ServiceError> {
        let field = match self.fields.get(meta_key).await {
            Ok(field) => field,
            Err(ServiceError::NotFound { .. }) => return Ok(None),
            Err(e) => return Err(e),
        };
        let definition = self
            .resolver
            .resolve_type(Namespace::Field, &field.instance_type)
            .await?;
        Ok(Some(FieldConfig::from_instance(&field, &definition)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::Hooks;
    use crate::models::Instance;
    use crate::registry::Registries;
    use crate::store::{InMemoryStore, InMemoryValueStore, RecordStore};
    use serde_json::json;

    async fn service() -> FieldValueService {
        let hooks = Arc::new(Hooks::default());
        let store: Arc<dyn RecordStore> = Arc::new(InMemoryStore::new());
        let registries = Arc::new(Registries::with_defaults(hooks.clone()));
        let resolver = TypeResolver::new(registries, store.clone());
        let values = Arc::new(InMemoryValueStore::new());
        let fields = InstanceService::new(Namespace::Field, resolver.clone(), store, hooks)
            .with_value_store(values.clone());

        fields
            .create(Instance::new("volume", "range", "Volume").with_settings(json!({
                "min": 0, "max": 10, "step": 5
            })))
            .await
            .unwrap();
        fields
            .create(Instance::new("size", "select", "Size").with_settings(json!({
                "options": "s : Small\nm : Medium",
                "required": true
            })))
            .await
            .unwrap();

        FieldValueService::new(values, fields, resolver)
    }

    #[tokio::test]
    async fn test_set_sanitizes_with_field_config() {
        let service = service().await;
        let key = ValueKey::new("42", "product", "volume", "default");

        assert_eq!(service.set_value(&key, json!(15)).await.unwrap(), json!(10));
        assert_eq!(service.get_value(&key).await.unwrap(), Some(json!(10)));
    }

    #[tokio::test]
    async fn test_set_rejects_invalid_value() {
        let service = service().await;
        let key = ValueKey::new("42", "product", "size", "default");

        let err = service.set_value(&key, json!("xl")).await.unwrap_err();
        assert_eq!(err.failed_fields(), vec!["size"]);
        assert!(err.to_string().contains("Size is required"));
        assert_eq!(service.get_value(&key).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_unknown_meta_key_is_stored_as_given() {
        let service = service().await;
        let key = ValueKey::new("7", "user", "nickname", "default");
        let stored = service.set_value(&key, json!({"raw": true})).await.unwrap();
        assert_eq!(stored, json!({"raw": true}));

        assert!(service.delete_value(&key).await.unwrap());
        assert_eq!(service.get_value(&key).await.unwrap(), None);
        assert!(!service.delete_value(&key).await.unwrap());
    }
}
