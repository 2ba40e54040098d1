//! Type Resolver
//!
//! Produces the single authoritative definition of a type by combining the
//! in-memory registry (bootstrap state, authoritative for `supports` and
//! `handler_ref` unless overridden) with override records from the store
//! (runtime state written through the RPC surface).
//!
//! ## Merge rules
//!
//! - registry only: the registry entry, verbatim
//! - registry + override: override fields replace registry fields one by one
//!   (shallow; `id` and `type` keys of the record never replace the id)
//! - override only: the record alone is the definition, its id taken from
//!   `type`, falling back to `id`
//! - neither: `NotFound`
//!
//! Override records match a type name on their `type` key; records without a
//! `type` key match on `id`.

use crate::models::{Namespace, TypeDefinition};
use crate::registry::Registries;
use crate::services::ServiceError;
use crate::store::{Collection, RecordStore};
use indexmap::IndexMap;
use serde_json::{Map, Value};
use std::sync::Arc;

/// Keys of an override record that never replace definition fields
const IDENTITY_KEYS: [&str; 2] = ["id", "type"];

/// Merges registry definitions with persisted overrides
#[derive(Clone)]
pub struct TypeResolver {
    registries: Arc<Registries>,
    store: Arc<dyn RecordStore>,
}

impl TypeResolver {
    pub fn new(registries: Arc<Registries>, store: Arc<dyn RecordStore>) -> Self {
        Self { registries, store }
    }

    pub fn registries(&self) -> &Arc<Registries> {
        &self.registries
    }

    /// Resolve `name` (type id or type name) within `namespace`
    pub async fn resolve_type(
        &self,
        namespace: Namespace,
        name: &str,
    ) -> Result<TypeDefinition, ServiceError> {
        let base = self.registries.get(namespace).get_type(name);
        let records = self.override_records(namespace).await?;
        let record = find_override(&records, name);

        match (base, record) {
            (Some(base), None) => {
                tracing::debug!(namespace = %namespace, name, "resolved type from registry");
                Ok(base)
            }
            (Some(base), Some((_, record))) => {
                tracing::debug!(namespace = %namespace, name, "merged type override");
                merge_override(&base, record)
            }
            (None, Some((_, record))) => definition_from_record(record),
            (None, None) => Err(ServiceError::not_found(
                format!("{} type", namespace),
                name,
            )),
        }
    }

    pub async fn type_exists(&self, namespace: Namespace, name: &str) -> Result<bool, ServiceError> {
        match self.resolve_type(namespace, name).await {
            Ok(_) => Ok(true),
            Err(ServiceError::NotFound { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Every resolved type: registry order first, then override-only types
    pub async fn list_types(
        &self,
        namespace: Namespace,
    ) -> Result<IndexMap<String, TypeDefinition>, ServiceError> {
        let records = self.override_records(namespace).await?;
        let mut resolved = IndexMap::new();

        for (id, base) in self.registries.get(namespace).get_all_types() {
            let definition = match find_override(&records, &id) {
                Some((_, record)) => merge_override(&base, record)?,
                None => base,
            };
            resolved.insert(id, definition);
        }

        for (_, record) in &records {
            let Some(obj) = record.as_object() else {
                continue;
            };
            let Some(name) = record_name(obj) else {
                continue;
            };
            if !resolved.contains_key(name) {
                let definition = definition_from_record(obj)?;
                resolved.insert(definition.id.clone(), definition);
            }
        }

        Ok(resolved)
    }

    /// Persist a new override-only type
    ///
    /// Fails with `DuplicateRegistration` when the name already resolves.
    pub async fn create_type(
        &self,
        namespace: Namespace,
        definition: TypeDefinition,
    ) -> Result<TypeDefinition, ServiceError> {
        if definition.id.trim().is_empty() {
            return Err(ServiceError::validation(vec![
                crate::models::FieldError::missing("id"),
            ]));
        }
        if self.type_exists(namespace, &definition.id).await? {
            return Err(ServiceError::duplicate(namespace, definition.id));
        }

        let mut record = to_object(&definition)?;
        record.insert("type".to_string(), Value::String(definition.id.clone()));

        self.store
            .put(Collection::Types(namespace), &definition.id, Value::Object(record))
            .await
            .map_err(ServiceError::store)?;

        tracing::info!(namespace = %namespace, id = %definition.id, "created type override");
        self.resolve_type(namespace, &definition.id).await
    }

    /// Merge `patch` into the override record for `name`, creating the record
    /// if the type so far only exists in the registry
    pub async fn update_type(
        &self,
        namespace: Namespace,
        name: &str,
        patch: Map<String, Value>,
    ) -> Result<TypeDefinition, ServiceError> {
        // Fails with NotFound for unknown types
        self.resolve_type(namespace, name).await?;

        let records = self.override_records(namespace).await?;
        let (key, mut record) = match find_override(&records, name) {
            Some((key, record)) => (key, record.clone()),
            None => {
                let mut fresh = Map::new();
                fresh.insert("id".to_string(), Value::String(name.to_string()));
                fresh.insert("type".to_string(), Value::String(name.to_string()));
                (name.to_string(), fresh)
            }
        };

        for (k, v) in patch {
            if !IDENTITY_KEYS.contains(&k.as_str()) {
                record.insert(k, v);
            }
        }

        // Reject records that would no longer decode before persisting them
        let candidate = match self.registries.get(namespace).get_type(name) {
            Some(base) => merge_override(&base, &record)?,
            None => definition_from_record(&record)?,
        };

        self.store
            .put(Collection::Types(namespace), &key, Value::Object(record))
            .await
            .map_err(ServiceError::store)?;

        tracing::info!(namespace = %namespace, id = name, "updated type override");
        Ok(candidate)
    }

    /// Remove the override record for `name`
    ///
    /// Registry types survive with their bootstrap definition.
    pub async fn delete_type(&self, namespace: Namespace, name: &str) -> Result<(), ServiceError> {
        let records = self.override_records(namespace).await?;
        let key = match find_override(&records, name) {
            Some((key, _)) => key,
            None => {
                return Err(ServiceError::not_found(
                    format!("{} type override", namespace),
                    name,
                ))
            }
        };

        let deleted = self
            .store
            .delete(Collection::Types(namespace), &key)
            .await
            .map_err(ServiceError::store)?;
        if !deleted {
            tracing::warn!(namespace = %namespace, id = name, key = %key, "override vanished before delete");
            return Err(ServiceError::not_found(
                format!("{} type override", namespace),
                name,
            ));
        }

        tracing::info!(namespace = %namespace, id = name, "deleted type override");
        Ok(())
    }

    async fn override_records(
        &self,
        namespace: Namespace,
    ) -> Result<Vec<(String, Value)>, ServiceError> {
        self.store
            .list_entries(Collection::Types(namespace))
            .await
            .map_err(|e| {
                tracing::warn!(namespace = %namespace, "override store failed: {}", e);
                ServiceError::store(e)
            })
    }
}

/// Name a record resolves under: `type`, else `id`
fn record_name(record: &Map<String, Value>) -> Option<&str> {
    record
        .get("type")
        .and_then(Value::as_str)
        .or_else(|| record.get("id").and_then(Value::as_str))
}

/// Find the override for `name`, returning its store key and body
fn find_override<'a>(
    records: &'a [(String, Value)],
    name: &str,
) -> Option<(String, &'a Map<String, Value>)> {
    object_entries(records)
        .find(|(_, r)| r.get("type").and_then(Value::as_str) == Some(name))
        .or_else(|| {
            object_entries(records).find(|(_, r)| {
                !r.contains_key("type") && r.get("id").and_then(Value::as_str) == Some(name)
            })
        })
        .map(|(key, record)| (key.clone(), record))
}

fn object_entries(
    records: &[(String, Value)],
) -> impl Iterator<Item = (&String, &Map<String, Value>)> {
    records
        .iter()
        .filter_map(|(key, record)| record.as_object().map(|obj| (key, obj)))
}

/// Shallow-merge an override record onto a registry definition
pub fn merge_override(
    base: &TypeDefinition,
    record: &Map<String, Value>,
) -> Result<TypeDefinition, ServiceError> {
    let mut merged = to_object(base)?;
    for (key, value) in record {
        if !IDENTITY_KEYS.contains(&key.as_str()) {
            merged.insert(key.clone(), value.clone());
        }
    }
    merged.insert("id".to_string(), Value::String(base.id.clone()));
    serde_json::from_value(Value::Object(merged)).map_err(ServiceError::serialization)
}

/// Build a definition from an override record with no registry counterpart
pub fn definition_from_record(record: &Map<String, Value>) -> Result<TypeDefinition, ServiceError> {
    let name = record_name(record)
        .ok_or_else(|| ServiceError::serialization("override record has neither type nor id"))?
        .to_string();

    let mut body = record.clone();
    body.remove("type");
    body.insert("id".to_string(), Value::String(name));
    serde_json::from_value(Value::Object(body)).map_err(ServiceError::serialization)
}

fn to_object(definition: &TypeDefinition) -> Result<Map<String, Value>, ServiceError> {
    match serde_json::to_value(definition).map_err(ServiceError::serialization)? {
        Value::Object(map) => Ok(map),
        _ => Err(ServiceError::serialization("type definition is not an object")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::Hooks;
    use crate::store::InMemoryStore;
    use serde_json::json;

    fn resolver() -> (TypeResolver, Arc<InMemoryStore>) {
        let store = Arc::new(InMemoryStore::new());
        let registries = Arc::new(Registries::with_defaults(Arc::new(Hooks::default())));
        (TypeResolver::new(registries, store.clone()), store)
    }

    #[tokio::test]
    async fn test_registry_only_type_is_verbatim() {
        let (resolver, _) = resolver();
        let resolved = resolver.resolve_type(Namespace::Field, "text").await.unwrap();
        let registry = resolver.registries().fields.get_type("text").unwrap();
        assert_eq!(resolved, registry);
    }

    #[tokio::test]
    async fn test_override_wins_field_by_field() {
        let (resolver, store) = resolver();
        store
            .put(
                Collection::Types(Namespace::Field),
                "17",
                json!({"id": "17", "type": "text", "description": "custom"}),
            )
            .await
            .unwrap();

        let resolved = resolver.resolve_type(Namespace::Field, "text").await.unwrap();
        let registry = resolver.registries().fields.get_type("text").unwrap();

        assert_eq!(resolved.id, "text");
        assert_eq!(resolved.description, "custom");
        assert_eq!(resolved.supports, registry.supports);
        assert_eq!(resolved.handler_ref, registry.handler_ref);
    }

    #[tokio::test]
    async fn test_override_only_type() {
        let (resolver, store) = resolver();
        store
            .put(
                Collection::Types(Namespace::Field),
                "rating",
                json!({"type": "rating", "display_name": "Rating", "supports": ["min", "max"]}),
            )
            .await
            .unwrap();

        let resolved = resolver.resolve_type(Namespace::Field, "rating").await.unwrap();
        assert_eq!(resolved.id, "rating");
        assert_eq!(resolved.supports, vec!["min", "max"]);
        assert!(resolved.is_active);
    }

    #[tokio::test]
    async fn test_unknown_type_is_not_found() {
        let (resolver, _) = resolver();
        let err = resolver
            .resolve_type(Namespace::Section, "text")
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_list_types_appends_override_only_types() {
        let (resolver, _) = resolver();
        let created = resolver
            .create_type(
                Namespace::Section,
                TypeDefinition::new("wizard", "Wizard", "form", "form", &["settings"]),
            )
            .await
            .unwrap();
        assert_eq!(created.id, "wizard");

        let all = resolver.list_types(Namespace::Section).await.unwrap();
        let ids: Vec<&str> = all.keys().map(|k| k.as_str()).collect();
        assert_eq!(ids, vec!["section", "form", "wizard"]);
    }

    #[tokio::test]
    async fn test_create_existing_type_is_duplicate() {
        let (resolver, _) = resolver();
        let err = resolver
            .create_type(
                Namespace::Field,
                TypeDefinition::new("text", "Text", "text", "basic", &[]),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::DuplicateRegistration { .. }));
    }

    #[tokio::test]
    async fn test_update_and_delete_registry_type_override() {
        let (resolver, _) = resolver();
        let mut patch = Map::new();
        patch.insert("display_name".into(), json!("Single Line"));
        patch.insert("id".into(), json!("hijack"));

        let updated = resolver
            .update_type(Namespace::Field, "text", patch)
            .await
            .unwrap();
        assert_eq!(updated.id, "text");
        assert_eq!(updated.display_name, "Single Line");

        resolver.delete_type(Namespace::Field, "text").await.unwrap();
        let restored = resolver.resolve_type(Namespace::Field, "text").await.unwrap();
        assert_eq!(restored.display_name, "Text");

        assert!(resolver
            .delete_type(Namespace::Field, "text")
            .await
            .unwrap_err()
            .is_not_found());
    }

    #[tokio::test]
    async fn test_update_rejects_undecodable_patch() {
        let (resolver, _) = resolver();
        let mut patch = Map::new();
        patch.insert("supports".into(), json!("not-a-list"));

        let err = resolver
            .update_type(Namespace::Field, "text", patch)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Serialization(_)));
        // Nothing persisted
        let resolved = resolver.resolve_type(Namespace::Field, "text").await.unwrap();
        assert!(resolved.supports.len() > 1);
    }

    #[tokio::test]
    async fn test_override_stored_under_foreign_key_is_updated_in_place() {
        let (resolver, store) = resolver();
        let types = Collection::Types(Namespace::Field);
        store
            .put(types, "row-9", json!({"type": "text", "description": "custom"}))
            .await
            .unwrap();

        let mut patch = Map::new();
        patch.insert("description".into(), json!("updated"));
        let updated = resolver
            .update_type(Namespace::Field, "text", patch)
            .await
            .unwrap();
        assert_eq!(updated.description, "updated");

        let resolved = resolver.resolve_type(Namespace::Field, "text").await.unwrap();
        assert_eq!(resolved.description, "updated");

        let entries = store.list_entries(types).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].0, "row-9");
    }

    #[tokio::test]
    async fn test_override_stored_under_foreign_key_is_deleted() {
        let (resolver, store) = resolver();
        let types = Collection::Types(Namespace::Field);
        store
            .put(types, "row-9", json!({"id": "42", "type": "text", "description": "custom"}))
            .await
            .unwrap();

        resolver.delete_type(Namespace::Field, "text").await.unwrap();

        assert!(store.list(types).await.unwrap().is_empty());
        let resolved = resolver.resolve_type(Namespace::Field, "text").await.unwrap();
        let registry = resolver.registries().fields.get_type("text").unwrap();
        assert_eq!(resolved, registry);
    }
}
