//! In-memory store implementations
//!
//! Used by the RPC server out of the box and throughout the tests. Both
//! stores are cheap to clone-share behind `Arc` and keep insertion order.

use super::record_store::{Collection, FieldValueStore, RecordStore, ValueKey};
use anyhow::Result;
use async_trait::async_trait;
use indexmap::IndexMap;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;

/// `RecordStore` backed by ordered maps
#[derive(Default)]
pub struct InMemoryStore {
    collections: RwLock<HashMap<Collection, IndexMap<String, Value>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for InMemoryStore {
    async fn list_entries(&self, collection: Collection) -> Result<Vec<(String, Value)>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(&collection)
            .map(|records| {
                records
                    .iter()
                    .map(|(key, record)| (key.clone(), record.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn get(&self, collection: Collection, id: &str) -> Result<Option<Value>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(&collection)
            .and_then(|records| records.get(id))
            .cloned())
    }

    async fn put(&self, collection: Collection, id: &str, record: Value) -> Result<()> {
        let mut collections = self.collections.write().await;
        collections
            .entry(collection)
            .or_default()
            .insert(id.to_string(), record);
        Ok(())
    }

    async fn delete(&self, collection: Collection, id: &str) -> Result<bool> {
        let mut collections = self.collections.write().await;
        Ok(collections
            .get_mut(&collection)
            .and_then(|records| records.shift_remove(id))
            .is_some())
    }
}

/// `FieldValueStore` backed by a sorted map
#[derive(Default)]
pub struct InMemoryValueStore {
    values: RwLock<BTreeMap<ValueKey, Value>>,
}

impl InMemoryValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.values.read().await.len()
    }
}

#[async_trait]
impl FieldValueStore for InMemoryValueStore {
    async fn get_value(&self, key: &ValueKey) -> Result<Option<Value>> {
        Ok(self.values.read().await.get(key).cloned())
    }

    async fn set_value(&self, key: &ValueKey, value: Value) -> Result<()> {
        self.values.write().await.insert(key.clone(), value);
        Ok(())
    }

    async fn delete_value(&self, key: &ValueKey) -> Result<bool> {
        Ok(self.values.write().await.remove(key).is_some())
    }

    async fn delete_meta_key(&self, meta_key: &str) -> Result<usize> {
        let mut values = self.values.write().await;
        let before = values.len();
        values.retain(|key, _| key.meta_key != meta_key);
        Ok(before - values.len())
    }
}
