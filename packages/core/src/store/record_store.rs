//! RecordStore Trait - Persistence Abstraction
//!
//! Spider Boxes does not own its persistence. Type overrides and instances are
//! kept in a collaborator exposing `list/get/put/delete` per collection, with
//! read-your-writes consistency. The backend (options table, custom SQL
//! table, document store) is the host's business.
//!
//! Records are JSON objects. Override records carry at least `id` and usually
//! `type`; instance records are serialized `Instance`s.
//!
//! # Errors
//!
//! Methods return `anyhow::Result`; services surface any error as
//! `ServiceError::StoreUnavailable` without retrying.

use crate::models::Namespace;
use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::fmt;

/// One independent record collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    /// Override records for type definitions of a namespace
    Types(Namespace),
    /// Instances of a namespace
    Instances(Namespace),
}

impl Collection {
    pub fn name(&self) -> String {
        match self {
            Collection::Types(ns) => format!("{}_types", ns),
            Collection::Instances(ns) => format!("{}s", ns),
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// Keyed JSON record persistence, one map per collection
///
/// Implementations must be `Send + Sync`; services share them behind `Arc`.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// All `(key, record)` pairs of a collection in insertion order
    ///
    /// Keys are the ids records were `put` under; they need not appear in
    /// the record body.
    async fn list_entries(&self, collection: Collection) -> Result<Vec<(String, Value)>>;

    /// All records of a collection in insertion order
    async fn list(&self, collection: Collection) -> Result<Vec<Value>> {
        Ok(self
            .list_entries(collection)
            .await?
            .into_iter()
            .map(|(_, record)| record)
            .collect())
    }

    /// `Ok(None)` when the key is absent (not an error)
    async fn get(&self, collection: Collection, id: &str) -> Result<Option<Value>>;

    /// Insert or replace the record stored under `id`
    async fn put(&self, collection: Collection, id: &str, record: Value) -> Result<()>;

    /// Remove a record, returning whether it existed
    async fn delete(&self, collection: Collection, id: &str) -> Result<bool>;
}

/// Key of one stored field value
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ValueKey {
    pub object_id: String,
    pub object_type: String,
    pub meta_key: String,
    pub context: String,
}

impl ValueKey {
    pub fn new(
        object_id: impl Into<String>,
        object_type: impl Into<String>,
        meta_key: impl Into<String>,
        context: impl Into<String>,
    ) -> Self {
        Self {
            object_id: object_id.into(),
            object_type: object_type.into(),
            meta_key: meta_key.into(),
            context: context.into(),
        }
    }
}

/// Host storage for field values (post meta, user meta, options, ...)
#[async_trait]
pub trait FieldValueStore: Send + Sync {
    async fn get_value(&self, key: &ValueKey) -> Result<Option<Value>>;

    async fn set_value(&self, key: &ValueKey, value: Value) -> Result<()>;

    /// Remove one value, returning whether it existed
    async fn delete_value(&self, key: &ValueKey) -> Result<bool>;

    /// Remove every value stored under `meta_key`, returning how many rows went
    async fn delete_meta_key(&self, meta_key: &str) -> Result<usize>;
}
