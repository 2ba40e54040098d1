//! Storage Layer
//!
//! Persistence is a collaborator, not part of the core:
//!
//! - `RecordStore` - type override records and instances, per collection
//! - `FieldValueStore` - field values keyed by object, meta key and context
//! - In-memory implementations of both for the server and tests

mod memory_store;
mod record_store;

pub use memory_store::{InMemoryStore, InMemoryValueStore};
pub use record_store::{Collection, FieldValueStore, RecordStore, ValueKey};
