//! Spider Boxes Core
//!
//! A configuration engine for dynamic field types. Fields, components and
//! sections are described by type definitions whose capability tags drive
//! the generation of configuration schemas; configured instances of those
//! types are stored, validated and rendered as editable form controls.
//!
//! # Architecture
//!
//! - **Registry is bootstrap data**: built-in catalogs are seeded once and
//!   read-only afterwards; runtime edits go to an override store
//! - **Pure generation**: a type's config schema is a function of its
//!   `supports` list and the instance's current settings
//! - **Host-owned persistence**: records and field values live behind the
//!   `RecordStore` and `FieldValueStore` traits
//! - **Hooks**: actions and typed filters let hosts observe and reshape
//!   registrations, catalogs and schemas
//!
//! # Modules
//!
//! - [`models`] - Type definitions, descriptors, instances
//! - [`registry`] - Per-namespace type registries
//! - [`generator`] - Capability-to-schema generator
//! - [`services`] - Type resolver, instance store, config and value services
//! - [`renderer`] - Field configs, sanitize/validate, render, form editing
//! - [`store`] - Persistence traits and in-memory implementations
//! - [`api`] - JSON-RPC methods and the stdio server loop

pub mod api;
pub mod config;
pub mod generator;
pub mod hooks;
pub mod models;
pub mod registry;
pub mod renderer;
pub mod services;
pub mod store;

// Re-export commonly used types
pub use config::CoreConfig;
pub use generator::generate_config_fields;
pub use hooks::{HookEvent, Hooks};
pub use models::*;
pub use registry::{Registries, TypeRegistry};
pub use renderer::{FieldConfig, FieldKind, FormEditor};
pub use services::*;
pub use store::{FieldValueStore, InMemoryStore, InMemoryValueStore, RecordStore, ValueKey};
