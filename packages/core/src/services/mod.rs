//! Business Services
//!
//! This module contains the service layer over registries and stores:
//!
//! - `TypeResolver` - merges registry definitions with override records
//! - `InstanceService` - validated CRUD over instances, container children
//! - `ConfigService` - resolved type plus its generated configuration schema
//! - `FieldValueService` - sanitized field values in host storage
//! - `SpiderBoxes` - assembles all of the above from one configuration
//!
//! Services return `ServiceError`; store failures are wrapped, never retried.

pub mod config_service;
pub mod error;
pub mod field_value_service;
pub mod instance_service;
pub mod spider_boxes;
pub mod type_resolver;

pub use config_service::{ConfigService, TypeConfig};
pub use error::ServiceError;
pub use field_value_service::FieldValueService;
pub use instance_service::{check_settings, InstanceService};
pub use spider_boxes::SpiderBoxes;
pub use type_resolver::{definition_from_record, merge_override, TypeResolver};
