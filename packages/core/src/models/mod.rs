//! Data Models
//!
//! This module contains the core data structures used throughout Spider Boxes:
//!
//! - `TypeDefinition` / `Namespace` - kinds of fields, components and sections
//! - `FieldDescriptor` - one generated configuration input
//! - `Instance` - a concrete configured field, component or section
//! - `core_types` - the built-in type catalogs seeded at startup

pub mod core_types;
mod descriptor;
mod instance;
mod type_definition;

pub use core_types::{container_child_kind, get_core_types};
pub use descriptor::{options_from, Conditional, Constraints, FieldDescriptor, OptionItem};
pub use instance::{ChildConfig, FieldError, Instance, InstanceUpdate};
pub use type_definition::{Namespace, TypeDefinition};
