//! Type Registry
//!
//! In-memory catalog of type definitions, one registry per namespace. The
//! registry is process-wide and read-mostly: it is seeded with the built-in
//! catalog at startup and may be extended by host code afterwards.
//!
//! Registration is insert-if-absent. The first registration of an id wins and
//! later attempts return `false` without touching the stored definition. Two
//! callers racing to register the same new id both get a consistent answer:
//! exactly one sees `true`.
//!
//! # Hooks
//!
//! - action `{namespace}_type_registered` with `{id, definition}` after a
//!   successful registration
//! - filter `{namespace}_types` over `IndexMap<String, TypeDefinition>` on
//!   every `get_all_types()` call

use crate::hooks::Hooks;
use crate::models::{get_core_types, Namespace, TypeDefinition};
use indexmap::map::Entry;
use indexmap::IndexMap;
use serde_json::json;
use std::sync::{Arc, RwLock};

/// Ordered, insert-if-absent catalog of type definitions for one namespace
pub struct TypeRegistry {
    namespace: Namespace,
    types: RwLock<IndexMap<String, TypeDefinition>>,
    hooks: Arc<Hooks>,
}

impl TypeRegistry {
    /// Create an empty registry
    pub fn new(namespace: Namespace, hooks: Arc<Hooks>) -> Self {
        Self {
            namespace,
            types: RwLock::new(IndexMap::new()),
            hooks,
        }
    }

    /// Create a registry seeded with the built-in catalog for `namespace`
    pub fn with_defaults(namespace: Namespace, hooks: Arc<Hooks>) -> Self {
        let registry = Self::new(namespace, hooks);
        registry.register_defaults();
        registry
    }

    /// Register every built-in type not already present
    ///
    /// Returns how many were newly registered.
    pub fn register_defaults(&self) -> usize {
        let registered = get_core_types(self.namespace)
            .into_iter()
            .filter(|def| self.register_type(def.id.clone(), def.clone()))
            .count();
        tracing::debug!(
            namespace = %self.namespace,
            registered,
            "registered built-in types"
        );
        registered
    }

    pub fn namespace(&self) -> Namespace {
        self.namespace
    }

    /// Register a type definition under `id`
    ///
    /// Returns `false` and leaves the registry unchanged if `id` is already
    /// present. The stored definition always carries `id` as its id.
    pub fn register_type(&self, id: impl Into<String>, definition: TypeDefinition) -> bool {
        let id = id.into();
        let mut definition = definition;
        definition.id = id.clone();

        {
            let mut types = self.types.write().unwrap_or_else(|e| e.into_inner());
            match types.entry(id.clone()) {
                Entry::Occupied(_) => {
                    tracing::warn!(
                        namespace = %self.namespace,
                        id = %id,
                        "type already registered, keeping the first registration"
                    );
                    return false;
                }
                Entry::Vacant(slot) => {
                    slot.insert(definition.clone());
                }
            }
        }

        self.hooks.do_action(
            &self.namespace.hook("type_registered"),
            json!({ "id": id, "definition": definition }),
        );
        true
    }

    pub fn get_type(&self, id: &str) -> Option<TypeDefinition> {
        let types = self.types.read().unwrap_or_else(|e| e.into_inner());
        types.get(id).cloned()
    }

    /// All registered types in registration order, passed through the
    /// `{namespace}_types` filter
    pub fn get_all_types(&self) -> IndexMap<String, TypeDefinition> {
        let snapshot = {
            let types = self.types.read().unwrap_or_else(|e| e.into_inner());
            types.clone()
        };
        self.hooks.apply_filter(
            &self.namespace.hook("types"),
            snapshot,
            &[json!(self.namespace)],
        )
    }

    pub fn type_exists(&self, id: &str) -> bool {
        let types = self.types.read().unwrap_or_else(|e| e.into_inner());
        types.contains_key(id)
    }

    pub fn len(&self) -> usize {
        let types = self.types.read().unwrap_or_else(|e| e.into_inner());
        types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The three per-namespace registries sharing one hook registry
pub struct Registries {
    pub fields: TypeRegistry,
    pub components: TypeRegistry,
    pub sections: TypeRegistry,
}

impl Registries {
    /// Empty registries
    pub fn new(hooks: Arc<Hooks>) -> Self {
        Self {
            fields: TypeRegistry::new(Namespace::Field, hooks.clone()),
            components: TypeRegistry::new(Namespace::Component, hooks.clone()),
            sections: TypeRegistry::new(Namespace::Section, hooks),
        }
    }

    /// Registries seeded with every built-in catalog
    pub fn with_defaults(hooks: Arc<Hooks>) -> Self {
        let registries = Self::new(hooks);
        for namespace in Namespace::ALL {
            registries.get(namespace).register_defaults();
        }
        registries
    }

    pub fn get(&self, namespace: Namespace) -> &TypeRegistry {
        match namespace {
            Namespace::Field => &self.fields,
            Namespace::Component => &self.components,
            Namespace::Section => &self.sections,
        }
    }
}
