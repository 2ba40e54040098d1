//! Instance Service - CRUD over field, component and section instances
//!
//! One service per namespace. Every mutation is validated against the
//! resolved type before anything is written, so a failed create or update
//! leaves the store untouched.
//!
//! # Validation
//!
//! - `id`, `type` and `title` must be non-empty
//! - `type` must resolve in the namespace and be active
//! - each present settings key is checked against the generated descriptor
//!   with the same id (kind-aware, via the renderer's validator)
//! - with strict settings, keys without a descriptor are rejected
//!
//! # Containers
//!
//! Component containers hold ordered children: tabs → tab, accordion → pane,
//! row → column. Child ids are `{parent_id}_{kind}_{n}`.

use crate::generator::generate_config_fields;
use crate::hooks::Hooks;
use crate::models::{
    container_child_kind, ChildConfig, FieldDescriptor, FieldError, Instance, InstanceUpdate,
    Namespace, TypeDefinition,
};
use crate::renderer::{coerce_bool, validate_field, FieldConfig};
use crate::services::{ServiceError, TypeResolver};
use crate::store::{Collection, FieldValueStore, RecordStore};
use chrono::Utc;
use serde_json::{json, Map, Value};
use std::sync::Arc;

/// Instance store for one namespace
#[derive(Clone)]
pub struct InstanceService {
    namespace: Namespace,
    resolver: TypeResolver,
    store: Arc<dyn RecordStore>,
    values: Option<Arc<dyn FieldValueStore>>,
    hooks: Arc<Hooks>,
    strict_settings: bool,
}

impl InstanceService {
    pub fn new(
        namespace: Namespace,
        resolver: TypeResolver,
        store: Arc<dyn RecordStore>,
        hooks: Arc<Hooks>,
    ) -> Self {
        Self {
            namespace,
            resolver,
            store,
            values: None,
            hooks,
            strict_settings: false,
        }
    }

    /// Value rows keyed by a deleted field's id are removed from this store
    pub fn with_value_store(mut self, values: Arc<dyn FieldValueStore>) -> Self {
        self.values = Some(values);
        self
    }

    pub fn with_strict_settings(mut self, strict: bool) -> Self {
        self.strict_settings = strict;
        self
    }

    pub fn namespace(&self) -> Namespace {
        self.namespace
    }

    fn collection(&self) -> Collection {
        Collection::Instances(self.namespace)
    }

    /// Validate and persist a new instance
    pub async fn create(&self, mut instance: Instance) -> Result<Instance, ServiceError> {
        let mut errors = match self.check(&instance, self.strict_settings).await? {
            Ok(_) => Vec::new(),
            Err(errors) => errors,
        };
        if !instance.id.trim().is_empty() && self.load(&instance.id).await?.is_some() {
            errors.push(FieldError::new(
                "id",
                format!("{} already exists: {}", self.namespace, instance.id),
            ));
        }
        if !errors.is_empty() {
            tracing::debug!(namespace = %self.namespace, id = %instance.id, "rejected create");
            return Err(ServiceError::validation(errors));
        }

        let now = Utc::now();
        instance.created_at = now;
        instance.modified_at = now;
        self.save(&instance).await?;

        tracing::info!(namespace = %self.namespace, id = %instance.id, instance_type = %instance.instance_type, "created instance");
        self.hooks.do_action(
            &self.namespace.hook("created"),
            json!({"id": instance.id, "instance": instance}),
        );
        Ok(instance)
    }

    pub async fn get(&self, id: &str) -> Result<Instance, ServiceError> {
        self.load(id)
            .await?
            .ok_or_else(|| ServiceError::not_found(self.namespace.to_string(), id))
    }

    /// Every instance, optionally only those tagged with `context`
    pub async fn list(&self, context: Option<&str>) -> Result<Vec<Instance>, ServiceError> {
        let records = self
            .store
            .list(self.collection())
            .await
            .map_err(ServiceError::store)?;

        let mut instances = Vec::with_capacity(records.len());
        for record in records {
            let instance = decode(record)?;
            if context.map_or(true, |c| instance.context == c) {
                instances.push(instance);
            }
        }
        Ok(instances)
    }

    /// Instances whose `parent_id` is `parent_id`
    pub async fn list_children(&self, parent_id: &str) -> Result<Vec<Instance>, ServiceError> {
        let all = self.list(None).await?;
        Ok(all
            .into_iter()
            .filter(|i| i.parent_id.as_deref() == Some(parent_id))
            .collect())
    }

    /// Apply `patch` (patch wins) and persist after re-validation
    pub async fn update(&self, id: &str, patch: InstanceUpdate) -> Result<Instance, ServiceError> {
        let existing = self.get(id).await?;
        if patch.is_empty() {
            return Ok(existing);
        }

        let mut updated = existing.clone();
        updated.apply(patch);
        if let Err(errors) = self.check(&updated, self.strict_settings).await? {
            return Err(ServiceError::validation(errors));
        }
        self.save(&updated).await?;

        tracing::info!(namespace = %self.namespace, id, "updated instance");
        self.hooks.do_action(
            &self.namespace.hook("updated"),
            json!({"id": id, "instance": updated, "previous": existing}),
        );
        Ok(updated)
    }

    /// Remove an instance and, for fields, every value stored under its id
    ///
    /// Value rows are removed before the record; a value store failure leaves
    /// the instance in place.
    pub async fn delete(&self, id: &str) -> Result<Instance, ServiceError> {
        let existing = self.get(id).await?;

        let mut removed_values = 0;
        if self.namespace == Namespace::Field {
            if let Some(values) = &self.values {
                removed_values = values
                    .delete_meta_key(id)
                    .await
                    .map_err(ServiceError::store)?;
            }
        }

        self.store
            .delete(self.collection(), id)
            .await
            .map_err(ServiceError::store)?;

        tracing::info!(namespace = %self.namespace, id, removed_values, "deleted instance");
        self.hooks.do_action(
            &self.namespace.hook("removed"),
            json!({"id": id, "instance": existing, "removed_values": removed_values}),
        );
        Ok(existing)
    }

    /// Append a child to a container component
    ///
    /// The child id is `{parent_id}_{kind}_{n}` with `n` one past the current
    /// child count, moved further up while that id is taken. A tab added
    /// with `active = true` deactivates its siblings; a tab added while no
    /// sibling is active becomes active.
    pub async fn add_child(
        &self,
        parent_id: &str,
        config: ChildConfig,
    ) -> Result<Instance, ServiceError> {
        let mut parent = self.get(parent_id).await?;
        let kind = self.child_kind(&parent).await?.ok_or_else(|| {
            ServiceError::invalid_field(
                "type",
                format!("{} type does not accept children: {}", self.namespace, parent.instance_type),
            )
        })?;

        let mut n = parent.children.len() + 1;
        let mut child_id = format!("{}_{}_{}", parent_id, kind, n);
        while parent.children.contains_key(&child_id) {
            n += 1;
            child_id = format!("{}_{}_{}", parent_id, kind, n);
        }

        let mut settings = child_defaults(kind, n);
        let default_title = settings
            .remove("title")
            .and_then(|t| t.as_str().map(str::to_string))
            .unwrap_or_else(|| child_id.clone());
        settings.extend(config.settings);
        let title = config.title.unwrap_or(default_title);

        let mut child = Instance::new(&child_id, kind, title)
            .with_parent(parent_id)
            .with_context(parent.context.clone());
        child.settings = settings;

        if let Err(errors) = self.check(&child, false).await? {
            return Err(ServiceError::validation(errors));
        }

        if kind == "tab" {
            let wants_active = is_flag_set(&child.settings, "active");
            let sibling_active = parent
                .children
                .values()
                .any(|c| is_flag_set(&c.settings, "active"));
            if wants_active {
                for sibling in parent.children.values_mut() {
                    sibling.settings.insert("active".to_string(), Value::Bool(false));
                }
            } else if !sibling_active {
                child.settings.insert("active".to_string(), Value::Bool(true));
            }
        }

        parent.children.insert(child_id.clone(), child.clone());
        parent.modified_at = Utc::now();
        self.save(&parent).await?;

        tracing::info!(namespace = %self.namespace, parent = parent_id, child = %child_id, "added child");
        self.hooks.do_action(
            &self.namespace.hook("child_added"),
            json!({"parent_id": parent_id, "child_id": child_id, "child": child}),
        );
        Ok(child)
    }

    /// Delete one child entry; `false` when the parent or child is missing
    ///
    /// Removing the active tab activates the first remaining tab.
    pub async fn remove_child(&self, parent_id: &str, child_id: &str) -> Result<bool, ServiceError> {
        let Some(mut parent) = self.load(parent_id).await? else {
            return Ok(false);
        };
        let Some(removed) = parent.children.shift_remove(child_id) else {
            return Ok(false);
        };

        if removed.instance_type == "tab"
            && is_flag_set(&removed.settings, "active")
            && !parent.children.values().any(|c| is_flag_set(&c.settings, "active"))
        {
            if let Some(first) = parent.children.values_mut().next() {
                first.settings.insert("active".to_string(), Value::Bool(true));
            }
        }

        parent.modified_at = Utc::now();
        self.save(&parent).await?;

        tracing::info!(namespace = %self.namespace, parent = parent_id, child = child_id, "removed child");
        self.hooks.do_action(
            &self.namespace.hook("child_removed"),
            json!({"parent_id": parent_id, "child_id": child_id}),
        );
        Ok(true)
    }

    /// Validate without persisting
    ///
    /// Returns the resolved type on success.
    pub async fn validate(&self, instance: &Instance) -> Result<TypeDefinition, ServiceError> {
        match self.check(instance, self.strict_settings).await? {
            Ok(Some(definition)) => Ok(definition),
            Ok(None) => Err(ServiceError::validation(vec![FieldError::missing("type")])),
            Err(errors) => Err(ServiceError::validation(errors)),
        }
    }

    /// Collect every validation failure
    ///
    /// The outer `Result` carries store failures, the inner one field errors.
    async fn check(
        &self,
        instance: &Instance,
        strict: bool,
    ) -> Result<Result<Option<TypeDefinition>, Vec<FieldError>>, ServiceError> {
        // Step 1: structural rules
        let mut errors = match instance.validate(&Instance::REQUIRED_FIELDS) {
            Ok(()) => Vec::new(),
            Err(errors) => errors,
        };

        // Step 2: the type must resolve and be active
        let mut definition = None;
        if !instance.instance_type.trim().is_empty() {
            match self
                .resolver
                .resolve_type(self.namespace, &instance.instance_type)
                .await
            {
                Ok(resolved) if !resolved.is_active => errors.push(FieldError::new(
                    "type",
                    format!("{} type is inactive: {}", self.namespace, resolved.id),
                )),
                Ok(resolved) => definition = Some(resolved),
                Err(ServiceError::NotFound { .. }) => errors.push(FieldError::new(
                    "type",
                    format!("Unknown {} type: {}", self.namespace, instance.instance_type),
                )),
                Err(e) => return Err(e),
            }
        }

        // Step 3: settings against the generated schema
        if let Some(definition) = &definition {
            let descriptors = generate_config_fields(definition, &instance.settings);
            errors.extend(check_settings(&descriptors, &instance.settings, strict));
        }

        Ok(if errors.is_empty() {
            Ok(definition)
        } else {
            Err(errors)
        })
    }

    /// Child kind of a container, by type name, then by the resolved handler
    async fn child_kind(&self, parent: &Instance) -> Result<Option<&'static str>, ServiceError> {
        if self.namespace != Namespace::Component {
            return Ok(None);
        }
        if let Some(kind) = container_child_kind(&parent.instance_type) {
            return Ok(Some(kind));
        }
        match self
            .resolver
            .resolve_type(self.namespace, &parent.instance_type)
            .await
        {
            Ok(definition) => Ok(container_child_kind(&definition.handler_ref)),
            Err(ServiceError::NotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn load(&self, id: &str) -> Result<Option<Instance>, ServiceError> {
        match self
            .store
            .get(self.collection(), id)
            .await
            .map_err(ServiceError::store)?
        {
            Some(record) => decode(record).map(Some),
            None => Ok(None),
        }
    }

    async fn save(&self, instance: &Instance) -> Result<(), ServiceError> {
        let record = serde_json::to_value(instance).map_err(ServiceError::serialization)?;
        self.store
            .put(self.collection(), &instance.id, record)
            .await
            .map_err(|e| {
                tracing::warn!(namespace = %self.namespace, id = %instance.id, "store write failed: {}", e);
                ServiceError::store(e)
            })
    }
}

/// Validate each present settings key against the descriptor with that id
///
/// When ids repeat the last descriptor wins, as when the list is flattened
/// into a map.
pub fn check_settings(
    descriptors: &[FieldDescriptor],
    settings: &Map<String, Value>,
    strict: bool,
) -> Vec<FieldError> {
    let mut errors = Vec::new();
    for (key, value) in settings {
        match descriptors.iter().rev().find(|d| &d.id == key) {
            Some(descriptor) => {
                errors.extend(validate_field(&FieldConfig::from(descriptor), value, key));
            }
            None if strict => errors.push(FieldError::new(key, format!("Unknown setting: {}", key))),
            None => {}
        }
    }
    errors
}

/// Settings a new child starts with
fn child_defaults(kind: &str, n: usize) -> Map<String, Value> {
    let defaults = match kind {
        "tab" => json!({"title": format!("Tab {}", n), "active": false}),
        "pane" => json!({"title": format!("Pane {}", n), "open": false}),
        "column" => json!({"title": format!("Column {}", n), "width": 12}),
        _ => json!({}),
    };
    match defaults {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

fn is_flag_set(settings: &Map<String, Value>, key: &str) -> bool {
    settings.get(key).and_then(coerce_bool).unwrap_or(false)
}

fn decode(record: Value) -> Result<Instance, ServiceError> {
    serde_json::from_value(record).map_err(ServiceError::serialization)
}

#[cfg(test)]
#[path = "instance_service_test.rs"]
mod instance_service_test;
