//! Extensibility Hooks
//!
//! Host code extends the core without modifying it through two primitives:
//!
//! - **Actions** - fire-and-forget notifications (`on_action` / `do_action`).
//!   Every action is also published on a tokio broadcast channel so async
//!   observers can `subscribe()` instead of registering a callback.
//! - **Filters** - synchronous transform pipelines (`add_filter` /
//!   `apply_filter`). Filters are typed: a filter registered for
//!   `IndexMap<String, TypeDefinition>` only runs when that type is filtered
//!   under that name. With no matching filter the value is returned unchanged.
//!
//! Handlers run in registration order.
//!
//! # Examples
//!
//! ```rust
//! use spider_boxes_core::hooks::Hooks;
//! use serde_json::json;
//!
//! let hooks = Hooks::default();
//! hooks.add_filter("greeting", |value: String, _ctx| format!("{}!", value));
//! assert_eq!(hooks.apply_filter("greeting", "hello".to_string(), &[]), "hello!");
//!
//! hooks.do_action("field_created", json!({"id": "f1"}));
//! ```

use serde_json::Value;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tokio::sync::broadcast;

/// Default broadcast capacity for published actions
pub const DEFAULT_EVENT_CHANNEL_CAPACITY: usize = 128;

/// Action handler
pub type ActionFn = Arc<dyn Fn(&Value) + Send + Sync>;

type FilterFn<T> = Arc<dyn Fn(T, &[Value]) -> T + Send + Sync>;

type ErasedFilter = (TypeId, Arc<dyn Any + Send + Sync>);

/// An action as seen by broadcast subscribers
#[derive(Debug, Clone, PartialEq)]
pub struct HookEvent {
    pub name: String,
    pub payload: Value,
}

/// Registry of action handlers and typed filters
pub struct Hooks {
    actions: RwLock<HashMap<String, Vec<ActionFn>>>,
    filters: RwLock<HashMap<String, Vec<ErasedFilter>>>,
    event_tx: broadcast::Sender<HookEvent>,
}

impl Default for Hooks {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CHANNEL_CAPACITY)
    }
}

impl Hooks {
    /// Create an empty hook registry
    ///
    /// `capacity` is the broadcast buffer size and must be non-zero.
    pub fn new(capacity: usize) -> Self {
        let (event_tx, _) = broadcast::channel(capacity.max(1));
        Self {
            actions: RwLock::new(HashMap::new()),
            filters: RwLock::new(HashMap::new()),
            event_tx,
        }
    }

    /// Register an action handler
    pub fn on_action<F>(&self, name: impl Into<String>, handler: F)
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        let mut actions = self.actions.write().unwrap_or_else(|e| e.into_inner());
        actions
            .entry(name.into())
            .or_default()
            .push(Arc::new(handler));
    }

    /// Fire an action
    ///
    /// Handlers are snapshotted before they run, so a handler may register
    /// further hooks without deadlocking. Publishing without subscribers is
    /// not an error.
    pub fn do_action(&self, name: &str, payload: Value) {
        let handlers: Vec<ActionFn> = {
            let actions = self.actions.read().unwrap_or_else(|e| e.into_inner());
            actions.get(name).cloned().unwrap_or_default()
        };

        for handler in &handlers {
            handler(&payload);
        }

        tracing::trace!(hook = name, handlers = handlers.len(), "action fired");

        let _ = self.event_tx.send(HookEvent {
            name: name.to_string(),
            payload,
        });
    }

    /// Subscribe to every action fired after this call
    pub fn subscribe(&self) -> broadcast::Receiver<HookEvent> {
        self.event_tx.subscribe()
    }

    /// Register a filter for values of type `T`
    pub fn add_filter<T, F>(&self, name: impl Into<String>, filter: F)
    where
        T: 'static,
        F: Fn(T, &[Value]) -> T + Send + Sync + 'static,
    {
        let filter: FilterFn<T> = Arc::new(filter);
        let mut filters = self.filters.write().unwrap_or_else(|e| e.into_inner());
        filters
            .entry(name.into())
            .or_default()
            .push((TypeId::of::<T>(), Arc::new(filter)));
    }

    /// Run `value` through every filter registered for `name` and type `T`
    pub fn apply_filter<T: 'static>(&self, name: &str, value: T, ctx: &[Value]) -> T {
        let matching: Vec<FilterFn<T>> = {
            let filters = self.filters.read().unwrap_or_else(|e| e.into_inner());
            match filters.get(name) {
                Some(entries) => entries
                    .iter()
                    .filter(|(type_id, _)| *type_id == TypeId::of::<T>())
                    .filter_map(|(_, erased)| erased.downcast_ref::<FilterFn<T>>().cloned())
                    .collect(),
                None => return value,
            }
        };

        matching
            .iter()
            .fold(value, |acc, filter| filter(acc, ctx))
    }

    /// Whether any filter of any type is registered under `name`
    pub fn has_filter(&self, name: &str) -> bool {
        let filters = self.filters.read().unwrap_or_else(|e| e.into_inner());
        filters.get(name).map(|f| !f.is_empty()).unwrap_or(false)
    }
}
