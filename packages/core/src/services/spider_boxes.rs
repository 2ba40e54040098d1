//! Service assembly
//!
//! Builds every service from one config, one record store and one value
//! store, sharing a single hook registry and registry bundle. Hosts hold a
//! `SpiderBoxes` (cheap to clone) instead of reaching for globals.

use crate::config::CoreConfig;
use crate::hooks::Hooks;
use crate::models::Namespace;
use crate::registry::Registries;
use crate::services::{ConfigService, FieldValueService, InstanceService, TypeResolver};
use crate::store::{FieldValueStore, InMemoryStore, InMemoryValueStore, RecordStore};
use std::sync::Arc;

#[derive(Clone)]
pub struct SpiderBoxes {
    config: CoreConfig,
    hooks: Arc<Hooks>,
    resolver: TypeResolver,
    fields: InstanceService,
    components: InstanceService,
    sections: InstanceService,
    type_configs: ConfigService,
    values: FieldValueService,
}

impl SpiderBoxes {
    pub fn new(
        config: CoreConfig,
        store: Arc<dyn RecordStore>,
        value_store: Arc<dyn FieldValueStore>,
    ) -> Self {
        Self::with_hooks(config, store, value_store, |_| {})
    }

    /// Like `new`, but `setup` may register hooks before the catalogs are
    /// seeded, so it also sees the `{namespace}_type_registered` actions
    pub fn with_hooks<F>(
        config: CoreConfig,
        store: Arc<dyn RecordStore>,
        value_store: Arc<dyn FieldValueStore>,
        setup: F,
    ) -> Self
    where
        F: FnOnce(&Hooks),
    {
        let hooks = Arc::new(Hooks::new(config.event_channel_capacity));
        setup(&hooks);

        let registries = if config.seed_defaults {
            Registries::with_defaults(hooks.clone())
        } else {
            Registries::new(hooks.clone())
        };
        let resolver = TypeResolver::new(Arc::new(registries), store.clone());

        let instances = |namespace| {
            InstanceService::new(namespace, resolver.clone(), store.clone(), hooks.clone())
                .with_value_store(value_store.clone())
                .with_strict_settings(config.strict_settings)
        };
        let fields = instances(Namespace::Field);
        let components = instances(Namespace::Component);
        let sections = instances(Namespace::Section);

        let type_configs = ConfigService::new(resolver.clone(), hooks.clone());
        let values = FieldValueService::new(value_store, fields.clone(), resolver.clone());

        tracing::info!(
            seed_defaults = config.seed_defaults,
            strict_settings = config.strict_settings,
            "spider boxes services ready"
        );

        Self {
            config,
            hooks,
            resolver,
            fields,
            components,
            sections,
            type_configs,
            values,
        }
    }

    /// Everything in memory, for the stdio server and tests
    pub fn in_memory(config: CoreConfig) -> Self {
        Self::new(
            config,
            Arc::new(InMemoryStore::new()),
            Arc::new(InMemoryValueStore::new()),
        )
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    pub fn hooks(&self) -> &Arc<Hooks> {
        &self.hooks
    }

    pub fn registries(&self) -> &Arc<Registries> {
        self.resolver.registries()
    }

    pub fn resolver(&self) -> &TypeResolver {
        &self.resolver
    }

    pub fn instances(&self, namespace: Namespace) -> &InstanceService {
        match namespace {
            Namespace::Field => &self.fields,
            Namespace::Component => &self.components,
            Namespace::Section => &self.sections,
        }
    }

    pub fn type_configs(&self) -> &ConfigService {
        &self.type_configs
    }

    pub fn values(&self) -> &FieldValueService {
        &self.values
    }
}
