//! Model types
//!
//! A `ModelType` owns the registration state shared by all of its instances:
//! event listeners, getter/setter middleware, persist middleware, default
//! attributes and the validation hook. Instances hold an `Arc` to their type,
//! so registrations made after an instance was created still apply to it.
//!
//! `ModelType::extend` derives a new type from a snapshot of the current
//! registry. Whatever was registered on the base before extending is
//! inherited; anything registered afterwards, on either type, stays local.

use serde_json::Value;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

use crate::adapter::{AdapterMiddleware, PersistenceAdapter};
use crate::config::ModelConfig;
use crate::error::{ModelError, ModelResult};
use crate::events::{EventChain, Listener};
use crate::middleware::{
    Middleware, MiddlewareName, PersistAction, PersistChains, PersistMiddleware, ValueChain,
};
use crate::model::{Model, Record};

/// Validation hook run before create and update
pub type Validator = Arc<dyn Fn(&Model) -> Result<(), String> + Send + Sync>;

/// Registration state of a model type, cloned when the type is extended
#[derive(Clone, Default)]
pub struct TypeRegistry {
    pub defaults: Record,
    pub validator: Option<Validator>,
    pub events: EventChain,
    pub getters: ValueChain,
    pub setters: ValueChain,
    pub persist: PersistChains,
}

pub struct ModelType {
    name: String,
    parent: Option<Arc<ModelType>>,
    config: ModelConfig,
    registry: RwLock<TypeRegistry>,
}

impl ModelType {
    /// A root model type with the default configuration
    pub fn base() -> Arc<Self> {
        Arc::new(Self {
            name: "model".to_string(),
            parent: None,
            config: ModelConfig::default(),
            registry: RwLock::new(TypeRegistry::default()),
        })
    }

    /// A root model type with a custom configuration
    pub fn with_config(name: &str, config: ModelConfig) -> ModelResult<Arc<Self>> {
        config.validate()?;
        Ok(Arc::new(Self {
            name: name.to_string(),
            parent: None,
            config,
            registry: RwLock::new(TypeRegistry::default()),
        }))
    }

    /// Derive a new type that starts from this type's current registrations
    pub fn extend(self: &Arc<Self>, name: &str) -> Arc<Self> {
        let registry = self.read().clone();
        debug!(
            base = %self.name,
            derived = %name,
            listeners = registry.events.len(),
            "Extending model type"
        );

        Arc::new(Self {
            name: name.to_string(),
            parent: Some(self.clone()),
            config: self.config.clone(),
            registry: RwLock::new(registry),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<&Arc<ModelType>> {
        self.parent.as_ref()
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// Whether this type is `other` or was derived from it
    pub fn is_subtype_of(&self, other: &ModelType) -> bool {
        let mut current = Some(self);
        while let Some(model_type) = current {
            if std::ptr::eq(model_type, other) {
                return true;
            }
            current = model_type.parent.as_deref();
        }
        false
    }

    /// Listen on the whitespace-separated list of `events`
    pub fn on<F>(&self, events: &str, listener: F) -> &Self
    where
        F: Fn(&mut Model, &[Value]) + Send + Sync + 'static,
    {
        let listener: Listener = Arc::new(listener);
        let added = self.write().events.add(events, listener);
        debug!(model = %self.name, events = %events.trim(), added, "Registered event listener");
        self
    }

    /// Register middleware by name: `get:<attr>`, `set:<attr>`, `create`,
    /// `update` or `delete`
    pub fn use_middleware(&self, name: &str, middleware: Middleware) -> ModelResult<&Self> {
        match (name.parse::<MiddlewareName>()?, middleware) {
            (MiddlewareName::Get(attribute), Middleware::Value(transform)) => {
                self.write().getters.push(&attribute, transform);
            }
            (MiddlewareName::Set(attribute), Middleware::Value(transform)) => {
                self.write().setters.push(&attribute, transform);
            }
            (MiddlewareName::Persist(action), Middleware::Persist(step)) => {
                self.write().persist.push(action, step);
            }
            (_, middleware) => {
                return Err(ModelError::Configuration(format!(
                    "{:?} cannot be registered as '{}' middleware",
                    middleware, name
                )));
            }
        }

        debug!(model = %self.name, middleware = %name, "Registered middleware");
        Ok(self)
    }

    /// Transform `attribute` every time it is read
    pub fn use_getter<F>(&self, attribute: &str, transform: F) -> &Self
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        self.write().getters.push(attribute, Arc::new(transform));
        self
    }

    /// Transform `attribute` every time it is written
    pub fn use_setter<F>(&self, attribute: &str, transform: F) -> &Self
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        self.write().setters.push(attribute, Arc::new(transform));
        self
    }

    pub fn use_persist<M>(&self, action: PersistAction, middleware: M) -> &Self
    where
        M: PersistMiddleware + 'static,
    {
        debug!(
            model = %self.name,
            %action,
            middleware = middleware.name(),
            "Registered persist middleware"
        );
        self.write().persist.push(action, Arc::new(middleware));
        self
    }

    /// Append create, update and delete middleware that delegate to `adapter`
    pub fn use_adapter<A>(&self, adapter: A) -> &Self
    where
        A: PersistenceAdapter + 'static,
    {
        let adapter: Arc<dyn PersistenceAdapter> = Arc::new(adapter);
        let mut registry = self.write();
        for action in PersistAction::ALL {
            registry
                .persist
                .push(action, Arc::new(AdapterMiddleware::new(adapter.clone(), action)));
        }
        debug!(model = %self.name, "Registered persistence adapter");
        self
    }

    /// Replace the validation hook run before create and update
    pub fn validate_with<F>(&self, validator: F) -> &Self
    where
        F: Fn(&Model) -> Result<(), String> + Send + Sync + 'static,
    {
        self.write().validator = Some(Arc::new(validator));
        self
    }

    /// Replace the attributes every new instance starts with
    pub fn with_defaults(&self, defaults: Record) -> &Self {
        self.write().defaults = defaults;
        self
    }

    /// Snapshot of the current registrations
    pub fn registry(&self) -> TypeRegistry {
        self.read().clone()
    }

    pub(crate) fn defaults(&self) -> Record {
        self.read().defaults.clone()
    }

    pub(crate) fn validator(&self) -> Option<Validator> {
        self.read().validator.clone()
    }

    pub(crate) fn listeners_for(&self, event: &str) -> Vec<Listener> {
        self.read().events.listeners_for(event)
    }

    pub(crate) fn getters(&self) -> ValueChain {
        self.read().getters.clone()
    }

    pub(crate) fn setters(&self) -> ValueChain {
        self.read().setters.clone()
    }

    pub(crate) fn persist_chain(&self, action: PersistAction) -> Vec<Arc<dyn PersistMiddleware>> {
        self.read().persist.chain(action).to_vec()
    }

    fn read(&self) -> RwLockReadGuard<'_, TypeRegistry> {
        self.registry.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, TypeRegistry> {
        self.registry.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let registry = self.read();
        let persist = PersistAction::ALL.map(|action| (action, registry.persist.names(action)));
        f.debug_struct("ModelType")
            .field("name", &self.name)
            .field("parent", &self.parent.as_ref().map(|p| p.name.as_str()))
            .field("config", &self.config)
            .field("events", &registry.events)
            .field("getters", &registry.getters.len())
            .field("setters", &registry.setters.len())
            .field("persist", &persist)
            .finish()
    }
}
