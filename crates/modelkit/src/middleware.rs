//! Model middleware
//!
//! There are two kinds of middleware:
//!
//! - *getter/setter middleware* (`get:<attr>`, `set:<attr>`) transforms an
//!   attribute value synchronously on its way out of or into the model;
//! - *persist middleware* (`create`, `update`, `delete`) runs asynchronously
//!   when a model is persisted and may fail, which stops the chain.
//!
//! Every chain runs in registration order, each step seeing the result of
//! the previous one.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::ModelError;
use crate::middleware_error::MiddlewareResult;
use crate::model::Model;

/// Type alias for boxed future returned by persist middleware
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Synchronous value transform used by getter/setter middleware
pub type ValueMiddleware = Arc<dyn Fn(Value) -> Value + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PersistAction {
    Create,
    Update,
    Delete,
}

impl PersistAction {
    pub const ALL: [PersistAction; 3] = [
        PersistAction::Create,
        PersistAction::Update,
        PersistAction::Delete,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PersistAction::Create => "create",
            PersistAction::Update => "update",
            PersistAction::Delete => "delete",
        }
    }

    /// Event fired before the middleware chain runs
    pub fn before_event(&self) -> &'static str {
        match self {
            PersistAction::Create => "before-create",
            PersistAction::Update => "before-update",
            PersistAction::Delete => "before-delete",
        }
    }

    /// Create and update are saves; delete is not
    pub fn is_save(&self) -> bool {
        !matches!(self, PersistAction::Delete)
    }
}

impl fmt::Display for PersistAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parsed middleware name as accepted by `ModelType::use_middleware`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MiddlewareName {
    Get(String),
    Set(String),
    Persist(PersistAction),
}

impl FromStr for MiddlewareName {
    type Err = ModelError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let attribute = |attr: &str| {
            if attr.is_empty() {
                Err(ModelError::Configuration(format!(
                    "middleware name '{}' is missing an attribute",
                    name
                )))
            } else {
                Ok(attr.to_string())
            }
        };

        if let Some(attr) = name.strip_prefix("get:") {
            return Ok(MiddlewareName::Get(attribute(attr)?));
        }
        if let Some(attr) = name.strip_prefix("set:") {
            return Ok(MiddlewareName::Set(attribute(attr)?));
        }

        PersistAction::ALL
            .into_iter()
            .find(|action| action.as_str() == name)
            .map(MiddlewareName::Persist)
            .ok_or_else(|| ModelError::Configuration(format!("unknown middleware name '{}'", name)))
    }
}

/// A persistence step run when a model is created, updated or deleted
#[async_trait]
pub trait PersistMiddleware: Send + Sync {
    async fn handle(&self, model: &mut Model) -> MiddlewareResult;

    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

#[async_trait]
impl<F> PersistMiddleware for F
where
    F: for<'a> Fn(&'a mut Model) -> BoxFuture<'a, MiddlewareResult> + Send + Sync,
{
    async fn handle(&self, model: &mut Model) -> MiddlewareResult {
        (self)(model).await
    }
}

/// Middleware function registered under a `MiddlewareName`
#[derive(Clone)]
pub enum Middleware {
    Value(ValueMiddleware),
    Persist(Arc<dyn PersistMiddleware>),
}

impl Middleware {
    pub fn value<F>(transform: F) -> Self
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        Middleware::Value(Arc::new(transform))
    }

    pub fn persist<M: PersistMiddleware + 'static>(middleware: M) -> Self {
        Middleware::Persist(Arc::new(middleware))
    }
}

impl fmt::Debug for Middleware {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Middleware::Value(_) => f.write_str("Middleware::Value"),
            Middleware::Persist(m) => write!(f, "Middleware::Persist({})", m.name()),
        }
    }
}

/// Ordered getter/setter transforms keyed by attribute name
#[derive(Clone, Default)]
pub struct ValueChain {
    steps: Vec<(String, ValueMiddleware)>,
}

impl ValueChain {
    pub fn push(&mut self, attribute: &str, transform: ValueMiddleware) {
        self.steps.push((attribute.to_string(), transform));
    }

    /// Run `value` through every transform registered for `attribute`
    pub fn apply(&self, attribute: &str, value: Value) -> Value {
        self.steps
            .iter()
            .filter(|(name, _)| name == attribute)
            .fold(value, |value, (_, transform)| transform(value))
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Ordered persist middleware for each persist action
#[derive(Clone, Default)]
pub struct PersistChains {
    create: Vec<Arc<dyn PersistMiddleware>>,
    update: Vec<Arc<dyn PersistMiddleware>>,
    delete: Vec<Arc<dyn PersistMiddleware>>,
}

impl PersistChains {
    fn chain_mut(&mut self, action: PersistAction) -> &mut Vec<Arc<dyn PersistMiddleware>> {
        match action {
            PersistAction::Create => &mut self.create,
            PersistAction::Update => &mut self.update,
            PersistAction::Delete => &mut self.delete,
        }
    }

    pub fn push(&mut self, action: PersistAction, middleware: Arc<dyn PersistMiddleware>) {
        self.chain_mut(action).push(middleware);
    }

    pub fn chain(&self, action: PersistAction) -> &[Arc<dyn PersistMiddleware>] {
        match action {
            PersistAction::Create => &self.create,
            PersistAction::Update => &self.update,
            PersistAction::Delete => &self.delete,
        }
    }

    /// Middleware names for debugging
    pub fn names(&self, action: PersistAction) -> Vec<&'static str> {
        self.chain(action).iter().map(|m| m.name()).collect()
    }
}
