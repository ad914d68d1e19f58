//! Persistence adapters
//!
//! An adapter performs the actual durable storage for a model type. It is
//! plugged into a type with `ModelType::use_adapter`, which appends one
//! persist middleware per action that forwards to the adapter.

pub mod memory;

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use crate::middleware::{PersistAction, PersistMiddleware};
use crate::middleware_error::{MiddlewareError, MiddlewareResult};
use crate::model::{Model, Record};

#[async_trait]
pub trait PersistenceAdapter: Send + Sync {
    /// Store a new record and return the identity assigned to it
    async fn create(&self, record: Record) -> MiddlewareResult<Value>;

    async fn update(&self, identity: &Value, record: Record) -> MiddlewareResult;

    async fn delete(&self, identity: &Value) -> MiddlewareResult;
}

/// Persist middleware forwarding one action to an adapter
pub struct AdapterMiddleware {
    adapter: Arc<dyn PersistenceAdapter>,
    action: PersistAction,
}

impl AdapterMiddleware {
    pub fn new(adapter: Arc<dyn PersistenceAdapter>, action: PersistAction) -> Self {
        Self { adapter, action }
    }
}

#[async_trait]
impl PersistMiddleware for AdapterMiddleware {
    async fn handle(&self, model: &mut Model) -> MiddlewareResult {
        match self.action {
            PersistAction::Create => {
                let identity = self.adapter.create(model.to_db()).await?;
                if identity.is_null() {
                    return Err(MiddlewareError::failed("adapter returned a null identity"));
                }
                model.set_identity(identity);
            }
            PersistAction::Update => {
                let identity = required_identity(model)?;
                self.adapter.update(&identity, model.to_db()).await?;
            }
            PersistAction::Delete => {
                let identity = required_identity(model)?;
                self.adapter.delete(&identity).await?;
            }
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "adapter"
    }
}

fn required_identity(model: &Model) -> MiddlewareResult<Value> {
    model
        .identity()
        .cloned()
        .ok_or(MiddlewareError::MissingIdentity)
}
