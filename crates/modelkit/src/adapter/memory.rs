//! In-memory persistence adapter
//!
//! Keeps records in a concurrent map keyed by a generated UUID. Clones share
//! the same storage, so a test can keep a handle after registering the
//! adapter on a model type.

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use super::PersistenceAdapter;
use crate::middleware_error::{MiddlewareError, MiddlewareResult};
use crate::model::Record;

#[derive(Debug, Clone, Default)]
pub struct MemoryAdapter {
    records: Arc<DashMap<String, Record>>,
}

impl MemoryAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, identity: &str) -> Option<Record> {
        self.records.get(identity).map(|entry| entry.value().clone())
    }

    pub fn contains(&self, identity: &str) -> bool {
        self.records.contains_key(identity)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn key(identity: &Value) -> String {
    match identity {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[async_trait]
impl PersistenceAdapter for MemoryAdapter {
    async fn create(&self, record: Record) -> MiddlewareResult<Value> {
        let identity = Uuid::new_v4().to_string();
        self.records.insert(identity.clone(), record);
        debug!(identity = %identity, records = self.records.len(), "Stored record");
        Ok(Value::String(identity))
    }

    async fn update(&self, identity: &Value, record: Record) -> MiddlewareResult {
        let key = key(identity);
        match self.records.get_mut(&key) {
            Some(mut entry) => {
                *entry = record;
                Ok(())
            }
            None => Err(MiddlewareError::NotFound(key)),
        }
    }

    async fn delete(&self, identity: &Value) -> MiddlewareResult {
        let key = key(identity);
        self.records
            .remove(&key)
            .map(|_| ())
            .ok_or(MiddlewareError::NotFound(key))
    }
}
