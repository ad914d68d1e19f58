//! Model System - model types and model instances
//!
//! - `definition`: `ModelType`, the per-type registry of listeners,
//!   middleware, defaults and validation, and type extension
//! - `instance`: `Model` construction, event triggering and serialization
//! - `attributes`: attribute access and change tracking
//! - `lifecycle`: create, update, delete, save and loading from the database

pub mod attributes;
pub mod definition;
pub mod instance;
pub mod lifecycle;

pub use definition::{ModelType, TypeRegistry, Validator};
pub use instance::Model;
pub use lifecycle::PersistFuture;

/// Attribute map held by a model
pub type Record = serde_json::Map<String, serde_json::Value>;
