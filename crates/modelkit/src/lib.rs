//! # modelkit: base model abstraction
//!
//! Models hold named attributes, track which of them changed since the last
//! load or save, publish lifecycle events, and hand persistence off to
//! middleware or a pluggable adapter.
//!
//! A model type is assembled explicitly: start from [`ModelType::base`],
//! derive with [`ModelType::extend`], then register listeners
//! ([`ModelType::on`]) and middleware ([`ModelType::use_middleware`]).
//!
//! ```
//! use modelkit::{Model, ModelType};
//! use serde_json::json;
//!
//! let users = ModelType::base().extend("user");
//! users.use_setter("email", |v| match v {
//!     serde_json::Value::String(s) => json!(s.to_lowercase()),
//!     other => other,
//! });
//!
//! let user = Model::with_attributes(&users, [("email", json!("Ann@Example.COM"))]);
//! assert_eq!(user.get("email"), Some(json!("ann@example.com")));
//! assert!(user.is_changed());
//! ```

pub mod adapter;
pub mod config;
pub mod error;
pub mod events;
pub mod middleware;
pub mod middleware_error;
pub mod model;

pub use adapter::{memory::MemoryAdapter, PersistenceAdapter};
pub use config::ModelConfig;
pub use error::{ModelError, ModelResult};
pub use events::{EventChain, Listener};
pub use middleware::{
    BoxFuture, Middleware, MiddlewareName, PersistAction, PersistMiddleware, ValueMiddleware,
};
pub use middleware_error::{MiddlewareError, MiddlewareResult};
pub use model::{Model, ModelType, PersistFuture, Record, TypeRegistry, Validator};
