//! Model attributes
//!
//! Attributes are read with `get`, `get_many` and `get_all`, each value passing
//! through the type's getter middleware. They are written with `set` and
//! `set_many`, passing through setter middleware first.
//!
//! A write only takes effect when the new value differs (deep equality) from
//! the stored one; it then marks the attribute changed and fires
//! `change:<name>` with the new value.

use serde_json::Value;
use tracing::trace;

use crate::events::change_event;
use crate::model::{Model, Record};

impl Model {
    /// Value of a single attribute, `None` if it is not set
    pub fn get(&self, name: &str) -> Option<Value> {
        let value = self.attributes.get(name)?.clone();
        Some(self.model_type.getters().apply(name, value))
    }

    /// Values of the named attributes; names that are not set are left out
    pub fn get_many<I, S>(&self, names: I) -> Record
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let getters = self.model_type.getters();
        names
            .into_iter()
            .filter_map(|name| {
                let name = name.as_ref();
                self.attributes
                    .get(name)
                    .map(|value| (name.to_string(), getters.apply(name, value.clone())))
            })
            .collect()
    }

    /// Values of every attribute
    pub fn get_all(&self) -> Record {
        let getters = self.model_type.getters();
        self.attributes
            .iter()
            .map(|(name, value)| (name.clone(), getters.apply(name, value.clone())))
            .collect()
    }

    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> &mut Self {
        let value = self.model_type.setters().apply(name, value.into());

        if let Some(current) = self.attributes.get(name) {
            if values_equal(current, &value) {
                return self;
            }
        }

        trace!(model = %self.model_type.name(), attribute = %name, "Attribute changed");
        self.attributes.insert(name.to_string(), value.clone());
        self.changed.insert(name.to_string());
        self.trigger_with(&change_event(name), &[value])
    }

    pub fn set_many<I, K>(&mut self, attributes: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        for (name, value) in attributes {
            let name = name.into();
            self.set(&name, value);
        }
        self
    }

    /// Whether any attribute changed since the model was created, saved or
    /// loaded
    pub fn is_changed(&self) -> bool {
        !self.changed.is_empty()
    }

    pub fn is_attribute_changed(&self, name: &str) -> bool {
        self.changed.contains(name)
    }

    /// Names of changed attributes in sorted order
    pub fn changed_attributes(&self) -> Vec<&str> {
        self.changed.iter().map(String::as_str).collect()
    }
}

/// Deep equality where numbers compare by value, so `1` equals `1.0`
fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            if let (Some(x), Some(y)) = (x.as_i64(), y.as_i64()) {
                x == y
            } else if let (Some(x), Some(y)) = (x.as_u64(), y.as_u64()) {
                x == y
            } else {
                x.as_f64() == y.as_f64()
            }
        }
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(x, y)| values_equal(x, y))
        }
        (Value::Object(x), Value::Object(y)) => {
            x.len() == y.len()
                && x.iter().all(|(key, x)| y.get(key).map_or(false, |y| values_equal(x, y)))
        }
        _ => a == b,
    }
}
