use serde::{Serialize, Serializer};
use serde_json::Value;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;
use tracing::trace;

use crate::events::INITIALIZE;
use crate::model::{ModelType, Record};

/// An instance of a `ModelType`
#[derive(Clone)]
pub struct Model {
    pub(crate) model_type: Arc<ModelType>,
    pub(crate) attributes: Record,
    pub(crate) changed: BTreeSet<String>,
}

impl Model {
    /// Create an instance with the type's default attributes and fire
    /// `initialize`
    pub fn new(model_type: &Arc<ModelType>) -> Self {
        let mut model = Self {
            model_type: model_type.clone(),
            attributes: model_type.defaults(),
            changed: BTreeSet::new(),
        };
        model.trigger(INITIALIZE);
        model
    }

    /// Create an instance and then set `attributes` on it; these count as
    /// changes since nothing has been saved yet
    pub fn with_attributes<I, K>(model_type: &Arc<ModelType>, attributes: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let mut model = Self::new(model_type);
        model.set_many(attributes);
        model
    }

    pub fn model_type(&self) -> &Arc<ModelType> {
        &self.model_type
    }

    /// Whether this model's type is `model_type` or derives from it
    pub fn is_instance_of(&self, model_type: &ModelType) -> bool {
        self.model_type.is_subtype_of(model_type)
    }

    pub fn trigger(&mut self, event: &str) -> &mut Self {
        self.trigger_with(event, &[])
    }

    /// Run every listener registered for `event`, passing `args` along
    pub fn trigger_with(&mut self, event: &str, args: &[Value]) -> &mut Self {
        let listeners = self.model_type.listeners_for(event);
        trace!(
            model = %self.model_type.name(),
            event,
            listeners = listeners.len(),
            "Triggering event"
        );

        for listener in listeners {
            listener(&mut *self, args);
        }
        self
    }

    /// The identity attribute's value, if the model has been created
    pub fn identity(&self) -> Option<&Value> {
        self.attributes
            .get(&self.model_type.config().identity_attribute)
            .filter(|value| !value.is_null())
    }

    pub fn is_created(&self) -> bool {
        self.identity().is_some()
    }

    /// Representation for clients: all attributes through getter middleware,
    /// with the identity attribute renamed to the public identity field
    pub fn to_json(&self) -> Record {
        let config = self.model_type.config();
        let mut attributes = self.get_all();

        if let Some(identity) = attributes.remove(&config.identity_attribute) {
            if !identity.is_null() {
                attributes.insert(config.public_identity.clone(), identity);
            }
        }
        attributes
    }

    /// Representation handed to the database layer: the raw attributes
    pub fn to_db(&self) -> Record {
        self.attributes.clone()
    }
}

impl Serialize for Model {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("type", &self.model_type.name())
            .field("attributes", &self.attributes)
            .field("changed", &self.changed)
            .finish()
    }
}
