//! Model Persisting
//!
//! `create`, `update` and `delete` persist a model through the persist
//! middleware registered on its type; `save` picks create or update based on
//! whether the model has an identity yet.
//!
//! Every persist call is split in two. The synchronous part checks the
//! model's state, runs validation and fires the `before-*` events; any error
//! there is returned immediately and no middleware runs. It then hands back a
//! future that runs the middleware chain. A middleware error stops the chain
//! and is returned from the future, and no success events fire.
//!
//! ```text
//! create:  before-create, before-save -> middleware -> create, save
//! update:  before-update, before-save -> middleware -> update, save
//! delete:  before-delete              -> middleware -> delete
//! ```

use tracing::{debug, warn};

use crate::error::{ModelError, ModelResult};
use crate::events::{BEFORE_SAVE, LOAD, SAVE};
use crate::middleware::{BoxFuture, PersistAction};
use crate::model::{Model, Record};

/// Pending persist operation returned by `Model::create` and friends
pub type PersistFuture<'a> = BoxFuture<'a, ModelResult<()>>;

impl Model {
    pub fn create(&mut self) -> ModelResult<PersistFuture<'_>> {
        if self.is_created() {
            return Err(ModelError::AlreadyCreated);
        }

        self.validate()?;
        self.trigger(PersistAction::Create.before_event());
        self.trigger(BEFORE_SAVE);

        Ok(self.run_persist(PersistAction::Create))
    }

    pub fn update(&mut self) -> ModelResult<PersistFuture<'_>> {
        if !self.is_created() {
            return Err(ModelError::NotCreated {
                action: PersistAction::Update,
            });
        }

        self.validate()?;
        self.trigger(PersistAction::Update.before_event());
        self.trigger(BEFORE_SAVE);

        Ok(self.run_persist(PersistAction::Update))
    }

    pub fn delete(&mut self) -> ModelResult<PersistFuture<'_>> {
        if !self.is_created() {
            return Err(ModelError::NotCreated {
                action: PersistAction::Delete,
            });
        }

        self.trigger(PersistAction::Delete.before_event());

        Ok(self.run_persist(PersistAction::Delete))
    }

    pub fn save(&mut self) -> ModelResult<PersistFuture<'_>> {
        if self.is_created() {
            self.update()
        } else {
            self.create()
        }
    }

    /// Run the type's validation hook; succeeds when none is installed
    pub fn validate(&self) -> ModelResult<()> {
        match self.model_type.validator() {
            Some(validator) => validator(self).map_err(ModelError::Validation),
            None => Ok(()),
        }
    }

    /// Replace all attributes with values loaded from the database. Loaded
    /// values are not changes. Calling this again simply replaces them again.
    pub fn from_db(&mut self, attributes: Record) -> &mut Self {
        self.attributes = attributes;
        self.changed.clear();
        self.trigger(LOAD)
    }

    /// Assign the identity attribute, typically from create middleware
    pub fn set_identity(&mut self, identity: impl Into<serde_json::Value>) -> &mut Self {
        let name = self.model_type.config().identity_attribute.clone();
        self.set(&name, identity)
    }

    fn run_persist(&mut self, action: PersistAction) -> PersistFuture<'_> {
        Box::pin(async move {
            let chain = self.model_type.persist_chain(action);
            debug!(
                model = %self.model_type.name(),
                %action,
                steps = chain.len(),
                "Running persist middleware"
            );

            for (step, middleware) in chain.iter().enumerate() {
                if let Err(source) = middleware.handle(&mut *self).await {
                    warn!(
                        model = %self.model_type.name(),
                        %action,
                        step,
                        middleware = middleware.name(),
                        error = %source,
                        "Persist middleware failed"
                    );
                    return Err(ModelError::Middleware { action, source });
                }
            }

            self.trigger(action.as_str());
            if action.is_save() {
                self.changed.clear();
                self.trigger(SAVE);
            }

            debug!(model = %self.model_type.name(), %action, "Persist completed");
            Ok(())
        })
    }
}
