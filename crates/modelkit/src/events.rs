//! Model events
//!
//! Listeners are kept in an ordered chain per model type. Triggering an event
//! runs every listener registered under that exact name, in registration
//! order. Events nobody listens to are a no-op.

use serde_json::Value;
use std::sync::Arc;

use crate::model::Model;

pub const INITIALIZE: &str = "initialize";
pub const LOAD: &str = "load";
pub const SAVE: &str = "save";
pub const BEFORE_SAVE: &str = "before-save";

/// Name of the event fired when `attribute` changes
pub fn change_event(attribute: &str) -> String {
    format!("change:{}", attribute)
}

/// Event listener; receives the triggering model and the trigger arguments
pub type Listener = Arc<dyn Fn(&mut Model, &[Value]) + Send + Sync>;

#[derive(Clone, Default)]
pub struct EventChain {
    listeners: Vec<(String, Listener)>,
}

impl EventChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `listener` under each name of the whitespace-separated
    /// `events` list. Returns how many names were registered.
    pub fn add(&mut self, events: &str, listener: Listener) -> usize {
        let mut added = 0;
        for event in events.split_whitespace() {
            self.listeners.push((event.to_string(), listener.clone()));
            added += 1;
        }
        added
    }

    /// Listeners for `event` in registration order
    pub fn listeners_for(&self, event: &str) -> Vec<Listener> {
        self.listeners
            .iter()
            .filter(|(name, _)| name == event)
            .map(|(_, listener)| listener.clone())
            .collect()
    }

    pub fn has_listeners(&self, event: &str) -> bool {
        self.listeners.iter().any(|(name, _)| name == event)
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl std::fmt::Debug for EventChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.listeners.iter().map(|(name, _)| name))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop() -> Listener {
        Arc::new(|_: &mut Model, _: &[Value]| {})
    }

    #[test]
    fn test_whitespace_separated_registration() {
        let mut chain = EventChain::new();

        let added = chain.add("  save\tload \n create ", noop());

        assert_eq!(added, 3);
        assert_eq!(chain.len(), 3);
        assert!(chain.has_listeners("save"));
        assert!(chain.has_listeners("load"));
        assert!(chain.has_listeners("create"));
        assert!(!chain.has_listeners("save load"));
    }

    #[test]
    fn test_blank_event_list_registers_nothing() {
        let mut chain = EventChain::new();
        assert_eq!(chain.add("   ", noop()), 0);
        assert!(chain.is_empty());
    }

    #[test]
    fn test_listeners_for_keeps_registration_order() {
        let mut chain = EventChain::new();
        let first = noop();
        let second = noop();

        chain.add("test", first.clone());
        chain.add("other", noop());
        chain.add("test", second.clone());

        let listeners = chain.listeners_for("test");
        assert_eq!(listeners.len(), 2);
        assert!(Arc::ptr_eq(&listeners[0], &first));
        assert!(Arc::ptr_eq(&listeners[1], &second));
        assert!(chain.listeners_for("missing").is_empty());
    }

    #[test]
    fn test_change_event_name() {
        assert_eq!(change_event("email"), "change:email");
    }
}
