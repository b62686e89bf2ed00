//! Listener registry - which actions run when a node receives an event
//!
//! Listeners are plain `Action` values, not closures: the registry holds
//! no borrows and the handler decides how to run each action.

use ahash::AHashMap;
use page_dom::NodeId;
use serde::{Deserialize, Serialize};

/// DOM event types the page script listens for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DomEventType {
    Click,
}

/// Script entry points a listener can invoke
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    RunDemoAction,
    ReadAndEchoInput,
    RestyleTitle,
    AppendDynamicSection,
    Notify(String),
    ToggleVisibility(String),
}

#[derive(Debug, Default)]
pub struct ListenerRegistry {
    listeners: AHashMap<(NodeId, DomEventType), Vec<Action>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// `addEventListener`: registering an identical listener twice is a no-op
    ///
    /// Returns whether the listener was added.
    pub fn add(&mut self, node: NodeId, event: DomEventType, action: Action) -> bool {
        let actions = self.listeners.entry((node, event)).or_default();
        if actions.contains(&action) {
            return false;
        }
        actions.push(action);
        true
    }

    /// `removeEventListener`
    pub fn remove(&mut self, node: NodeId, event: DomEventType, action: &Action) -> bool {
        let Some(actions) = self.listeners.get_mut(&(node, event)) else {
            return false;
        };
        let before = actions.len();
        actions.retain(|a| a != action);
        before != actions.len()
    }

    /// Listeners for a node and event, in registration order
    pub fn get(&self, node: NodeId, event: DomEventType) -> &[Action] {
        self.listeners
            .get(&(node, event))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Total listener count
    pub fn len(&self) -> usize {
        self.listeners.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_listener_is_ignored() {
        let mut registry = ListenerRegistry::new();
        assert!(registry.add(3, DomEventType::Click, Action::RestyleTitle));
        assert!(!registry.add(3, DomEventType::Click, Action::RestyleTitle));
        assert!(registry.add(3, DomEventType::Click, Action::Notify("hi".into())));

        assert_eq!(
            registry.get(3, DomEventType::Click),
            &[Action::RestyleTitle, Action::Notify("hi".into())]
        );
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_remove_listener() {
        let mut registry = ListenerRegistry::new();
        registry.add(1, DomEventType::Click, Action::AppendDynamicSection);

        assert!(registry.remove(1, DomEventType::Click, &Action::AppendDynamicSection));
        assert!(!registry.remove(1, DomEventType::Click, &Action::AppendDynamicSection));
        assert!(registry.get(1, DomEventType::Click).is_empty());
        assert!(registry.is_empty());
    }
}
