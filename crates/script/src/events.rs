//! Event Bus - Simple event system for page lifecycle and host activity
//!
//! Design: Type-safe events, use enums, not trait objects.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::host::ConsoleLevel;

/// Page events that can be dispatched
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageEvent {
    DomContentLoaded,
    DialogShown { message: String },
    ConsoleMessage { level: ConsoleLevel, message: String },
    NavigationRequested { url: String },
    ReloadRequested { url: String },
    DataLoaded { result: String },
    LoadFailed { error: String },
}

/// Simple event bus using tokio broadcast channel
///
/// Cloning shares the channel.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<PageEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1024);
        Self { tx }
    }

    /// Publish an event
    pub fn publish(&self, event: PageEvent) {
        let _ = self.tx.send(event); // Ignore error if no subscribers
    }

    /// Subscribe to events
    pub fn subscribe(&self) -> broadcast::Receiver<PageEvent> {
        self.tx.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_event_bus() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();

        bus.publish(PageEvent::DomContentLoaded);

        match rx.recv().await {
            Ok(PageEvent::DomContentLoaded) => {}
            other => panic!("Expected DomContentLoaded event, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_clones_share_channel() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();

        bus.clone().publish(PageEvent::DialogShown {
            message: "hi".to_string(),
        });

        assert_eq!(
            rx.recv().await.unwrap(),
            PageEvent::DialogShown {
                message: "hi".to_string()
            }
        );
    }
}
