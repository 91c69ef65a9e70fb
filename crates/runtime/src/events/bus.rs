//! Topic-based event bus implementation.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::broadcast;

use ui_core::UiEvent;

/// Topics for event routing
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum Topic {
    /// Controller lifecycle (opened, shown, hidden, closed)
    Lifecycle,
    /// Hooks for collaborators (camera culling, pause, load delays)
    Notification,
}

impl Topic {
    pub fn of(event: &UiEvent) -> Self {
        match event {
            UiEvent::Lifecycle(_) => Topic::Lifecycle,
            UiEvent::Notification(_) => Topic::Notification,
        }
    }
}

/// Topic-based event bus
///
/// Allows consumers to subscribe to specific topics and only receive
/// events they care about. Publishing never blocks; slow subscribers lag.
#[derive(Clone)]
pub struct EventBus {
    lifecycle: broadcast::Sender<UiEvent>,
    notification: broadcast::Sender<UiEvent>,
}

impl EventBus {
    /// Creates a new event bus with default capacity for each topic
    pub fn new() -> Self {
        Self::with_capacity(100)
    }

    /// Creates a new event bus with specified capacity per topic
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            lifecycle: broadcast::channel(capacity).0,
            notification: broadcast::channel(capacity).0,
        }
    }

    fn sender(&self, topic: Topic) -> &broadcast::Sender<UiEvent> {
        match topic {
            Topic::Lifecycle => &self.lifecycle,
            Topic::Notification => &self.notification,
        }
    }

    /// Publish an event to its corresponding topic
    pub fn publish(&self, event: UiEvent) {
        let topic = Topic::of(&event);
        if self.sender(topic).send(event).is_err() {
            // No subscribers for this topic - this is normal, not an error
            tracing::trace!(target: "ui::events", ?topic, "no subscribers");
        }
    }

    /// Subscribe to a specific topic
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<UiEvent> {
        self.sender(topic).subscribe()
    }

    /// Subscribe to multiple topics
    pub fn subscribe_multiple(
        &self,
        topics: &[Topic],
    ) -> HashMap<Topic, broadcast::Receiver<UiEvent>> {
        topics
            .iter()
            .map(|&topic| (topic, self.subscribe(topic)))
            .collect()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use ui_core::{ControllerKey, InstanceId, LifecycleEvent, Notification};

    use super::*;

    #[tokio::test]
    async fn events_reach_only_their_topic() {
        let bus = EventBus::new();
        let mut lifecycle = bus.subscribe(Topic::Lifecycle);
        let mut notification = bus.subscribe(Topic::Notification);

        let opened: UiEvent = LifecycleEvent::Opened {
            key: ControllerKey::new("shop", InstanceId(0)),
            reopened: false,
        }
        .into();
        bus.publish(opened.clone());
        bus.publish(Notification::Pause { paused: true }.into());

        assert_eq!(lifecycle.recv().await.unwrap(), opened);
        assert!(lifecycle.try_recv().is_err());
        assert_eq!(
            notification.recv().await.unwrap(),
            UiEvent::from(Notification::Pause { paused: true })
        );
    }
}
