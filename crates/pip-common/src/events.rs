use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::badge::BadgeKind;
use crate::types::TabId;

/// Things the coordinator tells observers about.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum Event {
    OwnerChanged {
        previous: Option<TabId>,
        current: Option<TabId>,
    },
    HintChanged(Option<TabId>),
    ActivationFailed {
        tab: TabId,
        reason: String,
    },
    BadgeShown(BadgeKind),
    BadgeCleared,
    Shutdown,
    #[serde(other)]
    Unknown,
}

pub struct EventBus {
    sender: broadcast::Sender<Event>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.sender.subscribe()
    }

    pub fn publish(&self, event: Event) -> usize {
        self.sender.send(event).unwrap_or(0)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publish_and_receive() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();

        bus.publish(Event::OwnerChanged {
            previous: None,
            current: Some(TabId(4)),
        });

        let event = rx.recv().await.unwrap();
        assert_eq!(
            event,
            Event::OwnerChanged {
                previous: None,
                current: Some(TabId(4)),
            }
        );
    }

    #[tokio::test]
    async fn multiple_subscribers() {
        let bus = EventBus::new(16);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.publish(Event::Shutdown);

        assert!(matches!(rx1.recv().await.unwrap(), Event::Shutdown));
        assert!(matches!(rx2.recv().await.unwrap(), Event::Shutdown));
    }

    #[tokio::test]
    async fn events_arrive_in_order() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();

        bus.publish(Event::HintChanged(Some(TabId(2))));
        bus.publish(Event::BadgeShown(BadgeKind::GestureNeeded));
        bus.publish(Event::BadgeCleared);

        assert!(matches!(rx.recv().await.unwrap(), Event::HintChanged(Some(TabId(2)))));
        assert!(matches!(
            rx.recv().await.unwrap(),
            Event::BadgeShown(BadgeKind::GestureNeeded)
        ));
        assert!(matches!(rx.recv().await.unwrap(), Event::BadgeCleared));
    }

    #[test]
    fn publish_returns_zero_with_no_subscribers() {
        let bus = EventBus::new(16);
        assert_eq!(bus.publish(Event::Shutdown), 0);
    }

    #[test]
    fn unknown_event_deserializes() {
        let json = r#"{"type":"SomethingNewer","data":null}"#;
        let event: Event = serde_json::from_str(json).unwrap();
        assert!(matches!(event, Event::Unknown));
    }
}
