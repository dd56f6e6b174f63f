//! Topic-based event bus implementation.

use tokio::sync::broadcast;

use super::types::{DefenseEvent, EmergencyEvent};

/// Topics for event routing
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq)]
pub enum Topic {
    /// Reactions and soul handling
    Defense,
    /// Emergency watcher alerts
    Emergency,
}

/// Event wrapper that carries the topic and typed event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Defense(DefenseEvent),
    Emergency(EmergencyEvent),
}

impl Event {
    pub fn topic(&self) -> Topic {
        match self {
            Event::Defense(_) => Topic::Defense,
            Event::Emergency(_) => Topic::Emergency,
        }
    }
}

/// One broadcast channel per topic, fixed at construction.
#[derive(Clone, Debug)]
pub struct EventBus {
    defense: broadcast::Sender<Event>,
    emergency: broadcast::Sender<Event>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_capacity(100)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            defense: broadcast::channel(capacity).0,
            emergency: broadcast::channel(capacity).0,
        }
    }

    /// Publish an event to its corresponding topic
    pub fn publish(&self, event: Event) {
        let topic = event.topic();
        if self.sender(topic).send(event).is_err() {
            // No subscribers for this topic - this is normal, not an error
            tracing::trace!("No subscribers for topic {:?}", topic);
        }
    }

    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.sender(topic).subscribe()
    }

    fn sender(&self, topic: Topic) -> &broadcast::Sender<Event> {
        match topic {
            Topic::Defense => &self.defense,
            Topic::Emergency => &self.emergency,
        }
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
    async fn routes_events_by_topic() {
        let bus = EventBus::with_capacity(4);
        let mut defense = bus.subscribe(Topic::Defense);
        let mut emergency = bus.subscribe(Topic::Emergency);

        let spike = Event::Emergency(EmergencyEvent::DamageSpike { hp_percent: 40 });
        bus.publish(spike.clone());

        assert_eq!(emergency.recv().await.unwrap(), spike);
        assert!(defense.try_recv().is_err());
    }

    #[test]
    fn publishing_without_subscribers_is_fine() {
        let bus = EventBus::new();
        bus.publish(Event::Emergency(EmergencyEvent::DamageSpike { hp_percent: 10 }));
    }
}
