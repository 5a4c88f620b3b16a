//! Topic-based event bus implementation.

use std::collections::HashMap;
use std::sync::Arc;

use gas_core::WorldEvent;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use super::types::{CuePresentationEvent, FrameEvent};

/// Topics for event routing
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum Topic {
    /// Actor spawn and despawn
    Actor,
    /// Ability activation and end
    Ability,
    /// Effect execution, application and removal, plus tag changes
    Effect,
    /// Tag-addressed gameplay events (death, level-up, ...)
    Gameplay,
    /// Cue notifications and their presentation
    Cue,
    /// Frame boundaries
    Frame,
}

const TOPIC_COUNT: usize = 6;

impl Topic {
    pub const ALL: [Topic; TOPIC_COUNT] = [
        Topic::Actor,
        Topic::Ability,
        Topic::Effect,
        Topic::Gameplay,
        Topic::Cue,
        Topic::Frame,
    ];

    const fn index(self) -> usize {
        match self {
            Topic::Actor => 0,
            Topic::Ability => 1,
            Topic::Effect => 2,
            Topic::Gameplay => 3,
            Topic::Cue => 4,
            Topic::Frame => 5,
        }
    }
}

/// Event wrapper that carries the topic and typed event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// Journal entry drained from the world after a command.
    World { frame: u64, event: WorldEvent },
    Frame(FrameEvent),
    CuePresentation(CuePresentationEvent),
}

impl Event {
    pub fn topic(&self) -> Topic {
        match self {
            Event::World { event, .. } => match event {
                WorldEvent::ActorSpawned { .. } | WorldEvent::ActorDespawned { .. } => Topic::Actor,
                WorldEvent::AbilityActivated { .. } | WorldEvent::AbilityEnded { .. } => Topic::Ability,
                WorldEvent::EffectExecuted { .. }
                | WorldEvent::EffectApplied { .. }
                | WorldEvent::EffectRemoved { .. }
                | WorldEvent::TagAdded { .. }
                | WorldEvent::TagRemoved { .. } => Topic::Effect,
                WorldEvent::Gameplay(_) => Topic::Gameplay,
                WorldEvent::Cue(_) => Topic::Cue,
            },
            Event::Frame(_) => Topic::Frame,
            Event::CuePresentation(_) => Topic::Cue,
        }
    }
}

/// Topic-based event bus
///
/// Allows consumers to subscribe to specific topics and only receive
/// events they care about. Channels for every topic exist from construction.
#[derive(Clone)]
pub struct EventBus {
    channels: Arc<[broadcast::Sender<Event>; TOPIC_COUNT]>,
}

impl EventBus {
    /// Creates a new event bus with default capacity for each topic
    pub fn new() -> Self {
        Self::with_capacity(256)
    }

    /// Creates a new event bus with specified capacity per topic
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            channels: Arc::new(Topic::ALL.map(|_| broadcast::channel(capacity).0)),
        }
    }

    /// Publish an event to its corresponding topic
    pub fn publish(&self, event: Event) {
        let topic = event.topic();
        if self.channels[topic.index()].send(event).is_err() {
            // No subscribers for this topic - this is normal, not an error
            tracing::trace!("No subscribers for topic {:?}", topic);
        }
    }

    /// Subscribe to a specific topic
    ///
    /// Returns a receiver that will only receive events for that topic.
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.channels[topic.index()].subscribe()
    }

    /// Subscribe to multiple topics
    ///
    /// Returns receivers for each requested topic.
    pub fn subscribe_multiple(&self, topics: &[Topic]) -> HashMap<Topic, broadcast::Receiver<Event>> {
        topics.iter().map(|&topic| (topic, self.subscribe(topic))).collect()
    }

    /// Number of live receivers on `topic`.
    pub fn subscriber_count(&self, topic: Topic) -> usize {
        self.channels[topic.index()].receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use gas_core::ActorId;

    use super::*;

    #[tokio::test]
    async fn events_only_reach_their_topic() {
        let bus = EventBus::with_capacity(8);
        let mut actors = bus.subscribe(Topic::Actor);
        let mut frames = bus.subscribe(Topic::Frame);

        bus.publish(Event::World {
            frame: 0,
            event: WorldEvent::ActorSpawned { actor: ActorId(1) },
        });

        assert!(matches!(
            actors.recv().await,
            Ok(Event::World {
                event: WorldEvent::ActorSpawned { .. },
                ..
            })
        ));
        assert!(frames.try_recv().is_err());
    }

    #[test]
    fn publishing_without_subscribers_is_fine() {
        let bus = EventBus::new();
        bus.publish(Event::Frame(FrameEvent { frame: 1, delta: 0.1 }));
        assert_eq!(bus.subscriber_count(Topic::Frame), 0);
    }
}
