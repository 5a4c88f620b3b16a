//! Gameplay events and the world journal.
//!
//! Two channels leave the simulation core:
//! - [`GameplayEventData`]: tag-addressed gameplay events (death, experience
//!   gain) queued by hooks and abilities. The world delivers them to
//!   registered [`GameplayEventObserver`]s in FIFO order after each top-level
//!   operation, so reactions never interleave with an application in progress.
//! - [`WorldEvent`]: an append-only journal describing what happened, drained
//!   by the runtime and published to subscribers.

use core::fmt;

use crate::actor::ActorId;
use crate::cue::GameplayCueNotify;
use crate::effect::ActiveEffectHandle;
use crate::tags::GameplayTag;
use crate::world::GameplayWorld;

/// Payload of a tag-addressed gameplay event.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GameplayEventData {
    pub tag: GameplayTag,
    /// Actor the event is about (e.g. the one that died).
    pub target: ActorId,
    /// Actor that caused it (e.g. the killer).
    pub instigator: Option<ActorId>,
    pub magnitude: f32,
}

impl GameplayEventData {
    pub fn new(tag: GameplayTag, target: ActorId) -> Self {
        Self {
            tag,
            target,
            instigator: None,
            magnitude: 0.0,
        }
    }

    #[must_use]
    pub fn with_instigator(mut self, instigator: Option<ActorId>) -> Self {
        self.instigator = instigator;
        self
    }

    #[must_use]
    pub fn with_magnitude(mut self, magnitude: f32) -> Self {
        self.magnitude = magnitude;
        self
    }
}

/// Reacts to gameplay events whose tag matches the registration tag.
///
/// Observers get full mutable access to the world. Anything they apply
/// (effects, new events) is processed within the same flush.
pub trait GameplayEventObserver: fmt::Debug + Send {
    fn on_gameplay_event(&self, world: &mut GameplayWorld, event: &GameplayEventData);
}

/// Journal entry describing a state change in the world.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WorldEvent {
    ActorSpawned {
        actor: ActorId,
    },
    ActorDespawned {
        actor: ActorId,
    },
    AbilityActivated {
        actor: ActorId,
        ability: String,
    },
    AbilityEnded {
        actor: ActorId,
        ability: String,
        was_cancelled: bool,
    },
    EffectExecuted {
        target: ActorId,
        effect: String,
    },
    EffectApplied {
        target: ActorId,
        effect: String,
        handle: ActiveEffectHandle,
        stack_count: u32,
    },
    EffectRemoved {
        target: ActorId,
        effect: String,
        handle: ActiveEffectHandle,
    },
    TagAdded {
        actor: ActorId,
        tag: GameplayTag,
    },
    TagRemoved {
        actor: ActorId,
        tag: GameplayTag,
    },
    Gameplay(GameplayEventData),
    Cue(GameplayCueNotify),
}

impl WorldEvent {
    /// Actor primarily affected by this event.
    pub fn actor(&self) -> ActorId {
        match self {
            Self::ActorSpawned { actor }
            | Self::ActorDespawned { actor }
            | Self::AbilityActivated { actor, .. }
            | Self::AbilityEnded { actor, .. }
            | Self::TagAdded { actor, .. }
            | Self::TagRemoved { actor, .. } => *actor,
            Self::EffectExecuted { target, .. }
            | Self::EffectApplied { target, .. }
            | Self::EffectRemoved { target, .. } => *target,
            Self::Gameplay(event) => event.target,
            Self::Cue(notify) => notify.params.target,
        }
    }
}
