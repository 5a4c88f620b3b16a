//! Target acquisition.
//!
//! A [`TargetActor`] is a strategy that turns the caster's avatar and the
//! avatars around it into a [`TargetData`] payload. The world wraps each
//! strategy in a [`TargetingSession`], which guarantees that a session
//! yields at most one outcome and that nothing comes out of it after
//! cancellation or destruction.
//!
//! Strategies see the world only through [`TargetingSpace`]: avatar
//! positions and the owned tags of actors that have an ability system.

mod session;
mod strategies;

pub use session::{SessionState, TargetingSession};
pub use strategies::{ConeTraceTargetActor, GroundSelectTargetActor, LineTraceTargetActor, SphereOverlapTargetActor};

use core::fmt;

use vek::Vec3;

use crate::actor::{ActorId, Avatar};
use crate::tags::{GameplayTagContainer, GameplayTagCountContainer, TagSource};

/// Immutable targeting result, moved into the ability callback that consumes it.
#[derive(Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TargetData {
    /// A point, optionally on an actor.
    SingleTargetHit {
        hit_point: Vec3<f32>,
        actor: Option<ActorId>,
    },
    /// Every actor caught by an area query, nearest first.
    MultiTarget { actors: Vec<ActorId> },
}

impl TargetData {
    pub fn actors(&self) -> Vec<ActorId> {
        match self {
            Self::SingleTargetHit { actor, .. } => actor.iter().copied().collect(),
            Self::MultiTarget { actors } => actors.clone(),
        }
    }

    pub fn hit_point(&self) -> Option<Vec3<f32>> {
        match self {
            Self::SingleTargetHit { hit_point, .. } => Some(*hit_point),
            Self::MultiTarget { .. } => None,
        }
    }
}

/// Exactly one of these ends a session.
#[derive(Debug, PartialEq)]
pub enum TargetingOutcome {
    Ready(TargetData),
    Cancelled,
}

/// Read-only view of the world used by targeting strategies.
pub trait TargetingSpace {
    fn avatar(&self, actor: ActorId) -> Option<&Avatar>;

    /// Every actor with an avatar, in id order.
    fn avatars(&self) -> Box<dyn Iterator<Item = (ActorId, &Avatar)> + '_>;

    /// Owned tags of `actor`; `None` when it has no ability system.
    fn owned_tags(&self, actor: ActorId) -> Option<&GameplayTagCountContainer>;
}

/// Filter applied to every candidate.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TargetingQuery {
    pub ignore_caster: bool,
    pub required_tags: GameplayTagContainer,
    pub forbidden_tags: GameplayTagContainer,
}

impl Default for TargetingQuery {
    fn default() -> Self {
        Self {
            ignore_caster: true,
            required_tags: GameplayTagContainer::new(),
            forbidden_tags: GameplayTagContainer::new(),
        }
    }
}

impl TargetingQuery {
    #[must_use]
    pub fn with_required(mut self, tags: GameplayTagContainer) -> Self {
        self.required_tags = tags;
        self
    }

    #[must_use]
    pub fn with_forbidden(mut self, tags: GameplayTagContainer) -> Self {
        self.forbidden_tags = tags;
        self
    }

    #[must_use]
    pub fn including_caster(mut self) -> Self {
        self.ignore_caster = false;
        self
    }

    /// Actors without an ability system are never valid targets.
    pub fn is_valid_target(&self, caster: ActorId, candidate: ActorId, space: &dyn TargetingSpace) -> bool {
        if self.ignore_caster && candidate == caster {
            return false;
        }
        let Some(tags) = space.owned_tags(candidate) else {
            return false;
        };
        let has_required = tags.has_all(&self.required_tags);
        let has_forbidden = tags.has_any(&self.forbidden_tags);
        has_required && !has_forbidden
    }
}

/// Target acquisition strategy.
///
/// `start_targeting` returns `Some` when the strategy resolves immediately
/// (traces, overlaps) and `None` when it waits for player input (ground
/// selection), in which case the outcome comes from `confirm_targeting`.
pub trait TargetActor: fmt::Debug + Send {
    fn configure(&mut self, caster: ActorId);

    fn start_targeting(&mut self, space: &dyn TargetingSpace) -> Option<TargetingOutcome>;

    fn confirm_targeting(&mut self, _space: &dyn TargetingSpace) -> Option<TargetingOutcome> {
        None
    }

    fn cancel_targeting(&mut self) {}

    /// Player aim update for strategies that wait on input.
    fn set_aim_point(&mut self, _point: Vec3<f32>) {}

    fn destroy(&mut self) {}
}

#[cfg(test)]
pub(crate) mod test_space {
    use std::collections::BTreeMap;

    use super::*;

    /// Flat map of avatars and tag sets for strategy tests.
    #[derive(Default)]
    pub(crate) struct FlatSpace {
        pub(crate) avatars: BTreeMap<ActorId, Avatar>,
        pub(crate) tags: BTreeMap<ActorId, GameplayTagCountContainer>,
    }

    impl FlatSpace {
        pub(crate) fn with_actor(mut self, id: u32, avatar: Avatar) -> Self {
            self.avatars.insert(ActorId(id), avatar);
            self.tags.insert(ActorId(id), GameplayTagCountContainer::new());
            self
        }

        /// Avatar with no ability system attached.
        pub(crate) fn with_prop(mut self, id: u32, avatar: Avatar) -> Self {
            self.avatars.insert(ActorId(id), avatar);
            self
        }
    }

    impl TargetingSpace for FlatSpace {
        fn avatar(&self, actor: ActorId) -> Option<&Avatar> {
            self.avatars.get(&actor)
        }

        fn avatars(&self) -> Box<dyn Iterator<Item = (ActorId, &Avatar)> + '_> {
            Box::new(self.avatars.iter().map(|(id, avatar)| (*id, avatar)))
        }

        fn owned_tags(&self, actor: ActorId) -> Option<&GameplayTagCountContainer> {
            self.tags.get(&actor)
        }
    }
}
