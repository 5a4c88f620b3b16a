//! Abilities: static configuration, instancing and the activation lifecycle.
//!
//! An ability is granted to a component as a template
//! ([`GameplayAbility`] trait object). Depending on its
//! [`InstancingPolicy`] the world runs the template itself, a per-actor
//! instance, or a pooled per-execution instance.
//!
//! Lifecycle: `Idle → Activating → Active → Ending → Idle`. An ability stays
//! `Active` while it waits on tasks (target data, delay, next frame) and ends
//! exactly once, whichever path (normal end, cancel, removal) gets there
//! first.

mod context;
mod pool;
mod spec;
mod task;

pub use context::AbilityContext;
pub use pool::AbilityPool;
pub use spec::{AbilitySpecHandle, ActivationState, GameplayAbilitySpec};
pub use task::{AbilityTaskHandle, AbilityTaskKind};

use core::fmt;
use std::sync::Arc;

use crate::component::AbilitySystemComponent;
use crate::effect::GameplayEffect;
use crate::tags::{GameplayTag, GameplayTagContainer};
use crate::targeting::TargetData;

/// How the world obtains the object that runs an activation.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, strum::Display, strum::EnumString, strum::EnumIter,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InstancingPolicy {
    /// The granted template runs every activation and holds no per-run state.
    NonInstanced,
    /// One instance per owner, created on first activation and kept.
    #[default]
    InstancedPerActor,
    /// A fresh (pooled) instance per activation, reset and returned on end.
    InstancedPerExecution,
}

/// Static, shared configuration of an ability kind.
#[derive(Clone, Debug, Default)]
pub struct AbilityConfig {
    pub name: String,
    pub instancing: InstancingPolicy,
    /// Instant effect paid on commit.
    pub cost: Option<Arc<GameplayEffect>>,
    /// Duration effect whose granted tags mark the cooldown.
    pub cooldown: Option<Arc<GameplayEffect>>,
    /// Tags describing this ability.
    pub ability_tags: GameplayTagContainer,
    /// Active abilities with matching ability tags are cancelled on activation.
    pub cancel_abilities_with_tag: GameplayTagContainer,
    /// Abilities with matching ability tags cannot activate while this one runs.
    pub block_abilities_with_tag: GameplayTagContainer,
    /// Granted to the owner while active.
    pub activation_owned_tags: GameplayTagContainer,
    pub activation_required_tags: GameplayTagContainer,
    pub activation_blocked_tags: GameplayTagContainer,
}

impl AbilityConfig {
    pub fn new(name: impl Into<String>, instancing: InstancingPolicy) -> Self {
        Self {
            name: name.into(),
            instancing,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_cost(mut self, cost: Arc<GameplayEffect>) -> Self {
        self.cost = Some(cost);
        self
    }

    #[must_use]
    pub fn with_cooldown(mut self, cooldown: Arc<GameplayEffect>) -> Self {
        self.cooldown = Some(cooldown);
        self
    }

    #[must_use]
    pub fn with_ability_tag(mut self, tag: GameplayTag) -> Self {
        self.ability_tags.add(tag);
        self
    }

    #[must_use]
    pub fn with_cancel_abilities_with_tag(mut self, tag: GameplayTag) -> Self {
        self.cancel_abilities_with_tag.add(tag);
        self
    }

    #[must_use]
    pub fn with_block_abilities_with_tag(mut self, tag: GameplayTag) -> Self {
        self.block_abilities_with_tag.add(tag);
        self
    }

    #[must_use]
    pub fn with_activation_owned_tag(mut self, tag: GameplayTag) -> Self {
        self.activation_owned_tags.add(tag);
        self
    }

    #[must_use]
    pub fn with_activation_required_tag(mut self, tag: GameplayTag) -> Self {
        self.activation_required_tags.add(tag);
        self
    }

    #[must_use]
    pub fn with_activation_blocked_tag(mut self, tag: GameplayTag) -> Self {
        self.activation_blocked_tags.add(tag);
        self
    }

    pub fn into_shared(self) -> Arc<Self> {
        Arc::new(self)
    }
}

/// Why an activation attempt was refused.
///
/// A refusal is ordinary gameplay (a stunned caster, a spell on cooldown),
/// not an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
pub enum ActivationFailure {
    NotGranted,
    AlreadyActive,
    MissingRequiredTags,
    BlockedByTags,
    BlockedByAbility,
    OnCooldown,
    InsufficientCost,
    RejectedByAbility,
}

/// Behaviour of an ability kind.
///
/// Callbacks receive an [`AbilityContext`] with mutable access to the world;
/// they must leave the ability either ended (`ctx.end_ability()`) or waiting
/// on a task it started.
pub trait GameplayAbility: fmt::Debug + Send {
    fn config(&self) -> &Arc<AbilityConfig>;

    /// New instance sharing this one's configuration with default runtime state.
    fn create_poolable_instance(&self) -> Box<dyn GameplayAbility>;

    /// Ability-specific activation gate, checked after tags, cost and cooldown.
    fn can_activate(&self, _asc: &AbilitySystemComponent) -> bool {
        true
    }

    fn activate_ability(&mut self, ctx: &mut AbilityContext<'_>);

    /// Target data arrived for a `WaitTargetData` task.
    fn on_target_data_ready(&mut self, ctx: &mut AbilityContext<'_>, _task: AbilityTaskHandle, _data: TargetData) {
        ctx.end_ability();
    }

    /// Targeting was cancelled. The world cancels the ability afterwards
    /// unless the callback already ended it.
    fn on_targeting_cancelled(&mut self, _ctx: &mut AbilityContext<'_>, _task: AbilityTaskHandle) {}

    /// A `WaitDelay` or `WaitNextFrame` task completed.
    fn on_wait_finished(&mut self, ctx: &mut AbilityContext<'_>, _task: AbilityTaskHandle) {
        ctx.end_ability();
    }

    /// Runs once per activation while the ability is `Ending`.
    fn on_end_ability(&mut self, _was_cancelled: bool) {}

    /// Returns runtime fields to their defaults before the instance is pooled.
    fn reset(&mut self) {}
}
