//! Immutable effect definitions.

use std::sync::Arc;

use crate::config::GasConfig;
use crate::tags::{GameplayTag, GameplayTagContainer, TagRequirements};

use super::{ExecutionCalculation, ModifierInfo};

/// How long an applied effect lives.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DurationPolicy {
    /// Executes once against base values and is never stored.
    Instant,
    /// Active for the given number of seconds.
    HasDuration(f32),
    /// Active until removed.
    Infinite,
}

/// How repeated applications of one definition combine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StackingType {
    /// Every application is a separate active effect.
    #[default]
    None,
    /// One stack per source actor.
    AggregateBySource,
    /// One stack per target regardless of source.
    AggregateByTarget,
}

/// Duration handling when a new application joins an existing stack.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StackDurationPolicy {
    /// Reset remaining time to the full duration.
    #[default]
    RefreshOnSuccessfulApplication,
    /// Add the full duration to the remaining time.
    ExtendDuration,
    /// Keep the remaining time as is.
    NeverRefresh,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct StackingPolicy {
    pub kind: StackingType,
    pub limit: u32,
    pub duration_policy: StackDurationPolicy,
}

impl StackingPolicy {
    pub const NONE: Self = Self {
        kind: StackingType::None,
        limit: 1,
        duration_policy: StackDurationPolicy::RefreshOnSuccessfulApplication,
    };

    pub const fn by_target(limit: u32) -> Self {
        Self {
            kind: StackingType::AggregateByTarget,
            limit,
            duration_policy: StackDurationPolicy::RefreshOnSuccessfulApplication,
        }
    }

    pub const fn by_source(limit: u32) -> Self {
        Self {
            kind: StackingType::AggregateBySource,
            limit,
            duration_policy: StackDurationPolicy::RefreshOnSuccessfulApplication,
        }
    }

    #[must_use]
    pub const fn with_duration_policy(mut self, policy: StackDurationPolicy) -> Self {
        self.duration_policy = policy;
        self
    }

    pub const fn allows_stacking(&self) -> bool {
        !matches!(self.kind, StackingType::None)
    }

    /// Effective stack cap, at least 1 and at most [`GasConfig::MAX_STACK_LIMIT`].
    pub fn effective_limit(&self) -> u32 {
        self.limit.clamp(1, GasConfig::MAX_STACK_LIMIT)
    }
}

impl Default for StackingPolicy {
    fn default() -> Self {
        Self::NONE
    }
}

/// Immutable effect template shared across specs.
#[derive(Clone, Debug)]
pub struct GameplayEffect {
    pub name: String,
    pub duration: DurationPolicy,
    /// Seconds between periodic executions; 0 disables periodic behaviour.
    pub period: f32,
    pub modifiers: Vec<ModifierInfo>,
    pub execution: Option<Arc<dyn ExecutionCalculation>>,
    pub stacking: StackingPolicy,
    /// Tags describing the effect itself (e.g. `Debuff.Poison`).
    pub asset_tags: GameplayTagContainer,
    /// Tags granted to the target while the effect is active.
    pub granted_tags: GameplayTagContainer,
    pub application_requirements: TagRequirements,
    /// Effect is inhibited (no modifiers, no granted tags) while unmet.
    pub ongoing_requirements: TagRequirements,
    /// Active effects whose asset or granted tags match are removed on application.
    pub remove_effects_with_tags: GameplayTagContainer,
    pub cues: GameplayTagContainer,
}

impl GameplayEffect {
    pub fn new(name: impl Into<String>, duration: DurationPolicy) -> Self {
        Self {
            name: name.into(),
            duration,
            period: 0.0,
            modifiers: Vec::new(),
            execution: None,
            stacking: StackingPolicy::NONE,
            asset_tags: GameplayTagContainer::new(),
            granted_tags: GameplayTagContainer::new(),
            application_requirements: TagRequirements::new(),
            ongoing_requirements: TagRequirements::new(),
            remove_effects_with_tags: GameplayTagContainer::new(),
            cues: GameplayTagContainer::new(),
        }
    }

    pub fn instant(name: impl Into<String>) -> Self {
        Self::new(name, DurationPolicy::Instant)
    }

    pub fn has_duration(name: impl Into<String>, seconds: f32) -> Self {
        Self::new(name, DurationPolicy::HasDuration(seconds))
    }

    pub fn infinite(name: impl Into<String>) -> Self {
        Self::new(name, DurationPolicy::Infinite)
    }

    #[must_use]
    pub fn with_modifier(mut self, modifier: ModifierInfo) -> Self {
        self.modifiers.push(modifier);
        self
    }

    #[must_use]
    pub fn with_period(mut self, period: f32) -> Self {
        self.period = period;
        self
    }

    #[must_use]
    pub fn with_execution(mut self, execution: Arc<dyn ExecutionCalculation>) -> Self {
        self.execution = Some(execution);
        self
    }

    #[must_use]
    pub fn with_stacking(mut self, stacking: StackingPolicy) -> Self {
        self.stacking = stacking;
        self
    }

    #[must_use]
    pub fn with_asset_tag(mut self, tag: GameplayTag) -> Self {
        self.asset_tags.add(tag);
        self
    }

    #[must_use]
    pub fn with_granted_tag(mut self, tag: GameplayTag) -> Self {
        self.granted_tags.add(tag);
        self
    }

    #[must_use]
    pub fn with_application_requirements(mut self, requirements: TagRequirements) -> Self {
        self.application_requirements = requirements;
        self
    }

    #[must_use]
    pub fn with_ongoing_requirements(mut self, requirements: TagRequirements) -> Self {
        self.ongoing_requirements = requirements;
        self
    }

    #[must_use]
    pub fn with_remove_effects_with_tag(mut self, tag: GameplayTag) -> Self {
        self.remove_effects_with_tags.add(tag);
        self
    }

    #[must_use]
    pub fn with_cue(mut self, tag: GameplayTag) -> Self {
        self.cues.add(tag);
        self
    }

    pub fn into_shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn is_instant(&self) -> bool {
        matches!(self.duration, DurationPolicy::Instant)
    }

    pub fn is_periodic(&self) -> bool {
        !self.is_instant() && self.period > 0.0
    }

    /// Seconds of life for a fresh application; infinite and instant report 0.
    pub fn duration_seconds(&self) -> f32 {
        match self.duration {
            DurationPolicy::HasDuration(seconds) => seconds.max(0.0),
            DurationPolicy::Instant | DurationPolicy::Infinite => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stacking_limit_is_clamped() {
        assert_eq!(StackingPolicy::by_target(0).effective_limit(), 1);
        assert_eq!(
            StackingPolicy::by_target(10_000).effective_limit(),
            GasConfig::MAX_STACK_LIMIT
        );
        assert!(!StackingPolicy::NONE.allows_stacking());
    }

    #[test]
    fn periodic_requires_non_instant() {
        let periodic = GameplayEffect::has_duration("Burn", 3.0).with_period(1.0);
        let instant = GameplayEffect::instant("Hit").with_period(1.0);
        assert!(periodic.is_periodic());
        assert!(!instant.is_periodic());
        assert_eq!(periodic.duration_seconds(), 3.0);
    }
}
