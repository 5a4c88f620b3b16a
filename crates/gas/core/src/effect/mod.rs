//! Gameplay effects: immutable definitions, runtime specs and active entries.
//!
//! - [`GameplayEffect`] is the shared template (`Arc`) built once from code or
//!   a content asset.
//! - [`GameplayEffectSpec`] binds a definition to a source, a level and a
//!   SetByCaller table. Custom magnitudes are captured when the spec is made.
//! - [`ActiveGameplayEffect`] is a spec living on a target component with
//!   duration, period and stack bookkeeping.
//!
//! The application pipeline itself lives on
//! [`crate::component::AbilitySystemComponent`].

mod active;
mod calculation;
mod definition;
mod modifier;
mod spec;

pub use active::{ActiveEffectHandle, ActiveGameplayEffect, EffectTick};
pub use calculation::{ExecutionCalculation, ExecutionParams, MagnitudeCalculation};
pub use definition::{
    DurationPolicy, GameplayEffect, StackDurationPolicy, StackingPolicy, StackingType,
};
pub use modifier::{
    Aggregator, EvaluatedModifier, LevelCurve, MagnitudeSource, ModifierInfo, ModifierOp,
    ScalableFloat,
};
pub use spec::{EffectContext, GameplayEffectSpec, SpecError};

/// Outcome of applying a spec to a component.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EffectApplication {
    /// Instant effect executed against the attribute set.
    Executed,
    /// New active effect added.
    Applied(ActiveEffectHandle),
    /// Merged into an existing stack.
    Stacked {
        handle: ActiveEffectHandle,
        stack_count: u32,
    },
    /// Application tag requirements not met; nothing changed.
    Blocked,
}

impl EffectApplication {
    pub const fn is_success(&self) -> bool {
        !matches!(self, Self::Blocked)
    }

    pub const fn handle(&self) -> Option<ActiveEffectHandle> {
        match self {
            Self::Applied(handle) | Self::Stacked { handle, .. } => Some(*handle),
            Self::Executed | Self::Blocked => None,
        }
    }
}
