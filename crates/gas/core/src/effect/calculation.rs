//! Code-driven magnitude and execution calculations.

use core::fmt;

use crate::attribute::AttributeSet;
use crate::tags::GameplayTagCountContainer;

use super::{EvaluatedModifier, GameplayEffectSpec};

/// Computes a modifier magnitude once, when the spec is created.
///
/// `source` is the creating component's attribute set when the spec was made
/// through a component, which lets the value snapshot caster stats.
pub trait MagnitudeCalculation: fmt::Debug + Send + Sync {
    fn calculate_magnitude(&self, spec: &GameplayEffectSpec, source: Option<&dyn AttributeSet>) -> f32;
}

/// Inputs visible to an execution calculation.
pub struct ExecutionParams<'a> {
    pub spec: &'a GameplayEffectSpec,
    pub target: &'a dyn AttributeSet,
    pub target_tags: &'a GameplayTagCountContainer,
}

/// Produces extra modifiers each time an effect executes on a target.
///
/// Outputs go through the same pre/post hooks as authored modifiers, so an
/// execution can feed a meta attribute such as Damage.
pub trait ExecutionCalculation: fmt::Debug + Send + Sync {
    fn execute(&self, params: &ExecutionParams<'_>) -> Vec<EvaluatedModifier>;
}
