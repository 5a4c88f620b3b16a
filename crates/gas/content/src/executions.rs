//! Execution calculations used by sample effects.

use gas_core::{EvaluatedModifier, ExecutionCalculation, ExecutionParams, ModifierOp};

use crate::attributes::CharacterAttribute;

/// Burn tick: deals a share of the target's Attack as Damage.
///
/// Output goes to the Damage meta attribute, so defense mitigation and the
/// death check apply to every tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BurnExecution {
    pub attack_ratio: f32,
}

impl BurnExecution {
    pub const DEFAULT_ATTACK_RATIO: f32 = 0.3;

    pub const fn new(attack_ratio: f32) -> Self {
        Self { attack_ratio }
    }
}

impl Default for BurnExecution {
    fn default() -> Self {
        Self::new(Self::DEFAULT_ATTACK_RATIO)
    }
}

impl ExecutionCalculation for BurnExecution {
    fn execute(&self, params: &ExecutionParams<'_>) -> Vec<EvaluatedModifier> {
        let attack = params.target.current_value(CharacterAttribute::Attack.id());
        let damage = attack * self.attack_ratio;
        if damage <= 0.0 {
            return Vec::new();
        }
        vec![EvaluatedModifier {
            attribute: CharacterAttribute::Damage.id(),
            op: ModifierOp::Add,
            magnitude: damage,
        }]
    }
}
