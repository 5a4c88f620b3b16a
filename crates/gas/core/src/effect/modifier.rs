//! Modifier operations, magnitude sources and aggregation.

use std::sync::Arc;

use crate::attribute::GameplayAttribute;
use crate::tags::GameplayTag;

use super::MagnitudeCalculation;

/// Arithmetic applied by a modifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ModifierOp {
    Add,
    Multiply,
    Division,
    Override,
}

impl ModifierOp {
    /// Applies the operation to `value`. Division by zero leaves `value` unchanged.
    pub fn apply(self, value: f32, magnitude: f32) -> f32 {
        match self {
            Self::Add => value + magnitude,
            Self::Multiply => value * magnitude,
            Self::Division => {
                if magnitude == 0.0 {
                    tracing::warn!("division modifier with zero magnitude ignored");
                    value
                } else {
                    value / magnitude
                }
            }
            Self::Override => magnitude,
        }
    }
}

/// `base + per_level * (level - 1)`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ScalableFloat {
    pub base: f32,
    pub per_level: f32,
}

impl ScalableFloat {
    pub const fn new(base: f32, per_level: f32) -> Self {
        Self { base, per_level }
    }

    pub const fn constant(value: f32) -> Self {
        Self::new(value, 0.0)
    }

    pub fn value_at(&self, level: i32) -> f32 {
        self.base + self.per_level * (level.max(1) - 1) as f32
    }
}

/// Level-keyed curve with linear interpolation, clamped at both ends.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct LevelCurve {
    /// `(level, value)` keys sorted by level.
    keys: Vec<(f32, f32)>,
}

impl LevelCurve {
    pub fn new(mut keys: Vec<(f32, f32)>) -> Self {
        keys.sort_by(|a, b| a.0.total_cmp(&b.0));
        Self { keys }
    }

    pub fn evaluate(&self, level: f32) -> f32 {
        let (Some(first), Some(last)) = (self.keys.first(), self.keys.last()) else {
            return 0.0;
        };
        if level <= first.0 {
            return first.1;
        }
        if level >= last.0 {
            return last.1;
        }
        for window in self.keys.windows(2) {
            let (lo, hi) = (window[0], window[1]);
            if level <= hi.0 {
                let span = hi.0 - lo.0;
                if span <= f32::EPSILON {
                    return hi.1;
                }
                let t = (level - lo.0) / span;
                return lo.1 + (hi.1 - lo.1) * t;
            }
        }
        last.1
    }
}

/// Where a modifier's magnitude comes from.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MagnitudeSource {
    /// Level-scaled scalar (constant when `per_level` is zero).
    Scalable(ScalableFloat),
    /// Curve evaluated at the spec level, multiplied by `scale`.
    Curve { curve: LevelCurve, scale: f32 },
    /// Value supplied on the spec under `tag`; `default` when absent.
    SetByCaller { tag: GameplayTag, default: f32 },
    /// Computed by code when the spec is created.
    #[cfg_attr(feature = "serde", serde(skip))]
    Custom(Arc<dyn MagnitudeCalculation>),
}

impl MagnitudeSource {
    pub const fn constant(value: f32) -> Self {
        Self::Scalable(ScalableFloat::constant(value))
    }

    pub const fn set_by_caller(tag: GameplayTag, default: f32) -> Self {
        Self::SetByCaller { tag, default }
    }
}

/// Modifier as authored on a definition.
///
/// `attribute` is a schema name resolved against the target's set at
/// application time; unknown names are skipped with a warning.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ModifierInfo {
    pub attribute: String,
    pub op: ModifierOp,
    pub magnitude: MagnitudeSource,
}

impl ModifierInfo {
    pub fn new(attribute: impl Into<String>, op: ModifierOp, magnitude: MagnitudeSource) -> Self {
        Self {
            attribute: attribute.into(),
            op,
            magnitude,
        }
    }
}

/// Modifier resolved against a concrete set with a concrete magnitude.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EvaluatedModifier {
    pub attribute: GameplayAttribute,
    pub op: ModifierOp,
    pub magnitude: f32,
}

/// Folds duration modifiers into a current value.
///
/// `((base + Σadd) * Πmul) / Πdiv`, replaced entirely by the latest override.
/// Stacks scale additive magnitudes linearly and multiplicative ones by
/// exponent.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aggregator {
    add: f32,
    multiply: f32,
    divide: f32,
    override_value: Option<f32>,
}

impl Aggregator {
    pub const fn new() -> Self {
        Self {
            add: 0.0,
            multiply: 1.0,
            divide: 1.0,
            override_value: None,
        }
    }

    pub fn add_modifier(&mut self, op: ModifierOp, magnitude: f32, stacks: u32) {
        let stacks = stacks.max(1);
        match op {
            ModifierOp::Add => self.add += magnitude * stacks as f32,
            ModifierOp::Multiply => self.multiply *= magnitude.powi(stacks as i32),
            ModifierOp::Division => {
                if magnitude == 0.0 {
                    tracing::warn!("division modifier with zero magnitude ignored");
                } else {
                    self.divide *= magnitude.powi(stacks as i32);
                }
            }
            ModifierOp::Override => self.override_value = Some(magnitude),
        }
    }

    pub fn evaluate(&self, base: f32) -> f32 {
        match self.override_value {
            Some(value) => value,
            None => (base + self.add) * self.multiply / self.divide,
        }
    }
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalable_float_scales_from_level_one() {
        let value = ScalableFloat::new(10.0, 2.5);
        assert_eq!(value.value_at(1), 10.0);
        assert_eq!(value.value_at(3), 15.0);
        // Levels below 1 clamp to the base value
        assert_eq!(value.value_at(0), 10.0);
    }

    #[test]
    fn curve_interpolates_and_clamps() {
        let curve = LevelCurve::new(vec![(5.0, 50.0), (1.0, 10.0)]);
        assert_eq!(curve.evaluate(0.0), 10.0);
        assert_eq!(curve.evaluate(3.0), 30.0);
        assert_eq!(curve.evaluate(9.0), 50.0);
        assert_eq!(LevelCurve::default().evaluate(2.0), 0.0);
    }

    #[test]
    fn aggregator_orders_add_before_multiply_and_divide() {
        let mut agg = Aggregator::new();
        agg.add_modifier(ModifierOp::Add, 10.0, 1);
        agg.add_modifier(ModifierOp::Multiply, 2.0, 1);
        agg.add_modifier(ModifierOp::Division, 4.0, 1);
        // (10 + 10) * 2 / 4 = 10
        assert_eq!(agg.evaluate(10.0), 10.0);
    }

    #[test]
    fn aggregator_scales_stacks() {
        let mut agg = Aggregator::new();
        agg.add_modifier(ModifierOp::Add, 5.0, 3);
        agg.add_modifier(ModifierOp::Multiply, 2.0, 2);
        // (0 + 15) * 4 = 60
        assert_eq!(agg.evaluate(0.0), 60.0);
    }

    #[test]
    fn override_wins_over_other_ops() {
        let mut agg = Aggregator::new();
        agg.add_modifier(ModifierOp::Add, 5.0, 1);
        agg.add_modifier(ModifierOp::Override, 1.0, 1);
        assert_eq!(agg.evaluate(100.0), 1.0);
    }

    #[test]
    fn division_by_zero_is_ignored() {
        assert_eq!(ModifierOp::Division.apply(8.0, 0.0), 8.0);
        assert_eq!(ModifierOp::Division.apply(8.0, 2.0), 4.0);
    }
}
