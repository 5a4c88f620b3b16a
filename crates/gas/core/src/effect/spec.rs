//! Runtime effect specs.

use std::collections::BTreeMap;
use std::sync::Arc;

use vek::Vec3;

use crate::ability::AbilitySpecHandle;
use crate::actor::ActorId;
use crate::attribute::AttributeSet;
use crate::error::{ErrorSeverity, GasError};
use crate::tags::GameplayTag;

use super::{GameplayEffect, MagnitudeSource};

/// Who and what produced a spec.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EffectContext {
    pub instigator: Option<ActorId>,
    /// Ability that created the spec.
    pub ability: Option<AbilitySpecHandle>,
    /// Impact point, used as cue location when present.
    pub hit_location: Option<Vec3<f32>>,
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SpecError {
    #[error("SetByCaller magnitude for '{tag}' is already set on this spec")]
    SetByCallerAlreadySet { tag: GameplayTag },
}

impl GasError for SpecError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::SetByCallerAlreadySet { .. } => "SPEC_SET_BY_CALLER_ALREADY_SET",
        }
    }
}

/// A definition bound to a source, a level and caller-supplied magnitudes.
///
/// SetByCaller entries are write-once, so a value captured at cast time
/// cannot be changed afterwards by the caster or anyone else.
#[derive(Clone, Debug)]
pub struct GameplayEffectSpec {
    def: Arc<GameplayEffect>,
    level: i32,
    source: Option<ActorId>,
    context: EffectContext,
    /// Per-modifier magnitudes captured at creation (custom calculations only).
    captured: Vec<Option<f32>>,
    set_by_caller: BTreeMap<GameplayTag, f32>,
}

impl GameplayEffectSpec {
    /// Creates a spec with no source. Custom magnitudes see no source set.
    pub fn new(def: Arc<GameplayEffect>, level: i32) -> Self {
        Self::with_source_attributes(def, level, None, None)
    }

    /// Creates a spec bound to `source`, capturing custom magnitudes against
    /// the source's attribute set.
    pub fn with_source_attributes(
        def: Arc<GameplayEffect>,
        level: i32,
        source: Option<ActorId>,
        source_attributes: Option<&dyn AttributeSet>,
    ) -> Self {
        let mut spec = Self {
            captured: vec![None; def.modifiers.len()],
            def,
            level,
            source,
            context: EffectContext {
                instigator: source,
                ..EffectContext::default()
            },
            set_by_caller: BTreeMap::new(),
        };
        spec.capture_custom_magnitudes(source_attributes);
        spec
    }

    fn capture_custom_magnitudes(&mut self, source_attributes: Option<&dyn AttributeSet>) {
        let def = Arc::clone(&self.def);
        for (index, modifier) in def.modifiers.iter().enumerate() {
            if let MagnitudeSource::Custom(calculation) = &modifier.magnitude {
                self.captured[index] = Some(calculation.calculate_magnitude(self, source_attributes));
            }
        }
    }

    #[must_use]
    pub fn with_context(mut self, context: EffectContext) -> Self {
        self.context = context;
        self
    }

    #[must_use]
    pub fn with_hit_location(mut self, location: Vec3<f32>) -> Self {
        self.context.hit_location = Some(location);
        self
    }

    pub fn def(&self) -> &Arc<GameplayEffect> {
        &self.def
    }

    pub fn level(&self) -> i32 {
        self.level
    }

    pub fn source(&self) -> Option<ActorId> {
        self.source
    }

    pub fn context(&self) -> &EffectContext {
        &self.context
    }

    pub fn duration(&self) -> f32 {
        self.def.duration_seconds()
    }

    /// Records a caller-supplied magnitude. Each tag can be set once.
    pub fn set_set_by_caller_magnitude(&mut self, tag: GameplayTag, magnitude: f32) -> Result<(), SpecError> {
        if self.set_by_caller.contains_key(&tag) {
            return Err(SpecError::SetByCallerAlreadySet { tag });
        }
        self.set_by_caller.insert(tag, magnitude);
        Ok(())
    }

    /// Builder form of [`Self::set_set_by_caller_magnitude`]; a repeated tag
    /// keeps the first value and logs a warning.
    #[must_use]
    pub fn with_set_by_caller(mut self, tag: GameplayTag, magnitude: f32) -> Self {
        if let Err(err) = self.set_set_by_caller_magnitude(tag, magnitude) {
            tracing::warn!(effect = %self.def.name, %err, "ignored SetByCaller overwrite");
        }
        self
    }

    /// Reads a caller-supplied magnitude, falling back to `default`.
    pub fn get_set_by_caller_magnitude(&self, tag: GameplayTag, warn_if_not_found: bool, default: f32) -> f32 {
        match self.set_by_caller.get(&tag) {
            Some(value) => *value,
            None => {
                if warn_if_not_found {
                    tracing::warn!(
                        effect = %self.def.name,
                        %tag,
                        default,
                        "SetByCaller magnitude not found, using default"
                    );
                }
                default
            }
        }
    }

    /// Magnitude of the modifier at `index`, resolved for this spec.
    pub fn modifier_magnitude(&self, index: usize) -> Option<f32> {
        let modifier = self.def.modifiers.get(index)?;
        let magnitude = match &modifier.magnitude {
            MagnitudeSource::Scalable(value) => value.value_at(self.level),
            MagnitudeSource::Curve { curve, scale } => curve.evaluate(self.level as f32) * scale,
            MagnitudeSource::SetByCaller { tag, default } => {
                self.get_set_by_caller_magnitude(*tag, true, *default)
            }
            MagnitudeSource::Custom(_) => self.captured.get(index).copied().flatten()?,
        };
        Some(magnitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effect::{ModifierInfo, ModifierOp, ScalableFloat};

    #[derive(Debug)]
    struct LevelTimesTen;

    impl crate::effect::MagnitudeCalculation for LevelTimesTen {
        fn calculate_magnitude(&self, spec: &GameplayEffectSpec, _source: Option<&dyn AttributeSet>) -> f32 {
            spec.level() as f32 * 10.0
        }
    }

    fn tag(name: &str) -> GameplayTag {
        GameplayTag::request(name).unwrap()
    }

    #[test]
    fn set_by_caller_is_write_once() {
        let multiplier = tag("Data.DamageMultiplier");
        let def = GameplayEffect::instant("Damage").into_shared();
        let mut spec = GameplayEffectSpec::new(def, 1);

        spec.set_set_by_caller_magnitude(multiplier, 1.5).unwrap();
        assert_eq!(
            spec.set_set_by_caller_magnitude(multiplier, 3.0),
            Err(SpecError::SetByCallerAlreadySet { tag: multiplier })
        );
        assert_eq!(spec.get_set_by_caller_magnitude(multiplier, false, 1.0), 1.5);
    }

    #[test]
    fn missing_set_by_caller_uses_default() {
        let def = GameplayEffect::instant("Damage").into_shared();
        let spec = GameplayEffectSpec::new(def, 1);
        assert_eq!(spec.get_set_by_caller_magnitude(tag("Data.Missing"), true, 7.0), 7.0);
    }

    #[test]
    fn modifier_magnitudes_resolve_per_source() {
        let data_tag = tag("Data.Amount");
        let def = GameplayEffect::instant("Mixed")
            .with_modifier(ModifierInfo::new(
                "Health",
                ModifierOp::Add,
                MagnitudeSource::Scalable(ScalableFloat::new(5.0, 1.0)),
            ))
            .with_modifier(ModifierInfo::new(
                "Health",
                ModifierOp::Add,
                MagnitudeSource::set_by_caller(data_tag, 2.0),
            ))
            .with_modifier(ModifierInfo::new(
                "Health",
                ModifierOp::Add,
                MagnitudeSource::Custom(Arc::new(LevelTimesTen)),
            ))
            .into_shared();

        let spec = GameplayEffectSpec::new(def, 3).with_set_by_caller(data_tag, 4.0);
        assert_eq!(spec.modifier_magnitude(0), Some(7.0));
        assert_eq!(spec.modifier_magnitude(1), Some(4.0));
        assert_eq!(spec.modifier_magnitude(2), Some(30.0));
        assert_eq!(spec.modifier_magnitude(3), None);
    }
}
