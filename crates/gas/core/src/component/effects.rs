//! Effect application pipeline.
//!
//! Ordering within one application: attribute modifiers are resolved and
//! committed first, then granted tags change, then cue notifications are
//! queued. Cues therefore always describe post-application state.

use std::sync::Arc;

use crate::attribute::{GameplayAttribute, HookContext, ModCallbackData};
use crate::cue::{GameplayCueEvent, GameplayCueNotify, GameplayCueParameters};
use crate::effect::{
    ActiveEffectHandle, ActiveGameplayEffect, Aggregator, DurationPolicy, EffectApplication,
    EvaluatedModifier, ExecutionParams, GameplayEffect, GameplayEffectSpec, StackDurationPolicy,
    StackingType,
};
use crate::event::WorldEvent;
use crate::tags::{GameplayTagContainer, TagSource};

use super::AbilitySystemComponent;

impl AbilitySystemComponent {
    /// Creates a spec sourced from this component at `level`.
    ///
    /// Custom magnitude calculations see this component's attribute set, so
    /// caster stats are captured now and never re-read.
    pub fn make_outgoing_spec(&self, def: Arc<GameplayEffect>, level: i32) -> GameplayEffectSpec {
        GameplayEffectSpec::with_source_attributes(def, level, Some(self.owner), Some(self.attributes.as_ref()))
    }

    /// Application tag requirements of `def` hold for this component.
    pub fn can_apply_effect(&self, def: &GameplayEffect) -> bool {
        def.application_requirements.requirements_met(self.tags.combined())
    }

    pub fn apply_gameplay_effect_spec_to_self(&mut self, spec: GameplayEffectSpec) -> EffectApplication {
        let def = Arc::clone(spec.def());

        if !self.can_apply_effect(&def) {
            tracing::debug!(owner = %self.owner, effect = %def.name, "application requirements not met");
            return EffectApplication::Blocked;
        }

        if !def.remove_effects_with_tags.is_empty() {
            self.remove_active_effects_with_tags(&def.remove_effects_with_tags);
        }

        let result = match def.duration {
            DurationPolicy::Instant => {
                self.execute_spec(&spec);
                self.outbox.journal.push(WorldEvent::EffectExecuted {
                    target: self.owner,
                    effect: def.name.clone(),
                });
                self.queue_cues(&spec, &[GameplayCueEvent::Executed]);
                EffectApplication::Executed
            }
            DurationPolicy::HasDuration(_) | DurationPolicy::Infinite => self.add_or_stack(spec),
        };

        self.refresh_after_change();
        tracing::debug!(owner = %self.owner, effect = %def.name, ?result, "effect applied");
        result
    }

    fn add_or_stack(&mut self, spec: GameplayEffectSpec) -> EffectApplication {
        let def = Arc::clone(spec.def());

        if let Some(index) = self.find_stack(&spec) {
            let limit = def.stacking.effective_limit();
            let effect = &mut self.active_effects[index];
            let stacked = effect.stack_count < limit;
            if stacked {
                effect.stack_count += 1;
            } else {
                tracing::debug!(effect = %def.name, limit, "stack limit reached");
            }
            match def.stacking.duration_policy {
                StackDurationPolicy::RefreshOnSuccessfulApplication => {
                    effect.time_remaining = spec.duration();
                }
                // A capped stack keeps its remaining time.
                StackDurationPolicy::ExtendDuration if stacked => effect.time_remaining += spec.duration(),
                StackDurationPolicy::ExtendDuration | StackDurationPolicy::NeverRefresh => {}
            }
            let handle = effect.handle;
            let stack_count = effect.stack_count;

            self.mark_effect_attributes_dirty(&def);
            self.recalculate_dirty_attributes();
            self.outbox.journal.push(WorldEvent::EffectApplied {
                target: self.owner,
                effect: def.name.clone(),
                handle,
                stack_count,
            });
            return EffectApplication::Stacked { handle, stack_count };
        }

        let handle = ActiveEffectHandle(self.next_effect_handle);
        self.next_effect_handle += 1;

        let mut effect = ActiveGameplayEffect::new(handle, spec.clone());
        effect.inhibited = !def.ongoing_requirements.requirements_met(self.tags.combined());
        let inhibited = effect.inhibited;
        self.active_effects.push(effect);

        if !inhibited {
            self.mark_effect_attributes_dirty(&def);
            self.recalculate_dirty_attributes();
            self.tags.grant_all(&def.granted_tags);
        }
        self.queue_cues(&spec, &[GameplayCueEvent::OnActive, GameplayCueEvent::WhileActive]);
        self.outbox.journal.push(WorldEvent::EffectApplied {
            target: self.owner,
            effect: def.name.clone(),
            handle,
            stack_count: 1,
        });

        EffectApplication::Applied(handle)
    }

    fn find_stack(&self, spec: &GameplayEffectSpec) -> Option<usize> {
        let stacking = spec.def().stacking;
        self.active_effects.iter().position(|effect| {
            Arc::ptr_eq(effect.spec.def(), spec.def())
                && match stacking.kind {
                    StackingType::None => false,
                    StackingType::AggregateByTarget => true,
                    StackingType::AggregateBySource => effect.spec.source() == spec.source(),
                }
        })
    }

    /// Runs every modifier of `spec` as an instant change to base values.
    ///
    /// Used for instant effects and each periodic execution.
    pub(crate) fn execute_spec(&mut self, spec: &GameplayEffectSpec) {
        let def = spec.def();
        let mut evaluated = Vec::with_capacity(def.modifiers.len());

        for (index, modifier) in def.modifiers.iter().enumerate() {
            let Some(attribute) = self.attributes.attribute(&modifier.attribute) else {
                tracing::warn!(
                    owner = %self.owner,
                    effect = %def.name,
                    attribute = %modifier.attribute,
                    "modifier targets unknown attribute, skipped"
                );
                continue;
            };
            let Some(magnitude) = spec.modifier_magnitude(index) else {
                tracing::warn!(effect = %def.name, index, "modifier magnitude unavailable, skipped");
                continue;
            };
            evaluated.push(EvaluatedModifier {
                attribute,
                op: modifier.op,
                magnitude,
            });
        }

        if let Some(execution) = &def.execution {
            let params = ExecutionParams {
                spec,
                target: self.attributes.as_ref(),
                target_tags: self.tags.combined(),
            };
            evaluated.extend(execution.execute(&params));
        }

        for modifier in evaluated {
            let data = ModCallbackData {
                spec,
                modifier,
                target: self.owner,
            };
            let mut ctx = HookContext::new(self.owner, &mut self.tags, &mut self.outbox);

            let handled = self.attributes.pre_process_instant_effect(&data, &mut ctx);
            if !handled {
                let base = self.attributes.base_value(modifier.attribute);
                let value = modifier.op.apply(base, modifier.magnitude);
                self.attributes.set_base_value(modifier.attribute, value);
                self.attributes.post_process_instant_effect(&data, &mut ctx);
            }
            self.attributes.post_gameplay_effect_execute(&data, &mut ctx);
        }

        self.recalculate_dirty_attributes();
    }

    /// Recomputes current values of dirty attributes from base plus the
    /// modifiers of every non-periodic, non-inhibited active effect.
    pub(crate) fn recalculate_dirty_attributes(&mut self) {
        let dirty = self.attributes.storage_mut().take_dirty();
        if dirty.is_empty() {
            return;
        }

        for attribute in dirty {
            let mut aggregator = Aggregator::new();
            for effect in &self.active_effects {
                if effect.inhibited || effect.is_periodic() {
                    continue;
                }
                for (index, modifier) in effect.spec.def().modifiers.iter().enumerate() {
                    if self.attributes.attribute(&modifier.attribute) != Some(attribute) {
                        continue;
                    }
                    if let Some(magnitude) = effect.spec.modifier_magnitude(index) {
                        aggregator.add_modifier(modifier.op, magnitude, effect.stack_count);
                    }
                }
            }
            let base = self.attributes.base_value(attribute);
            self.attributes.set_current_value(attribute, aggregator.evaluate(base));
        }

        // A changed bound (MaxHealth) must re-clamp values that were not dirty.
        for attribute in self.attributes.storage().attributes() {
            let current = self.attributes.current_value(attribute);
            let mut clamped = current;
            self.attributes.pre_attribute_change(attribute, &mut clamped);
            if clamped != current {
                self.attributes.storage_mut().set_current(attribute, clamped);
            }
        }
    }

    fn mark_effect_attributes_dirty(&mut self, def: &GameplayEffect) {
        for modifier in &def.modifiers {
            if let Some(attribute) = self.attributes.attribute(&modifier.attribute) {
                self.attributes.storage_mut().mark_dirty(attribute);
            }
        }
    }

    /// Re-evaluates ongoing tag requirements of every active effect.
    pub(crate) fn update_inhibition(&mut self) {
        for index in 0..self.active_effects.len() {
            let def = Arc::clone(self.active_effects[index].spec.def());
            let inhibited = !def.ongoing_requirements.requirements_met(self.tags.combined());
            if self.active_effects[index].inhibited == inhibited {
                continue;
            }
            self.active_effects[index].inhibited = inhibited;
            if inhibited {
                self.tags.revoke_all(&def.granted_tags);
            } else {
                self.tags.grant_all(&def.granted_tags);
            }
            self.mark_effect_attributes_dirty(&def);
            tracing::debug!(owner = %self.owner, effect = %def.name, inhibited, "effect inhibition changed");
        }
        self.recalculate_dirty_attributes();
    }

    /// Advances active effects by `delta` seconds: periodic executions first,
    /// then expiry.
    pub fn tick(&mut self, delta: f32) {
        let mut expired = Vec::new();

        for index in 0..self.active_effects.len() {
            let outcome = self.active_effects[index].tick(delta);
            if outcome.executions > 0 {
                let spec = self.active_effects[index].spec.clone();
                for _ in 0..outcome.executions {
                    self.execute_spec(&spec);
                    self.queue_cues(&spec, &[GameplayCueEvent::Executed]);
                }
            }
            if outcome.expired {
                expired.push(self.active_effects[index].handle);
            }
        }

        for handle in expired {
            self.remove_active_effect(handle);
        }
        self.refresh_after_change();
    }

    /// Removes an active effect. Returns false for an unknown handle.
    pub fn remove_active_effect(&mut self, handle: ActiveEffectHandle) -> bool {
        let Some(index) = self.active_effects.iter().position(|effect| effect.handle == handle) else {
            return false;
        };
        let effect = self.active_effects.remove(index);
        let def = Arc::clone(effect.spec.def());

        self.mark_effect_attributes_dirty(&def);
        self.recalculate_dirty_attributes();
        if !effect.inhibited {
            self.tags.revoke_all(&def.granted_tags);
        }
        self.queue_cues(&effect.spec, &[GameplayCueEvent::Removed]);
        self.outbox.journal.push(WorldEvent::EffectRemoved {
            target: self.owner,
            effect: def.name.clone(),
            handle,
        });
        tracing::debug!(owner = %self.owner, effect = %def.name, %handle, "effect removed");

        self.refresh_after_change();
        true
    }

    /// Removes every active effect whose asset or granted tags match `tags`.
    pub fn remove_active_effects_with_tags(&mut self, tags: &GameplayTagContainer) -> usize {
        let handles = self.active_effects_with_tags(tags);
        handles
            .into_iter()
            .filter(|handle| self.remove_active_effect(*handle))
            .count()
    }

    pub fn active_effects_with_tags(&self, tags: &GameplayTagContainer) -> Vec<ActiveEffectHandle> {
        self.active_effects
            .iter()
            .filter(|effect| {
                let def = effect.spec.def();
                def.asset_tags.has_any(tags) || def.granted_tags.has_any(tags)
            })
            .map(|effect| effect.handle)
            .collect()
    }

    pub fn active_effect(&self, handle: ActiveEffectHandle) -> Option<&ActiveGameplayEffect> {
        self.active_effects.iter().find(|effect| effect.handle == handle)
    }

    pub fn active_effects(&self) -> &[ActiveGameplayEffect] {
        &self.active_effects
    }

    /// Remaining seconds of the longest active effect granting any of `tags`.
    pub fn time_remaining_for_tags(&self, tags: &GameplayTagContainer) -> Option<f32> {
        self.active_effects
            .iter()
            .filter(|effect| effect.spec.def().granted_tags.has_any(tags))
            .map(|effect| effect.time_remaining)
            .reduce(f32::max)
    }

    fn queue_cues(&mut self, spec: &GameplayEffectSpec, events: &[GameplayCueEvent]) {
        let def = spec.def();
        for tag in &def.cues {
            for event in events {
                self.outbox.cues.push(GameplayCueNotify {
                    tag,
                    event: *event,
                    params: GameplayCueParameters {
                        target: self.owner,
                        source: spec.source(),
                        location: spec.context().hit_location,
                        effect_name: def.name.clone(),
                        level: spec.level(),
                    },
                });
            }
        }
    }

    /// Attribute ids touched by `def` on this component's set.
    pub fn affected_attributes(&self, def: &GameplayEffect) -> Vec<GameplayAttribute> {
        def.modifiers
            .iter()
            .filter_map(|modifier| self.attributes.attribute(&modifier.attribute))
            .collect()
    }
}
