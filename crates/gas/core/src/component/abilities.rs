//! Granted abilities: grant, activation gates, cost/cooldown commit and
//! activation tag bookkeeping.
//!
//! Running ability callbacks needs other actors, so activation and ending
//! are driven by the world; this file holds the parts that only touch the
//! owning component.

use std::sync::Arc;

use crate::ability::{AbilityConfig, AbilitySpecHandle, ActivationFailure, GameplayAbility, GameplayAbilitySpec};
use crate::effect::{EffectContext, GameplayEffect, GameplayEffectSpec, ModifierOp};
use crate::event::WorldEvent;
use crate::tags::{GameplayTag, GameplayTagContainer, TagSource};

use super::AbilitySystemComponent;

impl AbilitySystemComponent {
    /// Grants `template` at `level`.
    ///
    /// Granting the same ability (same shared config) again returns the
    /// existing handle and drops the new template.
    pub fn grant_ability(&mut self, template: Box<dyn GameplayAbility>, level: i32) -> AbilitySpecHandle {
        if let Some(existing) = self.find_ability(template.config()) {
            tracing::debug!(owner = %self.owner, ability = %template.config().name, "ability already granted");
            return existing;
        }
        let handle = self.allocate_ability_handle();
        tracing::debug!(owner = %self.owner, ability = %template.config().name, %handle, level, "ability granted");
        self.abilities.push(GameplayAbilitySpec::new(handle, template, level));
        handle
    }

    pub fn find_ability(&self, config: &Arc<AbilityConfig>) -> Option<AbilitySpecHandle> {
        self.abilities
            .iter()
            .find(|spec| Arc::ptr_eq(spec.config(), config))
            .map(GameplayAbilitySpec::handle)
    }

    pub fn find_ability_by_name(&self, name: &str) -> Option<AbilitySpecHandle> {
        self.abilities
            .iter()
            .find(|spec| spec.name() == name)
            .map(GameplayAbilitySpec::handle)
    }

    pub fn ability_spec(&self, handle: AbilitySpecHandle) -> Option<&GameplayAbilitySpec> {
        self.abilities.iter().find(|spec| spec.handle() == handle)
    }

    pub(crate) fn ability_spec_mut(&mut self, handle: AbilitySpecHandle) -> Option<&mut GameplayAbilitySpec> {
        self.abilities.iter_mut().find(|spec| spec.handle() == handle)
    }

    pub fn ability_specs(&self) -> &[GameplayAbilitySpec] {
        &self.abilities
    }

    pub fn active_abilities(&self) -> Vec<AbilitySpecHandle> {
        self.abilities
            .iter()
            .filter(|spec| spec.is_active())
            .map(GameplayAbilitySpec::handle)
            .collect()
    }

    /// Active abilities whose ability tags match any of `tags`.
    pub fn active_abilities_matching(
        &self,
        tags: &GameplayTagContainer,
        except: Option<AbilitySpecHandle>,
    ) -> Vec<AbilitySpecHandle> {
        self.abilities
            .iter()
            .filter(|spec| spec.is_active() && Some(spec.handle()) != except)
            .filter(|spec| spec.config().ability_tags.has_any(tags))
            .map(GameplayAbilitySpec::handle)
            .collect()
    }

    /// Granted abilities carrying `tag` (hierarchically) in their ability tags.
    pub fn abilities_with_tag(&self, tag: GameplayTag) -> Vec<AbilitySpecHandle> {
        self.abilities
            .iter()
            .filter(|spec| spec.config().ability_tags.has_tag(tag))
            .map(GameplayAbilitySpec::handle)
            .collect()
    }

    pub(crate) fn remove_ability_spec(&mut self, handle: AbilitySpecHandle) -> Option<GameplayAbilitySpec> {
        let index = self.abilities.iter().position(|spec| spec.handle() == handle)?;
        Some(self.abilities.remove(index))
    }

    /// Every activation gate in order; the first failing one is reported.
    pub fn can_activate_ability(&self, handle: AbilitySpecHandle) -> Result<(), ActivationFailure> {
        let spec = self.ability_spec(handle).ok_or(ActivationFailure::NotGranted)?;
        if spec.is_active() {
            return Err(ActivationFailure::AlreadyActive);
        }

        let config = spec.config();
        let owned = self.tags.combined();
        if !owned.has_all(&config.activation_required_tags) {
            return Err(ActivationFailure::MissingRequiredTags);
        }
        if owned.has_any(&config.activation_blocked_tags) {
            return Err(ActivationFailure::BlockedByTags);
        }
        if config.ability_tags.has_any(&self.blocked_ability_tags.explicit_tags()) {
            return Err(ActivationFailure::BlockedByAbility);
        }
        if self.is_on_cooldown(config) {
            return Err(ActivationFailure::OnCooldown);
        }
        if let Some(cost) = &config.cost
            && !self.can_afford_cost(cost, spec.level())
        {
            return Err(ActivationFailure::InsufficientCost);
        }
        if let Some(template) = spec.template()
            && !template.can_activate(self)
        {
            return Err(ActivationFailure::RejectedByAbility);
        }
        Ok(())
    }

    /// Cost can be paid without any attribute going negative and its
    /// application requirements hold.
    pub fn can_afford_cost(&self, cost: &Arc<GameplayEffect>, level: i32) -> bool {
        let spec = self.make_outgoing_spec(Arc::clone(cost), level);
        self.can_afford_spec(&spec)
    }

    fn can_afford_spec(&self, spec: &GameplayEffectSpec) -> bool {
        let def = spec.def();
        if !self.can_apply_effect(def) {
            return false;
        }
        def.modifiers.iter().enumerate().all(|(index, modifier)| {
            if modifier.op != ModifierOp::Add {
                return true;
            }
            let Some(magnitude) = spec.modifier_magnitude(index) else {
                return true;
            };
            let Some(attribute) = self.attributes.attribute(&modifier.attribute) else {
                return true;
            };
            magnitude >= 0.0 || self.attributes.current_value(attribute) + magnitude >= 0.0
        })
    }

    /// Any tag granted by the ability's cooldown effect is present.
    pub fn is_on_cooldown(&self, config: &AbilityConfig) -> bool {
        config
            .cooldown
            .as_ref()
            .is_some_and(|cooldown| self.tags.combined().has_any(&cooldown.granted_tags))
    }

    /// Seconds left on the ability's cooldown, if it is cooling down.
    pub fn cooldown_remaining(&self, config: &AbilityConfig) -> Option<f32> {
        let cooldown = config.cooldown.as_ref()?;
        self.time_remaining_for_tags(&cooldown.granted_tags)
    }

    /// Pays the cost and starts the cooldown, both or neither.
    pub fn commit_ability(&mut self, handle: AbilitySpecHandle) -> bool {
        let Some(spec) = self.ability_spec(handle) else {
            tracing::error!(owner = %self.owner, %handle, "commit on ability that is not granted");
            return false;
        };
        let config = Arc::clone(spec.config());
        let level = spec.level();
        let context = EffectContext {
            instigator: Some(self.owner),
            ability: Some(handle),
            hit_location: None,
        };

        let cost_spec = match &config.cost {
            Some(cost) if !cost.is_instant() => {
                tracing::error!(ability = %config.name, cost = %cost.name, "cost effect must be instant");
                return false;
            }
            Some(cost) => {
                let spec = self.make_outgoing_spec(Arc::clone(cost), level).with_context(context.clone());
                if !self.can_afford_spec(&spec) {
                    tracing::debug!(owner = %self.owner, ability = %config.name, "cannot afford cost");
                    return false;
                }
                Some(spec)
            }
            None => None,
        };

        let cooldown_spec = match &config.cooldown {
            Some(cooldown) => {
                if self.is_on_cooldown(&config) || !self.can_apply_effect(cooldown) {
                    tracing::debug!(owner = %self.owner, ability = %config.name, "cooldown blocks commit");
                    return false;
                }
                Some(self.make_outgoing_spec(Arc::clone(cooldown), level).with_context(context))
            }
            None => None,
        };

        if let Some(spec) = cost_spec {
            self.apply_gameplay_effect_spec_to_self(spec);
        }
        if let Some(spec) = cooldown_spec {
            self.apply_gameplay_effect_spec_to_self(spec);
        }
        true
    }

    /// Grants activation-owned tags and ability blocks.
    pub(crate) fn on_ability_activated(&mut self, handle: AbilitySpecHandle) {
        let Some(spec) = self.ability_spec(handle) else {
            return;
        };
        let config = Arc::clone(spec.config());
        self.tags.grant_all(&config.activation_owned_tags);
        self.blocked_ability_tags.add_all(&config.block_abilities_with_tag);
        self.outbox.journal.push(WorldEvent::AbilityActivated {
            actor: self.owner,
            ability: config.name.clone(),
        });
        self.refresh_after_change();
    }

    /// Reverses [`Self::on_ability_activated`].
    pub(crate) fn on_ability_ended(&mut self, handle: AbilitySpecHandle, was_cancelled: bool) {
        let Some(spec) = self.ability_spec(handle) else {
            return;
        };
        let config = Arc::clone(spec.config());
        self.tags.revoke_all(&config.activation_owned_tags);
        self.blocked_ability_tags.remove_all(&config.block_abilities_with_tag);
        self.outbox.journal.push(WorldEvent::AbilityEnded {
            actor: self.owner,
            ability: config.name.clone(),
            was_cancelled,
        });
        self.refresh_after_change();
    }
}
