//! Ability system component: the per-actor owner of attributes, active
//! effects, granted abilities and tags.
//!
//! Everything here is local to one actor. Operations that reach other actors
//! (applying a spec to a target, running ability callbacks, ending abilities
//! with pending tasks) live on [`crate::world::GameplayWorld`] and delegate
//! to the component.
//!
//! Side effects produced while mutating a component (cue notifications,
//! gameplay events, journal entries) accumulate in its outbox and are
//! flushed by the world once the current operation finishes.

mod abilities;
mod effects;
mod tags;

pub(crate) use tags::OwnedTags;

use crate::ability::{AbilitySpecHandle, GameplayAbilitySpec};
use crate::actor::ActorId;
use crate::attribute::{AttributeSet, GameplayAttribute};
use crate::cue::GameplayCueNotify;
use crate::effect::ActiveGameplayEffect;
use crate::event::{GameplayEventData, WorldEvent};
use crate::tags::{GameplayTag, GameplayTagCountContainer, TagSource};

/// Side effects waiting to leave the component.
#[derive(Debug, Default)]
pub(crate) struct Outbox {
    pub(crate) cues: Vec<GameplayCueNotify>,
    pub(crate) events: Vec<GameplayEventData>,
    pub(crate) journal: Vec<WorldEvent>,
}

impl Outbox {
    pub(crate) fn is_empty(&self) -> bool {
        self.cues.is_empty() && self.events.is_empty() && self.journal.is_empty()
    }
}

#[derive(Debug)]
pub struct AbilitySystemComponent {
    owner: ActorId,
    attributes: Box<dyn AttributeSet>,
    tags: OwnedTags,
    /// Ability tags blocked by currently active abilities.
    blocked_ability_tags: GameplayTagCountContainer,
    active_effects: Vec<ActiveGameplayEffect>,
    abilities: Vec<GameplayAbilitySpec>,
    next_effect_handle: u64,
    next_ability_handle: u32,
    outbox: Outbox,
}

impl AbilitySystemComponent {
    pub fn new(owner: ActorId, attributes: Box<dyn AttributeSet>) -> Self {
        Self {
            owner,
            attributes,
            tags: OwnedTags::default(),
            blocked_ability_tags: GameplayTagCountContainer::new(),
            active_effects: Vec::new(),
            abilities: Vec::new(),
            next_effect_handle: 1,
            next_ability_handle: 1,
            outbox: Outbox::default(),
        }
    }

    pub fn owner(&self) -> ActorId {
        self.owner
    }

    // ========================================================================
    // Attributes
    // ========================================================================

    pub fn attributes(&self) -> &dyn AttributeSet {
        self.attributes.as_ref()
    }

    pub fn attribute(&self, name: &str) -> Option<GameplayAttribute> {
        self.attributes.attribute(name)
    }

    pub fn current_value(&self, attribute: GameplayAttribute) -> f32 {
        self.attributes.current_value(attribute)
    }

    pub fn base_value(&self, attribute: GameplayAttribute) -> f32 {
        self.attributes.base_value(attribute)
    }

    /// Current value by schema name; `None` when the set has no such attribute.
    pub fn current_value_by_name(&self, name: &str) -> Option<f32> {
        self.attribute(name).map(|attribute| self.current_value(attribute))
    }

    /// Writes a base value and recomputes the current value from modifiers.
    pub fn set_base_value(&mut self, attribute: GameplayAttribute, value: f32) {
        self.attributes.set_base_value(attribute, value);
        self.refresh_after_change();
    }

    /// Writes a current value directly. Overwritten the next time the
    /// attribute is recalculated from its base.
    pub fn set_current_value(&mut self, attribute: GameplayAttribute, value: f32) {
        self.attributes.set_current_value(attribute, value);
    }

    /// Seeds base and current together (spawn-time initialisation).
    pub fn init_attribute(&mut self, attribute: GameplayAttribute, value: f32) {
        self.attributes.init_value(attribute, value);
        self.refresh_after_change();
    }

    // ========================================================================
    // Tags
    // ========================================================================

    /// Loose tags plus tags granted by active effects.
    pub fn owned_tags(&self) -> &GameplayTagCountContainer {
        self.tags.combined()
    }

    /// Tags added directly, independent of effects.
    pub fn loose_tags(&self) -> &GameplayTagCountContainer {
        self.tags.loose()
    }

    pub fn has_tag(&self, tag: GameplayTag) -> bool {
        self.tags.combined().has_tag(tag)
    }

    pub fn add_loose_gameplay_tag(&mut self, tag: GameplayTag) {
        self.tags.add_loose(tag);
        self.refresh_after_change();
    }

    /// Removes one loose count of `tag`. Removing an absent tag is a no-op.
    pub fn remove_loose_gameplay_tag(&mut self, tag: GameplayTag) -> bool {
        let removed = self.tags.remove_loose(tag);
        if removed {
            self.refresh_after_change();
        } else {
            tracing::trace!(owner = %self.owner, %tag, "loose tag not present");
        }
        removed
    }

    pub fn blocked_ability_tags(&self) -> &GameplayTagCountContainer {
        &self.blocked_ability_tags
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Releases every active effect, granted ability and loose tag.
    ///
    /// Abilities should already be ended through the world, which owns their
    /// tasks and pooled instances; any that are still active are dropped.
    pub fn dispose(&mut self) {
        let handles: Vec<_> = self.active_effects.iter().map(|effect| effect.handle()).collect();
        for handle in handles {
            self.remove_active_effect(handle);
        }
        if self.abilities.iter().any(GameplayAbilitySpec::is_active) {
            tracing::warn!(owner = %self.owner, "disposing component with active abilities");
        }
        self.abilities.clear();
        self.blocked_ability_tags.clear();
        self.tags.clear_loose();
        self.refresh_after_change();
    }

    pub(crate) fn take_outbox(&mut self) -> Outbox {
        core::mem::take(&mut self.outbox)
    }

    pub(crate) fn has_pending_output(&self) -> bool {
        !self.outbox.is_empty()
    }

    /// Recomputes dirty attributes and settles tag-driven inhibition.
    pub(crate) fn refresh_after_change(&mut self) {
        self.recalculate_dirty_attributes();

        // Inhibition flips grant or revoke tags, which can flip other
        // effects; bounded so mutually dependent requirements cannot spin.
        let max_passes = self.active_effects.len() + 2;
        for _ in 0..max_passes {
            let changes = self.tags.take_changes();
            if changes.is_empty() {
                return;
            }
            for (tag, present) in changes {
                let actor = self.owner;
                self.outbox.journal.push(if present {
                    WorldEvent::TagAdded { actor, tag }
                } else {
                    WorldEvent::TagRemoved { actor, tag }
                });
            }
            self.update_inhibition();
        }
        tracing::warn!(owner = %self.owner, "tag inhibition did not settle");
    }

    fn allocate_ability_handle(&mut self) -> AbilitySpecHandle {
        let handle = AbilitySpecHandle(self.next_ability_handle);
        self.next_ability_handle += 1;
        handle
    }
}
