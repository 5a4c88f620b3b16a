use crate::actor::ActorId;
use crate::component::{OwnedTags, Outbox};
use crate::effect::{EvaluatedModifier, GameplayEffectSpec, ModifierOp};
use crate::event::GameplayEventData;
use crate::tags::{GameplayTag, GameplayTagCountContainer, TagSource};

use super::GameplayAttribute;

/// One resolved modifier being executed against the target's attribute set.
#[derive(Clone, Copy, Debug)]
pub struct ModCallbackData<'a> {
    pub spec: &'a GameplayEffectSpec,
    pub modifier: EvaluatedModifier,
    pub target: ActorId,
}

impl ModCallbackData<'_> {
    pub fn attribute(&self) -> GameplayAttribute {
        self.modifier.attribute
    }

    pub fn op(&self) -> ModifierOp {
        self.modifier.op
    }

    pub fn evaluated_magnitude(&self) -> f32 {
        self.modifier.magnitude
    }

    /// Source actor of the spec, if any.
    pub fn instigator(&self) -> Option<ActorId> {
        self.spec.source()
    }
}

/// Owner-side services available to attribute hooks.
///
/// Hooks may flip tags on the owning component and queue gameplay events.
/// They cannot reach other actors directly; cross-actor reactions (bounty,
/// kill credit) are driven by observers once the current application ends.
pub struct HookContext<'a> {
    owner: ActorId,
    tags: &'a mut OwnedTags,
    outbox: &'a mut Outbox,
}

impl<'a> HookContext<'a> {
    pub(crate) fn new(owner: ActorId, tags: &'a mut OwnedTags, outbox: &'a mut Outbox) -> Self {
        Self {
            owner,
            tags,
            outbox,
        }
    }

    pub fn owner(&self) -> ActorId {
        self.owner
    }

    pub fn tags(&self) -> &GameplayTagCountContainer {
        self.tags.combined()
    }

    pub fn has_tag(&self, tag: GameplayTag) -> bool {
        self.tags.combined().has_tag(tag)
    }

    pub fn add_loose_tag(&mut self, tag: GameplayTag) {
        self.tags.add_loose(tag);
    }

    pub fn remove_loose_tag(&mut self, tag: GameplayTag) -> bool {
        self.tags.remove_loose(tag)
    }

    /// Queues a gameplay event, delivered after the current operation completes.
    pub fn send_event(&mut self, event: GameplayEventData) {
        self.outbox.events.push(event);
    }
}
