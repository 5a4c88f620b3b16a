use std::sync::Arc;

use crate::actor::{ActorId, Avatar};
use crate::component::AbilitySystemComponent;
use crate::effect::{EffectApplication, EffectContext, GameplayEffect, GameplayEffectSpec};
use crate::targeting::TargetActor;
use crate::world::{GameplayWorld, TaskState, WorldError};

use super::{AbilityConfig, AbilitySpecHandle, AbilityTaskHandle};

/// What an ability callback can do to the world on behalf of its owner.
///
/// Ending is deferred: `end_ability` records the request and the world
/// ends the ability once the callback returns. Tasks created here start at
/// the same point, so a trace that resolves immediately calls back into the
/// ability only after the current callback has finished.
pub struct AbilityContext<'w> {
    world: &'w mut GameplayWorld,
    owner: ActorId,
    ability: AbilitySpecHandle,
    activation: u64,
    end_request: Option<bool>,
    new_tasks: Vec<AbilityTaskHandle>,
}

impl<'w> AbilityContext<'w> {
    pub(crate) fn new(
        world: &'w mut GameplayWorld,
        owner: ActorId,
        ability: AbilitySpecHandle,
        activation: u64,
    ) -> Self {
        Self {
            world,
            owner,
            ability,
            activation,
            end_request: None,
            new_tasks: Vec::new(),
        }
    }

    pub(crate) fn finish(self) -> (Option<bool>, Vec<AbilityTaskHandle>) {
        (self.end_request, self.new_tasks)
    }

    pub fn owner(&self) -> ActorId {
        self.owner
    }

    pub fn ability_handle(&self) -> AbilitySpecHandle {
        self.ability
    }

    pub fn activation_id(&self) -> u64 {
        self.activation
    }

    pub fn world(&self) -> &GameplayWorld {
        &*self.world
    }

    pub fn world_mut(&mut self) -> &mut GameplayWorld {
        &mut *self.world
    }

    pub fn asc(&self) -> Option<&AbilitySystemComponent> {
        self.world.asc(self.owner)
    }

    pub fn avatar(&self) -> Option<&Avatar> {
        self.world.avatar(self.owner)
    }

    pub fn config(&self) -> Option<&Arc<AbilityConfig>> {
        self.asc()?.ability_spec(self.ability).map(|spec| spec.config())
    }

    /// Level the ability was granted at (1 if the grant vanished).
    pub fn level(&self) -> i32 {
        self.asc()
            .and_then(|asc| asc.ability_spec(self.ability))
            .map_or(1, |spec| spec.level())
    }

    /// Pays cost and starts cooldown. False leaves both untouched.
    pub fn commit_ability(&mut self) -> bool {
        self.world.commit_ability(self.owner, self.ability)
    }

    /// Spec sourced from the owner at the ability level, tagged with this ability.
    pub fn make_outgoing_spec(&self, def: Arc<GameplayEffect>) -> Option<GameplayEffectSpec> {
        let Some(asc) = self.asc() else {
            tracing::error!(owner = %self.owner, effect = %def.name, "owner has no ability system");
            return None;
        };
        let spec = asc.make_outgoing_spec(def, self.level()).with_context(EffectContext {
            instigator: Some(self.owner),
            ability: Some(self.ability),
            hit_location: None,
        });
        Some(spec)
    }

    pub fn apply_effect_spec_to_target(
        &mut self,
        target: ActorId,
        spec: GameplayEffectSpec,
    ) -> Result<EffectApplication, WorldError> {
        self.world.apply_effect_spec(target, spec)
    }

    pub fn apply_effect_spec_to_owner(&mut self, spec: GameplayEffectSpec) -> Result<EffectApplication, WorldError> {
        self.world.apply_effect_spec(self.owner, spec)
    }

    /// Starts a targeting session; the outcome arrives through
    /// `on_target_data_ready` or `on_targeting_cancelled`.
    pub fn wait_target_data(&mut self, actor: Box<dyn TargetActor>) -> AbilityTaskHandle {
        let state = GameplayWorld::new_targeting_state(self.owner, actor);
        self.push_task(state)
    }

    /// Fires `on_wait_finished` once `seconds` of ticks have elapsed.
    pub fn wait_delay(&mut self, seconds: f32) -> AbilityTaskHandle {
        self.push_task(TaskState::Delay { remaining: seconds })
    }

    /// Fires `on_wait_finished` on the next tick.
    pub fn wait_next_frame(&mut self) -> AbilityTaskHandle {
        self.push_task(TaskState::NextFrame)
    }

    fn push_task(&mut self, state: TaskState) -> AbilityTaskHandle {
        let handle = self.world.register_task(self.owner, self.ability, self.activation, state);
        self.new_tasks.push(handle);
        handle
    }

    /// Requests a normal end once the callback returns.
    pub fn end_ability(&mut self) {
        self.end_request.get_or_insert(false);
    }

    /// Requests a cancelled end once the callback returns.
    pub fn cancel_ability(&mut self) {
        self.end_request = Some(true);
    }

    pub fn is_ending(&self) -> bool {
        self.end_request.is_some()
    }
}
