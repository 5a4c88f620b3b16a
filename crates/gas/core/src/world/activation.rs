//! Ability activation, callback invocation and the end path.

use crate::ability::{
    AbilityContext, AbilitySpecHandle, ActivationFailure, ActivationState, GameplayAbility, InstancingPolicy,
};
use crate::actor::ActorId;
use crate::tags::{GameplayTag, GameplayTagContainer};

use super::{GameplayWorld, WorldError};

impl GameplayWorld {
    /// Activates a granted ability. Returns false when any activation gate
    /// refuses; see [`Self::activate_ability`] for the reason.
    pub fn try_activate_ability(&mut self, actor: ActorId, handle: AbilitySpecHandle) -> bool {
        self.activate_ability(actor, handle).is_ok()
    }

    /// Activates a granted ability, reporting why activation was refused.
    ///
    /// On success active abilities matching the new ability's
    /// `cancel_abilities_with_tag` are cancelled before it runs.
    pub fn activate_ability(&mut self, actor: ActorId, handle: AbilitySpecHandle) -> Result<(), ActivationFailure> {
        self.operation(|world| world.activate_ability_internal(actor, handle))
    }

    fn activate_ability_internal(&mut self, actor: ActorId, handle: AbilitySpecHandle) -> Result<(), ActivationFailure> {
        let Some(asc) = self.components.get(&actor) else {
            tracing::error!(%actor, %handle, "activation on actor without ability system");
            return Err(ActivationFailure::NotGranted);
        };
        if let Err(failure) = asc.can_activate_ability(handle) {
            tracing::debug!(%actor, %handle, %failure, "activation refused");
            return Err(failure);
        }
        let Some(config) = asc.ability_spec(handle).map(|spec| std::sync::Arc::clone(spec.config())) else {
            return Err(ActivationFailure::NotGranted);
        };

        self.cancel_abilities_with_tags_internal(actor, &config.cancel_abilities_with_tag, Some(handle));

        let Some(spec) = self
            .components
            .get_mut(&actor)
            .and_then(|asc| asc.ability_spec_mut(handle))
        else {
            return Err(ActivationFailure::NotGranted);
        };

        match config.instancing {
            InstancingPolicy::NonInstanced => {}
            InstancingPolicy::InstancedPerActor => {
                if !spec.has_instance() {
                    let Some(template) = spec.template() else {
                        tracing::error!(%actor, ability = %config.name, "ability template missing");
                        return Err(ActivationFailure::RejectedByAbility);
                    };
                    let instance = template.create_poolable_instance();
                    spec.set_instance(instance);
                }
            }
            InstancingPolicy::InstancedPerExecution => {
                let Some(template) = spec.template() else {
                    tracing::error!(%actor, ability = %config.name, "ability template missing");
                    return Err(ActivationFailure::RejectedByAbility);
                };
                let instance = self.pool.acquire(template);
                spec.set_instance(instance);
            }
        }

        spec.state = ActivationState::Activating;
        spec.activation_id += 1;
        spec.pending_end = None;
        let activation = spec.activation_id;

        if let Some(asc) = self.components.get_mut(&actor) {
            asc.on_ability_activated(handle);
            if let Some(spec) = asc.ability_spec_mut(handle) {
                spec.state = ActivationState::Active;
            }
        }
        tracing::info!(%actor, ability = %config.name, activation, "ability activated");

        self.invoke_ability(actor, handle, activation, |runner, ctx| runner.activate_ability(ctx));
        Ok(())
    }

    pub(crate) fn is_current_activation(&self, actor: ActorId, handle: AbilitySpecHandle, activation: u64) -> bool {
        self.components
            .get(&actor)
            .and_then(|asc| asc.ability_spec(handle))
            .is_some_and(|spec| spec.is_active() && spec.activation_id() == activation)
    }

    /// Runs one ability callback with the runner checked out of its spec.
    ///
    /// Stale activations are ignored. Ends requested during the callback are
    /// applied after the runner is checked back in; tasks created during it
    /// start afterwards if the ability is still running.
    pub(crate) fn invoke_ability(
        &mut self,
        actor: ActorId,
        handle: AbilitySpecHandle,
        activation: u64,
        f: impl FnOnce(&mut dyn GameplayAbility, &mut AbilityContext<'_>),
    ) {
        if !self.is_current_activation(actor, handle, activation) {
            tracing::trace!(%actor, %handle, activation, "stale ability callback dropped");
            return;
        }
        let Some((mut runner, slot)) = self
            .components
            .get_mut(&actor)
            .and_then(|asc| asc.ability_spec_mut(handle))
            .and_then(|spec| spec.check_out())
        else {
            tracing::error!(%actor, %handle, "ability runner unavailable");
            return;
        };

        let mut ctx = AbilityContext::new(self, actor, handle, activation);
        f(runner.as_mut(), &mut ctx);
        let (end_request, new_tasks) = ctx.finish();

        let Some(spec) = self
            .components
            .get_mut(&actor)
            .and_then(|asc| asc.ability_spec_mut(handle))
        else {
            // Removed during its own callback.
            tracing::warn!(%actor, %handle, "ability removed while running");
            if runner.config().instancing == InstancingPolicy::InstancedPerExecution {
                self.pool.release(runner);
            }
            return;
        };
        spec.check_in(runner, slot);
        let deferred = spec.pending_end.take();

        let end = match (end_request, deferred) {
            (None, None) => None,
            (Some(a), None) | (None, Some(a)) => Some(a),
            (Some(a), Some(b)) => Some(a || b),
        };
        if let Some(was_cancelled) = end {
            self.end_ability_internal(actor, handle, was_cancelled);
        }

        let live: Vec<_> = new_tasks
            .into_iter()
            .filter(|task| self.tasks.contains_key(task))
            .collect();
        if !live.is_empty() {
            self.start_tasks(live);
        }
    }

    /// Ends an active ability normally. Ending an idle ability is a no-op.
    pub fn end_ability(&mut self, actor: ActorId, handle: AbilitySpecHandle) {
        self.operation(|world| world.end_ability_internal(actor, handle, false));
    }

    /// Ends an active ability as cancelled.
    pub fn cancel_ability(&mut self, actor: ActorId, handle: AbilitySpecHandle) {
        self.operation(|world| world.end_ability_internal(actor, handle, true));
    }

    /// Idempotent end path: `Active → Ending → Idle` exactly once per activation.
    pub(crate) fn end_ability_internal(&mut self, actor: ActorId, handle: AbilitySpecHandle, was_cancelled: bool) {
        let Some(spec) = self
            .components
            .get_mut(&actor)
            .and_then(|asc| asc.ability_spec_mut(handle))
        else {
            return;
        };
        if matches!(spec.state, ActivationState::Idle | ActivationState::Ending) {
            return;
        }
        if spec.checked_out.is_some() {
            spec.pending_end = Some(spec.pending_end.unwrap_or(false) || was_cancelled);
            return;
        }
        spec.state = ActivationState::Ending;
        let config = std::sync::Arc::clone(spec.config());

        self.destroy_tasks_where(|task| task.owner == actor && task.ability == handle);

        let Some(asc) = self.components.get_mut(&actor) else {
            return;
        };
        if let Some(spec) = asc.ability_spec_mut(handle)
            && let Some((mut runner, slot)) = spec.check_out()
        {
            runner.on_end_ability(was_cancelled);
            spec.check_in(runner, slot);
        }

        asc.on_ability_ended(handle, was_cancelled);

        if let Some(spec) = asc.ability_spec_mut(handle) {
            if config.instancing == InstancingPolicy::InstancedPerExecution
                && let Some(instance) = spec.take_instance()
            {
                self.pool.release(instance);
            }
            spec.state = ActivationState::Idle;
        }
        tracing::info!(%actor, ability = %config.name, was_cancelled, "ability ended");
    }

    /// Cancels active abilities of `actor` whose ability tags match any of
    /// `tags`, except `except`. Returns the number cancelled.
    pub fn cancel_abilities_with_tags(
        &mut self,
        actor: ActorId,
        tags: &GameplayTagContainer,
        except: Option<AbilitySpecHandle>,
    ) -> Result<usize, WorldError> {
        self.require_asc(actor)?;
        Ok(self.operation(|world| world.cancel_abilities_with_tags_internal(actor, tags, except)))
    }

    pub(crate) fn cancel_abilities_with_tags_internal(
        &mut self,
        actor: ActorId,
        tags: &GameplayTagContainer,
        except: Option<AbilitySpecHandle>,
    ) -> usize {
        if tags.is_empty() {
            return 0;
        }
        let handles = self
            .components
            .get(&actor)
            .map(|asc| asc.active_abilities_matching(tags, except))
            .unwrap_or_default();
        for handle in &handles {
            self.end_ability_internal(actor, *handle, true);
        }
        handles.len()
    }

    /// Cancels and then removes every ability whose ability tags match `tag`.
    pub fn remove_abilities_with_tag(&mut self, actor: ActorId, tag: GameplayTag) -> Result<usize, WorldError> {
        self.require_asc(actor)?;
        Ok(self.operation(|world| {
            let handles = world
                .components
                .get(&actor)
                .map(|asc| asc.abilities_with_tag(tag))
                .unwrap_or_default();
            handles
                .into_iter()
                .filter(|handle| world.remove_ability_internal(actor, *handle))
                .count()
        }))
    }

    /// Cancels (if active) and removes one granted ability.
    pub fn remove_ability(&mut self, actor: ActorId, handle: AbilitySpecHandle) -> Result<bool, WorldError> {
        self.require_asc(actor)?;
        Ok(self.operation(|world| world.remove_ability_internal(actor, handle)))
    }

    fn remove_ability_internal(&mut self, actor: ActorId, handle: AbilitySpecHandle) -> bool {
        self.end_ability_internal(actor, handle, true);
        let Some(asc) = self.components.get_mut(&actor) else {
            return false;
        };
        if asc.ability_spec(handle).is_some_and(|spec| spec.checked_out.is_some()) {
            tracing::warn!(%actor, %handle, "ability cannot be removed from inside its own callback");
            return false;
        }
        let removed = asc.remove_ability_spec(handle).is_some();
        if removed {
            tracing::debug!(%actor, %handle, "ability removed");
        }
        removed
    }

    /// Looks up a granted ability or reports which part is missing.
    pub fn ability_handle(&self, actor: ActorId, name: &str) -> Result<AbilitySpecHandle, WorldError> {
        let asc = self.require_asc(actor)?;
        asc.find_ability_by_name(name)
            .ok_or_else(|| WorldError::AbilityNotGranted {
                actor,
                ability: name.to_owned(),
            })
    }
}
