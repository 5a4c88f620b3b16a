//! The gameplay world: every actor's avatar and ability system, pending
//! ability tasks, the ability pool and cue dispatch.
//!
//! `GameplayWorld` is the single mutation entry point. Public operations
//! run to completion and then flush: component outboxes are drained, cues
//! are dispatched and queued gameplay events are delivered FIFO to
//! observers. Operations invoked from inside an ability callback or an
//! observer join the outer flush instead of starting their own.

mod activation;
mod error;
mod tasks;

pub use error::WorldError;
pub(crate) use tasks::TaskState;

use std::collections::{BTreeMap, VecDeque};

use vek::Vec3;

use crate::ability::{AbilityPool, AbilitySpecHandle, AbilityTaskHandle, AbilityTaskKind, GameplayAbility};
use crate::actor::{ActorId, Avatar};
use crate::attribute::AttributeSet;
use crate::component::AbilitySystemComponent;
use crate::config::GasConfig;
use crate::cue::{CueDispatcher, GameplayCueHandler, GameplayCueManager};
use crate::effect::{ActiveEffectHandle, EffectApplication, GameplayEffectSpec};
use crate::event::{GameplayEventData, GameplayEventObserver, WorldEvent};
use crate::tags::{GameplayTag, GameplayTagContainer, GameplayTagCountContainer};
use crate::targeting::TargetingSpace;

use tasks::PendingTask;

#[derive(Debug)]
pub struct GameplayWorld {
    config: GasConfig,
    avatars: BTreeMap<ActorId, Avatar>,
    components: BTreeMap<ActorId, AbilitySystemComponent>,
    tasks: BTreeMap<AbilityTaskHandle, PendingTask>,
    pool: AbilityPool,
    cues: GameplayCueManager,
    observers: BTreeMap<GameplayTag, Vec<Box<dyn GameplayEventObserver>>>,
    pending_events: VecDeque<GameplayEventData>,
    journal: VecDeque<WorldEvent>,
    next_actor: u32,
    next_task: u64,
    frame: u64,
    /// Nesting depth of public operations; flush runs when it returns to 0.
    depth: u32,
    flushing: bool,
}

impl Default for GameplayWorld {
    fn default() -> Self {
        Self::new(GasConfig::default())
    }
}

impl GameplayWorld {
    pub fn new(config: GasConfig) -> Self {
        Self {
            pool: AbilityPool::new(config.ability_pool_capacity),
            config,
            avatars: BTreeMap::new(),
            components: BTreeMap::new(),
            tasks: BTreeMap::new(),
            cues: GameplayCueManager::new(),
            observers: BTreeMap::new(),
            pending_events: VecDeque::new(),
            journal: VecDeque::new(),
            next_actor: 1,
            next_task: 1,
            frame: 0,
            depth: 0,
            flushing: false,
        }
    }

    pub fn config(&self) -> &GasConfig {
        &self.config
    }

    /// Number of completed ticks.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    // ========================================================================
    // Actors
    // ========================================================================

    pub fn spawn_actor(&mut self, avatar: Avatar) -> ActorId {
        let actor = ActorId(self.next_actor);
        self.next_actor += 1;
        self.avatars.insert(actor, avatar);
        self.push_journal(WorldEvent::ActorSpawned { actor });
        tracing::debug!(%actor, position = ?avatar.position, "actor spawned");
        actor
    }

    /// Attaches an ability system to a spawned actor.
    pub fn add_ability_system(
        &mut self,
        actor: ActorId,
        attributes: Box<dyn AttributeSet>,
    ) -> Result<&mut AbilitySystemComponent, WorldError> {
        if !self.avatars.contains_key(&actor) {
            return Err(WorldError::UnknownActor(actor));
        }
        if self.components.contains_key(&actor) {
            return Err(WorldError::AbilitySystemExists(actor));
        }
        Ok(self
            .components
            .entry(actor)
            .or_insert_with(|| AbilitySystemComponent::new(actor, attributes)))
    }

    /// Ends every active ability (cancelled), releases the component and
    /// removes the avatar.
    pub fn despawn_actor(&mut self, actor: ActorId) -> Result<(), WorldError> {
        if !self.avatars.contains_key(&actor) {
            return Err(WorldError::UnknownActor(actor));
        }
        self.operation(|world| {
            let active = world
                .components
                .get(&actor)
                .map(AbilitySystemComponent::active_abilities)
                .unwrap_or_default();
            for handle in active {
                world.end_ability_internal(actor, handle, true);
            }
            world.destroy_tasks_where(|task| task.owner == actor);
            if let Some(asc) = world.components.get_mut(&actor) {
                asc.dispose();
            }
            // Drain the disposed component before dropping it.
            world.drain_outboxes();
            world.components.remove(&actor);
            world.avatars.remove(&actor);
            world.push_journal(WorldEvent::ActorDespawned { actor });
        });
        tracing::debug!(%actor, "actor despawned");
        Ok(())
    }

    pub fn actors(&self) -> impl Iterator<Item = ActorId> + '_ {
        self.avatars.keys().copied()
    }

    pub fn avatar(&self, actor: ActorId) -> Option<&Avatar> {
        self.avatars.get(&actor)
    }

    pub fn avatar_mut(&mut self, actor: ActorId) -> Option<&mut Avatar> {
        self.avatars.get_mut(&actor)
    }

    pub fn asc(&self, actor: ActorId) -> Option<&AbilitySystemComponent> {
        self.components.get(&actor)
    }

    /// Direct component access. Cues and events produced through it are
    /// delivered by the next world operation or [`Self::flush`].
    pub fn asc_mut(&mut self, actor: ActorId) -> Option<&mut AbilitySystemComponent> {
        self.components.get_mut(&actor)
    }

    fn require_asc(&self, actor: ActorId) -> Result<&AbilitySystemComponent, WorldError> {
        if !self.avatars.contains_key(&actor) {
            return Err(WorldError::UnknownActor(actor));
        }
        self.components.get(&actor).ok_or(WorldError::NoAbilitySystem(actor))
    }

    fn require_asc_mut(&mut self, actor: ActorId) -> Result<&mut AbilitySystemComponent, WorldError> {
        self.require_asc(actor)?;
        self.components.get_mut(&actor).ok_or(WorldError::NoAbilitySystem(actor))
    }

    // ========================================================================
    // Effects and tags
    // ========================================================================

    /// Applies `spec` to `target`'s ability system.
    pub fn apply_effect_spec(
        &mut self,
        target: ActorId,
        spec: GameplayEffectSpec,
    ) -> Result<EffectApplication, WorldError> {
        self.require_asc(target)?;
        Ok(self.operation(|world| match world.components.get_mut(&target) {
            Some(asc) => asc.apply_gameplay_effect_spec_to_self(spec),
            None => EffectApplication::Blocked,
        }))
    }

    pub fn remove_active_effect(&mut self, actor: ActorId, handle: ActiveEffectHandle) -> Result<bool, WorldError> {
        self.require_asc(actor)?;
        Ok(self.operation(|world| {
            world
                .components
                .get_mut(&actor)
                .is_some_and(|asc| asc.remove_active_effect(handle))
        }))
    }

    /// Removes every active effect on `actor` whose asset or granted tags match `tags`.
    pub fn remove_active_effects_with_tags(
        &mut self,
        actor: ActorId,
        tags: &GameplayTagContainer,
    ) -> Result<usize, WorldError> {
        self.require_asc(actor)?;
        Ok(self.operation(|world| {
            world
                .components
                .get_mut(&actor)
                .map_or(0, |asc| asc.remove_active_effects_with_tags(tags))
        }))
    }

    pub fn add_loose_tag(&mut self, actor: ActorId, tag: GameplayTag) -> Result<(), WorldError> {
        self.require_asc(actor)?;
        self.operation(|world| {
            if let Some(asc) = world.components.get_mut(&actor) {
                asc.add_loose_gameplay_tag(tag);
            }
        });
        Ok(())
    }

    pub fn remove_loose_tag(&mut self, actor: ActorId, tag: GameplayTag) -> Result<bool, WorldError> {
        self.require_asc(actor)?;
        Ok(self.operation(|world| {
            world
                .components
                .get_mut(&actor)
                .is_some_and(|asc| asc.remove_loose_gameplay_tag(tag))
        }))
    }

    // ========================================================================
    // Abilities
    // ========================================================================

    pub fn grant_ability(
        &mut self,
        actor: ActorId,
        template: Box<dyn GameplayAbility>,
        level: i32,
    ) -> Result<AbilitySpecHandle, WorldError> {
        Ok(self.require_asc_mut(actor)?.grant_ability(template, level))
    }

    /// Pays cost and cooldown of an active ability. See
    /// [`AbilitySystemComponent::commit_ability`].
    pub fn commit_ability(&mut self, actor: ActorId, handle: AbilitySpecHandle) -> bool {
        self.operation(|world| {
            world
                .components
                .get_mut(&actor)
                .is_some_and(|asc| asc.commit_ability(handle))
        })
    }

    /// Pending tasks of `actor`, in creation order.
    pub fn pending_tasks(&self, actor: ActorId) -> Vec<(AbilityTaskHandle, AbilityTaskKind)> {
        self.tasks
            .iter()
            .filter(|(_, task)| task.owner == actor)
            .map(|(handle, task)| (*handle, task.kind()))
            .collect()
    }

    pub fn pool(&self) -> &AbilityPool {
        &self.pool
    }

    // ========================================================================
    // Frame
    // ========================================================================

    /// Advances the world by `delta` seconds: ability tasks first, then
    /// every component's active effects.
    pub fn tick(&mut self, delta: f32) {
        self.operation(|world| {
            world.tick_tasks(delta);
            let actors: Vec<ActorId> = world.components.keys().copied().collect();
            for actor in actors {
                if let Some(asc) = world.components.get_mut(&actor) {
                    asc.tick(delta);
                }
            }
            world.frame += 1;
        });
    }

    // ========================================================================
    // Cues and events
    // ========================================================================

    pub fn register_cue_handler(&mut self, tag: GameplayTag, handler: Box<dyn GameplayCueHandler>) {
        self.cues.register_handler(tag, handler);
    }

    pub fn set_cue_dispatcher(&mut self, dispatcher: Box<dyn CueDispatcher>) {
        self.cues.set_dispatcher(dispatcher);
    }

    pub fn cue_manager(&self) -> &GameplayCueManager {
        &self.cues
    }

    /// Observers receive events whose tag matches `tag` hierarchically.
    pub fn add_event_observer(&mut self, tag: GameplayTag, observer: Box<dyn GameplayEventObserver>) {
        self.observers.entry(tag).or_default().push(observer);
    }

    pub fn send_gameplay_event(&mut self, event: GameplayEventData) {
        self.operation(|world| {
            world.push_journal(WorldEvent::Gameplay(event.clone()));
            world.pending_events.push_back(event);
        });
    }

    /// Drains the journal, oldest first.
    pub fn take_journal(&mut self) -> Vec<WorldEvent> {
        self.journal.drain(..).collect()
    }

    pub fn journal(&self) -> &VecDeque<WorldEvent> {
        &self.journal
    }

    fn push_journal(&mut self, event: WorldEvent) {
        if self.config.journal_capacity == 0 {
            return;
        }
        while self.journal.len() >= self.config.journal_capacity {
            self.journal.pop_front();
        }
        self.journal.push_back(event);
    }

    /// Runs `f` as one world operation and flushes once the outermost
    /// operation completes.
    fn operation<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        if self.depth == 0 {
            self.flush();
        }
        result
    }

    /// Delivers queued cues, journal entries and gameplay events.
    ///
    /// Events are processed FIFO; observers may queue more. Processing stops
    /// after `max_events_per_flush` events and the remainder is dropped.
    pub fn flush(&mut self) {
        if self.flushing {
            return;
        }
        self.flushing = true;

        let mut delivered = 0usize;
        loop {
            self.drain_outboxes();
            let Some(event) = self.pending_events.pop_front() else {
                break;
            };
            if delivered >= self.config.max_events_per_flush {
                tracing::warn!(
                    dropped = self.pending_events.len() + 1,
                    limit = self.config.max_events_per_flush,
                    "gameplay event limit reached, dropping remaining events"
                );
                self.pending_events.clear();
                break;
            }
            delivered += 1;
            self.deliver_event(&event);
        }

        self.flushing = false;
    }

    fn drain_outboxes(&mut self) {
        let pending: Vec<ActorId> = self
            .components
            .iter()
            .filter(|(_, asc)| asc.has_pending_output())
            .map(|(actor, _)| *actor)
            .collect();

        for actor in pending {
            let Some(asc) = self.components.get_mut(&actor) else {
                continue;
            };
            let outbox = asc.take_outbox();

            for entry in outbox.journal {
                self.push_journal(entry);
            }
            for mut notify in outbox.cues {
                if notify.params.location.is_none() {
                    notify.params.location = self.cue_location(notify.params.target);
                }
                self.push_journal(WorldEvent::Cue(notify.clone()));
                self.cues.dispatch(notify);
            }
            for event in outbox.events {
                self.push_journal(WorldEvent::Gameplay(event.clone()));
                self.pending_events.push_back(event);
            }
        }
    }

    fn deliver_event(&mut self, event: &GameplayEventData) {
        // Observers run with the world borrowed mutably, so they are moved
        // out for the duration; observers added meanwhile are merged back.
        let mut observers = core::mem::take(&mut self.observers);
        let mut handled = false;
        for (tag, list) in &observers {
            if !event.tag.matches(*tag) {
                continue;
            }
            for observer in list {
                handled = true;
                observer.on_gameplay_event(self, event);
            }
        }
        for (tag, added) in core::mem::take(&mut self.observers) {
            observers.entry(tag).or_default().extend(added);
        }
        self.observers = observers;

        if !handled {
            tracing::trace!(tag = %event.tag, target = %event.target, "gameplay event had no observer");
        }
    }

    /// Cue location used when a notification carries no hit location.
    fn cue_location(&self, actor: ActorId) -> Option<Vec3<f32>> {
        self.avatars.get(&actor).map(|avatar| avatar.position)
    }
}

impl TargetingSpace for GameplayWorld {
    fn avatar(&self, actor: ActorId) -> Option<&Avatar> {
        self.avatars.get(&actor)
    }

    fn avatars(&self) -> Box<dyn Iterator<Item = (ActorId, &Avatar)> + '_> {
        Box::new(self.avatars.iter().map(|(actor, avatar)| (*actor, avatar)))
    }

    fn owned_tags(&self, actor: ActorId) -> Option<&GameplayTagCountContainer> {
        self.components.get(&actor).map(AbilitySystemComponent::owned_tags)
    }
}
