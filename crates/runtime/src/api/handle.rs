//! Cloneable façade for issuing commands to the runtime.
//!
//! [`RuntimeHandle`] hides channel plumbing and offers async helpers for
//! driving the world or streaming events from specific topics.
use std::collections::HashMap;

use gas_core::{
    AbilitySpecHandle, ActorId, AttributeSet, Avatar, EffectApplication, GameplayAbility, GameplayEffectSpec,
    GameplayEventData, GameplayTag, GameplayWorld,
};
use tokio::sync::{broadcast, mpsc, oneshot};
use vek::Vec3;

use super::errors::{Result, RuntimeError};
use crate::events::{Event, EventBus, Topic};
use crate::snapshot::WorldSnapshot;
use crate::workers::Command;

/// Client-facing handle to interact with the runtime
#[derive(Clone)]
pub struct RuntimeHandle {
    command_tx: mpsc::Sender<Command>,
    event_bus: EventBus,
}

impl RuntimeHandle {
    pub(crate) fn new(command_tx: mpsc::Sender<Command>, event_bus: EventBus) -> Self {
        Self {
            command_tx,
            event_bus,
        }
    }

    /// Sends the command built by `build` and awaits its reply.
    async fn request<T>(&self, build: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(build(reply_tx))
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }

    /// Spawns an actor and attaches an ability system with `attributes`.
    pub async fn spawn_actor(&self, avatar: Avatar, attributes: Box<dyn AttributeSet>) -> Result<ActorId> {
        self.request(|reply| Command::SpawnActor {
            avatar,
            attributes,
            reply,
        })
        .await?
    }

    pub async fn despawn_actor(&self, actor: ActorId) -> Result<()> {
        self.request(|reply| Command::DespawnActor { actor, reply }).await?
    }

    pub async fn grant_ability(
        &self,
        actor: ActorId,
        ability: Box<dyn GameplayAbility>,
        level: i32,
    ) -> Result<AbilitySpecHandle> {
        self.request(|reply| Command::GrantAbility {
            actor,
            ability,
            level,
            reply,
        })
        .await?
    }

    /// Activates a granted ability.
    ///
    /// A refused activation surfaces as [`RuntimeError::ActivationRefused`]
    /// carrying the reason.
    pub async fn activate_ability(&self, actor: ActorId, handle: AbilitySpecHandle) -> Result<()> {
        self.request(|reply| Command::ActivateAbility { actor, handle, reply })
            .await?
    }

    pub async fn activate_ability_by_name(&self, actor: ActorId, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        self.request(|reply| Command::ActivateAbilityByName { actor, name, reply })
            .await?
    }

    /// Moves the aim point of the actor's pending targeting sessions.
    pub async fn update_aim(&self, actor: ActorId, point: Vec3<f32>) -> Result<()> {
        self.request(|reply| Command::UpdateAim { actor, point, reply })
            .await?
    }

    /// Confirms pending targeting; returns how many sessions resolved.
    pub async fn confirm_targeting(&self, actor: ActorId) -> Result<usize> {
        self.request(|reply| Command::ConfirmTargeting { actor, reply })
            .await?
    }

    pub async fn cancel_targeting(&self, actor: ActorId) -> Result<usize> {
        self.request(|reply| Command::CancelTargeting { actor, reply })
            .await?
    }

    pub async fn apply_effect(&self, target: ActorId, spec: GameplayEffectSpec) -> Result<EffectApplication> {
        self.request(|reply| Command::ApplyEffect { target, spec, reply })
            .await?
    }

    pub async fn add_loose_tag(&self, actor: ActorId, tag: GameplayTag) -> Result<()> {
        self.request(|reply| Command::AddLooseTag { actor, tag, reply })
            .await?
    }

    pub async fn remove_loose_tag(&self, actor: ActorId, tag: GameplayTag) -> Result<bool> {
        self.request(|reply| Command::RemoveLooseTag { actor, tag, reply })
            .await?
    }

    pub async fn send_gameplay_event(&self, event: GameplayEventData) -> Result<()> {
        self.request(|reply| Command::SendGameplayEvent { event, reply })
            .await
    }

    /// Advances the world by `delta` seconds and returns the new frame number.
    pub async fn tick(&self, delta: f32) -> Result<u64> {
        self.request(|reply| Command::Tick {
            delta,
            reply: Some(reply),
        })
        .await
    }

    /// Query the current world (read-only snapshot)
    pub async fn snapshot(&self) -> Result<WorldSnapshot> {
        self.request(|reply| Command::QuerySnapshot { reply }).await
    }

    /// Runs `f` against the world on the simulation task.
    ///
    /// Journal entries produced by `f` are published like any other command's.
    pub async fn with_world<R, F>(&self, f: F) -> Result<R>
    where
        R: Send + 'static,
        F: FnOnce(&mut GameplayWorld) -> R + Send + 'static,
    {
        self.request(|reply| Command::WithWorld {
            f: Box::new(move |world: &mut GameplayWorld| {
                // The caller may have given up waiting.
                let _ = reply.send(f(world));
            }),
        })
        .await
    }

    /// Subscribe to events from a specific topic
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use gas_runtime::Topic;
    ///
    /// let mut abilities = handle.subscribe(Topic::Ability);
    /// while let Ok(event) = abilities.recv().await {
    ///     // Handle activation and end events
    /// }
    /// ```
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.event_bus.subscribe(topic)
    }

    /// Subscribe to multiple topics at once
    pub fn subscribe_multiple(&self, topics: &[Topic]) -> HashMap<Topic, broadcast::Receiver<Event>> {
        self.event_bus.subscribe_multiple(topics)
    }

    /// Get a reference to the event bus for advanced usage
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }
}
