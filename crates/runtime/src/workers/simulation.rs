//! Simulation worker that owns the authoritative [`GameplayWorld`].
//!
//! Receives commands from [`crate::RuntimeHandle`], applies them to the
//! world, then drains the world journal onto the [`EventBus`].

use gas_core::{
    AbilitySpecHandle, ActorId, AttributeSet, Avatar, EffectApplication, GameplayAbility, GameplayEffectSpec,
    GameplayEventData, GameplayTag, GameplayWorld,
};
use tokio::sync::{mpsc, oneshot};
use tracing::debug;
use vek::Vec3;

use crate::api::{Result, RuntimeError};
use crate::events::{Event, EventBus};
use crate::snapshot::WorldSnapshot;

pub(crate) type WorldFn = Box<dyn FnOnce(&mut GameplayWorld) + Send>;

/// Commands that can be sent to the simulation worker
pub enum Command {
    SpawnActor {
        avatar: Avatar,
        attributes: Box<dyn AttributeSet>,
        reply: oneshot::Sender<Result<ActorId>>,
    },
    DespawnActor {
        actor: ActorId,
        reply: oneshot::Sender<Result<()>>,
    },
    GrantAbility {
        actor: ActorId,
        ability: Box<dyn GameplayAbility>,
        level: i32,
        reply: oneshot::Sender<Result<AbilitySpecHandle>>,
    },
    ActivateAbility {
        actor: ActorId,
        handle: AbilitySpecHandle,
        reply: oneshot::Sender<Result<()>>,
    },
    ActivateAbilityByName {
        actor: ActorId,
        name: String,
        reply: oneshot::Sender<Result<()>>,
    },
    UpdateAim {
        actor: ActorId,
        point: Vec3<f32>,
        reply: oneshot::Sender<Result<()>>,
    },
    /// Confirms every pending targeting session of the actor.
    ConfirmTargeting {
        actor: ActorId,
        reply: oneshot::Sender<Result<usize>>,
    },
    CancelTargeting {
        actor: ActorId,
        reply: oneshot::Sender<Result<usize>>,
    },
    ApplyEffect {
        target: ActorId,
        spec: GameplayEffectSpec,
        reply: oneshot::Sender<Result<EffectApplication>>,
    },
    AddLooseTag {
        actor: ActorId,
        tag: GameplayTag,
        reply: oneshot::Sender<Result<()>>,
    },
    RemoveLooseTag {
        actor: ActorId,
        tag: GameplayTag,
        reply: oneshot::Sender<Result<bool>>,
    },
    SendGameplayEvent {
        event: GameplayEventData,
        reply: oneshot::Sender<()>,
    },
    /// Advances the world. The frame driver sends these without a reply.
    Tick {
        delta: f32,
        reply: Option<oneshot::Sender<u64>>,
    },
    QuerySnapshot {
        reply: oneshot::Sender<WorldSnapshot>,
    },
    /// Runs arbitrary code against the world on the worker task.
    WithWorld { f: WorldFn },
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Command::SpawnActor { .. } => "SpawnActor",
            Command::DespawnActor { .. } => "DespawnActor",
            Command::GrantAbility { .. } => "GrantAbility",
            Command::ActivateAbility { .. } => "ActivateAbility",
            Command::ActivateAbilityByName { .. } => "ActivateAbilityByName",
            Command::UpdateAim { .. } => "UpdateAim",
            Command::ConfirmTargeting { .. } => "ConfirmTargeting",
            Command::CancelTargeting { .. } => "CancelTargeting",
            Command::ApplyEffect { .. } => "ApplyEffect",
            Command::AddLooseTag { .. } => "AddLooseTag",
            Command::RemoveLooseTag { .. } => "RemoveLooseTag",
            Command::SendGameplayEvent { .. } => "SendGameplayEvent",
            Command::Tick { .. } => "Tick",
            Command::QuerySnapshot { .. } => "QuerySnapshot",
            Command::WithWorld { .. } => "WithWorld",
        }
    }
}

fn respond<T>(command: &'static str, reply: oneshot::Sender<T>, value: T) {
    if reply.send(value).is_err() {
        debug!("{command} reply channel closed (caller dropped)");
    }
}

/// Background task that processes gameplay commands.
pub struct SimulationWorker {
    world: GameplayWorld,
    command_rx: mpsc::Receiver<Command>,
    event_bus: EventBus,
}

impl SimulationWorker {
    pub fn new(world: GameplayWorld, command_rx: mpsc::Receiver<Command>, event_bus: EventBus) -> Self {
        tracing::info!(
            actors = world.actors().count(),
            frame = world.frame(),
            "SimulationWorker initialized"
        );

        Self {
            world,
            command_rx,
            event_bus,
        }
    }

    /// Main worker loop. Ends when every command sender is dropped.
    pub async fn run(mut self) {
        loop {
            tokio::select! {
                Some(cmd) = self.command_rx.recv() => {
                    self.handle_command(cmd);
                }
                else => break,
            }
        }
        debug!(frame = self.world.frame(), "SimulationWorker stopped");
    }

    fn handle_command(&mut self, cmd: Command) {
        let name = cmd.name();
        match cmd {
            Command::SpawnActor {
                avatar,
                attributes,
                reply,
            } => {
                let result = self.spawn(avatar, attributes);
                self.publish_journal();
                respond(name, reply, result);
            }
            Command::DespawnActor { actor, reply } => {
                let result = self.world.despawn_actor(actor).map_err(RuntimeError::from);
                self.publish_journal();
                respond(name, reply, result);
            }
            Command::GrantAbility {
                actor,
                ability,
                level,
                reply,
            } => {
                let result = self
                    .world
                    .grant_ability(actor, ability, level)
                    .map_err(RuntimeError::from);
                respond(name, reply, result);
            }
            Command::ActivateAbility { actor, handle, reply } => {
                let result = self.activate(actor, handle);
                self.publish_journal();
                respond(name, reply, result);
            }
            Command::ActivateAbilityByName { actor, name: ability, reply } => {
                let result = self
                    .world
                    .ability_handle(actor, &ability)
                    .map_err(RuntimeError::from)
                    .and_then(|handle| self.activate(actor, handle));
                self.publish_journal();
                respond(name, reply, result);
            }
            Command::UpdateAim { actor, point, reply } => {
                let result = self
                    .world
                    .update_targeting_aim(actor, point)
                    .map_err(RuntimeError::from);
                respond(name, reply, result);
            }
            Command::ConfirmTargeting { actor, reply } => {
                let result = self.world.confirm_targeting(actor).map_err(RuntimeError::from);
                self.publish_journal();
                respond(name, reply, result);
            }
            Command::CancelTargeting { actor, reply } => {
                let result = self.world.cancel_targeting(actor).map_err(RuntimeError::from);
                self.publish_journal();
                respond(name, reply, result);
            }
            Command::ApplyEffect { target, spec, reply } => {
                let result = self
                    .world
                    .apply_effect_spec(target, spec)
                    .map_err(RuntimeError::from);
                self.publish_journal();
                respond(name, reply, result);
            }
            Command::AddLooseTag { actor, tag, reply } => {
                let result = self.world.add_loose_tag(actor, tag).map_err(RuntimeError::from);
                self.publish_journal();
                respond(name, reply, result);
            }
            Command::RemoveLooseTag { actor, tag, reply } => {
                let result = self.world.remove_loose_tag(actor, tag).map_err(RuntimeError::from);
                self.publish_journal();
                respond(name, reply, result);
            }
            Command::SendGameplayEvent { event, reply } => {
                self.world.send_gameplay_event(event);
                self.publish_journal();
                respond(name, reply, ());
            }
            Command::Tick { delta, reply } => {
                self.world.tick(delta);
                self.publish_journal();
                if let Some(reply) = reply {
                    respond(name, reply, self.world.frame());
                }
            }
            Command::QuerySnapshot { reply } => {
                respond(name, reply, WorldSnapshot::capture(&self.world));
            }
            Command::WithWorld { f } => {
                f(&mut self.world);
                self.publish_journal();
            }
        }
    }

    fn spawn(&mut self, avatar: Avatar, attributes: Box<dyn AttributeSet>) -> Result<ActorId> {
        let actor = self.world.spawn_actor(avatar);
        self.world.add_ability_system(actor, attributes)?;
        Ok(actor)
    }

    fn activate(&mut self, actor: ActorId, handle: AbilitySpecHandle) -> Result<()> {
        self.world.activate_ability(actor, handle).map_err(|failure| {
            debug!(%actor, %failure, "activation refused");
            RuntimeError::ActivationRefused(failure)
        })
    }

    /// Moves journal entries onto the bus, stamped with the current frame.
    fn publish_journal(&mut self) {
        let frame = self.world.frame();
        for event in self.world.take_journal() {
            self.event_bus.publish(Event::World { frame, event });
        }
    }
}
