//! Serializable read model of a [`GameplayWorld`].
//!
//! The worker owns the world; clients receive snapshots instead of borrowing
//! it across the channel boundary.

use gas_core::{
    AbilitySpecHandle, ActiveEffectHandle, ActorId, AttributeValue, DurationPolicy, GameplayTag,
    GameplayWorld,
};
use serde::{Deserialize, Serialize};
use vek::Vec3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub frame: u64,
    pub actors: Vec<ActorSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActorSnapshot {
    pub id: ActorId,
    pub position: Vec3<f32>,
    pub forward: Vec3<f32>,
    /// `None` for actors without an ability system.
    pub abilities_state: Option<AbilitySystemSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbilitySystemSnapshot {
    pub attributes: Vec<(String, AttributeValue)>,
    /// Owned tags with their reference counts.
    pub tags: Vec<(GameplayTag, u32)>,
    pub effects: Vec<EffectSnapshot>,
    pub abilities: Vec<AbilitySnapshot>,
    pub pending_tasks: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectSnapshot {
    pub handle: ActiveEffectHandle,
    pub name: String,
    pub level: i32,
    pub source: Option<ActorId>,
    pub stack_count: u32,
    /// Seconds left, for duration effects.
    pub time_remaining: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbilitySnapshot {
    pub handle: AbilitySpecHandle,
    pub name: String,
    pub level: i32,
    pub active: bool,
}

impl WorldSnapshot {
    pub fn capture(world: &GameplayWorld) -> Self {
        let mut actors: Vec<ActorSnapshot> = world
            .actors()
            .filter_map(|id| {
                let avatar = world.avatar(id)?;
                Some(ActorSnapshot {
                    id,
                    position: avatar.position,
                    forward: avatar.forward,
                    abilities_state: capture_component(world, id),
                })
            })
            .collect();
        actors.sort_by_key(|actor| actor.id);

        Self {
            frame: world.frame(),
            actors,
        }
    }

    pub fn actor(&self, id: ActorId) -> Option<&ActorSnapshot> {
        self.actors.iter().find(|actor| actor.id == id)
    }
}

impl ActorSnapshot {
    /// Current value of `attribute`, if the actor has one by that name.
    pub fn current(&self, attribute: &str) -> Option<f32> {
        self.abilities_state
            .as_ref()?
            .attributes
            .iter()
            .find(|(name, _)| name == attribute)
            .map(|(_, value)| value.current)
    }

    pub fn has_tag(&self, tag: GameplayTag) -> bool {
        self.abilities_state
            .as_ref()
            .is_some_and(|asc| asc.tags.iter().any(|(owned, _)| *owned == tag))
    }
}

fn capture_component(world: &GameplayWorld, id: ActorId) -> Option<AbilitySystemSnapshot> {
    let asc = world.asc(id)?;

    let attributes = asc
        .attributes()
        .storage()
        .snapshot()
        .into_iter()
        .map(|(name, value)| (name.to_owned(), value))
        .collect();

    let effects = asc
        .active_effects()
        .iter()
        .map(|active| {
            let spec = active.spec();
            EffectSnapshot {
                handle: active.handle(),
                name: active.name().to_owned(),
                level: spec.level(),
                source: spec.source(),
                stack_count: active.stack_count(),
                time_remaining: match spec.def().duration {
                    DurationPolicy::HasDuration(_) => Some(active.time_remaining()),
                    _ => None,
                },
            }
        })
        .collect();

    let abilities = asc
        .ability_specs()
        .iter()
        .map(|spec| AbilitySnapshot {
            handle: spec.handle(),
            name: spec.name().to_owned(),
            level: spec.level(),
            active: spec.is_active(),
        })
        .collect();

    let pending_tasks = world
        .pending_tasks(id)
        .into_iter()
        .map(|(_, kind)| kind.to_string())
        .collect();

    Some(AbilitySystemSnapshot {
        attributes,
        tags: asc.owned_tags().iter().collect(),
        effects,
        abilities,
        pending_tasks,
    })
}
