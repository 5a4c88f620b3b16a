#![allow(dead_code)]

use std::sync::Arc;

use gas_content::{CharacterAttribute, CharacterStats, LevelData, LevelTable, SampleTags, install_observers, spawn_character};
use gas_core::{
    AbilityConfig, ActorId, Avatar, GameplayEffect, GameplayTag, GameplayWorld, InstancingPolicy, MagnitudeSource,
    ModifierInfo, ModifierOp, WorldEvent,
};
use vek::Vec3;

pub fn tags() -> Arc<SampleTags> {
    Arc::new(SampleTags::register().expect("sample tags"))
}

pub fn levels() -> Arc<LevelTable> {
    let level = |xp| LevelData {
        xp_to_next_level: xp,
        health_gain: 10.0,
        mana_gain: 5.0,
        attack_gain: 2.0,
        defense_gain: 1.0,
    };
    Arc::new(LevelTable::new(vec![level(100), level(200), level(400), level(0)]))
}

pub fn damage_effect(name: &str, amount: f32) -> Arc<GameplayEffect> {
    GameplayEffect::instant(name)
        .with_modifier(ModifierInfo::new(
            CharacterAttribute::Damage.name(),
            ModifierOp::Add,
            MagnitudeSource::constant(amount),
        ))
        .into_shared()
}

pub fn bounty_effect(tags: &SampleTags, base: f32, per_level: f32) -> Arc<GameplayEffect> {
    GameplayEffect::instant("GE_Bounty")
        .with_modifier(ModifierInfo::new(
            CharacterAttribute::Experience.name(),
            ModifierOp::Add,
            MagnitudeSource::Scalable(gas_core::ScalableFloat::new(base, per_level)),
        ))
        .with_asset_tag(tags.event_experience_gain)
        .into_shared()
}

pub fn world(tags: &Arc<SampleTags>, bounty: Option<Arc<GameplayEffect>>) -> GameplayWorld {
    let mut world = GameplayWorld::default();
    install_observers(&mut world, tags, levels(), bounty);
    world
}

pub fn spawn(
    world: &mut GameplayWorld,
    tags: &Arc<SampleTags>,
    position: Vec3<f32>,
    faction: GameplayTag,
    stats: CharacterStats,
) -> ActorId {
    spawn_character(world, tags, Avatar::new(position), faction, &stats).expect("spawn character")
}

pub fn config(name: &str, instancing: InstancingPolicy) -> Arc<AbilityConfig> {
    Arc::new(AbilityConfig::new(name, instancing))
}

pub fn value(world: &GameplayWorld, actor: ActorId, attribute: CharacterAttribute) -> f32 {
    world.asc(actor).expect("asc").current_value(attribute.id())
}

pub fn has_tag(world: &GameplayWorld, actor: ActorId, tag: GameplayTag) -> bool {
    world.asc(actor).expect("asc").has_tag(tag)
}

/// Gameplay events with `tag` in the journal.
pub fn events(world: &GameplayWorld, tag: GameplayTag) -> Vec<gas_core::GameplayEventData> {
    world
        .journal()
        .iter()
        .filter_map(|event| match event {
            WorldEvent::Gameplay(data) if data.tag == tag => Some(data.clone()),
            _ => None,
        })
        .collect()
}
