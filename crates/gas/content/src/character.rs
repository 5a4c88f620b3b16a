//! Sample characters: spawning, level progression and kill bounties.
//!
//! Progression and bounties are cross-actor reactions, so they run as
//! gameplay event observers rather than inside attribute hooks:
//! - the Damage hook queues `Event.Character.Death` → [`BountyObserver`]
//!   applies the bounty effect to the killer;
//! - an Experience write tagged `Event.Experience.Gain` queues the gain
//!   event → [`LevelUpObserver`] consumes experience into levels.

use std::sync::Arc;

use gas_core::{
    ActorId, AttributeSet, Avatar, GameplayEffect, GameplayEffectSpec, GameplayEventData, GameplayEventObserver,
    GameplayTag, GameplayWorld, MagnitudeSource, ModifierInfo, ModifierOp, WorldError,
};

use crate::attributes::{CharacterAttribute, CharacterAttributeSet};
use crate::tags::SampleTags;

// ============================================================================
// Stats
// ============================================================================

/// Starting attribute values of a character.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CharacterStats {
    pub level: f32,
    pub max_health: f32,
    pub health: f32,
    pub max_mana: f32,
    pub mana: f32,
    pub attack: f32,
    pub defense: f32,
    pub speed: f32,
    pub bonus_damage_multiplier: f32,
}

impl Default for CharacterStats {
    fn default() -> Self {
        Self {
            level: 1.0,
            max_health: 100.0,
            health: 100.0,
            max_mana: 50.0,
            mana: 50.0,
            attack: 10.0,
            defense: 0.0,
            speed: 5.0,
            bonus_damage_multiplier: 1.0,
        }
    }
}

impl CharacterStats {
    /// Builds a seeded attribute set. Bounds are written before the values
    /// they clamp.
    pub fn build_set(&self, tags: Arc<SampleTags>) -> CharacterAttributeSet {
        use CharacterAttribute as Attr;

        let mut set = CharacterAttributeSet::new(tags);
        set.init(Attr::Level, self.level);
        set.init(Attr::MaxHealth, self.max_health);
        set.init(Attr::Health, self.health);
        set.init(Attr::MaxMana, self.max_mana);
        set.init(Attr::Mana, self.mana);
        set.init(Attr::Attack, self.attack);
        set.init(Attr::Defense, self.defense);
        set.init(Attr::Speed, self.speed);
        set.init(Attr::BonusDamageMultiplier, self.bonus_damage_multiplier);
        set
    }
}

/// Spawns an actor with a character attribute set and its faction tag.
pub fn spawn_character(
    world: &mut GameplayWorld,
    tags: &Arc<SampleTags>,
    avatar: Avatar,
    faction: GameplayTag,
    stats: &CharacterStats,
) -> Result<ActorId, WorldError> {
    let actor = world.spawn_actor(avatar);
    world.add_ability_system(actor, Box::new(stats.build_set(Arc::clone(tags))))?;
    world.add_loose_tag(actor, faction)?;
    tracing::debug!(%actor, %faction, level = stats.level, "character spawned");
    Ok(actor)
}

// ============================================================================
// Level table
// ============================================================================

/// Cost and rewards of leaving one level.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LevelData {
    pub xp_to_next_level: u32,
    pub health_gain: f32,
    pub mana_gain: f32,
    pub attack_gain: f32,
    pub defense_gain: f32,
}

/// Accumulated result of one progression check.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LevelUp {
    pub levels_gained: u32,
    pub final_level: u32,
    pub xp_spent: u32,
    pub health_gain: f32,
    pub mana_gain: f32,
    pub attack_gain: f32,
    pub defense_gain: f32,
}

/// `levels[n - 1]` describes leaving level `n`. The last entry is the cap.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct LevelTable {
    levels: Vec<LevelData>,
}

impl LevelTable {
    pub fn new(levels: Vec<LevelData>) -> Self {
        Self { levels }
    }

    pub fn levels(&self) -> &[LevelData] {
        &self.levels
    }

    pub fn max_level(&self) -> u32 {
        self.levels.len() as u32
    }

    /// Levels reachable from `level` with `experience`, possibly several at once.
    pub fn progress(&self, level: u32, experience: u32) -> Option<LevelUp> {
        let start = level.max(1);
        let mut current = start;
        let mut remaining = experience;
        let mut result = LevelUp::default();

        while (current as usize) < self.levels.len() {
            let data = self.levels[current as usize - 1];
            if data.xp_to_next_level == 0 || remaining < data.xp_to_next_level {
                break;
            }
            remaining -= data.xp_to_next_level;
            result.xp_spent += data.xp_to_next_level;
            result.levels_gained += 1;
            result.health_gain += data.health_gain;
            result.mana_gain += data.mana_gain;
            result.attack_gain += data.attack_gain;
            result.defense_gain += data.defense_gain;
            current += 1;
        }

        if result.levels_gained == 0 {
            return None;
        }
        result.final_level = current;
        Some(result)
    }
}

// ============================================================================
// Observers
// ============================================================================

/// Consumes experience into levels when an experience gain event arrives.
#[derive(Debug)]
pub struct LevelUpObserver {
    tags: Arc<SampleTags>,
    table: Arc<LevelTable>,
}

impl LevelUpObserver {
    pub fn new(tags: Arc<SampleTags>, table: Arc<LevelTable>) -> Self {
        Self { tags, table }
    }

    fn level_up_effect(&self, level_up: &LevelUp) -> GameplayEffect {
        use CharacterAttribute as Attr;

        let add = |attribute: Attr, value: f32| {
            ModifierInfo::new(attribute.name(), ModifierOp::Add, MagnitudeSource::constant(value))
        };
        GameplayEffect::instant(format!("LevelUp.ToLevel{}", level_up.final_level))
            .with_modifier(add(Attr::Experience, -(level_up.xp_spent as f32)))
            .with_modifier(add(Attr::Level, level_up.levels_gained as f32))
            .with_modifier(add(Attr::MaxHealth, level_up.health_gain))
            .with_modifier(add(Attr::Health, level_up.health_gain))
            .with_modifier(add(Attr::MaxMana, level_up.mana_gain))
            .with_modifier(add(Attr::Mana, level_up.mana_gain))
            .with_modifier(add(Attr::Attack, level_up.attack_gain))
            .with_modifier(add(Attr::Defense, level_up.defense_gain))
            .with_cue(self.tags.cue_level_up)
    }
}

impl GameplayEventObserver for LevelUpObserver {
    fn on_gameplay_event(&self, world: &mut GameplayWorld, event: &GameplayEventData) {
        let actor = event.target;
        let Some(asc) = world.asc(actor) else {
            tracing::warn!(%actor, "experience gain for actor without ability system");
            return;
        };
        if asc.has_tag(self.tags.state_dead) {
            return;
        }

        let attributes = asc.attributes();
        let level = attributes.current_value(CharacterAttribute::Level.id()).max(1.0) as u32;
        let experience = attributes.current_value(CharacterAttribute::Experience.id()).max(0.0) as u32;
        let Some(level_up) = self.table.progress(level, experience) else {
            return;
        };

        let spec = GameplayEffectSpec::with_source_attributes(
            self.level_up_effect(&level_up).into_shared(),
            level_up.final_level as i32,
            Some(actor),
            None,
        );
        if let Err(err) = world.apply_effect_spec(actor, spec) {
            tracing::error!(%actor, %err, "level-up effect could not be applied");
            return;
        }
        tracing::info!(%actor, gained = level_up.levels_gained, level = level_up.final_level, "character leveled up");
        world.send_gameplay_event(
            GameplayEventData::new(self.tags.event_character_leveled_up, actor)
                .with_magnitude(level_up.final_level as f32),
        );
    }
}

/// Grants the bounty effect to whoever killed a character.
///
/// The spec is sourced from the victim at the victim's level, so bounty
/// magnitudes can scale with how strong the kill was.
#[derive(Debug)]
pub struct BountyObserver {
    bounty: Arc<GameplayEffect>,
}

impl BountyObserver {
    pub fn new(bounty: Arc<GameplayEffect>) -> Self {
        Self { bounty }
    }
}

impl GameplayEventObserver for BountyObserver {
    fn on_gameplay_event(&self, world: &mut GameplayWorld, event: &GameplayEventData) {
        let victim = event.target;
        let Some(killer) = event.instigator else {
            return;
        };
        if killer == victim {
            tracing::debug!(%victim, "self-inflicted death grants no bounty");
            return;
        }
        if world.asc(killer).is_none() {
            tracing::debug!(%victim, %killer, "killer has no ability system, bounty skipped");
            return;
        }

        let spec = match world.asc(victim) {
            Some(asc) => {
                let level = asc.current_value(CharacterAttribute::Level.id()).max(1.0) as i32;
                asc.make_outgoing_spec(Arc::clone(&self.bounty), level)
            }
            None => GameplayEffectSpec::with_source_attributes(Arc::clone(&self.bounty), 1, Some(victim), None),
        };
        match world.apply_effect_spec(killer, spec) {
            Ok(result) => tracing::info!(%victim, %killer, ?result, "bounty granted"),
            Err(err) => tracing::error!(%victim, %killer, %err, "bounty could not be applied"),
        }
    }
}

/// Registers the progression and bounty observers on `world`.
pub fn install_observers(
    world: &mut GameplayWorld,
    tags: &Arc<SampleTags>,
    levels: Arc<LevelTable>,
    bounty: Option<Arc<GameplayEffect>>,
) {
    world.add_event_observer(
        tags.event_experience_gain,
        Box::new(LevelUpObserver::new(Arc::clone(tags), levels)),
    );
    if let Some(bounty) = bounty {
        world.add_event_observer(tags.event_character_death, Box::new(BountyObserver::new(bounty)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> LevelTable {
        let level = |xp, health| LevelData {
            xp_to_next_level: xp,
            health_gain: health,
            mana_gain: 5.0,
            attack_gain: 2.0,
            defense_gain: 1.0,
        };
        LevelTable::new(vec![level(100, 10.0), level(200, 20.0), level(400, 30.0), level(0, 0.0)])
    }

    #[test]
    fn progress_below_threshold_is_none() {
        assert_eq!(table().progress(1, 99), None);
    }

    #[test]
    fn progress_can_gain_several_levels() {
        let level_up = table().progress(1, 320).expect("enough for two levels");
        assert_eq!(level_up.levels_gained, 2);
        assert_eq!(level_up.final_level, 3);
        assert_eq!(level_up.xp_spent, 300);
        assert_eq!(level_up.health_gain, 30.0);
    }

    #[test]
    fn progress_stops_at_the_last_level() {
        let level_up = table().progress(3, 10_000).expect("one level left");
        assert_eq!(level_up.final_level, 4);
        assert_eq!(table().progress(4, 10_000), None);
        assert_eq!(table().max_level(), 4);
    }

    #[test]
    fn default_stats_start_full() {
        let stats = CharacterStats::default();
        assert_eq!(stats.health, stats.max_health);
        assert_eq!(stats.level, 1.0);
    }
}
