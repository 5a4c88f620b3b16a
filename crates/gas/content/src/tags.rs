//! Tags used by the sample content.
//!
//! Tags are interned once when the content is set up and passed around as
//! `Arc<SampleTags>`, so hooks and abilities never look names up at runtime.

use gas_core::{GameplayTag, GameplayTagContainer, TagError};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SampleTags {
    // States
    pub state_dead: GameplayTag,
    pub state_stunned: GameplayTag,
    pub state_burning: GameplayTag,
    pub state_poisoned: GameplayTag,

    // Debuffs
    pub debuff_burn: GameplayTag,
    pub debuff_poison: GameplayTag,

    // Abilities and cooldowns
    pub ability_fireball: GameplayTag,
    pub ability_meteor: GameplayTag,
    pub ability_purify: GameplayTag,
    pub cooldown_fireball: GameplayTag,
    pub cooldown_meteor: GameplayTag,
    pub cooldown_purify: GameplayTag,

    // Events
    pub event_character_death: GameplayTag,
    pub event_character_leveled_up: GameplayTag,
    pub event_experience_gain: GameplayTag,

    // SetByCaller keys
    pub data_damage_multiplier: GameplayTag,

    // Cues
    pub cue_fireball_impact: GameplayTag,
    pub cue_meteor_impact: GameplayTag,
    pub cue_burn_loop: GameplayTag,
    pub cue_purify_effect: GameplayTag,
    pub cue_level_up: GameplayTag,

    // Factions
    pub faction_player: GameplayTag,
    pub faction_enemy: GameplayTag,
}

impl SampleTags {
    /// Interns every sample tag. Idempotent.
    pub fn register() -> Result<Self, TagError> {
        Ok(Self {
            state_dead: GameplayTag::request("State.Dead")?,
            state_stunned: GameplayTag::request("State.Stunned")?,
            state_burning: GameplayTag::request("State.Burning")?,
            state_poisoned: GameplayTag::request("State.Poisoned")?,

            debuff_burn: GameplayTag::request("Debuff.Burn")?,
            debuff_poison: GameplayTag::request("Debuff.Poison")?,

            ability_fireball: GameplayTag::request("Ability.Skill.Fireball")?,
            ability_meteor: GameplayTag::request("Ability.Skill.Meteor")?,
            ability_purify: GameplayTag::request("Ability.Skill.Purify")?,
            cooldown_fireball: GameplayTag::request("Cooldown.Skill.Fireball")?,
            cooldown_meteor: GameplayTag::request("Cooldown.Skill.Meteor")?,
            cooldown_purify: GameplayTag::request("Cooldown.Skill.Purify")?,

            event_character_death: GameplayTag::request("Event.Character.Death")?,
            event_character_leveled_up: GameplayTag::request("Event.Character.LeveledUp")?,
            event_experience_gain: GameplayTag::request("Event.Experience.Gain")?,

            data_damage_multiplier: GameplayTag::request("Data.DamageMultiplier")?,

            cue_fireball_impact: GameplayTag::request("GameplayCue.Fireball.Impact")?,
            cue_meteor_impact: GameplayTag::request("GameplayCue.Meteor.Impact")?,
            cue_burn_loop: GameplayTag::request("GameplayCue.Burn.Loop")?,
            cue_purify_effect: GameplayTag::request("GameplayCue.Purify.Effect")?,
            cue_level_up: GameplayTag::request("GameplayCue.Character.LevelUp")?,

            faction_player: GameplayTag::request("Faction.Player")?,
            faction_enemy: GameplayTag::request("Faction.NPC.Enemy")?,
        })
    }

    pub fn poison(&self) -> GameplayTagContainer {
        GameplayTagContainer::single(self.debuff_poison)
    }

    /// Every faction tag, for queries that exclude "anyone in a faction".
    pub fn factions(&self) -> GameplayTagContainer {
        [self.faction_player, self.faction_enemy].into_iter().collect()
    }
}
