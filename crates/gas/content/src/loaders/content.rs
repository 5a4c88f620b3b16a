//! The loaded sample game: everything needed to build and populate a world.

use std::collections::BTreeMap;
use std::sync::Arc;

use gas_core::{ActorId, Avatar, GameplayEffectSpec, GameplayWorld, GasConfig};
use vek::Vec3;

use crate::character::{LevelTable, install_observers, spawn_character};
use crate::error::LoadError;
use crate::loaders::{AbilityCatalog, CharacterTemplate, EffectLibrary, LoadResult};
use crate::tags::SampleTags;

#[derive(Debug)]
pub struct SampleContent {
    pub tags: Arc<SampleTags>,
    pub config: GasConfig,
    pub effects: EffectLibrary,
    pub abilities: AbilityCatalog,
    pub levels: Arc<LevelTable>,
    pub characters: BTreeMap<String, CharacterTemplate>,
}

impl SampleContent {
    /// Effect applied to whoever lands a killing blow, when defined.
    pub const BOUNTY_EFFECT: &'static str = "GE_Bounty";

    /// Checks that every name a character template references exists.
    pub fn validate(&self) -> Result<(), LoadError> {
        for template in self.characters.values() {
            for (ability, _) in &template.abilities {
                if !self.abilities.contains(ability) {
                    return Err(LoadError::UnknownAbility {
                        owner: template.name.clone(),
                        ability: ability.clone(),
                    });
                }
            }
            for effect in &template.passive_effects {
                self.effects.get(&template.name, effect)?;
            }
        }
        Ok(())
    }

    pub fn template(&self, name: &str) -> Result<&CharacterTemplate, LoadError> {
        self.characters
            .get(name)
            .ok_or_else(|| LoadError::UnknownCharacter(name.to_owned()))
    }

    /// A world configured from this content with progression and bounty
    /// observers installed.
    pub fn create_world(&self) -> GameplayWorld {
        let mut world = GameplayWorld::new(self.config.clone());
        install_observers(
            &mut world,
            &self.tags,
            Arc::clone(&self.levels),
            self.effects.find(Self::BOUNTY_EFFECT),
        );
        world
    }

    /// Spawns `name` at `position`, grants its abilities and applies its
    /// passive effects.
    pub fn spawn(&self, world: &mut GameplayWorld, name: &str, position: Vec3<f32>) -> LoadResult<ActorId> {
        let template = self.template(name)?;
        let avatar = Avatar::new(position).with_radius(template.radius);
        let actor = spawn_character(world, &self.tags, avatar, template.faction, &template.stats)?;

        for (ability, level) in &template.abilities {
            let instance = self.abilities.instantiate(&template.name, ability)?;
            world.grant_ability(actor, instance, *level)?;
        }

        let level = template.stats.level as i32;
        for effect in &template.passive_effects {
            let def = self.effects.get(&template.name, effect)?;
            world.apply_effect_spec(actor, GameplayEffectSpec::new(def, level))?;
        }

        tracing::info!(%actor, template = name, ?position, "spawned from template");
        Ok(actor)
    }
}
