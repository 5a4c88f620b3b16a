//! Ability loader: resolves effect names and builds ability templates.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use gas_core::{AbilityConfig, GameplayAbility, GameplayTagContainer, InstancingPolicy, TargetingQuery};
use serde::{Deserialize, Serialize};

use crate::abilities::{FireballAbility, MeteorAbility, PurifyAbility};
use crate::error::LoadError;
use crate::loaders::{EffectLibrary, LoadResult, read_file};
use crate::tags::SampleTags;

/// Behaviour-specific parameters of an ability.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum AbilityKindAsset {
    Fireball {
        damage: String,
        #[serde(default)]
        burn: Option<String>,
        #[serde(default)]
        range: Option<f32>,
        #[serde(default)]
        query: TargetingQuery,
    },
    Meteor {
        damage: String,
        max_range: f32,
        radius: f32,
        impact_delay: f32,
        #[serde(default)]
        query: TargetingQuery,
    },
    Purify {
        radius: f32,
        #[serde(default)]
        required_factions: GameplayTagContainer,
        #[serde(default)]
        forbidden_factions: GameplayTagContainer,
    },
}

/// Serialized form of an ability: shared configuration plus its kind.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AbilityAsset {
    pub name: String,
    #[serde(default)]
    pub instancing: InstancingPolicy,
    #[serde(default)]
    pub cost: Option<String>,
    #[serde(default)]
    pub cooldown: Option<String>,
    #[serde(default)]
    pub ability_tags: GameplayTagContainer,
    #[serde(default)]
    pub cancel_abilities_with_tag: GameplayTagContainer,
    #[serde(default)]
    pub block_abilities_with_tag: GameplayTagContainer,
    #[serde(default)]
    pub activation_owned_tags: GameplayTagContainer,
    #[serde(default)]
    pub activation_required_tags: GameplayTagContainer,
    #[serde(default)]
    pub activation_blocked_tags: GameplayTagContainer,
    pub kind: AbilityKindAsset,
}

impl AbilityAsset {
    fn build_config(&self, effects: &EffectLibrary) -> Result<AbilityConfig, LoadError> {
        let mut config = AbilityConfig::new(self.name.clone(), self.instancing);
        if let Some(cost) = &self.cost {
            let cost = effects.get(&self.name, cost)?;
            if !cost.is_instant() {
                return Err(LoadError::CostNotInstant {
                    ability: self.name.clone(),
                    effect: cost.name.clone(),
                });
            }
            config.cost = Some(cost);
        }
        if let Some(cooldown) = &self.cooldown {
            config.cooldown = Some(effects.get(&self.name, cooldown)?);
        }
        config.ability_tags = self.ability_tags.clone();
        config.cancel_abilities_with_tag = self.cancel_abilities_with_tag.clone();
        config.block_abilities_with_tag = self.block_abilities_with_tag.clone();
        config.activation_owned_tags = self.activation_owned_tags.clone();
        config.activation_required_tags = self.activation_required_tags.clone();
        config.activation_blocked_tags = self.activation_blocked_tags.clone();
        Ok(config)
    }

    /// Builds the grantable template for this ability.
    pub fn build(
        &self,
        effects: &EffectLibrary,
        tags: &Arc<SampleTags>,
    ) -> Result<Box<dyn GameplayAbility>, LoadError> {
        let config = Arc::new(self.build_config(effects)?);
        let owner = self.name.as_str();

        let template: Box<dyn GameplayAbility> = match &self.kind {
            AbilityKindAsset::Fireball {
                damage,
                burn,
                range,
                query,
            } => {
                let burn = burn.as_deref().map(|burn| effects.get(owner, burn)).transpose()?;
                Box::new(
                    FireballAbility::new(config, Arc::clone(tags), effects.get(owner, damage)?, burn, *range)
                        .with_query(query.clone()),
                )
            }
            AbilityKindAsset::Meteor {
                damage,
                max_range,
                radius,
                impact_delay,
                query,
            } => Box::new(
                MeteorAbility::new(config, effects.get(owner, damage)?, *max_range, *radius, *impact_delay)
                    .with_query(query.clone()),
            ),
            AbilityKindAsset::Purify {
                radius,
                required_factions,
                forbidden_factions,
            } => Box::new(
                PurifyAbility::new(config, Arc::clone(tags), *radius)
                    .with_factions(required_factions.clone(), forbidden_factions.clone()),
            ),
        };
        Ok(template)
    }
}

/// Ability templates by name.
///
/// Templates are never granted directly; [`AbilityCatalog::instantiate`]
/// hands out fresh instances that share the template's configuration.
#[derive(Default)]
pub struct AbilityCatalog {
    templates: BTreeMap<String, Box<dyn GameplayAbility>>,
}

impl AbilityCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, template: Box<dyn GameplayAbility>) -> Result<(), LoadError> {
        let name = template.config().name.clone();
        if self.templates.contains_key(&name) {
            return Err(LoadError::DuplicateAbility { name });
        }
        self.templates.insert(name, template);
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    pub fn config(&self, name: &str) -> Option<&Arc<AbilityConfig>> {
        self.templates.get(name).map(|template| template.config())
    }

    /// A new grantable instance of `name`, requested by `owner`.
    pub fn instantiate(&self, owner: &str, name: &str) -> Result<Box<dyn GameplayAbility>, LoadError> {
        self.templates
            .get(name)
            .map(|template| template.create_poolable_instance())
            .ok_or_else(|| LoadError::UnknownAbility {
                owner: owner.to_owned(),
                ability: name.to_owned(),
            })
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

impl fmt::Debug for AbilityCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.templates.keys()).finish()
    }
}

/// Loads ability assets from RON files.
pub struct AbilityLoader;

impl AbilityLoader {
    pub fn load(path: &Path, effects: &EffectLibrary, tags: &Arc<SampleTags>) -> LoadResult<AbilityCatalog> {
        let content = read_file(path)?;
        Self::parse(&content, effects, tags)
    }

    pub fn parse(content: &str, effects: &EffectLibrary, tags: &Arc<SampleTags>) -> LoadResult<AbilityCatalog> {
        let assets: Vec<AbilityAsset> =
            ron::from_str(content).map_err(|e| anyhow::anyhow!("Failed to parse abilities RON: {}", e))?;

        let mut catalog = AbilityCatalog::new();
        for asset in &assets {
            catalog.insert(asset.build(effects, tags)?)?;
        }
        Ok(catalog)
    }
}
