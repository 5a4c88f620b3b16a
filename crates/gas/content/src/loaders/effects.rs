//! Effect definition loader.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use gas_core::{
    DurationPolicy, ExecutionCalculation, GameplayEffect, GameplayTagContainer, ModifierInfo, StackingPolicy,
    TagRequirements,
};
use serde::{Deserialize, Serialize};

use crate::error::LoadError;
use crate::executions::BurnExecution;
use crate::loaders::{LoadResult, read_file};

/// Execution calculations that can be named from data.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ExecutionAsset {
    Burn {
        #[serde(default = "default_attack_ratio")]
        attack_ratio: f32,
    },
}

fn default_attack_ratio() -> f32 {
    BurnExecution::DEFAULT_ATTACK_RATIO
}

impl ExecutionAsset {
    fn build(&self) -> Arc<dyn ExecutionCalculation> {
        match self {
            Self::Burn { attack_ratio } => Arc::new(BurnExecution::new(*attack_ratio)),
        }
    }
}

/// Serialized form of a [`GameplayEffect`].
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectAsset {
    pub name: String,
    pub duration: DurationPolicy,
    pub period: f32,
    pub modifiers: Vec<ModifierInfo>,
    pub execution: Option<ExecutionAsset>,
    pub stacking: StackingPolicy,
    pub asset_tags: GameplayTagContainer,
    pub granted_tags: GameplayTagContainer,
    pub application_requirements: TagRequirements,
    pub ongoing_requirements: TagRequirements,
    pub remove_effects_with_tags: GameplayTagContainer,
    pub cues: GameplayTagContainer,
}

impl Default for EffectAsset {
    fn default() -> Self {
        Self {
            name: String::new(),
            duration: DurationPolicy::Instant,
            period: 0.0,
            modifiers: Vec::new(),
            execution: None,
            stacking: StackingPolicy::NONE,
            asset_tags: GameplayTagContainer::new(),
            granted_tags: GameplayTagContainer::new(),
            application_requirements: TagRequirements::new(),
            ongoing_requirements: TagRequirements::new(),
            remove_effects_with_tags: GameplayTagContainer::new(),
            cues: GameplayTagContainer::new(),
        }
    }
}

impl EffectAsset {
    pub fn into_effect(self) -> GameplayEffect {
        let execution = self.execution.as_ref().map(ExecutionAsset::build);
        GameplayEffect {
            name: self.name,
            duration: self.duration,
            period: self.period,
            modifiers: self.modifiers,
            execution,
            stacking: self.stacking,
            asset_tags: self.asset_tags,
            granted_tags: self.granted_tags,
            application_requirements: self.application_requirements,
            ongoing_requirements: self.ongoing_requirements,
            remove_effects_with_tags: self.remove_effects_with_tags,
            cues: self.cues,
        }
    }
}

/// Effect definitions by name, shared as `Arc`s.
#[derive(Clone, Debug, Default)]
pub struct EffectLibrary {
    effects: BTreeMap<String, Arc<GameplayEffect>>,
}

impl EffectLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, effect: GameplayEffect) -> Result<Arc<GameplayEffect>, LoadError> {
        if self.effects.contains_key(&effect.name) {
            return Err(LoadError::DuplicateEffect { name: effect.name });
        }
        let shared = Arc::new(effect);
        self.effects.insert(shared.name.clone(), Arc::clone(&shared));
        Ok(shared)
    }

    pub fn find(&self, name: &str) -> Option<Arc<GameplayEffect>> {
        self.effects.get(name).cloned()
    }

    /// Resolves `name` on behalf of `owner`, which names the referrer in the error.
    pub fn get(&self, owner: &str, name: &str) -> Result<Arc<GameplayEffect>, LoadError> {
        self.find(name).ok_or_else(|| LoadError::UnknownEffect {
            owner: owner.to_owned(),
            effect: name.to_owned(),
        })
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.effects.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }
}

/// Loads effect definitions from RON files.
pub struct EffectLoader;

impl EffectLoader {
    /// Load an effect library from a RON file containing a list of effects.
    pub fn load(path: &Path) -> LoadResult<EffectLibrary> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<EffectLibrary> {
        let assets: Vec<EffectAsset> =
            ron::from_str(content).map_err(|e| anyhow::anyhow!("Failed to parse effects RON: {}", e))?;

        let mut library = EffectLibrary::new();
        for asset in assets {
            library.insert(asset.into_effect())?;
        }
        Ok(library)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tags::SampleTags;

    #[test]
    fn parses_periodic_burn() {
        SampleTags::register().unwrap();
        let library = EffectLoader::parse(
            r#"[
                (
                    name: "GE_Burn",
                    duration: HasDuration(3.0),
                    period: 1.0,
                    execution: Some(Burn(attack_ratio: 0.5)),
                    granted_tags: ["State.Burning"],
                    cues: ["GameplayCue.Burn.Loop"],
                ),
            ]"#,
        )
        .unwrap();

        let burn = library.get("test", "GE_Burn").unwrap();
        assert!(burn.is_periodic());
        assert!(burn.execution.is_some());
        assert_eq!(burn.granted_tags.len(), 1);
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let err = EffectLoader::parse(r#"[(name: "GE_A"), (name: "GE_A")]"#).unwrap_err();
        assert_eq!(
            err.downcast_ref::<LoadError>(),
            Some(&LoadError::DuplicateEffect { name: "GE_A".into() })
        );
    }

    #[test]
    fn missing_effect_names_the_referrer() {
        let err = EffectLibrary::new().get("Fireball", "GE_Nope").unwrap_err();
        assert_eq!(err.to_string(), "Fireball references unknown effect 'GE_Nope'");
    }
}
