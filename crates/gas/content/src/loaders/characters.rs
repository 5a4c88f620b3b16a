//! Character template loader.

use std::collections::BTreeMap;
use std::path::Path;

use gas_core::GameplayTag;
use serde::{Deserialize, Serialize};

use crate::character::CharacterStats;
use crate::loaders::{LoadResult, read_file};

/// Everything needed to spawn a character except its position.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CharacterTemplate {
    pub name: String,
    pub faction: GameplayTag,
    #[serde(default)]
    pub stats: CharacterStats,
    /// `(ability name, level)` pairs granted on spawn.
    #[serde(default)]
    pub abilities: Vec<(String, i32)>,
    /// Effects applied to the character right after spawning.
    #[serde(default)]
    pub passive_effects: Vec<String>,
    #[serde(default = "default_radius")]
    pub radius: f32,
}

fn default_radius() -> f32 {
    0.5
}

pub struct CharacterLoader;

impl CharacterLoader {
    pub fn load(path: &Path) -> LoadResult<BTreeMap<String, CharacterTemplate>> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<BTreeMap<String, CharacterTemplate>> {
        let templates: Vec<CharacterTemplate> =
            ron::from_str(content).map_err(|e| anyhow::anyhow!("Failed to parse characters RON: {}", e))?;

        let mut by_name = BTreeMap::new();
        for template in templates {
            if by_name.contains_key(&template.name) {
                anyhow::bail!("Character '{}' is defined more than once", template.name);
            }
            by_name.insert(template.name.clone(), template);
        }
        Ok(by_name)
    }
}
