//! Content factory for building the sample game from data files.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use gas_core::GasConfig;

use crate::character::LevelTable;
use crate::loaders::{
    AbilityCatalog, AbilityLoader, CharacterLoader, CharacterTemplate, ConfigLoader, EffectLibrary, EffectLoader,
    LevelLoader, LoadResult, SampleContent,
};
use crate::tags::SampleTags;

/// Content factory that loads all sample content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── config.toml
/// ├── effects.ron
/// ├── abilities.ron
/// ├── levels.ron
/// └── characters.ron
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    /// Creates a new content factory pointing to a data directory.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Data shipped with this crate.
    pub fn bundled() -> Self {
        Self::new(Path::new(env!("CARGO_MANIFEST_DIR")).join("data"))
    }

    /// Load world configuration from `config.toml`.
    pub fn load_config(&self) -> LoadResult<GasConfig> {
        ConfigLoader::load(&self.data_dir.join("config.toml"))
    }

    /// Load effect definitions from `effects.ron`.
    pub fn load_effects(&self) -> LoadResult<EffectLibrary> {
        EffectLoader::load(&self.data_dir.join("effects.ron"))
    }

    /// Load ability templates from `abilities.ron`, resolving effect names
    /// against `effects`.
    pub fn load_abilities(&self, effects: &EffectLibrary, tags: &Arc<SampleTags>) -> LoadResult<AbilityCatalog> {
        AbilityLoader::load(&self.data_dir.join("abilities.ron"), effects, tags)
    }

    /// Load the level progression table from `levels.ron`.
    pub fn load_levels(&self) -> LoadResult<LevelTable> {
        LevelLoader::load(&self.data_dir.join("levels.ron"))
    }

    /// Load character templates from `characters.ron`.
    pub fn load_characters(&self) -> LoadResult<BTreeMap<String, CharacterTemplate>> {
        CharacterLoader::load(&self.data_dir.join("characters.ron"))
    }

    /// Loads and cross-checks everything.
    pub fn load(&self) -> LoadResult<SampleContent> {
        let tags = Arc::new(SampleTags::register()?);
        let config = self.load_config()?;
        let effects = self.load_effects()?;
        let abilities = self.load_abilities(&effects, &tags)?;
        let levels = Arc::new(self.load_levels()?);
        let characters = self.load_characters()?;

        let content = SampleContent {
            tags,
            config,
            effects,
            abilities,
            levels,
            characters,
        };
        content.validate()?;

        tracing::info!(
            data_dir = %self.data_dir.display(),
            effects = content.effects.len(),
            abilities = content.abilities.len(),
            characters = content.characters.len(),
            "content loaded"
        );
        Ok(content)
    }

    /// Get the data directory path.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_paths() {
        let factory = ContentFactory::new("/tmp/test_data");
        assert_eq!(factory.data_dir(), Path::new("/tmp/test_data"));
        assert!(ContentFactory::bundled().data_dir().ends_with("data"));
    }
}
