//! Content loaders for reading sample data from files.
//!
//! Effects, abilities, characters and the level table are RON; world
//! configuration is TOML. Loaders resolve names into shared definitions, so
//! everything that references an effect holds the same `Arc`.

pub mod abilities;
pub mod characters;
pub mod config;
pub mod content;
pub mod effects;
pub mod factory;
pub mod levels;

pub use abilities::{AbilityAsset, AbilityCatalog, AbilityKindAsset, AbilityLoader};
pub use characters::{CharacterLoader, CharacterTemplate};
pub use config::ConfigLoader;
pub use content::SampleContent;
pub use effects::{EffectAsset, EffectLibrary, EffectLoader, ExecutionAsset};
pub use factory::ContentFactory;
pub use levels::LevelLoader;

use std::path::Path;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path).map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))
}
