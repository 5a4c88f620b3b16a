use std::path::Path;

use crate::character::LevelTable;
use crate::loaders::{LoadResult, read_file};

/// Loads the level progression table from RON.
pub struct LevelLoader;

impl LevelLoader {
    pub fn load(path: &Path) -> LoadResult<LevelTable> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<LevelTable> {
        let table: LevelTable =
            ron::from_str(content).map_err(|e| anyhow::anyhow!("Failed to parse level table RON: {}", e))?;
        if table.levels().is_empty() {
            anyhow::bail!("Level table must contain at least one level");
        }
        Ok(table)
    }
}
