use std::path::Path;

use gas_core::GasConfig;

use crate::loaders::{LoadResult, read_file};

/// Loader for world configuration from TOML files.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load a [`GasConfig`]; keys left out keep their defaults.
    pub fn load(path: &Path) -> LoadResult<GasConfig> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<GasConfig> {
        toml::from_str(content).map_err(|e| anyhow::anyhow!("Failed to parse config TOML: {}", e))
    }
}
