//! Asynchronous cue presentation.
//!
//! The world hands cue notifications to a [`crate::ChannelCueDispatcher`]
//! without blocking. A cue worker resolves each tag to an asset through
//! [`CueAssetRegistry`] and acquires instances from a [`CuePoolManager`].
//! Presentation failures are logged and published, never fed back into the
//! simulation.

mod pool;

pub use pool::{InMemoryCuePool, PoolStats};

use std::collections::BTreeMap;
use std::fmt;

use async_trait::async_trait;
use gas_core::{CueError, GameplayTag};
use serde::{Deserialize, Serialize};
use vek::{Quaternion, Vec3};

/// Name of a presentable asset (particle system, sound bank entry, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CueAssetRef(pub String);

impl CueAssetRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CueAssetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CueInstanceId(pub u64);

impl fmt::Display for CueInstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cue#{}", self.0)
    }
}

/// A placed instance of a cue asset.
#[derive(Debug, Clone, PartialEq)]
pub struct CueInstance {
    pub id: CueInstanceId,
    pub asset: CueAssetRef,
    pub position: Vec3<f32>,
    pub rotation: Quaternion<f32>,
}

/// Source of cue instances.
///
/// `get` may await asset streaming; `release` returns the instance for reuse.
#[async_trait]
pub trait CuePoolManager: Send + Sync {
    async fn get(
        &self,
        asset: &CueAssetRef,
        position: Vec3<f32>,
        rotation: Quaternion<f32>,
    ) -> Result<CueInstance, CueError>;

    async fn release(&self, instance: CueInstance);
}

/// Maps cue tags to assets.
///
/// Lookup falls back to the nearest registered ancestor, so an asset for
/// `GameplayCue.Fireball` also serves `GameplayCue.Fireball.Impact`.
#[derive(Debug, Clone, Default)]
pub struct CueAssetRegistry {
    assets: BTreeMap<GameplayTag, CueAssetRef>,
}

impl CueAssetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, tag: GameplayTag, asset: CueAssetRef) -> Option<CueAssetRef> {
        self.assets.insert(tag, asset)
    }

    #[must_use]
    pub fn with(mut self, tag: GameplayTag, asset: impl Into<String>) -> Self {
        self.register(tag, CueAssetRef::new(asset));
        self
    }

    pub fn resolve(&self, tag: GameplayTag) -> Result<&CueAssetRef, CueError> {
        let mut current = Some(tag);
        while let Some(candidate) = current {
            if let Some(asset) = self.assets.get(&candidate) {
                return Ok(asset);
            }
            current = candidate.parent();
        }
        Err(CueError::AssetNotFound { tag })
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}
