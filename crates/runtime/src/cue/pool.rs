use std::collections::HashMap;

use async_trait::async_trait;
use gas_core::CueError;
use tokio::sync::Mutex;
use vek::{Quaternion, Vec3};

use super::{CueAssetRef, CueInstance, CueInstanceId, CuePoolManager};

#[derive(Debug, Default)]
struct PoolState {
    next_id: u64,
    live: HashMap<CueInstanceId, CueAssetRef>,
    free: HashMap<CueAssetRef, Vec<CueInstanceId>>,
    created: u64,
    reused: u64,
}

/// Pool that recycles instance ids per asset.
///
/// Stands in for an engine-side object pool; useful for headless runs and
/// tests. Assets outside `known_assets` (when set) fail with
/// [`CueError::HandlerFailed`].
#[derive(Debug, Default)]
pub struct InMemoryCuePool {
    known_assets: Option<Vec<CueAssetRef>>,
    state: Mutex<PoolState>,
}

/// Counters exposed for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PoolStats {
    pub live: usize,
    pub created: u64,
    pub reused: u64,
}

impl InMemoryCuePool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pool that only serves the listed assets.
    pub fn with_assets(assets: impl IntoIterator<Item = CueAssetRef>) -> Self {
        Self {
            known_assets: Some(assets.into_iter().collect()),
            state: Mutex::default(),
        }
    }

    pub async fn stats(&self) -> PoolStats {
        let state = self.state.lock().await;
        PoolStats {
            live: state.live.len(),
            created: state.created,
            reused: state.reused,
        }
    }
}

#[async_trait]
impl CuePoolManager for InMemoryCuePool {
    async fn get(
        &self,
        asset: &CueAssetRef,
        position: Vec3<f32>,
        rotation: Quaternion<f32>,
    ) -> Result<CueInstance, CueError> {
        if let Some(known) = &self.known_assets
            && !known.contains(asset)
        {
            return Err(CueError::HandlerFailed(format!("asset '{asset}' is not loaded")));
        }

        let mut state = self.state.lock().await;
        let recycled = state.free.get_mut(asset).and_then(Vec::pop);
        let id = match recycled {
            Some(id) => {
                state.reused += 1;
                id
            }
            None => {
                state.next_id += 1;
                state.created += 1;
                CueInstanceId(state.next_id)
            }
        };
        state.live.insert(id, asset.clone());

        Ok(CueInstance {
            id,
            asset: asset.clone(),
            position,
            rotation,
        })
    }

    async fn release(&self, instance: CueInstance) {
        let mut state = self.state.lock().await;
        if state.live.remove(&instance.id).is_none() {
            tracing::warn!(instance = %instance.id, "released a cue instance that is not live");
            return;
        }
        state.free.entry(instance.asset).or_default().push(instance.id);
    }
}
