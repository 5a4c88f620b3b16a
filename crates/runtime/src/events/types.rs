//! Event types for runtime-originated topics.

use gas_core::{GameplayCueEvent, GameplayTag};
use serde::{Deserialize, Serialize};

use crate::cue::{CueAssetRef, CueInstanceId};

/// A frame was simulated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameEvent {
    /// Frame counter after the tick.
    pub frame: u64,
    /// Seconds simulated by the tick.
    pub delta: f32,
}

/// Outcome of presenting a cue through the pool manager.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CuePresentationEvent {
    /// An instance was acquired (persistent cues) or played (burst cues).
    Spawned {
        tag: GameplayTag,
        event: GameplayCueEvent,
        asset: CueAssetRef,
        instance: CueInstanceId,
    },
    /// An instance went back to the pool.
    Released {
        tag: GameplayTag,
        instance: CueInstanceId,
    },
    /// Presentation failed; the simulation is unaffected.
    Failed {
        tag: GameplayTag,
        event: GameplayCueEvent,
        error: String,
    },
}
