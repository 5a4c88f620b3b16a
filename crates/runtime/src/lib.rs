//! Async runtime around a [`gas_core::GameplayWorld`].
//!
//! The world is owned by a single simulation task. Clients talk to it through
//! a cloneable [`RuntimeHandle`] and observe it through a topic-based
//! [`EventBus`]. Cue presentation runs on its own task so asset streaming
//! never stalls a frame.
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the orchestrator and builder
//! - [`api`] exposes the types downstream clients interact with
//! - [`events`] provides the topic-based event bus
//! - [`cue`] defines cue assets and the pool manager contract
//! - [`snapshot`] is the serializable read model of the world
//! - `workers` keeps background tasks internal to the crate
pub mod api;
pub mod cue;
pub mod events;
pub mod runtime;
pub mod snapshot;

mod workers;

pub use api::{Result, RuntimeError, RuntimeHandle};
pub use cue::{CueAssetRef, CueAssetRegistry, CueInstance, CueInstanceId, CuePoolManager, InMemoryCuePool, PoolStats};
pub use events::{CuePresentationEvent, Event, EventBus, FrameEvent, Topic};
pub use runtime::{Runtime, RuntimeBuilder, RuntimeConfig};
pub use snapshot::{AbilitySnapshot, AbilitySystemSnapshot, ActorSnapshot, EffectSnapshot, WorldSnapshot};
pub use workers::ChannelCueDispatcher;
