//! High-level runtime orchestrator.
//!
//! The runtime owns background workers, wires up command/event channels, and
//! exposes a builder-based API for clients to drive the simulation.

use std::sync::Arc;
use std::time::Duration;

use gas_core::{GameplayCueNotify, GameplayWorld};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::api::{Result, RuntimeError, RuntimeHandle};
use crate::cue::{CueAssetRegistry, CuePoolManager, InMemoryCuePool};
use crate::events::EventBus;
use crate::workers::{ChannelCueDispatcher, Command, CueWorker, FrameDriver, SimulationWorker};

/// Runtime configuration shared across the orchestrator and workers.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Frames per second simulated by the frame driver.
    pub tick_rate_hz: u32,
    /// Spawn the frame driver. Without it the world only advances on
    /// [`RuntimeHandle::tick`].
    pub auto_tick: bool,
    pub event_buffer_size: usize,
    pub command_buffer_size: usize,
    pub cue_buffer_size: usize,
}

impl RuntimeConfig {
    pub fn frame_period(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.tick_rate_hz.max(1)))
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            tick_rate_hz: 30,
            auto_tick: false,
            event_buffer_size: 256,
            command_buffer_size: 32,
            cue_buffer_size: 128,
        }
    }
}

/// Main runtime that orchestrates the simulation
///
/// Owns the workers; [`RuntimeHandle`] is the cloneable façade for clients.
pub struct Runtime {
    handle: RuntimeHandle,
    shutdown_tx: watch::Sender<bool>,

    sim_worker_handle: JoinHandle<()>,
    frame_driver_handle: Option<JoinHandle<()>>,
    cue_worker_handle: Option<JoinHandle<()>>,
}

impl Runtime {
    /// Create a new runtime builder
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Get a cloneable handle to this runtime
    pub fn handle(&self) -> RuntimeHandle {
        self.handle.clone()
    }

    /// Shutdown the runtime gracefully
    ///
    /// Stops the frame driver, then waits for the simulation worker to drain
    /// its queue. The cue worker stops once the world (and its dispatcher)
    /// is dropped. Clones of the handle still alive keep the simulation
    /// worker running.
    pub async fn shutdown(self) -> Result<()> {
        // Receivers may already be gone; nothing else to signal then.
        let _ = self.shutdown_tx.send(true);
        if let Some(frame_driver) = self.frame_driver_handle {
            frame_driver.await.map_err(RuntimeError::WorkerJoin)?;
        }

        drop(self.handle);
        self.sim_worker_handle.await.map_err(RuntimeError::WorkerJoin)?;

        if let Some(cue_worker) = self.cue_worker_handle {
            cue_worker.await.map_err(RuntimeError::WorkerJoin)?;
        }

        Ok(())
    }
}

/// Builder for [`Runtime`] with flexible configuration.
pub struct RuntimeBuilder {
    config: RuntimeConfig,
    world: Option<GameplayWorld>,
    cue_assets: Option<CueAssetRegistry>,
    cue_pool: Option<Arc<dyn CuePoolManager>>,
}

impl RuntimeBuilder {
    fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            world: None,
            cue_assets: None,
            cue_pool: None,
        }
    }

    /// Override runtime configuration
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the world the simulation worker will own (required)
    pub fn world(mut self, world: GameplayWorld) -> Self {
        self.world = Some(world);
        self
    }

    /// Enable the frame driver at `tick_rate_hz`
    pub fn auto_tick(mut self, tick_rate_hz: u32) -> Self {
        self.config.auto_tick = true;
        self.config.tick_rate_hz = tick_rate_hz;
        self
    }

    /// Present cues through a cue worker.
    ///
    /// Without a pool, an [`InMemoryCuePool`] is used.
    pub fn cue_assets(mut self, assets: CueAssetRegistry) -> Self {
        self.cue_assets = Some(assets);
        self
    }

    pub fn cue_pool(mut self, pool: Arc<dyn CuePoolManager>) -> Self {
        self.cue_pool = Some(pool);
        self
    }

    /// Build the runtime
    pub async fn build(self) -> Result<Runtime> {
        let mut world = self.world.ok_or(RuntimeError::MissingWorld)?;

        let (command_tx, command_rx) = mpsc::channel::<Command>(self.config.command_buffer_size);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let event_bus = EventBus::with_capacity(self.config.event_buffer_size);

        let cue_worker_handle = if self.cue_assets.is_some() || self.cue_pool.is_some() {
            let (cue_tx, cue_rx) = mpsc::channel::<GameplayCueNotify>(self.config.cue_buffer_size);
            world.set_cue_dispatcher(Box::new(ChannelCueDispatcher::new(cue_tx)));

            let pool = self
                .cue_pool
                .unwrap_or_else(|| Arc::new(InMemoryCuePool::new()) as Arc<dyn CuePoolManager>);
            let cue_worker = CueWorker::new(cue_rx, self.cue_assets.unwrap_or_default(), pool, event_bus.clone());
            Some(tokio::spawn(async move {
                cue_worker.run().await;
            }))
        } else {
            None
        };

        let handle = RuntimeHandle::new(command_tx.clone(), event_bus.clone());

        let sim_worker = SimulationWorker::new(world, command_rx, event_bus.clone());
        let sim_worker_handle = tokio::spawn(async move {
            sim_worker.run().await;
        });

        let frame_driver_handle = if self.config.auto_tick {
            let frame_driver = FrameDriver::new(self.config.frame_period(), command_tx, event_bus, shutdown_rx);
            Some(tokio::spawn(async move {
                frame_driver.run().await;
            }))
        } else {
            None
        };

        tracing::info!(
            tick_rate_hz = self.config.tick_rate_hz,
            auto_tick = self.config.auto_tick,
            cue_worker = cue_worker_handle.is_some(),
            "runtime started"
        );

        Ok(Runtime {
            handle,
            shutdown_tx,
            sim_worker_handle,
            frame_driver_handle,
            cue_worker_handle,
        })
    }
}
