//! Worker tasks that back the runtime orchestration.
//!
//! The simulation worker owns the world. The frame driver ticks it at a fixed
//! rate, and the cue worker presents cues off the simulation task.

mod cue;
mod frame;
mod simulation;

pub use cue::{ChannelCueDispatcher, CueWorker};
pub use frame::FrameDriver;
pub use simulation::{Command, SimulationWorker};
pub(crate) use simulation::WorldFn;
