//! Topic-based event bus for runtime events.
//!
//! World journal entries are published after every command, so consumers can
//! subscribe only to the topics they need (abilities, effects, cues, ...).

mod bus;
mod types;

pub use bus::{Event, EventBus, Topic};
pub use types::{CuePresentationEvent, FrameEvent};
