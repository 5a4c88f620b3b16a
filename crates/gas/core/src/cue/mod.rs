//! Gameplay cue dispatch.
//!
//! Cues are presentation notifications (visual or audio) keyed by tag. The
//! simulation only describes them; components queue notifications and the
//! world hands them to the [`GameplayCueManager`] after an operation
//! completes, so every cue observes post-application state.
//!
//! Dispatch is fire-and-forget. Handler and sink failures are logged and
//! never reach gameplay code.

use core::fmt;
use std::collections::BTreeMap;

use vek::Vec3;

use crate::actor::ActorId;
use crate::error::{ErrorSeverity, GasError};
use crate::tags::GameplayTag;

/// Lifecycle moment a cue reacts to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GameplayCueEvent {
    /// Duration effect added.
    OnActive,
    /// Duration effect is active (sent alongside `OnActive`).
    WhileActive,
    /// Instant or periodic execution.
    Executed,
    /// Duration effect removed.
    Removed,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GameplayCueParameters {
    pub target: ActorId,
    pub source: Option<ActorId>,
    /// Filled from the hit location, or the target avatar when dispatched.
    pub location: Option<Vec3<f32>>,
    pub effect_name: String,
    pub level: i32,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GameplayCueNotify {
    pub tag: GameplayTag,
    pub event: GameplayCueEvent,
    pub params: GameplayCueParameters,
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CueError {
    #[error("no cue asset registered for '{tag}'")]
    AssetNotFound { tag: GameplayTag },

    #[error("cue sink is closed")]
    SinkClosed,

    #[error("cue sink is full")]
    SinkFull,

    #[error("cue handler failed: {0}")]
    HandlerFailed(String),
}

impl GasError for CueError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::SinkFull => ErrorSeverity::Recoverable,
            Self::AssetNotFound { .. } | Self::HandlerFailed(_) => ErrorSeverity::Validation,
            Self::SinkClosed => ErrorSeverity::Internal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::AssetNotFound { .. } => "CUE_ASSET_NOT_FOUND",
            Self::SinkClosed => "CUE_SINK_CLOSED",
            Self::SinkFull => "CUE_SINK_FULL",
            Self::HandlerFailed(_) => "CUE_HANDLER_FAILED",
        }
    }
}

/// Synchronous in-process reaction to a cue (sound trigger, debug overlay).
pub trait GameplayCueHandler: fmt::Debug + Send {
    fn handle_cue(&self, notify: &GameplayCueNotify) -> Result<(), CueError>;
}

/// Non-blocking hand-off to an asynchronous presentation layer.
///
/// Implementations must return immediately; a full or closed sink reports an
/// error that the manager logs and drops.
pub trait CueDispatcher: fmt::Debug + Send {
    fn dispatch(&self, notify: GameplayCueNotify) -> Result<(), CueError>;
}

/// Routes cue notifications to handlers registered per tag and to an
/// optional asynchronous sink.
///
/// A handler registered for `GameplayCue.Fireball` also receives
/// `GameplayCue.Fireball.Impact`.
#[derive(Debug, Default)]
pub struct GameplayCueManager {
    handlers: BTreeMap<GameplayTag, Vec<Box<dyn GameplayCueHandler>>>,
    dispatcher: Option<Box<dyn CueDispatcher>>,
    dispatched: u64,
    failures: u64,
}

impl GameplayCueManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_handler(&mut self, tag: GameplayTag, handler: Box<dyn GameplayCueHandler>) {
        self.handlers.entry(tag).or_default().push(handler);
    }

    pub fn set_dispatcher(&mut self, dispatcher: Box<dyn CueDispatcher>) {
        self.dispatcher = Some(dispatcher);
    }

    /// Notifications handed to at least one handler or the sink.
    pub fn dispatched(&self) -> u64 {
        self.dispatched
    }

    /// Handler or sink failures observed so far.
    pub fn failures(&self) -> u64 {
        self.failures
    }

    pub fn dispatch(&mut self, notify: GameplayCueNotify) {
        let mut delivered = false;

        for (registered, handlers) in &self.handlers {
            if !notify.tag.matches(*registered) {
                continue;
            }
            for handler in handlers {
                delivered = true;
                if let Err(err) = handler.handle_cue(&notify) {
                    self.failures += 1;
                    tracing::warn!(cue = %notify.tag, event = %notify.event, %err, "cue handler failed");
                }
            }
        }

        if let Some(dispatcher) = &self.dispatcher {
            delivered = true;
            let tag = notify.tag;
            let event = notify.event;
            if let Err(err) = dispatcher.dispatch(notify) {
                self.failures += 1;
                tracing::warn!(cue = %tag, %event, %err, "cue dispatch failed");
            }
        } else if !delivered {
            tracing::trace!(cue = %notify.tag, event = %notify.event, "cue has no listener");
        }

        if delivered {
            self.dispatched += 1;
        }
    }
}
