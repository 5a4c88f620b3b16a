//! Unified error types surfaced by the runtime API.
//!
//! Wraps failures from worker coordination and world commands so clients can
//! bubble them up with consistent context.
use gas_core::{ActivationFailure, ErrorSeverity, GasError, WorldError};
use thiserror::Error;
use tokio::sync::oneshot;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("simulation worker command channel closed")]
    CommandChannelClosed,

    #[error("simulation worker reply channel closed")]
    ReplyChannelClosed(#[source] oneshot::error::RecvError),

    #[error("worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),

    #[error("runtime requires a world to be configured before building")]
    MissingWorld,

    #[error(transparent)]
    World(#[from] WorldError),

    #[error("ability activation refused: {0}")]
    ActivationRefused(ActivationFailure),
}

impl GasError for RuntimeError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::CommandChannelClosed | Self::ReplyChannelClosed(_) | Self::WorkerJoin(_) => {
                ErrorSeverity::Internal
            }
            Self::MissingWorld => ErrorSeverity::Validation,
            Self::World(err) => err.severity(),
            Self::ActivationRefused(_) => ErrorSeverity::Recoverable,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::CommandChannelClosed => "RUNTIME_COMMAND_CHANNEL_CLOSED",
            Self::ReplyChannelClosed(_) => "RUNTIME_REPLY_CHANNEL_CLOSED",
            Self::WorkerJoin(_) => "RUNTIME_WORKER_JOIN",
            Self::MissingWorld => "RUNTIME_MISSING_WORLD",
            Self::World(err) => err.error_code(),
            Self::ActivationRefused(_) => "RUNTIME_ACTIVATION_REFUSED",
        }
    }
}
