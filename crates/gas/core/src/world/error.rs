use crate::actor::ActorId;
use crate::error::{ErrorSeverity, GasError};

/// Configuration errors reported by world operations.
///
/// Gameplay refusals (blocked activation, unmet requirements) are not
/// errors; they come back as `false` or [`crate::effect::EffectApplication::Blocked`].
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum WorldError {
    #[error("actor {0} does not exist")]
    UnknownActor(ActorId),

    #[error("actor {0} has no ability system")]
    NoAbilitySystem(ActorId),

    #[error("actor {0} already has an ability system")]
    AbilitySystemExists(ActorId),

    #[error("actor {actor} has no ability named '{ability}'")]
    AbilityNotGranted { actor: ActorId, ability: String },
}

impl GasError for WorldError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownActor(_) => "WORLD_UNKNOWN_ACTOR",
            Self::NoAbilitySystem(_) => "WORLD_NO_ABILITY_SYSTEM",
            Self::AbilitySystemExists(_) => "WORLD_ABILITY_SYSTEM_EXISTS",
            Self::AbilityNotGranted { .. } => "WORLD_ABILITY_NOT_GRANTED",
        }
    }
}
