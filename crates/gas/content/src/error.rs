use gas_core::{ErrorSeverity, GasError};

/// Content that parsed but does not fit together.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum LoadError {
    #[error("effect '{name}' is defined more than once")]
    DuplicateEffect { name: String },

    #[error("ability '{name}' is defined more than once")]
    DuplicateAbility { name: String },

    #[error("{owner} references unknown effect '{effect}'")]
    UnknownEffect { owner: String, effect: String },

    #[error("{owner} references unknown ability '{ability}'")]
    UnknownAbility { owner: String, ability: String },

    #[error("unknown character template '{0}'")]
    UnknownCharacter(String),

    #[error("cost effect '{effect}' of ability '{ability}' must be instant")]
    CostNotInstant { ability: String, effect: String },
}

impl GasError for LoadError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::DuplicateEffect { .. } => "CONTENT_DUPLICATE_EFFECT",
            Self::DuplicateAbility { .. } => "CONTENT_DUPLICATE_ABILITY",
            Self::UnknownEffect { .. } => "CONTENT_UNKNOWN_EFFECT",
            Self::UnknownAbility { .. } => "CONTENT_UNKNOWN_ABILITY",
            Self::UnknownCharacter(_) => "CONTENT_UNKNOWN_CHARACTER",
            Self::CostNotInstant { .. } => "CONTENT_COST_NOT_INSTANT",
        }
    }
}
