//! Common error infrastructure for gas-core.
//!
//! Domain errors (`TagError`, `SpecError`, `WorldError`) live next to the
//! modules that raise them. They all implement [`GasError`] so callers can
//! classify failures without matching on every variant.
//!
//! Most ability-system outcomes are not errors at all: a blocked activation
//! is a `false`, a missing SetByCaller magnitude resolves to its default, and
//! a modifier naming an unknown attribute is skipped with a warning. Only
//! configuration mistakes and invalid handles surface as `Err`.

/// Severity level of an error, used for categorization and recovery strategies.
///
/// - **Recoverable**: the caller may retry later (e.g. targeting still pending)
/// - **Validation**: invalid input that should be rejected without retry
/// - **Internal**: unexpected state inconsistency that requires investigation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Recoverable error - can retry with the same or an alternative request.
    Recoverable,

    /// Validation error - invalid input, should not retry without changes.
    ///
    /// Examples: malformed tag name, unknown actor
    Validation,

    /// Internal error - unexpected state inconsistency.
    ///
    /// These indicate bugs and should be investigated.
    Internal,
}

impl ErrorSeverity {
    /// Returns a human-readable description of this severity level.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
        }
    }

    /// Returns true if this error is potentially recoverable.
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }

    /// Returns true if this error indicates an internal bug.
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal)
    }
}

/// Common trait for all gas-core errors.
///
/// # Implementation Guidelines
///
/// - Use `#[derive(thiserror::Error)]` for Display/Error impl
/// - Classify severity based on recoverability, not impact
/// - Error codes are stable, upper snake case, and prefixed by domain
pub trait GasError: core::fmt::Display + core::fmt::Debug {
    /// Returns the severity level of this error.
    fn severity(&self) -> ErrorSeverity;

    /// Returns a stable error code for logging and metrics.
    fn error_code(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_classification_helpers() {
        assert!(ErrorSeverity::Recoverable.is_recoverable());
        assert!(!ErrorSeverity::Validation.is_recoverable());
        assert!(ErrorSeverity::Internal.is_internal());
        assert_eq!(ErrorSeverity::Validation.as_str(), "validation");
    }
}
