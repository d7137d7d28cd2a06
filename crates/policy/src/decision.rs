//! Evaluation outcomes.

use core::fmt;

/// Why an evaluation denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DenyReason {
    /// The operation requires an authenticated caller and none was supplied.
    Unauthenticated,
    /// The caller is authenticated but no rule grants the operation.
    Forbidden,
    /// The caller's role could not be resolved, so the engine failed closed.
    RoleResolution,
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unauthenticated => write!(f, "unauthenticated"),
            Self::Forbidden => write!(f, "forbidden"),
            Self::RoleResolution => write!(f, "role resolution failed"),
        }
    }
}

/// Outcome of a policy evaluation.
///
/// Evaluation never raises. Storage trouble during role resolution folds
/// into [`Decision::Deny`] with [`DenyReason::RoleResolution`] so operators
/// can tell "not allowed" apart from "could not determine" in the logs,
/// while callers see a uniform denial either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Decision {
    /// The operation may proceed.
    Allow,
    /// The operation must not proceed.
    Deny(DenyReason),
}

impl Decision {
    /// Whether the operation may proceed.
    #[must_use]
    pub const fn is_allowed(self) -> bool {
        matches!(self, Self::Allow)
    }

    /// Whether the operation was refused.
    #[must_use]
    pub const fn is_denied(self) -> bool {
        !self.is_allowed()
    }
}
