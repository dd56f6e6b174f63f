//! Error types surfaced by collaborator commands.
//!
//! Collaborators (movement, teleport, area clearing) report failures through
//! [`ActionError`]. The decision layers never propagate these out of a tick:
//! they log them and re-evaluate on the next poll. [`ErrorSeverity`] lets the
//! caller decide how loudly to log.

use crate::state::Position;

/// Severity level of an action failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorSeverity {
    /// Retry on a later tick may succeed (blocked tile, interrupted cast).
    Recoverable,

    /// The command itself was invalid (unwalkable destination).
    Validation,

    /// The collaborator is in an unexpected state (client desync).
    Internal,
}

impl ErrorSeverity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
        }
    }

    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }
}

/// Failure reported by an action-layer or pathfinding command.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ActionError {
    #[error("failed to move to {to}")]
    MoveFailed { to: Position },

    #[error("no path to {to}")]
    NoPath { to: Position },

    #[error("destination {to} is not walkable")]
    NotWalkable { to: Position },

    #[error("skill {skill} is not available")]
    SkillUnavailable { skill: &'static str },

    #[error("action interrupted")]
    Interrupted,

    #[error("collaborator failure: {0}")]
    Collaborator(String),
}

impl ActionError {
    pub const fn severity(&self) -> ErrorSeverity {
        match self {
            Self::MoveFailed { .. } | Self::NoPath { .. } | Self::Interrupted => {
                ErrorSeverity::Recoverable
            }
            Self::NotWalkable { .. } | Self::SkillUnavailable { .. } => ErrorSeverity::Validation,
            Self::Collaborator(_) => ErrorSeverity::Internal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn move_failures_are_recoverable() {
        let err = ActionError::MoveFailed {
            to: Position::new(3, 4),
        };
        assert!(err.severity().is_recoverable());
        assert_eq!(err.to_string(), "failed to move to (3, 4)");
    }

    #[test]
    fn collaborator_failures_are_internal() {
        let err = ActionError::Collaborator("client desync".into());
        assert_eq!(err.severity(), ErrorSeverity::Internal);
        assert_eq!(err.severity().as_str(), "internal");
    }
}
