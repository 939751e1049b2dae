use thiserror::Error;

use crate::engine::actor::ActorId;
use crate::engine::play_lifecycle::PlayPhase;

/// Errors surfaced by session commands.
///
/// None of these are fatal: the frame loop logs and swallows them, and the
/// command that produced one leaves the session unchanged.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    #[error("Invalid transition: cannot {action} while {phase}")]
    InvalidTransition { action: &'static str, phase: PlayPhase },

    #[error("Actor not found: {0}")]
    ActorNotFound(ActorId),

    #[error("Duplicate actor id: {0}")]
    DuplicateActor(ActorId),

    #[error("Ball unavailable")]
    BallUnavailable,

    #[error("Invalid yardage: {0}")]
    InvalidYardage(f32),

    #[error("Special mode not ready: {points} of {threshold} points")]
    MeterNotReady { points: f32, threshold: f32 },

    #[error("Game is over")]
    GameOver,

    #[error("Config error: {0}")]
    Config(String),
}

impl SimError {
    /// Whether a caller can retry the same command later and expect it to work.
    pub fn is_recoverable(&self) -> bool {
        match self {
            SimError::InvalidTransition { .. } => true,
            SimError::ActorNotFound(_) => true,
            SimError::BallUnavailable => true,
            SimError::MeterNotReady { .. } => true,
            SimError::DuplicateActor(_) => false,
            SimError::InvalidYardage(_) => false,
            SimError::GameOver => false,
            SimError::Config(_) => false,
        }
    }
}

impl From<serde_json::Error> for SimError {
    fn from(err: serde_json::Error) -> Self {
        SimError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SimError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = SimError::InvalidTransition { action: "start_play", phase: PlayPhase::Active };
        assert_eq!(err.to_string(), "Invalid transition: cannot start_play while active");

        let err = SimError::ActorNotFound(ActorId(7));
        assert_eq!(err.to_string(), "Actor not found: #7");
    }

    #[test]
    fn test_recoverability() {
        assert!(SimError::BallUnavailable.is_recoverable());
        assert!(!SimError::InvalidYardage(f32::NAN).is_recoverable());
        assert!(!SimError::GameOver.is_recoverable());
    }
}
