//! Error types shared by the simulation, renderer and storage layers

use thiserror::Error;

use crate::sim::SimPhase;

#[derive(Debug, Error)]
pub enum SimError {
    /// Rejected launch input or engine construction
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Trajectory walk hit the safety cap without landing
    #[error("trajectory did not land within {cap_seconds} simulated seconds")]
    NonTerminatingTrajectory { cap_seconds: f64 },

    /// Loop operation requested in a phase that does not allow it
    #[error("cannot {action} while {phase:?}")]
    InvalidTransition { action: &'static str, phase: SimPhase },

    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SimError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        SimError::InvalidConfiguration(message.into())
    }
}

pub type Result<T> = std::result::Result<T, SimError>;
