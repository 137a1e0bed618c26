//! Configuration errors
//!
//! Gameplay failures (wrong turn, timeout) are game events, not errors.
//! The only fallible step is building a session from a `Tuning`.

use thiserror::Error;

/// Result alias for session setup
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Invalid tuning detected at session setup
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The stair ring needs at least one slot
    #[error("stair ring must contain at least one stair")]
    EmptyRing,

    /// A probability outside [0, 1]
    #[error("{name} must be within [0, 1], got {value}")]
    InvalidProbability { name: &'static str, value: f32 },

    /// Special stair chances share one draw, so they must fit in [0, 1]
    #[error("special stair chances sum to {total}, which exceeds 1")]
    ProbabilitiesExceedOne { total: f32 },

    /// A duration or threshold that must be strictly positive
    #[error("{name} must be positive, got {value}")]
    NonPositive { name: &'static str, value: f32 },

    /// Overlap ratio outside (0, 1]
    #[error("landing overlap ratio must be within (0, 1], got {value}")]
    InvalidRatio { value: f32 },

    /// Scripted layouts start from the same spot as generated ones
    #[error("scripted stairs must start with a right turn")]
    ScriptedStartsLeft,

    /// Tuning JSON could not be parsed
    #[error("invalid tuning JSON: {0}")]
    Parse(#[from] serde_json::Error),
}
