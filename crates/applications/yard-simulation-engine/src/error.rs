//! Error types for the simulation engine

use thiserror::Error;
use yard_core::{ContainerId, Position, TimeStamp, YardError};

/// Simulation result type
pub type Result<T> = std::result::Result<T, SimulationError>;

/// Errors that can occur while simulating, loading or replaying
#[derive(Error, Debug)]
pub enum SimulationError {
    /// Yard contract violation
    #[error("Yard error: {0}")]
    Yard(#[from] YardError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// No base slot is reserved for this container size
    #[error("Unsupported container size {size} (supported: 1..=4)")]
    UnsupportedSize { size: usize },

    /// Position is not part of the scan sequence
    #[error("Position {0} is not in the scan sequence")]
    UnknownScanPosition(Position),

    /// Yard too narrow for the reserved base slots
    #[error("Yard width {width} is too small (need at least {min})")]
    WidthTooSmall { width: usize, min: usize },

    /// Configuration error
    #[error("Configuration error: {0}")]
    InvalidConfig(String),

    /// An event was logged earlier than the previous one
    #[error("Time went backwards: {time} after {last}")]
    TimeWentBackwards { last: TimeStamp, time: TimeStamp },

    /// Inward relocation would leave the yard
    #[error("Container {id} has no stack to move to from position {position}")]
    NoTarget { id: ContainerId, position: Position },

    /// A full scan cycle resolved nothing although the yard is not empty
    #[error("Scan stalled at time {time} with {remaining} containers in the yard")]
    Stalled { time: TimeStamp, remaining: usize },

    /// Input data could not be parsed
    #[error("Line {line}: {reason}")]
    Malformed { line: usize, reason: String },

    /// A replayed action is not legal or disagrees with the yard
    #[error("Verification failed at line {line} (t={time}): {reason}")]
    Mismatch {
        line: usize,
        time: TimeStamp,
        reason: String,
    },
}

impl SimulationError {
    /// Create a malformed-input error
    pub fn malformed(line: usize, reason: impl Into<String>) -> Self {
        Self::Malformed {
            line,
            reason: reason.into(),
        }
    }

    /// Create a verification mismatch
    pub fn mismatch(line: usize, time: TimeStamp, reason: impl Into<String>) -> Self {
        Self::Mismatch {
            line,
            time,
            reason: reason.into(),
        }
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// True for failures that point at a faulty action log
    pub fn is_verification_failure(&self) -> bool {
        matches!(self, Self::Mismatch { .. })
    }
}
