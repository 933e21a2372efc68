//! Strategy construction parameters

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimulationError};
use crate::policies::{CursorPolicyKind, MAX_WIDTH, MIN_WIDTH};

/// Parameters fixed when a strategy is built
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Number of stacks in the yard
    pub width: usize,

    /// Name written to the START line of the action log.
    /// Defaults to the policy name.
    pub name: Option<String>,

    /// Scan cursor policy
    pub policy: CursorPolicyKind,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            width: MIN_WIDTH,
            name: None,
            policy: CursorPolicyKind::default(),
        }
    }
}

impl SimulationConfig {
    pub fn new(width: usize, policy: CursorPolicyKind) -> Self {
        Self {
            width,
            name: None,
            policy,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Check the yard is wide enough and the log name is a single token
    pub fn validate(&self) -> Result<()> {
        if self.width < MIN_WIDTH {
            return Err(SimulationError::WidthTooSmall {
                width: self.width,
                min: MIN_WIDTH,
            });
        }
        if self.width > MAX_WIDTH {
            return Err(SimulationError::config(format!(
                "yard width {} exceeds the maximum of {}",
                self.width, MAX_WIDTH
            )));
        }
        if let Some(name) = &self.name {
            if name.is_empty() || name.chars().any(char::is_whitespace) {
                return Err(SimulationError::config(format!(
                    "log name {:?} must be a single non-empty word",
                    name
                )));
            }
        }
        Ok(())
    }
}
