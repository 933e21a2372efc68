//! Scan-cursor policies for the strategy engine
//!
//! Both policies share the same base slots, scan sequence and resolution
//! rule. They differ only in where the scan resumes when a new container
//! arrives:
//! - Restart: every arrival starts a fresh pair of passes at position 0
//! - Resume: the cursor carries over from the previous arrival, so far
//!   stacks get revisited before their containers expire

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use yard_core::Position;

use crate::error::{Result, SimulationError};

/// Stack positions visited by the scan, in order. Wraps from 16 back to 0.
///
/// Pairs `(0, 1)`, `(2, 4)`, `(6, 9)`, `(12, 16)` are the two base slots
/// of sizes 1, 2, 3 and 4: each pair is one outward and one inward pass.
pub const SCAN_SEQUENCE: [Position; 8] = [0, 1, 2, 4, 6, 9, 12, 16];

/// Narrowest yard in which every base slot fits (size 4 at 16 ends at 20)
pub const MIN_WIDTH: usize = 20;

/// Widest yard a strategy or a replayed log may declare
pub const MAX_WIDTH: usize = 1 << 16;

/// Base slot where a freshly arrived container of `size` is placed
pub fn base_position(size: usize) -> Result<Position> {
    match size {
        1 => Ok(0),
        2 => Ok(2),
        3 => Ok(6),
        4 => Ok(12),
        _ => Err(SimulationError::UnsupportedSize { size }),
    }
}

/// Scan position following `position`
pub fn next_scan_position(position: Position) -> Result<Position> {
    let index = SCAN_SEQUENCE
        .iter()
        .position(|&p| p == position)
        .ok_or(SimulationError::UnknownScanPosition(position))?;
    Ok(SCAN_SEQUENCE[(index + 1) % SCAN_SEQUENCE.len()])
}

/// Cursor policy trait
pub trait CursorPolicy {
    /// Scan position to use for the arrival that is about to be processed,
    /// given where the previous arrival left the cursor
    fn start_position(&mut self, cursor: Position) -> Position;

    /// Get policy name
    fn name(&self) -> &str;

    /// Arrivals whose scan continued from a non-zero cursor
    fn resumed(&self) -> usize {
        0
    }
}

/// Restart policy: every arrival scans from position 0
pub struct RestartPolicy;

impl RestartPolicy {
    pub fn new() -> Self {
        RestartPolicy
    }
}

impl CursorPolicy for RestartPolicy {
    fn start_position(&mut self, _cursor: Position) -> Position {
        SCAN_SEQUENCE[0]
    }

    fn name(&self) -> &str {
        "Restart"
    }
}

/// Resume policy: keep scanning from wherever the last arrival stopped
pub struct ResumePolicy {
    resumed: usize,
}

impl ResumePolicy {
    pub fn new() -> Self {
        ResumePolicy { resumed: 0 }
    }
}

impl CursorPolicy for ResumePolicy {
    fn start_position(&mut self, cursor: Position) -> Position {
        if cursor != SCAN_SEQUENCE[0] {
            self.resumed += 1;
        }
        cursor
    }

    fn name(&self) -> &str {
        "Resume"
    }

    fn resumed(&self) -> usize {
        self.resumed
    }
}

/// Cursor policy selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CursorPolicyKind {
    /// Start every arrival's scan at position 0
    Restart,

    /// Carry the scan cursor across arrivals
    #[default]
    Resume,
}

impl CursorPolicyKind {
    /// Build the policy object for this kind
    pub fn build(self) -> Box<dyn CursorPolicy> {
        match self {
            CursorPolicyKind::Restart => Box::new(RestartPolicy::new()),
            CursorPolicyKind::Resume => Box::new(ResumePolicy::new()),
        }
    }
}
