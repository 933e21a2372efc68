//! Error types for yard operations

use thiserror::Error;

use crate::types::{ContainerId, Position};

/// Contract violations raised by the yard's mutating primitives.
///
/// Every variant means the caller asked for something the corresponding
/// `can_*` predicate would have refused. None of them are retried.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum YardError {
    #[error("Container {id} of size {size} at position {position} does not fit in a yard of width {width}")]
    OutOfBounds {
        id: ContainerId,
        size: usize,
        position: Position,
        width: usize,
    },

    #[error("Container {id} cannot rest at position {position}: uneven stack heights under its footprint")]
    IllegalPlacement { id: ContainerId, position: Position },

    #[error("Container {0} is already in the yard")]
    AlreadyInYard(ContainerId),

    #[error("Container {0} is not in the yard")]
    NotInYard(ContainerId),

    #[error("Container {0} is blocked by containers resting on it")]
    Blocked(ContainerId),

    #[error("Adding {amount} to cash {cash} overflows")]
    CashOverflow { cash: u64, amount: u64 },
}
