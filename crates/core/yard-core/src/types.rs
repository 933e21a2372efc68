//! Core types shared across yard components

use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// Simulated discrete clock value
pub type TimeStamp = u64;

/// Index of a stack in the yard (0 = leftmost)
pub type Position = usize;

/// Unique, stable identifier of a container
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ContainerId(pub u64);

impl ContainerId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ContainerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Half-open time interval `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: TimeStamp,
    pub end: TimeStamp,
}

impl TimeRange {
    pub fn new(start: TimeStamp, end: TimeStamp) -> Self {
        TimeRange { start, end }
    }

    /// True iff `start <= t < end`
    pub fn contains(&self, t: TimeStamp) -> bool {
        self.start <= t && t < self.end
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    pub fn len(&self) -> TimeStamp {
        self.end.saturating_sub(self.start)
    }
}

/// A container waiting to be stored, sold or discarded.
///
/// Identity is by `identifier` only: two containers compare equal iff
/// their identifiers match.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Container {
    pub identifier: ContainerId,
    /// Number of contiguous stacks the container spans
    pub size: usize,
    /// Cash granted when delivered inside the delivery window
    pub value: u64,
    pub arrival: TimeRange,
    pub delivery: TimeRange,
}

impl Container {
    pub fn new(
        identifier: u64,
        size: usize,
        value: u64,
        arrival: TimeRange,
        delivery: TimeRange,
    ) -> Self {
        Container {
            identifier: ContainerId(identifier),
            size,
            value,
            arrival,
            delivery,
        }
    }

    /// The delivery window has closed at time `t`
    pub fn is_expired(&self, t: TimeStamp) -> bool {
        t >= self.delivery.end
    }

    /// Time `t` falls inside the delivery window
    pub fn is_deliverable(&self, t: TimeStamp) -> bool {
        self.delivery.contains(t)
    }
}

impl PartialEq for Container {
    fn eq(&self, other: &Self) -> bool {
        self.identifier == other.identifier
    }
}

impl Eq for Container {}

impl Hash for Container {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identifier.hash(state);
    }
}

/// Where a container rests: height inside its base stack, and the base stack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    pub height: usize,
    pub position: Position,
}

impl Location {
    pub fn new(height: usize, position: Position) -> Self {
        Location { height, position }
    }
}

/// A container together with its location, as seen by renderers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacedContainer {
    pub container: Container,
    pub location: Location,
}

/// Read-only view of a yard at one instant
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct YardSnapshot {
    pub width: usize,
    pub height: usize,
    pub cash: u64,
    pub placements: Vec<PlacedContainer>,
}
