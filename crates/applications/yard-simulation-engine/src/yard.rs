//! Yard state: a fixed-width row of stacks plus accumulated cash
//!
//! A container of size `s` based at position `p` is the top element of
//! stacks `p..p+s` at once, and those stacks all had the same height when
//! it was placed (rectangularity). Stacks hold identifiers only; the
//! container record and its location live once in the placement index.

use std::collections::{HashMap, HashSet};

use yard_core::{Container, ContainerId, Location, PlacedContainer, Position, YardError, YardSnapshot};

/// One logical placement of a container
#[derive(Debug, Clone)]
struct Placement {
    container: Container,
    location: Location,
}

/// Physical arrangement of containers in the yard
#[derive(Debug, Clone)]
pub struct Yard {
    width: usize,
    cash: u64,
    stacks: Vec<Vec<ContainerId>>,
    placements: HashMap<ContainerId, Placement>,
}

impl Yard {
    /// Create an empty yard of the given width
    pub fn new(width: usize) -> Self {
        Yard {
            width,
            cash: 0,
            stacks: vec![Vec::new(); width],
            placements: HashMap::new(),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Height of the tallest stack
    pub fn height(&self) -> usize {
        self.stacks.iter().map(Vec::len).max().unwrap_or(0)
    }

    pub fn stack_height(&self, position: Position) -> usize {
        self.stacks.get(position).map_or(0, Vec::len)
    }

    pub fn cash(&self) -> u64 {
        self.cash
    }

    pub fn add_cash(&mut self, amount: u64) -> Result<(), YardError> {
        self.cash = self
            .cash
            .checked_add(amount)
            .ok_or(YardError::CashOverflow {
                cash: self.cash,
                amount,
            })?;
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    /// Number of containers currently in the yard
    pub fn len(&self) -> usize {
        self.placements.len()
    }

    pub fn contains(&self, c: &Container) -> bool {
        self.placements.contains_key(&c.identifier)
    }

    /// True iff the footprint `[position, position + size)` exists and is flat
    pub fn can_add(&self, c: &Container, position: Position) -> bool {
        match self.footprint(c.size, position) {
            Some(stacks) => {
                let height = stacks[0].len();
                stacks.iter().all(|s| s.len() == height)
            }
            None => false,
        }
    }

    /// Place `c` on top of the stacks under its footprint
    pub fn add(&mut self, c: &Container, position: Position) -> Result<(), YardError> {
        if self.contains(c) {
            return Err(YardError::AlreadyInYard(c.identifier));
        }
        if self.footprint(c.size, position).is_none() {
            return Err(YardError::OutOfBounds {
                id: c.identifier,
                size: c.size,
                position,
                width: self.width,
            });
        }
        if !self.can_add(c, position) {
            return Err(YardError::IllegalPlacement {
                id: c.identifier,
                position,
            });
        }

        let height = self.stacks[position].len();
        for stack in &mut self.stacks[position..position + c.size] {
            stack.push(c.identifier);
        }
        self.placements.insert(
            c.identifier,
            Placement {
                container: *c,
                location: Location::new(height, position),
            },
        );
        Ok(())
    }

    /// True iff nothing rests on `c`.
    ///
    /// Fails with `NotInYard` when `c` is absent.
    pub fn can_remove(&self, c: &Container) -> Result<bool, YardError> {
        let placement = self
            .placements
            .get(&c.identifier)
            .ok_or(YardError::NotInYard(c.identifier))?;
        let base = placement.location.position;
        let size = placement.container.size;
        Ok(self.stacks[base..base + size]
            .iter()
            .all(|s| s.last() == Some(&c.identifier)))
    }

    /// Take `c` off every stack it occupies. Cash is left untouched.
    pub fn remove(&mut self, c: &Container) -> Result<Container, YardError> {
        if !self.can_remove(c)? {
            return Err(YardError::Blocked(c.identifier));
        }
        let placement = self
            .placements
            .remove(&c.identifier)
            .ok_or(YardError::NotInYard(c.identifier))?;
        let base = placement.location.position;
        for stack in &mut self.stacks[base..base + placement.container.size] {
            stack.pop();
        }
        Ok(placement.container)
    }

    /// Remove `c` and add it back at `position`.
    ///
    /// The target is checked against the layout after removal. On failure
    /// the container goes back where it was and the yard is unchanged.
    pub fn relocate(&mut self, c: &Container, position: Position) -> Result<(), YardError> {
        let origin = self.location(c).ok_or(YardError::NotInYard(c.identifier))?;
        let stored = self.remove(c)?;
        if let Err(e) = self.add(&stored, position) {
            self.add(&stored, origin.position)?;
            return Err(e);
        }
        Ok(())
    }

    /// Topmost container at a stack, if any
    pub fn top_container(&self, position: Position) -> Option<&Container> {
        let id = self.stacks.get(position)?.last()?;
        self.placements.get(id).map(|p| &p.container)
    }

    /// Containers with nothing on top of them, each listed once
    pub fn removable_containers(&self) -> Vec<Container> {
        let mut seen = HashSet::new();
        let mut removable = Vec::new();
        for position in 0..self.width {
            if let Some(c) = self.top_container(position) {
                if seen.insert(c.identifier) && matches!(self.can_remove(c), Ok(true)) {
                    removable.push(*c);
                }
            }
        }
        removable
    }

    /// Height inside the base stack and the base stack of `c`
    pub fn location(&self, c: &Container) -> Option<Location> {
        self.placements.get(&c.identifier).map(|p| p.location)
    }

    /// Containers in the yard, each listed once, scanning stacks bottom-up
    pub fn containers(&self) -> Vec<Container> {
        let mut seen = HashSet::new();
        self.stacks
            .iter()
            .flatten()
            .filter(|id| seen.insert(**id))
            .filter_map(|id| self.placements.get(id).map(|p| p.container))
            .collect()
    }

    /// Read-only view handed to renderers
    pub fn snapshot(&self) -> YardSnapshot {
        let placements = self
            .containers()
            .into_iter()
            .filter_map(|container| {
                self.location(&container)
                    .map(|location| PlacedContainer { container, location })
            })
            .collect();
        YardSnapshot {
            width: self.width,
            height: self.height(),
            cash: self.cash,
            placements,
        }
    }

    fn footprint(&self, size: usize, position: Position) -> Option<&[Vec<ContainerId>]> {
        let end = position.checked_add(size)?;
        if size == 0 || end > self.width {
            return None;
        }
        Some(&self.stacks[position..end])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use yard_core::TimeRange;

    fn container(id: u64, size: usize) -> Container {
        Container::new(id, size, id * 10, TimeRange::new(0, 10), TimeRange::new(5, 15))
    }

    #[test]
    fn test_new_yard_is_empty() {
        let yard = Yard::new(10);
        assert!(yard.is_empty());
        assert_eq!(yard.width(), 10);
        assert_eq!(yard.height(), 0);
        assert_eq!(yard.cash(), 0);
        assert!(yard.top_container(0).is_none());
    }

    #[test]
    fn test_mixed_sizes_removable_containers() {
        let mut yard = Yard::new(10);
        let c1 = container(1, 1);
        let c2 = container(2, 2);
        let c3 = container(3, 3);
        let c4 = container(4, 4);

        yard.add(&c3, 1).unwrap();
        yard.add(&c2, 1).unwrap();
        yard.add(&c4, 5).unwrap();
        yard.add(&c1, 5).unwrap();

        assert_eq!(yard.removable_containers(), vec![c2, c1]);
        assert_eq!(yard.height(), 2);
        assert_eq!(yard.containers().len(), 4);
        assert_eq!(yard.location(&c2), Some(Location::new(1, 1)));
        assert_eq!(yard.location(&c4), Some(Location::new(0, 5)));
    }

    #[test]
    fn test_can_add_requires_flat_footprint() {
        let mut yard = Yard::new(6);
        yard.add(&container(1, 1), 1).unwrap();

        let wide = container(2, 2);
        assert!(!yard.can_add(&wide, 0)); // heights 0 and 1
        assert!(!yard.can_add(&wide, 1)); // heights 1 and 0
        assert!(yard.can_add(&wide, 2));

        assert_eq!(
            yard.add(&wide, 0),
            Err(YardError::IllegalPlacement {
                id: ContainerId(2),
                position: 0
            })
        );
    }

    #[test]
    fn test_add_out_of_bounds() {
        let mut yard = Yard::new(4);
        let c = container(1, 2);
        assert!(!yard.can_add(&c, 3));
        assert!(matches!(yard.add(&c, 3), Err(YardError::OutOfBounds { .. })));
        assert!(yard.is_empty());
    }

    #[test]
    fn test_add_twice_is_rejected() {
        let mut yard = Yard::new(4);
        let c = container(1, 1);
        yard.add(&c, 0).unwrap();
        assert_eq!(yard.add(&c, 2), Err(YardError::AlreadyInYard(ContainerId(1))));
    }

    #[test]
    fn test_remove_blocked_container() {
        let mut yard = Yard::new(4);
        let bottom = container(1, 2);
        let top = container(2, 1);
        yard.add(&bottom, 0).unwrap();
        yard.add(&top, 1).unwrap();

        assert_eq!(yard.can_remove(&bottom), Ok(false));
        assert_eq!(yard.remove(&bottom), Err(YardError::Blocked(ContainerId(1))));

        yard.remove(&top).unwrap();
        assert_eq!(yard.can_remove(&bottom), Ok(true));
        yard.remove(&bottom).unwrap();
        assert!(yard.is_empty());
        assert_eq!(yard.height(), 0);
    }

    #[test]
    fn test_can_remove_absent_container() {
        let yard = Yard::new(4);
        assert_eq!(
            yard.can_remove(&container(9, 1)),
            Err(YardError::NotInYard(ContainerId(9)))
        );
    }

    #[test]
    fn test_relocate_checks_layout_after_removal() {
        let mut yard = Yard::new(4);
        let wide = container(1, 2);
        yard.add(&wide, 0).unwrap();

        // Overlaps its own footprint: only legal once it has been lifted
        yard.relocate(&wide, 1).unwrap();
        assert_eq!(yard.location(&wide), Some(Location::new(0, 1)));
        assert_eq!(yard.stack_height(0), 0);
        assert_eq!(yard.stack_height(2), 1);
    }

    #[test]
    fn test_failed_relocate_restores_container() {
        let mut yard = Yard::new(4);
        let blocker = container(1, 1);
        let wide = container(2, 2);
        yard.add(&blocker, 3).unwrap();
        yard.add(&wide, 0).unwrap();

        assert!(yard.relocate(&wide, 2).is_err());
        assert_eq!(yard.location(&wide), Some(Location::new(0, 0)));
        assert_eq!(yard.len(), 2);
    }

    #[test]
    fn test_cash_is_independent_of_removal() {
        let mut yard = Yard::new(2);
        let c = container(1, 1);
        yard.add(&c, 0).unwrap();
        yard.remove(&c).unwrap();
        assert_eq!(yard.cash(), 0);
        yard.add_cash(c.value).unwrap();
        assert_eq!(yard.cash(), 10);
    }

    #[test]
    fn test_cash_overflow_is_refused() {
        let mut yard = Yard::new(2);
        yard.add_cash(u64::MAX - 1).unwrap();
        assert_eq!(
            yard.add_cash(2),
            Err(YardError::CashOverflow {
                cash: u64::MAX - 1,
                amount: 2
            })
        );
        assert_eq!(yard.cash(), u64::MAX - 1);
        yard.add_cash(1).unwrap();
        assert_eq!(yard.cash(), u64::MAX);
    }

    #[test]
    fn test_snapshot_lists_each_container_once() {
        let mut yard = Yard::new(8);
        yard.add(&container(1, 4), 0).unwrap();
        yard.add(&container(2, 2), 0).unwrap();
        yard.add_cash(5).unwrap();

        let snapshot = yard.snapshot();
        assert_eq!(snapshot.width, 8);
        assert_eq!(snapshot.height, 2);
        assert_eq!(snapshot.cash, 5);
        assert_eq!(snapshot.placements.len(), 2);
    }
}
