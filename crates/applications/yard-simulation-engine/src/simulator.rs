//! Discrete-time strategy engine for the container yard
//!
//! Containers arrive one at a time. Each one is placed on the base slot
//! of its size class, then the engine scans stacks along the fixed scan
//! sequence until the arrival window closes, resolving the top container
//! of each visited stack:
//! - expired (`t >= delivery.end`): removed without cash
//! - deliverable (`delivery.start <= t < delivery.end`): sold for its value
//! - otherwise: moved one footprint outward (outward pass) or inward
//!   (inward pass) to its size class' other base slot
//!
//! Every placement, removal and relocation costs exactly one time unit.
//! The only thing that varies between strategies is the cursor policy.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use yard_core::{Container, Position, TimeStamp};

use crate::config::SimulationConfig;
use crate::error::{Result, SimulationError};
use crate::log::ActionLog;
use crate::policies::{base_position, next_scan_position, CursorPolicy, SCAN_SEQUENCE};
use crate::yard::Yard;

/// Result of a simulation run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub policy_name: String,
    pub width: usize,
    pub total_containers: usize,
    pub delivered: usize,
    pub expired: usize,
    pub relocations: usize,
    /// Arrivals whose scan picked up where the previous one stopped
    pub resumed_scans: usize,
    pub remaining: usize,
    pub final_cash: u64,
    pub final_time: TimeStamp,
    pub log_entries: usize,
}

/// Direction of one pass over a scan position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Outward,
    Inward,
}

impl Direction {
    fn target(self, position: Position, size: usize) -> Option<Position> {
        match self {
            Direction::Outward => position.checked_add(size),
            Direction::Inward => position.checked_sub(size),
        }
    }
}

/// Placement and eviction engine driving one yard and one action log
pub struct Strategy<W: Write> {
    current_time: TimeStamp,
    cursor: Position,
    yard: Yard,
    log: ActionLog<W>,
    policy: Box<dyn CursorPolicy>,

    // Metrics
    arrivals: usize,
    delivered: usize,
    expired: usize,
    relocations: usize,
}

impl Strategy<BufWriter<File>> {
    /// Create a strategy logging to a file
    pub fn create(config: &SimulationConfig, log_path: impl AsRef<Path>) -> Result<Self> {
        config.validate()?;
        let file = File::create(log_path)?;
        Strategy::new(config, BufWriter::new(file))
    }
}

impl<W: Write> Strategy<W> {
    /// Create a strategy with the policy selected in `config`
    pub fn new(config: &SimulationConfig, writer: W) -> Result<Self> {
        Self::with_policy(config, config.policy.build(), writer)
    }

    /// Create a strategy with a custom cursor policy.
    ///
    /// `config.policy` is ignored.
    pub fn with_policy(
        config: &SimulationConfig,
        policy: Box<dyn CursorPolicy>,
        writer: W,
    ) -> Result<Self> {
        config.validate()?;
        let name = config
            .name
            .clone()
            .unwrap_or_else(|| policy.name().to_string());
        let log = ActionLog::new(writer, &name, config.width)?;

        Ok(Strategy {
            current_time: 0,
            cursor: SCAN_SEQUENCE[0],
            yard: Yard::new(config.width),
            log,
            policy,
            arrivals: 0,
            delivered: 0,
            expired: 0,
            relocations: 0,
        })
    }

    pub fn time(&self) -> TimeStamp {
        self.current_time
    }

    pub fn cursor(&self) -> Position {
        self.cursor
    }

    pub fn cash(&self) -> u64 {
        self.yard.cash()
    }

    pub fn yard(&self) -> &Yard {
        &self.yard
    }

    pub fn log(&self) -> &ActionLog<W> {
        &self.log
    }

    pub fn policy_name(&self) -> &str {
        self.policy.name()
    }

    /// Hand back the action log, e.g. to recover an in-memory writer
    pub fn into_log(self) -> ActionLog<W> {
        self.log
    }

    /// Process every arrival in order, then drain the yard
    pub fn run(&mut self, containers: &[Container]) -> Result<SimulationResult> {
        info!(
            "Running {} strategy on {} containers (width {})",
            self.policy.name(),
            containers.len(),
            self.yard.width()
        );

        for container in containers {
            self.process_arrival(container)?;
        }
        self.drain()?;
        self.log.flush()?;

        let result = self.collect_results();
        info!(
            "Finished at t={}: {} delivered, {} expired, {} relocations, cash {}",
            result.final_time, result.delivered, result.expired, result.relocations, result.final_cash
        );
        Ok(result)
    }

    /// Place a newly arrived container and rebalance until its arrival
    /// window closes
    pub fn process_arrival(&mut self, c: &Container) -> Result<()> {
        if self.current_time >= c.arrival.end {
            warn!(
                "Container {} is processed at t={}, after its arrival window {:?} closed",
                c.identifier, self.current_time, c.arrival
            );
        }
        self.current_time = self.current_time.max(c.arrival.start);
        self.cursor = self.policy.start_position(self.cursor);

        let position = base_position(c.size)?;
        self.yard.add(c, position)?;
        self.log.add(self.current_time, c, position)?;
        self.arrivals += 1;
        self.tick();

        self.rebalance(Some(c.arrival.end))
    }

    /// Keep scanning without a deadline until every container is resolved
    pub fn drain(&mut self) -> Result<()> {
        if !self.yard.is_empty() {
            debug!("Draining {} containers from t={}", self.yard.len(), self.current_time);
        }
        self.rebalance(None)
    }

    fn rebalance(&mut self, deadline: Option<TimeStamp>) -> Result<()> {
        let mut idle_positions = 0;

        loop {
            if self.deadline_reached(deadline) {
                return Ok(());
            }
            if self.yard.is_empty() {
                if let Some(deadline) = deadline {
                    self.current_time = deadline;
                }
                return Ok(());
            }

            let before = self.current_time;
            self.sweep(Direction::Outward, deadline)?;
            self.cursor = next_scan_position(self.cursor)?;
            self.sweep(Direction::Inward, deadline)?;
            self.cursor = next_scan_position(self.cursor)?;

            if self.current_time != before {
                idle_positions = 0;
                continue;
            }
            idle_positions += 2;
            if idle_positions >= SCAN_SEQUENCE.len() {
                match deadline {
                    Some(deadline) => {
                        warn!(
                            "No container reachable from the scan sequence; skipping to t={}",
                            deadline
                        );
                        self.current_time = deadline;
                        return Ok(());
                    }
                    None => {
                        return Err(SimulationError::Stalled {
                            time: self.current_time,
                            remaining: self.yard.len(),
                        });
                    }
                }
            }
        }
    }

    /// Resolve the top of the stack under the cursor until it is empty
    fn sweep(&mut self, direction: Direction, deadline: Option<TimeStamp>) -> Result<()> {
        while !self.deadline_reached(deadline) {
            let Some(c) = self.yard.top_container(self.cursor).copied() else {
                break;
            };
            self.resolve(&c, direction)?;
        }
        Ok(())
    }

    fn resolve(&mut self, c: &Container, direction: Direction) -> Result<()> {
        let t = self.current_time;

        if c.is_expired(t) {
            self.yard.remove(c)?;
            self.log.remove(t, c)?;
            self.log.cash(t, self.yard.cash())?;
            self.expired += 1;
        } else if c.is_deliverable(t) {
            self.yard.remove(c)?;
            self.yard.add_cash(c.value)?;
            self.log.remove(t, c)?;
            self.log.cash(t, self.yard.cash())?;
            self.delivered += 1;
        } else {
            let base = self
                .yard
                .location(c)
                .map_or(self.cursor, |location| location.position);
            let target = direction
                .target(base, c.size)
                .ok_or(SimulationError::NoTarget {
                    id: c.identifier,
                    position: base,
                })?;
            self.yard.relocate(c, target)?;
            self.log.relocate(t, c, target)?;
            self.relocations += 1;
        }

        self.tick();
        Ok(())
    }

    fn deadline_reached(&self, deadline: Option<TimeStamp>) -> bool {
        deadline.is_some_and(|deadline| self.current_time >= deadline)
    }

    fn tick(&mut self) {
        self.current_time += 1;
    }

    fn collect_results(&self) -> SimulationResult {
        SimulationResult {
            policy_name: self.policy.name().to_string(),
            width: self.yard.width(),
            total_containers: self.arrivals,
            delivered: self.delivered,
            expired: self.expired,
            relocations: self.relocations,
            resumed_scans: self.policy.resumed(),
            remaining: self.yard.len(),
            final_cash: self.yard.cash(),
            final_time: self.current_time,
            log_entries: self.log.entries(),
        }
    }
}
