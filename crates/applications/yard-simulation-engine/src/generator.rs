//! Synthetic container sets
//!
//! Produces arrival lists in the container file format:
//! - Arrival windows follow each other without overlap
//! - Sizes are uniform over the supported sizes
//! - Values follow a normal distribution clamped to `[0, 2 * mean]`
//! - Delivery windows open at or after the end of the arrival window

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal, Uniform};
use tracing::debug;
use yard_core::{Container, TimeRange, TimeStamp};

use crate::error::{Result, SimulationError};

/// Largest container size with a reserved base slot
pub const MAX_SIZE: usize = 4;

/// Seeded generator of container arrival lists
pub struct ContainerGenerator {
    rng: StdRng,
    mean_value: f64,
    value_std_dev: f64,
    max_arrival_window: TimeStamp,
    max_delivery_delay: TimeStamp,
    max_delivery_window: TimeStamp,
}

impl ContainerGenerator {
    /// Create a generator with the default shape
    ///
    /// # Arguments
    /// * `seed` - RNG seed; equal seeds give equal container sets
    pub fn new(seed: u64) -> Self {
        ContainerGenerator {
            rng: StdRng::seed_from_u64(seed),
            mean_value: 100.0,
            value_std_dev: 40.0,
            max_arrival_window: 5,
            max_delivery_delay: 30,
            max_delivery_window: 20,
        }
    }

    /// Mean and standard deviation of container values
    pub fn with_value(mut self, mean: f64, std_dev: f64) -> Self {
        self.mean_value = mean;
        self.value_std_dev = std_dev;
        self
    }

    /// Upper bounds (inclusive) on arrival window length, delay between
    /// arrival and delivery, and delivery window length
    pub fn with_windows(
        mut self,
        max_arrival_window: TimeStamp,
        max_delivery_delay: TimeStamp,
        max_delivery_window: TimeStamp,
    ) -> Self {
        self.max_arrival_window = max_arrival_window;
        self.max_delivery_delay = max_delivery_delay;
        self.max_delivery_window = max_delivery_window;
        self
    }

    /// Generate `count` containers with identifiers `1..=count`, sorted by
    /// arrival window
    pub fn generate(&mut self, count: usize) -> Result<Vec<Container>> {
        if self.max_arrival_window == 0 || self.max_delivery_window == 0 {
            return Err(SimulationError::config("time windows must be at least 1 tick long"));
        }
        if !(self.mean_value >= 0.0) {
            return Err(SimulationError::config(format!(
                "mean value {} must be non-negative",
                self.mean_value
            )));
        }
        if !(self.value_std_dev >= 0.0) {
            return Err(SimulationError::config(format!(
                "value standard deviation {} must be non-negative",
                self.value_std_dev
            )));
        }
        let values = Normal::new(self.mean_value, self.value_std_dev)
            .map_err(|e| SimulationError::config(format!("value distribution: {}", e)))?;
        let sizes = Uniform::new_inclusive(1, MAX_SIZE);
        let max_value = 2.0 * self.mean_value;

        let mut containers = Vec::with_capacity(count);
        let mut arrival_start: TimeStamp = 0;

        for i in 0..count {
            let arrival_end = arrival_start + self.rng.gen_range(1..=self.max_arrival_window);
            let delivery_start = arrival_end + self.rng.gen_range(0..=self.max_delivery_delay);
            let delivery_end = delivery_start + self.rng.gen_range(1..=self.max_delivery_window);

            let value = values.sample(&mut self.rng).clamp(0.0, max_value).round() as u64;

            containers.push(Container::new(
                i as u64 + 1,
                sizes.sample(&mut self.rng),
                value,
                TimeRange::new(arrival_start, arrival_end),
                TimeRange::new(delivery_start, delivery_end),
            ));
            arrival_start = arrival_end;
        }

        debug!(
            "Generated {} containers, last arrival window ends at {}",
            containers.len(),
            arrival_start
        );
        Ok(containers)
    }
}
