//! Yard Simulation Engine
//!
//! Discrete-time simulator for a container stacking yard: stacking
//! strategies that write an action log, and a verifier that replays
//! action logs against the yard rules.

pub mod config;
pub mod error;
pub mod generator;
pub mod loader;
pub mod log;
pub mod policies;
pub mod render;
pub mod replay;
pub mod simulator;
pub mod yard;

pub use config::SimulationConfig;
pub use error::{Result, SimulationError};
pub use simulator::{SimulationResult, Strategy};
pub use yard::Yard;
