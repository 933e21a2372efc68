//! Yard Core - Shared types and traits
//!
//! This crate defines the core abstractions used across:
//! - the yard state machine and strategy engine
//! - the action log replay verifier
//! - terminal renderers
//!
//! Key types:
//! - Container and TimeRange value records
//! - YardSnapshot (read-only query surface for renderers)
//! - Render trait
//! - Error types

pub mod types;
pub mod traits;
pub mod error;

pub use types::*;
pub use traits::*;
pub use error::*;
