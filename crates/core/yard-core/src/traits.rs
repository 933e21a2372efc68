//! Core traits for the yard
//!
//! Renderers only ever see a `YardSnapshot`; they get no way to mutate
//! the yard they are drawing.

use std::io;

use crate::types::YardSnapshot;

/// Draws a yard state, e.g. to a terminal.
pub trait Render {
    /// Draw one frame with a caption line above it
    fn render(&mut self, snapshot: &YardSnapshot, caption: &str) -> io::Result<()>;
}
