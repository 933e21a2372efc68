//! Terminal drawing of yard snapshots
//!
//! Plain text with ANSI escapes: every frame clears the screen, prints the
//! caption, the lowest rows of the yard (each stack two characters wide),
//! a floor line and the cash.

use std::io::{self, Write};
use std::thread;
use std::time::Duration;

use yard_core::{PlacedContainer, Render, YardSnapshot};

/// Rows drawn above the floor; taller stacks are cut off
pub const MAX_ROWS: usize = 15;

const CLEAR: &str = "\x1b[2J\x1b[H";
const RESET: &str = "\x1b[0m";

pub struct TextRenderer<W: Write> {
    out: W,
    delay: Option<Duration>,
    colors: bool,
    clear: bool,
}

impl TextRenderer<io::Stdout> {
    pub fn stdout() -> Self {
        TextRenderer::new(io::stdout())
    }
}

impl<W: Write> TextRenderer<W> {
    pub fn new(out: W) -> Self {
        TextRenderer {
            out,
            delay: None,
            colors: true,
            clear: true,
        }
    }

    /// Pause after every frame
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay).filter(|d| !d.is_zero());
        self
    }

    /// Plain frames, no colors and no screen clearing
    pub fn plain(mut self) -> Self {
        self.colors = false;
        self.clear = false;
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn row(&self, snapshot: &YardSnapshot, height: usize) -> String {
        let mut at_height: Vec<&PlacedContainer> = snapshot
            .placements
            .iter()
            .filter(|p| p.location.height == height)
            .collect();
        at_height.sort_by_key(|p| p.location.position);

        let mut line = String::with_capacity(2 * snapshot.width);
        let mut column = 0;
        for placed in at_height {
            let start = placed.location.position;
            if start < column {
                continue;
            }
            line.push_str(&"  ".repeat(start - column));

            let span = 2 * placed.container.size;
            let label = format!("{:<span$}", placed.container.identifier.value() % 100, span = span);
            if self.colors {
                let color = 1 + placed.container.identifier.value().wrapping_mul(764351) % 250;
                line.push_str(&format!("\x1b[48;5;{}m{}{}", color, label, RESET));
            } else {
                line.push_str(&label);
            }
            column = start + placed.container.size;
        }
        line.truncate(line.trim_end().len());
        line
    }
}

impl<W: Write> Render for TextRenderer<W> {
    fn render(&mut self, snapshot: &YardSnapshot, caption: &str) -> io::Result<()> {
        let mut frame = String::new();
        if self.clear {
            frame.push_str(CLEAR);
        }
        frame.push_str(caption);
        frame.push('\n');

        for height in (0..MAX_ROWS).rev() {
            frame.push_str(&self.row(snapshot, height));
            frame.push('\n');
        }
        frame.push_str(&"=".repeat(2 * snapshot.width));
        frame.push('\n');
        frame.push_str(&format!("$: {}\n", snapshot.cash));

        self.out.write_all(frame.as_bytes())?;
        self.out.flush()?;

        if let Some(delay) = self.delay {
            thread::sleep(delay);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::yard::Yard;
    use yard_core::{Container, TimeRange};

    fn container(id: u64, size: usize) -> Container {
        Container::new(id, size, 10, TimeRange::new(0, 5), TimeRange::new(5, 9))
    }

    fn frame(yard: &Yard) -> Vec<String> {
        let mut renderer = TextRenderer::new(Vec::new()).plain();
        renderer.render(&yard.snapshot(), "test t: 3").unwrap();
        String::from_utf8(renderer.into_inner())
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn test_empty_yard_frame() {
        let lines = frame(&Yard::new(20));
        assert_eq!(lines.len(), 1 + MAX_ROWS + 2);
        assert_eq!(lines[0], "test t: 3");
        assert!(lines[1..=MAX_ROWS].iter().all(|l| l.is_empty()));
        assert_eq!(lines[MAX_ROWS + 1], "=".repeat(40));
        assert_eq!(lines[MAX_ROWS + 2], "$: 0");
    }

    #[test]
    fn test_containers_are_drawn_on_their_rows() {
        let mut yard = Yard::new(20);
        yard.add(&container(101, 2), 2).unwrap();
        yard.add(&container(7, 1), 3).unwrap();
        yard.add(&container(12, 1), 0).unwrap();
        yard.add_cash(250).unwrap();

        let lines = frame(&yard);
        assert_eq!(lines[MAX_ROWS], "12  1");
        assert_eq!(lines[MAX_ROWS - 1], "      7");
        assert_eq!(lines[MAX_ROWS + 2], "$: 250");
    }

    #[test]
    fn test_tall_stacks_are_cut_off() {
        let mut yard = Yard::new(20);
        for id in 0..(MAX_ROWS as u64 + 3) {
            yard.add(&container(id, 1), 5).unwrap();
        }
        let lines = frame(&yard);
        assert_eq!(lines.len(), 1 + MAX_ROWS + 2);
        assert_eq!(lines[1].trim(), "14");
    }

    #[test]
    fn test_colored_frame_clears_screen() {
        let mut yard = Yard::new(20);
        yard.add(&container(3, 1), 0).unwrap();
        let mut renderer = TextRenderer::new(Vec::new());
        renderer.render(&yard.snapshot(), "c").unwrap();
        let text = String::from_utf8(renderer.into_inner()).unwrap();
        assert!(text.starts_with(CLEAR));
        assert!(text.contains("\x1b[48;5;"));
    }
}
