//! Container input files
//!
//! One container per line, seven whitespace-separated integers:
//! `identifier size value arrival_start arrival_end delivery_start delivery_end`.

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader, Read, Write};
use std::path::Path;

use tracing::warn;
use yard_core::{Container, TimeRange};

use crate::error::{Result, SimulationError};

const FIELDS: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ContainerLoader {
    require_sorted: bool,
}

impl ContainerLoader {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Treat an arrival list that is not sorted by arrival window as malformed
    /// instead of only warning about it
    #[inline]
    pub fn require_sorted(mut self, yes: bool) -> Self {
        self.require_sorted = yes;
        self
    }

    pub fn from_bufread<R: BufRead>(&self, br: R) -> Result<Vec<Container>> {
        let mut containers: Vec<Container> = Vec::new();
        let mut seen = HashSet::new();

        for (index, line) in br.lines().enumerate() {
            let line_no = index + 1;
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            let container = parse_line(&line, line_no)?;
            if !seen.insert(container.identifier) {
                return Err(SimulationError::malformed(
                    line_no,
                    format!("duplicate container identifier {}", container.identifier),
                ));
            }

            if let Some(previous) = containers.last() {
                if (container.arrival.start, container.arrival.end)
                    < (previous.arrival.start, previous.arrival.end)
                {
                    if self.require_sorted {
                        return Err(SimulationError::malformed(
                            line_no,
                            "containers are not sorted by arrival window",
                        ));
                    }
                    warn!(
                        "Container {} arrives before container {} listed above it",
                        container.identifier, previous.identifier
                    );
                }
            }
            containers.push(container);
        }

        Ok(containers)
    }

    #[inline]
    pub fn from_path(&self, path: impl AsRef<Path>) -> Result<Vec<Container>> {
        let file = File::open(path)?;
        self.from_bufread(BufReader::new(file))
    }

    #[inline]
    pub fn from_reader<R: Read>(&self, r: R) -> Result<Vec<Container>> {
        self.from_bufread(BufReader::new(r))
    }

    #[inline]
    pub fn from_str(&self, s: &str) -> Result<Vec<Container>> {
        self.from_reader(s.as_bytes())
    }
}

fn parse_line(line: &str, line_no: usize) -> Result<Container> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() != FIELDS {
        return Err(SimulationError::malformed(
            line_no,
            format!("expected {} fields, found {}", FIELDS, tokens.len()),
        ));
    }

    let mut fields = [0u64; FIELDS];
    for (field, token) in fields.iter_mut().zip(&tokens) {
        *field = token.parse().map_err(|_| {
            SimulationError::malformed(
                line_no,
                format!("{:?} is not a non-negative integer", token),
            )
        })?;
    }

    let [identifier, size, value, arrival_start, arrival_end, delivery_start, delivery_end] =
        fields;
    if size == 0 {
        return Err(SimulationError::malformed(line_no, "container size must be at least 1"));
    }
    if arrival_end < arrival_start || delivery_end < delivery_start {
        return Err(SimulationError::malformed(line_no, "time window ends before it starts"));
    }

    Ok(Container::new(
        identifier,
        size as usize,
        value,
        TimeRange::new(arrival_start, arrival_end),
        TimeRange::new(delivery_start, delivery_end),
    ))
}

/// Write containers in the input file format
pub fn write_containers<W: Write>(mut writer: W, containers: &[Container]) -> Result<()> {
    for c in containers {
        writeln!(
            writer,
            "{} {} {} {} {} {} {}",
            c.identifier,
            c.size,
            c.value,
            c.arrival.start,
            c.arrival.end,
            c.delivery.start,
            c.delivery.end
        )?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use yard_core::ContainerId;

    const SMALL_OK: &str = "
        1 1 100 0 5 2 4
        2 4 250 5 9 20 40

        3 2 0 9 12 10 11
    ";

    #[test]
    fn test_loads_containers_and_skips_blank_lines() {
        let containers = ContainerLoader::new().from_str(SMALL_OK).unwrap();
        assert_eq!(containers.len(), 3);

        let first = &containers[0];
        assert_eq!(first.identifier, ContainerId(1));
        assert_eq!(first.size, 1);
        assert_eq!(first.value, 100);
        assert_eq!(first.arrival, TimeRange::new(0, 5));
        assert_eq!(first.delivery, TimeRange::new(2, 4));
        assert_eq!(containers[1].size, 4);
    }

    #[test]
    fn test_reports_line_of_bad_field_count() {
        let err = ContainerLoader::new()
            .from_str("1 1 100 0 5 2 4\n2 1 100 5 9\n")
            .unwrap_err();
        assert!(matches!(err, SimulationError::Malformed { line: 2, .. }));
    }

    #[test]
    fn test_rejects_negative_and_non_integer_fields() {
        let loader = ContainerLoader::new();
        assert!(loader.from_str("1 1 -100 0 5 2 4").is_err());
        assert!(loader.from_str("1 one 100 0 5 2 4").is_err());
    }

    #[test]
    fn test_rejects_zero_size_and_inverted_windows() {
        let loader = ContainerLoader::new();
        assert!(loader.from_str("1 0 100 0 5 2 4").is_err());
        assert!(loader.from_str("1 1 100 5 0 2 4").is_err());
        assert!(loader.from_str("1 1 100 0 5 4 2").is_err());
    }

    #[test]
    fn test_rejects_duplicate_identifiers() {
        let err = ContainerLoader::new()
            .from_str("1 1 100 0 5 2 4\n1 2 100 5 9 6 8\n")
            .unwrap_err();
        assert!(matches!(err, SimulationError::Malformed { line: 2, .. }));
    }

    #[test]
    fn test_unsorted_input_is_tolerated_unless_required() {
        let input = "1 1 100 5 9 6 8\n2 1 100 0 5 2 4\n";
        assert_eq!(ContainerLoader::new().from_str(input).unwrap().len(), 2);
        assert!(ContainerLoader::new().require_sorted(true).from_str(input).is_err());
    }

    #[test]
    fn test_written_file_loads_back() {
        let containers = ContainerLoader::new().from_str(SMALL_OK).unwrap();
        let mut buffer = Vec::new();
        write_containers(&mut buffer, &containers).unwrap();

        let text = String::from_utf8(buffer).unwrap();
        assert!(text.starts_with("1 1 100 0 5 2 4\n"));
        let reloaded = ContainerLoader::new().from_str(&text).unwrap();
        assert_eq!(reloaded.len(), containers.len());
    }
}
