//! Append-only action log
//!
//! One event per line, space separated:
//!
//! ```text
//! 0 START <name> <width>
//! <time> ADD <id> <position>
//! <time> REMOVE <id>
//! <time> MOVE <id> <position>
//! <time> CASH <amount>
//! ```
//!
//! Times never decrease. The strategy writes the log and never reads it
//! back; the verifier parses it with [`Action::from_str`].

use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;
use yard_core::{Container, ContainerId, Position, TimeStamp};

use crate::error::{Result, SimulationError};

/// One logged yard event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    Start { name: String, width: usize },
    Add { time: TimeStamp, id: ContainerId, position: Position },
    Remove { time: TimeStamp, id: ContainerId },
    Move { time: TimeStamp, id: ContainerId, position: Position },
    Cash { time: TimeStamp, amount: u64 },
}

impl Action {
    /// Timestamp of the event (START is always at 0)
    pub fn time(&self) -> TimeStamp {
        match self {
            Action::Start { .. } => 0,
            Action::Add { time, .. }
            | Action::Remove { time, .. }
            | Action::Move { time, .. }
            | Action::Cash { time, .. } => *time,
        }
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            Action::Start { .. } => "START",
            Action::Add { .. } => "ADD",
            Action::Remove { .. } => "REMOVE",
            Action::Move { .. } => "MOVE",
            Action::Cash { .. } => "CASH",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Start { name, width } => write!(f, "0 START {} {}", name, width),
            Action::Add { time, id, position } => write!(f, "{} ADD {} {}", time, id, position),
            Action::Remove { time, id } => write!(f, "{} REMOVE {}", time, id),
            Action::Move { time, id, position } => write!(f, "{} MOVE {} {}", time, id, position),
            Action::Cash { time, amount } => write!(f, "{} CASH {}", time, amount),
        }
    }
}

/// Reason a log line could not be parsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseActionError(String);

impl fmt::Display for ParseActionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for ParseActionError {}

fn parse_field<T: FromStr>(token: &str, what: &str) -> std::result::Result<T, ParseActionError> {
    token
        .parse()
        .map_err(|_| ParseActionError(format!("invalid {}: {:?}", what, token)))
}

impl FromStr for Action {
    type Err = ParseActionError;

    fn from_str(line: &str) -> std::result::Result<Self, Self::Err> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let (time, keyword, args) = match tokens.as_slice() {
            [time, keyword, args @ ..] => (*time, *keyword, args),
            _ => return Err(ParseActionError(format!("too few fields in {:?}", line))),
        };
        let time: TimeStamp = parse_field(time, "time")?;

        let expected = match keyword {
            "START" | "ADD" | "MOVE" => 2,
            "REMOVE" | "CASH" => 1,
            other => return Err(ParseActionError(format!("unknown event {:?}", other))),
        };
        if args.len() != expected {
            return Err(ParseActionError(format!(
                "{} takes {} arguments, found {}",
                keyword,
                expected,
                args.len()
            )));
        }

        let action = match keyword {
            "START" => {
                if time != 0 {
                    return Err(ParseActionError(format!("START at time {}", time)));
                }
                Action::Start {
                    name: args[0].to_string(),
                    width: parse_field(args[1], "width")?,
                }
            }
            "ADD" => Action::Add {
                time,
                id: ContainerId(parse_field(args[0], "container id")?),
                position: parse_field(args[1], "position")?,
            },
            "MOVE" => Action::Move {
                time,
                id: ContainerId(parse_field(args[0], "container id")?),
                position: parse_field(args[1], "position")?,
            },
            "REMOVE" => Action::Remove {
                time,
                id: ContainerId(parse_field(args[0], "container id")?),
            },
            _ => Action::Cash {
                time,
                amount: parse_field(args[0], "amount")?,
            },
        };
        Ok(action)
    }
}

/// Writes actions to a sink in non-decreasing time order
pub struct ActionLog<W: Write> {
    writer: W,
    last_time: TimeStamp,
    entries: usize,
}

impl ActionLog<BufWriter<File>> {
    /// Create (truncate) a log file and write its START line
    pub fn create(path: impl AsRef<Path>, name: &str, width: usize) -> Result<Self> {
        let file = File::create(path)?;
        ActionLog::new(BufWriter::new(file), name, width)
    }
}

impl<W: Write> ActionLog<W> {
    /// Wrap a writer and write the START line
    pub fn new(writer: W, name: &str, width: usize) -> Result<Self> {
        let mut log = ActionLog {
            writer,
            last_time: 0,
            entries: 0,
        };
        log.record(&Action::Start {
            name: name.to_string(),
            width,
        })?;
        Ok(log)
    }

    pub fn add(&mut self, t: TimeStamp, c: &Container, p: Position) -> Result<()> {
        self.record(&Action::Add {
            time: t,
            id: c.identifier,
            position: p,
        })
    }

    pub fn remove(&mut self, t: TimeStamp, c: &Container) -> Result<()> {
        self.record(&Action::Remove {
            time: t,
            id: c.identifier,
        })
    }

    pub fn relocate(&mut self, t: TimeStamp, c: &Container, p: Position) -> Result<()> {
        self.record(&Action::Move {
            time: t,
            id: c.identifier,
            position: p,
        })
    }

    pub fn cash(&mut self, t: TimeStamp, cash: u64) -> Result<()> {
        self.record(&Action::Cash {
            time: t,
            amount: cash,
        })
    }

    /// Append one action, refusing to go back in time
    pub fn record(&mut self, action: &Action) -> Result<()> {
        let time = action.time();
        if time < self.last_time {
            return Err(SimulationError::TimeWentBackwards {
                last: self.last_time,
                time,
            });
        }
        writeln!(self.writer, "{}", action)?;
        debug!("{}", action);
        self.last_time = time;
        self.entries += 1;
        Ok(())
    }

    /// Number of lines written, START included
    pub fn entries(&self) -> usize {
        self.entries
    }

    pub fn last_time(&self) -> TimeStamp {
        self.last_time
    }

    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    /// Flush and hand back the underlying writer
    pub fn into_inner(mut self) -> Result<W> {
        self.flush()?;
        Ok(self.writer)
    }
}
