//! Replay verification of action logs
//!
//! Rebuilds an independent yard from the container set and re-applies
//! every logged action against the yard's legality rules. Any illegal
//! action, unknown container, time going backwards, or CASH line that
//! disagrees with the reconstructed cash is reported with its line and
//! time. Optionally draws the yard after every action.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use yard_core::{Container, ContainerId, Render, TimeStamp};

use crate::error::{Result, SimulationError};
use crate::log::Action;
use crate::policies::MAX_WIDTH;
use crate::yard::Yard;

/// Outcome of a successful verification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationReport {
    pub name: String,
    pub width: usize,
    /// Actions after the START line
    pub actions: usize,
    pub final_cash: u64,
    /// Every CASH line, as `(time, cash)`
    pub cash_history: Vec<(TimeStamp, u64)>,
    pub delivered: usize,
    pub expired: usize,
    /// Removed before their delivery window opened
    pub discarded: usize,
    /// Still in the yard when the log ends
    pub remaining: Vec<ContainerId>,
    pub last_time: TimeStamp,
}

/// Replays action logs against a fixed container set
pub struct Verifier<'a> {
    containers: HashMap<ContainerId, Container>,
    renderer: Option<&'a mut dyn Render>,
}

impl<'a> Verifier<'a> {
    /// Index the container set. Duplicate identifiers are malformed input.
    pub fn new(containers: &[Container]) -> Result<Self> {
        let mut index = HashMap::with_capacity(containers.len());
        for (i, c) in containers.iter().enumerate() {
            if index.insert(c.identifier, *c).is_some() {
                return Err(SimulationError::malformed(
                    i + 1,
                    format!("duplicate container identifier {}", c.identifier),
                ));
            }
        }
        Ok(Verifier {
            containers: index,
            renderer: None,
        })
    }

    /// Draw the yard after the START line and after every action
    pub fn with_renderer(mut self, renderer: &'a mut dyn Render) -> Self {
        self.renderer = Some(renderer);
        self
    }

    pub fn verify_path(&mut self, path: impl AsRef<Path>) -> Result<VerificationReport> {
        let file = File::open(path)?;
        self.verify_bufread(BufReader::new(file))
    }

    pub fn verify_reader<R: Read>(&mut self, r: R) -> Result<VerificationReport> {
        self.verify_bufread(BufReader::new(r))
    }

    pub fn verify_str(&mut self, s: &str) -> Result<VerificationReport> {
        self.verify_reader(s.as_bytes())
    }

    pub fn verify_bufread<R: BufRead>(&mut self, br: R) -> Result<VerificationReport> {
        let mut lines = br
            .lines()
            .enumerate()
            .map(|(i, line)| line.map(|l| (i + 1, l)));

        let (name, width) = match lines.next().transpose()? {
            Some((line_no, line)) => match line.parse::<Action>() {
                Ok(Action::Start { width, .. }) if width > MAX_WIDTH => {
                    return Err(SimulationError::malformed(
                        line_no,
                        format!("declared width {} exceeds the maximum of {}", width, MAX_WIDTH),
                    ));
                }
                Ok(Action::Start { name, width }) => (name, width),
                Ok(other) => {
                    return Err(SimulationError::malformed(
                        line_no,
                        format!("expected a START header, found {}", other.keyword()),
                    ));
                }
                Err(e) => {
                    return Err(SimulationError::malformed(line_no, format!("bad header: {}", e)));
                }
            },
            None => return Err(SimulationError::malformed(1, "empty action log")),
        };

        let mut replay = Replay {
            report: VerificationReport {
                name,
                width,
                actions: 0,
                final_cash: 0,
                cash_history: Vec::new(),
                delivered: 0,
                expired: 0,
                discarded: 0,
                remaining: Vec::new(),
                last_time: 0,
            },
            yard: Yard::new(width),
        };
        self.draw(&replay.yard, &replay.report.name)?;

        for line in lines {
            let (line_no, line) = line?;
            if line.trim().is_empty() {
                continue;
            }
            let action = line
                .parse::<Action>()
                .map_err(|e| SimulationError::malformed(line_no, e.to_string()))?;
            self.apply(&mut replay, line_no, &action)?;

            let caption = format!("{} t: {}", replay.report.name, action.time());
            self.draw(&replay.yard, &caption)?;
        }

        let mut report = replay.report;
        report.final_cash = replay.yard.cash();
        report.remaining = replay.yard.containers().iter().map(|c| c.identifier).collect();
        info!(
            "Verified {} actions of {}: cash {}, {} delivered, {} expired, {} still in the yard",
            report.actions,
            report.name,
            report.final_cash,
            report.delivered,
            report.expired,
            report.remaining.len()
        );
        Ok(report)
    }

    fn apply(&self, replay: &mut Replay, line_no: usize, action: &Action) -> Result<()> {
        let time = action.time();
        if time < replay.report.last_time {
            return Err(SimulationError::mismatch(
                line_no,
                time,
                format!("time goes back from {}", replay.report.last_time),
            ));
        }
        replay.report.last_time = time;
        replay.report.actions += 1;
        debug!("Replaying line {}: {}", line_no, action);

        let yard_error = |e| SimulationError::mismatch(line_no, time, format!("{}", e));

        match action {
            Action::Start { .. } => {
                return Err(SimulationError::malformed(line_no, "START may only appear on the first line"));
            }
            Action::Add { id, position, .. } => {
                let c = self.lookup(*id, line_no, time)?;
                replay.yard.add(c, *position).map_err(yard_error)?;
            }
            Action::Move { id, position, .. } => {
                let c = self.lookup(*id, line_no, time)?;
                replay.yard.relocate(c, *position).map_err(yard_error)?;
            }
            Action::Remove { id, .. } => {
                let c = self.lookup(*id, line_no, time)?;
                replay.yard.remove(c).map_err(yard_error)?;
                if c.is_deliverable(time) {
                    replay.yard.add_cash(c.value).map_err(yard_error)?;
                    replay.report.delivered += 1;
                } else if c.is_expired(time) {
                    replay.report.expired += 1;
                } else {
                    replay.report.discarded += 1;
                }
            }
            Action::Cash { amount, .. } => {
                let cash = replay.yard.cash();
                if *amount != cash {
                    return Err(SimulationError::mismatch(
                        line_no,
                        time,
                        format!("logged cash {} but the yard holds {}", amount, cash),
                    ));
                }
                replay.report.cash_history.push((time, cash));
            }
        }
        Ok(())
    }

    fn lookup(&self, id: ContainerId, line_no: usize, time: TimeStamp) -> Result<&Container> {
        self.containers
            .get(&id)
            .ok_or_else(|| SimulationError::mismatch(line_no, time, format!("unknown container {}", id)))
    }

    fn draw(&mut self, yard: &Yard, caption: &str) -> Result<()> {
        if let Some(renderer) = self.renderer.as_mut() {
            renderer.render(&yard.snapshot(), caption)?;
        }
        Ok(())
    }
}

/// Mutable state of one replay
struct Replay {
    report: VerificationReport,
    yard: Yard,
}

#[cfg(test)]
mod tests {
    use super::*;
    use yard_core::{TimeRange, YardSnapshot};

    fn containers() -> Vec<Container> {
        vec![
            Container::new(1, 1, 100, TimeRange::new(0, 5), TimeRange::new(2, 4)),
            Container::new(2, 2, 40, TimeRange::new(5, 8), TimeRange::new(20, 30)),
        ]
    }

    const GOOD_LOG: &str = "0 START Resume 20
0 ADD 1 0
1 MOVE 1 1
2 REMOVE 1
2 CASH 100
5 ADD 2 2
6 MOVE 2 4
";

    #[derive(Default)]
    struct Frames(Vec<(String, usize)>);

    impl Render for Frames {
        fn render(&mut self, snapshot: &YardSnapshot, caption: &str) -> std::io::Result<()> {
            self.0.push((caption.to_string(), snapshot.placements.len()));
            Ok(())
        }
    }

    #[test]
    fn test_verifies_legal_log() {
        let report = Verifier::new(&containers()).unwrap().verify_str(GOOD_LOG).unwrap();

        assert_eq!(report.name, "Resume");
        assert_eq!(report.width, 20);
        assert_eq!(report.actions, 6);
        assert_eq!(report.final_cash, 100);
        assert_eq!(report.cash_history, vec![(2, 100)]);
        assert_eq!(report.delivered, 1);
        assert_eq!(report.remaining, vec![ContainerId(2)]);
        assert_eq!(report.last_time, 6);
    }

    #[test]
    fn test_cash_disagreement_is_a_mismatch() {
        let log = "0 START s 20\n0 ADD 1 0\n1 REMOVE 1\n1 CASH 100\n";
        let err = Verifier::new(&containers()).unwrap().verify_str(log).unwrap_err();
        assert!(matches!(err, SimulationError::Mismatch { line: 4, time: 1, .. }));
        assert!(err.is_verification_failure());
    }

    #[test]
    fn test_illegal_move_is_a_mismatch() {
        let log = "0 START s 20\n5 ADD 2 2\n6 ADD 1 2\n7 MOVE 2 4\n";
        let err = Verifier::new(&containers()).unwrap().verify_str(log).unwrap_err();
        assert!(matches!(err, SimulationError::Mismatch { line: 4, time: 7, .. }));
    }

    #[test]
    fn test_unknown_container_is_a_mismatch() {
        let log = "0 START s 20\n0 ADD 9 0\n";
        let err = Verifier::new(&containers()).unwrap().verify_str(log).unwrap_err();
        assert!(matches!(err, SimulationError::Mismatch { line: 2, .. }));
    }

    #[test]
    fn test_removing_absent_container_is_a_mismatch() {
        let log = "0 START s 20\n0 REMOVE 1\n";
        let err = Verifier::new(&containers()).unwrap().verify_str(log).unwrap_err();
        assert!(matches!(err, SimulationError::Mismatch { line: 2, .. }));
    }

    #[test]
    fn test_time_going_back_is_a_mismatch() {
        let log = "0 START s 20\n3 ADD 1 0\n2 REMOVE 1\n";
        let err = Verifier::new(&containers()).unwrap().verify_str(log).unwrap_err();
        assert!(matches!(err, SimulationError::Mismatch { line: 3, time: 2, .. }));
    }

    #[test]
    fn test_malformed_header_and_lines() {
        let mut verifier = Verifier::new(&containers()).unwrap();
        assert!(matches!(
            verifier.verify_str("1 START s 20\n"),
            Err(SimulationError::Malformed { line: 1, .. })
        ));
        assert!(matches!(
            verifier.verify_str("0 START s 18446744073709551615\n"),
            Err(SimulationError::Malformed { line: 1, .. })
        ));
        assert!(matches!(
            verifier.verify_str("0 START s\n"),
            Err(SimulationError::Malformed { line: 1, .. })
        ));
        assert!(matches!(
            verifier.verify_str(""),
            Err(SimulationError::Malformed { .. })
        ));
        assert!(matches!(
            verifier.verify_str("0 START s 20\n1 LIFT 1\n"),
            Err(SimulationError::Malformed { line: 2, .. })
        ));
        assert!(matches!(
            verifier.verify_str("0 START s 20\n0 START s 20\n"),
            Err(SimulationError::Malformed { line: 2, .. })
        ));
    }

    #[test]
    fn test_early_and_late_removals_earn_nothing() {
        let log = "0 START s 20\n5 ADD 2 2\n6 REMOVE 2\n6 CASH 0\n";
        let report = Verifier::new(&containers()).unwrap().verify_str(log).unwrap();
        assert_eq!(report.discarded, 1);
        assert_eq!(report.final_cash, 0);

        let log = "0 START s 20\n0 ADD 1 0\n4 REMOVE 1\n4 CASH 0\n";
        let report = Verifier::new(&containers()).unwrap().verify_str(log).unwrap();
        assert_eq!(report.expired, 1);
    }

    #[test]
    fn test_duplicate_container_ids_are_malformed() {
        let mut set = containers();
        let first = set[0];
        set.push(first);
        assert!(matches!(
            Verifier::new(&set),
            Err(SimulationError::Malformed { line: 3, .. })
        ));
    }

    #[test]
    fn test_renderer_sees_every_frame() {
        let mut frames = Frames::default();
        Verifier::new(&containers())
            .unwrap()
            .with_renderer(&mut frames)
            .verify_str(GOOD_LOG)
            .unwrap();

        assert_eq!(frames.0.len(), 7);
        assert_eq!(frames.0[0], ("Resume".to_string(), 0));
        assert_eq!(frames.0[1], ("Resume t: 0".to_string(), 1));
        assert_eq!(frames.0[6], ("Resume t: 6".to_string(), 1));
    }
}
