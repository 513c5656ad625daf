//! Safety module: the Banker's safety check as a lazy, restartable event stream.
//!
//! [`SafetyScan`] is the only implementation of the safety algorithm. The
//! tracker drives it to completion for its own decisions, and a viewer can
//! consume the same events one at a time, so both always agree on scan order
//! and selection.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use std::fmt;
use std::iter::FusedIterator;

use tracing::trace;

use crate::invariant_ppt::{assert_invariant, SCAN_CANONICAL_ORDER, SCAN_TERMINATES};
use crate::state::{add_into, fits, ProcessId, ResourceVector};

/// An order in which every process can run to completion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct SafeSequence(Vec<ProcessId>);

impl SafeSequence {
    /// Processes in completion order.
    pub fn as_slice(&self) -> &[ProcessId] {
        &self.0
    }

    /// Row indices in completion order.
    pub fn indices(&self) -> Vec<usize> {
        self.0.iter().map(|p| p.index()).collect()
    }

    /// Number of processes in the sequence.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True for the empty sequence reported by an unsafe state.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over processes in completion order.
    pub fn iter(&self) -> std::slice::Iter<'_, ProcessId> {
        self.0.iter()
    }

    /// Consume into the underlying vector.
    pub fn into_vec(self) -> Vec<ProcessId> {
        self.0
    }
}

impl fmt::Display for SafeSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, pid) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" -> ")?;
            }
            write!(f, "{}", pid)?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a SafeSequence {
    type Item = &'a ProcessId;
    type IntoIter = std::slice::Iter<'a, ProcessId>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// One observable step of the safety check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SafetyStep {
    /// An unfinished process had its need compared against the work vector.
    Evaluated {
        /// The process examined.
        process: ProcessId,
        /// Whether `need <= work` held in every component.
        fits: bool,
    },
    /// The process that fit is marked finished and its allocation released.
    Selected {
        /// The process selected.
        process: ProcessId,
        /// Work vector after the release.
        work: ResourceVector,
    },
    /// Every process finished. Terminal.
    Safe {
        /// The canonical safe sequence.
        sequence: SafeSequence,
    },
    /// A full pass selected nobody. Terminal.
    Unsafe {
        /// Processes that could not finish, in index order.
        blocked: Vec<ProcessId>,
    },
}

impl SafetyStep {
    /// True for [`SafetyStep::Safe`] and [`SafetyStep::Unsafe`].
    pub fn is_terminal(&self) -> bool {
        matches!(self, SafetyStep::Safe { .. } | SafetyStep::Unsafe { .. })
    }
}

/// Lazy iterator over the steps of one safety check.
///
/// Works on its own copy of the available vector and its own finish flags;
/// the borrowed allocation and need matrices are never written.
#[derive(Debug, Clone)]
pub struct SafetyScan<'a> {
    allocation: &'a [ResourceVector],
    need: &'a [ResourceVector],
    work: ResourceVector,
    finish: Vec<bool>,
    sequence: Vec<ProcessId>,
    cursor: usize,
    selected: Option<usize>,
    done: bool,
}

impl<'a> SafetyScan<'a> {
    /// Start a scan from `available` over the given allocation and need rows.
    pub(crate) fn new(
        available: &[u32],
        allocation: &'a [ResourceVector],
        need: &'a [ResourceVector],
    ) -> Self {
        Self {
            allocation,
            need,
            work: available.to_vec(),
            finish: vec![false; need.len()],
            sequence: Vec::with_capacity(need.len()),
            cursor: 0,
            selected: None,
            done: false,
        }
    }

    /// Current work vector.
    pub fn work(&self) -> &[u32] {
        &self.work
    }

    /// Finish flag of each process so far.
    pub fn finished(&self) -> &[bool] {
        &self.finish
    }

    /// Processes selected so far, in order.
    pub fn sequence(&self) -> &[ProcessId] {
        &self.sequence
    }

    /// Drive the scan to its terminal step.
    ///
    /// Returns `(true, sequence)` for a safe state and `(false, empty)` otherwise.
    pub fn run(self) -> (bool, SafeSequence) {
        for step in self {
            match step {
                SafetyStep::Safe { sequence } => return (true, sequence),
                SafetyStep::Unsafe { .. } => return (false, SafeSequence::default()),
                _ => {}
            }
        }
        (false, SafeSequence::default())
    }

    fn select(&mut self, index: usize) -> SafetyStep {
        assert_invariant(
            SCAN_CANONICAL_ORDER,
            (0..index).all(|i| self.finish[i] || !fits(&self.need[i], &self.work)),
            "a lower-index process was eligible",
            Some("safety_scan"),
        );
        add_into(&mut self.work, &self.allocation[index]);
        self.finish[index] = true;
        self.sequence.push(ProcessId(index));
        self.cursor = 0;
        trace!(process = index, work = ?self.work, "safety scan selected process");
        SafetyStep::Selected {
            process: ProcessId(index),
            work: self.work.clone(),
        }
    }
}

impl Iterator for SafetyScan<'_> {
    type Item = SafetyStep;

    fn next(&mut self) -> Option<SafetyStep> {
        if self.done {
            return None;
        }
        if let Some(index) = self.selected.take() {
            return Some(self.select(index));
        }
        if self.sequence.len() == self.finish.len() {
            self.done = true;
            assert_invariant(
                SCAN_TERMINATES,
                self.finish.iter().all(|&f| f),
                "safe verdict with unfinished processes",
                Some("safety_scan"),
            );
            return Some(SafetyStep::Safe {
                sequence: SafeSequence(self.sequence.clone()),
            });
        }

        match (self.cursor..self.finish.len()).find(|&i| !self.finish[i]) {
            Some(index) => {
                let fits = fits(&self.need[index], &self.work);
                trace!(process = index, fits, work = ?self.work, "safety scan evaluated process");
                self.cursor = index + 1;
                if fits {
                    self.selected = Some(index);
                }
                Some(SafetyStep::Evaluated {
                    process: ProcessId(index),
                    fits,
                })
            }
            None => {
                self.done = true;
                let blocked: Vec<ProcessId> = (0..self.finish.len())
                    .filter(|&i| !self.finish[i])
                    .map(ProcessId)
                    .collect();
                assert_invariant(
                    SCAN_TERMINATES,
                    !blocked.is_empty(),
                    "unsafe verdict with every process finished",
                    Some("safety_scan"),
                );
                trace!(?blocked, "safety scan found no eligible process");
                Some(SafetyStep::Unsafe { blocked })
            }
        }
    }
}

impl FusedIterator for SafetyScan<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (Vec<u32>, Vec<Vec<u32>>, Vec<Vec<u32>>) {
        let available = vec![3, 3, 2];
        let allocation = vec![
            vec![0, 1, 0],
            vec![2, 0, 0],
            vec![3, 0, 2],
            vec![2, 1, 1],
            vec![0, 0, 2],
        ];
        let need = vec![
            vec![7, 4, 3],
            vec![1, 2, 2],
            vec![6, 0, 0],
            vec![0, 1, 1],
            vec![4, 3, 1],
        ];
        (available, allocation, need)
    }

    fn evaluated(i: usize, fits: bool) -> SafetyStep {
        SafetyStep::Evaluated {
            process: ProcessId(i),
            fits,
        }
    }

    fn selected(i: usize, work: [u32; 3]) -> SafetyStep {
        SafetyStep::Selected {
            process: ProcessId(i),
            work: work.to_vec(),
        }
    }

    #[test]
    fn sample_event_trace() {
        let (available, allocation, need) = sample();
        let steps: Vec<SafetyStep> = SafetyScan::new(&available, &allocation, &need).collect();
        let expected = vec![
            evaluated(0, false),
            evaluated(1, true),
            selected(1, [5, 3, 2]),
            evaluated(0, false),
            evaluated(2, false),
            evaluated(3, true),
            selected(3, [7, 4, 3]),
            evaluated(0, true),
            selected(0, [7, 5, 3]),
            evaluated(2, true),
            selected(2, [10, 5, 5]),
            evaluated(4, true),
            selected(4, [10, 5, 7]),
            SafetyStep::Safe {
                sequence: SafeSequence(
                    [1, 3, 0, 2, 4].into_iter().map(ProcessId).collect(),
                ),
            },
        ];
        assert_eq!(steps, expected);
    }

    #[test]
    fn unsafe_scan_lists_blocked() {
        let available = vec![1];
        let allocation = vec![vec![1], vec![1], vec![0]];
        let need = vec![vec![2], vec![0], vec![3]];
        let steps: Vec<SafetyStep> = SafetyScan::new(&available, &allocation, &need).collect();
        assert_eq!(
            steps,
            vec![
                evaluated(0, false),
                evaluated(1, true),
                SafetyStep::Selected {
                    process: ProcessId(1),
                    work: vec![2],
                },
                evaluated(0, true),
                SafetyStep::Selected {
                    process: ProcessId(0),
                    work: vec![3],
                },
                evaluated(2, true),
                SafetyStep::Selected {
                    process: ProcessId(2),
                    work: vec![3],
                },
                SafetyStep::Safe {
                    sequence: SafeSequence(vec![ProcessId(1), ProcessId(0), ProcessId(2)]),
                },
            ]
        );

        let need = vec![vec![2], vec![3], vec![3]];
        let mut scan = SafetyScan::new(&available, &allocation, &need);
        let last = scan.by_ref().last();
        assert_eq!(
            last,
            Some(SafetyStep::Unsafe {
                blocked: vec![ProcessId(0), ProcessId(1), ProcessId(2)],
            })
        );
        assert!(scan.next().is_none());
    }

    #[test]
    fn run_matches_terminal_step() {
        let (available, allocation, need) = sample();
        let (safe, sequence) = SafetyScan::new(&available, &allocation, &need).run();
        assert!(safe);
        assert_eq!(sequence.indices(), vec![1, 3, 0, 2, 4]);
        assert_eq!(sequence.to_string(), "P1 -> P3 -> P0 -> P2 -> P4");

        let (safe, sequence) = SafetyScan::new(&[0, 0, 0], &allocation, &need).run();
        assert!(!safe);
        assert!(sequence.is_empty());
    }

    #[test]
    fn scan_exposes_progress() {
        let (available, allocation, need) = sample();
        let mut scan = SafetyScan::new(&available, &allocation, &need);
        scan.next();
        scan.next();
        assert_eq!(scan.work(), &[3, 3, 2]);
        scan.next();
        assert_eq!(scan.work(), &[5, 3, 2]);
        assert_eq!(scan.sequence(), &[ProcessId(1)]);
        assert_eq!(scan.finished(), &[false, true, false, false, false]);
    }
}
