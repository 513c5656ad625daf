//! Invariant harness: drives a tracker and re-checks its guarantees after every call.

use crate::error::InvalidArgument;
use crate::state::{ProcessId, Snapshot};
use crate::tracker::{RequestOutcome, Tracker};

/// Wraps a tracker and verifies, independently of the tracker's own
/// assertions, that each request preserved conservation and the need
/// complement, and that denials left the state bit-for-bit unchanged.
pub struct InvariantHarness {
    tracker: Tracker,
    initial_totals: Vec<u32>,
    granted: usize,
    denied: usize,
}

impl InvariantHarness {
    /// Start from a freshly constructed tracker.
    pub fn new(tracker: Tracker) -> Self {
        let initial_totals = tracker.totals().to_vec();
        Self {
            tracker,
            initial_totals,
            granted: 0,
            denied: 0,
        }
    }

    /// The tracker under test.
    pub fn tracker(&self) -> &Tracker {
        &self.tracker
    }

    /// Requests granted so far.
    pub fn granted(&self) -> usize {
        self.granted
    }

    /// Requests denied so far.
    pub fn denied(&self) -> usize {
        self.denied
    }

    /// Submit a request and panic with a description if any guarantee broke.
    pub fn submit(
        &mut self,
        pid: ProcessId,
        request: &[u32],
    ) -> Result<RequestOutcome, InvalidArgument> {
        let before = self.tracker.snapshot();
        let result = self.tracker.request_resources(pid, request);
        let after = self.tracker.snapshot();

        match &result {
            Ok(RequestOutcome::Granted(sequence)) => {
                self.granted += 1;
                assert_eq!(
                    sequence.len(),
                    after.num_processes(),
                    "grant of {:?} to {} lacks a complete safe sequence",
                    request,
                    pid
                );
                assert_eq!(
                    self.tracker.check_safety(),
                    (true, sequence.clone()),
                    "grant witness differs from a fresh safety check"
                );
            }
            Ok(RequestOutcome::Denied(reason)) => {
                self.denied += 1;
                assert_eq!(before, after, "denial ({}) mutated state", reason);
            }
            Err(_) => assert_eq!(before, after, "rejected request mutated state"),
        }
        self.check(&after);
        result
    }

    fn check(&self, snapshot: &Snapshot) {
        assert_eq!(
            snapshot.totals, self.initial_totals,
            "totals drifted from construction"
        );
        assert!(snapshot.conserves_totals(), "units created or destroyed");
        assert!(
            snapshot.need_complements_allocation(),
            "need no longer complements allocation"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SystemConfig;

    #[test]
    fn harness_counts_outcomes() {
        let mut harness = InvariantHarness::new(SystemConfig::sample().build().unwrap());
        harness.submit(ProcessId(1), &[1, 0, 2]).unwrap();
        harness.submit(ProcessId(0), &[0, 2, 0]).unwrap();
        assert!(harness.submit(ProcessId(5), &[0, 0, 0]).is_err());
        assert_eq!(harness.granted(), 1);
        assert_eq!(harness.denied(), 1);
        assert_eq!(harness.tracker().available(), &[2, 3, 0]);
    }
}
