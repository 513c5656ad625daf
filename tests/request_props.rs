use bankers::harness::InvariantHarness;
use bankers::{Denial, InvalidArgument, ProcessId, RequestOutcome, Tracker};
use proptest::prelude::*;

type Request = (usize, Vec<u32>);

/// A random system plus a script of requests, some of them malformed.
fn session() -> impl Strategy<Value = (Tracker, Vec<Request>)> {
    (1usize..6, 1usize..4).prop_flat_map(|(p, n)| {
        (
            prop::collection::vec(0u32..8, n),
            prop::collection::vec(prop::collection::vec((0u32..6, 0u32..6), n), p),
            prop::collection::vec(
                (0..p + 1, prop::collection::vec(0u32..4, n..n + 2)),
                0..24,
            ),
        )
            .prop_map(|(available, cells, requests)| {
                let max_demand = cells
                    .iter()
                    .map(|row| row.iter().map(|&(a, b)| a.max(b)).collect())
                    .collect();
                let allocation = cells
                    .iter()
                    .map(|row| row.iter().map(|&(a, b)| a.min(b)).collect())
                    .collect();
                let tracker = Tracker::new(available, max_demand, allocation).unwrap();
                (tracker, requests)
            })
    })
}

proptest! {
    #[test]
    fn invariants_hold_across_any_request_script((tracker, requests) in session()) {
        let mut harness = InvariantHarness::new(tracker);
        for (pid, request) in &requests {
            // The harness panics on any broken invariant or inexact rollback.
            let _ = harness.submit(ProcessId(*pid), request);
        }
        prop_assert!(harness.granted() + harness.denied() <= requests.len());
    }

    #[test]
    fn outcomes_match_their_reasons((tracker, requests) in session()) {
        let mut tracker = tracker;
        for (pid, request) in requests {
            let pid = ProcessId(pid);
            let before = tracker.clone();
            match tracker.request_resources(pid, &request) {
                Err(InvalidArgument::ProcessOutOfRange { .. }) => {
                    prop_assert!(pid.index() >= before.num_processes());
                }
                Err(InvalidArgument::LengthMismatch { expected, actual }) => {
                    prop_assert_eq!(expected, before.num_resources());
                    prop_assert_ne!(actual, expected);
                }
                Ok(RequestOutcome::Denied(Denial::ExceedsMaximumClaim)) => {
                    let need = &before.need()[pid.index()];
                    prop_assert!(request.iter().zip(need).any(|(r, n)| r > n));
                }
                Ok(RequestOutcome::Denied(Denial::InsufficientResources)) => {
                    prop_assert!(request.iter().zip(before.available()).any(|(r, a)| r > a));
                }
                Ok(RequestOutcome::Denied(Denial::WouldCauseUnsafeState)) => {
                    // Rebuild the tentative state independently and confirm it is unsafe.
                    let available = before
                        .available()
                        .iter()
                        .zip(&request)
                        .map(|(a, r)| a - r)
                        .collect();
                    let mut allocation = before.allocation().to_vec();
                    for (held, r) in allocation[pid.index()].iter_mut().zip(&request) {
                        *held += r;
                    }
                    let tentative =
                        Tracker::new(available, before.max_demand().to_vec(), allocation).unwrap();
                    prop_assert!(!tentative.is_safe());
                }
                Ok(RequestOutcome::Granted(sequence)) => {
                    prop_assert_eq!(tracker.check_safety(), (true, sequence));
                }
            }
        }
    }

    #[test]
    fn safe_states_stay_safe((tracker, requests) in session()) {
        let mut tracker = tracker;
        let started_safe = tracker.is_safe();
        for (pid, request) in requests {
            let _ = tracker.request_resources(ProcessId(pid), &request);
            if started_safe {
                prop_assert!(tracker.is_safe());
            }
        }
    }
}
