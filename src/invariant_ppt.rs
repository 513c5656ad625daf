//! PPT Invariant System: runtime invariant enforcement with contract tracking.

#[cfg(feature = "ppt")]
use lazy_static::lazy_static;
#[cfg(feature = "ppt")]
use std::collections::HashSet;
#[cfg(feature = "ppt")]
use std::sync::Mutex;

// Invariant constants for contract tracking.
pub const CONSTRUCTION_VALIDATED: u32 = 1;
pub const NEED_COMPLEMENT: u32 = 2;
pub const TOTALS_CONSERVED: u32 = 3;
pub const SCAN_CANONICAL_ORDER: u32 = 4;
pub const SCAN_TERMINATES: u32 = 5;
pub const CLAIM_CHECKED: u32 = 6;
pub const AVAILABILITY_CHECKED: u32 = 7;
pub const TENTATIVE_GRANT_APPLIED: u32 = 8;
pub const ROLLBACK_EXACT: u32 = 9;
pub const GRANT_WITNESSED_SAFE: u32 = 10;
pub const CONTRACT_VIOLATION_REJECTED: u32 = 11;

#[cfg(feature = "ppt")]
lazy_static! {
    static ref INVARIANT_LOG: Mutex<HashSet<u32>> = Mutex::new(HashSet::new());
}

#[cfg(feature = "ppt")]
/// Assert an invariant: logs it and panics on failure.
pub(crate) fn assert_invariant(id: u32, condition: bool, message: &str, context: Option<&str>) {
    if !condition {
        let full_message = if let Some(ctx) = context {
            format!("Invariant {} failed: {} (context: {})", id, message, ctx)
        } else {
            format!("Invariant {} failed: {}", id, message)
        };
        tracing::error!("{}", full_message);
        panic!("{}", full_message);
    }
    // A poisoned log only means another thread panicked mid-insert; the set is still usable.
    INVARIANT_LOG
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .insert(id);
}

#[cfg(not(feature = "ppt"))]
/// Assert an invariant: checks condition and panics on failure.
pub(crate) fn assert_invariant(_id: u32, condition: bool, message: &str, _context: Option<&str>) {
    if !condition {
        panic!("Invariant failed: {}", message);
    }
}

#[cfg(feature = "ppt")]
/// Contract test: checks that specified invariants were asserted.
pub fn contract_test(test_name: &str, required_invariants: &[u32]) {
    let log = INVARIANT_LOG
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    let missing: Vec<&str> = required_invariants
        .iter()
        .filter(|inv| !log.contains(inv))
        .map(|&inv| invariant_name(inv))
        .collect();
    drop(log); // Drop the lock before panicking
    if !missing.is_empty() {
        panic!(
            "Contract test '{}' failed: invariants not enforced: {:?}",
            test_name, missing
        );
    }
}

#[cfg(not(feature = "ppt"))]
/// Contract test: no-op when PPT feature is disabled.
pub fn contract_test(_test_name: &str, _required_invariants: &[u32]) {}

#[cfg(feature = "ppt")]
/// Clear invariant log (for between test runs).
pub fn clear_invariant_log() {
    INVARIANT_LOG
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .clear();
}

#[cfg(not(feature = "ppt"))]
/// Clear invariant log: no-op when PPT feature is disabled.
pub fn clear_invariant_log() {}

/// Maps invariant ID to human-readable name (for diagnostics only).
pub const fn invariant_name(id: u32) -> &'static str {
    match id {
        CONSTRUCTION_VALIDATED => "CONSTRUCTION_VALIDATED",
        NEED_COMPLEMENT => "NEED_COMPLEMENT",
        TOTALS_CONSERVED => "TOTALS_CONSERVED",
        SCAN_CANONICAL_ORDER => "SCAN_CANONICAL_ORDER",
        SCAN_TERMINATES => "SCAN_TERMINATES",
        CLAIM_CHECKED => "CLAIM_CHECKED",
        AVAILABILITY_CHECKED => "AVAILABILITY_CHECKED",
        TENTATIVE_GRANT_APPLIED => "TENTATIVE_GRANT_APPLIED",
        ROLLBACK_EXACT => "ROLLBACK_EXACT",
        GRANT_WITNESSED_SAFE => "GRANT_WITNESSED_SAFE",
        CONTRACT_VIOLATION_REJECTED => "CONTRACT_VIOLATION_REJECTED",
        _ => "UNKNOWN",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assert_invariant_pass() {
        assert_invariant(0, 1 + 1 == 2, "Math works", Some("basic"));
        // Should not panic
    }

    #[test]
    #[should_panic(expected = "Math broken")]
    fn test_assert_invariant_fail() {
        assert_invariant(0, 1 + 1 == 3, "Math broken", None);
    }

    #[test]
    fn test_contract_test() {
        // Other tests share the log, so only add to it here.
        assert_invariant(NEED_COMPLEMENT, true, "recorded", None);
        contract_test("example", &[NEED_COMPLEMENT]);
    }

    #[cfg(feature = "ppt")]
    #[test]
    #[should_panic(expected = "invariants not enforced")]
    fn test_contract_reports_missing() {
        contract_test("never asserted", &[u32::MAX]);
    }

    #[test]
    fn test_invariant_names() {
        assert_eq!(invariant_name(ROLLBACK_EXACT), "ROLLBACK_EXACT");
        assert_eq!(invariant_name(255), "UNKNOWN");
    }
}
