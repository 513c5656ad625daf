//! Tracker module: the allocation state tracker and its request protocol.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::error::{ConstructionError, InvalidArgument};
use crate::invariant_ppt::{
    assert_invariant, AVAILABILITY_CHECKED, CLAIM_CHECKED, CONSTRUCTION_VALIDATED,
    CONTRACT_VIOLATION_REJECTED, GRANT_WITNESSED_SAFE, NEED_COMPLEMENT, ROLLBACK_EXACT,
    TENTATIVE_GRANT_APPLIED, TOTALS_CONSERVED,
};
use crate::safety::{SafeSequence, SafetyScan};
use crate::state::{
    add_into, complements, conserves, fits, sub_from, Matrix, ProcessId, ResourceVector, Snapshot,
};

/// Why a well-formed request was not granted. State is unchanged in every case.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Denial {
    /// Some component asks for more than the process may still claim.
    #[error("process has exceeded its maximum claim")]
    ExceedsMaximumClaim,
    /// Some component asks for more than is currently available.
    #[error("resources not available, process must wait")]
    InsufficientResources,
    /// Granting would leave no safe completion order.
    #[error("granting the request would lead to an unsafe state")]
    WouldCauseUnsafeState,
}

/// Result of a well-formed resource request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestOutcome {
    /// Committed. Carries the safe sequence witnessing the new state.
    Granted(SafeSequence),
    /// Rejected, state untouched.
    Denied(Denial),
}

impl RequestOutcome {
    /// True if the request was committed.
    pub fn is_granted(&self) -> bool {
        matches!(self, RequestOutcome::Granted(_))
    }

    /// The denial reason, if any.
    pub fn denial(&self) -> Option<Denial> {
        match self {
            RequestOutcome::Denied(reason) => Some(*reason),
            RequestOutcome::Granted(_) => None,
        }
    }

    /// The witnessing safe sequence of a grant.
    pub fn sequence(&self) -> Option<&SafeSequence> {
        match self {
            RequestOutcome::Granted(sequence) => Some(sequence),
            RequestOutcome::Denied(_) => None,
        }
    }
}

/// Allocation state of `P` processes over `N` resource types.
///
/// Dimensions are fixed for the tracker's lifetime. Reconfiguring means
/// building a new tracker.
#[derive(Debug, Clone)]
pub struct Tracker {
    available: ResourceVector,
    max_demand: Matrix,
    allocation: Matrix,
    need: Matrix,
    totals: ResourceVector,
}

impl Tracker {
    /// Build a tracker from the available vector, the maximum claims, and the
    /// current allocation.
    pub fn new(
        available: ResourceVector,
        max_demand: Matrix,
        allocation: Matrix,
    ) -> Result<Self, ConstructionError> {
        let resources = available.len();
        let processes = max_demand.len();
        if resources == 0 {
            return Err(ConstructionError::DimensionMismatch(
                "available names no resource types".into(),
            ));
        }
        if processes == 0 {
            return Err(ConstructionError::DimensionMismatch(
                "max demand names no processes".into(),
            ));
        }
        if allocation.len() != processes {
            return Err(ConstructionError::DimensionMismatch(format!(
                "max demand has {} rows but allocation has {}",
                processes,
                allocation.len()
            )));
        }
        for (name, matrix) in [("max demand", &max_demand), ("allocation", &allocation)] {
            if let Some((row, cols)) = matrix
                .iter()
                .map(Vec::len)
                .enumerate()
                .find(|&(_, cols)| cols != resources)
            {
                return Err(ConstructionError::DimensionMismatch(format!(
                    "{} row {} has {} columns, expected {}",
                    name, row, cols, resources
                )));
            }
        }

        let mut need = Vec::with_capacity(processes);
        for (i, (max, alloc)) in max_demand.iter().zip(&allocation).enumerate() {
            let mut row = Vec::with_capacity(resources);
            for (j, (&m, &a)) in max.iter().zip(alloc).enumerate() {
                if a > m {
                    return Err(ConstructionError::AllocationExceedsMax {
                        process: ProcessId(i),
                        resource: j,
                        allocated: a,
                        max: m,
                    });
                }
                row.push(m - a);
            }
            need.push(row);
        }

        let mut totals = available.clone();
        for row in &allocation {
            for (j, (total, &held)) in totals.iter_mut().zip(row).enumerate() {
                *total = total
                    .checked_add(held)
                    .ok_or(ConstructionError::TotalOverflow { resource: j })?;
            }
        }

        let tracker = Self {
            available,
            max_demand,
            allocation,
            need,
            totals,
        };
        assert_invariant(
            CONSTRUCTION_VALIDATED,
            tracker.need.len() == processes,
            "need matrix shape",
            Some("new"),
        );
        tracker.verify_invariants("new");
        debug!(
            processes,
            resources,
            totals = ?tracker.totals,
            "allocation tracker constructed"
        );
        Ok(tracker)
    }

    /// Number of processes `P`.
    pub fn num_processes(&self) -> usize {
        self.max_demand.len()
    }

    /// Number of resource types `N`.
    pub fn num_resources(&self) -> usize {
        self.available.len()
    }

    /// Units of each type not held by any process.
    pub fn available(&self) -> &[u32] {
        &self.available
    }

    /// Units held, one row per process.
    pub fn allocation(&self) -> &[ResourceVector] {
        &self.allocation
    }

    /// Declared maximum claims, one row per process.
    pub fn max_demand(&self) -> &[ResourceVector] {
        &self.max_demand
    }

    /// Remaining claims, one row per process.
    pub fn need(&self) -> &[ResourceVector] {
        &self.need
    }

    /// Total units of each type, fixed at construction.
    pub fn totals(&self) -> &[u32] {
        &self.totals
    }

    /// Owned copy of every structure, for rendering or comparison.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            available: self.available.clone(),
            max_demand: self.max_demand.clone(),
            allocation: self.allocation.clone(),
            need: self.need.clone(),
            totals: self.totals.clone(),
        }
    }

    /// Step-by-step view of the safety check on the current state.
    pub fn safety_scan(&self) -> SafetyScan<'_> {
        SafetyScan::new(&self.available, &self.allocation, &self.need)
    }

    /// Whether a completion order exists for every process, and the canonical
    /// one if so. Does not mutate state.
    pub fn check_safety(&self) -> (bool, SafeSequence) {
        self.safety_scan().run()
    }

    /// Shorthand for the verdict of [`Tracker::check_safety`].
    pub fn is_safe(&self) -> bool {
        self.check_safety().0
    }

    /// Ask for `request` units on behalf of `pid`.
    ///
    /// Checks the claim, then availability, then applies the grant tentatively
    /// and keeps it only if the resulting state is safe. Every denial leaves all
    /// structures exactly as they were.
    pub fn request_resources(
        &mut self,
        pid: ProcessId,
        request: &[u32],
    ) -> Result<RequestOutcome, InvalidArgument> {
        self.validate_request(pid, request)?;
        let i = pid.index();

        let within_claim = fits(request, &self.need[i]);
        assert_invariant(
            CLAIM_CHECKED,
            request.len() == self.need[i].len(),
            "claim compared componentwise",
            Some("request_resources"),
        );
        if !within_claim {
            info!(%pid, ?request, need = ?self.need[i], "request denied: exceeds maximum claim");
            return Ok(RequestOutcome::Denied(Denial::ExceedsMaximumClaim));
        }

        let within_available = fits(request, &self.available);
        assert_invariant(
            AVAILABILITY_CHECKED,
            request.len() == self.available.len(),
            "availability compared componentwise",
            Some("request_resources"),
        );
        if !within_available {
            info!(
                %pid,
                ?request,
                available = ?self.available,
                "request denied: insufficient resources"
            );
            return Ok(RequestOutcome::Denied(Denial::InsufficientResources));
        }

        let saved_available = self.available.clone();
        let saved_allocation = self.allocation[i].clone();
        let saved_need = self.need[i].clone();

        self.apply(i, request);
        assert_invariant(
            TENTATIVE_GRANT_APPLIED,
            self.conserves_totals(),
            "tentative grant conserves totals",
            Some("request_resources"),
        );

        let (safe, sequence) = self.check_safety();
        if safe {
            assert_invariant(
                GRANT_WITNESSED_SAFE,
                sequence.len() == self.num_processes(),
                "grant witnessed by a complete safe sequence",
                Some("request_resources"),
            );
            self.verify_invariants("request_resources");
            info!(%pid, ?request, %sequence, "request granted");
            return Ok(RequestOutcome::Granted(sequence));
        }

        self.revert(i, request);
        assert_invariant(
            ROLLBACK_EXACT,
            self.available == saved_available
                && self.allocation[i] == saved_allocation
                && self.need[i] == saved_need,
            "rollback restores the pre-request state",
            Some("request_resources"),
        );
        self.verify_invariants("request_resources");
        info!(%pid, ?request, "request denied: would cause unsafe state");
        Ok(RequestOutcome::Denied(Denial::WouldCauseUnsafeState))
    }

    fn validate_request(&self, pid: ProcessId, request: &[u32]) -> Result<(), InvalidArgument> {
        let err = if pid.index() >= self.num_processes() {
            InvalidArgument::ProcessOutOfRange {
                pid,
                processes: self.num_processes(),
            }
        } else if request.len() != self.num_resources() {
            InvalidArgument::LengthMismatch {
                expected: self.num_resources(),
                actual: request.len(),
            }
        } else {
            return Ok(());
        };
        warn!(%pid, ?request, error = %err, "rejected malformed request");
        assert_invariant(
            CONTRACT_VIOLATION_REJECTED,
            true,
            "malformed request rejected before any mutation",
            Some("request_resources"),
        );
        Err(err)
    }

    fn apply(&mut self, i: usize, request: &[u32]) {
        sub_from(&mut self.available, request);
        add_into(&mut self.allocation[i], request);
        sub_from(&mut self.need[i], request);
    }

    fn revert(&mut self, i: usize, request: &[u32]) {
        add_into(&mut self.available, request);
        sub_from(&mut self.allocation[i], request);
        add_into(&mut self.need[i], request);
    }

    fn conserves_totals(&self) -> bool {
        conserves(&self.available, &self.allocation, &self.totals)
    }

    fn verify_invariants(&self, context: &str) {
        assert_invariant(
            NEED_COMPLEMENT,
            complements(&self.max_demand, &self.allocation, &self.need),
            "allocation + need == max demand",
            Some(context),
        );
        assert_invariant(
            TOTALS_CONSERVED,
            self.conserves_totals(),
            "available + held == totals",
            Some(context),
        );
    }
}
