//! State module: identifiers, resource vectors, and owned snapshots of a tracker.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use std::fmt;

/// Units of each resource type, one count per type.
pub type ResourceVector = Vec<u32>;

/// One [`ResourceVector`] row per process.
pub type Matrix = Vec<ResourceVector>;

/// Identifier of a process: its 0-based row in every matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProcessId(pub usize);

impl ProcessId {
    /// Row index of this process.
    pub fn index(self) -> usize {
        self.0
    }
}

impl From<usize> for ProcessId {
    fn from(index: usize) -> Self {
        ProcessId(index)
    }
}

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}

/// True when every component of `lhs` is at most the matching component of `rhs`.
pub fn fits(lhs: &[u32], rhs: &[u32]) -> bool {
    lhs.iter().zip(rhs).all(|(l, r)| l <= r)
}

/// Elementwise `acc += delta`.
///
/// Callers guarantee the sum stays within the resource totals fixed at
/// construction, which are known to fit in `u32`.
pub fn add_into(acc: &mut [u32], delta: &[u32]) {
    for (a, d) in acc.iter_mut().zip(delta) {
        *a += d;
    }
}

/// Elementwise `acc -= delta`. Callers guarantee `delta` fits in `acc`.
pub fn sub_from(acc: &mut [u32], delta: &[u32]) {
    for (a, d) in acc.iter_mut().zip(delta) {
        *a -= d;
    }
}

/// Owned copy of a tracker's full state.
///
/// Two snapshots compare equal only if every count in every structure matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    /// Units not held by any process.
    pub available: ResourceVector,
    /// Declared maximum claim of each process.
    pub max_demand: Matrix,
    /// Units currently held by each process.
    pub allocation: Matrix,
    /// Units each process may still request.
    pub need: Matrix,
    /// Total units of each resource type, fixed at construction.
    pub totals: ResourceVector,
}

impl Snapshot {
    /// Number of processes.
    pub fn num_processes(&self) -> usize {
        self.allocation.len()
    }

    /// Number of resource types.
    pub fn num_resources(&self) -> usize {
        self.available.len()
    }

    /// True if `available[j] + sum_i allocation[i][j] == totals[j]` for every `j`.
    pub fn conserves_totals(&self) -> bool {
        conserves(&self.available, &self.allocation, &self.totals)
    }

    /// True if `allocation + need == max_demand` in every cell.
    pub fn need_complements_allocation(&self) -> bool {
        complements(&self.max_demand, &self.allocation, &self.need)
    }
}

/// True if `available[j] + sum_i allocation[i][j] == totals[j]` for every `j`.
pub fn conserves(available: &[u32], allocation: &[ResourceVector], totals: &[u32]) -> bool {
    available.len() == totals.len()
        && available.iter().zip(totals).enumerate().all(|(j, (&free, &total))| {
            let held: u64 = allocation.iter().map(|row| u64::from(row[j])).sum();
            u64::from(free) + held == u64::from(total)
        })
}

/// True if `allocation + need == max_demand` in every cell.
pub fn complements(
    max_demand: &[ResourceVector],
    allocation: &[ResourceVector],
    need: &[ResourceVector],
) -> bool {
    max_demand.len() == allocation.len()
        && allocation.len() == need.len()
        && max_demand
            .iter()
            .zip(allocation)
            .zip(need)
            .all(|((max, alloc), need)| {
                max.iter()
                    .zip(alloc)
                    .zip(need)
                    .all(|((&m, &a), &n)| u64::from(a) + u64::from(n) == u64::from(m))
            })
}
