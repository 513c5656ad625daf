//! Error types for construction, caller contract violations, and text parsing.

use thiserror::Error;

use crate::state::ProcessId;

/// A tracker could not be built from the given arrays. No tracker is produced.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConstructionError {
    /// Shapes of `available`, `max_demand`, and `allocation` disagree, or one is empty.
    #[error("dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// A process already holds more of a resource than its declared maximum.
    #[error("{process} holds {allocated} units of R{resource}, exceeding its maximum of {max}")]
    AllocationExceedsMax {
        /// Offending process.
        process: ProcessId,
        /// Offending resource type.
        resource: usize,
        /// Units held.
        allocated: u32,
        /// Declared maximum.
        max: u32,
    },

    /// The total quantity of a resource type does not fit in a `u32`.
    #[error("total units of R{resource} overflow")]
    TotalOverflow {
        /// Offending resource type.
        resource: usize,
    },
}

/// The caller broke the request contract. Signals a collaborator bug, not a denial.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvalidArgument {
    /// Process id outside `[0, P)`.
    #[error("{pid} is out of range, tracker has {processes} processes")]
    ProcessOutOfRange {
        /// Rejected id.
        pid: ProcessId,
        /// Process count `P`.
        processes: usize,
    },

    /// Request vector length differs from the resource type count `N`.
    #[error("request has {actual} components, expected {expected}")]
    LengthMismatch {
        /// Resource type count `N`.
        expected: usize,
        /// Length supplied.
        actual: usize,
    },
}

/// Comma-separated input could not be turned into a resource vector.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The input held no values at all.
    #[error("no values given")]
    Empty,

    /// A field is not a non-negative integer.
    #[error("invalid count {field:?} at position {position}")]
    InvalidCount {
        /// 0-based position of the field.
        position: usize,
        /// Field text after trimming.
        field: String,
    },
}

/// Any failure surfaced by this crate.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// Construction failed.
    #[error(transparent)]
    Construction(#[from] ConstructionError),

    /// A request broke the caller contract.
    #[error(transparent)]
    InvalidArgument(#[from] InvalidArgument),

    /// Text input was malformed.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// A shared tracker's lock was poisoned by a panic inside a transaction.
    #[error("tracker lock poisoned")]
    Poisoned,
}
