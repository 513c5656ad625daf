//! Deadlock-avoidance resource allocation with the Banker's Algorithm.
//!
//! A [`Tracker`] owns the Allocation, Max Demand, Need, and Available
//! structures for a fixed set of processes and resource types. It answers
//! whether the current state is safe and grants a request only when the state
//! after the grant is still safe, rolling back otherwise.

pub mod config;
pub mod error;
#[doc(hidden)]
pub mod harness;
#[doc(hidden)]
pub mod invariant_ppt;
pub mod safety;
pub mod shared;
pub mod state;
pub mod tracker;

pub use config::SystemConfig;
pub use error::{ConstructionError, Error, InvalidArgument, ParseError};
pub use safety::{SafeSequence, SafetyScan, SafetyStep};
pub use shared::SharedTracker;
pub use state::{Matrix, ProcessId, ResourceVector, Snapshot};
pub use tracker::{Denial, RequestOutcome, Tracker};
