//! Config module: initial system configurations and comma-separated input.

use tracing::debug;

use crate::error::{ConstructionError, Error, ParseError};
use crate::state::{Matrix, ResourceVector};
use crate::tracker::Tracker;

/// The construction triple for a [`Tracker`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemConfig {
    /// Units of each type not held by anyone.
    pub available: ResourceVector,
    /// Maximum claim of each process.
    pub max_demand: Matrix,
    /// Units each process already holds.
    pub allocation: Matrix,
}

impl SystemConfig {
    /// The classic five-process, three-resource safe state.
    pub fn sample() -> Self {
        Self {
            available: vec![3, 3, 2],
            max_demand: vec![
                vec![7, 5, 3],
                vec![3, 2, 2],
                vec![9, 0, 2],
                vec![2, 2, 2],
                vec![4, 3, 3],
            ],
            allocation: vec![
                vec![0, 1, 0],
                vec![2, 0, 0],
                vec![3, 0, 2],
                vec![2, 1, 1],
                vec![0, 0, 2],
            ],
        }
    }

    /// A fresh system in which no process holds anything yet.
    pub fn with_zero_allocation(available: ResourceVector, max_demand: Matrix) -> Self {
        let allocation = max_demand.iter().map(|row| vec![0; row.len()]).collect();
        Self {
            available,
            max_demand,
            allocation,
        }
    }

    /// Parse a configuration from comma-separated lines.
    ///
    /// An empty `allocation_rows` means nobody holds anything yet.
    pub fn from_text(
        available: &str,
        max_rows: &[&str],
        allocation_rows: &[&str],
    ) -> Result<Self, ParseError> {
        let available = parse_vector(available)?;
        let max_demand = max_rows
            .iter()
            .map(|row| parse_vector(row))
            .collect::<Result<Matrix, _>>()?;
        if allocation_rows.is_empty() {
            return Ok(Self::with_zero_allocation(available, max_demand));
        }
        let allocation = allocation_rows
            .iter()
            .map(|row| parse_vector(row))
            .collect::<Result<Matrix, _>>()?;
        Ok(Self {
            available,
            max_demand,
            allocation,
        })
    }

    /// Validate and build the tracker.
    pub fn build(self) -> Result<Tracker, ConstructionError> {
        Tracker::new(self.available, self.max_demand, self.allocation)
    }
}

/// Parse `"3, 3, 2"` into a resource vector.
pub fn parse_vector(text: &str) -> Result<ResourceVector, ParseError> {
    if text.trim().is_empty() {
        return Err(ParseError::Empty);
    }
    text.split(',')
        .enumerate()
        .map(|(position, field)| {
            let field = field.trim();
            field.parse::<u32>().map_err(|_| ParseError::InvalidCount {
                position,
                field: field.to_string(),
            })
        })
        .collect()
}

/// Parse text input and build a tracker in one step.
pub fn tracker_from_text(
    available: &str,
    max_rows: &[&str],
    allocation_rows: &[&str],
) -> Result<Tracker, Error> {
    let config = SystemConfig::from_text(available, max_rows, allocation_rows)?;
    debug!(processes = config.max_demand.len(), "parsed system configuration");
    Ok(config.build()?)
}
