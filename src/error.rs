//! Error types shared across the crate.

use thiserror::Error;

/// Errors produced while building instances, evaluating fleets, or searching.
///
/// `ConstructionInfeasible` is an expected outcome for undersized fleets and is
/// absorbed by [`CvrpEvaluator`](crate::evaluation::CvrpEvaluator).
/// `InvariantViolation` signals a defect and aborts the search.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FleetError {
    /// A bounded parameter pair or the trial count is unusable.
    #[error("invalid parameter range: {0}")]
    InvalidParameterRange(String),

    /// The cost matrix is not square, has a non-zero diagonal, or holds negative costs.
    #[error("invalid cost matrix: {0}")]
    InvalidCostMatrix(String),

    /// The demand vector does not fit the cost matrix or holds negative demands.
    #[error("invalid demand vector: {0}")]
    InvalidDemand(String),

    /// A configuration document could not be read.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The stops cannot be assigned to the fleet without exceeding capacity.
    #[error(
        "construction infeasible: {unrouted} stop(s) left unrouted with {fleet_size} vehicle(s) of capacity {capacity}"
    )]
    ConstructionInfeasible {
        /// Number of vehicles in the attempted configuration.
        fleet_size: usize,
        /// Per-vehicle capacity in the attempted configuration.
        capacity: i64,
        /// Stops that could not be placed.
        unrouted: usize,
    },

    /// Route contents and tracked loads disagree, or coverage is broken.
    #[error("internal invariant violated: {0}")]
    InvariantViolation(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, FleetError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_construction_infeasible_message() {
        let err = FleetError::ConstructionInfeasible {
            fleet_size: 1,
            capacity: 2,
            unrouted: 3,
        };
        assert_eq!(
            err.to_string(),
            "construction infeasible: 3 stop(s) left unrouted with 1 vehicle(s) of capacity 2"
        );
    }

    #[test]
    fn test_invalid_range_message() {
        let err = FleetError::InvalidParameterRange("max_fleet < min_fleet".into());
        assert!(err.to_string().contains("max_fleet < min_fleet"));
    }
}
