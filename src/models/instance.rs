//! Problem instance shared by every trial.

use std::ops::Range;

use crate::distance::{CostMatrix, CostMatrixProvider};
use crate::error::{FleetError, Result};

use super::{DemandVector, Location};

/// Cost matrix and demand vector of one routing problem.
///
/// Built once per run and borrowed read-only by construction, local search
/// and every trial of the outer search.
///
/// # Examples
///
/// ```
/// use u_fleet::models::{Instance, Location};
/// use u_fleet::distance::ScaledEuclidean;
///
/// let locations = vec![
///     Location::new(0.0, 0.0),
///     Location::new(1.0, 0.0),
///     Location::new(0.0, 1.0),
/// ];
/// let instance = Instance::from_locations(&locations, &ScaledEuclidean::new(10.0));
/// assert_eq!(instance.num_locations(), 3);
/// assert_eq!(instance.num_stops(), 2);
/// assert_eq!(instance.total_demand(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct Instance {
    costs: CostMatrix,
    demands: DemandVector,
}

impl Instance {
    /// Pairs a cost matrix with explicit demands.
    pub fn new(costs: CostMatrix, demands: DemandVector) -> Result<Self> {
        if costs.size() != demands.len() {
            return Err(FleetError::InvalidDemand(format!(
                "{} demands for {} locations",
                demands.len(),
                costs.size()
            )));
        }
        Ok(Self { costs, demands })
    }

    /// Uses unit demand at every stop.
    pub fn with_unit_demand(costs: CostMatrix) -> Self {
        let demands = DemandVector::unit(costs.size());
        Self { costs, demands }
    }

    /// Computes the cost matrix once with `provider`, unit demand.
    pub fn from_locations<P: CostMatrixProvider + ?Sized>(
        locations: &[Location],
        provider: &P,
    ) -> Self {
        Self::with_unit_demand(provider.compute(locations))
    }

    /// The cost matrix.
    pub fn costs(&self) -> &CostMatrix {
        &self.costs
    }

    /// The demand vector.
    pub fn demands(&self) -> &DemandVector {
        &self.demands
    }

    /// Number of locations, depot included.
    pub fn num_locations(&self) -> usize {
        self.costs.size()
    }

    /// Number of stops (locations other than the depot).
    pub fn num_stops(&self) -> usize {
        self.costs.size().saturating_sub(1)
    }

    /// Indices of all stops.
    pub fn stops(&self) -> Range<usize> {
        1..self.num_locations().max(1)
    }

    /// Total demand of all stops.
    pub fn total_demand(&self) -> i64 {
        self.demands.total()
    }
}
