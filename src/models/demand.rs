//! Per-location demand.

use crate::error::{FleetError, Result};

use super::DEPOT;

/// Demand of every location, indexed like the cost matrix.
///
/// The depot always has zero demand.
///
/// # Examples
///
/// ```
/// use u_fleet::models::DemandVector;
///
/// let d = DemandVector::unit(6);
/// assert_eq!(d.get(0), 0);
/// assert_eq!(d.get(3), 1);
/// assert_eq!(d.total(), 5);
///
/// let custom = DemandVector::from_vec(vec![0, 4, 2]).unwrap();
/// assert_eq!(custom.max_stop_demand(), 4);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemandVector {
    demands: Vec<i64>,
}

impl DemandVector {
    /// Unit demand at every stop, zero at the depot.
    pub fn unit(num_locations: usize) -> Self {
        let demands = (0..num_locations)
            .map(|i| if i == DEPOT { 0 } else { 1 })
            .collect();
        Self { demands }
    }

    /// Wraps explicit demands. Rejects negative values and a non-zero depot demand.
    pub fn from_vec(demands: Vec<i64>) -> Result<Self> {
        if let Some(&d) = demands.get(DEPOT) {
            if d != 0 {
                return Err(FleetError::InvalidDemand(format!("depot demand must be 0, got {d}")));
            }
        }
        if let Some((i, d)) = demands.iter().enumerate().find(|(_, &d)| d < 0) {
            return Err(FleetError::InvalidDemand(format!("negative demand {d} at location {i}")));
        }
        Ok(Self { demands })
    }

    /// Demand at location `location`.
    #[inline]
    pub fn get(&self, location: usize) -> i64 {
        self.demands[location]
    }

    /// Number of locations covered (depot included).
    pub fn len(&self) -> usize {
        self.demands.len()
    }

    /// Returns `true` if no location is covered.
    pub fn is_empty(&self) -> bool {
        self.demands.is_empty()
    }

    /// Sum of all stop demands.
    pub fn total(&self) -> i64 {
        self.demands.iter().sum()
    }

    /// Largest single stop demand, 0 without stops.
    pub fn max_stop_demand(&self) -> i64 {
        self.demands.iter().copied().max().unwrap_or(0)
    }

    /// Total demand of a sequence of stops.
    pub fn load_of(&self, stops: &[usize]) -> i64 {
        stops.iter().map(|&s| self.get(s)).sum()
    }
}
