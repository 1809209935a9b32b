//! Cost matrix providers.

use crate::models::Location;

use super::CostMatrix;

/// Turns an ordered list of locations into a cost matrix.
///
/// Implementations must be pure and deterministic: the matrix is computed
/// once per run and shared read-only by every trial.
pub trait CostMatrixProvider {
    /// Computes the n×n cost matrix for `locations` (index 0 = depot).
    fn compute(&self, locations: &[Location]) -> CostMatrix;
}

/// Euclidean distance scaled to integers and truncated toward zero.
///
/// With the default scale of 100 000, one thousandth of a degree of
/// latitude/longitude becomes 100 cost units.
///
/// # Examples
///
/// ```
/// use u_fleet::models::Location;
/// use u_fleet::distance::{CostMatrixProvider, ScaledEuclidean};
///
/// let locations = vec![Location::new(0.0, 0.0), Location::new(3.0, 4.0)];
/// let cm = ScaledEuclidean::new(10.0).compute(&locations);
/// assert_eq!(cm.get(0, 1), 50);
/// assert_eq!(cm.get(1, 1), 0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaledEuclidean {
    scale: f64,
}

impl ScaledEuclidean {
    /// Scale applied when none is given.
    pub const DEFAULT_SCALE: f64 = 100_000.0;

    /// Creates a provider with the given scale factor.
    pub fn new(scale: f64) -> Self {
        Self { scale }
    }

    /// Scale factor applied to raw Euclidean distances.
    pub fn scale(&self) -> f64 {
        self.scale
    }
}

impl Default for ScaledEuclidean {
    fn default() -> Self {
        Self::new(Self::DEFAULT_SCALE)
    }
}

impl CostMatrixProvider for ScaledEuclidean {
    fn compute(&self, locations: &[Location]) -> CostMatrix {
        let n = locations.len();
        let mut cm = CostMatrix::new(n);
        for i in 0..n {
            for j in (i + 1)..n {
                let cost = (locations[i].distance_to(&locations[j]) * self.scale) as i64;
                cm.set(i, j, cost.max(0));
                cm.set(j, i, cost.max(0));
            }
        }
        cm
    }
}
