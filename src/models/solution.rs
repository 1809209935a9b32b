//! Solution type and its structural invariants.

use serde::{Deserialize, Serialize};

use crate::distance::ArcCost;
use crate::error::{FleetError, Result};

use super::{DemandVector, Route, DEPOT};

/// One route per vehicle, jointly covering every stop exactly once.
///
/// # Examples
///
/// ```
/// use u_fleet::models::{DemandVector, Route, Solution};
///
/// let sol = Solution::from_routes(vec![
///     Route::with_stops(0, vec![1, 3]),
///     Route::with_stops(1, vec![2]),
///     Route::new(2),
/// ]);
/// assert_eq!(sol.num_routes(), 3);
/// assert_eq!(sol.num_used_routes(), 2);
/// assert_eq!(sol.num_served(), 3);
/// assert!(sol.validate(&DemandVector::unit(4), 2).is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Solution {
    routes: Vec<Route>,
}

impl Solution {
    /// Creates `fleet_size` empty routes.
    pub fn new(fleet_size: usize) -> Self {
        Self {
            routes: (0..fleet_size).map(Route::new).collect(),
        }
    }

    /// Creates a solution from explicit routes.
    pub fn from_routes(routes: Vec<Route>) -> Self {
        Self { routes }
    }

    /// Returns the routes in vehicle order.
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub(crate) fn routes_mut(&mut self) -> &mut [Route] {
        &mut self.routes
    }

    /// Number of routes (fleet size), used or not.
    pub fn num_routes(&self) -> usize {
        self.routes.len()
    }

    /// Number of vehicles that serve at least one stop.
    pub fn num_used_routes(&self) -> usize {
        self.routes.iter().filter(|r| !r.is_empty()).count()
    }

    /// Number of stops served across all routes.
    pub fn num_served(&self) -> usize {
        self.routes.iter().map(Route::len).sum()
    }

    /// Sum of route costs; empty routes contribute 0.
    pub fn total_cost<C: ArcCost + ?Sized>(&self, costs: &C) -> i64 {
        self.routes.iter().map(|r| r.cost(costs)).sum()
    }

    /// Checks coverage, uniqueness and capacity against `demands`.
    ///
    /// Every location `1..demands.len()` must appear exactly once across all
    /// routes, the depot never appears as a stop, and no route load exceeds
    /// `capacity`. Any failure is an [`FleetError::InvariantViolation`].
    pub fn validate(&self, demands: &DemandVector, capacity: i64) -> Result<()> {
        let mut seen = vec![false; demands.len()];
        for (ri, route) in self.routes.iter().enumerate() {
            for &stop in route.stops() {
                if stop == DEPOT || stop >= seen.len() {
                    return Err(FleetError::InvariantViolation(format!(
                        "route {ri} visits invalid stop {stop}"
                    )));
                }
                if std::mem::replace(&mut seen[stop], true) {
                    return Err(FleetError::InvariantViolation(format!(
                        "stop {stop} is visited more than once"
                    )));
                }
            }
            let load = demands.load_of(route.stops());
            if load > capacity {
                return Err(FleetError::InvariantViolation(format!(
                    "route {ri} carries {load} over capacity {capacity}"
                )));
            }
        }
        if let Some(missing) = (1..seen.len()).find(|&s| !seen[s]) {
            return Err(FleetError::InvariantViolation(format!(
                "stop {missing} is not served by any route"
            )));
        }
        Ok(())
    }
}
