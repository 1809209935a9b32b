//! Capacity dimension: cumulative load per route.

use crate::error::{FleetError, Result};
use crate::models::{DemandVector, Solution};

/// Tracks the load of every route against a shared vehicle capacity.
///
/// Queries are O(1). Mutation is restricted to
/// [`SolutionState`](super::SolutionState), which updates loads in the same
/// step as the route contents.
///
/// # Examples
///
/// ```
/// use u_fleet::evaluation::CapacityTracker;
///
/// let tracker = CapacityTracker::new(2, 10);
/// assert_eq!(tracker.load(0), 0);
/// assert!(tracker.can_add(1, 10));
/// assert!(!tracker.can_add(1, 11));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapacityTracker {
    capacity: i64,
    loads: Vec<i64>,
}

impl CapacityTracker {
    /// Creates a tracker for `fleet_size` empty routes.
    pub fn new(fleet_size: usize, capacity: i64) -> Self {
        Self {
            capacity,
            loads: vec![0; fleet_size],
        }
    }

    /// Computes loads from an existing solution.
    pub fn from_solution(solution: &Solution, demands: &DemandVector, capacity: i64) -> Self {
        Self {
            capacity,
            loads: solution
                .routes()
                .iter()
                .map(|r| demands.load_of(r.stops()))
                .collect(),
        }
    }

    /// Vehicle capacity.
    pub fn capacity(&self) -> i64 {
        self.capacity
    }

    /// Number of tracked routes.
    pub fn num_routes(&self) -> usize {
        self.loads.len()
    }

    /// Current load of `route`.
    #[inline]
    pub fn load(&self, route: usize) -> i64 {
        self.loads[route]
    }

    /// Remaining room on `route`.
    #[inline]
    pub fn slack(&self, route: usize) -> i64 {
        self.capacity - self.loads[route]
    }

    /// `true` iff `load(route) + demand <= capacity`.
    #[inline]
    pub fn can_add(&self, route: usize, demand: i64) -> bool {
        self.fits(route, 0, demand)
    }

    /// `true` iff the route stays within capacity after dropping `removed`
    /// and taking on `added`.
    #[inline]
    pub fn fits(&self, route: usize, removed: i64, added: i64) -> bool {
        self.loads[route] - removed + added <= self.capacity
    }

    /// Sum of all route loads.
    pub fn total_load(&self) -> i64 {
        self.loads.iter().sum()
    }

    pub(crate) fn shift(&mut self, route: usize, removed: i64, added: i64) {
        self.loads[route] += added - removed;
    }

    /// Recomputes every load from `solution` and compares with the tracked values.
    pub fn verify(&self, solution: &Solution, demands: &DemandVector) -> Result<()> {
        if solution.num_routes() != self.loads.len() {
            return Err(FleetError::InvariantViolation(format!(
                "tracker holds {} routes, solution has {}",
                self.loads.len(),
                solution.num_routes()
            )));
        }
        for (ri, route) in solution.routes().iter().enumerate() {
            let actual = demands.load_of(route.stops());
            if actual != self.loads[ri] {
                return Err(FleetError::InvariantViolation(format!(
                    "route {ri} tracked load {} but carries {actual}",
                    self.loads[ri]
                )));
            }
            if actual > self.capacity {
                return Err(FleetError::InvariantViolation(format!(
                    "route {ri} carries {actual} over capacity {}",
                    self.capacity
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Route;

    #[test]
    fn test_fits_exchange() {
        let mut t = CapacityTracker::new(1, 5);
        t.shift(0, 0, 4);
        assert_eq!(t.load(0), 4);
        assert_eq!(t.slack(0), 1);
        assert!(t.fits(0, 2, 3));
        assert!(!t.fits(0, 1, 3));
    }

    #[test]
    fn test_from_solution() {
        let d = DemandVector::from_vec(vec![0, 2, 3, 4]).expect("valid");
        let sol = Solution::from_routes(vec![
            Route::with_stops(0, vec![1, 3]),
            Route::with_stops(1, vec![2]),
        ]);
        let t = CapacityTracker::from_solution(&sol, &d, 10);
        assert_eq!(t.load(0), 6);
        assert_eq!(t.load(1), 3);
        assert_eq!(t.total_load(), 9);
        assert!(t.verify(&sol, &d).is_ok());
    }

    #[test]
    fn test_verify_detects_drift() {
        let d = DemandVector::unit(3);
        let sol = Solution::from_routes(vec![Route::with_stops(0, vec![1, 2])]);
        let mut t = CapacityTracker::from_solution(&sol, &d, 5);
        t.shift(0, 1, 0);
        assert!(matches!(
            t.verify(&sol, &d),
            Err(FleetError::InvariantViolation(_))
        ));
    }

    #[test]
    fn test_verify_detects_overload() {
        let d = DemandVector::unit(4);
        let sol = Solution::from_routes(vec![Route::with_stops(0, vec![1, 2, 3])]);
        let t = CapacityTracker::from_solution(&sol, &d, 2);
        assert!(t.verify(&sol, &d).is_err());
    }
}
