//! Solution paired with its capacity tracker.

use crate::distance::ArcCost;
use crate::error::{FleetError, Result};
use crate::models::{DemandVector, Solution};

use super::CapacityTracker;

/// A solution whose route loads are kept in lockstep with a [`CapacityTracker`].
///
/// Every structural change (construction inserts and local search moves)
/// goes through this type. Each mutator checks capacity on the affected
/// routes before touching anything, then updates contents and loads together,
/// so no caller can observe a load that disagrees with the routes. A rejected
/// mutation leaves the state untouched and returns
/// [`FleetError::InvariantViolation`]: operators are expected to check
/// feasibility themselves first.
///
/// # Examples
///
/// ```
/// use u_fleet::models::DemandVector;
/// use u_fleet::evaluation::SolutionState;
///
/// let demands = DemandVector::unit(4);
/// let mut state = SolutionState::new(&demands, 2, 2);
/// state.insert(0, 0, 1).unwrap();
/// state.insert(0, 1, 2).unwrap();
/// assert!(state.insert(0, 2, 3).is_err()); // route 0 is full
/// state.insert(1, 0, 3).unwrap();
/// assert_eq!(state.tracker().load(0), 2);
/// assert!(state.verify().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct SolutionState<'a> {
    demands: &'a DemandVector,
    solution: Solution,
    tracker: CapacityTracker,
}

fn rejected(msg: String) -> FleetError {
    FleetError::InvariantViolation(msg)
}

impl<'a> SolutionState<'a> {
    /// Starts from `fleet_size` empty routes.
    pub fn new(demands: &'a DemandVector, fleet_size: usize, capacity: i64) -> Self {
        Self {
            demands,
            solution: Solution::new(fleet_size),
            tracker: CapacityTracker::new(fleet_size, capacity),
        }
    }

    /// Adopts an existing solution. Fails if any route is over capacity.
    pub fn from_solution(
        demands: &'a DemandVector,
        solution: Solution,
        capacity: i64,
    ) -> Result<Self> {
        let tracker = CapacityTracker::from_solution(&solution, demands, capacity);
        tracker.verify(&solution, demands)?;
        Ok(Self {
            demands,
            solution,
            tracker,
        })
    }

    /// Demand vector the loads are computed from.
    pub fn demands(&self) -> &'a DemandVector {
        self.demands
    }

    /// Current solution.
    pub fn solution(&self) -> &Solution {
        &self.solution
    }

    /// Current loads.
    pub fn tracker(&self) -> &CapacityTracker {
        &self.tracker
    }

    /// Vehicle capacity.
    pub fn capacity(&self) -> i64 {
        self.tracker.capacity()
    }

    /// Number of routes (fleet size).
    pub fn num_routes(&self) -> usize {
        self.solution.num_routes()
    }

    /// Stops of `route` in visiting order.
    #[inline]
    pub fn stops(&self, route: usize) -> &[usize] {
        self.solution.routes()[route].stops()
    }

    /// Raw total cost of the current solution.
    pub fn total_cost<C: ArcCost + ?Sized>(&self, costs: &C) -> i64 {
        self.solution.total_cost(costs)
    }

    /// Consumes the state, returning the solution.
    pub fn into_solution(self) -> Solution {
        self.solution
    }

    /// Full consistency check: coverage, capacity and tracked loads.
    pub fn verify(&self) -> Result<()> {
        self.solution.validate(self.demands, self.capacity())?;
        self.tracker.verify(&self.solution, self.demands)
    }

    fn check_route(&self, route: usize) -> Result<()> {
        if route >= self.num_routes() {
            return Err(rejected(format!(
                "route {route} out of range for fleet of {}",
                self.num_routes()
            )));
        }
        Ok(())
    }

    fn check_pos(&self, route: usize, pos: usize) -> Result<()> {
        self.check_route(route)?;
        if pos >= self.stops(route).len() {
            return Err(rejected(format!("position {pos} out of range on route {route}")));
        }
        Ok(())
    }

    /// Inserts `stop` at `pos` of `route`.
    pub fn insert(&mut self, route: usize, pos: usize, stop: usize) -> Result<()> {
        self.check_route(route)?;
        if pos > self.stops(route).len() {
            return Err(rejected(format!("insert position {pos} out of range on route {route}")));
        }
        let demand = self.demands.get(stop);
        if !self.tracker.can_add(route, demand) {
            return Err(rejected(format!(
                "inserting stop {stop} would overload route {route}"
            )));
        }
        self.solution.routes_mut()[route].stops_mut().insert(pos, stop);
        self.tracker.shift(route, 0, demand);
        Ok(())
    }

    /// Moves the stop at `from_pos` of `from_route` to `to_pos` of `to_route`.
    ///
    /// `to_pos` indexes the target route after the stop has been taken out.
    pub fn relocate(
        &mut self,
        from_route: usize,
        from_pos: usize,
        to_route: usize,
        to_pos: usize,
    ) -> Result<()> {
        self.check_pos(from_route, from_pos)?;
        self.check_route(to_route)?;
        let target_len = self.stops(to_route).len() - usize::from(from_route == to_route);
        if to_pos > target_len {
            return Err(rejected(format!("relocate position {to_pos} out of range")));
        }
        let stop = self.stops(from_route)[from_pos];
        let demand = self.demands.get(stop);
        if from_route != to_route && !self.tracker.can_add(to_route, demand) {
            return Err(rejected(format!(
                "relocating stop {stop} would overload route {to_route}"
            )));
        }
        let routes = self.solution.routes_mut();
        routes[from_route].stops_mut().remove(from_pos);
        routes[to_route].stops_mut().insert(to_pos, stop);
        if from_route != to_route {
            self.tracker.shift(from_route, demand, 0);
            self.tracker.shift(to_route, 0, demand);
        }
        Ok(())
    }

    /// Exchanges the stops at `(route_a, pos_a)` and `(route_b, pos_b)`.
    pub fn swap(&mut self, route_a: usize, pos_a: usize, route_b: usize, pos_b: usize) -> Result<()> {
        self.check_pos(route_a, pos_a)?;
        self.check_pos(route_b, pos_b)?;
        let a = self.stops(route_a)[pos_a];
        let b = self.stops(route_b)[pos_b];
        let (da, db) = (self.demands.get(a), self.demands.get(b));
        if route_a != route_b
            && !(self.tracker.fits(route_a, da, db) && self.tracker.fits(route_b, db, da))
        {
            return Err(rejected(format!(
                "swapping stops {a} and {b} would overload a route"
            )));
        }
        let routes = self.solution.routes_mut();
        routes[route_a].stops_mut()[pos_a] = b;
        routes[route_b].stops_mut()[pos_b] = a;
        if route_a != route_b {
            self.tracker.shift(route_a, da, db);
            self.tracker.shift(route_b, db, da);
        }
        Ok(())
    }

    /// Reverses the stops between `start` and `end` (inclusive) on `route`.
    pub fn reverse(&mut self, route: usize, start: usize, end: usize) -> Result<()> {
        self.check_pos(route, end)?;
        if start > end {
            return Err(rejected(format!("reverse range {start}..={end} is empty")));
        }
        self.solution.routes_mut()[route].stops_mut()[start..=end].reverse();
        Ok(())
    }

    /// Moves `len` consecutive stops starting at `start` to `to_pos` of the same
    /// route, keeping their order. `to_pos` indexes the route without the segment.
    pub fn move_segment(&mut self, route: usize, start: usize, len: usize, to_pos: usize) -> Result<()> {
        self.check_route(route)?;
        let n = self.stops(route).len();
        if len == 0 || start + len > n || to_pos > n - len {
            return Err(rejected(format!(
                "segment {start}+{len} -> {to_pos} out of range on route {route}"
            )));
        }
        let stops = self.solution.routes_mut()[route].stops_mut();
        let segment: Vec<usize> = stops.drain(start..start + len).collect();
        stops.splice(to_pos..to_pos, segment);
        Ok(())
    }

    /// Cross-route tail exchange: `a[..cut_a] + b[cut_b..]` and `b[..cut_b] + a[cut_a..]`.
    pub fn exchange_tails(
        &mut self,
        route_a: usize,
        cut_a: usize,
        route_b: usize,
        cut_b: usize,
    ) -> Result<()> {
        self.check_route(route_a)?;
        self.check_route(route_b)?;
        if route_a == route_b
            || cut_a > self.stops(route_a).len()
            || cut_b > self.stops(route_b).len()
        {
            return Err(rejected(format!(
                "invalid tail exchange ({route_a}, {cut_a}) <-> ({route_b}, {cut_b})"
            )));
        }
        let tail_a = self.demands.load_of(&self.stops(route_a)[cut_a..]);
        let tail_b = self.demands.load_of(&self.stops(route_b)[cut_b..]);
        if !(self.tracker.fits(route_a, tail_a, tail_b) && self.tracker.fits(route_b, tail_b, tail_a)) {
            return Err(rejected(format!(
                "tail exchange between routes {route_a} and {route_b} would overload a route"
            )));
        }
        let routes = self.solution.routes_mut();
        let moved_a = routes[route_a].stops_mut().split_off(cut_a);
        let moved_b = routes[route_b].stops_mut().split_off(cut_b);
        routes[route_a].stops_mut().extend(moved_b);
        routes[route_b].stops_mut().extend(moved_a);
        self.tracker.shift(route_a, tail_a, tail_b);
        self.tracker.shift(route_b, tail_b, tail_a);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Route;

    fn state_with<'a>(demands: &'a DemandVector, routes: Vec<Vec<usize>>, cap: i64) -> SolutionState<'a> {
        let sol = Solution::from_routes(
            routes
                .into_iter()
                .enumerate()
                .map(|(i, s)| Route::with_stops(i, s))
                .collect(),
        );
        SolutionState::from_solution(demands, sol, cap).expect("feasible")
    }

    #[test]
    fn test_relocate_between_routes_updates_loads() {
        let d = DemandVector::from_vec(vec![0, 2, 3, 4]).expect("valid");
        let mut s = state_with(&d, vec![vec![1, 2], vec![3]], 10);
        s.relocate(0, 1, 1, 0).expect("fits");
        assert_eq!(s.stops(0), &[1]);
        assert_eq!(s.stops(1), &[2, 3]);
        assert_eq!(s.tracker().load(0), 2);
        assert_eq!(s.tracker().load(1), 7);
        assert!(s.verify().is_ok());
    }

    #[test]
    fn test_relocate_within_route() {
        let d = DemandVector::unit(4);
        let mut s = state_with(&d, vec![vec![1, 2, 3]], 3);
        s.relocate(0, 0, 0, 2).expect("valid");
        assert_eq!(s.stops(0), &[2, 3, 1]);
        assert!(s.verify().is_ok());
    }

    #[test]
    fn test_relocate_rejected_leaves_state_untouched() {
        let d = DemandVector::unit(4);
        let mut s = state_with(&d, vec![vec![1, 2], vec![3]], 2);
        assert!(s.relocate(1, 0, 0, 0).is_err());
        assert_eq!(s.stops(0), &[1, 2]);
        assert_eq!(s.stops(1), &[3]);
        assert!(s.verify().is_ok());
    }

    #[test]
    fn test_swap_checks_both_routes() {
        let d = DemandVector::from_vec(vec![0, 1, 5, 1]).expect("valid");
        let mut s = state_with(&d, vec![vec![1], vec![2], vec![3]], 5);
        s.swap(0, 0, 1, 0).expect("equal room");
        assert_eq!(s.stops(0), &[2]);
        assert_eq!(s.tracker().load(0), 5);

        let mut tight = state_with(&d, vec![vec![1, 3], vec![2]], 5);
        assert!(tight.swap(0, 0, 1, 0).is_err());
        assert_eq!(tight.stops(0), &[1, 3]);
        assert_eq!(tight.tracker().load(1), 5);
    }

    #[test]
    fn test_reverse_and_move_segment() {
        let d = DemandVector::unit(6);
        let mut s = state_with(&d, vec![vec![1, 2, 3, 4, 5]], 5);
        s.reverse(0, 1, 3).expect("valid");
        assert_eq!(s.stops(0), &[1, 4, 3, 2, 5]);
        s.move_segment(0, 0, 2, 3).expect("valid");
        assert_eq!(s.stops(0), &[3, 2, 5, 1, 4]);
        assert!(s.verify().is_ok());
    }

    #[test]
    fn test_exchange_tails() {
        let d = DemandVector::unit(5);
        let mut s = state_with(&d, vec![vec![1, 2], vec![3, 4]], 3);
        s.exchange_tails(0, 1, 1, 0).expect("fits");
        assert_eq!(s.stops(0), &[1, 3, 4]);
        assert_eq!(s.stops(1), &[2]);
        assert_eq!(s.tracker().load(0), 3);
        assert_eq!(s.tracker().load(1), 1);
        assert!(s.verify().is_ok());
        // Moving all of route 1 onto the end of route 0 would need room for 4.
        assert!(s.exchange_tails(1, 0, 0, 3).is_err());
        assert_eq!(s.stops(0), &[1, 3, 4]);
        assert_eq!(s.stops(1), &[2]);
        assert_eq!(s.tracker().load(0), 3);
        s.exchange_tails(0, 2, 1, 1).expect("fits");
        assert_eq!(s.stops(0), &[1, 3]);
        assert_eq!(s.stops(1), &[2, 4]);
        assert_eq!(s.tracker().load(0), 2);
        assert_eq!(s.tracker().load(1), 2);
        assert!(s.verify().is_ok());
        assert!(s.exchange_tails(0, 0, 0, 1).is_err());
    }

    #[test]
    fn test_out_of_range_rejected() {
        let d = DemandVector::unit(2);
        let mut s = SolutionState::new(&d, 1, 1);
        assert!(s.insert(1, 0, 1).is_err());
        assert!(s.insert(0, 1, 1).is_err());
        assert!(s.reverse(0, 0, 0).is_err());
    }
}
