//! Intra-route 2-opt improvement.
//!
//! # Algorithm
//!
//! For each pair of positions `i < j` in a route, compute the change in cost
//! from reversing the segment `route[i..=j]`:
//!
//! ```text
//! before: p -> r[i] -> r[i+1] -> ... -> r[j] -> n
//! after:  p -> r[j] -> r[j-1] -> ... -> r[i] -> n
//! ```
//!
//! Costs may be asymmetric (penalized arcs are directed), so the reversed
//! interior is summed explicitly. For fixed `i` the forward and backward sums
//! grow by one arc per step of `j`, keeping each scan O(n²).
//!
//! # Reference
//!
//! Croes, G.A. (1958). "A method for solving traveling salesman problems",
//! *Operations Research* 6(6), 791-812.

use crate::distance::ArcCost;
use crate::error::Result;
use crate::evaluation::SolutionState;

use super::moves::{descend, node_at, node_before, Move, ScoredMove};

/// Applies best-improvement 2-opt reversals until none reduces cost.
///
/// Returns the number of moves applied.
///
/// # Examples
///
/// ```
/// use u_fleet::distance::ScaledEuclidean;
/// use u_fleet::evaluation::SolutionState;
/// use u_fleet::local_search::two_opt_improve;
/// use u_fleet::models::{Instance, Location};
///
/// let locations = vec![
///     Location::new(0.0, 0.0),
///     Location::new(1.0, 1.0),
///     Location::new(2.0, 0.0),
///     Location::new(1.0, -1.0),
/// ];
/// let instance = Instance::from_locations(&locations, &ScaledEuclidean::new(100.0));
/// let mut state = SolutionState::new(instance.demands(), 1, 3);
/// // 1 -> 3 -> 2 crosses itself.
/// for (pos, stop) in [1, 3, 2].into_iter().enumerate() {
///     state.insert(0, pos, stop).unwrap();
/// }
/// let before = state.total_cost(instance.costs());
/// two_opt_improve(&mut state, instance.costs()).unwrap();
/// assert!(state.total_cost(instance.costs()) < before);
/// ```
pub fn two_opt_improve<C: ArcCost + ?Sized>(
    state: &mut SolutionState<'_>,
    costs: &C,
) -> Result<usize> {
    descend(state, costs, find_best_two_opt)
}

/// Finds the most improving reversal across all routes, if any.
pub(crate) fn find_best_two_opt<C: ArcCost + ?Sized>(
    state: &SolutionState<'_>,
    costs: &C,
) -> Option<ScoredMove> {
    let mut best: Option<ScoredMove> = None;

    for route in 0..state.num_routes() {
        let stops = state.stops(route);
        let n = stops.len();
        if n < 2 {
            continue;
        }
        for i in 0..n - 1 {
            let prev = node_before(stops, i);
            let mut forward = 0;
            let mut backward = 0;
            for j in i + 1..n {
                forward += costs.arc(stops[j - 1], stops[j]);
                backward += costs.arc(stops[j], stops[j - 1]);
                let next = node_at(stops, j + 1);
                let old = costs.arc(prev, stops[i]) + forward + costs.arc(stops[j], next);
                let new = costs.arc(prev, stops[j]) + backward + costs.arc(stops[i], next);
                ScoredMove::offer(
                    &mut best,
                    Move::TwoOpt {
                        route,
                        start: i,
                        end: j,
                    },
                    new - old,
                );
            }
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::CostMatrix;
    use crate::models::DemandVector;

    fn state_of<'a>(d: &'a DemandVector, stops: &[usize]) -> SolutionState<'a> {
        let mut s = SolutionState::new(d, 1, stops.len() as i64);
        for (pos, &stop) in stops.iter().enumerate() {
            s.insert(0, pos, stop).expect("fits");
        }
        s
    }

    fn line() -> CostMatrix {
        CostMatrix::from_rows(vec![
            vec![0, 1, 2, 3],
            vec![1, 0, 1, 2],
            vec![2, 1, 0, 1],
            vec![3, 2, 1, 0],
        ])
        .expect("valid")
    }

    #[test]
    fn test_2opt_already_optimal() {
        let cm = line();
        let d = DemandVector::unit(4);
        let mut s = state_of(&d, &[1, 2, 3]);
        assert_eq!(two_opt_improve(&mut s, &cm).expect("valid"), 0);
        assert_eq!(s.stops(0), &[1, 2, 3]);
        assert_eq!(s.total_cost(&cm), 6);
    }

    #[test]
    fn test_2opt_empty_and_single() {
        let cm = line();
        let d = DemandVector::unit(4);
        let s = SolutionState::new(&d, 2, 3);
        assert!(find_best_two_opt(&s, &cm).is_none());
        let single = state_of(&d, &[2]);
        assert!(find_best_two_opt(&single, &cm).is_none());
    }

    #[test]
    fn test_2opt_asymmetric_delta_matches_recomputation() {
        // Going "up" costs more than coming back.
        let cm = CostMatrix::from_rows(vec![
            vec![0, 1, 2, 3, 4],
            vec![5, 0, 1, 2, 3],
            vec![6, 5, 0, 1, 2],
            vec![7, 6, 5, 0, 1],
            vec![8, 7, 6, 5, 0],
        ])
        .expect("valid");
        let d = DemandVector::unit(5);
        let mut s = state_of(&d, &[1, 3, 2, 4]);
        let before = s.total_cost(&cm);
        let best = find_best_two_opt(&s, &cm).expect("improving");
        best.mv.apply(&mut s).expect("valid");
        assert_eq!(s.total_cost(&cm) - before, best.delta);
        assert_eq!(s.stops(0), &[1, 2, 3, 4]);
    }

    #[test]
    fn test_2opt_does_not_worsen() {
        let cm = CostMatrix::from_rows(vec![
            vec![0, 7, 7, 7, 7],
            vec![7, 0, 10, 10, 14],
            vec![7, 10, 0, 14, 10],
            vec![7, 10, 14, 0, 10],
            vec![7, 14, 10, 10, 0],
        ])
        .expect("valid");
        let d = DemandVector::unit(5);
        let mut s = state_of(&d, &[1, 4, 2, 3]);
        let before = s.total_cost(&cm);
        two_opt_improve(&mut s, &cm).expect("valid");
        assert!(s.total_cost(&cm) < before);
        assert!(s.verify().is_ok());
    }
}
