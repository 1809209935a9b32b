//! Intra-route Or-opt improvement.
//!
//! # Algorithm
//!
//! Tries moving segments of 2 or 3 consecutive stops to a different position
//! within the same route, keeping their orientation. Single stops are left to
//! [`relocate`](super::relocate_improve).
//!
//! ```text
//! delta = c(p, n) - c(p, first) - c(last, n)        close the gap
//!       + c(p', first) + c(last, n') - c(p', n')    open the new slot
//! ```
//!
//! # Complexity
//!
//! O(n²) per scan.
//!
//! # Reference
//!
//! Or, I. (1976). "Traveling Salesman-Type Combinatorial Problems and Their
//! Relation to the Logistics of Blood Banking". PhD thesis.

use crate::distance::ArcCost;
use crate::error::Result;
use crate::evaluation::SolutionState;
use crate::models::DEPOT;

use super::moves::{descend, node_at, node_before, Move, ScoredMove};

/// Segment lengths tried by the operator.
const SEGMENT_LENGTHS: [usize; 2] = [2, 3];

/// Applies best-improvement Or-opt moves until none reduces cost.
///
/// Returns the number of moves applied.
///
/// # Examples
///
/// ```
/// use u_fleet::distance::CostMatrix;
/// use u_fleet::evaluation::SolutionState;
/// use u_fleet::local_search::or_opt_improve;
/// use u_fleet::models::DemandVector;
///
/// // Five stops on a line; the pair (1, 2) sits at the wrong end.
/// let rows = (0..6)
///     .map(|i: i64| (0..6).map(|j: i64| (i - j).abs()).collect())
///     .collect();
/// let cm = CostMatrix::from_rows(rows).unwrap();
/// let demands = DemandVector::unit(6);
/// let mut state = SolutionState::new(&demands, 1, 5);
/// for (pos, stop) in [3, 4, 5, 1, 2].into_iter().enumerate() {
///     state.insert(0, pos, stop).unwrap();
/// }
/// or_opt_improve(&mut state, &cm).unwrap();
/// assert_eq!(state.total_cost(&cm), 10);
/// ```
pub fn or_opt_improve<C: ArcCost + ?Sized>(state: &mut SolutionState<'_>, costs: &C) -> Result<usize> {
    descend(state, costs, find_best_or_opt)
}

/// Finds the most improving segment move across all routes, if any.
pub(crate) fn find_best_or_opt<C: ArcCost + ?Sized>(
    state: &SolutionState<'_>,
    costs: &C,
) -> Option<ScoredMove> {
    let mut best: Option<ScoredMove> = None;

    for route in 0..state.num_routes() {
        let stops = state.stops(route);
        let n = stops.len();
        for len in SEGMENT_LENGTHS {
            if n <= len {
                continue;
            }
            for start in 0..=n - len {
                let first = stops[start];
                let last = stops[start + len - 1];
                let prev = node_before(stops, start);
                let next = node_at(stops, start + len);
                let removal = costs.arc(prev, next) - costs.arc(prev, first) - costs.arc(last, next);

                // Positions index the route with the segment taken out.
                let reduced = |k: usize| if k < start { k } else { k + len };
                for to_pos in 0..=n - len {
                    if to_pos == start {
                        continue;
                    }
                    let p = if to_pos == 0 {
                        DEPOT
                    } else {
                        stops[reduced(to_pos - 1)]
                    };
                    let q = node_at(stops, reduced(to_pos));
                    let insertion = costs.arc(p, first) + costs.arc(last, q) - costs.arc(p, q);
                    ScoredMove::offer(
                        &mut best,
                        Move::OrOpt {
                            route,
                            start,
                            len,
                            to_pos,
                        },
                        removal + insertion,
                    );
                }
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

    fn line(n: usize) -> CostMatrix {
        let rows = (0..n)
            .map(|i| (0..n).map(|j| (i as i64 - j as i64).abs()).collect())
            .collect();
        CostMatrix::from_rows(rows).expect("valid")
    }

    fn state_of<'a>(d: &'a DemandVector, stops: &[usize]) -> SolutionState<'a> {
        let mut s = SolutionState::new(d, 1, stops.len() as i64);
        for (pos, &stop) in stops.iter().enumerate() {
            s.insert(0, pos, stop).expect("fits");
        }
        s
    }

    #[test]
    fn test_or_opt_already_optimal() {
        let cm = line(5);
        let d = DemandVector::unit(5);
        let s = state_of(&d, &[1, 2, 3, 4]);
        assert!(find_best_or_opt(&s, &cm).is_none());
    }

    #[test]
    fn test_or_opt_short_routes() {
        let cm = line(5);
        let d = DemandVector::unit(5);
        let s = state_of(&d, &[2, 1]);
        assert!(find_best_or_opt(&s, &cm).is_none());
    }

    #[test]
    fn test_or_opt_delta_matches_recomputation() {
        let cm = CostMatrix::from_rows(vec![
            vec![0, 3, 9, 4, 8, 2],
            vec![3, 0, 5, 6, 1, 7],
            vec![9, 5, 0, 2, 6, 3],
            vec![4, 6, 2, 0, 5, 9],
            vec![8, 1, 6, 5, 0, 4],
            vec![2, 7, 3, 9, 4, 0],
        ])
        .expect("valid");
        let d = DemandVector::unit(6);
        let mut s = state_of(&d, &[1, 2, 3, 4, 5]);
        let best = find_best_or_opt(&s, &cm).expect("improving");
        assert_eq!(best.delta, -4);
        let before = s.total_cost(&cm);
        best.mv.apply(&mut s).expect("valid");
        assert_eq!(s.total_cost(&cm) - before, best.delta);
        assert_eq!(s.stops(0), &[1, 4, 5, 2, 3]);
        assert!(s.verify().is_ok());
    }

    #[test]
    fn test_or_opt_moves_pair_home() {
        let cm = line(6);
        let d = DemandVector::unit(6);
        let mut s = state_of(&d, &[3, 4, 5, 1, 2]);
        let moves = or_opt_improve(&mut s, &cm).expect("valid");
        assert!(moves > 0);
        assert_eq!(s.total_cost(&cm), 10);
    }
}
