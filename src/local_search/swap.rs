//! Swap operator: exchange the positions of two stops.
//!
//! # Algorithm
//!
//! Every unordered pair of stops is considered, on the same route or across
//! routes. For stops that are not adjacent, each stop takes the other's
//! neighbors:
//!
//! ```text
//! delta = [c(pa, b) + c(b, na) - c(pa, a) - c(a, na)]
//!       + [c(pb, a) + c(a, nb) - c(pb, b) - c(b, nb)]
//! ```
//!
//! Adjacent stops on one route are handled as `p -> a -> b -> n` becoming
//! `p -> b -> a -> n`. Cross-route swaps must fit both vehicles.
//!
//! # Complexity
//!
//! O(n²) per scan where n = number of stops.

use crate::distance::ArcCost;
use crate::error::Result;
use crate::evaluation::SolutionState;

use super::moves::{descend, node_at, node_before, Move, ScoredMove};

/// Applies best-improvement swap moves until none reduces cost.
///
/// Returns the number of moves applied.
pub fn swap_improve<C: ArcCost + ?Sized>(state: &mut SolutionState<'_>, costs: &C) -> Result<usize> {
    descend(state, costs, find_best_swap)
}

/// Finds the most improving swap move, if any.
pub(crate) fn find_best_swap<C: ArcCost + ?Sized>(
    state: &SolutionState<'_>,
    costs: &C,
) -> Option<ScoredMove> {
    let demands = state.demands();
    let tracker = state.tracker();
    let mut best: Option<ScoredMove> = None;

    for ra in 0..state.num_routes() {
        let sa = state.stops(ra);
        for pa in 0..sa.len() {
            let a = sa[pa];
            for rb in ra..state.num_routes() {
                let sb = state.stops(rb);
                let first_b = if rb == ra { pa + 1 } else { 0 };
                for pb in first_b..sb.len() {
                    let b = sb[pb];
                    let delta = if rb == ra {
                        intra_delta(sa, pa, pb, costs)
                    } else {
                        let (da, db) = (demands.get(a), demands.get(b));
                        if !(tracker.fits(ra, da, db) && tracker.fits(rb, db, da)) {
                            continue;
                        }
                        replace_delta(sa, pa, b, costs) + replace_delta(sb, pb, a, costs)
                    };
                    ScoredMove::offer(
                        &mut best,
                        Move::Swap {
                            route_a: ra,
                            pos_a: pa,
                            route_b: rb,
                            pos_b: pb,
                        },
                        delta,
                    );
                }
            }
        }
    }

    best
}

/// Cost change of putting `with` in place of the stop at `pos`.
fn replace_delta<C: ArcCost + ?Sized>(stops: &[usize], pos: usize, with: usize, costs: &C) -> i64 {
    let prev = node_before(stops, pos);
    let next = node_at(stops, pos + 1);
    let old = stops[pos];
    costs.arc(prev, with) + costs.arc(with, next) - costs.arc(prev, old) - costs.arc(old, next)
}

/// Cost change of swapping positions `pa < pb` on one route.
fn intra_delta<C: ArcCost + ?Sized>(stops: &[usize], pa: usize, pb: usize, costs: &C) -> i64 {
    if pb == pa + 1 {
        let prev = node_before(stops, pa);
        let next = node_at(stops, pb + 1);
        let (a, b) = (stops[pa], stops[pb]);
        costs.arc(prev, b) + costs.arc(b, a) + costs.arc(a, next)
            - costs.arc(prev, a)
            - costs.arc(a, b)
            - costs.arc(b, next)
    } else {
        replace_delta(stops, pa, stops[pb], costs) + replace_delta(stops, pb, stops[pa], costs)
    }
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

    fn state_of<'a>(d: &'a DemandVector, routes: &[&[usize]], cap: i64) -> SolutionState<'a> {
        let mut s = SolutionState::new(d, routes.len(), cap);
        for (r, stops) in routes.iter().enumerate() {
            for (pos, &stop) in stops.iter().enumerate() {
                s.insert(r, pos, stop).expect("fits");
            }
        }
        s
    }

    #[test]
    fn test_adjacent_delta_matches_recomputation() {
        let cm = line(5);
        let d = DemandVector::unit(5);
        let mut s = state_of(&d, &[&[2, 1, 3, 4]], 4);
        let before = s.total_cost(&cm);
        let delta = intra_delta(s.stops(0), 0, 1, &cm);
        s.swap(0, 0, 0, 1).expect("valid");
        assert_eq!(s.total_cost(&cm) - before, delta);
    }

    #[test]
    fn test_distant_delta_matches_recomputation() {
        let cm = line(6);
        let d = DemandVector::unit(6);
        let mut s = state_of(&d, &[&[5, 2, 3, 1, 4]], 5);
        let before = s.total_cost(&cm);
        let delta = intra_delta(s.stops(0), 0, 3, &cm);
        s.swap(0, 0, 0, 3).expect("valid");
        assert_eq!(s.total_cost(&cm) - before, delta);
    }

    #[test]
    fn test_swap_across_routes_improves() {
        // Route 0 serves the far stop 4 with the near stop 1; route 1 the reverse.
        let cm = line(5);
        let d = DemandVector::unit(5);
        let mut s = state_of(&d, &[&[1, 4], &[3, 2]], 2);
        let before = s.total_cost(&cm);
        let moves = swap_improve(&mut s, &cm).expect("valid");
        assert!(moves > 0);
        assert!(s.total_cost(&cm) < before);
        assert!(s.verify().is_ok());
    }

    #[test]
    fn test_swap_blocked_by_capacity() {
        // Pairing 3 with 4 is the only improving swap and needs room for 4 units.
        let cm = line(5);
        let d = DemandVector::from_vec(vec![0, 1, 1, 2, 2]).expect("valid");

        let tight = state_of(&d, &[&[1, 4], &[3, 2]], 3);
        assert!(find_best_swap(&tight, &cm).is_none());

        let loose = state_of(&d, &[&[1, 4], &[3, 2]], 4);
        let best = find_best_swap(&loose, &cm).expect("improving swap");
        assert_eq!(best.delta, -2);
        assert_eq!(
            best.mv,
            Move::Swap { route_a: 0, pos_a: 0, route_b: 1, pos_b: 0 }
        );
    }
}
