//! Relocate operator: move one stop to another position.
//!
//! # Algorithm
//!
//! For every stop, evaluate removing it from its route and reinserting it at
//! every position of every route, its own included. Cross-route targets must
//! have room for the stop's demand.
//!
//! ```text
//! delta = c(p, n) - c(p, s) - c(s, n)      removal between p and n
//!       + c(p', s) + c(s, n') - c(p', n')  insertion between p' and n'
//! ```
//!
//! # Complexity
//!
//! O(n²) per scan where n = number of stops.
//!
//! # Reference
//!
//! Or, I. (1976). "Traveling Salesman-Type Combinatorial Problems and Their
//! Relation to the Logistics of Blood Banking". PhD thesis.

use crate::distance::ArcCost;
use crate::error::Result;
use crate::evaluation::SolutionState;

use super::moves::{descend, node_at, node_before, Move, ScoredMove};

/// Applies best-improvement relocate moves until none reduces cost.
///
/// Returns the number of moves applied.
///
/// # Examples
///
/// ```
/// use u_fleet::distance::CostMatrix;
/// use u_fleet::evaluation::SolutionState;
/// use u_fleet::local_search::relocate_improve;
/// use u_fleet::models::DemandVector;
///
/// // Stops 1 and 2 sit together, stop 3 is far away on the other side.
/// let cm = CostMatrix::from_rows(vec![
///     vec![0, 10, 10, 10],
///     vec![10, 0, 1, 20],
///     vec![10, 1, 0, 20],
///     vec![10, 20, 20, 0],
/// ]).unwrap();
/// let demands = DemandVector::unit(4);
/// let mut state = SolutionState::new(&demands, 2, 3);
/// state.insert(0, 0, 1).unwrap();
/// state.insert(0, 1, 3).unwrap();
/// state.insert(1, 0, 2).unwrap();
/// let before = state.total_cost(&cm);
///
/// let moves = relocate_improve(&mut state, &cm).unwrap();
/// assert!(moves > 0);
/// assert!(state.total_cost(&cm) < before);
/// ```
pub fn relocate_improve<C: ArcCost + ?Sized>(
    state: &mut SolutionState<'_>,
    costs: &C,
) -> Result<usize> {
    descend(state, costs, find_best_relocate)
}

/// Finds the most improving relocate move, if any.
pub(crate) fn find_best_relocate<C: ArcCost + ?Sized>(
    state: &SolutionState<'_>,
    costs: &C,
) -> Option<ScoredMove> {
    let demands = state.demands();
    let tracker = state.tracker();
    let mut best: Option<ScoredMove> = None;

    for from_r in 0..state.num_routes() {
        let from = state.stops(from_r);
        for from_pos in 0..from.len() {
            let stop = from[from_pos];
            let removal = removal_delta(from, from_pos, costs);

            // Own route, evaluated on the route without the stop.
            for to_pos in 0..from.len() {
                if to_pos == from_pos {
                    continue;
                }
                let shifted = |k: usize| if k < from_pos { k } else { k + 1 };
                let prev = if to_pos == 0 {
                    node_before(from, 0)
                } else {
                    from[shifted(to_pos - 1)]
                };
                let next = node_at(from, shifted(to_pos));
                let delta = removal + insertion_delta(prev, next, stop, costs);
                ScoredMove::offer(
                    &mut best,
                    Move::Relocate {
                        from_route: from_r,
                        from_pos,
                        to_route: from_r,
                        to_pos,
                    },
                    delta,
                );
            }

            for to_r in 0..state.num_routes() {
                if to_r == from_r || !tracker.can_add(to_r, demands.get(stop)) {
                    continue;
                }
                let to = state.stops(to_r);
                for to_pos in 0..=to.len() {
                    let delta = removal
                        + insertion_delta(node_before(to, to_pos), node_at(to, to_pos), stop, costs);
                    ScoredMove::offer(
                        &mut best,
                        Move::Relocate {
                            from_route: from_r,
                            from_pos,
                            to_route: to_r,
                            to_pos,
                        },
                        delta,
                    );
                }
            }
        }
    }

    best
}

/// Cost change of removing the stop at `pos`.
fn removal_delta<C: ArcCost + ?Sized>(stops: &[usize], pos: usize, costs: &C) -> i64 {
    let prev = node_before(stops, pos);
    let next = node_at(stops, pos + 1);
    let s = stops[pos];
    costs.arc(prev, next) - costs.arc(prev, s) - costs.arc(s, next)
}

/// Cost change of inserting `stop` between `prev` and `next`.
#[inline]
pub(crate) fn insertion_delta<C: ArcCost + ?Sized>(
    prev: usize,
    next: usize,
    stop: usize,
    costs: &C,
) -> i64 {
    costs.arc(prev, stop) + costs.arc(stop, next) - costs.arc(prev, next)
}
