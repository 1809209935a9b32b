//! Inter-route tail exchange (2-opt*).
//!
//! # Algorithm
//!
//! Given routes A = [a₁, ..., aᵢ, aᵢ₊₁, ..., aₙ] and
//! B = [b₁, ..., bⱼ, bⱼ₊₁, ..., bₘ], produce:
//!
//! A' = [a₁, ..., aᵢ, bⱼ₊₁, ..., bₘ]
//! B' = [b₁, ..., bⱼ, aᵢ₊₁, ..., aₙ]
//!
//! Cuts range over `0..=len` on both routes, so whole tails can move onto an
//! empty vehicle. Loads are checked with prefix sums.
//!
//! ```text
//! delta = c(aᵢ, bⱼ₊₁) + c(bⱼ, aᵢ₊₁) - c(aᵢ, aᵢ₊₁) - c(bⱼ, bⱼ₊₁)
//! ```
//!
//! # Complexity
//!
//! O(n² × R²) per scan, where n = stops per route and R = number of routes.
//!
//! # Reference
//!
//! Potvin, J.-Y. & Rousseau, J.-M. (1995). "An Exchange Heuristic for
//! Routeing Problems with Time Windows", *Journal of the Operational Research
//! Society* 46(12), 1433-1446.

use crate::distance::ArcCost;
use crate::error::Result;
use crate::evaluation::SolutionState;
use crate::models::DemandVector;

use super::moves::{descend, node_at, node_before, Move, ScoredMove};

/// Applies best-improvement tail exchanges until none reduces cost.
///
/// Returns the number of moves applied.
///
/// # Examples
///
/// ```
/// use u_fleet::distance::CostMatrix;
/// use u_fleet::evaluation::SolutionState;
/// use u_fleet::local_search::two_opt_star_improve;
/// use u_fleet::models::DemandVector;
///
/// // Stops 1, 2 lie east of the depot, stops 3, 4 lie west.
/// let cm = CostMatrix::from_rows(vec![
///     vec![0, 1, 2, 1, 2],
///     vec![1, 0, 1, 2, 3],
///     vec![2, 1, 0, 3, 4],
///     vec![1, 2, 3, 0, 1],
///     vec![2, 3, 4, 1, 0],
/// ]).unwrap();
/// let demands = DemandVector::unit(5);
/// let mut state = SolutionState::new(&demands, 2, 2);
/// state.insert(0, 0, 1).unwrap();
/// state.insert(0, 1, 4).unwrap();
/// state.insert(1, 0, 3).unwrap();
/// state.insert(1, 1, 2).unwrap();
///
/// two_opt_star_improve(&mut state, &cm).unwrap();
/// assert_eq!(state.total_cost(&cm), 8);
/// ```
pub fn two_opt_star_improve<C: ArcCost + ?Sized>(
    state: &mut SolutionState<'_>,
    costs: &C,
) -> Result<usize> {
    descend(state, costs, find_best_two_opt_star)
}

/// Finds the most improving tail exchange over all route pairs, if any.
pub(crate) fn find_best_two_opt_star<C: ArcCost + ?Sized>(
    state: &SolutionState<'_>,
    costs: &C,
) -> Option<ScoredMove> {
    let demands = state.demands();
    let capacity = state.capacity();
    let prefixes: Vec<Vec<i64>> = (0..state.num_routes())
        .map(|r| prefix_loads(state.stops(r), demands))
        .collect();
    let mut best: Option<ScoredMove> = None;

    for ra in 0..state.num_routes() {
        let a = state.stops(ra);
        let pa = &prefixes[ra];
        let load_a = pa[a.len()];
        for rb in ra + 1..state.num_routes() {
            let b = state.stops(rb);
            if a.is_empty() && b.is_empty() {
                continue;
            }
            let pb = &prefixes[rb];
            let load_b = pb[b.len()];
            for cut_a in 0..=a.len() {
                let prev_a = node_before(a, cut_a);
                let next_a = node_at(a, cut_a);
                let tail_a = load_a - pa[cut_a];
                for cut_b in 0..=b.len() {
                    // Both trivial ends swap whole routes or nothing.
                    if (cut_a == 0 && cut_b == 0) || (cut_a == a.len() && cut_b == b.len()) {
                        continue;
                    }
                    let tail_b = load_b - pb[cut_b];
                    if pa[cut_a] + tail_b > capacity || pb[cut_b] + tail_a > capacity {
                        continue;
                    }
                    let prev_b = node_before(b, cut_b);
                    let next_b = node_at(b, cut_b);
                    let delta = costs.arc(prev_a, next_b) + costs.arc(prev_b, next_a)
                        - costs.arc(prev_a, next_a)
                        - costs.arc(prev_b, next_b);
                    ScoredMove::offer(
                        &mut best,
                        Move::TwoOptStar {
                            route_a: ra,
                            cut_a,
                            route_b: rb,
                            cut_b,
                        },
                        delta,
                    );
                }
            }
        }
    }

    best
}

/// `prefix[k]` is the load of the first `k` stops.
fn prefix_loads(stops: &[usize], demands: &DemandVector) -> Vec<i64> {
    let mut prefix = Vec::with_capacity(stops.len() + 1);
    prefix.push(0);
    let mut acc = 0;
    for &s in stops {
        acc += demands.get(s);
        prefix.push(acc);
    }
    prefix
}
