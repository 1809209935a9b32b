//! Arc penalties and the augmented cost used by guided local search.
//!
//! Each directed arc `(i, j)` is a feature. Its penalty counts how many times
//! it was judged the most expensive feature of a local optimum. The search
//! then evaluates moves on
//!
//! ```text
//! augmented(i, j) = cost(i, j) + λ · penalty(i, j)
//! ```
//!
//! while the best solution is still tracked by raw cost.

use std::cmp::Ordering;

use crate::distance::{ArcCost, CostMatrix};
use crate::models::Solution;

/// Dense row-major penalty counts for every directed arc.
///
/// Increments saturate instead of overflowing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgePenalties {
    data: Vec<u32>,
    size: usize,
}

impl EdgePenalties {
    /// All-zero penalties for `size` locations.
    pub fn new(size: usize) -> Self {
        Self {
            data: vec![0; size * size],
            size,
        }
    }

    /// Penalty count of arc `(from, to)`.
    #[inline]
    pub fn get(&self, from: usize, to: usize) -> u32 {
        self.data[from * self.size + to]
    }

    /// Adds one to the penalty of arc `(from, to)`.
    #[inline]
    pub fn increment(&mut self, from: usize, to: usize) {
        let p = &mut self.data[from * self.size + to];
        *p = p.saturating_add(1);
    }

    /// Sum of all penalty counts.
    pub fn total(&self) -> u64 {
        self.data.iter().map(|&p| u64::from(p)).sum()
    }

    /// Raises the penalty of every arc of `solution` whose utility
    /// `cost / (1 + penalty)` is maximal.
    ///
    /// Zero-cost arcs carry no utility and are never penalized. Returns the
    /// number of arcs penalized; 0 means there was nothing left to penalize.
    pub fn penalize(&mut self, solution: &Solution, costs: &CostMatrix) -> usize {
        let mut top: Vec<(usize, usize)> = Vec::new();
        let mut top_cost = 0i64;
        let mut top_penalty = 0u32;

        for route in solution.routes().iter().filter(|r| !r.is_empty()) {
            let seq = route.sequence();
            for arc in seq.windows(2) {
                let (from, to) = (arc[0], arc[1]);
                let cost = costs.get(from, to);
                if cost <= 0 {
                    continue;
                }
                let penalty = self.get(from, to);
                let ord = if top.is_empty() {
                    Ordering::Greater
                } else {
                    compare_utility(cost, penalty, top_cost, top_penalty)
                };
                match ord {
                    Ordering::Greater => {
                        top.clear();
                        top.push((from, to));
                        top_cost = cost;
                        top_penalty = penalty;
                    }
                    Ordering::Equal => {
                        if !top.contains(&(from, to)) {
                            top.push((from, to));
                        }
                    }
                    Ordering::Less => {}
                }
            }
        }

        for &(from, to) in &top {
            self.increment(from, to);
        }
        top.len()
    }
}

/// Compares `c1 / (1 + p1)` with `c2 / (1 + p2)` without rounding.
fn compare_utility(c1: i64, p1: u32, c2: i64, p2: u32) -> Ordering {
    let lhs = i128::from(c1) * (1 + i128::from(p2));
    let rhs = i128::from(c2) * (1 + i128::from(p1));
    lhs.cmp(&rhs)
}

/// Raw arc cost plus `lambda` times the arc's penalty.
#[derive(Debug, Clone, Copy)]
pub struct AugmentedCost<'a> {
    costs: &'a CostMatrix,
    penalties: &'a EdgePenalties,
    lambda: i64,
}

impl<'a> AugmentedCost<'a> {
    /// Wraps `costs` with the current `penalties`.
    pub fn new(costs: &'a CostMatrix, penalties: &'a EdgePenalties, lambda: i64) -> Self {
        Self {
            costs,
            penalties,
            lambda,
        }
    }

    /// Penalty weight.
    pub fn lambda(&self) -> i64 {
        self.lambda
    }
}

impl ArcCost for AugmentedCost<'_> {
    #[inline]
    fn arc(&self, from: usize, to: usize) -> i64 {
        self.costs
            .get(from, to)
            .saturating_add(self.lambda.saturating_mul(i64::from(self.penalties.get(from, to))))
    }
}
