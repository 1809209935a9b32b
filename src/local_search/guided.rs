//! Guided local search over all neighborhoods under a wall-clock budget.
//!
//! # Algorithm
//!
//! 1. Descend: repeatedly apply the best improving move over relocate, swap,
//!    2-opt, or-opt and 2-opt* on the augmented cost until none improves.
//! 2. At the local optimum, raise the penalty of the solution arcs with the
//!    highest utility `cost / (1 + penalty)`.
//! 3. Repeat from the current solution until the budget elapses, the optional
//!    cycle cap is reached, or no arc is left to penalize.
//!
//! The best solution by raw cost is kept throughout. The deadline is checked
//! before every move and every cycle, never in the middle of one.
//!
//! # Reference
//!
//! Voudouris, C. & Tsang, E. (1999). "Guided local search and its application
//! to the traveling salesman problem", *European Journal of Operational
//! Research* 113(2), 469-499.

use std::time::{Duration, Instant};

use crate::distance::{ArcCost, CostMatrix};
use crate::error::Result;
use crate::evaluation::SolutionState;
use crate::models::Solution;

use super::moves::ScoredMove;
use super::or_opt::find_best_or_opt;
use super::penalty::{AugmentedCost, EdgePenalties};
use super::relocate::find_best_relocate;
use super::swap::find_best_swap;
use super::two_opt::find_best_two_opt;
use super::two_opt_star::find_best_two_opt_star;

/// Guided local search parameters.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use u_fleet::local_search::GlsConfig;
///
/// let config = GlsConfig::default()
///     .with_time_budget(Duration::from_millis(200))
///     .with_max_cycles(50);
/// assert_eq!(config.max_cycles, Some(50));
/// assert!((config.lambda_coefficient - 0.1).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct GlsConfig {
    /// Wall-clock budget for one improvement run.
    pub time_budget: Duration,
    /// λ as a fraction of the initial solution's average arc cost.
    pub lambda_coefficient: f64,
    /// Stop after this many penalization cycles, if set.
    pub max_cycles: Option<usize>,
}

impl Default for GlsConfig {
    fn default() -> Self {
        Self {
            time_budget: Duration::from_secs(5),
            lambda_coefficient: 0.1,
            max_cycles: None,
        }
    }
}

impl GlsConfig {
    /// Sets the wall-clock budget.
    pub fn with_time_budget(mut self, budget: Duration) -> Self {
        self.time_budget = budget;
        self
    }

    /// Sets the λ coefficient.
    pub fn with_lambda_coefficient(mut self, coefficient: f64) -> Self {
        self.lambda_coefficient = coefficient;
        self
    }

    /// Caps the number of penalization cycles.
    pub fn with_max_cycles(mut self, cycles: usize) -> Self {
        self.max_cycles = Some(cycles);
        self
    }
}

/// Result of one guided local search run.
#[derive(Debug, Clone)]
pub struct GlsOutcome {
    /// Best solution found, by raw cost.
    pub solution: Solution,
    /// Raw cost of `solution`.
    pub cost: i64,
    /// Raw cost of the starting solution.
    pub initial_cost: i64,
    /// Completed descent cycles.
    pub cycles: usize,
    /// Moves applied across all cycles.
    pub moves: usize,
    /// Wall-clock time spent.
    pub elapsed: Duration,
    /// `true` if the budget ran out before another stopping rule applied.
    pub timed_out: bool,
}

/// Guided local search driver.
///
/// Deterministic for a given input: moves are chosen by best improvement with
/// fixed tie-breaking and no randomness, so runs that stop on `max_cycles`
/// (rather than the clock) always produce the same solution.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use u_fleet::constructive::cheapest_insertion;
/// use u_fleet::distance::ScaledEuclidean;
/// use u_fleet::local_search::{GlsConfig, GuidedLocalSearch};
/// use u_fleet::models::{Instance, Location};
///
/// let locations = vec![
///     Location::new(0.0, 0.0),
///     Location::new(1.0, 0.0),
///     Location::new(2.0, 1.0),
///     Location::new(0.0, 2.0),
///     Location::new(-1.0, 1.0),
/// ];
/// let instance = Instance::from_locations(&locations, &ScaledEuclidean::new(100.0));
/// let state = cheapest_insertion(&instance, 2, 2).unwrap();
/// let initial = state.total_cost(instance.costs());
///
/// let gls = GuidedLocalSearch::new(
///     GlsConfig::default()
///         .with_time_budget(Duration::from_secs(10))
///         .with_max_cycles(20),
/// );
/// let outcome = gls.improve(state, instance.costs()).unwrap();
/// assert!(outcome.cost <= initial);
/// assert_eq!(outcome.solution.num_served(), 4);
/// ```
#[derive(Debug, Clone, Default)]
pub struct GuidedLocalSearch {
    config: GlsConfig,
}

impl GuidedLocalSearch {
    /// Creates a driver with the given parameters.
    pub fn new(config: GlsConfig) -> Self {
        Self { config }
    }

    /// Parameters in use.
    pub fn config(&self) -> &GlsConfig {
        &self.config
    }

    /// Improves `state`, returning the best solution seen.
    ///
    /// The result never costs more than the input. If the budget is zero the
    /// input comes back unchanged.
    ///
    /// # Errors
    ///
    /// [`FleetError::InvariantViolation`](crate::FleetError::InvariantViolation)
    /// if a move breaks coverage or capacity, which indicates a bug in an operator.
    pub fn improve(&self, mut state: SolutionState<'_>, costs: &CostMatrix) -> Result<GlsOutcome> {
        let start = Instant::now();
        let deadline = start + self.config.time_budget;

        let initial_cost = state.total_cost(costs);
        let lambda = penalty_weight(self.config.lambda_coefficient, initial_cost, state.solution());
        let mut penalties = EdgePenalties::new(costs.size());
        let mut best = state.solution().clone();
        let mut best_cost = initial_cost;
        let mut cycles = 0;
        let mut moves = 0;
        let mut timed_out = false;

        'search: loop {
            if Instant::now() >= deadline {
                timed_out = true;
                break;
            }
            if self.config.max_cycles.is_some_and(|max| cycles >= max) {
                break;
            }

            loop {
                if Instant::now() >= deadline {
                    timed_out = true;
                    break 'search;
                }
                let augmented = AugmentedCost::new(costs, &penalties, lambda);
                let Some(step) = find_best_move(&state, &augmented) else {
                    break;
                };
                step.mv.apply(&mut state)?;
                moves += 1;
                let cost = state.total_cost(costs);
                if cost < best_cost {
                    best_cost = cost;
                    best = state.solution().clone();
                }
            }

            cycles += 1;
            let penalized = penalties.penalize(state.solution(), costs);
            tracing::debug!(
                cycle = cycles,
                current = state.total_cost(costs),
                best = best_cost,
                penalized,
                "gls cycle complete"
            );
            if penalized == 0 {
                break;
            }
        }

        state.verify()?;
        best.validate(state.demands(), state.capacity())?;

        Ok(GlsOutcome {
            solution: best,
            cost: best_cost,
            initial_cost,
            cycles,
            moves,
            elapsed: start.elapsed(),
            timed_out,
        })
    }
}

/// Best improving move over every neighborhood.
///
/// On equal deltas the earlier neighborhood in the scan order wins.
pub(crate) fn find_best_move<C: ArcCost + ?Sized>(
    state: &SolutionState<'_>,
    costs: &C,
) -> Option<ScoredMove> {
    let candidates = [
        find_best_relocate(state, costs),
        find_best_swap(state, costs),
        find_best_two_opt(state, costs),
        find_best_or_opt(state, costs),
        find_best_two_opt_star(state, costs),
    ];
    let mut best: Option<ScoredMove> = None;
    for found in candidates.into_iter().flatten() {
        if best.as_ref().is_none_or(|b| found.delta < b.delta) {
            best = Some(found);
        }
    }
    best
}

/// `λ = max(1, round(coefficient × average arc cost))` over the arcs of `solution`.
fn penalty_weight(coefficient: f64, cost: i64, solution: &Solution) -> i64 {
    let arcs: usize = solution
        .routes()
        .iter()
        .filter(|r| !r.is_empty())
        .map(|r| r.len() + 1)
        .sum();
    if arcs == 0 {
        return 1;
    }
    let lambda = (coefficient * cost as f64 / arcs as f64).round();
    if lambda.is_finite() && lambda >= 1.0 {
        lambda as i64
    } else {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DemandVector, Route};

    fn square() -> CostMatrix {
        // Depot at the centre, four corners.
        CostMatrix::from_rows(vec![
            vec![0, 7, 7, 7, 7],
            vec![7, 0, 10, 10, 14],
            vec![7, 10, 0, 14, 10],
            vec![7, 10, 14, 0, 10],
            vec![7, 14, 10, 10, 0],
        ])
        .expect("valid")
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

    fn bounded() -> GuidedLocalSearch {
        GuidedLocalSearch::new(
            GlsConfig::default()
                .with_time_budget(Duration::from_secs(30))
                .with_max_cycles(25),
        )
    }

    #[test]
    fn test_penalty_weight() {
        let sol = Solution::from_routes(vec![Route::with_stops(0, vec![1, 2]), Route::new(1)]);
        // Three arcs, cost 300, coefficient 0.1 -> 10.
        assert_eq!(penalty_weight(0.1, 300, &sol), 10);
        assert_eq!(penalty_weight(0.1, 3, &sol), 1);
        assert_eq!(penalty_weight(0.1, 0, &Solution::new(2)), 1);
    }

    #[test]
    fn test_zero_budget_returns_input() {
        let cm = square();
        let d = DemandVector::unit(5);
        let s = state_of(&d, &[&[1, 4, 2, 3]], 4);
        let input = s.solution().clone();
        let gls = GuidedLocalSearch::new(GlsConfig::default().with_time_budget(Duration::ZERO));
        let out = gls.improve(s, &cm).expect("valid");
        assert_eq!(out.solution, input);
        assert_eq!(out.cost, out.initial_cost);
        assert!(out.timed_out);
        assert_eq!(out.moves, 0);
    }

    #[test]
    fn test_improves_crossing_tour() {
        let cm = square();
        let d = DemandVector::unit(5);
        let s = state_of(&d, &[&[1, 4, 2, 3]], 4);
        let out = bounded().improve(s, &cm).expect("valid");
        assert!(out.cost < out.initial_cost);
        assert_eq!(out.cost, 7 + 10 + 10 + 10 + 7);
        assert_eq!(out.cost, out.solution.total_cost(&cm));
        assert!(out.solution.validate(&d, 4).is_ok());
    }

    #[test]
    fn test_respects_capacity_across_cycles() {
        let cm = square();
        let d = DemandVector::unit(5);
        let s = state_of(&d, &[&[1, 4], &[2, 3]], 2);
        let out = bounded().improve(s, &cm).expect("valid");
        assert!(out.solution.validate(&d, 2).is_ok());
        assert!(out.cost <= out.initial_cost);
        assert!(out.cycles <= 25);
    }

    #[test]
    fn test_deterministic_with_cycle_cap() {
        let cm = square();
        let d = DemandVector::unit(5);
        let a = bounded()
            .improve(state_of(&d, &[&[3, 1], &[4, 2]], 3), &cm)
            .expect("valid");
        let b = bounded()
            .improve(state_of(&d, &[&[3, 1], &[4, 2]], 3), &cm)
            .expect("valid");
        assert_eq!(a.solution, b.solution);
        assert_eq!(a.cycles, b.cycles);
        assert_eq!(a.moves, b.moves);
    }

    #[test]
    fn test_empty_solution_stops_immediately() {
        let cm = CostMatrix::new(1);
        let d = DemandVector::unit(1);
        let s = SolutionState::new(&d, 3, 5);
        let out = bounded().improve(s, &cm).expect("valid");
        assert_eq!(out.cost, 0);
        assert_eq!(out.cycles, 1);
        assert!(!out.timed_out);
    }

    #[test]
    fn test_find_best_move_prefers_larger_gain() {
        let cm = square();
        let d = DemandVector::unit(5);
        let s = state_of(&d, &[&[1, 4, 2, 3]], 4);
        let best = find_best_move(&s, &cm).expect("improving");
        for found in [
            find_best_relocate(&s, &cm),
            find_best_swap(&s, &cm),
            find_best_two_opt(&s, &cm),
            find_best_or_opt(&s, &cm),
            find_best_two_opt_star(&s, &cm),
        ]
        .into_iter()
        .flatten()
        {
            assert!(best.delta <= found.delta);
        }
    }
}
