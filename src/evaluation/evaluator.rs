//! CVRP evaluator: construction followed by guided local search.

use serde::Serialize;
use tracing::{debug, error};

use crate::constructive::FirstSolutionStrategy;
use crate::error::{FleetError, Result};
use crate::local_search::{GlsConfig, GuidedLocalSearch};
use crate::models::{Instance, Solution};

/// Best solution found for one `(fleet_size, capacity)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoutingPlan {
    /// The improved solution.
    pub solution: Solution,
    /// Sum of route costs of `solution`; empty routes contribute 0.
    pub total_distance: i64,
    /// Cost of the constructed solution before local search.
    pub construction_distance: i64,
    /// Guided local search cycles completed.
    pub cycles: usize,
}

/// Outcome of evaluating one configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Evaluation {
    /// A feasible plan was found.
    Feasible(RoutingPlan),
    /// No feasible solution could be constructed.
    Infeasible,
}

impl Evaluation {
    /// Total distance, or `None` when infeasible.
    pub fn total_distance(&self) -> Option<i64> {
        match self {
            Evaluation::Feasible(plan) => Some(plan.total_distance),
            Evaluation::Infeasible => None,
        }
    }

    /// `true` if a plan was found.
    pub fn is_feasible(&self) -> bool {
        matches!(self, Evaluation::Feasible(_))
    }

    /// The plan, if any.
    pub fn plan(&self) -> Option<&RoutingPlan> {
        match self {
            Evaluation::Feasible(plan) => Some(plan),
            Evaluation::Infeasible => None,
        }
    }

    /// Consumes the evaluation, returning the plan if any.
    pub fn into_plan(self) -> Option<RoutingPlan> {
        match self {
            Evaluation::Feasible(plan) => Some(plan),
            Evaluation::Infeasible => None,
        }
    }
}

/// Scores a `(fleet_size, capacity)` pair by the total distance of the best
/// plan found within the local search budget.
///
/// The instance is borrowed read-only, so one evaluator can serve many trials
/// concurrently.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use u_fleet::distance::ScaledEuclidean;
/// use u_fleet::evaluation::CvrpEvaluator;
/// use u_fleet::local_search::GlsConfig;
/// use u_fleet::models::{Instance, Location};
///
/// let locations = vec![
///     Location::new(0.0, 0.0),
///     Location::new(1.0, 0.0),
///     Location::new(0.0, 1.0),
///     Location::new(-1.0, 0.0),
/// ];
/// let instance = Instance::from_locations(&locations, &ScaledEuclidean::new(100.0));
/// let evaluator = CvrpEvaluator::new(&instance).with_config(
///     GlsConfig::default()
///         .with_time_budget(Duration::from_secs(5))
///         .with_max_cycles(10),
/// );
///
/// let feasible = evaluator.evaluate(2, 2).unwrap();
/// assert!(feasible.total_distance().is_some());
///
/// let infeasible = evaluator.evaluate(1, 2).unwrap();
/// assert_eq!(infeasible.total_distance(), None);
/// ```
#[derive(Debug, Clone)]
pub struct CvrpEvaluator<'a> {
    instance: &'a Instance,
    gls: GuidedLocalSearch,
    strategy: FirstSolutionStrategy,
}

impl<'a> CvrpEvaluator<'a> {
    /// Creates an evaluator with the default budget and strategy.
    pub fn new(instance: &'a Instance) -> Self {
        Self {
            instance,
            gls: GuidedLocalSearch::default(),
            strategy: FirstSolutionStrategy::default(),
        }
    }

    /// Sets the local search parameters.
    pub fn with_config(mut self, config: GlsConfig) -> Self {
        self.gls = GuidedLocalSearch::new(config);
        self
    }

    /// Sets the first-solution strategy.
    pub fn with_strategy(mut self, strategy: FirstSolutionStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// The instance being evaluated.
    pub fn instance(&self) -> &'a Instance {
        self.instance
    }

    /// Local search parameters in use.
    pub fn config(&self) -> &GlsConfig {
        self.gls.config()
    }

    /// First-solution strategy in use.
    pub fn strategy(&self) -> FirstSolutionStrategy {
        self.strategy
    }

    /// Evaluates one configuration.
    ///
    /// Construction failure is reported as [`Evaluation::Infeasible`], not as
    /// an error.
    ///
    /// # Errors
    ///
    /// [`FleetError::InvariantViolation`] if the improved solution breaks
    /// coverage or capacity, or costs more than the constructed one.
    #[tracing::instrument(level = "debug", skip(self), fields(strategy = self.strategy.name()))]
    pub fn evaluate(&self, fleet_size: usize, capacity: i64) -> Result<Evaluation> {
        let costs = self.instance.costs();
        let state = match self.strategy.construct(self.instance, fleet_size, capacity) {
            Ok(state) => state,
            Err(FleetError::ConstructionInfeasible { unrouted, .. }) => {
                debug!(unrouted, "construction infeasible");
                return Ok(Evaluation::Infeasible);
            }
            Err(e) => return Err(e),
        };

        let construction_distance = state.total_cost(costs);
        let outcome = self.gls.improve(state, costs).inspect_err(|e| {
            error!(error = %e, "local search left an invalid solution");
        })?;

        if outcome.cost > construction_distance {
            let err = FleetError::InvariantViolation(format!(
                "local search returned {} above construction cost {construction_distance}",
                outcome.cost
            ));
            error!(error = %err, "local search worsened the solution");
            return Err(err);
        }

        debug!(
            construction = construction_distance,
            improved = outcome.cost,
            cycles = outcome.cycles,
            moves = outcome.moves,
            timed_out = outcome.timed_out,
            "evaluation complete"
        );

        Ok(Evaluation::Feasible(RoutingPlan {
            solution: outcome.solution,
            total_distance: outcome.cost,
            construction_distance,
            cycles: outcome.cycles,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::{CostMatrix, ScaledEuclidean};
    use crate::models::Location;
    use std::time::Duration;

    fn bounded() -> GlsConfig {
        GlsConfig::default()
            .with_time_budget(Duration::from_secs(30))
            .with_max_cycles(20)
    }

    fn ring() -> Instance {
        let locations = vec![
            Location::new(0.0, 0.0),
            Location::new(1.0, 0.0),
            Location::new(1.0, 1.0),
            Location::new(0.0, 1.0),
            Location::new(-1.0, 1.0),
            Location::new(-1.0, 0.0),
        ];
        Instance::from_locations(&locations, &ScaledEuclidean::new(1000.0))
    }

    #[test]
    fn test_infeasible_is_not_an_error() {
        let inst = ring();
        let eval = CvrpEvaluator::new(&inst).with_config(bounded());
        assert_eq!(eval.evaluate(1, 2).expect("no error"), Evaluation::Infeasible);
        assert_eq!(eval.evaluate(0, 10).expect("no error"), Evaluation::Infeasible);
    }

    #[test]
    fn test_feasible_plan_is_valid() {
        let inst = ring();
        let eval = CvrpEvaluator::new(&inst).with_config(bounded());
        let plan = eval.evaluate(3, 2).expect("valid").into_plan().expect("feasible");
        assert!(plan.solution.validate(inst.demands(), 2).is_ok());
        assert!(plan.total_distance <= plan.construction_distance);
        assert_eq!(plan.total_distance, plan.solution.total_cost(inst.costs()));
        assert_eq!(plan.solution.num_routes(), 3);
    }

    #[test]
    fn test_both_strategies() {
        let inst = ring();
        for strategy in [
            FirstSolutionStrategy::CheapestInsertion,
            FirstSolutionStrategy::PathCheapestArc,
        ] {
            let eval = CvrpEvaluator::new(&inst)
                .with_config(bounded())
                .with_strategy(strategy);
            assert_eq!(eval.strategy(), strategy);
            let result = eval.evaluate(2, 3).expect("valid");
            assert!(result.is_feasible());
        }
    }

    #[test]
    fn test_deterministic_with_cycle_cap() {
        let inst = ring();
        let eval = CvrpEvaluator::new(&inst).with_config(bounded());
        assert_eq!(eval.evaluate(2, 5).expect("valid"), eval.evaluate(2, 5).expect("valid"));
    }

    #[test]
    fn test_depot_only_costs_zero() {
        let inst = Instance::with_unit_demand(CostMatrix::new(1));
        let eval = CvrpEvaluator::new(&inst).with_config(bounded());
        for fleet in 1..4 {
            assert_eq!(eval.evaluate(fleet, 1).expect("valid").total_distance(), Some(0));
        }
    }
}
