//! Serde-readable search and problem configuration.
//!
//! Every field has a default, so a problem document only needs its
//! locations:
//!
//! ```json
//! {
//!   "locations": [{"x": 13.0418, "y": 80.2337}, {"x": 13.0067, "y": 80.2628}],
//!   "search": { "n_trials": 10, "sampler": "random" }
//! }
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;

use super::{GridSampler, RandomSampler, Sampler, SearchReport, SearchSpace, StopFlag, TpeSampler, TrialSearch};
use crate::constructive::FirstSolutionStrategy;
use crate::distance::{CostMatrixProvider, ScaledEuclidean};
use crate::error::{FleetError, Result};
use crate::evaluation::CvrpEvaluator;
use crate::local_search::GlsConfig;
use crate::models::{DemandVector, Instance, Location};

/// Settings of the per-trial solver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverSettings {
    /// Local search budget per trial, in milliseconds.
    pub time_budget_ms: u64,
    pub lambda_coefficient: f64,
    /// Caps guided local search cycles; makes evaluations deterministic.
    pub max_cycles: Option<usize>,
    pub first_solution: FirstSolutionStrategy,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            time_budget_ms: 5000,
            lambda_coefficient: 0.1,
            max_cycles: None,
            first_solution: FirstSolutionStrategy::default(),
        }
    }
}

impl SolverSettings {
    /// Converts to the local search parameters.
    pub fn to_gls_config(&self) -> GlsConfig {
        let config = GlsConfig::default()
            .with_time_budget(Duration::from_millis(self.time_budget_ms))
            .with_lambda_coefficient(self.lambda_coefficient);
        match self.max_cycles {
            Some(cycles) => config.with_max_cycles(cycles),
            None => config,
        }
    }
}

/// Which sampler drives the search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SamplerKind {
    #[default]
    Tpe,
    Random,
    Grid,
}

/// Bounds, trial count and solver settings of one search.
///
/// # Examples
///
/// ```
/// use u_fleet::search::{SamplerKind, SearchConfig};
///
/// let config: SearchConfig = serde_json::from_str(r#"{"max_fleet": 4, "sampler": "grid"}"#).unwrap();
/// assert_eq!(config.min_fleet, 2);
/// assert_eq!(config.max_fleet, 4);
/// assert_eq!(config.n_trials, 20);
/// assert_eq!(config.sampler, SamplerKind::Grid);
/// assert_eq!(config.solver.time_budget_ms, 5000);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub min_fleet: usize,
    pub max_fleet: usize,
    pub min_capacity: i64,
    pub max_capacity: i64,
    pub n_trials: usize,
    pub seed: u64,
    pub sampler: SamplerKind,
    /// Worker threads; values above 1 only matter for non-adaptive samplers.
    pub workers: usize,
    pub solver: SolverSettings,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            min_fleet: 2,
            max_fleet: 3,
            min_capacity: 40,
            max_capacity: 50,
            n_trials: 20,
            seed: 42,
            sampler: SamplerKind::default(),
            workers: 1,
            solver: SolverSettings::default(),
        }
    }
}

impl SearchConfig {
    /// Validated search space.
    pub fn space(&self) -> Result<SearchSpace> {
        SearchSpace::new(self.min_fleet, self.max_fleet, self.min_capacity, self.max_capacity)
    }
}

/// A problem document: locations, optional demands and search settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProblemConfig {
    /// Depot first, then the stops.
    pub locations: Vec<Location>,
    /// Demand per location, depot included. Unit demand when absent.
    #[serde(default)]
    pub demands: Option<Vec<i64>>,
    #[serde(default)]
    pub search: SearchConfig,
}

impl ProblemConfig {
    /// Parses a JSON problem document.
    ///
    /// # Errors
    ///
    /// [`FleetError::InvalidConfig`] on malformed JSON or missing locations.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| FleetError::InvalidConfig(e.to_string()))
    }

    /// Builds the instance with the default [`ScaledEuclidean`] provider.
    ///
    /// # Errors
    ///
    /// [`FleetError::InvalidDemand`] if the demands do not match the locations.
    pub fn instance(&self) -> Result<Instance> {
        self.instance_with(&ScaledEuclidean::default())
    }

    /// Builds the instance with a custom cost provider.
    pub fn instance_with<P: CostMatrixProvider + ?Sized>(&self, provider: &P) -> Result<Instance> {
        let costs = provider.compute(&self.locations);
        match &self.demands {
            Some(demands) => Instance::new(costs, DemandVector::from_vec(demands.clone())?),
            None => Ok(Instance::with_unit_demand(costs)),
        }
    }

    /// Runs the configured search.
    ///
    /// # Examples
    ///
    /// ```
    /// use u_fleet::search::{ProblemConfig, StopFlag};
    ///
    /// let json = r#"{
    ///     "locations": [{"x": 0.0, "y": 0.0}, {"x": 0.001, "y": 0.0}, {"x": 0.0, "y": 0.001}],
    ///     "search": {"min_fleet": 1, "max_fleet": 2, "min_capacity": 1, "max_capacity": 2,
    ///                "n_trials": 4, "sampler": "grid", "solver": {"max_cycles": 5}}
    /// }"#;
    /// let problem = ProblemConfig::from_json(json).unwrap();
    /// let report = problem.run(StopFlag::new()).unwrap();
    /// assert_eq!(report.history.len(), 4);
    /// assert!(report.best().is_some());
    /// ```
    pub fn run(&self, stop: StopFlag) -> Result<SearchReport> {
        let instance = self.instance()?;
        let space = self.search.space()?;
        let evaluator = CvrpEvaluator::new(&instance)
            .with_config(self.search.solver.to_gls_config())
            .with_strategy(self.search.solver.first_solution);
        info!(
            locations = instance.num_locations(),
            points = space.num_points(),
            trials = self.search.n_trials,
            sampler = ?self.search.sampler,
            "starting fleet search"
        );
        match self.search.sampler {
            SamplerKind::Tpe => self.run_with(&evaluator, &space, TpeSampler::default(), stop),
            SamplerKind::Random => self.run_with(&evaluator, &space, RandomSampler::new(), stop),
            SamplerKind::Grid => self.run_with(&evaluator, &space, GridSampler::new(), stop),
        }
    }

    fn run_with<S: Sampler>(
        &self,
        evaluator: &CvrpEvaluator<'_>,
        space: &SearchSpace,
        sampler: S,
        stop: StopFlag,
    ) -> Result<SearchReport> {
        let mut search = TrialSearch::new(evaluator, sampler)
            .with_seed(self.search.seed)
            .with_stop_flag(stop);
        if self.search.workers > 1 {
            search.run_parallel(space, self.search.n_trials, self.search.workers)
        } else {
            search.run(space, self.search.n_trials)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_search_block() {
        let p = ProblemConfig::from_json(r#"{"locations": [{"x": 0.0, "y": 0.0}]}"#).expect("valid");
        assert_eq!(p.search, SearchConfig::default());
        assert!(p.demands.is_none());
        assert_eq!(p.search.sampler, SamplerKind::Tpe);
    }

    #[test]
    fn test_missing_locations_rejected() {
        assert!(matches!(
            ProblemConfig::from_json(r#"{"search": {}}"#),
            Err(FleetError::InvalidConfig(_))
        ));
        assert!(ProblemConfig::from_json("not json").is_err());
    }

    #[test]
    fn test_demand_length_checked() {
        let p = ProblemConfig::from_json(
            r#"{"locations": [{"x": 0.0, "y": 0.0}, {"x": 1.0, "y": 0.0}], "demands": [0]}"#,
        )
        .expect("valid");
        assert!(matches!(p.instance(), Err(FleetError::InvalidDemand(_))));
    }

    #[test]
    fn test_explicit_demands_used() {
        let p = ProblemConfig::from_json(
            r#"{"locations": [{"x": 0.0, "y": 0.0}, {"x": 1.0, "y": 0.0}], "demands": [0, 7]}"#,
        )
        .expect("valid");
        let inst = p.instance().expect("valid");
        assert_eq!(inst.total_demand(), 7);
    }

    #[test]
    fn test_solver_settings_to_gls() {
        let s = SolverSettings {
            time_budget_ms: 250,
            lambda_coefficient: 0.3,
            max_cycles: Some(8),
            first_solution: FirstSolutionStrategy::PathCheapestArc,
        };
        let gls = s.to_gls_config();
        assert_eq!(gls.time_budget, Duration::from_millis(250));
        assert_eq!(gls.max_cycles, Some(8));
        assert!((gls.lambda_coefficient - 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_invalid_range_rejected_before_trials() {
        let p = ProblemConfig::from_json(
            r#"{"locations": [{"x": 0.0, "y": 0.0}], "search": {"min_fleet": 3, "max_fleet": 2}}"#,
        )
        .expect("valid");
        assert!(matches!(
            p.run(StopFlag::new()),
            Err(FleetError::InvalidParameterRange(_))
        ));
    }
}
