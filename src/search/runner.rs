//! Trial search loop over `(fleet_size, capacity)`.
//!
//! Each trial asks the [`Sampler`] for a point, scores it with the
//! [`CvrpEvaluator`] and appends a [`TrialRecord`](super::TrialRecord). The
//! loop keeps the plan of the best record so it can be displayed afterwards.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use serde::Serialize;
use tracing::{info, warn};

use super::{FleetParams, Sampler, SearchSpace, TpeSampler, TrialHistory, TrialOutcome, TrialRecord};
use crate::error::{FleetError, Result};
use crate::evaluation::{CvrpEvaluator, Evaluation, RoutingPlan};
use crate::models::Instance;

/// Cloneable cancellation flag, checked between trials.
///
/// # Examples
///
/// ```
/// use u_fleet::search::StopFlag;
///
/// let flag = StopFlag::new();
/// let handle = flag.clone();
/// assert!(!flag.is_cancelled());
/// handle.cancel();
/// assert!(flag.is_cancelled());
/// ```
#[derive(Debug, Clone, Default)]
pub struct StopFlag(Arc<AtomicBool>);

impl StopFlag {
    /// Flag that has not been cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests that the search stop after the running trial.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// `true` once [`cancel`](Self::cancel) has been called on any clone.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Result of a trial search.
#[derive(Debug, Clone, Serialize)]
pub struct SearchReport {
    /// Every trial, in order.
    pub history: TrialHistory,
    /// Plan of the best record, if any trial was feasible.
    pub best_plan: Option<RoutingPlan>,
    /// `true` if the search stopped before running every trial.
    pub cancelled: bool,
}

impl SearchReport {
    /// Best record: lowest finite distance, earliest on ties.
    pub fn best(&self) -> Option<&TrialRecord> {
        self.history.best()
    }

    /// Best parameters and distance.
    pub fn best_params(&self) -> Option<(FleetParams, i64)> {
        let best = self.best()?;
        Some((best.params(), best.outcome().distance()?))
    }
}

impl fmt::Display for SearchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some((params, distance)) = self.best_params() else {
            return write!(f, "no feasible configuration found in range");
        };
        writeln!(f, "Best fleet size: {}", params.fleet_size)?;
        writeln!(f, "Best capacity: {}", params.capacity)?;
        write!(f, "Total distance: {distance}")?;
        if let Some(plan) = &self.best_plan {
            for route in plan.solution.routes().iter().filter(|r| !r.is_empty()) {
                let stops: Vec<String> = route.sequence().iter().map(|s| s.to_string()).collect();
                write!(f, "\nVehicle {}: {}", route.vehicle_id(), stops.join(" -> "))?;
            }
        }
        if self.cancelled {
            write!(f, "\n(cancelled after {} trials)", self.history.len())?;
        }
        Ok(())
    }
}

/// Drives a sampler against an evaluator.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use u_fleet::distance::ScaledEuclidean;
/// use u_fleet::evaluation::CvrpEvaluator;
/// use u_fleet::local_search::GlsConfig;
/// use u_fleet::models::{Instance, Location};
/// use u_fleet::search::{GridSampler, SearchSpace, TrialSearch};
///
/// let locations = vec![
///     Location::new(0.0, 0.0),
///     Location::new(1.0, 0.0),
///     Location::new(0.0, 1.0),
/// ];
/// let instance = Instance::from_locations(&locations, &ScaledEuclidean::new(100.0));
/// let evaluator = CvrpEvaluator::new(&instance)
///     .with_config(GlsConfig::default().with_max_cycles(5).with_time_budget(Duration::from_secs(5)));
///
/// let space = SearchSpace::new(1, 2, 1, 2).unwrap();
/// let report = TrialSearch::new(&evaluator, GridSampler::new()).run(&space, 4).unwrap();
/// let (params, _) = report.best_params().unwrap();
/// assert!(params.fleet_size * params.capacity as usize >= 2);
/// ```
pub struct TrialSearch<'e, 'a, S: Sampler> {
    evaluator: &'e CvrpEvaluator<'a>,
    sampler: S,
    seed: u64,
    stop: StopFlag,
}

impl<'e, 'a, S: Sampler> TrialSearch<'e, 'a, S> {
    /// Search with seed 42 and a fresh stop flag.
    pub fn new(evaluator: &'e CvrpEvaluator<'a>, sampler: S) -> Self {
        Self {
            evaluator,
            sampler,
            seed: 42,
            stop: StopFlag::new(),
        }
    }

    /// Seed for the sampler's random generator.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Flag checked between trials.
    pub fn with_stop_flag(mut self, stop: StopFlag) -> Self {
        self.stop = stop;
        self
    }

    /// The sampler, with whatever state it has accumulated.
    pub fn sampler(&self) -> &S {
        &self.sampler
    }

    /// Runs `n_trials` trials one after another.
    ///
    /// # Errors
    ///
    /// [`FleetError::InvalidParameterRange`] if `n_trials` is zero, or any
    /// evaluator error (which aborts the search).
    pub fn run(&mut self, space: &SearchSpace, n_trials: usize) -> Result<SearchReport> {
        check_trials(n_trials)?;
        let mut rng = u_numflow::random::create_rng(self.seed);
        let mut report = empty_report();

        for trial in 0..n_trials {
            if self.stop.is_cancelled() {
                warn!(completed = trial, requested = n_trials, "search cancelled");
                report.cancelled = true;
                break;
            }
            let params = self.sampler.propose(space, &report.history, &mut rng);
            let start = Instant::now();
            let evaluation = self.evaluator.evaluate(params.fleet_size, params.capacity)?;
            record(&mut report, params, evaluation, start.elapsed(), self.sampler.name());
        }
        Ok(report)
    }

    /// Runs `n_trials` trials on a pool of `workers` threads.
    ///
    /// Points are proposed up front, so only non-adaptive samplers run in
    /// parallel; adaptive ones fall back to [`run`](Self::run). Records keep
    /// proposal order regardless of completion order.
    ///
    /// # Errors
    ///
    /// As [`run`](Self::run), plus [`FleetError::InvalidConfig`] if the pool
    /// cannot be built.
    pub fn run_parallel(
        &mut self,
        space: &SearchSpace,
        n_trials: usize,
        workers: usize,
    ) -> Result<SearchReport> {
        check_trials(n_trials)?;
        if self.sampler.is_adaptive() {
            warn!(
                sampler = self.sampler.name(),
                "adaptive sampler cannot run trials in parallel, running sequentially"
            );
            return self.run(space, n_trials);
        }

        let pool = ThreadPoolBuilder::new()
            .num_threads(workers.max(1))
            .build()
            .map_err(|e| FleetError::InvalidConfig(format!("cannot build thread pool: {e}")))?;

        let mut rng = u_numflow::random::create_rng(self.seed);
        let empty = TrialHistory::new();
        let points: Vec<FleetParams> = (0..n_trials)
            .map(|_| self.sampler.propose(space, &empty, &mut rng))
            .collect();

        let evaluator = self.evaluator;
        let stop = &self.stop;
        let results: Vec<Option<(Evaluation, Duration)>> = pool.install(|| {
            points
                .par_iter()
                .map(|p| -> Result<Option<(Evaluation, Duration)>> {
                    if stop.is_cancelled() {
                        return Ok(None);
                    }
                    let start = Instant::now();
                    let evaluation = evaluator.evaluate(p.fleet_size, p.capacity)?;
                    Ok(Some((evaluation, start.elapsed())))
                })
                .collect::<Result<Vec<_>>>()
        })?;

        let mut report = empty_report();
        for (params, result) in points.into_iter().zip(results) {
            match result {
                Some((evaluation, elapsed)) => {
                    record(&mut report, params, evaluation, elapsed, self.sampler.name())
                }
                None => report.cancelled = true,
            }
        }
        if report.cancelled {
            warn!(
                completed = report.history.len(),
                requested = n_trials,
                "search cancelled"
            );
        }
        Ok(report)
    }
}

/// Runs a TPE search with the default evaluator settings.
///
/// # Errors
///
/// [`FleetError::InvalidParameterRange`] for an empty or non-positive range
/// or a zero trial count.
pub fn search(
    instance: &Instance,
    min_fleet: usize,
    max_fleet: usize,
    min_capacity: i64,
    max_capacity: i64,
    n_trials: usize,
) -> Result<SearchReport> {
    let space = SearchSpace::new(min_fleet, max_fleet, min_capacity, max_capacity)?;
    let evaluator = CvrpEvaluator::new(instance);
    TrialSearch::new(&evaluator, TpeSampler::default()).run(&space, n_trials)
}

fn check_trials(n_trials: usize) -> Result<()> {
    if n_trials == 0 {
        return Err(FleetError::InvalidParameterRange(
            "trial count must be at least 1".to_string(),
        ));
    }
    Ok(())
}

fn empty_report() -> SearchReport {
    SearchReport {
        history: TrialHistory::new(),
        best_plan: None,
        cancelled: false,
    }
}

fn record(
    report: &mut SearchReport,
    params: FleetParams,
    evaluation: Evaluation,
    elapsed: Duration,
    sampler: &str,
) {
    let outcome = match evaluation.total_distance() {
        Some(d) => TrialOutcome::Feasible(d),
        None => TrialOutcome::Infeasible,
    };
    let improves = match (outcome.distance(), report.history.best()) {
        (Some(d), Some(best)) => best.outcome().distance().is_none_or(|b| d < b),
        (Some(_), None) => true,
        (None, _) => false,
    };
    let trial = report.history.push(params, outcome, elapsed);
    info!(
        trial = trial.number(),
        sampler,
        fleet_size = params.fleet_size,
        capacity = params.capacity,
        distance = ?outcome.distance(),
        elapsed_ms = elapsed.as_millis() as u64,
        "trial complete"
    );
    if improves {
        report.best_plan = evaluation.into_plan();
    }
}
