//! Tree-structured Parzen estimator over the integer grid.
//!
//! # Algorithm
//!
//! 1. **Startup**: the first `n_startup` trials follow a centred Latin
//!    hypercube design. With `k` strata and an axis of `S` values, stratum
//!    `s` maps to `lo + floor((s + 0.5) · S / k)`, so an axis with `S ≤ k`
//!    has every value visited.
//! 2. **Split**: feasible records sorted by distance; the best
//!    `ceil(γ · n)` form the good set, everything else (infeasible
//!    included) the bad set.
//! 3. **Model**: `l(x)` and `g(x)` are mixtures of a uniform prior and one
//!    product kernel per record. Each axis kernel is a Gaussian truncated to
//!    the axis range with bandwidth `max(0.5, 0.5 · span / sqrt(m + 1))`.
//! 4. **Propose**: draw candidates from `l`, return the unevaluated one
//!    maximizing `l(x) / g(x)`.
//!
//! # Reference
//!
//! Bergstra, J., Bardenet, R., Bengio, Y. & Kégl, B. (2011). "Algorithms for
//! Hyper-Parameter Optimization", *NeurIPS* 24.

use std::f64::consts::PI;

use rand::seq::SliceRandom;
use rand::Rng;

use super::sampler::{random_unseen, uniform_point};
use super::{FleetParams, Sampler, SearchSpace, TrialHistory, TrialRecord};

/// Axis windows wider than this are normalized with the continuous Gaussian.
const MAX_EXACT_WINDOW: f64 = 10_000.0;

/// Rejection attempts when drawing inside the axis range.
const MAX_KERNEL_DRAWS: usize = 32;

/// Adaptive sampler: the default for fleet searches.
///
/// # Examples
///
/// ```
/// use u_fleet::search::{Sampler, SearchSpace, TpeSampler, TrialHistory};
///
/// let space = SearchSpace::new(1, 3, 40, 50).unwrap();
/// let mut rng = u_numflow::random::create_rng(42);
/// let mut tpe = TpeSampler::default().with_n_startup(6);
/// let history = TrialHistory::new();
/// let p = tpe.propose(&space, &history, &mut rng);
/// assert!(space.contains(p));
/// assert!(tpe.is_adaptive());
/// ```
#[derive(Debug, Clone)]
pub struct TpeSampler {
    n_startup: usize,
    gamma: f64,
    n_candidates: usize,
    startup: Vec<FleetParams>,
    startup_space: Option<SearchSpace>,
}

impl Default for TpeSampler {
    fn default() -> Self {
        Self {
            n_startup: 10,
            gamma: 0.25,
            n_candidates: 24,
            startup: Vec::new(),
            startup_space: None,
        }
    }
}

impl TpeSampler {
    /// Sampler with the default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of space-filling trials before the model is used.
    pub fn with_n_startup(mut self, n: usize) -> Self {
        self.n_startup = n;
        self.startup.clear();
        self.startup_space = None;
        self
    }

    /// Fraction of feasible records forming the good set, clamped to `[0.01, 0.5]`.
    pub fn with_gamma(mut self, gamma: f64) -> Self {
        self.gamma = gamma.clamp(0.01, 0.5);
        self
    }

    /// Candidates drawn per proposal.
    pub fn with_n_candidates(mut self, n: usize) -> Self {
        self.n_candidates = n.max(1);
        self
    }

    /// Number of space-filling trials.
    pub fn n_startup(&self) -> usize {
        self.n_startup
    }

    /// Good-set fraction.
    pub fn gamma(&self) -> f64 {
        self.gamma
    }

    /// Candidates drawn per proposal.
    pub fn n_candidates(&self) -> usize {
        self.n_candidates
    }

    /// The design is rebuilt at the start of every run and whenever the
    /// space changes, so stale points never leak into a new range.
    fn startup_point<R: Rng>(&mut self, space: &SearchSpace, index: usize, rng: &mut R) -> FleetParams {
        if index == 0 || self.startup.is_empty() || self.startup_space != Some(*space) {
            self.startup = latin_hypercube(space, self.n_startup, rng);
            self.startup_space = Some(*space);
        }
        self.startup[index]
    }

    fn model_point<R: Rng>(
        &self,
        space: &SearchSpace,
        history: &TrialHistory,
        rng: &mut R,
    ) -> Option<FleetParams> {
        let mut feasible: Vec<&TrialRecord> = history
            .records()
            .iter()
            .filter(|r| r.outcome().distance().is_some())
            .collect();
        if feasible.is_empty() {
            return None;
        }
        feasible.sort_by_key(|r| (r.outcome().distance(), r.number()));
        let n_good = ((self.gamma * feasible.len() as f64).ceil() as usize).clamp(1, feasible.len());

        let good: Vec<FleetParams> = feasible[..n_good].iter().map(|r| r.params()).collect();
        let bad: Vec<FleetParams> = history
            .records()
            .iter()
            .filter(|r| !good_contains(&feasible[..n_good], r))
            .map(|r| r.params())
            .collect();

        let l = Parzen::new(space, &good);
        let g = Parzen::new(space, &bad);

        let mut best: Option<(FleetParams, f64)> = None;
        for _ in 0..self.n_candidates {
            let candidate = l.sample(rng);
            if history.contains(candidate) {
                continue;
            }
            let score = l.density(candidate) / g.density(candidate);
            if best.as_ref().is_none_or(|b| score > b.1) {
                best = Some((candidate, score));
            }
        }
        best.map(|(p, _)| p)
    }
}

fn good_contains(good: &[&TrialRecord], record: &TrialRecord) -> bool {
    good.iter().any(|g| g.number() == record.number())
}

impl Sampler for TpeSampler {
    fn name(&self) -> &str {
        "tpe"
    }

    fn is_adaptive(&self) -> bool {
        true
    }

    fn propose<R: Rng>(
        &mut self,
        space: &SearchSpace,
        history: &TrialHistory,
        rng: &mut R,
    ) -> FleetParams {
        let trial = history.len();
        if trial < self.n_startup {
            let p = self.startup_point(space, trial, rng);
            if !history.contains(p) {
                return p;
            }
        } else if let Some(p) = self.model_point(space, history, rng) {
            return p;
        }
        // Exhausted grids fall back to plain uniform draws.
        random_unseen(space, history, rng).unwrap_or_else(|| uniform_point(space, rng))
    }
}

/// Centred Latin hypercube design of `k` points.
fn latin_hypercube<R: Rng>(space: &SearchSpace, k: usize, rng: &mut R) -> Vec<FleetParams> {
    let k = k.max(1);
    let mut fleet: Vec<usize> = (0..k)
        .map(|s| space.min_fleet() + stratum_offset(s, k, space.fleet_span()) as usize)
        .collect();
    let mut capacity: Vec<i64> = (0..k)
        .map(|s| space.min_capacity() + stratum_offset(s, k, space.capacity_span()) as i64)
        .collect();
    fleet.shuffle(rng);
    capacity.shuffle(rng);
    fleet
        .into_iter()
        .zip(capacity)
        .map(|(f, c)| FleetParams::new(f, c))
        .collect()
}

/// `floor((s + 0.5) · span / k)`, exact in integers.
fn stratum_offset(s: usize, k: usize, span: u64) -> u64 {
    let num = (2 * s as u128 + 1) * u128::from(span);
    let den = 2 * k as u128;
    (num / den) as u64
}

/// One axis of the product kernel.
#[derive(Debug, Clone, Copy)]
struct Axis {
    lo: f64,
    hi: f64,
    bandwidth: f64,
}

impl Axis {
    fn new(lo: f64, hi: f64, n_points: usize) -> Self {
        let span = hi - lo + 1.0;
        let bandwidth = (0.5 * span / ((n_points + 1) as f64).sqrt()).max(0.5);
        Self { lo, hi, bandwidth }
    }

    fn weight(&self, mu: f64, x: f64) -> f64 {
        let z = (x - mu) / self.bandwidth;
        (-0.5 * z * z).exp()
    }

    /// Normalizing constant of the kernel centred at `mu`, truncated to the axis.
    fn normalizer(&self, mu: f64) -> f64 {
        let reach = (6.0 * self.bandwidth).ceil();
        let from = (mu - reach).max(self.lo);
        let to = (mu + reach).min(self.hi);
        if to - from > MAX_EXACT_WINDOW {
            return self.bandwidth * (2.0 * PI).sqrt();
        }
        let mut z = 0.0;
        let mut x = from;
        while x <= to {
            z += self.weight(mu, x);
            x += 1.0;
        }
        z
    }

    fn pdf(&self, mu: f64, x: f64) -> f64 {
        if (x - mu).abs() > 6.0 * self.bandwidth {
            return 0.0;
        }
        self.weight(mu, x) / self.normalizer(mu)
    }

    fn sample<R: Rng>(&self, mu: f64, rng: &mut R) -> f64 {
        for _ in 0..MAX_KERNEL_DRAWS {
            let u1: f64 = rng.random();
            let u2: f64 = rng.random();
            let z = (-2.0 * (1.0 - u1).ln()).sqrt() * (2.0 * PI * u2).cos();
            let x = (mu + self.bandwidth * z).round();
            if x >= self.lo && x <= self.hi {
                return x;
            }
        }
        mu.clamp(self.lo, self.hi)
    }
}

/// Parzen estimator over a set of observed points.
struct Parzen<'a> {
    space: &'a SearchSpace,
    points: Vec<(f64, f64)>,
    fleet: Axis,
    capacity: Axis,
}

impl<'a> Parzen<'a> {
    fn new(space: &'a SearchSpace, points: &[FleetParams]) -> Self {
        let fleet = Axis::new(space.min_fleet() as f64, space.max_fleet() as f64, points.len());
        let capacity = Axis::new(space.min_capacity() as f64, space.max_capacity() as f64, points.len());
        Self {
            space,
            points: points
                .iter()
                .map(|p| (p.fleet_size as f64, p.capacity as f64))
                .collect(),
            fleet,
            capacity,
        }
    }

    /// Mixture weight is `1 / (m + 1)` for the prior and each point.
    fn density(&self, p: FleetParams) -> f64 {
        let (x, y) = (p.fleet_size as f64, p.capacity as f64);
        let prior = 1.0 / self.space.num_points() as f64;
        let kernels: f64 = self
            .points
            .iter()
            .map(|&(mf, mc)| self.fleet.pdf(mf, x) * self.capacity.pdf(mc, y))
            .sum();
        (prior + kernels) / (self.points.len() + 1) as f64
    }

    fn sample<R: Rng>(&self, rng: &mut R) -> FleetParams {
        let pick = rng.random_range(0..=self.points.len());
        if pick == self.points.len() {
            return uniform_point(self.space, rng);
        }
        let (mf, mc) = self.points[pick];
        let f = self.fleet.sample(mf, rng);
        let c = self.capacity.sample(mc, rng);
        FleetParams::new(
            (f as usize).clamp(self.space.min_fleet(), self.space.max_fleet()),
            (c as i64).clamp(self.space.min_capacity(), self.space.max_capacity()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::TrialOutcome;
    use std::collections::HashSet;
    use std::time::Duration;

    #[test]
    fn test_stratum_offsets_cover_short_axis() {
        let values: HashSet<u64> = (0..10).map(|s| stratum_offset(s, 10, 3)).collect();
        assert_eq!(values, HashSet::from([0, 1, 2]));
        assert_eq!(stratum_offset(0, 4, 100), 12);
        assert_eq!(stratum_offset(3, 4, 100), 87);
    }

    #[test]
    fn test_latin_hypercube_in_range() {
        let space = SearchSpace::new(1, 3, 40, 50).expect("valid");
        let mut rng = u_numflow::random::create_rng(3);
        let design = latin_hypercube(&space, 10, &mut rng);
        assert_eq!(design.len(), 10);
        assert!(design.iter().all(|&p| space.contains(p)));
        let fleets: HashSet<usize> = design.iter().map(|p| p.fleet_size).collect();
        assert_eq!(fleets.len(), 3);
    }

    #[test]
    fn test_axis_pdf_normalized() {
        let axis = Axis::new(1.0, 20.0, 3);
        let total: f64 = (1..=20).map(|x| axis.pdf(4.0, x as f64)).sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_density_prefers_good_region() {
        let space = SearchSpace::new(1, 10, 1, 10).expect("valid");
        let near = Parzen::new(&space, &[FleetParams::new(2, 2)]);
        assert!(near.density(FleetParams::new(2, 2)) > near.density(FleetParams::new(9, 9)));
        let empty = Parzen::new(&space, &[]);
        assert!((empty.density(FleetParams::new(5, 5)) - 0.01).abs() < 1e-12);
    }

    #[test]
    fn test_propose_avoids_evaluated_points() {
        let space = SearchSpace::new(1, 2, 1, 3).expect("valid");
        let mut rng = u_numflow::random::create_rng(11);
        let mut tpe = TpeSampler::default().with_n_startup(2);
        let mut history = TrialHistory::new();
        for i in 0..space.num_points() {
            let p = tpe.propose(&space, &history, &mut rng);
            assert!(space.contains(p));
            assert!(!history.contains(p), "trial {i} repeated {p:?}");
            let d = (p.fleet_size as i64) * 10 + p.capacity;
            history.push(p, TrialOutcome::Feasible(d), Duration::ZERO);
        }
        // Grid exhausted: proposals still land in range.
        let p = tpe.propose(&space, &history, &mut rng);
        assert!(space.contains(p));
    }

    #[test]
    fn test_startup_follows_new_space() {
        let first = SearchSpace::new(1, 3, 40, 50).expect("valid");
        let second = SearchSpace::new(5, 6, 1, 2).expect("valid");
        let mut rng = u_numflow::random::create_rng(42);
        let mut tpe = TpeSampler::default();
        let mut history = TrialHistory::new();
        let p = tpe.propose(&first, &history, &mut rng);
        assert!(first.contains(p));
        history.push(p, TrialOutcome::Feasible(10), Duration::ZERO);
        assert!(first.contains(tpe.propose(&first, &history, &mut rng)));

        // Same sampler, new range, even mid-history.
        assert!(second.contains(tpe.propose(&second, &history, &mut rng)));
        let fresh = TrialHistory::new();
        for _ in 0..3 {
            assert!(second.contains(tpe.propose(&second, &fresh, &mut rng)));
        }
    }

    #[test]
    fn test_gamma_clamped() {
        assert!((TpeSampler::new().with_gamma(0.9).gamma() - 0.5).abs() < 1e-12);
        assert!((TpeSampler::new().with_gamma(-1.0).gamma() - 0.01).abs() < 1e-12);
    }

    #[test]
    fn test_all_infeasible_falls_back() {
        let space = SearchSpace::new(1, 3, 1, 3).expect("valid");
        let mut rng = u_numflow::random::create_rng(5);
        let mut tpe = TpeSampler::default().with_n_startup(0);
        let mut history = TrialHistory::new();
        history.push(FleetParams::new(1, 1), TrialOutcome::Infeasible, Duration::ZERO);
        let p = tpe.propose(&space, &history, &mut rng);
        assert!(space.contains(p));
        assert_ne!(p, FleetParams::new(1, 1));
    }
}
