//! Samplers that propose the next configuration to evaluate.

use rand::Rng;

use super::{FleetParams, SearchSpace, TrialHistory};

/// Chooses the next `(fleet_size, capacity)` pair given the trials so far.
///
/// Implementations must only return points inside `space`.
pub trait Sampler {
    /// Short name, used in logs.
    fn name(&self) -> &str;

    /// `true` if proposals depend on earlier outcomes. Adaptive samplers
    /// cannot have their trials evaluated in parallel.
    fn is_adaptive(&self) -> bool;

    /// Proposes the next point.
    fn propose<R: Rng>(
        &mut self,
        space: &SearchSpace,
        history: &TrialHistory,
        rng: &mut R,
    ) -> FleetParams;
}

/// Uniform sampling over the grid.
///
/// # Examples
///
/// ```
/// use u_fleet::search::{RandomSampler, Sampler, SearchSpace, TrialHistory};
///
/// let space = SearchSpace::new(2, 3, 40, 50).unwrap();
/// let mut rng = u_numflow::random::create_rng(7);
/// let mut sampler = RandomSampler::new();
/// let p = sampler.propose(&space, &TrialHistory::new(), &mut rng);
/// assert!(space.contains(p));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomSampler;

impl RandomSampler {
    /// Creates the sampler.
    pub fn new() -> Self {
        Self
    }
}

impl Sampler for RandomSampler {
    fn name(&self) -> &str {
        "random"
    }

    fn is_adaptive(&self) -> bool {
        false
    }

    fn propose<R: Rng>(
        &mut self,
        space: &SearchSpace,
        _history: &TrialHistory,
        rng: &mut R,
    ) -> FleetParams {
        uniform_point(space, rng)
    }
}

/// Row-major enumeration of the grid, wrapping when exhausted.
///
/// # Examples
///
/// ```
/// use u_fleet::search::{FleetParams, GridSampler, Sampler, SearchSpace, TrialHistory};
///
/// let space = SearchSpace::new(1, 2, 5, 6).unwrap();
/// let mut rng = u_numflow::random::create_rng(0);
/// let mut grid = GridSampler::new();
/// let history = TrialHistory::new();
/// let seq: Vec<_> = (0..5).map(|_| grid.propose(&space, &history, &mut rng)).collect();
/// assert_eq!(seq[0], FleetParams::new(1, 5));
/// assert_eq!(seq[1], FleetParams::new(1, 6));
/// assert_eq!(seq[2], FleetParams::new(2, 5));
/// assert_eq!(seq[4], FleetParams::new(1, 5));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct GridSampler {
    next: u64,
}

impl GridSampler {
    /// Starts at the first grid point.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Sampler for GridSampler {
    fn name(&self) -> &str {
        "grid"
    }

    fn is_adaptive(&self) -> bool {
        false
    }

    fn propose<R: Rng>(
        &mut self,
        space: &SearchSpace,
        _history: &TrialHistory,
        _rng: &mut R,
    ) -> FleetParams {
        let p = space.point_at(self.next);
        self.next = self.next.wrapping_add(1);
        p
    }
}

/// Uniform point of `space`.
pub(crate) fn uniform_point<R: Rng>(space: &SearchSpace, rng: &mut R) -> FleetParams {
    FleetParams {
        fleet_size: rng.random_range(space.min_fleet()..=space.max_fleet()),
        capacity: rng.random_range(space.min_capacity()..=space.max_capacity()),
    }
}

/// Grids up to this size are enumerated when random draws keep hitting
/// evaluated points.
const MAX_ENUMERATED_POINTS: u64 = 1 << 20;

/// Attempts at drawing an unevaluated point before enumerating.
const UNSEEN_DRAWS: usize = 64;

/// A uniformly drawn point that `history` has not evaluated, or `None` once
/// the grid is exhausted (or too large to enumerate and every draw missed).
pub(crate) fn random_unseen<R: Rng>(
    space: &SearchSpace,
    history: &TrialHistory,
    rng: &mut R,
) -> Option<FleetParams> {
    for _ in 0..UNSEEN_DRAWS {
        let p = uniform_point(space, rng);
        if !history.contains(p) {
            return Some(p);
        }
    }
    if space.num_points() > MAX_ENUMERATED_POINTS {
        return None;
    }
    let unseen: Vec<FleetParams> = (0..space.num_points())
        .map(|i| space.point_at(i))
        .filter(|&p| !history.contains(p))
        .collect();
    if unseen.is_empty() {
        None
    } else {
        Some(unseen[rng.random_range(0..unseen.len())])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::TrialOutcome;
    use std::time::Duration;

    #[test]
    fn test_random_stays_in_range() {
        let space = SearchSpace::new(1, 3, 40, 50).expect("valid");
        let mut rng = u_numflow::random::create_rng(42);
        let mut s = RandomSampler::new();
        let h = TrialHistory::new();
        for _ in 0..200 {
            assert!(space.contains(s.propose(&space, &h, &mut rng)));
        }
        assert!(!s.is_adaptive());
    }

    #[test]
    fn test_random_unseen_finds_last_point() {
        let space = SearchSpace::new(1, 2, 1, 2).expect("valid");
        let mut h = TrialHistory::new();
        for p in [(1, 1), (1, 2), (2, 1)] {
            h.push(FleetParams::new(p.0, p.1), TrialOutcome::Infeasible, Duration::ZERO);
        }
        let mut rng = u_numflow::random::create_rng(1);
        assert_eq!(random_unseen(&space, &h, &mut rng), Some(FleetParams::new(2, 2)));
        h.push(FleetParams::new(2, 2), TrialOutcome::Infeasible, Duration::ZERO);
        assert_eq!(random_unseen(&space, &h, &mut rng), None);
    }

    #[test]
    fn test_grid_covers_space() {
        let space = SearchSpace::new(1, 3, 40, 50).expect("valid");
        let mut rng = u_numflow::random::create_rng(0);
        let mut g = GridSampler::new();
        let h = TrialHistory::new();
        let mut seen = std::collections::HashSet::new();
        for _ in 0..space.num_points() {
            seen.insert(g.propose(&space, &h, &mut rng));
        }
        assert_eq!(seen.len() as u64, space.num_points());
    }
}
