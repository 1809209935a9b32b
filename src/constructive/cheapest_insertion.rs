//! Cheapest-insertion constructive heuristic.
//!
//! # Algorithm
//!
//! Start from `fleet_size` empty routes. At every step pick the unrouted stop,
//! route and position with the least marginal cost
//! `c(prev, s) + c(s, next) - c(prev, next)` among routes that still have
//! room for the stop's demand, and insert it there.
//!
//! The best position of every (stop, route) pair is cached; after an
//! insertion only the column of the route that changed is recomputed.
//!
//! # Complexity
//!
//! O(n² × m) for n stops and m vehicles overall, plus O(n × R) per step for
//! the selection.

use crate::distance::CostMatrix;
use crate::error::{FleetError, Result};
use crate::evaluation::SolutionState;
use crate::models::{Instance, DEPOT};

/// Builds an initial solution by cheapest insertion.
///
/// Ties are broken by lowest stop index, then lowest route index, then lowest
/// position, so the result is fully deterministic. An instance without stops
/// yields `fleet_size` empty routes.
///
/// # Errors
///
/// [`FleetError::ConstructionInfeasible`] if total demand exceeds
/// `fleet_size × capacity`, or if at some step no unrouted stop fits on any
/// route.
///
/// # Examples
///
/// ```
/// use u_fleet::constructive::cheapest_insertion;
/// use u_fleet::distance::ScaledEuclidean;
/// use u_fleet::models::{Instance, Location};
///
/// let locations = vec![
///     Location::new(0.0, 0.0),
///     Location::new(1.0, 0.0),
///     Location::new(2.0, 0.0),
///     Location::new(-1.0, 0.0),
/// ];
/// let instance = Instance::from_locations(&locations, &ScaledEuclidean::new(10.0));
///
/// let state = cheapest_insertion(&instance, 2, 2).unwrap();
/// assert_eq!(state.solution().num_served(), 3);
/// assert!(state.verify().is_ok());
///
/// assert!(cheapest_insertion(&instance, 1, 2).is_err());
/// ```
pub fn cheapest_insertion(
    instance: &Instance,
    fleet_size: usize,
    capacity: i64,
) -> Result<SolutionState<'_>> {
    super::check_total_demand(instance, fleet_size, capacity)?;

    let costs = instance.costs();
    let demands = instance.demands();
    let mut state = SolutionState::new(demands, fleet_size, capacity);
    let mut unrouted: Vec<usize> = instance.stops().collect();
    if unrouted.is_empty() {
        return Ok(state);
    }

    // cache[stop][route] = cheapest (cost, position) on that route, if it fits.
    let mut cache: Vec<Vec<Option<(i64, usize)>>> =
        vec![vec![None; fleet_size]; instance.num_locations()];
    for &stop in &unrouted {
        for route in 0..fleet_size {
            cache[stop][route] = best_position(&state, costs, stop, route);
        }
    }

    while !unrouted.is_empty() {
        // (index in unrouted, route, position, cost)
        let mut best: Option<(usize, usize, usize, i64)> = None;
        for (idx, &stop) in unrouted.iter().enumerate() {
            for (route, entry) in cache[stop].iter().enumerate() {
                if let Some((cost, pos)) = *entry {
                    if best.as_ref().is_none_or(|b| cost < b.3) {
                        best = Some((idx, route, pos, cost));
                    }
                }
            }
        }

        let Some((idx, route, pos, _)) = best else {
            return Err(FleetError::ConstructionInfeasible {
                fleet_size,
                capacity,
                unrouted: unrouted.len(),
            });
        };
        let stop = unrouted.remove(idx);
        state.insert(route, pos, stop)?;

        for &other in &unrouted {
            cache[other][route] = best_position(&state, costs, other, route);
        }
    }

    Ok(state)
}

/// Cheapest position for `stop` on `route`, or `None` if it does not fit.
fn best_position(
    state: &SolutionState<'_>,
    costs: &CostMatrix,
    stop: usize,
    route: usize,
) -> Option<(i64, usize)> {
    if !state.tracker().can_add(route, state.demands().get(stop)) {
        return None;
    }
    let stops = state.stops(route);
    let mut best: Option<(i64, usize)> = None;
    for pos in 0..=stops.len() {
        let prev = if pos == 0 { DEPOT } else { stops[pos - 1] };
        let next = stops.get(pos).copied().unwrap_or(DEPOT);
        let cost = costs.get(prev, stop) + costs.get(stop, next) - costs.get(prev, next);
        if best.as_ref().is_none_or(|b| cost < b.0) {
            best = Some((cost, pos));
        }
    }
    best
}
