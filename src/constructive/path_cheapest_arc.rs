//! Path-cheapest-arc constructive heuristic.
//!
//! Builds routes one vehicle at a time: starting from the depot, always extend
//! the route by the cheapest arc to an unrouted stop that still fits. When no
//! stop fits, the next vehicle starts.
//!
//! # Complexity
//!
//! O(n²) where n = number of stops.

use crate::error::{FleetError, Result};
use crate::evaluation::SolutionState;
use crate::models::{Instance, DEPOT};

/// Constructs a solution by extending each route along its cheapest arc.
///
/// Ties go to the lowest stop index. Vehicles that are not needed stay empty.
///
/// # Errors
///
/// [`FleetError::ConstructionInfeasible`] if total demand exceeds the fleet's
/// capacity or stops remain once every vehicle is full.
///
/// # Examples
///
/// ```
/// use u_fleet::constructive::path_cheapest_arc;
/// use u_fleet::distance::ScaledEuclidean;
/// use u_fleet::models::{Instance, Location};
///
/// let locations = vec![
///     Location::new(0.0, 0.0),
///     Location::new(1.0, 0.0),
///     Location::new(2.0, 0.0),
///     Location::new(3.0, 0.0),
/// ];
/// let instance = Instance::from_locations(&locations, &ScaledEuclidean::new(1.0));
///
/// let state = path_cheapest_arc(&instance, 2, 2).unwrap();
/// assert_eq!(state.stops(0), &[1, 2]);
/// assert_eq!(state.stops(1), &[3]);
/// ```
pub fn path_cheapest_arc(
    instance: &Instance,
    fleet_size: usize,
    capacity: i64,
) -> Result<SolutionState<'_>> {
    super::check_total_demand(instance, fleet_size, capacity)?;

    let costs = instance.costs();
    let demands = instance.demands();
    let mut state = SolutionState::new(demands, fleet_size, capacity);
    let mut routed = vec![false; instance.num_locations()];
    let mut remaining = instance.num_stops();

    for route in 0..fleet_size {
        if remaining == 0 {
            break;
        }
        let mut current = DEPOT;
        loop {
            let mut best: Option<(usize, i64)> = None;
            for stop in instance.stops() {
                if routed[stop] || !state.tracker().can_add(route, demands.get(stop)) {
                    continue;
                }
                let c = costs.get(current, stop);
                if best.as_ref().is_none_or(|b| c < b.1) {
                    best = Some((stop, c));
                }
            }

            let Some((next, _)) = best else {
                break;
            };
            let pos = state.stops(route).len();
            state.insert(route, pos, next)?;
            routed[next] = true;
            remaining -= 1;
            current = next;
        }
    }

    if remaining > 0 {
        return Err(FleetError::ConstructionInfeasible {
            fleet_size,
            capacity,
            unrouted: remaining,
        });
    }
    Ok(state)
}
