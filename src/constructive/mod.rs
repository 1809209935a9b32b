//! Constructive heuristics for building initial solutions.
//!
//! - [`cheapest_insertion`]: global cheapest insertion over all routes, O(n² × m)
//! - [`path_cheapest_arc`]: route-by-route cheapest arc extension, O(n²)

mod cheapest_insertion;
mod path_cheapest_arc;

pub use cheapest_insertion::cheapest_insertion;
pub use path_cheapest_arc::path_cheapest_arc;

use serde::{Deserialize, Serialize};

use crate::error::{FleetError, Result};
use crate::evaluation::SolutionState;
use crate::models::Instance;

/// Heuristic used to build the first solution of every evaluation.
///
/// # Examples
///
/// ```
/// use u_fleet::constructive::FirstSolutionStrategy;
///
/// let s: FirstSolutionStrategy = serde_json::from_str("\"path_cheapest_arc\"").unwrap();
/// assert_eq!(s, FirstSolutionStrategy::PathCheapestArc);
/// assert_eq!(FirstSolutionStrategy::default(), FirstSolutionStrategy::CheapestInsertion);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FirstSolutionStrategy {
    /// See [`cheapest_insertion`].
    #[default]
    CheapestInsertion,
    /// See [`path_cheapest_arc`].
    PathCheapestArc,
}

impl FirstSolutionStrategy {
    /// Builds a feasible solution with this strategy.
    pub fn construct(
        self,
        instance: &Instance,
        fleet_size: usize,
        capacity: i64,
    ) -> Result<SolutionState<'_>> {
        match self {
            FirstSolutionStrategy::CheapestInsertion => {
                cheapest_insertion(instance, fleet_size, capacity)
            }
            FirstSolutionStrategy::PathCheapestArc => {
                path_cheapest_arc(instance, fleet_size, capacity)
            }
        }
    }

    /// Short name, used in logs.
    pub fn name(self) -> &'static str {
        match self {
            FirstSolutionStrategy::CheapestInsertion => "cheapest_insertion",
            FirstSolutionStrategy::PathCheapestArc => "path_cheapest_arc",
        }
    }
}

/// Fails fast when the fleet cannot carry the total demand.
fn check_total_demand(instance: &Instance, fleet_size: usize, capacity: i64) -> Result<()> {
    let stops = instance.num_stops();
    if stops == 0 {
        return Ok(());
    }
    let room = i128::from(capacity) * fleet_size as i128;
    if fleet_size == 0 || i128::from(instance.total_demand()) > room {
        return Err(FleetError::ConstructionInfeasible {
            fleet_size,
            capacity,
            unrouted: stops,
        });
    }
    Ok(())
}
