//! Capacity tracking, checked solution state and the CVRP evaluator.

mod capacity;
mod evaluator;
mod state;

pub use capacity::CapacityTracker;
pub use evaluator::{CvrpEvaluator, Evaluation, RoutingPlan};
pub use state::SolutionState;
