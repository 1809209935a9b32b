//! Domain model types for fleet routing.
//!
//! Locations and their demands, routes as ordered stop sequences, solutions
//! as one route per vehicle, and the instance that ties the cost matrix and
//! demands together.

mod demand;
mod instance;
mod location;
mod route;
mod solution;

pub use demand::DemandVector;
pub use instance::Instance;
pub use location::Location;
pub use route::Route;
pub use solution::Solution;

/// Index of the depot in every location list and cost matrix.
pub const DEPOT: usize = 0;
