//! Local search operators and the guided local search driver.
//!
//! - [`relocate_improve`]: move one stop, within or across routes
//! - [`swap_improve`]: exchange two stops, within or across routes
//! - [`two_opt_improve`]: intra-route segment reversal
//! - [`or_opt_improve`]: intra-route segment relocation
//! - [`two_opt_star_improve`]: cross-route tail exchange
//! - [`GuidedLocalSearch`]: penalty-guided descent over all of the above

mod guided;
mod moves;
mod or_opt;
mod penalty;
mod relocate;
mod swap;
mod two_opt;
mod two_opt_star;

pub use guided::{GlsConfig, GlsOutcome, GuidedLocalSearch};
pub use moves::{Move, ScoredMove};
pub use or_opt::or_opt_improve;
pub use penalty::{AugmentedCost, EdgePenalties};
pub use relocate::relocate_improve;
pub use swap::swap_improve;
pub use two_opt::two_opt_improve;
pub use two_opt_star::two_opt_star_improve;
