//! # u-fleet
//!
//! Fleet sizing for the capacitated vehicle routing problem: given a depot and
//! a set of stops, find the number of vehicles and the per-vehicle capacity
//! that minimize total travel distance.
//!
//! Each `(fleet_size, capacity)` pair is scored by building a feasible
//! solution and improving it with guided local search under a time budget.
//! An outer trial loop samples pairs from bounded integer ranges.
//!
//! ## Modules
//!
//! - [`models`]: locations, demands, routes, solutions and the problem instance
//! - [`distance`]: integer cost matrix and cost matrix providers
//! - [`evaluation`]: capacity tracking, checked solution state and the CVRP evaluator
//! - [`constructive`]: cheapest insertion and path-cheapest-arc construction
//! - [`local_search`]: relocate, swap, 2-opt, or-opt, 2-opt* and guided local search
//! - [`search`]: samplers and the trial loop over fleet size and capacity
//!
//! ## Example
//!
//! ```
//! use std::time::Duration;
//! use u_fleet::distance::ScaledEuclidean;
//! use u_fleet::evaluation::CvrpEvaluator;
//! use u_fleet::local_search::GlsConfig;
//! use u_fleet::models::{Instance, Location};
//! use u_fleet::search::{SearchSpace, TpeSampler, TrialSearch};
//!
//! let locations = vec![
//!     Location::new(13.0418, 80.2337),
//!     Location::new(13.0067, 80.2628),
//!     Location::new(13.0827, 80.2707),
//!     Location::new(13.0180, 80.2245),
//! ];
//! let instance = Instance::from_locations(&locations, &ScaledEuclidean::default());
//! let evaluator = CvrpEvaluator::new(&instance).with_config(
//!     GlsConfig::default()
//!         .with_time_budget(Duration::from_secs(1))
//!         .with_max_cycles(10),
//! );
//!
//! let space = SearchSpace::new(1, 2, 2, 3).unwrap();
//! let report = TrialSearch::new(&evaluator, TpeSampler::default())
//!     .run(&space, 4)
//!     .unwrap();
//! assert!(report.best().is_some());
//! ```

pub mod constructive;
pub mod distance;
pub mod evaluation;
pub mod local_search;
pub mod models;
pub mod search;

mod error;

pub use error::{FleetError, Result};
