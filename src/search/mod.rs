//! Outer search over fleet size and vehicle capacity.
//!
//! - [`SearchSpace`]: inclusive integer ranges of both parameters
//! - [`TrialHistory`]: append-only record of evaluated configurations
//! - [`Sampler`]: proposes the next configuration ([`TpeSampler`],
//!   [`RandomSampler`], [`GridSampler`])
//! - [`TrialSearch`]: runs trials against a [`CvrpEvaluator`](crate::evaluation::CvrpEvaluator)
//! - [`ProblemConfig`]: JSON problem documents for the command-line front end

mod config;
mod runner;
mod sampler;
mod space;
mod tpe;
mod trial;

pub use config::{ProblemConfig, SamplerKind, SearchConfig, SolverSettings};
pub use runner::{search, SearchReport, StopFlag, TrialSearch};
pub use sampler::{GridSampler, RandomSampler, Sampler};
pub use space::{FleetParams, SearchSpace};
pub use tpe::TpeSampler;
pub use trial::{TrialHistory, TrialOutcome, TrialRecord};
