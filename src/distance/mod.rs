//! Cost matrices and the providers that build them.
//!
//! The matrix is computed once per run from the location list and shared
//! read-only by every trial.

mod matrix;
mod provider;

pub use matrix::{ArcCost, CostMatrix};
pub use provider::{CostMatrixProvider, ScaledEuclidean};
