//! Native VRPTW solver for Roundsman.
//!
//! This crate provides [`RoutingSolver`], the default implementation of the
//! [`Solver`](roundsman_core::Solver) trait. Each trial encodes the problem
//! as a [`RoutingModel`]: routing indices managed by a
//! [`RoutingIndexManager`], a transit callback charging travel plus service
//! at the origin, a capacity [`Dimension`], a time dimension bounded by
//! customer and depot windows, and a fixed cost per used vehicle.
//!
//! The search builds a first solution by path-cheapest-arc construction
//! (falling back to cheapest insertion), then runs guided local search over
//! relocate, exchange and 2-opt moves until the time limit or the iteration
//! cap. The seed fixes neighbourhood ordering, so runs with an iteration cap
//! are reproducible.

#![forbid(unsafe_code)]

mod encode;
mod extract;
mod model;
mod search;
mod solver;

pub use encode::{CAPACITY_DIMENSION, TIME_DIMENSION, build_model};
pub use extract::extract_plans;
pub use model::{
    Assignment, Dimension, RoutingIndexManager, RoutingModel, RoutingModelError,
    TransitCallbackId,
};
pub use search::{FirstSolutionStrategy, LocalSearchMetaheuristic, SearchParameters};
pub use solver::{RoutingSolver, RoutingSolverConfig};
