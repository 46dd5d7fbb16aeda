//! Facade crate for the Roundsman routing engine.
//!
//! This crate re-exports the core domain types and exposes the solver
//! backends behind feature flags: `solver-routing` (default) for the native
//! guided local search and `solver-vrp` for the `vrp-core` backend.

#![forbid(unsafe_code)]

pub use roundsman_core::{
    ConfigError, Customer, Depot, Diagnostics, Route, RouteTrial, SolutionSummary, Solution,
    SolveError, SolveRequest, SolveStatus, Solver, SolverConfig, Stop, TimeWindow, TravelMatrix,
    TravelMatrixError, TravelMatrixProvider, VehicleCount, solve_with,
};

#[cfg(feature = "solver-routing")]
pub use roundsman_solver_routing::{RoutingSolver, RoutingSolverConfig};

#[cfg(feature = "solver-vrp")]
pub use roundsman_solver_vrp::{VrpSolver, VrpSolverConfig};
