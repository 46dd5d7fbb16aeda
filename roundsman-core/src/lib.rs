//! Core domain types for the Roundsman routing engine.
//!
//! The crate defines the vehicle routing problem with time windows as seen by
//! every backend: typed configuration, the depot and customer records, the
//! [`TravelMatrixProvider`] boundary, the integral [`Problem`], the
//! vehicle-count escalation protocol and the [`Solution`] returned to
//! callers. [`solve_with`] ties them together; backends only implement
//! [`RouteTrial`].

mod config;
mod escalation;
mod problem;
mod site;
mod solution;
mod solver;
mod summary;
mod time_window;
pub mod travel_matrix;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use config::{
    ConfigError, DEFAULT_CLIENT_WINDOW, DEFAULT_DEPOT_WINDOW, DEFAULT_ESCALATION_STEP,
    DEFAULT_INITIAL_VEHICLES, DEFAULT_SEED, DEFAULT_SERVICE_TIME_SECS, DEFAULT_TIME_LIMIT_SECS,
    DEFAULT_VEHICLE_CAPACITY, DEFAULT_VEHICLE_FIXED_COST, SolverConfig, VehicleCount,
};
pub use escalation::{
    EscalationPolicy, EscalationReport, EscalationState, RoutePlan, TrialOutcome, Visit, escalate,
};
pub use problem::{
    DEPOT, Node, Problem, ProblemBuilder, ProblemError, SearchBudget, UNREACHABLE_SECS,
    VEHICLE_SAFETY_MARGIN, estimate_vehicle_count, round_travel_secs,
};
pub use site::{Customer, Depot};
pub use solution::{Diagnostics, Route, Solution, SolveStatus, Stop};
pub use solver::{RouteTrial, SolveError, SolveRequest, Solver, solve_with};
pub use summary::SolutionSummary;
pub use time_window::{SECS_PER_HOUR, TimeWindow, format_clock};
pub use travel_matrix::{TravelMatrix, TravelMatrixError, TravelMatrixProvider};
