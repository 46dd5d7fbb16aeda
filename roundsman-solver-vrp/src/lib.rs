//! `vrp-core` backed VRPTW solver for Roundsman.
//!
//! This crate provides [`VrpSolver`], an alternative implementation of the
//! [`Solver`](roundsman_core::Solver) trait. Each trial describes the problem
//! with `vrp-core` builders: one job per customer carrying its demand,
//! service duration and time window, and one vehicle per slot leaving and
//! returning to the depot inside the depot window with the fixed vehicle
//! cost. The goal minimises unassigned jobs first and route cost second; a
//! trial that leaves any job unassigned counts as infeasible so the shared
//! escalation loop can add vehicles.
//!
//! `vrp-core` cannot bound waiting per arc, so the maximum waiting time only
//! applies through the depot window. Its evolutionary search draws from the
//! library's own random source, so the request seed does not make runs
//! reproducible.

#![forbid(unsafe_code)]

mod solver;
mod vrp;

pub use solver::{VrpSolver, VrpSolverConfig};
