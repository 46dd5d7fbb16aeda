//! Property-based tests for the routing solver.
//!
//! # Invariants tested
//!
//! - **Route feasibility:** every `OK` solution serves each customer exactly
//!   once, within capacity and windows, with consistent arrival times.
//! - **Escalation completeness:** when every customer fits a vehicle on its
//!   own, the solve always succeeds.
//! - **Reproducibility:** re-running with the same seed stays within a small
//!   distance tolerance.


use proptest::prelude::*;
use roundsman_core::test_support::{FixedMatrixProvider, invariant_violations};
use roundsman_core::{SolveStatus, Solver};
use roundsman_solver_routing::RoutingSolver;

use proptest_support::{Instance, instance_strategy};

/// Relative distance tolerance between seeded re-runs.
const RERUN_TOLERANCE: f64 = 0.01;

fn solver_for(instance: &Instance) -> RoutingSolver<FixedMatrixProvider> {
    RoutingSolver::new(FixedMatrixProvider::new(instance.matrix.clone()))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Property: solutions honour every route invariant.
    #[test]
    fn solutions_respect_route_invariants(instance in instance_strategy(8)) {
        let solution = solver_for(&instance)
            .solve(&instance.request)
            .map_err(|err| TestCaseError::fail(err.to_string()))?;
        let violations = invariant_violations(&instance.problem(), &solution);
        prop_assert!(violations.is_empty(), "violations: {violations:?}");
    }

    /// Property: escalation reaches a feasible fleet whenever single-customer
    /// routes are feasible.
    #[test]
    fn escalation_finds_a_fleet(instance in instance_strategy(6)) {
        let problem = instance.problem();
        let fits = problem
            .customers()
            .all(|customer| problem.demand(customer) <= problem.vehicle_capacity());
        prop_assume!(fits);
        let solution = solver_for(&instance)
            .solve(&instance.request)
            .map_err(|err| TestCaseError::fail(err.to_string()))?;
        prop_assert_eq!(solution.status, SolveStatus::Ok);
        let attempts = &solution.diagnostics.attempted_vehicle_counts;
        prop_assert_eq!(attempts.last().copied(), solution.diagnostics.succeeded_with);
        prop_assert!(solution.vehicles_used <= solution.diagnostics.succeeded_with.unwrap_or_default());
    }

    /// Property: a seeded re-run reproduces the total distance.
    #[test]
    #[expect(
        clippy::float_arithmetic,
        reason = "tolerance comparison on kilometre totals"
    )]
    fn seeded_reruns_agree(instance in instance_strategy(6)) {
        let solver = solver_for(&instance);
        let first = solver
            .solve(&instance.request)
            .map_err(|err| TestCaseError::fail(err.to_string()))?;
        let second = solver
            .solve(&instance.request)
            .map_err(|err| TestCaseError::fail(err.to_string()))?;
        prop_assert_eq!(first.status, second.status);
        let gap = (first.total_distance_km - second.total_distance_km).abs();
        let allowed = RERUN_TOLERANCE * first.total_distance_km.max(1.0);
        prop_assert!(gap <= allowed, "distance {} vs {}", first.total_distance_km, second.total_distance_km);
    }
}
