//! Tests for the `VrpSolver`.

use std::time::Duration;

use super::*;
use roundsman_core::test_support::{
    FixedMatrixProvider, invariant_violations, three_customer_matrix, three_customer_problem,
    three_customer_request,
};
use roundsman_core::{ProblemBuilder, SolveStatus, TimeWindow, TravelMatrixError};
use rstest::{fixture, rstest};

#[fixture]
fn solver() -> VrpSolver<FixedMatrixProvider> {
    VrpSolver::with_config(
        FixedMatrixProvider::new(three_customer_matrix()),
        VrpSolverConfig { max_generations: 50 },
    )
}

#[rstest]
fn three_customers_fit_one_vehicle(solver: VrpSolver<FixedMatrixProvider>) {
    let solution = solver
        .solve(&three_customer_request())
        .expect("solve should succeed");
    assert_eq!(solution.status, SolveStatus::Ok);
    assert_eq!(solution.vehicles_used, 1);
    let problem = three_customer_problem().expect("valid scenario");
    let violations = invariant_violations(&problem, &solution);
    assert!(violations.is_empty(), "violations: {violations:?}");
}

#[rstest]
fn unreachable_window_is_infeasible(solver: VrpSolver<FixedMatrixProvider>) {
    let mut request = three_customer_request();
    request.config.client_window = TimeWindow::new(0, 50);
    request.config.auto_escalate = false;
    let solution = solver.solve(&request).expect("solve should succeed");
    assert_eq!(solution.status, SolveStatus::NoSolution);
    assert_eq!(solution.diagnostics.attempted_vehicle_counts, vec![1]);
}

#[rstest]
fn capacity_forces_escalation(solver: VrpSolver<FixedMatrixProvider>) {
    let mut request = three_customer_request();
    request.config.vehicle_capacity = 1;
    request.config.escalation_step = 1;
    let solution = solver.solve(&request).expect("solve should succeed");
    assert_eq!(solution.status, SolveStatus::Ok);
    assert_eq!(solution.vehicles_used, 3);
    assert_eq!(solution.diagnostics.succeeded_with, Some(3));
}

#[rstest]
fn provider_failure_is_not_masked(solver: VrpSolver<FixedMatrixProvider>) {
    let failing = VrpSolver::with_config(
        FixedMatrixProvider::failing(TravelMatrixError::ServiceError {
            code: "NoTable".to_owned(),
            message: "no table".to_owned(),
        }),
        *solver.config(),
    );
    let err = failing
        .solve(&three_customer_request())
        .expect_err("provider failure should surface");
    assert!(matches!(err, SolveError::TravelMatrix(_)));
}

#[rstest]
fn limits_follow_the_request_budget() {
    let problem = three_customer_problem().expect("valid scenario");
    let limits = VrpSolverConfig::default().limits(&problem);
    assert_eq!(limits.max_generations, 200);
    assert_eq!(
        Duration::from_secs(u64::try_from(limits.max_time_secs).expect("fits")),
        problem.budget().time_limit
    );
}

#[rstest]
fn default_generations_apply_without_a_cap() {
    let mut request = three_customer_request();
    request.config.max_search_iterations = None;
    let problem = ProblemBuilder::new(&request.depot, &request.customers, &request.config)
        .build(&three_customer_matrix())
        .expect("valid problem");
    let limits = VrpSolverConfig { max_generations: 7 }.limits(&problem);
    assert_eq!(limits.max_generations, 7);
}
