//! Tests for the `RoutingSolver`.

use super::*;
use roundsman_core::test_support::{
    FixedMatrixProvider, invariant_violations, three_customer_matrix, three_customer_problem,
    three_customer_request,
};
use roundsman_core::{
    ProblemBuilder, SolveStatus, TimeWindow, TravelMatrixError, VehicleCount,
};
use rstest::{fixture, rstest};

#[fixture]
fn solver() -> RoutingSolver<FixedMatrixProvider> {
    RoutingSolver::new(FixedMatrixProvider::new(three_customer_matrix()))
}

#[rstest]
fn three_customers_fit_one_vehicle(solver: RoutingSolver<FixedMatrixProvider>) {
    let request = three_customer_request();
    let solution = solver.solve(&request).expect("solve should succeed");
    assert_eq!(solution.status, SolveStatus::Ok);
    assert_eq!(solution.vehicles_used, 1);
    assert_eq!(solution.diagnostics.attempted_vehicle_counts, vec![1]);
    let problem = three_customer_problem().expect("valid scenario");
    assert!(invariant_violations(&problem, &solution).is_empty());
    let route = solution.routes.first().expect("one route");
    assert_eq!(route.customer_count(), 3);
    assert_eq!(route.load, 3);
}

#[rstest]
fn narrow_window_without_escalation_has_no_solution(solver: RoutingSolver<FixedMatrixProvider>) {
    let mut request = three_customer_request();
    request.config.client_window = TimeWindow::new(0, 50);
    request.config.auto_escalate = false;
    let solution = solver.solve(&request).expect("solve should succeed");
    assert_eq!(solution.status, SolveStatus::NoSolution);
    assert!(solution.routes.is_empty());
    assert_eq!(solution.diagnostics.attempted_vehicle_counts, vec![1]);
}

#[rstest]
fn empty_request_has_no_data(solver: RoutingSolver<FixedMatrixProvider>) {
    let mut request = three_customer_request();
    request.customers.clear();
    let solution = solver.solve(&request).expect("solve should succeed");
    assert_eq!(solution.status, SolveStatus::NoData);
    assert_eq!(solution.vehicles_used, 0);
}

#[rstest]
fn provider_failure_is_not_masked() {
    let solver = RoutingSolver::new(FixedMatrixProvider::failing(TravelMatrixError::ServiceError {
        code: "NoTable".to_owned(),
        message: "no table".to_owned(),
    }));
    let err = solver
        .solve(&three_customer_request())
        .expect_err("provider failure should surface");
    assert!(matches!(err, SolveError::TravelMatrix(_)));
}

#[rstest]
fn capacity_forces_escalation(solver: RoutingSolver<FixedMatrixProvider>) {
    let mut request = three_customer_request();
    request.config.vehicle_capacity = 1;
    request.config.escalation_step = 1;
    let solution = solver.solve(&request).expect("solve should succeed");
    assert_eq!(solution.status, SolveStatus::Ok);
    assert_eq!(solution.vehicles_used, 3);
    assert_eq!(solution.diagnostics.attempted_vehicle_counts, vec![1, 2, 3]);
    assert_eq!(solution.diagnostics.succeeded_with, Some(3));
}

#[rstest]
fn customer_window_orders_visits(solver: RoutingSolver<FixedMatrixProvider>) {
    let mut request = three_customer_request();
    request.config.initial_vehicles = VehicleCount::Fixed(2);
    if let Some(last) = request.customers.last_mut() {
        last.time_window = Some(TimeWindow::new(0, 400));
    }
    let solution = solver.solve(&request).expect("solve should succeed");
    assert_eq!(solution.status, SolveStatus::Ok);
    let problem = ProblemBuilder::new(&request.depot, &request.customers, &request.config)
        .build(&three_customer_matrix())
        .expect("valid problem");
    assert!(invariant_violations(&problem, &solution).is_empty());
    let third = solution
        .routes
        .iter()
        .flat_map(|route| route.customers())
        .find(|stop| stop.node == 3)
        .expect("customer 3 is served");
    assert!(third.arrival_secs <= 400);
}

#[rstest]
#[case(FirstSolutionStrategy::PathCheapestArc, LocalSearchMetaheuristic::GuidedLocalSearch)]
#[case(FirstSolutionStrategy::CheapestInsertion, LocalSearchMetaheuristic::GuidedLocalSearch)]
#[case(FirstSolutionStrategy::PathCheapestArc, LocalSearchMetaheuristic::GreedyDescent)]
fn strategies_agree_on_the_scenario(
    #[case] first_solution_strategy: FirstSolutionStrategy,
    #[case] local_search_metaheuristic: LocalSearchMetaheuristic,
) {
    let config = RoutingSolverConfig {
        first_solution_strategy,
        local_search_metaheuristic,
        homogeneous_fleet: true,
    };
    let solver = RoutingSolver::with_config(FixedMatrixProvider::new(three_customer_matrix()), config);
    let solution = solver
        .solve(&three_customer_request())
        .expect("solve should succeed");
    assert_eq!(solution.vehicles_used, 1);
    // Depot -> 1 -> 2 -> 3 -> depot: 100 + 150 + 180 + 300 travel plus service.
    assert_eq!(solution.total_time_secs, 730 + 3 * 600);
}

#[rstest]
fn model_errors_become_solve_errors() {
    let err = SolveError::from(RoutingModelError::NoVehicles);
    assert!(matches!(err, SolveError::Model { .. }));
}

#[rstest]
fn parameters_follow_budget_and_config() {
    let problem = three_customer_problem().expect("valid scenario");
    let config = RoutingSolverConfig {
        local_search_metaheuristic: LocalSearchMetaheuristic::GreedyDescent,
        ..RoutingSolverConfig::default()
    };
    let parameters = config.parameters(problem.budget());
    assert_eq!(parameters.max_iterations, Some(200));
    assert_eq!(parameters.time_limit, problem.budget().time_limit);
    assert_eq!(
        parameters.local_search_metaheuristic,
        LocalSearchMetaheuristic::GreedyDescent
    );
}
