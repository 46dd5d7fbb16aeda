//! Deterministic providers, trials and scenarios shared by unit and
//! behaviour tests.

use std::cell::RefCell;

use geo::Coord;

use crate::{
    Customer, DEPOT, Depot, Problem, ProblemBuilder, ProblemError, RoutePlan, RouteTrial,
    Solution, SolveError, SolveRequest, SolverConfig, TimeWindow, TravelMatrix, TravelMatrixError,
    TravelMatrixProvider, TrialOutcome, VehicleCount, Visit,
};

/// Kilometres per second of travel used when deriving test distances
/// (36 km/h).
pub const TEST_KM_PER_SEC: f64 = 0.01;

/// Travel times of the three-customer scenario, depot first.
pub const THREE_CUSTOMER_DURATIONS: [[f64; 4]; 4] = [
    [0.0, 100.0, 200.0, 300.0],
    [100.0, 0.0, 150.0, 250.0],
    [200.0, 150.0, 0.0, 180.0],
    [300.0, 250.0, 180.0, 0.0],
];

/// `TravelMatrixProvider` returning a fixed matrix or error.
///
/// The matrix must cover exactly the requested locations; a mismatch yields
/// `TravelMatrixError::DimensionMismatch`.
#[derive(Debug, Clone)]
pub struct FixedMatrixProvider {
    response: Result<TravelMatrix, TravelMatrixError>,
}

impl FixedMatrixProvider {
    /// Serve `matrix` for every request.
    #[must_use]
    pub const fn new(matrix: TravelMatrix) -> Self {
        Self {
            response: Ok(matrix),
        }
    }

    /// Serve `durations` with distances derived at [`TEST_KM_PER_SEC`].
    #[must_use]
    pub fn from_durations(durations: Vec<Vec<f64>>) -> Self {
        Self {
            response: TravelMatrix::from_durations(durations, TEST_KM_PER_SEC),
        }
    }

    /// Fail every non-empty request with `error`.
    #[must_use]
    pub const fn failing(error: TravelMatrixError) -> Self {
        Self {
            response: Err(error),
        }
    }
}

impl TravelMatrixProvider for FixedMatrixProvider {
    fn get_travel_matrix(
        &self,
        locations: &[Coord<f64>],
    ) -> Result<TravelMatrix, TravelMatrixError> {
        if locations.is_empty() {
            return Err(TravelMatrixError::EmptyInput);
        }
        let matrix = self.response.clone()?;
        matrix.ensure_len(locations.len())?;
        Ok(matrix)
    }
}

/// Matrix of the three-customer scenario.
#[must_use]
pub fn three_customer_matrix() -> TravelMatrix {
    TravelMatrix::from_fn(THREE_CUSTOMER_DURATIONS.len(), |from, to| {
        let secs = THREE_CUSTOMER_DURATIONS
            .get(from)
            .and_then(|row| row.get(to))
            .copied()
            .unwrap_or(f64::INFINITY);
        (secs, secs * TEST_KM_PER_SEC)
    })
}

/// Three unit-demand customers with ten-minute service inside `[0, 36000]`,
/// starting from one vehicle.
#[must_use]
pub fn three_customer_request() -> SolveRequest {
    let window = TimeWindow::new(0, 36_000);
    let config = SolverConfig {
        client_window: window,
        depot_window: Some(window),
        service_time_secs: 600,
        vehicle_capacity: 50,
        initial_vehicles: VehicleCount::Fixed(1),
        time_limit_secs: 5,
        max_search_iterations: Some(200),
        ..SolverConfig::default()
    };
    SolveRequest {
        depot: Depot {
            name: Some("Depot".to_owned()),
            location: Coord { x: 0.0, y: 0.0 },
        },
        customers: (1..=3_u32)
            .map(|idx| {
                Customer::new(Coord {
                    x: f64::from(idx) * 0.001,
                    y: 0.0,
                })
                .with_name(format!("C{idx}"))
            })
            .collect(),
        config,
    }
}

/// Problem built from [`three_customer_request`] and
/// [`three_customer_matrix`].
///
/// # Errors
///
/// Propagates [`ProblemError`]; the scenario itself is valid.
pub fn three_customer_problem() -> Result<Problem, ProblemError> {
    let request = three_customer_request();
    ProblemBuilder::new(&request.depot, &request.customers, &request.config)
        .build(&three_customer_matrix())
}

/// Route plan visiting `customers` in order with earliest service starts.
#[must_use]
pub fn tour_plan(problem: &Problem, vehicle: usize, customers: &[usize]) -> RoutePlan {
    let mut clock = problem.depot_window().start;
    let mut visits = vec![Visit {
        node: DEPOT,
        arrival_secs: clock,
    }];
    let mut previous = DEPOT;
    for &node in customers.iter().chain(std::iter::once(&DEPOT)) {
        clock = clock.saturating_add(problem.transit_secs(previous, node));
        if node != DEPOT {
            clock = clock.max(problem.window(node).map_or(clock, |w| w.start));
        }
        visits.push(Visit {
            node,
            arrival_secs: clock,
        });
        previous = node;
    }
    RoutePlan { vehicle, visits }
}

/// `RouteTrial` that is feasible only from `threshold` vehicles upwards.
///
/// Feasible trials deal customers round-robin across every vehicle, so the
/// number of used vehicles is `min(vehicles, customers)`.
#[derive(Debug, Default)]
pub struct ThresholdTrial {
    threshold: usize,
    attempts: RefCell<Vec<usize>>,
}

impl ThresholdTrial {
    /// Create a trial feasible from `threshold` vehicles.
    #[must_use]
    pub const fn new(threshold: usize) -> Self {
        Self {
            threshold,
            attempts: RefCell::new(Vec::new()),
        }
    }

    /// Vehicle counts tried so far.
    #[must_use]
    pub fn attempts(&self) -> Vec<usize> {
        self.attempts.borrow().clone()
    }
}

impl RouteTrial for ThresholdTrial {
    fn try_route(&self, problem: &Problem, vehicles: usize) -> Result<TrialOutcome, SolveError> {
        self.attempts.borrow_mut().push(vehicles);
        if vehicles < self.threshold || vehicles == 0 {
            return Ok(TrialOutcome::Infeasible);
        }
        let plans = (0..vehicles)
            .map(|vehicle| {
                let assigned: Vec<usize> = problem
                    .customers()
                    .skip(vehicle)
                    .step_by(vehicles)
                    .collect();
                tour_plan(problem, vehicle, &assigned)
            })
            .collect();
        Ok(TrialOutcome::Feasible(plans))
    }
}

/// Route invariants broken by `solution`, one message per violation.
///
/// Checks that every customer is served exactly once, routes start and end
/// at the depot, loads stay within capacity, arrivals lie inside windows and
/// consecutive arrivals leave room for service and travel. Solutions that
/// are not `OK` must carry no routes.
#[must_use]
pub fn invariant_violations(problem: &Problem, solution: &Solution) -> Vec<String> {
    let mut violations = Vec::new();
    if !solution.is_ok() {
        if !solution.routes.is_empty() {
            violations.push(format!("{} solution carries routes", solution.status));
        }
        return violations;
    }
    let mut served = vec![0_usize; problem.node_count()];
    for route in &solution.routes {
        let vehicle = route.vehicle;
        let ends_at_depot = route.stops.first().is_some_and(|stop| stop.node == DEPOT)
            && route.stops.last().is_some_and(|stop| stop.node == DEPOT);
        if !ends_at_depot {
            violations.push(format!("vehicle {vehicle} does not start and end at the depot"));
        }
        let load: i64 = route.customers().map(|stop| problem.demand(stop.node)).sum();
        if load > problem.vehicle_capacity() || route.load != load {
            violations.push(format!("vehicle {vehicle} carries {load} (reported {})", route.load));
        }
        for stop in route.customers() {
            if let Some(count) = served.get_mut(stop.node) {
                *count += 1;
            }
            let inside = problem
                .window(stop.node)
                .is_some_and(|window| window.contains(stop.arrival_secs));
            if !inside {
                violations.push(format!(
                    "vehicle {vehicle} reaches node {} at {} outside its window",
                    stop.node, stop.arrival_secs
                ));
            }
        }
        for pair in route.stops.windows(2) {
            if let [from, to] = pair {
                let earliest = from
                    .arrival_secs
                    .saturating_add(problem.transit_secs(from.node, to.node));
                if to.arrival_secs < earliest {
                    violations.push(format!(
                        "vehicle {vehicle} reaches node {} at {} before {earliest}",
                        to.node, to.arrival_secs
                    ));
                }
            }
        }
    }
    for customer in problem.customers() {
        let count = served.get(customer).copied().unwrap_or_default();
        if count != 1 {
            violations.push(format!("customer {customer} served {count} times"));
        }
    }
    violations
}
