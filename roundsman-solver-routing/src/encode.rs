//! VRPTW encoding of a [`Problem`] as a [`RoutingModel`].

use roundsman_core::{DEPOT, Problem, TimeWindow, UNREACHABLE_SECS};

use crate::model::{RoutingIndexManager, RoutingModel, RoutingModelError};

/// Name of the load dimension.
pub const CAPACITY_DIMENSION: &str = "Capacity";

/// Name of the time dimension; its cumuls are service start times.
pub const TIME_DIMENSION: &str = "Time";

/// Build the routing model of one trial with `vehicles` vehicles.
///
/// The arc cost and the time transit are both `travel + service(origin)`.
/// Load accumulates customer demand up to the vehicle capacity. Time may
/// wait up to the maximum waiting time per arc, stays below the horizon,
/// lies inside each customer's window at its visit and inside the depot
/// window at every vehicle's start and end. Each used vehicle adds the fixed
/// vehicle cost.
///
/// # Errors
///
/// Returns [`RoutingModelError::NoVehicles`] when `vehicles` is zero.
///
/// # Examples
///
/// ```
/// use roundsman_core::test_support::three_customer_problem;
/// use roundsman_solver_routing::{TIME_DIMENSION, build_model};
///
/// let problem = three_customer_problem().expect("valid scenario");
/// let model = build_model(&problem, 2).expect("model builds");
/// assert_eq!(model.vehicles(), 2);
/// assert!(model.dimension(TIME_DIMENSION).is_some());
/// ```
pub fn build_model(problem: &Problem, vehicles: usize) -> Result<RoutingModel<'_>, RoutingModelError> {
    let manager = RoutingIndexManager::new(problem.node_count(), vehicles, DEPOT)?;
    let nodes: Vec<usize> = (0..manager.num_indices())
        .map(|index| manager.index_to_node(index).unwrap_or(DEPOT))
        .collect();
    let windows: Vec<(usize, TimeWindow)> = problem
        .customers()
        .filter_map(|node| Some((manager.node_to_index(node)?, problem.window(node)?)))
        .chain((0..vehicles).flat_map(|vehicle| {
            let depot = problem.depot_window();
            [(manager.start(vehicle), depot), (manager.end(vehicle), depot)]
        }))
        .collect();

    let mut model = RoutingModel::new(manager);
    let arc_nodes = nodes.clone();
    let transit = model.register_transit_callback(move |from, to| {
        match (arc_nodes.get(from), arc_nodes.get(to)) {
            (Some(&origin), Some(&destination)) => problem.transit_secs(origin, destination),
            _ => UNREACHABLE_SECS,
        }
    });
    model.set_arc_cost_evaluator_of_all_vehicles(transit)?;
    model.set_fixed_cost_of_all_vehicles(problem.vehicle_fixed_cost());

    let demand = model.register_unary_transit_callback(move |from| {
        nodes.get(from).map_or(0, |&node| problem.demand(node))
    });
    model.add_dimension(demand, 0, problem.vehicle_capacity(), true, CAPACITY_DIMENSION)?;
    model.add_dimension(
        transit,
        problem.max_wait_secs(),
        problem.time_horizon_secs(),
        false,
        TIME_DIMENSION,
    )?;
    let time = model.dimension_mut(TIME_DIMENSION)?;
    for (index, window) in windows {
        time.set_cumul_range(index, window.start, window.end)?;
    }
    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use roundsman_core::test_support::three_customer_problem;
    use rstest::{fixture, rstest};

    #[fixture]
    fn problem() -> Problem {
        three_customer_problem().expect("valid scenario")
    }

    #[rstest]
    fn customer_windows_bound_time_cumuls(problem: Problem) {
        let model = build_model(&problem, 2).expect("model builds");
        let time = model.dimension(TIME_DIMENSION).expect("time dimension");
        let manager = model.index_manager();
        for customer in problem.customers() {
            let index = manager.node_to_index(customer).expect("customer index");
            let window = problem.window(customer).expect("customer window");
            assert_eq!(time.cumul_range(index), Some((window.start, window.end)));
        }
        let depot = problem.depot_window();
        assert_eq!(
            time.cumul_range(model.end(1)),
            Some((depot.start, depot.end))
        );
        assert_eq!(time.slack_max(), problem.max_wait_secs());
        assert_eq!(time.capacity(0), Some(problem.time_horizon_secs()));
    }

    #[rstest]
    fn capacity_starts_empty(problem: Problem) {
        let model = build_model(&problem, 1).expect("model builds");
        let load = model.dimension(CAPACITY_DIMENSION).expect("capacity dimension");
        assert!(load.fixes_start_cumul_to_zero());
        assert_eq!(load.slack_max(), 0);
        assert_eq!(load.capacity(0), Some(problem.vehicle_capacity()));
    }

    #[rstest]
    fn zero_vehicles_is_rejected(problem: Problem) {
        assert!(matches!(
            build_model(&problem, 0),
            Err(RoutingModelError::NoVehicles)
        ));
    }
}
