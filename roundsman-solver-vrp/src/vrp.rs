//! `vrp-core` modelling helpers for `VrpSolver`.
//!
//! This module converts a routing problem into a `vrp-core` problem with a
//! fixed number of vehicles, runs the solver, and translates the resulting
//! tours back into route plans.

use std::sync::Arc;

use roundsman_core::{DEPOT, RoutePlan, SolveError, TimeWindow as Window, Visit, round_travel_secs};
use vrp_core::models::common::{Demand, Location, Profile, SingleDimLoad, TimeWindow};
use vrp_core::models::problem::TravelTime;
use vrp_core::models::solution::{Activity, Route as VrpRoute};
use vrp_core::prelude::*;

custom_dimension!(VehicleSlot typeof usize);

/// Convert whole seconds to `vrp-core` time.
#[expect(
    clippy::cast_precision_loss,
    reason = "model times stay far below 2^52 seconds"
)]
const fn seconds(value: i64) -> f64 {
    value as f64
}

fn time_window(window: Window) -> TimeWindow {
    TimeWindow::new(seconds(window.start), seconds(window.end))
}

fn to_solve_error(err: &GenericError) -> SolveError {
    SolveError::model(err.to_string())
}

fn define_goal(transport: Arc<dyn TransportCost>) -> GenericResult<GoalContext> {
    let unassigned_feature = MinimizeUnassignedBuilder::new("min-unassigned").build()?;
    let transport_feature = TransportFeatureBuilder::new("min-cost")
        .set_transport_cost(transport)
        .set_time_constrained(true)
        .build_minimize_cost()?;
    let capacity_feature = CapacityFeatureBuilder::<SingleDimLoad>::new("capacity").build()?;

    GoalContextBuilder::with_features(&[unassigned_feature, transport_feature, capacity_feature])?
        .build()
}

fn load(value: i64) -> GenericResult<SingleDimLoad> {
    let amount = i32::try_from(value).map_err(|_| format!("load {value} exceeds the model range"))?;
    Ok(SingleDimLoad::new(amount))
}

fn define_jobs(problem: &roundsman_core::Problem) -> GenericResult<Vec<Job>> {
    problem
        .customers()
        .map(|node| {
            let window = problem.window(node).unwrap_or_else(|| problem.client_window());
            SingleBuilder::default()
                .id(format!("c{node}").as_str())
                .demand(Demand::<SingleDimLoad> {
                    pickup: (SingleDimLoad::default(), SingleDimLoad::default()),
                    delivery: (load(problem.demand(node))?, SingleDimLoad::default()),
                })
                .location(node)?
                .duration(seconds(problem.service_secs(node)))?
                .times(vec![time_window(window)])?
                .build_as_job()
        })
        .collect()
}

fn define_vehicles(problem: &roundsman_core::Problem, vehicles: usize) -> GenericResult<Vec<Vehicle>> {
    let depot = problem.depot_window();
    let capacity = load(problem.vehicle_capacity())?;
    (0..vehicles)
        .map(|slot| {
            let mut vehicle = VehicleBuilder::default()
                .id(format!("v{slot}").as_str())
                .capacity(capacity)
                .dimension(|dimens| {
                    dimens.set_vehicle_slot(slot);
                })
                .add_detail(
                    VehicleDetailBuilder::default()
                        .set_start_location(DEPOT)
                        .set_start_time(seconds(depot.start))
                        .set_start_time_latest(seconds(depot.end))
                        .set_end_location(DEPOT)
                        .set_end_time(seconds(depot.end))
                        .build()?,
                )
                .build()?;
            vehicle.costs.fixed = seconds(problem.vehicle_fixed_cost());
            Ok(vehicle)
        })
        .collect()
}

/// Whole-second travel times shared by distance and duration lookups.
///
/// Route cost is travel time, matching the arc cost of the native backend up
/// to the constant service total.
struct TravelTimeTransportCost {
    durations: Vec<Vec<f64>>,
}

impl TravelTimeTransportCost {
    fn new(problem: &roundsman_core::Problem) -> Self {
        let size = problem.node_count();
        let durations = (0..size)
            .map(|from| {
                (0..size)
                    .map(|to| seconds(problem.travel_secs(from, to)))
                    .collect()
            })
            .collect();
        Self { durations }
    }

    fn duration_seconds(&self, from: Location, to: Location) -> f64 {
        let result = self
            .durations
            .get(from)
            .and_then(|row| row.get(to))
            .copied();
        debug_assert!(result.is_some(), "Matrix lookup failed: from={from}, to={to}");
        result.unwrap_or(0.0)
    }
}

impl TransportCost for TravelTimeTransportCost {
    fn distance(&self, _route: &VrpRoute, from: Location, to: Location, _departure: TravelTime) -> Cost {
        self.duration_seconds(from, to)
    }

    fn duration(&self, _route: &VrpRoute, from: Location, to: Location, _departure: TravelTime) -> f64 {
        self.duration_seconds(from, to)
    }

    fn distance_approx(&self, profile: &Profile, from: usize, to: usize) -> f64 {
        self.duration_approx(profile, from, to)
    }

    fn duration_approx(&self, _profile: &Profile, from: usize, to: usize) -> f64 {
        self.duration_seconds(from, to)
    }
}

/// Search limits for one `vrp-core` run.
#[derive(Debug, Clone, Copy)]
pub(super) struct VrpLimits {
    pub(super) max_generations: usize,
    pub(super) max_time_secs: usize,
}

/// One trial of `problem` with a fixed number of vehicles.
pub(super) struct VrpTrial<'a> {
    problem: &'a roundsman_core::Problem,
    vehicles: usize,
}

impl<'a> VrpTrial<'a> {
    pub(super) const fn new(problem: &'a roundsman_core::Problem, vehicles: usize) -> Self {
        Self { problem, vehicles }
    }

    fn define_problem(&self) -> GenericResult<Problem> {
        let transport: Arc<dyn TransportCost> = Arc::new(TravelTimeTransportCost::new(self.problem));
        let goal = define_goal(transport.clone())?;
        ProblemBuilder::default()
            .add_jobs(define_jobs(self.problem)?.into_iter())
            .add_vehicles(define_vehicles(self.problem, self.vehicles)?.into_iter())
            .with_goal(goal)
            .with_transport_cost(transport)
            .build()
    }

    /// Search the trial; `None` when any customer stays unassigned.
    pub(super) fn solve(&self, limits: VrpLimits) -> Result<Option<Vec<RoutePlan>>, SolveError> {
        let problem = Arc::new(self.define_problem().map_err(|err| to_solve_error(&err))?);
        let vrp_config = VrpConfigBuilder::new(problem.clone())
            .prebuild()
            .map_err(|err| to_solve_error(&err))?
            .with_max_generations(Some(limits.max_generations))
            .with_max_time(Some(limits.max_time_secs))
            .build()
            .map_err(|err| to_solve_error(&err))?;

        let solution = vrp_core::solver::Solver::new(problem, vrp_config)
            .solve()
            .map_err(|err| to_solve_error(&err))?;

        if !solution.unassigned.is_empty() {
            log::debug!(
                "{} customers unassigned with {} vehicles",
                solution.unassigned.len(),
                self.vehicles
            );
            return Ok(None);
        }

        let mut plans = solution
            .routes
            .iter()
            .filter(|route| route.tour.job_count() > 0)
            .map(route_plan)
            .collect::<Result<Vec<_>, _>>()?;
        plans.sort_by_key(|plan| plan.vehicle);
        Ok(Some(plans))
    }
}

fn route_plan(route: &VrpRoute) -> Result<RoutePlan, SolveError> {
    let vehicle = route
        .actor
        .vehicle
        .dimens
        .get_vehicle_slot()
        .copied()
        .ok_or_else(|| SolveError::model("vrp-core route has no vehicle slot"))?;
    let last = route.tour.total().saturating_sub(1);
    let visits = route
        .tour
        .all_activities()
        .enumerate()
        .map(|(position, activity)| Visit {
            node: activity.place.location,
            arrival_secs: service_start(activity, position == last),
        })
        .collect();
    Ok(RoutePlan { vehicle, visits })
}

/// Time service begins: departure minus duration for customers, departure
/// for the depot start and arrival for the depot end.
#[expect(
    clippy::float_arithmetic,
    reason = "vrp-core schedules are floating-point"
)]
fn service_start(activity: &Activity, is_end: bool) -> i64 {
    let secs = match (&activity.job, is_end) {
        (Some(_), _) => activity.schedule.departure - activity.place.duration,
        (None, false) => activity.schedule.departure,
        (None, true) => activity.schedule.arrival,
    };
    round_travel_secs(secs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use roundsman_core::test_support::three_customer_problem;
    use rstest::rstest;

    #[rstest]
    fn one_job_per_customer() {
        let problem = three_customer_problem().expect("valid scenario");
        let jobs = define_jobs(&problem).expect("jobs build");
        assert_eq!(jobs.len(), 3);
    }

    #[rstest]
    fn vehicles_carry_slots_and_fixed_cost() {
        let problem = three_customer_problem().expect("valid scenario");
        let vehicles = define_vehicles(&problem, 2).expect("vehicles build");
        let slots: Vec<usize> = vehicles
            .iter()
            .filter_map(|vehicle| vehicle.dimens.get_vehicle_slot().copied())
            .collect();
        assert_eq!(slots, vec![0, 1]);
        for vehicle in &vehicles {
            assert_eq!(
                vehicle.costs.fixed.to_bits(),
                seconds(problem.vehicle_fixed_cost()).to_bits()
            );
        }
    }

    #[rstest]
    fn oversized_load_is_rejected() {
        assert!(load(i64::from(i32::MAX) + 1).is_err());
        assert!(load(5).is_ok());
    }

    #[rstest]
    fn transport_uses_problem_travel_times() {
        let problem = three_customer_problem().expect("valid scenario");
        let transport = TravelTimeTransportCost::new(&problem);
        assert_eq!(
            transport.duration_approx(&Profile::default(), 1, 2).to_bits(),
            seconds(problem.travel_secs(1, 2)).to_bits()
        );
    }
}
