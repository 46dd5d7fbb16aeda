//! Solution Extractor output: routes, totals and status.

use std::fmt;
use std::time::Duration;

use geo::Coord;
use serde::{Deserialize, Serialize};

use crate::{DEPOT, Problem, RoutePlan};

/// Terminal status of a solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SolveStatus {
    /// Every customer is routed.
    Ok,
    /// There were no customers to route.
    NoData,
    /// No tried vehicle count produced a feasible schedule.
    NoSolution,
}

impl SolveStatus {
    /// Wire name of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::NoData => "NO_DATA",
            Self::NoSolution => "NO_SOLUTION",
        }
    }
}

impl fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One stop on a route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stop {
    /// Node index, 0 for the depot.
    pub node: usize,
    /// Display name, if the request supplied one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Position, `x` = longitude and `y` = latitude.
    pub location: Coord<f64>,
    /// Service start (or depot departure/return), seconds since midnight.
    pub arrival_secs: i64,
    /// Whether this stop is the depot.
    pub is_depot: bool,
}

/// A used vehicle's route from the depot back to the depot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    /// Vehicle slot within the succeeding trial.
    pub vehicle: usize,
    /// Stops in visiting order.
    pub stops: Vec<Stop>,
    /// Total demand served.
    pub load: i64,
    /// Distance driven including the return leg, in kilometres.
    pub distance_km: f64,
    /// Travel plus service time including the return leg, in seconds.
    pub time_secs: i64,
}

impl Route {
    /// Customer stops, excluding both depot visits.
    pub fn customers(&self) -> impl Iterator<Item = &Stop> + '_ {
        self.stops.iter().filter(|stop| !stop.is_depot)
    }

    /// Number of customers served.
    #[must_use]
    pub fn customer_count(&self) -> usize {
        self.customers().count()
    }

    /// Departure time from the depot.
    #[must_use]
    pub fn departure_secs(&self) -> Option<i64> {
        self.stops.first().map(|stop| stop.arrival_secs)
    }

    /// Return time to the depot.
    #[must_use]
    pub fn return_secs(&self) -> Option<i64> {
        self.stops.last().map(|stop| stop.arrival_secs)
    }
}

/// Solve bookkeeping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostics {
    /// Wall-clock duration of the whole solve.
    pub solve_time: Duration,
    /// Vehicle counts tried, in order.
    pub attempted_vehicle_counts: Vec<usize>,
    /// Vehicle count of the succeeding trial.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub succeeded_with: Option<usize>,
}

/// Result of one solve. Check [`Solution::status`] before reading routes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Solution {
    /// Terminal status.
    pub status: SolveStatus,
    /// Used routes ordered by vehicle slot.
    pub routes: Vec<Route>,
    /// Sum of route distances in kilometres.
    pub total_distance_km: f64,
    /// Sum of route times in seconds.
    pub total_time_secs: i64,
    /// Number of routes serving at least one customer.
    pub vehicles_used: usize,
    /// Solve bookkeeping.
    pub diagnostics: Diagnostics,
}

impl Solution {
    /// Solution reporting that no customers were supplied.
    #[must_use]
    pub fn no_data(diagnostics: Diagnostics) -> Self {
        Self::empty(SolveStatus::NoData, diagnostics)
    }

    /// Solution reporting that escalation was exhausted.
    #[must_use]
    pub fn no_solution(diagnostics: Diagnostics) -> Self {
        Self::empty(SolveStatus::NoSolution, diagnostics)
    }

    const fn empty(status: SolveStatus, diagnostics: Diagnostics) -> Self {
        Self {
            status,
            routes: Vec::new(),
            total_distance_km: 0.0,
            total_time_secs: 0,
            vehicles_used: 0,
            diagnostics,
        }
    }

    /// Build an `OK` solution from backend route plans.
    ///
    /// Plans without customers are dropped. Distance and time accumulate over
    /// every traversed arc including the return leg; time counts travel plus
    /// service at the origin, matching the routing objective.
    #[must_use]
    pub fn assemble(problem: &Problem, plans: &[RoutePlan], diagnostics: Diagnostics) -> Self {
        let mut routes: Vec<Route> = plans
            .iter()
            .filter(|plan| plan.customers().next().is_some())
            .map(|plan| assemble_route(problem, plan))
            .collect();
        routes.sort_by_key(|route| route.vehicle);
        let total_distance_km = routes.iter().map(|route| route.distance_km).sum();
        let total_time_secs = routes
            .iter()
            .map(|route| route.time_secs)
            .fold(0_i64, i64::saturating_add);
        Self {
            status: SolveStatus::Ok,
            vehicles_used: routes.len(),
            routes,
            total_distance_km,
            total_time_secs,
            diagnostics,
        }
    }

    /// Whether the solve produced routes.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.status == SolveStatus::Ok
    }
}

fn assemble_route(problem: &Problem, plan: &RoutePlan) -> Route {
    let stops = plan
        .visits
        .iter()
        .map(|visit| {
            let node = problem.node(visit.node);
            Stop {
                node: visit.node,
                name: node.and_then(|n| n.name.clone()),
                location: node.map_or(Coord { x: 0.0, y: 0.0 }, |n| n.location),
                arrival_secs: visit.arrival_secs,
                is_depot: visit.node == DEPOT,
            }
        })
        .collect();
    let load = plan
        .customers()
        .map(|node| problem.demand(node))
        .fold(0_i64, i64::saturating_add);
    let arcs = plan.visits.windows(2).filter_map(|pair| match pair {
        [from, to] => Some((from.node, to.node)),
        _ => None,
    });
    let (distance_km, time_secs) = arcs.fold((0.0_f64, 0_i64), |(km, secs), (from, to)| {
        (
            km + problem.distance_km(from, to),
            secs.saturating_add(problem.transit_secs(from, to)),
        )
    });
    Route {
        vehicle: plan.vehicle,
        stops,
        load,
        distance_km,
        time_secs,
    }
}
