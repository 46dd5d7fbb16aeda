//! Problem Builder: per-node arrays consumed by the routing backends.
//!
//! A [`Problem`] is the integral view of one routing request. Node 0 is the
//! depot with zero demand and zero service time; nodes `1..=n` follow the
//! customer order of the request. Travel times are rounded to whole seconds
//! because the routing model works on integer cumuls. The rounding is lossy
//! by up to half a second per arc.

use std::time::Duration;

use geo::Coord;
use thiserror::Error;

use crate::{
    Customer, Depot, SolverConfig, TimeWindow, TravelMatrix, TravelMatrixError, VehicleCount,
};

/// Index of the depot node.
pub const DEPOT: usize = 0;

/// Travel time assigned to arcs the provider could not route.
///
/// Large enough to break any time window, small enough that sums of a few
/// thousand sentinels do not overflow `i64`.
pub const UNREACHABLE_SECS: i64 = 1 << 40;

/// Vehicles added on top of the service-time lower bound by
/// [`estimate_vehicle_count`].
pub const VEHICLE_SAFETY_MARGIN: usize = 2;

/// Errors raised while assembling a [`Problem`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProblemError {
    /// There are no customers to route.
    #[error("no customers to route")]
    NoData,
    /// A customer window override was negative or inverted.
    #[error("customer {node} window [{start}, {end}] must satisfy 0 <= start <= end")]
    InvalidWindow {
        /// Node index of the customer.
        node: usize,
        /// Window start.
        start: i64,
        /// Window end.
        end: i64,
    },
    /// The travel matrix does not cover the depot and every customer.
    #[error(transparent)]
    Matrix(#[from] TravelMatrixError),
}

/// One stop of the routing problem.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Optional display name.
    pub name: Option<String>,
    /// Position, `x` = longitude and `y` = latitude.
    pub location: Coord<f64>,
    /// Load consumed by the visit; zero for the depot.
    pub demand: i64,
    /// Service time in seconds; zero for the depot.
    pub service_secs: i64,
    /// Window for the service start.
    pub window: TimeWindow,
}

/// Search limits handed to every trial.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchBudget {
    /// Wall-clock limit of one trial.
    pub time_limit: Duration,
    /// Optional cap on improvement iterations.
    pub max_iterations: Option<u64>,
    /// Seed for randomised neighbourhood ordering.
    pub seed: u64,
}

/// Integral routing problem shared by all trials of one solve.
#[derive(Debug, Clone, PartialEq)]
pub struct Problem {
    nodes: Vec<Node>,
    travel_secs: Vec<Vec<i64>>,
    distances_km: Vec<Vec<f64>>,
    client_window: TimeWindow,
    vehicle_capacity: i64,
    vehicle_fixed_cost: i64,
    time_horizon_secs: i64,
    max_wait_secs: i64,
    budget: SearchBudget,
}

impl Problem {
    /// All nodes, depot first.
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Node at `index`, if present.
    #[must_use]
    pub fn node(&self, index: usize) -> Option<&Node> {
        self.nodes.get(index)
    }

    /// Number of nodes including the depot.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of customers.
    #[must_use]
    pub fn customer_count(&self) -> usize {
        self.nodes.len().saturating_sub(1)
    }

    /// Customer node indices, `1..=n`.
    pub fn customers(&self) -> impl Iterator<Item = usize> + use<> {
        1..self.nodes.len()
    }

    /// Demand of `node`, zero when out of range.
    #[must_use]
    pub fn demand(&self, node: usize) -> i64 {
        self.nodes.get(node).map_or(0, |n| n.demand)
    }

    /// Service time of `node`, zero when out of range.
    #[must_use]
    pub fn service_secs(&self, node: usize) -> i64 {
        self.nodes.get(node).map_or(0, |n| n.service_secs)
    }

    /// Service window of `node`.
    #[must_use]
    pub fn window(&self, node: usize) -> Option<TimeWindow> {
        self.nodes.get(node).map(|n| n.window)
    }

    /// Depot opening hours; constrains every vehicle's start and end.
    #[must_use]
    pub fn depot_window(&self) -> TimeWindow {
        self.window(DEPOT).unwrap_or(self.client_window)
    }

    /// Shared client window used for customers without an override.
    #[must_use]
    pub const fn client_window(&self) -> TimeWindow {
        self.client_window
    }

    /// Rounded travel time from `from` to `to`.
    ///
    /// Returns [`UNREACHABLE_SECS`] for unknown indices.
    #[must_use]
    pub fn travel_secs(&self, from: usize, to: usize) -> i64 {
        let secs = self
            .travel_secs
            .get(from)
            .and_then(|row| row.get(to))
            .copied();
        debug_assert!(secs.is_some(), "travel lookup failed: from={from}, to={to}");
        secs.unwrap_or(UNREACHABLE_SECS)
    }

    /// Arc weight used for both cost and time: travel plus service at the
    /// origin.
    ///
    /// Charging service at the origin makes the time cumul at each node equal
    /// its service start.
    #[must_use]
    pub fn transit_secs(&self, from: usize, to: usize) -> i64 {
        self.travel_secs(from, to)
            .saturating_add(self.service_secs(from))
    }

    /// Travel distance from `from` to `to` in kilometres.
    #[must_use]
    pub fn distance_km(&self, from: usize, to: usize) -> f64 {
        let km = self
            .distances_km
            .get(from)
            .and_then(|row| row.get(to))
            .copied();
        debug_assert!(km.is_some(), "distance lookup failed: from={from}, to={to}");
        km.unwrap_or(0.0)
    }

    /// Capacity shared by every vehicle.
    #[must_use]
    pub const fn vehicle_capacity(&self) -> i64 {
        self.vehicle_capacity
    }

    /// Objective penalty per used vehicle.
    #[must_use]
    pub const fn vehicle_fixed_cost(&self) -> i64 {
        self.vehicle_fixed_cost
    }

    /// Upper bound of the time dimension.
    #[must_use]
    pub const fn time_horizon_secs(&self) -> i64 {
        self.time_horizon_secs
    }

    /// Longest wait permitted between consecutive stops.
    #[must_use]
    pub const fn max_wait_secs(&self) -> i64 {
        self.max_wait_secs
    }

    /// Limits for every trial.
    #[must_use]
    pub const fn budget(&self) -> SearchBudget {
        self.budget
    }

    /// Total service time over all customers.
    #[must_use]
    pub fn total_service_secs(&self) -> i64 {
        self.nodes
            .iter()
            .map(|node| node.service_secs)
            .fold(0_i64, i64::saturating_add)
    }

    /// Resolve the vehicle count of the first trial.
    ///
    /// `Auto` applies [`estimate_vehicle_count`] to the total service time
    /// and the client window.
    #[must_use]
    pub fn initial_vehicle_count(&self, requested: VehicleCount) -> usize {
        match requested {
            VehicleCount::Fixed(count) => count.max(1),
            VehicleCount::Auto => {
                estimate_vehicle_count(self.total_service_secs(), self.client_window)
            }
        }
    }
}

/// Heuristic fleet size: `ceil(total service / window span) + 2`.
///
/// The span is floored at one second and the result is at least one.
///
/// # Examples
///
/// ```
/// use roundsman_core::{TimeWindow, estimate_vehicle_count};
///
/// // Thirty ten-minute stops inside a two-hour window.
/// assert_eq!(estimate_vehicle_count(30 * 600, TimeWindow::from_hours(7, 9)), 5);
/// ```
#[must_use]
pub fn estimate_vehicle_count(total_service_secs: i64, window: TimeWindow) -> usize {
    let span = u64::try_from(window.span().max(1)).unwrap_or(1);
    let service = u64::try_from(total_service_secs).unwrap_or(0);
    let lower_bound = usize::try_from(service.div_ceil(span)).unwrap_or(usize::MAX);
    lower_bound.saturating_add(VEHICLE_SAFETY_MARGIN).max(1)
}

/// Round a provider duration to whole seconds.
///
/// Non-finite, negative or oversized values become [`UNREACHABLE_SECS`].
///
/// # Examples
///
/// ```
/// use roundsman_core::{UNREACHABLE_SECS, round_travel_secs};
///
/// assert_eq!(round_travel_secs(99.5), 100);
/// assert_eq!(round_travel_secs(f64::INFINITY), UNREACHABLE_SECS);
/// ```
#[must_use]
pub fn round_travel_secs(secs: f64) -> i64 {
    if !secs.is_finite() || secs < 0.0 {
        return UNREACHABLE_SECS;
    }
    let rounded = secs.round();
    if rounded >= UNREACHABLE_SECS as f64 {
        UNREACHABLE_SECS
    } else {
        rounded as i64
    }
}

/// Assembles a [`Problem`] from request data and a travel matrix.
///
/// # Examples
///
/// ```
/// use geo::Coord;
/// use roundsman_core::{Customer, Depot, ProblemBuilder, SolverConfig, TravelMatrix};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let depot = Depot::new(Coord { x: 0.0, y: 0.0 });
/// let customers = vec![Customer::new(Coord { x: 0.1, y: 0.0 })];
/// let config = SolverConfig::default();
/// let builder = ProblemBuilder::new(&depot, &customers, &config);
/// assert_eq!(builder.locations().len(), 2);
///
/// let matrix = TravelMatrix::from_durations(vec![vec![0.0, 60.4], vec![59.6, 0.0]], 0.01)?;
/// let problem = builder.build(&matrix)?;
/// assert_eq!(problem.travel_secs(0, 1), 60);
/// assert_eq!(problem.transit_secs(1, 0), 60 + 600);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ProblemBuilder<'a> {
    depot: &'a Depot,
    customers: &'a [Customer],
    config: &'a SolverConfig,
}

impl<'a> ProblemBuilder<'a> {
    /// Create a builder over borrowed request data.
    #[must_use]
    pub const fn new(depot: &'a Depot, customers: &'a [Customer], config: &'a SolverConfig) -> Self {
        Self {
            depot,
            customers,
            config,
        }
    }

    /// Coordinates to request from the travel-matrix provider, depot first.
    #[must_use]
    pub fn locations(&self) -> Vec<Coord<f64>> {
        std::iter::once(self.depot.location)
            .chain(self.customers.iter().map(|customer| customer.location))
            .collect()
    }

    /// Per-node attributes with configuration defaults applied.
    ///
    /// # Errors
    ///
    /// Returns [`ProblemError::NoData`] without customers and
    /// [`ProblemError::InvalidWindow`] for an invalid window override.
    pub fn nodes(&self) -> Result<Vec<Node>, ProblemError> {
        if self.customers.is_empty() {
            return Err(ProblemError::NoData);
        }
        let depot = Node {
            name: self.depot.name.clone(),
            location: self.depot.location,
            demand: 0,
            service_secs: 0,
            window: self.config.effective_depot_window(),
        };
        let customers = self
            .customers
            .iter()
            .enumerate()
            .map(|(offset, customer)| self.customer_node(offset.saturating_add(1), customer));
        std::iter::once(Ok(depot)).chain(customers).collect()
    }

    fn customer_node(&self, node: usize, customer: &Customer) -> Result<Node, ProblemError> {
        let window = customer.time_window.unwrap_or(self.config.client_window);
        if !window.is_valid() {
            return Err(ProblemError::InvalidWindow {
                node,
                start: window.start,
                end: window.end,
            });
        }
        Ok(Node {
            name: customer.name.clone(),
            location: customer.location,
            demand: i64::from(customer.demand.unwrap_or(1)),
            service_secs: i64::from(
                customer
                    .service_time_secs
                    .unwrap_or(self.config.service_time_secs),
            ),
            window,
        })
    }

    /// Combine the request with `matrix` into an integral [`Problem`].
    ///
    /// # Errors
    ///
    /// Returns [`ProblemError::NoData`] without customers,
    /// [`ProblemError::InvalidWindow`] for a bad override and
    /// [`ProblemError::Matrix`] when the matrix size is wrong.
    pub fn build(&self, matrix: &TravelMatrix) -> Result<Problem, ProblemError> {
        let nodes = self.nodes()?;
        matrix.ensure_len(nodes.len())?;
        let travel_secs = matrix
            .durations_secs()
            .iter()
            .enumerate()
            .map(|(from, row)| {
                row.iter()
                    .enumerate()
                    .map(|(to, secs)| if from == to { 0 } else { round_travel_secs(*secs) })
                    .collect()
            })
            .collect();
        let time_horizon_secs = self
            .config
            .time_horizon_secs
            .unwrap_or_else(|| derived_horizon(&nodes));
        let max_wait_secs = self.config.max_wait_secs.unwrap_or(time_horizon_secs);
        Ok(Problem {
            nodes,
            travel_secs,
            distances_km: matrix.distances_km().to_vec(),
            client_window: self.config.client_window,
            vehicle_capacity: i64::from(self.config.vehicle_capacity),
            vehicle_fixed_cost: i64::try_from(self.config.vehicle_fixed_cost).unwrap_or(i64::MAX),
            time_horizon_secs,
            max_wait_secs,
            budget: SearchBudget {
                time_limit: self.config.time_limit(),
                max_iterations: self.config.max_search_iterations,
                seed: self.config.seed,
            },
        })
    }
}

/// `(latest window end - earliest window start) + total service`, never below
/// the latest window end.
fn derived_horizon(nodes: &[Node]) -> i64 {
    let earliest = nodes.iter().map(|n| n.window.start).min().unwrap_or(0);
    let latest = nodes.iter().map(|n| n.window.end).max().unwrap_or(0);
    let service = nodes
        .iter()
        .map(|n| n.service_secs)
        .fold(0_i64, i64::saturating_add);
    latest
        .saturating_sub(earliest)
        .saturating_add(service)
        .max(latest)
        .max(1)
}
