//! Typed solver configuration.
//!
//! [`SolverConfig`] carries every tunable the solve pipeline reads. Unknown
//! keys are rejected and values are validated while deserialising, so a
//! configuration that parses is ready for model construction.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::TimeWindow;

/// Number of vehicles offered to the first routing trial.
///
/// Serialises as the string `"auto"` or a positive integer.
///
/// # Examples
///
/// ```
/// use roundsman_core::VehicleCount;
///
/// let auto: VehicleCount = serde_json::from_str("\"auto\"").unwrap();
/// assert_eq!(auto, VehicleCount::Auto);
/// let fixed: VehicleCount = serde_json::from_str("4").unwrap();
/// assert_eq!(fixed, VehicleCount::Fixed(4));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "VehicleCountRepr", into = "VehicleCountRepr")]
pub enum VehicleCount {
    /// Derive the count from customer count, service time and window span.
    Auto,
    /// Use exactly this many vehicles for the first trial.
    Fixed(usize),
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum VehicleCountRepr {
    Count(usize),
    Keyword(String),
}

const AUTO_KEYWORD: &str = "auto";

impl TryFrom<VehicleCountRepr> for VehicleCount {
    type Error = ConfigError;

    fn try_from(value: VehicleCountRepr) -> Result<Self, Self::Error> {
        match value {
            VehicleCountRepr::Count(0) => Err(ConfigError::ZeroVehicleCount),
            VehicleCountRepr::Count(count) => Ok(Self::Fixed(count)),
            VehicleCountRepr::Keyword(word) if word.eq_ignore_ascii_case(AUTO_KEYWORD) => {
                Ok(Self::Auto)
            }
            VehicleCountRepr::Keyword(word) => Err(ConfigError::UnknownVehicleCount(word)),
        }
    }
}

impl From<VehicleCount> for VehicleCountRepr {
    fn from(value: VehicleCount) -> Self {
        match value {
            VehicleCount::Auto => Self::Keyword(AUTO_KEYWORD.to_owned()),
            VehicleCount::Fixed(count) => Self::Count(count),
        }
    }
}

impl fmt::Display for VehicleCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => f.write_str(AUTO_KEYWORD),
            Self::Fixed(count) => write!(f, "{count}"),
        }
    }
}

/// Errors raised while validating a [`SolverConfig`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Vehicle capacity must be positive.
    #[error("vehicle capacity must be positive")]
    ZeroCapacity,
    /// The search time limit must be positive.
    #[error("time limit must be at least one second")]
    ZeroTimeLimit,
    /// Escalation must add at least one vehicle per step.
    #[error("escalation step must be positive")]
    ZeroEscalationStep,
    /// A fixed vehicle count of zero can never serve a customer.
    #[error("initial vehicle count must be positive or \"auto\"")]
    ZeroVehicleCount,
    /// The vehicle count keyword was not recognised.
    #[error("unknown vehicle count {0:?}; expected a positive integer or \"auto\"")]
    UnknownVehicleCount(String),
    /// A window was negative or ended before it started.
    #[error("{field} window [{start}, {end}] must satisfy 0 <= start <= end")]
    InvalidWindow {
        /// Configuration field holding the window.
        field: &'static str,
        /// Window start in seconds since midnight.
        start: i64,
        /// Window end in seconds since midnight.
        end: i64,
    },
    /// The time horizon override must be positive.
    #[error("time horizon must be positive, got {0}")]
    NonPositiveHorizon(i64),
    /// The waiting allowance must not be negative.
    #[error("maximum waiting time must not be negative, got {0}")]
    NegativeWait(i64),
}

/// Configuration consumed by the solve pipeline.
///
/// Defaults describe a morning delivery round: customers are served between
/// 07:00 and 09:00, the depot is open 05:00 to 19:00 and each stop takes ten
/// minutes.
///
/// # Examples
///
/// ```
/// use roundsman_core::{SolverConfig, TimeWindow};
///
/// let config: SolverConfig =
///     serde_json::from_str(r#"{ "client_window": [0, 36000], "initial_vehicles": 1 }"#)
///         .unwrap();
/// assert_eq!(config.client_window, TimeWindow::new(0, 36_000));
/// assert_eq!(config.vehicle_capacity, 50);
/// assert!(serde_json::from_str::<SolverConfig>(r#"{ "colour": "red" }"#).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SolverConfigFields")]
pub struct SolverConfig {
    /// Window shared by every customer without an override.
    pub client_window: TimeWindow,
    /// Opening hours of the depot; the client window is used when absent.
    pub depot_window: Option<TimeWindow>,
    /// Service time charged at each customer, in seconds.
    pub service_time_secs: u32,
    /// Load every vehicle can carry.
    pub vehicle_capacity: u32,
    /// Objective penalty for every vehicle that leaves the depot.
    pub vehicle_fixed_cost: u64,
    /// Vehicles offered to the first trial.
    pub initial_vehicles: VehicleCount,
    /// Retry with more vehicles when a trial is infeasible.
    pub auto_escalate: bool,
    /// Vehicles added per escalation step.
    pub escalation_step: usize,
    /// Wall-clock budget of each trial, in seconds.
    pub time_limit_secs: u64,
    /// Seed for the search's random neighbourhood ordering.
    pub seed: u64,
    /// Optional cap on improvement iterations per trial.
    pub max_search_iterations: Option<u64>,
    /// Upper bound of the time dimension; derived from the windows when absent.
    pub time_horizon_secs: Option<i64>,
    /// Longest a vehicle may wait before a stop; unbounded when absent.
    pub max_wait_secs: Option<i64>,
}

/// Default shared client window, 07:00 to 09:00.
pub const DEFAULT_CLIENT_WINDOW: TimeWindow = TimeWindow::from_hours(7, 9);
/// Default depot opening hours, 05:00 to 19:00.
pub const DEFAULT_DEPOT_WINDOW: TimeWindow = TimeWindow::from_hours(5, 19);
/// Default service time per customer, ten minutes.
pub const DEFAULT_SERVICE_TIME_SECS: u32 = 600;
/// Default vehicle capacity.
pub const DEFAULT_VEHICLE_CAPACITY: u32 = 50;
/// Default fixed cost per used vehicle.
pub const DEFAULT_VEHICLE_FIXED_COST: u64 = 5_000;
/// Default vehicle count of the first trial.
pub const DEFAULT_INITIAL_VEHICLES: usize = 50;
/// Default number of vehicles added per escalation step.
pub const DEFAULT_ESCALATION_STEP: usize = 10;
/// Default per-trial time limit in seconds.
pub const DEFAULT_TIME_LIMIT_SECS: u64 = 20;
/// Default search seed.
pub const DEFAULT_SEED: u64 = 42;

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            client_window: DEFAULT_CLIENT_WINDOW,
            depot_window: Some(DEFAULT_DEPOT_WINDOW),
            service_time_secs: DEFAULT_SERVICE_TIME_SECS,
            vehicle_capacity: DEFAULT_VEHICLE_CAPACITY,
            vehicle_fixed_cost: DEFAULT_VEHICLE_FIXED_COST,
            initial_vehicles: VehicleCount::Fixed(DEFAULT_INITIAL_VEHICLES),
            auto_escalate: true,
            escalation_step: DEFAULT_ESCALATION_STEP,
            time_limit_secs: DEFAULT_TIME_LIMIT_SECS,
            seed: DEFAULT_SEED,
            max_search_iterations: None,
            time_horizon_secs: None,
            max_wait_secs: None,
        }
    }
}

impl SolverConfig {
    /// Check every field, returning the first violation found.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] describing the offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_window("client", self.client_window)?;
        if let Some(depot) = self.depot_window {
            check_window("depot", depot)?;
        }
        if self.vehicle_capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        if self.time_limit_secs == 0 {
            return Err(ConfigError::ZeroTimeLimit);
        }
        if self.escalation_step == 0 {
            return Err(ConfigError::ZeroEscalationStep);
        }
        if self.initial_vehicles == VehicleCount::Fixed(0) {
            return Err(ConfigError::ZeroVehicleCount);
        }
        if let Some(horizon) = self.time_horizon_secs
            && horizon <= 0
        {
            return Err(ConfigError::NonPositiveHorizon(horizon));
        }
        if let Some(wait) = self.max_wait_secs
            && wait < 0
        {
            return Err(ConfigError::NegativeWait(wait));
        }
        Ok(())
    }

    /// Depot window, falling back to the client window when unset.
    #[must_use]
    pub fn effective_depot_window(&self) -> TimeWindow {
        self.depot_window.unwrap_or(self.client_window)
    }

    /// Per-trial search budget as a [`Duration`].
    #[must_use]
    pub const fn time_limit(&self) -> Duration {
        Duration::from_secs(self.time_limit_secs)
    }

    /// Replace the shared client window.
    #[must_use]
    pub const fn with_client_window(mut self, window: TimeWindow) -> Self {
        self.client_window = window;
        self
    }

    /// Replace the depot window.
    #[must_use]
    pub const fn with_depot_window(mut self, window: Option<TimeWindow>) -> Self {
        self.depot_window = window;
        self
    }

    /// Replace the vehicle count of the first trial.
    #[must_use]
    pub const fn with_initial_vehicles(mut self, vehicles: VehicleCount) -> Self {
        self.initial_vehicles = vehicles;
        self
    }

    /// Enable or disable vehicle-count escalation.
    #[must_use]
    pub const fn with_auto_escalate(mut self, enabled: bool) -> Self {
        self.auto_escalate = enabled;
        self
    }

    /// Replace the per-trial time limit.
    #[must_use]
    pub const fn with_time_limit_secs(mut self, secs: u64) -> Self {
        self.time_limit_secs = secs;
        self
    }

    /// Cap the number of improvement iterations per trial.
    #[must_use]
    pub const fn with_max_search_iterations(mut self, iterations: Option<u64>) -> Self {
        self.max_search_iterations = iterations;
        self
    }
}

fn check_window(field: &'static str, window: TimeWindow) -> Result<(), ConfigError> {
    if window.is_valid() {
        Ok(())
    } else {
        Err(ConfigError::InvalidWindow {
            field,
            start: window.start,
            end: window.end,
        })
    }
}

/// Wire shape of [`SolverConfig`]; validated on conversion.
#[derive(Deserialize)]
#[serde(default, deny_unknown_fields)]
struct SolverConfigFields {
    client_window: TimeWindow,
    depot_window: Option<TimeWindow>,
    service_time_secs: u32,
    vehicle_capacity: u32,
    vehicle_fixed_cost: u64,
    initial_vehicles: VehicleCount,
    auto_escalate: bool,
    escalation_step: usize,
    time_limit_secs: u64,
    seed: u64,
    max_search_iterations: Option<u64>,
    time_horizon_secs: Option<i64>,
    max_wait_secs: Option<i64>,
}

impl Default for SolverConfigFields {
    fn default() -> Self {
        let SolverConfig {
            client_window,
            depot_window,
            service_time_secs,
            vehicle_capacity,
            vehicle_fixed_cost,
            initial_vehicles,
            auto_escalate,
            escalation_step,
            time_limit_secs,
            seed,
            max_search_iterations,
            time_horizon_secs,
            max_wait_secs,
        } = SolverConfig::default();
        Self {
            client_window,
            depot_window,
            service_time_secs,
            vehicle_capacity,
            vehicle_fixed_cost,
            initial_vehicles,
            auto_escalate,
            escalation_step,
            time_limit_secs,
            seed,
            max_search_iterations,
            time_horizon_secs,
            max_wait_secs,
        }
    }
}

impl TryFrom<SolverConfigFields> for SolverConfig {
    type Error = ConfigError;

    fn try_from(fields: SolverConfigFields) -> Result<Self, Self::Error> {
        let SolverConfigFields {
            client_window,
            depot_window,
            service_time_secs,
            vehicle_capacity,
            vehicle_fixed_cost,
            initial_vehicles,
            auto_escalate,
            escalation_step,
            time_limit_secs,
            seed,
            max_search_iterations,
            time_horizon_secs,
            max_wait_secs,
        } = fields;
        let config = Self {
            client_window,
            depot_window,
            service_time_secs,
            vehicle_capacity,
            vehicle_fixed_cost,
            initial_vehicles,
            auto_escalate,
            escalation_step,
            time_limit_secs,
            seed,
            max_search_iterations,
            time_horizon_secs,
            max_wait_secs,
        };
        config.validate()?;
        Ok(config)
    }
}
