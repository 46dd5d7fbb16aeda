//! Depot and customer records supplied by callers.

use geo::Coord;
use serde::{Deserialize, Serialize};

use crate::TimeWindow;

/// The depot every vehicle leaves from and returns to.
///
/// Coordinates follow the `geo` convention: `x` is longitude and `y` is
/// latitude.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Depot {
    /// Optional display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Depot position.
    pub location: Coord<f64>,
}

impl Depot {
    /// Create an unnamed depot at `location`.
    #[must_use]
    pub const fn new(location: Coord<f64>) -> Self {
        Self {
            name: None,
            location,
        }
    }
}

/// A customer awaiting a visit.
///
/// Every optional field falls back to the shared configuration: demand to one
/// unit, service time to `service_time_secs` and the window to the client
/// window.
///
/// # Examples
///
/// ```
/// use geo::Coord;
/// use roundsman_core::{Customer, TimeWindow};
///
/// let customer = Customer::new(Coord { x: -0.12, y: 51.5 })
///     .with_name("Pharmacy")
///     .with_time_window(TimeWindow::from_hours(8, 9));
/// assert_eq!(customer.name.as_deref(), Some("Pharmacy"));
/// assert_eq!(customer.demand, None);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Customer {
    /// Optional display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Customer position.
    pub location: Coord<f64>,
    /// Load consumed by this visit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub demand: Option<u32>,
    /// Service time override, in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_time_secs: Option<u32>,
    /// Window override replacing the shared client window.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_window: Option<TimeWindow>,
}

impl Customer {
    /// Create an unnamed customer relying on configuration defaults.
    #[must_use]
    pub const fn new(location: Coord<f64>) -> Self {
        Self {
            name: None,
            location,
            demand: None,
            service_time_secs: None,
            time_window: None,
        }
    }

    /// Attach a display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Override the demand of this visit.
    #[must_use]
    pub const fn with_demand(mut self, demand: u32) -> Self {
        self.demand = Some(demand);
        self
    }

    /// Override the service time of this visit.
    #[must_use]
    pub const fn with_service_time_secs(mut self, secs: u32) -> Self {
        self.service_time_secs = Some(secs);
        self
    }

    /// Override the time window of this visit.
    #[must_use]
    pub const fn with_time_window(mut self, window: TimeWindow) -> Self {
        self.time_window = Some(window);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn customer_parses_with_only_location() {
        let customer: Customer =
            serde_json::from_str(r#"{ "location": { "x": 1.0, "y": 2.0 } }"#)
                .expect("parse customer");
        assert_eq!(customer, Customer::new(Coord { x: 1.0, y: 2.0 }));
    }

    #[rstest]
    fn customer_rejects_unknown_fields() {
        let result = serde_json::from_str::<Customer>(
            r#"{ "location": { "x": 1.0, "y": 2.0 }, "priority": 3 }"#,
        );
        assert!(result.is_err());
    }

    #[rstest]
    fn customer_parses_overrides() {
        let customer: Customer = serde_json::from_str(
            r#"{
                "name": "North",
                "location": { "x": 0.5, "y": 0.5 },
                "demand": 3,
                "service_time_secs": 120,
                "time_window": [0, 600]
            }"#,
        )
        .expect("parse customer");
        assert_eq!(customer.demand, Some(3));
        assert_eq!(customer.service_time_secs, Some(120));
        assert_eq!(customer.time_window, Some(TimeWindow::new(0, 600)));
    }
}
