//! OSRM API response types for the Table service.
//!
//! The Table API computes the duration and distance of the fastest route
//! between all pairs of supplied coordinates.
//!
//! See: <http://project-osrm.org/docs/v5.24.0/api/#table-service>

use serde::Deserialize;

/// Row-major table with `None` for pairs without a route.
pub type Table = Vec<Vec<Option<f64>>>;

/// OSRM Table API response.
///
/// The `code` field indicates the response status; the tables are present
/// only for the annotations that were requested.
#[derive(Debug, Deserialize)]
pub struct TableResponse {
    /// Status code from OSRM.
    ///
    /// Common values:
    /// - `"Ok"` - Request was successful
    /// - `"InvalidQuery"` - Invalid query parameters
    /// - `"InvalidOptions"` - Invalid option combination
    /// - `"NoTable"` - Table computation failed
    pub code: String,

    /// Optional error message when `code` is not `"Ok"`.
    pub message: Option<String>,

    /// Travel durations in seconds.
    pub durations: Option<Table>,

    /// Travel distances in metres.
    pub distances: Option<Table>,
}

impl TableResponse {
    /// Check if the response indicates success.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.code == "Ok"
    }
}
