use thiserror::Error;

/// Errors from [`crate::TravelMatrixProvider::get_travel_matrix`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TravelMatrixError {
    /// No locations were provided.
    ///
    /// The provider requires at least one location to compute a matrix.
    #[error("at least one location is required")]
    EmptyInput,
    /// The routing service could not be reached.
    #[error("failed to reach routing service at {url}: {message}")]
    NetworkError {
        /// Request URL.
        url: String,
        /// Underlying transport error.
        message: String,
    },
    /// The request exceeded its timeout.
    #[error("request to {url} timed out after {timeout_secs}s")]
    Timeout {
        /// Request URL.
        url: String,
        /// Configured timeout.
        timeout_secs: u64,
    },
    /// The routing service answered with a non-success HTTP status.
    #[error("routing service at {url} returned HTTP {status}: {message}")]
    HttpError {
        /// Request URL.
        url: String,
        /// HTTP status code.
        status: u16,
        /// Error detail.
        message: String,
    },
    /// The routing service reported an application-level failure.
    #[error("routing service error {code}: {message}")]
    ServiceError {
        /// Service error code, e.g. `InvalidQuery`.
        code: String,
        /// Service error message.
        message: String,
    },
    /// The response body could not be interpreted.
    #[error("failed to parse routing response: {message}")]
    ParseError {
        /// Parse failure detail.
        message: String,
    },
    /// The matrix shape disagrees with the number of locations.
    #[error("travel matrix dimension mismatch: {message}")]
    DimensionMismatch {
        /// Description of the mismatch.
        message: String,
    },
}
