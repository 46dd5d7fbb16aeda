//! HTTP-based `TravelMatrixProvider` using OSRM's Table API.
//!
//! The [`TravelMatrixProvider`] trait is synchronous to keep the solvers
//! embeddable in synchronous contexts. This provider bridges the async HTTP
//! call to the sync interface by blocking on a Tokio runtime internally.

use std::time::Duration;

use geo::Coord;
use reqwest::Client;
use roundsman_core::{TravelMatrix, TravelMatrixError, TravelMatrixProvider};
use thiserror::Error;
use tokio::runtime::{Handle, Runtime, RuntimeFlavor};
use url::Url;

use super::osrm::{Table, TableResponse};

/// Error type for [`OsrmProvider`] construction failures.
#[derive(Debug, Error)]
pub enum ProviderBuildError {
    /// Failed to build the HTTP client.
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
    /// Failed to build the Tokio runtime.
    #[error("failed to build Tokio runtime: {0}")]
    Runtime(#[source] std::io::Error),
    /// The base URL does not parse.
    #[error("invalid OSRM base URL {url:?}: {source}")]
    InvalidBaseUrl {
        /// Rejected URL.
        url: String,
        /// Parse failure.
        #[source]
        source: url::ParseError,
    },
    /// The base URL cannot carry a path, e.g. `mailto:` or `data:` URLs.
    #[error("OSRM base URL {url:?} cannot carry a path")]
    UnsupportedBaseUrl {
        /// Rejected URL.
        url: String,
    },
}

/// Default user agent for OSRM requests.
pub const DEFAULT_USER_AGENT: &str = "roundsman-routing/0.1";

/// Default OSRM endpoint.
pub const DEFAULT_OSRM_BASE_URL: &str = "http://127.0.0.1:9001";

/// Default OSRM routing profile.
pub const DEFAULT_OSRM_PROFILE: &str = "driving";

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 60;

const METRES_PER_KM: f64 = 1_000.0;

/// Configuration for [`OsrmProvider`].
#[derive(Debug, Clone)]
pub struct OsrmProviderConfig {
    /// Base URL for the OSRM service (e.g., `"http://localhost:9001"`).
    pub base_url: String,
    /// Routing profile segment of the request path.
    pub profile: String,
    /// Request timeout duration.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
}

impl Default for OsrmProviderConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_OSRM_BASE_URL.to_owned(),
            profile: DEFAULT_OSRM_PROFILE.to_owned(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

impl OsrmProviderConfig {
    /// Create a new configuration with the given base URL.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Set the routing profile.
    #[must_use]
    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = profile.into();
        self
    }

    /// Set the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// Travel matrix provider backed by the OSRM Table API.
///
/// It owns a Tokio runtime that is reused across calls, avoiding the
/// overhead of creating a new runtime per request.
///
/// # Runtime behaviour
///
/// When called from outside any Tokio runtime, the provider uses its own
/// stored runtime. When called from within an existing multi-threaded Tokio
/// runtime (detected via [`Handle::try_current()`] and
/// [`RuntimeFlavor::MultiThread`]), it uses that runtime's handle with
/// [`tokio::task::block_in_place`] to avoid nested runtime panics. Inside a
/// `current_thread` runtime it falls back to its own runtime, which may
/// deadlock if the caller's runtime drives IO this request depends on.
///
/// # Unreachable pairs
///
/// Null, negative or non-finite cells become `f64::INFINITY`, which the
/// problem builder maps to its unreachable sentinel.
pub struct OsrmProvider {
    client: Client,
    base_url: Url,
    config: OsrmProviderConfig,
    runtime: Runtime,
}

impl std::fmt::Debug for OsrmProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OsrmProvider")
            .field("client", &self.client)
            .field("config", &self.config)
            .field("runtime", &"<tokio::runtime::Runtime>")
            .finish_non_exhaustive()
    }
}

impl OsrmProvider {
    /// Create a provider for `base_url` with default profile and timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is unusable or the HTTP client or Tokio
    /// runtime fails to build.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ProviderBuildError> {
        Self::with_config(OsrmProviderConfig::new(base_url))
    }

    /// Create a new provider with explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is unusable or the HTTP client or Tokio
    /// runtime fails to build.
    pub fn with_config(config: OsrmProviderConfig) -> Result<Self, ProviderBuildError> {
        let base_url = parse_base_url(&config.base_url)?;
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .connect_timeout(config.timeout)
            .timeout(config.timeout)
            .build()
            .map_err(ProviderBuildError::HttpClient)?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(ProviderBuildError::Runtime)?;
        Ok(Self {
            client,
            base_url,
            config,
            runtime,
        })
    }

    /// Provider configuration.
    #[must_use]
    pub const fn config(&self) -> &OsrmProviderConfig {
        &self.config
    }

    /// Build the OSRM Table API URL for the given locations.
    ///
    /// The URL format is
    /// `{base_url}/table/v1/{profile}/{coordinates}?annotations=duration,distance`
    /// where coordinates are semicolon-separated `lon,lat` pairs.
    fn build_table_url(&self, locations: &[Coord<f64>]) -> Url {
        let coords = locations
            .iter()
            .map(|coord| format!("{},{}", coord.x, coord.y))
            .collect::<Vec<_>>()
            .join(";");
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["table", "v1", self.config.profile.as_str(), coords.as_str()]);
        }
        url.set_query(Some("annotations=duration,distance"));
        url
    }

    /// Fetch the travel matrix asynchronously.
    async fn fetch_matrix_async(
        &self,
        locations: &[Coord<f64>],
    ) -> Result<TravelMatrix, TravelMatrixError> {
        let url = self.build_table_url(locations);
        log::debug!("requesting OSRM table for {} locations", locations.len());

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|err| self.convert_reqwest_error(&err, url.as_str()))?
            .error_for_status()
            .map_err(|err| self.convert_reqwest_error(&err, url.as_str()))?;

        let table_response: TableResponse =
            response
                .json()
                .await
                .map_err(|err| TravelMatrixError::ParseError {
                    message: err.to_string(),
                })?;

        let matrix = convert_response(table_response)?;
        matrix.ensure_len(locations.len())?;
        Ok(matrix)
    }

    /// Convert a reqwest error to a `TravelMatrixError`.
    fn convert_reqwest_error(&self, error: &reqwest::Error, url: &str) -> TravelMatrixError {
        if error.is_timeout() {
            return TravelMatrixError::Timeout {
                url: url.to_owned(),
                timeout_secs: self.config.timeout.as_secs(),
            };
        }

        if let Some(status) = error.status() {
            return TravelMatrixError::HttpError {
                url: url.to_owned(),
                status: status.as_u16(),
                message: error.to_string(),
            };
        }

        TravelMatrixError::NetworkError {
            url: url.to_owned(),
            message: error.to_string(),
        }
    }
}

fn parse_base_url(raw: &str) -> Result<Url, ProviderBuildError> {
    let url = Url::parse(raw).map_err(|source| ProviderBuildError::InvalidBaseUrl {
        url: raw.to_owned(),
        source,
    })?;
    if url.cannot_be_a_base() {
        return Err(ProviderBuildError::UnsupportedBaseUrl {
            url: raw.to_owned(),
        });
    }
    Ok(url)
}

/// Convert an OSRM response to a `TravelMatrix`.
fn convert_response(response: TableResponse) -> Result<TravelMatrix, TravelMatrixError> {
    if !response.is_ok() {
        return Err(TravelMatrixError::ServiceError {
            code: response.code,
            message: response.message.unwrap_or_default(),
        });
    }

    let durations = response
        .durations
        .ok_or_else(|| missing_table("durations"))?;
    let distances = response
        .distances
        .ok_or_else(|| missing_table("distances"))?;

    TravelMatrix::new(
        convert_table(durations, |secs| secs),
        convert_table(distances, metres_to_km),
    )
}

fn missing_table(name: &str) -> TravelMatrixError {
    TravelMatrixError::ParseError {
        message: format!("OSRM response missing {name} array"),
    }
}

#[expect(
    clippy::float_arithmetic,
    reason = "OSRM reports distances in metres"
)]
fn metres_to_km(metres: f64) -> f64 {
    metres / METRES_PER_KM
}

fn convert_table(table: Table, scale: impl Fn(f64) -> f64) -> Vec<Vec<f64>> {
    table
        .into_iter()
        .map(|row| {
            row.into_iter()
                .map(|cell| {
                    cell.filter(|&value| value >= 0.0 && value.is_finite())
                        .map_or(f64::INFINITY, &scale)
                })
                .collect()
        })
        .collect()
}

impl TravelMatrixProvider for OsrmProvider {
    /// Fetch durations and distances for the given locations.
    ///
    /// # Runtime requirements
    ///
    /// When called from within an existing Tokio runtime, the runtime must be
    /// multi-threaded (`flavor = "multi_thread"`); see the type-level docs.
    fn get_travel_matrix(
        &self,
        locations: &[Coord<f64>],
    ) -> Result<TravelMatrix, TravelMatrixError> {
        if locations.is_empty() {
            return Err(TravelMatrixError::EmptyInput);
        }

        let future = self.fetch_matrix_async(locations);
        match Handle::try_current() {
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
                tokio::task::block_in_place(|| handle.block_on(future))
            }
            _ => self.runtime.block_on(future),
        }
    }
}
