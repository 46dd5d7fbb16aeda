//! HTTP-based travel matrix providers for routing services.
//!
//! This module provides [`OsrmProvider`], an implementation of
//! [`roundsman_core::TravelMatrixProvider`] that fetches duration and
//! distance tables from an OSRM routing service.
//!
//! # Architecture
//!
//! The provider calls the OSRM Table API once per solve with the depot
//! followed by every customer, asking for both `duration` and `distance`
//! annotations. The synchronous provider trait is implemented by blocking on
//! the async HTTP call internally, keeping the solvers embeddable in
//! synchronous contexts.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use geo::Coord;
//! use roundsman_core::TravelMatrixProvider;
//! use roundsman_data::routing::{OsrmProvider, OsrmProviderConfig};
//!
//! let config = OsrmProviderConfig::new("http://localhost:9001")
//!     .with_profile("driving")
//!     .with_timeout(Duration::from_secs(60));
//! let provider = OsrmProvider::with_config(config)?;
//!
//! let locations = [Coord { x: 24.94, y: 60.17 }, Coord { x: 24.95, y: 60.18 }];
//! let matrix = provider.get_travel_matrix(&locations)?;
//! println!("Depot to first customer: {:?} s", matrix.duration_secs(0, 1));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod osrm;
mod provider;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use provider::{
    DEFAULT_OSRM_BASE_URL, DEFAULT_OSRM_PROFILE, DEFAULT_USER_AGENT, OsrmProvider,
    OsrmProviderConfig, ProviderBuildError,
};
