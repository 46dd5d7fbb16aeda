//! Fetch pairwise travel times and distances between locations.
//!
//! The [`TravelMatrixProvider`] trait abstracts the routing engine that
//! supplies travel data. Callers pass the depot followed by every customer and
//! receive a [`TravelMatrix`] holding durations in seconds and distances in
//! kilometres, both indexed in the same order as the input.

mod error;
mod matrix;
mod provider;

pub use error::TravelMatrixError;
pub use matrix::TravelMatrix;
pub use provider::TravelMatrixProvider;
