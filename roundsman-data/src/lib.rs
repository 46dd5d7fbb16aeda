//! Travel data adapters for the Roundsman engine.
//!
//! Responsibilities:
//! - Implement [`roundsman_core::TravelMatrixProvider`] against routing
//!   services.
//! - Translate service payloads into [`roundsman_core::TravelMatrix`] values.
//!
//! Boundaries:
//! - Do not encode routing rules (live in `roundsman-core` and the solver
//!   crates).
//! - Keep blocking I/O off async executors; the synchronous provider API
//!   blocks on an internal runtime.
//!
//! Invariants:
//! - Matrices match the requested locations in size and order.
//! - No global mutable state.

pub mod routing;

pub use routing::{
    DEFAULT_OSRM_BASE_URL, DEFAULT_OSRM_PROFILE, DEFAULT_USER_AGENT, OsrmProvider,
    OsrmProviderConfig, ProviderBuildError,
};
