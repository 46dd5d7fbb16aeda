//! Solver boundary and the shared solve pipeline.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    ConfigError, Customer, Depot, Diagnostics, EscalationPolicy, EscalationState, Problem,
    ProblemBuilder, ProblemError, Solution, SolverConfig, TravelMatrixError, TravelMatrixProvider,
    TrialOutcome, escalate,
};

/// Everything a solve needs besides the travel-matrix provider.
///
/// # Examples
///
/// ```rust
/// use geo::Coord;
/// use roundsman_core::{Customer, Depot, SolveRequest, SolverConfig};
///
/// let request = SolveRequest {
///     depot: Depot::new(Coord { x: 0.0, y: 0.0 }),
///     customers: vec![Customer::new(Coord { x: 0.01, y: 0.0 })],
///     config: SolverConfig::default(),
/// };
/// assert_eq!(request.customers.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SolveRequest {
    /// Depot every vehicle starts and ends at.
    pub depot: Depot,
    /// Customers to visit, in node order `1..=n`.
    #[serde(default)]
    pub customers: Vec<Customer>,
    /// Solver configuration; defaults apply to omitted keys.
    #[serde(default)]
    pub config: SolverConfig,
}

/// Errors returned by [`Solver::solve`].
///
/// Infeasibility is not an error; it is reported through
/// [`crate::SolveStatus::NoSolution`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SolveError {
    /// The configuration failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),
    /// The travel matrix could not be obtained.
    #[error("travel matrix unavailable: {0}")]
    TravelMatrix(#[from] TravelMatrixError),
    /// The request could not be turned into a routing problem.
    #[error("invalid problem: {0}")]
    InvalidProblem(#[from] ProblemError),
    /// The routing backend failed to build or run its model.
    #[error("routing model error: {message}")]
    Model {
        /// Backend error detail.
        message: String,
    },
}

impl SolveError {
    /// Wrap a backend failure.
    pub fn model(message: impl Into<String>) -> Self {
        Self::Model {
            message: message.into(),
        }
    }
}

/// Compute routes for a request.
///
/// Solvers must be `Send + Sync`; each call owns its model and search state.
pub trait Solver: Send + Sync {
    /// Solve `request`, reporting infeasibility through the status.
    ///
    /// # Errors
    ///
    /// Returns [`SolveError`] for invalid configuration, provider failures or
    /// backend failures.
    fn solve(&self, request: &SolveRequest) -> Result<Solution, SolveError>;
}

impl<T: Solver + ?Sized> Solver for Box<T> {
    fn solve(&self, request: &SolveRequest) -> Result<Solution, SolveError> {
        (**self).solve(request)
    }
}

/// One routing attempt at a fixed vehicle count.
///
/// Implementations build a fresh model per call and keep no state between
/// calls.
pub trait RouteTrial {
    /// Search for a feasible assignment of `problem` using `vehicles`.
    ///
    /// # Errors
    ///
    /// Returns [`SolveError::Model`] when the backend cannot build or run its
    /// model. Infeasibility is [`TrialOutcome::Infeasible`], not an error.
    fn try_route(&self, problem: &Problem, vehicles: usize) -> Result<TrialOutcome, SolveError>;
}

/// Run the solve pipeline: validate, fetch travel data, build the problem,
/// escalate over trials and assemble the solution.
///
/// No customers yields [`crate::SolveStatus::NoData`] without contacting the
/// provider.
///
/// # Errors
///
/// Returns [`SolveError::InvalidConfig`] before any work when the
/// configuration is invalid, [`SolveError::TravelMatrix`] when the provider
/// fails, and propagates trial errors.
pub fn solve_with<P, R>(
    request: &SolveRequest,
    provider: &P,
    trial: &R,
) -> Result<Solution, SolveError>
where
    P: TravelMatrixProvider + ?Sized,
    R: RouteTrial + ?Sized,
{
    request.config.validate()?;
    let started_at = Instant::now();
    if request.customers.is_empty() {
        log::info!("no customers to route");
        return Ok(Solution::no_data(Diagnostics {
            solve_time: started_at.elapsed(),
            ..Diagnostics::default()
        }));
    }

    let builder = ProblemBuilder::new(&request.depot, &request.customers, &request.config);
    let locations = builder.locations();
    log::debug!("requesting travel matrix for {} locations", locations.len());
    let matrix = provider.get_travel_matrix(&locations)?;
    let problem = builder.build(&matrix)?;

    let policy = EscalationPolicy::for_problem(&problem, &request.config);
    let report = escalate(&policy, |vehicles| trial.try_route(&problem, vehicles))?;
    let mut diagnostics = Diagnostics {
        solve_time: started_at.elapsed(),
        attempted_vehicle_counts: report.attempts,
        succeeded_with: None,
    };
    Ok(match report.state {
        EscalationState::Succeeded { vehicles, plans } => {
            diagnostics.succeeded_with = Some(vehicles);
            Solution::assemble(&problem, &plans, diagnostics)
        }
        EscalationState::Exhausted { .. } | EscalationState::Trying(_) => {
            Solution::no_solution(diagnostics)
        }
    })
}
