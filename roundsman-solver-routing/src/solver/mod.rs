//! `RoutingSolver` implementation backed by the native routing model.

use roundsman_core::{
    Problem, RouteTrial, SearchBudget, Solution, SolveError, SolveRequest, Solver, TrialOutcome,
    TravelMatrixProvider, solve_with,
};

use crate::encode::build_model;
use crate::extract::extract_plans;
use crate::model::RoutingModelError;
use crate::search::{FirstSolutionStrategy, LocalSearchMetaheuristic, SearchParameters};

impl From<RoutingModelError> for SolveError {
    fn from(err: RoutingModelError) -> Self {
        Self::model(err.to_string())
    }
}

/// Search strategy of [`RoutingSolver`].
///
/// Time limit, iteration cap and seed come from the request's
/// [`roundsman_core::SolverConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoutingSolverConfig {
    /// First-solution strategy; the other one is tried when it fails.
    pub first_solution_strategy: FirstSolutionStrategy,
    /// Metaheuristic applied after the first solution.
    pub local_search_metaheuristic: LocalSearchMetaheuristic,
    /// Treat vehicles as interchangeable.
    pub homogeneous_fleet: bool,
}

impl Default for RoutingSolverConfig {
    fn default() -> Self {
        Self {
            first_solution_strategy: FirstSolutionStrategy::PathCheapestArc,
            local_search_metaheuristic: LocalSearchMetaheuristic::GuidedLocalSearch,
            homogeneous_fleet: true,
        }
    }
}

impl RoutingSolverConfig {
    /// Search parameters for one trial under `budget`.
    #[must_use]
    pub fn parameters(&self, budget: SearchBudget) -> SearchParameters {
        SearchParameters {
            first_solution_strategy: self.first_solution_strategy,
            local_search_metaheuristic: self.local_search_metaheuristic,
            homogeneous_fleet: self.homogeneous_fleet,
            ..SearchParameters::from_budget(budget)
        }
    }
}

/// Default VRPTW solver.
///
/// Each trial encodes the problem as a fresh routing model, searches it and
/// walks the resulting successor links. Vehicle-count escalation and solution
/// assembly are shared with every backend through
/// [`roundsman_core::solve_with`].
///
/// # Examples
///
/// ```
/// use roundsman_core::test_support::{FixedMatrixProvider, three_customer_matrix, three_customer_request};
/// use roundsman_core::{SolveStatus, Solver};
/// use roundsman_solver_routing::RoutingSolver;
///
/// let solver = RoutingSolver::new(FixedMatrixProvider::new(three_customer_matrix()));
/// let solution = solver.solve(&three_customer_request()).expect("solve succeeds");
/// assert_eq!(solution.status, SolveStatus::Ok);
/// assert_eq!(solution.vehicles_used, 1);
/// ```
#[derive(Debug, Clone)]
pub struct RoutingSolver<T> {
    provider: T,
    config: RoutingSolverConfig,
}

impl<T> RoutingSolver<T>
where
    T: TravelMatrixProvider,
{
    /// Construct a solver using default configuration.
    pub fn new(provider: T) -> Self {
        Self::with_config(provider, RoutingSolverConfig::default())
    }

    /// Construct a solver with explicit configuration.
    pub const fn with_config(provider: T, config: RoutingSolverConfig) -> Self {
        Self { provider, config }
    }

    /// Search configuration.
    pub const fn config(&self) -> &RoutingSolverConfig {
        &self.config
    }
}

impl<T> RouteTrial for RoutingSolver<T>
where
    T: TravelMatrixProvider,
{
    fn try_route(&self, problem: &Problem, vehicles: usize) -> Result<TrialOutcome, SolveError> {
        let model = build_model(problem, vehicles)?;
        let parameters = self.config.parameters(problem.budget());
        log::debug!(
            "routing {} customers with {vehicles} vehicles",
            problem.customer_count()
        );
        let Some(assignment) = model.solve_with_parameters(&parameters)? else {
            return Ok(TrialOutcome::Infeasible);
        };
        log::debug!("trial objective {}", assignment.objective_value());
        Ok(TrialOutcome::Feasible(extract_plans(&model, &assignment)?))
    }
}

impl<T> Solver for RoutingSolver<T>
where
    T: TravelMatrixProvider + Send + Sync,
{
    fn solve(&self, request: &SolveRequest) -> Result<Solution, SolveError> {
        solve_with(request, &self.provider, self)
    }
}

#[cfg(test)]
mod tests;
