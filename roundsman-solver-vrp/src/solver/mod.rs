//! `VrpSolver` implementation backed by `vrp-core`.

use roundsman_core::{
    Problem, RouteTrial, SolveError, SolveRequest, Solution, Solver, TrialOutcome,
    TravelMatrixProvider, solve_with,
};

use crate::vrp::{VrpLimits, VrpTrial};

/// Configuration for [`VrpSolver`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VrpSolverConfig {
    /// Upper bound on `vrp-core` generations when the request sets no
    /// iteration cap.
    pub max_generations: usize,
}

impl Default for VrpSolverConfig {
    fn default() -> Self {
        Self {
            max_generations: 200,
        }
    }
}

impl VrpSolverConfig {
    /// Search limits for a trial of `problem`.
    ///
    /// The request's iteration cap, when set, replaces
    /// [`Self::max_generations`]; the time limit always applies.
    fn limits(&self, problem: &Problem) -> VrpLimits {
        let budget = problem.budget();
        let max_generations = budget
            .max_iterations
            .map_or(self.max_generations, |cap| {
                usize::try_from(cap).unwrap_or(usize::MAX)
            });
        let max_time_secs = usize::try_from(budget.time_limit.as_secs())
            .unwrap_or(usize::MAX)
            .max(1);
        VrpLimits {
            max_generations,
            max_time_secs,
        }
    }
}

/// VRPTW solver using the `vrp-core` metaheuristics.
///
/// Every trial builds a fresh `vrp-core` problem, so the solver holds only
/// the travel-matrix provider and its configuration.
///
/// # Examples
///
/// ```no_run
/// use roundsman_core::test_support::{FixedMatrixProvider, three_customer_matrix, three_customer_request};
/// use roundsman_core::{SolveStatus, Solver};
/// use roundsman_solver_vrp::VrpSolver;
///
/// let solver = VrpSolver::new(FixedMatrixProvider::new(three_customer_matrix()));
/// let solution = solver.solve(&three_customer_request()).expect("solve succeeds");
/// assert_eq!(solution.status, SolveStatus::Ok);
/// ```
#[derive(Debug, Clone)]
pub struct VrpSolver<T> {
    provider: T,
    config: VrpSolverConfig,
}

impl<T> VrpSolver<T>
where
    T: TravelMatrixProvider,
{
    /// Construct a solver using default configuration.
    pub fn new(provider: T) -> Self {
        Self::with_config(provider, VrpSolverConfig::default())
    }

    /// Construct a solver with explicit configuration.
    pub const fn with_config(provider: T, config: VrpSolverConfig) -> Self {
        Self { provider, config }
    }

    /// Search configuration.
    pub const fn config(&self) -> &VrpSolverConfig {
        &self.config
    }
}

impl<T> RouteTrial for VrpSolver<T>
where
    T: TravelMatrixProvider,
{
    fn try_route(&self, problem: &Problem, vehicles: usize) -> Result<TrialOutcome, SolveError> {
        log::debug!(
            "vrp-core trial: {} customers, {vehicles} vehicles",
            problem.customer_count()
        );
        let plans = VrpTrial::new(problem, vehicles).solve(self.config.limits(problem))?;
        Ok(plans.map_or(TrialOutcome::Infeasible, TrialOutcome::Feasible))
    }
}

impl<T> Solver for VrpSolver<T>
where
    T: TravelMatrixProvider + Send + Sync,
{
    fn solve(&self, request: &SolveRequest) -> Result<Solution, SolveError> {
        solve_with(request, &self.provider, self)
    }
}

#[cfg(test)]
mod tests;
