//! Search over a compiled routing model.
//!
//! A search builds a first solution with the configured strategy, falling
//! back to the other strategy when it fails, then improves it with local
//! search. Guided local search keeps escaping local optima until the time
//! limit or the iteration cap is reached and returns the best assignment it
//! saw.

mod compiled;
mod construction;
mod guided;
mod local;
mod plan;

use std::time::{Duration, Instant};

use roundsman_core::{DEFAULT_SEED, DEFAULT_TIME_LIMIT_SECS, SearchBudget};

pub(crate) use compiled::CompiledModel;
pub(crate) use plan::Plan;

/// How the first assignment is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FirstSolutionStrategy {
    /// Extend each route in turn along its cheapest feasible arc, then insert
    /// leftovers at their cheapest feasible position.
    #[default]
    PathCheapestArc,
    /// Repeatedly insert the visit whose cheapest feasible insertion is the
    /// cheapest overall.
    CheapestInsertion,
}

impl FirstSolutionStrategy {
    /// The strategy tried when this one fails.
    #[must_use]
    pub const fn fallback(self) -> Self {
        match self {
            Self::PathCheapestArc => Self::CheapestInsertion,
            Self::CheapestInsertion => Self::PathCheapestArc,
        }
    }
}

/// How local optima are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LocalSearchMetaheuristic {
    /// Penalise arcs of each local optimum and keep searching.
    #[default]
    GuidedLocalSearch,
    /// Stop at the first local optimum.
    GreedyDescent,
}

/// Parameters of one search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchParameters {
    /// First-solution strategy.
    pub first_solution_strategy: FirstSolutionStrategy,
    /// Local-search metaheuristic.
    pub local_search_metaheuristic: LocalSearchMetaheuristic,
    /// Wall-clock limit of the whole search.
    pub time_limit: Duration,
    /// Optional cap on metaheuristic iterations.
    pub max_iterations: Option<u64>,
    /// Seed for neighbourhood ordering.
    pub seed: u64,
    /// Treat all vehicles as interchangeable so only one unused vehicle is
    /// considered per move.
    pub homogeneous_fleet: bool,
}

impl Default for SearchParameters {
    fn default() -> Self {
        Self {
            first_solution_strategy: FirstSolutionStrategy::default(),
            local_search_metaheuristic: LocalSearchMetaheuristic::default(),
            time_limit: Duration::from_secs(DEFAULT_TIME_LIMIT_SECS),
            max_iterations: None,
            seed: DEFAULT_SEED,
            homogeneous_fleet: true,
        }
    }
}

impl SearchParameters {
    /// Parameters honouring a trial budget, with default strategies.
    #[must_use]
    pub fn from_budget(budget: SearchBudget) -> Self {
        Self {
            time_limit: budget.time_limit,
            max_iterations: budget.max_iterations,
            seed: budget.seed,
            ..Self::default()
        }
    }

    /// Replace the first-solution strategy.
    #[must_use]
    pub const fn with_first_solution_strategy(mut self, strategy: FirstSolutionStrategy) -> Self {
        self.first_solution_strategy = strategy;
        self
    }

    /// Replace the metaheuristic.
    #[must_use]
    pub const fn with_metaheuristic(mut self, metaheuristic: LocalSearchMetaheuristic) -> Self {
        self.local_search_metaheuristic = metaheuristic;
        self
    }

    /// Replace the iteration cap.
    #[must_use]
    pub const fn with_max_iterations(mut self, max_iterations: Option<u64>) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Replace the time limit.
    #[must_use]
    pub const fn with_time_limit(mut self, time_limit: Duration) -> Self {
        self.time_limit = time_limit;
        self
    }

    /// Replace the seed.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// Point in time after which the search stops.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Deadline {
    at: Option<Instant>,
}

impl Deadline {
    pub(crate) fn after(limit: Duration) -> Self {
        Self {
            at: Instant::now().checked_add(limit),
        }
    }

    pub(crate) fn expired(self) -> bool {
        self.at.is_some_and(|at| Instant::now() >= at)
    }
}

/// Build and improve a plan, or return `None` when no first solution exists.
pub(crate) fn run(model: &CompiledModel, parameters: &SearchParameters) -> Option<Plan> {
    let deadline = Deadline::after(parameters.time_limit);
    let strategy = parameters.first_solution_strategy;
    let homogeneous = parameters.homogeneous_fleet;
    let initial = construction::first_solution(model, strategy, homogeneous, deadline)
        .or_else(|| {
            log::debug!("{strategy:?} found no first solution; trying {:?}", strategy.fallback());
            construction::first_solution(model, strategy.fallback(), homogeneous, deadline)
        })?;
    log::debug!(
        "first solution costs {} using {} vehicles",
        initial.cost(model),
        initial.used_vehicles()
    );
    Some(guided::improve(model, initial, parameters, deadline))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn strategies_fall_back_to_each_other() {
        assert_eq!(
            FirstSolutionStrategy::PathCheapestArc.fallback(),
            FirstSolutionStrategy::CheapestInsertion
        );
        assert_eq!(
            FirstSolutionStrategy::CheapestInsertion.fallback(),
            FirstSolutionStrategy::PathCheapestArc
        );
    }

    #[rstest]
    fn budget_carries_over() {
        let budget = SearchBudget {
            time_limit: Duration::from_secs(3),
            max_iterations: Some(7),
            seed: 9,
        };
        let parameters = SearchParameters::from_budget(budget);
        assert_eq!(parameters.time_limit, Duration::from_secs(3));
        assert_eq!(parameters.max_iterations, Some(7));
        assert_eq!(parameters.seed, 9);
        assert!(parameters.homogeneous_fleet);
    }

    #[rstest]
    fn zero_deadline_expires_immediately() {
        assert!(Deadline::after(Duration::ZERO).expired());
        assert!(!Deadline::after(Duration::from_secs(3600)).expired());
    }
}
