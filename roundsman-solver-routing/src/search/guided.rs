//! Guided local search.
//!
//! After each local optimum the arcs with the highest utility
//! `cost / (1 + penalty)` are penalised, and the descent resumes on the
//! augmented cost. The best plan by true cost is kept throughout.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use super::local::{Neighbourhood, Penalties};
use super::{CompiledModel, Deadline, LocalSearchMetaheuristic, Plan, SearchParameters};

/// Scale of the penalty factor relative to the mean arc cost.
const PENALTY_FACTOR_DIVISOR: i64 = 10;

/// Improve `initial` until the deadline or the iteration cap.
pub(super) fn improve(
    model: &CompiledModel,
    initial: Plan,
    parameters: &SearchParameters,
    deadline: Deadline,
) -> Plan {
    let mut rng = ChaCha8Rng::seed_from_u64(parameters.seed);
    let homogeneous = parameters.homogeneous_fleet;
    let mut current = initial;
    let mut penalties = Penalties::new(model);
    Neighbourhood::new(model, &penalties, 0, homogeneous).descend(&mut current, &mut rng, deadline);
    let mut best = current.clone();
    let mut best_cost = best.cost(model);
    if parameters.local_search_metaheuristic == LocalSearchMetaheuristic::GreedyDescent {
        return best;
    }

    let lambda = penalty_factor(model, &current, best_cost);
    let mut iterations = 0_u64;
    while !deadline.expired()
        && parameters
            .max_iterations
            .is_none_or(|cap| iterations < cap)
    {
        penalise(model, &current, &mut penalties);
        Neighbourhood::new(model, &penalties, lambda, homogeneous).descend(
            &mut current,
            &mut rng,
            deadline,
        );
        let cost = current.cost(model);
        if cost < best_cost {
            log::debug!("iteration {iterations}: cost improved from {best_cost} to {cost}");
            best = current.clone();
            best_cost = cost;
        }
        iterations += 1;
    }
    log::debug!("guided local search stopped after {iterations} iterations at cost {best_cost}");
    best
}

/// `max(1, cost / (10 * arcs))`.
fn penalty_factor(model: &CompiledModel, plan: &Plan, cost: i64) -> i64 {
    let arcs = i64::try_from(plan.arcs(model).count())
        .unwrap_or(i64::MAX)
        .max(1);
    cost.checked_div(arcs.saturating_mul(PENALTY_FACTOR_DIVISOR))
        .unwrap_or_default()
        .max(1)
}

/// Penalise every arc of `plan` whose utility is maximal.
fn penalise(model: &CompiledModel, plan: &Plan, penalties: &mut Penalties) {
    let utilities: Vec<(usize, usize, i128, i128)> = plan
        .arcs(model)
        .map(|(from, to)| {
            let cost = i128::from(model.arc(from, to));
            let weight = 1 + i128::from(penalties.get(model, from, to));
            (from, to, cost, weight)
        })
        .collect();
    let Some(&(_, _, best_cost, best_weight)) = utilities
        .iter()
        .max_by(|left, right| (left.2 * right.3).cmp(&(right.2 * left.3)))
    else {
        return;
    };
    for &(from, to, cost, weight) in &utilities {
        if cost * best_weight == best_cost * weight {
            penalties.bump(model, from, to);
        }
    }
}
