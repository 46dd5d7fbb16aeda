//! Vehicle-count escalation.
//!
//! A solve runs one or more trials, each at a fixed vehicle count. The first
//! trial uses the requested (or estimated) count; every infeasible trial is
//! followed by one with `step` more vehicles, capped at one vehicle per
//! customer. The cap itself is always tried before giving up.
//!
//! [`EscalationState::advance`] is a pure transition function. [`escalate`]
//! drives it from a caller-supplied trial closure, so each trial constructs
//! and discards its own model.

use crate::{Problem, SolverConfig};

/// One visit on a backend route: the node and its service start time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Visit {
    /// Node index, 0 for the depot.
    pub node: usize,
    /// Time-dimension cumul at this visit, in seconds since midnight.
    pub arrival_secs: i64,
}

/// A used vehicle's route as reported by a backend, depot to depot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePlan {
    /// Vehicle slot within the trial.
    pub vehicle: usize,
    /// Visits in order, starting and ending at the depot.
    pub visits: Vec<Visit>,
}

impl RoutePlan {
    /// Customer nodes visited, in order.
    pub fn customers(&self) -> impl Iterator<Item = usize> + '_ {
        self.visits
            .iter()
            .map(|visit| visit.node)
            .filter(|node| *node != crate::DEPOT)
    }
}

/// Result of one routing trial.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrialOutcome {
    /// A feasible assignment, one plan per used vehicle.
    Feasible(Vec<RoutePlan>),
    /// No feasible assignment was found within the budget.
    Infeasible,
}

/// Vehicle counts a solve may try.
///
/// # Examples
///
/// ```
/// use roundsman_core::EscalationPolicy;
///
/// let policy = EscalationPolicy::new(3, 10, 25, true);
/// assert_eq!(policy.attempts().collect::<Vec<_>>(), vec![3, 13, 23, 25]);
///
/// let single = EscalationPolicy::new(3, 10, 25, false);
/// assert_eq!(single.attempts().collect::<Vec<_>>(), vec![3]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EscalationPolicy {
    initial: usize,
    step: usize,
    limit: usize,
    enabled: bool,
}

impl EscalationPolicy {
    /// Create a policy; `initial` and `step` are floored at one.
    #[must_use]
    pub fn new(initial: usize, step: usize, limit: usize, enabled: bool) -> Self {
        Self {
            initial: initial.max(1),
            step: step.max(1),
            limit,
            enabled,
        }
    }

    /// Policy for `problem` under `config`: the limit is one vehicle per
    /// customer.
    #[must_use]
    pub fn for_problem(problem: &Problem, config: &SolverConfig) -> Self {
        Self::new(
            problem.initial_vehicle_count(config.initial_vehicles),
            config.escalation_step,
            problem.customer_count(),
            config.auto_escalate,
        )
    }

    /// Vehicle count of the first trial.
    #[must_use]
    pub const fn initial(&self) -> usize {
        self.initial
    }

    /// Upper bound on vehicles.
    #[must_use]
    pub const fn limit(&self) -> usize {
        self.limit
    }

    /// Vehicle count to try after `current` failed, if any.
    #[must_use]
    pub fn next_after(&self, current: usize) -> Option<usize> {
        if !self.enabled || current >= self.limit {
            return None;
        }
        Some(current.saturating_add(self.step).min(self.limit))
    }

    /// Every vehicle count this policy would try, in order.
    pub fn attempts(&self) -> impl Iterator<Item = usize> + '_ {
        std::iter::successors(Some(self.initial), |current| self.next_after(*current))
    }
}

/// State of the escalation protocol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EscalationState {
    /// A trial with this many vehicles is due.
    Trying(usize),
    /// A trial succeeded.
    Succeeded {
        /// Vehicle count of the succeeding trial.
        vehicles: usize,
        /// Routes of the feasible assignment.
        plans: Vec<RoutePlan>,
    },
    /// Every permitted vehicle count was infeasible.
    Exhausted {
        /// Vehicle count of the final trial.
        last_tried: usize,
    },
}

impl EscalationState {
    /// Initial state of `policy`.
    #[must_use]
    pub const fn start(policy: &EscalationPolicy) -> Self {
        Self::Trying(policy.initial)
    }

    /// Apply a trial outcome. Terminal states are returned unchanged.
    #[must_use]
    pub fn advance(self, outcome: TrialOutcome, policy: &EscalationPolicy) -> Self {
        let Self::Trying(vehicles) = self else {
            return self;
        };
        match outcome {
            TrialOutcome::Feasible(plans) => Self::Succeeded { vehicles, plans },
            TrialOutcome::Infeasible => policy
                .next_after(vehicles)
                .map_or(Self::Exhausted { last_tried: vehicles }, Self::Trying),
        }
    }

    /// Whether no further trial is due.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        !matches!(self, Self::Trying(_))
    }
}

/// Outcome of [`escalate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EscalationReport {
    /// Vehicle counts tried, in order.
    pub attempts: Vec<usize>,
    /// Terminal state.
    pub state: EscalationState,
}

/// Run trials until one succeeds or the policy is exhausted.
///
/// Errors from `trial` abort the loop and are returned unchanged.
///
/// # Errors
///
/// Propagates the first error returned by `trial`.
///
/// # Examples
///
/// ```
/// use roundsman_core::{EscalationPolicy, EscalationState, TrialOutcome, escalate};
///
/// let policy = EscalationPolicy::new(1, 2, 10, true);
/// let report = escalate(&policy, |vehicles| {
///     Ok::<_, std::convert::Infallible>(if vehicles >= 4 {
///         TrialOutcome::Feasible(Vec::new())
///     } else {
///         TrialOutcome::Infeasible
///     })
/// })
/// .unwrap();
/// assert_eq!(report.attempts, vec![1, 3, 5]);
/// assert!(matches!(report.state, EscalationState::Succeeded { vehicles: 5, .. }));
/// ```
pub fn escalate<E, F>(policy: &EscalationPolicy, mut trial: F) -> Result<EscalationReport, E>
where
    F: FnMut(usize) -> Result<TrialOutcome, E>,
{
    let mut attempts = Vec::new();
    let mut state = EscalationState::start(policy);
    while let EscalationState::Trying(vehicles) = state {
        log::info!("routing trial with {vehicles} vehicle(s)");
        attempts.push(vehicles);
        let outcome = trial(vehicles)?;
        if matches!(outcome, TrialOutcome::Infeasible) {
            log::info!("no feasible routes with {vehicles} vehicle(s)");
        }
        state = state.advance(outcome, policy);
    }
    match &state {
        EscalationState::Succeeded { vehicles, .. } => {
            log::info!("feasible routes found with {vehicles} vehicle(s)");
        }
        EscalationState::Exhausted { last_tried } => {
            log::warn!("escalation exhausted after {last_tried} vehicle(s)");
        }
        EscalationState::Trying(_) => {}
    }
    Ok(EscalationReport { attempts, state })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::convert::Infallible;

    fn threshold_trial(threshold: usize) -> impl FnMut(usize) -> Result<TrialOutcome, Infallible> {
        move |vehicles| {
            Ok(if vehicles >= threshold {
                TrialOutcome::Feasible(Vec::new())
            } else {
                TrialOutcome::Infeasible
            })
        }
    }

    #[rstest]
    #[case(5, 10, 50, vec![5, 15, 25, 35, 45, 50])]
    #[case(5, 10, 15, vec![5, 15])]
    #[case(5, 10, 5, vec![5])]
    #[case(8, 10, 3, vec![8])]
    #[case(1, 1, 3, vec![1, 2, 3])]
    fn attempt_sequences(
        #[case] initial: usize,
        #[case] step: usize,
        #[case] limit: usize,
        #[case] expected: Vec<usize>,
    ) {
        let policy = EscalationPolicy::new(initial, step, limit, true);
        assert_eq!(policy.attempts().collect::<Vec<_>>(), expected);
    }

    #[rstest]
    fn success_stops_escalation() {
        let policy = EscalationPolicy::new(2, 10, 40, true);
        let report = escalate(&policy, threshold_trial(12)).expect("infallible");
        assert_eq!(report.attempts, vec![2, 12]);
        assert!(matches!(
            report.state,
            EscalationState::Succeeded { vehicles: 12, .. }
        ));
    }

    #[rstest]
    fn exhausts_at_cap() {
        let policy = EscalationPolicy::new(2, 10, 15, true);
        let report = escalate(&policy, threshold_trial(100)).expect("infallible");
        assert_eq!(report.attempts, vec![2, 12, 15]);
        assert_eq!(report.state, EscalationState::Exhausted { last_tried: 15 });
    }

    #[rstest]
    fn disabled_escalation_runs_single_trial() {
        let policy = EscalationPolicy::new(2, 10, 15, false);
        let report = escalate(&policy, threshold_trial(100)).expect("infallible");
        assert_eq!(report.attempts, vec![2]);
        assert_eq!(report.state, EscalationState::Exhausted { last_tried: 2 });
    }

    #[rstest]
    fn trial_errors_abort() {
        let policy = EscalationPolicy::new(1, 1, 5, true);
        let mut calls = 0;
        let result = escalate(&policy, |_| {
            calls += 1;
            Err::<TrialOutcome, _>("provider down")
        });
        assert_eq!(result, Err("provider down"));
        assert_eq!(calls, 1);
    }

    #[rstest]
    fn terminal_states_ignore_outcomes() {
        let policy = EscalationPolicy::new(1, 1, 5, true);
        let done = EscalationState::Exhausted { last_tried: 5 };
        let next = done.clone().advance(TrialOutcome::Feasible(Vec::new()), &policy);
        assert_eq!(next, done);
        assert!(next.is_terminal());
    }
}
