//! First-improvement local search over relocate, exchange and 2-opt moves.
//!
//! Moves are scored on the augmented cost `arc + lambda * penalty`; the
//! feasibility of a move is only checked once it improves that cost.

use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;

use super::construction::{neighbours, with_inserted};
use super::{CompiledModel, Deadline, Plan};

/// Arc penalties accumulated by guided local search.
#[derive(Debug, Clone)]
pub(super) struct Penalties {
    counts: Vec<i64>,
}

impl Penalties {
    pub(super) fn new(model: &CompiledModel) -> Self {
        Self {
            counts: vec![0; model.size().saturating_mul(model.size())],
        }
    }

    pub(super) fn get(&self, model: &CompiledModel, from: usize, to: usize) -> i64 {
        self.counts
            .get(model.arc_slot(from, to))
            .copied()
            .unwrap_or_default()
    }

    pub(super) fn bump(&mut self, model: &CompiledModel, from: usize, to: usize) {
        if let Some(count) = self.counts.get_mut(model.arc_slot(from, to)) {
            *count = count.saturating_add(1);
        }
    }
}

/// A move that lowers the augmented cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Move {
    Relocate {
        from_vehicle: usize,
        from_position: usize,
        to_vehicle: usize,
        to_position: usize,
    },
    Exchange {
        first_vehicle: usize,
        first_position: usize,
        second_vehicle: usize,
        second_position: usize,
    },
    TwoOpt {
        vehicle: usize,
        first: usize,
        last: usize,
    },
}

/// Local search over a fixed penalty state.
pub(super) struct Neighbourhood<'s> {
    model: &'s CompiledModel,
    penalties: &'s Penalties,
    lambda: i64,
    homogeneous: bool,
}

impl<'s> Neighbourhood<'s> {
    pub(super) const fn new(
        model: &'s CompiledModel,
        penalties: &'s Penalties,
        lambda: i64,
        homogeneous: bool,
    ) -> Self {
        Self {
            model,
            penalties,
            lambda,
            homogeneous,
        }
    }

    fn weight(&self, from: usize, to: usize) -> i64 {
        self.model.arc(from, to).saturating_add(
            self.lambda
                .saturating_mul(self.penalties.get(self.model, from, to)),
        )
    }

    /// Apply improving moves until none is left or the deadline passes.
    /// Returns the number of moves applied.
    pub(super) fn descend(&self, plan: &mut Plan, rng: &mut ChaCha8Rng, deadline: Deadline) -> usize {
        let mut applied = 0_usize;
        while !deadline.expired() {
            let mut order: Vec<(usize, usize)> = plan
                .routes()
                .iter()
                .enumerate()
                .flat_map(|(vehicle, route)| (0..route.len()).map(move |position| (vehicle, position)))
                .collect();
            order.shuffle(rng);
            let Some(step) = self.find_improvement(plan, &order, deadline) else {
                break;
            };
            apply(plan, step);
            applied += 1;
        }
        applied
    }

    fn find_improvement(&self, plan: &Plan, order: &[(usize, usize)], deadline: Deadline) -> Option<Move> {
        for &(vehicle, position) in order {
            if deadline.expired() {
                return None;
            }
            let found = self
                .relocate(plan, vehicle, position)
                .or_else(|| self.exchange(plan, vehicle, position))
                .or_else(|| self.two_opt(plan, vehicle, position));
            if found.is_some() {
                return found;
            }
        }
        None
    }

    /// Move the visit at `position` of `vehicle` elsewhere.
    fn relocate(&self, plan: &Plan, vehicle: usize, position: usize) -> Option<Move> {
        let source = plan.route(vehicle);
        let visit = source.get(position).copied()?;
        let (before, after) = around(self.model, vehicle, source, position);
        let closing = if source.len() == 1 { self.model.fixed_cost() } else { 0 };
        let gain = self
            .weight(before, visit)
            .saturating_add(self.weight(visit, after))
            .saturating_sub(self.weight(before, after))
            .saturating_add(closing);
        let first_empty = plan.first_empty();
        for (target_vehicle, target) in plan.routes().iter().enumerate() {
            if target.is_empty()
                && (target_vehicle == vehicle
                    || (self.homogeneous && Some(target_vehicle) != first_empty))
            {
                continue;
            }
            let reduced: Vec<usize> = if target_vehicle == vehicle {
                without(target, position).collect()
            } else {
                target.clone()
            };
            let opening = if target.is_empty() { self.model.fixed_cost() } else { 0 };
            for target_position in 0..=reduced.len() {
                if target_vehicle == vehicle && target_position == position {
                    continue;
                }
                let (left, right) = neighbours(self.model, target_vehicle, &reduced, target_position);
                let cost = self
                    .weight(left, visit)
                    .saturating_add(self.weight(visit, right))
                    .saturating_sub(self.weight(left, right))
                    .saturating_add(opening);
                if cost >= gain {
                    continue;
                }
                let feasible = if target_vehicle == vehicle {
                    self.model.path_feasible(
                        vehicle,
                        with_inserted(&reduced, target_position, visit),
                    )
                } else {
                    self.model.path_feasible(vehicle, without(source, position))
                        && self.model.path_feasible(
                            target_vehicle,
                            with_inserted(&reduced, target_position, visit),
                        )
                };
                if feasible {
                    return Some(Move::Relocate {
                        from_vehicle: vehicle,
                        from_position: position,
                        to_vehicle: target_vehicle,
                        to_position: target_position,
                    });
                }
            }
        }
        None
    }

    /// Swap the visit at `position` of `vehicle` with a visit on a later
    /// route.
    fn exchange(&self, plan: &Plan, vehicle: usize, position: usize) -> Option<Move> {
        let first_route = plan.route(vehicle);
        let first = first_route.get(position).copied()?;
        let (a, b) = around(self.model, vehicle, first_route, position);
        for (other_vehicle, other_route) in plan.routes().iter().enumerate().skip(vehicle + 1) {
            for (other_position, &second) in other_route.iter().enumerate() {
                let (c, d) = around(self.model, other_vehicle, other_route, other_position);
                let before = self
                    .weight(a, first)
                    .saturating_add(self.weight(first, b))
                    .saturating_add(self.weight(c, second))
                    .saturating_add(self.weight(second, d));
                let after = self
                    .weight(a, second)
                    .saturating_add(self.weight(second, b))
                    .saturating_add(self.weight(c, first))
                    .saturating_add(self.weight(first, d));
                if after >= before {
                    continue;
                }
                if self.model.path_feasible(vehicle, replaced(first_route, position, second))
                    && self
                        .model
                        .path_feasible(other_vehicle, replaced(other_route, other_position, first))
                {
                    return Some(Move::Exchange {
                        first_vehicle: vehicle,
                        first_position: position,
                        second_vehicle: other_vehicle,
                        second_position: other_position,
                    });
                }
            }
        }
        None
    }

    /// Reverse the segment starting at `first` of `vehicle`'s route.
    fn two_opt(&self, plan: &Plan, vehicle: usize, first: usize) -> Option<Move> {
        let route = plan.route(vehicle);
        let head = route.get(first).copied()?;
        let (before, _) = around(self.model, vehicle, route, first);
        let mut inner_forward = 0_i64;
        let mut inner_backward = 0_i64;
        for last in first + 1..route.len() {
            let tail = route.get(last).copied()?;
            let previous = route.get(last - 1).copied()?;
            inner_forward = inner_forward.saturating_add(self.weight(previous, tail));
            inner_backward = inner_backward.saturating_add(self.weight(tail, previous));
            let (_, after) = around(self.model, vehicle, route, last);
            let current = self
                .weight(before, head)
                .saturating_add(inner_forward)
                .saturating_add(self.weight(tail, after));
            let reversed = self
                .weight(before, tail)
                .saturating_add(inner_backward)
                .saturating_add(self.weight(head, after));
            if reversed >= current {
                continue;
            }
            if self
                .model
                .path_feasible(vehicle, reversed_segment(route, first, last))
            {
                return Some(Move::TwoOpt {
                    vehicle,
                    first,
                    last,
                });
            }
        }
        None
    }
}

/// Neighbours of the visit at `position`.
fn around(model: &CompiledModel, vehicle: usize, route: &[usize], position: usize) -> (usize, usize) {
    let (before, _) = neighbours(model, vehicle, route, position);
    let (_, after) = neighbours(model, vehicle, route, position + 1);
    (before, after)
}

fn without(route: &[usize], position: usize) -> impl Iterator<Item = usize> + Clone + '_ {
    route
        .iter()
        .enumerate()
        .filter(move |(index, _)| *index != position)
        .map(|(_, visit)| *visit)
}

fn replaced(route: &[usize], position: usize, visit: usize) -> impl Iterator<Item = usize> + Clone + '_ {
    route
        .iter()
        .enumerate()
        .map(move |(index, current)| if index == position { visit } else { *current })
}

fn reversed_segment(
    route: &[usize],
    first: usize,
    last: usize,
) -> impl Iterator<Item = usize> + Clone + '_ {
    (0..route.len()).filter_map(move |index| {
        let source = if (first..=last).contains(&index) {
            first + last - index
        } else {
            index
        };
        route.get(source).copied()
    })
}

fn apply(plan: &mut Plan, step: Move) {
    match step {
        Move::Relocate {
            from_vehicle,
            from_position,
            to_vehicle,
            to_position,
        } => {
            let Some(visit) = plan
                .route_mut(from_vehicle)
                .filter(|route| from_position < route.len())
                .map(|route| route.remove(from_position))
            else {
                return;
            };
            if let Some(route) = plan.route_mut(to_vehicle) {
                route.insert(to_position.min(route.len()), visit);
            }
        }
        Move::Exchange {
            first_vehicle,
            first_position,
            second_vehicle,
            second_position,
        } => {
            let first = plan.route(first_vehicle).get(first_position).copied();
            let second = plan.route(second_vehicle).get(second_position).copied();
            if let (Some(first_visit), Some(second_visit)) = (first, second) {
                if let Some(slot) = plan
                    .route_mut(first_vehicle)
                    .and_then(|route| route.get_mut(first_position))
                {
                    *slot = second_visit;
                }
                if let Some(slot) = plan
                    .route_mut(second_vehicle)
                    .and_then(|route| route.get_mut(second_position))
                {
                    *slot = first_visit;
                }
            }
        }
        Move::TwoOpt {
            vehicle,
            first,
            last,
        } => {
            if let Some(segment) = plan
                .route_mut(vehicle)
                .and_then(|route| route.get_mut(first..=last))
            {
                segment.reverse();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{RoutingIndexManager, RoutingModel};
    use rand::SeedableRng;
    use rstest::rstest;
    use std::time::{Duration, Instant};

    /// Four visits at 10, 20, 30 and 40 on a line; the depot sits at 0.
    fn line_model(vehicles: usize, fixed_cost: i64) -> CompiledModel {
        let manager = RoutingIndexManager::new(5, vehicles, 0).expect("valid manager");
        let positions: Vec<i64> = (0..manager.num_indices())
            .map(|index| {
                manager
                    .index_to_node(index)
                    .and_then(|node| i64::try_from(node).ok())
                    .unwrap_or_default()
                    * 10
            })
            .collect();
        let mut model = RoutingModel::new(manager);
        let distance = model.register_transit_callback(move |from, to| {
            let a = positions.get(from).copied().unwrap_or_default();
            let b = positions.get(to).copied().unwrap_or_default();
            (a - b).abs()
        });
        model
            .set_arc_cost_evaluator_of_all_vehicles(distance)
            .expect("known callback");
        model.set_fixed_cost_of_all_vehicles(fixed_cost);
        CompiledModel::compile(&model).expect("compiles")
    }

    fn descend(model: &CompiledModel, plan: &mut Plan) -> usize {
        let penalties = Penalties::new(model);
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        Neighbourhood::new(model, &penalties, 0, true).descend(
            plan,
            &mut rng,
            Deadline::after(Duration::from_secs(60)),
        )
    }

    #[rstest]
    fn untangles_a_zigzag_route() {
        let model = line_model(1, 0);
        let mut plan = Plan::from_routes(vec![vec![2, 0, 3, 1]]);
        let before = plan.cost(&model);
        assert!(descend(&model, &mut plan) > 0);
        assert!(plan.cost(&model) < before);
        assert_eq!(plan.cost(&model), 80);
    }

    #[rstest]
    fn merges_routes_to_save_fixed_cost() {
        let model = line_model(2, 1_000);
        let mut plan = Plan::from_routes(vec![vec![0, 1], vec![2, 3]]);
        descend(&model, &mut plan);
        assert_eq!(plan.used_vehicles(), 1);
        assert_eq!(plan.cost(&model), 1_080);
    }

    #[rstest]
    fn optimum_is_left_alone() {
        let model = line_model(1, 0);
        let mut plan = Plan::from_routes(vec![vec![0, 1, 2, 3]]);
        assert_eq!(descend(&model, &mut plan), 0);
    }

    #[rstest]
    fn segment_reversal_covers_bounds() {
        let reversed: Vec<usize> = reversed_segment(&[1, 2, 3, 4, 5], 1, 3).collect();
        assert_eq!(reversed, vec![1, 4, 3, 2, 5]);
    }

    #[rstest]
    fn penalties_raise_weights() {
        let model = line_model(1, 0);
        let mut penalties = Penalties::new(&model);
        penalties.bump(&model, 0, 1);
        penalties.bump(&model, 0, 1);
        let neighbourhood = Neighbourhood::new(&model, &penalties, 5, true);
        assert_eq!(neighbourhood.weight(0, 1), 10 + 2 * 5);
        assert_eq!(neighbourhood.weight(1, 0), 10);
    }

    #[rstest]
    fn relocate_credits_the_arcs_around_the_removed_visit() {
        let model = line_model(2, 1_000);
        let plan = Plan::from_routes(vec![vec![0, 1], vec![2, 3]]);
        let penalties = Penalties::new(&model);
        let neighbourhood = Neighbourhood::new(&model, &penalties, 0, true);
        assert_eq!(
            neighbourhood.relocate(&plan, 0, 1),
            Some(Move::Relocate {
                from_vehicle: 0,
                from_position: 1,
                to_vehicle: 1,
                to_position: 0,
            })
        );
    }

    #[rstest]
    fn penalised_descent_settles_before_the_deadline() {
        let model = line_model(2, 50);
        let mut penalties = Penalties::new(&model);
        for (from, to) in [(0, 1), (1, 2), (2, 3), (3, 0)] {
            penalties.bump(&model, from, to);
        }
        let mut plan = Plan::from_routes(vec![vec![3, 0], vec![2, 1]]);
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let started = Instant::now();
        let applied = Neighbourhood::new(&model, &penalties, 25, true).descend(
            &mut plan,
            &mut rng,
            Deadline::after(Duration::from_secs(60)),
        );
        assert!(started.elapsed() < Duration::from_secs(5));
        assert!(applied > 0);
        assert!(plan.is_complete(4));
    }
}
