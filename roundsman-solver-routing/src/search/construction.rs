//! First-solution heuristics.

use super::{CompiledModel, Deadline, FirstSolutionStrategy, Plan};

/// Build a complete feasible plan with `strategy`, or `None` when the
/// heuristic leaves a visit unplaced or `deadline` passes first.
pub(super) fn first_solution(
    model: &CompiledModel,
    strategy: FirstSolutionStrategy,
    homogeneous: bool,
    deadline: Deadline,
) -> Option<Plan> {
    let plan = match strategy {
        FirstSolutionStrategy::PathCheapestArc => path_cheapest_arc(model, deadline)?,
        FirstSolutionStrategy::CheapestInsertion => Plan::empty(model.vehicles()),
    };
    insert_remaining(model, plan, homogeneous, deadline)
}

/// Grow each route from its start along the cheapest arc whose extension
/// keeps the route feasible. Ties go to the lowest visit index.
fn path_cheapest_arc(model: &CompiledModel, deadline: Deadline) -> Option<Plan> {
    let mut plan = Plan::empty(model.vehicles());
    let mut assigned = vec![false; model.visits()];
    for vehicle in 0..model.vehicles() {
        if assigned.iter().all(|done| *done) {
            break;
        }
        let mut current = model.start(vehicle);
        loop {
            if deadline.expired() {
                log::debug!("time limit reached while building routes");
                return None;
            }
            let mut candidates: Vec<(i64, usize)> = assigned
                .iter()
                .enumerate()
                .filter(|(_, done)| !**done)
                .map(|(visit, _)| (model.arc(current, visit), visit))
                .collect();
            candidates.sort_unstable();
            let route = plan.route(vehicle);
            let chosen = candidates.into_iter().map(|(_, visit)| visit).find(|visit| {
                model.path_feasible(
                    vehicle,
                    route.iter().copied().chain(std::iter::once(*visit)),
                )
            });
            let Some(visit) = chosen else {
                break;
            };
            if let Some(route_mut) = plan.route_mut(vehicle) {
                route_mut.push(visit);
            }
            if let Some(done) = assigned.get_mut(visit) {
                *done = true;
            }
            current = visit;
        }
    }
    Some(plan)
}

/// One insertion of `visit` into `vehicle`'s route before `position`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Insertion {
    delta: i64,
    visit: usize,
    vehicle: usize,
    position: usize,
}

/// Insert every unplaced visit at its cheapest feasible position, cheapest
/// insertion first.
///
/// With a homogeneous fleet only the first empty vehicle is considered, as
/// all empty vehicles are equivalent.
fn insert_remaining(
    model: &CompiledModel,
    mut plan: Plan,
    homogeneous: bool,
    deadline: Deadline,
) -> Option<Plan> {
    let mut pending = vec![true; model.visits()];
    for route in plan.routes() {
        for visit in route {
            if let Some(flag) = pending.get_mut(*visit) {
                *flag = false;
            }
        }
    }
    while pending.iter().any(|flag| *flag) {
        if deadline.expired() {
            log::debug!("time limit reached while inserting visits");
            return None;
        }
        let mut insertions = candidate_insertions(model, &plan, &pending, homogeneous);
        insertions.sort_unstable();
        let chosen = insertions.into_iter().find(|insertion| {
            let route = plan.route(insertion.vehicle);
            model.path_feasible(insertion.vehicle, with_inserted(route, insertion.position, insertion.visit))
        });
        let Some(insertion) = chosen else {
            log::debug!(
                "{} visits could not be inserted",
                pending.iter().filter(|flag| **flag).count()
            );
            return None;
        };
        plan.route_mut(insertion.vehicle)?
            .insert(insertion.position, insertion.visit);
        if let Some(flag) = pending.get_mut(insertion.visit) {
            *flag = false;
        }
    }
    plan.is_complete(model.visits()).then_some(plan)
}

fn candidate_insertions(
    model: &CompiledModel,
    plan: &Plan,
    pending: &[bool],
    homogeneous: bool,
) -> Vec<Insertion> {
    let first_empty = plan.first_empty();
    let mut insertions = Vec::new();
    for (vehicle, route) in plan.routes().iter().enumerate() {
        if homogeneous && route.is_empty() && Some(vehicle) != first_empty {
            continue;
        }
        let opening = if route.is_empty() { model.fixed_cost() } else { 0 };
        for position in 0..=route.len() {
            let (before, after) = neighbours(model, vehicle, route, position);
            let removed = model.arc(before, after);
            for (visit, _) in pending.iter().enumerate().filter(|(_, flag)| **flag) {
                let delta = model
                    .arc(before, visit)
                    .saturating_add(model.arc(visit, after))
                    .saturating_sub(removed)
                    .saturating_add(opening);
                insertions.push(Insertion {
                    delta,
                    visit,
                    vehicle,
                    position,
                });
            }
        }
    }
    insertions
}

/// Indices around the gap before `position` in `vehicle`'s route.
pub(super) fn neighbours(
    model: &CompiledModel,
    vehicle: usize,
    route: &[usize],
    position: usize,
) -> (usize, usize) {
    let before = position
        .checked_sub(1)
        .and_then(|previous| route.get(previous).copied())
        .unwrap_or_else(|| model.start(vehicle));
    let after = route
        .get(position)
        .copied()
        .unwrap_or_else(|| model.end(vehicle));
    (before, after)
}

/// `route` with `visit` inserted before `position`.
pub(super) fn with_inserted(
    route: &[usize],
    position: usize,
    visit: usize,
) -> impl Iterator<Item = usize> + Clone + '_ {
    route
        .iter()
        .copied()
        .take(position)
        .chain(std::iter::once(visit))
        .chain(route.iter().copied().skip(position))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{RoutingIndexManager, RoutingModel};
    use rstest::rstest;
    use std::time::Duration;

    /// Visits 0..3 sit at 10, 20 and 30 on a line; the depot sits at 0.
    fn line_model(vehicles: usize, capacity: i64) -> CompiledModel {
        let manager = RoutingIndexManager::new(4, vehicles, 0).expect("valid manager");
        let positions: Vec<i64> = (0..manager.num_indices())
            .map(|index| {
                manager
                    .index_to_node(index)
                    .and_then(|node| i64::try_from(node).ok())
                    .unwrap_or_default()
                    * 10
            })
            .collect();
        let visits = manager.num_visits();
        let mut model = RoutingModel::new(manager);
        let distance = model.register_transit_callback(move |from, to| {
            let a = positions.get(from).copied().unwrap_or_default();
            let b = positions.get(to).copied().unwrap_or_default();
            (a - b).abs()
        });
        model
            .set_arc_cost_evaluator_of_all_vehicles(distance)
            .expect("known callback");
        let demand = model.register_unary_transit_callback(move |from| i64::from(from < visits));
        model
            .add_dimension(demand, 0, capacity, true, "Capacity")
            .expect("capacity dimension");
        CompiledModel::compile(&model).expect("compiles")
    }

    fn open_deadline() -> Deadline {
        Deadline::after(Duration::from_secs(3_600))
    }

    #[rstest]
    fn cheapest_arc_walks_outwards() {
        let model = line_model(2, 10);
        let plan = path_cheapest_arc(&model, open_deadline()).expect("deadline is far away");
        assert_eq!(plan.route(0), &[0, 1, 2]);
        assert!(plan.route(1).is_empty());
    }

    #[rstest]
    fn capacity_splits_routes() {
        let model = line_model(3, 2);
        let plan = first_solution(
            &model,
            FirstSolutionStrategy::PathCheapestArc,
            true,
            open_deadline(),
        )
        .expect("three vehicles suffice");
        assert_eq!(plan.route(0), &[0, 1]);
        assert_eq!(plan.route(1), &[2]);
        assert!(plan.is_complete(3));
    }

    #[rstest]
    fn insertion_builds_complete_plan() {
        let model = line_model(2, 10);
        let plan = first_solution(
            &model,
            FirstSolutionStrategy::CheapestInsertion,
            true,
            open_deadline(),
        )
        .expect("one vehicle suffices");
        assert_eq!(plan.used_vehicles(), 1);
        assert!(plan.is_complete(3));
    }

    #[rstest]
    fn too_little_capacity_fails() {
        let model = line_model(1, 2);
        let deadline = open_deadline();
        assert!(
            first_solution(&model, FirstSolutionStrategy::PathCheapestArc, true, deadline).is_none()
        );
        assert!(
            first_solution(&model, FirstSolutionStrategy::CheapestInsertion, false, deadline)
                .is_none()
        );
    }

    #[rstest]
    fn insertion_respects_position() {
        let inserted: Vec<usize> = with_inserted(&[4, 5, 6], 1, 9).collect();
        assert_eq!(inserted, vec![4, 9, 5, 6]);
    }

    #[rstest]
    #[case(FirstSolutionStrategy::PathCheapestArc)]
    #[case(FirstSolutionStrategy::CheapestInsertion)]
    fn expired_deadline_abandons_construction(#[case] strategy: FirstSolutionStrategy) {
        let model = line_model(2, 10);
        let expired = Deadline::after(Duration::ZERO);
        assert!(first_solution(&model, strategy, true, expired).is_none());
    }
}
