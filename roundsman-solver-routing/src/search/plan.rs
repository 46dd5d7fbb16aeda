//! Mutable route sets manipulated by the search.

use super::CompiledModel;
use crate::model::Assignment;

/// Visit indices served by each vehicle, in order, without starts and ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Plan {
    routes: Vec<Vec<usize>>,
}

impl Plan {
    pub(crate) fn empty(vehicles: usize) -> Self {
        Self {
            routes: vec![Vec::new(); vehicles],
        }
    }

    #[cfg(test)]
    pub(crate) const fn from_routes(routes: Vec<Vec<usize>>) -> Self {
        Self { routes }
    }

    pub(crate) fn routes(&self) -> &[Vec<usize>] {
        &self.routes
    }

    pub(crate) fn route(&self, vehicle: usize) -> &[usize] {
        self.routes.get(vehicle).map_or(&[], Vec::as_slice)
    }

    pub(crate) fn route_mut(&mut self, vehicle: usize) -> Option<&mut Vec<usize>> {
        self.routes.get_mut(vehicle)
    }

    /// Vehicles serving at least one visit.
    pub(crate) fn used_vehicles(&self) -> usize {
        self.routes.iter().filter(|route| !route.is_empty()).count()
    }

    /// First vehicle without visits.
    pub(crate) fn first_empty(&self) -> Option<usize> {
        self.routes.iter().position(Vec::is_empty)
    }

    /// Whether every visit index appears in some route.
    pub(crate) fn is_complete(&self, visits: usize) -> bool {
        self.routes.iter().map(Vec::len).sum::<usize>() == visits
    }

    /// Arcs of every used route, start and end included.
    pub(crate) fn arcs<'p>(&'p self, model: &'p CompiledModel) -> impl Iterator<Item = (usize, usize)> + 'p {
        self.routes
            .iter()
            .enumerate()
            .filter(|(_, route)| !route.is_empty())
            .flat_map(move |(vehicle, route)| {
                let path: Vec<usize> = std::iter::once(model.start(vehicle))
                    .chain(route.iter().copied())
                    .chain(std::iter::once(model.end(vehicle)))
                    .collect();
                let successors = path.clone();
                path.into_iter().zip(successors.into_iter().skip(1))
            })
    }

    /// Objective: arc costs of used routes plus their fixed costs.
    pub(crate) fn cost(&self, model: &CompiledModel) -> i64 {
        let arcs = self
            .arcs(model)
            .map(|(from, to)| model.arc(from, to))
            .fold(0_i64, i64::saturating_add);
        let fixed = i64::try_from(self.used_vehicles())
            .unwrap_or(i64::MAX)
            .saturating_mul(model.fixed_cost());
        arcs.saturating_add(fixed)
    }

    /// Successor links and earliest cumuls of the plan.
    pub(crate) fn into_assignment(self, model: &CompiledModel) -> Assignment {
        let size = model.size();
        let objective = self.cost(model);
        let mut next: Vec<usize> = (0..size).collect();
        let mut cumuls: Vec<(String, Vec<i64>)> = Vec::new();
        for (vehicle, route) in self.routes.iter().enumerate() {
            let path: Vec<usize> = std::iter::once(model.start(vehicle))
                .chain(route.iter().copied())
                .chain(std::iter::once(model.end(vehicle)))
                .collect();
            for pair in path.windows(2) {
                if let &[from, to] = pair
                    && let Some(slot) = next.get_mut(from)
                {
                    *slot = to;
                }
            }
            let Some(schedule) = model.schedule(vehicle, route.iter().copied()) else {
                log::warn!("vehicle {vehicle} has no feasible schedule; cumuls left at zero");
                continue;
            };
            for (name, values) in schedule {
                let position = cumuls
                    .iter()
                    .position(|(existing, _)| *existing == name)
                    .unwrap_or_else(|| {
                        cumuls.push((name, vec![0; size]));
                        cumuls.len() - 1
                    });
                if let Some((_, table)) = cumuls.get_mut(position) {
                    for (index, value) in path.iter().zip(values) {
                        if let Some(slot) = table.get_mut(*index) {
                            *slot = value;
                        }
                    }
                }
            }
        }
        Assignment::new(next, cumuls, objective)
    }
}
