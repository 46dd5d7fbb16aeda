//! Dense snapshot of a [`RoutingModel`] used during search.
//!
//! Callbacks are evaluated once per arc up front so the search only reads
//! flat tables.

use crate::model::{RoutingModel, RoutingModelError, TransitCallbackId};

#[derive(Debug, Clone)]
struct CompiledDimension {
    name: String,
    transit: Vec<i64>,
    slack_max: i64,
    capacities: Vec<i64>,
    fix_start_cumul_to_zero: bool,
    cumul_min: Vec<i64>,
    cumul_max: Vec<i64>,
}

/// Arc costs and dimension tables over routing indices.
#[derive(Debug, Clone)]
pub(crate) struct CompiledModel {
    size: usize,
    visits: usize,
    vehicles: usize,
    arc_costs: Vec<i64>,
    fixed_cost: i64,
    dimensions: Vec<CompiledDimension>,
}

/// Per-dimension cumul values along one path, start and end included.
pub(crate) type Schedule = Vec<(String, Vec<i64>)>;

impl CompiledModel {
    pub(crate) fn compile(model: &RoutingModel<'_>) -> Result<Self, RoutingModelError> {
        let arc_callback = model
            .arc_cost_callback()
            .ok_or(RoutingModelError::MissingArcCost)?;
        let manager = model.index_manager();
        let size = manager.num_indices();
        let visits = manager.num_visits();
        let vehicles = manager.num_vehicles();
        let table = |callback: TransitCallbackId| -> Result<Vec<i64>, RoutingModelError> {
            let mut values = Vec::with_capacity(size.saturating_mul(size));
            for from in 0..size {
                for to in 0..size {
                    let value = if manager.is_start(from) && manager.is_end(to) {
                        0
                    } else {
                        model
                            .transit_value(callback, from, to)
                            .ok_or(RoutingModelError::UnknownCallback { id: callback.index() })?
                    };
                    values.push(value);
                }
            }
            Ok(values)
        };
        let arc_costs = table(arc_callback)?;
        let dimensions = model
            .dimensions()
            .iter()
            .map(|dimension| {
                let (cumul_min, cumul_max) = (0..size)
                    .map(|index| dimension.cumul_range(index).unwrap_or((0, i64::MAX)))
                    .unzip();
                Ok(CompiledDimension {
                    name: dimension.name().to_owned(),
                    transit: table(dimension.transit())?,
                    slack_max: dimension.slack_max(),
                    capacities: (0..vehicles)
                        .map(|vehicle| dimension.capacity(vehicle).unwrap_or(i64::MAX))
                        .collect(),
                    fix_start_cumul_to_zero: dimension.fixes_start_cumul_to_zero(),
                    cumul_min,
                    cumul_max,
                })
            })
            .collect::<Result<Vec<_>, RoutingModelError>>()?;
        Ok(Self {
            size,
            visits,
            vehicles,
            arc_costs,
            fixed_cost: model.fixed_cost(),
            dimensions,
        })
    }

    /// Number of routing indices.
    pub(crate) const fn size(&self) -> usize {
        self.size
    }

    /// Number of visit indices; they occupy `0..visits`.
    pub(crate) const fn visits(&self) -> usize {
        self.visits
    }

    pub(crate) const fn vehicles(&self) -> usize {
        self.vehicles
    }

    pub(crate) const fn start(&self, vehicle: usize) -> usize {
        self.visits + vehicle
    }

    pub(crate) const fn end(&self, vehicle: usize) -> usize {
        self.visits + self.vehicles + vehicle
    }

    pub(crate) const fn fixed_cost(&self) -> i64 {
        self.fixed_cost
    }

    /// Flat position of arc `from -> to`.
    pub(crate) const fn arc_slot(&self, from: usize, to: usize) -> usize {
        from * self.size + to
    }

    /// Cost of arc `from -> to`; vehicle start to any end is free.
    pub(crate) fn arc(&self, from: usize, to: usize) -> i64 {
        self.arc_costs
            .get(self.arc_slot(from, to))
            .copied()
            .unwrap_or(i64::MAX)
    }

    /// Whether `vehicle` can serve `visits` in order without breaking a
    /// dimension.
    pub(crate) fn path_feasible<I>(&self, vehicle: usize, visits: I) -> bool
    where
        I: Iterator<Item = usize> + Clone,
    {
        self.dimensions
            .iter()
            .all(|dimension| self.bounds(dimension, vehicle, visits.clone()).is_some())
    }

    /// Earliest feasible cumuls of every dimension along the path of
    /// `vehicle` through `visits`.
    pub(crate) fn schedule<I>(&self, vehicle: usize, visits: I) -> Option<Schedule>
    where
        I: Iterator<Item = usize> + Clone,
    {
        self.dimensions
            .iter()
            .map(|dimension| {
                let bounds = self.bounds(dimension, vehicle, visits.clone())?;
                let path: Vec<usize> = self.path(vehicle, visits.clone()).collect();
                Some((dimension.name.clone(), self.earliest_cumuls(dimension, &path, &bounds)))
            })
            .collect()
    }

    fn path<I>(&self, vehicle: usize, visits: I) -> impl Iterator<Item = usize> + Clone + use<I>
    where
        I: Iterator<Item = usize> + Clone,
    {
        std::iter::once(self.start(vehicle))
            .chain(visits)
            .chain(std::iter::once(self.end(vehicle)))
    }

    /// Forward propagation of cumul intervals.
    ///
    /// Each interval holds the cumul values reachable from the start while
    /// honouring every range seen so far. `None` means an interval became
    /// empty.
    fn bounds<I>(&self, dimension: &CompiledDimension, vehicle: usize, visits: I) -> Option<Vec<(i64, i64)>>
    where
        I: Iterator<Item = usize> + Clone,
    {
        let capacity = dimension.capacities.get(vehicle).copied().unwrap_or(i64::MAX);
        let mut path = self.path(vehicle, visits);
        let start = path.next()?;
        let mut lower = dimension.cumul_min.get(start).copied().unwrap_or(0).max(0);
        let mut upper = dimension
            .cumul_max
            .get(start)
            .copied()
            .unwrap_or(i64::MAX)
            .min(capacity);
        if dimension.fix_start_cumul_to_zero {
            upper = upper.min(0);
        }
        if lower > upper {
            return None;
        }
        let mut bounds = vec![(lower, upper)];
        let mut previous = start;
        for index in path {
            let transit = dimension.transit.get(self.arc_slot(previous, index)).copied()?;
            let floor = dimension.cumul_min.get(index).copied().unwrap_or(0);
            let ceiling = dimension.cumul_max.get(index).copied().unwrap_or(i64::MAX);
            lower = lower.saturating_add(transit).max(floor).max(0);
            upper = upper
                .saturating_add(transit)
                .saturating_add(dimension.slack_max)
                .min(ceiling)
                .min(capacity);
            if lower > upper {
                return None;
            }
            bounds.push((lower, upper));
            previous = index;
        }
        Some(bounds)
    }

    /// Pick the earliest end cumul, then walk backwards keeping each cumul
    /// as early as its bounds and the slack allowance permit.
    fn earliest_cumuls(
        &self,
        dimension: &CompiledDimension,
        path: &[usize],
        bounds: &[(i64, i64)],
    ) -> Vec<i64> {
        let mut cumuls = vec![0; bounds.len()];
        let mut after: Option<(usize, i64)> = None;
        for (position, (&index, &(lower, _))) in path.iter().zip(bounds).enumerate().rev() {
            let value = after.map_or(lower, |(next_index, next_cumul)| {
                let transit = dimension
                    .transit
                    .get(self.arc_slot(index, next_index))
                    .copied()
                    .unwrap_or_default();
                lower.max(
                    next_cumul
                        .saturating_sub(transit)
                        .saturating_sub(dimension.slack_max),
                )
            });
            if let Some(slot) = cumuls.get_mut(position) {
                *slot = value;
            }
            after = Some((index, value));
        }
        cumuls
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RoutingIndexManager;
    use rstest::{fixture, rstest};

    /// Three visits on a line, ten seconds apart, one vehicle.
    #[fixture]
    fn line() -> RoutingModel<'static> {
        let manager = RoutingIndexManager::new(4, 1, 0).expect("valid manager");
        let nodes: Vec<i64> = (0..manager.num_indices())
            .map(|index| {
                manager
                    .index_to_node(index)
                    .and_then(|node| i64::try_from(node).ok())
                    .unwrap_or_default()
            })
            .collect();
        let mut model = RoutingModel::new(manager);
        let time = model.register_transit_callback(move |from, to| {
            let a = nodes.get(from).copied().unwrap_or_default();
            let b = nodes.get(to).copied().unwrap_or_default();
            (a - b).abs() * 10
        });
        model
            .set_arc_cost_evaluator_of_all_vehicles(time)
            .expect("known callback");
        model
            .add_dimension(time, 100, 1_000, false, "Time")
            .expect("time dimension");
        model
    }

    #[rstest]
    fn start_to_end_is_free(line: RoutingModel<'static>) {
        let compiled = CompiledModel::compile(&line).expect("compiles");
        assert_eq!(compiled.arc(compiled.start(0), compiled.end(0)), 0);
        assert_eq!(compiled.arc(compiled.start(0), 2), 30);
    }

    #[rstest]
    fn windows_restrict_order(mut line: RoutingModel<'static>) {
        let time = line.dimension_mut("Time").expect("time dimension");
        time.set_cumul_range(0, 0, 15).expect("visit index");
        let compiled = CompiledModel::compile(&line).expect("compiles");
        assert!(compiled.path_feasible(0, [0, 1, 2].into_iter()));
        assert!(!compiled.path_feasible(0, [2, 1, 0].into_iter()));
    }

    #[rstest]
    fn schedule_waits_for_window_opening(mut line: RoutingModel<'static>) {
        let time = line.dimension_mut("Time").expect("time dimension");
        time.set_cumul_range(1, 200, 300).expect("visit index");
        let compiled = CompiledModel::compile(&line).expect("compiles");
        let schedule = compiled
            .schedule(0, [1, 2].into_iter())
            .expect("feasible path");
        let (name, cumuls) = schedule.first().expect("one dimension");
        assert_eq!(name, "Time");
        assert_eq!(cumuls, &vec![80, 200, 210, 240]);
    }

    #[rstest]
    fn slack_caps_waiting(mut line: RoutingModel<'static>) {
        let time = line.dimension_mut("Time").expect("time dimension");
        time.set_cumul_range(3, 0, 0).expect("start index");
        time.set_cumul_range(1, 250, 300).expect("visit index");
        let compiled = CompiledModel::compile(&line).expect("compiles");
        assert!(!compiled.path_feasible(0, [1].into_iter()));
        assert!(compiled.schedule(0, [1].into_iter()).is_none());
    }
}
