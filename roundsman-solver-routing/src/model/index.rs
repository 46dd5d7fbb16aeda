//! Mapping between problem nodes and routing indices.
//!
//! Every non-depot node owns one routing index. Each vehicle additionally
//! owns a start and an end index, both mapped back to the depot node. The
//! layout is `[visits..., starts..., ends...]`.

use super::RoutingModelError;

/// Translates between node numbers and routing indices.
///
/// # Examples
///
/// ```
/// use roundsman_solver_routing::RoutingIndexManager;
///
/// # fn main() -> Result<(), roundsman_solver_routing::RoutingModelError> {
/// let manager = RoutingIndexManager::new(4, 2, 0)?;
/// assert_eq!(manager.num_indices(), 3 + 2 + 2);
/// assert_eq!(manager.node_to_index(1), Some(0));
/// assert_eq!(manager.index_to_node(manager.start(1)), Some(0));
/// assert!(manager.is_end(manager.end(0)));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutingIndexManager {
    num_nodes: usize,
    num_vehicles: usize,
    depot: usize,
    index_to_node: Vec<usize>,
    node_to_index: Vec<Option<usize>>,
}

impl RoutingIndexManager {
    /// Create a manager for `num_nodes` nodes served by `num_vehicles`
    /// vehicles based at `depot`.
    ///
    /// # Errors
    ///
    /// Returns [`RoutingModelError::NoVehicles`] without vehicles and
    /// [`RoutingModelError::DepotOutOfRange`] when `depot` is not a node.
    pub fn new(
        num_nodes: usize,
        num_vehicles: usize,
        depot: usize,
    ) -> Result<Self, RoutingModelError> {
        if num_vehicles == 0 {
            return Err(RoutingModelError::NoVehicles);
        }
        if depot >= num_nodes {
            return Err(RoutingModelError::DepotOutOfRange { depot, num_nodes });
        }
        let visits: Vec<usize> = (0..num_nodes).filter(|node| *node != depot).collect();
        let mut node_to_index = vec![None; num_nodes];
        for (index, node) in visits.iter().enumerate() {
            if let Some(slot) = node_to_index.get_mut(*node) {
                *slot = Some(index);
            }
        }
        let depot_slots = num_vehicles.saturating_mul(2);
        let index_to_node = visits
            .into_iter()
            .chain(std::iter::repeat_n(depot, depot_slots))
            .collect();
        Ok(Self {
            num_nodes,
            num_vehicles,
            depot,
            index_to_node,
            node_to_index,
        })
    }

    /// Number of problem nodes, depot included.
    #[must_use]
    pub const fn num_nodes(&self) -> usize {
        self.num_nodes
    }

    /// Number of vehicles.
    #[must_use]
    pub const fn num_vehicles(&self) -> usize {
        self.num_vehicles
    }

    /// Depot node.
    #[must_use]
    pub const fn depot(&self) -> usize {
        self.depot
    }

    /// Number of routing indices, vehicle ends included.
    #[must_use]
    pub fn num_indices(&self) -> usize {
        self.index_to_node.len()
    }

    /// Number of indices that stand for non-depot visits.
    #[must_use]
    pub const fn num_visits(&self) -> usize {
        self.num_nodes.saturating_sub(1)
    }

    /// Start index of `vehicle`.
    #[must_use]
    pub const fn start(&self, vehicle: usize) -> usize {
        self.num_visits() + vehicle
    }

    /// End index of `vehicle`.
    #[must_use]
    pub const fn end(&self, vehicle: usize) -> usize {
        self.num_visits() + self.num_vehicles + vehicle
    }

    /// Whether `index` is a vehicle start.
    #[must_use]
    pub const fn is_start(&self, index: usize) -> bool {
        index >= self.num_visits() && index < self.num_visits() + self.num_vehicles
    }

    /// Whether `index` is a vehicle end.
    #[must_use]
    pub fn is_end(&self, index: usize) -> bool {
        index >= self.num_visits() + self.num_vehicles && index < self.num_indices()
    }

    /// Vehicle owning the start or end `index`.
    #[must_use]
    pub fn vehicle_of(&self, index: usize) -> Option<usize> {
        if self.is_start(index) {
            Some(index - self.num_visits())
        } else if self.is_end(index) {
            Some(index - self.num_visits() - self.num_vehicles)
        } else {
            None
        }
    }

    /// Node behind `index`.
    #[must_use]
    pub fn index_to_node(&self, index: usize) -> Option<usize> {
        self.index_to_node.get(index).copied()
    }

    /// Visit index of a non-depot `node`. The depot has one index per
    /// vehicle start and end; use [`RoutingIndexManager::start`] and
    /// [`RoutingIndexManager::end`] instead.
    #[must_use]
    pub fn node_to_index(&self, node: usize) -> Option<usize> {
        self.node_to_index.get(node).copied().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn rejects_empty_fleet() {
        assert_eq!(
            RoutingIndexManager::new(3, 0, 0),
            Err(RoutingModelError::NoVehicles)
        );
    }

    #[rstest]
    fn rejects_missing_depot() {
        assert_eq!(
            RoutingIndexManager::new(3, 1, 3),
            Err(RoutingModelError::DepotOutOfRange {
                depot: 3,
                num_nodes: 3
            })
        );
    }

    #[rstest]
    fn depot_in_the_middle_is_skipped() {
        let manager = RoutingIndexManager::new(4, 1, 2).expect("valid manager");
        assert_eq!(manager.node_to_index(0), Some(0));
        assert_eq!(manager.node_to_index(1), Some(1));
        assert_eq!(manager.node_to_index(2), None);
        assert_eq!(manager.node_to_index(3), Some(2));
        assert_eq!(manager.index_to_node(manager.end(0)), Some(2));
    }

    #[rstest]
    fn vehicle_lookup_covers_starts_and_ends() {
        let manager = RoutingIndexManager::new(3, 3, 0).expect("valid manager");
        for vehicle in 0..3 {
            assert_eq!(manager.vehicle_of(manager.start(vehicle)), Some(vehicle));
            assert_eq!(manager.vehicle_of(manager.end(vehicle)), Some(vehicle));
        }
        assert_eq!(manager.vehicle_of(0), None);
        assert!(!manager.is_end(manager.num_indices()));
    }
}
