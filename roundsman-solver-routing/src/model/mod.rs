//! A small routing model in the style of constraint-programming routing
//! libraries.
//!
//! A [`RoutingModel`] owns a [`RoutingIndexManager`], a set of registered
//! transit callbacks, an arc-cost evaluator, an optional fixed cost per used
//! vehicle and any number of named [`Dimension`]s. Solving it yields an
//! [`Assignment`] of successor links and cumul values, or `None` when no
//! feasible assignment was found.

mod assignment;
mod dimension;
mod index;

use thiserror::Error;

pub use assignment::Assignment;
pub use dimension::Dimension;
pub use index::RoutingIndexManager;

use crate::search::{self, CompiledModel, SearchParameters};

/// Errors raised while building or solving a [`RoutingModel`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoutingModelError {
    /// The model has no vehicles.
    #[error("routing model needs at least one vehicle")]
    NoVehicles,
    /// The depot is not one of the nodes.
    #[error("depot {depot} is outside the {num_nodes} model nodes")]
    DepotOutOfRange {
        /// Requested depot node.
        depot: usize,
        /// Number of nodes in the model.
        num_nodes: usize,
    },
    /// A callback identifier was not issued by this model.
    #[error("unknown transit callback {id}")]
    UnknownCallback {
        /// Offending identifier.
        id: usize,
    },
    /// No dimension carries the requested name.
    #[error("unknown dimension `{name}`")]
    UnknownDimension {
        /// Requested name.
        name: String,
    },
    /// A dimension with the same name already exists.
    #[error("dimension `{name}` is already defined")]
    DuplicateDimension {
        /// Duplicated name.
        name: String,
    },
    /// Per-vehicle capacities do not match the fleet size.
    #[error("expected {expected} vehicle capacities, got {actual}")]
    CapacityCountMismatch {
        /// Fleet size.
        expected: usize,
        /// Number of capacities supplied.
        actual: usize,
    },
    /// A routing index lies outside the model.
    #[error("routing index {index} is outside the model of size {size}")]
    IndexOutOfRange {
        /// Offending index.
        index: usize,
        /// Number of routing indices.
        size: usize,
    },
    /// The model was solved without an arc-cost evaluator.
    #[error("no arc cost evaluator was set")]
    MissingArcCost,
    /// An assignment did not describe a simple path for a vehicle.
    #[error("assignment for vehicle {vehicle} does not form a route")]
    MalformedAssignment {
        /// Vehicle whose path is broken.
        vehicle: usize,
    },
}

/// Handle to a transit callback registered with a [`RoutingModel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransitCallbackId(pub(crate) usize);

impl TransitCallbackId {
    /// Position of the callback in registration order.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

enum TransitCallback<'a> {
    Binary(Box<dyn Fn(usize, usize) -> i64 + 'a>),
    Unary(Box<dyn Fn(usize) -> i64 + 'a>),
}

impl TransitCallback<'_> {
    fn evaluate(&self, from: usize, to: usize) -> i64 {
        match self {
            Self::Binary(callback) => callback(from, to),
            Self::Unary(callback) => callback(from),
        }
    }
}

/// Vehicle routing model over routing indices.
///
/// Callbacks receive routing indices, not node numbers; use the
/// [`RoutingIndexManager`] to translate.
///
/// # Examples
///
/// ```
/// use roundsman_solver_routing::{RoutingIndexManager, RoutingModel, SearchParameters};
///
/// # fn main() -> Result<(), roundsman_solver_routing::RoutingModelError> {
/// let manager = RoutingIndexManager::new(3, 1, 0)?;
/// let mut model = RoutingModel::new(manager);
/// let distance = model.register_transit_callback(|_, _| 1);
/// model.set_arc_cost_evaluator_of_all_vehicles(distance)?;
/// let assignment = model
///     .solve_with_parameters(&SearchParameters::default().with_max_iterations(Some(10)))?
///     .expect("unconstrained model is feasible");
/// assert_eq!(assignment.objective_value(), 3);
/// # Ok(())
/// # }
/// ```
pub struct RoutingModel<'a> {
    manager: RoutingIndexManager,
    callbacks: Vec<TransitCallback<'a>>,
    arc_cost: Option<TransitCallbackId>,
    fixed_cost: i64,
    dimensions: Vec<Dimension>,
}

impl std::fmt::Debug for RoutingModel<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoutingModel")
            .field("manager", &self.manager)
            .field("callbacks", &self.callbacks.len())
            .field("arc_cost", &self.arc_cost)
            .field("fixed_cost", &self.fixed_cost)
            .field("dimensions", &self.dimensions)
            .finish()
    }
}

impl<'a> RoutingModel<'a> {
    /// Create an empty model over `manager`'s indices.
    #[must_use]
    pub const fn new(manager: RoutingIndexManager) -> Self {
        Self {
            manager,
            callbacks: Vec::new(),
            arc_cost: None,
            fixed_cost: 0,
            dimensions: Vec::new(),
        }
    }

    /// Index manager the model was built over.
    #[must_use]
    pub const fn index_manager(&self) -> &RoutingIndexManager {
        &self.manager
    }

    /// Number of vehicles.
    #[must_use]
    pub const fn vehicles(&self) -> usize {
        self.manager.num_vehicles()
    }

    /// Number of routing indices.
    #[must_use]
    pub fn size(&self) -> usize {
        self.manager.num_indices()
    }

    /// Start index of `vehicle`.
    #[must_use]
    pub const fn start(&self, vehicle: usize) -> usize {
        self.manager.start(vehicle)
    }

    /// End index of `vehicle`.
    #[must_use]
    pub const fn end(&self, vehicle: usize) -> usize {
        self.manager.end(vehicle)
    }

    /// Whether `index` is a vehicle end.
    #[must_use]
    pub fn is_end(&self, index: usize) -> bool {
        self.manager.is_end(index)
    }

    /// Register a callback evaluated on arcs `(from, to)`.
    pub fn register_transit_callback<F>(&mut self, callback: F) -> TransitCallbackId
    where
        F: Fn(usize, usize) -> i64 + 'a,
    {
        self.callbacks
            .push(TransitCallback::Binary(Box::new(callback)));
        TransitCallbackId(self.callbacks.len() - 1)
    }

    /// Register a callback that only depends on the arc origin.
    pub fn register_unary_transit_callback<F>(&mut self, callback: F) -> TransitCallbackId
    where
        F: Fn(usize) -> i64 + 'a,
    {
        self.callbacks
            .push(TransitCallback::Unary(Box::new(callback)));
        TransitCallbackId(self.callbacks.len() - 1)
    }

    /// Use `callback` as the arc cost of every vehicle.
    ///
    /// # Errors
    ///
    /// Returns [`RoutingModelError::UnknownCallback`] for foreign identifiers.
    pub fn set_arc_cost_evaluator_of_all_vehicles(
        &mut self,
        callback: TransitCallbackId,
    ) -> Result<(), RoutingModelError> {
        self.check_callback(callback)?;
        self.arc_cost = Some(callback);
        Ok(())
    }

    /// Charge `cost` once for every vehicle that serves at least one visit.
    pub const fn set_fixed_cost_of_all_vehicles(&mut self, cost: i64) {
        self.fixed_cost = cost;
    }

    /// Add a dimension whose cumuls are bounded by `capacity` for every
    /// vehicle.
    ///
    /// # Errors
    ///
    /// Returns [`RoutingModelError::UnknownCallback`] for foreign identifiers
    /// and [`RoutingModelError::DuplicateDimension`] for reused names.
    pub fn add_dimension(
        &mut self,
        transit: TransitCallbackId,
        slack_max: i64,
        capacity: i64,
        fix_start_cumul_to_zero: bool,
        name: &str,
    ) -> Result<(), RoutingModelError> {
        let capacities = vec![capacity; self.vehicles()];
        self.add_dimension_with_vehicle_capacity(
            transit,
            slack_max,
            capacities,
            fix_start_cumul_to_zero,
            name,
        )
    }

    /// Add a dimension with one cumul bound per vehicle.
    ///
    /// # Errors
    ///
    /// Returns [`RoutingModelError::UnknownCallback`],
    /// [`RoutingModelError::DuplicateDimension`] or
    /// [`RoutingModelError::CapacityCountMismatch`].
    pub fn add_dimension_with_vehicle_capacity(
        &mut self,
        transit: TransitCallbackId,
        slack_max: i64,
        capacities: Vec<i64>,
        fix_start_cumul_to_zero: bool,
        name: &str,
    ) -> Result<(), RoutingModelError> {
        self.check_callback(transit)?;
        if self.dimension(name).is_some() {
            return Err(RoutingModelError::DuplicateDimension {
                name: name.to_owned(),
            });
        }
        if capacities.len() != self.vehicles() {
            return Err(RoutingModelError::CapacityCountMismatch {
                expected: self.vehicles(),
                actual: capacities.len(),
            });
        }
        let size = self.size();
        self.dimensions.push(Dimension::new(
            name.to_owned(),
            transit,
            slack_max,
            capacities,
            fix_start_cumul_to_zero,
            size,
        ));
        Ok(())
    }

    /// Dimension called `name`.
    #[must_use]
    pub fn dimension(&self, name: &str) -> Option<&Dimension> {
        self.dimensions.iter().find(|dimension| dimension.name() == name)
    }

    /// Mutable dimension called `name`.
    ///
    /// # Errors
    ///
    /// Returns [`RoutingModelError::UnknownDimension`] when absent.
    pub fn dimension_mut(&mut self, name: &str) -> Result<&mut Dimension, RoutingModelError> {
        self.dimensions
            .iter_mut()
            .find(|dimension| dimension.name() == name)
            .ok_or_else(|| RoutingModelError::UnknownDimension {
                name: name.to_owned(),
            })
    }

    /// Search for an assignment.
    ///
    /// Returns `Ok(None)` when neither first-solution strategy produced a
    /// feasible assignment.
    ///
    /// # Errors
    ///
    /// Returns [`RoutingModelError::MissingArcCost`] when no arc-cost
    /// evaluator was set.
    pub fn solve_with_parameters(
        &self,
        parameters: &SearchParameters,
    ) -> Result<Option<Assignment>, RoutingModelError> {
        let compiled = CompiledModel::compile(self)?;
        Ok(search::run(&compiled, parameters).map(|plan| plan.into_assignment(&compiled)))
    }

    pub(crate) const fn arc_cost_callback(&self) -> Option<TransitCallbackId> {
        self.arc_cost
    }

    pub(crate) const fn fixed_cost(&self) -> i64 {
        self.fixed_cost
    }

    pub(crate) fn dimensions(&self) -> &[Dimension] {
        &self.dimensions
    }

    pub(crate) fn transit_value(&self, callback: TransitCallbackId, from: usize, to: usize) -> Option<i64> {
        self.callbacks
            .get(callback.0)
            .map(|transit| transit.evaluate(from, to))
    }

    fn check_callback(&self, callback: TransitCallbackId) -> Result<(), RoutingModelError> {
        if callback.0 < self.callbacks.len() {
            Ok(())
        } else {
            Err(RoutingModelError::UnknownCallback { id: callback.0 })
        }
    }
}
