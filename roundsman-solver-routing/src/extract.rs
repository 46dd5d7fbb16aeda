//! Successor walk from an [`Assignment`] to per-vehicle route plans.

use roundsman_core::{RoutePlan, Visit};

use crate::encode::TIME_DIMENSION;
use crate::model::{Assignment, RoutingModel, RoutingModelError};

/// Walk every vehicle's successor chain from its start to its end.
///
/// Vehicles whose start is followed directly by their end are skipped. Each
/// visit carries the time cumul of its index, so the final depot visit holds
/// the return time.
///
/// # Errors
///
/// Returns [`RoutingModelError::MalformedAssignment`] when a chain is broken,
/// loops or ends at another vehicle's end.
pub fn extract_plans(
    model: &RoutingModel<'_>,
    assignment: &Assignment,
) -> Result<Vec<RoutePlan>, RoutingModelError> {
    let manager = model.index_manager();
    let mut plans = Vec::new();
    for vehicle in 0..manager.num_vehicles() {
        let malformed = || RoutingModelError::MalformedAssignment { vehicle };
        let start = manager.start(vehicle);
        let first = assignment.next(start).ok_or_else(malformed)?;
        if manager.is_end(first) {
            continue;
        }
        let mut visits = Vec::new();
        let mut index = start;
        loop {
            let node = manager.index_to_node(index).ok_or_else(malformed)?;
            let arrival_secs = assignment
                .cumul(TIME_DIMENSION, index)
                .ok_or_else(malformed)?;
            visits.push(Visit { node, arrival_secs });
            if manager.is_end(index) {
                break;
            }
            if visits.len() > manager.num_indices() {
                return Err(malformed());
            }
            index = assignment.next(index).ok_or_else(malformed)?;
        }
        if index != manager.end(vehicle) {
            return Err(malformed());
        }
        plans.push(RoutePlan { vehicle, visits });
    }
    Ok(plans)
}
