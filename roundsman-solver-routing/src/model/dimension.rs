//! Cumulative quantities tracked along routes.

use super::{RoutingModelError, TransitCallbackId};

/// A named quantity accumulated along every route.
///
/// Along an arc `i -> j` the cumul grows by the transit value plus a slack in
/// `[0, slack_max]`. Every cumul lies within `[0, capacity]` of the serving
/// vehicle and within its own range set by
/// [`Dimension::set_cumul_range`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dimension {
    name: String,
    transit: TransitCallbackId,
    slack_max: i64,
    capacities: Vec<i64>,
    fix_start_cumul_to_zero: bool,
    cumul_min: Vec<i64>,
    cumul_max: Vec<i64>,
}

impl Dimension {
    pub(crate) fn new(
        name: String,
        transit: TransitCallbackId,
        slack_max: i64,
        capacities: Vec<i64>,
        fix_start_cumul_to_zero: bool,
        num_indices: usize,
    ) -> Self {
        Self {
            name,
            transit,
            slack_max: slack_max.max(0),
            capacities,
            fix_start_cumul_to_zero,
            cumul_min: vec![0; num_indices],
            cumul_max: vec![i64::MAX; num_indices],
        }
    }

    /// Dimension name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Callback evaluated along arcs.
    #[must_use]
    pub const fn transit(&self) -> TransitCallbackId {
        self.transit
    }

    /// Largest slack permitted on one arc.
    #[must_use]
    pub const fn slack_max(&self) -> i64 {
        self.slack_max
    }

    /// Cumul bound of `vehicle`.
    #[must_use]
    pub fn capacity(&self, vehicle: usize) -> Option<i64> {
        self.capacities.get(vehicle).copied()
    }

    /// Whether every vehicle starts with a cumul of zero.
    #[must_use]
    pub const fn fixes_start_cumul_to_zero(&self) -> bool {
        self.fix_start_cumul_to_zero
    }

    /// Restrict the cumul at `index` to `[min, max]`, intersected with any
    /// earlier restriction.
    ///
    /// # Errors
    ///
    /// Returns [`RoutingModelError::IndexOutOfRange`] for unknown indices.
    pub fn set_cumul_range(
        &mut self,
        index: usize,
        min: i64,
        max: i64,
    ) -> Result<(), RoutingModelError> {
        let size = self.cumul_min.len();
        let (Some(lower), Some(upper)) = (self.cumul_min.get_mut(index), self.cumul_max.get_mut(index))
        else {
            return Err(RoutingModelError::IndexOutOfRange { index, size });
        };
        *lower = (*lower).max(min);
        *upper = (*upper).min(max);
        Ok(())
    }

    /// Current cumul range at `index`.
    #[must_use]
    pub fn cumul_range(&self, index: usize) -> Option<(i64, i64)> {
        Some((*self.cumul_min.get(index)?, *self.cumul_max.get(index)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn dimension() -> Dimension {
        Dimension::new("Time".to_owned(), TransitCallbackId(0), 30, vec![100, 200], false, 4)
    }

    #[rstest]
    fn ranges_intersect() {
        let mut time = dimension();
        time.set_cumul_range(1, 10, 50).expect("index in range");
        time.set_cumul_range(1, 20, 80).expect("index in range");
        assert_eq!(time.cumul_range(1), Some((20, 50)));
        assert_eq!(time.cumul_range(0), Some((0, i64::MAX)));
    }

    #[rstest]
    fn rejects_unknown_index() {
        let mut time = dimension();
        assert_eq!(
            time.set_cumul_range(4, 0, 1),
            Err(RoutingModelError::IndexOutOfRange { index: 4, size: 4 })
        );
    }

    #[rstest]
    fn negative_slack_is_clamped() {
        let time = Dimension::new("Time".to_owned(), TransitCallbackId(0), -5, vec![1], true, 1);
        assert_eq!(time.slack_max(), 0);
        assert_eq!(time.capacity(0), Some(1));
        assert_eq!(time.capacity(1), None);
        assert!(time.fixes_start_cumul_to_zero());
    }
}
