//! Solutions of a [`crate::RoutingModel`].

/// Successor links and dimension cumuls of one solution.
///
/// `next(i)` is the index visited after `i`; vehicle ends are their own
/// successors. Cumuls are stored per dimension for every index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    next: Vec<usize>,
    cumuls: Vec<(String, Vec<i64>)>,
    objective: i64,
}

impl Assignment {
    pub(crate) const fn new(next: Vec<usize>, cumuls: Vec<(String, Vec<i64>)>, objective: i64) -> Self {
        Self {
            next,
            cumuls,
            objective,
        }
    }

    /// Successor of `index`.
    #[must_use]
    pub fn next(&self, index: usize) -> Option<usize> {
        self.next.get(index).copied()
    }

    /// Cumul of `dimension` at `index`.
    #[must_use]
    pub fn cumul(&self, dimension: &str, index: usize) -> Option<i64> {
        self.cumuls
            .iter()
            .find(|(name, _)| name == dimension)
            .and_then(|(_, values)| values.get(index).copied())
    }

    /// Objective value: arc costs plus fixed costs of used vehicles.
    #[must_use]
    pub const fn objective_value(&self) -> i64 {
        self.objective
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn looks_up_cumuls_by_name() {
        let assignment = Assignment::new(
            vec![2, 1, 2],
            vec![("Time".to_owned(), vec![5, 0, 9])],
            42,
        );
        assert_eq!(assignment.next(0), Some(2));
        assert_eq!(assignment.next(3), None);
        assert_eq!(assignment.cumul("Time", 2), Some(9));
        assert_eq!(assignment.cumul("Capacity", 2), None);
        assert_eq!(assignment.objective_value(), 42);
    }
}
