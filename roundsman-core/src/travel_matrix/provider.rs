//! Travel-matrix provider trait.

use geo::Coord;

use super::{TravelMatrix, TravelMatrixError};

/// Fetch pairwise travel data for a set of locations.
///
/// Implementers must return a [`TravelMatrix`] covering exactly
/// `locations.len()` entries in input order. Coordinates use `x` for
/// longitude and `y` for latitude.
///
/// # Examples
///
/// ```rust
/// use geo::Coord;
/// use roundsman_core::{TravelMatrix, TravelMatrixError, TravelMatrixProvider};
///
/// struct UnitProvider;
///
/// impl TravelMatrixProvider for UnitProvider {
///     fn get_travel_matrix(
///         &self,
///         locations: &[Coord<f64>],
///     ) -> Result<TravelMatrix, TravelMatrixError> {
///         if locations.is_empty() {
///             return Err(TravelMatrixError::EmptyInput);
///         }
///         let n = locations.len();
///         let durations = (0..n)
///             .map(|i| (0..n).map(|j| if i == j { 0.0 } else { 1.0 }).collect())
///             .collect();
///         TravelMatrix::from_durations(durations, 0.01)
///     }
/// }
///
/// let matrix = UnitProvider.get_travel_matrix(&[Coord { x: 0.0, y: 0.0 }])?;
/// assert_eq!(matrix.len(), 1);
/// # Ok::<(), TravelMatrixError>(())
/// ```
pub trait TravelMatrixProvider {
    /// Return travel durations and distances between `locations`.
    ///
    /// Implementations must return `Err(TravelMatrixError::EmptyInput)` when
    /// `locations` is empty.
    fn get_travel_matrix(&self, locations: &[Coord<f64>])
    -> Result<TravelMatrix, TravelMatrixError>;
}

impl<T: TravelMatrixProvider + ?Sized> TravelMatrixProvider for &T {
    fn get_travel_matrix(
        &self,
        locations: &[Coord<f64>],
    ) -> Result<TravelMatrix, TravelMatrixError> {
        (**self).get_travel_matrix(locations)
    }
}

impl<T: TravelMatrixProvider + ?Sized> TravelMatrixProvider for Box<T> {
    fn get_travel_matrix(
        &self,
        locations: &[Coord<f64>],
    ) -> Result<TravelMatrix, TravelMatrixError> {
        (**self).get_travel_matrix(locations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    use crate::test_support::FixedMatrixProvider;

    fn sample_locations() -> Vec<Coord<f64>> {
        vec![Coord { x: 0.0, y: 0.0 }, Coord { x: 1.0, y: 1.0 }]
    }

    #[rstest]
    fn returns_square_matrix() {
        let provider = FixedMatrixProvider::from_durations(vec![vec![0.0, 5.0], vec![5.0, 0.0]]);
        let matrix = provider
            .get_travel_matrix(&sample_locations())
            .expect("expected square matrix from FixedMatrixProvider");
        assert_eq!(matrix.len(), 2);
        assert_eq!(matrix.duration_secs(0, 1), Some(5.0));
    }

    #[rstest]
    fn errors_on_empty_input() {
        let provider = FixedMatrixProvider::from_durations(vec![vec![0.0]]);
        let err = provider
            .get_travel_matrix(&[])
            .expect_err("expected EmptyInput for empty slice");
        assert_eq!(err, TravelMatrixError::EmptyInput);
    }

    #[rstest]
    fn boxed_provider_delegates() {
        let provider: Box<dyn TravelMatrixProvider> =
            Box::new(FixedMatrixProvider::from_durations(vec![vec![0.0, 5.0], vec![5.0, 0.0]]));
        let matrix = provider
            .get_travel_matrix(&sample_locations())
            .expect("boxed provider returns matrix");
        assert_eq!(matrix.len(), 2);
    }
}
