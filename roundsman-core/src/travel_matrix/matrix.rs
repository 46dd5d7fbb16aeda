//! Square duration and distance matrices.

use serde::{Deserialize, Serialize};

use super::TravelMatrixError;

/// Pairwise travel durations (seconds) and distances (kilometres).
///
/// Both matrices are square and share one ordering: index 0 is the depot and
/// the remaining rows follow the customer order. Entries may be asymmetric.
/// Unreachable pairs carry a non-finite duration.
///
/// # Examples
///
/// ```
/// use roundsman_core::TravelMatrix;
///
/// # fn main() -> Result<(), roundsman_core::TravelMatrixError> {
/// let matrix = TravelMatrix::new(
///     vec![vec![0.0, 90.0], vec![95.0, 0.0]],
///     vec![vec![0.0, 1.2], vec![1.3, 0.0]],
/// )?;
/// assert_eq!(matrix.len(), 2);
/// assert_eq!(matrix.duration_secs(1, 0), Some(95.0));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TravelMatrix {
    durations_secs: Vec<Vec<f64>>,
    distances_km: Vec<Vec<f64>>,
}

impl TravelMatrix {
    /// Validate and construct a matrix pair.
    ///
    /// # Errors
    ///
    /// Returns [`TravelMatrixError::EmptyInput`] for empty matrices and
    /// [`TravelMatrixError::DimensionMismatch`] when either matrix is not
    /// square or the two disagree in size.
    pub fn new(
        durations_secs: Vec<Vec<f64>>,
        distances_km: Vec<Vec<f64>>,
    ) -> Result<Self, TravelMatrixError> {
        let size = durations_secs.len();
        if size == 0 {
            return Err(TravelMatrixError::EmptyInput);
        }
        check_square("duration", &durations_secs, size)?;
        check_square("distance", &distances_km, size)?;
        Ok(Self {
            durations_secs,
            distances_km,
        })
    }

    /// Build a matrix whose distances equal durations scaled by `km_per_sec`.
    ///
    /// Useful when only travel times are known.
    ///
    /// # Errors
    ///
    /// Same as [`TravelMatrix::new`].
    pub fn from_durations(
        durations_secs: Vec<Vec<f64>>,
        km_per_sec: f64,
    ) -> Result<Self, TravelMatrixError> {
        let distances_km = durations_secs
            .iter()
            .map(|row| row.iter().map(|secs| secs * km_per_sec).collect())
            .collect();
        Self::new(durations_secs, distances_km)
    }

    /// Build a square matrix of `size` locations from a cell function
    /// returning `(duration_secs, distance_km)`.
    ///
    /// # Examples
    ///
    /// ```
    /// use roundsman_core::TravelMatrix;
    ///
    /// let matrix = TravelMatrix::from_fn(3, |from, to| {
    ///     let hops = from.abs_diff(to) as f64;
    ///     (hops * 60.0, hops)
    /// });
    /// assert_eq!(matrix.duration_secs(0, 2), Some(120.0));
    /// ```
    pub fn from_fn(size: usize, cell: impl Fn(usize, usize) -> (f64, f64)) -> Self {
        let (durations_secs, distances_km): (Vec<Vec<f64>>, Vec<Vec<f64>>) = (0..size)
            .map(|from| -> (Vec<f64>, Vec<f64>) { (0..size).map(|to| cell(from, to)).unzip() })
            .unzip();
        Self {
            durations_secs,
            distances_km,
        }
    }

    /// Number of locations covered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.durations_secs.len()
    }

    /// Whether the matrix covers no locations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.durations_secs.is_empty()
    }

    /// Duration rows in seconds.
    #[must_use]
    pub fn durations_secs(&self) -> &[Vec<f64>] {
        &self.durations_secs
    }

    /// Distance rows in kilometres.
    #[must_use]
    pub fn distances_km(&self) -> &[Vec<f64>] {
        &self.distances_km
    }

    /// Travel duration from `from` to `to`, if both indices exist.
    #[must_use]
    pub fn duration_secs(&self, from: usize, to: usize) -> Option<f64> {
        self.durations_secs.get(from)?.get(to).copied()
    }

    /// Travel distance from `from` to `to`, if both indices exist.
    #[must_use]
    pub fn distance_km(&self, from: usize, to: usize) -> Option<f64> {
        self.distances_km.get(from)?.get(to).copied()
    }

    /// Ensure the matrix covers exactly `expected` locations.
    ///
    /// # Errors
    ///
    /// Returns [`TravelMatrixError::DimensionMismatch`] on disagreement.
    pub fn ensure_len(&self, expected: usize) -> Result<(), TravelMatrixError> {
        if self.len() == expected {
            Ok(())
        } else {
            Err(TravelMatrixError::DimensionMismatch {
                message: format!(
                    "matrix covers {} locations but {expected} were requested",
                    self.len()
                ),
            })
        }
    }
}

fn check_square(kind: &str, rows: &[Vec<f64>], size: usize) -> Result<(), TravelMatrixError> {
    if rows.len() != size {
        return Err(TravelMatrixError::DimensionMismatch {
            message: format!("{kind} matrix has {} rows, expected {size}", rows.len()),
        });
    }
    if let Some((index, row)) = rows.iter().enumerate().find(|(_, row)| row.len() != size) {
        return Err(TravelMatrixError::DimensionMismatch {
            message: format!(
                "{kind} matrix row {index} has {} columns, expected {size}",
                row.len()
            ),
        });
    }
    Ok(())
}
