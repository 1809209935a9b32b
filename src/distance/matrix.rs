//! Dense integer cost matrix.

use crate::error::{FleetError, Result};

/// Anything that prices a directed arc between two locations.
///
/// Implemented by [`CostMatrix`] for raw costs and by the guided local search
/// for penalty-augmented costs, so neighborhood operators stay agnostic of
/// which objective they are ranking moves by.
pub trait ArcCost {
    /// Cost of travelling from `from` to `to`.
    fn arc(&self, from: usize, to: usize) -> i64;
}

/// A dense n×n matrix of non-negative integer costs stored in row-major order.
///
/// The diagonal is always zero. Symmetry is not required.
///
/// # Examples
///
/// ```
/// use u_fleet::distance::CostMatrix;
///
/// let cm = CostMatrix::from_rows(vec![
///     vec![0, 5, 8],
///     vec![5, 0, 3],
///     vec![8, 3, 0],
/// ]).unwrap();
/// assert_eq!(cm.get(0, 1), 5);
/// assert_eq!(cm.size(), 3);
/// assert!(cm.is_symmetric());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CostMatrix {
    data: Vec<i64>,
    size: usize,
}

impl CostMatrix {
    /// Creates a cost matrix of the given size, initialized to zero.
    pub fn new(size: usize) -> Self {
        Self {
            data: vec![0; size * size],
            size,
        }
    }

    /// Creates a cost matrix from an explicit row-major n×n grid.
    ///
    /// Fails if the length is not `size * size`, if any cost is negative,
    /// or if a diagonal entry is non-zero.
    pub fn from_data(size: usize, data: Vec<i64>) -> Result<Self> {
        if data.len() != size * size {
            return Err(FleetError::InvalidCostMatrix(format!(
                "expected {} entries for a {size}x{size} matrix, got {}",
                size * size,
                data.len()
            )));
        }
        let matrix = Self { data, size };
        matrix.validate()?;
        Ok(matrix)
    }

    /// Creates a cost matrix from nested rows.
    pub fn from_rows(rows: Vec<Vec<i64>>) -> Result<Self> {
        let size = rows.len();
        if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != size) {
            return Err(FleetError::InvalidCostMatrix(format!(
                "row {i} has {} entries, expected {size}",
                row.len()
            )));
        }
        Self::from_data(size, rows.into_iter().flatten().collect())
    }

    fn validate(&self) -> Result<()> {
        for i in 0..self.size {
            if self.get(i, i) != 0 {
                return Err(FleetError::InvalidCostMatrix(format!(
                    "diagonal entry ({i}, {i}) is {}",
                    self.get(i, i)
                )));
            }
            for j in 0..self.size {
                if self.get(i, j) < 0 {
                    return Err(FleetError::InvalidCostMatrix(format!(
                        "negative cost {} at ({i}, {j})",
                        self.get(i, j)
                    )));
                }
            }
        }
        Ok(())
    }

    /// Returns the cost from location `from` to location `to`.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of bounds.
    #[inline]
    pub fn get(&self, from: usize, to: usize) -> i64 {
        self.data[from * self.size + to]
    }

    /// Sets the cost from `from` to `to`. Used by providers while filling the matrix.
    pub(crate) fn set(&mut self, from: usize, to: usize, cost: i64) {
        debug_assert!(cost >= 0, "arc costs must be non-negative");
        self.data[from * self.size + to] = cost;
    }

    /// Number of locations in this matrix (depot included).
    pub fn size(&self) -> usize {
        self.size
    }

    /// Returns `true` if the matrix holds no locations at all.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Returns `true` if `cost[i][j] == cost[j][i]` for every pair.
    pub fn is_symmetric(&self) -> bool {
        (0..self.size).all(|i| ((i + 1)..self.size).all(|j| self.get(i, j) == self.get(j, i)))
    }

    /// Mean cost over all off-diagonal arcs, or 0 for fewer than two locations.
    pub fn average_arc_cost(&self) -> f64 {
        if self.size < 2 {
            return 0.0;
        }
        let total: i64 = self.data.iter().sum();
        total as f64 / (self.size * (self.size - 1)) as f64
    }
}

impl ArcCost for CostMatrix {
    #[inline]
    fn arc(&self, from: usize, to: usize) -> i64 {
        self.get(from, to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CostMatrix {
        CostMatrix::from_rows(vec![vec![0, 5, 8], vec![5, 0, 3], vec![8, 3, 0]]).expect("valid")
    }

    #[test]
    fn test_from_rows() {
        let cm = sample();
        assert_eq!(cm.size(), 3);
        assert_eq!(cm.get(0, 2), 8);
        assert_eq!(cm.get(2, 1), 3);
        assert_eq!(cm.arc(1, 0), 5);
    }

    #[test]
    fn test_symmetric() {
        assert!(sample().is_symmetric());
    }

    #[test]
    fn test_asymmetric_matrix() {
        let cm = CostMatrix::from_rows(vec![vec![0, 10], vec![15, 0]]).expect("valid");
        assert!(!cm.is_symmetric());
        assert_eq!(cm.get(0, 1), 10);
        assert_eq!(cm.get(1, 0), 15);
    }

    #[test]
    fn test_from_data_invalid_size() {
        assert!(matches!(
            CostMatrix::from_data(2, vec![0, 1, 2]),
            Err(FleetError::InvalidCostMatrix(_))
        ));
    }

    #[test]
    fn test_ragged_rows_rejected() {
        assert!(CostMatrix::from_rows(vec![vec![0, 1], vec![1]]).is_err());
    }

    #[test]
    fn test_nonzero_diagonal_rejected() {
        assert!(CostMatrix::from_rows(vec![vec![1, 1], vec![1, 0]]).is_err());
    }

    #[test]
    fn test_negative_cost_rejected() {
        assert!(CostMatrix::from_rows(vec![vec![0, -1], vec![1, 0]]).is_err());
    }

    #[test]
    fn test_empty_matrix() {
        let cm = CostMatrix::from_rows(vec![]).expect("valid");
        assert!(cm.is_empty());
        assert_eq!(cm.average_arc_cost(), 0.0);
    }

    #[test]
    fn test_average_arc_cost() {
        // (5 + 8 + 5 + 3 + 8 + 3) / 6 = 32 / 6
        let avg = sample().average_arc_cost();
        assert!((avg - 32.0 / 6.0).abs() < 1e-10);
    }

    #[test]
    fn test_set_get() {
        let mut cm = CostMatrix::new(3);
        cm.set(0, 1, 42);
        assert_eq!(cm.get(0, 1), 42);
        assert_eq!(cm.get(1, 0), 0);
    }
}
