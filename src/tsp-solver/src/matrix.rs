//! Square cost and desirability matrices.
//!
//! Both are stored row-major in a single flat buffer.

use crate::error::{AcoError, AcoResult};

/// Immutable travel costs between cities. `get(i, j)` is the cost of going from `i` to `j`.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMatrix {
    data: Box<[f64]>,
    n: usize,
}

impl DistanceMatrix {
    /// Validates and flattens a row-major matrix.
    ///
    /// Rejects non-square input, fewer than two cities, non-finite values, a non-zero
    /// diagonal and any off-diagonal cost that is not strictly positive.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> AcoResult<Self> {
        let n = rows.len();
        if n < 2 {
            return Err(AcoError::invalid_input(format!(
                "need at least 2 cities, got {n}"
            )));
        }

        let mut data = Vec::with_capacity(n * n);
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != n {
                return Err(AcoError::invalid_input(format!(
                    "row {i} has {} entries, expected {n}",
                    row.len()
                )));
            }
            for (j, &cost) in row.iter().enumerate() {
                if !cost.is_finite() {
                    return Err(AcoError::invalid_input(format!(
                        "cost [{i}][{j}] is not finite"
                    )));
                }
                if i == j && cost != 0.0 {
                    return Err(AcoError::invalid_input(format!(
                        "diagonal [{i}][{i}] must be 0, got {cost}"
                    )));
                }
                if i != j && cost <= 0.0 {
                    return Err(AcoError::invalid_input(format!(
                        "cost [{i}][{j}] must be positive, got {cost}"
                    )));
                }
            }
            data.extend(row);
        }

        Ok(Self {
            data: data.into_boxed_slice(),
            n,
        })
    }

    /// Number of cities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.n
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    #[must_use]
    pub fn get(&self, from: usize, to: usize) -> f64 {
        self.data[from * self.n + to]
    }

    #[must_use]
    pub fn row(&self, from: usize) -> &[f64] {
        &self.data[from * self.n..(from + 1) * self.n]
    }
}

/// Inverse-distance desirability as seen by a single ant.
///
/// A cell is `1 / distance` when the target has not been visited yet and is not the
/// source itself, and `0` otherwise. The buffer is reused across refreshes.
#[derive(Debug, Clone, PartialEq)]
pub struct HeuristicMatrix {
    data: Box<[f64]>,
    n: usize,
}

impl HeuristicMatrix {
    /// Heuristic for an ant that has visited nothing yet.
    #[must_use]
    pub fn new(distances: &DistanceMatrix) -> Self {
        let n = distances.len();
        let mut heuristic = Self {
            data: vec![0.0; n * n].into_boxed_slice(),
            n,
        };
        heuristic.refresh(distances, &vec![false; n]);
        heuristic
    }

    /// Recomputes every cell against `visited`, which is indexed by city.
    pub fn refresh(&mut self, distances: &DistanceMatrix, visited: &[bool]) {
        for i in 0..self.n {
            let row = &mut self.data[i * self.n..(i + 1) * self.n];
            for (j, cell) in row.iter_mut().enumerate() {
                *cell = if i != j && !visited[j] {
                    1.0 / distances.get(i, j)
                } else {
                    0.0
                };
            }
        }
    }

    #[must_use]
    pub fn get(&self, from: usize, to: usize) -> f64 {
        self.data[from * self.n + to]
    }

    #[must_use]
    pub fn row(&self, from: usize) -> &[f64] {
        &self.data[from * self.n..(from + 1) * self.n]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn four_cities() -> DistanceMatrix {
        DistanceMatrix::from_rows(vec![
            vec![0.0, 10.0, 15.0, 20.0],
            vec![10.0, 0.0, 35.0, 25.0],
            vec![15.0, 35.0, 0.0, 30.0],
            vec![20.0, 25.0, 30.0, 0.0],
        ])
        .unwrap()
    }

    #[test]
    fn test_from_rows_accepts_valid() {
        let d = four_cities();
        assert_eq!(d.len(), 4);
        assert_eq!(d.get(1, 2), 35.0);
        assert_eq!(d.row(3), &[20.0, 25.0, 30.0, 0.0]);
    }

    #[test]
    fn test_from_rows_accepts_asymmetric() {
        let d = DistanceMatrix::from_rows(vec![vec![0.0, 1.0], vec![7.0, 0.0]]).unwrap();
        assert_eq!(d.get(0, 1), 1.0);
        assert_eq!(d.get(1, 0), 7.0);
    }

    #[test]
    fn test_from_rows_rejects_single_city() {
        let err = DistanceMatrix::from_rows(vec![vec![0.0]]).unwrap_err();
        assert!(matches!(err, AcoError::InvalidInput { .. }));
    }

    #[test]
    fn test_from_rows_rejects_non_square() {
        let err = DistanceMatrix::from_rows(vec![vec![0.0, 1.0, 2.0], vec![1.0, 0.0, 2.0]])
            .unwrap_err();
        assert!(err.to_string().contains("row 0"));
    }

    #[test]
    fn test_from_rows_rejects_zero_and_negative_costs() {
        let zero = DistanceMatrix::from_rows(vec![vec![0.0, 0.0], vec![1.0, 0.0]]);
        assert!(matches!(zero, Err(AcoError::InvalidInput { .. })));

        let negative = DistanceMatrix::from_rows(vec![vec![0.0, 1.0], vec![-1.0, 0.0]]);
        assert!(matches!(negative, Err(AcoError::InvalidInput { .. })));
    }

    #[test]
    fn test_from_rows_rejects_nan_and_diagonal() {
        let nan = DistanceMatrix::from_rows(vec![vec![0.0, f64::NAN], vec![1.0, 0.0]]);
        assert!(matches!(nan, Err(AcoError::InvalidInput { .. })));

        let diagonal = DistanceMatrix::from_rows(vec![vec![3.0, 1.0], vec![1.0, 0.0]]);
        assert!(matches!(diagonal, Err(AcoError::InvalidInput { .. })));
    }

    #[test]
    fn test_heuristic_initial_is_inverse_distance() {
        let d = four_cities();
        let h = HeuristicMatrix::new(&d);
        assert_eq!(h.get(0, 1), 0.1);
        assert_eq!(h.get(2, 3), 1.0 / 30.0);
        for i in 0..4 {
            assert_eq!(h.get(i, i), 0.0);
        }
    }

    #[test]
    fn test_heuristic_refresh_masks_visited_columns() {
        let d = four_cities();
        let mut h = HeuristicMatrix::new(&d);
        h.refresh(&d, &[true, false, true, false]);

        for i in 0..4 {
            assert_eq!(h.get(i, 0), 0.0);
            assert_eq!(h.get(i, 2), 0.0);
        }
        assert_eq!(h.get(0, 1), 0.1);
        assert_eq!(h.get(0, 3), 0.05);
        assert_eq!(h.get(1, 1), 0.0);
    }

    #[test]
    fn test_heuristic_all_visited_is_zero() {
        let d = four_cities();
        let mut h = HeuristicMatrix::new(&d);
        h.refresh(&d, &[true; 4]);
        assert!((0..4).all(|i| h.row(i).iter().all(|&v| v == 0.0)));
    }
}
