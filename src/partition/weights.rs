//! Dense pairwise weight matrix.

use crate::error::{GroupingError, Result};
use rand::Rng;

/// Directed `n × n` weights, stored row-major.
///
/// `get(i, j)` is how person `i` ranks sharing a group with `j`; lower is
/// better. The diagonal is ignored by every objective.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WeightMatrix {
    n: usize,
    data: Vec<i64>,
}

impl WeightMatrix {
    /// Builds a matrix from rows, which must all have length `rows.len()`.
    pub fn new(rows: Vec<Vec<i64>>) -> Result<Self> {
        let n = rows.len();
        let mut data = Vec::with_capacity(n * n);
        for (row, values) in rows.into_iter().enumerate() {
            if values.len() != n {
                return Err(GroupingError::NonSquareWeights {
                    row,
                    len: values.len(),
                    n,
                });
            }
            data.extend(values);
        }
        Ok(Self { n, data })
    }

    /// Builds a matrix by evaluating `f(i, j)` for every cell.
    pub fn from_fn(n: usize, mut f: impl FnMut(usize, usize) -> i64) -> Self {
        let mut data = Vec::with_capacity(n * n);
        for i in 0..n {
            for j in 0..n {
                data.push(f(i, j));
            }
        }
        Self { n, data }
    }

    /// Uniformly random weights in `1..=n` off the diagonal, `0` on it.
    pub fn random<R: Rng>(n: usize, rng: &mut R) -> Self {
        Self::from_fn(n, |i, j| {
            if i == j {
                0
            } else {
                rng.random_range(1..=n as i64)
            }
        })
    }

    /// Number of persons `n`.
    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Weight from `i` to `j`.
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> i64 {
        self.data[i * self.n + j]
    }

    /// Outgoing weights of person `i`.
    #[inline]
    pub fn row(&self, i: usize) -> &[i64] {
        &self.data[i * self.n..(i + 1) * self.n]
    }

    /// Largest off-diagonal weight, or `0` for `n < 2`.
    pub fn max_weight(&self) -> i64 {
        (0..self.n)
            .flat_map(|i| (0..self.n).filter(move |&j| j != i).map(move |j| (i, j)))
            .map(|(i, j)| self.get(i, j))
            .max()
            .unwrap_or(0)
    }
}
