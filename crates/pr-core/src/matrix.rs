//! Square travel-time matrix.
//!
//! Stored row-major in a single `Vec<f64>` of seconds.  `get(i, j)` is the
//! shortest travel time from stop `i` to stop `j`; `f64::INFINITY` means no
//! path exists.  The diagonal is always `0.0`.  The matrix is generally *not*
//! symmetric (one-way streets).

use crate::{CoreError, CoreResult};

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawMatrix"))]
pub struct TimeMatrix {
    n:     usize,
    cells: Vec<f64>,
}

/// Unchecked wire shape; only reaches `TimeMatrix` through `try_from`.
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawMatrix {
    n:     usize,
    cells: Vec<f64>,
}

#[cfg(feature = "serde")]
impl TryFrom<RawMatrix> for TimeMatrix {
    type Error = CoreError;

    /// Same guarantees as [`TimeMatrix::from_rows`]: square, zero diagonal.
    fn try_from(raw: RawMatrix) -> CoreResult<Self> {
        let RawMatrix { n, mut cells } = raw;
        if n.checked_mul(n) != Some(cells.len()) {
            return Err(CoreError::MatrixShape { n, cells: cells.len() });
        }
        for i in 0..n {
            cells[i * n + i] = 0.0;
        }
        Ok(Self { n, cells })
    }
}

impl TimeMatrix {
    /// An `n×n` matrix with a zero diagonal and every other cell `+∞`.
    pub fn unreachable(n: usize) -> Self {
        let mut cells = vec![f64::INFINITY; n * n];
        for i in 0..n {
            cells[i * n + i] = 0.0;
        }
        Self { n, cells }
    }

    /// Build from nested rows.  The diagonal is forced to zero.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> CoreResult<Self> {
        let n = rows.len();
        let mut cells = Vec::with_capacity(n * n);
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != n {
                return Err(CoreError::RaggedMatrix { expected: n, row: i, got: row.len() });
            }
            cells.extend(row);
            cells[i * n + i] = 0.0;
        }
        Ok(Self { n, cells })
    }

    /// Number of rows (= columns).
    #[inline]
    pub fn size(&self) -> usize {
        self.n
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Travel time from `i` to `j` in seconds.
    ///
    /// # Panics
    /// If either index is `>= size()`.
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        assert!(i < self.n && j < self.n, "matrix index ({i}, {j}) out of range {}", self.n);
        self.cells[i * self.n + j]
    }

    /// Overwrite one off-diagonal cell.  Writes to the diagonal are ignored.
    #[inline]
    pub fn set(&mut self, i: usize, j: usize, secs: f64) {
        assert!(i < self.n && j < self.n, "matrix index ({i}, {j}) out of range {}", self.n);
        if i != j {
            self.cells[i * self.n + j] = secs;
        }
    }

    /// Row `i` as a slice.
    #[inline]
    pub fn row(&self, i: usize) -> &[f64] {
        &self.cells[i * self.n..(i + 1) * self.n]
    }

    /// `(i, j)` pairs with no path, in row-major order.
    pub fn unreachable_pairs(&self) -> Vec<(usize, usize)> {
        (0..self.n)
            .flat_map(|i| (0..self.n).map(move |j| (i, j)))
            .filter(|&(i, j)| self.cells[i * self.n + j].is_infinite())
            .collect()
    }
}
