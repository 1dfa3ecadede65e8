//! Compressed-sparse-column matrices over a [`DecayScalar`].
//!
//! Decay matrices are lower triangular and very sparse: a column holds entries
//! only for the nuclides reachable from that column's nuclide.

use nucdecay_core::DecayScalar;
use serde::{Deserialize, Serialize};

/// Square sparse matrix in CSC layout. Structural zeros are never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SparseMatrix<N> {
    dim: usize,
    col_ptr: Vec<usize>,
    row_idx: Vec<usize>,
    values: Vec<N>,
}

impl<N: DecayScalar> SparseMatrix<N> {
    /// Build from per-column `(row, value)` lists. Rows are sorted and zero
    /// values dropped.
    pub fn from_columns(dim: usize, columns: Vec<Vec<(usize, N)>>) -> Self {
        let mut col_ptr = Vec::with_capacity(dim + 1);
        let mut row_idx = Vec::new();
        let mut values = Vec::new();
        col_ptr.push(0);
        for mut column in columns.into_iter().take(dim) {
            column.sort_by_key(|(row, _)| *row);
            for (row, value) in column {
                if row < dim && !value.is_zero() {
                    row_idx.push(row);
                    values.push(value);
                }
            }
            col_ptr.push(row_idx.len());
        }
        while col_ptr.len() < dim + 1 {
            col_ptr.push(row_idx.len());
        }
        Self {
            dim,
            col_ptr,
            row_idx,
            values,
        }
    }

    pub fn identity(dim: usize) -> Self {
        Self::from_columns(dim, (0..dim).map(|j| vec![(j, N::one())]).collect())
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Number of stored entries.
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    /// Stored entries of column `col` as `(row, value)`.
    pub fn column(&self, col: usize) -> impl Iterator<Item = (usize, &N)> + '_ {
        let (start, end) = match (self.col_ptr.get(col), self.col_ptr.get(col + 1)) {
            (Some(&s), Some(&e)) => (s, e),
            _ => (0, 0),
        };
        self.row_idx[start..end]
            .iter()
            .copied()
            .zip(self.values[start..end].iter())
    }

    pub fn get(&self, row: usize, col: usize) -> Option<&N> {
        let start = *self.col_ptr.get(col)?;
        let end = *self.col_ptr.get(col + 1)?;
        let rows = &self.row_idx[start..end];
        rows.binary_search(&row).ok().map(|k| &self.values[start + k])
    }

    /// `self · v`, skipping zero entries of `v`.
    pub fn mul_vec(&self, v: &[N]) -> Vec<N> {
        let mut out = vec![N::zero(); self.dim];
        for (col, x) in v.iter().enumerate().take(self.dim) {
            if x.is_zero() {
                continue;
            }
            for (row, a) in self.column(col) {
                let acc = std::mem::replace(&mut out[row], N::zero());
                out[row] = acc + a.clone() * x.clone();
            }
        }
        out
    }

    /// Row-major copy: entry `i` lists `(col, value)` for row `i`, columns ascending.
    pub fn rows(&self) -> Vec<Vec<(usize, N)>> {
        let mut rows: Vec<Vec<(usize, N)>> = vec![Vec::new(); self.dim];
        for col in 0..self.dim {
            for (row, value) in self.column(col) {
                rows[row].push((col, value.clone()));
            }
        }
        rows
    }

    /// Base-10 magnitude of the largest entry in each column.
    pub fn column_max_log10(&self) -> Vec<f64> {
        (0..self.dim)
            .map(|col| {
                self.column(col)
                    .map(|(_, v)| v.log10_abs())
                    .fold(f64::NEG_INFINITY, f64::max)
            })
            .collect()
    }

    pub fn is_lower_triangular(&self) -> bool {
        (0..self.dim).all(|col| self.column(col).all(|(row, _)| row >= col))
    }

    pub fn has_unit_diagonal(&self) -> bool {
        (0..self.dim).all(|i| self.get(i, i).is_some_and(|v| *v == N::one()))
    }

    /// Dense copy, for inspection and tests.
    pub fn to_dense(&self) -> Vec<Vec<N>> {
        let mut dense = vec![vec![N::zero(); self.dim]; self.dim];
        for col in 0..self.dim {
            for (row, value) in self.column(col) {
                dense[row][col] = value.clone();
            }
        }
        dense
    }

    /// Check the CSC structure of a deserialized matrix.
    pub fn validate(&self) -> Result<(), String> {
        if self.col_ptr.len() != self.dim + 1 {
            return Err(format!("column pointer length {} for dimension {}", self.col_ptr.len(), self.dim));
        }
        if self.row_idx.len() != self.values.len() || self.col_ptr.last() != Some(&self.values.len()) {
            return Err("entry count mismatch".to_string());
        }
        if self.col_ptr.first() != Some(&0) || self.col_ptr.windows(2).any(|w| w[0] > w[1]) {
            return Err("column pointers not monotone".to_string());
        }
        for col in 0..self.dim {
            let rows = &self.row_idx[self.col_ptr[col]..self.col_ptr[col + 1]];
            if rows.windows(2).any(|w| w[0] >= w[1]) || rows.iter().any(|r| *r >= self.dim) {
                return Err(format!("bad row indices in column {col}"));
            }
        }
        Ok(())
    }
}
