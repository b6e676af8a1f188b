//! Owned column-major matrices for point sets, vector weights and outputs.
//!
//! Column `j` holds the components of the `j`-th point, so a `2 × N` matrix stores
//! `[x0, y0, x1, y1, ...]` and a `4 × N` stress output stores the four tensor
//! components of each target next to each other.

use crate::error::{ParameterError, ShapeError};

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnMatrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl ColumnMatrix {
    pub fn new(rows: usize, cols: usize, data: Vec<f64>) -> Result<Self, ShapeError> {
        if data.len() != rows * cols {
            return Err(ShapeError::DataLength {
                rows,
                cols,
                len: data.len(),
            });
        }
        Ok(Self { rows, cols, data })
    }

    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    /// Build a matrix whose columns are the given fixed-size vectors.
    pub fn from_columns<const R: usize>(columns: &[[f64; R]]) -> Self {
        Self {
            rows: R,
            cols: columns.len(),
            data: columns.iter().flatten().copied().collect(),
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[col * self.rows + row]
    }

    #[inline]
    pub fn column(&self, col: usize) -> &[f64] {
        let start = col * self.rows;
        &self.data[start..start + self.rows]
    }

    pub fn columns(&self) -> impl ExactSizeIterator<Item = &[f64]> + '_ {
        // chunks_exact panics on a zero-row matrix
        (0..self.cols).map(move |col| self.column(col))
    }

    /// Largest absolute entry, `0.0` for an empty matrix.
    pub fn max_abs(&self) -> f64 {
        self.data.iter().fold(0.0, |acc, value| acc.max(value.abs()))
    }

    /// Fails with [`ShapeError::RowCount`] unless the matrix has `expected` rows.
    pub fn require_rows(&self, name: &'static str, expected: usize) -> Result<(), ShapeError> {
        if self.rows != expected {
            return Err(ShapeError::RowCount {
                name,
                expected,
                rows: self.rows,
            });
        }
        Ok(())
    }

    /// Fails with [`ShapeError::ColumnMismatch`] unless the matrix has `expected` columns.
    pub fn require_cols(&self, name: &'static str, expected: usize) -> Result<(), ShapeError> {
        if self.cols != expected {
            return Err(ShapeError::ColumnMismatch {
                name,
                cols: self.cols,
                expected,
            });
        }
        Ok(())
    }

    /// Fails with [`ParameterError::NonFinite`] if any entry is NaN or infinite.
    pub fn require_finite(&self, name: &'static str) -> Result<(), ParameterError> {
        if self.data.iter().all(|value| value.is_finite()) {
            Ok(())
        } else {
            Err(ParameterError::NonFinite { name })
        }
    }

    /// Column `col` as a pair, for matrices known to have two rows.
    #[inline]
    pub(crate) fn pair(&self, col: usize) -> [f64; 2] {
        let start = col * self.rows;
        [self.data[start], self.data[start + 1]]
    }
}

impl From<ColumnMatrix> for Vec<f64> {
    fn from(matrix: ColumnMatrix) -> Self {
        matrix.data
    }
}
