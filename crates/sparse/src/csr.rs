//! Compressed sparse-row storage.

use crate::error::SolverError;
use crate::traits::SolveMode;

/// Square matrix in compressed sparse-row form.
///
/// Owns three parallel arrays:
/// - `values[k]`: the k-th stored entry
/// - `col_indices[k]`: its column
/// - `row_offsets[r]..row_offsets[r + 1]`: the entries of row `r`
///
/// Columns are strictly ascending within each row. Construction through
/// [`CsrMatrix::new`] checks this, so every `CsrMatrix` in circulation is
/// well formed.
#[derive(Debug, Clone, PartialEq)]
pub struct CsrMatrix {
    dim: usize,
    values: Vec<f64>,
    col_indices: Vec<usize>,
    row_offsets: Vec<usize>,
}

impl CsrMatrix {
    /// Create a matrix from its raw arrays, validating the structure.
    ///
    /// # Errors
    /// Returns [`SolverError::Malformed`] if the arrays disagree in length, the
    /// offsets are not monotone, or a row has unsorted/out-of-range columns.
    pub fn new(
        dim: usize,
        values: Vec<f64>,
        col_indices: Vec<usize>,
        row_offsets: Vec<usize>,
    ) -> Result<Self, SolverError> {
        let matrix = Self {
            dim,
            values,
            col_indices,
            row_offsets,
        };
        matrix.check_structure()?;
        Ok(matrix)
    }

    /// Identity matrix of the given dimension.
    pub fn identity(dim: usize) -> Self {
        Self {
            dim,
            values: vec![1.0; dim],
            col_indices: (0..dim).collect(),
            row_offsets: (0..=dim).collect(),
        }
    }

    fn check_structure(&self) -> Result<(), SolverError> {
        if self.row_offsets.len() != self.dim + 1 {
            return Err(SolverError::Malformed(format!(
                "expected {} row offsets, found {}",
                self.dim + 1,
                self.row_offsets.len()
            )));
        }
        if self.values.len() != self.col_indices.len() {
            return Err(SolverError::Malformed(format!(
                "{} values but {} column indices",
                self.values.len(),
                self.col_indices.len()
            )));
        }
        if self.row_offsets[0] != 0 || self.row_offsets[self.dim] != self.values.len() {
            return Err(SolverError::Malformed(
                "row offsets must start at 0 and end at nnz".into(),
            ));
        }
        for row in 0..self.dim {
            let (start, end) = (self.row_offsets[row], self.row_offsets[row + 1]);
            if start > end || end > self.values.len() {
                return Err(SolverError::Malformed(format!(
                    "row {row} has invalid offsets {start}..{end}"
                )));
            }
            let cols = &self.col_indices[start..end];
            if cols.iter().any(|&c| c >= self.dim) {
                return Err(SolverError::Malformed(format!(
                    "row {row} has a column index out of range"
                )));
            }
            if cols.windows(2).any(|w| w[0] >= w[1]) {
                return Err(SolverError::Malformed(format!(
                    "row {row} columns are not strictly ascending"
                )));
            }
        }
        Ok(())
    }

    /// Number of rows (and columns).
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Number of stored entries.
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn col_indices(&self) -> &[usize] {
        &self.col_indices
    }

    pub fn row_offsets(&self) -> &[usize] {
        &self.row_offsets
    }

    /// Column indices and values of one row.
    pub fn row(&self, row: usize) -> (&[usize], &[f64]) {
        let range = self.row_offsets[row]..self.row_offsets[row + 1];
        (&self.col_indices[range.clone()], &self.values[range])
    }

    /// Stored value at `(row, col)`, or 0.0 if the entry is not stored.
    pub fn get(&self, row: usize, col: usize) -> f64 {
        let (cols, vals) = self.row(row);
        match cols.binary_search(&col) {
            Ok(k) => vals[k],
            Err(_) => 0.0,
        }
    }

    /// Iterate over `(row, col, value)` triplets in row-major order.
    pub fn triplets(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        (0..self.dim).flat_map(move |row| {
            let (cols, vals) = self.row(row);
            cols.iter().zip(vals).map(move |(&col, &val)| (row, col, val))
        })
    }

    /// Compute `A x` or `Aᵀ x`.
    pub fn mul_vec(&self, x: &[f64], mode: SolveMode) -> Result<Vec<f64>, SolverError> {
        if x.len() != self.dim {
            return Err(SolverError::DimensionMismatch {
                expected: self.dim,
                found: x.len(),
            });
        }
        let mut out = vec![0.0; self.dim];
        match mode {
            SolveMode::Standard => {
                for (row, slot) in out.iter_mut().enumerate() {
                    let (cols, vals) = self.row(row);
                    *slot = cols.iter().zip(vals).map(|(&c, &v)| v * x[c]).sum();
                }
            }
            SolveMode::Transpose => {
                for (row, col, val) in self.triplets() {
                    out[col] += val * x[row];
                }
            }
        }
        Ok(out)
    }

    /// Dense row-major copy of the matrix.
    pub fn to_dense(&self) -> Vec<f64> {
        let mut dense = vec![0.0; self.dim * self.dim];
        for (row, col, val) in self.triplets() {
            dense[row * self.dim + col] = val;
        }
        dense
    }
}
