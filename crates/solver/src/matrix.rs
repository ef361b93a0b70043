//! Generator matrix `I − Q` over the transient states.
//!
//! Row `r` (and column `r`) stands for `r + 1` copies of allele `A`. The
//! absorbing states `0` and `2N` never appear; their mass is what makes the
//! matrix substochastic.

use crate::errors::{Result, WfesError};
use crate::model::{AlleleDynamics, ModelParameters};
use rayon::prelude::*;
use wfes_sparse::CsrMatrix;

/// Block size hint for a matrix of dimension `dim`.
///
/// One tenth of the dimension for matrices of 100 rows or more, the whole
/// dimension below that.
pub fn block_size_for(dim: usize) -> usize {
    if dim >= 100 {
        dim / 10
    } else {
        dim
    }
}

/// Sparse `I − Q` together with the settings it was built with.
#[derive(Debug, Clone)]
pub struct GeneratorMatrix {
    csr: CsrMatrix,
    block_size: usize,
    zero_threshold: f64,
}

impl GeneratorMatrix {
    /// Assemble the generator matrix for `params`.
    ///
    /// Transition mass `P(i → j)` below `zero_threshold` is dropped; mass at
    /// the threshold is kept. Exact zeros are never stored, so a zero
    /// threshold drops nothing else. The diagonal `1 − P(i → i)` is always
    /// stored, with `P(i → i)` read as zero when it falls under the threshold.
    ///
    /// Rows are computed in parallel and concatenated in row order.
    ///
    /// # Errors
    /// * [`WfesError::Configuration`] if the threshold is negative, not
    ///   finite, or at least 1.
    /// * [`WfesError::Model`] if a transition row cannot be evaluated.
    /// * [`WfesError::Matrix`] if the assembled arrays fail the structural
    ///   check.
    pub fn build(params: &ModelParameters, block_size: usize, zero_threshold: f64) -> Result<Self> {
        if !zero_threshold.is_finite() || !(0.0..1.0).contains(&zero_threshold) {
            return Err(WfesError::config(format!(
                "zero threshold must be finite and in [0, 1) (got {zero_threshold})"
            )));
        }
        if block_size == 0 {
            return Err(WfesError::config("block size must be at least 1"));
        }

        let dynamics = AlleleDynamics::new(*params);
        let dim = params.transient_states();

        let rows: Vec<Vec<(usize, f64)>> = (1..=dim)
            .into_par_iter()
            .map(|copies| sparse_row(&dynamics, copies, dim, zero_threshold))
            .collect::<Result<_>>()?;

        let nnz = rows.iter().map(Vec::len).sum();
        let mut values = Vec::with_capacity(nnz);
        let mut col_indices = Vec::with_capacity(nnz);
        let mut row_offsets = Vec::with_capacity(dim + 1);
        row_offsets.push(0);
        for row in rows {
            for (col, value) in row {
                col_indices.push(col);
                values.push(value);
            }
            row_offsets.push(values.len());
        }

        let csr = CsrMatrix::new(dim, values, col_indices, row_offsets).map_err(WfesError::Matrix)?;
        Ok(Self {
            csr,
            block_size,
            zero_threshold,
        })
    }

    pub fn csr(&self) -> &CsrMatrix {
        &self.csr
    }

    /// Number of transient states (`2N − 1`).
    pub fn dim(&self) -> usize {
        self.csr.dim()
    }

    pub fn nnz(&self) -> usize {
        self.csr.nnz()
    }

    /// Block size hint forwarded to numeric factorization.
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    pub fn zero_threshold(&self) -> f64 {
        self.zero_threshold
    }

    /// Transition mass retained in `row`: the off-diagonal magnitudes plus
    /// `1 − diagonal`. Never above 1 beyond rounding.
    pub fn row_mass(&self, row: usize) -> f64 {
        let (cols, vals) = self.csr.row(row);
        cols.iter()
            .zip(vals)
            .map(|(&col, &val)| if col == row { 1.0 - val } else { -val })
            .sum()
    }
}

/// Entries of the row for `copies` copies, as `(column, value)` pairs with
/// ascending columns.
fn sparse_row(
    dynamics: &AlleleDynamics,
    copies: usize,
    dim: usize,
    zero_threshold: f64,
) -> Result<Vec<(usize, f64)>> {
    let mass = dynamics.transition_row(copies)?;
    let mut entries = Vec::new();
    // Columns 1..=dim of the full row are the transient states.
    for (col, &p) in mass[1..=dim].iter().enumerate() {
        let kept = p > 0.0 && p >= zero_threshold;
        if col + 1 == copies {
            entries.push((col, 1.0 - if kept { p } else { 0.0 }));
        } else if kept {
            entries.push((col, -p));
        }
    }
    Ok(entries)
}
