use crate::csr::CsrMatrix;
use crate::error::SolverError;
use crate::traits::{FactorizationHints, SolveMode, SparseSolver};

/// Backend: dense LU with partial pivoting.
///
/// # How it works
///
/// The CSR matrix is expanded into a dense row-major buffer and factorized
/// in place as `P A = L U` (unit lower `L`, upper `U`). Transpose solves
/// reuse the same factors via `Aᵀ = Uᵀ Lᵀ P`.
///
/// # Why use this?
///
/// *   **Reference:** No fill-reducing ordering, no supernodes. Easy to trust.
/// *   **Cost:** `O(n³)` time and `O(n²)` memory, so only for small matrices.
#[derive(Debug, Default)]
pub struct DenseLu {
    dim: Option<usize>,
    factors: Option<Vec<f64>>,
    perm: Vec<usize>,
}

impl DenseLu {
    pub fn new() -> Self {
        Self::default()
    }

    fn factor_in_place(a: &mut [f64], n: usize, perm: &mut [usize]) -> Result<(), SolverError> {
        for k in 0..n {
            let pivot_row = (k..n)
                .max_by(|&i, &j| a[i * n + k].abs().total_cmp(&a[j * n + k].abs()))
                .unwrap_or(k);
            if a[pivot_row * n + k] == 0.0 {
                return Err(SolverError::Singular(k));
            }
            if pivot_row != k {
                for col in 0..n {
                    a.swap(k * n + col, pivot_row * n + col);
                }
                perm.swap(k, pivot_row);
            }

            let pivot = a[k * n + k];
            for i in (k + 1)..n {
                let factor = a[i * n + k] / pivot;
                a[i * n + k] = factor;
                if factor != 0.0 {
                    for j in (k + 1)..n {
                        a[i * n + j] -= factor * a[k * n + j];
                    }
                }
            }
        }
        Ok(())
    }
}

impl SparseSolver for DenseLu {
    fn analyze(&mut self, matrix: &CsrMatrix) -> Result<(), SolverError> {
        self.dim = Some(matrix.dim());
        self.factors = None;
        Ok(())
    }

    fn factorize(
        &mut self,
        matrix: &CsrMatrix,
        _hints: FactorizationHints,
    ) -> Result<(), SolverError> {
        let n = self
            .dim
            .ok_or(SolverError::InvalidPhase("factorize called before analyze"))?;
        if matrix.dim() != n {
            return Err(SolverError::DimensionMismatch {
                expected: n,
                found: matrix.dim(),
            });
        }

        let mut a = matrix.to_dense();
        let mut perm: Vec<usize> = (0..n).collect();
        Self::factor_in_place(&mut a, n, &mut perm)?;

        self.factors = Some(a);
        self.perm = perm;
        Ok(())
    }

    fn solve(&mut self, rhs: &[f64], mode: SolveMode) -> Result<Vec<f64>, SolverError> {
        let lu = self
            .factors
            .as_ref()
            .ok_or(SolverError::InvalidPhase("solve called before factorize"))?;
        let n = self.perm.len();
        if rhs.len() != n {
            return Err(SolverError::DimensionMismatch {
                expected: n,
                found: rhs.len(),
            });
        }

        let x = match mode {
            SolveMode::Standard => {
                // L y = P b
                let mut y: Vec<f64> = self.perm.iter().map(|&p| rhs[p]).collect();
                for i in 0..n {
                    let dot: f64 = (0..i).map(|j| lu[i * n + j] * y[j]).sum();
                    y[i] -= dot;
                }
                // U x = y
                for i in (0..n).rev() {
                    let dot: f64 = ((i + 1)..n).map(|j| lu[i * n + j] * y[j]).sum();
                    y[i] = (y[i] - dot) / lu[i * n + i];
                }
                y
            }
            SolveMode::Transpose => {
                // Uᵀ z = b
                let mut z = rhs.to_vec();
                for i in 0..n {
                    let dot: f64 = (0..i).map(|j| lu[j * n + i] * z[j]).sum();
                    z[i] = (z[i] - dot) / lu[i * n + i];
                }
                // Lᵀ w = z
                for i in (0..n).rev() {
                    let dot: f64 = ((i + 1)..n).map(|j| lu[j * n + i] * z[j]).sum();
                    z[i] -= dot;
                }
                // x = Pᵀ w
                let mut x = vec![0.0; n];
                for (i, &p) in self.perm.iter().enumerate() {
                    x[p] = z[i];
                }
                x
            }
        };
        Ok(x)
    }

    fn release(&mut self) -> Result<(), SolverError> {
        self.dim = None;
        self.factors = None;
        self.perm.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: &[f64], b: &[f64], eps: f64) -> bool {
        a.len() == b.len() && a.iter().zip(b).all(|(x, y)| (x - y).abs() < eps)
    }

    fn needs_pivoting() -> CsrMatrix {
        // [ 0  2  1 ]
        // [ 1  1  0 ]
        // [ 3  0  1 ]
        CsrMatrix::new(
            3,
            vec![2.0, 1.0, 1.0, 1.0, 3.0, 1.0],
            vec![1, 2, 0, 1, 0, 2],
            vec![0, 2, 4, 6],
        )
        .unwrap()
    }

    fn factorized(matrix: &CsrMatrix) -> DenseLu {
        let mut lu = DenseLu::new();
        lu.analyze(matrix).unwrap();
        lu.factorize(matrix, FactorizationHints { block_size: 3 })
            .unwrap();
        lu
    }

    #[test]
    fn test_solve_standard_recovers_rhs() {
        let m = needs_pivoting();
        let mut lu = factorized(&m);
        let b = [3.0, 2.0, 4.0];
        let x = lu.solve(&b, SolveMode::Standard).unwrap();
        let ax = m.mul_vec(&x, SolveMode::Standard).unwrap();
        assert!(approx_eq(&ax, &b, 1e-12), "A x = {ax:?}");
    }

    #[test]
    fn test_solve_transpose_recovers_rhs() {
        let m = needs_pivoting();
        let mut lu = factorized(&m);
        let b = [1.0, -2.0, 0.5];
        let x = lu.solve(&b, SolveMode::Transpose).unwrap();
        let atx = m.mul_vec(&x, SolveMode::Transpose).unwrap();
        assert!(approx_eq(&atx, &b, 1e-12), "Aᵀ x = {atx:?}");
    }

    #[test]
    fn test_singular_matrix_is_reported() {
        let m = CsrMatrix::new(2, vec![1.0, 2.0, 2.0, 4.0], vec![0, 1, 0, 1], vec![0, 2, 4])
            .unwrap();
        let mut lu = DenseLu::new();
        lu.analyze(&m).unwrap();
        let err = lu
            .factorize(&m, FactorizationHints { block_size: 2 })
            .unwrap_err();
        assert!(matches!(err, SolverError::Singular(1)));
    }

    #[test]
    fn test_call_order_is_enforced() {
        let m = CsrMatrix::identity(2);
        let mut lu = DenseLu::new();
        assert!(matches!(
            lu.factorize(&m, FactorizationHints { block_size: 2 }),
            Err(SolverError::InvalidPhase(_))
        ));
        assert!(matches!(
            lu.solve(&[1.0, 1.0], SolveMode::Standard),
            Err(SolverError::InvalidPhase(_))
        ));
    }

    #[test]
    fn test_release_is_idempotent() {
        let m = CsrMatrix::identity(2);
        let mut lu = factorized(&m);
        assert!(lu.release().is_ok());
        assert!(lu.release().is_ok());
        assert!(lu.solve(&[1.0, 1.0], SolveMode::Standard).is_err());
    }
}
