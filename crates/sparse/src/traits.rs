use crate::csr::CsrMatrix;
use crate::error::SolverError;

/// Which system a solve targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveMode {
    /// Solve `A x = b`.
    Standard,
    /// Solve `Aᵀ x = b` with the same factorization.
    Transpose,
}

/// Tuning hints handed to the numeric factorization.
///
/// Hints never change the mathematical content of the factorization, only
/// how the backend gets there. Backends that have no use for a hint ignore it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FactorizationHints {
    /// Reordering/partitioning block size.
    pub block_size: usize,
}

/// Core trait for direct sparse solvers.
///
/// This is the contract every backend follows. A backend is a stateful
/// session over one matrix:
/// 1.  `analyze`: symbolic factorization from the sparsity pattern.
/// 2.  `factorize`: numeric factorization; requires a successful `analyze`.
/// 3.  `solve`: any number of solves against the current factorization.
/// 4.  `release`: free the factorization. Calling it twice is harmless.
pub trait SparseSolver {
    fn analyze(&mut self, matrix: &CsrMatrix) -> Result<(), SolverError>;
    fn factorize(
        &mut self,
        matrix: &CsrMatrix,
        hints: FactorizationHints,
    ) -> Result<(), SolverError>;
    fn solve(&mut self, rhs: &[f64], mode: SolveMode) -> Result<Vec<f64>, SolverError>;
    fn release(&mut self) -> Result<(), SolverError>;
}

macro_rules! forward_solver {
    ($ty:ty) => {
        impl<S: SparseSolver + ?Sized> SparseSolver for $ty {
            fn analyze(&mut self, matrix: &CsrMatrix) -> Result<(), SolverError> {
                (**self).analyze(matrix)
            }

            fn factorize(
                &mut self,
                matrix: &CsrMatrix,
                hints: FactorizationHints,
            ) -> Result<(), SolverError> {
                (**self).factorize(matrix, hints)
            }

            fn solve(&mut self, rhs: &[f64], mode: SolveMode) -> Result<Vec<f64>, SolverError> {
                (**self).solve(rhs, mode)
            }

            fn release(&mut self) -> Result<(), SolverError> {
                (**self).release()
            }
        }
    };
}

forward_solver!(Box<S>);
forward_solver!(&mut S);
