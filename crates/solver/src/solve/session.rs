//! Typed lifecycle of one factorization.
//!
//! A [`SolverSession`] owns its backend and borrows the matrix it factorizes.
//! The state parameter tracks how far the session has progressed, so that
//! `solve` only exists once the matrix has been factorized:
//!
//! ```text
//! Created --analyze--> Analyzed --factorize--> Factorized --solve--> ...
//! ```
//!
//! `release` consumes the session from any state. A session that is dropped
//! without an explicit `release` (for instance because a phase failed and `?`
//! returned early) releases its backend on drop, so the backend is released
//! exactly once on every path.

use crate::errors::{Result, SolverPhase, WfesError};
use crate::matrix::GeneratorMatrix;
use std::marker::PhantomData;
use tracing::warn;
use wfes_sparse::{FactorizationHints, SolveMode, SolverError, SparseSolver};

/// Session state: nothing computed yet.
#[derive(Debug, Clone, Copy)]
pub struct Created;

/// Session state: symbolic factorization done.
#[derive(Debug, Clone, Copy)]
pub struct Analyzed;

/// Session state: numeric factorization done, ready to solve.
#[derive(Debug, Clone, Copy)]
pub struct Factorized;

/// Backend plus the matrix it works on. Releases the backend on drop unless
/// that already happened.
struct Lease<'m, S: SparseSolver> {
    solver: S,
    matrix: &'m GeneratorMatrix,
    released: bool,
}

impl<S: SparseSolver> Lease<'_, S> {
    fn release(&mut self) -> std::result::Result<(), SolverError> {
        self.released = true;
        self.solver.release()
    }
}

impl<S: SparseSolver> Drop for Lease<'_, S> {
    fn drop(&mut self) {
        if !self.released {
            if let Err(e) = self.release() {
                warn!(error = %e, "failed to release solver after an aborted session");
            }
        }
    }
}

/// A solver backend bound to one [`GeneratorMatrix`].
pub struct SolverSession<'m, S: SparseSolver, State = Created> {
    lease: Lease<'m, S>,
    _state: PhantomData<State>,
}

impl<'m, S: SparseSolver> SolverSession<'m, S, Created> {
    pub fn new(solver: S, matrix: &'m GeneratorMatrix) -> Self {
        Self {
            lease: Lease {
                solver,
                matrix,
                released: false,
            },
            _state: PhantomData,
        }
    }

    /// Symbolic factorization.
    ///
    /// # Errors
    /// Returns a [`SolverPhase::Analyze`] error; the backend is released.
    pub fn analyze(mut self) -> Result<SolverSession<'m, S, Analyzed>> {
        let matrix = self.lease.matrix;
        self.lease
            .solver
            .analyze(matrix.csr())
            .map_err(|e| WfesError::solver(SolverPhase::Analyze, e))?;
        Ok(SolverSession {
            lease: self.lease,
            _state: PhantomData,
        })
    }
}

impl<'m, S: SparseSolver> SolverSession<'m, S, Analyzed> {
    /// Numeric factorization, passing the matrix's block size as a hint.
    ///
    /// # Errors
    /// Returns a [`SolverPhase::Factorize`] error; the backend is released.
    pub fn factorize(mut self) -> Result<SolverSession<'m, S, Factorized>> {
        let matrix = self.lease.matrix;
        let hints = FactorizationHints {
            block_size: matrix.block_size(),
        };
        self.lease
            .solver
            .factorize(matrix.csr(), hints)
            .map_err(|e| WfesError::solver(SolverPhase::Factorize, e))?;
        Ok(SolverSession {
            lease: self.lease,
            _state: PhantomData,
        })
    }
}

impl<S: SparseSolver> SolverSession<'_, S, Factorized> {
    /// Solve against the factorized matrix. The session stays usable.
    ///
    /// The error is returned untagged; the caller knows which solve it was.
    pub fn solve(&mut self, rhs: &[f64], mode: SolveMode) -> std::result::Result<Vec<f64>, SolverError> {
        let dim = self.lease.matrix.dim();
        if rhs.len() != dim {
            return Err(SolverError::DimensionMismatch {
                expected: dim,
                found: rhs.len(),
            });
        }
        let x = self.lease.solver.solve(rhs, mode)?;
        if x.len() != dim {
            return Err(SolverError::DimensionMismatch {
                expected: dim,
                found: x.len(),
            });
        }
        Ok(x)
    }
}

impl<S: SparseSolver, State> SolverSession<'_, S, State> {
    pub fn matrix(&self) -> &GeneratorMatrix {
        self.lease.matrix
    }

    /// Release the backend and end the session.
    ///
    /// # Errors
    /// Returns a [`SolverPhase::Release`] error. The backend is not retried.
    pub fn release(mut self) -> Result<()> {
        self.lease
            .release()
            .map_err(|e| WfesError::solver(SolverPhase::Release, e))
    }
}
