//! Direct sparse linear solvers.
//!
//! Provides a CSR matrix container and interchangeable factorization
//! backends behind the [`SparseSolver`] trait.

mod backends;
mod csr;
mod error;
mod traits;

pub use backends::{DenseLu, SparseLu};
pub use csr::CsrMatrix;
pub use error::SolverError;
pub use traits::{FactorizationHints, SolveMode, SparseSolver};

use serde::{Deserialize, Serialize};

/// Strategies for factorizing a matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SolverStrategy {
    /// Sparse LU with fill-reducing ordering (faer).
    #[default]
    SparseLu,
    /// Dense LU with partial pivoting. Reference only.
    DenseLu,
}

impl SolverStrategy {
    /// Create a fresh backend for one solve session.
    pub fn backend(&self, refinement_steps: usize) -> Backend {
        match self {
            SolverStrategy::SparseLu => Backend::SparseLu(SparseLu::new(refinement_steps)),
            SolverStrategy::DenseLu => Backend::DenseLu(DenseLu::new()),
        }
    }
}

impl std::fmt::Display for SolverStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SparseLu => write!(f, "sparse-lu"),
            Self::DenseLu => write!(f, "dense-lu"),
        }
    }
}

impl std::str::FromStr for SolverStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sparse-lu" | "sparse" => Ok(Self::SparseLu),
            "dense-lu" | "dense" => Ok(Self::DenseLu),
            _ => Err(format!(
                "Unknown solver strategy: {s}. Available: sparse-lu, dense-lu"
            )),
        }
    }
}

/// A backend selected at runtime through [`SolverStrategy`].
pub enum Backend {
    SparseLu(SparseLu),
    DenseLu(DenseLu),
}

impl SparseSolver for Backend {
    fn analyze(&mut self, matrix: &CsrMatrix) -> Result<(), SolverError> {
        match self {
            Backend::SparseLu(s) => s.analyze(matrix),
            Backend::DenseLu(s) => s.analyze(matrix),
        }
    }

    fn factorize(
        &mut self,
        matrix: &CsrMatrix,
        hints: FactorizationHints,
    ) -> Result<(), SolverError> {
        match self {
            Backend::SparseLu(s) => s.factorize(matrix, hints),
            Backend::DenseLu(s) => s.factorize(matrix, hints),
        }
    }

    fn solve(&mut self, rhs: &[f64], mode: SolveMode) -> Result<Vec<f64>, SolverError> {
        match self {
            Backend::SparseLu(s) => s.solve(rhs, mode),
            Backend::DenseLu(s) => s.solve(rhs, mode),
        }
    }

    fn release(&mut self) -> Result<(), SolverError> {
        match self {
            Backend::SparseLu(s) => s.release(),
            Backend::DenseLu(s) => s.release(),
        }
    }
}
