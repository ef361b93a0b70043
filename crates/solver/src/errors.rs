//! Error types for model construction and absorption solves.

use std::fmt;
use thiserror::Error;
use wfes_sparse::SolverError;

/// Phase of a solve session that a solver failure is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolverPhase {
    /// Symbolic factorization of the sparsity pattern.
    Analyze,
    /// Numeric factorization.
    Factorize,
    /// Standard solve for extinction probabilities.
    SolveExtinction,
    /// Transpose solve for sojourn times.
    SolveSojourn,
    /// Releasing the factorization.
    Release,
}

impl SolverPhase {
    /// Numeric phase code, as used for process exit statuses.
    pub fn code(self) -> i32 {
        match self {
            SolverPhase::Analyze => 11,
            SolverPhase::Factorize => 22,
            SolverPhase::SolveExtinction | SolverPhase::SolveSojourn => 33,
            SolverPhase::Release => -1,
        }
    }
}

impl fmt::Display for SolverPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SolverPhase::Analyze => "symbolic factorization",
            SolverPhase::Factorize => "numeric factorization",
            SolverPhase::SolveExtinction => "extinction solve",
            SolverPhase::SolveSojourn => "sojourn solve",
            SolverPhase::Release => "release",
        };
        write!(f, "{name} (phase {})", self.code())
    }
}

/// Main error type for the solver crate.
#[derive(Debug, Error)]
pub enum WfesError {
    /// Model parameters outside the valid or safe range.
    ///
    /// `overridable` errors come from the safe-operating-range checks and can
    /// be bypassed with `force`; the rest are hard model constraints.
    #[error("Invalid parameter: {message}")]
    ParameterValidation { message: String, overridable: bool },

    /// Invalid solver configuration.
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// The model could not be evaluated (e.g. a transition distribution
    /// could not be constructed).
    #[error("Model error: {message}")]
    Model { message: String },

    /// The assembled generator matrix is structurally invalid.
    #[error("Malformed generator matrix: {0}")]
    Matrix(#[source] SolverError),

    /// The solver backend reported a failure. Always fatal for the session.
    #[error("Solver failed during {phase}: {source}")]
    SolverPhase {
        phase: SolverPhase,
        #[source]
        source: SolverError,
    },
}

/// Type alias for Results using WfesError
pub type Result<T> = std::result::Result<T, WfesError>;

impl WfesError {
    /// Hard constraint violation; cannot be forced.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::ParameterValidation {
            message: message.into(),
            overridable: false,
        }
    }

    /// Safe-range violation; can be forced.
    pub fn unsafe_range(message: impl Into<String>) -> Self {
        Self::ParameterValidation {
            message: message.into(),
            overridable: true,
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn model(message: impl Into<String>) -> Self {
        Self::Model {
            message: message.into(),
        }
    }

    pub fn solver(phase: SolverPhase, source: SolverError) -> Self {
        Self::SolverPhase { phase, source }
    }

    /// The failing phase, if this is a solver error.
    pub fn phase(&self) -> Option<SolverPhase> {
        match self {
            Self::SolverPhase { phase, .. } => Some(*phase),
            _ => None,
        }
    }

    /// Whether `force` would have let this error pass.
    pub fn is_overridable(&self) -> bool {
        matches!(
            self,
            Self::ParameterValidation {
                overridable: true,
                ..
            }
        )
    }
}
