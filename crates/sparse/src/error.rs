use thiserror::Error;

/// Error type for solver backend operations.
///
/// Every variant maps to a nonzero status code through [`SolverError::code`],
/// so callers that only care about success/failure can treat the error as an
/// opaque status.
#[derive(Debug, Error)]
pub enum SolverError {
    /// The backend reported a failure with its own status code.
    #[error("solver status {code}: {message}")]
    Status { code: i64, message: String },

    /// A call was made out of order (e.g. `factorize` before `analyze`).
    #[error("invalid call order: {0}")]
    InvalidPhase(&'static str),

    /// The matrix or a right-hand side has the wrong length.
    #[error("dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch { expected: usize, found: usize },

    /// Numeric factorization hit a zero pivot.
    #[error("matrix is numerically singular at column {0}")]
    Singular(usize),

    /// The CSR arrays do not describe a valid matrix.
    #[error("malformed matrix: {0}")]
    Malformed(String),
}

impl SolverError {
    pub fn status(code: i64, message: impl Into<String>) -> Self {
        Self::Status {
            code,
            message: message.into(),
        }
    }

    /// Nonzero status code for this error.
    pub fn code(&self) -> i64 {
        match self {
            Self::Status { code, .. } => *code,
            Self::InvalidPhase(_) => -1,
            Self::DimensionMismatch { .. } => -2,
            Self::Singular(_) => -4,
            Self::Malformed(_) => -5,
        }
    }
}
