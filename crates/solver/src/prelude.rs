//! Commonly used imports for convenience.
//!
//! ```
//! use wfes_solver::prelude::*;
//!
//! let params = ModelParameters::new(10, 0.0, 0.0, 0.0, 0.5).unwrap();
//! assert_eq!(params.transient_states(), 19);
//! ```

pub use crate::errors::{self, SolverPhase, WfesError};
pub use crate::matrix::GeneratorMatrix;
pub use crate::model::{AlleleDynamics, ModelParameters};
pub use crate::solve::{solve_absorption, solve_absorption_with, SolverConfig};
pub use crate::statistics::{SummaryRecord, WfStatistics};
pub use wfes_sparse::SolverStrategy;
