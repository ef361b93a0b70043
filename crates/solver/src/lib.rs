//! # Wright-Fisher Exact Solver
//!
//! The `wfes-solver` crate computes absorption statistics for a single-locus,
//! two-allele Wright-Fisher population under selection, dominance, and
//! two-way mutation, without simulation.
//!
//! It builds the transient-state generator matrix `I − Q` of the Markov
//! chain, factorizes it once through a [`wfes_sparse::SparseSolver`] backend,
//! and solves it twice: once for the probability of extinction from every
//! starting state, once (transposed) for the expected number of generations
//! spent in every state after starting from a single copy.
//!
//! ```no_run
//! use wfes_solver::prelude::*;
//!
//! let params = ModelParameters::builder()
//!     .population_size(100)
//!     .selection(0.01)
//!     .mutation_rates(1e-7, 1e-7)
//!     .dominance(0.5)
//!     .build()
//!     .unwrap();
//!
//! let stats = solve_absorption(&params, &SolverConfig::default()).unwrap();
//! println!("P(fixation) = {}", stats.probability_fixation);
//! ```

pub mod errors;
pub mod matrix;
pub mod model;
pub mod prelude;
pub mod solve;
pub mod statistics;

pub use errors::{Result, SolverPhase, WfesError};
pub use matrix::GeneratorMatrix;
pub use model::{AlleleDynamics, ModelParameters};
pub use solve::{solve_absorption, solve_absorption_with, SolverConfig};
pub use statistics::{SummaryRecord, WfStatistics};
