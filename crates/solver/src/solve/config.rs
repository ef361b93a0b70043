use crate::errors::{Result, WfesError};
use crate::matrix::block_size_for;
use serde::{Deserialize, Serialize};
use wfes_sparse::SolverStrategy;

/// Default numeric-zero threshold for transition mass.
pub const DEFAULT_ZERO_THRESHOLD: f64 = 1e-30;

/// Default clamped magnitude above which a warning is logged.
pub const DEFAULT_CLAMP_TOLERANCE: f64 = 1e-8;

/// Settings for one absorption solve.
/// Can be deserialized from a file; omitted fields take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Transition mass at or below this value is dropped from the matrix
    pub zero_threshold: f64,
    /// Overrides the block size heuristic when set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_size: Option<usize>,
    /// Factorization backend
    pub strategy: SolverStrategy,
    /// Iterative refinement rounds after each sparse LU solve
    pub refinement_steps: usize,
    /// Largest clamped magnitude accepted without a warning
    pub clamp_tolerance: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            zero_threshold: DEFAULT_ZERO_THRESHOLD,
            block_size: None,
            strategy: SolverStrategy::default(),
            refinement_steps: 2,
            clamp_tolerance: DEFAULT_CLAMP_TOLERANCE,
        }
    }
}

impl SolverConfig {
    pub fn with_zero_threshold(mut self, threshold: f64) -> Self {
        self.zero_threshold = threshold;
        self
    }

    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = Some(block_size);
        self
    }

    pub fn with_strategy(mut self, strategy: SolverStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_refinement_steps(mut self, steps: usize) -> Self {
        self.refinement_steps = steps;
        self
    }

    pub fn with_clamp_tolerance(mut self, tolerance: f64) -> Self {
        self.clamp_tolerance = tolerance;
        self
    }

    /// Check every field.
    ///
    /// # Errors
    /// Returns [`WfesError::Configuration`] naming the first invalid field.
    pub fn validate(&self) -> Result<()> {
        if !self.zero_threshold.is_finite() || !(0.0..1.0).contains(&self.zero_threshold) {
            return Err(WfesError::config(format!(
                "zero_threshold must be finite and in [0, 1) (got {})",
                self.zero_threshold
            )));
        }
        if self.block_size == Some(0) {
            return Err(WfesError::config("block_size must be at least 1"));
        }
        if !self.clamp_tolerance.is_finite() || self.clamp_tolerance < 0.0 {
            return Err(WfesError::config(format!(
                "clamp_tolerance must be finite and non-negative (got {})",
                self.clamp_tolerance
            )));
        }
        Ok(())
    }

    /// Block size for a matrix of dimension `dim`: the override if set,
    /// the heuristic otherwise.
    pub fn resolved_block_size(&self, dim: usize) -> usize {
        self.block_size.unwrap_or_else(|| block_size_for(dim))
    }
}
