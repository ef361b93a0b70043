//! Shared default values for the command-line options.

pub const ZERO_THRESHOLD: &str = "1e-30";
pub const SOLVER: &str = "sparse-lu";
