//! Solve orchestration: configuration, the typed solver session, and the
//! two-solve driver that turns a model into [`WfStatistics`].
//!
//! [`WfStatistics`]: crate::statistics::WfStatistics

mod config;
mod orchestrator;
pub mod session;

pub use config::{SolverConfig, DEFAULT_CLAMP_TOLERANCE, DEFAULT_ZERO_THRESHOLD};
pub use orchestrator::{solve_absorption, solve_absorption_with};
pub use session::SolverSession;
