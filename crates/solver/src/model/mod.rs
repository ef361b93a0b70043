//! Population model: parameters and the one-generation transition law.

pub mod dynamics;
pub mod parameters;

pub use dynamics::AlleleDynamics;
pub use parameters::{ModelParameters, ModelParametersBuilder, MAX_SAFE_POPULATION_SIZE};
