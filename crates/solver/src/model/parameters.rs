//! Model parameters and their validation.

use crate::errors::{Result, WfesError};
use serde::Deserialize;

/// Largest population size accepted without `force`.
pub const MAX_SAFE_POPULATION_SIZE: usize = 500_000;

/// Parameters of a single-locus, two-allele Wright-Fisher model.
///
/// Allele `A` is the focal allele. Genotype fitnesses are `AA = 1 + s`,
/// `Aa = 1 + h·s` and `aa = 1`.
///
/// Values are immutable once built; every constructor validates them,
/// deserialization included.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(try_from = "ParameterFile")]
pub struct ModelParameters {
    population_size: usize,
    selection: f64,
    forward_mutation: f64,
    backward_mutation: f64,
    dominance: f64,
}

impl ModelParameters {
    /// Create parameters with the default (non-forced) validation.
    ///
    /// # Arguments
    /// * `population_size` - Diploid population size `N` (≥ 2)
    /// * `selection` - Selection coefficient `s` (≥ −1)
    /// * `forward_mutation` - Mutation rate `u` from `A` to `a`
    /// * `backward_mutation` - Mutation rate `v` from `a` to `A`
    /// * `dominance` - Dominance coefficient `h` in [0, 1]
    ///
    /// # Errors
    /// Returns [`WfesError::ParameterValidation`] if a value is out of range.
    pub fn new(
        population_size: usize,
        selection: f64,
        forward_mutation: f64,
        backward_mutation: f64,
        dominance: f64,
    ) -> Result<Self> {
        Self::builder()
            .population_size(population_size)
            .selection(selection)
            .mutation_rates(forward_mutation, backward_mutation)
            .dominance(dominance)
            .build()
    }

    pub fn builder() -> ModelParametersBuilder {
        ModelParametersBuilder::new()
    }

    pub fn population_size(&self) -> usize {
        self.population_size
    }

    pub fn selection(&self) -> f64 {
        self.selection
    }

    pub fn forward_mutation(&self) -> f64 {
        self.forward_mutation
    }

    pub fn backward_mutation(&self) -> f64 {
        self.backward_mutation
    }

    pub fn dominance(&self) -> f64 {
        self.dominance
    }

    /// Number of allele copies in the population (`2N`).
    pub fn copies(&self) -> usize {
        2 * self.population_size
    }

    /// Number of transient states (`2N − 1`).
    pub fn transient_states(&self) -> usize {
        self.copies() - 1
    }

    /// Largest mutation rate compatible with the Wright-Fisher assumptions.
    pub fn max_safe_mutation_rate(&self) -> f64 {
        1.0 / self.copies() as f64
    }

    fn check_hard_constraints(&self) -> Result<()> {
        if self.population_size < 2 {
            return Err(WfesError::invalid(format!(
                "population size must be at least 2 (got {})",
                self.population_size
            )));
        }
        if !self.selection.is_finite() || self.selection < -1.0 {
            return Err(WfesError::invalid(format!(
                "selection coefficient must be finite and >= -1 (got {})",
                self.selection
            )));
        }
        if !(0.0..=1.0).contains(&self.dominance) {
            return Err(WfesError::invalid(format!(
                "dominance coefficient must be between 0.0 and 1.0 (got {})",
                self.dominance
            )));
        }
        for (name, rate) in [
            ("forward", self.forward_mutation),
            ("backward", self.backward_mutation),
        ] {
            if !(0.0..=1.0).contains(&rate) {
                return Err(WfesError::invalid(format!(
                    "{name} mutation rate must be between 0.0 and 1.0 (got {rate})"
                )));
            }
        }
        Ok(())
    }

    /// Check the safe operating range: population size and mutation rates
    /// for which the computation is tractable and the model assumptions hold.
    ///
    /// # Errors
    /// Returns an overridable [`WfesError::ParameterValidation`].
    pub fn check_safe_range(&self) -> Result<()> {
        if self.population_size > MAX_SAFE_POPULATION_SIZE {
            return Err(WfesError::unsafe_range(format!(
                "population size {} is too large (max {MAX_SAFE_POPULATION_SIZE}); \
                 the computation might take a very long time",
                self.population_size
            )));
        }
        let max_rate = self.max_safe_mutation_rate();
        if self.forward_mutation > max_rate || self.backward_mutation > max_rate {
            return Err(WfesError::unsafe_range(format!(
                "mutation rates above 1/2N = {max_rate} might violate the Wright-Fisher assumptions"
            )));
        }
        Ok(())
    }
}

/// Serialized form of [`ModelParameters`]. Only reachable through
/// `TryFrom`, which runs the builder's validation.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ParameterFile {
    population_size: usize,
    #[serde(default)]
    selection: f64,
    #[serde(default)]
    forward_mutation: f64,
    #[serde(default)]
    backward_mutation: f64,
    #[serde(default = "default_dominance")]
    dominance: f64,
    #[serde(default)]
    force: bool,
}

fn default_dominance() -> f64 {
    0.5
}

impl TryFrom<ParameterFile> for ModelParameters {
    type Error = WfesError;

    fn try_from(raw: ParameterFile) -> Result<Self> {
        Self::builder()
            .population_size(raw.population_size)
            .selection(raw.selection)
            .mutation_rates(raw.forward_mutation, raw.backward_mutation)
            .dominance(raw.dominance)
            .force(raw.force)
            .build()
    }
}

/// Builder for [`ModelParameters`].
///
/// Defaults: no selection, no mutation, additive dominance (`h = 0.5`).
/// The population size is required.
///
/// # Examples
///
/// ```
/// use wfes_solver::model::ModelParameters;
///
/// let params = ModelParameters::builder()
///     .population_size(1000)
///     .selection(-0.001)
///     .build()
///     .unwrap();
/// assert_eq!(params.dominance(), 0.5);
///
/// // Mutation faster than 1/2N needs force
/// let rejected = ModelParameters::builder()
///     .population_size(10)
///     .mutation_rates(0.1, 0.0)
///     .build();
/// assert!(rejected.is_err());
///
/// let forced = ModelParameters::builder()
///     .population_size(10)
///     .mutation_rates(0.1, 0.0)
///     .force(true)
///     .build();
/// assert!(forced.is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct ModelParametersBuilder {
    population_size: Option<usize>,
    selection: f64,
    forward_mutation: f64,
    backward_mutation: f64,
    dominance: f64,
    force: bool,
}

impl Default for ModelParametersBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelParametersBuilder {
    pub fn new() -> Self {
        Self {
            population_size: None,
            selection: 0.0,
            forward_mutation: 0.0,
            backward_mutation: 0.0,
            dominance: 0.5,
            force: false,
        }
    }

    /// Set the population size `N` (required).
    pub fn population_size(mut self, size: usize) -> Self {
        self.population_size = Some(size);
        self
    }

    pub fn selection(mut self, s: f64) -> Self {
        self.selection = s;
        self
    }

    /// Set forward (`A → a`) and backward (`a → A`) mutation rates.
    pub fn mutation_rates(mut self, forward: f64, backward: f64) -> Self {
        self.forward_mutation = forward;
        self.backward_mutation = backward;
        self
    }

    pub fn dominance(mut self, h: f64) -> Self {
        self.dominance = h;
        self
    }

    /// Skip the safe-operating-range checks. Hard constraints still apply.
    pub fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    pub fn build(self) -> Result<ModelParameters> {
        let population_size = self
            .population_size
            .ok_or_else(|| WfesError::invalid("population size is required"))?;

        let params = ModelParameters {
            population_size,
            selection: self.selection,
            forward_mutation: self.forward_mutation,
            backward_mutation: self.backward_mutation,
            dominance: self.dominance,
        };
        params.check_hard_constraints()?;
        if !self.force {
            params.check_safe_range()?;
        }
        Ok(params)
    }
}
