//! One-generation allele dynamics: selection, dominance, mutation, drift.
//!
//! A generation maps the current allele-`A` copy count `i` (out of `2N`) to
//! an expected post-selection, post-mutation frequency `q(i)`. The next
//! generation is then a binomial sample of `2N` gametes with success
//! probability `q(i)`:
//!
//! - **Selection**: genotype fitnesses `AA = 1 + s`, `Aa = 1 + h·s`, `aa = 1`
//!   under Hardy-Weinberg proportions
//! - **Mutation**: `A → a` at rate `u`, `a → A` at rate `v`, applied after
//!   selection
//! - **Drift**: `Binomial(2N, q(i))`

use crate::errors::{Result, WfesError};
use crate::model::ModelParameters;
use statrs::distribution::{Binomial, Discrete};

/// Evaluates the one-generation transition law of a [`ModelParameters`].
#[derive(Debug, Clone, Copy)]
pub struct AlleleDynamics {
    params: ModelParameters,
}

impl AlleleDynamics {
    pub fn new(params: ModelParameters) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &ModelParameters {
        &self.params
    }

    /// Expected frequency of `A` after selection and mutation, starting from
    /// `copies` copies of `A` out of `2N`.
    ///
    /// Defined for `copies` in `0..=2N`. Non-decreasing in `s` for fixed
    /// frequency, always within [0, 1], and equal to `copies / 2N` when
    /// `s = u = v = 0`.
    pub fn sampling_coefficient(&self, copies: usize) -> f64 {
        let total = self.params.copies() as f64;
        let p = copies as f64 / total;
        let q = 1.0 - p;

        let s = self.params.selection();
        let p_sel = if s == 0.0 || p == 0.0 {
            p
        } else {
            let w_aa = 1.0 + s;
            let w_het = 1.0 + self.params.dominance() * s;
            let a_share = p * p * w_aa + p * q * w_het;
            let mean_fitness = a_share + p * q * w_het + q * q;
            a_share / mean_fitness
        };

        let u = self.params.forward_mutation();
        let v = self.params.backward_mutation();
        ((1.0 - u) * p_sel + v * (1.0 - p_sel)).clamp(0.0, 1.0)
    }

    /// Probability mass over next-generation copy counts `0..=2N`, starting
    /// from `copies` copies.
    ///
    /// # Errors
    /// Returns [`WfesError::Model`] if the binomial law cannot be built.
    pub fn transition_row(&self, copies: usize) -> Result<Vec<f64>> {
        let trials = self.params.copies() as u64;
        let q = self.sampling_coefficient(copies);
        let binomial = Binomial::new(q, trials)
            .map_err(|e| WfesError::model(format!("binomial({trials}, {q}): {e}")))?;
        Ok((0..=trials).map(|j| binomial.pmf(j)).collect())
    }

    /// Probability that a population at `copies` loses `A` in one generation,
    /// `(1 − q)^2N`.
    pub fn extinction_mass(&self, copies: usize) -> f64 {
        let q = self.sampling_coefficient(copies);
        (1.0 - q).powf(self.params.copies() as f64)
    }
}
