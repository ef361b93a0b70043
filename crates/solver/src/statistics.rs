//! Absorption statistics derived from the two solves.
//!
//! All vectors are indexed by transient state: index `k` is `k + 1` copies.
//! Index 0, a single new copy of `A`, is the starting state for every scalar
//! summary.

use crate::model::ModelParameters;
use serde::Serialize;

/// Count and largest magnitude of values forced back into range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ClampSummary {
    pub count: usize,
    pub max_magnitude: f64,
}

impl ClampSummary {
    fn record(&mut self, magnitude: f64) {
        self.count += 1;
        self.max_magnitude = self.max_magnitude.max(magnitude);
    }

    /// Whether any clamped value was further out of range than `tolerance`.
    pub fn exceeds(&self, tolerance: f64) -> bool {
        self.max_magnitude > tolerance
    }
}

/// Clamp probabilities into [0, 1].
pub fn clamp_probabilities(values: &mut [f64]) -> ClampSummary {
    let mut summary = ClampSummary::default();
    for v in values.iter_mut() {
        if *v < 0.0 {
            summary.record(-*v);
            *v = 0.0;
        } else if *v > 1.0 {
            summary.record(*v - 1.0);
            *v = 1.0;
        }
    }
    summary
}

/// Clamp negative values to zero.
pub fn clamp_non_negative(values: &mut [f64]) -> ClampSummary {
    let mut summary = ClampSummary::default();
    for v in values.iter_mut().filter(|v| **v < 0.0) {
        summary.record(-*v);
        *v = 0.0;
    }
    summary
}

/// Facts about how a set of statistics was computed.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SolveDiagnostics {
    pub matrix_dim: usize,
    pub nonzeros: usize,
    pub block_size: usize,
    pub zero_threshold: f64,
    pub extinction_clamp: ClampSummary,
    pub sojourn_clamp: ClampSummary,
}

/// Absorption statistics for one parameter set.
#[derive(Debug, Clone, Serialize)]
pub struct WfStatistics {
    /// Probability of eventual extinction from each state (B1).
    pub extinction_probabilities: Vec<f64>,
    /// Probability of eventual fixation from each state (B2 = 1 − B1).
    pub fixation_probabilities: Vec<f64>,
    /// Expected generations spent in each state, starting from one copy.
    pub sojourn_times: Vec<f64>,
    pub probability_extinction: f64,
    pub probability_fixation: f64,
    /// Expected time to extinction, conditional on extinction.
    pub time_extinction: f64,
    /// Expected time to fixation, conditional on fixation.
    pub time_fixation: f64,
    /// Expected number of allele copies summed over the generations before
    /// extinction, conditional on extinction.
    pub count_before_extinction: f64,
    pub diagnostics: SolveDiagnostics,
}

impl WfStatistics {
    /// Reduce clamped solve outputs to statistics.
    ///
    /// `extinction` must already lie in [0, 1] and `sojourn` be non-negative;
    /// both must have the same non-zero length. Fixation probabilities are
    /// computed here as `1 − B1`.
    ///
    /// A zero probability of extinction (or fixation) from the starting state
    /// is reported as 0 with a NaN conditional time.
    pub fn from_vectors(
        extinction: Vec<f64>,
        sojourn: Vec<f64>,
        diagnostics: SolveDiagnostics,
    ) -> Self {
        debug_assert_eq!(extinction.len(), sojourn.len());
        let fixation: Vec<f64> = extinction.iter().map(|b1| 1.0 - b1).collect();

        let b1 = extinction.first().copied().unwrap_or(0.0);
        let b2 = fixation.first().copied().unwrap_or(0.0);

        let weighted = |weights: &[f64]| -> f64 {
            weights.iter().zip(&sojourn).map(|(w, n)| w * n).sum()
        };

        let (probability_extinction, time_extinction, count_before_extinction) = if b1 > 0.0 {
            let copies: f64 = extinction
                .iter()
                .zip(&sojourn)
                .enumerate()
                .map(|(k, (b, n))| n * b * (k + 1) as f64)
                .sum();
            (b1, weighted(&extinction) / b1, copies / b1)
        } else {
            (0.0, f64::NAN, f64::NAN)
        };

        let (probability_fixation, time_fixation) = if b2 > 0.0 {
            (b2, weighted(&fixation) / b2)
        } else {
            (0.0, f64::NAN)
        };

        Self {
            extinction_probabilities: extinction,
            fixation_probabilities: fixation,
            sojourn_times: sojourn,
            probability_extinction,
            probability_fixation,
            time_extinction,
            time_fixation,
            count_before_extinction,
            diagnostics,
        }
    }

    /// Scalar summary paired with the parameters it was computed for.
    pub fn summary(&self, params: &ModelParameters) -> SummaryRecord {
        SummaryRecord {
            population_size: params.population_size(),
            selection: params.selection(),
            forward_mutation: params.forward_mutation(),
            backward_mutation: params.backward_mutation(),
            dominance: params.dominance(),
            probability_extinction: self.probability_extinction,
            probability_fixation: self.probability_fixation,
            time_extinction: self.time_extinction,
            time_fixation: self.time_fixation,
            count_before_extinction: self.count_before_extinction,
        }
    }
}

/// One summary line: `N, s, u, v, h, pe, pf, te, tf, cbe`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SummaryRecord {
    pub population_size: usize,
    pub selection: f64,
    pub forward_mutation: f64,
    pub backward_mutation: f64,
    pub dominance: f64,
    pub probability_extinction: f64,
    pub probability_fixation: f64,
    pub time_extinction: f64,
    pub time_fixation: f64,
    pub count_before_extinction: f64,
}

impl SummaryRecord {
    /// The record's fields in output order, after the population size.
    pub fn values(&self) -> [f64; 9] {
        [
            self.selection,
            self.forward_mutation,
            self.backward_mutation,
            self.dominance,
            self.probability_extinction,
            self.probability_fixation,
            self.time_extinction,
            self.time_fixation,
            self.count_before_extinction,
        ]
    }
}
