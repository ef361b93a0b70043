use super::config::SolverConfig;
use super::session::SolverSession;
use crate::errors::{Result, SolverPhase, WfesError};
use crate::matrix::GeneratorMatrix;
use crate::model::{AlleleDynamics, ModelParameters};
use crate::statistics::{
    clamp_non_negative, clamp_probabilities, ClampSummary, SolveDiagnostics, WfStatistics,
};
use std::time::Instant;
use tracing::{debug, instrument, warn};
use wfes_sparse::{SolveMode, SparseSolver};

/// Compute absorption statistics with the backend selected in `config`.
///
/// # Errors
/// See [`solve_absorption_with`].
pub fn solve_absorption(params: &ModelParameters, config: &SolverConfig) -> Result<WfStatistics> {
    let backend = config.strategy.backend(config.refinement_steps);
    solve_absorption_with(params, config, backend)
}

/// Compute absorption statistics with a caller-supplied backend.
///
/// Builds the generator matrix, factorizes it once, then solves twice:
/// 1.  standard mode with `rhs[i] = (1 − q(i))^2N` for extinction
///     probabilities
/// 2.  transpose mode with a unit impulse at one copy for sojourn times
///
/// The backend is released exactly once, whether or not a phase fails.
///
/// # Errors
/// * [`WfesError::Configuration`] if `config` is invalid.
/// * [`WfesError::Model`] or [`WfesError::Matrix`] if the matrix cannot be
///   built.
/// * [`WfesError::SolverPhase`] tagged with the failing phase. No partial
///   statistics are returned.
#[instrument(
    name = "solve_absorption",
    skip_all,
    fields(population_size = params.population_size(), strategy = %config.strategy)
)]
pub fn solve_absorption_with<S: SparseSolver>(
    params: &ModelParameters,
    config: &SolverConfig,
    solver: S,
) -> Result<WfStatistics> {
    config.validate()?;

    let dim = params.transient_states();
    let block_size = config.resolved_block_size(dim);

    let start = Instant::now();
    let matrix = GeneratorMatrix::build(params, block_size, config.zero_threshold)?;
    debug!(
        dim,
        nnz = matrix.nnz(),
        block_size,
        elapsed = ?start.elapsed(),
        "built generator matrix"
    );

    let start = Instant::now();
    let session = SolverSession::new(solver, &matrix).analyze()?;
    debug!(elapsed = ?start.elapsed(), "symbolic factorization done");

    let start = Instant::now();
    let mut session = session.factorize()?;
    debug!(elapsed = ?start.elapsed(), "numeric factorization done");

    let start = Instant::now();
    let mut extinction = session
        .solve(&extinction_rhs(params), SolveMode::Standard)
        .map_err(|e| WfesError::solver(SolverPhase::SolveExtinction, e))?;
    let extinction_clamp = clamp_probabilities(&mut extinction);
    debug!(elapsed = ?start.elapsed(), "extinction solve done");

    let start = Instant::now();
    let mut impulse = vec![0.0; dim];
    impulse[0] = 1.0;
    let mut sojourn = session
        .solve(&impulse, SolveMode::Transpose)
        .map_err(|e| WfesError::solver(SolverPhase::SolveSojourn, e))?;
    let sojourn_clamp = clamp_non_negative(&mut sojourn);
    debug!(elapsed = ?start.elapsed(), "sojourn solve done");

    session.release()?;

    report_clamp("extinction probabilities", &extinction_clamp, config.clamp_tolerance);
    report_clamp("sojourn times", &sojourn_clamp, config.clamp_tolerance);

    let diagnostics = SolveDiagnostics {
        matrix_dim: dim,
        nonzeros: matrix.nnz(),
        block_size,
        zero_threshold: matrix.zero_threshold(),
        extinction_clamp,
        sojourn_clamp,
    };
    Ok(WfStatistics::from_vectors(extinction, sojourn, diagnostics))
}

/// One-generation extinction mass from every transient state.
fn extinction_rhs(params: &ModelParameters) -> Vec<f64> {
    let dynamics = AlleleDynamics::new(*params);
    (1..=params.transient_states())
        .map(|copies| dynamics.extinction_mass(copies))
        .collect()
}

fn report_clamp(what: &str, clamp: &ClampSummary, tolerance: f64) {
    if clamp.exceeds(tolerance) {
        warn!(
            count = clamp.count,
            max_magnitude = clamp.max_magnitude,
            "clamped {what} beyond tolerance {tolerance:e}"
        );
    } else if clamp.count > 0 {
        debug!(count = clamp.count, max_magnitude = clamp.max_magnitude, "clamped {what}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{self, Write};
    use std::sync::{Arc, Mutex};
    use wfes_sparse::{CsrMatrix, DenseLu, FactorizationHints, SolverError};

    /// Wraps a real backend and fails on request at one phase.
    struct ScriptedSolver {
        inner: DenseLu,
        fail_at: Option<SolverPhase>,
        solves: usize,
        releases: usize,
        block_size: Option<usize>,
    }

    impl ScriptedSolver {
        fn failing_at(phase: Option<SolverPhase>) -> Self {
            Self {
                inner: DenseLu::new(),
                fail_at: phase,
                solves: 0,
                releases: 0,
                block_size: None,
            }
        }

        fn check(&self, phase: SolverPhase) -> std::result::Result<(), SolverError> {
            if self.fail_at == Some(phase) {
                Err(SolverError::status(-99, format!("scripted failure in {phase}")))
            } else {
                Ok(())
            }
        }
    }

    impl SparseSolver for ScriptedSolver {
        fn analyze(&mut self, matrix: &CsrMatrix) -> std::result::Result<(), SolverError> {
            self.check(SolverPhase::Analyze)?;
            self.inner.analyze(matrix)
        }

        fn factorize(
            &mut self,
            matrix: &CsrMatrix,
            hints: FactorizationHints,
        ) -> std::result::Result<(), SolverError> {
            self.block_size = Some(hints.block_size);
            self.check(SolverPhase::Factorize)?;
            self.inner.factorize(matrix, hints)
        }

        fn solve(&mut self, rhs: &[f64], mode: SolveMode) -> std::result::Result<Vec<f64>, SolverError> {
            self.solves += 1;
            let phase = match mode {
                SolveMode::Standard => SolverPhase::SolveExtinction,
                SolveMode::Transpose => SolverPhase::SolveSojourn,
            };
            self.check(phase)?;
            self.inner.solve(rhs, mode)
        }

        fn release(&mut self) -> std::result::Result<(), SolverError> {
            self.releases += 1;
            self.check(SolverPhase::Release)?;
            self.inner.release()
        }
    }

    fn neutral(n: usize) -> ModelParameters {
        ModelParameters::new(n, 0.0, 0.0, 0.0, 0.5).unwrap()
    }

    #[test]
    fn test_each_phase_failure_is_tagged_and_released_once() {
        let params = neutral(10);
        let config = SolverConfig::default();
        for phase in [
            SolverPhase::Analyze,
            SolverPhase::Factorize,
            SolverPhase::SolveExtinction,
            SolverPhase::SolveSojourn,
            SolverPhase::Release,
        ] {
            let mut solver = ScriptedSolver::failing_at(Some(phase));
            let err = solve_absorption_with(&params, &config, &mut solver).unwrap_err();
            assert_eq!(err.phase(), Some(phase), "{err}");
            assert_eq!(solver.releases, 1, "{phase}");
        }
    }

    #[test]
    fn test_failure_before_solves_skips_them() {
        let mut solver = ScriptedSolver::failing_at(Some(SolverPhase::Factorize));
        let _ = solve_absorption_with(&neutral(5), &SolverConfig::default(), &mut solver);
        assert_eq!(solver.solves, 0);
    }

    #[test]
    fn test_success_releases_once() {
        let mut solver = ScriptedSolver::failing_at(None);
        let stats = solve_absorption_with(&neutral(10), &SolverConfig::default(), &mut solver).unwrap();
        assert_eq!(solver.releases, 1);
        assert_eq!(solver.solves, 2);
        assert!((stats.probability_extinction - 0.95).abs() < 1e-10);
    }

    #[test]
    fn test_block_size_forwarded_unchanged() {
        // N = 60 gives 119 transient states
        let mut solver = ScriptedSolver::failing_at(None);
        solve_absorption_with(&neutral(60), &SolverConfig::default(), &mut solver).unwrap();
        assert_eq!(solver.block_size, Some(11));

        let mut solver = ScriptedSolver::failing_at(None);
        let config = SolverConfig::default().with_block_size(3);
        let stats = solve_absorption_with(&neutral(60), &config, &mut solver).unwrap();
        assert_eq!(solver.block_size, Some(3));
        assert_eq!(stats.diagnostics.block_size, 3);
    }

    #[test]
    fn test_invalid_config_never_touches_solver() {
        let mut solver = ScriptedSolver::failing_at(None);
        let config = SolverConfig::default().with_zero_threshold(-1.0);
        let err = solve_absorption_with(&neutral(5), &config, &mut solver).unwrap_err();
        assert!(matches!(err, WfesError::Configuration { .. }));
        assert_eq!(solver.releases, 0);
    }

    #[test]
    fn test_extinction_rhs() {
        let params = neutral(10);
        let rhs = extinction_rhs(&params);
        assert_eq!(rhs.len(), 19);
        // (1 − k/2N)^2N, compared relative to its size
        let expected = |k: f64| (1.0 - k / 20.0).powi(20);
        assert!((rhs[0] / expected(1.0) - 1.0).abs() < 1e-12);
        assert!((rhs[18] / expected(19.0) - 1.0).abs() < 1e-12);
        assert!(rhs.windows(2).all(|w| w[0] > w[1]));
    }

    /// Delegates to a real backend, then pushes the last entry of every
    /// solution below zero.
    struct NoisySolver {
        inner: DenseLu,
        noise: f64,
    }

    impl SparseSolver for NoisySolver {
        fn analyze(&mut self, matrix: &CsrMatrix) -> std::result::Result<(), SolverError> {
            self.inner.analyze(matrix)
        }

        fn factorize(
            &mut self,
            matrix: &CsrMatrix,
            hints: FactorizationHints,
        ) -> std::result::Result<(), SolverError> {
            self.inner.factorize(matrix, hints)
        }

        fn solve(&mut self, rhs: &[f64], mode: SolveMode) -> std::result::Result<Vec<f64>, SolverError> {
            let mut x = self.inner.solve(rhs, mode)?;
            if let Some(last) = x.last_mut() {
                *last = -self.noise;
            }
            Ok(x)
        }

        fn release(&mut self) -> std::result::Result<(), SolverError> {
            self.inner.release()
        }
    }

    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Solve with a [`NoisySolver`] and return the statistics and warnings.
    fn solve_with_noise(noise: f64) -> (WfStatistics, String) {
        let logs = LogBuffer::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::WARN)
            .finish();
        let solver = NoisySolver {
            inner: DenseLu::new(),
            noise,
        };
        let stats = tracing::subscriber::with_default(subscriber, || {
            solve_absorption_with(&neutral(10), &SolverConfig::default(), solver)
        })
        .unwrap();
        let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        (stats, output)
    }

    #[test]
    fn test_clamping_beyond_tolerance_warns() {
        let (stats, logs) = solve_with_noise(1e-6);
        let diagnostics = &stats.diagnostics;
        assert_eq!(diagnostics.extinction_clamp.count, 1);
        assert_eq!(diagnostics.extinction_clamp.max_magnitude, 1e-6);
        assert_eq!(diagnostics.sojourn_clamp.count, 1);
        assert_eq!(diagnostics.sojourn_clamp.max_magnitude, 1e-6);
        assert_eq!(stats.extinction_probabilities[18], 0.0);
        assert_eq!(stats.sojourn_times[18], 0.0);
        assert!(logs.contains("clamped extinction probabilities beyond tolerance"), "{logs}");
        assert!(logs.contains("clamped sojourn times beyond tolerance"), "{logs}");
    }

    #[test]
    fn test_clamping_within_tolerance_is_quiet() {
        let (stats, logs) = solve_with_noise(1e-12);
        assert_eq!(stats.diagnostics.extinction_clamp.count, 1);
        assert_eq!(stats.diagnostics.sojourn_clamp.count, 1);
        assert!(!stats.diagnostics.extinction_clamp.exceeds(1e-8));
        assert!(!logs.contains("beyond tolerance"), "{logs}");
    }
}
