//! Property-based agreement tests between solver backends.

use proptest::prelude::*;
use wfes_sparse::{CsrMatrix, FactorizationHints, SolveMode, SolverStrategy, SparseSolver};

/// Strategy: a diagonally dominant banded matrix (bandwidth 2) and a rhs.
fn system_strategy() -> impl Strategy<Value = (CsrMatrix, Vec<f64>)> {
    (3usize..40).prop_flat_map(|n| {
        (
            prop::collection::vec(-0.2f64..0.2, n * 5),
            prop::collection::vec(-10.0f64..10.0, n),
        )
            .prop_map(move |(band, rhs)| {
                let mut values = Vec::new();
                let mut cols = Vec::new();
                let mut offsets = vec![0];
                for row in 0..n {
                    for (k, offset) in (-2isize..=2).enumerate() {
                        let col = row as isize + offset;
                        if col < 0 || col >= n as isize {
                            continue;
                        }
                        let v = if offset == 0 { 1.0 } else { band[row * 5 + k] };
                        values.push(v);
                        cols.push(col as usize);
                    }
                    offsets.push(values.len());
                }
                (CsrMatrix::new(n, values, cols, offsets).unwrap(), rhs)
            })
    })
}

fn solve(strategy: SolverStrategy, m: &CsrMatrix, b: &[f64], mode: SolveMode) -> Vec<f64> {
    let mut backend = strategy.backend(2);
    backend.analyze(m).unwrap();
    backend
        .factorize(m, FactorizationHints { block_size: m.dim() })
        .unwrap();
    let x = backend.solve(b, mode).unwrap();
    backend.release().unwrap();
    x
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    // 1. Sparse and dense backends agree on both solve modes
    #[test]
    fn backends_agree((m, b) in system_strategy()) {
        for mode in [SolveMode::Standard, SolveMode::Transpose] {
            let sparse = solve(SolverStrategy::SparseLu, &m, &b, mode);
            let dense = solve(SolverStrategy::DenseLu, &m, &b, mode);
            for (s, d) in sparse.iter().zip(&dense) {
                prop_assert!((s - d).abs() <= 1e-9 * (1.0 + d.abs()), "{mode:?}: {s} vs {d}");
            }
        }
    }

    // 2. The solution reproduces the right-hand side
    #[test]
    fn residual_is_small((m, b) in system_strategy()) {
        for mode in [SolveMode::Standard, SolveMode::Transpose] {
            let x = solve(SolverStrategy::SparseLu, &m, &b, mode);
            let ax = m.mul_vec(&x, mode).unwrap();
            for (lhs, rhs) in ax.iter().zip(&b) {
                prop_assert!((lhs - rhs).abs() < 1e-9, "{mode:?}: {lhs} vs {rhs}");
            }
        }
    }
}
