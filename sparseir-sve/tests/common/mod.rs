//! Common test utilities
#![allow(dead_code)]

use sparseir_sve::{PiecewiseLegendrePolyVector, SVEResult};

/// Simple deterministic pseudo-random number generator (LCG)
///
/// Uses the common parameters: a = 1664525, c = 1013904223 (from Numerical Recipes)
pub struct SimpleRng {
    state: u64,
}

impl SimpleRng {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    /// Next f64 in [0, 1)
    pub fn next_f64(&mut self) -> f64 {
        self.state = self.state.wrapping_mul(1664525).wrapping_add(1013904223);
        ((self.state >> 16) as f64) / ((1u64 << 48) as f64)
    }

    /// Next f64 in [lo, hi)
    pub fn uniform(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }
}

/// Largest deviation of the Gram matrix of `polys` from the identity
pub fn orthonormality_error(polys: &PiecewiseLegendrePolyVector<f64>) -> f64 {
    let gram = polys.overlap_matrix(polys).expect("overlap on a shared domain");
    let mut err: f64 = 0.0;
    for ((i, j), &g) in gram.indexed_iter() {
        let expected = if i == j { 1.0 } else { 0.0 };
        err = err.max((g - expected).abs());
    }
    err
}

/// Σ_l s[l] u[l](x) v[l](y)
pub fn reconstruct(result: &SVEResult<f64>, x: f64, y: f64) -> f64 {
    let u = result.u.evaluate_at(x);
    let v = result.v.evaluate_at(y);
    (0..result.s.len()).map(|l| result.s[l] * u[l] * v[l]).sum()
}

/// Assert singular values are positive and non-increasing
pub fn assert_non_increasing(s: &[f64]) {
    assert!(!s.is_empty());
    assert!(s.iter().all(|&x| x > 0.0), "non-positive singular value in {s:?}");
    for pair in s.windows(2) {
        assert!(pair[0] >= pair[1], "singular values not sorted: {pair:?}");
    }
}
