//! Householder reflection utilities for QR decomposition

use crate::precision::Precision;
use crate::utils::norm_2;
use ndarray::{ArrayView1, ArrayViewMut1, ArrayViewMut2};

/// Compute Householder reflection vector and coefficient in place
///
/// Given a vector x, computes H = I - τvv^T with v = [1, x[1..]] such that
/// Hx = [β, 0, ..., 0]^T where β = -sign(x0)·||x||. On return `x[0]` holds β
/// and `x[1..]` holds the tail of v.
///
/// Returns (τ, β). A zero vector yields τ = 0, i.e. H = I.
pub fn reflector<T: Precision>(mut x: ArrayViewMut1<T>) -> (T, T) {
    let n = x.len();
    if n == 0 {
        return (T::zero(), T::zero());
    }

    let norm_x = norm_2(x.view());
    if norm_x == T::zero() {
        return (T::zero(), T::zero());
    }

    let x0 = x[0];
    let nu = if x0 >= T::zero() { norm_x } else { -norm_x };
    let xi1 = x0 + nu;
    x[0] = -nu;
    for i in 1..n {
        x[i] = x[i] / xi1;
    }

    (xi1 / nu, -nu)
}

/// Apply H = I - τvv^T from the left to every column of `a`
///
/// `v[0]` is ignored and taken to be one, matching the packed storage
/// produced by [`reflector`].
pub fn reflector_apply<T: Precision>(v: ArrayView1<T>, tau: T, mut a: ArrayViewMut2<T>) {
    let (m, n) = a.dim();
    if m == 0 || n == 0 || tau == T::zero() {
        return;
    }
    debug_assert_eq!(v.len(), m);

    for j in 0..n {
        let mut vaj = a[[0, j]];
        for i in 1..m {
            vaj = vaj + v[i] * a[[i, j]];
        }
        vaj = tau * vaj;

        a[[0, j]] = a[[0, j]] - vaj;
        for i in 1..m {
            a[[i, j]] = a[[i, j]] - vaj * v[i];
        }
    }
}
