//! One-sided Jacobi SVD
//!
//! Hestenes' method: plane rotations are applied from the right until all
//! pairs of columns are numerically orthogonal. The column norms are then the
//! singular values. Unlike bidiagonalisation-based methods this computes
//! small singular values to high *relative* accuracy, which is what the
//! truncated expansions built on top of this crate rely on.

use crate::precision::Precision;
use crate::tsvd::TSVDError;
use crate::utils::{dot, eye, norm_2};
use ndarray::{Array1, Array2};

/// Result of SVD decomposition, A = U diag(s) V^T
#[derive(Debug, Clone)]
pub struct SVDResult<T: Precision> {
    /// Left singular vectors (m × k)
    pub u: Array2<T>,
    /// Singular values (k), non-increasing
    pub s: Array1<T>,
    /// Right singular vectors (n × k)
    pub v: Array2<T>,
    /// Effective rank
    pub rank: usize,
}

/// Rotation (c, s) annihilating the off-diagonal entry of the 2×2 Gram
/// matrix [[alpha, gamma], [gamma, beta]].
fn jacobi_rotation<T: Precision>(alpha: T, beta: T, gamma: T) -> (T, T) {
    let one = T::one();
    let zeta = (beta - alpha) / (T::from_f64(2.0) * gamma);
    let abs_zeta = Precision::abs(zeta);
    let root = if abs_zeta < one {
        Precision::sqrt(one + zeta * zeta)
    } else {
        let inv = one / zeta;
        abs_zeta * Precision::sqrt(one + inv * inv)
    };
    let t = one / (abs_zeta + root);
    let t = if zeta < T::zero() { -t } else { t };
    let c = one / Precision::sqrt(one + t * t);
    (c, c * t)
}

/// Rotate columns p and q of `a`: (a_p, a_q) <- (c a_p - s a_q, s a_p + c a_q)
fn apply_rotation<T: Precision>(a: &mut Array2<T>, p: usize, q: usize, c: T, s: T) {
    for i in 0..a.nrows() {
        let ap = a[[i, p]];
        let aq = a[[i, q]];
        a[[i, p]] = c * ap - s * aq;
        a[[i, q]] = s * ap + c * aq;
    }
}

/// Compute the thin SVD of an m × n matrix by one-sided Jacobi rotations
///
/// Singular values are returned in non-increasing order. Columns of U that
/// belong to exactly zero singular values are left as zero vectors.
///
/// # Errors
/// [`TSVDError::ConvergenceFailed`] if some pair of columns is still not
/// orthogonal after `max_sweeps` sweeps.
pub fn jacobi_svd<T: Precision>(
    matrix: &Array2<T>,
    max_sweeps: usize,
) -> Result<SVDResult<T>, TSVDError> {
    let (m, n) = matrix.dim();
    let mut g = matrix.clone();
    let mut v = eye::<T>(n, n);
    let tol = T::from_f64(2.0 * m.max(1) as f64) * T::epsilon();

    let mut converged = n < 2;
    for _ in 0..max_sweeps {
        let mut rotated = false;
        for p in 0..n {
            for q in (p + 1)..n {
                let gamma = dot(g.column(p), g.column(q));
                if gamma == T::zero() {
                    continue;
                }
                let alpha = dot(g.column(p), g.column(p));
                let beta = dot(g.column(q), g.column(q));
                let scale = Precision::sqrt(alpha) * Precision::sqrt(beta);
                if Precision::abs(gamma) <= tol * scale {
                    continue;
                }

                let (c, s) = jacobi_rotation(alpha, beta, gamma);
                if s == T::zero() {
                    continue;
                }
                apply_rotation(&mut g, p, q, c, s);
                apply_rotation(&mut v, p, q, c, s);
                rotated = true;
            }
        }
        if !rotated {
            converged = true;
            break;
        }
    }
    if !converged {
        return Err(TSVDError::ConvergenceFailed { sweeps: max_sweeps });
    }

    let norms: Vec<T> = (0..n).map(|j| norm_2(g.column(j))).collect();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| {
        norms[b]
            .partial_cmp(&norms[a])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let k = m.min(n);
    let mut u_out = Array2::from_elem((m, k), T::zero());
    let mut v_out = Array2::from_elem((n, k), T::zero());
    let mut s_out = Array1::from_elem(k, T::zero());
    for (dst, &src) in order.iter().take(k).enumerate() {
        let sigma = norms[src];
        s_out[dst] = sigma;
        for j in 0..n {
            v_out[[j, dst]] = v[[j, src]];
        }
        if sigma > T::zero() {
            for i in 0..m {
                u_out[[i, dst]] = g[[i, src]] / sigma;
            }
        }
    }
    let rank = s_out.iter().filter(|&&x| x > T::zero()).count();

    Ok(SVDResult {
        u: u_out,
        s: s_out,
        v: v_out,
        rank,
    })
}
