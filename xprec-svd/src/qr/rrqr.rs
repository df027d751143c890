//! Rank-Revealing QR with Column Pivoting (RRQR)

use super::householder::{reflector, reflector_apply};
use crate::precision::Precision;
use crate::utils::norm_2;
use ndarray::{s, Array2};

/// Result of QR factorization with column pivoting, A[:, jpvt] = Q R
#[derive(Debug, Clone)]
pub struct QRPivoted<T: Precision> {
    /// Packed QR factorization: R on and above the diagonal, reflectors below
    pub factors: Array2<T>,
    /// Householder reflection coefficients
    pub taus: Vec<T>,
    /// Column pivot indices
    pub jpvt: Vec<usize>,
}

/// Rank-Revealing QR with Column Pivoting
///
/// Householder QR with greedy column pivoting and LAPACK-style downdating
/// of the partial column norms. Elimination stops as soon as a diagonal
/// element of R falls below `rtol * |R[0, 0]|`, or after `max_rank` steps.
///
/// # Returns
/// The packed factorization and the effective numerical rank `k`. Only the
/// first `k` reflectors and rows of R are meaningful.
pub fn rrqr<T: Precision>(
    mut a: Array2<T>,
    rtol: T,
    max_rank: Option<usize>,
) -> (QRPivoted<T>, usize) {
    let (m, n) = a.dim();
    let k = m.min(n);
    let kmax = max_rank.map_or(k, |r| r.min(k));

    let mut jpvt: Vec<usize> = (0..n).collect();
    let mut taus = vec![T::zero(); k];
    let mut xnorms: Vec<T> = (0..n).map(|j| norm_2(a.column(j))).collect();
    let mut pnorms = xnorms.clone();
    let sqrteps = Precision::sqrt(T::epsilon());

    let mut rank = kmax;
    for i in 0..kmax {
        let pvt = (i + 1..n).fold(i, |best, j| if pnorms[j] > pnorms[best] { j } else { best });
        if pvt != i {
            jpvt.swap(i, pvt);
            xnorms.swap(i, pvt);
            pnorms.swap(i, pvt);
            for row in 0..m {
                a.swap((row, i), (row, pvt));
            }
        }

        let (tau, _) = reflector(a.slice_mut(s![i.., i]));
        taus[i] = tau;
        if i + 1 < n {
            let (v, rest) = a.multi_slice_mut((s![i.., i], s![i.., i + 1..]));
            reflector_apply(v.view(), tau, rest);
        }

        for j in (i + 1)..n {
            if pnorms[j] == T::zero() {
                continue;
            }
            let ratio = Precision::abs(a[[i, j]]) / pnorms[j];
            let temp = Precision::max((T::one() + ratio) * (T::one() - ratio), T::zero());
            let scaled = pnorms[j] / xnorms[j];
            if temp * scaled * scaled <= sqrteps {
                let recomputed = norm_2(a.slice(s![i + 1.., j]));
                pnorms[j] = recomputed;
                xnorms[j] = recomputed;
            } else {
                pnorms[j] = pnorms[j] * Precision::sqrt(temp);
            }
        }

        let diag = Precision::abs(a[[i, i]]);
        let first = Precision::abs(a[[0, 0]]);
        if diag == T::zero() || diag < rtol * first {
            for tau in taus[i..].iter_mut() {
                *tau = T::zero();
            }
            rank = i;
            break;
        }
    }

    (
        QRPivoted {
            factors: a,
            taus,
            jpvt,
        },
        rank,
    )
}
