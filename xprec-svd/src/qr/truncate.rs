//! QR truncation utilities

use super::householder::reflector_apply;
use super::rrqr::QRPivoted;
use crate::precision::Precision;
use crate::utils::eye;
use ndarray::{s, Array2};

/// Truncate QR factorization result to effective rank k
///
/// Returns the thin factors Q (m × k) and R (k × n) with
/// A[:, jpvt] ≈ Q R. Q is formed by applying the reflectors backwards to
/// the first k columns of the identity.
pub fn truncate_qr_result<T: Precision>(qr: &QRPivoted<T>, k: usize) -> (Array2<T>, Array2<T>) {
    let (m, n) = qr.factors.dim();
    assert!(k <= m.min(n), "rank {} exceeds min({}, {})", k, m, n);

    let mut q = eye::<T>(m, k);
    for i in (0..k).rev() {
        let v = qr.factors.slice(s![i.., i]);
        reflector_apply(v, qr.taus[i], q.slice_mut(s![i.., ..]));
    }

    let r = Array2::from_shape_fn((k, n), |(i, j)| {
        if j >= i {
            qr.factors[[i, j]]
        } else {
            T::zero()
        }
    });

    (q, r)
}
