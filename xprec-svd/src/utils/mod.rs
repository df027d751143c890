//! Small dense-matrix helpers shared by the QR and SVD routines

pub mod norms;

pub use norms::{dot, norm_2, norm_frobenius};

use crate::precision::Precision;
use ndarray::{Array2, ArrayView2};

/// Identity matrix of shape (m, n)
pub fn eye<T: Precision>(m: usize, n: usize) -> Array2<T> {
    Array2::from_shape_fn((m, n), |(i, j)| if i == j { T::one() } else { T::zero() })
}

/// Dense product `a * b`
///
/// # Panics
/// Panics if the inner dimensions differ.
pub fn matmul<T: Precision>(a: ArrayView2<T>, b: ArrayView2<T>) -> Array2<T> {
    let (m, k) = a.dim();
    let (k2, n) = b.dim();
    assert_eq!(k, k2, "inner dimensions must agree: {} != {}", k, k2);

    let mut c = Array2::from_elem((m, n), T::zero());
    for i in 0..m {
        for l in 0..k {
            let ail = a[[i, l]];
            if ail == T::zero() {
                continue;
            }
            for j in 0..n {
                c[[i, j]] = c[[i, j]] + ail * b[[l, j]];
            }
        }
    }
    c
}

/// Owned transpose
pub fn transpose<T: Precision>(a: ArrayView2<T>) -> Array2<T> {
    a.t().to_owned()
}
