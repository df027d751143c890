//! Vector and matrix norm computations

use crate::precision::Precision;
use ndarray::{ArrayView1, ArrayView2};

/// Inner product of two vectors of equal length
pub fn dot<T: Precision>(x: ArrayView1<T>, y: ArrayView1<T>) -> T {
    x.iter()
        .zip(y.iter())
        .fold(T::zero(), |acc, (&a, &b)| acc + a * b)
}

/// Euclidean norm of a vector
pub fn norm_2<T: Precision>(x: ArrayView1<T>) -> T {
    let sum = x.iter().fold(T::zero(), |acc, &v| acc + v * v);
    Precision::sqrt(sum)
}

/// Frobenius norm of a matrix
pub fn norm_frobenius<T: Precision>(a: ArrayView2<T>) -> T {
    let sum = a.iter().fold(T::zero(), |acc, &v| acc + v * v);
    Precision::sqrt(sum)
}
