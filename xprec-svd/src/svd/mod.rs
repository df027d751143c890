//! SVD decomposition algorithms

pub mod jacobi;

pub use jacobi::{SVDResult, jacobi_svd};
