//! # xprec-svd: High-Precision Truncated SVD
//!
//! Truncated SVD (TSVD) in `f64` or double-double (`Df64`) precision,
//! built from a rank-revealing QR with column pivoting followed by
//! one-sided Jacobi rotations on the triangular factor.

pub mod precision;
pub mod qr;
pub mod svd;
pub mod tsvd;
pub mod utils;

pub use precision::{Df64, Precision, DF64_EPSILON};
pub use qr::{rrqr, truncate_qr_result, QRPivoted};
pub use svd::{jacobi_svd, SVDResult};
pub use tsvd::{svd_jacobi, tsvd, tsvd_f64, tsvd_df64, TSVDConfig, TSVDError};
pub use utils::{norm_2, norm_frobenius};
