//! Truncated SVD (TSVD) implementation

use crate::precision::{Df64, Precision};
use crate::qr::{rrqr, truncate_qr_result};
use crate::svd::{jacobi_svd, SVDResult};
use crate::utils::matmul;
use ndarray::{Array1, Array2};

/// Configuration for TSVD computation
#[derive(Debug, Clone)]
pub struct TSVDConfig<T: Precision> {
    /// Relative tolerance for rank determination in the RRQR step
    pub rtol: T,
    /// Upper bound on the number of pivoted columns (None: no bound)
    pub max_rank: Option<usize>,
    /// Maximum number of Jacobi sweeps
    pub max_sweeps: usize,
}

impl<T: Precision> TSVDConfig<T> {
    pub fn new(rtol: T) -> Self {
        Self {
            rtol,
            max_rank: None,
            max_sweeps: 60,
        }
    }

    pub fn with_max_rank(mut self, max_rank: usize) -> Self {
        self.max_rank = Some(max_rank);
        self
    }

    pub fn with_max_sweeps(mut self, max_sweeps: usize) -> Self {
        self.max_sweeps = max_sweeps;
        self
    }
}

/// Error types for TSVD computation
#[derive(Debug, thiserror::Error)]
pub enum TSVDError {
    #[error("Matrix is empty")]
    EmptyMatrix,

    #[error("Invalid tolerance: {0}")]
    InvalidTolerance(String),

    #[error("Jacobi SVD did not converge within {sweeps} sweeps")]
    ConvergenceFailed { sweeps: usize },

    #[error("Matrix contains non-finite entries")]
    NonFinite,
}

/// Truncated SVD computation
///
/// 1. RRQR of A, stopping at `config.rtol` or `config.max_rank`: A P = Q R
/// 2. Truncate Q and R to the revealed rank k
/// 3. One-sided Jacobi SVD of B = P R^T = U_b S V_b^T (n × k)
/// 4. A = (Q V_b) S U_b^T, hence U = Q V_b and V = U_b
///
/// # Arguments
/// * `matrix` - Input matrix (m × n)
/// * `config` - TSVD configuration
pub fn tsvd<T: Precision>(
    matrix: &Array2<T>,
    config: TSVDConfig<T>,
) -> Result<SVDResult<T>, TSVDError> {
    let (m, n) = matrix.dim();
    if m == 0 || n == 0 {
        return Err(TSVDError::EmptyMatrix);
    }
    if !(config.rtol >= T::zero() && config.rtol < T::one()) {
        return Err(TSVDError::InvalidTolerance(format!(
            "tolerance must be in [0, 1), got {:e}",
            config.rtol.to_f64()
        )));
    }
    if matrix.iter().any(|&x| !x.is_finite()) {
        return Err(TSVDError::NonFinite);
    }

    let (qr, k) = rrqr(matrix.clone(), config.rtol, config.max_rank);
    if k == 0 {
        return Ok(SVDResult {
            u: Array2::from_elem((m, 0), T::zero()),
            s: Array1::from_elem(0, T::zero()),
            v: Array2::from_elem((n, 0), T::zero()),
            rank: 0,
        });
    }

    let (q, r) = truncate_qr_result(&qr, k);

    let mut b = Array2::from_elem((n, k), T::zero());
    for i in 0..k {
        for j in 0..n {
            b[[qr.jpvt[j], i]] = r[[i, j]];
        }
    }
    let inner = jacobi_svd(&b, config.max_sweeps)?;

    Ok(SVDResult {
        u: matmul(q.view(), inner.v.view()),
        s: inner.s,
        v: inner.u,
        rank: k,
    })
}

/// Full-accuracy SVD: pivoted QR preconditioning without early truncation,
/// followed by Jacobi on the complete triangular factor.
pub fn svd_jacobi<T: Precision>(matrix: &Array2<T>) -> Result<SVDResult<T>, TSVDError> {
    tsvd(matrix, TSVDConfig::new(T::zero()))
}

/// Convenience function for f64 precision
pub fn tsvd_f64(matrix: &Array2<f64>, rtol: f64) -> Result<SVDResult<f64>, TSVDError> {
    tsvd(matrix, TSVDConfig::new(rtol))
}

/// Convenience function for double-double precision
pub fn tsvd_df64(matrix: &Array2<Df64>, rtol: Df64) -> Result<SVDResult<Df64>, TSVDError> {
    tsvd(matrix, TSVDConfig::new(rtol))
}
