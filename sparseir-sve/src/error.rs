//! Error type shared by all SVE operations

use xprec_svd::TSVDError;

/// Errors raised while setting up or computing a singular value expansion
#[derive(Debug, thiserror::Error)]
pub enum SVEError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Invalid segments: {0}")]
    InvalidSegments(String),

    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    #[error("Symmetrization sign must be +1 or -1, got {0}")]
    InvalidSymmetrySign(i32),

    #[error("Kernel is not centrosymmetric")]
    NotCentrosymmetric,

    #[error("No singular values above cutoff {cutoff:e}")]
    EmptyResult { cutoff: f64 },

    #[error(transparent)]
    Svd(#[from] TSVDError),
}
