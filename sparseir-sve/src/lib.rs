//! # sparseir-sve: singular value expansion of integral kernels
//!
//! Computes the truncated singular value expansion
//!
//! K(x, y) ≈ Σ_l s[l] u[l](x) v[l](y)
//!
//! of a kernel on a rectangle, with orthonormal singular functions
//! represented as piecewise Legendre polynomials. The expansion is computed
//! in double or double-double precision, and centrosymmetric kernels are
//! split into even and odd halves.

pub mod error;
pub mod gauss;
pub mod kernel;
pub mod kernelmatrix;
pub mod numeric;
pub mod poly;
pub mod sve;

// Re-export commonly used types and traits
pub use error::SVEError;
pub use gauss::{legendre, legendre_collocation, legendre_vandermonde, Rule};
pub use kernel::{Kernel, LogisticKernel, ReducedKernel, RegularizedBoseKernel, SVEHints};
pub use kernelmatrix::{matrix_from_gauss, DiscretizedKernel};
pub use numeric::CustomNumeric;
pub use poly::{PiecewiseLegendrePoly, PiecewiseLegendrePolyVector};
pub use sve::{
    choose_accuracy, compute_svd, compute_sve, truncate, AccuracyChoice, CentrosymmSVE,
    PrecisionWarning, SVDStrategy, SVEMethod, SVEParams, SVEResult, SVEStrategy,
    SVEStrategyKind, SamplingSVE, TworkType,
};

// Re-export external dependencies for convenience
pub use xprec_svd::Df64;
pub use xprec_svd::Precision;
