//! Singular Value Expansion (SVE) module
//!
//! This module computes the singular value expansion of integral kernels,
//!
//! K(x, y) ≈ Σ_l s[l] u[l](x) v[l](y),
//!
//! by sampling the kernel on piecewise Gauss-Legendre grids, decomposing the
//! weighted kernel matrix with an extended-precision SVD and turning the
//! singular vectors back into piecewise Legendre polynomials.
//!
//! Centrosymmetric kernels are split into an even and an odd problem on the
//! positive half domain, each a quarter of the size of the full problem.

mod compute;
mod result;
mod strategy;
mod types;
pub mod utils;

pub use compute::{compute_svd, compute_sve, truncate};
pub use result::SVEResult;
pub use strategy::{CentrosymmSVE, SVEMethod, SVEStrategy, SamplingSVE};
pub use types::{
    choose_accuracy, AccuracyChoice, PrecisionWarning, SVDStrategy, SVEParams, SVEStrategyKind,
    TworkType,
};

#[cfg(test)]
mod tests;
