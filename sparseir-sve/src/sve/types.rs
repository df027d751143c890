//! Type definitions for SVE computation

use std::fmt;

use crate::error::SVEError;
use xprec_svd::DF64_EPSILON;

/// Working precision type for SVE computations
///
/// Values match the C-API constants defined in sparseir.h
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TworkType {
    /// Use double precision (64-bit)
    Float64 = 0, // SPIR_TWORK_FLOAT64
    /// Use extended precision (128-bit double-double)
    Float64X2 = 1, // SPIR_TWORK_FLOAT64X2
    /// Automatically choose precision based on epsilon
    #[default]
    Auto = -1, // SPIR_TWORK_AUTO
}

impl TworkType {
    /// Widest working type compiled into the library
    pub const MAX: TworkType = TworkType::Float64X2;

    /// Machine epsilon of the working type
    ///
    /// `Auto` reports the epsilon of [`TworkType::MAX`].
    pub fn machine_epsilon(self) -> f64 {
        match self {
            TworkType::Float64 => f64::EPSILON,
            TworkType::Float64X2 | TworkType::Auto => DF64_EPSILON,
        }
    }
}

/// SVD computation strategy
///
/// Values match the C-API constants defined in sparseir.h
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SVDStrategy {
    /// Rank-revealing QR followed by Jacobi SVD on the retained block
    Fast = 0, // SPIR_SVDSTRAT_FAST
    /// Jacobi SVD of the full matrix
    Accurate = 1, // SPIR_SVDSTRAT_ACCURATE
    /// Automatically choose strategy
    #[default]
    Auto = -1, // SPIR_SVDSTRAT_AUTO
}

/// How the kernel is discretized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SVEStrategyKind {
    /// Centrosymmetric if the kernel supports it, sampling otherwise
    #[default]
    Auto,
    /// One matrix over the full domain
    Sampling,
    /// Even and odd reduced kernels on the positive half domain
    Centrosymmetric,
}

/// Parameters of [`compute_sve`](super::compute_sve)
///
/// ```
/// use sparseir_sve::{SVEParams, TworkType};
///
/// let params = SVEParams::default()
///     .with_epsilon(1e-6)
///     .with_n_sv(20)
///     .with_twork(TworkType::Float64);
/// assert_eq!(params.epsilon, Some(1e-6));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SVEParams {
    /// Relative cutoff for singular values; defaults to sqrt of the working epsilon
    pub epsilon: Option<f64>,
    /// Maximum number of singular values to keep
    pub n_sv: Option<usize>,
    /// Gauss points per segment; defaults to the kernel hint
    pub n_gauss: Option<usize>,
    pub twork: TworkType,
    pub sve_strategy: SVEStrategyKind,
    pub svd_strategy: SVDStrategy,
}

impl SVEParams {
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = Some(epsilon);
        self
    }

    pub fn with_n_sv(mut self, n_sv: usize) -> Self {
        self.n_sv = Some(n_sv);
        self
    }

    pub fn with_n_gauss(mut self, n_gauss: usize) -> Self {
        self.n_gauss = Some(n_gauss);
        self
    }

    pub fn with_twork(mut self, twork: TworkType) -> Self {
        self.twork = twork;
        self
    }

    pub fn with_sve_strategy(mut self, sve_strategy: SVEStrategyKind) -> Self {
        self.sve_strategy = sve_strategy;
        self
    }

    pub fn with_svd_strategy(mut self, svd_strategy: SVDStrategy) -> Self {
        self.svd_strategy = svd_strategy;
        self
    }
}

/// Foreseeable loss of precision: the requested cutoff lies below the square
/// root of the working epsilon
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrecisionWarning {
    /// Requested cutoff
    pub epsilon: f64,
    /// Machine epsilon of the working type
    pub machine_epsilon: f64,
    /// Whether a wider working type is available
    pub suggest_higher_precision: bool,
}

impl fmt::Display for PrecisionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Basis cutoff is {:.2e}, which is below sqrt(eps) with eps = {:.2e}. \
             Expect singular values and basis functions for large l to have lower \
             precision than the cutoff.",
            self.epsilon, self.machine_epsilon
        )?;
        if self.suggest_higher_precision {
            write!(
                f,
                " Consider using a higher working precision (TworkType::Float64X2)."
            )?;
        }
        Ok(())
    }
}

/// Resolved numeric policy for one SVE computation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AccuracyChoice {
    /// Relative cutoff for singular values
    pub epsilon: f64,
    /// Working type, never `Auto`
    pub twork: TworkType,
    /// SVD strategy, never `Auto`
    pub svd_strategy: SVDStrategy,
    pub warning: Option<PrecisionWarning>,
}

/// Determine the cutoff, working precision and SVD strategy
///
/// Without an explicit `epsilon` the cutoff is the square root of the working
/// epsilon, which the fast SVD reaches reliably. With `TworkType::Auto`,
/// double precision is used whenever it can deliver `epsilon`, otherwise
/// double-double. A cutoff below sqrt(eps) of the working type selects the
/// accurate SVD and attaches a [`PrecisionWarning`].
///
/// # Errors
///
/// [`SVEError::InvalidParameter`] if `epsilon` is negative or NaN.
pub fn choose_accuracy(
    epsilon: Option<f64>,
    twork: TworkType,
) -> Result<AccuracyChoice, SVEError> {
    let epsilon = match epsilon {
        Some(eps) if eps.is_nan() || eps < 0.0 => {
            return Err(SVEError::InvalidParameter(format!(
                "epsilon must be non-negative, got {eps}"
            )));
        }
        Some(eps) => eps,
        None => {
            let twork = match twork {
                TworkType::Auto => TworkType::MAX,
                other => other,
            };
            return Ok(AccuracyChoice {
                epsilon: twork.machine_epsilon().sqrt(),
                twork,
                svd_strategy: SVDStrategy::Fast,
                warning: None,
            });
        }
    };

    let twork = match twork {
        TworkType::Auto if epsilon >= f64::EPSILON.sqrt() => {
            return Ok(AccuracyChoice {
                epsilon,
                twork: TworkType::Float64,
                svd_strategy: SVDStrategy::Fast,
                warning: None,
            });
        }
        TworkType::Auto => TworkType::MAX,
        other => other,
    };

    let machine_epsilon = twork.machine_epsilon();
    if epsilon >= machine_epsilon.sqrt() {
        Ok(AccuracyChoice {
            epsilon,
            twork,
            svd_strategy: SVDStrategy::Fast,
            warning: None,
        })
    } else {
        Ok(AccuracyChoice {
            epsilon,
            twork,
            svd_strategy: SVDStrategy::Accurate,
            warning: Some(PrecisionWarning {
                epsilon,
                machine_epsilon,
                suggest_higher_precision: twork != TworkType::MAX,
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_epsilon_auto() {
        let choice = choose_accuracy(None, TworkType::Auto).unwrap();
        assert_eq!(choice.twork, TworkType::Float64X2);
        assert_eq!(choice.svd_strategy, SVDStrategy::Fast);
        assert!(choice.warning.is_none());
        // sqrt(2^-105) ≈ 1.57e-16
        assert!((choice.epsilon - 1.5700924586837752e-16).abs() < 1e-20);
    }

    #[test]
    fn test_default_epsilon_explicit_precision() {
        let choice = choose_accuracy(None, TworkType::Float64).unwrap();
        assert_eq!(choice.twork, TworkType::Float64);
        assert_eq!(choice.epsilon, f64::EPSILON.sqrt());
        assert_eq!(choice.svd_strategy, SVDStrategy::Fast);
    }

    #[test]
    fn test_auto_float64() {
        let choice = choose_accuracy(Some(1e-6), TworkType::Auto).unwrap();
        assert_eq!(choice.twork, TworkType::Float64);
        assert_eq!(choice.epsilon, 1e-6);
        assert_eq!(choice.svd_strategy, SVDStrategy::Fast);
        assert!(choice.warning.is_none());
    }

    #[test]
    fn test_auto_float64x2() {
        let choice = choose_accuracy(Some(1e-10), TworkType::Auto).unwrap();
        assert_eq!(choice.twork, TworkType::Float64X2);
        assert_eq!(choice.epsilon, 1e-10);
        assert_eq!(choice.svd_strategy, SVDStrategy::Fast);
        assert!(choice.warning.is_none());
    }

    #[test]
    fn test_auto_switches_at_sqrt_f64_epsilon() {
        let threshold = f64::EPSILON.sqrt();
        let at = choose_accuracy(Some(threshold), TworkType::Auto).unwrap();
        assert_eq!(at.twork, TworkType::Float64);
        let below = choose_accuracy(Some(threshold * 0.5), TworkType::Auto).unwrap();
        assert_eq!(below.twork, TworkType::Float64X2);
    }

    #[test]
    fn test_accurate_below_safe_epsilon() {
        let choice = choose_accuracy(Some(1e-20), TworkType::Auto).unwrap();
        assert_eq!(choice.twork, TworkType::Float64X2);
        assert_eq!(choice.svd_strategy, SVDStrategy::Accurate);

        let warning = choice.warning.unwrap();
        assert_eq!(warning.epsilon, 1e-20);
        assert_eq!(warning.machine_epsilon, DF64_EPSILON);
        assert!(!warning.suggest_higher_precision);
    }

    #[test]
    fn test_explicit_float64_suggests_higher_precision() {
        let choice = choose_accuracy(Some(1e-10), TworkType::Float64).unwrap();
        assert_eq!(choice.twork, TworkType::Float64);
        assert_eq!(choice.svd_strategy, SVDStrategy::Accurate);

        let warning = choice.warning.unwrap();
        assert!(warning.suggest_higher_precision);
        let message = warning.to_string();
        assert!(message.starts_with("Basis cutoff is 1.00e-10, which is below sqrt(eps)"));
        assert!(message.contains("Float64X2"));
    }

    #[test]
    fn test_explicit_precision_without_warning() {
        let choice = choose_accuracy(Some(1e-7), TworkType::Float64X2).unwrap();
        assert_eq!(choice.twork, TworkType::Float64X2);
        assert_eq!(choice.svd_strategy, SVDStrategy::Fast);
        assert!(choice.warning.is_none());
    }

    #[test]
    fn test_zero_epsilon_is_accepted() {
        let choice = choose_accuracy(Some(0.0), TworkType::Auto).unwrap();
        assert_eq!(choice.twork, TworkType::Float64X2);
        assert_eq!(choice.svd_strategy, SVDStrategy::Accurate);
        assert!(choice.warning.is_some());
    }

    #[test]
    fn test_invalid_epsilon() {
        assert!(matches!(
            choose_accuracy(Some(-1.0), TworkType::Auto),
            Err(SVEError::InvalidParameter(_))
        ));
        assert!(matches!(
            choose_accuracy(Some(f64::NAN), TworkType::Float64),
            Err(SVEError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_params_builder() {
        let params = SVEParams::default()
            .with_epsilon(1e-8)
            .with_n_sv(10)
            .with_n_gauss(12)
            .with_twork(TworkType::Float64X2)
            .with_sve_strategy(SVEStrategyKind::Sampling)
            .with_svd_strategy(SVDStrategy::Accurate);

        assert_eq!(params.epsilon, Some(1e-8));
        assert_eq!(params.n_sv, Some(10));
        assert_eq!(params.n_gauss, Some(12));
        assert_eq!(params.twork, TworkType::Float64X2);
        assert_eq!(params.sve_strategy, SVEStrategyKind::Sampling);
        assert_eq!(params.svd_strategy, SVDStrategy::Accurate);

        let defaults = SVEParams::default();
        assert_eq!(defaults.epsilon, None);
        assert_eq!(defaults.twork, TworkType::Auto);
        assert_eq!(defaults.sve_strategy, SVEStrategyKind::Auto);
        assert_eq!(defaults.svd_strategy, SVDStrategy::Auto);
    }
}
