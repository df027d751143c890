//! SVE result container

use ndarray::Array1;

use crate::numeric::CustomNumeric;
use crate::poly::PiecewiseLegendrePolyVector;

/// Result of Singular Value Expansion computation
///
/// K(x, y) ≈ Σ_l s[l] u[l](x) v[l](y), with u and v orthonormal on their
/// domains.
#[derive(Debug, Clone)]
pub struct SVEResult<T> {
    /// Left singular functions (u)
    pub u: PiecewiseLegendrePolyVector<T>,
    /// Singular values in non-increasing order
    pub s: Array1<T>,
    /// Right singular functions (v)
    pub v: PiecewiseLegendrePolyVector<T>,
    /// Accuracy parameter used for computation
    pub epsilon: f64,
}

impl<T: CustomNumeric> SVEResult<T> {
    pub fn new(
        u: PiecewiseLegendrePolyVector<T>,
        s: Array1<T>,
        v: PiecewiseLegendrePolyVector<T>,
        epsilon: f64,
    ) -> Self {
        Self { u, s, v, epsilon }
    }

    /// Number of singular triples
    pub fn len(&self) -> usize {
        self.s.len()
    }

    pub fn is_empty(&self) -> bool {
        self.s.is_empty()
    }

    /// Extract a subset of the SVE result based on epsilon and max_size
    ///
    /// # Arguments
    ///
    /// * `eps` - Relative threshold for singular values (default: self.epsilon)
    /// * `max_size` - Maximum number of singular values to keep
    ///
    /// # Returns
    ///
    /// Tuple of (u_subset, s_subset, v_subset)
    pub fn part(
        &self,
        eps: Option<f64>,
        max_size: Option<usize>,
    ) -> (
        PiecewiseLegendrePolyVector<T>,
        Array1<T>,
        PiecewiseLegendrePolyVector<T>,
    ) {
        let eps = eps.unwrap_or(self.epsilon);
        let mut cut = match self.s.first() {
            Some(&s0) => {
                let threshold = T::from_f64(eps) * s0;
                self.s.iter().take_while(|&&val| val >= threshold).count()
            }
            None => 0,
        };
        if let Some(max) = max_size {
            cut = cut.min(max);
        }

        (
            self.u.slice(0..cut),
            self.s.slice(ndarray::s![..cut]).to_owned(),
            self.v.slice(0..cut),
        )
    }
}
