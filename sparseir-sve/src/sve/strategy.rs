//! SVE computation strategies

use ndarray::{Array1, Array2, Array3, Axis};

use crate::error::SVEError;
use crate::gauss::{legendre, legendre_collocation, Rule};
use crate::kernel::{Kernel, ReducedKernel};
use crate::kernelmatrix::matrix_from_gauss;
use crate::numeric::CustomNumeric;
use crate::poly::PiecewiseLegendrePolyVector;

use super::result::SVEResult;
use super::utils::{extend_to_full_domain, remove_weights, svd_to_coefficients};

/// Trait for SVE computation strategies
///
/// A strategy turns a kernel into one or more discrete matrices, and the
/// truncated singular triples of those matrices back into singular functions.
pub trait SVEStrategy<T: CustomNumeric> {
    /// Compute the discretized matrices for SVD
    fn matrices(&self) -> Vec<Array2<T>>;

    /// Expected number of significant singular values per matrix
    fn nsvals_hint(&self) -> usize;

    /// Post-process SVD results to create SVEResult
    ///
    /// The lists hold one entry per matrix returned by [`matrices`](Self::matrices);
    /// column `l` of `u_list[i]` and `v_list[i]` belongs to `s_list[i][l]`.
    fn postprocess<O: CustomNumeric>(
        &self,
        u_list: Vec<Array2<T>>,
        s_list: Vec<Vec<T>>,
        v_list: Vec<Array2<T>>,
    ) -> Result<SVEResult<O>, SVEError>;
}

/// Sampling-based SVE computation
///
/// This is the general SVE computation strategy: the kernel is sampled on
/// piecewise Gauss-Legendre grids in x and y, weighted, and decomposed as a
/// single matrix. It does NOT know about symmetry.
///
/// The strategy owns its kernel; pass a reference to sample a borrowed kernel.
pub struct SamplingSVE<T, K> {
    kernel: K,
    epsilon: f64,
    n_gauss: usize,
    nsvals_hint: usize,
    segments_x: Vec<T>,
    segments_y: Vec<T>,
    gauss_x: Rule<T>,
    gauss_y: Rule<T>,
    cmat: Array2<T>,
}

impl<T: CustomNumeric, K: Kernel> SamplingSVE<T, K> {
    /// Create a new SamplingSVE
    ///
    /// Segments and quadrature order come from the kernel's hints for
    /// `epsilon`; `n_gauss` overrides the quadrature order.
    ///
    /// # Errors
    ///
    /// [`SVEError::InvalidParameter`] if `n_gauss` is zero,
    /// [`SVEError::InvalidSegments`] if the hinted segments are malformed or
    /// do not span the kernel's domain.
    pub fn new(kernel: K, epsilon: f64, n_gauss: Option<usize>) -> Result<Self, SVEError> {
        let hints = kernel.sve_hints(epsilon)?;
        let n_gauss = n_gauss.unwrap_or(hints.ngauss);
        if n_gauss == 0 {
            return Err(SVEError::InvalidParameter(
                "number of Gauss points must be positive".to_string(),
            ));
        }
        check_span(&hints.segments_x, kernel.xrange(), "x")?;
        check_span(&hints.segments_y, kernel.yrange(), "y")?;

        let segments_x: Vec<T> = hints.segments_x.iter().map(|&s| T::from_f64(s)).collect();
        let segments_y: Vec<T> = hints.segments_y.iter().map(|&s| T::from_f64(s)).collect();

        let rule = legendre::<T>(n_gauss);
        let gauss_x = rule.piecewise(&segments_x)?;
        let gauss_y = rule.piecewise(&segments_y)?;
        let cmat = legendre_collocation(&rule);

        log::debug!(
            "sampling SVE: {} x-segments, {} y-segments, {} Gauss points",
            segments_x.len() - 1,
            segments_y.len() - 1,
            n_gauss
        );

        Ok(Self {
            kernel,
            epsilon,
            n_gauss,
            nsvals_hint: hints.nsvals,
            segments_x,
            segments_y,
            gauss_x,
            gauss_y,
            cmat,
        })
    }

    pub fn kernel(&self) -> &K {
        &self.kernel
    }

    pub fn n_gauss(&self) -> usize {
        self.n_gauss
    }

    pub fn segments_x(&self) -> &[T] {
        &self.segments_x
    }

    pub fn segments_y(&self) -> &[T] {
        &self.segments_y
    }

    /// Weighted kernel matrix A[i, j] = sqrt(wx_i) K(x_i, y_j) sqrt(wy_j)
    pub fn matrix(&self) -> Array2<T> {
        matrix_from_gauss(&self.kernel, &self.gauss_x, &self.gauss_y).apply_weights_for_sve()
    }

    /// Legendre coefficients `[degree, segment, function]` of the singular
    /// functions on this strategy's domain
    ///
    /// # Errors
    ///
    /// [`SVEError::ShapeMismatch`] if `u` or `v` do not have one row per
    /// quadrature point.
    pub fn coefficients(
        &self,
        u: &Array2<T>,
        v: &Array2<T>,
    ) -> Result<(Array3<T>, Array3<T>), SVEError> {
        if u.nrows() != self.gauss_x.len() || v.nrows() != self.gauss_y.len() {
            return Err(SVEError::ShapeMismatch(format!(
                "singular vectors have {} and {} rows, expected {} and {}",
                u.nrows(),
                v.nrows(),
                self.gauss_x.len(),
                self.gauss_y.len()
            )));
        }
        let u_unweighted = remove_weights(u, &self.gauss_x.w, true);
        let v_unweighted = remove_weights(v, &self.gauss_y.w, true);

        Ok((
            svd_to_coefficients(&u_unweighted, &self.segments_x, &self.cmat)?,
            svd_to_coefficients(&v_unweighted, &self.segments_y, &self.cmat)?,
        ))
    }
}

impl<T: CustomNumeric, K: Kernel> SVEStrategy<T> for SamplingSVE<T, K> {
    fn matrices(&self) -> Vec<Array2<T>> {
        vec![self.matrix()]
    }

    fn nsvals_hint(&self) -> usize {
        self.nsvals_hint
    }

    fn postprocess<O: CustomNumeric>(
        &self,
        u_list: Vec<Array2<T>>,
        s_list: Vec<Vec<T>>,
        v_list: Vec<Array2<T>>,
    ) -> Result<SVEResult<O>, SVEError> {
        let (u, s, v) = match (&u_list[..], &s_list[..], &v_list[..]) {
            ([u], [s], [v]) => (u, s, v),
            _ => {
                return Err(SVEError::ShapeMismatch(format!(
                    "sampling SVE expects one matrix, got {}",
                    s_list.len()
                )))
            }
        };
        if u.ncols() != s.len() || v.ncols() != s.len() {
            return Err(SVEError::ShapeMismatch(format!(
                "{} singular values for {} left and {} right vectors",
                s.len(),
                u.ncols(),
                v.ncols()
            )));
        }

        let (u_data, v_data) = self.coefficients(u, v)?;
        let u_polys = PiecewiseLegendrePolyVector::from_3d_data(
            u_data.mapv(|c| c.convert::<O>()),
            self.segments_x.iter().map(|&k| k.convert::<O>()).collect(),
            None,
        )?;
        let v_polys = PiecewiseLegendrePolyVector::from_3d_data(
            v_data.mapv(|c| c.convert::<O>()),
            self.segments_y.iter().map(|&k| k.convert::<O>()).collect(),
            None,
        )?;
        let s_out: Array1<O> = s.iter().map(|&x| x.convert::<O>()).collect();

        Ok(SVEResult::new(u_polys, s_out, v_polys, self.epsilon))
    }
}

/// Centrosymmetric SVE computation
///
/// Exploits even/odd symmetry for efficient computation. For a kernel with
/// K(x, y) = K(-x, -y), the singular functions are either even or odd, so the
/// expansion splits into the expansions of the even and odd reduced kernels
/// on the positive half domain. Each half problem is a quarter of the size.
pub struct CentrosymmSVE<'a, T, K> {
    kernel: &'a K,
    epsilon: f64,
    even: SamplingSVE<T, ReducedKernel<'a, K>>,
    odd: SamplingSVE<T, ReducedKernel<'a, K>>,
    nsvals_hint: usize,
    segments_x: Vec<T>,
    segments_y: Vec<T>,
}

impl<'a, T: CustomNumeric, K: Kernel> CentrosymmSVE<'a, T, K> {
    /// Create a new CentrosymmSVE
    ///
    /// # Errors
    ///
    /// [`SVEError::NotCentrosymmetric`] if the kernel is not centrosymmetric;
    /// otherwise as [`SamplingSVE::new`].
    pub fn new(kernel: &'a K, epsilon: f64, n_gauss: Option<usize>) -> Result<Self, SVEError> {
        let even = SamplingSVE::new(kernel.get_symmetrized(1)?, epsilon, n_gauss)?;
        let odd = SamplingSVE::new(kernel.get_symmetrized(-1)?, epsilon, n_gauss)?;
        let nsvals_hint = even.nsvals_hint.max(odd.nsvals_hint);

        // The full-domain knots label the merged singular functions
        let hints = kernel.sve_hints(epsilon)?;
        let segments_x = hints.segments_x.iter().map(|&s| T::from_f64(s)).collect();
        let segments_y = hints.segments_y.iter().map(|&s| T::from_f64(s)).collect();

        Ok(Self {
            kernel,
            epsilon,
            even,
            odd,
            nsvals_hint,
            segments_x,
            segments_y,
        })
    }

    pub fn kernel(&self) -> &'a K {
        self.kernel
    }

    /// Strategy for the even reduced kernel
    pub fn even(&self) -> &SamplingSVE<T, ReducedKernel<'a, K>> {
        &self.even
    }

    /// Strategy for the odd reduced kernel
    pub fn odd(&self) -> &SamplingSVE<T, ReducedKernel<'a, K>> {
        &self.odd
    }
}

impl<T: CustomNumeric, K: Kernel> SVEStrategy<T> for CentrosymmSVE<'_, T, K> {
    fn matrices(&self) -> Vec<Array2<T>> {
        vec![self.even.matrix(), self.odd.matrix()]
    }

    fn nsvals_hint(&self) -> usize {
        self.nsvals_hint
    }

    fn postprocess<O: CustomNumeric>(
        &self,
        u_list: Vec<Array2<T>>,
        s_list: Vec<Vec<T>>,
        v_list: Vec<Array2<T>>,
    ) -> Result<SVEResult<O>, SVEError> {
        if u_list.len() != 2 || s_list.len() != 2 || v_list.len() != 2 {
            return Err(SVEError::ShapeMismatch(format!(
                "centrosymmetric SVE expects two matrices, got {}",
                s_list.len()
            )));
        }

        let (u_even, v_even) = self.even.coefficients(&u_list[0], &v_list[0])?;
        let (u_odd, v_odd) = self.odd.coefficients(&u_list[1], &v_list[1])?;

        let concat = |a: &Array3<T>, b: &Array3<T>| {
            ndarray::concatenate(Axis(2), &[a.view(), b.view()])
                .map_err(|e| SVEError::ShapeMismatch(format!("even/odd coefficients: {e}")))
        };
        let u_all = concat(&u_even, &u_odd)?;
        let v_all = concat(&v_even, &v_odd)?;

        let s_all: Vec<T> = s_list[0].iter().chain(s_list[1].iter()).copied().collect();
        let signs_all: Vec<i32> = std::iter::repeat(1)
            .take(s_list[0].len())
            .chain(std::iter::repeat(-1).take(s_list[1].len()))
            .collect();
        if u_all.dim().2 != s_all.len() || v_all.dim().2 != s_all.len() {
            return Err(SVEError::ShapeMismatch(format!(
                "{} singular values for {} left and {} right functions",
                s_all.len(),
                u_all.dim().2,
                v_all.dim().2
            )));
        }

        // Descending by singular value; ties keep even before odd
        let mut order: Vec<usize> = (0..s_all.len()).collect();
        order.sort_by(|&a, &b| {
            s_all[b]
                .partial_cmp(&s_all[a])
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        let s_sorted: Array1<O> = order.iter().map(|&i| s_all[i].convert::<O>()).collect();
        let signs: Vec<i32> = order.iter().map(|&i| signs_all[i]).collect();
        let u_sorted = u_all.select(Axis(2), &order);
        let v_sorted = v_all.select(Axis(2), &order);

        let u_full = extend_to_full_domain(
            &u_sorted,
            &signs,
            self.even.segments_x(),
            &self.segments_x,
        )?;
        let v_full = extend_to_full_domain(
            &v_sorted,
            &signs,
            self.even.segments_y(),
            &self.segments_y,
        )?;

        let u = PiecewiseLegendrePolyVector::from_3d_data(
            u_full.mapv(|c| c.convert::<O>()),
            self.segments_x.iter().map(|&k| k.convert::<O>()).collect(),
            Some(signs.clone()),
        )?;
        let v = PiecewiseLegendrePolyVector::from_3d_data(
            v_full.mapv(|c| c.convert::<O>()),
            self.segments_y.iter().map(|&k| k.convert::<O>()).collect(),
            Some(signs),
        )?;

        Ok(SVEResult::new(u, s_sorted, v, self.epsilon))
    }
}

/// Strategy chosen for one computation
pub enum SVEMethod<'a, T, K> {
    Sampling(SamplingSVE<T, &'a K>),
    Centrosymmetric(CentrosymmSVE<'a, T, K>),
}

impl<T: CustomNumeric, K: Kernel> SVEStrategy<T> for SVEMethod<'_, T, K> {
    fn matrices(&self) -> Vec<Array2<T>> {
        match self {
            SVEMethod::Sampling(sve) => sve.matrices(),
            SVEMethod::Centrosymmetric(sve) => sve.matrices(),
        }
    }

    fn nsvals_hint(&self) -> usize {
        match self {
            SVEMethod::Sampling(sve) => sve.nsvals_hint(),
            SVEMethod::Centrosymmetric(sve) => sve.nsvals_hint(),
        }
    }

    fn postprocess<O: CustomNumeric>(
        &self,
        u_list: Vec<Array2<T>>,
        s_list: Vec<Vec<T>>,
        v_list: Vec<Array2<T>>,
    ) -> Result<SVEResult<O>, SVEError> {
        match self {
            SVEMethod::Sampling(sve) => sve.postprocess(u_list, s_list, v_list),
            SVEMethod::Centrosymmetric(sve) => sve.postprocess(u_list, s_list, v_list),
        }
    }
}

fn check_span(segments: &[f64], range: (f64, f64), axis: &str) -> Result<(), SVEError> {
    let (lo, hi) = range;
    let (first, last) = match (segments.first(), segments.last()) {
        (Some(&first), Some(&last)) if segments.len() >= 2 => (first, last),
        _ => {
            return Err(SVEError::InvalidSegments(format!(
                "need at least 2 {axis}-segment edges, got {}",
                segments.len()
            )))
        }
    };
    let tol = 1e-12 * (hi - lo).abs();
    if (first - lo).abs() > tol || (last - hi).abs() > tol {
        return Err(SVEError::InvalidSegments(format!(
            "{axis}-segments [{first}, {last}] do not span the domain [{lo}, {hi}]"
        )));
    }
    Ok(())
}
