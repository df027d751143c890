//! Utility functions for SVE computation

use ndarray::{Array2, Array3};

use crate::error::SVEError;
use crate::numeric::CustomNumeric;
use crate::poly::PiecewiseLegendrePolyVector;
use xprec_svd::Precision;

/// Remove Gauss weights from SVD matrix
///
/// This function removes the square root of Gauss quadrature weights that were
/// applied before SVD computation. This is the inverse operation of
/// `DiscretizedKernel::apply_weights_for_sve()`.
///
/// # Arguments
///
/// * `matrix` - SVD result matrix (U or V)
/// * `weights` - Gauss quadrature weights
/// * `is_row` - If true, remove from rows; if false, remove from columns
///
/// # Panics
///
/// Panics if `weights` is shorter than the weighted dimension.
pub fn remove_weights<T: CustomNumeric>(
    matrix: &Array2<T>,
    weights: &[T],
    is_row: bool,
) -> Array2<T> {
    let sqrt_weights: Vec<T> = weights.iter().map(|&w| Precision::sqrt(w)).collect();
    Array2::from_shape_fn(matrix.dim(), |(i, j)| {
        let k = if is_row { i } else { j };
        matrix[[i, j]] / sqrt_weights[k]
    })
}

/// Convert unweighted singular vectors to Legendre coefficients
///
/// Row `seg * n_gauss + node` of `u_or_v` holds the value of every singular
/// vector at quadrature node `node` of segment `seg`, with `n_gauss =
/// cmat.ncols()`. The collocation matrix `cmat` of the base rule turns the
/// values of each segment into Legendre coefficients, which are then scaled
/// by `sqrt(Δx / 2)` so that the polynomials carry unit L2 norm.
///
/// # Returns
///
/// Coefficient tensor `[degree, segment, function]`
///
/// # Errors
///
/// [`SVEError::ShapeMismatch`] if the row count differs from
/// `nsegments * n_gauss`.
pub fn svd_to_coefficients<T: CustomNumeric>(
    u_or_v: &Array2<T>,
    segments: &[T],
    cmat: &Array2<T>,
) -> Result<Array3<T>, SVEError> {
    let n_gauss = cmat.ncols();
    let n_segments = segments.len().saturating_sub(1);
    let (n_rows, n_svals) = u_or_v.dim();
    if n_rows != n_segments * n_gauss {
        return Err(SVEError::ShapeMismatch(format!(
            "expected {} rows ({} segments × {} points), got {}",
            n_segments * n_gauss,
            n_segments,
            n_gauss,
            n_rows
        )));
    }

    let half = T::from_f64(0.5);
    let seg_norms: Vec<T> = segments
        .windows(2)
        .map(|s| Precision::sqrt((s[1] - s[0]) * half))
        .collect();

    let n_coeffs = cmat.nrows();
    let mut data = Array3::from_elem((n_coeffs, n_segments, n_svals), T::zero());
    for seg in 0..n_segments {
        let block = u_or_v.slice(ndarray::s![seg * n_gauss..(seg + 1) * n_gauss, ..]);
        for deg in 0..n_coeffs {
            for l in 0..n_svals {
                let mut sum = T::zero();
                for node in 0..n_gauss {
                    sum = sum + cmat[[deg, node]] * block[[node, l]];
                }
                data[[deg, seg, l]] = sum * seg_norms[seg];
            }
        }
    }
    Ok(data)
}

/// Extend coefficients from [0, xmax] to [-xmax, xmax] using symmetry
///
/// Function `l` is even (`signs[l] = 1`) or odd (`signs[l] = -1`) about 0.
/// The positive side is the half-domain function divided by sqrt(2), so the
/// extension keeps unit norm. The negative side visits the half-domain
/// segments in reverse order, with the degree-n coefficient multiplied by
/// (-1)^n · sign, because P_n(-x) = (-1)^n P_n(x).
///
/// # Arguments
///
/// * `data` - Coefficients `[degree, segment, function]` on the half domain
/// * `signs` - Parity of every function
/// * `half_knots` - Knots of the half domain, starting at 0
/// * `full_knots` - Knots of the full domain
///
/// # Errors
///
/// [`SVEError::ShapeMismatch`] if `full_knots` is not the mirror image of
/// `half_knots`, or if `signs` does not match the number of functions.
pub fn extend_to_full_domain<T: CustomNumeric>(
    data: &Array3<T>,
    signs: &[i32],
    half_knots: &[T],
    full_knots: &[T],
) -> Result<Array3<T>, SVEError> {
    let (n_coeffs, n_half, n_funcs) = data.dim();
    if signs.len() != n_funcs {
        return Err(SVEError::ShapeMismatch(format!(
            "{} signs for {} functions",
            signs.len(),
            n_funcs
        )));
    }
    check_mirrored_knots(half_knots, full_knots, n_half)?;

    let inv_sqrt2 = T::one() / Precision::sqrt(T::from_f64(2.0));
    let mut full = Array3::from_elem((n_coeffs, 2 * n_half, n_funcs), T::zero());
    for l in 0..n_funcs {
        let sign = T::from_f64(f64::from(signs[l]));
        for seg in 0..n_half {
            for deg in 0..n_coeffs {
                let c = data[[deg, seg, l]] * inv_sqrt2;
                let parity = if deg % 2 == 0 { sign } else { -sign };
                full[[deg, n_half + seg, l]] = c;
                full[[deg, n_half - 1 - seg, l]] = c * parity;
            }
        }
    }
    Ok(full)
}

fn check_mirrored_knots<T: CustomNumeric>(
    half_knots: &[T],
    full_knots: &[T],
    n_half: usize,
) -> Result<(), SVEError> {
    if half_knots.len() != n_half + 1 || full_knots.len() != 2 * n_half + 1 {
        return Err(SVEError::ShapeMismatch(format!(
            "cannot mirror {} half-domain knots onto {} knots for {} segments",
            half_knots.len(),
            full_knots.len(),
            n_half
        )));
    }

    let width = (full_knots[2 * n_half] - full_knots[0]).to_f64().abs();
    let tol = 1e-12 * width;
    for (i, &k) in half_knots.iter().enumerate() {
        let right = (full_knots[n_half + i] - k).to_f64().abs();
        let left = (full_knots[n_half - i] + k).to_f64().abs();
        if right > tol || left > tol {
            return Err(SVEError::ShapeMismatch(format!(
                "knot {i} of the half domain is not mirrored by the full domain"
            )));
        }
    }
    Ok(())
}

/// Canonicalize singular function signs
///
/// Fix the gauge freedom in SVD by demanding u[l](xmax) > 0. A function
/// that vanishes at xmax is left unchanged. The pair u[l], v[l] is always
/// flipped together.
pub fn canonicalize<T: CustomNumeric>(
    u: &mut PiecewiseLegendrePolyVector<T>,
    v: &mut PiecewiseLegendrePolyVector<T>,
) {
    let minus_one = T::from_f64(-1.0);
    for l in 0..u.len().min(v.len()) {
        let u_at_xmax = u[l].evaluate(u[l].xmax);
        if u_at_xmax < T::zero() {
            u[l] = u[l].scaled(minus_one);
            v[l] = v[l].scaled(minus_one);
        }
    }
}
