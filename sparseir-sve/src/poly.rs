//! Piecewise Legendre polynomials
//!
//! The singular functions of an SVE are represented on a segment grid as
//!
//! ```text
//! p(x) = sqrt(2 / dx_i) * sum_n data[n, i] * P_n(x~),   x in [knots[i], knots[i+1]]
//! ```
//!
//! where x~ in [-1, 1] is the position inside segment i and dx_i its width.
//! With this normalization the L2 inner product of two polynomials on the
//! same grid is the plain dot product of their coefficients.

use crate::error::SVEError;
use crate::gauss::{legendre, Rule};
use crate::numeric::CustomNumeric;
use ndarray::{Array2, Array3, ArrayView1};
use std::cmp::Ordering;
use std::ops::{Index, IndexMut, Range};
use xprec_svd::Precision;

/// A single piecewise Legendre polynomial
#[derive(Debug, Clone)]
pub struct PiecewiseLegendrePoly<T> {
    /// Number of Legendre coefficients per segment (degree + 1)
    pub polyorder: usize,
    /// Minimum x value of the domain
    pub xmin: T,
    /// Maximum x value of the domain
    pub xmax: T,
    /// Knot points defining the segments
    pub knots: Vec<T>,
    /// Segment widths
    pub delta_x: Vec<T>,
    /// Coefficient matrix: [degree][segment_index]
    pub data: Array2<T>,
    /// Parity under x -> -x (+1 even, -1 odd, 0 unknown)
    pub symm: i32,
    /// Index of the polynomial within its expansion
    pub l: i32,
    /// Segment midpoints
    pub xm: Vec<T>,
    /// Inverse half segment widths, 2 / dx
    pub inv_xs: Vec<T>,
    /// Normalization factors, sqrt(2 / dx)
    pub norms: Vec<T>,
}

impl<T: CustomNumeric> PiecewiseLegendrePoly<T> {
    /// Create a new PiecewiseLegendrePoly from data and knots
    ///
    /// # Errors
    /// [`SVEError::ShapeMismatch`] if `knots.len() != data.ncols() + 1`,
    /// [`SVEError::InvalidSegments`] if the knots are not strictly increasing.
    pub fn new(data: Array2<T>, knots: Vec<T>, l: i32, symm: i32) -> Result<Self, SVEError> {
        let polyorder = data.nrows();
        let nsegments = data.ncols();

        if nsegments == 0 || knots.len() != nsegments + 1 {
            return Err(SVEError::ShapeMismatch(format!(
                "expected {} knots for {} segments, got {}",
                nsegments + 1,
                nsegments,
                knots.len()
            )));
        }
        if (1..knots.len()).any(|i| knots[i] <= knots[i - 1]) {
            return Err(SVEError::InvalidSegments(
                "knots must be strictly increasing".to_string(),
            ));
        }

        let half = T::from_f64(0.5);
        let two = T::from_f64(2.0);
        let delta_x: Vec<T> = knots.windows(2).map(|k| k[1] - k[0]).collect();
        let xm: Vec<T> = knots.windows(2).map(|k| (k[0] + k[1]) * half).collect();
        let inv_xs: Vec<T> = delta_x.iter().map(|&dx| two / dx).collect();
        let norms: Vec<T> = inv_xs.iter().map(|&ix| Precision::sqrt(ix)).collect();

        Ok(Self {
            polyorder,
            xmin: knots[0],
            xmax: knots[nsegments],
            knots,
            delta_x,
            data,
            symm,
            l,
            xm,
            inv_xs,
            norms,
        })
    }

    /// Same grid, new coefficients
    pub fn with_data(&self, data: Array2<T>) -> Self {
        debug_assert_eq!(data.dim(), self.data.dim());
        Self {
            data,
            ..self.clone()
        }
    }

    pub fn nsegments(&self) -> usize {
        self.data.ncols()
    }

    /// Evaluate the polynomial at a given point
    ///
    /// # Panics
    /// Panics if `x` lies outside `[xmin, xmax]`.
    pub fn evaluate(&self, x: T) -> T {
        let (i, x_tilde) = self.split(x);
        legendre_sum(self.data.column(i), x_tilde) * self.norms[i]
    }

    /// Evaluate the polynomial at multiple points
    pub fn evaluate_many(&self, xs: &[T]) -> Vec<T> {
        xs.iter().map(|&x| self.evaluate(x)).collect()
    }

    /// Split x into segment index and position inside the segment, in [-1, 1]
    ///
    /// A point on an interior knot belongs to the segment on its right.
    ///
    /// # Panics
    /// Panics if `x` lies outside `[xmin, xmax]`.
    pub fn split(&self, x: T) -> (usize, T) {
        assert!(
            x >= self.xmin && x <= self.xmax,
            "x = {:?} is outside domain [{:?}, {:?}]",
            x,
            self.xmin,
            self.xmax
        );

        let i = self
            .knots
            .partition_point(|&k| k <= x)
            .saturating_sub(1)
            .min(self.nsegments() - 1);
        (i, (x - self.xm[i]) * self.inv_xs[i])
    }

    /// Compute the n-th derivative of the polynomial
    ///
    /// The result keeps the coefficient shape; trailing degrees become zero.
    pub fn deriv(&self, n: usize) -> Self {
        if n == 0 {
            return self.clone();
        }

        let mut ddata = self.data.clone();
        for _ in 0..n {
            ddata = derivative_coefficients(&ddata);
        }
        for (i, mut col) in ddata.columns_mut().into_iter().enumerate() {
            let mut scale = T::one();
            for _ in 0..n {
                scale = scale * self.inv_xs[i];
            }
            col.mapv_inplace(|c| c * scale);
        }

        Self {
            data: ddata,
            symm: if n % 2 == 0 { self.symm } else { -self.symm },
            ..self.clone()
        }
    }

    /// Multiply the polynomial by a constant
    pub fn scaled(&self, factor: T) -> Self {
        self.with_data(self.data.mapv(|c| c * factor))
    }

    /// Integral of p(x) f(x) over the domain
    ///
    /// Uses a Gauss rule with `polyorder + 4` points on every segment, which
    /// is exact whenever f is a polynomial of degree up to `polyorder + 8`
    /// on each segment.
    pub fn overlap_fn<F>(&self, f: F) -> T
    where
        F: Fn(T) -> T,
    {
        let rule = legendre::<T>(self.polyorder + 4);
        let mut integral = T::zero();
        for i in 0..self.nsegments() {
            let seg = rule.reseat(self.knots[i], self.knots[i + 1]);
            for (&x, &w) in seg.x.iter().zip(seg.w.iter()) {
                integral = integral + w * self.evaluate(x) * f(x);
            }
        }
        integral
    }

    /// L2 inner product with another polynomial on the same domain
    ///
    /// Integrates exactly on the union of both knot sets.
    ///
    /// # Errors
    /// [`SVEError::ShapeMismatch`] if the two domains differ.
    pub fn overlap(&self, other: &Self) -> Result<T, SVEError> {
        if self.xmin != other.xmin || self.xmax != other.xmax {
            return Err(SVEError::ShapeMismatch(format!(
                "domains differ: [{:?}, {:?}] vs [{:?}, {:?}]",
                self.xmin, self.xmax, other.xmin, other.xmax
            )));
        }

        let knots = merge_knots(&self.knots, &other.knots);
        let rule: Rule<T> = legendre((self.polyorder + other.polyorder) / 2 + 1);
        let mut integral = T::zero();
        for pair in knots.windows(2) {
            let seg = rule.reseat(pair[0], pair[1]);
            for (&x, &w) in seg.x.iter().zip(seg.w.iter()) {
                integral = integral + w * self.evaluate(x) * other.evaluate(x);
            }
        }
        Ok(integral)
    }
}

/// sum_n c[n] P_n(x) by the three-term recurrence
fn legendre_sum<T: CustomNumeric>(coeffs: ArrayView1<T>, x: T) -> T {
    let n = coeffs.len();
    if n == 0 {
        return T::zero();
    }

    let mut result = coeffs[0];
    if n == 1 {
        return result;
    }

    let mut p_prev = T::one();
    let mut p_curr = x;
    result = result + coeffs[1] * p_curr;

    // P_{k+1}(x) = ((2k+1) x P_k(x) - k P_{k-1}(x)) / (k+1)
    for k in 1..n - 1 {
        let kf = T::from_usize(k);
        let p_next =
            (T::from_usize(2 * k + 1) * x * p_curr - kf * p_prev) / T::from_usize(k + 1);
        result = result + coeffs[k + 1] * p_next;
        p_prev = p_curr;
        p_curr = p_next;
    }
    result
}

/// One differentiation step on Legendre coefficients, column by column
///
/// Follows numpy's `legder`; the highest degree is filled with zero so the
/// shape is preserved.
fn derivative_coefficients<T: CustomNumeric>(coeffs: &Array2<T>) -> Array2<T> {
    let (nrows, ncols) = coeffs.dim();
    let mut der = Array2::from_elem((nrows, ncols), T::zero());
    if nrows <= 1 {
        return der;
    }

    let mut c = coeffs.clone();
    let n = nrows - 1;
    for j in (3..=n).rev() {
        let factor = T::from_usize(2 * j - 1);
        for col in 0..ncols {
            der[[j - 1, col]] = factor * c[[j, col]];
            c[[j - 2, col]] = c[[j - 2, col]] + c[[j, col]];
        }
    }
    if n > 1 {
        let three = T::from_f64(3.0);
        for col in 0..ncols {
            der[[1, col]] = three * c[[2, col]];
        }
    }
    for col in 0..ncols {
        der[[0, col]] = c[[1, col]];
    }
    der
}

fn merge_knots<T: CustomNumeric>(a: &[T], b: &[T]) -> Vec<T> {
    let mut knots: Vec<T> = a.iter().chain(b.iter()).copied().collect();
    knots.sort_by(|x, y| x.partial_cmp(y).unwrap_or(Ordering::Equal));
    knots.dedup();
    knots
}

/// Vector of piecewise Legendre polynomials
#[derive(Debug, Clone)]
pub struct PiecewiseLegendrePolyVector<T> {
    /// Individual polynomials
    pub polyvec: Vec<PiecewiseLegendrePoly<T>>,
}

impl<T: CustomNumeric> PiecewiseLegendrePolyVector<T> {
    pub fn new(polyvec: Vec<PiecewiseLegendrePoly<T>>) -> Self {
        Self { polyvec }
    }

    /// Build from a coefficient tensor `[degree, segment, function]` on shared knots
    ///
    /// # Errors
    /// [`SVEError::ShapeMismatch`] if `symm` or `knots` do not fit the tensor,
    /// [`SVEError::InvalidSegments`] if the knots are not strictly increasing.
    pub fn from_3d_data(
        data3d: Array3<T>,
        knots: Vec<T>,
        symm: Option<Vec<i32>>,
    ) -> Result<Self, SVEError> {
        let (polyorder, nsegments, npolys) = data3d.dim();
        if let Some(ref s) = symm {
            if s.len() != npolys {
                return Err(SVEError::ShapeMismatch(format!(
                    "{} symmetry flags for {} polynomials",
                    s.len(),
                    npolys
                )));
            }
        }

        let polyvec = (0..npolys)
            .map(|l| {
                let data = Array2::from_shape_fn((polyorder, nsegments), |(deg, seg)| {
                    data3d[[deg, seg, l]]
                });
                let sign = symm.as_ref().map_or(0, |s| s[l]);
                PiecewiseLegendrePoly::new(data, knots.clone(), l as i32, sign)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { polyvec })
    }

    /// Coefficient tensor `[degree, segment, function]`
    pub fn get_data(&self) -> Array3<T> {
        let (polyorder, nsegments) = self
            .polyvec
            .first()
            .map_or((0, 0), |p| p.data.dim());
        Array3::from_shape_fn((polyorder, nsegments, self.len()), |(deg, seg, l)| {
            self.polyvec[l].data[[deg, seg]]
        })
    }

    pub fn len(&self) -> usize {
        self.polyvec.len()
    }

    pub fn is_empty(&self) -> bool {
        self.polyvec.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PiecewiseLegendrePoly<T>> {
        self.polyvec.iter()
    }

    /// Polynomials `range.start..range.end` as a new vector
    ///
    /// # Panics
    /// Panics if the range is out of bounds.
    pub fn slice(&self, range: Range<usize>) -> Self {
        Self {
            polyvec: self.polyvec[range].to_vec(),
        }
    }

    /// Evaluate all polynomials at a single point
    pub fn evaluate_at(&self, x: T) -> Vec<T> {
        self.polyvec.iter().map(|poly| poly.evaluate(x)).collect()
    }

    /// Evaluate all polynomials at multiple points, result is [function, point]
    pub fn evaluate_at_many(&self, xs: &[T]) -> Array2<T> {
        let mut results = Array2::from_elem((self.len(), xs.len()), T::zero());
        for (i, poly) in self.polyvec.iter().enumerate() {
            for (j, &x) in xs.iter().enumerate() {
                results[[i, j]] = poly.evaluate(x);
            }
        }
        results
    }

    /// Inner products `<p_l, g>` for every member `p_l`
    pub fn overlap(&self, g: &PiecewiseLegendrePoly<T>) -> Result<Vec<T>, SVEError> {
        self.polyvec.iter().map(|p| p.overlap(g)).collect()
    }

    /// Gram matrix `G[l, m] = <self[l], other[m]>`
    pub fn overlap_matrix(&self, other: &Self) -> Result<Array2<T>, SVEError> {
        let mut gram = Array2::from_elem((self.len(), other.len()), T::zero());
        for (l, p) in self.polyvec.iter().enumerate() {
            for (m, q) in other.polyvec.iter().enumerate() {
                gram[[l, m]] = p.overlap(q)?;
            }
        }
        Ok(gram)
    }

    /// Parities of all members
    pub fn symm(&self) -> Vec<i32> {
        self.polyvec.iter().map(|p| p.symm).collect()
    }

    /// # Panics
    /// Panics if the vector is empty.
    pub fn xmin(&self) -> T {
        self.polyvec[0].xmin
    }

    /// # Panics
    /// Panics if the vector is empty.
    pub fn xmax(&self) -> T {
        self.polyvec[0].xmax
    }

    /// Knots shared by the members
    ///
    /// # Panics
    /// Panics if the vector is empty.
    pub fn knots(&self) -> &[T] {
        &self.polyvec[0].knots
    }
}

impl<T> Index<usize> for PiecewiseLegendrePolyVector<T> {
    type Output = PiecewiseLegendrePoly<T>;

    fn index(&self, index: usize) -> &Self::Output {
        &self.polyvec[index]
    }
}

impl<T> IndexMut<usize> for PiecewiseLegendrePolyVector<T> {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.polyvec[index]
    }
}

#[cfg(test)]
#[path = "poly_tests.rs"]
mod tests;
