//! Kernel matrix discretization
//!
//! This module discretizes kernels on piecewise Gauss quadrature grids and
//! stores them as matrices for the singular value decomposition.

use crate::gauss::Rule;
use crate::kernel::Kernel;
use crate::numeric::CustomNumeric;
use ndarray::Array2;
use rayon::prelude::*;
use xprec_svd::Precision;

/// This structure stores a discrete kernel matrix along with the corresponding
/// Gauss quadrature rules for x and y coordinates. Row `i` belongs to the
/// quadrature point `gauss_x.x[i]`, column `j` to `gauss_y.x[j]`.
#[derive(Debug, Clone)]
pub struct DiscretizedKernel<T> {
    /// Kernel values K(x_i, y_j)
    pub matrix: Array2<T>,
    /// Gauss quadrature rule for x coordinates
    pub gauss_x: Rule<T>,
    /// Gauss quadrature rule for y coordinates
    pub gauss_y: Rule<T>,
}

impl<T: CustomNumeric> DiscretizedKernel<T> {
    pub fn new(matrix: Array2<T>, gauss_x: Rule<T>, gauss_y: Rule<T>) -> Self {
        Self {
            matrix,
            gauss_x,
            gauss_y,
        }
    }

    pub fn nrows(&self) -> usize {
        self.matrix.nrows()
    }

    pub fn ncols(&self) -> usize {
        self.matrix.ncols()
    }

    /// Apply weights for SVE computation
    ///
    /// Returns A[i, j] = sqrt(wx_i) K(x_i, y_j) sqrt(wy_j), whose singular
    /// values approximate those of the integral operator. The stored matrix
    /// remains unchanged.
    pub fn apply_weights_for_sve(&self) -> Array2<T> {
        let sqrt_wx: Vec<T> = self.gauss_x.w.iter().map(|&w| Precision::sqrt(w)).collect();
        let sqrt_wy: Vec<T> = self.gauss_y.w.iter().map(|&w| Precision::sqrt(w)).collect();
        Array2::from_shape_fn(self.matrix.dim(), |(i, j)| {
            sqrt_wx[i] * self.matrix[[i, j]] * sqrt_wy[j]
        })
    }
}

/// Compute matrix from Gauss quadrature rules
///
/// Evaluates the kernel at all combinations of Gauss points, rows in
/// parallel.
pub fn matrix_from_gauss<T: CustomNumeric, K: Kernel>(
    kernel: &K,
    gauss_x: &Rule<T>,
    gauss_y: &Rule<T>,
) -> DiscretizedKernel<T> {
    let n = gauss_x.len();
    let m = gauss_y.len();

    let rows: Vec<Vec<T>> = gauss_x
        .x
        .par_iter()
        .map(|&x| gauss_y.x.iter().map(|&y| kernel.compute(x, y)).collect())
        .collect();

    let matrix = Array2::from_shape_fn((n, m), |(i, j)| rows[i][j]);
    DiscretizedKernel::new(matrix, gauss_x.clone(), gauss_y.clone())
}
