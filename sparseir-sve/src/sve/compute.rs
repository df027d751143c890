//! Main SVE computation functions

use ndarray::{s, Array2};

use crate::error::SVEError;
use crate::kernel::Kernel;
use crate::numeric::CustomNumeric;
use crate::Df64;
use xprec_svd::{svd_jacobi, tsvd, TSVDConfig};

use super::result::SVEResult;
use super::strategy::{CentrosymmSVE, SVEMethod, SVEStrategy, SamplingSVE};
use super::types::{choose_accuracy, SVDStrategy, SVEParams, SVEStrategyKind, TworkType};
use super::utils::canonicalize;

/// Main SVE computation function
///
/// Automatically chooses the working precision from the requested accuracy
/// and exploits centrosymmetry when the kernel has it, unless `params`
/// says otherwise. The singular functions and values are returned in the
/// output type `O`.
///
/// # Example
///
/// ```
/// use sparseir_sve::{compute_sve, LogisticKernel, SVEParams};
///
/// let kernel = LogisticKernel::new(10.0);
/// let result = compute_sve::<f64, _>(&kernel, &SVEParams::default().with_epsilon(1e-6)).unwrap();
/// assert!(result.s[0] > result.s[result.s.len() - 1]);
/// ```
///
/// # Errors
///
/// Invalid parameters, malformed kernel hints, a non-centrosymmetric kernel
/// with [`SVEStrategyKind::Centrosymmetric`], failure of the SVD, or no
/// singular value above the cutoff.
pub fn compute_sve<O, K>(kernel: &K, params: &SVEParams) -> Result<SVEResult<O>, SVEError>
where
    O: CustomNumeric,
    K: Kernel,
{
    let choice = choose_accuracy(params.epsilon, params.twork)?;
    if let Some(warning) = &choice.warning {
        log::warn!("{warning}");
    }

    let svd_strategy = match params.svd_strategy {
        SVDStrategy::Auto => choice.svd_strategy,
        other => other,
    };
    log::debug!(
        "SVE: epsilon = {:e}, twork = {:?}, svd strategy = {:?}",
        choice.epsilon,
        choice.twork,
        svd_strategy
    );

    match choice.twork {
        TworkType::Float64 => {
            compute_sve_with_precision::<f64, O, K>(kernel, choice.epsilon, svd_strategy, params)
        }
        TworkType::Float64X2 | TworkType::Auto => compute_sve_with_precision::<Df64, O, K>(
            kernel,
            choice.epsilon,
            svd_strategy,
            params,
        ),
    }
}

/// Compute SVE with specific precision type
fn compute_sve_with_precision<T, O, K>(
    kernel: &K,
    epsilon: f64,
    svd_strategy: SVDStrategy,
    params: &SVEParams,
) -> Result<SVEResult<O>, SVEError>
where
    T: CustomNumeric,
    O: CustomNumeric,
    K: Kernel,
{
    // 1. Determine SVE strategy
    let sve = determine_sve::<T, K>(kernel, epsilon, params)?;

    // 2. Compute matrices
    let matrices = sve.matrices();

    // 3. Compute SVD for each matrix
    let (u_list, s_list, v_list) = compute_svd(matrices, sve.nsvals_hint(), svd_strategy)?;

    // 4. Truncate based on cutoff
    let (u_trunc, s_trunc, v_trunc) =
        truncate(u_list, s_list, v_list, T::from_f64(epsilon), params.n_sv)?;
    log::debug!(
        "SVE: retained {:?} singular values",
        s_trunc.iter().map(Vec::len).collect::<Vec<_>>()
    );

    // 5. Post-process to create SVEResult and fix the sign gauge
    let mut result = sve.postprocess::<O>(u_trunc, s_trunc, v_trunc)?;
    canonicalize(&mut result.u, &mut result.v);
    Ok(result)
}

/// Determine the appropriate SVE strategy
///
/// For centrosymmetric kernels, uses CentrosymmSVE for efficient computation
/// by exploiting even/odd symmetry.
fn determine_sve<'a, T, K>(
    kernel: &'a K,
    epsilon: f64,
    params: &SVEParams,
) -> Result<SVEMethod<'a, T, K>, SVEError>
where
    T: CustomNumeric,
    K: Kernel,
{
    let centrosymmetric = match params.sve_strategy {
        SVEStrategyKind::Auto => kernel.is_centrosymmetric(),
        SVEStrategyKind::Centrosymmetric => true,
        SVEStrategyKind::Sampling => false,
    };
    if centrosymmetric {
        Ok(SVEMethod::Centrosymmetric(CentrosymmSVE::new(
            kernel,
            epsilon,
            params.n_gauss,
        )?))
    } else {
        Ok(SVEMethod::Sampling(SamplingSVE::new(
            kernel,
            epsilon,
            params.n_gauss,
        )?))
    }
}

/// Compute SVD of every matrix in a batch
///
/// `Fast` stops the rank-revealing QR once the pivots drop below the working
/// precision or after `2 * rank_hint + 8` columns; `Accurate`
/// decomposes the full matrix and ignores the hint. `Auto` behaves like
/// `Fast`.
///
/// # Returns
///
/// Tuple of (U list, singular value list, V list) where A = U * S * V^T
pub fn compute_svd<T: CustomNumeric>(
    matrices: Vec<Array2<T>>,
    rank_hint: usize,
    strategy: SVDStrategy,
) -> Result<(Vec<Array2<T>>, Vec<Vec<T>>, Vec<Array2<T>>), SVEError> {
    let mut u_list = Vec::with_capacity(matrices.len());
    let mut s_list = Vec::with_capacity(matrices.len());
    let mut v_list = Vec::with_capacity(matrices.len());

    for matrix in &matrices {
        let result = match strategy {
            SVDStrategy::Accurate => svd_jacobi(matrix)?,
            SVDStrategy::Fast | SVDStrategy::Auto => tsvd(
                matrix,
                TSVDConfig::new(T::epsilon()).with_max_rank(fast_rank_cap(rank_hint)),
            )?,
        };
        log::debug!(
            "SVD of {}x{} matrix: rank {} (expected {})",
            matrix.nrows(),
            matrix.ncols(),
            result.rank,
            rank_hint
        );
        u_list.push(result.u);
        s_list.push(result.s.to_vec());
        v_list.push(result.v);
    }

    Ok((u_list, s_list, v_list))
}

/// Extra columns the fast SVD may keep beyond the expected rank
const RANK_MARGIN: usize = 8;

/// Rank limit of the fast SVD: twice the hint plus a fixed margin
///
/// Kernel hints are estimates, so the limit leaves room for more values than
/// expected while still bounding the QR work for large matrices.
pub(crate) fn fast_rank_cap(rank_hint: usize) -> usize {
    rank_hint.saturating_mul(2).saturating_add(RANK_MARGIN)
}

/// Truncate SVD results based on cutoff and maximum size
///
/// The cutoff is `rtol` times the largest singular value in the batch, raised
/// to the `n_sv`-th largest value when more than `n_sv` values are present.
/// Every entry keeps its leading values strictly above the cutoff; an entry
/// may end up empty.
///
/// # Arguments
///
/// * `u_list` - List of U matrices
/// * `s_list` - List of singular value vectors, each non-increasing
/// * `v_list` - List of V matrices
/// * `rtol` - Relative tolerance for truncation, in [0, 1]
/// * `n_sv` - Maximum number of singular values to keep
///
/// # Errors
///
/// [`SVEError::InvalidParameter`] for `rtol` outside [0, 1] or `n_sv == Some(0)`,
/// [`SVEError::ShapeMismatch`] for lists of different lengths,
/// [`SVEError::EmptyResult`] if no singular value survives.
pub fn truncate<T: CustomNumeric>(
    u_list: Vec<Array2<T>>,
    s_list: Vec<Vec<T>>,
    v_list: Vec<Array2<T>>,
    rtol: T,
    n_sv: Option<usize>,
) -> Result<(Vec<Array2<T>>, Vec<Vec<T>>, Vec<Array2<T>>), SVEError> {
    if !(rtol >= T::zero() && rtol <= T::one()) {
        return Err(SVEError::InvalidParameter(format!(
            "rtol must be in [0, 1], got {:e}",
            rtol.to_f64()
        )));
    }
    if n_sv == Some(0) {
        return Err(SVEError::InvalidParameter(
            "n_sv must be positive".to_string(),
        ));
    }
    if u_list.len() != s_list.len() || v_list.len() != s_list.len() {
        return Err(SVEError::ShapeMismatch(format!(
            "{} U, {} S and {} V factors",
            u_list.len(),
            s_list.len(),
            v_list.len()
        )));
    }

    let mut all_svals: Vec<T> = s_list.iter().flatten().copied().collect();
    let max_sval = all_svals
        .iter()
        .copied()
        .fold(T::zero(), |acc, s| if s > acc { s } else { acc });

    let mut cutoff = rtol * max_sval;
    if let Some(n_sv) = n_sv {
        if n_sv < all_svals.len() {
            all_svals.sort_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));
            if all_svals[n_sv] > cutoff {
                cutoff = all_svals[n_sv];
            }
        }
    }

    let mut u_trunc = Vec::with_capacity(s_list.len());
    let mut s_trunc = Vec::with_capacity(s_list.len());
    let mut v_trunc = Vec::with_capacity(s_list.len());
    let mut total = 0;

    for ((u, s), v) in u_list.into_iter().zip(s_list).zip(v_list) {
        let n_keep = s.iter().take_while(|&&val| val > cutoff).count();
        total += n_keep;
        u_trunc.push(u.slice(s![.., ..n_keep]).to_owned());
        s_trunc.push(s[..n_keep].to_vec());
        v_trunc.push(v.slice(s![.., ..n_keep]).to_owned());
    }

    if total == 0 {
        return Err(SVEError::EmptyResult {
            cutoff: cutoff.to_f64(),
        });
    }
    Ok((u_trunc, s_trunc, v_trunc))
}
