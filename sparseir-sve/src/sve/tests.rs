//! Tests for the interplay of strategies, SVD and post-processing

use super::*;
use crate::kernel::{Kernel, LogisticKernel};
use crate::Df64;
use approx::assert_abs_diff_eq;
use xprec_svd::Precision;

fn params_f64(epsilon: f64) -> SVEParams {
    SVEParams::default()
        .with_epsilon(epsilon)
        .with_twork(TworkType::Float64)
}

#[test]
fn test_sampling_and_centrosymmetric_agree() {
    let kernel = LogisticKernel::new(10.0);
    let sampling: SVEResult<f64> = compute_sve(
        &kernel,
        &params_f64(1e-6).with_sve_strategy(SVEStrategyKind::Sampling),
    )
    .unwrap();
    let centrosymm: SVEResult<f64> = compute_sve(
        &kernel,
        &params_f64(1e-6).with_sve_strategy(SVEStrategyKind::Centrosymmetric),
    )
    .unwrap();

    assert_eq!(sampling.s.len(), centrosymm.s.len());
    let s0 = sampling.s[0];
    for (a, b) in sampling.s.iter().zip(centrosymm.s.iter()) {
        assert_abs_diff_eq!(*a, *b, epsilon = 1e-10 * s0);
    }

    // same functions up to the common sign convention
    for l in 0..4 {
        for &x in &[-0.9, -0.2, 0.3, 0.8] {
            assert_abs_diff_eq!(
                sampling.u[l].evaluate(x),
                centrosymm.u[l].evaluate(x),
                epsilon = 1e-7
            );
        }
    }
}

#[test]
fn test_auto_strategy_uses_symmetry() {
    let kernel = LogisticKernel::new(10.0);
    let auto: SVEResult<f64> = compute_sve(&kernel, &params_f64(1e-6)).unwrap();
    // parity tags are only attached by the centrosymmetric strategy
    assert!(auto.u.symm().iter().all(|&s| s == 1 || s == -1));

    let sampling: SVEResult<f64> = compute_sve(
        &kernel,
        &params_f64(1e-6).with_sve_strategy(SVEStrategyKind::Sampling),
    )
    .unwrap();
    assert!(sampling.u.symm().iter().all(|&s| s == 0));
}

#[test]
fn test_centrosymmetric_knots_are_full_domain() {
    let kernel = LogisticKernel::new(10.0);
    let hints = kernel.sve_hints(1e-6).unwrap();
    let result: SVEResult<f64> = compute_sve(&kernel, &params_f64(1e-6)).unwrap();

    assert_eq!(result.u.knots(), &hints.segments_x[..]);
    assert_eq!(result.v.knots(), &hints.segments_y[..]);
    assert_eq!(result.u.xmin(), -1.0);
    assert_eq!(result.u.xmax(), 1.0);
}

#[test]
fn test_single_value_leaves_odd_branch_empty() {
    let kernel = LogisticKernel::new(10.0);
    let result: SVEResult<f64> = compute_sve(&kernel, &params_f64(1e-6).with_n_sv(1)).unwrap();

    assert_eq!(result.s.len(), 1);
    assert_eq!(result.u.symm(), vec![1]);
    assert_eq!(result.v.symm(), vec![1]);
}

#[test]
fn test_manual_pipeline_matches_compute_sve() {
    let kernel = LogisticKernel::new(10.0);
    let epsilon = 1e-6;
    let sve = CentrosymmSVE::<f64, _>::new(&kernel, epsilon, None).unwrap();

    let (u, s, v) = compute_svd(sve.matrices(), sve.nsvals_hint(), SVDStrategy::Fast).unwrap();
    assert_eq!(s.len(), 2);
    let (u, s, v) = truncate(u, s, v, epsilon, None).unwrap();
    let mut manual: SVEResult<f64> = sve.postprocess(u, s, v).unwrap();
    utils::canonicalize(&mut manual.u, &mut manual.v);

    let automatic: SVEResult<f64> = compute_sve(&kernel, &params_f64(epsilon)).unwrap();
    assert_eq!(manual.s, automatic.s);
    assert_eq!(manual.u.get_data(), automatic.u.get_data());
    assert_eq!(manual.v.get_data(), automatic.v.get_data());
}

#[test]
fn test_output_type_df64_from_f64_work() {
    let kernel = LogisticKernel::new(10.0);
    let wide: SVEResult<Df64> = compute_sve(&kernel, &params_f64(1e-6)).unwrap();
    let narrow: SVEResult<f64> = compute_sve(&kernel, &params_f64(1e-6)).unwrap();

    // widening is exact
    assert_eq!(wide.s.len(), narrow.s.len());
    for (w, n) in wide.s.iter().zip(narrow.s.iter()) {
        assert_eq!(w.to_f64(), *n);
    }
    let x = <Df64 as Precision>::from_f64(0.5);
    assert_abs_diff_eq!(
        wide.u[2].evaluate(x).to_f64(),
        narrow.u[2].evaluate(0.5),
        epsilon = 1e-13
    );
}

#[test]
fn test_n_gauss_override() {
    let kernel = LogisticKernel::new(10.0);
    let result: SVEResult<f64> = compute_sve(&kernel, &params_f64(1e-6).with_n_gauss(6)).unwrap();
    assert_eq!(result.u[0].polyorder, 6);
    assert_eq!(result.v[0].polyorder, 6);
}
