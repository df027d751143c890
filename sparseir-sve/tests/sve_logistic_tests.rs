//! End-to-end properties of the singular value expansion of the logistic kernel

mod common;

use approx::assert_abs_diff_eq;
use common::{assert_non_increasing, orthonormality_error, reconstruct, SimpleRng};
use sparseir_sve::{
    compute_sve, Kernel, LogisticKernel, SVDStrategy, SVEParams, SVEResult, SVEStrategyKind,
    TworkType,
};

fn logistic_sve(lambda: f64, params: &SVEParams) -> SVEResult<f64> {
    compute_sve(&LogisticKernel::new(lambda), params).expect("SVE failed")
}

fn default_params() -> SVEParams {
    SVEParams::default().with_epsilon(1e-6)
}

#[test]
fn test_singular_values_non_increasing() {
    let result = logistic_sve(42.0, &default_params());
    assert_non_increasing(&result.s.to_vec());
    assert_eq!(result.u.len(), result.s.len());
    assert_eq!(result.v.len(), result.s.len());
    assert_eq!(result.epsilon, 1e-6);

    // strict truncation
    let last = result.s[result.s.len() - 1];
    assert!(last / result.s[0] > 1e-6);
}

#[test]
fn test_singular_functions_orthonormal() {
    let result = logistic_sve(42.0, &default_params());
    assert!(orthonormality_error(&result.u) < 1e-10);
    assert!(orthonormality_error(&result.v) < 1e-10);
}

#[test]
fn test_sign_gauge() {
    let result = logistic_sve(42.0, &default_params());
    for l in 0..result.u.len() {
        assert!(result.u[l].evaluate(1.0) >= 0.0, "u[{l}](1) < 0");
    }
}

#[test]
fn test_alternating_parity() {
    let result = logistic_sve(42.0, &default_params());

    for l in 0..result.u.len() {
        let sign = if l % 2 == 0 { 1.0 } else { -1.0 };
        assert_eq!(result.u[l].symm, sign as i32, "u[{l}] has wrong parity");
        assert_eq!(result.v[l].symm, sign as i32, "v[{l}] has wrong parity");

        for &x in &[0.05, 0.3, 0.77, 1.0] {
            assert_abs_diff_eq!(
                result.u[l].evaluate(-x),
                sign * result.u[l].evaluate(x),
                epsilon = 1e-12
            );
            assert_abs_diff_eq!(
                result.v[l].evaluate(-x),
                sign * result.v[l].evaluate(x),
                epsilon = 1e-12
            );
        }
    }
}

#[test]
fn test_reconstruction_at_held_out_points() {
    let kernel = LogisticKernel::new(42.0);
    let result: SVEResult<f64> = compute_sve(&kernel, &default_params()).unwrap();

    let mut rng = SimpleRng::new(2024);
    for _ in 0..50 {
        let x = rng.uniform(-1.0, 1.0);
        let y = rng.uniform(-1.0, 1.0);
        let exact = kernel.compute(x, y);
        assert_abs_diff_eq!(reconstruct(&result, x, y), exact, epsilon = 1e-4);
    }
}

#[test]
fn test_determinism() {
    let first = logistic_sve(42.0, &default_params());
    let second = logistic_sve(42.0, &default_params());

    assert_eq!(first.s, second.s);
    assert_eq!(first.u.get_data(), second.u.get_data());
    assert_eq!(first.v.get_data(), second.v.get_data());
}

#[test]
fn test_truncation_monotone_in_n_sv() {
    let full = logistic_sve(42.0, &default_params());
    let mut previous = 0;
    for n_sv in [1, 3, 8, 12] {
        let capped = logistic_sve(42.0, &default_params().with_n_sv(n_sv));
        assert_eq!(capped.s.len(), n_sv.min(full.s.len()));
        assert!(capped.s.len() >= previous);
        previous = capped.s.len();

        // a prefix of the uncapped expansion
        for l in 0..capped.s.len() {
            assert_eq!(capped.s[l], full.s[l]);
        }
    }
}

#[test]
fn test_truncation_monotone_in_epsilon() {
    let loose = logistic_sve(42.0, &SVEParams::default().with_epsilon(1e-3));
    let medium = logistic_sve(42.0, &SVEParams::default().with_epsilon(1e-5));
    let tight = logistic_sve(42.0, &SVEParams::default().with_epsilon(1e-7));

    assert!(loose.s.len() <= medium.s.len());
    assert!(medium.s.len() <= tight.s.len());
    assert!(loose.s.len() < tight.s.len());
}

#[test]
fn test_part() {
    let result = logistic_sve(42.0, &default_params());

    let (u, s, v) = result.part(Some(1e-3), None);
    assert!(s.len() < result.s.len());
    assert_eq!(u.len(), s.len());
    assert_eq!(v.len(), s.len());
    assert!(s[s.len() - 1] >= 1e-3 * result.s[0]);

    let (_, s_all, _) = result.part(None, None);
    assert_eq!(s_all.len(), result.s.len());

    let (_, s_capped, _) = result.part(None, Some(4));
    assert_eq!(s_capped.len(), 4);
}

#[test]
fn test_forced_sampling_matches_symmetry() {
    let result = logistic_sve(
        10.0,
        &default_params().with_sve_strategy(SVEStrategyKind::Sampling),
    );
    assert_non_increasing(&result.s.to_vec());
    assert!(orthonormality_error(&result.u) < 1e-10);

    // the plain strategy does not tag parity, but the functions still have it
    for l in 0..6 {
        assert_eq!(result.u[l].symm, 0);
        let sign = if l % 2 == 0 { 1.0 } else { -1.0 };
        for &x in &[0.2, 0.6, 0.9] {
            assert_abs_diff_eq!(
                result.u[l].evaluate(-x),
                sign * result.u[l].evaluate(x),
                epsilon = 1e-8
            );
        }
    }
}

#[test]
fn test_accurate_svd_matches_fast() {
    let params = SVEParams::default()
        .with_epsilon(1e-6)
        .with_twork(TworkType::Float64);
    let fast = logistic_sve(10.0, &params.with_svd_strategy(SVDStrategy::Fast));
    let accurate = logistic_sve(10.0, &params.with_svd_strategy(SVDStrategy::Accurate));

    assert_eq!(fast.s.len(), accurate.s.len());
    for (a, b) in fast.s.iter().zip(accurate.s.iter()) {
        assert_abs_diff_eq!(*a, *b, epsilon = 1e-12 * fast.s[0]);
    }
}

#[test]
fn test_cutoff_below_double_precision_floor() {
    // 1e-10 in double precision takes the accurate SVD and still delivers
    let params = SVEParams::default()
        .with_epsilon(1e-10)
        .with_twork(TworkType::Float64);
    let result = logistic_sve(10.0, &params);
    let coarse = logistic_sve(10.0, &default_params());

    assert_non_increasing(&result.s.to_vec());
    assert!(result.s.len() > coarse.s.len());
    assert!(orthonormality_error(&result.u) < 1e-8);
}
