use super::*;
use crate::Df64;
use approx::{assert_abs_diff_eq, assert_relative_eq};

/// Kernel without centrosymmetry, K(x, y) = exp(x y) on [0, 1] × [-1, 1]
struct SkewKernel;

impl Kernel for SkewKernel {
    fn compute<T: CustomNumeric>(&self, x: T, y: T) -> T {
        (x * y).exp()
    }

    fn xrange(&self) -> (f64, f64) {
        (0.0, 1.0)
    }

    fn yrange(&self) -> (f64, f64) {
        (-1.0, 1.0)
    }

    fn sve_hints(&self, _epsilon: f64) -> Result<SVEHints, SVEError> {
        Ok(SVEHints {
            segments_x: vec![0.0, 1.0],
            segments_y: vec![-1.0, 0.0, 1.0],
            ngauss: 8,
            nsvals: 8,
        })
    }

    fn is_centrosymmetric(&self) -> bool {
        false
    }
}

fn naive_logistic(lambda: f64, x: f64, y: f64) -> f64 {
    (-lambda * y * (x + 1.0) / 2.0).exp() / (1.0 + (-lambda * y).exp())
}

fn naive_bose(lambda: f64, x: f64, y: f64) -> f64 {
    y * (-lambda * y * (x + 1.0) / 2.0).exp() / (1.0 - (-lambda * y).exp())
}

fn assert_valid_segments(segments: &[f64], lo: f64, hi: f64) {
    assert_eq!(segments[0], lo);
    assert_eq!(segments[segments.len() - 1], hi);
    for pair in segments.windows(2) {
        assert!(pair[0] < pair[1], "segments not increasing: {pair:?}");
    }
}

#[test]
fn test_logistic_kernel_basics() {
    let kernel = LogisticKernel::new(10.0);
    assert_eq!(kernel.lambda(), 10.0);
    assert_eq!(kernel.xrange(), (-1.0, 1.0));
    assert_eq!(kernel.yrange(), (-1.0, 1.0));
    assert!(kernel.is_centrosymmetric());
    assert_abs_diff_eq!(kernel.compute(0.0, 0.0), 0.5, epsilon = 1e-15);
}

#[test]
#[should_panic]
fn test_logistic_kernel_rejects_negative_lambda() {
    LogisticKernel::new(-1.0);
}

#[test]
fn test_logistic_kernel_matches_naive_formula() {
    let kernel = LogisticKernel::new(10.0);
    for &x in &[-1.0, -0.3, 0.0, 0.5, 1.0] {
        for &y in &[-1.0, -0.2, 0.0, 0.7, 1.0] {
            assert_relative_eq!(
                kernel.compute(x, y),
                naive_logistic(10.0, x, y),
                max_relative = 1e-13
            );
        }
    }
}

#[test]
fn test_logistic_kernel_centrosymmetric_values() {
    let kernel = LogisticKernel::new(42.0);
    for &(x, y) in &[(0.3, 0.8), (-0.9, 0.1), (1.0, -1.0), (0.0, 0.5)] {
        assert_relative_eq!(
            kernel.compute(x, y),
            kernel.compute(-x, -y),
            max_relative = 1e-14
        );
    }
}

#[test]
fn test_logistic_kernel_no_overflow() {
    let kernel = LogisticKernel::new(1e4);
    for &(x, y) in &[(-1.0, -1.0), (1.0, 1.0), (-1.0, 1.0), (1.0, -1.0), (0.0, -1.0)] {
        let value = kernel.compute(x, y);
        assert!(value.is_finite(), "K({x}, {y}) = {value}");
        assert!(value >= 0.0);
    }
    // K(-1, y) = 1/(1 + exp(-Λy)) -> 1 for large positive Λy
    assert_abs_diff_eq!(kernel.compute(-1.0, 1.0), 1.0, epsilon = 1e-15);
}

#[test]
fn test_logistic_kernel_df64_agrees_with_f64() {
    let kernel = LogisticKernel::new(42.0);
    for &(x, y) in &[(0.25, 0.5), (-0.75, -0.125), (0.5, -1.0)] {
        let x2 = <Df64 as Precision>::from_f64(x);
        let y2 = <Df64 as Precision>::from_f64(y);
        let value = kernel.compute(x2, y2).to_f64();
        assert_relative_eq!(value, kernel.compute(x, y), max_relative = 1e-14);
    }
}

#[test]
fn test_bose_kernel_basics() {
    let kernel = RegularizedBoseKernel::new(10.0);
    assert_eq!(kernel.lambda(), 10.0);
    assert!(kernel.is_centrosymmetric());
    // continuous continuation at y = 0
    assert_relative_eq!(kernel.compute(0.3, 0.0), 0.1, max_relative = 1e-15);
    assert_relative_eq!(kernel.compute(0.3, 1e-12), 0.1, max_relative = 1e-10);
}

#[test]
#[should_panic]
fn test_bose_kernel_rejects_zero_lambda() {
    RegularizedBoseKernel::new(0.0);
}

#[test]
fn test_bose_kernel_matches_naive_formula() {
    let kernel = RegularizedBoseKernel::new(10.0);
    for &x in &[-1.0, -0.4, 0.0, 0.6, 1.0] {
        for &y in &[-1.0, -0.3, 0.2, 1.0] {
            assert_relative_eq!(
                kernel.compute(x, y),
                naive_bose(10.0, x, y),
                max_relative = 1e-12
            );
        }
    }
}

#[test]
fn test_bose_kernel_centrosymmetric_values() {
    let kernel = RegularizedBoseKernel::new(100.0);
    for &(x, y) in &[(0.3, 0.8), (-0.9, 0.1), (1.0, -1.0)] {
        assert_relative_eq!(
            kernel.compute(x, y),
            kernel.compute(-x, -y),
            max_relative = 1e-14
        );
    }
}

#[test]
fn test_logistic_hints() {
    let hints = LogisticKernel::new(42.0).sve_hints(1e-6).unwrap();

    assert_eq!(hints.ngauss, 10);
    assert_eq!(hints.nsvals, 43);
    assert_eq!(hints.segments_x.len(), 49);
    assert_eq!(hints.segments_y.len(), 65);
    assert_valid_segments(&hints.segments_x, -1.0, 1.0);
    assert_valid_segments(&hints.segments_y, -1.0, 1.0);
    assert!(hints.segments_x.contains(&0.0));
    assert!(hints.segments_y.contains(&0.0));

    let n = hints.segments_x.len();
    for i in 0..n {
        assert_abs_diff_eq!(
            hints.segments_x[i],
            -hints.segments_x[n - 1 - i],
            epsilon = 1e-14
        );
    }

    let accurate = LogisticKernel::new(42.0).sve_hints(1e-12).unwrap();
    assert_eq!(accurate.ngauss, 16);
}

#[test]
fn test_logistic_hints_small_lambda() {
    let hints = LogisticKernel::new(10.0).sve_hints(1e-6).unwrap();
    assert_eq!(hints.segments_x.len(), 31);
    assert_eq!(hints.segments_y.len(), 41);
    assert_eq!(hints.nsvals, 26);

    // below Λ = 1 the minimum counts apply
    let tiny = LogisticKernel::new(0.5).sve_hints(1e-6).unwrap();
    assert_eq!(tiny.segments_x, vec![-1.0, 0.0, 1.0]);
    assert_valid_segments(&tiny.segments_y, -1.0, 1.0);
    assert_eq!(tiny.segments_y.len(), 5);
}

#[test]
fn test_bose_hints() {
    let hints = RegularizedBoseKernel::new(10.0).sve_hints(1e-6).unwrap();
    assert_eq!(hints.ngauss, 10);
    assert_eq!(hints.nsvals, 28);
    assert_eq!(hints.segments_x.len(), 31);
    assert_eq!(hints.segments_y.len(), 41);
    assert_valid_segments(&hints.segments_x, -1.0, 1.0);
    assert_valid_segments(&hints.segments_y, -1.0, 1.0);
}

#[test]
fn test_reduced_kernel_rejects_bad_sign() {
    let kernel = LogisticKernel::new(10.0);
    assert!(matches!(
        kernel.get_symmetrized(2),
        Err(SVEError::InvalidSymmetrySign(2))
    ));
    assert!(matches!(
        kernel.get_symmetrized(0),
        Err(SVEError::InvalidSymmetrySign(0))
    ));
}

#[test]
fn test_reduced_kernel_requires_centrosymmetry() {
    assert!(matches!(
        SkewKernel.get_symmetrized(1),
        Err(SVEError::NotCentrosymmetric)
    ));

    // a reduced kernel is not centrosymmetric itself
    let kernel = LogisticKernel::new(10.0);
    let even = kernel.get_symmetrized(1).unwrap();
    assert!(!even.is_centrosymmetric());
    assert!(matches!(
        even.get_symmetrized(1),
        Err(SVEError::NotCentrosymmetric)
    ));
}

#[test]
fn test_reduced_kernel_values() {
    let kernel = LogisticKernel::new(10.0);
    let even = kernel.get_symmetrized(1).unwrap();
    let odd = kernel.get_symmetrized(-1).unwrap();

    assert_eq!(even.sign(), 1);
    assert_eq!(odd.sign(), -1);
    assert_eq!(even.xrange(), (0.0, 1.0));
    assert_eq!(even.yrange(), (0.0, 1.0));

    for &(x, y) in &[(0.2, 0.3), (0.9, 0.05), (0.0, 1.0)] {
        let plus = kernel.compute(x, y);
        let minus = kernel.compute(x, -y);
        assert_relative_eq!(even.compute(x, y), plus + minus, max_relative = 1e-15);
        assert_abs_diff_eq!(odd.compute(x, y), plus - minus, epsilon = 1e-15);
    }

    // odd kernel vanishes on y = 0
    assert_abs_diff_eq!(odd.compute(0.4, 0.0), 0.0, epsilon = 1e-16);
}

#[test]
fn test_reduced_kernel_hints() {
    let kernel = LogisticKernel::new(42.0);
    let full = kernel.sve_hints(1e-6).unwrap();
    let reduced = kernel.get_symmetrized(-1).unwrap().sve_hints(1e-6).unwrap();

    assert_eq!(reduced.ngauss, full.ngauss);
    assert_eq!(reduced.nsvals, 22);
    assert_eq!(reduced.segments_x.len(), 25);
    assert_eq!(reduced.segments_y.len(), 33);
    assert_valid_segments(&reduced.segments_x, 0.0, 1.0);
    assert_valid_segments(&reduced.segments_y, 0.0, 1.0);
    assert_eq!(&reduced.segments_x[..], &full.segments_x[24..]);
}

#[test]
fn test_positive_half() {
    assert_eq!(
        positive_half(&[-1.0, -0.5, 0.5, 1.0]).unwrap(),
        vec![0.0, 0.5, 1.0]
    );
    assert_eq!(
        positive_half(&[-1.0, 0.0, 1.0]).unwrap(),
        vec![0.0, 1.0]
    );
    assert!(matches!(
        positive_half(&[-1.0, 0.2, 1.0]),
        Err(SVEError::InvalidSegments(_))
    ));
}

#[test]
fn test_reference_kernel_forwards() {
    let kernel = LogisticKernel::new(10.0);
    let by_ref = &kernel;
    assert_eq!(Kernel::xrange(&by_ref), kernel.xrange());
    assert_eq!(by_ref.compute(0.1, 0.2), kernel.compute(0.1, 0.2));
    assert_eq!(
        Kernel::sve_hints(&by_ref, 1e-6).unwrap(),
        kernel.sve_hints(1e-6).unwrap()
    );
}
