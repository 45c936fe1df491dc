//! Tests ported from QuantLib `test-suite/integrals.cpp`.
//!
//! Every integrator is run against the same set of integrands with known
//! closed-form integrals.

use std::f64::consts::PI;

use ql_core::Error;
use ql_math::integrals::{Halving, MidPoint};
use ql_math::{
    GaussKronrodAdaptive, GaussKronrodNonAdaptive, Integrator, SegmentIntegral, SimpsonIntegral,
    TrapezoidIntegral,
};
use statrs::distribution::{Continuous, Normal};

const TOLERANCE: f64 = 1.0e-6;

fn check_single<I: Integrator, F: Fn(f64) -> f64>(
    integrator: &I,
    tag: &str,
    f: F,
    x_min: f64,
    x_max: f64,
    expected: f64,
) {
    let calculated = integrator.integrate(f, x_min, x_max).unwrap();
    assert!(
        (calculated - expected).abs() <= TOLERANCE,
        "integrating {tag}\n    calculated: {calculated}\n    expected:   {expected}",
    );
}

fn check_several<I: Integrator>(integrator: &I) {
    let normal = Normal::new(0.0, 1.0).unwrap();
    check_single(integrator, "f(x) = 1", |_| 1.0, 0.0, 1.0, 1.0);
    check_single(integrator, "f(x) = x", |x| x, 0.0, 1.0, 0.5);
    check_single(integrator, "f(x) = x^2", |x| x * x, 0.0, 1.0, 1.0 / 3.0);
    check_single(integrator, "f(x) = sin(x)", f64::sin, 0.0, PI, 2.0);
    check_single(integrator, "f(x) = cos(x)", f64::cos, 0.0, PI, 0.0);
    check_single(
        integrator,
        "f(x) = Gaussian(x)",
        |x| normal.pdf(x),
        -10.0,
        10.0,
        1.0,
    );
}

// ───────────────────────── testSeveral ─────────────────────────

#[test]
fn test_segment() {
    check_several(&SegmentIntegral::new(10_000).unwrap());
}

#[test]
fn test_trapezoid() {
    check_several(&TrapezoidIntegral::<Halving>::new(TOLERANCE, 10_000).unwrap());
}

#[test]
fn test_mid_point_trapezoid() {
    check_several(&TrapezoidIntegral::<MidPoint>::new(TOLERANCE, 10_000).unwrap());
}

#[test]
fn test_simpson() {
    check_several(&SimpsonIntegral::new(TOLERANCE, 10_000).unwrap());
}

#[test]
fn test_gauss_kronrod_adaptive() {
    check_several(&GaussKronrodAdaptive::new(TOLERANCE, 1000).unwrap());
}

#[test]
fn test_gauss_kronrod_non_adaptive() {
    check_several(&GaussKronrodNonAdaptive::new(TOLERANCE, 100, TOLERANCE).unwrap());
}

// ───────────────────────── convergence ─────────────────────────

#[test]
fn test_linear_integrand_for_all_interval_counts() {
    for n in 1..=100 {
        let segment = SegmentIntegral::new(n).unwrap();
        let result = segment.integrate(|x| x, 0.0, 1.0).unwrap();
        assert!((result - 0.5).abs() < 1e-10, "segment, n = {n}");

        let trapezoid = TrapezoidIntegral::<Halving>::new(1e-10, n + 6).unwrap();
        let result = trapezoid.integrate(|x| x, 0.0, 1.0).unwrap();
        assert!((result - 0.5).abs() < 1e-10, "trapezoid, n = {n}");
    }
}

#[test]
fn test_segment_squares() {
    let result = SegmentIntegral::new(1000)
        .unwrap()
        .integrate(|x| x * x, 0.0, 1.0)
        .unwrap();
    assert!((result - 1.0 / 3.0).abs() < 1e-6);
}

#[test]
fn test_adaptive_squares_within_tolerance() {
    let gk = GaussKronrodAdaptive::new(1e-8, 1000).unwrap();
    let result = gk.integrate(|x| x * x, 0.0, 1.0).unwrap();
    assert!((result - 1.0 / 3.0).abs() <= 1e-8);
}

#[test]
fn test_oscillatory_integrand_exhausts_budget() {
    let gk = GaussKronrodAdaptive::new(1e-14, 50).unwrap();
    let err = gk.integrate(|x| (1000.0 * x * x).sin(), 0.0, 10.0).unwrap_err();
    assert!(matches!(err, Error::EvaluationBudgetExceeded { max: 50, .. }));
    assert!(err.is_convergence_failure());
    assert!(err.to_string().contains("failed to converge"));
}

#[test]
fn test_non_adaptive_reports_bookkeeping() {
    let gk = GaussKronrodNonAdaptive::new(TOLERANCE, 100, TOLERANCE).unwrap();
    let e = gk.estimate(f64::exp, 0.0, 1.0).unwrap();
    assert!((e.value - (1.0f64.exp() - 1.0)).abs() < 1e-12);
    assert_eq!(e.evaluations, 21);
    assert!(e.absolute_error.unwrap() < TOLERANCE);
}

#[test]
fn test_reversed_bounds_negate() {
    let simpson = SimpsonIntegral::new(TOLERANCE, 10_000).unwrap();
    let forward = simpson.integrate(f64::sin, 0.0, PI).unwrap();
    let backward = simpson.integrate(f64::sin, PI, 0.0).unwrap();
    assert_eq!(forward, -backward);
}
