//! Numerical integration of scalar functions over an interval.
//!
//! Provides fixed-segment trapezoid, iteratively refined trapezoid
//! (halving or mid-point tripling), Simpson, and Gauss-Kronrod quadrature
//! (adaptive G7/K15 and the non-adaptive 10/21/43/87-point rules).
//!
//! Every integrator is configured at construction and is immutable
//! afterwards; the bookkeeping of a run (error estimate, number of function
//! evaluations) is returned in an [`Estimate`].

pub mod kronrod;

pub use kronrod::{GaussKronrodAdaptive, GaussKronrodNonAdaptive};

use std::marker::PhantomData;

use log::{debug, trace};
use ql_core::{
    errors::{Error, Result},
    Real, Size,
};

/// Result of an integration together with its bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Estimate {
    /// The integral estimate.
    pub value: Real,
    /// Estimated absolute error, when the method provides one.
    pub absolute_error: Option<Real>,
    /// Number of integrand evaluations.
    pub evaluations: Size,
}

/// A numerical integrator.
pub trait Integrator {
    /// Integrate `f` on `[a, b]` where `a < b`.
    fn integrate_interval<F: Fn(Real) -> Real>(&self, f: &F, a: Real, b: Real) -> Result<Estimate>;

    /// Integrate `f` from `a` to `b` with bookkeeping.
    ///
    /// An empty interval integrates to zero without evaluating `f`;
    /// reversed bounds negate the result.
    fn estimate<F: Fn(Real) -> Real>(&self, f: F, a: Real, b: Real) -> Result<Estimate> {
        if a == b {
            return Ok(Estimate {
                absolute_error: Some(0.0),
                ..Estimate::default()
            });
        }
        if b > a {
            self.integrate_interval(&f, a, b)
        } else {
            let e = self.integrate_interval(&f, b, a)?;
            Ok(Estimate {
                value: -e.value,
                ..e
            })
        }
    }

    /// Integrate `f` from `a` to `b`.
    fn integrate<F: Fn(Real) -> Real>(&self, f: F, a: Real, b: Real) -> Result<Real> {
        self.estimate(f, a, b).map(|e| e.value)
    }
}

fn check_accuracy(accuracy: Real) -> Result<()> {
    if accuracy.is_nan() || accuracy <= 0.0 {
        return Err(Error::InvalidArgument(format!(
            "absolute accuracy must be positive, got {accuracy}"
        )));
    }
    Ok(())
}

// ── Segment ───────────────────────────────────────────────────────────────────

/// Composite trapezoid rule over a fixed number of equal segments.
#[derive(Debug, Clone)]
pub struct SegmentIntegral {
    intervals: Size,
}

impl SegmentIntegral {
    /// Create a segment integrator with `intervals ≥ 1` segments.
    pub fn new(intervals: Size) -> Result<Self> {
        if intervals == 0 {
            return Err(Error::InvalidArgument("at least 1 interval needed".into()));
        }
        Ok(Self { intervals })
    }

    /// Number of segments.
    pub fn intervals(&self) -> Size {
        self.intervals
    }
}

impl Integrator for SegmentIntegral {
    fn integrate_interval<F: Fn(Real) -> Real>(&self, f: &F, a: Real, b: Real) -> Result<Estimate> {
        let n = self.intervals;
        let dx = (b - a) / n as Real;
        let mut sum = 0.5 * (f(a) + f(b));
        for i in 1..n {
            sum += f(a + i as Real * dx);
        }
        Ok(Estimate {
            value: sum * dx,
            absolute_error: None,
            evaluations: n + 1,
        })
    }
}

// ── Trapezoid ─────────────────────────────────────────────────────────────────

/// How [`TrapezoidIntegral`] refines an estimate.
pub trait IntegrationPolicy {
    /// Factor by which each refinement multiplies the number of intervals.
    const GROWTH: Size;

    /// New estimate from `previous`, computed on `intervals` equal
    /// intervals of `[a, b]`. Returns the estimate and the number of new
    /// evaluations.
    fn refine<F: Fn(Real) -> Real>(
        f: &F,
        a: Real,
        b: Real,
        previous: Real,
        intervals: Size,
    ) -> (Real, Size);
}

/// Halve every interval: one new evaluation per interval.
#[derive(Debug, Clone, Copy, Default)]
pub struct Halving;

impl IntegrationPolicy for Halving {
    const GROWTH: Size = 2;

    fn refine<F: Fn(Real) -> Real>(
        f: &F,
        a: Real,
        b: Real,
        previous: Real,
        intervals: Size,
    ) -> (Real, Size) {
        let dx = (b - a) / intervals as Real;
        let x0 = a + 0.5 * dx;
        let sum: Real = (0..intervals).map(|i| f(x0 + i as Real * dx)).sum();
        (0.5 * (previous + dx * sum), intervals)
    }
}

/// Split every interval in three: two new evaluations per interval.
#[derive(Debug, Clone, Copy, Default)]
pub struct MidPoint;

impl IntegrationPolicy for MidPoint {
    const GROWTH: Size = 3;

    fn refine<F: Fn(Real) -> Real>(
        f: &F,
        a: Real,
        b: Real,
        previous: Real,
        intervals: Size,
    ) -> (Real, Size) {
        let dx = (b - a) / intervals as Real;
        let x0 = a + dx / 6.0;
        let d = 2.0 * dx / 3.0;
        let sum: Real = (0..intervals)
            .map(|i| {
                let x = x0 + i as Real * dx;
                f(x) + f(x + d)
            })
            .sum();
        ((previous + dx * sum) / 3.0, 2 * intervals)
    }
}

/// Stop once successive estimates agree and enough refinements have run.
const MIN_REFINEMENTS: Size = 5;

/// Trapezoid rule with successive refinement until two estimates agree.
#[derive(Debug, Clone)]
pub struct TrapezoidIntegral<P: IntegrationPolicy = Halving> {
    absolute_accuracy: Real,
    max_iterations: Size,
    policy: PhantomData<P>,
}

impl<P: IntegrationPolicy> TrapezoidIntegral<P> {
    /// Create a trapezoid integrator.
    pub fn new(absolute_accuracy: Real, max_iterations: Size) -> Result<Self> {
        check_accuracy(absolute_accuracy)?;
        Ok(Self {
            absolute_accuracy,
            max_iterations,
            policy: PhantomData,
        })
    }

    /// Requested absolute accuracy.
    pub fn absolute_accuracy(&self) -> Real {
        self.absolute_accuracy
    }

    /// Maximum number of refinements.
    pub fn max_iterations(&self) -> Size {
        self.max_iterations
    }
}

impl<P: IntegrationPolicy> Integrator for TrapezoidIntegral<P> {
    fn integrate_interval<F: Fn(Real) -> Real>(&self, f: &F, a: Real, b: Real) -> Result<Estimate> {
        let mut intervals = 1;
        let mut estimate = 0.5 * (f(a) + f(b)) * (b - a);
        let mut evaluations = 2;

        let mut i = 1;
        loop {
            let (refined, new_evals) = P::refine(f, a, b, estimate, intervals);
            intervals *= P::GROWTH;
            evaluations += new_evals;
            let diff = (estimate - refined).abs();
            trace!("trapezoid refinement {i}: {refined} with {intervals} intervals");
            if diff <= self.absolute_accuracy && i > MIN_REFINEMENTS {
                debug!("trapezoid converged to {refined} after {evaluations} evaluations");
                return Ok(Estimate {
                    value: refined,
                    absolute_error: Some(diff),
                    evaluations,
                });
            }
            estimate = refined;
            i += 1;
            if i >= self.max_iterations {
                return Err(Error::NotConverged(format!(
                    "max number of iterations ({}) reached",
                    self.max_iterations
                )));
            }
        }
    }
}

// ── Simpson ───────────────────────────────────────────────────────────────────

/// Simpson's rule as the Richardson extrapolation of successive halving
/// trapezoid estimates.
#[derive(Debug, Clone)]
pub struct SimpsonIntegral {
    absolute_accuracy: Real,
    max_iterations: Size,
}

impl SimpsonIntegral {
    /// Create a Simpson integrator.
    pub fn new(absolute_accuracy: Real, max_iterations: Size) -> Result<Self> {
        check_accuracy(absolute_accuracy)?;
        Ok(Self {
            absolute_accuracy,
            max_iterations,
        })
    }
}

impl Integrator for SimpsonIntegral {
    fn integrate_interval<F: Fn(Real) -> Real>(&self, f: &F, a: Real, b: Real) -> Result<Estimate> {
        let mut intervals = 1;
        let mut trapezoid = 0.5 * (f(a) + f(b)) * (b - a);
        let mut simpson = trapezoid;
        let mut evaluations = 2;

        let mut i = 1;
        loop {
            let (refined, new_evals) = Halving::refine(f, a, b, trapezoid, intervals);
            intervals *= Halving::GROWTH;
            evaluations += new_evals;
            let extrapolated = (4.0 * refined - trapezoid) / 3.0;
            let diff = (simpson - extrapolated).abs();
            if diff <= self.absolute_accuracy && i > MIN_REFINEMENTS {
                debug!("Simpson converged to {extrapolated} after {evaluations} evaluations");
                return Ok(Estimate {
                    value: extrapolated,
                    absolute_error: Some(diff),
                    evaluations,
                });
            }
            simpson = extrapolated;
            trapezoid = refined;
            i += 1;
            if i >= self.max_iterations {
                return Err(Error::NotConverged(format!(
                    "max number of iterations ({}) reached",
                    self.max_iterations
                )));
            }
        }
    }
}
