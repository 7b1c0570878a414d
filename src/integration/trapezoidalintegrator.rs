use nalgebra::DVector;

use crate::integration::integrationerror::IntegrationError;
use crate::integration::integrationresult::{
    IntegrationMethod,
    IntegrationResult
};
use crate::math::curve::curve::Curve;
use crate::sample::sampleset::{
    Interval,
    SampleSet
};

/// Composite trapezoidal rule on raw samples.
///
/// Steps may vary from one pair of samples to the next; each panel uses its
/// own width.
#[derive(Debug, Default, Clone, Copy)]
pub struct TrapezoidalIntegrator;

impl TrapezoidalIntegrator {
    pub fn new() -> TrapezoidalIntegrator {
        TrapezoidalIntegrator
    }

    pub fn integrate(&self,
                     samples: &SampleSet,
                     interval: &Interval) -> Result<IntegrationResult, IntegrationError> {
        let restricted = samples.restrict(interval);
        check_point_count(restricted.len())?;
        let value = trapezoid_sum(restricted.x(), restricted.y());
        Ok(IntegrationResult::one_shot(IntegrationMethod::Trapezoidal, value, restricted.len()))
    }

    /// Applies the rule to `curve` sampled at `points` uniform abscissae over `interval`.
    pub fn integrate_curve<C: Curve + ?Sized>(&self,
                                              curve: &C,
                                              interval: &Interval,
                                              points: usize) -> Result<IntegrationResult, IntegrationError> {
        check_point_count(points)?;
        let x = DVector::from_vec(interval.linspace(points));
        let y = x.map(|xi| curve.value(xi));
        let value = trapezoid_sum(&x, &y);
        Ok(IntegrationResult::one_shot(IntegrationMethod::Trapezoidal, value, points))
    }
}

fn check_point_count(found: usize) -> Result<(), IntegrationError> {
    if found < 2 {
        return Err(IntegrationError::InsufficientSamples {
            method: IntegrationMethod::Trapezoidal,
            required: 2,
            found,
        });
    }
    Ok(())
}

/// sum_k (x[k+1] - x[k]) * (y[k] + y[k+1]) / 2
fn trapezoid_sum(x: &DVector<f64>, y: &DVector<f64>) -> f64 {
    let n = x.len() - 1;
    let widths = &x.rows(1, n) - &x.rows(0, n);
    let heights = (&y.rows(1, n) + &y.rows(0, n)) * 0.5;
    widths.dot(&heights)
}
