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

/// Largest relative deviation of a sample step from the mean step.
pub const UNIFORM_GRID_TOLERANCE: f64 = 1e-9;

/// Composite Simpson 1/3 rule.
///
/// On raw samples the grid must be uniform with an even number of
/// subintervals; nothing is resampled implicitly. Use `integrate_curve` on an
/// interpolant to integrate data that fails those checks.
#[derive(Debug, Clone, Copy)]
pub struct SimpsonIntegrator {
    uniform_tolerance: f64,
}

impl Default for SimpsonIntegrator {
    fn default() -> Self {
        SimpsonIntegrator { uniform_tolerance: UNIFORM_GRID_TOLERANCE }
    }
}

impl SimpsonIntegrator {
    pub fn new() -> SimpsonIntegrator {
        SimpsonIntegrator::default()
    }

    pub fn with_uniform_tolerance(uniform_tolerance: f64) -> Result<SimpsonIntegrator, IntegrationError> {
        if !uniform_tolerance.is_finite() || uniform_tolerance < 0.0 {
            return Err(IntegrationError::InvalidParameter {
                name: "uniform_tolerance",
                value: uniform_tolerance,
                requirement: "must be finite and non-negative",
            });
        }
        Ok(SimpsonIntegrator { uniform_tolerance })
    }

    pub fn integrate(&self,
                     samples: &SampleSet,
                     interval: &Interval) -> Result<IntegrationResult, IntegrationError> {
        let restricted = samples.restrict(interval);
        let points = restricted.len();
        check_point_count(points)?;

        let intervals = points - 1;
        if intervals % 2 != 0 {
            return Err(IntegrationError::OddIntervalCount { intervals });
        }

        let x = restricted.x();
        let h = (x[intervals] - x[0]) / intervals as f64;
        for (index, pair) in x.as_slice().windows(2).enumerate() {
            let step = pair[1] - pair[0];
            if (step - h).abs() > self.uniform_tolerance * h.abs() {
                return Err(IntegrationError::NonUniformGrid { index, step, expected: h });
            }
        }

        let value = simpson_sum(restricted.y(), h);
        Ok(IntegrationResult::one_shot(IntegrationMethod::Simpson, value, points))
    }

    /// Applies the rule to `curve` on a uniform grid of `points` abscissae over
    /// `interval`. An even `points` is raised by one so that the subinterval
    /// count is even.
    pub fn integrate_curve<C: Curve + ?Sized>(&self,
                                              curve: &C,
                                              interval: &Interval,
                                              points: usize) -> Result<IntegrationResult, IntegrationError> {
        check_point_count(points)?;
        let points = if points % 2 == 0 { points + 1 } else { points };
        let h = interval.width() / (points - 1) as f64;
        let y = DVector::from_iterator(
            points,
            interval.linspace(points).into_iter().map(|xi| curve.value(xi)));
        let value = simpson_sum(&y, h);
        Ok(IntegrationResult::one_shot(IntegrationMethod::Simpson, value, points))
    }
}

fn check_point_count(found: usize) -> Result<(), IntegrationError> {
    if found < 3 {
        return Err(IntegrationError::InsufficientSamples {
            method: IntegrationMethod::Simpson,
            required: 3,
            found,
        });
    }
    Ok(())
}

/// (h/3) [y0 + yn + 4 sum(odd) + 2 sum(even interior)]
fn simpson_sum(y: &DVector<f64>, h: f64) -> f64 {
    let n = y.len() - 1;
    let weights = DVector::from_fn(n + 1, |i, _| {
        if i == 0 || i == n {
            1.0
        } else if i % 2 == 1 {
            4.0
        } else {
            2.0
        }
    });
    h / 3.0 * weights.dot(y)
}
