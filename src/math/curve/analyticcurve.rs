use serde::{
    Deserialize,
    Serialize
};

use crate::math::curve::curve::Curve;
use crate::sample::sampleset::Interval;

/// Integrands known in closed form, used to produce samples and reference
/// values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AnalyticCurve {
    /// f(x) = cos(x) e^x
    CosExp,
    Sine,
    /// Coefficients in ascending powers: c0 + c1 x + c2 x^2 + ...
    Polynomial { coefficients: Vec<f64> },
}

impl Default for AnalyticCurve {
    fn default() -> Self {
        AnalyticCurve::CosExp
    }
}

fn horner(coefficients: &[f64], x: f64) -> f64 {
    coefficients
        .iter()
        .rev()
        .fold(0.0, |result, &c| f64::mul_add(result, x, c))
}

impl AnalyticCurve {
    pub fn name(&self) -> &'static str {
        match self {
            AnalyticCurve::CosExp => "cos(x)*exp(x)",
            AnalyticCurve::Sine => "sin(x)",
            AnalyticCurve::Polynomial { .. } => "polynomial",
        }
    }

    /// An antiderivative F with F' = f.
    pub fn antiderivative(&self, x: f64) -> f64 {
        match self {
            AnalyticCurve::CosExp => 0.5 * x.exp() * (x.sin() + x.cos()),
            AnalyticCurve::Sine => -x.cos(),
            AnalyticCurve::Polynomial { coefficients } => {
                let integrated: Vec<f64> = std::iter::once(0.0)
                    .chain(coefficients.iter().enumerate().map(|(k, c)| c / (k + 1) as f64))
                    .collect();
                horner(&integrated, x)
            }
        }
    }

    /// Exact value of the integral over `interval`.
    pub fn integral(&self, interval: &Interval) -> f64 {
        self.antiderivative(interval.b()) - self.antiderivative(interval.a())
    }
}

impl Curve for AnalyticCurve {
    fn value(&self, x: f64) -> f64 {
        match self {
            AnalyticCurve::CosExp => x.cos() * x.exp(),
            AnalyticCurve::Sine => x.sin(),
            AnalyticCurve::Polynomial { coefficients } => horner(coefficients, x),
        }
    }

    fn derivative(&self, x: f64) -> f64 {
        match self {
            AnalyticCurve::CosExp => x.exp() * (x.cos() - x.sin()),
            AnalyticCurve::Sine => x.cos(),
            AnalyticCurve::Polynomial { coefficients } => {
                let derived: Vec<f64> = coefficients
                    .iter()
                    .enumerate()
                    .skip(1)
                    .map(|(k, c)| k as f64 * c)
                    .collect();
                horner(&derived, x)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::FRAC_PI_2;

    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn cos_exp_integral_matches_closed_form() {
        let interval = Interval::new(0.0, FRAC_PI_2).unwrap();
        let expected = (FRAC_PI_2.exp() - 1.0) / 2.0;
        assert_abs_diff_eq!(AnalyticCurve::CosExp.integral(&interval), expected, epsilon = 1e-14);
    }

    #[test]
    fn polynomial_value_derivative_and_integral() {
        // 1 + 2x + 3x^2
        let curve = AnalyticCurve::Polynomial { coefficients: vec![1.0, 2.0, 3.0] };
        assert_eq!(curve.value(2.0), 17.0);
        assert_eq!(curve.derivative(2.0), 14.0);
        let interval = Interval::new(0.0, 2.0).unwrap();
        assert_abs_diff_eq!(curve.integral(&interval), 14.0, epsilon = 1e-14);
    }

    #[test]
    fn deserializes_tagged_variants() {
        let curve: AnalyticCurve = serde_json::from_str(r#"{"type": "Sine"}"#).unwrap();
        assert_eq!(curve, AnalyticCurve::Sine);
        let curve: AnalyticCurve =
            serde_json::from_str(r#"{"type": "Polynomial", "coefficients": [0.0, 1.0]}"#).unwrap();
        assert_eq!(curve.value(3.0), 3.0);
    }
}
