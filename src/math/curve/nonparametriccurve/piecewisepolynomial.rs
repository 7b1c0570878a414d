use serde::{
    Deserialize,
    Serialize
};

use crate::math::curve::curve::{
    Curve,
    CurveError
};
use crate::math::curve::nonparametriccurve::nonparametriccurve::{
    NonparametricCurve,
    Point2D
};
use crate::math::tridiagonal::TridiagonalSystem;
use crate::sample::sampleset::SampleSet;

// ─────────────────────────────────────────────
// Subpolynomial
// ─────────────────────────────────────────────

/// One cubic piece in Horner order `[d, c, b, a]`:
///   S_i(x) = a + b*(x-x_i) + c*(x-x_i)^2 + d*(x-x_i)^3
#[derive(Debug, Clone)]
struct Subpolynomial {
    coefs: [f64; 4],
    lhs_x: f64,
}

impl Subpolynomial {
    fn value(&self, x: f64) -> f64 {
        let x_diff = x - self.lhs_x;
        self.coefs[1..]
            .iter()
            .fold(self.coefs[0], |result, &beta| f64::mul_add(result, x_diff, beta))
    }

    fn derivative(&self, x: f64) -> f64 {
        let x_diff = x - self.lhs_x;
        let [d, c, b, _] = self.coefs;
        f64::mul_add(f64::mul_add(3.0 * d, x_diff, 2.0 * c), x_diff, b)
    }
}

// ─────────────────────────────────────────────
// Shared helpers
// ─────────────────────────────────────────────

fn steps(x: &[f64]) -> Vec<f64> {
    x.windows(2).map(|w| w[1] - w[0]).collect()
}

fn secant_slopes(y: &[f64], h: &[f64]) -> Vec<f64> {
    (0..h.len()).map(|i| (y[i + 1] - y[i]) / h[i]).collect()
}

/// Cubic pieces from the second derivatives (moments) m[0..=n] at the knots.
fn cubic_coefs_from_moments(y: &[f64], h: &[f64], s: &[f64], m: &[f64]) -> Vec<[f64; 4]> {
    (0..h.len())
        .map(|i| {
            let d = (m[i + 1] - m[i]) / (6.0 * h[i]);
            let c = m[i] / 2.0;
            let b = s[i] - h[i] * (2.0 * m[i] + m[i + 1]) / 6.0;
            [d, c, b, y[i]]
        })
        .collect()
}

/// Cubic pieces from the first derivatives (Hermite slopes) t[0..=n] at the knots.
fn cubic_coefs_from_hermite(y: &[f64], h: &[f64], s: &[f64], t: &[f64]) -> Vec<[f64; 4]> {
    (0..h.len())
        .map(|i| {
            let c = (3.0 * s[i] - 2.0 * t[i] - t[i + 1]) / h[i];
            let d = (-2.0 * s[i] + t[i] + t[i + 1]) / (h[i] * h[i]);
            [d, c, t[i], y[i]]
        })
        .collect()
}

// ─────────────────────────────────────────────
// Cubic splines (Natural / NotAKnot)
// ─────────────────────────────────────────────
//
// C² continuity at interior knot i gives
//   h[i-1]*m[i-1] + 2*(h[i-1]+h[i])*m[i] + h[i]*m[i+1] = 6*(s[i] - s[i-1])
// for i = 1..n-1. The boundary conditions fix m[0] and m[n] in terms of the
// interior moments, so only m[1..n-1] enter the tridiagonal solve.

fn interior_system(h: &[f64], s: &[f64]) -> TridiagonalSystem {
    let n = h.len();
    let mut system = TridiagonalSystem::zeros(n - 1);
    for i in 1..n {
        system.set_row(i - 1,
                       h[i - 1],
                       2.0 * (h[i - 1] + h[i]),
                       h[i],
                       6.0 * (s[i] - s[i - 1]));
    }
    system
}

fn solve_moments(polynomial_type: PolynomialType,
                 system: &TridiagonalSystem) -> Result<Vec<f64>, CurveError> {
    system
        .solve()
        .map(|m| m.as_slice().to_vec())
        .map_err(|row| CurveError::SingularSystem { polynomial_type, row: row + 1 })
}

/// Natural: m[0] = m[n] = 0.
fn generate_natural_cubic_coef_list(y: &[f64], h: &[f64], s: &[f64]) -> Result<Vec<[f64; 4]>, CurveError> {
    let system = interior_system(h, s);
    let interior = solve_moments(PolynomialType::NaturalCubic, &system)?;

    let mut m = Vec::with_capacity(h.len() + 1);
    m.push(0.0);
    m.extend_from_slice(&interior);
    m.push(0.0);
    Ok(cubic_coefs_from_moments(y, h, s, &m))
}

/// Not-a-knot: the third derivative is continuous at x[1] and x[n-1],
///   -h[1]*m[0] + (h[0]+h[1])*m[1] - h[0]*m[2] = 0
///   -h[n-1]*m[n-2] + (h[n-2]+h[n-1])*m[n-1] - h[n-2]*m[n] = 0
/// m[0] and m[n] are substituted into the first and last interior rows.
fn generate_not_a_knot_cubic_coef_list(y: &[f64], h: &[f64], s: &[f64]) -> Result<Vec<[f64; 4]>, CurveError> {
    let n = h.len();
    let mut system = interior_system(h, s);

    let first_rhs = 6.0 * (s[1] - s[0]);
    let last_rhs = 6.0 * (s[n - 1] - s[n - 2]);
    let first_diag = (h[0] + h[1]) * (h[0] + 2.0 * h[1]) / h[1];
    let first_sup = (h[1] * h[1] - h[0] * h[0]) / h[1];
    let last_sub = (h[n - 2] * h[n - 2] - h[n - 1] * h[n - 1]) / h[n - 2];
    let last_diag = (h[n - 2] + h[n - 1]) * (2.0 * h[n - 2] + h[n - 1]) / h[n - 2];

    system.set_row(0, 0.0, first_diag, first_sup, first_rhs);
    system.set_row(n - 2, last_sub, last_diag, 0.0, last_rhs);

    let interior = solve_moments(PolynomialType::NotAKnotCubic, &system)?;

    let m_first = ((h[0] + h[1]) * interior[0] - h[0] * interior[1]) / h[1];
    let m_last = ((h[n - 2] + h[n - 1]) * interior[n - 2] - h[n - 1] * interior[n - 3]) / h[n - 2];

    let mut m = Vec::with_capacity(n + 1);
    m.push(m_first);
    m.extend_from_slice(&interior);
    m.push(m_last);
    Ok(cubic_coefs_from_moments(y, h, s, &m))
}

// ─────────────────────────────────────────────
// PCHIP (Fritsch-Carlson, monotone)
// ─────────────────────────────────────────────
//
// Interior slopes are weighted harmonic means of the neighbouring secants,
// zero at local extrema. End slopes use the one-sided three point formula,
// clipped to keep monotonicity.

fn pchip_end_slope(h0: f64, h1: f64, s0: f64, s1: f64) -> f64 {
    let raw = ((2.0 * h0 + h1) * s0 - h0 * s1) / (h0 + h1);
    if raw.signum() != s0.signum() {
        0.0
    } else if s0.signum() != s1.signum() && raw.abs() > 3.0 * s0.abs() {
        3.0 * s0
    } else {
        raw
    }
}

fn generate_pchip_coef_list(y: &[f64], h: &[f64], s: &[f64]) -> Vec<[f64; 4]> {
    let n = h.len();
    let mut t = vec![0.0_f64; n + 1];

    for i in 1..n {
        if s[i - 1] * s[i] > 0.0 {
            let w1 = 2.0 * h[i] + h[i - 1];
            let w2 = h[i] + 2.0 * h[i - 1];
            t[i] = (w1 + w2) / (w1 / s[i - 1] + w2 / s[i]);
        }
    }
    t[0] = pchip_end_slope(h[0], h[1], s[0], s[1]);
    t[n] = pchip_end_slope(h[n - 1], h[n - 2], s[n - 1], s[n - 2]);

    cubic_coefs_from_hermite(y, h, s, &t)
}

// ─────────────────────────────────────────────
// PolynomialType
// ─────────────────────────────────────────────

#[derive(Debug, Default, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub enum PolynomialType {
    NaturalCubic,
    /// Twice differentiable, exact for cubic data
    #[default]
    NotAKnotCubic,
    PiecewiseCubicHermite,
}

/// Every scheme needs a well-posed local cubic on at least four knots.
pub const MIN_INTERPOLATION_POINTS: usize = 4;

// ─────────────────────────────────────────────
// PiecewisePolynomial
// ─────────────────────────────────────────────

/// Piecewise cubic interpolant through every sample.
///
/// Reproduces the samples at the knots. Outside `[min_x, max_x]` the first
/// and last pieces are extended, which is extrapolation and carries no
/// accuracy guarantee.
#[derive(Debug, Clone)]
pub struct PiecewisePolynomial {
    max_x: f64,
    max_y: f64,
    polynomial_type: PolynomialType,
    subpolynomial_list: Vec<Subpolynomial>,
}

/// Interpolant used by the Romberg integrator on sampled data.
pub type Interpolant = PiecewisePolynomial;

impl PiecewisePolynomial {
    /// Builds the default not-a-knot cubic spline.
    pub fn build(samples: &SampleSet) -> Result<PiecewisePolynomial, CurveError> {
        Self::new(PolynomialType::default(), samples)
    }

    pub fn new(polynomial_type: PolynomialType,
               samples: &SampleSet) -> Result<PiecewisePolynomial, CurveError> {
        if samples.len() < MIN_INTERPOLATION_POINTS {
            return Err(CurveError::EmptyDomain {
                polynomial_type,
                required: MIN_INTERPOLATION_POINTS,
                found: samples.len(),
            });
        }

        let x = samples.x().as_slice();
        let y = samples.y().as_slice();
        let h = steps(x);
        let s = secant_slopes(y, &h);

        let coef_list = match polynomial_type {
            PolynomialType::NaturalCubic          => generate_natural_cubic_coef_list(y, &h, &s)?,
            PolynomialType::NotAKnotCubic         => generate_not_a_knot_cubic_coef_list(y, &h, &s)?,
            PolynomialType::PiecewiseCubicHermite => generate_pchip_coef_list(y, &h, &s),
        };

        let subpolynomial_list = coef_list
            .into_iter()
            .zip(x.iter())
            .map(|(coefs, &lhs_x)| Subpolynomial { coefs, lhs_x })
            .collect();

        Ok(PiecewisePolynomial {
            max_x: x[x.len() - 1],
            max_y: y[y.len() - 1],
            polynomial_type,
            subpolynomial_list,
        })
    }

    pub fn polynomial_type(&self) -> PolynomialType {
        self.polynomial_type
    }

    pub fn evaluate(&self, x: f64) -> f64 {
        self.value(x)
    }

    fn find_segment(&self, x: f64) -> usize {
        if x <= self.min_x() {
            0
        } else if x >= self.max_x {
            self.subpolynomial_list.len() - 1
        } else {
            self.subpolynomial_list
                .partition_point(|s| s.lhs_x <= x) - 1
        }
    }
}

// ─────────────────────────────────────────────
// Trait implementations
// ─────────────────────────────────────────────

impl NonparametricCurve for PiecewisePolynomial {
    fn points(&self) -> Vec<Point2D> {
        let mut pts: Vec<Point2D> = self
            .subpolynomial_list
            .iter()
            .map(|s| Point2D::new(s.lhs_x, s.value(s.lhs_x)))
            .collect();
        pts.push(Point2D::new(self.max_x, self.max_y));
        pts
    }

    fn min_x(&self) -> f64 {
        self.subpolynomial_list[0].lhs_x
    }

    fn max_x(&self) -> f64 {
        self.max_x
    }
}

impl Curve for PiecewisePolynomial {
    fn value(&self, x: f64) -> f64 {
        if x == self.max_x {
            return self.max_y;
        }
        let i = self.find_segment(x);
        self.subpolynomial_list[i].value(x)
    }

    fn derivative(&self, x: f64) -> f64 {
        let i = self.find_segment(x);
        self.subpolynomial_list[i].derivative(x)
    }
}
