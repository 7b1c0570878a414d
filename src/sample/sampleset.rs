use nalgebra::DVector;
use serde::{
    Deserialize,
    Serialize
};

use crate::math::curve::curve::Curve;
use crate::math::curve::nonparametriccurve::nonparametriccurve::Point2D;
use crate::sample::sampleerror::SampleError;

/// Bounds of integration, `a < b`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "IntervalJsonProp")]
pub struct Interval {
    a: f64,
    b: f64
}

#[derive(Deserialize)]
struct IntervalJsonProp {
    a: f64,
    b: f64
}

impl TryFrom<IntervalJsonProp> for Interval {
    type Error = SampleError;

    fn try_from(prop: IntervalJsonProp) -> Result<Self, Self::Error> {
        Interval::new(prop.a, prop.b)
    }
}

impl Interval {
    pub fn new(a: f64, b: f64) -> Result<Interval, SampleError> {
        if !a.is_finite() || !b.is_finite() || a >= b {
            return Err(SampleError::InvalidInterval { a, b });
        }
        Ok(Interval { a, b })
    }

    /// Bounds already known to satisfy `a < b`.
    pub(crate) const fn ordered(a: f64, b: f64) -> Interval {
        Interval { a, b }
    }

    pub fn a(&self) -> f64 {
        self.a
    }

    pub fn b(&self) -> f64 {
        self.b
    }

    pub fn width(&self) -> f64 {
        self.b - self.a
    }

    /// `count` equally spaced abscissae from `a` to `b`, both included.
    pub fn linspace(&self, count: usize) -> Vec<f64> {
        match count {
            0 => return Vec::new(),
            1 => return vec![self.a],
            _ => {},
        }
        let step = self.width() / (count - 1) as f64;
        (0..count)
            .map(|i| if i + 1 == count { self.b } else { self.a + i as f64 * step })
            .collect()
    }
}

/// Ordered `(x, f(x))` samples with strictly increasing, finite abscissae.
///
/// The set is immutable once built. Restricting it to an interval produces a
/// new set rather than trimming this one.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleSet {
    x: DVector<f64>,
    y: DVector<f64>
}

impl SampleSet {
    pub fn new(points: &[Point2D]) -> Result<SampleSet, SampleError> {
        let x = points.iter().map(|pt| pt.x()).collect();
        let y = points.iter().map(|pt| pt.y()).collect();
        Self::from_columns(x, y)
    }

    pub fn from_columns(x: Vec<f64>, y: Vec<f64>) -> Result<SampleSet, SampleError> {
        if x.len() != y.len() {
            return Err(SampleError::ColumnLengthMismatch { x_len: x.len(), y_len: y.len() });
        }
        for (index, (&xi, &yi)) in x.iter().zip(y.iter()).enumerate() {
            if !xi.is_finite() || !yi.is_finite() {
                return Err(SampleError::NonFiniteValue { index, x: xi, y: yi });
            }
            if index > 0 && xi <= x[index - 1] {
                return Err(SampleError::NotStrictlyIncreasing {
                    index,
                    previous: x[index - 1],
                    current: xi,
                });
            }
        }
        Ok(SampleSet {
            x: DVector::from_vec(x),
            y: DVector::from_vec(y)
        })
    }

    /// Samples `curve` at `count` uniform abscissae over `domain`.
    pub fn from_curve<C: Curve + ?Sized>(curve: &C,
                                         domain: &Interval,
                                         count: usize) -> Result<SampleSet, SampleError> {
        if count < 2 {
            return Err(SampleError::InvalidSampleCount { count });
        }
        let x = domain.linspace(count);
        let y = x.iter().map(|&xi| curve.value(xi)).collect();
        Self::from_columns(x, y)
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn x(&self) -> &DVector<f64> {
        &self.x
    }

    pub fn y(&self) -> &DVector<f64> {
        &self.y
    }

    /// Smallest abscissa, `None` for an empty set.
    pub fn first_x(&self) -> Option<f64> {
        self.x.as_slice().first().copied()
    }

    /// Largest abscissa, `None` for an empty set.
    pub fn last_x(&self) -> Option<f64> {
        self.x.as_slice().last().copied()
    }

    /// Keeps the samples with `a <= x <= b`.
    pub fn restrict(&self, interval: &Interval) -> SampleSet {
        let first = self.x.as_slice().partition_point(|&x| x < interval.a());
        let last = self.x.as_slice().partition_point(|&x| x <= interval.b());
        let count = last.saturating_sub(first);
        SampleSet {
            x: self.x.rows(first, count).into_owned(),
            y: self.y.rows(first, count).into_owned()
        }
    }
}
