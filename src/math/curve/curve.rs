use thiserror::Error;

use crate::math::curve::nonparametriccurve::piecewisepolynomial::PolynomialType;

/// A real function of one variable that integrators can evaluate anywhere.
///
/// `Send + Sync` is a supertrait so that one curve can be shared by
/// integrators running on separate worker threads.
pub trait Curve: Send + Sync {
    fn value(&self, x: f64) -> f64;

    fn derivative(&self, x: f64) -> f64;
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CurveError {
    #[error("{polynomial_type:?} interpolation needs at least {required} samples, found {found}")]
    EmptyDomain {
        polynomial_type: PolynomialType,
        required: usize,
        found: usize,
    },

    #[error("{polynomial_type:?} moment system is singular at row {row}")]
    SingularSystem {
        polynomial_type: PolynomialType,
        row: usize,
    },
}
