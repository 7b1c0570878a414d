use thiserror::Error;

use crate::integration::integrationresult::IntegrationMethod;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum IntegrationError {
    #[error("{method} rule needs at least {required} samples in the interval, found {found}")]
    InsufficientSamples {
        method: IntegrationMethod,
        required: usize,
        found: usize,
    },

    #[error("Simpson rule needs an even number of subintervals, found {intervals}")]
    OddIntervalCount { intervals: usize },

    #[error("Simpson rule needs a uniform grid: step {index} is {step:e}, expected {expected:e}")]
    NonUniformGrid {
        index: usize,
        step: f64,
        expected: f64,
    },

    #[error("invalid {name} = {value}: {requirement}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        requirement: &'static str,
    },

    #[error("Romberg run cancelled after {rows} rows")]
    Cancelled { rows: usize },
}

impl IntegrationError {
    /// Errors that only rule out the Simpson formula on the raw grid.
    pub fn is_structural(&self) -> bool {
        matches!(self, IntegrationError::OddIntervalCount { .. } | IntegrationError::NonUniformGrid { .. })
    }
}
