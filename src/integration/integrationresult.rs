use std::fmt;

use serde::{
    Deserialize,
    Serialize
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum IntegrationMethod {
    Trapezoidal,
    Simpson,
    Romberg,
}

impl IntegrationMethod {
    pub const ALL: [IntegrationMethod; 3] = [
        IntegrationMethod::Trapezoidal,
        IntegrationMethod::Simpson,
        IntegrationMethod::Romberg,
    ];

    /// Tag used in reference file names, `integral<tag>_N<count>_precision<digits>.txt`.
    pub fn file_tag(&self) -> &'static str {
        match self {
            IntegrationMethod::Trapezoidal => "Trapz",
            IntegrationMethod::Simpson => "Simpson",
            IntegrationMethod::Romberg => "Romberg",
        }
    }
}

impl fmt::Display for IntegrationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IntegrationMethod::Trapezoidal => "trapezoidal",
            IntegrationMethod::Simpson => "Simpson",
            IntegrationMethod::Romberg => "Romberg",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntegrationResult {
    method: IntegrationMethod,
    value: f64,
    iterations_used: Option<usize>,
    converged: bool,
    evaluations: usize,
}

impl IntegrationResult {
    /// Result of a one-shot rule over `evaluations` ordinates.
    pub fn one_shot(method: IntegrationMethod, value: f64, evaluations: usize) -> IntegrationResult {
        IntegrationResult {
            method,
            value,
            iterations_used: None,
            converged: true,
            evaluations,
        }
    }

    pub fn romberg(value: f64, iterations_used: usize, converged: bool, evaluations: usize) -> IntegrationResult {
        IntegrationResult {
            method: IntegrationMethod::Romberg,
            value,
            iterations_used: Some(iterations_used),
            converged,
            evaluations,
        }
    }

    pub fn method(&self) -> IntegrationMethod {
        self.method
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    /// Index of the last Romberg row computed, `None` for one-shot rules.
    pub fn iterations_used(&self) -> Option<usize> {
        self.iterations_used
    }

    /// Always `true` for one-shot rules.
    pub fn converged(&self) -> bool {
        self.converged
    }

    /// Number of ordinates the estimate consumed.
    pub fn evaluations(&self) -> usize {
        self.evaluations
    }
}
