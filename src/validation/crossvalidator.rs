use std::collections::BTreeMap;
use std::fmt;

use log::warn;
use serde::Serialize;

use crate::integration::integrationresult::IntegrationMethod;
use crate::validation::validationerror::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MethodComparison {
    computed: f64,
    reference: f64,
    absolute_difference: f64,
    within_tolerance: bool,
}

impl MethodComparison {
    pub fn computed(&self) -> f64 {
        self.computed
    }

    pub fn reference(&self) -> f64 {
        self.reference
    }

    pub fn absolute_difference(&self) -> f64 {
        self.absolute_difference
    }

    pub fn within_tolerance(&self) -> bool {
        self.within_tolerance
    }
}

/// Per-method comparison of computed values against references.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationReport {
    tolerance: f64,
    comparisons: BTreeMap<IntegrationMethod, MethodComparison>,
}

impl ValidationReport {
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    pub fn get(&self, method: IntegrationMethod) -> Option<&MethodComparison> {
        self.comparisons.get(&method)
    }

    pub fn comparisons(&self) -> &BTreeMap<IntegrationMethod, MethodComparison> {
        &self.comparisons
    }

    pub fn all_within_tolerance(&self) -> bool {
        self.comparisons.values().all(|c| c.within_tolerance)
    }

    /// Formats every number with `precision` digits after the decimal point.
    pub fn display_with_precision(&self, precision: usize) -> ReportDisplay<'_> {
        ReportDisplay { report: self, precision }
    }
}

pub struct ReportDisplay<'a> {
    report: &'a ValidationReport,
    precision: usize,
}

impl fmt::Display for ReportDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let p = self.precision;
        for (method, c) in &self.report.comparisons {
            writeln!(f,
                     "{:<12} computed {:.*}  reference {:.*}  |diff| {:.*e}  {}",
                     method.to_string(),
                     p, c.computed,
                     p, c.reference,
                     3, c.absolute_difference,
                     if c.within_tolerance { "ok" } else { "MISMATCH" })?;
        }
        write!(f, "tolerance {:e}: {}",
               self.report.tolerance,
               if self.report.all_within_tolerance() { "PASS" } else { "FAIL" })
    }
}

/// Compares integration results with independently produced references.
///
/// Mismatches are reported, never raised. Only a method with no reference at
/// all is an error.
#[derive(Debug, Clone, Copy)]
pub struct CrossValidator {
    tolerance: f64,
}

impl CrossValidator {
    pub fn new(tolerance: f64) -> Result<CrossValidator, ValidationError> {
        if !tolerance.is_finite() || tolerance < 0.0 {
            return Err(ValidationError::InvalidTolerance { tolerance });
        }
        Ok(CrossValidator { tolerance })
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    pub fn validate(&self,
                    results: &BTreeMap<IntegrationMethod, f64>,
                    references: &BTreeMap<IntegrationMethod, f64>) -> Result<ValidationReport, ValidationError> {
        let mut comparisons = BTreeMap::new();
        for (&method, &computed) in results {
            let reference = *references
                .get(&method)
                .ok_or(ValidationError::MissingReference { method, path: None })?;
            let absolute_difference = (computed - reference).abs();
            let within_tolerance = absolute_difference <= self.tolerance;
            if !within_tolerance {
                warn!("{} differs from its reference by {:e} (tolerance {:e})",
                      method, absolute_difference, self.tolerance);
            }
            comparisons.insert(method, MethodComparison {
                computed,
                reference,
                absolute_difference,
                within_tolerance,
            });
        }
        Ok(ValidationReport {
            tolerance: self.tolerance,
            comparisons,
        })
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    fn single(method: IntegrationMethod, value: f64) -> BTreeMap<IntegrationMethod, f64> {
        BTreeMap::from([(method, value)])
    }

    #[test]
    fn difference_within_tolerance_passes() {
        let validator = CrossValidator::new(1e-6).unwrap();
        let report = validator
            .validate(&single(IntegrationMethod::Trapezoidal, 0.9999999),
                      &single(IntegrationMethod::Trapezoidal, 1.0))
            .unwrap();

        let comparison = report.get(IntegrationMethod::Trapezoidal).unwrap();
        assert!(comparison.within_tolerance());
        assert_abs_diff_eq!(comparison.absolute_difference(), 1e-7, epsilon = 1e-15);
        assert!(report.all_within_tolerance());
    }

    #[test]
    fn mismatch_is_reported_not_raised() {
        let validator = CrossValidator::new(1e-12).unwrap();
        let results = BTreeMap::from([
            (IntegrationMethod::Simpson, 1.0),
            (IntegrationMethod::Romberg, 2.0),
        ]);
        let references = BTreeMap::from([
            (IntegrationMethod::Simpson, 1.0),
            (IntegrationMethod::Romberg, 2.5),
        ]);
        let report = validator.validate(&results, &references).unwrap();

        assert!(report.get(IntegrationMethod::Simpson).unwrap().within_tolerance());
        let romberg = report.get(IntegrationMethod::Romberg).unwrap();
        assert!(!romberg.within_tolerance());
        assert_eq!(romberg.absolute_difference(), 0.5);
        assert!(!report.all_within_tolerance());
    }

    #[test]
    fn difference_equal_to_tolerance_passes() {
        let validator = CrossValidator::new(0.25).unwrap();
        let report = validator
            .validate(&single(IntegrationMethod::Simpson, 1.25),
                      &single(IntegrationMethod::Simpson, 1.0))
            .unwrap();
        assert!(report.all_within_tolerance());
    }

    #[test]
    fn missing_reference_fails() {
        let validator = CrossValidator::new(1e-6).unwrap();
        let result = validator.validate(
            &single(IntegrationMethod::Romberg, 1.0),
            &single(IntegrationMethod::Trapezoidal, 1.0));
        assert!(matches!(
            result,
            Err(ValidationError::MissingReference { method: IntegrationMethod::Romberg, path: None })));
    }

    #[test]
    fn extra_references_are_ignored() {
        let validator = CrossValidator::new(1e-6).unwrap();
        let references = BTreeMap::from([
            (IntegrationMethod::Trapezoidal, 1.0),
            (IntegrationMethod::Romberg, 1.0),
        ]);
        let report = validator
            .validate(&single(IntegrationMethod::Trapezoidal, 1.0), &references)
            .unwrap();
        assert_eq!(report.comparisons().len(), 1);
    }

    #[test]
    fn rejects_negative_tolerance() {
        assert!(matches!(
            CrossValidator::new(-1.0),
            Err(ValidationError::InvalidTolerance { .. })));
    }

    #[test]
    fn display_exposes_requested_precision() {
        let validator = CrossValidator::new(1e-12).unwrap();
        let report = validator
            .validate(&single(IntegrationMethod::Romberg, 1.0000000000000002),
                      &single(IntegrationMethod::Romberg, 1.0))
            .unwrap();
        let text = report.display_with_precision(16).to_string();
        assert!(text.contains("1.0000000000000002"));
        assert!(text.ends_with("PASS"));
    }
}
