use std::collections::BTreeMap;
use std::fs::{
    self,
    File
};
use std::io::BufWriter;
use std::path::PathBuf;
use std::thread;

use log::{
    info,
    warn
};
use serde::Serialize;
use thiserror::Error;

use crate::configuration::{
    Configuration,
    ConfigurationError,
    SimpsonFallback
};
use crate::integration::integrationerror::IntegrationError;
use crate::integration::integrationresult::{
    IntegrationMethod,
    IntegrationResult
};
use crate::integration::rombergintegrator::RombergIntegrator;
use crate::integration::simpsonintegrator::SimpsonIntegrator;
use crate::integration::trapezoidalintegrator::TrapezoidalIntegrator;
use crate::math::curve::curve::CurveError;
use crate::math::curve::nonparametriccurve::piecewisepolynomial::Interpolant;
use crate::sample::sampleerror::SampleError;
use crate::sample::samplefile::{
    read_sample_file,
    write_sample_file
};
use crate::sample::sampleset::{
    Interval,
    SampleSet
};
use crate::validation::crossvalidator::{
    CrossValidator,
    ValidationReport
};
use crate::validation::referencefile::ReferenceStore;
use crate::validation::validationerror::ValidationError;

pub const VALIDATION_REPORT_FILE_NAME: &str = "validation_report.json";

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Sample(#[from] SampleError),

    #[error(transparent)]
    Curve(#[from] CurveError),

    #[error(transparent)]
    Integration(#[from] IntegrationError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{path}: {source}")]
    IOError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path}: {source}")]
    JsonWriteError {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

// ─────────────────────────────────────────────
// Outcomes
// ─────────────────────────────────────────────

/// Per-method outcome of integrating one sample set.
///
/// A method that fails does not take the others down with it: its error is
/// kept next to the results of the methods that succeeded.
#[derive(Debug)]
pub struct SampleIntegration {
    results: BTreeMap<IntegrationMethod, IntegrationResult>,
    failures: BTreeMap<IntegrationMethod, EngineError>,
    simpson_resampled: bool,
}

impl SampleIntegration {
    pub fn get(&self, method: IntegrationMethod) -> Option<&IntegrationResult> {
        self.results.get(&method)
    }

    pub fn failure(&self, method: IntegrationMethod) -> Option<&EngineError> {
        self.failures.get(&method)
    }

    pub fn results(&self) -> &BTreeMap<IntegrationMethod, IntegrationResult> {
        &self.results
    }

    pub fn failures(&self) -> &BTreeMap<IntegrationMethod, EngineError> {
        &self.failures
    }

    /// True when Simpson ran on the interpolant instead of the raw samples.
    pub fn simpson_resampled(&self) -> bool {
        self.simpson_resampled
    }

    pub fn values(&self) -> BTreeMap<IntegrationMethod, f64> {
        self.results
            .iter()
            .map(|(&method, result)| (method, result.value()))
            .collect()
    }
}

#[derive(Debug)]
pub struct Generation {
    sample_path: PathBuf,
    samples_written: usize,
    results: BTreeMap<IntegrationMethod, IntegrationResult>,
    reference_paths: Vec<PathBuf>,
    analytic_solution: f64,
}

impl Generation {
    pub fn sample_path(&self) -> &PathBuf {
        &self.sample_path
    }

    pub fn samples_written(&self) -> usize {
        self.samples_written
    }

    pub fn results(&self) -> &BTreeMap<IntegrationMethod, IntegrationResult> {
        &self.results
    }

    pub fn reference_paths(&self) -> &[PathBuf] {
        &self.reference_paths
    }

    pub fn analytic_solution(&self) -> f64 {
        self.analytic_solution
    }
}

#[derive(Debug)]
pub struct Validation {
    integration: SampleIntegration,
    report: ValidationReport,
    report_path: PathBuf,
    analytic_solution: f64,
}

impl Validation {
    pub fn integration(&self) -> &SampleIntegration {
        &self.integration
    }

    pub fn report(&self) -> &ValidationReport {
        &self.report
    }

    pub fn report_path(&self) -> &PathBuf {
        &self.report_path
    }

    pub fn analytic_solution(&self) -> f64 {
        self.analytic_solution
    }
}

#[derive(Serialize)]
struct ValidationReportJson<'a> {
    sample_count: usize,
    interval: &'a Interval,
    analytic_solution: f64,
    simpson_resampled: bool,
    failures: BTreeMap<IntegrationMethod, String>,
    report: &'a ValidationReport,
}

/// `|value - exact| / |exact|`, or the absolute error when `exact` is zero.
pub fn relative_error(value: f64, exact: f64) -> f64 {
    let error = (value - exact).abs();
    if exact == 0.0 { error } else { error / exact.abs() }
}

// ─────────────────────────────────────────────
// QuadratureEngine
// ─────────────────────────────────────────────

/// Runs the three quadrature methods for one configuration.
///
/// The engine owns its configuration and holds no other state, so separate
/// engines never interfere.
#[derive(Debug, Clone)]
pub struct QuadratureEngine {
    configuration: Configuration,
}

impl QuadratureEngine {
    pub fn new(configuration: Configuration) -> QuadratureEngine {
        QuadratureEngine { configuration }
    }

    pub fn configuration(&self) -> &Configuration {
        &self.configuration
    }

    fn romberg_integrator(&self) -> Result<RombergIntegrator, IntegrationError> {
        let settings = &self.configuration.romberg;
        RombergIntegrator::new(settings.tolerance, settings.max_iterations)
    }

    fn reference_store(&self) -> ReferenceStore {
        ReferenceStore::new(&self.configuration.data_dir,
                            self.configuration.sample_count,
                            self.configuration.precision)
    }

    /// Integrates `samples` over the configured interval with all three methods.
    ///
    /// Trapezoid and Simpson work on the samples inside the interval, Romberg
    /// on the cubic interpolant of those samples. Invalid Romberg settings
    /// abort the whole run; any other failure is recorded for its method.
    pub fn integrate_samples(&self, samples: &SampleSet) -> Result<SampleIntegration, EngineError> {
        let interval = self.configuration.interval;
        let romberg = self.romberg_integrator()?;
        let trapezoidal = TrapezoidalIntegrator::new();
        let simpson = SimpsonIntegrator::new();

        let restricted = samples.restrict(&interval);
        info!("{} of {} samples lie in [{}, {}]",
              restricted.len(), samples.len(), interval.a(), interval.b());
        if let Some(last_x) = restricted.last_x().filter(|&x| x < interval.b()) {
            info!("samples end at {} short of b = {}, the interpolant is extrapolated over the gap",
                  last_x, interval.b());
        }
        let interpolant = Interpolant::new(self.configuration.interpolation, &restricted);
        if let Ok(curve) = &interpolant {
            info!("{:?} interpolant built; Romberg tolerance {:e}, at most {} rows",
                  curve.polynomial_type(), romberg.tolerance(), romberg.max_iterations());
        }

        let (trapezoid_outcome, simpson_outcome, romberg_outcome) = run_methods(
            self.configuration.parallel,
            || trapezoidal.integrate(samples, &interval).map_err(EngineError::from),
            || self.simpson_with_fallback(&simpson, &restricted, &interval, interpolant.as_ref()),
            || match &interpolant {
                Ok(curve) => romberg.integrate(curve, &interval).map_err(EngineError::from),
                Err(error) => Err(EngineError::from(error.clone())),
            });

        let mut integration = SampleIntegration {
            results: BTreeMap::new(),
            failures: BTreeMap::new(),
            simpson_resampled: false,
        };
        let simpson_outcome = simpson_outcome.map(|(result, resampled)| {
            integration.simpson_resampled = resampled;
            result
        });
        for (method, outcome) in [
            (IntegrationMethod::Trapezoidal, trapezoid_outcome),
            (IntegrationMethod::Simpson, simpson_outcome),
            (IntegrationMethod::Romberg, romberg_outcome),
        ] {
            match outcome {
                Ok(result) => {
                    integration.results.insert(method, result);
                },
                Err(error) => {
                    warn!("{} integration failed: {}", method, error);
                    integration.failures.insert(method, error);
                },
            }
        }
        Ok(integration)
    }

    fn simpson_with_fallback(&self,
                             simpson: &SimpsonIntegrator,
                             restricted: &SampleSet,
                             interval: &Interval,
                             interpolant: Result<&Interpolant, &CurveError>) -> Result<(IntegrationResult, bool), EngineError> {
        let error = match simpson.integrate(restricted, interval) {
            Ok(result) => return Ok((result, false)),
            Err(error) => error,
        };
        match (self.configuration.simpson_fallback, interpolant) {
            (SimpsonFallback::Resample, Ok(curve)) if error.is_structural() => {
                warn!("{}; resampling the interpolant on a uniform grid", error);
                let result = simpson.integrate_curve(curve, interval, restricted.len())?;
                Ok((result, true))
            },
            _ => Err(error.into()),
        }
    }

    /// Loads the configured sample file and integrates it.
    pub fn integrate_file(&self) -> Result<SampleIntegration, EngineError> {
        let samples = read_sample_file(self.configuration.sample_path())?;
        self.integrate_samples(&samples)
    }

    /// Integrates the analytic integrand directly, with the trapezoid and
    /// Simpson rules on `sample_count` uniform points over the interval.
    pub fn integrate_analytic(&self) -> Result<BTreeMap<IntegrationMethod, IntegrationResult>, EngineError> {
        let integrand = &self.configuration.integrand;
        let interval = self.configuration.interval;
        let points = self.configuration.sample_count;
        let romberg = self.romberg_integrator()?;
        let trapezoidal = TrapezoidalIntegrator::new();
        let simpson = SimpsonIntegrator::new();

        let (trapezoid_outcome, simpson_outcome, romberg_outcome) = run_methods(
            self.configuration.parallel,
            || trapezoidal.integrate_curve(integrand, &interval, points),
            || simpson.integrate_curve(integrand, &interval, points),
            || romberg.integrate(integrand, &interval));

        Ok(BTreeMap::from([
            (IntegrationMethod::Trapezoidal, trapezoid_outcome?),
            (IntegrationMethod::Simpson, simpson_outcome?),
            (IntegrationMethod::Romberg, romberg_outcome?),
        ]))
    }

    /// Writes the sample file and one reference file per method.
    pub fn generate(&self) -> Result<Generation, EngineError> {
        let configuration = &self.configuration;
        fs::create_dir_all(&configuration.data_dir)
            .map_err(|source| EngineError::IOError { path: configuration.data_dir.clone(), source })?;

        let samples = SampleSet::from_curve(&configuration.integrand,
                                            &configuration.sample_domain,
                                            configuration.sample_count)?;
        let sample_path = configuration.sample_path();
        write_sample_file(&sample_path, &samples, configuration.precision)?;
        info!("{} samples of {} written to {}",
              samples.len(), configuration.integrand.name(), sample_path.display());

        let results = self.integrate_analytic()?;
        let store = self.reference_store();
        let reference_paths = results
            .iter()
            .map(|(&method, result)| store.save(method, result.value()))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Generation {
            sample_path,
            samples_written: samples.len(),
            results,
            reference_paths,
            analytic_solution: configuration.integrand.integral(&configuration.interval),
        })
    }

    /// Integrates the sample file and compares every successful method with
    /// its reference file. The report is also written as JSON to the data
    /// directory.
    pub fn validate(&self) -> Result<Validation, EngineError> {
        let configuration = &self.configuration;
        let integration = self.integrate_file()?;

        let references = self
            .reference_store()
            .load_all(integration.results().keys().copied())?;
        let validator = CrossValidator::new(configuration.validation_tolerance)?;
        let report = validator.validate(&integration.values(), &references)?;
        let analytic_solution = configuration.integrand.integral(&configuration.interval);

        let report_path = configuration.data_dir.join(VALIDATION_REPORT_FILE_NAME);
        let json = ValidationReportJson {
            sample_count: configuration.sample_count,
            interval: &configuration.interval,
            analytic_solution,
            simpson_resampled: integration.simpson_resampled(),
            failures: integration
                .failures()
                .iter()
                .map(|(&method, error)| (method, error.to_string()))
                .collect(),
            report: &report,
        };
        let file = File::create(&report_path)
            .map_err(|source| EngineError::IOError { path: report_path.clone(), source })?;
        serde_json::to_writer_pretty(BufWriter::new(file), &json)
            .map_err(|source| EngineError::JsonWriteError { path: report_path.clone(), source })?;
        info!("validation report written to {}", report_path.display());

        Ok(Validation {
            integration,
            report,
            report_path,
            analytic_solution,
        })
    }
}

/// Runs the three closures, on scoped worker threads when `parallel` is set.
fn run_methods<A, B, C, FA, FB, FC>(parallel: bool, first: FA, second: FB, third: FC) -> (A, B, C)
where
    A: Send,
    B: Send,
    FA: FnOnce() -> A + Send,
    FB: FnOnce() -> B + Send,
    FC: FnOnce() -> C {
    if !parallel {
        return (first(), second(), third());
    }
    thread::scope(|scope| {
        let first = scope.spawn(first);
        let second = scope.spawn(second);
        let third = third();
        (join_worker(first), join_worker(second), third)
    })
}

/// Re-raises a worker panic on the calling thread.
fn join_worker<T>(handle: thread::ScopedJoinHandle<'_, T>) -> T {
    handle
        .join()
        .unwrap_or_else(|payload| std::panic::resume_unwind(payload))
}
