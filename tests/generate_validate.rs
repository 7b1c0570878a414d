use std::f64::consts::{
    FRAC_PI_2,
    PI
};
use std::fs;
use std::path::PathBuf;
use std::thread;

use approx::assert_abs_diff_eq;

use compquad::configuration::Configuration;
use compquad::engine::{
    EngineError,
    QuadratureEngine
};
use compquad::integration::integrationresult::IntegrationMethod;
use compquad::math::curve::analyticcurve::AnalyticCurve;
use compquad::sample::samplefile::write_sample_file;
use compquad::sample::sampleset::{
    Interval,
    SampleSet
};
use compquad::validation::validationerror::ValidationError;

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir()
        .join(format!("compquad-it-{}-{}", name, std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    dir
}

fn quarter_period(data_dir: PathBuf) -> Configuration {
    Configuration {
        data_dir,
        sample_count: 1001,
        sample_domain: Interval::new(0.0, FRAC_PI_2).unwrap(),
        interval: Interval::new(0.0, FRAC_PI_2).unwrap(),
        validation_tolerance: 1e-8,
        ..Configuration::default()
    }
}

#[test]
fn samples_on_the_integration_interval_reproduce_references() {
    let dir = scratch_dir("matching");
    let engine = QuadratureEngine::new(quarter_period(dir.clone()));

    let generation = engine.generate().unwrap();
    let exact = (FRAC_PI_2.exp() - 1.0) / 2.0;
    assert_abs_diff_eq!(generation.analytic_solution(), exact, epsilon = 1e-15);
    assert_eq!(generation.samples_written(), 1001);
    assert_eq!(generation.reference_paths().len(), 3);
    assert!(dir.join("integralRomberg_N1001_precision16.txt").exists());

    let validation = engine.validate().unwrap();
    assert!(validation.integration().failures().is_empty());
    assert!(!validation.integration().simpson_resampled());
    assert!(validation.report().all_within_tolerance(), "{}", validation.report().display_with_precision(16));

    for method in IntegrationMethod::ALL {
        let comparison = validation.report().get(method).unwrap();
        assert_abs_diff_eq!(comparison.computed(), exact, epsilon = 1e-5);
    }
    let trapezoid = validation.report().get(IntegrationMethod::Trapezoidal).unwrap();
    assert!(trapezoid.absolute_difference() < 1e-13);

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(validation.report_path()).unwrap()).unwrap();
    assert_eq!(json["sample_count"], 1001);
    assert_eq!(json["simpson_resampled"], false);
    assert!(json["report"]["comparisons"]["Romberg"]["within_tolerance"].as_bool().unwrap());
    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn sine_half_period_scenario() {
    let dir = scratch_dir("sine");
    let configuration = Configuration {
        data_dir: dir.clone(),
        integrand: AnalyticCurve::Sine,
        ..Configuration::default()
    };
    let engine = QuadratureEngine::new(configuration);
    engine.generate().unwrap();

    let validation = engine.validate().unwrap();
    assert_abs_diff_eq!(validation.analytic_solution(), 1.0, epsilon = 1e-15);

    let integration = validation.integration();
    assert!(integration.simpson_resampled());
    assert_abs_diff_eq!(integration.get(IntegrationMethod::Trapezoidal).unwrap().value(), 1.0, epsilon = 2e-3);
    assert_abs_diff_eq!(integration.get(IntegrationMethod::Simpson).unwrap().value(), 1.0, epsilon = 1e-6);
    let romberg = integration.get(IntegrationMethod::Romberg).unwrap();
    assert!(romberg.converged());
    assert!(romberg.iterations_used() <= Some(10));
    assert_abs_diff_eq!(romberg.value(), 1.0, epsilon = 1e-6);

    // the samples stop short of pi/2, the references do not
    let trapezoid = validation.report().get(IntegrationMethod::Trapezoidal).unwrap();
    assert!(!trapezoid.within_tolerance());
    assert!(!validation.report().all_within_tolerance());
    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn validation_without_references_fails() {
    let dir = scratch_dir("unreferenced");
    fs::create_dir_all(&dir).unwrap();
    let configuration = quarter_period(dir.clone());
    let samples = SampleSet::from_curve(&configuration.integrand,
                                        &configuration.sample_domain,
                                        configuration.sample_count).unwrap();
    write_sample_file(configuration.sample_path(), &samples, 16).unwrap();

    let result = QuadratureEngine::new(configuration).validate();
    assert!(matches!(
        result,
        Err(EngineError::Validation(ValidationError::MissingReference { path: Some(_), .. }))));
    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn missing_sample_file_is_reported() {
    let dir = scratch_dir("nosamples");
    let result = QuadratureEngine::new(quarter_period(dir.clone())).validate();
    assert!(matches!(result, Err(EngineError::Sample(_))));
    assert!(!dir.exists());
}

#[test]
fn engines_with_different_settings_run_side_by_side() {
    let handles: Vec<_> = [(501, 0.0, PI), (2001, 0.0, FRAC_PI_2)]
        .into_iter()
        .enumerate()
        .map(|(i, (count, a, b))| {
            thread::spawn(move || {
                let configuration = Configuration {
                    data_dir: scratch_dir(&format!("side-by-side-{}", i)),
                    sample_count: count,
                    sample_domain: Interval::new(a, b).unwrap(),
                    ..Configuration::default()
                };
                let engine = QuadratureEngine::new(configuration);
                engine.generate().unwrap();
                let validation = engine.validate().unwrap();
                fs::remove_dir_all(&engine.configuration().data_dir).unwrap();
                validation
            })
        })
        .collect();

    let validations: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let exact = (FRAC_PI_2.exp() - 1.0) / 2.0;
    for validation in &validations {
        let romberg = validation.integration().get(IntegrationMethod::Romberg).unwrap();
        assert_abs_diff_eq!(romberg.value(), exact, epsilon = 1e-6);
    }
    let first_trapezoid = validations[0].integration().get(IntegrationMethod::Trapezoidal).unwrap();
    assert_eq!(first_trapezoid.evaluations(), 251);
    assert!(validations[1].report().all_within_tolerance());
}
