use std::process::ExitCode;

use compquad::configuration::{
    Configuration,
    ConfigurationError
};
use compquad::engine::{
    EngineError,
    QuadratureEngine,
    relative_error
};
use compquad::integration::integrationresult::IntegrationResult;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    match run(&args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(2),
        Err(err) => {
            eprintln!("{}", err);
            ExitCode::FAILURE
        },
    }
}

/// Returns whether every check passed.
fn run(args: &[String]) -> Result<bool, EngineError> {
    let (mode, rest) = args.split_first().ok_or(ConfigurationError::Usage)?;
    let engine = QuadratureEngine::new(Configuration::from_args(rest)?);
    let precision = engine.configuration().precision;

    match mode.as_str() {
        "generate" => {
            let generation = engine.generate()?;
            let exact = generation.analytic_solution();
            println!("Samples written to {} ({} points)",
                     generation.sample_path().display(),
                     generation.samples_written());
            println!("Analytical solution: {:.*}", precision, exact);
            for result in generation.results().values() {
                print_result(result, exact, precision);
            }
            for path in generation.reference_paths() {
                println!("Reference written to {}", path.display());
            }
            Ok(true)
        },
        "validate" => {
            let validation = engine.validate()?;
            let exact = validation.analytic_solution();
            println!("Analytical solution: {:.*}", precision, exact);
            for result in validation.integration().results().values() {
                print_result(result, exact, precision);
            }
            for (method, err) in validation.integration().failures() {
                println!("{:<12} failed: {}", method.to_string(), err);
            }
            println!("{}", validation.report().display_with_precision(precision));
            println!("Report written to {}", validation.report_path().display());
            Ok(validation.integration().failures().is_empty()
                && validation.report().all_within_tolerance())
        },
        _ => Err(ConfigurationError::Usage.into()),
    }
}

fn print_result(result: &IntegrationResult, exact: f64, precision: usize) {
    let convergence = match result.iterations_used() {
        Some(rows) if result.converged() => format!("converged after {} rows", rows + 1),
        Some(rows) => format!("NOT converged after {} rows", rows + 1),
        None => format!("{} points", result.evaluations()),
    };
    println!("{:<12} {:.*}  relative error {:.3e}  ({})",
             result.method().to_string(),
             precision,
             result.value(),
             relative_error(result.value(), exact),
             convergence);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_mode_is_a_usage_error() {
        assert!(matches!(run(&[]), Err(EngineError::Configuration(ConfigurationError::Usage))));
    }

    #[test]
    fn unknown_mode_is_a_usage_error() {
        let args = vec!["integrate".to_owned()];
        assert!(matches!(run(&args), Err(EngineError::Configuration(ConfigurationError::Usage))));
    }
}
