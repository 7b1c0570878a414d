use std::f64::consts::{
    FRAC_PI_2,
    PI
};
use std::fs::File;
use std::io::BufReader;
use std::path::{
    Path,
    PathBuf
};

use serde::{
    Deserialize,
    Serialize
};
use thiserror::Error;

use crate::math::curve::analyticcurve::AnalyticCurve;
use crate::math::curve::nonparametriccurve::piecewisepolynomial::PolynomialType;
use crate::sample::sampleset::Interval;

pub const DEFAULT_SAMPLE_FILE_NAME: &str = "output.txt";

#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("{path}: {source}")]
    IOError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path}: {source}")]
    JsonParseError {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid argument '{argument}': {reason}")]
    InvalidArgument { argument: String, reason: String },

    #[error("usage:\n  <program> <mode> <N> <x_inf> <x_sup>\nor\n  <program> <mode> [<config.json>]")]
    Usage,
}

/// What to do when the raw grid cannot take the Simpson formula.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimpsonFallback {
    /// Report the structural error for Simpson only.
    Reject,
    /// Rerun Simpson on the interpolant over a uniform grid.
    #[default]
    Resample,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RombergSettings {
    pub tolerance: f64,
    pub max_iterations: usize,
}

impl Default for RombergSettings {
    fn default() -> Self {
        RombergSettings {
            tolerance: 1e-12,
            max_iterations: 20,
        }
    }
}

/// Settings of one generate or validate run.
///
/// Every field has a default, so a JSON file only lists what it changes.
/// Nothing here is global: two runs with different settings can proceed
/// side by side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    pub data_dir: PathBuf,
    /// Defaults to `<data_dir>/output.txt`.
    pub sample_file: Option<PathBuf>,
    pub sample_count: usize,
    pub sample_domain: Interval,
    pub interval: Interval,
    pub integrand: AnalyticCurve,
    pub interpolation: PolynomialType,
    pub romberg: RombergSettings,
    pub simpson_fallback: SimpsonFallback,
    pub validation_tolerance: f64,
    /// Decimal digits written to sample and reference files.
    pub precision: usize,
    pub parallel: bool,
}

impl Default for Configuration {
    fn default() -> Self {
        Configuration {
            data_dir: PathBuf::from("./data"),
            sample_file: None,
            sample_count: 1000,
            sample_domain: Interval::ordered(0.0, PI),
            interval: Interval::ordered(0.0, FRAC_PI_2),
            integrand: AnalyticCurve::default(),
            interpolation: PolynomialType::default(),
            romberg: RombergSettings::default(),
            simpson_fallback: SimpsonFallback::default(),
            validation_tolerance: 1e-12,
            precision: 16,
            parallel: true,
        }
    }
}

impl Configuration {
    pub fn from_reader<P: AsRef<Path>>(file_path: P) -> Result<Configuration, ConfigurationError> {
        let path = file_path.as_ref();
        let file = File::open(path)
            .map_err(|source| ConfigurationError::IOError { path: path.to_owned(), source })?;
        let reader = BufReader::new(file);
        let configuration: Configuration = serde_json::from_reader(reader)
            .map_err(|source| ConfigurationError::JsonParseError { path: path.to_owned(), source })?;
        configuration.check()?;
        Ok(configuration)
    }

    /// Builds a configuration from the arguments following the mode:
    /// nothing (defaults), a JSON file, or `<N> <x_inf> <x_sup>` overriding
    /// the sample count and sample domain.
    pub fn from_args(args: &[String]) -> Result<Configuration, ConfigurationError> {
        match args {
            [] => Ok(Configuration::default()),
            [config_path] => Configuration::from_reader(config_path),
            [count, x_inf, x_sup] => {
                let mut configuration = Configuration::default();
                configuration.sample_count = parse_argument(count)?;
                let a: f64 = parse_argument(x_inf)?;
                let b: f64 = parse_argument(x_sup)?;
                configuration.sample_domain = Interval::new(a, b).map_err(|error| {
                    ConfigurationError::InvalidArgument {
                        argument: format!("{} {}", x_inf, x_sup),
                        reason: error.to_string(),
                    }
                })?;
                configuration.check()?;
                Ok(configuration)
            },
            _ => Err(ConfigurationError::Usage),
        }
    }

    pub fn sample_path(&self) -> PathBuf {
        self.sample_file
            .clone()
            .unwrap_or_else(|| self.data_dir.join(DEFAULT_SAMPLE_FILE_NAME))
    }

    fn check(&self) -> Result<(), ConfigurationError> {
        if self.sample_count < 2 {
            return Err(ConfigurationError::InvalidArgument {
                argument: format!("sample_count = {}", self.sample_count),
                reason: "at least 2 samples are needed".to_owned(),
            });
        }
        if !self.validation_tolerance.is_finite() || self.validation_tolerance < 0.0 {
            return Err(ConfigurationError::InvalidArgument {
                argument: format!("validation_tolerance = {}", self.validation_tolerance),
                reason: "must be finite and non-negative".to_owned(),
            });
        }
        Ok(())
    }
}

fn parse_argument<T>(argument: &str) -> Result<T, ConfigurationError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display {
    argument
        .parse::<T>()
        .map_err(|error| ConfigurationError::InvalidArgument {
            argument: argument.to_owned(),
            reason: error.to_string(),
        })
}
