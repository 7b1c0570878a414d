use std::path::PathBuf;

use thiserror::Error;

use crate::integration::integrationresult::IntegrationMethod;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("no reference value for the {method} result{}", path_suffix(.path))]
    MissingReference {
        method: IntegrationMethod,
        path: Option<PathBuf>,
    },

    #[error("{path}: reference file must hold a single finite number: {reason}")]
    MalformedReference { path: PathBuf, reason: String },

    #[error("invalid validation tolerance {tolerance}: must be finite and non-negative")]
    InvalidTolerance { tolerance: f64 },

    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn path_suffix(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .map_or_else(String::new, |p| format!(" (expected {})", p.display()))
}
