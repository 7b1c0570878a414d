use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SampleError {
    #[error("{path}:{line}: {reason}")]
    MalformedSampleFile {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("sample abscissae must be strictly increasing: x[{index}] = {current} follows {previous}")]
    NotStrictlyIncreasing {
        index: usize,
        previous: f64,
        current: f64,
    },

    #[error("sample {index} is not finite: ({x}, {y})")]
    NonFiniteValue { index: usize, x: f64, y: f64 },

    #[error("abscissa and ordinate columns differ in length: {x_len} vs {y_len}")]
    ColumnLengthMismatch { x_len: usize, y_len: usize },

    #[error("invalid interval [{a}, {b}]: bounds must be finite with a < b")]
    InvalidInterval { a: f64, b: f64 },

    #[error("cannot generate {count} samples, at least 2 are needed")]
    InvalidSampleCount { count: usize },

    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
