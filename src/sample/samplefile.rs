use std::fs::File;
use std::io::{
    BufRead,
    BufReader,
    BufWriter,
    Write
};
use std::path::Path;

use log::debug;

use crate::math::curve::nonparametriccurve::nonparametriccurve::Point2D;
use crate::sample::sampleerror::SampleError;
use crate::sample::sampleset::SampleSet;

/// Reads a two-column, whitespace-delimited sample file.
///
/// Blank lines and lines starting with `#` are skipped. Any other line must
/// hold exactly two finite numbers, and the first column must be strictly
/// increasing. The file is read fully and closed before returning.
pub fn read_sample_file<P: AsRef<Path>>(path: P) -> Result<SampleSet, SampleError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| SampleError::Io { path: path.to_owned(), source })?;
    let reader = BufReader::new(file);

    let malformed = |line: usize, reason: String| SampleError::MalformedSampleFile {
        path: path.to_owned(),
        line,
        reason
    };

    let mut points: Vec<Point2D> = Vec::new();
    for (index, line_result) in reader.lines().enumerate() {
        let line_no = index + 1;
        let line = line_result.map_err(|source| SampleError::Io { path: path.to_owned(), source })?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let columns: Vec<&str> = trimmed.split_whitespace().collect();
        if columns.len() != 2 {
            return Err(malformed(line_no, format!("expected 2 columns, found {}", columns.len())));
        }
        let mut values = [0.0_f64; 2];
        for (slot, column) in values.iter_mut().zip(columns.iter()) {
            *slot = column
                .parse::<f64>()
                .map_err(|error| malformed(line_no, format!("'{}' is not a number: {}", column, error)))?;
            if !slot.is_finite() {
                return Err(malformed(line_no, format!("'{}' is not finite", column)));
            }
        }
        if let Some(previous) = points.last() {
            if values[0] <= previous.x() {
                return Err(malformed(
                    line_no,
                    format!("x = {} does not increase past the previous x = {}", values[0], previous.x())));
            }
        }
        points.push(Point2D::new(values[0], values[1]));
    }

    debug!("read {} samples from {}", points.len(), path.display());
    SampleSet::new(&points)
}

/// Writes `samples` as `x y` lines with `precision` decimal digits.
pub fn write_sample_file<P: AsRef<Path>>(path: P,
                                         samples: &SampleSet,
                                         precision: usize) -> Result<(), SampleError> {
    let path = path.as_ref();
    let io_error = |source: std::io::Error| SampleError::Io { path: path.to_owned(), source };
    let file = File::create(path).map_err(io_error)?;
    let mut writer = BufWriter::new(file);
    for (x, y) in samples.x().iter().zip(samples.y().iter()) {
        writeln!(writer, "{:.*} {:.*}", precision, x, precision, y).map_err(io_error)?;
    }
    writer.flush().map_err(io_error)?;
    debug!("wrote {} samples to {}", samples.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use super::*;

    fn scratch_file(name: &str, content: &str) -> PathBuf {
        let dir = std::env::temp_dir()
            .join(format!("compquad-samplefile-{}-{}", name, std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    fn remove_scratch(path: &Path) {
        fs::remove_dir_all(path.parent().unwrap()).unwrap();
    }

    #[test]
    fn reads_whitespace_delimited_pairs() {
        let path = scratch_file("ok.txt", "# header\n0.0 1.0\n\n0.5\t2.0\n1.0   3.5\n");
        let samples = read_sample_file(&path).unwrap();
        assert_eq!(samples.x().as_slice(), &[0.0, 0.5, 1.0]);
        assert_eq!(samples.y().as_slice(), &[1.0, 2.0, 3.5]);
        remove_scratch(&path);
    }

    #[test]
    fn wrong_column_count_names_the_line() {
        let path = scratch_file("columns.txt", "0.0 1.0\n0.5 2.0 7.0\n");
        match read_sample_file(&path) {
            Err(SampleError::MalformedSampleFile { line, .. }) => assert_eq!(line, 2),
            other => panic!("unexpected result: {:?}", other),
        }
        remove_scratch(&path);
    }

    #[test]
    fn non_numeric_value_names_the_line() {
        let path = scratch_file("numeric.txt", "0.0 1.0\n0.5 2.0\n1.0 abc\n");
        match read_sample_file(&path) {
            Err(SampleError::MalformedSampleFile { line, reason, .. }) => {
                assert_eq!(line, 3);
                assert!(reason.contains("abc"));
            },
            other => panic!("unexpected result: {:?}", other),
        }
        remove_scratch(&path);
    }

    #[test]
    fn non_increasing_abscissa_names_the_line() {
        let path = scratch_file("order.txt", "0.0 1.0\n0.5 2.0\n0.5 3.0\n");
        assert!(matches!(
            read_sample_file(&path),
            Err(SampleError::MalformedSampleFile { line: 3, .. })));
        remove_scratch(&path);
    }

    #[test]
    fn missing_file_is_io_error() {
        let path = std::env::temp_dir().join("compquad-definitely-missing-samples.txt");
        assert!(matches!(read_sample_file(&path), Err(SampleError::Io { .. })));
    }

    #[test]
    fn written_file_reads_back_identically_at_full_precision() {
        let samples = SampleSet::from_columns(
            vec![0.0, 0.1, 0.2],
            vec![1.0, (0.1_f64).exp(), (0.2_f64).exp()]).unwrap();
        let path = scratch_file("written.txt", "");
        write_sample_file(&path, &samples, 17).unwrap();
        let read_back = read_sample_file(&path).unwrap();
        assert_eq!(read_back, samples);
        remove_scratch(&path);
    }
}
