use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{
    Path,
    PathBuf
};

use log::{
    debug,
    info
};

use crate::integration::integrationresult::IntegrationMethod;
use crate::validation::validationerror::ValidationError;

/// Directory of single-value reference files, one per method, named
/// `integral<Method>_N<sample_count>_precision<precision>.txt`.
#[derive(Debug, Clone)]
pub struct ReferenceStore {
    dir: PathBuf,
    sample_count: usize,
    precision: usize,
}

impl ReferenceStore {
    pub fn new<P: Into<PathBuf>>(dir: P, sample_count: usize, precision: usize) -> ReferenceStore {
        ReferenceStore {
            dir: dir.into(),
            sample_count,
            precision,
        }
    }

    pub fn path(&self, method: IntegrationMethod) -> PathBuf {
        self.dir.join(format!("integral{}_N{}_precision{}.txt",
                              method.file_tag(),
                              self.sample_count,
                              self.precision))
    }

    pub fn load(&self, method: IntegrationMethod) -> Result<f64, ValidationError> {
        let path = self.path(method);
        match read_reference(&path) {
            Err(ValidationError::Io { source, .. }) if source.kind() == ErrorKind::NotFound => {
                Err(ValidationError::MissingReference { method, path: Some(path) })
            },
            other => other,
        }
    }

    /// Loads the reference of every method in `methods`.
    pub fn load_all<I>(&self, methods: I) -> Result<BTreeMap<IntegrationMethod, f64>, ValidationError>
    where
        I: IntoIterator<Item = IntegrationMethod> {
        methods
            .into_iter()
            .map(|method| self.load(method).map(|value| (method, value)))
            .collect()
    }

    pub fn save(&self, method: IntegrationMethod, value: f64) -> Result<PathBuf, ValidationError> {
        let path = self.path(method);
        write_reference(&path, value, self.precision)?;
        info!("{} reference saved to {}", method, path.display());
        Ok(path)
    }
}

pub fn read_reference<P: AsRef<Path>>(path: P) -> Result<f64, ValidationError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .map_err(|source| ValidationError::Io { path: path.to_owned(), source })?;
    let malformed = |reason: String| ValidationError::MalformedReference { path: path.to_owned(), reason };

    let mut tokens = content.split_whitespace();
    let token = tokens.next().ok_or_else(|| malformed("file is empty".to_owned()))?;
    if let Some(extra) = tokens.next() {
        return Err(malformed(format!("unexpected trailing token '{}'", extra)));
    }
    let value = token
        .parse::<f64>()
        .map_err(|error| malformed(format!("'{}': {}", token, error)))?;
    if !value.is_finite() {
        return Err(malformed(format!("'{}' is not finite", token)));
    }
    debug!("reference {} = {}", path.display(), value);
    Ok(value)
}

pub fn write_reference<P: AsRef<Path>>(path: P, value: f64, precision: usize) -> Result<(), ValidationError> {
    let path = path.as_ref();
    fs::write(path, format!("{:.*}", precision, value))
        .map_err(|source| ValidationError::Io { path: path.to_owned(), source })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir()
            .join(format!("compquad-reference-{}-{}", name, std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn file_names_follow_method_count_and_precision() {
        let store = ReferenceStore::new("/data", 1000000, 16);
        assert_eq!(
            store.path(IntegrationMethod::Trapezoidal),
            PathBuf::from("/data/integralTrapz_N1000000_precision16.txt"));
        assert_eq!(
            store.path(IntegrationMethod::Romberg),
            PathBuf::from("/data/integralRomberg_N1000000_precision16.txt"));
    }

    #[test]
    fn saved_values_load_back() {
        let dir = scratch_dir("roundtrip");
        let store = ReferenceStore::new(&dir, 1000, 16);
        store.save(IntegrationMethod::Simpson, 1.9052386904826757).unwrap();
        let loaded = store.load(IntegrationMethod::Simpson).unwrap();
        assert!((loaded - 1.9052386904826757).abs() < 1e-16);
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn missing_file_is_missing_reference() {
        let dir = scratch_dir("missing");
        let store = ReferenceStore::new(&dir, 7, 16);
        match store.load(IntegrationMethod::Romberg) {
            Err(ValidationError::MissingReference { method, path }) => {
                assert_eq!(method, IntegrationMethod::Romberg);
                assert_eq!(path, Some(store.path(IntegrationMethod::Romberg)));
            },
            other => panic!("unexpected result: {:?}", other),
        }
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn load_all_stops_at_first_missing_method() {
        let dir = scratch_dir("partial");
        let store = ReferenceStore::new(&dir, 9, 16);
        store.save(IntegrationMethod::Trapezoidal, 1.0).unwrap();
        let result = store.load_all(IntegrationMethod::ALL);
        assert!(matches!(
            result,
            Err(ValidationError::MissingReference { method: IntegrationMethod::Simpson, .. })));
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn rejects_garbage_content() {
        let dir = scratch_dir("garbage");
        let path = dir.join("bad.txt");
        fs::write(&path, "1.0 2.0").unwrap();
        assert!(matches!(read_reference(&path), Err(ValidationError::MalformedReference { .. })));
        fs::write(&path, "nope").unwrap();
        assert!(matches!(read_reference(&path), Err(ValidationError::MalformedReference { .. })));
        fs::write(&path, "  \n").unwrap();
        assert!(matches!(read_reference(&path), Err(ValidationError::MalformedReference { .. })));
        fs::remove_dir_all(&dir).unwrap();
    }
}
