use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

use crate::error::{Error, LoadError};

/// A labelled stream held fully in memory, one sample per row.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    features: Array2<f64>,
    labels: Array1<u8>,
}

impl Dataset {
    /// Pairs a feature matrix with its labels.
    ///
    /// # Errors
    ///
    /// `Error::ShapeMismatch` if the row and label counts differ,
    /// `Error::EmptyDataset` if there are no rows.
    pub fn new(features: Array2<f64>, labels: Array1<u8>) -> Result<Self, Error> {
        if features.nrows() != labels.len() {
            return Err(Error::ShapeMismatch {
                features: features.nrows(),
                labels: labels.len(),
            });
        }
        if features.nrows() == 0 {
            return Err(Error::EmptyDataset);
        }
        Ok(Self { features, labels })
    }

    /// Reads a feature file and a label file.
    ///
    /// Both files are read completely and closed before this returns.
    pub fn load<P: AsRef<Path>, Q: AsRef<Path>>(features_path: P, labels_path: Q) -> Result<Self, Error> {
        let features = load_features(features_path)?;
        let labels = load_labels(labels_path)?;
        let dataset = Self::new(features, labels)?;
        info!("{} samples", dataset.n_samples());
        info!("{} dimensions", dataset.n_features());
        Ok(dataset)
    }

    pub fn n_samples(&self) -> usize {
        self.features.nrows()
    }

    pub fn n_features(&self) -> usize {
        self.features.ncols()
    }

    pub fn features(&self) -> ArrayView2<'_, f64> {
        self.features.view()
    }

    pub fn labels(&self) -> ArrayView1<'_, u8> {
        self.labels.view()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Delimiter {
    Comma,
    Whitespace,
}

impl Delimiter {
    /// `.csv` files and files whose first data line has a comma are CSV.
    fn detect(path: &Path, content: &str) -> Self {
        let is_csv = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
        let first_line = content
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty() && !line.starts_with('#'));
        if is_csv || first_line.is_some_and(|line| line.contains(',')) {
            Delimiter::Comma
        } else {
            Delimiter::Whitespace
        }
    }
}

/// Splits a file into rows of fields. Rows are numbered from 1 and skip
/// blank and `#` comment lines.
fn read_rows(path: &Path) -> Result<Vec<(usize, Vec<String>)>, LoadError> {
    let content = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let delimiter = Delimiter::detect(path, &content);
    debug!("reading {} as {:?}-delimited", path.display(), delimiter);

    let rows = match delimiter {
        Delimiter::Comma => {
            let mut rdr = csv::ReaderBuilder::new()
                .has_headers(false)
                .flexible(true)
                .trim(csv::Trim::All)
                .comment(Some(b'#'))
                .from_reader(content.as_bytes());
            let mut rows = Vec::new();
            for (i, record) in rdr.records().enumerate() {
                let record = record.map_err(|source| LoadError::Csv {
                    path: path.to_path_buf(),
                    source,
                })?;
                if record.iter().all(str::is_empty) {
                    continue;
                }
                rows.push((i + 1, record.iter().map(str::to_string).collect()));
            }
            rows
        }
        Delimiter::Whitespace => content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .enumerate()
            .map(|(i, line)| (i + 1, line.split_whitespace().map(str::to_string).collect()))
            .collect(),
    };

    if rows.is_empty() {
        return Err(LoadError::EmptyFile {
            path: path.to_path_buf(),
        });
    }
    Ok(rows)
}

/// Loads a numeric matrix, one sample per line.
pub fn load_features<P: AsRef<Path>>(path: P) -> Result<Array2<f64>, LoadError> {
    let path = path.as_ref();
    let rows = read_rows(path)?;
    let n_cols = rows[0].1.len();

    let mut data = Vec::with_capacity(rows.len() * n_cols);
    for (row, fields) in &rows {
        if fields.len() != n_cols {
            return Err(LoadError::InconsistentColumns {
                path: path.to_path_buf(),
                row: *row,
                actual: fields.len(),
                expected: n_cols,
            });
        }
        for field in fields {
            let value = field.parse::<f64>().map_err(|_| LoadError::InvalidNumeric {
                path: path.to_path_buf(),
                row: *row,
                value: field.clone(),
            })?;
            data.push(value);
        }
    }

    Ok(Array2::from_shape_vec((rows.len(), n_cols), data)?)
}

/// Loads small unsigned integer labels; any layout of one or more per line.
pub fn load_labels<P: AsRef<Path>>(path: P) -> Result<Array1<u8>, LoadError> {
    let path = path.as_ref();
    let rows = read_rows(path)?;

    let mut labels = Vec::with_capacity(rows.len());
    for (row, fields) in &rows {
        for field in fields {
            let label = parse_label(field).ok_or_else(|| LoadError::InvalidLabel {
                path: PathBuf::from(path),
                row: *row,
                value: field.clone(),
            })?;
            labels.push(label);
        }
    }
    Ok(Array1::from_vec(labels))
}

/// Accepts `3` as well as integral float spellings such as `3.0`.
fn parse_label(field: &str) -> Option<u8> {
    if let Ok(label) = field.parse::<u8>() {
        return Some(label);
    }
    let value = field.parse::<f64>().ok()?;
    if value.fract() == 0.0 && (0.0..=f64::from(u8::MAX)).contains(&value) {
        Some(value as u8)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use std::io::Write;
    use tempfile::{Builder, NamedTempFile};

    fn create_temp_file(content: &str, suffix: &str) -> NamedTempFile {
        let mut file = Builder::new()
            .suffix(suffix)
            .tempfile()
            .expect("Failed to create temp file");
        file.write_all(content.as_bytes()).expect("Failed to write to temp file");
        file.flush().expect("Failed to flush temp file");
        file
    }

    #[test]
    fn test_load_whitespace_matrix() {
        let file = create_temp_file("# header comment\n0.1  0.2\t0.3\n\n1.0 2.0 3.0\n", ".data");
        let features = load_features(file.path()).unwrap();
        assert_eq!(features, array![[0.1, 0.2, 0.3], [1.0, 2.0, 3.0]]);
    }

    #[test]
    fn test_load_comma_matrix() {
        let file = create_temp_file("1.5, 2.5\n3.5,4.5\n", ".txt");
        let features = load_features(file.path()).unwrap();
        assert_eq!(features, array![[1.5, 2.5], [3.5, 4.5]]);
    }

    #[test]
    fn test_load_csv_extension_single_column() {
        let file = create_temp_file("1\n2\n3\n", ".csv");
        let features = load_features(file.path()).unwrap();
        assert_eq!(features, array![[1.0], [2.0], [3.0]]);
    }

    #[test]
    fn test_inconsistent_columns() {
        let file = create_temp_file("1 2\n3\n", ".data");
        let err = load_features(file.path()).unwrap_err();
        assert!(matches!(
            err,
            LoadError::InconsistentColumns { row: 2, actual: 1, expected: 2, .. }
        ));
    }

    #[test]
    fn test_invalid_numeric() {
        let file = create_temp_file("1 2\n3 x\n", ".data");
        let err = load_features(file.path()).unwrap_err();
        assert!(matches!(err, LoadError::InvalidNumeric { row: 2, ref value, .. } if value == "x"));
    }

    #[test]
    fn test_empty_file() {
        let file = create_temp_file("\n# nothing\n", ".data");
        assert!(matches!(load_features(file.path()), Err(LoadError::EmptyFile { .. })));
    }

    #[test]
    fn test_missing_file() {
        let result = load_labels("/definitely/not/here.labels");
        assert!(matches!(result, Err(LoadError::Io { .. })));
    }

    #[test]
    fn test_load_labels() {
        let file = create_temp_file("0\n1\n2.0\n255\n", ".labels");
        assert_eq!(load_labels(file.path()).unwrap(), array![0u8, 1, 2, 255]);

        let bad = create_temp_file("0\n256\n", ".labels");
        assert!(matches!(
            load_labels(bad.path()),
            Err(LoadError::InvalidLabel { row: 2, .. })
        ));

        let fractional = create_temp_file("1.5\n", ".labels");
        assert!(load_labels(fractional.path()).is_err());
    }

    #[test]
    fn test_dataset_load_checks_shape() {
        let features = create_temp_file("0 0\n1 1\n2 2\n", ".data");
        let labels = create_temp_file("0\n1\n", ".labels");
        let err = Dataset::load(features.path(), labels.path()).unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch { features: 3, labels: 2 }));

        let labels = create_temp_file("0\n1\n1\n", ".labels");
        let dataset = Dataset::load(features.path(), labels.path()).unwrap();
        assert_eq!(dataset.n_samples(), 3);
        assert_eq!(dataset.n_features(), 2);
        assert_eq!(dataset.labels(), array![0u8, 1, 1]);
    }

    #[test]
    fn test_dataset_load_missing_file() {
        let labels = create_temp_file("0\n", ".labels");
        let err = Dataset::load("/definitely/not/here.data", labels.path()).unwrap_err();
        assert!(matches!(err, Error::DatasetLoad(LoadError::Io { .. })));
    }

    #[test]
    fn test_dataset_new_rejects_empty() {
        let err = Dataset::new(Array2::zeros((0, 2)), Array1::zeros(0)).unwrap_err();
        assert!(matches!(err, Error::EmptyDataset));
    }

    #[test]
    fn test_parse_label() {
        assert_eq!(parse_label("7"), Some(7));
        assert_eq!(parse_label("7.0"), Some(7));
        assert_eq!(parse_label("-1"), None);
        assert_eq!(parse_label("abc"), None);
    }
}
