use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort an evaluation run.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Feature matrix has {features} rows but {labels} labels were given")]
    ShapeMismatch { features: usize, labels: usize },

    #[error("Dataset is empty; accuracy is undefined")]
    EmptyDataset,

    #[error("Failed to load dataset: {0}")]
    DatasetLoad(#[from] LoadError),

    #[error("Invalid classifier configuration: {0}")]
    Config(#[from] sam_knn::ConfigError),

    #[error("Failed to build classifier: {0}")]
    Model(#[from] sam_knn::SamKnnError),

    #[error("Classifier failed on sample {index}: {source}")]
    Classifier {
        index: usize,
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },
}

impl Error {
    pub(crate) fn classifier<E>(index: usize, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Error::Classifier { index, source: Box::new(source) }
    }
}

/// Problems reading the feature or label file.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to read {}: {source}", .path.display())]
    Io { path: PathBuf, source: std::io::Error },

    #[error("Failed to parse CSV {}: {source}", .path.display())]
    Csv { path: PathBuf, source: csv::Error },

    #[error("{} contains no samples", .path.display())]
    EmptyFile { path: PathBuf },

    #[error("Invalid numeric value '{value}' at row {row} of {}", .path.display())]
    InvalidNumeric { path: PathBuf, row: usize, value: String },

    #[error("Invalid label '{value}' at row {row} of {}: expected an integer in 0..=255", .path.display())]
    InvalidLabel { path: PathBuf, row: usize, value: String },

    #[error("Inconsistent column count in {}: row {row} has {actual} columns, expected {expected}", .path.display())]
    InconsistentColumns { path: PathBuf, row: usize, actual: usize, expected: usize },

    #[error("Failed to shape data into array: {0}")]
    ArrayShape(#[from] ndarray::ShapeError),
}
