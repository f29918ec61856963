use k_means::KMeansError;
use k_nn::KnnError;
use thiserror::Error;

use crate::config::ConfigError;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SamKnnError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Neighbour search failed: {0}")]
    Knn(#[from] KnnError),

    #[error("LTM compression failed: {0}")]
    Compression(#[from] KMeansError),

    #[error("Sample has {actual} features, expected {expected}")]
    DimensionMismatch { expected: usize, actual: usize },
}
