//! Test-then-train evaluation of stream classifiers.
//!
//! Every sample of a labelled stream is first predicted and then learned, and
//! the share of wrong predictions is reported as the error rate.

pub mod classifier;
pub mod dataset;
pub mod error;
pub mod evaluation;

pub use classifier::StreamClassifier;
pub use dataset::{load_features, load_labels, Dataset};
pub use error::{Error, LoadError};
pub use evaluation::{evaluate, evaluate_dataset, EvaluationReport, PredictionLog, Progress};
