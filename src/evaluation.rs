use log::info;
use ndarray::ArrayView2;

use crate::classifier::StreamClassifier;
use crate::dataset::Dataset;
use crate::error::Error;

#[cfg(feature = "serde")]
use serde_crate::Serialize;

/// Predicted and true labels, in stream order.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize),
    serde(crate = "serde_crate")
)]
pub struct PredictionLog<L> {
    predicted: Vec<L>,
    truth: Vec<L>,
}

impl<L> Default for PredictionLog<L> {
    fn default() -> Self {
        Self {
            predicted: Vec::new(),
            truth: Vec::new(),
        }
    }
}

impl<L: PartialEq> PredictionLog<L> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            predicted: Vec::with_capacity(capacity),
            truth: Vec::with_capacity(capacity),
        }
    }

    pub fn record(&mut self, predicted: L, truth: L) {
        self.predicted.push(predicted);
        self.truth.push(truth);
    }

    pub fn predicted(&self) -> &[L] {
        &self.predicted
    }

    pub fn truth(&self) -> &[L] {
        &self.truth
    }

    pub fn len(&self) -> usize {
        self.predicted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.predicted.is_empty()
    }

    /// Number of positions where prediction and truth agree.
    pub fn correct(&self) -> usize {
        self.predicted
            .iter()
            .zip(&self.truth)
            .filter(|(p, t)| p == t)
            .count()
    }

    /// `None` for an empty log.
    pub fn accuracy(&self) -> Option<f64> {
        if self.is_empty() {
            None
        } else {
            Some(self.correct() as f64 / self.len() as f64)
        }
    }

    pub fn error_rate(&self) -> Option<f64> {
        self.accuracy().map(|acc| 1.0 - acc)
    }
}

/// Reports progress roughly every five percent of the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    total: usize,
    step: usize,
}

impl Progress {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            step: total.div_ceil(20).max(1),
        }
    }

    pub fn step(&self) -> usize {
        self.step
    }

    /// Percentage to report before processing sample `i`, if any.
    pub fn percent_at(&self, i: usize) -> Option<usize> {
        if self.total == 0 || i % self.step != 0 {
            return None;
        }
        Some(i * 20 / self.total * 5)
    }
}

/// Outcome of one test-then-train pass.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize),
    serde(crate = "serde_crate")
)]
pub struct EvaluationReport<L> {
    pub log: PredictionLog<L>,
    pub accuracy: f64,
    pub error_rate: f64,
}

/// Runs a test-then-train pass over `features` and `labels`.
///
/// Every sample is first predicted, then learned with its true label, in
/// strictly ascending order.
///
/// # Errors
///
/// `Error::ShapeMismatch` before any prediction if the row and label counts
/// differ, `Error::EmptyDataset` for an empty stream, and
/// `Error::Classifier` with the failing index if the classifier errors.
pub fn evaluate<C, L, F>(
    classifier: &mut C,
    features: ArrayView2<F>,
    labels: &[L],
) -> Result<EvaluationReport<L>, Error>
where
    C: StreamClassifier<L, F>,
    L: Clone + PartialEq,
{
    let n = features.nrows();
    if n != labels.len() {
        return Err(Error::ShapeMismatch {
            features: n,
            labels: labels.len(),
        });
    }
    if n == 0 {
        return Err(Error::EmptyDataset);
    }

    info!("applying model on dataset");
    let progress = Progress::new(n);
    let mut log = PredictionLog::with_capacity(n);
    for (i, (row, label)) in features.rows().into_iter().zip(labels).enumerate() {
        if let Some(pct) = progress.percent_at(i) {
            info!("{pct}%");
        }
        let predicted = classifier
            .predict(row)
            .map_err(|e| Error::classifier(i, e))?;
        log.record(predicted, label.clone());
        classifier
            .partial_fit(row, label.clone())
            .map_err(|e| Error::classifier(i, e))?;
    }

    let accuracy = log.accuracy().ok_or(Error::EmptyDataset)?;
    let error_rate = 1.0 - accuracy;
    info!("error rate {:.2}%", error_rate * 100.0);
    Ok(EvaluationReport {
        log,
        accuracy,
        error_rate,
    })
}

/// [`evaluate`] over a loaded [`Dataset`].
pub fn evaluate_dataset<C>(classifier: &mut C, dataset: &Dataset) -> Result<EvaluationReport<u8>, Error>
where
    C: StreamClassifier<u8, f64>,
{
    let labels: Vec<u8> = dataset.labels().to_vec();
    evaluate(classifier, dataset.features(), &labels)
}
