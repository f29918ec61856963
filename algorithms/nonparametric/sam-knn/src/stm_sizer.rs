use std::collections::{BTreeMap, VecDeque};
use std::fmt::Debug;
use std::hash::Hash;

use k_nn::{majority, Knn, KnnError};
use stream_helpers::{DataPoint, Distance, Float};

use crate::config::StmSizeAdaption;

/// Pairwise reduced distances inside the STM.
///
/// Row `i` holds the distances from STM sample `i` to samples `0..i`, so the
/// cache always has exactly as many rows as the STM has samples.
#[derive(Debug, Clone, Default)]
pub(crate) struct DistanceCache<F> {
    rows: VecDeque<VecDeque<F>>,
}

impl<F: Float> DistanceCache<F> {
    /// Appends the row of a new newest sample.
    pub(crate) fn push(&mut self, row: Vec<F>) {
        debug_assert_eq!(row.len(), self.rows.len());
        self.rows.push_back(row.into());
    }

    /// Forgets the `m` oldest samples.
    pub(crate) fn drain_front(&mut self, m: usize) {
        let m = m.min(self.rows.len());
        self.rows.drain(..m);
        for row in self.rows.iter_mut() {
            let cut = m.min(row.len());
            row.drain(..cut);
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.rows.len()
    }

    fn window(&self, i: usize, start: usize) -> Vec<F> {
        self.rows[i].range(start..i).copied().collect()
    }
}

/// Running test-then-train score of one candidate window.
#[derive(Debug, Clone, Copy)]
struct WindowScore {
    /// Absolute id of the next sample to evaluate.
    next: u64,
    correct: usize,
    total: usize,
}

impl WindowScore {
    fn accuracy(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.correct as f64 / self.total as f64
        }
    }
}

/// Picks the STM length that maximises interleaved test-then-train accuracy.
///
/// Candidate windows are suffixes of the STM. Scores are keyed by the absolute
/// id of the window's first sample, so a window keeps its score while older
/// samples leave the STM and only the newest sample has to be evaluated.
#[derive(Debug, Clone)]
pub(crate) struct StmSizer {
    strategy: StmSizeAdaption,
    min_size: usize,
    scores: BTreeMap<u64, WindowScore>,
}

impl StmSizer {
    pub(crate) fn new(strategy: StmSizeAdaption, min_size: usize) -> Self {
        Self {
            strategy,
            min_size: min_size.max(1),
            scores: BTreeMap::new(),
        }
    }

    /// Window sizes tried for an STM of `n` samples, largest first.
    pub(crate) fn candidate_sizes(&self, n: usize) -> Vec<usize> {
        let mut sizes = Vec::new();
        if n < 2 * self.min_size {
            return sizes;
        }
        let mut size = n;
        while size >= self.min_size {
            sizes.push(size);
            size = match self.strategy {
                StmSizeAdaption::MaxAcc => size - self.min_size,
                StmSizeAdaption::MaxAccApprox => size / 2,
                StmSizeAdaption::None => break,
            };
        }
        sizes
    }

    /// Returns the new STM length; never larger than `stm.len()`.
    ///
    /// `offset` is the absolute id of `stm[0]`.
    pub(crate) fn new_size<L, F, D>(
        &mut self,
        stm: &[DataPoint<L, F>],
        distances: &DistanceCache<F>,
        offset: u64,
        knn: &Knn<D>,
    ) -> Result<usize, KnnError>
    where
        L: Clone + Eq + Hash + Debug + Ord,
        F: Float,
        D: Distance<F>,
    {
        debug_assert_eq!(stm.len(), distances.len());
        let n = stm.len();
        let sizes = self.candidate_sizes(n);
        if sizes.is_empty() {
            self.scores.retain(|start, _| *start >= offset);
            return Ok(n);
        }

        let end = offset + n as u64;
        let mut starts = Vec::with_capacity(sizes.len());
        let mut best = (n, f64::NEG_INFINITY);
        for size in sizes {
            let start = offset + (n - size) as u64;
            starts.push(start);
            let score = self.scores.entry(start).or_insert(WindowScore {
                next: start + 1,
                correct: 0,
                total: 0,
            });

            let window_start = (start - offset) as usize;
            while score.next < end {
                let i = (score.next - offset) as usize;
                let predicted = predict_in_window(stm, distances, window_start, i, knn)?;
                if predicted == stm[i].label {
                    score.correct += 1;
                }
                score.total += 1;
                score.next += 1;
            }

            let accuracy = score.accuracy();
            if accuracy > best.1 {
                best = (size, accuracy);
            }
        }

        self.scores.retain(|start, _| starts.contains(start));
        Ok(best.0)
    }
}

/// Predicts STM sample `i` from the samples `start..i` that precede it in the window.
fn predict_in_window<L, F, D>(
    stm: &[DataPoint<L, F>],
    distances: &DistanceCache<F>,
    start: usize,
    i: usize,
    knn: &Knn<D>,
) -> Result<L, KnnError>
where
    L: Clone + Eq + Hash + Debug + Ord,
    F: Float,
    D: Distance<F>,
{
    if i - start < knn.k() {
        return majority(stm[start..i].iter().map(|dp| &dp.label)).ok_or(KnnError::EmptyMemory);
    }
    let rdistances = distances.window(i, start);
    knn.vote(&rdistances, |j| &stm[start + j].label)
}
