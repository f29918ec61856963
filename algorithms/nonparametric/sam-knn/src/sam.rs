use std::collections::{BTreeMap, VecDeque};
use std::fmt::Debug;
use std::hash::Hash;
use std::mem;

use k_means::KMeans;
use k_nn::{k_nearest, majority, Knn};
use log::{debug, trace};
use ndarray::ArrayView1;
use stream_helpers::{DataPoint, Distance, Float, L2Dist};

use crate::config::{SamKnnConfig, StmSizeAdaption};
use crate::error::SamKnnError;
use crate::stm_sizer::{DistanceCache, StmSizer};

const KMEANS_MAX_ITER: u32 = 300;
const KMEANS_TOLERANCE: f64 = 1e-4;

/// Bounds every SAM-kNN label type has to satisfy.
///
/// `Default` is the answer given before anything has been learned.
pub trait Label: Clone + Eq + Hash + Debug + Ord + Default {}

impl<T: Clone + Eq + Hash + Debug + Ord + Default> Label for T {}

/// The memory whose vote a prediction used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryChoice {
    ShortTerm,
    LongTerm,
    Combined,
}

/// Correctness of each memory's prediction for every sample in the STM.
#[derive(Debug, Clone, Default)]
struct MemoryScores {
    stm: VecDeque<bool>,
    ltm: VecDeque<bool>,
    combined: VecDeque<bool>,
}

impl MemoryScores {
    fn push(&mut self, stm: bool, ltm: bool, combined: bool) {
        self.stm.push_back(stm);
        self.ltm.push_back(ltm);
        self.combined.push_back(combined);
    }

    fn drain_front(&mut self, m: usize) {
        for history in [&mut self.stm, &mut self.ltm, &mut self.combined] {
            let cut = m.min(history.len());
            history.drain(..cut);
        }
    }

    /// The memory with the most correct predictions; ties prefer STM, then LTM.
    fn best(&self) -> MemoryChoice {
        let count = |h: &VecDeque<bool>| h.iter().filter(|&&c| c).count();
        let (stm, ltm, combined) = (count(&self.stm), count(&self.ltm), count(&self.combined));
        if stm >= ltm && stm >= combined {
            MemoryChoice::ShortTerm
        } else if ltm >= combined {
            MemoryChoice::LongTerm
        } else {
            MemoryChoice::Combined
        }
    }
}

/// Predictions of the three memories for one query.
#[derive(Debug, Clone)]
struct MemoryVotes<L> {
    stm: L,
    ltm: L,
    combined: L,
    choice: MemoryChoice,
}

impl<L: Clone> MemoryVotes<L> {
    fn chosen(&self) -> L {
        match self.choice {
            MemoryChoice::ShortTerm => self.stm.clone(),
            MemoryChoice::LongTerm => self.ltm.clone(),
            MemoryChoice::Combined => self.combined.clone(),
        }
    }
}

/// k-nearest-neighbour classifier with self-adjusting memory.
///
/// The short-term memory (STM) holds the most recent samples and shrinks to
/// the suffix that currently predicts best, dropping stale concepts. With the
/// long-term memory (LTM) enabled, samples leaving the STM are cleaned of
/// contradictions and kept in a class-wise k-means-compressed LTM. Each
/// prediction comes from the STM, the LTM, or both combined, whichever has
/// been most accurate on the current STM window.
#[derive(Debug, Clone)]
pub struct SamKnn<L, F = f64, D = L2Dist>
where
    L: Label,
    F: Float,
    D: Distance<F>,
{
    config: SamKnnConfig,
    knn: Knn<D>,
    stm: Vec<DataPoint<L, F>>,
    ltm: Vec<DataPoint<L, F>>,
    /// Absolute id of `stm[0]`.
    stm_offset: u64,
    distances: Option<DistanceCache<F>>,
    sizer: Option<StmSizer>,
    scores: MemoryScores,
    n_features: Option<usize>,
    train_step_count: usize,
    stm_sizes: Vec<usize>,
    ltm_sizes: Vec<usize>,
    classifier_choices: Vec<MemoryChoice>,
}

impl<L, F> SamKnn<L, F, L2Dist>
where
    L: Label,
    F: Float,
{
    /// Creates a SAM-kNN classifier with Euclidean distance.
    pub fn new(config: SamKnnConfig) -> Result<Self, SamKnnError> {
        Self::with_distance(config, L2Dist)
    }
}

impl<L, F, D> SamKnn<L, F, D>
where
    L: Label,
    F: Float,
    D: Distance<F>,
{
    /// Creates a SAM-kNN classifier using `distance` for every neighbour search.
    ///
    /// # Errors
    ///
    /// Returns `SamKnnError::Config` if `config` fails validation.
    pub fn with_distance(config: SamKnnConfig, distance: D) -> Result<Self, SamKnnError> {
        config.validate()?;
        let knn = Knn::new(config.n_neighbors, config.weighting, distance)?;
        let (distances, sizer) = match config.stm_size_adaption {
            StmSizeAdaption::None => (None, None),
            strategy => (
                Some(DistanceCache::default()),
                Some(StmSizer::new(strategy, config.min_stm_size)),
            ),
        };
        debug!(
            "SAM-kNN: k={} weighting={} max_size={} (stm {}, ltm {}) adaption={} use_ltm={}",
            config.n_neighbors,
            config.weighting,
            config.max_size,
            config.max_stm_size(),
            config.max_ltm_size(),
            config.stm_size_adaption,
            config.use_ltm
        );

        Ok(Self {
            config,
            knn,
            stm: Vec::new(),
            ltm: Vec::new(),
            stm_offset: 0,
            distances,
            sizer,
            scores: MemoryScores::default(),
            n_features: None,
            train_step_count: 0,
            stm_sizes: Vec::new(),
            ltm_sizes: Vec::new(),
            classifier_choices: Vec::new(),
        })
    }

    pub fn config(&self) -> &SamKnnConfig {
        &self.config
    }

    pub fn stm(&self) -> &[DataPoint<L, F>] {
        &self.stm
    }

    pub fn ltm(&self) -> &[DataPoint<L, F>] {
        &self.ltm
    }

    pub fn stm_len(&self) -> usize {
        self.stm.len()
    }

    pub fn ltm_len(&self) -> usize {
        self.ltm.len()
    }

    pub fn train_step_count(&self) -> usize {
        self.train_step_count
    }

    /// STM size after each training step.
    pub fn stm_sizes(&self) -> &[usize] {
        &self.stm_sizes
    }

    /// LTM size after each training step.
    pub fn ltm_sizes(&self) -> &[usize] {
        &self.ltm_sizes
    }

    /// Memory chosen for every training sample (only recorded with the LTM enabled).
    pub fn classifier_choices(&self) -> &[MemoryChoice] {
        &self.classifier_choices
    }

    /// Predicts the label of `x` without changing the model.
    ///
    /// Before the first `partial_fit` the default label is returned.
    pub fn predict(&self, x: ArrayView1<F>) -> Result<L, SamKnnError> {
        self.expect_dim(x.len())?;
        let rd_stm = self.knn.rdistances(x, &self.stm);
        Ok(self.vote_all(x, &rd_stm)?.chosen())
    }

    /// Learns one labelled sample.
    pub fn partial_fit(&mut self, x: ArrayView1<F>, y: L) -> Result<(), SamKnnError> {
        self.expect_dim(x.len())?;
        self.n_features.get_or_insert(x.len());

        let rd_stm = self.knn.rdistances(x, &self.stm);
        if self.config.use_ltm {
            let votes = self.vote_all(x, &rd_stm)?;
            self.scores.push(votes.stm == y, votes.ltm == y, votes.combined == y);
            self.classifier_choices.push(votes.choice);
        }

        self.stm.push(DataPoint::new(x.to_owned(), y));
        if let Some(cache) = self.distances.as_mut() {
            cache.push(rd_stm);
        }

        if self.config.use_ltm {
            self.enforce_memory_budget()?;
            let ltm = mem::take(&mut self.ltm);
            self.ltm = self.clean(ltm, true)?;
        } else {
            self.fade_out();
        }

        self.adapt_stm_size()?;

        self.train_step_count += 1;
        self.stm_sizes.push(self.stm.len());
        self.ltm_sizes.push(self.ltm.len());
        Ok(())
    }

    fn expect_dim(&self, actual: usize) -> Result<(), SamKnnError> {
        match self.n_features {
            Some(expected) if expected != actual => {
                Err(SamKnnError::DimensionMismatch { expected, actual })
            }
            _ => Ok(()),
        }
    }

    fn vote_all(&self, x: ArrayView1<F>, rd_stm: &[F]) -> Result<MemoryVotes<L>, SamKnnError> {
        let k = self.knn.k();
        let mut votes = MemoryVotes {
            stm: L::default(),
            ltm: L::default(),
            combined: L::default(),
            choice: MemoryChoice::ShortTerm,
        };
        if self.stm.is_empty() {
            if !self.ltm.is_empty() {
                let rd_ltm = self.knn.rdistances(x, &self.ltm);
                votes.ltm = self.vote_memory(&rd_ltm, &self.ltm)?;
                votes.choice = MemoryChoice::LongTerm;
            }
            return Ok(votes);
        }
        if self.stm.len() < k {
            votes.stm = self.vote_memory(rd_stm, &self.stm)?;
            return Ok(votes);
        }

        votes.stm = self.knn.vote(rd_stm, |i| &self.stm[i].label)?;
        if !self.config.use_ltm {
            return Ok(votes);
        }

        let rd_ltm = self.knn.rdistances(x, &self.ltm);
        let rd_combined: Vec<F> = rd_stm.iter().chain(&rd_ltm).copied().collect();
        let split = self.stm.len();
        votes.combined = self.knn.vote(&rd_combined, |i| {
            if i < split {
                &self.stm[i].label
            } else {
                &self.ltm[i - split].label
            }
        })?;

        if self.ltm.len() >= k {
            votes.ltm = self.knn.vote(&rd_ltm, |i| &self.ltm[i].label)?;
            votes.choice = self.scores.best();
        }
        Ok(votes)
    }

    /// Majority label while `memory` holds fewer than k samples, kNN vote otherwise.
    fn vote_memory(&self, rdistances: &[F], memory: &[DataPoint<L, F>]) -> Result<L, SamKnnError> {
        if memory.len() < self.knn.k() {
            return Ok(majority(memory.iter().map(|dp| &dp.label)).unwrap_or_default());
        }
        Ok(self.knn.vote(rdistances, |i| &memory[i].label)?)
    }

    /// Removes the `m` oldest STM samples and returns them, oldest first.
    fn drain_stm_front(&mut self, m: usize) -> Vec<DataPoint<L, F>> {
        let m = m.min(self.stm.len());
        let removed: Vec<_> = self.stm.drain(..m).collect();
        if let Some(cache) = self.distances.as_mut() {
            cache.drain_front(m);
        }
        self.scores.drain_front(m);
        self.stm_offset += m as u64;
        removed
    }

    /// Without an LTM the STM is a sliding window over the last `max_size` samples.
    fn fade_out(&mut self) {
        let excess = self.stm.len().saturating_sub(self.config.max_size);
        if excess > 0 {
            self.drain_stm_front(excess);
        }
    }

    /// Keeps STM and LTM together within `max_size`.
    ///
    /// An LTM over its own cap is compressed first; if that is not enough the
    /// oldest STM samples move to the LTM, which is then compressed. The STM
    /// never drops below `min(k, min_stm_size)` samples. Once it is that small,
    /// LTM samples that compression cannot merge are evicted from the front.
    fn enforce_memory_budget(&mut self) -> Result<(), SamKnnError> {
        let max_size = self.config.max_size;
        let max_ltm = self.config.max_ltm_size();
        let stm_floor = self.knn.k().min(self.config.min_stm_size).clamp(1, max_size);

        while self.stm.len() + self.ltm.len() > max_size {
            if self.ltm.len() > max_ltm {
                let ltm = mem::take(&mut self.ltm);
                self.ltm = self.compress(ltm)?;
                if self.stm.len() + self.ltm.len() <= max_size {
                    break;
                }
            }

            let movable = self.stm.len().saturating_sub(stm_floor);
            if movable == 0 {
                let excess = (self.stm.len() + self.ltm.len() - max_size).min(self.ltm.len());
                debug!(
                    "evicting {} LTM samples at step {}: more classes than the memory holds",
                    excess, self.train_step_count
                );
                self.ltm.drain(..excess);
                break;
            }

            let shifts = (max_ltm + 1).saturating_sub(self.ltm.len()).clamp(1, movable);
            let moved = self.drain_stm_front(shifts);
            trace!("moving {} samples from STM to LTM", moved.len());
            self.ltm.extend(moved);
            let ltm = mem::take(&mut self.ltm);
            self.ltm = self.compress(ltm)?;
        }
        Ok(())
    }

    /// Halves every class of `memory` with k-means, keeping at least one sample per class.
    fn compress(&self, memory: Vec<DataPoint<L, F>>) -> Result<Vec<DataPoint<L, F>>, SamKnnError> {
        let before = memory.len();
        let mut by_class: BTreeMap<L, Vec<DataPoint<L, F>>> = BTreeMap::new();
        for dp in memory {
            by_class.entry(dp.label.clone()).or_default().push(dp);
        }

        let tolerance = F::from_f64(KMEANS_TOLERANCE).unwrap_or_else(F::epsilon);
        let mut compressed = Vec::with_capacity(before / 2 + by_class.len());
        for (label, points) in by_class {
            let target = (points.len() / 2).max(1);
            if target >= points.len() {
                compressed.extend(points);
                continue;
            }
            let kmeans = KMeans::new(target, KMEANS_MAX_ITER, tolerance, self.knn.distance().clone());
            let (_, centroids) = kmeans.fit(&points)?;
            compressed.extend(
                centroids
                    .rows()
                    .into_iter()
                    .map(|c| DataPoint::new(c.to_owned(), label.clone())),
            );
        }

        debug!(
            "compressed LTM from {} to {} samples at step {}",
            before,
            compressed.len(),
            self.train_step_count
        );
        Ok(compressed)
    }

    /// Removes samples of `target` that contradict the STM.
    ///
    /// For an STM sample, the farthest of its k nearest STM neighbours with the
    /// same label sets a radius; any of its k nearest `target` samples inside
    /// that radius with a different label is dropped. With `only_last` just the
    /// newest STM sample is used.
    fn clean(
        &self,
        mut target: Vec<DataPoint<L, F>>,
        only_last: bool,
    ) -> Result<Vec<DataPoint<L, F>>, SamKnnError> {
        let k = self.knn.k();
        let n = self.stm.len();
        if n <= k || target.is_empty() {
            return Ok(target);
        }

        let range = if only_last { n - 1..n } else { 0..n };
        for i in range {
            if target.is_empty() {
                break;
            }
            let query = self.stm[i].features.view();
            let label = &self.stm[i].label;

            let mut rd_stm = self.knn.rdistances(query, &self.stm);
            rd_stm[i] = F::infinity();
            let threshold = k_nearest(k, &rd_stm)?
                .into_iter()
                .filter(|&j| self.stm[j].label == *label)
                .map(|j| rd_stm[j])
                .reduce(|a, b| if b > a { b } else { a });
            let Some(threshold) = threshold else {
                continue;
            };

            let rd_target = self.knn.rdistances(query, &target);
            let mut contradicting: Vec<usize> = k_nearest(k, &rd_target)?
                .into_iter()
                .filter(|&j| target[j].label != *label && rd_target[j] <= threshold)
                .collect();
            if contradicting.is_empty() {
                continue;
            }
            contradicting.sort_unstable();
            let mut idx = 0;
            target.retain(|_| {
                let keep = contradicting.binary_search(&idx).is_err();
                idx += 1;
                keep
            });
        }
        Ok(target)
    }

    fn adapt_stm_size(&mut self) -> Result<(), SamKnnError> {
        let (Some(sizer), Some(cache)) = (self.sizer.as_mut(), self.distances.as_ref()) else {
            return Ok(());
        };
        let old_size = self.stm.len();
        let new_size = sizer.new_size(&self.stm, cache, self.stm_offset, &self.knn)?;
        if new_size >= old_size {
            return Ok(());
        }

        debug!(
            "STM shrinks from {} to {} samples at step {}",
            old_size, new_size, self.train_step_count
        );
        let discarded = self.drain_stm_front(old_size - new_size);
        if self.config.use_ltm {
            let kept = self.clean(discarded, false)?;
            self.ltm.extend(kept);
            self.enforce_memory_budget()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use k_nn::Weighting;
    use ndarray::{array, Array1};
    use rand::{Rng, SeedableRng};
    use rand_xoshiro::Xoshiro256PlusPlus;

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).filter_level(log::LevelFilter::Debug).try_init();
    }

    fn small_config() -> SamKnnConfig {
        SamKnnConfig::default()
            .with_n_neighbors(3)
            .with_max_size(60)
            .with_min_stm_size(10)
    }

    /// Uniform points in [-1, 1]^2, labelled by the sign of x (flipped when `flip`).
    fn stream(rng: &mut Xoshiro256PlusPlus, n: usize, flip: bool) -> Vec<(Array1<f64>, u8)> {
        (0..n)
            .map(|_| {
                let x: f64 = rng.random_range(-1.0..1.0);
                let y: f64 = rng.random_range(-1.0..1.0);
                let label = u8::from((x > 0.0) != flip);
                (array![x, y], label)
            })
            .collect()
    }

    fn accuracy(model: &SamKnn<u8>, samples: &[(Array1<f64>, u8)]) -> f64 {
        let correct = samples
            .iter()
            .filter(|(x, y)| model.predict(x.view()).unwrap() == *y)
            .count();
        correct as f64 / samples.len() as f64
    }

    #[test]
    fn test_untrained_predicts_default_label() {
        let model: SamKnn<u8> = SamKnn::new(SamKnnConfig::default()).unwrap();
        assert_eq!(model.predict(array![0.5, 0.5].view()).unwrap(), 0);
    }

    #[test]
    fn test_short_stm_uses_majority() {
        let mut model: SamKnn<u8> = SamKnn::new(small_config()).unwrap();
        model.partial_fit(array![0.0, 0.0].view(), 7).unwrap();
        model.partial_fit(array![5.0, 5.0].view(), 4).unwrap();
        assert_eq!(model.stm_len(), 2);
        // Fewer samples than k: plain majority, ties to the smaller label.
        assert_eq!(model.predict(array![0.0, 0.0].view()).unwrap(), 4);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let result: Result<SamKnn<u8>, _> = SamKnn::new(SamKnnConfig::default().with_n_neighbors(0));
        assert!(matches!(result, Err(SamKnnError::Config(_))));
    }

    #[test]
    fn test_dimension_mismatch() {
        let mut model: SamKnn<u8> = SamKnn::new(small_config()).unwrap();
        model.partial_fit(array![0.0, 0.0].view(), 1).unwrap();
        let err = model.predict(array![0.0].view()).unwrap_err();
        assert_eq!(err, SamKnnError::DimensionMismatch { expected: 2, actual: 1 });
        assert!(model.partial_fit(array![0.0, 1.0, 2.0].view(), 1).is_err());
    }

    #[test]
    fn test_stm_only_window_fades_out() {
        let config = small_config()
            .with_ltm(false)
            .with_stm_size_adaption(StmSizeAdaption::None)
            .with_max_size(10);
        let mut model: SamKnn<u8> = SamKnn::new(config).unwrap();
        for i in 0..25 {
            model.partial_fit(array![i as f64].view(), (i % 2) as u8).unwrap();
        }
        assert_eq!(model.stm_len(), 10);
        assert_eq!(model.ltm_len(), 0);
        assert_eq!(model.stm()[0].features, array![15.0]);
        assert_eq!(model.train_step_count(), 25);
        assert!(model.classifier_choices().is_empty());
    }

    #[test]
    fn test_memory_budget_holds_with_ltm() {
        init_logger();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(11);
        let config = small_config()
            .with_stm_size_adaption(StmSizeAdaption::None)
            .with_max_size(40)
            .with_ltm_size_proportion(0.5);
        let mut model: SamKnn<u8> = SamKnn::new(config).unwrap();
        for (x, y) in stream(&mut rng, 200, false) {
            model.partial_fit(x.view(), y).unwrap();
            assert!(model.stm_len() + model.ltm_len() <= 40);
        }
        assert!(model.ltm_len() > 0);
        assert_eq!(model.classifier_choices().len(), 200);
        assert_eq!(model.stm_sizes().len(), 200);
        assert_eq!(model.ltm_sizes().len(), 200);
    }

    #[test]
    fn test_memory_budget_with_more_classes_than_room() {
        init_logger();
        let config = SamKnnConfig::default()
            .with_n_neighbors(1)
            .with_max_size(5)
            .with_min_stm_size(1);
        let mut model: SamKnn<u8> = SamKnn::new(config).unwrap();
        for i in 0..50u32 {
            model.partial_fit(array![f64::from(i)].view(), (i % 10) as u8).unwrap();
            assert!(
                model.stm_len() + model.ltm_len() <= 5,
                "step {}: stm {} ltm {}",
                i,
                model.stm_len(),
                model.ltm_len()
            );
            assert!(model.stm_len() >= 1, "step {}: empty STM", i);
        }
        assert_eq!(model.stm().last().unwrap().features, array![49.0]);
        assert!(model.predict(array![49.0].view()).is_ok());
    }

    #[test]
    fn test_empty_stm_votes_from_ltm() {
        let mut model: SamKnn<u8> = SamKnn::new(small_config()).unwrap();
        model.ltm.push(DataPoint::new(array![1.0, 1.0], 3));
        assert_eq!(model.predict(array![1.0, 1.0].view()).unwrap(), 3);
    }

    #[test]
    fn test_compress_halves_each_class() {
        let model: SamKnn<u8> = SamKnn::new(small_config()).unwrap();
        let mut memory: Vec<DataPoint<u8, f64>> = (0..10)
            .map(|i| DataPoint::new(array![i as f64, 0.0], 0))
            .collect();
        memory.extend((0..4).map(|i| DataPoint::new(array![100.0 + i as f64, 0.0], 1)));
        memory.push(DataPoint::new(array![-50.0, -50.0], 2));

        let compressed = model.compress(memory).unwrap();
        let count = |label: u8| compressed.iter().filter(|dp| dp.label == label).count();
        assert_eq!(count(0), 5);
        assert_eq!(count(1), 2);
        assert_eq!(count(2), 1);
        assert!(compressed
            .iter()
            .filter(|dp| dp.label == 1)
            .all(|dp| dp.features[0] >= 100.0 && dp.features[0] <= 103.0));
    }

    #[test]
    fn test_clean_drops_contradicting_samples() {
        let config = small_config().with_stm_size_adaption(StmSizeAdaption::None);
        let mut model: SamKnn<u8> = SamKnn::new(config).unwrap();
        for i in 0..6 {
            model.partial_fit(array![i as f64 * 0.1, 0.0].view(), 1).unwrap();
        }
        let target = vec![
            DataPoint::new(array![0.45, 0.0], 0),
            DataPoint::new(array![0.5, 0.05], 1),
            DataPoint::new(array![9.0, 9.0], 0),
        ];
        let cleaned = model.clean(target, true).unwrap();
        assert_eq!(cleaned.len(), 2);
        assert!(cleaned.iter().all(|dp| dp.features != array![0.45, 0.0]));
    }

    #[test]
    fn test_adapts_to_abrupt_drift() {
        init_logger();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(42);
        let config = SamKnnConfig::default()
            .with_ltm(false)
            .with_max_size(1000)
            .with_min_stm_size(20);
        let mut model: SamKnn<u8> = SamKnn::new(config).unwrap();

        for (x, y) in stream(&mut rng, 300, false) {
            model.partial_fit(x.view(), y).unwrap();
        }
        for (x, y) in stream(&mut rng, 300, true) {
            model.partial_fit(x.view(), y).unwrap();
        }

        let shrank = model.stm_sizes()[300..].windows(2).any(|w| w[1] < w[0]);
        assert!(shrank, "STM never shrank after the drift");
        let test = stream(&mut rng, 200, true);
        assert!(accuracy(&model, &test) > 0.8);
    }

    #[test]
    fn test_ltm_model_learns_stationary_stream() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(3);
        let config = SamKnnConfig::default().with_max_size(200).with_min_stm_size(20);
        let mut model: SamKnn<u8> = SamKnn::new(config).unwrap();
        for (x, y) in stream(&mut rng, 600, false) {
            model.partial_fit(x.view(), y).unwrap();
        }
        assert!(model.stm_len() + model.ltm_len() <= 200);
        let test = stream(&mut rng, 200, false);
        assert!(accuracy(&model, &test) > 0.85);
    }
}
