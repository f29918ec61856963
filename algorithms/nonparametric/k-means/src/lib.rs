use log::{debug, trace};
use ndarray::{Array1, Array2, ArrayView1};
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::hash::Hash;
// Core components from shared library
use stream_helpers::{DataPoint, Distance, Float};

/// Seed used when none is configured, so compression is reproducible.
pub const DEFAULT_SEED: u64 = 0;

/// Errors that can occur during k-means clustering.
#[derive(Debug, Clone, PartialEq)]
pub enum KMeansError {
    InvalidK,
    EmptyDataSet,
    KTooLarge,
    MismatchedDimensions,
    InvalidDistance,
}

impl Display for KMeansError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl Error for KMeansError {}

/// A k-means clustering model with k-means++ seeding.
#[derive(Debug, Clone)]
pub struct KMeans<F, D>
where
    F: Float,
    D: Distance<F>,
{
    pub k: usize,
    max_iter: u32,
    tolerance: F,
    distance: D,
    seed: u64,
}

impl<F, D> KMeans<F, D>
where
    F: Float,
    D: Distance<F>,
{
    pub fn new(k: usize, max_iter: u32, tolerance: F, distance: D) -> Self {
        Self { k, max_iter, tolerance, distance, seed: DEFAULT_SEED }
    }

    /// Sets the seed of the k-means++ initialisation.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn fit<L: Debug + Eq + Hash + Clone>(
        &self,
        data: &[DataPoint<L, F>],
    ) -> Result<(Vec<usize>, Array2<F>), KMeansError> {
        if self.k == 0 { return Err(KMeansError::InvalidK); }
        if data.is_empty() { return Err(KMeansError::EmptyDataSet); }
        if self.k > data.len() { return Err(KMeansError::KTooLarge); }

        let n_features = data[0].features.len();
        for dp in data { if dp.features.len() != n_features { return Err(KMeansError::MismatchedDimensions); }}

        let mut centroids = Array2::zeros((self.k, n_features));
        self.kmeans_plus_plus_init(data, &mut centroids)?;

        let mut assignments = vec![usize::MAX; data.len()];
        let mut members: Vec<Vec<usize>> = vec![Vec::new(); self.k];

        for iter in 0..self.max_iter {
            // Assignment step
            let mut changes = 0;
            for (i, dp) in data.iter().enumerate() {
                let best_idx = self.nearest_centroid(dp.features.view(), &centroids)?;
                if assignments[i] != best_idx { changes += 1; }
                assignments[i] = best_idx;
            }
            trace!("k-means iteration {}: {} points changed", iter + 1, changes);
            if changes == 0 {
                break;
            }

            // Update step
            members.iter_mut().for_each(Vec::clear);
            for (i, &a) in assignments.iter().enumerate() {
                members[a].push(i);
            }

            let mut new_centroids = Array2::zeros((self.k, n_features));
            for (c, points) in members.iter().enumerate() {
                if points.is_empty() {
                    // empty cluster: keep old
                    new_centroids.row_mut(c).assign(&centroids.row(c));
                    continue;
                }
                let mut sum = Array1::zeros(n_features);
                for &pi in points { sum += &data[pi].features; }
                sum /= F::from_usize(points.len()).ok_or(KMeansError::InvalidDistance)?;
                new_centroids.row_mut(c).assign(&sum);
            }

            // Check convergence by max shift
            let mut max_shift = F::zero();
            for (old, new) in centroids.rows().into_iter().zip(new_centroids.rows()) {
                let shift = self.distance.distance(old, new);
                if shift.is_nan() { return Err(KMeansError::InvalidDistance); }
                if shift > max_shift { max_shift = shift; }
            }

            centroids = new_centroids;
            if max_shift < self.tolerance {
                trace!("k-means converged after {} iterations (shift {:?})", iter + 1, max_shift);
                break;
            }
        }

        // Final assignment against the settled centroids.
        for (i, dp) in data.iter().enumerate() {
            assignments[i] = self.nearest_centroid(dp.features.view(), &centroids)?;
        }

        debug!("k-means fitted {} points into {} clusters", data.len(), self.k);
        Ok((assignments, centroids))
    }

    fn nearest_centroid(&self, point: ArrayView1<F>, centroids: &Array2<F>) -> Result<usize, KMeansError> {
        let mut best = F::infinity();
        let mut idx = 0;
        for (i, c) in centroids.rows().into_iter().enumerate() {
            let d = self.distance.rdistance(point, c);
            if d.is_nan() { return Err(KMeansError::InvalidDistance); }
            if d < best { best = d; idx = i; }
        }
        Ok(idx)
    }

    /// K-Means++ initialization: the first centroid is drawn uniformly, every
    /// further one with probability proportional to its squared distance from
    /// the nearest centroid chosen so far.
    fn kmeans_plus_plus_init<L: Debug + Eq + Hash + Clone>(
        &self,
        data: &[DataPoint<L, F>],
        centroids: &mut Array2<F>,
    ) -> Result<(), KMeansError> {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(self.seed);

        let first_idx = rng.random_range(0..data.len());
        centroids.row_mut(0).assign(&data[first_idx].features);

        for k in 1..self.k {
            let mut distances: Vec<F> = Vec::with_capacity(data.len());
            let mut total_weight = F::zero();

            for dp in data {
                let mut min_dist_sq = F::infinity();
                for j in 0..k {
                    let dist = self.distance.distance(dp.features.view(), centroids.row(j));
                    if dist.is_nan() { return Err(KMeansError::InvalidDistance); }
                    let dist_sq = dist * dist;
                    if dist_sq < min_dist_sq {
                        min_dist_sq = dist_sq;
                    }
                }
                distances.push(min_dist_sq);
                total_weight += min_dist_sq;
            }

            if total_weight > F::zero() {
                let draw = F::from_f64(rng.random::<f64>()).ok_or(KMeansError::InvalidDistance)?;
                let target = draw * total_weight;
                let mut cumulative = F::zero();
                // Rounding can leave `target` just above the final sum.
                let mut chosen = data.len() - 1;
                for (i, &dist_sq) in distances.iter().enumerate() {
                    cumulative += dist_sq;
                    if dist_sq > F::zero() && cumulative >= target {
                        chosen = i;
                        break;
                    }
                }
                centroids.row_mut(k).assign(&data[chosen].features);
            } else {
                // Fallback: all points coincide with a centroid
                let idx = rng.random_range(0..data.len());
                centroids.row_mut(k).assign(&data[idx].features);
            }
        }
        Ok(())
    }
}
