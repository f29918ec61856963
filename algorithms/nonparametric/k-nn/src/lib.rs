use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::hash::Hash;
use std::str::FromStr;

use ndarray::ArrayView1;
use stream_helpers::{DataPoint, Distance, Float};

#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

/// Smallest distance used when weighting votes by inverse distance.
pub const MIN_WEIGHT_DISTANCE: f64 = 1e-6;

/// Errors that can occur when using the k-NN voter.
#[derive(Debug, Clone, PartialEq)]
pub enum KnnError {
    /// k cannot be zero for a k-NN classifier
    InvalidK,
    /// Cannot predict from an empty memory
    EmptyMemory,
    /// Invalid distance comparison (likely due to NaN values in data)
    InvalidDistance,
    /// Weighting scheme name not recognised
    UnknownWeighting(String),
}

impl Display for KnnError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            KnnError::InvalidK => write!(f, "k cannot be zero for a k-NN classifier"),
            KnnError::EmptyMemory => write!(f, "Cannot predict from an empty memory"),
            KnnError::InvalidDistance => write!(
                f,
                "Invalid distance comparison (likely due to NaN values in data)"
            ),
            KnnError::UnknownWeighting(name) => {
                write!(f, "Unknown weighting '{}', expected 'uniform' or 'distance'", name)
            }
        }
    }
}

impl Error for KnnError {}

/// How the labels of the k nearest neighbours are combined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate", rename_all = "snake_case")
)]
pub enum Weighting {
    /// Every neighbour casts one vote.
    Uniform,
    /// Every neighbour votes with the inverse of its distance.
    #[default]
    Distance,
}

impl FromStr for Weighting {
    type Err = KnnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "uniform" => Ok(Weighting::Uniform),
            "distance" => Ok(Weighting::Distance),
            other => Err(KnnError::UnknownWeighting(other.to_string())),
        }
    }
}

impl Display for Weighting {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Weighting::Uniform => write!(f, "uniform"),
            Weighting::Distance => write!(f, "distance"),
        }
    }
}

/// Returns the indices of the `k` smallest values in `rdistances`, closest first.
///
/// Equal distances keep their index order, so the result is deterministic.
/// When `k` exceeds the number of distances every index is returned.
///
/// # Errors
///
/// Returns `KnnError::InvalidK` if `k` is 0 and `KnnError::InvalidDistance`
/// if any distance is NaN.
pub fn k_nearest<F: Float>(k: usize, rdistances: &[F]) -> Result<Vec<usize>, KnnError> {
    if k == 0 {
        return Err(KnnError::InvalidK);
    }
    if rdistances.iter().any(|d| d.is_nan()) {
        return Err(KnnError::InvalidDistance);
    }

    let by_distance = |a: &usize, b: &usize| {
        rdistances[*a]
            .partial_cmp(&rdistances[*b])
            .unwrap_or(Ordering::Equal)
            .then(a.cmp(b))
    };

    let mut indices: Vec<usize> = (0..rdistances.len()).collect();
    let k = k.min(indices.len());
    if k < indices.len() {
        indices.select_nth_unstable_by(k - 1, by_distance);
        indices.truncate(k);
    }
    indices.sort_unstable_by(by_distance);
    Ok(indices)
}

/// Most frequent label; ties go to the smallest label.
pub fn majority<'a, L>(labels: impl IntoIterator<Item = &'a L>) -> Option<L>
where
    L: Clone + Ord + 'a,
{
    let mut counts: BTreeMap<&L, usize> = BTreeMap::new();
    for label in labels {
        *counts.entry(label).or_insert(0) += 1;
    }

    let mut best: Option<(&L, usize)> = None;
    for (label, count) in counts {
        if best.is_none_or(|(_, c)| count > c) {
            best = Some((label, count));
        }
    }
    best.map(|(label, _)| label.clone())
}

/// A k-nearest-neighbour voter.
///
/// Unlike a batch classifier it owns no training data: callers hand it the
/// memory (or precomputed reduced distances) to vote over. This lets one voter
/// serve several memories that change after every sample.
#[derive(Debug, Clone)]
pub struct Knn<D> {
    k: usize,
    weighting: Weighting,
    distance: D,
}

impl<D> Knn<D> {
    /// Creates a new k-NN voter.
    ///
    /// # Errors
    ///
    /// Returns `KnnError::InvalidK` if `k` is 0.
    pub fn new(k: usize, weighting: Weighting, distance: D) -> Result<Self, KnnError> {
        if k == 0 {
            return Err(KnnError::InvalidK);
        }
        Ok(Self {
            k,
            weighting,
            distance,
        })
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn distance(&self) -> &D {
        &self.distance
    }

    /// Reduced distances from `query` to every point of `memory`, in memory order.
    pub fn rdistances<L, F>(&self, query: ArrayView1<F>, memory: &[DataPoint<L, F>]) -> Vec<F>
    where
        L: Clone + Eq + Hash + Debug,
        F: Float,
        D: Distance<F>,
    {
        memory
            .iter()
            .map(|dp| self.distance.rdistance(dp.features.view(), query))
            .collect()
    }

    /// Predicts the label of `query` from the points in `memory`.
    ///
    /// # Errors
    ///
    /// Returns `KnnError::EmptyMemory` if `memory` is empty and
    /// `KnnError::InvalidDistance` if a distance is NaN.
    pub fn predict<L, F>(&self, query: ArrayView1<F>, memory: &[DataPoint<L, F>]) -> Result<L, KnnError>
    where
        L: Clone + Eq + Hash + Debug + Ord,
        F: Float,
        D: Distance<F>,
    {
        let rdistances = self.rdistances(query, memory);
        self.vote(&rdistances, |i| &memory[i].label)
    }

    /// Votes among the `k` entries with the smallest reduced distance.
    ///
    /// `label_at(i)` must return the label belonging to `rdistances[i]`.
    pub fn vote<'a, L, F>(&self, rdistances: &[F], label_at: impl Fn(usize) -> &'a L) -> Result<L, KnnError>
    where
        L: Clone + Ord + 'a,
        F: Float,
        D: Distance<F>,
    {
        if rdistances.is_empty() {
            return Err(KnnError::EmptyMemory);
        }
        let neighbors = k_nearest(self.k, rdistances)?;

        let winner = match self.weighting {
            Weighting::Uniform => majority(neighbors.iter().map(|&i| label_at(i))),
            Weighting::Distance => {
                let floor = F::from_f64(MIN_WEIGHT_DISTANCE).unwrap_or_else(F::epsilon);
                let mut weights: BTreeMap<&L, F> = BTreeMap::new();
                for &i in &neighbors {
                    let mut dist = self.distance.rdist_to_dist(rdistances[i]);
                    if dist <= F::zero() {
                        dist = floor;
                    }
                    *weights.entry(label_at(i)).or_insert_with(F::zero) += F::one() / dist;
                }
                let mut best: Option<(&L, F)> = None;
                for (label, weight) in weights {
                    if best.is_none_or(|(_, w)| weight > w) {
                        best = Some((label, weight));
                    }
                }
                best.map(|(label, _)| label.clone())
            }
        };
        winner.ok_or(KnnError::EmptyMemory)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use stream_helpers::L2Dist;

    #[test]
    fn test_knn_classification_simple() {
        let memory = vec![
            DataPoint::new(array![1.0, 1.0], "A"),
            DataPoint::new(array![2.0, 2.0], "A"),
            DataPoint::new(array![1.0, 2.0], "A"),
            DataPoint::new(array![8.0, 8.0], "B"),
            DataPoint::new(array![9.0, 8.0], "B"),
            DataPoint::new(array![8.0, 9.0], "B"),
        ];

        for weighting in [Weighting::Uniform, Weighting::Distance] {
            let knn = Knn::new(3, weighting, L2Dist).unwrap();
            assert_eq!(knn.predict(array![2.5, 2.5].view(), &memory).unwrap(), "A");
            assert_eq!(knn.predict(array![7.5, 8.5].view(), &memory).unwrap(), "B");
        }
    }

    #[test]
    fn test_knn_k_larger_than_memory() {
        let memory = vec![
            DataPoint::new(array![1.0], "A"),
            DataPoint::new(array![2.0], "A"),
            DataPoint::new(array![10.0], "B"),
        ];

        // The two 'A's outvote the one 'B' even though k exceeds the memory.
        let knn = Knn::new(5, Weighting::Uniform, L2Dist).unwrap();
        assert_eq!(knn.predict(array![3.0].view(), &memory).unwrap(), "A");
    }

    #[test]
    fn test_distance_weighting_overrides_majority() {
        let memory = vec![
            DataPoint::new(array![0.1], 1u8),
            DataPoint::new(array![5.0], 0u8),
            DataPoint::new(array![5.5], 0u8),
        ];
        let query = array![0.0];

        let uniform = Knn::new(3, Weighting::Uniform, L2Dist).unwrap();
        assert_eq!(uniform.predict(query.view(), &memory).unwrap(), 0);

        let weighted = Knn::new(3, Weighting::Distance, L2Dist).unwrap();
        assert_eq!(weighted.predict(query.view(), &memory).unwrap(), 1);
    }

    #[test]
    fn test_zero_distance_does_not_divide_by_zero() {
        let memory = vec![
            DataPoint::new(array![1.0, 1.0], 2u8),
            DataPoint::new(array![1.0, 1.0], 2u8),
            DataPoint::new(array![1.5, 1.0], 3u8),
        ];
        let knn = Knn::new(3, Weighting::Distance, L2Dist).unwrap();
        assert_eq!(knn.predict(array![1.0, 1.0].view(), &memory).unwrap(), 2);
    }

    #[test]
    fn test_ties_resolve_to_smallest_label() {
        assert_eq!(majority(&[3u8, 1, 3, 1]), Some(1));
        assert_eq!(majority(&[2u8]), Some(2));
        assert_eq!(majority::<u8>(&[]), None);
    }

    #[test]
    fn test_k_nearest_orders_by_distance() {
        let rd = [4.0, 1.0, 9.0, 1.0, 0.5];
        assert_eq!(k_nearest(3, &rd).unwrap(), vec![4, 1, 3]);
        assert_eq!(k_nearest(10, &rd).unwrap(), vec![4, 1, 3, 0, 2]);
        assert_eq!(k_nearest(0, &rd), Err(KnnError::InvalidK));
        assert_eq!(k_nearest(2, &[1.0, f64::NAN]), Err(KnnError::InvalidDistance));
    }

    #[test]
    fn test_error_on_k_zero() {
        let result = Knn::new(0, Weighting::Uniform, L2Dist);
        assert!(matches!(result, Err(KnnError::InvalidK)));
    }

    #[test]
    fn test_error_on_empty_memory() {
        let memory: Vec<DataPoint<&str, f64>> = vec![];
        let knn = Knn::new(3, Weighting::Distance, L2Dist).unwrap();
        let result = knn.predict(array![1.0, 1.0].view(), &memory);
        assert!(matches!(result, Err(KnnError::EmptyMemory)));
    }

    #[test]
    fn test_weighting_from_str() {
        assert_eq!("uniform".parse::<Weighting>().unwrap(), Weighting::Uniform);
        assert_eq!("Distance".parse::<Weighting>().unwrap(), Weighting::Distance);
        assert!(matches!(
            "gaussian".parse::<Weighting>(),
            Err(KnnError::UnknownWeighting(_))
        ));
    }
}
