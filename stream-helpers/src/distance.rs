use ndarray::{ArrayView1, Zip};

use crate::Float;
use num_traits::Float as NumFloat;

/// A distance function between two feature vectors.
///
/// `rdistance` is a cheaper quantity with the same ordering as `distance`
/// (for Euclidean distance it is the squared distance). Neighbour searches
/// compare reduced distances and only convert when the real value matters.
pub trait Distance<F: Float>: Clone {
    fn distance(&self, a: ArrayView1<F>, b: ArrayView1<F>) -> F;

    fn rdistance(&self, a: ArrayView1<F>, b: ArrayView1<F>) -> F {
        self.distance(a, b)
    }

    fn rdist_to_dist(&self, rdist: F) -> F {
        rdist
    }

    fn dist_to_rdist(&self, dist: F) -> F {
        dist
    }
}

/// Manhattan distance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct L1Dist;

impl<F: Float> Distance<F> for L1Dist {
    fn distance(&self, a: ArrayView1<F>, b: ArrayView1<F>) -> F {
        Zip::from(&a)
            .and(&b)
            .fold(F::zero(), |acc, &x, &y| acc + NumFloat::abs(x - y))
    }
}

/// Euclidean distance. The reduced distance is the squared distance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct L2Dist;

impl<F: Float> Distance<F> for L2Dist {
    fn distance(&self, a: ArrayView1<F>, b: ArrayView1<F>) -> F {
        self.rdistance(a, b).sqrt()
    }

    fn rdistance(&self, a: ArrayView1<F>, b: ArrayView1<F>) -> F {
        Zip::from(&a).and(&b).fold(F::zero(), |acc, &x, &y| {
            let d = x - y;
            acc + d * d
        })
    }

    fn rdist_to_dist(&self, rdist: F) -> F {
        rdist.sqrt()
    }

    fn dist_to_rdist(&self, dist: F) -> F {
        dist * dist
    }
}

/// Chebyshev distance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LInfDist;

impl<F: Float> Distance<F> for LInfDist {
    fn distance(&self, a: ArrayView1<F>, b: ArrayView1<F>) -> F {
        Zip::from(&a)
            .and(&b)
            .fold(F::zero(), |acc, &x, &y| acc.max(NumFloat::abs(x - y)))
    }
}

/// Minkowski distance of order `p`. The reduced distance skips the final root.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LpDist<F: Float>(pub F);

impl<F: Float> LpDist<F> {
    pub fn new(p: F) -> Self {
        LpDist(p)
    }
}

impl<F: Float> Distance<F> for LpDist<F> {
    fn distance(&self, a: ArrayView1<F>, b: ArrayView1<F>) -> F {
        self.rdist_to_dist(self.rdistance(a, b))
    }

    fn rdistance(&self, a: ArrayView1<F>, b: ArrayView1<F>) -> F {
        Zip::from(&a)
            .and(&b)
            .fold(F::zero(), |acc, &x, &y| acc + NumFloat::abs(x - y).powf(self.0))
    }

    fn rdist_to_dist(&self, rdist: F) -> F {
        rdist.powf(F::one() / self.0)
    }

    fn dist_to_rdist(&self, dist: F) -> F {
        dist.powf(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_l2_reduced_distance_is_squared() {
        let a = array![0.0, 0.0];
        let b = array![3.0, 4.0];
        assert_abs_diff_eq!(L2Dist.distance(a.view(), b.view()), 5.0);
        assert_abs_diff_eq!(L2Dist.rdistance(a.view(), b.view()), 25.0);
        assert_abs_diff_eq!(Distance::<f64>::rdist_to_dist(&L2Dist, 25.0), 5.0);
    }

    #[test]
    fn test_l1_and_linf() {
        let a = array![1.0, -2.0, 0.5];
        let b = array![-1.0, 2.0, 0.0];
        assert_abs_diff_eq!(L1Dist.distance(a.view(), b.view()), 6.5);
        assert_abs_diff_eq!(LInfDist.distance(a.view(), b.view()), 4.0);
    }

    #[test]
    fn test_lp_matches_l2_for_p_two() {
        let a = array![1.0, 2.0, 3.0];
        let b = array![4.0, 6.0, 3.0];
        let lp = LpDist::new(2.0);
        assert_abs_diff_eq!(lp.distance(a.view(), b.view()), 5.0, epsilon = 1e-12);
        assert_abs_diff_eq!(lp.rdistance(a.view(), b.view()), 25.0, epsilon = 1e-12);
    }
}
