use ndarray::ArrayView1;
use sam_knn::{Label, SamKnn, SamKnnError};
use stream_helpers::{Distance, Float};

/// An incremental classifier driven one sample at a time.
///
/// `predict` must not change the model; only `partial_fit` learns.
pub trait StreamClassifier<L, F = f64> {
    type Error: std::error::Error + Send + Sync + 'static;

    fn predict(&self, x: ArrayView1<F>) -> Result<L, Self::Error>;

    fn partial_fit(&mut self, x: ArrayView1<F>, y: L) -> Result<(), Self::Error>;
}

impl<L, F, D> StreamClassifier<L, F> for SamKnn<L, F, D>
where
    L: Label,
    F: Float,
    D: Distance<F>,
{
    type Error = SamKnnError;

    fn predict(&self, x: ArrayView1<F>) -> Result<L, Self::Error> {
        SamKnn::predict(self, x)
    }

    fn partial_fit(&mut self, x: ArrayView1<F>, y: L) -> Result<(), Self::Error> {
        SamKnn::partial_fit(self, x, y)
    }
}
