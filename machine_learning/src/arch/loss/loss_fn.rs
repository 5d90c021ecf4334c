use ndarray::{Array2, ArrayView2};

use super::{Mse, SoftmaxCrossEntropy};
use crate::Result;

/// The objective a model is trained against.
#[derive(Debug, Clone, Copy)]
pub enum LossFn {
    Mse(Mse),
    SoftmaxCrossEntropy(SoftmaxCrossEntropy),
}

impl LossFn {
    pub fn mse() -> Self {
        Self::Mse(Mse::new())
    }

    pub fn softmax_cross_entropy() -> Self {
        Self::SoftmaxCrossEntropy(SoftmaxCrossEntropy::new())
    }

    /// Computes the scalar loss of `y_pred` against `y`.
    ///
    /// # Errors
    /// `ShapeMismatch` if the shapes differ, `NumericDomain` on an empty batch.
    pub fn loss(&self, y_pred: ArrayView2<f64>, y: ArrayView2<f64>) -> Result<f64> {
        match self {
            Self::Mse(l) => l.loss(y_pred, y),
            Self::SoftmaxCrossEntropy(l) => l.loss(y_pred, y),
        }
    }

    /// Computes `dL/dy_pred`.
    pub fn loss_prime(&self, y_pred: ArrayView2<f64>, y: ArrayView2<f64>) -> Result<Array2<f64>> {
        match self {
            Self::Mse(l) => l.loss_prime(y_pred, y),
            Self::SoftmaxCrossEntropy(l) => l.loss_prime(y_pred, y),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Mse(_) => "mse",
            Self::SoftmaxCrossEntropy(_) => "softmax_cross_entropy",
        }
    }
}
