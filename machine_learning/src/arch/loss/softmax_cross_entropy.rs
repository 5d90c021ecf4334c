use ndarray::{Array2, ArrayView2, Zip};

use super::validate;
use crate::{MlErr, Result};

/// Floor applied to probabilities before taking their logarithm.
pub const EPSILON: f64 = 1e-12;

/// Row-wise softmax followed by the cross-entropy against one-hot (or soft) targets, averaged
/// over the samples.
#[derive(Debug, Default, Clone, Copy)]
pub struct SoftmaxCrossEntropy;

impl SoftmaxCrossEntropy {
    /// Returns a new `SoftmaxCrossEntropy`.
    pub fn new() -> Self {
        Self
    }

    /// Numerically stable softmax of each row of `a`.
    pub fn softmax(a: ArrayView2<f64>) -> Result<Array2<f64>> {
        if !a.iter().all(|x| x.is_finite()) {
            return Err(MlErr::NumericDomain {
                what: "softmax of non-finite logits",
            });
        }

        let mut s = a.to_owned();
        for mut row in s.rows_mut() {
            let max = row.fold(f64::NEG_INFINITY, |m, &x| m.max(x));
            row.mapv_inplace(|x| (x - max).exp());

            let sum = row.sum();
            row /= sum;
        }

        Ok(s)
    }

    pub fn loss(&self, y_pred: ArrayView2<f64>, y: ArrayView2<f64>) -> Result<f64> {
        let (n, _) = validate(y_pred, y)?;
        let p = Self::softmax(y_pred)?;

        let mut total = 0.;
        Zip::from(&y).and(&p).for_each(|&y, &p| {
            total += y * p.max(EPSILON).ln();
        });

        Ok(-total / n as f64)
    }

    pub fn loss_prime(&self, y_pred: ArrayView2<f64>, y: ArrayView2<f64>) -> Result<Array2<f64>> {
        let (n, _) = validate(y_pred, y)?;
        let p = Self::softmax(y_pred)?;

        Ok((p - &y) / n as f64)
    }
}
