use ndarray::{Array2, ArrayView2};

use super::validate;
use crate::Result;

/// Mean squared error loss function, averaged over every sample and class.
#[derive(Debug, Default, Clone, Copy)]
pub struct Mse;

impl Mse {
    /// Returns a new `Mse`.
    pub fn new() -> Self {
        Self
    }

    pub fn loss(&self, y_pred: ArrayView2<f64>, y: ArrayView2<f64>) -> Result<f64> {
        let (n, c) = validate(y_pred, y)?;
        let sq = (&y_pred - &y).mapv(|x| x.powi(2)).sum();

        Ok(sq / (n * c) as f64)
    }

    pub fn loss_prime(&self, y_pred: ArrayView2<f64>, y: ArrayView2<f64>) -> Result<Array2<f64>> {
        let (n, c) = validate(y_pred, y)?;

        Ok((&y_pred - &y) * (2.0 / (n * c) as f64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MlErr;
    use ndarray::array;

    #[test]
    fn empty_batch_is_out_of_domain() {
        let empty = Array2::<f64>::zeros((0, 2));
        let err = Mse.loss(empty.view(), empty.view()).unwrap_err();

        assert!(matches!(err, MlErr::NumericDomain { .. }));
    }

    #[test]
    fn perfect_prediction() {
        let y = array![[1., 2.], [3., 4.]];

        assert_eq!(Mse.loss(y.view(), y.view()).unwrap(), 0.);
        assert_eq!(
            Mse.loss_prime(y.view(), y.view()).unwrap(),
            Array2::<f64>::zeros((2, 2))
        );
    }
}
