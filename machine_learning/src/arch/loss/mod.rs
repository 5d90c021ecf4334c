mod loss;
mod loss_fn;
mod mse;
mod softmax_cross_entropy;

pub use loss::{CachePolicy, Loss};
pub use loss_fn::LossFn;
pub use mse::Mse;
pub use softmax_cross_entropy::SoftmaxCrossEntropy;

use ndarray::ArrayView2;

use crate::{MlErr, Result};

/// Checks that the prediction and target agree in shape and are not empty.
///
/// # Returns
/// The `(n, c)` sample and class counts.
fn validate(a: ArrayView2<f64>, y: ArrayView2<f64>) -> Result<(usize, usize)> {
    MlErr::check_dim("target rows", y.nrows(), a.nrows())?;
    MlErr::check_dim("target columns", y.ncols(), a.ncols())?;

    let (n, c) = a.dim();
    if n == 0 {
        return Err(MlErr::NumericDomain {
            what: "the loss needs at least one sample",
        });
    }
    if c == 0 {
        return Err(MlErr::NumericDomain {
            what: "the loss needs at least one class",
        });
    }

    Ok((n, c))
}
