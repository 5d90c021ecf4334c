mod activation;
mod relu;
mod sigmoid;
mod tanh;

pub use activation::Activation;
pub use relu::Relu;
pub use sigmoid::Sigmoid;
pub use tanh::Tanh;

use ndarray::Array2;

use crate::{MlErr, Result};

/// Returns the output cached by the last forward call, checking it matches the shape of the
/// incoming gradient.
fn cached(a: &Option<Array2<f64>>, dim: (usize, usize)) -> Result<&Array2<f64>> {
    let a = a.as_ref().ok_or(MlErr::UninitializedState {
        what: "activation backward called before forward",
    })?;

    MlErr::check_dim("activation gradient rows", dim.0, a.nrows())?;
    MlErr::check_dim("activation gradient columns", dim.1, a.ncols())?;
    Ok(a)
}
