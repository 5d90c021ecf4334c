//! Finite difference utilities for gradient verification.

use ndarray::{Array2, ArrayView2};

use crate::{MlErr, Result};

/// Computes the gradient of a scalar function of a matrix using central finite differences.
///
/// # Arguments
/// * `f` - The function to differentiate.
/// * `x` - The point at which to compute the gradient.
/// * `eps` - The step size (typically 1e-7 to 1e-5).
///
/// # Returns
/// A matrix shaped like `x` holding `(f(x + eps) - f(x - eps)) / 2eps` for each entry.
pub fn finite_diff<F>(mut f: F, x: ArrayView2<f64>, eps: f64) -> Array2<f64>
where
    F: FnMut(ArrayView2<f64>) -> f64,
{
    let mut perturbed = x.to_owned();
    let mut grad = Array2::zeros(x.raw_dim());

    for (idx, &value) in x.indexed_iter() {
        perturbed[idx] = value + eps;
        let f_plus = f(perturbed.view());

        perturbed[idx] = value - eps;
        let f_minus = f(perturbed.view());

        perturbed[idx] = value;
        grad[idx] = (f_plus - f_minus) / (2. * eps);
    }

    grad
}

/// Computes the maximum absolute difference between two gradients.
///
/// # Returns
/// The largest entrywise difference, or a `ShapeMismatch` if the shapes differ.
pub fn max_abs_error(a: ArrayView2<f64>, b: ArrayView2<f64>) -> Result<f64> {
    MlErr::check_dim("gradient rows", b.nrows(), a.nrows())?;
    MlErr::check_dim("gradient columns", b.ncols(), a.ncols())?;

    let err = a
        .iter()
        .zip(b)
        .map(|(a, b)| (a - b).abs())
        .fold(0., f64::max);

    Ok(err)
}
