use ndarray::{Array2, ArrayView2};

use super::{Relu, Sigmoid, Tanh};
use crate::Result;

/// An elementwise nonlinearity applied after a layer.
///
/// Each variant caches its activated output `A` on `forward` and evaluates its local
/// derivative at that `A` on `backward`.
#[derive(Clone, Debug)]
pub enum Activation {
    Relu(Relu),
    Sigmoid(Sigmoid),
    Tanh(Tanh),
}
use Activation::*;

impl Activation {
    pub fn relu() -> Self {
        Relu(Relu::new())
    }

    pub fn sigmoid() -> Self {
        Sigmoid(Sigmoid::new())
    }

    pub fn tanh() -> Self {
        Tanh(Tanh::new())
    }

    /// Applies the nonlinearity to the pre-activation `z`, caching and returning `A`.
    pub fn forward(&mut self, z: ArrayView2<f64>) -> Array2<f64> {
        match self {
            Relu(a) => a.forward(z),
            Sigmoid(a) => a.forward(z),
            Tanh(a) => a.forward(z),
        }
    }

    /// Turns `dL/dA` into `dL/dZ` using the output cached by the last `forward`.
    ///
    /// # Errors
    /// `UninitializedState` if `forward` was never called, `ShapeMismatch` if `d` doesn't have
    /// the shape of the cached output.
    pub fn backward(&self, d: Array2<f64>) -> Result<Array2<f64>> {
        match self {
            Relu(a) => a.backward(d),
            Sigmoid(a) => a.backward(d),
            Tanh(a) => a.backward(d),
        }
    }

    /// The output of the last forward call, if any.
    pub fn output(&self) -> Option<ArrayView2<'_, f64>> {
        match self {
            Relu(a) => a.output(),
            Sigmoid(a) => a.output(),
            Tanh(a) => a.output(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Relu(_) => "relu",
            Sigmoid(_) => "sigmoid",
            Tanh(_) => "tanh",
        }
    }
}
