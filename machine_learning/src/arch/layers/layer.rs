use ndarray::{Array2, ArrayView2};

use super::{Linear, ParamsMut};
use crate::{Result, initialization::ParamGen};

/// A parametric stage of a model.
#[derive(Clone, Debug)]
pub enum Layer {
    Linear(Linear),
}
use Layer::*;

impl Layer {
    pub fn linear<G: ParamGen + ?Sized>(
        input_size: usize,
        output_size: usize,
        param_gen: &mut G,
    ) -> Self {
        Linear(Linear::new(input_size, output_size, param_gen))
    }

    pub fn input_size(&self) -> usize {
        match self {
            Linear(l) => l.input_size(),
        }
    }

    pub fn output_size(&self) -> usize {
        match self {
            Linear(l) => l.output_size(),
        }
    }

    /// Returns the amount of parameters of this layer.
    pub fn size(&self) -> usize {
        match self {
            Linear(l) => l.size(),
        }
    }

    pub fn forward(&mut self, x: ArrayView2<f64>) -> Result<Array2<f64>> {
        match self {
            Linear(l) => l.forward(x),
        }
    }

    pub fn backward(&mut self, d: ArrayView2<f64>) -> Result<Array2<f64>> {
        match self {
            Linear(l) => l.backward(d),
        }
    }

    /// The `(dL/dW, dL/db)` pair produced by the last backward call.
    pub fn grads(&self) -> Option<(ArrayView2<'_, f64>, ArrayView2<'_, f64>)> {
        match self {
            Linear(l) => l.weights_grad().zip(l.bias_grad()),
        }
    }

    pub fn params_mut(&mut self) -> ParamsMut<'_> {
        match self {
            Linear(l) => l.params_mut(),
        }
    }

    pub fn as_linear(&self) -> Option<&Linear> {
        match self {
            Linear(l) => Some(l),
        }
    }
}

impl From<Linear> for Layer {
    fn from(value: Linear) -> Self {
        Linear(value)
    }
}
