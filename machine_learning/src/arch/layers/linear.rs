use ndarray::{Array2, ArrayView2, ArrayViewMut2, Axis, linalg};

use crate::{MlErr, Result, initialization::ParamGen};

/// Gradients produced by the last backward call.
#[derive(Clone, Debug)]
struct Grads {
    dw: Array2<f64>,
    db: Array2<f64>,
}

/// Mutable parameters of a layer together with the gradients of its last backward call.
///
/// Only the values of `W` and `b` can be changed through it, never their shapes.
#[derive(Debug)]
pub struct ParamsMut<'a> {
    pub weights: ArrayViewMut2<'a, f64>,
    pub bias: ArrayViewMut2<'a, f64>,
    pub weights_grad: Option<ArrayView2<'a, f64>>,
    pub bias_grad: Option<ArrayView2<'a, f64>>,
}

/// An affine transform `Z = A·Wᵗ + 𝟙·bᵗ`.
///
/// `W` is `(out, in)` and `b` is `(out, 1)`. The layer never updates its own parameters; the
/// gradients of the last backward call are exposed for an external optimizer instead.
#[derive(Clone, Debug)]
pub struct Linear {
    w: Array2<f64>,
    b: Array2<f64>,

    // Forward metadata
    x: Option<Array2<f64>>,

    // Backward metadata
    grads: Option<Grads>,
}

impl Linear {
    /// Creates a new `Linear` layer drawing its initial parameters from `param_gen`.
    ///
    /// # Arguments
    /// * `input_size` - The amount of features each input sample has.
    /// * `output_size` - The amount of features each output sample has.
    /// * `param_gen` - The generator of the initial weights and biases, sampled in that order.
    ///
    /// # Returns
    /// A new `Linear` instance.
    pub fn new<G: ParamGen + ?Sized>(
        input_size: usize,
        output_size: usize,
        param_gen: &mut G,
    ) -> Self {
        let w = param_gen.sample(output_size, input_size);
        let b = param_gen.sample(output_size, 1);

        Self {
            w,
            b,
            x: None,
            grads: None,
        }
    }

    /// Creates a new `Linear` layer from explicit parameters.
    ///
    /// # Arguments
    /// * `w` - The `(out, in)` weight matrix.
    /// * `b` - The `(out, 1)` bias column.
    ///
    /// # Returns
    /// A `ShapeMismatch` error if `b` isn't a column with as many rows as `w`.
    pub fn from_params(w: Array2<f64>, b: Array2<f64>) -> Result<Self> {
        MlErr::check_dim("bias rows", b.nrows(), w.nrows())?;
        MlErr::check_dim("bias columns", b.ncols(), 1)?;

        Ok(Self {
            w,
            b,
            x: None,
            grads: None,
        })
    }

    pub fn input_size(&self) -> usize {
        self.w.ncols()
    }

    pub fn output_size(&self) -> usize {
        self.w.nrows()
    }

    /// Returns the amount of parameters this layer has.
    pub fn size(&self) -> usize {
        self.w.len() + self.b.len()
    }

    pub fn weights(&self) -> ArrayView2<'_, f64> {
        self.w.view()
    }

    pub fn bias(&self) -> ArrayView2<'_, f64> {
        self.b.view()
    }

    /// Borrows `W` and `b` mutably alongside their last gradients.
    pub fn params_mut(&mut self) -> ParamsMut<'_> {
        let (weights_grad, bias_grad) = match &self.grads {
            Some(g) => (Some(g.dw.view()), Some(g.db.view())),
            None => (None, None),
        };

        ParamsMut {
            weights: self.w.view_mut(),
            bias: self.b.view_mut(),
            weights_grad,
            bias_grad,
        }
    }

    /// `dL/dW` of the last backward call.
    pub fn weights_grad(&self) -> Option<ArrayView2<'_, f64>> {
        self.grads.as_ref().map(|g| g.dw.view())
    }

    /// `dL/db` of the last backward call.
    pub fn bias_grad(&self) -> Option<ArrayView2<'_, f64>> {
        self.grads.as_ref().map(|g| g.db.view())
    }

    /// Batch size seen by the last forward call.
    pub fn batch_size(&self) -> Option<usize> {
        self.x.as_ref().map(|x| x.nrows())
    }

    /// Makes a forward pass through the layer, caching `x` for the backward pass.
    ///
    /// # Arguments
    /// * `x` - An `(n, in)` batch.
    ///
    /// # Returns
    /// The `(n, out)` output, or a `ShapeMismatch` if `x` doesn't have `in` columns (in which
    /// case the cache is left untouched).
    pub fn forward(&mut self, x: ArrayView2<f64>) -> Result<Array2<f64>> {
        MlErr::check_dim("layer input columns", x.ncols(), self.input_size())?;

        let mut z = x.dot(&self.w.t());
        z += &self.b.t();

        self.x = Some(x.to_owned());
        Ok(z)
    }

    /// Makes a backward pass through the layer, storing `dL/dW` and `dL/db`.
    ///
    /// # Arguments
    /// * `d` - The `(n, out)` gradient of the loss with respect to this layer's output.
    ///
    /// # Returns
    /// The `(n, in)` gradient with respect to this layer's input.
    pub fn backward(&mut self, d: ArrayView2<f64>) -> Result<Array2<f64>> {
        let x = self.x.as_ref().ok_or(MlErr::UninitializedState {
            what: "layer backward called before forward",
        })?;
        MlErr::check_dim("layer gradient rows", d.nrows(), x.nrows())?;
        MlErr::check_dim("layer gradient columns", d.ncols(), self.output_size())?;

        let mut dw = Array2::zeros(self.w.raw_dim());
        linalg::general_mat_mul(1.0, &d.t(), x, 0.0, &mut dw);
        let db = d.sum_axis(Axis(0)).insert_axis(Axis(1));

        self.grads = Some(Grads { dw, db });
        Ok(d.dot(&self.w))
    }
}
