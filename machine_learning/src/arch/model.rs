use log::{debug, trace};
use ndarray::{Array2, ArrayView2};

use super::{
    activations::Activation,
    layers::{Layer, ParamsMut},
    loss::Loss,
};
use crate::{MlErr, Result};

/// The result of a forward pass, required to evaluate the loss and to run the backward pass
/// over the same batch.
///
/// A `Pass` is consumed by `Model::backward` and can't be cloned, so a backward pass always
/// differentiates the state left by exactly one forward pass.
#[derive(Debug)]
pub struct Pass {
    generation: u64,
    prediction: Array2<f64>,
}

impl Pass {
    pub fn prediction(&self) -> ArrayView2<'_, f64> {
        self.prediction.view()
    }

    /// The number of the forward pass that produced this token.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Gives up the ability to run the backward pass in exchange for the prediction.
    pub fn into_prediction(self) -> Array2<f64> {
        self.prediction
    }
}

/// A feed-forward model: a stack of layers, each optionally followed by the activation at the
/// same position, and a terminal loss.
///
/// Information flows forward when computing a prediction and backward when computing the
/// gradients of every layer.
#[derive(Debug, Clone)]
pub struct Model {
    layers: Vec<Layer>,
    activations: Vec<Activation>,
    loss: Loss,

    generation: u64,
    scored: Option<u64>,
}

impl Model {
    /// Creates a new `Model`.
    ///
    /// # Arguments
    /// * `layers` - The layers the model is composed of.
    /// * `activations` - The activations applied after the layer at the same position, layers
    ///   past the last activation pass their output through unchanged.
    /// * `loss` - The loss the model is trained against.
    ///
    /// # Returns
    /// A new `Model`, or an error if there are more activations than layers or two consecutive
    /// layers don't chain.
    pub fn new<L, A>(layers: L, activations: A, loss: Loss) -> Result<Self>
    where
        L: IntoIterator<Item = Layer>,
        A: IntoIterator<Item = Activation>,
    {
        let layers: Vec<_> = layers.into_iter().collect();
        let activations: Vec<_> = activations.into_iter().collect();

        if activations.len() > layers.len() {
            return Err(MlErr::TooManyActivations {
                got: activations.len(),
                max: layers.len(),
            });
        }

        for pair in layers.windows(2) {
            MlErr::check_dim(
                "layer input size",
                pair[1].input_size(),
                pair[0].output_size(),
            )?;
        }

        Ok(Self {
            layers,
            activations,
            loss,
            generation: 0,
            scored: None,
        })
    }

    /// Returns the amount of parameters in the model.
    pub fn size(&self) -> usize {
        self.layers.iter().map(Layer::size).sum()
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Mutable access to every layer's parameters, in order, for an optimizer to update them.
    ///
    /// Any outstanding `Pass` goes stale, since its caches no longer match the parameters.
    pub fn params_mut(&mut self) -> impl Iterator<Item = ParamsMut<'_>> {
        self.generation += 1;
        self.scored = None;

        self.layers.iter_mut().map(Layer::params_mut)
    }

    pub fn activations(&self) -> &[Activation] {
        &self.activations
    }

    pub fn loss(&self) -> &Loss {
        &self.loss
    }

    /// The number of forward passes made so far.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Makes a forward pass through the network.
    ///
    /// # Arguments
    /// * `x` - The `(n, in)` input batch.
    ///
    /// # Returns
    /// The pass token holding the prediction, or a `ShapeMismatch` if `x` doesn't fit the first
    /// layer, in which case no cache is touched.
    pub fn forward(&mut self, x: ArrayView2<f64>) -> Result<Pass> {
        if let Some(first) = self.layers.first() {
            MlErr::check_dim("model input columns", x.ncols(), first.input_size())?;
        }

        let mut a = x.to_owned();
        for (i, layer) in self.layers.iter_mut().enumerate() {
            a = layer.forward(a.view())?;

            if let Some(activation) = self.activations.get_mut(i) {
                a = activation.forward(a.view());
                trace!(stage = i, activation = activation.name(); "forward stage");
            } else {
                trace!(stage = i; "forward stage without activation");
            }
        }

        self.generation += 1;
        self.scored = None;
        debug!(generation = self.generation, batch = x.nrows(); "forward pass");

        Ok(Pass {
            generation: self.generation,
            prediction: a,
        })
    }

    /// Evaluates the loss of the pass' prediction against `y`, priming the loss for the
    /// backward pass.
    ///
    /// # Arguments
    /// * `pass` - The token of the latest forward pass.
    /// * `y` - The target, with the shape of the prediction.
    pub fn evaluate(&mut self, pass: &Pass, y: ArrayView2<f64>) -> Result<f64> {
        self.check_fresh(pass)?;

        let loss = self.loss.forward(pass.prediction(), y)?;
        self.scored = Some(pass.generation);
        Ok(loss)
    }

    /// Makes a backward pass through the network, leaving `dL/dW` and `dL/db` in every layer.
    ///
    /// # Arguments
    /// * `pass` - The token of the latest forward pass, whose loss was already evaluated.
    ///
    /// # Returns
    /// The gradient of the loss with respect to the model's input.
    pub fn backward(&mut self, pass: Pass) -> Result<Array2<f64>> {
        self.check_fresh(&pass)?;
        if self.scored != Some(pass.generation) {
            return Err(MlErr::UninitializedState {
                what: "the loss was not evaluated for this forward pass",
            });
        }

        let mut d = self.loss.backward()?;
        MlErr::check_dim("loss gradient rows", d.nrows(), pass.prediction.nrows())?;
        MlErr::check_dim("loss gradient columns", d.ncols(), pass.prediction.ncols())?;

        for (i, layer) in self.layers.iter_mut().enumerate().rev() {
            if let Some(activation) = self.activations.get(i) {
                d = activation.backward(d)?;
            }

            d = layer.backward(d.view())?;
            trace!(stage = i; "backward stage");
        }

        debug!(generation = pass.generation; "backward pass");
        Ok(d)
    }

    /// Runs forward, loss evaluation and backward over a single batch.
    ///
    /// # Returns
    /// The batch loss; the gradients are left in the layers.
    pub fn backprop(&mut self, x: ArrayView2<f64>, y: ArrayView2<f64>) -> Result<f64> {
        let pass = self.forward(x)?;
        let loss = self.evaluate(&pass, y)?;
        self.backward(pass)?;

        Ok(loss)
    }

    fn check_fresh(&self, pass: &Pass) -> Result<()> {
        if pass.generation != self.generation {
            return Err(MlErr::StalePass {
                got: pass.generation,
                expected: self.generation,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        arch::{layers::Linear, loss::CachePolicy},
        initialization::ConstParamGen,
    };
    use ndarray::array;

    fn linear(w: Array2<f64>, b: Array2<f64>) -> Layer {
        Linear::from_params(w, b).unwrap().into()
    }

    fn two_layer(activations: Vec<Activation>) -> Model {
        let layers = [
            linear(array![[1., -1.], [0.5, 2.]], array![[0.], [-1.]]),
            linear(array![[1., 1.]], array![[0.5]]),
        ];

        Model::new(layers, activations, Loss::mse()).unwrap()
    }

    #[test]
    fn rejects_too_many_activations() {
        let layers = [Layer::linear(2, 2, &mut ConstParamGen::new(1.))];
        let activations = [Activation::relu(), Activation::relu()];

        let err = Model::new(layers, activations, Loss::mse()).unwrap_err();

        assert!(matches!(err, MlErr::TooManyActivations { got: 2, max: 1 }));
    }

    #[test]
    fn rejects_layers_that_dont_chain() {
        let mut param_gen = ConstParamGen::new(1.);
        let layers = [
            Layer::linear(2, 3, &mut param_gen),
            Layer::linear(2, 1, &mut param_gen),
        ];

        let err = Model::new(layers, [], Loss::mse()).unwrap_err();

        assert!(matches!(
            err,
            MlErr::ShapeMismatch {
                what: "layer input size",
                got: 2,
                expected: 3
            }
        ));
    }

    #[test]
    fn forward_composes_layers_and_activations() {
        let mut model = two_layer(vec![Activation::relu()]);
        let x = array![[1., 2.], [-1., 0.]];

        let pass = model.forward(x.view()).unwrap();

        // first stage: [[-1, 3.5], [-1, -1.5]] -> relu -> [[0, 3.5], [0, 0]]
        // second stage has no activation: [[4], [0.5]]
        assert_eq!(pass.prediction(), array![[4.], [0.5]]);
        assert_eq!(pass.generation(), 1);
    }

    #[test]
    fn missing_trailing_activation_is_identity() {
        let mut with = two_layer(vec![Activation::relu()]);
        let mut without = two_layer(vec![]);
        let x = array![[1., 2.]];

        let a = with.forward(x.view()).unwrap().into_prediction();
        let b = without.forward(x.view()).unwrap().into_prediction();

        // relu only changes the first stage's negative unit
        assert_eq!(a, array![[4.]]);
        assert_eq!(b, array![[3.]]);
    }

    #[test]
    fn backward_populates_every_layer() {
        let mut model = two_layer(vec![Activation::sigmoid(), Activation::tanh()]);
        let x = array![[1., 2.], [-1., 0.], [0.5, 0.5]];
        let y = array![[1.], [0.], [0.]];

        let pass = model.forward(x.view()).unwrap();
        model.evaluate(&pass, y.view()).unwrap();
        let dx = model.backward(pass).unwrap();

        assert_eq!(dx.dim(), (3, 2));
        for layer in model.layers() {
            let (dw, db) = layer.grads().unwrap();
            assert_eq!(dw.dim(), (layer.output_size(), layer.input_size()));
            assert_eq!(db.dim(), (layer.output_size(), 1));
        }
    }

    #[test]
    fn backward_requires_evaluated_loss() {
        let mut model = two_layer(vec![]);
        let pass = model.forward(array![[1., 1.]].view()).unwrap();

        let err = model.backward(pass).unwrap_err();

        assert!(matches!(err, MlErr::UninitializedState { .. }));
        assert!(model.layers().iter().all(|l| l.grads().is_none()));
    }

    #[test]
    fn stale_pass_is_rejected() {
        let mut model = two_layer(vec![]);
        let x = array![[1., 1.]];
        let y = array![[0.]];

        let old = model.forward(x.view()).unwrap();
        let new = model.forward(x.view()).unwrap();

        let err = model.evaluate(&old, y.view()).unwrap_err();
        assert!(matches!(err, MlErr::StalePass { got: 1, expected: 2 }));

        model.evaluate(&new, y.view()).unwrap();
        let err = model.backward(old).unwrap_err();
        assert!(matches!(err, MlErr::StalePass { got: 1, expected: 2 }));

        model.backward(new).unwrap();
    }

    #[test]
    fn forward_rejects_bad_input_before_touching_caches() {
        let mut model = two_layer(vec![Activation::relu()]);
        model.forward(array![[1., 2.]].view()).unwrap();

        let err = model.forward(array![[1., 2., 3.]].view()).unwrap_err();

        assert!(matches!(
            err,
            MlErr::ShapeMismatch {
                what: "model input columns",
                ..
            }
        ));
        assert_eq!(model.generation(), 1);
        assert_eq!(model.layers()[0].as_linear().unwrap().batch_size(), Some(1));
    }

    #[test]
    fn latched_loss_with_other_batch_size_is_rejected() {
        let layers = [linear(array![[1.]], array![[0.]])];
        let loss = Loss::mse().with_policy(CachePolicy::LatchOnce);
        let mut model = Model::new(layers, [], loss).unwrap();

        model
            .backprop(array![[1.], [2.]].view(), array![[0.], [0.]].view())
            .unwrap();

        let pass = model.forward(array![[1.]].view()).unwrap();
        model.evaluate(&pass, array![[0.]].view()).unwrap();
        let err = model.backward(pass).unwrap_err();

        assert!(matches!(
            err,
            MlErr::ShapeMismatch {
                what: "loss gradient rows",
                got: 2,
                expected: 1
            }
        ));
    }

    #[test]
    fn params_mut_invalidates_outstanding_pass() {
        let mut model = two_layer(vec![Activation::tanh()]);
        let x = array![[1., 2.], [-1., 0.]];
        let y = array![[1.], [0.]];

        let pass = model.forward(x.view()).unwrap();
        model.evaluate(&pass, y.view()).unwrap();
        for mut params in model.params_mut() {
            params.weights.fill(0.5);
        }

        let err = model.backward(pass).unwrap_err();

        assert!(matches!(err, MlErr::StalePass { got: 1, expected: 2 }));
        assert!(model.layers().iter().all(|l| l.grads().is_none()));
    }

    #[test]
    fn params_mut_keeps_layers_chained() {
        let mut model = two_layer(vec![Activation::tanh()]);
        let shapes: Vec<_> = model
            .params_mut()
            .map(|p| (p.weights.dim(), p.bias.dim()))
            .collect();

        assert_eq!(shapes, [((2, 2), (2, 1)), ((1, 2), (1, 1))]);

        let x = array![[1., 2.], [-1., 0.], [0., 3.]];
        let pass = model.forward(x.view()).unwrap();
        assert_eq!(pass.prediction().dim(), (3, 1));
    }

    #[test]
    fn backprop_returns_batch_loss() {
        let mut model = two_layer(vec![]);
        let x = array![[1., 2.]];
        let y = array![[1.]];

        let loss = model.backprop(x.view(), y.view()).unwrap();

        // prediction is 3.
        assert_eq!(loss, 4.);
        assert_eq!(model.size(), 9);
    }
}
