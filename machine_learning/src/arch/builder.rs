use log::info;
use rand::{SeedableRng, rngs::StdRng};

use super::{Model, activations::Activation, layers::Layer, loss::Loss};
use crate::{
    Result,
    initialization::{ConstParamGen, RandParamGen},
    specs::{ActFnSpec, LayerSpec, LossFnSpec, ModelSpec, ParamGenSpec},
};

/// Builds `Model`s given a specification.
#[derive(Debug, Default)]
pub struct ModelBuilder;

impl ModelBuilder {
    /// Creates a new `ModelBuilder`.
    pub fn new() -> Self {
        Self
    }

    /// Builds a new `Model` from a JSON encoded `ModelSpec`.
    ///
    /// # Arguments
    /// * `json` - The specification for the model.
    pub fn from_json(&self, json: &str) -> Result<Model> {
        let spec: ModelSpec = serde_json::from_str(json)?;
        self.build(&spec)
    }

    /// Builds a new `Model` following a spec.
    ///
    /// # Arguments
    /// * `spec` - The specification for the model.
    pub fn build(&self, spec: &ModelSpec) -> Result<Model> {
        let mut rng = self.generate_rng(spec.seed);

        let layers = spec
            .layers
            .iter()
            .map(|ls| self.resolve_layer(*ls, spec.init, &mut rng))
            .collect::<Result<Vec<_>>>()?;
        let activations = spec.activations.iter().map(|a| self.resolve_act_fn(*a));
        let loss = self.resolve_loss(spec.loss).with_policy(spec.cache_policy);

        let model = Model::new(layers, activations, loss)?;
        info!(
            layers = model.layers().len(),
            activations = model.activations().len(),
            params = model.size();
            "model built"
        );

        Ok(model)
    }

    fn resolve_layer(&self, spec: LayerSpec, init: ParamGenSpec, rng: &mut StdRng) -> Result<Layer> {
        match spec {
            LayerSpec::Linear {
                dim: (fan_in, fan_out),
            } => {
                let layer = match init {
                    ParamGenSpec::Const { value } => {
                        Layer::linear(fan_in, fan_out, &mut ConstParamGen::new(value))
                    }
                    ParamGenSpec::Uniform { low, high } => {
                        let mut param_gen = RandParamGen::uniform(&mut *rng, low, high)?;
                        Layer::linear(fan_in, fan_out, &mut param_gen)
                    }
                    ParamGenSpec::Normal { mean, std_dev } => {
                        let mut param_gen = RandParamGen::normal(&mut *rng, mean, std_dev)?;
                        Layer::linear(fan_in, fan_out, &mut param_gen)
                    }
                    ParamGenSpec::XavierUniform => {
                        let mut param_gen = RandParamGen::xavier_uniform(&mut *rng, fan_in, fan_out)?;
                        Layer::linear(fan_in, fan_out, &mut param_gen)
                    }
                    ParamGenSpec::Kaiming => {
                        let mut param_gen = RandParamGen::kaiming(&mut *rng, fan_in)?;
                        Layer::linear(fan_in, fan_out, &mut param_gen)
                    }
                    ParamGenSpec::Lecun => {
                        let mut param_gen = RandParamGen::lecun(&mut *rng, fan_in)?;
                        Layer::linear(fan_in, fan_out, &mut param_gen)
                    }
                };

                Ok(layer)
            }
        }
    }

    fn resolve_act_fn(&self, spec: ActFnSpec) -> Activation {
        match spec {
            ActFnSpec::Relu => Activation::relu(),
            ActFnSpec::Sigmoid => Activation::sigmoid(),
            ActFnSpec::Tanh => Activation::tanh(),
        }
    }

    fn resolve_loss(&self, spec: LossFnSpec) -> Loss {
        match spec {
            LossFnSpec::Mse => Loss::mse(),
            LossFnSpec::SoftmaxCrossEntropy => Loss::softmax_cross_entropy(),
        }
    }

    fn generate_rng(&self, seed: Option<u64>) -> StdRng {
        match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }
}
