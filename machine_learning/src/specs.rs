//! Declarative, serializable descriptions of a model.

use serde::{Deserialize, Serialize};

use crate::arch::loss::CachePolicy;

/// The specification for the `Activation` enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActFnSpec {
    Relu,
    Sigmoid,
    Tanh,
}

/// The specification for the `Layer` enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerSpec {
    Linear { dim: (usize, usize) },
}

/// The specification for the `LossFn` enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LossFnSpec {
    Mse,
    SoftmaxCrossEntropy,
}

/// The specification for the initial parameter generator of every layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamGenSpec {
    Const { value: f64 },
    Uniform { low: f64, high: f64 },
    Normal { mean: f64, std_dev: f64 },
    XavierUniform,
    Kaiming,
    Lecun,
}

impl Default for ParamGenSpec {
    fn default() -> Self {
        Self::Uniform {
            low: -1.,
            high: 1.,
        }
    }
}

/// The specification for the `Model` struct.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSpec {
    pub layers: Vec<LayerSpec>,
    #[serde(default)]
    pub activations: Vec<ActFnSpec>,
    pub loss: LossFnSpec,
    #[serde(default)]
    pub cache_policy: CachePolicy,
    #[serde(default)]
    pub init: ParamGenSpec,
    #[serde(default)]
    pub seed: Option<u64>,
}
