use log::debug;
use ndarray::{Array2, ArrayView2};
use serde::{Deserialize, Serialize};

use super::LossFn;
use crate::{MlErr, Result};

/// When a `Loss` refreshes the prediction and target it hands to `backward`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CachePolicy {
    /// Every forward call replaces the cached prediction and target.
    #[default]
    Refresh,
    /// Only the first forward call is cached; later calls return their loss but `backward`
    /// keeps differentiating the first batch.
    LatchOnce,
}

#[derive(Debug, Clone)]
struct LossCache {
    a: Array2<f64>,
    y: Array2<f64>,
}

/// A loss function together with the state its backward pass needs.
#[derive(Debug, Clone)]
pub struct Loss {
    loss_fn: LossFn,
    policy: CachePolicy,
    cache: Option<LossCache>,
}

impl Loss {
    /// Creates a new `Loss` with the `Refresh` cache policy.
    pub fn new(loss_fn: LossFn) -> Self {
        Self {
            loss_fn,
            policy: CachePolicy::default(),
            cache: None,
        }
    }

    pub fn mse() -> Self {
        Self::new(LossFn::mse())
    }

    pub fn softmax_cross_entropy() -> Self {
        Self::new(LossFn::softmax_cross_entropy())
    }

    /// Sets the cache policy of this loss.
    pub fn with_policy(mut self, policy: CachePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> CachePolicy {
        self.policy
    }

    pub fn loss_fn(&self) -> LossFn {
        self.loss_fn
    }

    /// The `(n, c)` shape of the prediction `backward` will differentiate.
    pub fn cached_dim(&self) -> Option<(usize, usize)> {
        self.cache.as_ref().map(|c| c.a.dim())
    }

    /// Computes the loss of `a` against `y` and caches both according to the policy.
    ///
    /// # Arguments
    /// * `a` - The `(n, c)` prediction.
    /// * `y` - The `(n, c)` target.
    ///
    /// # Returns
    /// The scalar loss, or an error in which case nothing is cached.
    pub fn forward(&mut self, a: ArrayView2<f64>, y: ArrayView2<f64>) -> Result<f64> {
        let loss = self.loss_fn.loss(a, y)?;

        match (self.policy, &self.cache) {
            (CachePolicy::LatchOnce, Some(_)) => {
                debug!(loss_fn = self.loss_fn.name(); "latched loss cache kept, new batch not cached");
            }
            _ => {
                self.cache = Some(LossCache {
                    a: a.to_owned(),
                    y: y.to_owned(),
                });
            }
        }

        Ok(loss)
    }

    /// Computes `dL/dA` for the cached prediction and target.
    ///
    /// # Errors
    /// `UninitializedState` if `forward` never succeeded.
    pub fn backward(&self) -> Result<Array2<f64>> {
        let cache = self.cache.as_ref().ok_or(MlErr::UninitializedState {
            what: "loss backward called before forward",
        })?;

        self.loss_fn.loss_prime(cache.a.view(), cache.y.view())
    }
}
