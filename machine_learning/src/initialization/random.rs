use ndarray::Array2;
use ndarray_rand::RandomExt;
use rand::Rng;
use rand_distr::{Distribution, Normal, Uniform};

use super::ParamGen;
use crate::Result;

/// A parameter generator that follows a certain probabilistic distribution.
pub struct RandParamGen<R: Rng, D: Distribution<f64>> {
    rng: R,
    distribution: D,
}

impl<R: Rng, D: Distribution<f64>> RandParamGen<R, D> {
    /// Creates a new `RandParamGen` parameter generator.
    ///
    /// # Arguments
    /// * `rng` - A random number generator.
    /// * `distribution` - The distribution to sample the random numbers from.
    pub fn new(rng: R, distribution: D) -> Self {
        Self { rng, distribution }
    }
}

impl<R: Rng> RandParamGen<R, Uniform<f64>> {
    /// Creates a new `RandParamGen` parameter generator with a uniform distribution.
    ///
    /// # Arguments
    /// * `rng` - A random number generator.
    /// * `low` - The inclusive lower limit.
    /// * `high` - The exclusive upper limit.
    ///
    /// # Returns
    /// An error if the range is invalid (low >= high).
    pub fn uniform(rng: R, low: f64, high: f64) -> Result<Self> {
        Ok(Self::new(rng, Uniform::new(low, high)?))
    }

    /// Creates a new `RandParamGen` parameter generator using Xavier uniform initialization.
    ///
    /// # Arguments
    /// * `rng` - A random number generator.
    /// * `fan_in` - The number of input units of the layer.
    /// * `fan_out` - The number of output units of the layer.
    pub fn xavier_uniform(rng: R, fan_in: usize, fan_out: usize) -> Result<Self> {
        let range = (6. / (fan_in + fan_out) as f64).sqrt();
        Self::uniform(rng, -range, range)
    }
}

impl<R: Rng> RandParamGen<R, Normal<f64>> {
    /// Creates a new `RandParamGen` parameter generator with a normal distribution.
    ///
    /// # Arguments
    /// * `rng` - A random number generator.
    /// * `mean` - The mean of the distribution.
    /// * `std_dev` - The standard deviation of the distribution.
    ///
    /// # Returns
    /// An error if `std_dev` is negative or not finite.
    pub fn normal(rng: R, mean: f64, std_dev: f64) -> Result<Self> {
        Ok(Self::new(rng, Normal::new(mean, std_dev)?))
    }

    /// Creates a new `RandParamGen` parameter generator using Kaiming normal initialization.
    ///
    /// # Arguments
    /// * `rng` - A random number generator.
    /// * `fan_in` - The number of input units of the layer.
    pub fn kaiming(rng: R, fan_in: usize) -> Result<Self> {
        let std_dev = (2. / fan_in as f64).sqrt();
        Self::normal(rng, 0., std_dev)
    }

    /// Creates a new `RandParamGen` parameter generator using LeCun normal initialization.
    ///
    /// # Arguments
    /// * `rng` - A random number generator.
    /// * `fan_in` - The number of input units of the layer.
    pub fn lecun(rng: R, fan_in: usize) -> Result<Self> {
        let std_dev = (1. / fan_in as f64).sqrt();
        Self::normal(rng, 0., std_dev)
    }
}

impl<R: Rng, D: Distribution<f64>> ParamGen for RandParamGen<R, D> {
    fn sample(&mut self, rows: usize, cols: usize) -> Array2<f64> {
        Array2::random_using((rows, cols), &self.distribution, &mut self.rng)
    }
}
