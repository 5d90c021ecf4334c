use ndarray::{Array2, ArrayView2, Zip};

use super::cached;
use crate::Result;

/// Rectified linear unit, `max(0, z)`. NaN inputs stay NaN.
#[derive(Clone, Debug, Default)]
pub struct Relu {
    a: Option<Array2<f64>>,
}

impl Relu {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn forward(&mut self, z: ArrayView2<f64>) -> Array2<f64> {
        let mut a = z.to_owned();
        a.par_mapv_inplace(|z| if z < 0. { 0. } else { z });

        self.a = Some(a.clone());
        a
    }

    /// The derivative at exactly zero is taken as zero.
    pub fn backward(&self, mut d: Array2<f64>) -> Result<Array2<f64>> {
        let a = cached(&self.a, d.dim())?;

        Zip::from(&mut d).and(a).par_for_each(|d, &a| {
            if a <= 0. {
                *d = 0.;
            }
        });

        Ok(d)
    }

    pub fn output(&self) -> Option<ArrayView2<'_, f64>> {
        self.a.as_ref().map(|a| a.view())
    }
}
