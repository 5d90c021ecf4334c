use ndarray::Array2;

use super::ParamGen;

/// A parameter generator that always generates the same value.
#[derive(Debug, Clone, Copy)]
pub struct ConstParamGen {
    value: f64,
}

impl ConstParamGen {
    /// Creates a new `ConstParamGen` parameter generator.
    ///
    /// # Arguments
    /// * `value` - The value to always generate.
    pub fn new(value: f64) -> Self {
        Self { value }
    }
}

impl ParamGen for ConstParamGen {
    fn sample(&mut self, rows: usize, cols: usize) -> Array2<f64> {
        Array2::from_elem((rows, cols), self.value)
    }
}
