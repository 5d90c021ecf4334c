use ndarray::Array2;

/// A `ParamGen` generates values for the initial state of a layer's parameters.
pub trait ParamGen {
    /// Samples a `rows x cols` matrix of initial parameters.
    ///
    /// # Arguments
    /// * `rows` - The amount of rows of the sample.
    /// * `cols` - The amount of columns of the sample.
    fn sample(&mut self, rows: usize, cols: usize) -> Array2<f64>;
}

impl<F> ParamGen for F
where
    F: FnMut(usize, usize) -> Array2<f64>,
{
    fn sample(&mut self, rows: usize, cols: usize) -> Array2<f64> {
        self(rows, cols)
    }
}
