use ndarray::{Array2, ArrayView2, Zip};

use super::cached;
use crate::Result;

/// Hyperbolic tangent, `(e^z - e^-z) / (e^z + e^-z)`.
#[derive(Clone, Debug, Default)]
pub struct Tanh {
    a: Option<Array2<f64>>,
}

impl Tanh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn forward(&mut self, z: ArrayView2<f64>) -> Array2<f64> {
        let mut a = z.to_owned();
        // `f64::tanh` instead of the exponential quotient, which is NaN once e^z overflows.
        a.par_mapv_inplace(f64::tanh);

        self.a = Some(a.clone());
        a
    }

    pub fn backward(&self, mut d: Array2<f64>) -> Result<Array2<f64>> {
        let a = cached(&self.a, d.dim())?;

        Zip::from(&mut d).and(a).par_for_each(|d, &a| *d *= 1. - a * a);

        Ok(d)
    }

    pub fn output(&self) -> Option<ArrayView2<'_, f64>> {
        self.a.as_ref().map(|a| a.view())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array2, array};

    fn z() -> Array2<f64> {
        array![[-4., -3.], [-2., -1.], [0., 1.], [2., 3.]]
    }

    fn assert_close(a: &Array2<f64>, b: &Array2<f64>, tol: f64) {
        assert_eq!(a.dim(), b.dim());
        for (x, y) in a.iter().zip(b) {
            assert!((x - y).abs() < tol, "{x} != {y}");
        }
    }

    #[test]
    fn forward_matches_exponential_definition() {
        let mut tanh = Tanh::new();
        let a = tanh.forward(z().view());

        let by_definition = z().mapv(|z| (z.exp() - (-z).exp()) / (z.exp() + (-z).exp()));
        assert_close(&a, &by_definition, 1e-12);

        let expected = array![
            [-0.9993, -0.9951],
            [-0.964, -0.7616],
            [0., 0.7616],
            [0.964, 0.9951]
        ];
        assert_close(&a, &expected, 1e-3);
    }

    #[test]
    fn forward_saturates_without_nan() {
        let mut tanh = Tanh::new();
        let a = tanh.forward(array![[-800., 800.]].view());

        assert_eq!(a, array![[-1., 1.]]);
    }

    #[test]
    fn backward() {
        let mut tanh = Tanh::new();
        tanh.forward(z().view());

        let d = tanh.backward(Array2::ones((4, 2))).unwrap();

        let expected = array![
            [0.0013, 0.0099],
            [0.0707, 0.42],
            [1., 0.42],
            [0.0707, 0.0099]
        ];
        assert_close(&d, &expected, 1e-3);
    }
}
