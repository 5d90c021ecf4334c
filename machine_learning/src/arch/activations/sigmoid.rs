use ndarray::{Array2, ArrayView2, Zip};

use super::cached;
use crate::Result;

/// Logistic function, `1 / (1 + e^-z)`.
#[derive(Clone, Debug, Default)]
pub struct Sigmoid {
    a: Option<Array2<f64>>,
}

impl Sigmoid {
    pub fn new() -> Self {
        Self::default()
    }

    fn sigmoid(z: f64) -> f64 {
        // e^-z overflows for very negative z, so rewrite that branch in terms of e^z.
        if z >= 0. {
            1. / (1. + (-z).exp())
        } else {
            let e = z.exp();
            e / (1. + e)
        }
    }

    pub fn forward(&mut self, z: ArrayView2<f64>) -> Array2<f64> {
        let mut a = z.to_owned();
        a.par_mapv_inplace(Self::sigmoid);

        self.a = Some(a.clone());
        a
    }

    pub fn backward(&self, mut d: Array2<f64>) -> Result<Array2<f64>> {
        let a = cached(&self.a, d.dim())?;

        Zip::from(&mut d)
            .and(a)
            .par_for_each(|d, &a| *d *= a * (1. - a));

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
    fn forward() {
        let mut sigmoid = Sigmoid::new();
        let a = sigmoid.forward(z().view());

        let expected = array![
            [0.018, 0.0474],
            [0.1192, 0.2689],
            [0.5, 0.7311],
            [0.8808, 0.9526]
        ];
        assert_close(&a, &expected, 1e-3);
    }

    #[test]
    fn forward_stays_in_open_unit_interval() {
        let mut sigmoid = Sigmoid::new();
        let a = sigmoid.forward(array![[-30., -5., 0., 5., 30.]].view());

        assert!(a.iter().all(|&a| a > 0. && a < 1.));
    }

    #[test]
    fn forward_is_finite_on_large_magnitudes() {
        let mut sigmoid = Sigmoid::new();
        let a = sigmoid.forward(array![[-1000., -40., 0., 40., 1000.]].view());

        assert!(a.iter().all(|a| a.is_finite()));
        assert!(a.iter().zip(a.iter().skip(1)).all(|(l, r)| l <= r));
        assert!(a.iter().all(|&a| (0. ..=1.).contains(&a)));
    }

    #[test]
    fn backward_of_ones_is_local_derivative() {
        let mut sigmoid = Sigmoid::new();
        let a = sigmoid.forward(z().view());

        let d = sigmoid.backward(Array2::ones(a.dim())).unwrap();

        assert_close(&d, &(&a * &(1. - &a)), 1e-15);
        let expected = array![
            [0.0177, 0.0452],
            [0.105, 0.1966],
            [0.25, 0.1966],
            [0.105, 0.0452]
        ];
        assert_close(&d, &expected, 1e-3);
    }
}
