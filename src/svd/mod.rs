use std::cmp::Ordering;

use anyhow::anyhow;
use ndarray::{Array1, Array2, ArrayView2, Axis};
use nshare::{IntoNalgebra, IntoNdarray2};

/// Thin singular value decomposition `x = u · diag(s) · vt`, singular values
/// in decreasing order.
pub struct SVD {
    u: Option<Array2<f64>>,
    s: Option<Array1<f64>>,
    vt: Option<Array2<f64>>,
}

impl SVD {
    pub fn new() -> Self {
        SVD {
            u: None,
            s: None,
            vt: None,
        }
    }

    pub fn compute(&mut self, x: ArrayView2<f64>) -> anyhow::Result<()> {
        if x.is_empty() {
            return Err(anyhow!("Cannot decompose an empty matrix"));
        }
        let matrix = x.into_nalgebra().clone_owned();

        let svd = nalgebra::SVD::try_new(matrix, true, true, f64::EPSILON, 0)
            .ok_or_else(|| anyhow!("SVD did not converge"))?;

        let u = svd
            .u
            .ok_or_else(|| anyhow!("SVD did not produce left singular vectors"))?
            .into_ndarray2();
        let vt = svd
            .v_t
            .ok_or_else(|| anyhow!("SVD did not produce right singular vectors"))?
            .into_ndarray2();
        let s = Array1::from(svd.singular_values.as_slice().to_vec());

        let mut order: Vec<usize> = (0..s.len()).collect();
        order.sort_by(|&a, &b| s[b].partial_cmp(&s[a]).unwrap_or(Ordering::Equal));

        self.u = Some(u.select(Axis(1), &order));
        self.s = Some(s.select(Axis(0), &order));
        self.vt = Some(vt.select(Axis(0), &order));

        Ok(())
    }

    pub fn u(&self) -> Option<&Array2<f64>> {
        self.u.as_ref()
    }

    pub fn s(&self) -> Option<&Array1<f64>> {
        self.s.as_ref()
    }

    pub fn vt(&self) -> Option<&Array2<f64>> {
        self.vt.as_ref()
    }
}

impl Default for SVD {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    use super::*;

    #[test]
    fn test_simple_svd() {
        let a = array![[1.0, 2.0], [3.0, 4.0]];
        let mut svd = SVD::new();
        svd.compute(a.view()).unwrap();
        let s = svd.s().unwrap();
        let vt = svd.vt().unwrap();
        let u = svd.u().unwrap();
        assert_eq!(u.shape(), &[2, 2]);
        assert_eq!(s.len(), 2);
        assert_eq!(vt.shape(), &[2, 2]);

        assert_abs_diff_eq!(s[0], 5.4649857, epsilon = 1e-6);
        assert_abs_diff_eq!(s[1], 0.3659662, epsilon = 1e-6);

        let reconstructed = u.dot(&Array2::from_diag(s)).dot(vt);
        for i in 0..2 {
            for j in 0..2 {
                assert_abs_diff_eq!(reconstructed[[i, j]], a[[i, j]], epsilon = 1e-6);
            }
        }
    }

    #[test]
    fn test_thin_svd_of_tall_matrix() {
        let a = array![[1.0, 0.0], [0.0, 3.0], [0.0, 0.0], [0.0, 0.0]];
        let mut svd = SVD::new();
        svd.compute(a.view()).unwrap();
        assert_eq!(svd.u().unwrap().shape(), &[4, 2]);
        assert_abs_diff_eq!(svd.s().unwrap()[0], 3.0, epsilon = 1e-9);
        assert_abs_diff_eq!(svd.s().unwrap()[1], 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_empty_matrix() {
        let a = Array2::<f64>::zeros((0, 3));
        assert!(SVD::new().compute(a.view()).is_err());
    }
}
