//! Linear discriminant analysis (eigen solver).
//!
//! Solves `Sb · v = λ · Sw · v` through the Cholesky factor of the within-class
//! scatter `Sw`, keeping at most `min(2, classes − 1, m)` unit-length directions.

use std::cmp::Ordering;

use anyhow::{anyhow, bail};
use nalgebra::{Cholesky, DMatrix, SymmetricEigen};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use nshare::{IntoNalgebra, IntoNdarray2};

use crate::dimred::{LinearProjection, Projector, EMBEDDING_DIM};

/// Within-class and between-class scatter, both divided by the sample count.
fn scatter_matrices(x: ArrayView2<f64>, y: ArrayView1<f64>) -> anyhow::Result<(Array2<f64>, Array2<f64>, Array1<f64>, usize)> {
    let (n, m) = x.dim();
    let mut classes: Vec<f64> = y.iter().copied().filter(|v| !v.is_nan()).collect();
    classes.sort_by(f64::total_cmp);
    classes.dedup();
    if classes.len() < 2 {
        bail!("LDA needs at least two classes, got {}", classes.len());
    }

    let mean = x
        .mean_axis(Axis(0))
        .ok_or_else(|| anyhow!("Cannot fit LDA without samples"))?;
    let mut within = Array2::<f64>::zeros((m, m));
    let mut between = Array2::<f64>::zeros((m, m));

    for &class in &classes {
        let rows: Vec<usize> = (0..n).filter(|&i| y[i] == class).collect();
        let members = x.select(Axis(0), &rows);
        let class_mean = members
            .mean_axis(Axis(0))
            .ok_or_else(|| anyhow!("Empty class in LDA"))?;

        let centred = &members - &class_mean.view().insert_axis(Axis(0));
        within += &centred.t().dot(&centred);

        let offset = (&class_mean - &mean).insert_axis(Axis(1));
        between += &(offset.dot(&offset.t()) * rows.len() as f64);
    }

    within /= n as f64;
    between /= n as f64;
    Ok((within, between, mean, classes.len()))
}

fn to_nalgebra(a: &Array2<f64>) -> DMatrix<f64> {
    a.view().into_nalgebra().clone_owned()
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LdaProjector;

impl Projector for LdaProjector {
    fn fit(&self, x: ArrayView2<f64>, y: ArrayView1<f64>) -> anyhow::Result<LinearProjection> {
        let m = x.ncols();
        if m == 0 || x.nrows() != y.len() {
            bail!("LDA input has {} variables and {} targets for {} rows", m, y.len(), x.nrows());
        }
        let (within, between, mean, n_classes) = scatter_matrices(x, y)?;

        let chol = Cholesky::new(to_nalgebra(&within))
            .ok_or_else(|| anyhow!("Within-class scatter is singular"))?;
        let l = chol.l();

        // A = L⁻¹ · Sb · L⁻ᵀ
        let sb = to_nalgebra(&between);
        let left = l
            .solve_lower_triangular(&sb)
            .ok_or_else(|| anyhow!("Within-class scatter is singular"))?;
        let a = l
            .solve_lower_triangular(&left.transpose())
            .ok_or_else(|| anyhow!("Within-class scatter is singular"))?;
        let a = (&a + a.transpose()) * 0.5;

        let eigen = SymmetricEigen::new(a);
        let mut order: Vec<usize> = (0..m).collect();
        order.sort_by(|&i, &j| {
            eigen.eigenvalues[j]
                .partial_cmp(&eigen.eigenvalues[i])
                .unwrap_or(Ordering::Equal)
        });

        let n_components = EMBEDDING_DIM.min(n_classes - 1).min(m);
        let w = DMatrix::from_fn(m, n_components, |r, c| eigen.eigenvectors[(r, order[c])]);

        // Back to the original space: v = L⁻ᵀ · w
        let mut v = l
            .transpose()
            .solve_upper_triangular(&w)
            .ok_or_else(|| anyhow!("Within-class scatter is singular"))?;
        for mut col in v.column_iter_mut() {
            let norm = col.norm();
            if norm == 0.0 || !norm.is_finite() {
                bail!("Degenerate discriminant direction");
            }
            col /= norm;
        }

        let components = v.transpose().into_ndarray2();
        LinearProjection::new(mean, Array1::ones(m), components)
    }
}
