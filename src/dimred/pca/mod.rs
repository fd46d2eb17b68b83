use ndarray::{s, Array1, Array2, ArrayView1, ArrayView2, Axis};
use log::trace;
use rayon::prelude::*;
use std::sync::Arc;

use crate::dimred::{LinearProjection, Projector, EMBEDDING_DIM};
use crate::svd::SVD;
use crate::utils::safe_divisor;

// Trait for SVD implementations
pub trait SVDImplementation: Send + Sync {
    fn compute(&self, matrix: ArrayView2<f64>) -> anyhow::Result<(Array2<f64>, Array1<f64>, Array2<f64>)>;
}

/// SVD backed by `nalgebra`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NalgebraSVD;

impl SVDImplementation for NalgebraSVD {
    fn compute(&self, matrix: ArrayView2<f64>) -> anyhow::Result<(Array2<f64>, Array1<f64>, Array2<f64>)> {
        let mut svd = SVD::new();
        svd.compute(matrix)?;
        match (svd.u(), svd.s(), svd.vt()) {
            (Some(u), Some(s), Some(vt)) => Ok((u.clone(), s.clone(), vt.clone())),
            _ => Err(anyhow::anyhow!("SVD produced no factors")),
        }
    }
}

pub struct PcaBuilder<S: SVDImplementation> {
    n_components: Option<usize>,
    center: bool,
    scale: bool,
    svd_implementation: Arc<S>,
}

impl<S: SVDImplementation> PcaBuilder<S> {
    pub fn new(svd_implementation: S) -> Self {
        PcaBuilder {
            n_components: None,
            center: true,
            scale: false,
            svd_implementation: Arc::new(svd_implementation),
        }
    }

    pub fn n_components(mut self, n_components: usize) -> Self {
        self.n_components = Some(n_components);
        self
    }

    pub fn center(mut self, center: bool) -> Self {
        self.center = center;
        self
    }

    pub fn scale(mut self, scale: bool) -> Self {
        self.scale = scale;
        self
    }

    pub fn build(self) -> Pca<S> {
        Pca {
            n_components: self.n_components,
            center: self.center,
            scale: self.scale,
            svd_implementation: self.svd_implementation,
            components: None,
            mean: None,
            std_dev: None,
            explained_variance_ratio: None,
        }
    }
}

pub struct Pca<S: SVDImplementation> {
    n_components: Option<usize>,
    center: bool,
    scale: bool,
    svd_implementation: Arc<S>,
    components: Option<Array2<f64>>,
    mean: Option<Array1<f64>>,
    std_dev: Option<Array1<f64>>,
    explained_variance_ratio: Option<Array1<f64>>,
}

impl<S: SVDImplementation> Pca<S> {
    pub fn fit(&mut self, x: ArrayView2<f64>) -> anyhow::Result<()> {
        let (n_samples, n_features) = x.dim();
        if n_samples < 2 || n_features == 0 {
            return Err(anyhow::anyhow!(
                "PCA needs at least two samples and one feature, got {} x {}",
                n_samples,
                n_features
            ));
        }

        let mean = if self.center {
            Some(
                x.mean_axis(Axis(0))
                    .ok_or_else(|| anyhow::anyhow!("Failed to compute mean"))?,
            )
        } else {
            None
        };

        // Zero-variance columns are left unscaled
        let std_dev = if self.scale {
            Some(x.std_axis(Axis(0), 0.0).mapv(safe_divisor))
        } else {
            None
        };

        let x_preprocessed = self.preprocess(x, &mean, &std_dev);

        let (_u, s, vt) = self.svd_implementation.compute(x_preprocessed.view())?;

        let n_components = self.n_components.unwrap_or(n_features).min(vt.nrows());
        let components = vt.slice(s![..n_components, ..]).to_owned();

        let eigenvalues = s.mapv(|x| x * x / (n_samples as f64 - 1.0));

        let total_variance = eigenvalues.sum();
        let explained_variance_ratio = if total_variance > 0.0 {
            &eigenvalues / total_variance
        } else {
            Array1::zeros(eigenvalues.len())
        };

        self.components = Some(components);
        self.mean = mean;
        self.std_dev = std_dev;
        self.explained_variance_ratio = Some(
            explained_variance_ratio
                .slice(s![..n_components])
                .to_owned(),
        );

        Ok(())
    }

    fn preprocess(
        &self,
        x: ArrayView2<f64>,
        mean: &Option<Array1<f64>>,
        std_dev: &Option<Array1<f64>>,
    ) -> Array2<f64> {
        let mut x_preprocessed = x.to_owned();

        if let Some(m) = mean {
            x_preprocessed
                .axis_iter_mut(Axis(0))
                .into_par_iter()
                .for_each(|mut row| {
                    row -= m;
                });
        }

        if let Some(s) = std_dev {
            x_preprocessed
                .axis_iter_mut(Axis(0))
                .into_par_iter()
                .for_each(|mut row| {
                    row /= s;
                });
        }

        x_preprocessed
    }

    pub fn transform(&self, x: ArrayView2<f64>) -> anyhow::Result<Array2<f64>> {
        if let Some(components) = &self.components {
            let x_preprocessed = self.preprocess(x, &self.mean, &self.std_dev);
            Ok(x_preprocessed.dot(&components.t()))
        } else {
            Err(anyhow::anyhow!("PCA has not been fitted yet"))
        }
    }

    pub fn components(&self) -> Option<&Array2<f64>> {
        self.components.as_ref()
    }

    pub fn mean(&self) -> Option<&Array1<f64>> {
        self.mean.as_ref()
    }

    pub fn std_dev(&self) -> Option<&Array1<f64>> {
        self.std_dev.as_ref()
    }

    pub fn explained_variance_ratio(&self) -> Option<&Array1<f64>> {
        self.explained_variance_ratio.as_ref()
    }
}

/// Two-component PCA on standardized variables.
#[derive(Debug, Clone, Copy, Default)]
pub struct PcaProjector {
    svd: NalgebraSVD,
}

impl Projector for PcaProjector {
    fn fit(&self, x: ArrayView2<f64>, _y: ArrayView1<f64>) -> anyhow::Result<LinearProjection> {
        let m = x.ncols();
        let mut pca = PcaBuilder::new(self.svd)
            .n_components(EMBEDDING_DIM)
            .center(true)
            .scale(true)
            .build();
        pca.fit(x)?;
        if let Some(ratio) = pca.explained_variance_ratio() {
            trace!("PCA explained variance ratio: {}", ratio);
        }

        let mean = pca.mean().cloned().unwrap_or_else(|| Array1::zeros(m));
        let scale = pca.std_dev().cloned().unwrap_or_else(|| Array1::ones(m));
        let components = pca
            .components()
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("PCA has not been fitted yet"))?;
        LinearProjection::new(mean, scale, components)
    }
}
