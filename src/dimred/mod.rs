//! # Linear projections
//!
//! The three ways the search can lay variables out in the plane:
//!
//! - **Circular** ([`circular`]): fixed axes evenly spread over the unit circle.
//! - **LDA** ([`lda`]): the two most discriminating directions for a discrete target.
//! - **PCA** ([`pca`]): the two directions of largest variance of the standardized data.
//!
//! Every projector fits a [`LinearProjection`]: per-column centring and scaling
//! followed by a `2 × m` component matrix. Projections with fewer than two
//! components are padded with zero rows, so embeddings are always two-dimensional.

use std::fmt;

use anyhow::bail;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};

pub mod circular;
pub mod lda;
pub mod pca;

pub use circular::{circular_placement, CircularPlacement};
pub use lda::LdaProjector;
pub use pca::{NalgebraSVD, Pca, PcaBuilder, PcaProjector, SVDImplementation};

/// Embedding dimension produced by every projector.
pub const EMBEDDING_DIM: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Placement {
    #[default]
    Circular,
    Lda,
    Pca,
}

impl Placement {
    pub const ALL: [Placement; 3] = [Placement::Circular, Placement::Lda, Placement::Pca];

    pub fn name(&self) -> &'static str {
        match self {
            Placement::Circular => "Circular Placement",
            Placement::Lda => "Linear Discriminant Analysis",
            Placement::Pca => "Principal Component Analysis",
        }
    }

    /// Fits the projector this placement stands for.
    pub fn fit(&self, x: ArrayView2<f64>, y: ArrayView1<f64>) -> anyhow::Result<LinearProjection> {
        match self {
            Placement::Circular => CircularPlacement.fit(x, y),
            Placement::Lda => LdaProjector.fit(x, y),
            Placement::Pca => PcaProjector::default().fit(x, y),
        }
    }
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Something that learns a [`LinearProjection`] from complete rows `x` and target `y`.
pub trait Projector: Send + Sync {
    fn fit(&self, x: ArrayView2<f64>, y: ArrayView1<f64>) -> anyhow::Result<LinearProjection>;
}

/// A fitted projection `((x − mean) / scale) · componentsᵀ`.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearProjection {
    mean: Array1<f64>,
    scale: Array1<f64>,
    components: Array2<f64>,
    n_components: usize,
}

impl LinearProjection {
    /// `components` has one row per fitted component (at most two) and one
    /// column per input variable.
    pub fn new(mean: Array1<f64>, scale: Array1<f64>, components: Array2<f64>) -> anyhow::Result<Self> {
        let m = components.ncols();
        let n_components = components.nrows();
        if mean.len() != m || scale.len() != m {
            bail!(
                "Centring ({}) and scaling ({}) must match the {} projected variables",
                mean.len(),
                scale.len(),
                m
            );
        }
        if n_components > EMBEDDING_DIM {
            bail!("At most {} components are supported, got {}", EMBEDDING_DIM, n_components);
        }
        if components.iter().any(|v| !v.is_finite()) {
            bail!("Projection components are not finite");
        }

        let mut padded = Array2::zeros((EMBEDDING_DIM, m));
        padded
            .slice_mut(ndarray::s![..n_components, ..])
            .assign(&components);
        Ok(LinearProjection {
            mean,
            scale,
            components: padded,
            n_components,
        })
    }

    /// The `2 × m` component matrix, zero rows included.
    pub fn components(&self) -> ArrayView2<'_, f64> {
        self.components.view()
    }

    /// Number of components the projector actually produced.
    pub fn n_components(&self) -> usize {
        self.n_components
    }

    pub fn n_variables(&self) -> usize {
        self.components.ncols()
    }

    /// Projects rows of `x` (same variables, same order as fitted) to the plane.
    pub fn transform(&self, x: ArrayView2<f64>) -> anyhow::Result<Array2<f64>> {
        if x.ncols() != self.n_variables() {
            bail!(
                "Projection was fitted on {} variables, got {}",
                self.n_variables(),
                x.ncols()
            );
        }
        let mut centred = x.to_owned();
        centred -= &self.mean.view().insert_axis(Axis(0));
        centred /= &self.scale.view().insert_axis(Axis(0));
        Ok(centred.dot(&self.components.t()))
    }
}
