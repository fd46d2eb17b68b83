//! # Projection scoring
//!
//! Measures how well the neighbourhoods of a 2D projection agree with the target:
//!
//! - discrete target: minus the share of neighbours that carry the point's own class,
//! - continuous target: minus the R² of predicting each target value by the mean of its
//!   neighbours' values, shrunk by the share of rows that could be used.
//!
//! Lower scores are better.

use log::trace;
use ndarray::{Array2, ArrayView1};

use crate::data::Dataset;
use crate::dimred::Placement;
use crate::error::{Result, VizRankError};
use crate::neighbors::knn_indices;

/// Default minimum number of instances (and neighbours per instance).
pub const DEFAULT_MIN_NEIGHBORS: usize = 10;

/// Length of the indicator drawn next to a score; never negative.
pub fn bar_length(score: f64) -> f64 {
    (-score).max(0.0)
}

/// Coefficient of determination of `predicted` against `actual`.
///
/// A constant `actual` gives `1` for a perfect prediction and `0` otherwise.
pub fn r2_score(actual: ArrayView1<f64>, predicted: ArrayView1<f64>) -> f64 {
    let n = actual.len() as f64;
    let mean = actual.sum() / n;
    let ss_res: f64 = actual
        .iter()
        .zip(predicted.iter())
        .map(|(a, p)| (a - p) * (a - p))
        .sum();
    let ss_tot: f64 = actual.iter().map(|a| (a - mean) * (a - mean)).sum();
    if ss_tot == 0.0 {
        return if ss_res == 0.0 { 1.0 } else { 0.0 };
    }
    1.0 - ss_res / ss_tot
}

/// Scores candidate variable orderings against the dataset target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectionScorer {
    placement: Placement,
    min_neighbors: usize,
}

impl ProjectionScorer {
    pub fn new(placement: Placement, min_neighbors: usize) -> Self {
        ProjectionScorer {
            placement,
            min_neighbors: min_neighbors.max(1),
        }
    }

    pub fn placement(&self) -> Placement {
        self.placement
    }

    pub fn min_neighbors(&self) -> usize {
        self.min_neighbors
    }

    /// Projects `columns` (in order) and returns the embedding of the usable rows
    /// along with those row indices.
    pub fn embed(&self, data: &Dataset, columns: &[usize]) -> Result<(Array2<f64>, Vec<usize>)> {
        let rows = data.complete_rows(columns);
        let embedding = self.embed_rows(data, columns, &rows)?;
        Ok((embedding, rows))
    }

    fn embed_rows(&self, data: &Dataset, columns: &[usize], rows: &[usize]) -> Result<Array2<f64>> {
        if rows.is_empty() {
            return Err(VizRankError::InsufficientSamples {
                found: 0,
                required: self.min_neighbors,
            });
        }
        let x = data.sub_matrix(rows, columns);
        let y = data.sub_target(rows);
        let embedding = self
            .placement
            .fit(x.view(), y.view())
            .and_then(|projection| projection.transform(x.view()))
            .map_err(|e| VizRankError::DegenerateProjection(format!("{:#}", e)))?;
        if embedding.iter().any(|v| !v.is_finite()) {
            return Err(VizRankError::DegenerateProjection(
                "embedding contains non-finite coordinates".into(),
            ));
        }
        Ok(embedding)
    }

    /// Scores the projection of `columns`.
    ///
    /// Fails with [`VizRankError::InsufficientSamples`] when fewer rows than the
    /// neighbour threshold are usable, and with
    /// [`VizRankError::DegenerateProjection`] when the projector cannot be fitted.
    pub fn score(&self, data: &Dataset, columns: &[usize]) -> Result<f64> {
        let rows = data.complete_rows(columns);
        if rows.len() < self.min_neighbors {
            return Err(VizRankError::InsufficientSamples {
                found: rows.len(),
                required: self.min_neighbors,
            });
        }

        let embedding = self.embed_rows(data, columns, &rows)?;
        let n = rows.len();
        let k = self.min_neighbors.min(n - 1);
        if k == 0 {
            return Err(VizRankError::InsufficientSamples {
                found: n,
                required: self.min_neighbors,
            });
        }
        let neighbors = knn_indices(embedding.view(), k)
            .map_err(|e| VizRankError::DegenerateProjection(e.to_string()))?;
        let y = data.sub_target(&rows);

        let score = if data.target().is_discrete() {
            let same: usize = neighbors
                .rows()
                .into_iter()
                .enumerate()
                .map(|(i, row)| row.iter().filter(|&&j| y[j] == y[i]).count())
                .sum();
            -(same as f64) / k as f64 / n as f64
        } else {
            let predicted = neighbors.map_axis(ndarray::Axis(1), |row| {
                row.iter().map(|&j| y[j]).sum::<f64>() / k as f64
            });
            -r2_score(y.view(), predicted.view()) * (n as f64 / data.n_rows() as f64)
        };

        if !score.is_finite() {
            return Err(VizRankError::DegenerateProjection(format!(
                "score is not finite for columns {:?}",
                columns
            )));
        }
        trace!("Scored columns {:?} with {} instances: {}", columns, n, score);
        Ok(score)
    }
}

impl Default for ProjectionScorer {
    fn default() -> Self {
        ProjectionScorer::new(Placement::Circular, DEFAULT_MIN_NEIGHBORS)
    }
}
