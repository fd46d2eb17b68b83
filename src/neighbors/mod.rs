//! Exact nearest-neighbour queries over small dense point sets.
//!
//! Embeddings scored by the search hold at most a few thousand rows in two
//! dimensions, so a brute-force scan per row (parallel across rows) is used.
//! Neighbours are ordered by `(distance, index)`, which keeps results
//! reproducible when points coincide.

use std::cmp::Ordering;

use anyhow::bail;
use ndarray::{Array2, ArrayView1, ArrayView2};
use rayon::prelude::*;

pub fn squared_euclidean(a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y) * (x - y)).sum()
}

/// Keeps the `k` closest `(distance, index)` pairs, sorted, and drops the rest.
pub(crate) fn select_k_nearest(pairs: &mut Vec<(f64, usize)>, k: usize) {
    pairs.sort_unstable_by(|a, b| {
        a.0.partial_cmp(&b.0)
            .unwrap_or(Ordering::Equal)
            .then(a.1.cmp(&b.1))
    });
    pairs.truncate(k);
}

/// For every row of `points`, the indices of its `k` nearest other rows.
///
/// Returns an `n × k` matrix; row `i` never contains `i` itself.
pub fn knn_indices(points: ArrayView2<f64>, k: usize) -> anyhow::Result<Array2<usize>> {
    let n = points.nrows();
    if k == 0 {
        bail!("The number of neighbors must be at least 1.");
    }
    if k >= n {
        bail!("{} neighbors requested from only {} points.", k, n);
    }

    let rows: Vec<Vec<usize>> = (0..n)
        .into_par_iter()
        .map(|i| {
            let query = points.row(i);
            let mut pairs: Vec<(f64, usize)> = (0..n)
                .filter(|&j| j != i)
                .map(|j| (squared_euclidean(query, points.row(j)), j))
                .collect();
            select_k_nearest(&mut pairs, k);
            pairs.into_iter().map(|(_, j)| j).collect()
        })
        .collect();

    let flat: Vec<usize> = rows.into_iter().flatten().collect();
    Ok(Array2::from_shape_vec((n, k), flat)?)
}
