//! # Variable relevance
//!
//! Relief-style estimates of how much each continuous variable says about the
//! target, used to order the variables before the subset search starts.
//!
//! - **ReliefF** (discrete target): for sampled instances, compares feature
//!   differences to the nearest hits (same class) and nearest misses (each other
//!   class, weighted by class prior).
//! - **RReliefF** (continuous target): the regression variant, weighting
//!   neighbour differences by how much the target differs.
//!
//! Features are span-normalized first, so every feature difference lies in `[0, 1]`.
//! A difference involving a missing value counts as `0.5`.

use std::cmp::Ordering;

use anyhow::bail;
use log::debug;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::data::Dataset;
use crate::neighbors::select_k_nearest;
use crate::utils::SpanNormalize;

const MISSING_DIFF: f64 = 0.5;

/// Settings for the relief estimators.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReliefConfig {
    pub n_iterations: usize,
    pub k_nearest: usize,
    pub seed: u64,
}

impl Default for ReliefConfig {
    fn default() -> Self {
        ReliefConfig {
            n_iterations: 100,
            k_nearest: 10,
            seed: 42,
        }
    }
}

fn feature_diff(a: f64, b: f64) -> f64 {
    if a.is_nan() || b.is_nan() {
        MISSING_DIFF
    } else {
        (a - b).abs()
    }
}

fn manhattan(a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
    a.iter().zip(b.iter()).map(|(&x, &y)| feature_diff(x, y)).sum()
}

/// The `k` nearest rows to `row` among `candidates` (which may contain `row`).
fn nearest_among(x: ArrayView2<f64>, row: usize, candidates: &[usize], k: usize) -> Vec<usize> {
    let query = x.row(row);
    let mut pairs: Vec<(f64, usize)> = candidates
        .iter()
        .filter(|&&j| j != row)
        .map(|&j| (manhattan(query, x.row(j)), j))
        .collect();
    select_k_nearest(&mut pairs, k);
    pairs.into_iter().map(|(_, j)| j).collect()
}

/// ReliefF weights for a discrete target given as class indices.
///
/// `x` must already be span-normalized.
pub fn relief_f(x: ArrayView2<f64>, y: ArrayView1<f64>, config: &ReliefConfig) -> anyhow::Result<Array1<f64>> {
    let (n, m) = x.dim();
    if n < 2 {
        bail!("ReliefF needs at least two instances, got {}", n);
    }

    let mut classes: Vec<f64> = y.iter().copied().collect();
    classes.sort_by(f64::total_cmp);
    classes.dedup();
    let members: Vec<Vec<usize>> = classes
        .iter()
        .map(|&c| (0..n).filter(|&i| y[i] == c).collect())
        .collect();
    let priors: Vec<f64> = members.iter().map(|rows| rows.len() as f64 / n as f64).collect();
    let class_of = |row: usize| -> usize {
        classes
            .binary_search_by(|c| c.partial_cmp(&y[row]).unwrap_or(Ordering::Equal))
            .unwrap_or(0)
    };

    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    let mut weights = Array1::<f64>::zeros(m);
    let iterations = config.n_iterations.max(1);

    for _ in 0..iterations {
        let r = rng.random_range(0..n);
        let own = class_of(r);
        let hits = nearest_among(x, r, &members[own], config.k_nearest);
        if !hits.is_empty() {
            let scale = (iterations * hits.len()) as f64;
            for &h in &hits {
                for a in 0..m {
                    weights[a] -= feature_diff(x[[r, a]], x[[h, a]]) / scale;
                }
            }
        }

        let miss_norm = 1.0 - priors[own];
        if miss_norm <= 0.0 {
            continue;
        }
        for (c, rows) in members.iter().enumerate() {
            if c == own {
                continue;
            }
            let misses = nearest_among(x, r, rows, config.k_nearest);
            if misses.is_empty() {
                continue;
            }
            let factor = priors[c] / miss_norm / (iterations * misses.len()) as f64;
            for &mi in &misses {
                for a in 0..m {
                    weights[a] += factor * feature_diff(x[[r, a]], x[[mi, a]]);
                }
            }
        }
    }

    Ok(weights)
}

/// RReliefF weights for a continuous target.
///
/// `x` must already be span-normalized.
pub fn rrelief_f(x: ArrayView2<f64>, y: ArrayView1<f64>, config: &ReliefConfig) -> anyhow::Result<Array1<f64>> {
    let (n, m) = x.dim();
    if n < 2 {
        bail!("RReliefF needs at least two instances, got {}", n);
    }

    let (y_min, y_max) = y
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    let y_span = crate::utils::safe_divisor(y_max - y_min);

    let all: Vec<usize> = (0..n).collect();
    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    let iterations = config.n_iterations.max(1);

    let mut n_dc = 0.0;
    let mut n_da = Array1::<f64>::zeros(m);
    let mut n_dc_da = Array1::<f64>::zeros(m);

    for _ in 0..iterations {
        let r = rng.random_range(0..n);
        let neighbors = nearest_among(x, r, &all, config.k_nearest);
        if neighbors.is_empty() {
            continue;
        }
        let d = 1.0 / neighbors.len() as f64;
        for &j in &neighbors {
            let dc = (y[r] - y[j]).abs() / y_span;
            n_dc += dc * d;
            for a in 0..m {
                let da = feature_diff(x[[r, a]], x[[j, a]]);
                n_da[a] += da * d;
                n_dc_da[a] += dc * da * d;
            }
        }
    }

    let iterations = iterations as f64;
    let mut weights = Array1::<f64>::zeros(m);
    for a in 0..m {
        let same = if n_dc > 0.0 { n_dc_da[a] / n_dc } else { 0.0 };
        let rest = iterations - n_dc;
        let other = if rest > 0.0 { (n_da[a] - n_dc_da[a]) / rest } else { 0.0 };
        weights[a] = same - other;
    }
    Ok(weights)
}

/// Orders the usable continuous variables of `data` by relevance to the target.
///
/// Returns column indices into `data`, most relevant first; equal weights are
/// ordered by variable name.
pub fn rank_variables(data: &Dataset, config: &ReliefConfig) -> anyhow::Result<Vec<usize>> {
    let columns = data.continuous_columns();
    let rows = data.valid_rows();
    if columns.is_empty() {
        return Ok(columns);
    }

    let mut x: Array2<f64> = data.sub_matrix(&rows, &columns);
    x.span_normalize()?;
    let y = data.sub_target(&rows);

    let weights = if data.target().is_discrete() {
        relief_f(x.view(), y.view(), config)?
    } else {
        rrelief_f(x.view(), y.view(), config)?
    };

    let mut scored: Vec<(f64, usize)> = weights.iter().copied().zip(columns).collect();
    scored.sort_by(|a, b| {
        b.0.partial_cmp(&a.0)
            .unwrap_or(Ordering::Equal)
            .then_with(|| data.variable(a.1).name().cmp(data.variable(b.1).name()))
    });
    debug!(
        "Relief order: {:?}",
        scored
            .iter()
            .map(|(w, c)| (data.variable(*c).name(), *w))
            .collect::<Vec<_>>()
    );
    Ok(scored.into_iter().map(|(_, c)| c).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Variable;
    use ndarray::Array2;
    use rand::rngs::StdRng;

    /// Column 0 separates the classes, column 1 is noise.
    fn separable(n: usize) -> (Array2<f64>, Array1<f64>) {
        let mut rng = StdRng::seed_from_u64(7);
        let mut x = Array2::zeros((n, 2));
        let mut y = Array1::zeros(n);
        for i in 0..n {
            let class = (i % 2) as f64;
            y[i] = class;
            x[[i, 0]] = class * 10.0 + rng.random_range(0.0..1.0);
            x[[i, 1]] = rng.random_range(0.0..10.0);
        }
        (x, y)
    }

    #[test]
    fn test_relief_f_prefers_informative_feature() {
        let (mut x, y) = separable(60);
        x.span_normalize().unwrap();
        let w = relief_f(x.view(), y.view(), &ReliefConfig::default()).unwrap();
        assert!(w[0] > w[1], "weights {:?}", w);
        assert!(w[0] > 0.0);
    }

    #[test]
    fn test_rrelief_f_prefers_informative_feature() {
        let mut rng = StdRng::seed_from_u64(3);
        let n = 80;
        let mut x = Array2::zeros((n, 2));
        let mut y = Array1::zeros(n);
        for i in 0..n {
            let t = i as f64 / n as f64;
            x[[i, 0]] = t;
            x[[i, 1]] = rng.random_range(0.0..1.0);
            y[i] = 3.0 * t;
        }
        x.span_normalize().unwrap();
        let w = rrelief_f(x.view(), y.view(), &ReliefConfig::default()).unwrap();
        assert!(w[0] > w[1], "weights {:?}", w);
    }

    #[test]
    fn test_relief_needs_two_rows() {
        let x = Array2::<f64>::zeros((1, 2));
        let y = Array1::<f64>::zeros(1);
        assert!(relief_f(x.view(), y.view(), &ReliefConfig::default()).is_err());
        assert!(rrelief_f(x.view(), y.view(), &ReliefConfig::default()).is_err());
    }

    #[test]
    fn test_rank_variables_orders_and_breaks_ties_by_name() {
        let (x, y) = separable(40);
        // Two identical constant columns get identical weights.
        let mut full = Array2::zeros((40, 4));
        full.column_mut(0).assign(&Array1::from_elem(40, 1.0));
        full.column_mut(1).assign(&x.column(0));
        full.column_mut(2).assign(&Array1::from_elem(40, 1.0));
        full.column_mut(3).assign(&x.column(1));
        let data = Dataset::new(
            vec![
                Variable::continuous("zeta"),
                Variable::continuous("signal"),
                Variable::continuous("alpha"),
                Variable::continuous("noise"),
            ],
            full,
            Variable::discrete("class", ["a", "b"]),
            y,
        )
        .unwrap();

        let order = rank_variables(&data, &ReliefConfig::default()).unwrap();
        assert_eq!(order.len(), 4);
        assert_eq!(order[0], 1);
        let alpha = order.iter().position(|&c| c == 2).unwrap();
        let zeta = order.iter().position(|&c| c == 0).unwrap();
        assert_eq!(zeta, alpha + 1);
    }

    #[test]
    fn test_rank_variables_is_deterministic() {
        let (x, y) = separable(30);
        let data = Dataset::new(
            vec![Variable::continuous("u"), Variable::continuous("v")],
            x,
            Variable::discrete("class", ["a", "b"]),
            y,
        )
        .unwrap();
        let config = ReliefConfig::default();
        assert_eq!(
            rank_variables(&data, &config).unwrap(),
            rank_variables(&data, &config).unwrap()
        );
    }
}
