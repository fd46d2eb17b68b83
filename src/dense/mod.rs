use anyhow::bail;
use ndarray::{Array2, ArrayView1};
use num_traits::Float;

use crate::utils::{safe_divisor, SpanNormalize};

/// Mean, min and max over the non-missing entries of a column.
pub(crate) fn column_stats<T: Float>(column: ArrayView1<T>) -> Option<(T, T, T)> {
    let mut count = 0usize;
    let mut sum = T::zero();
    let mut min = T::infinity();
    let mut max = T::neg_infinity();
    for &v in column.iter().filter(|v| !v.is_nan()) {
        count += 1;
        sum = sum + v;
        min = min.min(v);
        max = max.max(v);
    }
    if count == 0 {
        return None;
    }
    Some((sum / T::from(count)?, min, max))
}

fn column_std<T: Float>(column: ArrayView1<T>, mean: T) -> T {
    let mut count = 0usize;
    let mut sq = T::zero();
    for &v in column.iter().filter(|v| !v.is_nan()) {
        count += 1;
        sq = sq + (v - mean) * (v - mean);
    }
    match T::from(count) {
        Some(n) if count > 0 => (sq / n).sqrt(),
        _ => T::zero(),
    }
}

impl<T: Float> SpanNormalize<T> for Array2<T> {
    fn span_normalize(&mut self) -> anyhow::Result<()> {
        if self.nrows() == 0 {
            bail!("Cannot normalize a matrix without rows");
        }
        for mut col in self.columns_mut() {
            let Some((mean, min, max)) = column_stats(col.view()) else {
                continue;
            };
            let span = safe_divisor(max - min);
            col.mapv_inplace(|v| (v - mean) / span);
        }
        Ok(())
    }

    fn standardize(&mut self) -> anyhow::Result<()> {
        if self.nrows() == 0 {
            bail!("Cannot standardize a matrix without rows");
        }
        for mut col in self.columns_mut() {
            let Some((mean, _, _)) = column_stats(col.view()) else {
                continue;
            };
            let std = safe_divisor(column_std(col.view(), mean));
            col.mapv_inplace(|v| (v - mean) / std);
        }
        Ok(())
    }
}
