use std::f64::consts::{FRAC_PI_2, PI};

use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

use crate::dense::column_stats;
use crate::dimred::{LinearProjection, Projector};
use crate::error::{Result, VizRankError};
use crate::utils::safe_divisor;

/// Unit direction vectors for `m` axes, one row `(cos θ, sin θ)` per axis.
///
/// One axis points along `0`, two axes are perpendicular, three or more are
/// spread evenly over `[0, 2π)` starting at `0`.
pub fn circular_placement(m: usize) -> Result<Array2<f64>> {
    let angles: Vec<f64> = match m {
        0 => {
            return Err(VizRankError::InvalidConfiguration(
                "circular placement needs at least one axis".into(),
            ))
        }
        1 => vec![0.0],
        2 => vec![0.0, FRAC_PI_2],
        _ => (0..m).map(|i| 2.0 * PI * i as f64 / m as f64).collect(),
    };

    let mut axes = Array2::zeros((m, 2));
    for (i, angle) in angles.into_iter().enumerate() {
        axes[[i, 0]] = angle.cos();
        axes[[i, 1]] = angle.sin();
    }
    Ok(axes)
}

/// Projects span-normalized variables onto the circular axes.
#[derive(Debug, Clone, Copy, Default)]
pub struct CircularPlacement;

impl Projector for CircularPlacement {
    fn fit(&self, x: ArrayView2<f64>, _y: ArrayView1<f64>) -> anyhow::Result<LinearProjection> {
        let m = x.ncols();
        let axes = circular_placement(m)?;

        let mut mean = Array1::zeros(m);
        let mut scale = Array1::ones(m);
        for (j, col) in x.columns().into_iter().enumerate() {
            if let Some((mu, min, max)) = column_stats(col) {
                mean[j] = mu;
                scale[j] = safe_divisor(max - min);
            }
        }
        LinearProjection::new(mean, scale, axes.t().to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_single_axis() {
        let axes = circular_placement(1).unwrap();
        assert_eq!(axes, array![[1.0, 0.0]]);
    }

    #[test]
    fn test_two_axes_are_perpendicular() {
        let axes = circular_placement(2).unwrap();
        assert_abs_diff_eq!(axes[[0, 0]], 1.0);
        assert_abs_diff_eq!(axes[[0, 1]], 0.0);
        assert_abs_diff_eq!(axes[[1, 0]], 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(axes[[1, 1]], 1.0);
    }

    #[test]
    fn test_four_axes_quarter_turns() {
        let axes = circular_placement(4).unwrap();
        let expected = [[1.0, 0.0], [0.0, 1.0], [-1.0, 0.0], [0.0, -1.0]];
        for (row, want) in axes.rows().into_iter().zip(expected) {
            assert_abs_diff_eq!(row[0], want[0], epsilon = 1e-12);
            assert_abs_diff_eq!(row[1], want[1], epsilon = 1e-12);
            assert_abs_diff_eq!(row.dot(&row).sqrt(), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_zero_axes_rejected() {
        assert!(matches!(
            circular_placement(0),
            Err(VizRankError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_fit_normalizes_columns() {
        let x = array![[0.0, 10.0], [2.0, 10.0], [4.0, 10.0]];
        let y = array![0.0, 1.0, 0.0];
        let proj = CircularPlacement.fit(x.view(), y.view()).unwrap();
        let embedded = proj.transform(x.view()).unwrap();
        // First variable lies on the x axis, constant second variable adds nothing.
        assert_abs_diff_eq!(embedded[[0, 0]], -0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(embedded[[2, 0]], 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(embedded.column(1).sum(), 0.0, epsilon = 1e-12);
    }
}
